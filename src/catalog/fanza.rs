//! FANZA lookup through the affiliate API with a detail page fallback.
//!
//! API documentation:
//! <https://affiliate.dmm.com/api/v3/itemlist.html>

use std::sync::LazyLock;

use anyhow::{Context, Result};
use colored::Colorize;
use regex::Regex;
use reqwest::Url;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::catalog::{CatalogClient, CatalogCredentials, LookupError, detail_url};
use crate::work::Work;

const SITE: &str = "FANZA";

/// Detail page title of the form `title (maker) - FANZA同人`.
static RE_DETAIL_TITLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(.*)\((.*)\) - FANZA同人").expect("Failed to create regex pattern for FANZA detail title")
});

static TITLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("title").expect("Failed to create title selector"));

/// `ItemList` response. Every level is optional so that a shape mismatch
/// on the path to the first item resolves to `None` instead of a deserialization error.
#[derive(Debug, Default, Deserialize)]
struct ItemListResponse {
    #[serde(default)]
    result: Option<ItemListResult>,
}

/// Only the first item is read, so later items are kept untyped.
#[derive(Debug, Default, Deserialize)]
struct ItemListResult {
    #[serde(default)]
    items: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct Item {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    iteminfo: Option<ItemInfo>,
}

#[derive(Debug, Default, Deserialize)]
struct ItemInfo {
    #[serde(default)]
    maker: Vec<Value>,
}

#[derive(Debug, Default, Deserialize)]
struct NamedEntry {
    #[serde(default)]
    name: Option<String>,
}

impl ItemListResponse {
    /// Title and maker of the first item, if both are present.
    fn into_work(self) -> Option<Work> {
        let item: Item = first_as(self.result?.items)?;
        let maker: NamedEntry = first_as(item.iteminfo?.maker)?;
        let work = Work::new(&item.title?, &maker.name?);
        work.is_complete().then_some(work)
    }
}

/// Deserialize the first element of a JSON array, ignoring the rest.
fn first_as<T: DeserializeOwned>(values: Vec<Value>) -> Option<T> {
    let value = values.into_iter().next()?;
    serde_json::from_value(value).ok()
}

/// Parse an `ItemList` JSON body into a work.
///
/// Returns `None` when the body is not JSON or does not have the expected shape,
/// which is the signal to use the detail page instead.
#[must_use]
pub fn parse_item_list(body: &str) -> Option<Work> {
    serde_json::from_str::<ItemListResponse>(body)
        .ok()
        .and_then(ItemListResponse::into_work)
}

/// Parse the work from a detail page `<title>`.
///
/// # Errors
/// Returns [`LookupError::PatternMismatch`] if the title does not have the expected form,
/// or [`LookupError::EmptyField`] if a captured field is blank.
pub fn parse_detail_page(html: &str, content_id: &str) -> Result<Work, LookupError> {
    let document = Html::parse_document(html);
    let title: String = document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|element| element.text().collect())
        .unwrap_or_default();

    let captures = RE_DETAIL_TITLE
        .captures(&title)
        .ok_or_else(|| LookupError::PatternMismatch {
            content_id: content_id.to_string(),
            title: title.clone(),
        })?;

    Work::new(captures[1].trim(), captures[2].trim()).validated(content_id)
}

/// Build the `ItemList` request URL for a content id.
///
/// # Errors
/// Returns an error if the API endpoint is not a valid URL.
pub fn api_url(endpoint: &str, content_id: &str, credentials: &CatalogCredentials) -> Result<Url> {
    Url::parse_with_params(
        endpoint,
        &[
            ("api_id", credentials.api_id.as_str()),
            ("affiliate_id", credentials.affiliate_id.as_str()),
            ("site", SITE),
            ("cid", content_id),
        ],
    )
    .with_context(|| format!("Invalid FANZA API URL: {endpoint}"))
}

/// Look up a FANZA work, falling back to the detail page when the API has no usable item.
///
/// # Errors
/// Returns an error if a request fails, the detail page cannot be fetched,
/// or its title does not match the expected pattern.
pub async fn lookup(client: &CatalogClient, content_id: &str, credentials: &CatalogCredentials) -> Result<Work> {
    if let Some(work) = lookup_api(client, content_id, credentials).await? {
        return Ok(work);
    }
    if client.verbose {
        println!("{}", format!("No API result for {content_id}, using detail page").yellow());
    }
    lookup_detail_page(client, content_id).await
}

async fn lookup_api(client: &CatalogClient, content_id: &str, credentials: &CatalogCredentials) -> Result<Option<Work>> {
    let url = api_url(&client.endpoints.fanza_api, content_id, credentials)?;
    let response = client.get(url.as_str()).await?;
    let status = response.status();
    let body = response
        .text()
        .await
        .with_context(|| format!("Failed to read FANZA API response for {content_id}"))?;

    if !status.is_success() {
        if client.verbose {
            println!("{}", format!("FANZA API returned HTTP {status}").yellow());
        }
        return Ok(None);
    }
    Ok(parse_item_list(&body))
}

async fn lookup_detail_page(client: &CatalogClient, content_id: &str) -> Result<Work> {
    let url = detail_url(&client.endpoints.fanza_detail, content_id);
    let html = client.fetch_html(&url).await?;
    Ok(parse_detail_page(&html, content_id)?)
}
