//! Catalog lookups for archive metadata.
//!
//! File names are matched to a catalog by their prefix,
//! and the embedded content id is used to fetch the title and maker
//! either from the FANZA affiliate API (with a detail page fallback)
//! or from the DLsite work page.

mod credentials;
pub mod dlsite;
pub mod fanza;

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use reqwest::cookie::Jar;
use reqwest::{Client, Response, Url};

pub use credentials::CatalogCredentials;

use crate::work::{ARCHIVE_EXTENSION, Work};

/// Length of the content id taken from the start of the file name.
pub const CONTENT_ID_LENGTH: usize = 8;

const ID_PLACEHOLDER: &str = "{id}";

const FANZA_API_URL: &str = "https://api.dmm.com/affiliate/v3/ItemList";
const FANZA_DETAIL_URL: &str = "https://www.dmm.co.jp/dc/doujin/-/detail/=/cid={id}";
const DLSITE_DETAIL_URL: &str = "https://www.dlsite.com/maniax/work/=/product_id/{id}.html";

const FANZA_AGE_CHECK_COOKIE: &str = "age_check_done=1; Path=/";
const DLSITE_AGE_CHECK_COOKIE: &str = "adultchecked=1; Path=/";

const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Lookup failures that are not transport errors.
#[derive(Debug, thiserror::Error)]
pub enum LookupError {
    /// The fallback page title did not have the expected `title (maker) - FANZA同人` form.
    #[error("Error during pattern match for {content_id}: '{title}'")]
    PatternMismatch { content_id: String, title: String },

    /// The page was parsed but a required field was empty.
    #[error("Empty {field} for {content_id}")]
    EmptyField { content_id: String, field: &'static str },
}

/// Source of metadata for a content id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Fanza,
    Dlsite,
}

impl Catalog {
    /// File name prefix used by the catalog's content ids.
    #[must_use]
    pub const fn prefix(self) -> &'static str {
        match self {
            Self::Fanza => "d_",
            Self::Dlsite => "RJ",
        }
    }
}

impl fmt::Display for Catalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fanza => write!(f, "FANZA"),
            Self::Dlsite => write!(f, "DLsite"),
        }
    }
}

/// Content id extracted from a file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentId {
    pub catalog: Catalog,
    pub id: String,
}

impl ContentId {
    /// Match a file name against the catalog naming conventions.
    ///
    /// Returns `None` for names that do not belong to either catalog.
    ///
    /// ```rust
    /// use work_rename::catalog::{Catalog, ContentId};
    ///
    /// let content_id = ContentId::from_file_name("RJ123456.zip").unwrap();
    /// assert_eq!(content_id.catalog, Catalog::Dlsite);
    /// assert_eq!(content_id.id, "RJ123456");
    ///
    /// assert!(ContentId::from_file_name("RJ123456.rar").is_none());
    /// ```
    #[must_use]
    pub fn from_file_name(name: &str) -> Option<Self> {
        if !name.ends_with(ARCHIVE_EXTENSION) || name.len() < CONTENT_ID_LENGTH + ARCHIVE_EXTENSION.len() {
            return None;
        }
        let catalog = [Catalog::Fanza, Catalog::Dlsite]
            .into_iter()
            .find(|catalog| name.starts_with(catalog.prefix()))?;
        let id = name.get(..CONTENT_ID_LENGTH)?;
        Some(Self {
            catalog,
            id: id.to_string(),
        })
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.catalog, self.id)
    }
}

/// Catalog endpoint URLs. Detail page templates contain an `{id}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub fanza_api: String,
    pub fanza_detail: String,
    pub dlsite_detail: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            fanza_api: FANZA_API_URL.to_string(),
            fanza_detail: FANZA_DETAIL_URL.to_string(),
            dlsite_detail: DLSITE_DETAIL_URL.to_string(),
        }
    }
}

impl Endpoints {
    /// Use the same URL paths as the real catalogs under a different base URL.
    #[must_use]
    pub fn with_base_url(base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        Self {
            fanza_api: format!("{base_url}/affiliate/v3/ItemList"),
            fanza_detail: format!("{base_url}/dc/doujin/-/detail/=/cid={ID_PLACEHOLDER}"),
            dlsite_detail: format!("{base_url}/maniax/work/=/product_id/{ID_PLACEHOLDER}.html"),
        }
    }
}

/// Substitute the content id into a detail page URL template.
#[must_use]
pub fn detail_url(template: &str, content_id: &str) -> String {
    template.replace(ID_PLACEHOLDER, content_id)
}

/// URL for console output. The query string carries the API credentials.
fn without_query(url: &str) -> &str {
    url.split_once('?').map_or(url, |(base, _)| base)
}

/// HTTP client shared by all catalog lookups.
#[derive(Debug)]
pub struct CatalogClient {
    client: Client,
    endpoints: Endpoints,
    verbose: bool,
}

impl CatalogClient {
    /// Create a new client for the given endpoints.
    ///
    /// The client carries the age check cookies for both detail page hosts.
    ///
    /// # Errors
    /// Returns an error if an endpoint is not a valid URL or the HTTP client cannot be built.
    pub fn new(endpoints: Endpoints, verbose: bool) -> Result<Self> {
        let jar = Jar::default();
        for (template, cookie) in [
            (&endpoints.fanza_detail, FANZA_AGE_CHECK_COOKIE),
            (&endpoints.dlsite_detail, DLSITE_AGE_CHECK_COOKIE),
        ] {
            let url = Url::parse(&detail_url(template, ""))
                .with_context(|| format!("Invalid catalog URL: {template}"))?;
            jar.add_cookie_str(cookie, &url);
        }

        let client = Client::builder()
            .cookie_provider(Arc::new(jar))
            .user_agent(USER_AGENT)
            .build()
            .context("Failed to build HTTP client")?;

        Ok(Self {
            client,
            endpoints,
            verbose,
        })
    }

    /// Resolve the work for a content id from its catalog.
    ///
    /// # Errors
    /// Returns an error if a request fails or the response cannot be parsed into a complete work.
    pub async fn lookup(&self, content_id: &ContentId, credentials: &CatalogCredentials) -> Result<Work> {
        match content_id.catalog {
            Catalog::Fanza => fanza::lookup(self, &content_id.id, credentials).await,
            Catalog::Dlsite => dlsite::lookup(self, &content_id.id).await,
        }
    }

    /// Send a GET request. Only transport failures are errors here.
    async fn get(&self, url: &str) -> Result<Response> {
        if self.verbose {
            println!("{} {}", "GET".dimmed(), without_query(url));
        }
        self.client
            .get(url)
            .send()
            .await
            .with_context(|| format!("Failed to send request: {}", without_query(url)))
    }

    /// Fetch a page body, treating any non-success status as an error.
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let response = self
            .get(url)
            .await?
            .error_for_status()
            .with_context(|| format!("Request returned an error status: {url}"))?;

        response
            .text()
            .await
            .with_context(|| format!("Failed to read response body: {url}"))
    }
}

#[cfg(test)]
mod content_id_tests {
    use super::*;

    #[test]
    fn fanza_name_extracts_eight_characters() {
        let content_id = ContentId::from_file_name("d_123456.zip").unwrap();
        assert_eq!(content_id.catalog, Catalog::Fanza);
        assert_eq!(content_id.id, "d_123456");
    }

    #[test]
    fn fanza_name_with_longer_id_is_truncated() {
        let content_id = ContentId::from_file_name("d_abc12345.zip").unwrap();
        assert_eq!(content_id.catalog, Catalog::Fanza);
        assert_eq!(content_id.id, "d_abc123");
    }

    #[test]
    fn dlsite_name_extracts_eight_characters() {
        let content_id = ContentId::from_file_name("RJ123456 some extra text.zip").unwrap();
        assert_eq!(content_id.catalog, Catalog::Dlsite);
        assert_eq!(content_id.id, "RJ123456");
    }

    #[test]
    fn wrong_extension_is_not_a_candidate() {
        assert!(ContentId::from_file_name("d_123456.rar").is_none());
        assert!(ContentId::from_file_name("RJ123456.ZIP").is_none());
        assert!(ContentId::from_file_name("RJ123456").is_none());
    }

    #[test]
    fn wrong_prefix_is_not_a_candidate() {
        assert!(ContentId::from_file_name("x_123456.zip").is_none());
        assert!(ContentId::from_file_name("rj123456.zip").is_none());
        assert!(ContentId::from_file_name("[Studio] Sample.zip").is_none());
    }

    #[test]
    fn too_short_name_is_not_a_candidate() {
        assert!(ContentId::from_file_name("d_1.zip").is_none());
        assert!(ContentId::from_file_name("RJ12.zip").is_none());
    }

    #[test]
    fn multibyte_boundary_is_not_a_candidate() {
        assert!(ContentId::from_file_name("RJ12345日本.zip").is_none());
    }

    #[test]
    fn display_includes_catalog() {
        let content_id = ContentId::from_file_name("RJ123456.zip").unwrap();
        assert_eq!(content_id.to_string(), "DLsite RJ123456");
    }
}

#[cfg(test)]
mod endpoints_tests {
    use super::*;

    #[test]
    fn detail_url_substitutes_id() {
        assert_eq!(
            detail_url(DLSITE_DETAIL_URL, "RJ123456"),
            "https://www.dlsite.com/maniax/work/=/product_id/RJ123456.html"
        );
        assert_eq!(
            detail_url(FANZA_DETAIL_URL, "d_123456"),
            "https://www.dmm.co.jp/dc/doujin/-/detail/=/cid=d_123456"
        );
    }

    #[test]
    fn with_base_url_keeps_paths() {
        let endpoints = Endpoints::with_base_url("http://127.0.0.1:8080/");
        assert_eq!(endpoints.fanza_api, "http://127.0.0.1:8080/affiliate/v3/ItemList");
        assert_eq!(
            detail_url(&endpoints.fanza_detail, "d_123456"),
            "http://127.0.0.1:8080/dc/doujin/-/detail/=/cid=d_123456"
        );
        assert_eq!(
            detail_url(&endpoints.dlsite_detail, "RJ123456"),
            "http://127.0.0.1:8080/maniax/work/=/product_id/RJ123456.html"
        );
    }

    #[test]
    fn without_query_hides_credentials() {
        assert_eq!(
            without_query("https://api.dmm.com/affiliate/v3/ItemList?api_id=abc&affiliate_id=me-990&cid=d_123456"),
            "https://api.dmm.com/affiliate/v3/ItemList"
        );
        assert_eq!(
            without_query("https://www.dlsite.com/maniax/work/=/product_id/RJ123456.html"),
            "https://www.dlsite.com/maniax/work/=/product_id/RJ123456.html"
        );
    }

    #[test]
    fn client_builds_with_default_endpoints() {
        assert!(CatalogClient::new(Endpoints::default(), false).is_ok());
    }

    #[test]
    fn client_rejects_invalid_endpoint() {
        let endpoints = Endpoints {
            dlsite_detail: "not a url {id}".to_string(),
            ..Endpoints::default()
        };
        assert!(CatalogClient::new(endpoints, false).is_err());
    }
}
