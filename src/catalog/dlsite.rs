//! DLsite lookup by scraping the work page.

use std::sync::LazyLock;

use anyhow::Result;
use scraper::{Html, Selector};

use crate::catalog::{CatalogClient, LookupError, detail_url};
use crate::work::Work;

static WORK_NAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("h1#work_name>a").expect("Failed to create work name selector"));

static MAKER_NAME_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("span.maker_name>a").expect("Failed to create maker name selector"));

/// Concatenated text of all elements matching the selector.
fn select_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .flat_map(|element| element.text())
        .collect()
}

/// Parse the work title and maker from a DLsite work page.
///
/// # Errors
/// Returns [`LookupError::EmptyField`] if the page does not contain a title or maker.
pub fn parse_work_page(html: &str, content_id: &str) -> Result<Work, LookupError> {
    let document = Html::parse_document(html);
    let title = select_text(&document, &WORK_NAME_SELECTOR);
    let maker = select_text(&document, &MAKER_NAME_SELECTOR);
    Work::new(&title, &maker).validated(content_id)
}

/// Look up a DLsite work from its work page.
///
/// # Errors
/// Returns an error if the request fails, the page returns an error status,
/// or the title or maker cannot be found on the page.
pub async fn lookup(client: &CatalogClient, content_id: &str) -> Result<Work> {
    let url = detail_url(&client.endpoints.dlsite_detail, content_id);
    let html = client.fetch_html(&url).await?;
    Ok(parse_work_page(&html, content_id)?)
}

#[cfg(test)]
mod dlsite_tests {
    use super::*;

    use httpmock::prelude::*;

    use crate::catalog::Endpoints;

    const WORK_PAGE: &str = r#"<!DOCTYPE html>
<html lang="ja-jp">
<head><title>Title2 [Maker2] | DLsite</title></head>
<body>
  <div id="top_wrapper">
    <h1 itemprop="name" id="work_name"><a href="https://www.dlsite.com/maniax/work/=/product_id/RJ123456.html">Title2</a></h1>
    <table id="work_maker">
      <tr><th>サークル名</th><td><span itemprop="brand" class="maker_name"><a href="https://www.dlsite.com/maniax/circle/profile/=/maker_id/RG00000.html">Maker2</a></span></td></tr>
    </table>
  </div>
</body>
</html>"#;

    #[test]
    fn parses_title_and_maker() {
        assert_eq!(
            parse_work_page(WORK_PAGE, "RJ123456").unwrap(),
            Work::new("Title2", "Maker2")
        );
    }

    #[test]
    fn title_without_link_is_an_error() {
        let html = r#"<h1 id="work_name">Title2</h1><span class="maker_name"><a>Maker2</a></span>"#;
        let error = parse_work_page(html, "RJ123456").unwrap_err();
        assert!(matches!(error, LookupError::EmptyField { field: "title", .. }));
    }

    #[test]
    fn missing_maker_is_an_error() {
        let html = r#"<h1 id="work_name"><a>Title2</a></h1>"#;
        let error = parse_work_page(html, "RJ123456").unwrap_err();
        assert!(matches!(error, LookupError::EmptyField { field: "maker", .. }));
    }

    #[test]
    fn blank_maker_is_an_error() {
        let html = r#"<h1 id="work_name"><a>Title2</a></h1><span class="maker_name"><a>
        </a></span>"#;
        let error = parse_work_page(html, "RJ123456").unwrap_err();
        assert!(matches!(error, LookupError::EmptyField { field: "maker", .. }));
    }

    #[test]
    fn unrelated_page_is_an_error() {
        assert!(parse_work_page("<html><body>Not found</body></html>", "RJ123456").is_err());
    }

    #[tokio::test]
    async fn lookup_fetches_work_page() {
        let server = MockServer::start_async().await;
        let page_mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/maniax/work/=/product_id/RJ123456.html");
                then.status(200)
                    .header("content-type", "text/html; charset=utf-8")
                    .body(WORK_PAGE);
            })
            .await;
        let client = CatalogClient::new(Endpoints::with_base_url(&server.base_url()), false).unwrap();

        let work = lookup(&client, "RJ123456").await.unwrap();

        assert_eq!(work, Work::new("Title2", "Maker2"));
        page_mock.assert_async().await;
    }

    #[tokio::test]
    async fn lookup_error_status_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/maniax/work/=/product_id/RJ999999.html");
                then.status(404).body("Not found");
            })
            .await;
        let client = CatalogClient::new(Endpoints::with_base_url(&server.base_url()), false).unwrap();

        assert!(lookup(&client, "RJ999999").await.is_err());
    }
}
