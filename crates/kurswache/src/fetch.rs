use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::{
    ACCEPT_LANGUAGE, CONTENT_DISPOSITION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
    REFERER,
};
use scraper::{Html, Selector};

// WebForms submit button that triggers the PDF export of the result list.
const PDF_BUTTON_FIELD: &str = "ctl00$Content$btnPDFTop";
const PDF_BUTTON_LABEL: &str = "Trefferliste als PDF";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("expected a PDF response, got content-type '{content_type}': {snippet}")]
    NotPdf {
        content_type: String,
        snippet: String,
    },
}

/// Capability: produce the raw bytes of a course list document for one
/// search. Implemented against the live catalog by [`CatalogClient`].
#[async_trait]
pub trait DocumentSource {
    async fn fetch_document(&self, search_url: &str) -> Result<Vec<u8>, FetchError>;
}

/// HTTP client for the catalog's WebForms pages. Built once at startup and
/// reused across all watches; headers are set here and never mutated.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    client: Client,
    debug_dump: PathBuf,
}

impl CatalogClient {
    pub fn new() -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("de-DE,de;q=0.9,en-US;q=0.8,en;q=0.7"),
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            debug_dump: PathBuf::from("debug_response.html"),
        })
    }

    /// WebForms flow: GET the search URL (redirects land on the result
    /// list), lift the hidden form fields from the HTML, then POST them back
    /// to the final page together with the PDF export button field.
    async fn download_pdf(&self, search_url: &str) -> Result<Vec<u8>, FetchError> {
        let response = self
            .client
            .get(search_url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?;

        // The page POSTs to itself, wherever the redirect chain ended.
        let post_url = response.url().clone();
        let html = response.text().await?;

        let mut payload = extract_hidden_fields(&html);
        log::debug!("{} hidden field(s) on {}", payload.len(), post_url);

        payload.insert(PDF_BUTTON_FIELD.to_string(), PDF_BUTTON_LABEL.to_string());
        if payload.contains_key("__EVENTTARGET") {
            payload.insert("__EVENTTARGET".to_string(), PDF_BUTTON_FIELD.to_string());
        }
        if payload.contains_key("__EVENTARGUMENT") {
            payload.insert("__EVENTARGUMENT".to_string(), String::new());
        }

        let response = self
            .client
            .post(post_url.clone())
            .header(REFERER, post_url.as_str())
            .form(&payload)
            .send()
            .await?
            .error_for_status()?;

        let content_type = header_str(response.headers(), CONTENT_TYPE);
        let disposition = header_str(response.headers(), CONTENT_DISPOSITION);
        log::debug!("export response: content-type '{content_type}', content-disposition '{disposition}'");

        let body = response.bytes().await?;
        if !looks_like_pdf(&content_type, &disposition) {
            // Keep the body around, the HTML usually explains what went
            // wrong with the session.
            match std::fs::write(&self.debug_dump, &body) {
                Ok(()) => log::warn!(
                    "unexpected response saved to {}",
                    self.debug_dump.display()
                ),
                Err(e) => log::warn!("could not save unexpected response: {e}"),
            }
            let snippet: String = String::from_utf8_lossy(&body)
                .chars()
                .take(300)
                .collect::<String>()
                .replace('\n', " ");
            return Err(FetchError::NotPdf {
                content_type,
                snippet,
            });
        }

        Ok(body.to_vec())
    }
}

#[async_trait]
impl DocumentSource for CatalogClient {
    async fn fetch_document(&self, search_url: &str) -> Result<Vec<u8>, FetchError> {
        log::info!("Fetching course list PDF via {search_url}...");
        self.download_pdf(search_url).await
    }
}

/// All `<input type="hidden" name=...>` fields of a WebForms page, the state
/// that has to be echoed back on the export POST.
fn extract_hidden_fields(html: &str) -> HashMap<String, String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(r#"input[type="hidden"][name]"#).unwrap();

    document
        .select(&selector)
        .filter_map(|input| {
            let name = input.value().attr("name")?;
            let value = input.value().attr("value").unwrap_or_default();
            Some((name.to_string(), value.to_string()))
        })
        .collect()
}

/// The export endpoint answers with the PDF itself or, on session problems,
/// with an HTML error page behind a 200.
fn looks_like_pdf(content_type: &str, content_disposition: &str) -> bool {
    content_type.contains("pdf") || content_disposition.contains("attachment")
}

fn header_str(headers: &HeaderMap, name: HeaderName) -> String {
    headers
        .get(&name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_ascii_lowercase()
}
