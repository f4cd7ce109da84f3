//! Documentation fetching
//!
//! Every URL is requested exactly once. The first failure aborts the whole fetch; there is no
//! retry and no partial result.

use async_trait::async_trait;
use futures::future::try_join_all;
use reqwest::Client;
use tracing::debug;

use crate::domain::DocumentSet;
use crate::error::ConvertError;
use crate::registry::Format;

/// Retrieves the text behind a documentation URL.
///
/// Each call is a single attempt; failures are not retried.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Single attempt. Non-success responses are errors.
    async fn fetch(&self, url: &str) -> Result<String, ConvertError>;
}

/// Plain HTTP GET over a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpDocumentSource {
    client: Client,
}

impl HttpDocumentSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl DocumentSource for HttpDocumentSource {
    async fn fetch(&self, url: &str) -> Result<String, ConvertError> {
        let failed = |reason: String| ConvertError::DocumentationFetch { url: url.to_string(), reason };

        debug!(url, "fetching documentation");
        let response = self.client.get(url).send().await.map_err(|e| failed(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(failed(format!("server returned {status}")));
        }
        let body = response.text().await.map_err(|e| failed(e.to_string()))?;
        debug!(url, bytes = body.len(), "fetched documentation");
        Ok(body)
    }
}

/// Fetch all `urls` concurrently, returning bodies in input order.
pub async fn fetch_documents(
    source: &dyn DocumentSource,
    format: Format,
    urls: &[String],
) -> Result<DocumentSet, ConvertError> {
    let documents = try_join_all(urls.iter().map(|url| source.fetch(url))).await?;
    Ok(DocumentSet { format, documents })
}

/// Fetch the source and target document sets side by side.
pub async fn fetch_pair(
    source: &dyn DocumentSource,
    (from, from_urls): (Format, &[String]),
    (to, to_urls): (Format, &[String]),
) -> Result<(DocumentSet, DocumentSet), ConvertError> {
    futures::try_join!(
        fetch_documents(source, from, from_urls),
        fetch_documents(source, to, to_urls)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn doc_server() -> MockServer {
        let server = MockServer::start().await;
        for (route, body) in [("/a", "alpha"), ("/b", "bravo"), ("/c", "charlie")] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(200).set_body_string(body))
                .expect(1)
                .mount(&server)
                .await;
        }
        server
    }

    #[tokio::test]
    async fn documents_keep_input_order() {
        let server = doc_server().await;
        let urls: Vec<String> =
            ["/c", "/a", "/b"].iter().map(|p| format!("{}{p}", server.uri())).collect();

        let set = fetch_documents(&HttpDocumentSource::default(), Format::Cursor, &urls)
            .await
            .expect("fetch");
        assert_eq!(set.format, Format::Cursor);
        assert_eq!(set.documents, vec!["charlie", "alpha", "bravo"]);
    }

    #[tokio::test]
    async fn non_success_status_names_the_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("fine"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .expect(1)
            .mount(&server)
            .await;

        let missing = format!("{}/missing", server.uri());
        let urls = vec![format!("{}/ok", server.uri()), missing.clone()];
        let err = fetch_documents(&HttpDocumentSource::default(), Format::Copilot, &urls)
            .await
            .unwrap_err();
        match err {
            ConvertError::DocumentationFetch { url, reason } => {
                assert_eq!(url, missing);
                assert!(reason.contains("404"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn pair_keeps_source_and_target_apart() {
        let server = doc_server().await;
        let from_urls = vec![format!("{}/a", server.uri())];
        let to_urls = vec![format!("{}/b", server.uri()), format!("{}/c", server.uri())];

        let (source, target) = fetch_pair(
            &HttpDocumentSource::default(),
            (Format::ClaudeCode, &from_urls),
            (Format::GeminiCli, &to_urls),
        )
        .await
        .expect("fetch pair");
        assert_eq!(source.documents, vec!["alpha"]);
        assert_eq!(target.format, Format::GeminiCli);
        assert_eq!(target.documents, vec!["bravo", "charlie"]);
    }
}
