//! Mock PEP 503 simple index for testing listing and download behaviour.

use sha2::{Digest, Sha256};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Lowercase hex sha256 of `bytes`.
#[must_use]
pub fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// A file to list on a project page and serve for download.
#[derive(Debug, Clone)]
pub struct ListedFile {
    /// Filename shown as the anchor text.
    pub filename: String,
    /// File contents served at the download URL.
    pub body: Vec<u8>,
    /// Whether the anchor carries a `#sha256=` fragment.
    pub publish_hash: bool,
}

impl ListedFile {
    /// A listed file without a published hash.
    pub fn new(filename: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self {
            filename: filename.into(),
            body: body.into(),
            publish_hash: false,
        }
    }

    /// Publish the sha256 of the body in the anchor fragment.
    #[must_use]
    pub fn with_published_hash(mut self) -> Self {
        self.publish_hash = true;
        self
    }

    /// The sha256 of the body.
    #[must_use]
    pub fn sha256(&self) -> String {
        sha256_hex(&self.body)
    }
}

/// Mock simple index. Project pages live under `/simple/`, files under `/files/`.
#[derive(Debug)]
pub struct MockIndex {
    server: MockServer,
}

impl MockIndex {
    /// Start a new mock index.
    pub async fn start() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Index base URL, with trailing slash.
    #[must_use]
    pub fn index_url(&self) -> String {
        format!("{}/simple/", self.server.uri())
    }

    /// Download URL for a file.
    #[must_use]
    pub fn file_url(&self, filename: &str) -> String {
        format!("{}/files/{filename}", self.server.uri())
    }

    /// Register a project page listing `files` and serve each file.
    ///
    /// Links use absolute paths, so they resolve against the listing page.
    pub async fn register_project(&self, name: &str, files: &[ListedFile]) {
        let mut html = format!("<!DOCTYPE html>\n<html><body><h1>Links for {name}</h1>\n");
        for file in files {
            let fragment = if file.publish_hash {
                format!("#sha256={}", file.sha256())
            } else {
                String::new()
            };
            html.push_str(&format!(
                "<a href=\"/files/{0}{fragment}\">{0}</a><br/>\n",
                file.filename
            ));
            self.register_file(&file.filename, file.body.clone()).await;
        }
        html.push_str("</body></html>\n");
        self.register_page(name, html).await;
    }

    /// Serve a raw listing page for `name`.
    pub async fn register_page(&self, name: &str, html: impl Into<String>) {
        Mock::given(method("GET"))
            .and(path(format!("/simple/{name}/")))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "text/html")
                    .set_body_string(html.into()),
            )
            .mount(&self.server)
            .await;
    }

    /// Serve a file body at `/files/{filename}`.
    pub async fn register_file(&self, filename: &str, body: Vec<u8>) {
        Mock::given(method("GET"))
            .and(path(format!("/files/{filename}")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(body))
            .mount(&self.server)
            .await;
    }

    /// Answer requests for `name`'s page with `status`.
    pub async fn register_status(&self, name: &str, status: u16) {
        Mock::given(method("GET"))
            .and(path(format!("/simple/{name}/")))
            .respond_with(ResponseTemplate::new(status))
            .mount(&self.server)
            .await;
    }

    /// Answer the first `failures` requests for `path` with `status`; later
    /// requests fall through to whatever else is mounted.
    pub async fn register_transient_failure(&self, url_path: &str, status: u16, failures: u64) {
        Mock::given(method("GET"))
            .and(path(url_path.to_string()))
            .respond_with(ResponseTemplate::new(status))
            .up_to_n_times(failures)
            .with_priority(1)
            .mount(&self.server)
            .await;
    }

    /// Number of requests received for an exact path.
    pub async fn requests_for(&self, url_path: &str) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter(|request| request.url.path() == url_path)
            .count()
    }

    /// Total requests received.
    pub async fn received_requests(&self) -> usize {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .len()
    }
}
