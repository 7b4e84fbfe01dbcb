//! Listing fetches against a mock simple index.

use std::time::Duration;

use freeze2nix_core::PackageName;
use freeze2nix_repository::{IndexConfig, PackageIndex, RepositoryError, SimpleIndexClient};
use freeze2nix_test_utils::{ListedFile, MockIndex};
use pretty_assertions::assert_eq;

fn client(index: &MockIndex, retries: usize) -> SimpleIndexClient {
    let config = IndexConfig::builder()
        .index_url(&index.index_url())
        .unwrap()
        .max_retries(retries)
        .retry_delay(Duration::from_millis(1))
        .build();
    SimpleIndexClient::with_config(config).unwrap()
}

fn name(s: &str) -> PackageName {
    s.parse().unwrap()
}

#[tokio::test]
async fn fetches_and_resolves_listing() {
    let index = MockIndex::start().await;
    let sdist = ListedFile::new("six-1.16.0.tar.gz", b"sdist".to_vec()).with_published_hash();
    let wheel = ListedFile::new("six-1.16.0-py2.py3-none-any.whl", b"wheel".to_vec());
    index.register_project("six", &[sdist.clone(), wheel]).await;

    let artifacts = client(&index, 0).artifacts(&name("Six")).await.unwrap();

    assert_eq!(artifacts.len(), 2);
    assert_eq!(artifacts[0].filename, "six-1.16.0.tar.gz");
    assert_eq!(artifacts[0].url.as_str(), index.file_url("six-1.16.0.tar.gz"));
    assert_eq!(artifacts[0].sha256.as_deref(), Some(sdist.sha256().as_str()));
    assert_eq!(artifacts[1].sha256, None);
}

#[tokio::test]
async fn relative_links_resolve_against_the_page() {
    let index = MockIndex::start().await;
    index
        .register_page(
            "zope-interface",
            r#"<a href="../../files/zope.interface-6.0.tar.gz">zope.interface-6.0.tar.gz</a>"#,
        )
        .await;

    let artifacts = client(&index, 0)
        .artifacts(&name("zope.interface"))
        .await
        .unwrap();
    assert_eq!(
        artifacts[0].url.as_str(),
        index.file_url("zope.interface-6.0.tar.gz")
    );
}

#[tokio::test]
async fn missing_project_is_unavailable_without_retry() {
    let index = MockIndex::start().await;
    index.register_status("nope", 404).await;

    let err = client(&index, 3).artifacts(&name("nope")).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(index.requests_for("/simple/nope/").await, 1);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let index = MockIndex::start().await;
    index
        .register_project("six", &[ListedFile::new("six-1.16.0.tar.gz", b"x".to_vec())])
        .await;
    index.register_transient_failure("/simple/six/", 503, 2).await;

    let client = client(&index, 2);
    let artifacts = client.artifacts(&name("six")).await.unwrap();
    assert_eq!(artifacts.len(), 1);
    assert_eq!(index.requests_for("/simple/six/").await, 3);
    assert_eq!(client.stats().retries.load(std::sync::atomic::Ordering::Relaxed), 2);
}

#[tokio::test]
async fn retries_exhaust_into_unavailable() {
    let index = MockIndex::start().await;
    index.register_status("six", 502).await;

    let err = client(&index, 1).artifacts(&name("six")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Unavailable { status: Some(502), .. }));
    assert_eq!(index.requests_for("/simple/six/").await, 2);
}

#[tokio::test]
async fn anchor_without_href_fails_the_listing() {
    let index = MockIndex::start().await;
    index.register_page("six", "<a>six-1.16.0.tar.gz</a>").await;

    let err = client(&index, 0).artifacts(&name("six")).await.unwrap_err();
    assert!(matches!(err, RepositoryError::Format { .. }));
}

#[tokio::test]
async fn unreachable_index() {
    let config = IndexConfig::builder()
        .index_url("http://127.0.0.1:9/simple")
        .unwrap()
        .max_retries(0)
        .connect_timeout(Duration::from_millis(200))
        .build();
    let client = SimpleIndexClient::with_config(config).unwrap();
    let err = client.artifacts(&name("six")).await.unwrap_err();
    let core: freeze2nix_core::Error = err.into();
    assert_eq!(core.code(), freeze2nix_core::ErrorCode::E0201);
}
