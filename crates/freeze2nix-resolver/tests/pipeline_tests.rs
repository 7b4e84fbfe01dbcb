//! Resolution against a mock simple index with real clients.

use std::time::Duration;

use freeze2nix_core::TagSet;
use freeze2nix_downloader::{DownloadConfig, HashResolver};
use freeze2nix_lockfile::{DependencyGraph, parse_lockfile};
use freeze2nix_repository::{IndexConfig, SimpleIndexClient};
use freeze2nix_resolver::{ArtifactFormat, ArtifactSelector, ResolveError, Resolver, ResolverConfig};
use freeze2nix_test_utils::{Fixtures, ListedFile, MockIndex, sha256_hex};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

async fn resolver(index: &MockIndex, cache: &TempDir) -> Resolver<SimpleIndexClient, HashResolver> {
    let index_config = IndexConfig::builder()
        .index_url(&index.index_url())
        .unwrap()
        .max_retries(0)
        .build();
    let download_config = DownloadConfig::builder()
        .cache_dir(cache.path())
        .max_retries(0)
        .retry_base_delay(Duration::from_millis(1))
        .build();
    Resolver::new(
        SimpleIndexClient::with_config(index_config).unwrap(),
        HashResolver::new(download_config).unwrap(),
        ArtifactSelector::new(TagSet::parse(["cp311-cp311-manylinux_x86_64", "py3-none-any"]).unwrap()),
        ResolverConfig::default().with_max_concurrent(4),
    )
}

#[tokio::test]
async fn resolves_the_requests_closure() {
    let index = MockIndex::start().await;
    for (name, file) in [
        ("certifi", "certifi-2023.7.22-py3-none-any.whl"),
        ("charset-normalizer", "charset_normalizer-3.2.0-cp311-cp311-manylinux_x86_64.whl"),
        ("idna", "idna-3.4-py3-none-any.whl"),
        ("urllib3", "urllib3-2.0.4-py3-none-any.whl"),
    ] {
        index
            .register_project(name, &[ListedFile::new(file, file.as_bytes().to_vec()).with_published_hash()])
            .await;
    }
    index
        .register_project(
            "requests",
            &[
                ListedFile::new("requests-2.31.0-cp27-none-any.whl", b"old".to_vec()),
                ListedFile::new("requests-2.31.0.tar.gz", b"requests sdist".to_vec()),
            ],
        )
        .await;

    let cache = TempDir::new().unwrap();
    let graph = DependencyGraph::build(parse_lockfile(Fixtures::requests_lockfile()).unwrap()).unwrap();
    let order = graph.emission_order().unwrap();
    let resolved = resolver(&index, &cache)
        .await
        .resolve_all(&order, |_, _, _| {})
        .await
        .unwrap();

    let names: Vec<_> = resolved.iter().map(|p| p.name.to_string()).collect();
    assert_eq!(names, ["certifi", "charset-normalizer", "idna", "urllib3", "requests"]);

    let requests = &resolved[4];
    assert_eq!(requests.format, ArtifactFormat::Setuptools);
    assert_eq!(requests.sha256, sha256_hex(b"requests sdist"));
    assert_eq!(requests.artifact.url.as_str(), index.file_url("requests-2.31.0.tar.gz"));
    assert!(cache.path().join("requests-2.31.0.tar.gz").exists());

    assert_eq!(resolved[1].format, ArtifactFormat::Wheel);
    assert_eq!(
        resolved[1].sha256,
        sha256_hex(b"charset_normalizer-3.2.0-cp311-cp311-manylinux_x86_64.whl")
    );
    // Published hashes mean wheels are never downloaded.
    assert_eq!(
        index.requests_for("/files/idna-3.4-py3-none-any.whl").await,
        0
    );
}

#[tokio::test]
async fn unlisted_version_is_missing() {
    let index = MockIndex::start().await;
    index
        .register_project("six", &[ListedFile::new("six-1.15.0.tar.gz", b"x".to_vec())])
        .await;
    index
        .register_project("python-dateutil", &[ListedFile::new("python-dateutil-2.8.2.tar.gz", b"y".to_vec())])
        .await;

    let cache = TempDir::new().unwrap();
    let graph = DependencyGraph::build(parse_lockfile(Fixtures::hashed_lockfile()).unwrap()).unwrap();
    let order = graph.emission_order().unwrap();
    let err = resolver(&index, &cache)
        .await
        .resolve_all(&order, |_, _, _| {})
        .await
        .unwrap_err();
    assert!(matches!(err, ResolveError::MissingArtifact { ref requirement } if requirement == "six==1.16.0"));
}
