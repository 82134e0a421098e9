//! End-to-end scrape pipeline: submit, drain, query
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use media_scraper_lib::domain::errors::{FetchError, SubmitError};
use media_scraper_lib::infrastructure::http_client::{PageContent, PageFetcher};
use media_scraper_lib::infrastructure::memory_repository::InMemoryAssetRepository;
use media_scraper_lib::{AppConfig, AppState, MediaKind, MediaQuery, PageRequest};
use url::Url;

/// Serves canned markup per URL; anything else is a 404.
struct FixtureFetcher {
    pages: HashMap<&'static str, &'static str>,
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<PageContent, FetchError> {
        let body = self.pages.get(url).ok_or_else(|| FetchError::HttpStatus {
            url: url.to_string(),
            status: 404,
        })?;
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(PageContent::new(parsed, *body))
    }
}

fn state_with(pages: &[(&'static str, &'static str)]) -> AppState {
    let fetcher = FixtureFetcher {
        pages: pages.iter().copied().collect(),
    };
    AppState::with_components(
        Arc::new(fetcher),
        Arc::new(InMemoryAssetRepository::new()),
        AppConfig::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn relative_image_is_stored_absolute_and_found_by_origin() {
    let state = state_with(&[(
        "http://a.test/page1",
        r#"<html><body><img src="/logo.png"></body></html>"#,
    )]);

    let receipt = state
        .coordinator
        .submit(vec!["http://a.test/page1".to_string()])
        .unwrap();
    assert_eq!(receipt.accepted, 1);
    state.shutdown_executor().await;

    let query = MediaQuery::from_params(Some("IMAGE"), Some("a.test")).unwrap();
    let page = state
        .queries
        .query(&query, PageRequest::default())
        .await
        .unwrap();

    assert_eq!(page.total_elements, 1);
    let record = &page.content[0];
    assert_eq!(record.media_url(), "http://a.test/logo.png");
    assert_eq!(record.original_url(), "http://a.test/page1");
    assert_eq!(record.kind(), MediaKind::Image);
    assert!(record.id().is_some());
}

#[tokio::test]
async fn mixed_batch_keeps_successful_pages() {
    let state = state_with(&[
        (
            "http://a.test/gallery",
            r#"<img src="https://cdn.x/a.png"><img src="b.jpg">
               <video><source src="https://cdn.x/v.mp4"></video>"#,
        ),
        ("http://b.test/", r#"<img src="data:image/png;base64,AAAA">"#),
    ]);

    state
        .coordinator
        .submit(vec![
            "http://a.test/gallery".to_string(),
            "http://missing.test/".to_string(),
            "http://b.test/".to_string(),
        ])
        .unwrap();
    state.shutdown_executor().await;

    let all = state
        .queries
        .query(&MediaQuery::all(), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(all.total_elements, 3);

    let videos = state
        .queries
        .query(&MediaQuery::of_kind(MediaKind::Video), PageRequest::default())
        .await
        .unwrap();
    assert_eq!(videos.total_elements, 1);
    assert_eq!(videos.content[0].media_url(), "https://cdn.x/v.mp4");

    let media: Vec<_> = all.content.iter().map(|r| r.media_url()).collect();
    assert!(media.contains(&"http://a.test/b.jpg"));
}

#[tokio::test]
async fn empty_submission_is_a_caller_error() {
    let state = state_with(&[]);
    assert_eq!(
        state.coordinator.submit(Vec::new()),
        Err(SubmitError::EmptyBatch)
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn large_fan_out_completes() {
    let state = state_with(&[("http://a.test/p", r#"<img src="/x.png">"#)]);
    let urls = vec!["http://a.test/p".to_string(); 2_000];

    let receipt = state.coordinator.submit(urls).unwrap();
    assert_eq!(receipt.accepted, 2_000);
    state.shutdown_executor().await;

    let page = state
        .queries
        .query(&MediaQuery::all(), PageRequest::of_size(1))
        .await
        .unwrap();
    assert_eq!(page.total_elements, 2_000);
    assert_eq!(page.total_pages, 2_000);
}
