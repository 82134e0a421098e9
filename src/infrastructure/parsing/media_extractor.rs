//! Image and video asset extraction from fetched pages
//!
//! Pure transformation over already-fetched markup: no network, no storage.
//! Malformed markup is never an error; html5ever recovers what it can and a
//! page without usable assets simply yields an empty list.

use chrono::Utc;
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use super::SelectorError;
use crate::domain::asset::{AssetRecord, MediaKind};
use crate::domain::url_validator::UrlValidator;
use crate::infrastructure::http_client::PageContent;

const IMAGE_SELECTOR: &str = "img[src]";
const VIDEO_SOURCE_SELECTOR: &str = "video source[src]";
const BASE_SELECTOR: &str = "base[href]";

/// Collects `<img src>` and `<video><source src>` URLs as asset records
#[derive(Debug, Clone)]
pub struct MediaExtractor {
    image_selector: Selector,
    video_source_selector: Selector,
    base_selector: Selector,
}

impl MediaExtractor {
    pub fn new() -> Result<Self, SelectorError> {
        Ok(Self {
            image_selector: compile(IMAGE_SELECTOR)?,
            video_source_selector: compile(VIDEO_SOURCE_SELECTOR)?,
            base_selector: compile(BASE_SELECTOR)?,
        })
    }

    /// Extract from a fetched page. `source_url` is recorded as each asset's
    /// origin; relative sources resolve against the page's final URL.
    pub fn extract(&self, source_url: &str, content: &PageContent) -> Vec<AssetRecord> {
        self.extract_html(source_url, &content.url, &content.body)
    }

    /// Extract from raw markup. Images come first, then video sources, each
    /// group in document order.
    pub fn extract_html(&self, source_url: &str, page_url: &Url, html: &str) -> Vec<AssetRecord> {
        let document = Html::parse_document(html);
        let base = self.document_base(&document, page_url);
        let extracted_at = Utc::now();

        let images = document
            .select(&self.image_selector)
            .map(|el| (MediaKind::Image, el.value().attr("src")));
        let videos = document
            .select(&self.video_source_selector)
            .map(|el| (MediaKind::Video, el.value().attr("src")));

        let mut records = Vec::new();
        for (kind, src) in images.chain(videos) {
            let resolved = resolve(&base, src);
            if !UrlValidator::is_valid(resolved.as_deref()) {
                continue;
            }
            let Some(media_url) = resolved else {
                continue;
            };

            match AssetRecord::extracted_at(source_url, media_url, kind, extracted_at) {
                Ok(record) => records.push(record),
                Err(e) => debug!("Skipping {} candidate on {}: {}", kind, source_url, e),
            }
        }

        debug!("Extracted {} assets from {}", records.len(), source_url);
        records
    }

    /// `<base href>` resolved against the page URL, or the page URL itself.
    fn document_base(&self, document: &Html, page_url: &Url) -> Url {
        document
            .select(&self.base_selector)
            .next()
            .and_then(|el| el.value().attr("href"))
            .map(str::trim)
            .filter(|href| !href.is_empty())
            .and_then(|href| page_url.join(href).ok())
            .unwrap_or_else(|| page_url.clone())
    }
}

fn compile(selector: &str) -> Result<Selector, SelectorError> {
    Selector::parse(selector).map_err(|e| SelectorError {
        selector: selector.to_string(),
        reason: e.to_string(),
    })
}

/// Absolute form of an attribute value, or `None` when it is blank or
/// cannot be joined to `base`.
fn resolve(base: &Url, raw: Option<&str>) -> Option<String> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    base.join(trimmed).ok().map(String::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> MediaExtractor {
        MediaExtractor::new().unwrap()
    }

    fn page(url: &str, body: &str) -> PageContent {
        PageContent::new(Url::parse(url).unwrap(), body)
    }

    #[test]
    fn collects_valid_image_and_video_skipping_empty_src() {
        let html = r#"
            <html><body>
              <img src="https://cdn.example.com/a.jpg">
              <img src="">
              <video controls><source src="https://cdn.example.com/clip.mp4" type="video/mp4"></video>
            </body></html>
        "#;
        let records = extractor().extract("https://example.com/post", &page("https://example.com/post", html));

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind(), MediaKind::Image);
        assert_eq!(records[0].media_url(), "https://cdn.example.com/a.jpg");
        assert_eq!(records[1].kind(), MediaKind::Video);
        assert_eq!(records[1].media_url(), "https://cdn.example.com/clip.mp4");
        assert!(records.iter().all(|r| r.original_url() == "https://example.com/post"));
        assert!(records.iter().all(|r| r.id().is_none()));
    }

    #[test]
    fn resolves_relative_sources_against_page_url() {
        let html = r#"<img src="/logo.png"><img src="img/hero.webp"><img src="//cdn.a.test/x.gif">"#;
        let records = extractor().extract("http://a.test/blog/page1", &page("http://a.test/blog/page1", html));

        let urls: Vec<&str> = records.iter().map(AssetRecord::media_url).collect();
        assert_eq!(
            urls,
            vec![
                "http://a.test/logo.png",
                "http://a.test/blog/img/hero.webp",
                "http://cdn.a.test/x.gif",
            ]
        );
    }

    #[test]
    fn honors_base_href() {
        let html = r#"<html><head><base href="https://static.a.test/assets/"></head>
                      <body><img src="pic.png"></body></html>"#;
        let records = extractor().extract("http://a.test/", &page("http://a.test/", html));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].media_url(), "https://static.a.test/assets/pic.png");
    }

    #[test]
    fn records_requested_url_but_resolves_against_redirect_target() {
        let html = r#"<img src="/logo.png">"#;
        let records = extractor().extract("http://a.test/old", &page("https://www.a.test/new", html));
        assert_eq!(records[0].original_url(), "http://a.test/old");
        assert_eq!(records[0].media_url(), "https://www.a.test/logo.png");
    }

    #[test]
    fn drops_data_uris_and_non_http_schemes() {
        let html = r#"
            <img src="data:image/gif;base64,R0lGODlhAQABAAAAACw=">
            <img src="ftp://files.a.test/x.png">
            <img src="   ">
            <img>
        "#;
        let records = extractor().extract("http://a.test/", &page("http://a.test/", html));
        assert!(records.is_empty());
    }

    #[test]
    fn ignores_sources_outside_video_elements() {
        let html = r#"
            <audio><source src="/song.mp3"></audio>
            <picture><source srcset="/a.webp"><img src="/a.jpg"></picture>
            <video src="/direct.mp4"></video>
        "#;
        let records = extractor().extract("http://a.test/", &page("http://a.test/", html));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].media_url(), "http://a.test/a.jpg");
    }

    #[test]
    fn images_precede_videos_and_keep_document_order() {
        let html = r#"
            <video><source src="/v1.mp4"></video>
            <img src="/i1.png">
            <video><source src="/v2.webm"><source src="/v2.mp4"></video>
            <img src="/i2.png">
        "#;
        let records = extractor().extract("http://a.test/", &page("http://a.test/", html));
        let urls: Vec<&str> = records.iter().map(AssetRecord::media_url).collect();
        assert_eq!(
            urls,
            vec![
                "http://a.test/i1.png",
                "http://a.test/i2.png",
                "http://a.test/v1.mp4",
                "http://a.test/v2.webm",
                "http://a.test/v2.mp4",
            ]
        );
    }

    #[test]
    fn malformed_markup_is_not_an_error() {
        let html = "<<<div><img src='/ok.png'<p>unterminated";
        let records = extractor().extract("http://a.test/", &page("http://a.test/", html));
        assert!(records.len() <= 1);

        let nothing = extractor().extract("http://a.test/", &page("http://a.test/", "plain text"));
        assert!(nothing.is_empty());
    }

    #[test]
    fn all_records_share_extraction_time() {
        let html = r#"<img src="/a.png"><img src="/b.png"><video><source src="/c.mp4"></video>"#;
        let records = extractor().extract("http://a.test/", &page("http://a.test/", html));
        assert_eq!(records.len(), 3);
        assert!(records.iter().all(|r| r.created_at() == records[0].created_at()));
    }
}
