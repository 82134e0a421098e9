//! HTML parsing for scraped pages

use thiserror::Error;

pub mod media_extractor;

pub use media_extractor::MediaExtractor;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Invalid CSS selector: {selector} - {reason}")]
pub struct SelectorError {
    pub selector: String,
    pub reason: String,
}
