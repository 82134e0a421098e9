//! Media asset entity
//!
//! An `AssetRecord` is created by the extractor without an identity and only
//! gains one when the repository stores it. Once built, none of its fields
//! can be changed from outside the crate.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{AssetError, KindParseError};
use super::url_validator::UrlValidator;

/// Upper bound on stored media URL length (matches the storage column)
pub const MAX_MEDIA_URL_LEN: usize = 2048;

/// Closed set of asset kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Image => "IMAGE",
            Self::Video => "VIDEO",
        }
    }
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MediaKind {
    type Err = KindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("IMAGE") {
            Ok(Self::Image)
        } else if s.eq_ignore_ascii_case("VIDEO") {
            Ok(Self::Video)
        } else {
            Err(KindParseError(s.to_string()))
        }
    }
}

/// One image or video discovered on a scraped page
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetRecord {
    id: Option<i64>,
    original_url: String,
    media_url: String,
    #[serde(rename = "type")]
    kind: MediaKind,
    created_at: DateTime<Utc>,
}

impl AssetRecord {
    /// Build a transient record stamped with the current time.
    pub fn new(
        original_url: impl Into<String>,
        media_url: impl Into<String>,
        kind: MediaKind,
    ) -> Result<Self, AssetError> {
        Self::extracted_at(original_url, media_url, kind, Utc::now())
    }

    /// Build a transient record with an explicit extraction timestamp.
    pub fn extracted_at(
        original_url: impl Into<String>,
        media_url: impl Into<String>,
        kind: MediaKind,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AssetError> {
        let original_url = original_url.into();
        let media_url = media_url.into();

        if original_url.trim().is_empty() {
            return Err(AssetError::EmptyOriginalUrl);
        }
        if !UrlValidator::is_valid(Some(&media_url)) {
            return Err(AssetError::InvalidMediaUrl(media_url));
        }
        let len = media_url.chars().count();
        if len > MAX_MEDIA_URL_LEN {
            return Err(AssetError::MediaUrlTooLong {
                len,
                max: MAX_MEDIA_URL_LEN,
            });
        }

        Ok(Self {
            id: None,
            original_url,
            media_url,
            kind,
            created_at,
        })
    }

    /// Rehydrate a stored row. Invariants are re-checked so that a
    /// hand-edited database cannot smuggle invalid records into a page.
    pub(crate) fn stored(
        id: i64,
        original_url: String,
        media_url: String,
        kind: MediaKind,
        created_at: DateTime<Utc>,
    ) -> Result<Self, AssetError> {
        let mut record = Self::extracted_at(original_url, media_url, kind, created_at)?;
        record.id = Some(id);
        Ok(record)
    }

    /// Identity is assigned once; a second assignment is ignored.
    pub(crate) fn assign_id(&mut self, id: i64) {
        if self.id.is_none() {
            self.id = Some(id);
        }
    }

    pub fn id(&self) -> Option<i64> {
        self.id
    }

    pub fn original_url(&self) -> &str {
        &self.original_url
    }

    pub fn media_url(&self) -> &str {
        &self.media_url
    }

    pub fn kind(&self) -> MediaKind {
        self.kind
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }
}
