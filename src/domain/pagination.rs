//! Pagination and sorting primitives shared by the repository and query layers.
//!
//! Mirrors the page contract the frontend already consumes: zero-based page
//! numbers, a bounded page size, and `content` / `totalElements` /
//! `totalPages` metadata on every response.

use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Sortable properties of an asset record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Id,
    CreatedAt,
    OriginalUrl,
    MediaUrl,
    #[serde(rename = "type")]
    Kind,
}

impl SortField {
    /// Parse a property name as sent by clients; unknown names fall back to `id`.
    pub fn from_property(name: &str) -> Self {
        match name.trim() {
            "createdAt" | "created_at" => Self::CreatedAt,
            "originalUrl" | "original_url" => Self::OriginalUrl,
            "mediaUrl" | "media_url" => Self::MediaUrl,
            "type" | "kind" => Self::Kind,
            _ => Self::Id,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    pub fn from_param(value: &str) -> Option<Self> {
        if value.trim().eq_ignore_ascii_case("asc") {
            Some(Self::Asc)
        } else if value.trim().eq_ignore_ascii_case("desc") {
            Some(Self::Desc)
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Sort {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Sort {
    pub const fn new(field: SortField, direction: SortDirection) -> Self {
        Self { field, direction }
    }

    /// Parse `"field"` or `"field,direction"`. A missing or unknown
    /// direction defaults to descending.
    pub fn parse(raw: &str) -> Self {
        let mut parts = raw.splitn(2, ',');
        let field = parts.next().map(SortField::from_property).unwrap_or_default();
        let direction = parts
            .next()
            .and_then(SortDirection::from_param)
            .unwrap_or_default();
        Self { field, direction }
    }
}

/// Requested slice of a result set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    /// Zero-based page index
    pub page: u32,
    pub size: u32,
    pub sort: Sort,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::of_size(DEFAULT_PAGE_SIZE)
    }
}

impl PageRequest {
    pub const fn new(page: u32, size: u32, sort: Sort) -> Self {
        Self { page, size, sort }
    }

    /// First page of `size` items, newest first.
    pub const fn of_size(size: u32) -> Self {
        Self {
            page: 0,
            size,
            sort: Sort::new(SortField::Id, SortDirection::Desc),
        }
    }

    /// Build from optional raw parameters, falling back to `default_size`
    /// and the default sort for anything missing. The size is normalized
    /// with [`PageRequest::clamped`].
    pub fn from_params(
        page: Option<u32>,
        size: Option<u32>,
        sort: Option<&str>,
        default_size: u32,
        max_size: u32,
    ) -> Self {
        Self {
            page: page.unwrap_or(0),
            size: size.unwrap_or(default_size),
            sort: sort
                .filter(|s| !s.trim().is_empty())
                .map(Sort::parse)
                .unwrap_or_default(),
        }
        .clamped(default_size, max_size)
    }

    /// A size of 0 falls back to `default_size`; anything above `max_size`
    /// is capped.
    #[must_use]
    pub fn clamped(self, default_size: u32, max_size: u32) -> Self {
        let size = match self.size {
            0 => default_size,
            n => n,
        };
        Self {
            size: size.min(max_size),
            ..self
        }
    }

    pub fn offset(&self) -> u64 {
        u64::from(self.page) * u64::from(self.size)
    }
}

/// A bounded, ordered slice of records plus total-count metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub total_elements: u64,
    pub total_pages: u64,
    pub number: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, total_elements: u64, request: &PageRequest) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            total_elements.div_ceil(u64::from(request.size))
        };
        Self {
            content,
            total_elements,
            total_pages,
            number: request.page,
            size: request.size,
        }
    }

    pub fn empty(request: &PageRequest) -> Self {
        Self::new(Vec::new(), 0, request)
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn has_next(&self) -> bool {
        u64::from(self.number) + 1 < self.total_pages
    }
}
