//! Noise filter for candidate asset URLs
//!
//! Only a non-blank string starting with `http` is required. URL syntax is
//! the resolver's concern, so `httpfoo://x` passes.

/// Scheme prefix every storable media URL must start with (case-sensitive)
pub const HTTP_PREFIX: &str = "http";

#[derive(Debug, Clone, Copy, Default)]
pub struct UrlValidator;

impl UrlValidator {
    /// Returns `true` when `candidate` is worth fetching or storing.
    ///
    /// `None`, empty and whitespace-only strings are rejected, as is any
    /// string that does not begin with `http` (`data:` URIs, `ftp://`,
    /// unresolved fragments, `HTTP://` in upper case).
    pub fn is_valid(candidate: Option<&str>) -> bool {
        match candidate {
            Some(url) => !url.trim().is_empty() && url.starts_with(HTTP_PREFIX),
            None => false,
        }
    }
}
