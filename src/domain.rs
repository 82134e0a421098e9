//! Domain module - entities, value objects and repository contracts
//!
//! Each module is its own file in the domain/ directory; the commonly used
//! items are re-exported here.

pub mod asset;
pub mod errors;
pub mod pagination;
pub mod repositories;
pub mod url_validator;

pub use asset::{AssetRecord, MediaKind, MAX_MEDIA_URL_LEN};
pub use errors::{
    AssetError, FetchError, KindParseError, PersistenceError, QueryError, SubmitError,
};
pub use pagination::{Page, PageRequest, Sort, SortDirection, SortField};
pub use repositories::AssetRepository;
pub use url_validator::UrlValidator;
