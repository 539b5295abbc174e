//! Small helpers shared by the discovery pipeline.
//!
//! - **URL handling**: input validation, same-origin checks, path segments
//! - **Text**: sanitizing titles lifted out of arbitrary HTML

mod text;
mod url_validator;

pub use text::clean_title;
pub use url_validator::{is_same_origin, path_segments, validate_url, UrlValidationError};
