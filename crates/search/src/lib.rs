//! Plain-text substring search over extracted document text.
//!
//! Matching is case-insensitive and overlap-inclusive: the scan cursor advances by one
//! character after every hit, so `"aa"` occurs twice in `"aaa"`.

mod error;
mod substring;

pub use dropbox_protocol::ContentMatch;
pub use error::{Result, SearchError};
pub use substring::{find_matches, fold_char, TextQuery};
