//! Twitter domain models

mod criteria;
mod tweet;

pub use criteria::FilterCriteria;
pub use tweet::{Link, MediaItem, MediaKind, Tweet};
