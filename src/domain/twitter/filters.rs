//! Inclusion/exclusion predicates over a single tweet

use super::models::{FilterCriteria, Tweet};

/// Whether `tweet` passes every active switch in `criteria`.
pub fn matches(tweet: &Tweet, criteria: &FilterCriteria) -> bool {
    if !criteria.include_retweets && tweet.is_retweet {
        return false;
    }
    if criteria.exclude_pinned && tweet.is_pinned {
        return false;
    }
    if criteria.only_media && tweet.media.is_empty() {
        return false;
    }
    if criteria.only_links && tweet.links.is_empty() {
        return false;
    }
    true
}
