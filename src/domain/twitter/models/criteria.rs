//! Filter criteria applied to fetched tweets

/// Independent switches combined with logical AND.
///
/// Defaults exclude retweets but keep pinned tweets; callers rely on that asymmetry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub include_retweets: bool,
    pub exclude_pinned: bool,
    pub only_media: bool,
    pub only_links: bool,
}

impl FilterCriteria {
    /// Human-readable summary, e.g. "excluding retweets, only with media"
    pub fn describe(&self) -> String {
        let mut parts = Vec::new();
        if !self.include_retweets {
            parts.push("excluding retweets");
        }
        if self.exclude_pinned {
            parts.push("excluding pinned tweets");
        }
        if self.only_media {
            parts.push("only with media");
        }
        if self.only_links {
            parts.push("only with links");
        }

        if parts.is_empty() {
            "no filters".to_string()
        } else {
            parts.join(", ")
        }
    }
}
