//! Resolve a username or profile URL to a bare handle

use url::Url;

use crate::error::{Error, Result};

/// Returns the bare handle for `input`, which is either a handle (optionally `@`-prefixed)
/// or a profile URL whose first path segment is the handle.
///
/// `https://x.com/jack/status/20?s=20`, `twitter.com/jack`, `@jack` and `jack` all resolve to `jack`.
pub fn resolve(input: &str) -> Result<String> {
    let trimmed = input.trim();

    let candidate = if looks_like_url(trimmed) {
        handle_from_url(trimmed).unwrap_or_default()
    } else {
        trimmed.to_string()
    };
    let candidate = candidate.strip_prefix('@').unwrap_or(&candidate);

    if !is_valid_handle(candidate) {
        return Err(Error::InvalidHandle(input.to_string()));
    }

    Ok(candidate.to_string())
}

fn looks_like_url(input: &str) -> bool {
    input.contains("://")
        || input.contains('/')
        || input.contains("twitter.com")
        || input.contains("x.com")
}

fn handle_from_url(input: &str) -> Option<String> {
    let url = if input.contains("://") {
        Url::parse(input).ok()?
    } else {
        Url::parse(&format!("https://{input}")).ok()?
    };

    url.path_segments()?
        .find(|segment| !segment.is_empty())
        .map(str::to_string)
}

fn is_valid_handle(handle: &str) -> bool {
    !handle.is_empty()
        && handle
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_and_bare_handle_resolve_identically() {
        assert_eq!(resolve("https://twitter.com/elonmusk").unwrap(), "elonmusk");
        assert_eq!(resolve("elonmusk").unwrap(), "elonmusk");
    }

    #[test]
    fn strips_host_path_and_query() {
        assert_eq!(resolve("https://x.com/jack/status/20?s=20").unwrap(), "jack");
        assert_eq!(resolve("http://www.twitter.com/jack/").unwrap(), "jack");
        assert_eq!(resolve("twitter.com/jack?lang=en").unwrap(), "jack");
        assert_eq!(resolve("x.com/some_user#top").unwrap(), "some_user");
        assert_eq!(resolve("  @jack  ").unwrap(), "jack");
    }

    #[test]
    fn rejects_illegal_or_empty_handles() {
        for input in ["@@@", "", "   ", "https://twitter.com/", "bad-name", "two words", "x.com/a.b"] {
            match resolve(input) {
                Err(Error::InvalidHandle(original)) => assert_eq!(original, input),
                other => panic!("expected InvalidHandle for {input:?}, got {other:?}"),
            }
        }
    }
}
