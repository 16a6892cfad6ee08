//! Link extraction from backend-supplied entities

use std::collections::HashSet;

use super::models::Link;

/// Keeps backend order, dropping an entity only when its resolved URL was already seen.
pub fn extract_links<I>(entities: I) -> Vec<Link>
where
    I: IntoIterator<Item = Link>,
{
    let mut seen = HashSet::new();
    entities
        .into_iter()
        .filter(|link| seen.insert(link.url.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(url: &str, tco: &str) -> Link {
        Link {
            url: url.to_string(),
            text: Some(url.trim_start_matches("https://").to_string()),
            tcourl: Some(tco.to_string()),
        }
    }

    #[test]
    fn preserves_backend_order() {
        let links = extract_links(vec![
            link("https://b.example", "https://t.co/b"),
            link("https://a.example", "https://t.co/a"),
        ]);
        let urls: Vec<_> = links.iter().map(|l| l.url.as_str()).collect();
        assert_eq!(urls, ["https://b.example", "https://a.example"]);
    }

    #[test]
    fn drops_repeated_url_keeping_first() {
        let links = extract_links(vec![
            link("https://a.example", "https://t.co/first"),
            link("https://b.example", "https://t.co/b"),
            link("https://a.example", "https://t.co/second"),
        ]);
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].tcourl.as_deref(), Some("https://t.co/first"));
        assert_eq!(links[1].url, "https://b.example");
    }

    #[test]
    fn empty_entities_yield_no_links() {
        assert!(extract_links(Vec::new()).is_empty());
    }
}
