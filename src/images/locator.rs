use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// `![alt](url)` — captures the URL.
static MARKDOWN_IMAGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"!\[.*?\]\((.*?)\)").expect("markdown image pattern is valid"));

/// `<img ... src="url">` with either quote style — captures the attribute value.
static HTML_IMAGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<img[^>]+src=["']([^"']+)["']"#).expect("html image pattern is valid")
});

/// URLs of Markdown-style images, in order of appearance.
pub fn markdown_image_urls(text: &str) -> Vec<String> {
    captures(&MARKDOWN_IMAGE, text)
}

/// URLs of `<img>` tags, in order of appearance.
pub fn html_image_urls(text: &str) -> Vec<String> {
    captures(&HTML_IMAGE, text)
}

/// All image URLs referenced in `text`, de-duplicated.
///
/// Markdown matches come first, then HTML matches; within each, order of
/// appearance. A URL seen twice keeps its first position.
pub fn locate(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    markdown_image_urls(text)
        .into_iter()
        .chain(html_image_urls(text))
        .filter(|url| seen.insert(url.clone()))
        .collect()
}

fn captures(pattern: &Regex, text: &str) -> Vec<String> {
    pattern
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|url| !url.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_images() {
        assert!(locate("").is_empty());
        assert!(locate("Fixes #12. No screenshots, sorry.").is_empty());
        // a plain link is not an image
        assert!(locate("[docs](https://example.com/docs)").is_empty());
    }

    #[test]
    fn test_markdown_images() {
        let urls = markdown_image_urls("![a](https://a/1.png) text ![](https://a/2.gif)");
        assert_eq!(urls, vec!["https://a/1.png", "https://a/2.gif"]);
    }

    #[test]
    fn test_html_images() {
        let urls = html_image_urls(
            r#"<img width="300" src="https://a/1.png"> and <img alt='x' src='https://a/2.jpg' />"#,
        );
        assert_eq!(urls, vec!["https://a/1.png", "https://a/2.jpg"]);
    }

    #[test]
    fn test_duplicate_across_patterns_collapses() {
        let urls = locate(r#"See ![x](https://a/b.png) and <img src="https://a/b.png">"#);
        assert_eq!(urls, vec!["https://a/b.png"]);
    }

    #[test]
    fn test_both_patterns_distinct_urls() {
        let urls = locate(r#"<img src="https://h/1.png"> then ![m](https://m/2.png)"#);
        assert_eq!(urls, vec!["https://m/2.png", "https://h/1.png"]);
    }

    #[test]
    fn test_malformed_markup_does_not_match() {
        assert!(locate(r#"<img src="https://a/b.png"#).is_empty());
        assert!(locate("![broken](https://a/b.png").is_empty());
        assert!(locate("<img>").is_empty());
    }
}
