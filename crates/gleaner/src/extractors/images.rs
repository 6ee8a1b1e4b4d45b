// ABOUTME: Image link extraction from <img> tags in document order, resolved to absolute URLs.
// ABOUTME: Uses src with data-src as fallback and keeps at most MAX_IMAGES entries.

use scraper::{ElementRef, Html};
use url::Url;

use crate::extractors::select::select_all;
use crate::record::MAX_IMAGES;

/// `src`, or `data-src` when `src` is missing or blank.
fn image_source<'a>(img: &ElementRef<'a>) -> Option<&'a str> {
    ["src", "data-src"]
        .into_iter()
        .filter_map(|attr| img.value().attr(attr))
        .map(str::trim)
        .find(|v| !v.is_empty())
}

/// Resolves `src` against `base`; without a usable base only absolute sources survive.
fn absolutize(base: Option<&Url>, src: &str) -> Option<String> {
    let resolved = match base {
        Some(base) => base.join(src),
        None => Url::parse(src),
    };
    resolved.ok().map(|u| u.to_string())
}

/// Extracts up to [`MAX_IMAGES`] absolute image URLs in encounter order.
pub fn extract_images(doc: &Html, base_url: &str) -> Vec<String> {
    let base = Url::parse(base_url).ok();
    select_all(doc, "img")
        .iter()
        .filter_map(image_source)
        .filter_map(|src| absolutize(base.as_ref(), src))
        .take(MAX_IMAGES)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_resolves_relative_sources() {
        let doc = Html::parse_document(
            r#"<html><body>
                <img src="/images/hero.jpg">
                <img src="thumb.png">
                <img src="https://cdn.test/abs.gif">
            </body></html>"#,
        );
        assert_eq!(
            extract_images(&doc, "https://x.test/posts/a"),
            vec![
                "https://x.test/images/hero.jpg",
                "https://x.test/posts/thumb.png",
                "https://cdn.test/abs.gif",
            ]
        );
    }

    #[test]
    fn test_data_src_fallback_and_missing_sources_skipped() {
        let doc = Html::parse_document(
            r#"<html><body>
                <img alt="no source">
                <img src="" data-src="/lazy.jpg">
                <img data-src="/lazy2.jpg">
            </body></html>"#,
        );
        assert_eq!(
            extract_images(&doc, "https://x.test/"),
            vec!["https://x.test/lazy.jpg", "https://x.test/lazy2.jpg"]
        );
    }

    #[test]
    fn test_keeps_first_five_in_document_order() {
        let imgs: String = (1..=7).map(|i| format!(r#"<img src="/{i}.png">"#)).collect();
        let doc = Html::parse_document(&format!("<html><body>{imgs}</body></html>"));
        let found = extract_images(&doc, "https://x.test/a");
        assert_eq!(
            found,
            (1..=5)
                .map(|i| format!("https://x.test/{i}.png"))
                .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_unusable_base_keeps_only_absolute() {
        let doc = Html::parse_document(
            r#"<html><body><img src="/rel.png"><img src="https://cdn.test/a.png"></body></html>"#,
        );
        assert_eq!(extract_images(&doc, "not a url"), vec!["https://cdn.test/a.png"]);
    }

    #[test]
    fn test_no_images() {
        let doc = Html::parse_document("<html><body><p>text</p></body></html>");
        assert!(extract_images(&doc, "https://x.test/").is_empty());
    }
}
