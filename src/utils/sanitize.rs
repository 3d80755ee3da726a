use ammonia::Builder;
use maplit::hashset;
use once_cell::sync::Lazy;
use std::collections::HashMap;

static SANITIZER: Lazy<Builder<'static>> = Lazy::new(|| {
    let mut sanitizer = Builder::default();

    sanitizer.tags(hashset![
        "h1", "h2", "h3", "h4", "h5", "h6",
        "p", "br", "hr",
        "strong", "em", "u", "s", "code",
        "pre", "blockquote",
        "ul", "ol", "li",
        "a", "img", "span"
    ]);

    let mut tag_attrs = HashMap::new();
    tag_attrs.insert("a", hashset!["href", "title", "rel"]);
    tag_attrs.insert("img", hashset!["src", "alt", "title"]);
    tag_attrs.insert("span", hashset!["class"]);
    sanitizer.tag_attributes(tag_attrs);

    // ammonia requires link_rel(None) when "rel" is allowlisted on <a>;
    // clean() panics otherwise.
    sanitizer.link_rel(None);

    sanitizer
});

/// Cleans the rich-text HTML stored for checklist content and comment
/// bodies. Disallowed tags are stripped, not escaped, so the stored value
/// is always renderable as-is.
#[derive(Clone, Default)]
pub struct RichTextSanitizer {}

impl RichTextSanitizer {
    pub fn new() -> Self {
        Self {}
    }

    pub fn clean(&self, html: &str) -> String {
        SANITIZER.clean(html).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_list_markup() {
        let sanitizer = RichTextSanitizer::new();
        let html = "<ul><li>milk</li><li><strong>eggs</strong></li></ul>";
        assert_eq!(sanitizer.clean(html), html);
    }

    #[test]
    fn test_strips_scripts() {
        let sanitizer = RichTextSanitizer::new();
        let cleaned = sanitizer.clean("<p>before</p><script>alert(1)</script>");
        assert_eq!(cleaned, "<p>before</p>");
    }

    #[test]
    fn test_strips_event_handler_attributes() {
        let sanitizer = RichTextSanitizer::new();
        let cleaned = sanitizer.clean(r#"<p onclick="steal()">hello</p>"#);
        assert_eq!(cleaned, "<p>hello</p>");
    }
}
