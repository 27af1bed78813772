//! Visible-text extraction from raw HTML.
//!
//! A regex-substitution pass, not a real HTML parser: good enough for
//! feeding page copy to a language model. Script, style, nav, footer, and
//! header blocks are dropped wholesale, remaining markup collapses to
//! whitespace, a fixed set of entities is decoded, and whitespace runs are
//! squashed. Entity decoding runs last, after tag stripping.

use regex::Regex;
use std::sync::LazyLock;

/// Elements whose entire content is removed, not just the tags.
static BLOCK_STRIPPERS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    ["script", "style", "nav", "footer", "header"]
        .iter()
        .map(|tag| {
            // (?is): case-insensitive, dot matches newlines; non-greedy so
            // sibling blocks are stripped independently.
            Regex::new(&format!(r"(?is)<{tag}[^>]*>.*?</{tag}>")).unwrap()
        })
        .collect()
});

static TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]+>").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// Extract whitespace-normalized visible text from HTML markup.
pub fn extract_visible_text(html: &str) -> String {
    let mut text = html.to_string();

    for stripper in BLOCK_STRIPPERS.iter() {
        text = stripper.replace_all(&text, " ").into_owned();
    }

    let text = TAG.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    let text = text.trim();

    // Only these five entities are decoded; the model copes with the rest.
    text.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_block_elements_entirely() {
        let html = r#"<html>
            <header>SiteHeaderText</header>
            <nav><a href="/">NavLinkText</a></nav>
            <script>var secret = "ScriptBodyText";</script>
            <style>.cls { color: red; } /* StyleBodyText */</style>
            <main><p>We build rockets.</p></main>
            <footer>FooterCopyrightText</footer>
        </html>"#;

        let text = extract_visible_text(html);
        assert!(text.contains("We build rockets."));
        assert!(!text.contains("SiteHeaderText"));
        assert!(!text.contains("NavLinkText"));
        assert!(!text.contains("ScriptBodyText"));
        assert!(!text.contains("StyleBodyText"));
        assert!(!text.contains("FooterCopyrightText"));
    }

    #[test]
    fn test_strips_uppercase_and_attributed_tags() {
        let html = r#"<SCRIPT type="text/javascript">hidden()</SCRIPT><p>visible</p>"#;
        let text = extract_visible_text(html);
        assert_eq!(text, "visible");
    }

    #[test]
    fn test_strips_multiline_blocks() {
        let html = "<script>\nline1\nline2\n</script><div>kept</div>";
        assert_eq!(extract_visible_text(html), "kept");
    }

    #[test]
    fn test_sibling_blocks_stripped_independently() {
        let html = "<script>a</script><p>between</p><script>b</script>";
        assert_eq!(extract_visible_text(html), "between");
    }

    #[test]
    fn test_decodes_five_entities() {
        let html = "<p>R&amp;D &lt;at&gt; &quot;scale&quot; isn&#39;t easy</p>";
        assert_eq!(extract_visible_text(html), "R&D <at> \"scale\" isn't easy");
    }

    #[test]
    fn test_collapses_whitespace() {
        let html = "<div>alpha</div>\n\n\t  <div>beta\n\tgamma</div>";
        assert_eq!(extract_visible_text(html), "alpha beta gamma");
    }

    #[test]
    fn test_idempotent() {
        let html = "<header>x</header><p>Platform &amp; tools for teams</p>";
        let once = extract_visible_text(html);
        let twice = extract_visible_text(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_plain_text_passthrough() {
        assert_eq!(extract_visible_text("just words"), "just words");
        assert_eq!(extract_visible_text(""), "");
    }
}
