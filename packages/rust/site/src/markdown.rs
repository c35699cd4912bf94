//! Line-oriented Markdown to HTML.
//!
//! Supports headings (`#`, `##`, `###`), bullet lists (`- ` or `* `) and
//! paragraphs. Inside a line, `**bold**` and `[label](http...)` links are
//! rendered; everything else is escaped text.

use std::sync::LazyLock;

use regex::Regex;

/// Escape `& < > "` for use in element text or attribute values.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text with inline links and bold applied.
fn inline(text: &str) -> String {
    static LINK_RE: LazyLock<Regex> = LazyLock::new(|| {
        Regex::new(r"\[([^\]\n]+)\]\((https?://[^\s)]+)\)").expect("valid regex")
    });
    static BOLD_RE: LazyLock<Regex> =
        LazyLock::new(|| Regex::new(r"\*\*([^*\n]+)\*\*").expect("valid regex"));

    let escaped = escape_html(text);
    let linked = LINK_RE.replace_all(&escaped, r#"<a href="$2">$1</a>"#);
    BOLD_RE.replace_all(&linked, "<strong>$1</strong>").into_owned()
}

/// Convert generator Markdown to an HTML fragment, one block per line.
pub fn markdown_to_html(md: &str) -> String {
    let mut html: Vec<String> = Vec::new();
    let mut in_list = false;

    for line in md.lines() {
        let item = line.strip_prefix("- ").or_else(|| line.strip_prefix("* "));
        if let Some(item) = item {
            if !in_list {
                html.push("<ul>".into());
                in_list = true;
            }
            html.push(format!("<li>{}</li>", inline(item)));
            continue;
        }

        if in_list {
            html.push("</ul>".into());
            in_list = false;
        }

        if let Some(text) = line.strip_prefix("### ") {
            html.push(format!("<h3>{}</h3>", inline(text)));
        } else if let Some(text) = line.strip_prefix("## ") {
            html.push(format!("<h2>{}</h2>", inline(text)));
        } else if let Some(text) = line.strip_prefix("# ") {
            html.push(format!("<h1>{}</h1>", inline(text)));
        } else if !line.trim().is_empty() {
            html.push(format!("<p>{}</p>", inline(line)));
        }
    }

    if in_list {
        html.push("</ul>".into());
    }
    html.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs() {
        let html = markdown_to_html("# Gigs\n## Upcoming\n### March\nLoad-in at 6");
        assert_eq!(
            html,
            "<h1>Gigs</h1>\n<h2>Upcoming</h2>\n<h3>March</h3>\n<p>Load-in at 6</p>"
        );
    }

    #[test]
    fn consecutive_items_share_a_list() {
        let html = markdown_to_html("- PA\n* cables\n\n- drum rug");
        assert_eq!(
            html,
            "<ul>\n<li>PA</li>\n<li>cables</li>\n</ul>\n<ul>\n<li>drum rug</li>\n</ul>"
        );
    }

    #[test]
    fn heading_closes_open_list() {
        let html = markdown_to_html("- a\n## Next");
        assert_eq!(html, "<ul>\n<li>a</li>\n</ul>\n<h2>Next</h2>");
    }

    #[test]
    fn text_is_escaped() {
        let html = markdown_to_html("Tom & Jerry say \"<hi>\"");
        assert_eq!(html, "<p>Tom &amp; Jerry say &quot;&lt;hi&gt;&quot;</p>");
    }

    #[test]
    fn inline_links_and_bold() {
        let html = markdown_to_html("- **Demo**: [listen](https://example.com/a?b=1&c=2)");
        assert_eq!(
            html,
            "<ul>\n<li><strong>Demo</strong>: <a href=\"https://example.com/a?b=1&amp;c=2\">listen</a></li>\n</ul>"
        );
    }

    #[test]
    fn script_links_are_not_rendered() {
        let html = markdown_to_html("[x](javascript:alert(1))");
        assert!(!html.contains("<a "));
    }

    #[test]
    fn empty_input_is_empty() {
        assert_eq!(markdown_to_html(""), "");
        assert_eq!(markdown_to_html("\n\n"), "");
    }
}
