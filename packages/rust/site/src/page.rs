//! Full HTML document shell shared by every generated page.

use crate::markdown::escape_html;

/// One navigation entry; links to `<slug>.html`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavLink<'a> {
    pub slug: &'a str,
    pub label: &'a str,
}

const STYLE: &str = "\
body{font-family:system-ui,Segoe UI,Arial,sans-serif;margin:0}
header{padding:16px 18px;border-bottom:1px solid #ccc;position:sticky;top:0;background:#fff}
main{max-width:980px;margin:0 auto;padding:18px}
nav a{margin-right:10px;text-decoration:none}
nav a[aria-current=page]{font-weight:600}
h2{margin-top:22px}
small{opacity:.7}";

/// Wrap `body_html` in a document with a sticky header, the site title and
/// navigation. The link for `active_slug` carries `aria-current="page"`.
pub fn render_page(title: &str, nav: &[NavLink<'_>], active_slug: &str, body_html: &str) -> String {
    let title = escape_html(title);
    let links: Vec<String> = nav
        .iter()
        .map(|link| {
            let current = if link.slug == active_slug {
                r#" aria-current="page""#
            } else {
                ""
            };
            format!(
                r#"<a href="{slug}.html"{current}>{label}</a>"#,
                slug = escape_html(link.slug),
                label = escape_html(link.label),
            )
        })
        .collect();

    format!(
        r#"<!doctype html>
<html lang="en"><head>
<meta charset="utf-8"/>
<meta name="viewport" content="width=device-width,initial-scale=1"/>
<title>{title}</title>
<style>
{STYLE}
</style>
</head>
<body>
<header>
  <div><strong>{title}</strong></div>
  <nav>{nav}</nav>
</header>
<main>
{body_html}
</main>
</body></html>
"#,
        nav = links.join(" "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    const NAV: &[NavLink<'static>] = &[
        NavLink { slug: "index", label: "Home" },
        NavLink { slug: "gigs", label: "Gigs" },
        NavLink { slug: "review", label: "Review" },
    ];

    fn select<'a>(doc: &'a Html, css: &str) -> Vec<scraper::ElementRef<'a>> {
        let selector = Selector::parse(css).expect("valid selector");
        doc.select(&selector).collect()
    }

    #[test]
    fn nav_links_every_page() {
        let doc = Html::parse_document(&render_page("Band Ops Hub", NAV, "gigs", "<p>x</p>"));
        let hrefs: Vec<&str> = select(&doc, "nav a")
            .iter()
            .filter_map(|a| a.value().attr("href"))
            .collect();
        assert_eq!(hrefs, ["index.html", "gigs.html", "review.html"]);
    }

    #[test]
    fn only_active_link_is_current() {
        let doc = Html::parse_document(&render_page("Band", NAV, "gigs", ""));
        let current = select(&doc, r#"nav a[aria-current="page"]"#);
        assert_eq!(current.len(), 1);
        assert_eq!(current[0].text().collect::<String>(), "Gigs");
    }

    #[test]
    fn title_is_escaped_and_body_embedded() {
        let html = render_page("Rock & <Roll>", NAV, "index", "<h2>Shows</h2>");
        let doc = Html::parse_document(&html);
        let title = select(&doc, "title");
        assert_eq!(title[0].text().collect::<String>(), "Rock & <Roll>");
        assert!(html.contains("Rock &amp; &lt;Roll&gt;"));
        assert_eq!(select(&doc, "main h2").len(), 1);
    }

    #[test]
    fn header_is_sticky() {
        let html = render_page("Band", NAV, "index", "");
        assert!(html.contains("position:sticky"));
    }
}
