//! RSS 2.0 feed of the investigations catalog

use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;

use om_common::articles::{Article, ARTICLES};

use crate::AppState;

pub const FEED_TITLE: &str = "OpenMedicaid — Investigations";
pub const FEED_DESCRIPTION: &str = "Data-driven investigations into $1.09 trillion in Medicaid spending";
/// Every catalog article shares one publication date
pub const PUB_DATE: &str = "Thu, 19 Feb 2026 12:00:00 GMT";

pub(crate) const XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

pub(crate) fn xml_escape(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// Wrap text in a CDATA section, splitting any embedded terminator
fn cdata(text: &str) -> String {
    format!("<![CDATA[{}]]>", text.replace("]]>", "]]]]><![CDATA[>"))
}

/// Render the feed document for `site_url` (no trailing slash)
pub fn render_feed(site_url: &str, articles: &[Article]) -> String {
    let site = xml_escape(site_url);
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<rss version=\"2.0\" xmlns:atom=\"http://www.w3.org/2005/Atom\">\n");
    out.push_str("  <channel>\n");
    out.push_str(&format!("    <title>{}</title>\n", xml_escape(FEED_TITLE)));
    out.push_str(&format!("    <link>{}</link>\n", site));
    out.push_str(&format!("    <description>{}</description>\n", xml_escape(FEED_DESCRIPTION)));
    out.push_str("    <language>en-us</language>\n");
    out.push_str(&format!("    <lastBuildDate>{}</lastBuildDate>\n", PUB_DATE));
    out.push_str(&format!(
        "    <atom:link href=\"{}/feed.xml\" rel=\"self\" type=\"application/rss+xml\" />\n",
        site
    ));

    for article in articles {
        let link = format!("{}/insights/{}", site, xml_escape(article.slug));
        out.push_str("    <item>\n");
        out.push_str(&format!("      <title>{}</title>\n", cdata(article.title)));
        out.push_str(&format!("      <link>{}</link>\n", link));
        out.push_str(&format!("      <description>{}</description>\n", cdata(article.description)));
        out.push_str(&format!("      <pubDate>{}</pubDate>\n", PUB_DATE));
        out.push_str(&format!("      <guid>{}</guid>\n", link));
        out.push_str("    </item>\n");
    }

    out.push_str("  </channel>\n");
    out.push_str("</rss>\n");
    out
}

/// GET /feed.xml
pub async fn rss_feed(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, XML_CONTENT_TYPE)],
        render_feed(&state.config.site_url, ARTICLES),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_item_per_article() {
        let xml = render_feed("https://example.org", ARTICLES);
        assert_eq!(xml.matches("<item>").count(), ARTICLES.len());
        assert!(xml.contains("<atom:link href=\"https://example.org/feed.xml\""));
        assert!(xml.contains(&format!("<pubDate>{}</pubDate>", PUB_DATE)));
    }

    #[test]
    fn test_item_link_and_guid() {
        let article = Article {
            slug: "test-story",
            title: "A <b> & C",
            description: "Ends with ]]> here",
            related: &[],
        };
        let xml = render_feed("https://example.org", &[article]);
        assert!(xml.contains("<link>https://example.org/insights/test-story</link>"));
        assert!(xml.contains("<guid>https://example.org/insights/test-story</guid>"));
        assert!(xml.contains("<title><![CDATA[A <b> & C]]></title>"));
        assert!(!xml.contains("Ends with ]]> here"));
    }

    #[test]
    fn test_xml_escape() {
        assert_eq!(xml_escape("a&b<c>\"'"), "a&amp;b&lt;c&gt;&quot;&apos;");
    }
}
