//! Lenient sitemap XML extraction.
//!
//! Real-world sitemaps are frequently malformed, so extraction is
//! regex-based and forgiving: unparseable entries are dropped, unknown
//! elements are ignored. Both `<urlset>` entries and `<sitemapindex>`
//! child sitemaps are extracted.

use chrono::{DateTime, NaiveDate, Utc};
use regex::Regex;
use url::Url;

use crate::types::sitemap::{ChangeFrequency, CrawlUrl};

/// Parsed content of one sitemap document.
#[derive(Debug, Default)]
pub struct SitemapContent {
    /// Leaf crawl targets from `<url>` entries
    pub urls: Vec<CrawlUrl>,

    /// Child sitemaps from `<sitemap>` entries of a sitemap index
    pub nested: Vec<Url>,
}

/// Extracts URLs from sitemap XML.
pub struct SitemapParser {
    url_entry: Regex,
    sitemap_entry: Regex,
    loc: Regex,
    priority: Regex,
    changefreq: Regex,
    lastmod: Regex,
}

impl Default for SitemapParser {
    fn default() -> Self {
        Self::new()
    }
}

impl SitemapParser {
    pub fn new() -> Self {
        Self {
            url_entry: Regex::new(r"(?s)<url>(.*?)</url>").unwrap(),
            sitemap_entry: Regex::new(r"(?s)<sitemap>(.*?)</sitemap>").unwrap(),
            loc: Regex::new(r"(?s)<loc>\s*(.*?)\s*</loc>").unwrap(),
            priority: Regex::new(r"(?s)<priority>\s*(.*?)\s*</priority>").unwrap(),
            changefreq: Regex::new(r"(?s)<changefreq>\s*(.*?)\s*</changefreq>").unwrap(),
            lastmod: Regex::new(r"(?s)<lastmod>\s*(.*?)\s*</lastmod>").unwrap(),
        }
    }

    /// Parse a sitemap document into crawl targets and child sitemaps.
    pub fn parse(&self, xml: &str) -> SitemapContent {
        let mut content = SitemapContent::default();

        for entry in self.url_entry.captures_iter(xml) {
            let body = &entry[1];
            let Some(url) = self.extract_loc(body) else {
                continue;
            };

            let mut crawl_url = CrawlUrl::new(url);
            if let Some(priority) = self.extract(&self.priority, body) {
                if let Ok(priority) = priority.parse::<f64>() {
                    crawl_url = crawl_url.with_priority(priority);
                }
            }
            if let Some(changefreq) = self.extract(&self.changefreq, body) {
                if let Some(changefreq) = ChangeFrequency::parse(&changefreq) {
                    crawl_url = crawl_url.with_change_frequency(changefreq);
                }
            }
            if let Some(lastmod) = self.extract(&self.lastmod, body) {
                if let Some(lastmod) = parse_lastmod(&lastmod) {
                    crawl_url = crawl_url.with_last_modified(lastmod);
                }
            }
            content.urls.push(crawl_url);
        }

        for entry in self.sitemap_entry.captures_iter(xml) {
            if let Some(url) = self.extract_loc(&entry[1]) {
                content.nested.push(url);
            }
        }

        content
    }

    fn extract_loc(&self, body: &str) -> Option<Url> {
        let raw = self.extract(&self.loc, body)?;
        Url::parse(&decode_entities(&raw)).ok()
    }

    fn extract(&self, pattern: &Regex, body: &str) -> Option<String> {
        pattern.captures(body).map(|c| c[1].to_string())
    }
}

/// Parse a `<lastmod>` value: full W3C datetime or bare date.
fn parse_lastmod(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(datetime) = DateTime::parse_from_rfc3339(value) {
        return Some(datetime.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Decode the XML entities that legally occur inside `<loc>` values.
fn decode_entities(value: &str) -> String {
    value
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_urlset() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc>https://shop.example/</loc>
    <priority>1.0</priority>
    <changefreq>daily</changefreq>
    <lastmod>2024-05-01</lastmod>
  </url>
  <url>
    <loc>https://shop.example/products?page=1&amp;sort=name</loc>
  </url>
</urlset>"#;

        let content = SitemapParser::new().parse(xml);
        assert!(content.nested.is_empty());
        assert_eq!(content.urls.len(), 2);

        let first = &content.urls[0];
        assert_eq!(first.url().as_str(), "https://shop.example/");
        assert_eq!(first.priority(), 1.0);
        assert_eq!(first.change_frequency(), Some(ChangeFrequency::Daily));
        assert!(first.last_modified().is_some());

        let second = &content.urls[1];
        assert_eq!(
            second.url().as_str(),
            "https://shop.example/products?page=1&sort=name"
        );
        assert_eq!(second.priority(), 0.5);
    }

    #[test]
    fn test_parse_sitemap_index() {
        let xml = r#"<sitemapindex>
  <sitemap><loc>https://shop.example/sitemap-pages.xml</loc></sitemap>
  <sitemap><loc>https://shop.example/sitemap-products.xml</loc></sitemap>
</sitemapindex>"#;

        let content = SitemapParser::new().parse(xml);
        assert!(content.urls.is_empty());
        assert_eq!(
            content
                .nested
                .iter()
                .map(Url::as_str)
                .collect::<Vec<_>>(),
            vec![
                "https://shop.example/sitemap-pages.xml",
                "https://shop.example/sitemap-products.xml"
            ]
        );
    }

    #[test]
    fn test_malformed_entries_are_dropped() {
        let xml = r#"<urlset>
  <url><loc>not a url</loc></url>
  <url></url>
  <url><loc>https://shop.example/ok</loc><priority>abc</priority></url>
</urlset>"#;

        let content = SitemapParser::new().parse(xml);
        assert_eq!(content.urls.len(), 1);
        assert_eq!(content.urls[0].url().as_str(), "https://shop.example/ok");
        assert_eq!(content.urls[0].priority(), 0.5);
    }

    #[test]
    fn test_lastmod_formats() {
        assert!(parse_lastmod("2024-05-01").is_some());
        assert!(parse_lastmod("2024-05-01T12:30:00+02:00").is_some());
        assert!(parse_lastmod("yesterday").is_none());
    }
}
