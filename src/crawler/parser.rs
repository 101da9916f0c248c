//! HTML extractor for documentation pages
//!
//! This module turns rendered markup into structured text:
//! - Page title (first `<h1>`, then `<title>`)
//! - Main content with navigation and other page chrome excised
//! - Heading-delimited sections (`<h2>`/`<h3>`)
//! - Outbound links, resolved and normalized

use crate::crawler::FetchError;
use crate::url::resolve_href;
use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

/// Regions removed before any text is read
const BOILERPLATE: &str = "nav, footer, header, aside, script, style, noscript, template, \
     .navigation, .sidebar, .header, [role='navigation'], [role='banner']";

/// Main-content candidates, most specific first
const MAIN_CANDIDATES: &[&str] = &[
    "main",
    "article",
    "[role='main']",
    ".content",
    ".documentation",
    "#content",
    "body",
];

/// Elements whose boundaries separate words in extracted text
const BLOCK_TAGS: &[&str] = &[
    "address", "blockquote", "br", "dd", "details", "div", "dl", "dt", "figcaption", "figure",
    "form", "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "ol", "p", "pre", "section",
    "summary", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// A heading-delimited part of a page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub heading: String,
    pub content: String,
}

/// Structured text of one accepted page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub url: String,
    pub title: String,
    /// Whitespace-collapsed main-content text
    pub content: String,
    pub sections: Vec<Section>,
}

/// Outcome of content extraction
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Page has enough main content to be chunked
    Accepted(ExtractedPage),
    /// Page was too thin to keep (placeholder, redirect stub, empty shell)
    Rejected { content_len: usize },
}

impl Extraction {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Self::Accepted(_))
    }
}

/// Everything read from one rendered page
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    pub extraction: Extraction,
    /// Normalized absolute links in document order, without duplicates
    pub links: Vec<Url>,
}

/// Compiled selectors plus the acceptance threshold
pub struct Extractor {
    boilerplate: Selector,
    main_candidates: Vec<Selector>,
    section_heading: Selector,
    h1: Selector,
    title: Selector,
    anchor: Selector,
    base: Selector,
    min_content_length: usize,
}

impl Extractor {
    /// Builds an extractor that keeps pages with more than `min_content_length` characters
    pub fn new(min_content_length: usize) -> Result<Self, FetchError> {
        Ok(Self {
            boilerplate: compile(BOILERPLATE)?,
            main_candidates: MAIN_CANDIDATES
                .iter()
                .map(|css| compile(css))
                .collect::<Result<_, _>>()?,
            section_heading: compile("h2, h3")?,
            h1: compile("h1")?,
            title: compile("title")?,
            anchor: compile("a[href]")?,
            base: compile("base[href]")?,
            min_content_length,
        })
    }

    /// Extracts title, main text, sections and links from `html` served at `url`
    ///
    /// `url` must be the address the markup was finally served from (after
    /// redirects, trailing slash intact): relative links resolve against it,
    /// or against the document's `<base href>` when one is present.
    ///
    /// # Example
    ///
    /// ```
    /// use docsift::crawler::{Extraction, Extractor};
    /// use url::Url;
    ///
    /// let html = r#"<html><body><nav><a href="/a">A</a></nav>
    ///     <main><h1>Forms</h1><h2>Create</h2><p>Open the Form Builder.</p></main>
    ///     </body></html>"#;
    /// let url = Url::parse("https://docs.example.com/forms").unwrap();
    ///
    /// let parsed = Extractor::new(10).unwrap().extract(html, &url);
    /// let Extraction::Accepted(page) = parsed.extraction else { panic!() };
    /// assert_eq!(page.title, "Forms");
    /// assert_eq!(page.sections[0].heading, "Create");
    /// assert_eq!(parsed.links[0].as_str(), "https://docs.example.com/a");
    /// ```
    pub fn extract(&self, html: &str, url: &Url) -> ParsedDocument {
        let document = Html::parse_document(html);

        let base = self.document_base(&document, url);
        let links = self.extract_links(&document, &base);

        let main = self.select_main(&document);
        let content = main
            .map(|element| collapse_whitespace(&self.text_of(element)))
            .unwrap_or_default();
        let content_len = content.chars().count();

        if content_len <= self.min_content_length {
            tracing::debug!(
                "Rejecting {}: {} characters of main content (need more than {})",
                url,
                content_len,
                self.min_content_length
            );
            return ParsedDocument {
                extraction: Extraction::Rejected { content_len },
                links,
            };
        }

        let sections = main
            .map(|element| self.extract_sections(element))
            .unwrap_or_default();

        let page = ExtractedPage {
            url: url.to_string(),
            title: self.extract_title(&document),
            content,
            sections,
        };

        ParsedDocument {
            extraction: Extraction::Accepted(page),
            links,
        }
    }

    /// First `<h1>` with text, falling back to `<title>`
    fn extract_title(&self, document: &Html) -> String {
        let first_text = |selector: &Selector| {
            document
                .select(selector)
                .map(|element| collapse_whitespace(&element.text().collect::<String>()))
                .find(|text| !text.is_empty())
        };

        first_text(&self.h1)
            .or_else(|| first_text(&self.title))
            .unwrap_or_default()
    }

    /// First candidate region, in cascade order, that has text after excision
    fn select_main<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        for selector in &self.main_candidates {
            let found = document
                .select(selector)
                .filter(|element| !self.is_excised(*element))
                .find(|element| !collapse_whitespace(&self.text_of(*element)).is_empty());

            if found.is_some() {
                return found;
            }
        }

        let root = document.root_element();
        (!collapse_whitespace(&self.text_of(root)).is_empty()).then_some(root)
    }

    /// Every `<h2>`/`<h3>` starts a section running until the next one among its siblings
    fn extract_sections(&self, main: ElementRef<'_>) -> Vec<Section> {
        let mut sections = Vec::new();

        for heading in main.select(&self.section_heading) {
            if self.is_excised(heading) {
                continue;
            }

            let heading_text = collapse_whitespace(&self.text_of(heading));
            let mut body = String::new();

            for sibling in heading.next_siblings() {
                match sibling.value() {
                    Node::Text(text) => body.push_str(text),
                    Node::Element(_) => {
                        let Some(element) = ElementRef::wrap(sibling) else {
                            continue;
                        };
                        if self.section_heading.matches(&element) {
                            break;
                        }
                        body.push(' ');
                        self.collect_text(element, &mut body);
                        body.push(' ');
                    }
                    _ => {}
                }
            }

            let body = collapse_whitespace(&body);
            if !heading_text.is_empty() && !body.is_empty() {
                sections.push(Section {
                    heading: heading_text,
                    content: body,
                });
            }
        }

        sections
    }

    /// The URL relative hrefs resolve against
    fn document_base(&self, document: &Html, url: &Url) -> Url {
        document
            .select(&self.base)
            .next()
            .and_then(|element| element.value().attr("href"))
            .and_then(|href| url.join(href.trim()).ok())
            .filter(|base| matches!(base.scheme(), "http" | "https"))
            .unwrap_or_else(|| url.clone())
    }

    /// All anchors in the document, resolved against the base URL
    fn extract_links(&self, document: &Html, page_url: &Url) -> Vec<Url> {
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for element in document.select(&self.anchor) {
            if element.value().attr("download").is_some() {
                continue;
            }

            let Some(href) = element.value().attr("href") else {
                continue;
            };

            match resolve_href(href, page_url) {
                Ok(link) => {
                    if seen.insert(link.as_str().to_string()) {
                        links.push(link);
                    }
                }
                Err(e) => tracing::trace!("Skipping href {:?} on {}: {}", href, page_url, e),
            }
        }

        links
    }

    /// True if the element or one of its ancestors is page chrome
    fn is_excised(&self, element: ElementRef<'_>) -> bool {
        self.boilerplate.matches(&element)
            || element
                .ancestors()
                .filter_map(ElementRef::wrap)
                .any(|ancestor| self.boilerplate.matches(&ancestor))
    }

    fn text_of(&self, element: ElementRef<'_>) -> String {
        let mut out = String::new();
        self.collect_text(element, &mut out);
        out
    }

    /// Appends the element's text, skipping boilerplate subtrees
    fn collect_text(&self, element: ElementRef<'_>, out: &mut String) {
        if self.boilerplate.matches(&element) {
            return;
        }

        for child in element.children() {
            match child.value() {
                Node::Text(text) => out.push_str(text),
                Node::Element(data) => {
                    let Some(child_element) = ElementRef::wrap(child) else {
                        continue;
                    };
                    let is_block = BLOCK_TAGS.contains(&data.name());
                    if is_block {
                        out.push(' ');
                    }
                    self.collect_text(child_element, out);
                    if is_block {
                        out.push(' ');
                    }
                }
                _ => {}
            }
        }
    }
}

fn compile(css: &str) -> Result<Selector, FetchError> {
    Selector::parse(css).map_err(|e| FetchError::Extraction(format!("bad selector {css}: {e:?}")))
}

/// Collapses every whitespace run to one space and trims the ends
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url() -> Url {
        Url::parse("https://docs.example.com/guide/forms").unwrap()
    }

    fn accepted(html: &str) -> ExtractedPage {
        match Extractor::new(0).unwrap().extract(html, &url()).extraction {
            Extraction::Accepted(page) => page,
            other => panic!("expected accepted page, got {:?}", other),
        }
    }

    #[test]
    fn test_title_prefers_h1() {
        let page = accepted(
            "<html><head><title>Site | Forms</title></head><body><main><h1> Forms\n Guide </h1><p>text</p></main></body></html>",
        );
        assert_eq!(page.title, "Forms Guide");
    }

    #[test]
    fn test_title_falls_back_to_title_element() {
        let page = accepted(
            "<html><head><title>  Site | Forms </title></head><body><main><p>text</p></main></body></html>",
        );
        assert_eq!(page.title, "Site | Forms");
    }

    #[test]
    fn test_boilerplate_is_excised() {
        let page = accepted(
            r#"<html><body>
                <header>Top banner</header>
                <main>
                  <nav>Breadcrumbs</nav>
                  <p>Real content here.</p>
                  <div class="sidebar">Related links</div>
                  <script>var x = 1;</script>
                  <style>p { color: red }</style>
                </main>
                <footer>Copyright</footer>
            </body></html>"#,
        );
        assert_eq!(page.content, "Real content here.");
    }

    #[test]
    fn test_main_cascade_order() {
        let page = accepted(
            r#"<html><body>
                <div class="content">Generic container</div>
                <article>Article body</article>
            </body></html>"#,
        );
        assert_eq!(page.content, "Article body");
    }

    #[test]
    fn test_main_skips_empty_candidates() {
        let page = accepted(
            r#"<html><body>
                <main><nav>Only navigation</nav></main>
                <div role="main">Role main body</div>
            </body></html>"#,
        );
        assert_eq!(page.content, "Role main body");
    }

    #[test]
    fn test_falls_back_to_body() {
        let page = accepted("<html><body><div><p>Loose</p><p>text</p></div></body></html>");
        assert_eq!(page.content, "Loose text");
    }

    #[test]
    fn test_inline_elements_do_not_split_words() {
        let page = accepted("<html><body><main><p>Form<b>s</b> and <a href='x'>links</a></p></main></body></html>");
        assert_eq!(page.content, "Forms and links");
    }

    #[test]
    fn test_sections_split_on_h2_and_h3() {
        let page = accepted(
            r#"<html><body><main>
                <h1>Forms</h1>
                <p>Intro paragraph.</p>
                <h2>Creating a Form</h2>
                <p>Open the   Form Builder.</p>
                <ul><li>Step one</li><li>Step two</li></ul>
                <h3>Naming</h3>
                <p>Pick a name.</p>
                <h2>Empty</h2>
                <h2>Publishing</h2>
                <p>Click publish.</p>
            </main></body></html>"#,
        );

        let sections: Vec<(&str, &str)> = page
            .sections
            .iter()
            .map(|s| (s.heading.as_str(), s.content.as_str()))
            .collect();
        assert_eq!(
            sections,
            vec![
                ("Creating a Form", "Open the Form Builder. Step one Step two"),
                ("Naming", "Pick a name."),
                ("Publishing", "Click publish."),
            ]
        );
    }

    #[test]
    fn test_sections_only_inside_main() {
        let page = accepted(
            r#"<html><body>
                <aside><h2>Sidebar heading</h2><p>Sidebar text</p></aside>
                <main><h2>Inside</h2><p>Body</p></main>
            </body></html>"#,
        );
        assert_eq!(page.sections.len(), 1);
        assert_eq!(page.sections[0].heading, "Inside");
    }

    #[test]
    fn test_short_page_is_rejected_but_links_kept() {
        let html = r#"<html><body><main><p>Loading...</p><a href="/next">Next</a></main></body></html>"#;
        let parsed = Extractor::new(100).unwrap().extract(html, &url());

        // "Loading... Next"
        assert_eq!(parsed.extraction, Extraction::Rejected { content_len: 15 });
        assert_eq!(parsed.links.len(), 1);
        assert_eq!(parsed.links[0].as_str(), "https://docs.example.com/next");
    }

    #[test]
    fn test_acceptance_threshold_is_exclusive() {
        let html = "<html><body><main><p>0123456789</p></main></body></html>";
        assert!(!Extractor::new(10).unwrap().extract(html, &url()).extraction.is_accepted());
        assert!(Extractor::new(9).unwrap().extract(html, &url()).extraction.is_accepted());
    }

    #[test]
    fn test_links_are_resolved_and_deduplicated() {
        let html = r##"<html><body>
            <nav><a href="/api/">API</a></nav>
            <main>
              <a href="builder">Builder</a>
              <a href="builder#top">Builder again</a>
              <a href="https://other.example.org/page">Other</a>
              <a href="#local">Local</a>
              <a href="javascript:void(0)">JS</a>
              <a href="mailto:help@example.com">Mail</a>
              <a href="/files/guide.pdf" download>PDF</a>
            </main>
        </body></html>"##;

        let parsed = Extractor::new(0).unwrap().extract(html, &url());
        let links: Vec<&str> = parsed.links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/api",
                "https://docs.example.com/guide/builder",
                "https://other.example.org/page",
                "https://docs.example.com/guide/forms",
            ]
        );
    }

    #[test]
    fn test_relative_links_keep_directory_of_trailing_slash_page() {
        let html = r#"<html><body><main><a href="install">Install</a><a href="../faq">FAQ</a></main></body></html>"#;
        let page_url = Url::parse("https://docs.example.com/guide/").unwrap();

        let parsed = Extractor::new(0).unwrap().extract(html, &page_url);
        let links: Vec<&str> = parsed.links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/guide/install",
                "https://docs.example.com/faq",
            ]
        );
    }

    #[test]
    fn test_base_href_overrides_page_url() {
        let html = r#"<html><head><base href="/reference/v2/"></head>
            <body><main><a href="objects">Objects</a><a href="/top">Top</a></main></body></html>"#;

        let parsed = Extractor::new(0).unwrap().extract(html, &url());
        let links: Vec<&str> = parsed.links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/reference/v2/objects",
                "https://docs.example.com/top",
            ]
        );
    }

    #[test]
    fn test_non_http_base_href_is_ignored() {
        let html = r#"<html><head><base href="javascript:void(0)"></head>
            <body><main><a href="builder">Builder</a></main></body></html>"#;

        let parsed = Extractor::new(0).unwrap().extract(html, &url());
        assert_eq!(parsed.links[0].as_str(), "https://docs.example.com/guide/builder");
    }

    #[test]
    fn test_empty_document_is_rejected() {
        let parsed = Extractor::new(0).unwrap().extract("", &url());
        assert_eq!(parsed.extraction, Extraction::Rejected { content_len: 0 });
        assert!(parsed.links.is_empty());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("  a \n\t b  c "), "a b c");
        assert_eq!(collapse_whitespace(""), "");
    }
}
