//! Text extraction from fetched pages.
//!
//! Both helpers are deliberately naive: headlines are whatever the selector
//! matches within the length window, and article text is the first
//! `<article>`, `<main>` or `<body>` block that carries enough text.

use scraper::{ElementRef, Html, Selector};

use crate::error::{PipelineError, Result};
use crate::models::{HEADLINE_MAX_EXCLUSIVE, HEADLINE_MIN_EXCLUSIVE, MAX_HEADLINES_PER_SOURCE};

/// Elements whose text never counts as article content.
const STRIPPED_ELEMENTS: &[&str] = &["script", "style", "nav", "footer", "header", "aside"];

/// Elements that end a run of text. Inline markup such as `<b>` or `<a>`
/// joins its text to the neighbouring words unchanged.
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption", "figure",
    "h1", "h2", "h3", "h4", "h5", "h6", "hr", "li", "main", "ol", "p", "pre", "section", "table",
    "td", "th", "tr", "ul",
];

/// Candidate containers for article text, tried in order.
const ARTICLE_CANDIDATES: &[&str] = &["article", "main"];

const MIN_ARTICLE_LEN: usize = 100;

/// Pull candidate headlines out of `html` using a CSS `selector`.
///
/// Returns at most ten trimmed strings whose length is strictly between 20
/// and 200 characters, in document order.
pub fn extract_headlines(html: &str, selector: &str) -> Result<Vec<String>> {
    let sel = parse_selector(selector)?;
    let doc = Html::parse_document(html);

    let headlines = doc
        .select(&sel)
        .map(|el| el.text().collect::<String>().trim().to_string())
        .filter(|text| is_headline_length(text))
        .take(MAX_HEADLINES_PER_SOURCE)
        .collect();

    Ok(headlines)
}

fn is_headline_length(text: &str) -> bool {
    let len = text.chars().count();
    len > HEADLINE_MIN_EXCLUSIVE && len < HEADLINE_MAX_EXCLUSIVE
}

/// Readable text of an article page with page chrome removed.
pub fn extract_article_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    for candidate in ARTICLE_CANDIDATES {
        let Ok(sel) = Selector::parse(candidate) else {
            continue;
        };
        // Chrome is gone before the pick, so a teaser card in a header or
        // sidebar is never the first candidate.
        if let Some(el) = doc.select(&sel).find(|el| !inside_chrome(*el)) {
            let text = visible_text(el);
            if text.chars().count() > MIN_ARTICLE_LEN {
                return text;
            }
        }
    }

    // Body wins even when it is short; there is nothing left to fall back to.
    Selector::parse("body")
        .ok()
        .and_then(|sel| doc.select(&sel).next().map(visible_text))
        .unwrap_or_default()
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|_| PipelineError::Selector(selector.to_string()))
}

fn is_stripped(element: ElementRef<'_>) -> bool {
    STRIPPED_ELEMENTS.contains(&element.value().name())
}

fn inside_chrome(element: ElementRef<'_>) -> bool {
    element.ancestors().filter_map(ElementRef::wrap).any(is_stripped)
}

/// Text under `root`, skipping stripped elements and collapsing whitespace.
fn visible_text(root: ElementRef<'_>) -> String {
    let mut raw = String::new();
    collect_text(root, &mut raw);
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn collect_text(element: ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            out.push_str(text);
        } else if let Some(child_el) = ElementRef::wrap(child) {
            if is_stripped(child_el) {
                continue;
            }
            let block = BLOCK_ELEMENTS.contains(&child_el.value().name());
            if block {
                out.push(' ');
            }
            collect_text(child_el, out);
            if block {
                out.push(' ');
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of_len(len: usize) -> String {
        "x".repeat(len)
    }

    #[test]
    fn keeps_only_headlines_inside_length_window() {
        let html = format!(
            "<html><body><h2>{}</h2><h2>{}</h2><h2>{}</h2><h2>{}</h2><h2>{}</h2></body></html>",
            text_of_len(10),
            text_of_len(25),
            text_of_len(50),
            text_of_len(150),
            text_of_len(250),
        );

        let headlines = extract_headlines(&html, "h2").unwrap();
        let lengths: Vec<usize> = headlines.iter().map(String::len).collect();
        assert_eq!(lengths, vec![25, 50, 150]);
    }

    #[test]
    fn length_bounds_are_exclusive() {
        let html = format!(
            "<h2>{}</h2><h2>{}</h2><h2>{}</h2><h2>{}</h2>",
            text_of_len(20),
            text_of_len(21),
            text_of_len(199),
            text_of_len(200),
        );

        let lengths: Vec<usize> = extract_headlines(&html, "h2")
            .unwrap()
            .iter()
            .map(String::len)
            .collect();
        assert_eq!(lengths, vec![21, 199]);
    }

    #[test]
    fn trims_surrounding_whitespace_before_measuring() {
        let html = "<a class=\"t\">   Short but padded out with spaces   </a><a class=\"t\">      tiny      </a>";
        let headlines = extract_headlines(html, "a.t").unwrap();
        assert_eq!(headlines, vec!["Short but padded out with spaces".to_string()]);
    }

    #[test]
    fn caps_at_ten_in_document_order() {
        let html: String = (0..15)
            .map(|i| format!("<h3>Headline number {i:02} about something</h3>"))
            .collect();

        let headlines = extract_headlines(&html, "h3").unwrap();
        assert_eq!(headlines.len(), 10);
        assert_eq!(headlines[0], "Headline number 00 about something");
        assert_eq!(headlines[9], "Headline number 09 about something");
    }

    #[test]
    fn invalid_selector_is_an_error() {
        let err = extract_headlines("<h2>whatever</h2>", "h2[").unwrap_err();
        assert!(matches!(err, PipelineError::Selector(s) if s == "h2["));
    }

    #[test]
    fn article_text_prefers_article_element() {
        let body = "Leaders who write in public earn trust faster than those who only speak at all-hands meetings.";
        let html = format!(
            "<body><nav>Home About</nav><article><p>{body}</p><p>{body}</p><script>var x = 1;</script></article><footer>(c) 2026</footer></body>"
        );

        let text = extract_article_text(&html);
        assert_eq!(text, format!("{body} {body}"));
        assert!(!text.contains("var x"));
        assert!(!text.contains("Home About"));
    }

    #[test]
    fn short_article_falls_back_to_main() {
        let long = "The main element holds the real content of this page and it is comfortably longer than one hundred characters.";
        let html = format!(
            "<body><main><article>Too short.</article><p>{long}</p></main></body>"
        );

        let text = extract_article_text(&html);
        assert_eq!(text, format!("Too short. {long}"));
    }

    #[test]
    fn falls_back_to_body_even_when_short() {
        let html = "<body><header>Site</header><p>Just a line.</p><aside>Ad</aside></body>";
        assert_eq!(extract_article_text(html), "Just a line.");
    }

    #[test]
    fn stripped_elements_nested_in_article_are_ignored() {
        let para = "Nested chrome should never leak into the extracted text of an article, no matter how deep it sits.";
        let html = format!(
            "<article><div><header>Byline header</header><p>{para}</p><div><aside>Related links</aside><style>p {{}}</style></div></div></article>"
        );

        let text = extract_article_text(&html);
        assert_eq!(text, para);
    }

    #[test]
    fn article_inside_header_is_not_picked() {
        let promo = "Promo teaser in the site header that is also longer than one hundred characters, so length alone won't skip it.";
        let real = "The real story sits in its own article element further down the page, and it is well over one hundred characters.";
        let html = format!(
            "<body><header><article>{promo}</article></header><article>{real}</article></body>"
        );

        assert_eq!(extract_article_text(&html), real);
    }

    #[test]
    fn main_inside_aside_is_not_picked() {
        let real = "Only the main element outside of the sidebar should count, even though the sidebar one comes first in the page.";
        let html = format!(
            "<body><aside><main>{real} Sidebar copy.</main></aside><main>{real}</main></body>"
        );

        assert_eq!(extract_article_text(&html), real);
    }

    #[test]
    fn inline_markup_does_not_split_words() {
        let html = "<body><p>The <b>un</b>believable part is <a href=\"#\">Apple</a>'s stance.</p></body>";
        assert_eq!(extract_article_text(html), "The unbelievable part is Apple's stance.");
    }

    #[test]
    fn block_boundaries_still_separate_words() {
        let html = "<body><div>First<p>second</p>third<br>fourth<li>fifth</li></div></body>";
        assert_eq!(extract_article_text(html), "First second third fourth fifth");
    }
}
