//! Content checks deciding whether a fetched page is a career page.

use scraper::{Html, Selector};

use crate::patterns::{
    CAREER_CONTENT_TERMS, CAREER_DENSITY_TERMS, CAREER_DENSITY_THRESHOLD, CAREER_PAGE_VOCABULARY,
    CAREER_URL_TERMS,
};
use crate::text::contains_any;

/// Lowercased text of the page's `<title>`, or empty.
fn title_text(document: &Html) -> String {
    Selector::parse("title")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>())
        })
        .unwrap_or_default()
        .to_lowercase()
}

/// Lowercased visible text of the page, title included.
fn visible_text(document: &Html) -> String {
    let body = Selector::parse("body")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<Vec<_>>().join(" "))
        })
        .unwrap_or_else(|| document.root_element().text().collect::<Vec<_>>().join(" "));
    format!("{} {}", title_text(document), body).to_lowercase()
}

/// Final gate for every locator candidate: the page title or body must
/// mention careers vocabulary at least once.
pub fn is_career_page(html: &str) -> bool {
    let document = Html::parse_document(html);
    contains_any(&visible_text(&document), CAREER_PAGE_VOCABULARY)
}

/// Stricter check for search results whose URL says nothing about careers.
///
/// Passes when any of these hold:
/// - the `<title>` mentions a careers term
/// - careers vocabulary is present and dense (at least three hits)
/// - the page has a form and talks about applying
/// - some table, list or div carries a job/career/position class
pub fn looks_like_career_page(html: &str) -> bool {
    let document = Html::parse_document(html);

    if contains_any(&title_text(&document), CAREER_URL_TERMS) {
        return true;
    }

    let text = visible_text(&document);
    if contains_any(&text, CAREER_CONTENT_TERMS) {
        let hits: usize = CAREER_DENSITY_TERMS
            .iter()
            .map(|term| text.matches(term).count())
            .sum();
        if hits >= CAREER_DENSITY_THRESHOLD {
            return true;
        }
    }

    let has_form = Selector::parse("form")
        .map(|sel| document.select(&sel).next().is_some())
        .unwrap_or(false);
    if has_form && contains_any(&text, &["apply", "submit", "application"]) {
        return true;
    }

    Selector::parse("table[class], ul[class], div[class]")
        .map(|sel| {
            document.select(&sel).any(|el| {
                el.value()
                    .attr("class")
                    .is_some_and(|class| contains_any(class, &["job", "career", "position"]))
            })
        })
        .unwrap_or(false)
}
