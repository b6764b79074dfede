//! Pulls job listings out of a career page.
//!
//! Discovery is a chain of [`Strategy`] values run by [`first_success`]:
//! structural selectors, then job tables, then bare job links. The winning
//! strategy's elements become [`RawListing`]s, which are structured by the
//! model and finally filtered against the search keywords. A page where no
//! strategy finds anything is handed to the model whole.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::error::AppError;
use crate::filter::KeywordFilter;
use crate::models::{JobListing, RawListing};
use crate::patterns::{JOB_LINK_TERMS, LISTING_SELECTORS, TITLE_SELECTOR, UNKNOWN_TITLE};
use crate::reader::ModelPageReader;
use crate::status::{SearchEvent, StatusLog};
use crate::strategy::{Strategy, first_success};
use crate::structure::ListingStructurer;
use crate::text::{clean_lines, clean_text, contains_any};
use crate::traits::ModelClient;

/// Listings with less content than this are never structured.
pub const MIN_CONTENT_CHARS: usize = 20;

/// A parsed page plus the URL relative links resolve against.
pub struct PageDocument {
    pub html: Html,
    pub base_url: Option<Url>,
}

impl PageDocument {
    pub fn parse(html: &str, base_url: &str) -> Self {
        Self {
            html: Html::parse_document(html),
            base_url: Url::parse(base_url).ok(),
        }
    }
}

/// Discovery strategies in the order they are tried.
pub const DISCOVERY_CHAIN: [Strategy<PageDocument, Vec<RawListing>>; 3] = [
    Strategy::new("listing selectors", from_selectors),
    Strategy::new("job tables", from_job_tables),
    Strategy::new("job links", from_job_links),
];

/// First selector from [`LISTING_SELECTORS`] with any match wins.
pub fn from_selectors(doc: &PageDocument) -> Option<Vec<RawListing>> {
    LISTING_SELECTORS.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        let elements: Vec<_> = doc.html.select(&selector).collect();
        if elements.is_empty() {
            return None;
        }
        tracing::debug!(selector = *css, count = elements.len(), "Selector matched");
        Some(
            elements
                .into_iter()
                .map(|el| raw_listing(el, doc.base_url.as_ref()))
                .collect(),
        )
    })
}

/// Rows of every table that links to job or career pages, minus each
/// table's header row.
pub fn from_job_tables(doc: &PageDocument) -> Option<Vec<RawListing>> {
    let tables = Selector::parse("table").ok()?;
    let row_links = Selector::parse("tr a[href]").ok()?;
    let rows = Selector::parse("tr").ok()?;

    let listings: Vec<RawListing> = doc
        .html
        .select(&tables)
        .filter(|table| {
            table.select(&row_links).any(|a| {
                a.value()
                    .attr("href")
                    .is_some_and(|href| contains_any(href, &["job", "career"]))
            })
        })
        .flat_map(|table| table.select(&rows).skip(1).collect::<Vec<_>>())
        .map(|row| raw_listing(row, doc.base_url.as_ref()))
        .collect();

    (!listings.is_empty()).then_some(listings)
}

/// Parents of anchors whose text or href mentions jobs.
pub fn from_job_links(doc: &PageDocument) -> Option<Vec<RawListing>> {
    let anchors = Selector::parse("a[href]").ok()?;
    let mut seen = HashSet::new();
    let mut listings = Vec::new();

    for anchor in doc.html.select(&anchors) {
        let href = anchor.value().attr("href").unwrap_or_default().to_lowercase();
        if href.starts_with('#') || href.starts_with("mailto:") || href.starts_with("tel:") {
            continue;
        }
        let text = anchor.text().collect::<String>();
        if !contains_any(&text, JOB_LINK_TERMS) && !contains_any(&href, JOB_LINK_TERMS) {
            continue;
        }

        let candidate = anchor
            .parent()
            .and_then(ElementRef::wrap)
            .unwrap_or(anchor);
        if seen.insert(candidate.id()) {
            listings.push(raw_listing(candidate, doc.base_url.as_ref()));
        }
    }

    (!listings.is_empty()).then_some(listings)
}

/// Build a raw listing from one candidate element.
fn raw_listing(element: ElementRef<'_>, base_url: Option<&Url>) -> RawListing {
    RawListing {
        title: element_title(element),
        url: element_link(element, base_url),
        content: clean_lines(&element.text().collect::<Vec<_>>().join(" ")),
    }
}

/// An anchor is its own title; anything else uses its first heading-like
/// descendant.
fn element_title(element: ElementRef<'_>) -> String {
    let own_text = |el: ElementRef<'_>| clean_text(&el.text().collect::<String>());

    if element.value().name() == "a" {
        let text = own_text(element);
        if !text.is_empty() {
            return text;
        }
    }

    Selector::parse(TITLE_SELECTOR)
        .ok()
        .and_then(|sel| {
            element
                .select(&sel)
                .filter(|el| el.id() != element.id())
                .map(own_text)
                .find(|text| !text.is_empty())
        })
        .unwrap_or_else(|| UNKNOWN_TITLE.to_string())
}

/// First link of the element, resolved against the page URL.
fn element_link(element: ElementRef<'_>, base_url: Option<&Url>) -> Option<String> {
    let href = if element.value().name() == "a" {
        element.value().attr("href")
    } else {
        let sel = Selector::parse("a[href]").ok()?;
        element.select(&sel).find_map(|a| a.value().attr("href"))
    };
    let href = href?.trim();

    if href.is_empty() {
        return None;
    }
    match base_url {
        Some(base) => base.join(href).ok().map(String::from),
        None => Url::parse(href).ok().map(String::from),
    }
}

/// Run discovery over a page and drop listings too short to be useful.
///
/// Returns the name of the strategy that found candidates, if any.
pub fn discover(html: &str, base_url: &str) -> (Option<&'static str>, Vec<RawListing>) {
    let doc = PageDocument::parse(html, base_url);
    match first_success(&DISCOVERY_CHAIN, &doc) {
        Some((strategy, listings)) => {
            let listings = listings
                .into_iter()
                .filter(|raw| raw.content.chars().count() >= MIN_CONTENT_CHARS)
                .collect();
            (Some(strategy), listings)
        }
        None => (None, Vec::new()),
    }
}

/// Extracts, structures and filters listings from a career page.
#[derive(Clone)]
pub struct ListingExtractor<M: ModelClient> {
    structurer: ListingStructurer<M>,
    filter: KeywordFilter<M>,
    reader: ModelPageReader<M>,
}

impl<M: ModelClient> ListingExtractor<M> {
    pub fn new(model: M) -> Result<Self, AppError> {
        Ok(Self {
            structurer: ListingStructurer::new(model.clone())?,
            filter: KeywordFilter::new(model.clone()),
            reader: ModelPageReader::new(model),
        })
    }

    /// Listings on the page relevant to `keywords`, in page order.
    ///
    /// An empty result is normal; one bad listing never fails the batch.
    pub async fn extract(
        &self,
        html: &str,
        base_url: &str,
        keywords: &str,
        log: &mut StatusLog,
    ) -> Vec<JobListing> {
        let (strategy, raw_listings) = discover(html, base_url);
        let Some(strategy) = strategy else {
            return self.read_with_model(html, base_url, keywords, log).await;
        };
        if raw_listings.is_empty() {
            log.record(SearchEvent::NoListingsFound { url: base_url });
            return Vec::new();
        }
        log.record(SearchEvent::CandidatesDiscovered {
            count: raw_listings.len(),
            strategy,
        });

        let mut structured = Vec::with_capacity(raw_listings.len());
        for raw in &raw_listings {
            let (listing, error) = self.structurer.structure(raw).await;
            if let Some(e) = error {
                log.record(SearchEvent::ListingDegraded {
                    title: &raw.title,
                    error: &e.to_string(),
                });
            }
            structured.push(listing);
        }

        self.filter.filter(structured, keywords, log).await
    }

    /// The model picks relevant listings itself, so no keyword pass follows.
    async fn read_with_model(
        &self,
        html: &str,
        base_url: &str,
        keywords: &str,
        log: &mut StatusLog,
    ) -> Vec<JobListing> {
        log.record(SearchEvent::ReadingPageWithModel { url: base_url });
        let listings = match self.reader.read(html, base_url, keywords).await {
            Ok(listings) => listings,
            Err(e) => {
                log.record(SearchEvent::PageReadingFailed {
                    url: base_url,
                    error: &e.to_string(),
                });
                Vec::new()
            }
        };

        if listings.is_empty() {
            log.record(SearchEvent::NoListingsFound { url: base_url });
        } else {
            log.record(SearchEvent::CandidatesDiscovered {
                count: listings.len(),
                strategy: "model page reading",
            });
        }
        listings
    }
}
