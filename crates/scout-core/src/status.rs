use std::fmt;

use crate::models::CandidateSource;

/// Progress events emitted while a search runs.
#[derive(Debug, Clone)]
pub enum SearchEvent<'a> {
    Started {
        company: &'a str,
        keywords: &'a str,
    },
    KeywordsRefined {
        refined: &'a str,
    },
    Locating {
        company: &'a str,
    },
    ModelSuggested {
        url: &'a str,
    },
    NoModelSuggestion {
        reason: &'a str,
    },
    TryingUrl {
        url: &'a str,
        source: CandidateSource,
    },
    Unreachable {
        url: &'a str,
        reason: &'a str,
    },
    NotCareerPage {
        url: &'a str,
    },
    SearchingWeb {
        query: &'a str,
    },
    SearchFailed {
        query: &'a str,
        error: &'a str,
    },
    CareerPageFound {
        url: &'a str,
        source: CandidateSource,
    },
    CareerPageNotFound {
        company: &'a str,
    },
    CandidatesDiscovered {
        count: usize,
        strategy: &'a str,
    },
    NoListingsFound {
        url: &'a str,
    },
    ReadingPageWithModel {
        url: &'a str,
    },
    PageReadingFailed {
        url: &'a str,
        error: &'a str,
    },
    ListingDegraded {
        title: &'a str,
        error: &'a str,
    },
    ListingDropped {
        title: &'a str,
        error: &'a str,
    },
    ListingsMatched {
        kept: usize,
        total: usize,
    },
    Finished {
        count: usize,
    },
}

impl SearchEvent<'_> {
    /// Events that describe something going wrong rather than progress.
    fn is_warning(&self) -> bool {
        matches!(
            self,
            SearchEvent::SearchFailed { .. }
                | SearchEvent::CareerPageNotFound { .. }
                | SearchEvent::ListingDegraded { .. }
                | SearchEvent::ListingDropped { .. }
                | SearchEvent::PageReadingFailed { .. }
        )
    }
}

impl fmt::Display for SearchEvent<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchEvent::Started { company, keywords } => {
                write!(f, "Starting job search for {company} with keywords: {keywords}")
            }
            SearchEvent::KeywordsRefined { refined } => write!(f, "Refined query: {refined}"),
            SearchEvent::Locating { company } => write!(f, "Finding career page for {company}..."),
            SearchEvent::ModelSuggested { url } => write!(f, "Model suggested URL: {url}"),
            SearchEvent::NoModelSuggestion { reason } => {
                write!(f, "No usable model suggestion: {reason}")
            }
            SearchEvent::TryingUrl { url, source } => write!(f, "Trying {source} {url}"),
            SearchEvent::Unreachable { url, reason } => {
                write!(f, "{url} not accessible ({reason})")
            }
            SearchEvent::NotCareerPage { url } => {
                write!(f, "{url} does not look like a career page")
            }
            SearchEvent::SearchingWeb { query } => write!(f, "Searching the web for \"{query}\""),
            SearchEvent::SearchFailed { query, error } => {
                write!(f, "Web search for \"{query}\" failed: {error}")
            }
            SearchEvent::CareerPageFound { url, source } => {
                write!(f, "Found working career page via {source}: {url}")
            }
            SearchEvent::CareerPageNotFound { company } => write!(
                f,
                "Could not find a working career page for {company}. Check the company name or try again later."
            ),
            SearchEvent::CandidatesDiscovered { count, strategy } => {
                write!(f, "Found {count} candidate listing(s) using {strategy}")
            }
            SearchEvent::NoListingsFound { url } => write!(f, "No job listings found on {url}"),
            SearchEvent::ReadingPageWithModel { url } => {
                write!(f, "No listing elements on {url}, asking the model to read the page")
            }
            SearchEvent::PageReadingFailed { url, error } => {
                write!(f, "Model could not read {url}: {error}")
            }
            SearchEvent::ListingDegraded { title, error } => {
                write!(f, "Could not structure \"{title}\", keeping raw text: {error}")
            }
            SearchEvent::ListingDropped { title, error } => {
                write!(f, "Could not check \"{title}\" against keywords, skipping: {error}")
            }
            SearchEvent::ListingsMatched { kept, total } => {
                write!(f, "{kept} of {total} listing(s) match the keywords")
            }
            SearchEvent::Finished { count } => match count {
                0 => write!(
                    f,
                    "No matching jobs found. Try different keywords or a different company."
                ),
                n => write!(f, "Found {n} relevant job(s)."),
            },
        }
    }
}

/// Ordered, append-only progress trail for one search.
///
/// Every entry is also emitted as a `tracing` event.
#[derive(Debug, Default, Clone)]
pub struct StatusLog {
    entries: Vec<String>,
}

impl StatusLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, event: SearchEvent<'_>) {
        let message = event.to_string();
        if event.is_warning() {
            tracing::warn!("{message}");
        } else {
            tracing::info!("{message}");
        }
        self.entries.push(message);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.entries.iter().any(|entry| entry.contains(needle))
    }
}
