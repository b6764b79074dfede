use url::Url;

use crate::config::SearchConfig;
use crate::models::{CandidateSource, CandidateUrl, LocatedPage};
use crate::page::{is_career_page, looks_like_career_page};
use crate::patterns::{CAREER_URL_TERMS, career_page_urls, is_non_company_domain, search_queries};
use crate::status::{SearchEvent, StatusLog};
use crate::text::{contains_any, ensure_scheme, slugify_company};
use crate::traits::{ModelClient, PageFetcher, WebSearch};

/// Results requested per web search query.
const SEARCH_RESULTS_PER_QUERY: usize = 5;

/// Token budget for the "what is the careers URL" prompt.
const URL_SUGGESTION_TOKENS: u32 = 100;

/// The locator's fallback chain, in the order it is tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocateStrategy {
    ModelSuggestion,
    UrlPatterns,
    WebSearch,
}

impl LocateStrategy {
    pub const ALL: [LocateStrategy; 3] = [
        LocateStrategy::ModelSuggestion,
        LocateStrategy::UrlPatterns,
        LocateStrategy::WebSearch,
    ];
}

/// How much evidence a fetched page must show before it is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Evidence {
    /// Careers vocabulary anywhere in title or body.
    Vocabulary,
    /// Vocabulary plus the stricter content heuristics.
    CareerContent,
}

/// Finds a company's career page.
///
/// Generic over fetching, model and search so every strategy can be tested
/// without the network.
pub struct CareerPageLocator<F, M, S>
where
    F: PageFetcher,
    M: ModelClient,
    S: WebSearch,
{
    fetcher: F,
    model: M,
    search: S,
    config: SearchConfig,
}

impl<F, M, S> CareerPageLocator<F, M, S>
where
    F: PageFetcher,
    M: ModelClient,
    S: WebSearch,
{
    pub fn new(fetcher: F, model: M, search: S, config: SearchConfig) -> Self {
        Self {
            fetcher,
            model,
            search,
            config,
        }
    }

    /// Run every strategy in order; the first validated candidate wins.
    ///
    /// Not finding a page is a normal outcome, explained in `log`.
    pub async fn locate(&self, company_name: &str, log: &mut StatusLog) -> Option<LocatedPage> {
        log.record(SearchEvent::Locating {
            company: company_name,
        });

        for strategy in LocateStrategy::ALL {
            if let Some(page) = self.attempt(strategy, company_name, log).await {
                log.record(SearchEvent::CareerPageFound {
                    url: &page.candidate.url,
                    source: page.candidate.source,
                });
                return Some(page);
            }
        }

        log.record(SearchEvent::CareerPageNotFound {
            company: company_name,
        });
        None
    }

    /// Run a single strategy.
    pub async fn attempt(
        &self,
        strategy: LocateStrategy,
        company_name: &str,
        log: &mut StatusLog,
    ) -> Option<LocatedPage> {
        match strategy {
            LocateStrategy::ModelSuggestion => self.from_model_suggestion(company_name, log).await,
            LocateStrategy::UrlPatterns => self.from_url_patterns(company_name, log).await,
            LocateStrategy::WebSearch => self.from_web_search(company_name, log).await,
        }
    }

    async fn from_model_suggestion(
        &self,
        company_name: &str,
        log: &mut StatusLog,
    ) -> Option<LocatedPage> {
        let prompt = url_finder_prompt(company_name);
        let reply = match self.model.generate(&prompt, URL_SUGGESTION_TOKENS).await {
            Ok(reply) => reply,
            Err(e) => {
                log.record(SearchEvent::NoModelSuggestion {
                    reason: &e.to_string(),
                });
                return None;
            }
        };

        let Some(url) = parse_suggested_url(&reply) else {
            log.record(SearchEvent::NoModelSuggestion {
                reason: "reply contained no URL",
            });
            return None;
        };
        log.record(SearchEvent::ModelSuggested { url: &url });

        let candidate = CandidateUrl::new(url, CandidateSource::ModelSuggestion);
        self.validate(candidate, Evidence::Vocabulary, log).await
    }

    async fn from_url_patterns(
        &self,
        company_name: &str,
        log: &mut StatusLog,
    ) -> Option<LocatedPage> {
        for (i, url) in career_page_urls(company_name).into_iter().enumerate() {
            if i > 0 {
                self.config.pacing.pause().await;
            }
            let candidate = CandidateUrl::new(url, CandidateSource::UrlPattern);
            if let Some(page) = self.validate(candidate, Evidence::Vocabulary, log).await {
                return Some(page);
            }
        }
        None
    }

    async fn from_web_search(
        &self,
        company_name: &str,
        log: &mut StatusLog,
    ) -> Option<LocatedPage> {
        let slug = slugify_company(company_name);

        for query in search_queries(company_name) {
            log.record(SearchEvent::SearchingWeb { query: &query });
            let results = self.search.search(&query, SEARCH_RESULTS_PER_QUERY).await;
            self.config.pacing.pause().await;

            let urls = match results {
                Ok(urls) => urls,
                Err(e) => {
                    log.record(SearchEvent::SearchFailed {
                        query: &query,
                        error: &e.to_string(),
                    });
                    continue;
                }
            };

            for url in urls {
                if is_non_company_domain(&url) {
                    tracing::debug!(%url, "Skipping non-company domain");
                    continue;
                }

                let evidence = if contains_any(&url, CAREER_URL_TERMS) {
                    Evidence::Vocabulary
                } else if !slug.is_empty() && url.to_lowercase().contains(&slug) {
                    Evidence::CareerContent
                } else {
                    continue;
                };

                let candidate = CandidateUrl::new(url, CandidateSource::WebSearch);
                if let Some(page) = self.validate(candidate, evidence, log).await {
                    return Some(page);
                }
            }
        }
        None
    }

    /// Fetch a candidate and accept it if it is reachable (status < 400) and
    /// its content carries the required evidence.
    ///
    /// Vocabulary checks are quick probes; content checks get the full
    /// page fetch timeout.
    async fn validate(
        &self,
        candidate: CandidateUrl,
        evidence: Evidence,
        log: &mut StatusLog,
    ) -> Option<LocatedPage> {
        log.record(SearchEvent::TryingUrl {
            url: &candidate.url,
            source: candidate.source,
        });

        let timeout = match evidence {
            Evidence::Vocabulary => self.config.probe_timeout,
            Evidence::CareerContent => self.config.fetch_timeout,
        };
        let response = match self.fetcher.fetch(&candidate.url, timeout).await {
            Ok(response) => response,
            Err(e) => {
                if !e.is_transport() {
                    tracing::warn!(url = %candidate.url, error = %e, "Candidate fetch failed");
                }
                log.record(SearchEvent::Unreachable {
                    url: &candidate.url,
                    reason: &e.to_string(),
                });
                return None;
            }
        };

        if !response.is_reachable() {
            log.record(SearchEvent::Unreachable {
                url: &candidate.url,
                reason: &format!("HTTP {}", response.status),
            });
            return None;
        }

        let accepted = match evidence {
            Evidence::Vocabulary => is_career_page(&response.body),
            Evidence::CareerContent => {
                looks_like_career_page(&response.body) && is_career_page(&response.body)
            }
        };
        if !accepted {
            log.record(SearchEvent::NotCareerPage {
                url: &candidate.url,
            });
            return None;
        }

        Some(LocatedPage {
            candidate,
            html: response.body,
        })
    }
}

fn url_finder_prompt(company_name: &str) -> String {
    format!(
        "I need to find the careers or jobs page for {company_name}.\n\
         Based on your knowledge, what would be the most likely URL for their careers page?\n\
         Provide only the URL without any explanation or additional text."
    )
}

/// Pull the first URL-looking token out of a model reply.
///
/// Adds `https://` when the scheme is missing and rejects anything that
/// does not parse as an absolute http(s) URL with a dotted host.
pub fn parse_suggested_url(reply: &str) -> Option<String> {
    let token = reply
        .split_whitespace()
        .map(|t| {
            t.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '<' | '>' | '(' | ')' | '[' | ']' | ','))
                .trim_end_matches(['.', ';', ':'])
        })
        .find(|t| t.contains('.') && !t.starts_with('.'))?;

    let url = Url::parse(&ensure_scheme(token)).ok()?;
    match (url.scheme(), url.host_str()) {
        ("http" | "https", Some(host)) if host.contains('.') => Some(url.to_string()),
        _ => None,
    }
}
