use crate::config::SearchConfig;
use crate::error::AppError;
use crate::extractor::ListingExtractor;
use crate::locator::CareerPageLocator;
use crate::models::{SearchOutcome, SearchRequest};
use crate::status::{SearchEvent, StatusLog};
use crate::traits::{ModelClient, PageFetcher, WebSearch};

const REFINE_TOKENS: u32 = 200;

/// Orchestrates one job search: refine → locate → extract → filter → rank.
///
/// Generic over every external dependency so the whole pipeline runs in
/// tests without network access.
pub struct JobSearchService<F, M, S>
where
    F: PageFetcher,
    M: ModelClient,
    S: WebSearch,
{
    locator: CareerPageLocator<F, M, S>,
    extractor: ListingExtractor<M>,
    model: M,
    config: SearchConfig,
}

impl<F, M, S> JobSearchService<F, M, S>
where
    F: PageFetcher,
    M: ModelClient,
    S: WebSearch,
{
    pub fn new(fetcher: F, model: M, search: S, config: SearchConfig) -> Result<Self, AppError> {
        Ok(Self {
            locator: CareerPageLocator::new(fetcher, model.clone(), search, config.clone()),
            extractor: ListingExtractor::new(model.clone())?,
            model,
            config,
        })
    }

    /// Run the full pipeline for one request.
    ///
    /// Only an invalid request is an error. Every other failure ends up
    /// in the returned status trail.
    pub async fn run(&self, request: &SearchRequest) -> Result<SearchOutcome, AppError> {
        request.validate()?;
        let company = request.company_name.trim();
        let mut log = StatusLog::new();
        log.record(SearchEvent::Started {
            company,
            keywords: &request.keywords,
        });

        let keywords = if self.config.refine_keywords {
            let refined = self.refine_keywords(company, &request.keywords).await;
            log.record(SearchEvent::KeywordsRefined { refined: &refined });
            refined
        } else {
            request.keywords.clone()
        };

        let Some(page) = self.locator.locate(company, &mut log).await else {
            return Ok(SearchOutcome {
                career_page: None,
                listings: Vec::new(),
                status: log,
            });
        };

        let mut listings = self
            .extractor
            .extract(&page.html, &page.candidate.url, &keywords, &mut log)
            .await;

        // Stable sort keeps page order among equal scores.
        listings.sort_by(|a, b| b.relevance_score.cmp(&a.relevance_score));
        listings.truncate(self.config.max_listings);
        log.record(SearchEvent::Finished {
            count: listings.len(),
        });

        Ok(SearchOutcome {
            career_page: Some(page.candidate),
            listings,
            status: log,
        })
    }

    /// Ask the model for a sharper query. Empty or error-looking replies
    /// keep the original keywords.
    async fn refine_keywords(&self, company: &str, keywords: &str) -> String {
        let prompt = format!(
            "I want to search for jobs at {company} with these keywords: {keywords}.\n\
             Can you help refine these keywords into a more effective search query?\n\
             Provide only the refined query without any explanation or additional text."
        );
        match self.model.generate(&prompt, REFINE_TOKENS).await {
            Ok(reply) => {
                let reply = reply.trim();
                if reply.is_empty() || reply.to_lowercase().contains("error") {
                    keywords.to_string()
                } else {
                    reply.to_string()
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Keyword refinement failed, using original keywords");
                keywords.to_string()
            }
        }
    }
}
