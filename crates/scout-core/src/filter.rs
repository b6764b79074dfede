use crate::error::AppError;
use crate::export::NOT_SPECIFIED;
use crate::models::JobListing;
use crate::status::{SearchEvent, StatusLog};
use crate::traits::ModelClient;

/// Score given to a listing kept only because the model approved it.
const MODEL_MATCH_SCORE: u8 = 1;

const MAX_SCORE: u8 = 10;

const YES_NO_TOKENS: u32 = 10;

/// Split a comma-separated keyword string into trimmed, lowercased terms.
pub fn parse_keywords(keywords: &str) -> Vec<String> {
    keywords
        .split(',')
        .map(|k| k.trim().to_lowercase())
        .filter(|k| !k.is_empty())
        .collect()
}

/// Number of distinct keywords appearing in the listing's text.
pub fn literal_hits(listing: &JobListing, keywords: &[String]) -> usize {
    let text = listing.match_text();
    keywords.iter().filter(|k| text.contains(k.as_str())).count()
}

/// Keeps listings relevant to the keywords, in their original order.
///
/// A cheap substring pass runs first; only listings it rejects are put to
/// the model as a yes/no question.
#[derive(Clone)]
pub struct KeywordFilter<M: ModelClient> {
    model: M,
}

impl<M: ModelClient> KeywordFilter<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    pub async fn filter(
        &self,
        listings: Vec<JobListing>,
        keywords: &str,
        log: &mut StatusLog,
    ) -> Vec<JobListing> {
        let terms = parse_keywords(keywords);
        if terms.is_empty() {
            return listings;
        }

        let total = listings.len();
        let mut kept = Vec::with_capacity(total);
        for listing in listings {
            let hits = literal_hits(&listing, &terms);
            if hits > 0 {
                let score = (hits * 2).min(MAX_SCORE as usize) as u8;
                kept.push(listing.scored(score));
                continue;
            }

            match self.model_approves(&listing, keywords).await {
                Ok(true) => kept.push(listing.scored(MODEL_MATCH_SCORE)),
                Ok(false) => {
                    tracing::debug!(title = %listing.title, "Listing rejected by model");
                }
                Err(e) => log.record(SearchEvent::ListingDropped {
                    title: &listing.title,
                    error: &e.to_string(),
                }),
            }
        }

        log.record(SearchEvent::ListingsMatched {
            kept: kept.len(),
            total,
        });
        kept
    }

    async fn model_approves(
        &self,
        listing: &JobListing,
        keywords: &str,
    ) -> Result<bool, AppError> {
        let prompt = match_prompt(listing, keywords);
        let reply = self.model.generate(&prompt, YES_NO_TOKENS).await?;
        Ok(reply.trim().to_lowercase() == "yes")
    }
}

fn match_prompt(listing: &JobListing, keywords: &str) -> String {
    format!(
        "Determine if this job posting matches the following keywords: {keywords}\n\n\
         Job Posting:\n\
         Title: {}\n\
         Description: {}\n\
         Requirements: {}\n\n\
         Respond with either \"yes\" or \"no\".",
        listing.title,
        listing.description,
        listing.requirements.as_deref().unwrap_or(NOT_SPECIFIED),
    )
}
