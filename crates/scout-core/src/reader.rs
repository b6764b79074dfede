//! Last-resort extraction: hand the whole page to the model.
//!
//! Used only when no discovery strategy finds listing elements. The model
//! is asked for a JSON array of relevant jobs; anything it returns that
//! cannot be read as one is treated as "no listings".

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::AppError;
use crate::models::JobListing;
use crate::structure::present;
use crate::text::prefix_chars;
use crate::traits::ModelClient;

/// Page HTML sent to the model is cut to this many characters.
const PAGE_CONTENT_CHARS: usize = 50_000;

const PAGE_READING_TOKENS: u32 = 1000;

/// Score for a listing the model returned without one.
const DEFAULT_SCORE: u8 = 1;

/// One job as the model describes it.
#[derive(Debug, Default, Deserialize)]
struct PageListing {
    title: Option<String>,
    description: Option<String>,
    url: Option<String>,
    location: Option<String>,
    relevance_score: Option<Value>,
}

/// Reads job listings straight out of page HTML with a model.
#[derive(Clone)]
pub struct ModelPageReader<M: ModelClient> {
    model: M,
}

impl<M: ModelClient> ModelPageReader<M> {
    pub fn new(model: M) -> Self {
        Self { model }
    }

    /// Relevant listings on the page, as judged by the model.
    ///
    /// Only a failed model call is an error; an unusable reply yields an
    /// empty list.
    pub async fn read(
        &self,
        html: &str,
        page_url: &str,
        keywords: &str,
    ) -> Result<Vec<JobListing>, AppError> {
        let prompt = page_reading_prompt(html, page_url, keywords);
        let reply = self.model.generate(&prompt, PAGE_READING_TOKENS).await?;
        let listings = parse_page_listings(&reply, page_url);
        tracing::debug!(url = page_url, count = listings.len(), "Model page reading");
        Ok(listings)
    }
}

fn page_reading_prompt(html: &str, page_url: &str, keywords: &str) -> String {
    format!(
        "Analyze the following HTML content from the career page at {page_url} and extract \
         job listings relevant to these keywords: {keywords}.\n\
         For each relevant job, provide the following information in JSON format:\n\
         1. title: The job title\n\
         2. description: A brief description or snippet from the job posting\n\
         3. url: The URL or link to the full job posting (if available)\n\
         4. location: The job location (if available)\n\
         5. relevance_score: A score from 1-10 indicating how relevant this job is to the keywords\n\n\
         Return only the JSON array without any additional explanation or text.\n\n\
         HTML content:\n{}",
        prefix_chars(html, PAGE_CONTENT_CHARS)
    )
}

/// Parse the model's reply into listings.
///
/// The span from the first `[` to the last `]` is read as an array; a
/// reply with no brackets may be a single object. Entries without a title
/// are skipped.
pub fn parse_page_listings(reply: &str, page_url: &str) -> Vec<JobListing> {
    let reply = reply.trim();
    let json = match (reply.find('['), reply.rfind(']')) {
        (Some(start), Some(end)) if start < end => &reply[start..=end],
        _ => reply,
    };

    let items = match serde_json::from_str::<Value>(json) {
        Ok(Value::Array(items)) => items,
        Ok(object @ Value::Object(_)) => vec![object],
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::debug!(error = %e, "Model page reading reply is not JSON");
            Vec::new()
        }
    };

    let base = Url::parse(page_url).ok();
    items
        .into_iter()
        .filter_map(|item| serde_json::from_value::<PageListing>(item).ok())
        .filter_map(|item| to_listing(item, base.as_ref()))
        .collect()
}

fn to_listing(item: PageListing, base: Option<&Url>) -> Option<JobListing> {
    let title = present(item.title)?;
    let url = present(item.url).and_then(|href| match base {
        Some(base) => base.join(&href).ok().map(String::from),
        None => Url::parse(&href).ok().map(String::from),
    });
    Some(JobListing {
        title,
        url,
        location: present(item.location),
        description: present(item.description).unwrap_or_default(),
        requirements: None,
        experience_level: None,
        relevance_score: Some(score(item.relevance_score.as_ref())),
    })
}

/// Scores may come back as numbers or numeric strings; clamp to 1..=10.
fn score(value: Option<&Value>) -> u8 {
    let raw = match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    raw.filter(|v| v.is_finite())
        .map(|v| v.round().clamp(1.0, 10.0) as u8)
        .unwrap_or(DEFAULT_SCORE)
}
