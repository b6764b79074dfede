//! Turns raw listing text into a structured [`JobListing`].
//!
//! The model is asked for a JSON object. Replies are parsed leniently
//! and validated against a fixed schema; anything unusable falls back to
//! regex extraction over the raw text.

use std::sync::{Arc, LazyLock};

use jsonschema::Validator;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::models::{JobListing, RawListing};
use crate::text::{prefix_chars, truncate_chars};
use crate::traits::ModelClient;

/// Raw content sent to the model is cut to this many characters.
const PROMPT_CONTENT_CHARS: usize = 2000;

/// Description length when the model reply could not be used.
const FALLBACK_DESCRIPTION_CHARS: usize = 300;

/// Description length when the model could not be reached at all.
const DEGRADED_DESCRIPTION_CHARS: usize = 500;

const EXTRACTION_TOKENS: u32 = 500;

/// Values models use to say "I don't know".
const PLACEHOLDERS: &[&str] = &[
    "not specified",
    "not available",
    "n/a",
    "na",
    "none",
    "null",
    "unknown",
    "-",
];

static LOCATION_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Location:?\s*([^,\n]+(?:,\s*[^,\n]+)?)").expect("valid location regex")
});

static EXPERIENCE_RES: LazyLock<[Regex; 3]> = LazyLock::new(|| {
    [
        Regex::new(r"(?i)(\d+-\d+)\s+years").expect("valid years regex"),
        Regex::new(r"(?i)(Senior|Junior|Mid|Entry[- ]Level|Principal|Lead)")
            .expect("valid seniority regex"),
        Regex::new(r"(?i)Experience:?\s*(\w+)").expect("valid experience regex"),
    ]
});

static OUTERMOST_OBJECT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)\{.*\}").expect("valid object regex"));

/// Fields the model is asked to fill in.
#[derive(Debug, Default, Deserialize)]
struct ExtractedFields {
    title: Option<String>,
    location: Option<String>,
    description: Option<String>,
    requirements: Option<String>,
    experience_level: Option<String>,
}

/// Schema every model reply must satisfy: an object whose known fields are
/// strings or null.
pub fn extraction_schema() -> Value {
    let field = json!({ "type": ["string", "null"] });
    json!({
        "type": "object",
        "properties": {
            "title": field,
            "location": field,
            "description": field,
            "requirements": field,
            "experience_level": field
        }
    })
}

/// Structures raw listings with a model, degrading instead of failing.
#[derive(Clone)]
pub struct ListingStructurer<M: ModelClient> {
    model: M,
    validator: Arc<Validator>,
}

impl<M: ModelClient> ListingStructurer<M> {
    pub fn new(model: M) -> Result<Self, AppError> {
        let validator = jsonschema::validator_for(&extraction_schema())
            .map_err(|e| AppError::SchemaValidationError(e.to_string()))?;
        Ok(Self {
            model,
            validator: Arc::new(validator),
        })
    }

    /// Structure one listing.
    ///
    /// Returns the error alongside the degraded listing when the model call
    /// itself failed, so the caller can report it.
    pub async fn structure(&self, raw: &RawListing) -> (JobListing, Option<AppError>) {
        let prompt = extraction_prompt(&raw.content);
        match self.model.generate(&prompt, EXTRACTION_TOKENS).await {
            Ok(reply) => (self.from_reply(raw, &reply), None),
            Err(e) => {
                tracing::warn!(title = %raw.title, error = %e, "Model call failed, degrading listing");
                (degraded(raw), Some(e))
            }
        }
    }

    fn from_reply(&self, raw: &RawListing, reply: &str) -> JobListing {
        match self.parse_reply(reply) {
            Ok(fields) => merge(raw, fields),
            Err(e) => {
                tracing::debug!(title = %raw.title, error = %e, "Unusable model reply, using regex fallback");
                merge(raw, fallback_fields(raw))
            }
        }
    }

    /// Parse a model reply as the extraction object.
    ///
    /// Tries the whole reply first, then the outermost `{...}` inside it.
    fn parse_reply(&self, reply: &str) -> Result<ExtractedFields, AppError> {
        let value: Value = match serde_json::from_str(reply.trim()) {
            Ok(value) => value,
            Err(e) => {
                let inner = OUTERMOST_OBJECT_RE
                    .find(reply)
                    .ok_or(AppError::SerializationError(e))?;
                serde_json::from_str(inner.as_str())?
            }
        };

        if !self.validator.is_valid(&value) {
            return Err(AppError::SchemaValidationError(
                "reply does not match the extraction schema".into(),
            ));
        }
        Ok(serde_json::from_value(value)?)
    }
}

fn extraction_prompt(content: &str) -> String {
    let content = prefix_chars(content, PROMPT_CONTENT_CHARS);
    format!(
        r#"Extract the following information from this job listing:
1. Job Title
2. Location
3. Job Description (brief)
4. Requirements
5. Experience Level

Job Listing:
{content}

Format your response as a JSON object with these fields:
{{
    "title": "extracted title",
    "location": "extracted location",
    "description": "brief description",
    "requirements": "key requirements",
    "experience_level": "senior/mid/junior/etc"
}}
Only return the JSON object, nothing else."#
    )
}

/// Treat blanks and "don't know" markers as absent.
pub(crate) fn present(value: Option<String>) -> Option<String> {
    let value = value?.trim().to_string();
    if value.is_empty() || PLACEHOLDERS.contains(&value.to_lowercase().as_str()) {
        None
    } else {
        Some(value)
    }
}

fn merge(raw: &RawListing, fields: ExtractedFields) -> JobListing {
    let description = present(fields.description).unwrap_or_else(|| {
        truncate_chars(&raw.content, FALLBACK_DESCRIPTION_CHARS)
    });
    JobListing {
        title: present(fields.title).unwrap_or_else(|| raw.title.clone()),
        url: raw.url.clone(),
        location: present(fields.location),
        description,
        requirements: present(fields.requirements),
        experience_level: present(fields.experience_level),
        relevance_score: None,
    }
}

/// Label-driven extraction straight from the raw text.
fn fallback_fields(raw: &RawListing) -> ExtractedFields {
    let content = &raw.content;
    let location = LOCATION_RE
        .captures(content)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string());
    let experience_level = EXPERIENCE_RES
        .iter()
        .find_map(|re| re.captures(content).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string());

    ExtractedFields {
        title: Some(raw.title.clone()),
        location,
        description: Some(truncate_chars(content, FALLBACK_DESCRIPTION_CHARS)),
        requirements: None,
        experience_level,
    }
}

/// Listing built without any model help: title, URL and a text excerpt.
pub fn degraded(raw: &RawListing) -> JobListing {
    JobListing::new(
        raw.title.clone(),
        truncate_chars(&raw.content, DEGRADED_DESCRIPTION_CHARS),
    )
    .with_url(raw.url.clone())
}
