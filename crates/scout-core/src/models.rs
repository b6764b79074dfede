use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::status::StatusLog;

/// A single structured job posting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobListing {
    pub title: String,
    pub url: Option<String>,
    pub location: Option<String>,
    pub description: String,
    pub requirements: Option<String>,
    pub experience_level: Option<String>,
    /// 1–10, higher is more relevant to the search keywords.
    pub relevance_score: Option<u8>,
}

impl JobListing {
    /// Minimal listing with only a title and description.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            url: None,
            location: None,
            description: description.into(),
            requirements: None,
            experience_level: None,
            relevance_score: None,
        }
    }

    pub fn with_url(mut self, url: Option<String>) -> Self {
        self.url = url;
        self
    }

    /// Returns a copy carrying the given relevance score.
    pub fn scored(&self, score: u8) -> Self {
        Self {
            relevance_score: Some(score),
            ..self.clone()
        }
    }

    /// Text searched by the literal keyword pass.
    pub fn match_text(&self) -> String {
        format!(
            "{} {} {}",
            self.title,
            self.description,
            self.requirements.as_deref().unwrap_or_default()
        )
        .to_lowercase()
    }
}

/// Which backend family a model identifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend", content = "model", rename_all = "snake_case")]
pub enum ModelSelection {
    /// Self-hosted Ollama generation service.
    Ollama(String),
    /// Hosted OpenAI-compatible chat completion API; needs a credential.
    OpenAi(String),
}

impl ModelSelection {
    /// Parse a model identifier.
    ///
    /// Accepts `llama3` (alias for Ollama `llama3.3`), `ollama/<name>` and
    /// `openai/<name>`.
    pub fn parse(identifier: &str) -> Result<Self, AppError> {
        let identifier = identifier.trim();
        if identifier == "llama3" {
            return Ok(Self::Ollama("llama3.3".to_string()));
        }

        match identifier.split_once('/') {
            Some(("ollama", name)) if !name.is_empty() => Ok(Self::Ollama(name.to_string())),
            Some(("openai", name)) if !name.is_empty() => Ok(Self::OpenAi(name.to_string())),
            _ => Err(AppError::ConfigError(format!(
                "Unsupported model: '{identifier}' (expected llama3, ollama/<name> or openai/<name>)"
            ))),
        }
    }

    pub fn requires_credential(&self) -> bool {
        matches!(self, Self::OpenAi(_))
    }

    pub fn model_name(&self) -> &str {
        match self {
            Self::Ollama(name) | Self::OpenAi(name) => name,
        }
    }
}

impl fmt::Display for ModelSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ollama(name) => write!(f, "ollama/{name}"),
            Self::OpenAi(name) => write!(f, "openai/{name}"),
        }
    }
}

/// One catalogue entry shown by `scout models`.
#[derive(Debug, Clone, Copy)]
pub struct ModelInfo {
    pub identifier: &'static str,
    pub description: &'static str,
    pub requires_credential: bool,
}

/// Models known to work out of the box. Any `ollama/<name>` or
/// `openai/<name>` identifier is accepted as well.
pub const SUPPORTED_MODELS: &[ModelInfo] = &[
    ModelInfo {
        identifier: "llama3",
        description: "Llama 3.3 70B via a local Ollama server",
        requires_credential: false,
    },
    ModelInfo {
        identifier: "ollama/mistral",
        description: "Mistral 7B via a local Ollama server",
        requires_credential: false,
    },
    ModelInfo {
        identifier: "openai/gpt-4o-mini",
        description: "OpenAI GPT-4o mini (requires API key)",
        requires_credential: true,
    },
    ModelInfo {
        identifier: "openai/gpt-3.5-turbo",
        description: "OpenAI GPT-3.5 Turbo (requires API key)",
        requires_credential: true,
    },
];

/// A user's search: which company, which keywords, which model.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    pub company_name: String,
    /// Comma-separated keyword terms.
    pub keywords: String,
    pub model: ModelSelection,
    pub credential: Option<String>,
}

impl SearchRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.company_name.trim().is_empty() {
            return Err(AppError::InvalidRequest(
                "company name must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Which locator strategy produced a candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateSource {
    ModelSuggestion,
    UrlPattern,
    WebSearch,
}

impl fmt::Display for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidateSource::ModelSuggestion => write!(f, "model suggestion"),
            CandidateSource::UrlPattern => write!(f, "URL pattern"),
            CandidateSource::WebSearch => write!(f, "web search"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateUrl {
    pub url: String,
    pub source: CandidateSource,
}

impl CandidateUrl {
    pub fn new(url: impl Into<String>, source: CandidateSource) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

/// A validated career page together with the HTML it was validated on,
/// so extraction does not fetch it twice.
#[derive(Debug, Clone)]
pub struct LocatedPage {
    pub candidate: CandidateUrl,
    pub html: String,
}

/// Result of a single page fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageResponse {
    pub status: u16,
    pub body: String,
}

impl PageResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// Any status below 400 counts as reachable.
    pub fn is_reachable(&self) -> bool {
        self.status < 400
    }
}

/// An element picked out of a career page, before structuring.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawListing {
    pub title: String,
    pub url: Option<String>,
    pub content: String,
}

/// Everything one search produced.
#[derive(Debug)]
pub struct SearchOutcome {
    pub career_page: Option<CandidateUrl>,
    pub listings: Vec<JobListing>,
    pub status: StatusLog,
}
