//! Fixed lookup tables used by the career-page heuristics.

use crate::text::{ensure_scheme, slugify_company};

/// Career page URL templates, tried in this order. `{company}` is the slug.
pub const CAREER_PAGE_PATTERNS: &[&str] = &[
    "{company}.com/careers",
    "{company}.com/jobs",
    "{company}.com/work-with-us",
    "{company}.com/join-us",
    "{company}.com/employment",
    "{company}.com/about/careers",
    "{company}.com/about/jobs",
    "careers.{company}.com",
    "jobs.{company}.com",
];

/// Web search query templates, tried in this order.
pub const SEARCH_QUERY_TEMPLATES: &[&str] = &[
    "{company} careers",
    "{company} jobs",
    "{company} career opportunities",
    "{company} careers apply",
];

/// Aggregators and social sites that never host a company's own career page.
pub const NON_COMPANY_DOMAINS: &[&str] = &["linkedin", "glassdoor", "indeed", "facebook", "twitter"];

/// Terms that mark a search result URL as career-related.
pub const CAREER_URL_TERMS: &[&str] = &["career", "job", "employ", "work", "join", "apply"];

/// Vocabulary a page must contain to be accepted as a career page.
pub const CAREER_PAGE_VOCABULARY: &[&str] = &[
    "job",
    "career",
    "position",
    "opening",
    "vacancy",
    "employment",
    "hiring",
    "apply",
];

/// Phrases that suggest page content is careers-related at all.
pub const CAREER_CONTENT_TERMS: &[&str] = &[
    "career",
    "job",
    "position",
    "opening",
    "vacancy",
    "apply",
    "join our team",
    "work with us",
];

/// Terms counted to decide if careers vocabulary is dense enough.
pub const CAREER_DENSITY_TERMS: &[&str] = &["job", "career", "position", "apply"];

/// Minimum number of density-term occurrences for a content match.
pub const CAREER_DENSITY_THRESHOLD: usize = 3;

/// Terms in a job-link's text or href.
pub const JOB_LINK_TERMS: &[&str] = &["job", "career", "position", "apply", "vacancy"];

/// Structural selectors for job-listing elements, in priority order.
pub const LISTING_SELECTORS: &[&str] = &[
    ".job-card",
    ".job-listing",
    ".career-opportunity",
    ".job-opening",
    r#"div[class*="job"]"#,
    r#"div[class*="career"]"#,
    r#"li[class*="job"]"#,
    r#"div[class*="position"]"#,
    ".careers-list li",
    ".job-search-results li",
    ".jobs-grid article",
    ".job-grid-item",
];

/// Where a listing's title is looked for, first match wins.
pub const TITLE_SELECTOR: &str = "h2, h3, h4, .title, .position, strong, b, a";

/// Title used when an element has no heading-like child.
pub const UNKNOWN_TITLE: &str = "Unknown Position";

/// Build the ordered candidate career-page URLs for a company.
pub fn career_page_urls(company_name: &str) -> Vec<String> {
    let slug = slugify_company(company_name);
    CAREER_PAGE_PATTERNS
        .iter()
        .map(|pattern| ensure_scheme(&pattern.replace("{company}", &slug)))
        .collect()
}

/// Build the ordered web search queries for a company.
pub fn search_queries(company_name: &str) -> Vec<String> {
    let company = company_name.trim();
    SEARCH_QUERY_TEMPLATES
        .iter()
        .map(|template| template.replace("{company}", company))
        .collect()
}

/// True if the URL belongs to a site that aggregates other companies' jobs.
pub fn is_non_company_domain(url: &str) -> bool {
    let url = url.to_lowercase();
    NON_COMPANY_DOMAINS.iter().any(|site| url.contains(site))
}
