//! Small, pure text helpers shared by the locator and extractor.

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn clean_text(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Normalize each line separately, dropping empty lines.
///
/// Keeps line structure intact so label patterns such as `Location: Berlin`
/// stay anchored to their own line.
pub fn clean_lines(text: &str) -> String {
    text.lines()
        .map(clean_text)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Lowercase the company name and strip spaces, commas and periods.
///
/// Example: `"Acme, Inc."` → `"acmeinc"`
pub fn slugify_company(company_name: &str) -> String {
    company_name
        .to_lowercase()
        .chars()
        .filter(|c| !c.is_whitespace() && *c != ',' && *c != '.')
        .collect()
}

/// Prefix `https://` unless the string already starts with a scheme.
pub fn ensure_scheme(url: &str) -> String {
    let url = url.trim();
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{url}")
    }
}

/// Extract the bare domain of a URL: no scheme, path, port or `www.`.
///
/// Example: `"https://www.acme.com:8080/careers"` → `"acme.com"`
pub fn extract_domain(url: &str) -> Option<String> {
    let rest = url.trim().rsplit("://").next()?;
    let host = rest.split(['/', '?', '#']).next()?;
    let host = host.split(':').next()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        None
    } else {
        Some(host.to_lowercase())
    }
}

/// Truncate to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}

/// The first `max_chars` characters of `text`, cut without a marker.
pub fn prefix_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Case-insensitive "does `haystack` contain any of `terms`".
pub fn contains_any(haystack: &str, terms: &[&str]) -> bool {
    let haystack = haystack.to_lowercase();
    terms.iter().any(|term| haystack.contains(term))
}
