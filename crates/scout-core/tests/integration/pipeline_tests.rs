use scout_core::export::{read_csv, write_csv};
use scout_core::patterns::career_page_urls;
use scout_core::{CandidateSource, JobSearchService, ModelSelection, SearchRequest};

use super::common::{NoResults, ScriptedModel, StaticSite, fast_config};

const ACME_PAGE: &str = r#"<html><head><title>Careers at Acme</title></head><body>
<div class="job-listing">Python Engineer - Remote - Build great things</div>
</body></html>"#;

fn acme_request(keywords: &str) -> SearchRequest {
    SearchRequest {
        company_name: "Acme".into(),
        keywords: keywords.into(),
        model: ModelSelection::parse("llama3").unwrap(),
        credential: None,
    }
}

#[tokio::test]
async fn acme_end_to_end_finds_the_python_role() {
    let site = StaticSite::new(&[("https://acme.com/careers", ACME_PAGE)]);
    let model = ScriptedModel::new(&[(
        "Extract the following information",
        r#"{"title": "Python Engineer", "location": "Remote", "description": "Remote role building great things", "requirements": null, "experience_level": null}"#,
    )]);
    let service = JobSearchService::new(site, model, NoResults, fast_config()).unwrap();

    let outcome = service.run(&acme_request("python, remote")).await.unwrap();

    let page = outcome.career_page.expect("career page located");
    assert_eq!(page.url, "https://acme.com/careers");
    assert_eq!(page.source, CandidateSource::UrlPattern);

    assert_eq!(outcome.listings.len(), 1);
    let listing = &outcome.listings[0];
    assert!(listing.title.starts_with("Python Engineer"));
    assert_eq!(listing.location.as_deref(), Some("Remote"));
    assert_eq!(listing.relevance_score, Some(4));
    let text = listing.match_text();
    assert!(text.contains("python") && text.contains("remote"));

    let trail = outcome.status.entries();
    assert!(trail.first().unwrap().starts_with("Starting job search for Acme"));
    assert_eq!(trail.last().unwrap(), "Found 1 relevant job(s).");
}

#[tokio::test]
async fn unreachable_model_still_yields_raw_listings() {
    let site = StaticSite::new(&[("https://acme.com/careers", ACME_PAGE)]);
    let service =
        JobSearchService::new(site, ScriptedModel::default(), NoResults, fast_config()).unwrap();

    let outcome = service.run(&acme_request("python")).await.unwrap();

    assert_eq!(outcome.listings.len(), 1);
    assert_eq!(outcome.listings[0].title, "Unknown Position");
    assert_eq!(
        outcome.listings[0].description,
        "Python Engineer - Remote - Build great things"
    );
    assert!(outcome.status.contains("keeping raw text"));
}

#[tokio::test]
async fn last_pattern_is_found_after_all_others_fail() {
    let patterns = career_page_urls("Acme");
    let last = patterns.last().unwrap().clone();
    let site = StaticSite::new(&[(last.as_str(), ACME_PAGE)]);
    let service =
        JobSearchService::new(site.clone(), ScriptedModel::default(), NoResults, fast_config())
            .unwrap();

    let outcome = service.run(&acme_request("")).await.unwrap();

    assert_eq!(outcome.career_page.unwrap().url, last);
    assert_eq!(*site.requested.lock().unwrap(), patterns);
}

#[tokio::test]
async fn results_survive_csv_export() {
    let site = StaticSite::new(&[("https://acme.com/careers", ACME_PAGE)]);
    let model = ScriptedModel::new(&[(
        "Extract the following information",
        r#"{"title": "Python Engineer", "location": "Not specified"}"#,
    )]);
    let service = JobSearchService::new(site, model, NoResults, fast_config()).unwrap();
    let outcome = service.run(&acme_request("python")).await.unwrap();

    let mut buf = Vec::new();
    write_csv(&outcome.listings, &mut buf).unwrap();
    let text = String::from_utf8(buf.clone()).unwrap();

    assert!(text.contains("Not specified"));
    assert_eq!(read_csv(buf.as_slice()).unwrap(), outcome.listings);
}
