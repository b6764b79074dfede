use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use scout_client::llm::{DEFAULT_OLLAMA_URL, DEFAULT_OPENAI_BASE_URL};
use scout_client::{AnyModelClient, DuckDuckGoSearch, ModelEndpoints, ReqwestFetcher};
use scout_core::export::{NOT_SPECIFIED, export_to_path};
use scout_core::{
    JobListing, JobSearchService, ModelSelection, SUPPORTED_MODELS, SearchConfig, SearchOutcome,
    SearchRequest,
};

#[derive(Parser)]
#[command(name = "scout", version, about = "Find relevant openings on a company's career page")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Locate a company's career page and list matching jobs
    Search {
        /// Company name (e.g. "Acme Corp")
        #[arg(short, long)]
        company: String,

        /// Comma-separated keywords (e.g. "python, remote")
        #[arg(short, long, default_value = "")]
        keywords: String,

        #[command(flatten)]
        model: ModelArgs,

        /// Maximum listings to show (overrides SCOUT_MAX_LISTINGS)
        #[arg(long)]
        max_results: Option<usize>,

        /// Ask the model to refine the keywords first
        #[arg(long, default_value_t = false)]
        refine: bool,

        /// Print the outcome as JSON instead of text
        #[arg(long, default_value_t = false)]
        json: bool,

        /// Also write results to a .csv or .json file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List supported model identifiers
    Models,

    /// Check that the selected model backend is reachable
    Check {
        #[command(flatten)]
        model: ModelArgs,
    },
}

#[derive(Args)]
struct ModelArgs {
    /// Model identifier: llama3, ollama/<name> or openai/<name>
    #[arg(short, long, env = "SCOUT_MODEL", default_value = "llama3")]
    model: String,

    /// API key for hosted models
    #[arg(long, env = "SCOUT_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Ollama server URL
    #[arg(long, env = "SCOUT_OLLAMA_URL", default_value = DEFAULT_OLLAMA_URL)]
    ollama_url: String,

    /// OpenAI-compatible API base URL
    #[arg(long, env = "SCOUT_OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    openai_base_url: String,
}

impl ModelArgs {
    fn selection(&self) -> Result<ModelSelection> {
        ModelSelection::parse(&self.model).map_err(|e| anyhow::anyhow!(e))
    }

    fn client(&self, config: &SearchConfig) -> Result<AnyModelClient> {
        let endpoints = ModelEndpoints {
            ollama_url: self.ollama_url.clone(),
            openai_base_url: self.openai_base_url.clone(),
            timeout: config.model_timeout,
        };
        AnyModelClient::from_selection(&self.selection()?, self.api_key.as_deref(), &endpoints)
            .map_err(|e| anyhow::anyhow!(e))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("scout=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            company,
            keywords,
            model,
            max_results,
            refine,
            json,
            output,
        } => {
            let mut config = SearchConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
            if let Some(max) = max_results {
                anyhow::ensure!(max > 0, "--max-results must be at least 1");
                config.max_listings = max;
            }
            config.refine_keywords = refine;

            let request = SearchRequest {
                company_name: company,
                keywords,
                model: model.selection()?,
                credential: model.api_key.clone(),
            };
            let outcome = cmd_search(&request, &model, config).await?;

            if let Some(path) = output {
                let career_url = outcome.career_page.as_ref().map(|c| c.url.as_str());
                export_to_path(&path, &request.company_name, career_url, &outcome.listings)
                    .map_err(|e| anyhow::anyhow!(e))?;
                eprintln!("Saved {} listing(s) to {}", outcome.listings.len(), path.display());
            }

            if json {
                print_json(&request, &outcome)?;
            } else {
                print_text(&outcome);
            }
        }
        Commands::Models => cmd_models(),
        Commands::Check { model } => {
            let config = SearchConfig::from_env().map_err(|e| anyhow::anyhow!(e))?;
            cmd_check(&model, &config).await?;
        }
    }

    Ok(())
}

async fn cmd_search(
    request: &SearchRequest,
    model: &ModelArgs,
    config: SearchConfig,
) -> Result<SearchOutcome> {
    let client = model.client(&config)?;
    let fetcher =
        ReqwestFetcher::with_user_agent(&config.user_agent).context("Failed to create HTTP client")?;
    let search = DuckDuckGoSearch::with_endpoint(
        scout_client::search::DUCKDUCKGO_HTML_URL,
        &config.user_agent,
        config.search_timeout,
    )
    .context("Failed to create search client")?;

    tracing::info!(model = %request.model, "Using model");
    let service = JobSearchService::new(fetcher, client, search, config)
        .map_err(|e| anyhow::anyhow!(e))?;

    service.run(request).await.map_err(|e| anyhow::anyhow!(e))
}

fn cmd_models() {
    println!("Supported models:\n");
    for info in SUPPORTED_MODELS {
        let backend = if info.requires_credential { "hosted" } else { "local" };
        println!("  {:<22} {:<7} {}", info.identifier, backend, info.description);
    }
    println!("\nAny ollama/<name> or openai/<name> identifier is also accepted.");
}

async fn cmd_check(model: &ModelArgs, config: &SearchConfig) -> Result<()> {
    let client = model.client(config)?;
    let status = client
        .health_check()
        .await
        .with_context(|| format!("Model backend for {} is not reachable", model.model))?;
    println!("OK: {status}");
    Ok(())
}

fn print_text(outcome: &SearchOutcome) {
    if let Some(page) = &outcome.career_page {
        println!("Career page: {} (via {})\n", page.url, page.source);
    }

    for (i, listing) in outcome.listings.iter().enumerate() {
        print_listing(i + 1, listing);
    }

    println!("Status:");
    for entry in outcome.status.entries() {
        println!("  - {entry}");
    }
}

fn print_listing(number: usize, listing: &JobListing) {
    let field = |value: &Option<String>| value.as_deref().unwrap_or(NOT_SPECIFIED).to_string();

    println!("{number}. {}", listing.title);
    if let Some(score) = listing.relevance_score {
        println!("   Relevance:  {score}/10");
    }
    println!("   Location:   {}", field(&listing.location));
    println!("   Experience: {}", field(&listing.experience_level));
    println!("   URL:        {}", field(&listing.url));
    println!("   {}", listing.description);
    if let Some(requirements) = &listing.requirements {
        println!("   Requirements: {requirements}");
    }
    println!();
}

fn print_json(request: &SearchRequest, outcome: &SearchOutcome) -> Result<()> {
    let value = serde_json::json!({
        "company": request.company_name,
        "keywords": request.keywords,
        "model": request.model.to_string(),
        "career_page": outcome.career_page,
        "job_listings": outcome.listings,
        "status": outcome.status.entries(),
    });
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
