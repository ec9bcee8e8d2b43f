use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use std::path::PathBuf;

use keyword_matcher::matching::{Classification, MatchOptions, Matcher};

#[derive(Parser)]
#[command(name = "matcher-cli")]
#[command(about = "Management CLI for the keyword matcher", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8050")]
    url: String,

    /// Admin bearer token, if the server requires one
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check service health
    Health,
    /// Inspect cached campaigns
    Cache,
    /// Evict one campaign so it reloads on next request
    Reload { campaign: String },
    /// Evict every campaign
    ReloadAll,
    /// Classify an utterance through the running service
    Match {
        campaign: String,
        stage: String,
        text: String,
    },
    /// Build a keyword file locally and report warnings
    Check {
        file: PathBuf,
        #[arg(long)]
        stage: Option<String>,
        #[arg(long)]
        text: Option<String>,
        /// Stages with the bare "no" → DNQ fallback
        #[arg(long, value_delimiter = ',', default_values_t = MatchOptions::default().dnq_fallback_stages)]
        dnq_stages: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    match cli.command {
        Commands::Health => {
            let res = client.get(format!("{}/health", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Cache => {
            let res = client
                .get(format!("{}/admin/cache-info", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Reload { campaign } => {
            let res = client
                .post(format!("{}/admin/reload/{}", cli.url, campaign))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::ReloadAll => {
            let res = client
                .post(format!("{}/admin/reload-all", cli.url))
                .headers(headers)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Match {
            campaign,
            stage,
            text,
        } => {
            let res = client
                .post(format!("{}/match", cli.url))
                .json(&serde_json::json!({
                    "campaign": campaign,
                    "stage": stage,
                    "speech_text": text,
                }))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Check {
            file,
            stage,
            text,
            dnq_stages,
        } => {
            check_file(file, stage, text, dnq_stages)?;
        }
    }

    Ok(())
}

fn check_file(
    file: PathBuf,
    stage: Option<String>,
    text: Option<String>,
    dnq_stages: Vec<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let bytes = std::fs::read(&file)?;
    let options = MatchOptions {
        dnq_fallback_stages: dnq_stages,
    };
    let matcher = Matcher::from_slice(&bytes, file, &options)?;

    for warning in matcher.warnings() {
        eprintln!("warning: {}", warning);
    }
    for (name, summary) in matcher.stages() {
        println!(
            "{}: {} hardcoded, {} prioritized",
            name, summary.hardcoded_categories, summary.prioritized_categories
        );
    }

    if let (Some(stage), Some(text)) = (stage, text) {
        match matcher.classify(&text, &stage) {
            Classification::Matched {
                category,
                keyword,
                tier,
            } => println!(
                "{} (category '{}', keyword '{}', {:?} match)",
                category.label, category.base_name, keyword, tier
            ),
            Classification::Fallback { category } => {
                println!("{} (fallback for bare \"no\")", category.label)
            }
            Classification::Unknown => println!("{}", keyword_matcher::matching::UNKNOWN_LABEL),
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
