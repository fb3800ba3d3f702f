//! `clearfetch` CLI - replay captured cookies against one URL and save the result

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use clearfetch::{Config, Outcome, Pipeline, RunReport};

const DEFAULT_URL: &str = "https://www.proshop.de/Basket/BuyNvidiaGraphicCard?t=C8HgkfqkAbdVIyPnb%2B%2BHQOoYO6UhnuDDA8853HMVzu6Wh3v2YAtSuPC5hOcGnQqGZve77PQt9%2FdBgsLw327GJu35bgsktZFF01sZq2Ggu5VIedzHT6GMr%2BVdEl%2BqK6TJO6kIOoOFHkGPYbDnU8scv53inA8cgPvwQ4n8soRyD7EDfEYavWDPah8%2B%2BIPQye8LL8ymAba361B0pjcQgb1L2a4ap8SgOYum1voEi19FqaiPbcOn%2F1tmFZfTqw38ZrsV0wrokDAOcjaGLeiD5ujyc%2F9uY7GAJRGtEasilCzFJhECHYSimA9q8Pd9vJh%2FVhd9j%2BW3WlTmmTM4Pt3vimM2KQ%3D%3D";

#[derive(Parser)]
#[command(name = "clearfetch")]
#[command(about = "Replay captured browser cookies against one URL and save the response")]
#[command(version)]
struct Cli {
    /// URL to request
    #[arg(long, default_value = DEFAULT_URL)]
    url: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    println!("🌐 Starting fetch...");
    match run(&cli.url).await {
        Ok(report) => {
            print_report(&report);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("❌ Fetch failed: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(url: &str) -> Result<RunReport> {
    let config = Config::load().context("failed to load configuration")?;
    let mut pipeline = Pipeline::new(config)?;
    let report = pipeline.run(url).await?;
    Ok(report)
}

fn print_report(report: &RunReport) {
    match &report.outcome {
        Outcome::Success => println!("✅ Fetch completed successfully"),
        Outcome::Warning(reason) => println!("⚠️  Fetch completed with warnings: {reason}"),
    }
    if let Some(status) = report.status_code {
        println!("   Status: {status}");
    }
    if let Some(final_url) = &report.final_url {
        println!("   Final URL: {final_url}");
        println!("   Redirects: {}", report.redirects);
    }
    println!("   Time: {:.2}ms", report.elapsed.as_secs_f64() * 1000.0);
}
