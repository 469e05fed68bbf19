//! price-scout CLI
//!
//! Runs a single non-replanning search-and-extract flow for a product
//! keyword and prints a human-readable result line.

use anyhow::Result;
use clap::Parser;
use price_scout::agent;
use price_scout::browser::SessionConfig;

#[derive(Parser)]
#[command(name = "price-scout")]
#[command(version)]
#[command(about = "Search Amazon for a product and report the cheapest price", long_about = None)]
struct Cli {
    /// Product keyword to search for
    #[arg(long, default_value = "laptop")]
    product: String,

    /// true or false; overrides the HEADLESS environment default
    #[arg(long, value_name = "BOOL")]
    headless: Option<String>,
}

/// CLI flag wins over the `HEADLESS` env var; default is headless
fn headless_flag(flag: Option<&str>) -> bool {
    let value = match flag {
        Some(v) => v.to_lowercase(),
        None => std::env::var("HEADLESS")
            .unwrap_or_else(|_| "true".to_string())
            .to_lowercase(),
    };
    matches!(value.as_str(), "1" | "true" | "yes")
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::init();

    let cli = Cli::parse();
    let headless = headless_flag(cli.headless.as_deref());

    println!("Starting search for '{}' on Amazon...", cli.product);

    let config = SessionConfig::new().headless(headless);
    let line = agent::search_product_price(&cli.product, &config)?;
    println!("{}", line);

    Ok(())
}
