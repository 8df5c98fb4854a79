use anyhow::Result;
use clap::Parser;
use unfurl::{config::Config, fetcher::HttpFetcher, preview, telemetry};

/// Fetch a web page and print its preview metadata as JSON.
#[derive(Parser, Debug)]
#[command(name = "unfurl", version, about, long_about = None)]
struct Cli {
    /// Absolute http(s) URL of the page to preview
    #[arg(value_name = "URL")]
    url: String,

    /// Pretty-print the JSON output
    #[arg(short, long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    telemetry::init();

    let config = Config::from_env()?;
    let fetcher = HttpFetcher::new(&config)?;
    let metadata = preview(&fetcher, &cli.url).await?;

    let output = if cli.pretty {
        serde_json::to_string_pretty(&metadata)?
    } else {
        serde_json::to_string(&metadata)?
    };
    println!("{}", output);
    Ok(())
}
