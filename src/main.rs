use std::path::PathBuf;

use clap::{Parser, Subcommand};
use rover_client::api::{self, Resource};
use rover_client::config::{ClientConfig, parse_header_arg};
use rover_client::{ApiClient, RequestOptions, ResponseBody, execute};

#[derive(Parser)]
#[command(name = "rover-client")]
#[command(about = "Talk to a running Rover server", long_about = None)]
struct Cli {
    /// Config file (defaults to <config dir>/rover-client/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Base URL every relative path resolves against
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Request timeout in milliseconds, 0 disables it
    #[arg(long, global = true)]
    timeout_ms: Option<u64>,

    /// Extra default header, `Name: value`
    #[arg(short = 'H', long = "header", global = true)]
    headers: Vec<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the effective client configuration
    Config,
    /// Check that the server is alive
    Health,
    /// Fetch one of plan, rso, map, graph
    Fetch { resource: Resource },
    /// GET an arbitrary path
    Get { path: String },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = resolve_config(&cli)?;
    let client = ApiClient::new(config)?;

    run(cli.command, &client).await
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(cli: &Cli) -> anyhow::Result<ClientConfig> {
    let mut config = ClientConfig::load(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config.timeout_ms = timeout_ms;
    }
    for raw in &cli.headers {
        let (name, value) = parse_header_arg(raw)?;
        config.set_header(&name, &value);
    }
    Ok(config)
}

async fn run(command: Commands, client: &ApiClient) -> anyhow::Result<()> {
    match command {
        Commands::Config => print_config(client),
        Commands::Health => {
            let health = api::health(client).await?;
            println!("alive: {}", health.alive);
        }
        Commands::Fetch { resource } => {
            let value = api::fetch_resource(client, resource).await?;
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        Commands::Get { path } => {
            let response = execute(client, &RequestOptions::get(path)).await?;
            println!("{}", response.status);
            match response.body {
                ResponseBody::Json(json) => println!("{}", serde_json::to_string_pretty(&json)?),
                ResponseBody::Text(text) => println!("{text}"),
                ResponseBody::Empty => {}
            }
        }
    }
    Ok(())
}

fn print_config(client: &ApiClient) {
    println!("base_url: {}", client.base_url());
    match client.timeout() {
        Some(timeout) => println!("timeout: {}", humantime::format_duration(timeout)),
        None => println!("timeout: none"),
    }
    println!("headers:");
    for (name, value) in client.default_headers() {
        println!("  {name}: {value}");
    }
}
