mod cli;

use crate::cli::CLI;
use clap::Parser;
use detour_core::{ShortCode, Shortener};
use detour_generator::RandomGenerator;
use detour_shortener::api::{Api, CreateRequest};
use detour_shortener::{ShortenerConfig, ShortenerService};
use detour_storage::InMemoryRepository;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

type Service = ShortenerService<InMemoryRepository, RandomGenerator>;
type Boundary = Api<InMemoryRepository, RandomGenerator>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let config = CLI::try_parse()?;
    anyhow::ensure!(
        ShortCode::is_valid(&"a".repeat(config.code_length)),
        "code length must be between 4 and 20"
    );

    info!(
        base_url = %config.base_url,
        code_length = config.code_length,
        default_validity = config.default_validity,
        "starting detour shell"
    );

    let service = ShortenerService::with_config(
        InMemoryRepository::new(),
        RandomGenerator::with_length(config.code_length),
        ShortenerConfig::builder()
            .default_validity_minutes(config.default_validity)
            .max_generation_attempts(config.max_generation_attempts)
            .build(),
    );
    let api = Api::new(service.clone(), config.base_url);

    run_shell(api, service).await
}

async fn run_shell(api: Boundary, service: Service) -> anyhow::Result<()> {
    print_help();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if matches!(line, "quit" | "exit") {
            break;
        }
        handle_line(&api, &service, line).await?;
    }

    Ok(())
}

async fn handle_line(api: &Boundary, service: &Service, line: &str) -> anyhow::Result<()> {
    let mut parts = line.split_whitespace();
    let command = parts.next().unwrap_or_default();

    match command {
        "create" => {
            let Some(url) = parts.next() else {
                println!("usage: create <url> [validity-minutes] [shortcode]");
                return Ok(());
            };
            let validity = match parts.next().map(str::parse::<i64>) {
                None => None,
                Some(Ok(minutes)) => Some(minutes),
                Some(Err(_)) => {
                    println!("validity must be an integer number of minutes");
                    return Ok(());
                }
            };
            let request = CreateRequest {
                url: url.to_owned(),
                validity,
                shortcode: parts.next().map(str::to_owned),
            };

            match api.create(request).await {
                Ok(response) => println!("{}", serde_json::to_string(&response)?),
                Err(error) => println!("{}", serde_json::to_string(&error)?),
            }
        }
        "resolve" => {
            let Some(shortcode) = parts.next() else {
                println!("usage: resolve <shortcode>");
                return Ok(());
            };
            match api.resolve(shortcode, Some("cli")).await {
                Ok(destination) => println!("redirect -> {}", destination),
                Err(error) => println!("{}", serde_json::to_string(&error)?),
            }
        }
        "exists" => {
            let Some(shortcode) = parts.next() else {
                println!("usage: exists <shortcode>");
                return Ok(());
            };
            let exists = match ShortCode::new(shortcode) {
                Ok(code) => service.exists(&code).await?,
                Err(_) => false,
            };
            println!("{}", exists);
        }
        "clicks" => {
            let Some(shortcode) = parts.next() else {
                println!("usage: clicks <shortcode>");
                return Ok(());
            };
            match ShortCode::new(shortcode) {
                Ok(code) => {
                    let clicks = service.clicks(&code).await?;
                    println!("{}", serde_json::to_string(&clicks)?);
                }
                Err(_) => println!("[]"),
            }
        }
        "help" => print_help(),
        other => println!("unknown command: {}", other),
    }

    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  create <url> [validity-minutes] [shortcode]");
    println!("  resolve <shortcode>");
    println!("  exists <shortcode>");
    println!("  clicks <shortcode>");
    println!("  help | quit");
}
