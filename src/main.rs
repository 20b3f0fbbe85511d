use std::sync::Arc;

use anime_recs::{
    services::DebouncedCallback, Config, QueryClient, QueryResult, RecommendationService,
};
use clap::{Parser, Subcommand};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::mpsc,
    task::JoinSet,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "anime-recs")]
#[command(about = "Find anime similar to a title you like")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch recommendations for a single title
    Search {
        /// Anime title
        name: String,

        /// Number of recommendations (1-50)
        #[arg(short = 'n', long)]
        top_n: Option<u32>,

        /// Print the normalized result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Read titles from stdin as they are typed and search once input settles
    Live {
        /// Number of recommendations (1-50)
        #[arg(short = 'n', long)]
        top_n: Option<u32>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    tracing::info!(
        api_url = %config.api_url,
        timeout_ms = config.request_timeout_ms,
        "Recommendation client configured"
    );

    let client = QueryClient::from_config(&config)?;
    let service = RecommendationService::new(Arc::new(client));

    match cli.command {
        Commands::Search { name, top_n, json } => {
            let top_n = top_n.unwrap_or(config.default_top_n);
            let result = service.fetch_recommendations(&name, top_n).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_cards(&result);
            }
        }
        Commands::Live { top_n } => {
            let top_n = top_n.unwrap_or(config.default_top_n);
            live(service, &config, top_n).await?;
        }
    }

    Ok(())
}

/// Debounced search over stdin lines; responses for superseded input are dropped
async fn live(service: RecommendationService, config: &Config, top_n: u32) -> anyhow::Result<()> {
    let (settled_tx, mut settled_rx) = mpsc::unbounded_channel::<String>();
    let mut debounced = DebouncedCallback::new(config.debounce_delay(), move |query: String| {
        let _ = settled_tx.send(query);
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut in_flight = JoinSet::new();
    let mut last_input: Option<String> = None;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };
                let query = line.trim().to_string();
                if query.chars().count() < config.min_query_length {
                    debounced.cancel();
                    last_input = None;
                    continue;
                }
                last_input = Some(query.clone());
                debounced.call(query);
            }
            Some(query) = settled_rx.recv() => {
                spawn_search(&mut in_flight, &service, &query, top_n);
            }
        }
    }

    while let Ok(query) = settled_rx.try_recv() {
        spawn_search(&mut in_flight, &service, &query, top_n);
    }

    // Input ended while a value was still waiting out its quiet period
    if debounced.is_scheduled() {
        debounced.cancel();
        if let Some(query) = last_input {
            spawn_search(&mut in_flight, &service, &query, top_n);
        }
    }

    while in_flight.join_next().await.is_some() {}
    Ok(())
}

fn spawn_search(
    in_flight: &mut JoinSet<()>,
    service: &RecommendationService,
    query: &str,
    top_n: u32,
) {
    let pending = service.fetch_latest(query, top_n);
    in_flight.spawn(async move {
        match pending.await {
            Ok(Some(result)) => print_cards(&result),
            Ok(None) => {}
            Err(e) => eprintln!("{}", e),
        }
    });
}

fn print_cards(result: &QueryResult) {
    println!(
        "Recommendations for \"{}\" ({})",
        result.original_anime, result.total_recommendations
    );

    for rec in &result.recommendations {
        let marker = if rec.is_highlighted { "*" } else { " " };
        println!(
            "{} #{:<2} {}  {}% match  {:.1} {} ({})",
            marker,
            rec.rank,
            rec.name,
            rec.similarity,
            rec.rating,
            rec.rating_category.label(),
            rec.rating_category.description()
        );

        let mut details: Vec<String> = Vec::new();
        if !rec.genres.is_empty() {
            details.push(rec.genres.join(", "));
        }
        if let Some(year) = rec.year {
            details.push(year.to_string());
        }
        if let Some(episodes) = rec.episodes {
            details.push(format!("{} eps", episodes));
        }
        details.push(rec.status.clone());
        println!("      {}", details.join(" · "));
    }
}
