use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use workdex_core::config::Config;
use workdex_core::types::{EngineStatusSet, SearchOptions};
use workdex_hybrid::HybridOrchestrator;

/// Hybrid search over a markdown work-item corpus.
#[derive(Parser, Debug)]
#[command(name = "workdex")]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, PartialEq)]
enum Command {
    /// Search the corpus with every available engine
    Search {
        /// Query words; joined with spaces
        #[arg(required = true)]
        query: Vec<String>,

        /// Only return documents from this category
        #[arg(long)]
        category: Option<String>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Minimum vector similarity in [0, 1]
        #[arg(long)]
        threshold: Option<f32>,

        /// Print the full response as JSON
        #[arg(long)]
        json: bool,
    },

    /// Rebuild the local indexes and report engine health
    Status,

    /// Complete a partial word from titles and keywords
    Suggest {
        partial: String,

        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },
}

fn search_options(category: Option<String>, limit: Option<usize>, threshold: Option<f32>) -> SearchOptions {
    SearchOptions { category, limit, threshold }
}

fn print_status(status: &EngineStatusSet) {
    let line: Vec<String> = [("vector", &status.vector), ("keyword", &status.keyword), ("fuzzy", &status.fuzzy)]
        .iter()
        .map(|(name, s)| match (s.available, &s.error) {
            (true, _) => format!("{name}: ok"),
            (false, Some(e)) => format!("{name}: unavailable ({e})"),
            (false, None) => format!("{name}: no results"),
        })
        .collect();
    println!("engines: {}", line.join(" | "));
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("workdex=info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load().map_err(|e| { eprintln!("Error loading config: {e}"); e })?;
    let settings = config.settings()?;
    let orchestrator = HybridOrchestrator::from_settings(&settings)?;

    match cli.command {
        Command::Search { query, category, limit, threshold, json } => {
            let query = query.join(" ");
            let resp = orchestrator.search(&query, &search_options(category, limit, threshold)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&resp)?);
                return Ok(());
            }
            for (rank, r) in resp.results.iter().enumerate() {
                let engines: Vec<&str> = r.engines.iter().map(|e| e.as_str()).collect();
                println!("{:>2}. [{:.3}] {} ({})", rank + 1, r.score, r.title, r.id);
                println!("    engines: {}", engines.join(", "));
                println!("    {}", r.snippet);
            }
            if resp.results.is_empty() { println!("No results for '{query}'"); }
            print_status(&resp.status);
        }
        Command::Status => {
            let stats = orchestrator.initialize().await?;
            println!("indexed {} documents in {}ms", stats.documents, stats.build_millis);
            for (category, count) in &stats.per_category { println!("  {category}: {count}"); }
            print_status(&orchestrator.get_engine_status().await);
        }
        Command::Suggest { partial, limit } => {
            for s in orchestrator.suggestions(&partial, limit).await { println!("{s}"); }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Command, clap::Error> {
        Cli::try_parse_from(std::iter::once("workdex").chain(args.iter().copied())).map(|cli| cli.command)
    }

    #[test]
    fn parses_search_with_flags() {
        let cmd = parse(&["search", "auth", "refactor", "--category", "features", "--limit", "5", "--threshold", "0.4"]).unwrap();
        assert_eq!(
            cmd,
            Command::Search {
                query: vec!["auth".into(), "refactor".into()],
                category: Some("features".into()),
                limit: Some(5),
                threshold: Some(0.4),
                json: false,
            }
        );
        let Command::Search { category, limit, threshold, .. } = cmd else { unreachable!() };
        let opts = search_options(category, limit, threshold);
        assert_eq!(opts, SearchOptions::default().with_category("features").with_limit(5).with_threshold(0.4));
    }

    #[test]
    fn parses_status_and_suggest() {
        assert_eq!(parse(&["status"]).unwrap(), Command::Status);
        assert_eq!(parse(&["suggest", "aut"]).unwrap(), Command::Suggest { partial: "aut".into(), limit: 10 });
        assert_eq!(parse(&["suggest", "aut", "-l", "3"]).unwrap(), Command::Suggest { partial: "aut".into(), limit: 3 });
    }

    #[test]
    fn json_flag_and_unset_options() {
        let Command::Search { json, category, limit, threshold, .. } = parse(&["search", "login", "--json"]).unwrap() else {
            panic!("expected search");
        };
        assert!(json);
        assert_eq!(search_options(category, limit, threshold), SearchOptions::default());
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse(&[]).is_err());
        assert!(parse(&["search"]).is_err());
        assert!(parse(&["search", "x", "--limit", "many"]).is_err());
        assert!(parse(&["search", "x", "--limit"]).is_err());
        assert!(parse(&["search", "x", "--bogus"]).is_err());
        assert!(parse(&["frobnicate"]).is_err());
    }

    #[test]
    fn command_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
