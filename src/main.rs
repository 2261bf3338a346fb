use aiscout::application::scoring::advanced::{AgentAnalysis, OpportunityContext};
use aiscout::cli::commands::{Cli, Commands};
use aiscout::config::AppConfig;
use aiscout::domain::entities::market_signal::MarketSignal;
use aiscout::domain::values::opportunity_status::OpportunityStatus;
use aiscout::domain::values::ranking::{FilterCriteria, RankingConfig, UserPreferences};
use aiscout::AiScout;
use anyhow::{Context, Result};
use clap::Parser;
use serde::Serialize;
use std::str::FromStr;

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("aiscout=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load().context("Invalid configuration")?;
    let scout = AiScout::new(&config).context("Failed to initialise aiscout")?;

    run_command(&scout, &config, cli.command)
}

fn run_command(scout: &AiScout, config: &AppConfig, cmd: Commands) -> Result<()> {
    match cmd {
        Commands::Discover { signals, batch_id } => {
            let signals = read_signals(&signals)?;
            let report = scout.discover(&signals, batch_id)?;
            print_json(&report)?;
        }
        Commands::Score {
            signals,
            context,
            agent,
        } => {
            let signals = read_signals(&signals)?;
            let context: Option<OpportunityContext> = context
                .map(|c| serde_json::from_str(&c))
                .transpose()
                .context("Invalid --context JSON")?;
            let agent: Option<AgentAnalysis> = agent
                .map(|a| serde_json::from_str(&a))
                .transpose()
                .context("Invalid --agent JSON")?;
            print_json(&scout.score(&signals, context.as_ref(), agent.as_ref()))?;
        }
        Commands::Analyze { signals } => {
            let signals = read_signals(&signals)?;
            print_json(&scout.analyze_competition(&signals))?;
        }
        Commands::Rank {
            status,
            ai_type,
            industry,
            tag,
            min_validation,
            min_feasibility,
            search,
            user,
            page,
            page_size,
            primary,
        } => {
            let filter = FilterCriteria {
                statuses: parse_all(&status)?,
                ai_solution_types: parse_all(&ai_type)?,
                target_industries: parse_all(&industry)?,
                tags: tag,
                min_validation_score: min_validation,
                min_ai_feasibility: min_feasibility,
                search_text: search,
                ..Default::default()
            };
            let result = match primary {
                Some(p) => {
                    let ranking = RankingConfig {
                        primary_criteria: p.parse().map_err(anyhow::Error::msg)?,
                        ..config.ranking.clone()
                    };
                    let prefs = user.as_deref().map(|u| scout.preferences(u));
                    scout.rank_with(&filter, &ranking, prefs.as_ref(), page, page_size)?
                }
                None => scout.rank(&filter, user.as_deref(), page, page_size)?,
            };
            print_json(&result)?;
        }
        Commands::Trending { limit } => {
            print_json(&scout.trending(limit)?)?;
        }
        Commands::Recommend { user, limit } => {
            print_json(&scout.recommend(&user, limit)?)?;
        }
        Commands::Validate {
            id,
            user,
            score,
            notes,
        } => {
            print_json(&scout.validate(&id, &user, score, notes)?)?;
        }
        Commands::Status { id, status } => {
            let status: OpportunityStatus = status.parse().map_err(anyhow::Error::msg)?;
            print_json(&scout.set_status(&id, status)?)?;
        }
        Commands::Bookmark { user, id, remove } => {
            if remove {
                scout.unbookmark(&user, &id)?;
                println!("Removed bookmark {id} for {user}");
            } else {
                scout.bookmark(&user, &id)?;
                println!("Bookmarked {id} for {user}");
            }
        }
        Commands::Prefs { user, json } => {
            if let Some(json) = json {
                let mut prefs: UserPreferences =
                    serde_json::from_str(&json).context("Invalid preferences JSON")?;
                prefs.user_id = user.clone();
                scout.save_preferences(&prefs)?;
            }
            print_json(&scout.preferences(&user))?;
        }
        Commands::Stats => {
            print_json(&scout.stats()?)?;
        }
    }
    Ok(())
}

fn read_signals(path: &str) -> Result<Vec<MarketSignal>> {
    let raw = std::fs::read_to_string(path).with_context(|| format!("Cannot read {path}"))?;
    Ok(MarketSignal::parse_batch(&raw)?)
}

fn parse_all<T: FromStr<Err = String>>(values: &[String]) -> Result<Vec<T>> {
    values
        .iter()
        .map(|v| v.parse::<T>().map_err(anyhow::Error::msg))
        .collect()
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
