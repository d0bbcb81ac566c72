use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use tipoff::adapters::{GammaClient, MemoryStore, PostgresStore, RecordStore, ScheduleClient};
use tipoff::cache::TtlCache;
use tipoff::config::AppConfig;
use tipoff::domain::{BetStatus, Category, StrategyConfig};
use tipoff::error::Result;
use tipoff::execution::{BetLifecycle, HttpExecutionClient};
use tipoff::forecast::ChatForecaster;
use tipoff::odds::extract_odds;
use tipoff::strategy::ScanEngine;

#[derive(Parser)]
#[command(name = "tipoff", version, about = "Sports prediction-market edge scanner")]
struct Cli {
    /// Configuration directory
    #[arg(long, default_value = "config")]
    config_dir: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a reconciliation scan and persist analyses
    Scan {
        /// basketball, football or esports
        #[arg(long, default_value = "basketball")]
        category: Category,
    },
    /// Scan and place qualifying bets for a user's auto strategy
    Auto {
        /// User identifier (wallet address)
        #[arg(long)]
        user: String,
    },
    /// List matched fixtures and futures events for a category
    Markets {
        #[arg(long, default_value = "football")]
        category: Category,
    },
    /// Show the schedule (today by default)
    Games {
        /// Days from today (0 = today, 1 = tomorrow, ...)
        #[arg(long, default_value_t = 0)]
        offset: u32,
    },
    /// Create a betting strategy for a user
    Strategy {
        #[arg(long)]
        user: String,
        #[arg(long, default_value = "default")]
        name: String,
        #[arg(long, default_value = "0.6")]
        min_confidence: Decimal,
        #[arg(long, default_value = "10")]
        max_bet: Decimal,
        #[arg(long, default_value = "50")]
        daily_budget: Decimal,
        /// Let the auto command place bets under this strategy
        #[arg(long)]
        auto_execute: bool,
    },
    /// Apply an external settlement event to a bet
    Settle {
        #[arg(long)]
        bet: Uuid,
        /// filled, cancelled or settled
        #[arg(long)]
        status: BetStatus,
        #[arg(long)]
        pnl: Option<Decimal>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config_dir)?;
    if let Err(errors) = config.validate() {
        for error in &errors {
            eprintln!("config error: {error}");
        }
        return Err(tipoff::TipoffError::Validation(format!(
            "{} configuration error(s)",
            errors.len()
        )));
    }

    match cli.command {
        Commands::Scan { category } => {
            init_logging(&config);
            let engine = build_engine(&config).await?;
            let outcome = engine.scan(category).await?;
            info!(
                "scan complete: analyzed={} with_edge={} failed={}",
                outcome.analyzed(),
                outcome.with_edge(),
                outcome.failed
            );
            for analysis in &outcome.analyses {
                println!(
                    "{} vs {} | {} | edge {} | side {}",
                    analysis.home_team,
                    analysis.away_team,
                    analysis.game_date,
                    analysis.edge_percent,
                    analysis.recommended_side
                );
            }
        }
        Commands::Auto { user } => {
            init_logging(&config);
            let engine = build_engine(&config).await?;
            let report = engine.execute_auto(&user).await?;
            info!(
                "auto-execute complete: executed={} skipped={}",
                report.executed, report.skipped
            );
        }
        Commands::Markets { category } => {
            init_logging_simple();
            let engine = build_engine(&config).await?;
            let (fixtures, futures) = engine.matches_and_futures(category).await?;

            println!("== {category} fixtures ({}) ==", fixtures.len());
            for fixture in &fixtures {
                let odds = extract_odds(
                    &fixture.event.markets,
                    &fixture.home,
                    &fixture.away,
                    category,
                );
                println!(
                    "{} vs {} | home {} | away {} | vol {}",
                    fixture.home.canonical,
                    fixture.away.canonical,
                    odds.moneyline_home
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    odds.moneyline_away
                        .map(|p| p.to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    fixture.event.volume
                );
            }

            println!("== {category} futures ({}) ==", futures.len());
            for event in &futures {
                println!("{} | vol {}", event.title, event.volume);
            }
        }
        Commands::Strategy {
            user,
            name,
            min_confidence,
            max_bet,
            daily_budget,
            auto_execute,
        } => {
            init_logging_simple();
            let store = build_store(&config).await?;
            let strategy = StrategyConfig {
                id: Uuid::new_v4(),
                user_id: user,
                name,
                is_active: true,
                min_confidence,
                max_bet_amount: max_bet,
                daily_budget,
                auto_execute,
            };
            store.create_strategy(&strategy).await?;
            println!("created strategy {} ({})", strategy.name, strategy.id);
        }
        Commands::Settle { bet, status, pnl } => {
            init_logging_simple();
            let store = build_store(&config).await?;
            let executor = Arc::new(HttpExecutionClient::new(
                &config.providers.schedule_url,
                config.dry_run.enabled,
            )?);
            let lifecycle = BetLifecycle::new(store, executor);
            lifecycle.apply_settlement(bet, status, pnl).await?;
            println!("bet {bet} -> {status}");
        }
        Commands::Games { offset } => {
            init_logging_simple();
            let schedule = ScheduleClient::new(&config.providers.schedule_url)?;
            let games = schedule.fetch_schedule(offset).await;
            if games.is_empty() {
                println!("no games scheduled");
            }
            for game in &games {
                println!(
                    "{} @ {} | {} | {}",
                    game.away_team.team_abbreviation,
                    game.home_team.team_abbreviation,
                    game.game_date,
                    game.status
                );
            }
        }
    }

    Ok(())
}

async fn build_store(config: &AppConfig) -> Result<Arc<dyn RecordStore>> {
    if config.dry_run.enabled {
        warn!("dry run: using in-memory store, no orders will be sent");
        Ok(Arc::new(MemoryStore::new()))
    } else {
        let store =
            PostgresStore::new(&config.database.url, config.database.max_connections).await?;
        store.migrate().await?;
        Ok(Arc::new(store))
    }
}

async fn build_engine(config: &AppConfig) -> Result<ScanEngine> {
    let cache = Arc::new(TtlCache::new());
    let schedule = ScheduleClient::new(&config.providers.schedule_url)?;
    let gamma = GammaClient::new(
        &config.providers.gamma_url,
        config.providers.event_fetch_limit,
    )?;
    let forecaster = Arc::new(ChatForecaster::new(config.forecast.clone())?);
    let store = build_store(config).await?;

    let executor = Arc::new(HttpExecutionClient::new(
        &config.providers.schedule_url,
        config.dry_run.enabled,
    )?);
    let lifecycle = Arc::new(BetLifecycle::new(store.clone(), executor));

    Ok(ScanEngine::new(
        config,
        cache,
        schedule,
        gamma,
        forecaster,
        store,
        lifecycle,
    ))
}

fn init_logging(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{},sqlx=warn", config.logging.level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false);

    if config.logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn init_logging_simple() {
    // Minimal logging for listing commands
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::WARN)
        .try_init();
}
