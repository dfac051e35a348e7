//! downtrack - Main Entry Point

use std::env;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use downtrack::logging::init_logging;
use downtrack::{Bot, Config, Database, RedditClient, Scanner};

use tracing::{error, info};

type AnyError = Box<dyn std::error::Error + Send + Sync>;

async fn run_bot(config: Config) -> Result<(), AnyError> {
    info!("Starting downtrack...");

    let db = Arc::new(Database::new(&config.database.path)?);
    db.initialize()?;
    let stats = db.get_stats()?;
    info!(
        "Database initialized: {} tracked users, {} comments recorded",
        stats.tracked_count, stats.comment_count
    );

    let client = RedditClient::new(config.client.clone())?;
    let scanner = Scanner::new(client, db.clone(), config.scanner.mode);
    let bot = Bot::new(
        db,
        scanner,
        Duration::from_secs(config.scanner.idle_interval_secs),
        Duration::from_secs(config.scanner.cycle_interval_secs),
    );

    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received, shutting down");
            let _ = shutdown_tx.send(true);
        }
    });

    bot.run(shutdown_rx).await?;
    info!("downtrack stopped");
    Ok(())
}

fn cmd_run(config_path: &str) -> Result<(), AnyError> {
    let config = Config::load(Path::new(config_path))?;
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run_bot(config))
}

fn cmd_add(config_path: &str, username: &str, hidden: bool) -> Result<(), AnyError> {
    let config = Config::load(Path::new(config_path))?;
    let db = Database::new(&config.database.path)?;
    db.initialize()?;

    match db.add_user(username, hidden) {
        Ok(()) => {
            info!("Now tracking user '{}'", username);
            Ok(())
        }
        Err(e) if e.is_constraint_violation() => {
            Err(format!("user '{}' is already tracked", username).into())
        }
        Err(e) => Err(e.into()),
    }
}

fn cmd_purge(config_path: &str, cutoff: i64) -> Result<(), AnyError> {
    let config = Config::load(Path::new(config_path))?;
    let db = Database::new(&config.database.path)?;
    db.initialize()?;

    let removed = db.cleanup(cutoff)?;
    info!("Removed {} comments with score {}", removed, cutoff);
    Ok(())
}

fn usage() {
    eprintln!("usage: downtrack run <config.toml>");
    eprintln!("       downtrack add <config.toml> <username> [--hidden]");
    eprintln!("       downtrack purge <config.toml> [cutoff]");
}

fn main() {
    init_logging();

    let args: Vec<String> = env::args().collect();
    let result = match (args.get(1).map(|s| s.as_str()), args.get(2)) {
        (Some("run"), Some(config_path)) => cmd_run(config_path),
        (Some("add"), Some(config_path)) => match args.get(3) {
            Some(username) => {
                let hidden = args.get(4).map(|s| s.as_str()) == Some("--hidden");
                cmd_add(config_path, username, hidden)
            }
            None => {
                usage();
                std::process::exit(2);
            }
        },
        (Some("purge"), Some(config_path)) => {
            let cutoff = match args.get(3) {
                Some(raw) => match raw.parse::<i64>() {
                    Ok(v) => v,
                    Err(_) => {
                        eprintln!("invalid cutoff: {}", raw);
                        std::process::exit(2);
                    }
                },
                None => 0,
            };
            cmd_purge(config_path, cutoff)
        }
        _ => {
            usage();
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        error!("Fatal: {}", e);
        std::process::exit(1);
    }
}
