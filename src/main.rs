//! Binary entrypoint for the snakesave CLI.
//!
//! Commands:
//! - `init` - write a starter `snakesave.toml` and seed the save store
//! - `show [--json]` - print the catalog, ledger and save string
//! - `buy <section> <index>` - purchase an unlock or powerup level
//! - `select <section> <index>` - wear an owned hat or color scheme
//! - `finish-run <score>` - bank a run (daily reward, highscore, checkpoint)
//! - `export` - print the raw save string
//! - `import <save>` - validate a save string and store it
//!
//! See the library crate docs for module-level details: `snakesave::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{info, warn};

use snakesave::config::Config;
use snakesave::progress::{
    format_section_listing, Catalog, Progress, Section, Session, SledBlobStore, StandardCatalog,
};

#[derive(Parser)]
#[command(name = "snakesave")]
#[command(about = "Inspect and edit snake game progression saves")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "snakesave.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration and seed the save store
    Init,
    /// Show catalog, ledger and save string
    Show {
        /// Print a JSON snapshot instead of the listing
        #[arg(long)]
        json: bool,
    },
    /// Buy an unlock (hats, colors) or one powerup level
    Buy {
        /// hats, colors or powerups
        section: Section,
        index: usize,
    },
    /// Wear an owned hat or color scheme
    Select {
        /// hats or colors
        section: Section,
        index: usize,
    },
    /// Bank a finished run's score
    FinishRun { score: u32 },
    /// Print the raw save string
    Export,
    /// Validate a save string and replace the stored one with it
    Import { save: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init writes the config, everything else reads it.
    let config = match cli.command {
        Commands::Init => Config::default(),
        _ => match Config::load(&cli.config).await {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}; using defaults (run `snakesave init` to create one)");
                Config::default()
            }
        },
    };
    init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Init => {
            info!("Initializing snakesave configuration");
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
            let session = open_session(&config)?;
            info!(
                "Save store ready at {} ({:?})",
                config.storage.data_dir,
                session.outcome()
            );
        }
        Commands::Show { json } => {
            let session = open_session(&config)?;
            let progress = session.progress();
            if json {
                let payload = serde_json::json!({
                    "outcome": session.outcome(),
                    "save": progress.encode(),
                    "something_purchaseable": progress.is_something_purchaseable(),
                    "progress": progress,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                print_progress(progress);
            }
        }
        Commands::Buy { section, index } => {
            let mut session = open_session(&config)?;
            let paid = session
                .progress_mut()
                .unlock_purchaseable(section, index)?;
            session.checkpoint()?;
            let progress = session.progress();
            println!(
                "Bought {} for {}. Balance: {}",
                progress.purchaseable_name(section, index)?,
                paid,
                progress.total_score()
            );
        }
        Commands::Select { section, index } => {
            let mut session = open_session(&config)?;
            session.progress_mut().select_purchaseable(section, index)?;
            session.checkpoint()?;
            println!(
                "Now wearing {}",
                session.progress().purchaseable_name(section, index)?
            );
        }
        Commands::FinishRun { score } => {
            let mut session = open_session(&config)?;
            let summary = session.finish_run(score, chrono::Utc::now())?;
            if let Some(bonus) = summary.daily_reward {
                println!("Daily play reward: +{}", bonus);
            }
            println!(
                "Score {} | total {} | best {}{}",
                summary.score,
                summary.total_score,
                summary.highscore,
                if summary.new_highscore { " (new!)" } else { "" }
            );
            if summary.something_purchaseable {
                println!("Something new is affordable in the shop.");
            }
        }
        Commands::Export => {
            let session = open_session(&config)?;
            println!("{}", session.progress().encode());
        }
        Commands::Import { save } => {
            let mut session = open_session(&config)?;
            let mut imported = Progress::new(Catalog::from_provider(&StandardCatalog)?);
            imported
                .decode(&save)
                .map_err(|e| anyhow!("Rejected save string: {}", e))?;
            *session.progress_mut() = imported;
            session.checkpoint()?;
            println!("Imported save string into '{}'", session.save_key());
        }
    }

    Ok(())
}

fn open_session(config: &Config) -> Result<Session<SledBlobStore>> {
    let store = SledBlobStore::open(&config.storage.data_dir)?;
    let catalog = Catalog::from_provider(&StandardCatalog)?;
    let session = Session::open(store, config.storage.save_key.clone(), catalog)?
        .with_rewards(config.rewards.policy());
    Ok(session)
}

fn print_progress(progress: &Progress) {
    for section in Section::ALL {
        for line in format_section_listing(progress, section) {
            println!("{}", line);
        }
    }
    println!(
        "Highscore: {}  Total: {}",
        progress.highscore(),
        progress.total_score()
    );
    println!("Save: {}", progress.encode());
}

fn init_logging(config: &Config, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config.logging.level_filter(),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let log_file = config.logging.file.as_ref().and_then(|file| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(file)
            .map_err(|e| eprintln!("Cannot open log file {}: {}", file, e))
            .ok()
    });

    if let Some(f) = log_file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when someone is watching.
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    if builder.try_init().is_err() {
        warn!("Logger already initialized");
    }
}
