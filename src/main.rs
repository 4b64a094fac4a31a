/// Main entry point for the rutin habit board
///
/// This file sets up logging, parses command line arguments, and either
/// starts the JSON-RPC server or runs a one-shot command (show, export,
/// import) against the saved board.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;

use rutin::{open_storage, render_text, Action, RutinServer, Session, StorageKind, ViewMode};

/// Get the default data directory with robust fallback strategy
fn get_default_data_dir() -> Result<PathBuf, Box<dyn std::error::Error>> {
    // Try various locations in order of preference
    let potential_paths = [
        // 1. User's home directory (preferred)
        dirs::home_dir().map(|mut p| {
            p.push(".rutin");
            p
        }),
        // 2. User's data directory (platform-specific)
        dirs::data_dir().map(|mut p| {
            p.push("rutin");
            p
        }),
        // 3. User's config directory
        dirs::config_dir().map(|mut p| {
            p.push("rutin");
            p
        }),
        // 4. Current working directory (last resort)
        std::env::current_dir().ok().map(|mut p| {
            p.push(".rutin");
            p
        }),
    ];

    for potential_path in potential_paths.iter().flatten() {
        if std::fs::create_dir_all(potential_path).is_ok() {
            // Probe that the directory is really writable
            let test_file = potential_path.join(".test_write");
            if std::fs::write(&test_file, "test").is_ok() {
                let _ = std::fs::remove_file(&test_file);
                return Ok(potential_path.clone());
            }
        }
    }

    // Ultimate fallback: use a temporary directory
    let mut temp_path = std::env::temp_dir();
    temp_path.push("rutin");
    std::fs::create_dir_all(&temp_path)?;

    tracing::warn!("Using temporary directory for data: {}", temp_path.display());
    Ok(temp_path)
}

/// Command line arguments for rutin
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Directory the board is saved in
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Storage medium for the board
    #[arg(long, value_enum, default_value_t = StorageKind::Json, global = true)]
    storage: StorageKind,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Serve JSON-RPC over stdin/stdout (the default)
    Serve,
    /// Print the board
    Show {
        /// Show the 18-week overview instead of this week
        #[arg(long)]
        overview: bool,
    },
    /// Write a dated backup file
    Export {
        /// Directory to write into (defaults to the current directory)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the board with the habits in a backup file
    Import {
        file: PathBuf,
        /// Replace a non-empty board without asking
        #[arg(long)]
        yes: bool,
    },
}

fn open_session(kind: StorageKind, data_dir: &std::path::Path) -> Result<Session, Box<dyn std::error::Error>> {
    Ok(Session::new(open_storage(kind, data_dir)?)?)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(format!("rutin={}", log_level))
        .with_writer(std::io::stderr) // stdout carries JSON-RPC and command output
        .init();

    let data_dir = match args.data_dir {
        Some(dir) => {
            std::fs::create_dir_all(&dir)?;
            dir
        }
        None => get_default_data_dir()?,
    };

    info!("Using data directory: {}", data_dir.display());

    match args.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            info!("Starting rutin server");
            let server = RutinServer::new(args.storage, &data_dir)?;
            server.run().await?;
            info!("rutin server shutdown complete");
        }
        Command::Show { overview } => {
            let mut session = open_session(args.storage, &data_dir)?;
            if overview {
                session.dispatch(Action::SetViewMode { mode: ViewMode::Overview })?;
            }
            print!("{}", render_text(&session.board()));
        }
        Command::Export { out } => {
            let session = open_session(args.storage, &data_dir)?;
            let dir = match out {
                Some(dir) => dir,
                None => std::env::current_dir()?,
            };
            let path = session.write_backup(&dir)?;
            println!("Backup written to {}", path.display());
        }
        Command::Import { file, yes } => {
            let mut session = open_session(args.storage, &data_dir)?;
            let habits = rutin::transfer::read_backup(&file).await?;

            let mut outcome = session.stage_import(habits);
            if session.store().pending_import().is_some() {
                if !yes {
                    session.dispatch(Action::CancelImport)?;
                    println!(
                        "This will replace your current {} habits. Run again with --yes to continue.",
                        session.habits().len()
                    );
                    return Ok(());
                }
                outcome = session.dispatch(Action::ConfirmImport)?;
            }

            for notice in &outcome.notices {
                println!("{}", notice);
            }
            if let Some(warning) = &outcome.save_warning {
                eprintln!("{}", warning);
            }
        }
    }

    Ok(())
}
