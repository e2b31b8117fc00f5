//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio_rs::commands::show::Format;

#[derive(Parser)]
#[command(name = "folio")]
#[command(author = "Yukang Chen")]
#[command(version)]
#[command(about = "Load and check front-matter articles of a markdown blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new draft article
    New {
        /// Title of the new article
        title: String,

        /// File name for the new article (relative to the content dir)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// List site information
    List {
        /// Type of content to list (post, draft, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Parse every article and report malformed front-matter
    Check {
        /// Parse files concurrently
        #[arg(long)]
        parallel: bool,
    },

    /// Show one parsed article
    Show {
        /// Article file (absolute, or relative to the content dir or cwd)
        file: PathBuf,

        /// Output format (yaml, json, html)
        #[arg(short, long, default_value = "yaml")]
        format: Format,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio_rs=debug,info"
    } else {
        "folio_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::New { title, path } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            tracing::info!("Creating new article with title: {}", title);
            let created = folio.new_article(&title, path.as_deref())?;
            println!("Created: {:?}", created);
        }

        Commands::List { r#type } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::list::run(&folio, &r#type)?;
        }

        Commands::Check { parallel } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            if parallel {
                folio_rs::commands::check::run_concurrent(&folio).await?;
            } else {
                folio_rs::commands::check::run(&folio)?;
            }
        }

        Commands::Show { file, format } => {
            let folio = folio_rs::Folio::new(&base_dir)?;
            folio_rs::commands::show::run(&folio, &file, format)?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
