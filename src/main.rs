//! CLI entry point for galley

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "galley")]
#[command(version)]
#[command(about = "A small static site generator for Markdown blogs", long_about = None)]
struct Cli {
    /// Set the site directory (defaults to current directory)
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
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post or page
    New {
        /// Layout to use (post, page)
        #[arg(short, long, default_value = "post")]
        layout: String,

        /// Title of the new post
        title: String,
    },

    /// Build the static site
    #[command(alias = "b")]
    Build {
        /// Watch for file changes and rebuild
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Serve without watching for changes
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the output directory
    Clean,

    /// List site content
    List {
        /// Type of content to list (post, page, tag, category)
        #[arg(default_value = "post")]
        r#type: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "galley=debug,info"
    } else {
        "galley=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            galley::commands::init::init_site(&target_dir)?;
            println!("Initialized new site in {:?}", target_dir);
        }

        Commands::New { layout, title } => {
            let site = galley::Site::new(&base_dir)?;
            tracing::info!("Creating new {} with title: {}", layout, title);
            galley::commands::new::create(&site, &title, &layout)?;
        }

        Commands::Build { watch } => {
            let site = galley::Site::new(&base_dir)?;
            tracing::info!("Building site...");

            site.build()?;
            println!("Build complete.");

            if watch {
                galley::commands::build::watch(&site).await?;
            }
        }

        Commands::Serve {
            port,
            ip,
            open,
            r#static,
        } => {
            let site = galley::Site::new(&base_dir)?;

            // Build first so there is something to serve
            tracing::info!("Building site...");
            site.build()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            galley::server::start(&site, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let site = galley::Site::new(&base_dir)?;
            tracing::info!("Cleaning output directory...");
            site.clean()?;
            println!("Cleaned.");
        }

        Commands::List { r#type } => {
            let site = galley::Site::new(&base_dir)?;
            galley::commands::list::run(&site, &r#type)?;
        }
    }

    Ok(())
}
