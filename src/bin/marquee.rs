//! marquee: TMDB catalog CLI
//!
//! Query the catalog from the command line through the same cached client
//! applications use.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use marquee::config::file::FileConfig;
use marquee::{Marquee, TimeWindow};

/// Marquee TMDB catalog client
#[derive(Parser)]
#[command(name = "marquee")]
#[command(version = marquee::PKG_VERSION)]
#[command(about = "Query the TMDB movie and TV catalog")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Response language (overrides the config file).
    #[arg(short, long, env = "TMDB_LANGUAGE")]
    language: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Trending movies, series and people
    Trending {
        /// Time window: day or week
        #[arg(short, long, default_value = "week")]
        window: String,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Popular movies
    Popular {
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Movie details with credits and videos
    Movie {
        /// TMDB movie id
        id: u64,
    },

    /// Series details with credits and videos
    Series {
        /// TMDB series id
        id: u64,
    },

    /// Search movies, series and people
    Search {
        /// Search text
        query: Vec<String>,
        #[arg(short, long, default_value_t = 1)]
        page: u32,
    },

    /// Genre vocabulary
    Genres {
        #[arg(value_enum, default_value = "movie")]
        kind: GenreKind,
    },

    /// Build an image URL from a TMDB image path
    Image {
        /// Image path, e.g. /kqjL17yufvn9OVLyXYpvtyrFfak.jpg
        path: String,
        /// Size token, e.g. w500 (default: original)
        #[arg(short, long)]
        size: Option<String>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum GenreKind {
    Movie,
    Tv,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialise tracing (default: warn for CLI; override with RUST_LOG).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = FileConfig::load(args.config.as_deref())?.into_client_config()?;
    if let Some(language) = args.language {
        config = config.language(language);
    }

    let client = Marquee::builder().config(config).build()?;

    let value = match args.command {
        Command::Trending { window, page } => {
            let window: TimeWindow = window.parse()?;
            client.trending(window, page).await?
        }
        Command::Popular { page } => client.popular_movies(page).await?,
        Command::Movie { id } => client.movie_details(id).await?,
        Command::Series { id } => client.series_details(id).await?,
        Command::Search { query, page } => client.search_multi(&query.join(" "), page).await?,
        Command::Genres { kind } => match kind {
            GenreKind::Movie => client.movie_genres().await?,
            GenreKind::Tv => client.tv_genres().await?,
        },
        Command::Image { path, size } => {
            match client.image_url(Some(&path), size.as_deref()) {
                Some(url) => println!("{url}"),
                None => eprintln!("no image path given"),
            }
            return Ok(());
        }
    };

    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}
