//! Marquee - cached, deduplicating client for the TMDB catalog API
//!
//! This crate turns application queries ("trending this week", "movie #550
//! with cast and trailers") into validated, fingerprinted HTTP requests.
//! Identical requests within the cache TTL are answered from memory, and
//! concurrent identical requests share a single network call. Every failure
//! is reported through one error type, [`CatalogError`].
//!
//! # Example
//!
//! ```rust,no_run
//! use marquee::{Marquee, TimeWindow};
//!
//! #[tokio::main]
//! async fn main() -> marquee::Result<()> {
//!     let client = Marquee::builder()
//!         .api_key("your-tmdb-key")
//!         .build()?;
//!
//!     let trending = client.trending(TimeWindow::Week, 1).await?;
//!     for item in trending["results"].as_array().into_iter().flatten() {
//!         println!("{}", item["title"].as_str().or(item["name"].as_str()).unwrap_or("?"));
//!     }
//!
//!     let movie = client.movie_details(550).await?;
//!     let poster = client.image_url(movie["poster_path"].as_str(), Some("w500"));
//!     println!("{poster:?}");
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod telemetry;
pub mod transport;
pub mod types;

// Re-export main types at crate root
pub use cache::{CacheConfig, ResponseCache};
pub use client::{CatalogClient, Marquee, MarqueeBuilder};
pub use config::ClientConfig;
pub use error::{CatalogError, Result};
pub use request::{Endpoint, Fingerprint, TimeWindow, image_url};
pub use transport::{RawResponse, ReqwestTransport, Transport};
pub use types::{Genre, GenreList, MediaSummary, Paged};

/// Package version from Cargo.toml.
pub const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");
