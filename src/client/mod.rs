//! Catalog client and its builder

mod builder;
mod catalog;

pub use builder::{Marquee, MarqueeBuilder};
pub use catalog::CatalogClient;
