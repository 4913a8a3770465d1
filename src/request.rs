//! Request building: validated endpoint variants, canonical fingerprints and
//! fully qualified request URLs.
//!
//! Everything in this module is pure. The same [`Endpoint`] under the same
//! [`ClientConfig`] always yields the same [`Fingerprint`] and URL.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use reqwest::Url;

use crate::config::ClientConfig;
use crate::{CatalogError, Result};

/// Highest page number TMDB serves for paginated listings.
pub const MAX_PAGE: u32 = 500;

/// Sub-resources merged into title detail responses.
pub const DETAILS_APPEND: &str = "credits,videos";

/// Image size used when the caller does not pick one.
pub const DEFAULT_IMAGE_SIZE: &str = "original";

/// Canonical identity of a logical request, shared by the cache and the
/// in-flight registry.
///
/// Built from the endpoint path and its parameters sorted by key, so bags
/// that differ only in insertion order collide. Delimiters inside keys and
/// values are percent-escaped, so distinct bags never do:
///
/// ```rust
/// # use marquee::request::Fingerprint;
/// let a = Fingerprint::new("/trending/all/week", [("page", "1"), ("window", "week")]);
/// let b = Fingerprint::new("/trending/all/week", [("window", "week"), ("page", "1")]);
/// assert_eq!(a, b);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn new<K, V>(path: &str, params: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let sorted: BTreeMap<String, String> = params
            .into_iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();

        let mut key = String::with_capacity(path.len());
        push_escaped(&mut key, path);
        for (i, (k, v)) in sorted.iter().enumerate() {
            key.push(if i == 0 { '?' } else { '&' });
            push_escaped(&mut key, k);
            key.push('=');
            push_escaped(&mut key, v);
        }
        Self(key)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Percent-escape the characters that delimit fingerprint components.
fn push_escaped(out: &mut String, s: &str) {
    for c in s.chars() {
        match c {
            '%' => out.push_str("%25"),
            '&' => out.push_str("%26"),
            '=' => out.push_str("%3D"),
            '?' => out.push_str("%3F"),
            c => out.push(c),
        }
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Window for the trending listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimeWindow {
    Day,
    Week,
}

impl TimeWindow {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeWindow::Day => "day",
            TimeWindow::Week => "week",
        }
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeWindow {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "day" => Ok(TimeWindow::Day),
            "week" => Ok(TimeWindow::Week),
            other => Err(CatalogError::Validation(format!(
                "unknown time window '{other}' (expected 'day' or 'week')"
            ))),
        }
    }
}

/// The closed set of catalog queries the client can issue.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Endpoint {
    /// Trending movies, series and people.
    Trending { window: TimeWindow, page: u32 },
    /// Popular movies.
    PopularMovies { page: u32 },
    /// One movie, with credits and videos merged in.
    MovieDetails { id: u64 },
    /// One series, with credits and videos merged in.
    SeriesDetails { id: u64 },
    /// Movies, series and people matching a free-text query.
    SearchMulti { query: String, page: u32 },
    /// Genre vocabulary for movies.
    MovieGenres,
    /// Genre vocabulary for series.
    TvGenres,
}

impl Endpoint {
    /// Short operation name, used as a metrics label and in logs.
    pub fn operation(&self) -> &'static str {
        match self {
            Endpoint::Trending { .. } => "trending",
            Endpoint::PopularMovies { .. } => "popular_movies",
            Endpoint::MovieDetails { .. } => "movie_details",
            Endpoint::SeriesDetails { .. } => "series_details",
            Endpoint::SearchMulti { .. } => "search_multi",
            Endpoint::MovieGenres => "movie_genres",
            Endpoint::TvGenres => "tv_genres",
        }
    }

    /// Check parameters against the domain TMDB accepts.
    pub fn validate(&self) -> Result<()> {
        match self {
            Endpoint::Trending { page, .. }
            | Endpoint::PopularMovies { page }
            | Endpoint::SearchMulti { page, .. }
                if !(1..=MAX_PAGE).contains(page) =>
            {
                Err(CatalogError::Validation(format!(
                    "page must be between 1 and {MAX_PAGE}, got {page}"
                )))
            }
            Endpoint::MovieDetails { id: 0 } | Endpoint::SeriesDetails { id: 0 } => Err(
                CatalogError::Validation("title id must be a positive integer".into()),
            ),
            Endpoint::SearchMulti { query, .. } if query.trim().is_empty() => Err(
                CatalogError::Validation("search query must not be empty".into()),
            ),
            _ => Ok(()),
        }
    }

    /// Path relative to the API root.
    pub fn path(&self) -> String {
        match self {
            Endpoint::Trending { window, .. } => format!("/trending/all/{window}"),
            Endpoint::PopularMovies { .. } => "/movie/popular".to_string(),
            Endpoint::MovieDetails { id } => format!("/movie/{id}"),
            Endpoint::SeriesDetails { id } => format!("/tv/{id}"),
            Endpoint::SearchMulti { .. } => "/search/multi".to_string(),
            Endpoint::MovieGenres => "/genre/movie/list".to_string(),
            Endpoint::TvGenres => "/genre/tv/list".to_string(),
        }
    }

    /// Endpoint-specific query parameters (excluding the API key and
    /// language, which the client adds to every request).
    pub fn params(&self) -> BTreeMap<&'static str, String> {
        let mut params = BTreeMap::new();
        match self {
            Endpoint::Trending { page, .. } | Endpoint::PopularMovies { page } => {
                params.insert("page", page.to_string());
            }
            Endpoint::MovieDetails { .. } | Endpoint::SeriesDetails { .. } => {
                params.insert("append_to_response", DETAILS_APPEND.to_string());
            }
            Endpoint::SearchMulti { query, page } => {
                params.insert("query", query.trim().to_string());
                params.insert("page", page.to_string());
            }
            Endpoint::MovieGenres | Endpoint::TvGenres => {}
        }
        params
    }
}

/// A validated endpoint resolved against a configuration.
#[derive(Debug, Clone)]
pub struct PreparedRequest {
    pub operation: &'static str,
    pub fingerprint: Fingerprint,
    pub url: Url,
}

impl PreparedRequest {
    /// Validate `endpoint` and compose its fingerprint and URL.
    ///
    /// Fails with [`CatalogError::Validation`] before anything touches the
    /// network.
    pub fn new(config: &ClientConfig, endpoint: &Endpoint) -> Result<Self> {
        endpoint.validate()?;

        let path = endpoint.path();
        let mut params = endpoint.params();
        params.insert("language", config.language.clone());

        let fingerprint = Fingerprint::new(&path, params.iter().map(|(k, v)| (*k, v)));

        let mut url = Url::parse(&format!("{}{path}", config.base_url)).map_err(|e| {
            CatalogError::Configuration(format!("invalid request URL for {path}: {e}"))
        })?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("api_key", &config.api_key);
            for (k, v) in &params {
                query.append_pair(k, v);
            }
        }

        Ok(Self {
            operation: endpoint.operation(),
            fingerprint,
            url,
        })
    }
}

/// Build a fully qualified image asset URL.
///
/// Returns `None` for an absent or empty `path`; `size` defaults to
/// [`DEFAULT_IMAGE_SIZE`].
///
/// ```rust
/// # use marquee::request::image_url;
/// assert_eq!(
///     image_url("https://image.tmdb.org", Some("/test.jpg"), Some("w500")).as_deref(),
///     Some("https://image.tmdb.org/t/p/w500/test.jpg"),
/// );
/// assert_eq!(image_url("https://image.tmdb.org", None, None), None);
/// ```
pub fn image_url(base: &str, path: Option<&str>, size: Option<&str>) -> Option<String> {
    let path = path.filter(|p| !p.is_empty())?;
    let size = size.filter(|s| !s.is_empty()).unwrap_or(DEFAULT_IMAGE_SIZE);
    Some(format!("{}/t/p/{size}{path}", base.trim_end_matches('/')))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig::new("secret").base_url("http://localhost:1234/3")
    }

    #[test]
    fn fingerprint_ignores_insertion_order() {
        let a = Fingerprint::new("/x", vec![("page", "1"), ("window", "week")]);
        let b = Fingerprint::new("/x", vec![("window", "week"), ("page", "1")]);
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "/x?page=1&window=week");
    }

    #[test]
    fn fingerprint_delimiters_in_values_do_not_collide() {
        let smuggled = Fingerprint::new("/x", [("a", "1&b=2")]);
        let split = Fingerprint::new("/x", [("a", "1"), ("b", "2")]);
        assert_ne!(smuggled, split);
        assert_eq!(smuggled.as_str(), "/x?a=1%26b%3D2");

        let in_path = Fingerprint::new("/x?a=1", Vec::<(&str, &str)>::new());
        assert_ne!(in_path, Fingerprint::new("/x", [("a", "1")]));

        let literal = Fingerprint::new("/x", [("q", "100%26")]);
        assert_ne!(literal, Fingerprint::new("/x", [("q", "100&")]));
    }

    #[test]
    fn fingerprint_without_params_is_path() {
        let fp = Fingerprint::new("/genre/tv/list", Vec::<(&str, &str)>::new());
        assert_eq!(fp.as_str(), "/genre/tv/list");
    }

    #[test]
    fn fingerprint_excludes_api_key() {
        let req = PreparedRequest::new(&config(), &Endpoint::PopularMovies { page: 2 }).unwrap();
        assert!(!req.fingerprint.as_str().contains("secret"));
        assert_eq!(
            req.fingerprint.as_str(),
            "/movie/popular?language=en-US&page=2"
        );
    }

    #[test]
    fn details_append_is_part_of_fingerprint() {
        let req = PreparedRequest::new(&config(), &Endpoint::MovieDetails { id: 550 }).unwrap();
        assert!(
            req.fingerprint
                .as_str()
                .contains("append_to_response=credits,videos")
        );
        assert_eq!(req.url.path(), "/3/movie/550");
    }

    #[test]
    fn url_carries_api_key_and_page() {
        let req = PreparedRequest::new(&config(), &Endpoint::PopularMovies { page: 5 }).unwrap();
        let pairs: BTreeMap<String, String> = req.url.query_pairs().into_owned().collect();
        assert_eq!(pairs["api_key"], "secret");
        assert_eq!(pairs["page"], "5");
        assert_eq!(pairs["language"], "en-US");
    }

    #[test]
    fn search_query_spaces_become_plus() {
        let endpoint = Endpoint::SearchMulti {
            query: "the dark knight".into(),
            page: 1,
        };
        let req = PreparedRequest::new(&config(), &endpoint).unwrap();
        assert!(req.url.as_str().contains("query=the+dark+knight"));
    }

    #[test]
    fn trending_path_uses_window() {
        let endpoint = Endpoint::Trending {
            window: TimeWindow::Day,
            page: 1,
        };
        assert_eq!(endpoint.path(), "/trending/all/day");
    }

    #[test]
    fn page_bounds() {
        assert!(Endpoint::PopularMovies { page: 0 }.validate().is_err());
        assert!(Endpoint::PopularMovies { page: 1 }.validate().is_ok());
        assert!(Endpoint::PopularMovies { page: MAX_PAGE }.validate().is_ok());
        assert!(
            Endpoint::PopularMovies {
                page: MAX_PAGE + 1
            }
            .validate()
            .is_err()
        );
    }

    #[test]
    fn empty_search_rejected() {
        let endpoint = Endpoint::SearchMulti {
            query: "   ".into(),
            page: 1,
        };
        assert!(matches!(
            endpoint.validate(),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn zero_id_rejected() {
        assert!(Endpoint::MovieDetails { id: 0 }.validate().is_err());
        assert!(Endpoint::SeriesDetails { id: 0 }.validate().is_err());
    }

    #[test]
    fn time_window_parsing() {
        assert_eq!("day".parse::<TimeWindow>().unwrap(), TimeWindow::Day);
        assert_eq!("WEEK".parse::<TimeWindow>().unwrap(), TimeWindow::Week);
        assert!(matches!(
            "month".parse::<TimeWindow>(),
            Err(CatalogError::Validation(_))
        ));
    }

    #[test]
    fn image_url_variants() {
        let base = "https://image.tmdb.org";
        assert_eq!(
            image_url(base, Some("/test.jpg"), None).as_deref(),
            Some("https://image.tmdb.org/t/p/original/test.jpg")
        );
        assert_eq!(image_url(base, Some(""), Some("w500")), None);
    }
}
