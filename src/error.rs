use thiserror::Error;

/// Everything that can stop a scrape run.
///
/// Only the rating field degrades gracefully, so it has no variant here.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Transport failure or non-success status
    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("results container not found in page")]
    MissingContainer,

    /// The portal returned more listings than were asked for, so the
    /// page-size contract with the site no longer holds.
    #[error("page holds {found} listings but page size is {page_size}")]
    PageSizeExceeded { found: usize, page_size: u32 },

    #[error("listing has no {field}")]
    MissingField { field: &'static str },

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
