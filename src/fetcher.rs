use std::time::Duration;

use reqwest::blocking::Client;
use tracing::debug;
use url::Url;

use crate::error::{Result, ScrapeError};

/// Source of raw search-result pages.
pub trait PageFetcher {
    fn fetch(&self, url: &Url) -> Result<String>;
}

impl<T: PageFetcher + ?Sized> PageFetcher for &T {
    fn fetch(&self, url: &Url) -> Result<String> {
        (**self).fetch(url)
    }
}

/// Plain blocking GET. No timeout, no retry, no custom headers: a hung
/// request blocks the run and any failure ends it.
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(None::<Duration>)
            .build()
            .map_err(ScrapeError::Client)?;
        Ok(Self { client })
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &Url) -> Result<String> {
        debug!(url = %url, "GET");
        let http_err = |source| ScrapeError::Http {
            url: url.to_string(),
            source,
        };
        self.client
            .get(url.clone())
            .send()
            .and_then(|response| response.error_for_status())
            .and_then(|response| response.text())
            .map_err(http_err)
    }
}
