//! Locates listing blocks in a search-results page.
//!
//! The site contract: results live in `table[role="main"]`, the listings are
//! inside the first table nested in it, and each listing is a `div` carrying
//! `data-tn-component="organicJob"`. If the site changes layout, this module
//! and `extractor` are the only places that need editing.

use std::sync::LazyLock;

use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, ScrapeError};

const CONTAINER: &str = r#"table[role="main"]"#;
const INNER_TABLE: &str = "table";
const LISTING: &str = r#"div[data-tn-component="organicJob"]"#;

static CONTAINER_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(CONTAINER).expect("container selector"));
static INNER_TABLE_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(INNER_TABLE).expect("table selector"));
static LISTING_SEL: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(LISTING).expect("listing selector"));

pub struct ListingPage {
    document: Html,
}

impl ListingPage {
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// Listing handles in document order.
    pub fn listings(&self) -> Result<Vec<ElementRef<'_>>> {
        let container = self
            .document
            .select(&CONTAINER_SEL)
            .next()
            .ok_or(ScrapeError::MissingContainer)?;
        let results = container
            .select(&INNER_TABLE_SEL)
            .next()
            .ok_or(ScrapeError::MissingContainer)?;
        Ok(results.select(&LISTING_SEL).collect())
    }
}

/// A page can never hold more listings than were requested.
pub fn check_page_size(found: usize, page_size: u32) -> Result<()> {
    if found > page_size as usize {
        return Err(ScrapeError::PageSizeExceeded { found, page_size });
    }
    Ok(())
}
