use std::io::Write;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use crate::config::SearchConfig;
use crate::error::Result;
use crate::extractor::{extract_listing, Listing};
use crate::fetcher::PageFetcher;
use crate::pagination::{PageState, Pagination, StopReason};
use crate::parser::{check_page_size, ListingPage};
use crate::url_builder::SearchUrl;
use crate::writer::ListingWriter;

#[derive(Debug, Clone)]
pub struct RunSummary {
    pub pages_fetched: u32,
    pub listings_written: usize,
    pub stop_reason: StopReason,
    pub started_at: DateTime<Local>,
    pub finished_at: DateTime<Local>,
}

pub struct Scraper<'a, F: PageFetcher> {
    config: &'a SearchConfig,
    fetcher: F,
}

impl<'a, F: PageFetcher> Scraper<'a, F> {
    pub fn new(config: &'a SearchConfig, fetcher: F) -> Self {
        Self { config, fetcher }
    }

    /// Fetches pages until a short page or the offset ceiling, writing each
    /// page's listings before requesting the next. The first fatal error
    /// aborts the run; rows already written stay in `writer`.
    pub fn run<W: Write>(&self, writer: &mut ListingWriter<W>) -> Result<RunSummary> {
        let started_at = Local::now();
        let search = SearchUrl::new(self.config)?;
        let page_size = self.config.default_jobs_per_page;
        let mut pagination = Pagination::new(page_size, self.config.max_page_number);
        let mut pages_fetched = 0;

        info!(url = %search.base(), "starting search");

        let stop_reason = loop {
            let offset = match pagination.state() {
                PageState::Fetching { offset } => offset,
                PageState::Done(reason) => break reason,
            };

            let url = search.at_offset(offset);
            let html = self.fetcher.fetch(&url)?;
            pages_fetched += 1;

            let listings = scrape_page(&html, page_size).inspect_err(|e| {
                warn!(offset, error = %e, "aborting on page");
            })?;
            writer.write_page(&listings)?;
            info!(offset, listings = listings.len(), "page written");

            pagination.advance(listings.len());
        };

        let summary = RunSummary {
            pages_fetched,
            listings_written: writer.rows(),
            stop_reason,
            started_at,
            finished_at: Local::now(),
        };
        info!(
            pages = summary.pages_fetched,
            listings = summary.listings_written,
            reason = ?summary.stop_reason,
            elapsed_ms = (summary.finished_at - summary.started_at).num_milliseconds(),
            "search finished"
        );
        Ok(summary)
    }
}

fn scrape_page(html: &str, page_size: u32) -> Result<Vec<Listing>> {
    let page = ListingPage::parse(html);
    let handles = page.listings()?;
    check_page_size(handles.len(), page_size)?;

    handles
        .into_iter()
        .map(|handle| {
            let listing = extract_listing(handle)?;
            debug!(title = %listing.title, company = %listing.company, "listing");
            Ok(listing)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use url::Url;

    use super::*;
    use crate::error::ScrapeError;
    use crate::parser::fixtures::page_of;

    /// Serves canned pages keyed by `start` offset and records every request.
    /// Offsets without a page get an empty results table.
    struct FakePortal {
        pages: HashMap<u32, String>,
        requested: RefCell<Vec<Url>>,
    }

    impl FakePortal {
        fn with_counts(page_size: u32, counts: &[usize]) -> Self {
            let pages = counts
                .iter()
                .enumerate()
                .map(|(i, &n)| (i as u32 * page_size, page_of(n)))
                .collect();
            Self {
                pages,
                requested: RefCell::new(Vec::new()),
            }
        }

        fn offsets(&self) -> Vec<u32> {
            self.requested
                .borrow()
                .iter()
                .map(|url| {
                    url.query_pairs()
                        .find(|(k, _)| k == "start")
                        .and_then(|(_, v)| v.parse().ok())
                        .unwrap()
                })
                .collect()
        }
    }

    impl PageFetcher for FakePortal {
        fn fetch(&self, url: &Url) -> Result<String> {
            self.requested.borrow_mut().push(url.clone());
            let offset: u32 = url
                .query_pairs()
                .find(|(k, _)| k == "start")
                .and_then(|(_, v)| v.parse().ok())
                .unwrap();
            Ok(self.pages.get(&offset).cloned().unwrap_or_else(|| page_of(0)))
        }
    }

    fn config(page_size: u32, ceiling: u32) -> SearchConfig {
        SearchConfig {
            default_jobs_per_page: page_size,
            max_page_number: ceiling,
            ..SearchConfig::default()
        }
    }

    fn output(writer: ListingWriter<Vec<u8>>) -> String {
        String::from_utf8(writer.into_inner()).unwrap()
    }

    #[test]
    fn full_page_then_short_page_stops_without_third_request() {
        let config = config(5, 500);
        let portal = FakePortal::with_counts(5, &[5, 3]);
        let mut writer = ListingWriter::from_writer(Vec::new(), b';').unwrap();

        let summary = Scraper::new(&config, &portal).run(&mut writer).unwrap();

        assert_eq!(portal.offsets(), vec![0, 5]);
        assert_eq!(summary.pages_fetched, 2);
        assert_eq!(summary.listings_written, 8);
        assert_eq!(summary.stop_reason, StopReason::ShortPage);

        let out = output(writer);
        assert!(out.starts_with("Job Title;Company Name;Job City;Job Rating;Job Post Date\n"));
        assert_eq!(out.lines().count(), 1 + 8);
    }

    #[test]
    fn full_pages_stop_at_ceiling() {
        let config = config(4, 12);
        let portal = FakePortal::with_counts(4, &[4, 4, 4, 4, 4, 4]);
        let mut writer = ListingWriter::from_writer(Vec::new(), b';').unwrap();

        let summary = Scraper::new(&config, &portal).run(&mut writer).unwrap();

        assert_eq!(portal.offsets(), vec![0, 4, 8]);
        assert_eq!(summary.stop_reason, StopReason::CeilingReached);
        assert_eq!(summary.listings_written, 12);
        assert_eq!(output(writer).lines().count(), 1 + 12);
    }

    #[test]
    fn requests_carry_the_search_query() {
        let config = config(5, 500);
        let portal = FakePortal::with_counts(5, &[1]);
        let mut writer = ListingWriter::from_writer(Vec::new(), b';').unwrap();

        Scraper::new(&config, &portal).run(&mut writer).unwrap();

        let requested = portal.requested.borrow();
        assert_eq!(
            requested[0].as_str(),
            "https://www.indeed.com/jobs?q=Data+Scientist&l=Los+Angeles%2C+CA&radius=50&jt=fulltime&limit=5&start=0"
        );
    }

    #[test]
    fn oversized_page_aborts_after_earlier_rows() {
        let config = config(3, 500);
        let portal = FakePortal::with_counts(3, &[3, 4]);
        let mut writer = ListingWriter::from_writer(Vec::new(), b';').unwrap();

        let err = Scraper::new(&config, &portal).run(&mut writer).unwrap_err();

        assert!(matches!(
            err,
            ScrapeError::PageSizeExceeded {
                found: 4,
                page_size: 3
            }
        ));
        assert_eq!(writer.rows(), 3);
        assert_eq!(output(writer).lines().count(), 1 + 3);
    }

    #[test]
    fn page_without_container_is_fatal() {
        let config = config(5, 500);
        let mut portal = FakePortal::with_counts(5, &[]);
        portal
            .pages
            .insert(0, "<html><body>blocked</body></html>".to_string());
        let mut writer = ListingWriter::from_writer(Vec::new(), b';').unwrap();

        let err = Scraper::new(&config, &portal).run(&mut writer).unwrap_err();
        assert!(matches!(err, ScrapeError::MissingContainer));
    }

    #[test]
    fn end_to_end_into_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data_science_jobs_indeed_LA.csv");
        let config = config(2, 500).with_output(path.clone());
        let portal = FakePortal::with_counts(2, &[2, 2, 1]);

        let mut writer =
            ListingWriter::create(&config.output_path(), config.delimiter_byte()).unwrap();
        let summary = Scraper::new(&config, &portal).run(&mut writer).unwrap();
        writer.finish().unwrap();

        assert_eq!(summary.pages_fetched, 3);
        let contents = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 1 + 5);
        assert_eq!(lines[1], "Data Scientist;Acme Analytics;Los Angeles;4.1;3");
    }
}
