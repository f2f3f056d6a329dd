use std::fs::File;
use std::io::Write;
use std::path::Path;

use csv::{QuoteStyle, Terminator, WriterBuilder};

use crate::error::Result;
use crate::extractor::Listing;

pub const COLUMNS: [&str; 5] = [
    "Job Title",
    "Company Name",
    "Job City",
    "Job Rating",
    "Job Post Date",
];

/// Delimited listings output. Fields are never quoted, so a delimiter inside a
/// field value shifts that row's columns.
pub struct ListingWriter<W: Write> {
    inner: csv::Writer<W>,
    rows: usize,
}

impl ListingWriter<File> {
    /// Truncates any existing file.
    pub fn create(path: &Path, delim: u8) -> Result<Self> {
        Self::from_writer(File::create(path)?, delim)
    }
}

impl<W: Write> ListingWriter<W> {
    pub fn from_writer(writer: W, delim: u8) -> Result<Self> {
        let mut inner = WriterBuilder::new()
            .delimiter(delim)
            .quote_style(QuoteStyle::Never)
            .terminator(Terminator::Any(b'\n'))
            .has_headers(false)
            .from_writer(writer);
        inner.write_record(COLUMNS)?;
        inner.flush()?;
        Ok(Self { inner, rows: 0 })
    }

    /// Writes one page of listings and flushes, so an aborted run leaves
    /// every completed page on disk.
    pub fn write_page(&mut self, listings: &[Listing]) -> Result<()> {
        for listing in listings {
            self.inner.serialize(listing)?;
            self.rows += 1;
        }
        self.inner.flush()?;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn finish(mut self) -> Result<usize> {
        self.inner.flush()?;
        Ok(self.rows)
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.inner
            .into_inner()
            .unwrap_or_else(|_| panic!("flush failed"))
    }
}
