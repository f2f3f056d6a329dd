use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{Result, ScrapeError};

/// Search parameters for one run. Built once at startup and passed by
/// reference to every stage; nothing mutates it afterwards.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    pub job_name: String,
    pub job_type: String,
    pub search_radius: u32,
    pub city_name: String,
    pub state_name: String,
    /// Abbreviation used only in the default output filename.
    pub short_city_name: String,
    /// Indeed caps this at 50.
    pub default_jobs_per_page: u32,
    /// Ceiling on the `start` offset, not on the number of requests.
    pub max_page_number: u32,
    pub delim: char,
    pub base_url: String,
    pub output: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            job_name: "Data Scientist".to_string(),
            job_type: "fulltime".to_string(),
            search_radius: 50,
            city_name: "Los Angeles".to_string(),
            state_name: "CA".to_string(),
            short_city_name: "LA".to_string(),
            default_jobs_per_page: 50,
            max_page_number: 500,
            // Company names often contain commas
            delim: ';',
            base_url: "https://www.indeed.com/jobs".to_string(),
            output: None,
        }
    }
}

impl SearchConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SearchConfig =
            toml::from_str(s).map_err(|e| ScrapeError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    pub fn with_output(mut self, output: PathBuf) -> Self {
        self.output = Some(output);
        self
    }

    /// The `csv` writer needs a single-byte delimiter, and a zero page size
    /// would never advance the offset.
    pub fn validate(&self) -> Result<()> {
        if !self.delim.is_ascii() {
            return Err(ScrapeError::Config(format!(
                "delimiter {:?} must be a single ASCII character",
                self.delim
            )));
        }
        if self.default_jobs_per_page == 0 {
            return Err(ScrapeError::Config(
                "default_jobs_per_page must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn delimiter_byte(&self) -> u8 {
        self.delim as u8
    }

    pub fn output_path(&self) -> PathBuf {
        self.output.clone().unwrap_or_else(|| {
            PathBuf::from(format!(
                "data_science_jobs_indeed_{}.csv",
                self.short_city_name
            ))
        })
    }
}
