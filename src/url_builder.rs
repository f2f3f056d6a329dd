use url::Url;

use crate::config::SearchConfig;
use crate::error::Result;

/// Search-results URL for a fixed query, one page at a time.
#[derive(Debug, Clone)]
pub struct SearchUrl {
    base: Url,
}

impl SearchUrl {
    pub fn new(config: &SearchConfig) -> Result<Self> {
        let location = format!("{}, {}", config.city_name, config.state_name);
        let radius = config.search_radius.to_string();
        let limit = config.default_jobs_per_page.to_string();
        let base = Url::parse_with_params(
            &config.base_url,
            &[
                ("q", config.job_name.as_str()),
                ("l", location.as_str()),
                ("radius", radius.as_str()),
                ("jt", config.job_type.as_str()),
                ("limit", limit.as_str()),
            ],
        )?;
        Ok(Self { base })
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn at_offset(&self, offset: u32) -> Url {
        let mut url = self.base.clone();
        url.query_pairs_mut()
            .append_pair("start", &offset.to_string());
        url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_matches_portal_query_shape() {
        let search = SearchUrl::new(&SearchConfig::default()).unwrap();
        assert_eq!(
            search.base().as_str(),
            "https://www.indeed.com/jobs?q=Data+Scientist&l=Los+Angeles%2C+CA&radius=50&jt=fulltime&limit=50"
        );
    }

    #[test]
    fn offset_is_appended_last_as_start() {
        let search = SearchUrl::new(&SearchConfig::default()).unwrap();
        let url = search.at_offset(150);
        assert!(url.as_str().ends_with("&limit=50&start=150"));
        assert_eq!(search.at_offset(0).query_pairs().last().unwrap().1, "0");
        assert!(!search.base().as_str().contains("start="));
    }

    #[test]
    fn out_of_range_values_pass_through() {
        let config = SearchConfig {
            search_radius: 9999,
            default_jobs_per_page: 1000,
            ..SearchConfig::default()
        };
        let search = SearchUrl::new(&config).unwrap();
        let pairs: Vec<(String, String)> = search
            .at_offset(2000)
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        assert!(pairs.contains(&("radius".to_string(), "9999".to_string())));
        assert!(pairs.contains(&("limit".to_string(), "1000".to_string())));
        assert!(pairs.contains(&("start".to_string(), "2000".to_string())));
    }

    #[test]
    fn bad_base_url_is_an_error() {
        let config = SearchConfig {
            base_url: "not a url".to_string(),
            ..SearchConfig::default()
        };
        assert!(SearchUrl::new(&config).is_err());
    }
}
