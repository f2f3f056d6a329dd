//! Per-listing field extraction.
//!
//! Each field has an ordered list of lookups. The first lookup that finds an
//! element wins; when all of them miss, the field either fails the run or
//! falls back to a sentinel, depending on its rule.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, ScrapeError};

/// Written in place of a rating that could not be located.
pub const RATING_SENTINEL: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Listing {
    pub title: String,
    pub company: String,
    pub city: String,
    pub rating: String,
    pub post_date: String,
}

pub enum Lookup {
    Css(Selector),
    /// First `tag` element with a class token matching `pattern`. The
    /// location span's class name varies between result cards.
    ClassPattern { tag: Selector, pattern: Regex },
    /// Each selector is applied to the previous match.
    Chain(Vec<Selector>),
}

impl Lookup {
    fn css(selector: &str) -> Self {
        Lookup::Css(parse_selector(selector))
    }

    fn find<'a>(&self, root: ElementRef<'a>) -> Option<ElementRef<'a>> {
        match self {
            Lookup::Css(sel) => root.select(sel).next(),
            Lookup::ClassPattern { tag, pattern } => root
                .select(tag)
                .find(|el| el.value().classes().any(|class| pattern.is_match(class))),
            Lookup::Chain(steps) => steps
                .iter()
                .try_fold(root, |current, sel| current.select(sel).next()),
        }
    }
}

pub enum Missing {
    Fatal,
    Sentinel(&'static str),
}

pub struct FieldRule {
    pub field: &'static str,
    pub lookups: Vec<Lookup>,
    pub on_missing: Missing,
}

impl FieldRule {
    /// Trimmed text of the first matching element.
    pub fn text(&self, listing: ElementRef<'_>) -> Result<String> {
        match self.lookups.iter().find_map(|lookup| lookup.find(listing)) {
            Some(el) => Ok(element_text(el).trim().to_string()),
            None => match self.on_missing {
                Missing::Fatal => Err(ScrapeError::MissingField { field: self.field }),
                Missing::Sentinel(value) => {
                    debug!(field = self.field, sentinel = value, "field not found");
                    Ok(value.to_string())
                }
            },
        }
    }
}

fn parse_selector(selector: &str) -> Selector {
    Selector::parse(selector).expect("static selector")
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

pub struct ListingRules {
    pub title: FieldRule,
    pub company: FieldRule,
    pub location: FieldRule,
    pub rating: FieldRule,
    pub post_date: FieldRule,
}

impl Default for ListingRules {
    fn default() -> Self {
        Self {
            title: FieldRule {
                field: "title",
                lookups: vec![Lookup::css("div.title"), Lookup::css(".title")],
                on_missing: Missing::Fatal,
            },
            company: FieldRule {
                field: "company",
                lookups: vec![Lookup::css("span.company")],
                on_missing: Missing::Fatal,
            },
            location: FieldRule {
                field: "location",
                lookups: vec![Lookup::ClassPattern {
                    tag: parse_selector("span"),
                    pattern: Regex::new("location").expect("static regex"),
                }],
                on_missing: Missing::Fatal,
            },
            rating: FieldRule {
                field: "rating",
                lookups: vec![Lookup::Chain(vec![
                    parse_selector("div.sjcl"),
                    parse_selector("div"),
                    parse_selector("span.ratingsContent"),
                ])],
                on_missing: Missing::Sentinel(RATING_SENTINEL),
            },
            post_date: FieldRule {
                field: "post date",
                lookups: vec![Lookup::css("span.date")],
                on_missing: Missing::Fatal,
            },
        }
    }
}

static RULES: LazyLock<ListingRules> = LazyLock::new(ListingRules::default);

/// "Los Angeles, CA 90012" -> "Los Angeles"
pub fn city_of(location: &str) -> &str {
    location.split(',').next().unwrap_or(location)
}

/// "30+ days ago" -> "30+"
pub fn first_token(date: &str) -> Option<&str> {
    date.split_whitespace().next()
}

impl ListingRules {
    pub fn extract(&self, listing: ElementRef<'_>) -> Result<Listing> {
        let title = self.title.text(listing)?;
        let company = self.company.text(listing)?;
        let location = self.location.text(listing)?;
        let rating = self.rating.text(listing)?;
        let raw_date = self.post_date.text(listing)?;
        let post_date = first_token(&raw_date).ok_or(ScrapeError::MissingField {
            field: self.post_date.field,
        })?;

        Ok(Listing {
            title,
            company,
            city: city_of(&location).to_string(),
            rating,
            post_date: post_date.to_string(),
        })
    }
}

pub fn extract_listing(listing: ElementRef<'_>) -> Result<Listing> {
    RULES.extract(listing)
}
