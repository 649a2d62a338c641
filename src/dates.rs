//! Capture dates and the navigable date list.
//!
//! A capture date is the provider's `YYYY-MM-DD` string for one imagery
//! acquisition. The date list keeps the server's distinct dates in the order
//! they were first reported and can flatten itself into year-grouped menu
//! entries where a bare `YYYY` string acts as a non-selectable separator.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// Length of a year marker entry (`YYYY`).
pub const YEAR_MARKER_LEN: usize = 4;

const CAPTURE_DATE_FORMAT: &str = "%Y-%m-%d";

/// Errors raised when a string is not a well-formed capture date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DateError {
    #[error("capture date '{0}' is not in YYYY-MM-DD form")]
    Malformed(String),
}

/// One imagery acquisition date.
///
/// Equality is plain string equality; the value is otherwise opaque so that
/// whatever the coverage service reports round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CaptureDate(String);

impl CaptureDate {
    pub fn new(date: impl Into<String>) -> Self {
        Self(date.into())
    }

    /// Parses and validates a `YYYY-MM-DD` capture date.
    pub fn parse(date: &str) -> Result<Self, DateError> {
        NaiveDate::parse_from_str(date, CAPTURE_DATE_FORMAT)
            .map(|_| Self(date.to_string()))
            .map_err(|_| DateError::Malformed(date.to_string()))
    }

    /// Today's local date, used as the placeholder selection before the
    /// first coverage response arrives.
    pub fn today() -> Self {
        Self::from_naive(chrono::Local::now().date_naive())
    }

    pub fn from_naive(date: NaiveDate) -> Self {
        Self(date.format(CAPTURE_DATE_FORMAT).to_string())
    }

    /// Builds the year marker that heads a group of dates.
    pub fn year_marker(year: &str) -> Self {
        Self(year.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Year markers are the degenerate four-character form.
    pub fn is_year_marker(&self) -> bool {
        self.0.len() == YEAR_MARKER_LEN
    }

    /// The leading `YYYY` portion used for grouping.
    pub fn year(&self) -> &str {
        self.0.get(..YEAR_MARKER_LEN).unwrap_or(&self.0)
    }

    pub fn naive_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(&self.0, CAPTURE_DATE_FORMAT).ok()
    }

    /// Label for the selected-date button, e.g. "Mon Mar 02 2020".
    pub fn display_label(&self) -> String {
        match self.naive_date() {
            Some(date) => date.format("%a %b %d %Y").to_string(),
            None => self.0.clone(),
        }
    }

    /// Label for a date inside its year group, e.g. "March 02".
    pub fn menu_label(&self) -> String {
        match self.naive_date() {
            Some(date) => date.format("%B %d").to_string(),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for CaptureDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for CaptureDate {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for CaptureDate {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Entry in the year-grouped date menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuEntry {
    /// Non-selectable year header.
    Year(String),
    /// Selectable capture date.
    Date(CaptureDate),
}

/// Deduplicated list of capture dates in server order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DateList {
    dates: Vec<CaptureDate>,
}

impl DateList {
    /// Builds a list keeping the first occurrence of each date.
    pub fn from_captures<I>(captures: I) -> Self
    where
        I: IntoIterator<Item = CaptureDate>,
    {
        let mut seen = HashSet::new();
        let dates = captures
            .into_iter()
            .filter(|date| seen.insert(date.clone()))
            .collect();
        Self { dates }
    }

    pub fn single(date: CaptureDate) -> Self {
        Self { dates: vec![date] }
    }

    pub fn dates(&self) -> &[CaptureDate] {
        &self.dates
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn contains(&self, date: &CaptureDate) -> bool {
        self.dates.contains(date)
    }

    pub fn first(&self) -> Option<&CaptureDate> {
        self.dates.first()
    }

    pub fn last(&self) -> Option<&CaptureDate> {
        self.dates.last()
    }

    /// Years in order of first appearance.
    fn years(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.dates
            .iter()
            .map(CaptureDate::year)
            .filter(|year| seen.insert(*year))
            .collect()
    }

    /// Flattens the list into year groups: a year marker followed by every
    /// date of that year in server order.
    pub fn flatten(&self) -> Vec<CaptureDate> {
        let mut flat = Vec::with_capacity(self.dates.len() * 2);
        for year in self.years() {
            flat.push(CaptureDate::year_marker(year));
            flat.extend(self.dates.iter().filter(|d| d.year() == year).cloned());
        }
        flat
    }

    /// Same grouping as [`DateList::flatten`], typed for menu rendering.
    pub fn menu_entries(&self) -> Vec<MenuEntry> {
        self.flatten()
            .into_iter()
            .map(|entry| {
                if entry.is_year_marker() {
                    MenuEntry::Year(entry.0)
                } else {
                    MenuEntry::Date(entry)
                }
            })
            .collect()
    }
}
