//! Inclusion filter shared by the production extractors.
//!
//! Three modes, named as callers pass them: `registros` keeps the first N
//! items in the extractor's iteration order, `anual` keeps items from the
//! last N years, `periodo` keeps items inside a closed year range.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Utc};
use serde::{Deserialize, Serialize};

/// `limit_start` value that disables filtering.
pub const NO_LIMIT: i64 = -1;

/// Upper year bound used by `periodo` when no end is given.
const OPEN_PERIOD_END: i64 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    #[serde(rename = "registros")]
    Records,
    #[serde(rename = "anual")]
    Annual,
    #[serde(rename = "periodo")]
    Period,
}

impl FromStr for FilterMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "registros" => Ok(FilterMode::Records),
            "anual" => Ok(FilterMode::Annual),
            "periodo" => Ok(FilterMode::Period),
            other => Err(format!(
                "unknown filter mode '{}'. Must be registros, anual, or periodo.",
                other
            )),
        }
    }
}

impl fmt::Display for FilterMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FilterMode::Records => "registros",
            FilterMode::Annual => "anual",
            FilterMode::Period => "periodo",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterCriteria {
    pub mode: FilterMode,
    pub limit_start: i64,
    pub limit_end: Option<i64>,
    /// Year `anual` counts back from.
    pub reference_year: i64,
}

impl Default for FilterCriteria {
    /// The five most recent records.
    fn default() -> Self {
        Self::records(5)
    }
}

impl FilterCriteria {
    pub fn new(mode: FilterMode, limit_start: i64, limit_end: Option<i64>) -> Self {
        Self {
            mode,
            limit_start,
            limit_end,
            reference_year: i64::from(Utc::now().year()),
        }
    }

    pub fn all() -> Self {
        Self::new(FilterMode::Records, NO_LIMIT, None)
    }

    pub fn records(count: i64) -> Self {
        Self::new(FilterMode::Records, count, None)
    }

    pub fn annual(years: i64) -> Self {
        Self::new(FilterMode::Annual, years, None)
    }

    pub fn period(start: i64, end: Option<i64>) -> Self {
        Self::new(FilterMode::Period, start, end)
    }

    pub fn with_reference_year(mut self, year: i64) -> Self {
        self.reference_year = year;
        self
    }

    /// Decides whether the item at 1-based `position` with raw `year` is kept.
    ///
    /// Non-numeric years count as 0, which drops them from `anual` and
    /// `periodo` but not from `registros`.
    pub fn passes(&self, year: &str, position: usize) -> bool {
        if self.limit_start == NO_LIMIT {
            return true;
        }
        let year = parse_int(year);
        match self.mode {
            FilterMode::Records => i64::try_from(position).map_or(false, |p| p <= self.limit_start),
            FilterMode::Annual => self.reference_year.saturating_sub(year) < self.limit_start,
            FilterMode::Period => {
                year >= self.limit_start && year <= self.limit_end.unwrap_or(OPEN_PERIOD_END)
            }
        }
    }
}

/// Integer coercion for numeric schema fields: anything unparsable is 0.
pub fn parse_int(raw: &str) -> i64 {
    raw.trim().parse().unwrap_or(0)
}
