//! Calendar month a ledger is closed for.
//!
//! Persisted as ISO `YYYY-MM`. Older rows carry the pt-BR long label
//! (`"outubro de 2025"`), so parsing accepts both forms.

use std::{fmt, str::FromStr};

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use crate::{EngineError, ResultEngine};

const MONTH_NAMES_PT_BR: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MonthPeriod {
    year: i32,
    month: u32,
}

impl MonthPeriod {
    /// Builds a period, `month` is 1-based.
    pub fn new(year: i32, month: u32) -> ResultEngine<Self> {
        if !(1..=12).contains(&month) {
            return Err(EngineError::InvalidMonth(format!(
                "month must be in 1..=12, got {month}"
            )));
        }
        if !(1..=9999).contains(&year) {
            return Err(EngineError::InvalidMonth(format!(
                "year must be in 1..=9999, got {year}"
            )));
        }
        Ok(Self { year, month })
    }

    /// The period a given date falls in.
    pub fn containing<D: Datelike>(date: &D) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(self) -> i32 {
        self.year
    }

    pub fn month(self) -> u32 {
        self.month
    }

    /// Long pt-BR label, e.g. `outubro de 2025`.
    pub fn label_pt_br(self) -> String {
        let idx = (self.month - 1) as usize;
        format!("{} de {}", MONTH_NAMES_PT_BR[idx], self.year)
    }

    fn parse_iso(s: &str) -> Option<Self> {
        let (year, month) = s.split_once('-')?;
        if year.len() != 4 || month.len() != 2 {
            return None;
        }
        if !year.bytes().chain(month.bytes()).all(|b| b.is_ascii_digit()) {
            return None;
        }
        Self::new(year.parse().ok()?, month.parse().ok()?).ok()
    }

    fn parse_label(s: &str) -> Option<Self> {
        let lowered = s.to_lowercase();
        let mut words = lowered.split_whitespace().filter(|w| *w != "de");
        let name = words.next()?;
        let year = words.next()?;
        if words.next().is_some() {
            return None;
        }
        let name = if name == "marco" { "março" } else { name };
        let month = MONTH_NAMES_PT_BR.iter().position(|m| *m == name)? as u32 + 1;
        Self::new(year.parse().ok()?, month).ok()
    }
}

impl fmt::Display for MonthPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthPeriod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Self::parse_iso(trimmed)
            .or_else(|| Self::parse_label(trimmed))
            .ok_or_else(|| EngineError::InvalidMonth(format!("unrecognized period \"{trimmed}\"")))
    }
}

impl TryFrom<String> for MonthPeriod {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<MonthPeriod> for String {
    fn from(value: MonthPeriod) -> Self {
        value.to_string()
    }
}
