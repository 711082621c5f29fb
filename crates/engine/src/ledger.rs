//! Month ledger: discount entries, derived totals and the snapshot persisted
//! when a month is closed.
//!
//! Everything here is pure. The free functions take the entry list by slice
//! and hand back new values; [`Ledger`] is the working form state a client
//! holds between keystrokes and delegates to them.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, MoneyCents, MonthPeriod, ResultEngine, parse_amount_or_zero};

/// A named expense line with an amount and a paid flag.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscountEntry {
    pub id: Uuid,
    pub description: String,
    pub amount: MoneyCents,
    pub paid: bool,
}

impl DiscountEntry {
    /// A fresh row: empty description, zero amount, unpaid.
    pub fn empty() -> Self {
        Self {
            id: Uuid::new_v4(),
            description: String::new(),
            amount: MoneyCents::ZERO,
            paid: false,
        }
    }

    pub fn new(description: impl Into<String>, amount: MoneyCents, paid: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            description: description.into(),
            amount,
            paid,
        }
    }
}

/// Editable column of a [`DiscountEntry`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EntryField {
    Description,
    Amount,
    Paid,
}

impl EntryField {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Description => "description",
            Self::Amount => "amount",
            Self::Paid => "paid",
        }
    }
}

impl FromStr for EntryField {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "description" => Ok(Self::Description),
            "amount" => Ok(Self::Amount),
            "paid" => Ok(Self::Paid),
            other => Err(EngineError::InvalidField(other.to_string())),
        }
    }
}

/// Totals derived from the entries and the received amount.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Totals {
    pub paid_total: MoneyCents,
    pub remainder: MoneyCents,
}

/// Summary of a closed month, the only shape that gets persisted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthSnapshot {
    month: MonthPeriod,
    received: MoneyCents,
    discounts: MoneyCents,
    remainder: MoneyCents,
}

impl MonthSnapshot {
    pub fn month(&self) -> MonthPeriod {
        self.month
    }

    pub fn received(&self) -> MoneyCents {
        self.received
    }

    /// Sum of paid discounts.
    pub fn discounts(&self) -> MoneyCents {
        self.discounts
    }

    /// Received minus paid discounts ("sobra").
    pub fn remainder(&self) -> MoneyCents {
        self.remainder
    }
}

/// Truthiness of a raw toggle value.
///
/// Empty, `0`, `false`, `off` and `no` (trimmed, any case) are false.
pub fn parse_truthy(raw: &str) -> bool {
    let normalized = raw.trim().to_ascii_lowercase();
    !matches!(normalized.as_str(), "" | "0" | "false" | "off" | "no")
}

/// Sums the paid entries and subtracts them from `received`.
///
/// A missing `received` counts as zero. Unpaid entries never contribute, and
/// the remainder is allowed to go negative.
pub fn compute_totals(entries: &[DiscountEntry], received: Option<MoneyCents>) -> Totals {
    let received = received.unwrap_or_default();
    let paid_total: MoneyCents = entries
        .iter()
        .filter(|entry| entry.paid)
        .map(|entry| entry.amount)
        .sum();

    Totals {
        paid_total,
        remainder: received.saturating_sub(paid_total),
    }
}

/// Returns a copy of `entries` with one field of the entry at `index` replaced.
///
/// Amounts go through [`parse_amount_or_zero`], the paid flag through
/// [`parse_truthy`], descriptions are stored verbatim.
pub fn update_entry_field(
    entries: &[DiscountEntry],
    index: usize,
    field: EntryField,
    raw_value: &str,
) -> ResultEngine<Vec<DiscountEntry>> {
    if index >= entries.len() {
        return Err(EngineError::EntryOutOfRange {
            index,
            len: entries.len(),
        });
    }

    let mut updated = entries.to_vec();
    let entry = &mut updated[index];
    match field {
        EntryField::Description => entry.description = raw_value.to_string(),
        EntryField::Amount => entry.amount = parse_amount_or_zero(raw_value),
        EntryField::Paid => entry.paid = parse_truthy(raw_value),
    }
    Ok(updated)
}

/// Shapes the record persisted for a closed month.
pub fn build_month_snapshot(
    entries: &[DiscountEntry],
    received: Option<MoneyCents>,
    month: MonthPeriod,
) -> MonthSnapshot {
    let totals = compute_totals(entries, received);
    MonthSnapshot {
        month,
        received: received.unwrap_or_default(),
        discounts: totals.paid_total,
        remainder: totals.remainder,
    }
}

/// Working state of the month form.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Ledger {
    received: MoneyCents,
    entries: Vec<DiscountEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entries(received: MoneyCents, entries: Vec<DiscountEntry>) -> Self {
        Self { received, entries }
    }

    pub fn received(&self) -> MoneyCents {
        self.received
    }

    pub fn entries(&self) -> &[DiscountEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sets the received amount from raw input; bad input counts as zero.
    pub fn set_received(&mut self, raw: &str) {
        self.received = parse_amount_or_zero(raw);
    }

    /// Appends an empty row and returns its index.
    pub fn add_entry(&mut self) -> usize {
        self.entries.push(DiscountEntry::empty());
        self.entries.len() - 1
    }

    pub fn remove_entry(&mut self, index: usize) -> ResultEngine<DiscountEntry> {
        if index >= self.entries.len() {
            return Err(EngineError::EntryOutOfRange {
                index,
                len: self.entries.len(),
            });
        }
        Ok(self.entries.remove(index))
    }

    pub fn update_entry(&mut self, index: usize, field: EntryField, raw: &str) -> ResultEngine<()> {
        self.entries = update_entry_field(&self.entries, index, field, raw)?;
        Ok(())
    }

    pub fn toggle_paid(&mut self, index: usize) -> ResultEngine<bool> {
        let len = self.entries.len();
        let entry = self
            .entries
            .get_mut(index)
            .ok_or(EngineError::EntryOutOfRange { index, len })?;
        entry.paid = !entry.paid;
        Ok(entry.paid)
    }

    pub fn totals(&self) -> Totals {
        compute_totals(&self.entries, Some(self.received))
    }

    pub fn snapshot(&self, month: MonthPeriod) -> MonthSnapshot {
        build_month_snapshot(&self.entries, Some(self.received), month)
    }

    /// Drops every entry and zeroes the received amount.
    ///
    /// Call only once the snapshot has been stored.
    pub fn reset(&mut self) {
        self.entries.clear();
        self.received = MoneyCents::ZERO;
    }
}
