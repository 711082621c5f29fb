//! CSV and PDF renditions of the current ledger.

use csv::Writer;
use serde::Serialize;

use crate::{DiscountEntry, EngineError, MoneyCents, ResultEngine, Totals, pdf};

#[derive(Serialize)]
struct CsvRow<'a> {
    description: &'a str,
    amount: String,
    paid: &'static str,
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}

/// `description,amount,paid` rows with a header line.
pub fn to_csv(entries: &[DiscountEntry]) -> ResultEngine<Vec<u8>> {
    let mut writer = Writer::from_writer(vec![]);
    if entries.is_empty() {
        writer
            .write_record(["description", "amount", "paid"])
            .map_err(|err| EngineError::Export(err.to_string()))?;
    }
    for entry in entries {
        writer
            .serialize(CsvRow {
                description: &entry.description,
                amount: entry.amount.to_decimal_string(),
                paid: yes_no(entry.paid),
            })
            .map_err(|err| EngineError::Export(err.to_string()))?;
    }
    writer
        .into_inner()
        .map_err(|err| EngineError::Export(err.to_string()))
}

/// The three totals, then one line per entry.
pub fn report_lines(
    received: MoneyCents,
    totals: Totals,
    entries: &[DiscountEntry],
) -> Vec<String> {
    let mut lines = vec![
        format!("Received: {received}"),
        format!("Paid Discounts: {}", totals.paid_total),
        format!("Remainder: {}", totals.remainder),
    ];
    lines.extend(entries.iter().map(|entry| {
        let description = if entry.description.is_empty() {
            "(no description)"
        } else {
            entry.description.as_str()
        };
        format!(
            "{description}: {} [{}]",
            entry.amount,
            if entry.paid { "paid" } else { "pending" }
        )
    }));
    lines
}

/// Textual PDF report with the given title.
pub fn to_pdf(
    title: &str,
    received: MoneyCents,
    totals: Totals,
    entries: &[DiscountEntry],
) -> Vec<u8> {
    pdf::render(title, &report_lines(received, totals, entries))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute_totals;

    fn entries() -> Vec<DiscountEntry> {
        vec![
            DiscountEntry::new("Aluguel", MoneyCents::new(80_000), true),
            DiscountEntry::new("Luz, gás", MoneyCents::new(12_050), false),
        ]
    }

    #[test]
    fn csv_has_header_and_rows() {
        let csv = String::from_utf8(to_csv(&entries()).unwrap()).unwrap();
        assert_eq!(
            csv,
            "description,amount,paid\nAluguel,800.00,yes\n\"Luz, gás\",120.50,no\n"
        );
    }

    #[test]
    fn csv_of_empty_ledger_is_only_header() {
        let csv = String::from_utf8(to_csv(&[]).unwrap()).unwrap();
        assert_eq!(csv, "description,amount,paid\n");
    }

    #[test]
    fn report_lists_totals_then_entries() {
        let entries = entries();
        let received = MoneyCents::new(200_000);
        let lines = report_lines(received, compute_totals(&entries, Some(received)), &entries);
        assert_eq!(
            lines,
            vec![
                "Received: R$ 2000.00",
                "Paid Discounts: R$ 800.00",
                "Remainder: R$ 1200.00",
                "Aluguel: R$ 800.00 [paid]",
                "Luz, gás: R$ 120.50 [pending]",
            ]
        );
    }
}
