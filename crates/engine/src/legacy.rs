//! Historical month rows stored as three parallel arrays.
//!
//! The first version of the tracker persisted every discount line instead of
//! the aggregates. Those rows are converted here, at the store boundary, into
//! the same [`MonthSnapshot`] a regular close produces. Field aliases match
//! the column names of the old export (`mes`, `valor_recebido`, ...).

use serde::{Deserialize, Serialize};

use crate::{
    DiscountEntry, EngineError, MoneyCents, MonthPeriod, MonthSnapshot, ResultEngine,
    build_month_snapshot,
};

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyMonth {
    #[serde(alias = "mes")]
    pub month: String,
    #[serde(alias = "valor_recebido", default)]
    pub received: Option<f64>,
    #[serde(alias = "desconto_descricao", default)]
    pub descriptions: Vec<Option<String>>,
    #[serde(alias = "desconto_valor", default)]
    pub amounts: Vec<Option<f64>>,
    #[serde(alias = "desconto_pago", default)]
    pub paid_flags: Vec<Option<bool>>,
}

impl LegacyMonth {
    /// Rebuilds the discount rows, rejecting arrays of different lengths.
    pub fn entries(&self) -> ResultEngine<Vec<DiscountEntry>> {
        let len = self.descriptions.len();
        if self.amounts.len() != len || self.paid_flags.len() != len {
            return Err(EngineError::LegacyShape(format!(
                "{}: {} descriptions, {} amounts, {} paid flags",
                self.month,
                len,
                self.amounts.len(),
                self.paid_flags.len()
            )));
        }

        let entries = self
            .descriptions
            .iter()
            .zip(&self.amounts)
            .zip(&self.paid_flags)
            .map(|((description, amount), paid)| {
                DiscountEntry::new(
                    description.clone().unwrap_or_default(),
                    amount.map_or(MoneyCents::ZERO, MoneyCents::from_f64_or_zero),
                    paid.unwrap_or(false),
                )
            })
            .collect();
        Ok(entries)
    }

    pub fn to_snapshot(&self) -> ResultEngine<MonthSnapshot> {
        let month: MonthPeriod = self.month.parse()?;
        let entries = self.entries()?;
        let received = self.received.map(MoneyCents::from_f64_or_zero);
        Ok(build_month_snapshot(&entries, received, month))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_old_column_names() {
        let raw = r#"{
            "mes": "2025-09",
            "valor_recebido": 2000,
            "desconto_descricao": ["Aluguel", "Mercado", null],
            "desconto_valor": [800, 350.5, 20],
            "desconto_pago": [true, false, true]
        }"#;
        let legacy: LegacyMonth = serde_json::from_str(raw).unwrap();
        let snapshot = legacy.to_snapshot().unwrap();

        assert_eq!(snapshot.month().to_string(), "2025-09");
        assert_eq!(snapshot.received(), MoneyCents::new(200_000));
        assert_eq!(snapshot.discounts(), MoneyCents::new(82_000));
        assert_eq!(snapshot.remainder(), MoneyCents::new(118_000));
    }

    #[test]
    fn mismatched_arrays_are_rejected() {
        let legacy = LegacyMonth {
            month: "2025-09".to_string(),
            received: Some(10.0),
            descriptions: vec![Some("a".to_string()), Some("b".to_string())],
            amounts: vec![Some(1.0)],
            paid_flags: vec![Some(true), Some(true)],
        };
        assert!(matches!(
            legacy.to_snapshot(),
            Err(EngineError::LegacyShape(_))
        ));
    }

    #[test]
    fn missing_values_default_to_zero_and_unpaid() {
        let legacy = LegacyMonth {
            month: "setembro de 2025".to_string(),
            received: None,
            descriptions: vec![None],
            amounts: vec![None],
            paid_flags: vec![None],
        };
        let entries = legacy.entries().unwrap();
        assert_eq!(entries[0].description, "");
        assert_eq!(entries[0].amount, MoneyCents::ZERO);
        assert!(!entries[0].paid);
        assert_eq!(legacy.to_snapshot().unwrap().received(), MoneyCents::ZERO);
    }
}
