//! Bar chart model for a month summary and the slot that owns the live chart.
//!
//! Renderers are external (a terminal widget, a canvas, ...). The engine only
//! fixes the dataset shape and guarantees that at most one chart instance is
//! alive per [`ChartSlot`].

use crate::{MoneyCents, MonthRecord, Totals};

pub const CHART_LABELS: [&str; 3] = ["Received", "Paid Discounts", "Remainder"];

/// Three bars: received, paid discounts, remainder (values in cents).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartData {
    pub title: String,
    pub labels: [&'static str; 3],
    pub values: [i64; 3],
}

impl ChartData {
    pub fn new(title: impl Into<String>, received: MoneyCents, totals: Totals) -> Self {
        Self {
            title: title.into(),
            labels: CHART_LABELS,
            values: [
                received.cents(),
                totals.paid_total.cents(),
                totals.remainder.cents(),
            ],
        }
    }

    pub fn from_record(record: &MonthRecord) -> Self {
        Self::new(
            record.month.label_pt_br(),
            record.received,
            Totals {
                paid_total: record.discounts,
                remainder: record.remainder,
            },
        )
    }

    /// Pairs of label and value, in bar order.
    pub fn bars(&self) -> impl Iterator<Item = (&'static str, i64)> + '_ {
        self.labels.iter().copied().zip(self.values.iter().copied())
    }
}

/// Something able to draw a [`ChartData`] and tear it down again.
pub trait ChartRenderer {
    type Handle;

    fn create(&mut self, data: &ChartData) -> Self::Handle;

    fn dispose(&mut self, handle: Self::Handle);
}

/// Owns at most one live chart.
///
/// Showing a new dataset disposes the previous instance first; clearing the
/// slot or dropping it disposes whatever is live.
pub struct ChartSlot<R: ChartRenderer> {
    renderer: R,
    live: Option<R::Handle>,
}

impl<R: ChartRenderer> ChartSlot<R> {
    pub fn new(renderer: R) -> Self {
        Self {
            renderer,
            live: None,
        }
    }

    pub fn show(&mut self, data: &ChartData) {
        self.clear();
        let handle = self.renderer.create(data);
        self.live = Some(handle);
    }

    pub fn clear(&mut self) {
        if let Some(handle) = self.live.take() {
            self.renderer.dispose(handle);
        }
    }

    pub fn is_live(&self) -> bool {
        self.live.is_some()
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }
}

impl<R: ChartRenderer> Drop for ChartSlot<R> {
    fn drop(&mut self) {
        self.clear();
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, rc::Rc};

    use chrono::Utc;

    use super::*;
    use crate::{DiscountEntry, MonthPeriod, compute_totals};

    #[derive(Default)]
    struct Counts {
        created: u32,
        disposed: u32,
        alive: i32,
        max_alive: i32,
    }

    struct CountingRenderer(Rc<RefCell<Counts>>);

    impl ChartRenderer for CountingRenderer {
        type Handle = u32;

        fn create(&mut self, _data: &ChartData) -> u32 {
            let mut counts = self.0.borrow_mut();
            counts.created += 1;
            counts.alive += 1;
            counts.max_alive = counts.max_alive.max(counts.alive);
            counts.created
        }

        fn dispose(&mut self, _handle: u32) {
            let mut counts = self.0.borrow_mut();
            counts.disposed += 1;
            counts.alive -= 1;
        }
    }

    fn sample() -> ChartData {
        let entries = [DiscountEntry::new("Aluguel", MoneyCents::new(80_000), true)];
        let received = MoneyCents::new(200_000);
        let totals = compute_totals(&entries, Some(received));
        ChartData::from_record(&MonthRecord {
            id: 1,
            user_id: "alice".to_string(),
            month: MonthPeriod::new(2025, 10).unwrap(),
            received,
            discounts: totals.paid_total,
            remainder: totals.remainder,
            closed_at: Utc::now(),
        })
    }

    #[test]
    fn dataset_has_three_labelled_bars() {
        let data = sample();
        assert_eq!(data.title, "outubro de 2025");
        let bars: Vec<_> = data.bars().collect();
        assert_eq!(
            bars,
            vec![
                ("Received", 200_000),
                ("Paid Discounts", 80_000),
                ("Remainder", 120_000)
            ]
        );
    }

    #[test]
    fn slot_never_holds_two_charts() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        {
            let mut slot = ChartSlot::new(CountingRenderer(counts.clone()));
            assert!(!slot.is_live());
            slot.show(&sample());
            slot.show(&sample());
            slot.show(&sample());
            assert!(slot.is_live());
            assert_eq!(counts.borrow().disposed, 2);
        }
        let counts = counts.borrow();
        assert_eq!(counts.created, 3);
        assert_eq!(counts.disposed, 3);
        assert_eq!(counts.max_alive, 1);
        assert_eq!(counts.alive, 0);
    }

    #[test]
    fn clear_is_idempotent() {
        let counts = Rc::new(RefCell::new(Counts::default()));
        let mut slot = ChartSlot::new(CountingRenderer(counts.clone()));
        slot.clear();
        slot.show(&sample());
        slot.clear();
        slot.clear();
        assert_eq!(counts.borrow().disposed, 1);
    }
}
