//! Monthly ledger engine.
//!
//! The pure part ([`compute_totals`], [`update_entry_field`],
//! [`build_month_snapshot`], [`Ledger`]) derives totals from discount entries.
//! [`Engine`] stores closed months in the `months` table and reads them back
//! by recency.

use chrono::Utc;
use sea_orm::{DatabaseConnection, QueryFilter, QueryOrder, QuerySelect, prelude::*};

pub use chart::{CHART_LABELS, ChartData, ChartRenderer, ChartSlot};
pub use error::EngineError;
pub use export::{report_lines, to_csv, to_pdf};
pub use ledger::{
    DiscountEntry, EntryField, Ledger, MonthSnapshot, Totals, build_month_snapshot,
    compute_totals, parse_truthy, update_entry_field,
};
pub use legacy::LegacyMonth;
pub use money::{MoneyCents, parse_amount_or_zero};
pub use months::MonthRecord;
pub use period::MonthPeriod;

mod chart;
mod error;
mod export;
mod ledger;
mod legacy;
mod money;
mod months;
mod pdf;
mod period;

type ResultEngine<T> = Result<T, EngineError>;

/// Handle over the month store.
///
/// Built once at startup and shared by reference; every query is scoped to
/// the user that closed the month.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// Appends a closed month. Never updates an existing row.
    pub async fn close_month(
        &self,
        user_id: &str,
        snapshot: &MonthSnapshot,
    ) -> ResultEngine<MonthRecord> {
        let model = months::ActiveModel::from_snapshot(user_id, snapshot, Utc::now())
            .insert(&self.database)
            .await?;
        tracing::debug!(
            "closed month {} for {user_id} as row {}",
            snapshot.month(),
            model.id
        );
        MonthRecord::try_from(model)
    }

    /// The most recently inserted month, by id.
    pub async fn latest_month(&self, user_id: &str) -> ResultEngine<Option<MonthRecord>> {
        months::Entity::find()
            .filter(months::Column::UserId.eq(user_id))
            .order_by_desc(months::Column::Id)
            .one(&self.database)
            .await?
            .map(MonthRecord::try_from)
            .transpose()
    }

    /// Closed months, newest first.
    pub async fn list_months(&self, user_id: &str, limit: u64) -> ResultEngine<Vec<MonthRecord>> {
        months::Entity::find()
            .filter(months::Column::UserId.eq(user_id))
            .order_by_desc(months::Column::Id)
            .limit(limit)
            .all(&self.database)
            .await?
            .into_iter()
            .map(MonthRecord::try_from)
            .collect()
    }

    /// Stores a parallel-array row in the aggregate shape.
    pub async fn import_legacy(
        &self,
        user_id: &str,
        legacy: &LegacyMonth,
    ) -> ResultEngine<MonthRecord> {
        let snapshot = legacy.to_snapshot()?;
        self.close_month(user_id, &snapshot).await
    }
}

/// The builder for `Engine`
#[derive(Default)]
pub struct EngineBuilder {
    database: DatabaseConnection,
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Construct `Engine`
    pub async fn build(self) -> ResultEngine<Engine> {
        Ok(Engine {
            database: self.database,
        })
    }
}
