//! Closed months as stored in the `months` table.
//!
//! Rows are append-only. The auto-increment `id` is the recency key: the
//! latest month is the row with the highest id, regardless of `closed_at`.

use chrono::{DateTime, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};

use crate::{EngineError, MoneyCents, MonthPeriod, MonthSnapshot};

/// A persisted month summary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MonthRecord {
    pub id: i32,
    pub user_id: String,
    pub month: MonthPeriod,
    pub received: MoneyCents,
    pub discounts: MoneyCents,
    pub remainder: MoneyCents,
    pub closed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "months")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub user_id: String,
    pub month: String,
    pub received_minor: i64,
    pub discounts_minor: i64,
    pub remainder_minor: i64,
    pub closed_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl ActiveModel {
    pub(crate) fn from_snapshot(
        user_id: &str,
        snapshot: &MonthSnapshot,
        closed_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: ActiveValue::NotSet,
            user_id: ActiveValue::Set(user_id.to_string()),
            month: ActiveValue::Set(snapshot.month().to_string()),
            received_minor: ActiveValue::Set(snapshot.received().cents()),
            discounts_minor: ActiveValue::Set(snapshot.discounts().cents()),
            remainder_minor: ActiveValue::Set(snapshot.remainder().cents()),
            closed_at: ActiveValue::Set(closed_at),
        }
    }
}

impl TryFrom<Model> for MonthRecord {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            month: model.month.parse()?,
            received: MoneyCents::new(model.received_minor),
            discounts: MoneyCents::new(model.discounts_minor),
            remainder: MoneyCents::new(model.remainder_minor),
            closed_at: model.closed_at,
        })
    }
}
