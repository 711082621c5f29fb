use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of every non-2xx response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

pub mod session {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SessionUser {
        pub username: String,
    }
}

pub mod month {
    use super::*;

    /// Upper bound accepted for `?limit=` on `GET /months`.
    pub const MAX_LIST_LIMIT: u64 = 120;
    pub const DEFAULT_LIST_LIMIT: u64 = 12;

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct DiscountEntryView {
        #[serde(default)]
        pub id: Option<Uuid>,
        #[serde(default)]
        pub description: String,
        /// Cents. Negative values are rejected.
        pub amount_minor: i64,
        #[serde(default)]
        pub paid: bool,
    }

    /// Request to close a month.
    ///
    /// The server recomputes the totals from `entries`; only paid entries
    /// count towards the discounts.
    #[derive(Clone, Debug, Serialize, Deserialize)]
    pub struct MonthClose {
        /// `YYYY-MM` or a pt-BR label such as `outubro de 2025`.
        pub month: String,
        pub received_minor: i64,
        #[serde(default)]
        pub entries: Vec<DiscountEntryView>,
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct MonthView {
        pub id: i32,
        /// `YYYY-MM`.
        pub month: String,
        pub received_minor: i64,
        pub discounts_minor: i64,
        pub remainder_minor: i64,
        pub closed_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LatestMonth {
        pub month: Option<MonthView>,
    }

    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MonthListQuery {
        pub limit: Option<u64>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthList {
        pub months: Vec<MonthView>,
    }
}
