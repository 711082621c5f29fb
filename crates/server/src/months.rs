//! Month API endpoints

use api_types::month::{
    DEFAULT_LIST_LIMIT, DiscountEntryView, LatestMonth, MAX_LIST_LIMIT, MonthClose, MonthList,
    MonthListQuery, MonthView,
};
use axum::{
    Extension, Json,
    extract::{Query, State},
    http::StatusCode,
};
use engine::{DiscountEntry, MoneyCents, MonthPeriod, MonthRecord, build_month_snapshot};

use crate::{ServerError, server::ServerState, user};

fn view(record: MonthRecord) -> MonthView {
    MonthView {
        id: record.id,
        month: record.month.to_string(),
        received_minor: record.received.cents(),
        discounts_minor: record.discounts.cents(),
        remainder_minor: record.remainder.cents(),
        closed_at: record.closed_at,
    }
}

fn entry(view: DiscountEntryView) -> Result<DiscountEntry, ServerError> {
    if view.amount_minor < 0 {
        return Err(ServerError::Validation(format!(
            "amount of \"{}\" must not be negative",
            view.description
        )));
    }
    let mut entry = DiscountEntry::new(view.description, MoneyCents::new(view.amount_minor), view.paid);
    if let Some(id) = view.id {
        entry.id = id;
    }
    Ok(entry)
}

/// Handle requests for closing a month.
///
/// Totals are recomputed here from the submitted entries.
pub async fn close(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Json(payload): Json<MonthClose>,
) -> Result<(StatusCode, Json<MonthView>), ServerError> {
    if payload.received_minor < 0 {
        return Err(ServerError::Validation(
            "received amount must not be negative".to_string(),
        ));
    }
    let month: MonthPeriod = payload.month.parse()?;
    let entries = payload
        .entries
        .into_iter()
        .map(entry)
        .collect::<Result<Vec<_>, _>>()?;

    let snapshot = build_month_snapshot(
        &entries,
        Some(MoneyCents::new(payload.received_minor)),
        month,
    );
    let record = state.engine.close_month(&user.username, &snapshot).await?;

    Ok((StatusCode::CREATED, Json(view(record))))
}

/// Handle requests for the most recently closed month
pub async fn latest(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
) -> Result<Json<LatestMonth>, ServerError> {
    let month = state.engine.latest_month(&user.username).await?.map(view);
    Ok(Json(LatestMonth { month }))
}

/// Handle requests for listing closed months, newest first
pub async fn list(
    Extension(user): Extension<user::Model>,
    State(state): State<ServerState>,
    Query(query): Query<MonthListQuery>,
) -> Result<Json<MonthList>, ServerError> {
    let limit = match query.limit {
        None => DEFAULT_LIST_LIMIT,
        Some(0) => return Err(ServerError::Validation("limit must be positive".to_string())),
        Some(limit) => limit.min(MAX_LIST_LIMIT),
    };
    let months = state
        .engine
        .list_months(&user.username, limit)
        .await?
        .into_iter()
        .map(view)
        .collect();
    Ok(Json(MonthList { months }))
}
