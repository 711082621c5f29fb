use axum::{Json, http::StatusCode, response::IntoResponse};
use engine::EngineError;

pub use server::{app, run_with_listener};

mod months;
mod server;
mod user;

pub mod types {
    pub mod month {
        pub use api_types::month::{
            DiscountEntryView, LatestMonth, MonthClose, MonthList, MonthListQuery, MonthView,
        };
    }

    pub mod session {
        pub use api_types::session::SessionUser;
    }
}

pub enum ServerError {
    Engine(EngineError),
    Validation(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err {
        EngineError::EntryOutOfRange { .. } => StatusCode::NOT_FOUND,
        EngineError::Database(_) | EngineError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
        EngineError::InvalidField(_) | EngineError::InvalidMonth(_) | EngineError::LegacyShape(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    }
}

fn message_for_engine_error(err: EngineError) -> String {
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            "internal server error".to_string()
        }
        other => other.to_string(),
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, error) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), message_for_engine_error(err)),
            ServerError::Validation(err) => (StatusCode::UNPROCESSABLE_ENTITY, err),
        };

        (status, Json(api_types::ErrorBody { error })).into_response()
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::DbErr;

    #[test]
    fn out_of_range_maps_to_404() {
        let res = ServerError::from(EngineError::EntryOutOfRange { index: 3, len: 1 }).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn bad_month_maps_to_422() {
        let res = ServerError::from(EngineError::InvalidMonth("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn validation_maps_to_422() {
        let res = ServerError::Validation("negative".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn database_maps_to_500() {
        let res = ServerError::from(EngineError::Database(DbErr::Custom("boom".to_string())))
            .into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
