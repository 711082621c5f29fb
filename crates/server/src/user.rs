//! Accounts and the sign-in check.

use api_types::session::SessionUser;
use axum::{Extension, Json};
use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub username: String,
    pub password: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Echo the authenticated user.
///
/// Credentials are already verified by the auth layer, so reaching this
/// handler means the sign-in succeeded.
pub async fn session(Extension(user): Extension<Model>) -> Json<SessionUser> {
    tracing::debug!("session opened for {}", user.username);
    Json(SessionUser {
        username: user.username,
    })
}
