//! Current caller endpoint

use axum::Json;

use crate::models::view::AccountInfo;

use super::CurrentUser;

/// Who is calling and what they may do
#[utoipa::path(
    get,
    path = "/api/me",
    tag = "account",
    security(("api_key" = [])),
    responses(
        (status = 200, description = "Current caller", body = AccountInfo),
        (status = 401, description = "Unknown API key")
    )
)]
pub async fn me(CurrentUser(principal): CurrentUser) -> Json<AccountInfo> {
    Json(AccountInfo::from(principal))
}
