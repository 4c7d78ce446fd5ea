use axum::{
    Json,
    extract::{Query, State},
};
use std::sync::Arc;

use super::validation::validate_page;
use super::{ActivityPage, ActivityQuery, ApiError, ApiResponse, AppState};

/// GET /activity-log
pub async fn get_activity_log(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<ApiResponse<ActivityPage>>, ApiError> {
    let (page, page_size) = validate_page(query.page, query.page_size)?;

    let (items, total_pages) = state.shared.activity.page(page, page_size).await?;

    Ok(Json(ApiResponse::success(ActivityPage {
        items,
        page,
        page_size,
        total_pages,
    })))
}
