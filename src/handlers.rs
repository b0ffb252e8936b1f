use crate::channels::{self, FeedEvent, SharePayload, ShareResponse};
use crate::errors::AppError;
use crate::models::{
    ActivityEdit, ActivityView, AlertsQuery, CompleteResponse, NewActivity, PermissionRequest,
    format_day,
};
use crate::state::AppState;
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::Html,
    Json,
};
use uuid::Uuid;

pub async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_index(&format_day(state.clock.today())))
}

pub async fn list_activities(
    State(state): State<AppState>,
) -> Result<Json<Vec<ActivityView>>, AppError> {
    let views = state.repository.list_for_day(state.clock.today()).await?;
    Ok(Json(views))
}

pub async fn add_activity(
    State(state): State<AppState>,
    Json(payload): Json<NewActivity>,
) -> Result<(StatusCode, Json<ActivityView>), AppError> {
    payload.validate()?;
    let today = state.clock.today();
    let created = state.repository.append(payload, today).await?;
    Ok((StatusCode::CREATED, Json(ActivityView::for_day(created, today))))
}

pub async fn edit_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<ActivityEdit>,
) -> Result<Json<ActivityView>, AppError> {
    if edit.description.is_none() && edit.time.is_none() {
        return Err(AppError::bad_request("nothing to edit"));
    }
    let updated = state.repository.edit(id, edit).await?;
    Ok(Json(ActivityView::for_day(updated, state.clock.today())))
}

pub async fn complete_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CompleteResponse>, AppError> {
    let today = state.clock.today();
    let completed = state.repository.mark_complete(id, today).await?;
    let view = ActivityView::for_day(completed, today);
    Ok(Json(CompleteResponse {
        message: format!("Marked as completed: {}", view.text),
        activity: view,
    }))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.repository.delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn share_activity(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    headers: HeaderMap,
) -> Result<Json<ShareResponse>, AppError> {
    let activity = state.repository.get(id).await?;
    let payload = SharePayload::for_activity(&activity, page_url(&headers));
    let response = channels::share_activity(state.sharer.as_deref(), payload).await;
    Ok(Json(response))
}

pub async fn get_alerts(
    State(state): State<AppState>,
    Query(query): Query<AlertsQuery>,
) -> Json<Vec<FeedEvent>> {
    Json(state.feed.events_after(query.after).await)
}

pub async fn set_permission(
    State(state): State<AppState>,
    Json(request): Json<PermissionRequest>,
) -> StatusCode {
    state.feed.set_permission(request.permission).await;
    StatusCode::NO_CONTENT
}

fn page_url(headers: &HeaderMap) -> String {
    let host = headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("localhost");
    format!("http://{host}/")
}
