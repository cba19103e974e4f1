//! Schedule routes, nested under `/api/v1/goals` next to the goal routes.

use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Router,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::Result;
use crate::middleware::{AppJson, AppPath, AppQuery, Authenticated};
use crate::schemas::common::{PageableRequest, ServiceResponse};
use crate::schemas::schedule::{
    CreateScheduleRequest, DailySummaryQuery, DailySummaryResponse,
    MonthlyScheduleStatisticsResponse, MonthlyStatisticsQuery, NewSchedule, ScheduleFilter,
    ScheduleResponse, UpdateScheduleRequest,
};
use crate::state::AppState;

pub fn schedules_routes(state: AppState) -> Router {
    Router::new()
        .route("/schedules", get(get_schedules))
        .route("/schedules/statistics/monthly", get(monthly_statistics))
        .route("/schedules/summary/daily", get(daily_summary))
        .route(
            "/schedules/{scheduleId}",
            get(get_schedule)
                .put(update_schedule)
                .delete(delete_schedule),
        )
        .route(
            "/{goalId}/schedules",
            get(get_goal_schedules).post(create_schedule),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/goals/{goalId}/schedules",
    tag = "Schedules",
    params(("goalId" = Uuid, Path, description = "Goal ID")),
    request_body = CreateScheduleRequest,
    responses(
        (status = 201, body = ScheduleResponse),
        (status = 400, description = "End date before start date"),
        (status = 404, description = "Goal not found")
    )
)]
async fn create_schedule(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(goal_id): AppPath<Uuid>,
    AppJson(request): AppJson<CreateScheduleRequest>,
) -> Result<ServiceResponse<ScheduleResponse>> {
    request.validate()?;

    let created = state
        .schedules
        .create(NewSchedule::from_request(goal_id, auth.0.id, request))
        .await?;

    Ok(ServiceResponse::from_data(ScheduleResponse::from(created)).with_status(StatusCode::CREATED))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/{goalId}/schedules",
    tag = "Schedules",
    params(("goalId" = Uuid, Path, description = "Goal ID"), PageableRequest),
    responses(
        (status = 200, body = Vec<ScheduleResponse>)
    )
)]
async fn get_goal_schedules(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(goal_id): AppPath<Uuid>,
    AppQuery(pageable): AppQuery<PageableRequest>,
) -> Result<ServiceResponse<Vec<ScheduleResponse>>> {
    state.goals.find_owned(auth.0.id, goal_id).await?;

    let filter = ScheduleFilter {
        goal_id: Some(goal_id),
        ..Default::default()
    };
    let page = state.schedules.get(auth.0.id, &filter, &pageable).await?;
    Ok(ServiceResponse::from_page(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/schedules",
    tag = "Schedules",
    params(ScheduleFilter, PageableRequest),
    responses(
        (status = 200, body = Vec<ScheduleResponse>)
    )
)]
async fn get_schedules(
    State(state): State<AppState>,
    auth: Authenticated,
    AppQuery(filter): AppQuery<ScheduleFilter>,
    AppQuery(pageable): AppQuery<PageableRequest>,
) -> Result<ServiceResponse<Vec<ScheduleResponse>>> {
    let page = state.schedules.get(auth.0.id, &filter, &pageable).await?;
    Ok(ServiceResponse::from_page(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/schedules/{scheduleId}",
    tag = "Schedules",
    params(("scheduleId" = Uuid, Path, description = "Schedule ID")),
    responses(
        (status = 200, body = ScheduleResponse),
        (status = 404, description = "Schedule not found")
    )
)]
async fn get_schedule(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(schedule_id): AppPath<Uuid>,
) -> Result<ServiceResponse<ScheduleResponse>> {
    let found = state.schedules.get_by_id(auth.0.id, schedule_id).await?;
    Ok(ServiceResponse::from_data(found.into()))
}

#[utoipa::path(
    put,
    path = "/api/v1/goals/schedules/{scheduleId}",
    tag = "Schedules",
    params(("scheduleId" = Uuid, Path, description = "Schedule ID")),
    request_body = UpdateScheduleRequest,
    responses(
        (status = 200, body = ScheduleResponse),
        (status = 404, description = "Schedule not found")
    )
)]
async fn update_schedule(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(schedule_id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateScheduleRequest>,
) -> Result<ServiceResponse<ScheduleResponse>> {
    request.validate()?;
    let updated = state
        .schedules
        .update(auth.0.id, schedule_id, request)
        .await?;
    Ok(ServiceResponse::from_data(updated.into()))
}

#[utoipa::path(
    delete,
    path = "/api/v1/goals/schedules/{scheduleId}",
    tag = "Schedules",
    params(("scheduleId" = Uuid, Path, description = "Schedule ID")),
    responses(
        (status = 200, description = "Schedule deleted"),
        (status = 404, description = "Schedule not found")
    )
)]
async fn delete_schedule(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(schedule_id): AppPath<Uuid>,
) -> Result<ServiceResponse<()>> {
    state.schedules.delete(auth.0.id, schedule_id).await?;
    Ok(ServiceResponse::from_message("일정이 삭제되었습니다."))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/schedules/statistics/monthly",
    tag = "Schedules",
    params(MonthlyStatisticsQuery),
    responses(
        (status = 200, body = MonthlyScheduleStatisticsResponse)
    )
)]
async fn monthly_statistics(
    State(state): State<AppState>,
    auth: Authenticated,
    AppQuery(query): AppQuery<MonthlyStatisticsQuery>,
) -> Result<ServiceResponse<MonthlyScheduleStatisticsResponse>> {
    let stats = state
        .schedules
        .monthly_statistics(auth.0.id, query.year, query.month, query.goal_id)
        .await?;
    Ok(ServiceResponse::from_data(stats))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/schedules/summary/daily",
    tag = "Schedules",
    params(DailySummaryQuery),
    responses(
        (status = 200, body = DailySummaryResponse)
    )
)]
async fn daily_summary(
    State(state): State<AppState>,
    auth: Authenticated,
    AppQuery(query): AppQuery<DailySummaryQuery>,
) -> Result<ServiceResponse<DailySummaryResponse>> {
    let summary = state.schedules.daily_summary(auth.0.id, query.date).await?;
    Ok(ServiceResponse::from_data(summary))
}
