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
use crate::schemas::goal::{
    CreateGoalRequest, GoalResponse, GoalStatusQuery, NewGoal, UpdateGoalRequest,
};
use crate::state::AppState;

pub fn goals_routes(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_goals).post(create_goal))
        .route(
            "/{goalId}",
            get(get_goal).put(update_goal).delete(delete_goal),
        )
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/v1/goals",
    tag = "Goals",
    request_body = CreateGoalRequest,
    responses(
        (status = 201, body = GoalResponse),
        (status = 400, description = "Invalid request")
    )
)]
async fn create_goal(
    State(state): State<AppState>,
    auth: Authenticated,
    AppJson(request): AppJson<CreateGoalRequest>,
) -> Result<ServiceResponse<GoalResponse>> {
    request.validate()?;

    let created = state
        .goals
        .create(NewGoal::from_request(auth.0.id, request))
        .await?;
    let response = state.goals.get_by_id(auth.0.id, created.id).await?;

    Ok(ServiceResponse::from_data(response).with_status(StatusCode::CREATED))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals",
    tag = "Goals",
    params(GoalStatusQuery, PageableRequest),
    responses(
        (status = 200, body = Vec<GoalResponse>)
    )
)]
async fn get_goals(
    State(state): State<AppState>,
    auth: Authenticated,
    AppQuery(status): AppQuery<GoalStatusQuery>,
    AppQuery(pageable): AppQuery<PageableRequest>,
) -> Result<ServiceResponse<Vec<GoalResponse>>> {
    let page = state.goals.get(auth.0.id, status.status, &pageable).await?;
    Ok(ServiceResponse::from_page(page))
}

#[utoipa::path(
    get,
    path = "/api/v1/goals/{goalId}",
    tag = "Goals",
    params(("goalId" = Uuid, Path, description = "Goal ID")),
    responses(
        (status = 200, body = GoalResponse),
        (status = 404, description = "Goal not found")
    )
)]
async fn get_goal(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(goal_id): AppPath<Uuid>,
) -> Result<ServiceResponse<GoalResponse>> {
    let goal = state.goals.get_by_id(auth.0.id, goal_id).await?;
    Ok(ServiceResponse::from_data(goal))
}

#[utoipa::path(
    put,
    path = "/api/v1/goals/{goalId}",
    tag = "Goals",
    params(("goalId" = Uuid, Path, description = "Goal ID")),
    request_body = UpdateGoalRequest,
    responses(
        (status = 200, body = GoalResponse),
        (status = 403, description = "Not the owner"),
        (status = 404, description = "Goal not found")
    )
)]
async fn update_goal(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(goal_id): AppPath<Uuid>,
    AppJson(request): AppJson<UpdateGoalRequest>,
) -> Result<ServiceResponse<GoalResponse>> {
    request.validate()?;
    let goal = state.goals.update(auth.0.id, goal_id, request).await?;
    Ok(ServiceResponse::from_data(goal))
}

#[utoipa::path(
    delete,
    path = "/api/v1/goals/{goalId}",
    tag = "Goals",
    params(("goalId" = Uuid, Path, description = "Goal ID")),
    responses(
        (status = 200, description = "Goal deleted"),
        (status = 404, description = "Goal not found")
    )
)]
async fn delete_goal(
    State(state): State<AppState>,
    auth: Authenticated,
    AppPath(goal_id): AppPath<Uuid>,
) -> Result<ServiceResponse<()>> {
    state.goals.delete(auth.0.id, goal_id).await?;
    Ok(ServiceResponse::from_message("목표가 삭제되었습니다."))
}
