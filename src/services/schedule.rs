use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, IntoActiveModel, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use crate::error::{AppError, Result, ScheduleError};
use crate::models::prelude::*;
use crate::models::schedule::{self, ScheduleStatus};
use crate::schemas::common::{Page, PageableRequest};
use crate::schemas::schedule::{
    DailyGoalWithSchedules, DailyScheduleResponse, DailyScheduleStatistics, DailySummaryResponse,
    MonthlyScheduleStatisticsResponse, NewSchedule, ScheduleFilter, ScheduleResponse,
    UpdateScheduleRequest,
};
use crate::services::goal::GoalService;
use crate::state::DbConn;

/// `[00:00:00, 23:59:59.999]` of a server-local calendar day, in UTC
pub fn local_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = local_to_utc(date.and_time(NaiveTime::MIN));
    let end = local_to_utc(date.succ_opt().unwrap_or(date).and_time(NaiveTime::MIN))
        - chrono::Duration::milliseconds(1);
    (start, end)
}

fn local_to_utc(naive: NaiveDateTime) -> DateTime<Utc> {
    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|| Utc.from_utc_datetime(&naive))
}

fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

#[derive(Clone)]
pub struct ScheduleService {
    db: DbConn,
    goals: GoalService,
}

impl ScheduleService {
    pub fn new(db: DbConn, goals: GoalService) -> Self {
        Self { db, goals }
    }

    /// Create a schedule under a goal the user owns
    pub async fn create(&self, new_schedule: NewSchedule) -> Result<schedule::Model> {
        validate_range(new_schedule.start_date, new_schedule.end_date)?;
        self.goals
            .find_owned(new_schedule.user_id, new_schedule.goal_id)
            .await?;

        let now = Utc::now();
        let created = schedule::ActiveModel {
            id: Set(Uuid::new_v4()),
            goal_id: Set(new_schedule.goal_id),
            user_id: Set(new_schedule.user_id),
            title: Set(new_schedule.title),
            description: Set(new_schedule.description),
            status: Set(ScheduleStatus::Ready),
            start_date: Set(new_schedule.start_date),
            end_date: Set(new_schedule.end_date),
            created_at: Set(now),
            updated_at: Set(now),
            deleted_at: Set(None),
        }
        .insert(&self.db)
        .await?;

        Ok(created)
    }

    pub async fn get(
        &self,
        user_id: Uuid,
        filter: &ScheduleFilter,
        pageable: &PageableRequest,
    ) -> Result<Page<ScheduleResponse>> {
        let mut condition = Condition::all()
            .add(schedule::Column::UserId.eq(user_id))
            .add(schedule::Column::DeletedAt.is_null());

        if let Some(goal_id) = filter.goal_id {
            condition = condition.add(schedule::Column::GoalId.eq(goal_id));
        }
        if let Some(status) = filter.status {
            condition = condition.add(schedule::Column::Status.eq(status));
        }
        if let Some(from) = filter.start_date {
            condition = condition.add(schedule::Column::StartDate.gte(local_day_bounds(from).0));
        }
        if let Some(until) = filter.end_date {
            condition = condition.add(schedule::Column::StartDate.lte(local_day_bounds(until).1));
        }

        let query = Schedule::find().filter(condition);
        let total = query.clone().count(&self.db).await?;
        let content = query
            .order_by(sort_column(pageable.sort()), pageable.order())
            .offset(pageable.offset())
            .limit(pageable.size())
            .all(&self.db)
            .await?;

        Ok(Page::new(content, pageable, total).map(ScheduleResponse::from))
    }

    pub async fn get_by_id(&self, user_id: Uuid, schedule_id: Uuid) -> Result<schedule::Model> {
        let found = Schedule::find_by_id(schedule_id)
            .filter(schedule::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(ScheduleError::ScheduleNotFound(schedule_id))?;

        if found.user_id != user_id {
            return Err(ScheduleError::AccessDenied(schedule_id).into());
        }
        Ok(found)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        schedule_id: Uuid,
        patch: UpdateScheduleRequest,
    ) -> Result<schedule::Model> {
        let found = self.get_by_id(user_id, schedule_id).await?;
        validate_range(
            patch.start_date.unwrap_or(found.start_date),
            patch.end_date.unwrap_or(found.end_date),
        )?;

        let mut active = found.into_active_model();
        if let Some(title) = patch.title {
            active.title = Set(title);
        }
        if let Some(description) = patch.description {
            active.description = Set(Some(description));
        }
        if let Some(status) = patch.status {
            active.status = Set(status);
        }
        if let Some(start_date) = patch.start_date {
            active.start_date = Set(start_date);
        }
        if let Some(end_date) = patch.end_date {
            active.end_date = Set(end_date);
        }
        active.updated_at = Set(Utc::now());

        Ok(active.update(&self.db).await?)
    }

    pub async fn delete(&self, user_id: Uuid, schedule_id: Uuid) -> Result<()> {
        let found = self.get_by_id(user_id, schedule_id).await?;
        let now = Utc::now();

        let mut active = found.into_active_model();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&self.db).await?;
        Ok(())
    }

    /// Live schedules of a goal starting within `[start, end]`
    pub async fn find_for_goal_between(
        &self,
        goal_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<schedule::Model>> {
        Ok(Schedule::find()
            .filter(schedule::Column::GoalId.eq(goal_id))
            .filter(schedule::Column::DeletedAt.is_null())
            .filter(schedule::Column::StartDate.between(start, end))
            .order_by_asc(schedule::Column::StartDate)
            .all(&self.db)
            .await?)
    }

    /// Per-day totals for the days of a month that have schedules
    pub async fn monthly_statistics(
        &self,
        user_id: Uuid,
        year: i32,
        month: u32,
        goal_id: Option<Uuid>,
    ) -> Result<MonthlyScheduleStatisticsResponse> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| AppError::invalid_request(format!("잘못된 연월입니다: {}-{}", year, month)))?;
        let last = first
            .checked_add_months(chrono::Months::new(1))
            .and_then(|next| next.pred_opt())
            .unwrap_or(first);

        let mut query = Schedule::find()
            .filter(schedule::Column::UserId.eq(user_id))
            .filter(schedule::Column::DeletedAt.is_null())
            .filter(
                schedule::Column::StartDate
                    .between(local_day_bounds(first).0, local_day_bounds(last).1),
            );
        if let Some(goal_id) = goal_id {
            query = query.filter(schedule::Column::GoalId.eq(goal_id));
        }

        let mut per_day: BTreeMap<u32, (u64, u64)> = BTreeMap::new();
        for found in query.all(&self.db).await? {
            let entry = per_day.entry(local_date(found.start_date).day()).or_default();
            entry.0 += 1;
            if found.status == ScheduleStatus::Completed {
                entry.1 += 1;
            }
        }

        Ok(MonthlyScheduleStatisticsResponse {
            year,
            month,
            daily_statistics: per_day
                .into_iter()
                .map(|(day, (total, completed))| DailyScheduleStatistics::new(day, total, completed))
                .collect(),
        })
    }

    /// The day's schedules grouped under their goals
    pub async fn daily_summary(&self, user_id: Uuid, date: NaiveDate) -> Result<DailySummaryResponse> {
        let (start, end) = local_day_bounds(date);
        let schedules = Schedule::find()
            .filter(schedule::Column::UserId.eq(user_id))
            .filter(schedule::Column::DeletedAt.is_null())
            .filter(schedule::Column::StartDate.between(start, end))
            .order_by_asc(schedule::Column::StartDate)
            .all(&self.db)
            .await?;

        let total_schedule_count = schedules.len() as u64;
        let completed_schedule_count = schedules
            .iter()
            .filter(|s| s.status == ScheduleStatus::Completed)
            .count() as u64;

        let mut by_goal: BTreeMap<Uuid, Vec<schedule::Model>> = BTreeMap::new();
        for found in schedules {
            by_goal.entry(found.goal_id).or_default().push(found);
        }

        let mut goals = Vec::with_capacity(by_goal.len());
        for (goal_id, schedules) in by_goal {
            let Some(found) = self.goals.find_by_id(goal_id).await? else {
                continue;
            };
            let completed = schedules
                .iter()
                .filter(|s| s.status == ScheduleStatus::Completed)
                .count() as u64;
            let image_path = self.goals.image_path(&found).await;

            goals.push(DailyGoalWithSchedules {
                id: found.id,
                title: found.title,
                description: found.description,
                target_date: found.target_date,
                status: found.status,
                image_id: found.image_id,
                image_path,
                daily_schedule_count: schedules.len() as u64,
                completed_schedule_count: completed,
                schedules: schedules.into_iter().map(DailyScheduleResponse::from).collect(),
            });
        }

        Ok(DailySummaryResponse {
            date,
            goals,
            total_schedule_count,
            completed_schedule_count,
        })
    }
}

fn validate_range(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<()> {
    if start > end {
        return Err(ScheduleError::InvalidDateRange.into());
    }
    Ok(())
}

fn sort_column(key: &str) -> schedule::Column {
    match key {
        "startDate" => schedule::Column::StartDate,
        "endDate" => schedule::Column::EndDate,
        "title" => schedule::Column::Title,
        "status" => schedule::Column::Status,
        "updatedAt" => schedule::Column::UpdatedAt,
        _ => schedule::Column::CreatedAt,
    }
}
