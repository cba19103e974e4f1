//! Wall-clock scheduler for background jobs.
//!
//! Add new tasks by implementing the `PeriodicTask` trait.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveTime, TimeZone};

use super::assistant::FeedbackService;
use super::goal::GoalService;
use super::user::UserService;

/// Trait for periodic background tasks
#[async_trait]
pub trait PeriodicTask: Send + Sync {
    /// Task name for logging
    fn name(&self) -> &'static str;

    /// Time to wait from `now` until the next firing
    fn next_delay(&self, now: DateTime<Local>) -> Duration;

    /// Execute the task
    async fn run(&self) -> anyhow::Result<()>;
}

/// Start all periodic tasks
pub fn start_scheduler(tasks: Vec<Box<dyn PeriodicTask>>) {
    for task in tasks {
        tokio::spawn(async move {
            run_task(task).await;
        });
    }

    tracing::info!("Periodic task scheduler started");
}

async fn run_task(task: Box<dyn PeriodicTask>) {
    loop {
        let delay = task.next_delay(Local::now());
        tracing::debug!(task = task.name(), delay_secs = delay.as_secs(), "Next run scheduled");
        tokio::time::sleep(delay).await;

        tracing::info!(task = task.name(), "Running periodic task");

        match task.run().await {
            Ok(()) => {
                tracing::info!(task = task.name(), "Periodic task completed");
            }
            Err(e) => {
                tracing::error!(task = task.name(), error = %e, "Periodic task failed");
            }
        }
    }
}

/// Delay until the next local `at`, strictly after `now`
pub fn until_next_daily(now: DateTime<Local>, at: NaiveTime) -> Duration {
    let today = now.date_naive();
    let mut day = today;
    loop {
        if let Some(candidate) = Local.from_local_datetime(&day.and_time(at)).earliest() {
            if candidate > now {
                return (candidate - now).to_std().unwrap_or(Duration::ZERO);
            }
        }
        match day.succ_opt() {
            Some(next) if next <= today + chrono::Duration::days(2) => day = next,
            _ => return Duration::from_secs(24 * 60 * 60),
        }
    }
}

// ============================================================================
// AI Feedback Task
// ============================================================================

/// Daily feedback over every live goal of every active user
pub struct FeedbackTask {
    users: UserService,
    goals: GoalService,
    feedback: FeedbackService,
    at: NaiveTime,
}

impl FeedbackTask {
    pub fn new(users: UserService, goals: GoalService, feedback: FeedbackService) -> Self {
        Self {
            users,
            goals,
            feedback,
            at: NaiveTime::from_hms_opt(9, 0, 0).unwrap_or_default(),
        }
    }
}

#[async_trait]
impl PeriodicTask for FeedbackTask {
    fn name(&self) -> &'static str {
        "ai_feedback"
    }

    fn next_delay(&self, now: DateTime<Local>) -> Duration {
        until_next_daily(now, self.at)
    }

    /// Sequential; the first failure aborts the rest of the run
    async fn run(&self) -> anyhow::Result<()> {
        let mut processed = 0usize;
        for user in self.users.list_active().await? {
            for found in self.goals.list_for_user(user.id).await? {
                self.feedback.feedback_for_goal(user.id, &found).await?;
                processed += 1;
            }
        }

        tracing::info!(goals = processed, "Feedback run finished");
        Ok(())
    }
}
