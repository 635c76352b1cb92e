//! Task model, ordering rules, and database operations.
//!
//! Tasks live on a three-column board (todo, in_progress, done). Status
//! transitions are deliberately unconstrained; there is no state machine.
//! The one non-trivial piece of logic in the system is the per-filter
//! ordering implemented by [`sort_for_filter`]:
//!
//! - `all`: grouped todo < in_progress < done, newest first within a group
//! - `todo` / `in_progress`: tasks with a start date first, soonest date
//!   first (created_at breaks ties ascending); undated tasks last
//! - `done`: newest first, start date ignored
//!
//! # Schema
//!
//! ```sql
//! CREATE TYPE task_status AS ENUM ('todo', 'in_progress', 'done');
//!
//! CREATE TABLE tasks (
//!     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
//!     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
//!     title VARCHAR(255) NOT NULL,
//!     status task_status NOT NULL DEFAULT 'todo',
//!     start_date DATE,
//!     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
//! );
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use std::cmp::Reverse;
use uuid::Uuid;

/// Workflow state of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "task_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    /// Not started
    Todo,

    /// Being worked on
    InProgress,

    /// Finished
    Done,
}

impl TaskStatus {
    /// Parses a status string; returns `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "todo" => Some(TaskStatus::Todo),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }

    /// Status as the string stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Todo => "todo",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    /// Fixed board-column order used by the `all` listing.
    fn column_order(&self) -> u8 {
        match self {
            TaskStatus::Todo => 0,
            TaskStatus::InProgress => 1,
            TaskStatus::Done => 2,
        }
    }
}

/// Status filter accepted by the list operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every task, grouped by status
    All,

    /// Only todo tasks
    Todo,

    /// Only in-progress tasks
    InProgress,

    /// Only done tasks
    Done,
}

impl StatusFilter {
    /// Parses a filter string; returns `None` for anything unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "all" => Some(StatusFilter::All),
            "todo" => Some(StatusFilter::Todo),
            "in_progress" => Some(StatusFilter::InProgress),
            "done" => Some(StatusFilter::Done),
            _ => None,
        }
    }

    /// The single status this filter narrows to, if any.
    pub fn status(&self) -> Option<TaskStatus> {
        match self {
            StatusFilter::All => None,
            StatusFilter::Todo => Some(TaskStatus::Todo),
            StatusFilter::InProgress => Some(TaskStatus::InProgress),
            StatusFilter::Done => Some(TaskStatus::Done),
        }
    }
}

/// Parses a start date, accepting only strict `YYYY-MM-DD` strings that
/// name a real calendar date.
pub fn parse_start_date(s: &str) -> Option<NaiveDate> {
    if s.len() != 10 {
        return None;
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Task record.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owner; tasks are only ever visible through this user's identity
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Workflow state
    pub status: TaskStatus,

    /// Optional calendar date the task is intended to begin
    pub start_date: Option<NaiveDate>,

    /// When the task was created (tiebreak and `done` ordering)
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new task.
#[derive(Debug, Clone)]
pub struct CreateTask {
    /// Owner
    pub user_id: Uuid,

    /// Task title
    pub title: String,

    /// Initial status
    pub status: TaskStatus,

    /// Optional start date
    pub start_date: Option<NaiveDate>,
}

/// Partial update over title, status and start_date.
///
/// Each field is independently present or absent; for `start_date` the
/// inner option distinguishes "set this date" from "clear the date".
/// The patch is applied with fixed per-field SQL, never assembled
/// dynamically.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// Replacement title (empty string allowed here)
    pub title: Option<String>,

    /// Replacement status
    pub status: Option<TaskStatus>,

    /// `Some(Some(date))` sets, `Some(None)` clears, `None` leaves untouched
    pub start_date: Option<Option<NaiveDate>>,
}

impl TaskPatch {
    /// True when no field would change anything.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.status.is_none() && self.start_date.is_none()
    }
}

/// Per-status counts plus schedule-derived counts, scoped to one user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStats {
    /// Tasks in todo
    pub todo: i64,

    /// Tasks in progress
    pub in_progress: i64,

    /// Finished tasks
    pub done: i64,

    /// All tasks
    pub total: i64,

    /// Unfinished tasks whose start date has passed
    pub overdue: i64,

    /// Unfinished tasks starting today
    pub today: i64,
}

/// Sorts tasks in place according to the listing rules for `filter`.
///
/// The store returns tasks unordered; this is the single place the
/// board ordering is decided.
pub fn sort_for_filter(tasks: &mut [Task], filter: StatusFilter) {
    match filter {
        StatusFilter::All => {
            tasks.sort_by_key(|t| (t.status.column_order(), Reverse(t.created_at)));
        }
        StatusFilter::Done => {
            tasks.sort_by_key(|t| Reverse(t.created_at));
        }
        StatusFilter::Todo | StatusFilter::InProgress => {
            // Undated tasks sort last; dated ones soonest-first.
            tasks.sort_by_key(|t| (t.start_date.is_none(), t.start_date, t.created_at));
        }
    }
}

impl Task {
    /// Inserts a new task and returns it with the store-assigned ID and
    /// creation timestamp.
    pub async fn create(pool: &PgPool, data: CreateTask) -> Result<Self, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            INSERT INTO tasks (user_id, title, status, start_date)
            VALUES ($1, $2, $3, $4)
            RETURNING id, user_id, title, status, start_date, created_at
            "#,
        )
        .bind(data.user_id)
        .bind(data.title)
        .bind(data.status)
        .bind(data.start_date)
        .fetch_one(pool)
        .await?;

        Ok(task)
    }

    /// Lists a user's tasks, optionally narrowed to one status.
    ///
    /// Results are unordered; callers apply [`sort_for_filter`].
    pub async fn list_for_user(
        pool: &PgPool,
        user_id: Uuid,
        status: Option<TaskStatus>,
    ) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = match status {
            Some(status) => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, user_id, title, status, start_date, created_at
                    FROM tasks
                    WHERE user_id = $1 AND status = $2
                    "#,
                )
                .bind(user_id)
                .bind(status)
                .fetch_all(pool)
                .await?
            }
            None => {
                sqlx::query_as::<_, Task>(
                    r#"
                    SELECT id, user_id, title, status, start_date, created_at
                    FROM tasks
                    WHERE user_id = $1
                    "#,
                )
                .bind(user_id)
                .fetch_all(pool)
                .await?
            }
        };

        Ok(tasks)
    }

    /// Finds a task by ID, scoped to its owner.
    ///
    /// A task belonging to someone else is indistinguishable from a task
    /// that does not exist.
    pub async fn find_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, status, start_date, created_at
            FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Updates only the status field, scoped to the owner.
    ///
    /// Returns `None` if the task does not exist or is not owned by
    /// `user_id`.
    pub async fn update_status(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        status: TaskStatus,
    ) -> Result<Option<Self>, sqlx::Error> {
        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET status = $3
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, status, start_date, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(status)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Applies a partial update, scoped to the owner.
    ///
    /// One fixed statement covers every field combination: absent title
    /// and status fall through via COALESCE, and the start date is only
    /// touched when the patch carries the key at all.
    pub async fn apply_patch(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
        patch: TaskPatch,
    ) -> Result<Option<Self>, sqlx::Error> {
        let set_start_date = patch.start_date.is_some();
        let new_start_date = patch.start_date.flatten();

        let task = sqlx::query_as::<_, Task>(
            r#"
            UPDATE tasks
            SET title = COALESCE($3, title),
                status = COALESCE($4, status),
                start_date = CASE WHEN $5 THEN $6 ELSE start_date END
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, title, status, start_date, created_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(patch.title)
        .bind(patch.status)
        .bind(set_start_date)
        .bind(new_start_date)
        .fetch_optional(pool)
        .await?;

        Ok(task)
    }

    /// Deletes a task, scoped to the owner.
    ///
    /// Returns true if a row was removed.
    pub async fn delete_for_user(
        pool: &PgPool,
        id: Uuid,
        user_id: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Aggregate counts for one user's board.
    pub async fn stats_for_user(pool: &PgPool, user_id: Uuid) -> Result<TaskStats, sqlx::Error> {
        let (todo, in_progress, done, total, overdue, today): (i64, i64, i64, i64, i64, i64) =
            sqlx::query_as(
                r#"
                SELECT
                    COUNT(*) FILTER (WHERE status = 'todo'),
                    COUNT(*) FILTER (WHERE status = 'in_progress'),
                    COUNT(*) FILTER (WHERE status = 'done'),
                    COUNT(*),
                    COUNT(*) FILTER (WHERE status <> 'done'
                                     AND start_date IS NOT NULL
                                     AND start_date < CURRENT_DATE),
                    COUNT(*) FILTER (WHERE status <> 'done'
                                     AND start_date = CURRENT_DATE)
                FROM tasks
                WHERE user_id = $1
                "#,
            )
            .bind(user_id)
            .fetch_one(pool)
            .await?;

        Ok(TaskStats {
            todo,
            in_progress,
            done,
            total,
            overdue,
            today,
        })
    }

    /// Unfinished tasks starting within the next seven days, soonest first.
    pub async fn upcoming_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let tasks = sqlx::query_as::<_, Task>(
            r#"
            SELECT id, user_id, title, status, start_date, created_at
            FROM tasks
            WHERE user_id = $1
              AND status <> 'done'
              AND start_date IS NOT NULL
              AND start_date >= CURRENT_DATE
              AND start_date <= CURRENT_DATE + 7
            ORDER BY start_date ASC, created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(tasks)
    }
}
