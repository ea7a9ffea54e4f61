use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Vote {
    pub id: i64,
    pub poll_id: i64,
    pub choice_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct VoteInsert {
    pub poll_id: i64,
    pub choice_id: i64,
    pub user_id: i64,
}
