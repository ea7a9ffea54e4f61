use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct Poll {
    pub id: i64,
    pub question: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct PollInsert {
    pub question: String,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow)]
pub struct Choice {
    pub id: i64,
    pub text: String,
    pub poll_id: i64,
}

// one grouped-count row; choices nobody voted for produce no row at all
#[derive(Debug, Clone, FromRow)]
pub struct ChoiceVoteCount {
    pub choice_id: i64,
    pub vote_count: i64,
}
