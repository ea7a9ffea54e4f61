use sqlx::pool::PoolConnection;
use sqlx::{query_as, query_scalar, Executor, PgPool, Postgres, QueryBuilder, Transaction};

use crate::core::models::{
    poll::{Choice, ChoiceVoteCount, Poll, PollInsert},
    user::{User, UserInsert},
    vote::{Vote, VoteInsert},
};
use crate::core::ports::repository::{ChoiceCommon, Common, PollCommon, Store, TxStore, UserCommon, VoteCommon};
use crate::error::Error;

pub struct PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    executor: E,
}

impl<E> PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }
}

pub struct PgSqlxManager {
    pool: PgPool,
}

impl PgSqlxManager {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn acquire(&self) -> Result<PgSqlx<PoolConnection<Postgres>>, Error> {
        let conn = self.pool.acquire().await?;
        Ok(PgSqlx::new(conn))
    }

    pub async fn begin(&self) -> Result<PgSqlx<Transaction<'static, Postgres>>, Error> {
        let tx = self.pool.begin().await?;
        Ok(PgSqlx::new(tx))
    }
}

impl<E> PollCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, poll: PollInsert) -> Result<i64, Error> {
        let id = query_scalar("INSERT INTO polls (question, created_by, created_at, expires_at) VALUES ($1, $2, $3, $4) RETURNING id")
            .bind(poll.question)
            .bind(poll.created_by)
            .bind(poll.created_at)
            .bind(poll.expires_at)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i64) -> Result<Option<Poll>, Error> {
        let poll = query_as("SELECT * FROM polls WHERE id = $1").bind(id).fetch_optional(&mut self.executor).await?;
        Ok(poll)
    }

    async fn query(&mut self, page: i64, size: i64) -> Result<Vec<Poll>, Error> {
        let polls = query_as("SELECT * FROM polls ORDER BY created_at DESC LIMIT $1 OFFSET $2")
            .bind(size)
            .bind(page.saturating_mul(size))
            .fetch_all(&mut self.executor)
            .await?;
        Ok(polls)
    }

    async fn count(&mut self) -> Result<i64, Error> {
        let total = query_scalar("SELECT COUNT(*) FROM polls").fetch_one(&mut self.executor).await?;
        Ok(total)
    }

    async fn query_by_creator(&mut self, creator_id: i64, page: i64, size: i64) -> Result<Vec<Poll>, Error> {
        let polls = query_as("SELECT * FROM polls WHERE created_by = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3")
            .bind(creator_id)
            .bind(size)
            .bind(page.saturating_mul(size))
            .fetch_all(&mut self.executor)
            .await?;
        Ok(polls)
    }

    async fn count_by_creator(&mut self, creator_id: i64) -> Result<i64, Error> {
        let total = query_scalar("SELECT COUNT(*) FROM polls WHERE created_by = $1")
            .bind(creator_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(total)
    }

    async fn get_by_ids(&mut self, ids: Vec<i64>) -> Result<Vec<Poll>, Error> {
        let polls = query_as("SELECT * FROM polls WHERE id = ANY($1) ORDER BY created_at DESC")
            .bind(ids)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(polls)
    }
}

impl<E> ChoiceCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert_many(&mut self, poll_id: i64, texts: Vec<String>) -> Result<(), Error> {
        let mut stmt = QueryBuilder::new("INSERT INTO choices (text, poll_id) ");
        stmt.push_values(texts, |mut b, text| {
            b.push_bind(text).push_bind(poll_id);
        });
        stmt.build().execute(&mut self.executor).await?;
        Ok(())
    }

    async fn of_poll(&mut self, poll_id: i64) -> Result<Vec<Choice>, Error> {
        let choices = query_as("SELECT * FROM choices WHERE poll_id = $1 ORDER BY id")
            .bind(poll_id)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(choices)
    }

    async fn of_polls(&mut self, poll_ids: Vec<i64>) -> Result<Vec<Choice>, Error> {
        let choices = query_as("SELECT * FROM choices WHERE poll_id = ANY($1) ORDER BY id")
            .bind(poll_ids)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(choices)
    }
}

impl<E> VoteCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, vote: VoteInsert) -> Result<Option<i64>, Error> {
        // votes carry a unique (poll_id, user_id) key; a second vote inserts nothing
        let id = query_scalar("INSERT INTO votes (poll_id, choice_id, user_id) VALUES ($1, $2, $3) ON CONFLICT (poll_id, user_id) DO NOTHING RETURNING id")
            .bind(vote.poll_id)
            .bind(vote.choice_id)
            .bind(vote.user_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn count_grouped_by_choice(&mut self, poll_ids: Vec<i64>) -> Result<Vec<ChoiceVoteCount>, Error> {
        let counts = query_as("SELECT choice_id, COUNT(id) AS vote_count FROM votes WHERE poll_id = ANY($1) GROUP BY choice_id")
            .bind(poll_ids)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(counts)
    }

    async fn get_by_user_and_poll(&mut self, user_id: i64, poll_id: i64) -> Result<Option<Vote>, Error> {
        let vote = query_as("SELECT * FROM votes WHERE user_id = $1 AND poll_id = $2")
            .bind(user_id)
            .bind(poll_id)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(vote)
    }

    async fn get_by_user_and_polls(&mut self, user_id: i64, poll_ids: Vec<i64>) -> Result<Vec<Vote>, Error> {
        let votes = query_as("SELECT * FROM votes WHERE user_id = $1 AND poll_id = ANY($2)")
            .bind(user_id)
            .bind(poll_ids)
            .fetch_all(&mut self.executor)
            .await?;
        Ok(votes)
    }

    async fn voted_poll_ids(&mut self, user_id: i64, page: i64, size: i64) -> Result<Vec<i64>, Error> {
        let ids = query_scalar("SELECT poll_id FROM votes WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3")
            .bind(user_id)
            .bind(size)
            .bind(page.saturating_mul(size))
            .fetch_all(&mut self.executor)
            .await?;
        Ok(ids)
    }

    async fn count_by_user(&mut self, user_id: i64) -> Result<i64, Error> {
        let total = query_scalar("SELECT COUNT(*) FROM votes WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(total)
    }
}

impl<E> UserCommon for PgSqlx<E>
where
    for<'e> &'e mut E: Executor<'e, Database = Postgres>,
{
    async fn insert(&mut self, user: UserInsert) -> Result<i64, Error> {
        let id = query_scalar("INSERT INTO users (username, email, name, password, salt) VALUES ($1, $2, $3, $4, $5) RETURNING id")
            .bind(user.username)
            .bind(user.email)
            .bind(user.name)
            .bind(user.password)
            .bind(user.salt)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(id)
    }

    async fn get(&mut self, id: i64) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE id = $1").bind(id).fetch_optional(&mut self.executor).await?;
        Ok(user)
    }

    async fn get_by_ids(&mut self, ids: Vec<i64>) -> Result<Vec<User>, Error> {
        let users = query_as("SELECT * FROM users WHERE id = ANY($1)").bind(ids).fetch_all(&mut self.executor).await?;
        Ok(users)
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(user)
    }

    async fn get_by_username_or_email(&mut self, identity: &str) -> Result<Option<User>, Error> {
        let user = query_as("SELECT * FROM users WHERE username = $1 OR email = $1")
            .bind(identity)
            .fetch_optional(&mut self.executor)
            .await?;
        Ok(user)
    }

    async fn username_exists(&mut self, username: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM users WHERE username = $1)")
            .bind(username)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }

    async fn email_exists(&mut self, email: &str) -> Result<bool, Error> {
        let exists = query_scalar("SELECT EXISTS(SELECT * FROM users WHERE email = $1)")
            .bind(email)
            .fetch_one(&mut self.executor)
            .await?;
        Ok(exists)
    }
}

impl Common for PgSqlx<PoolConnection<Postgres>> {}
impl Common for PgSqlx<Transaction<'static, Postgres>> {}

impl Store for PgSqlx<PoolConnection<Postgres>> {}
impl Store for PgSqlx<Transaction<'static, Postgres>> {}

impl TxStore for PgSqlx<Transaction<'static, Postgres>> {
    async fn commit(self) -> Result<(), Error> {
        self.executor.commit().await?;
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        self.executor.rollback().await?;
        Ok(())
    }
}
