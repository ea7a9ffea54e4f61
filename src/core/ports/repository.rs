use crate::core::models::{
    poll::{Choice, ChoiceVoteCount, Poll, PollInsert},
    user::{User, UserInsert},
    vote::{Vote, VoteInsert},
};
use crate::error::Error;

pub trait PollCommon {
    async fn insert(&mut self, poll: PollInsert) -> Result<i64, Error>;
    async fn get(&mut self, id: i64) -> Result<Option<Poll>, Error>;
    // newest first
    async fn query(&mut self, page: i64, size: i64) -> Result<Vec<Poll>, Error>;
    async fn count(&mut self) -> Result<i64, Error>;
    async fn query_by_creator(&mut self, creator_id: i64, page: i64, size: i64) -> Result<Vec<Poll>, Error>;
    async fn count_by_creator(&mut self, creator_id: i64) -> Result<i64, Error>;
    async fn get_by_ids(&mut self, ids: Vec<i64>) -> Result<Vec<Poll>, Error>;
}

pub trait ChoiceCommon {
    async fn insert_many(&mut self, poll_id: i64, texts: Vec<String>) -> Result<(), Error>;
    async fn of_poll(&mut self, poll_id: i64) -> Result<Vec<Choice>, Error>;
    async fn of_polls(&mut self, poll_ids: Vec<i64>) -> Result<Vec<Choice>, Error>;
}

pub trait VoteCommon {
    // None when the voter already has a vote in this poll
    async fn insert(&mut self, vote: VoteInsert) -> Result<Option<i64>, Error>;
    async fn count_grouped_by_choice(&mut self, poll_ids: Vec<i64>) -> Result<Vec<ChoiceVoteCount>, Error>;
    async fn get_by_user_and_poll(&mut self, user_id: i64, poll_id: i64) -> Result<Option<Vote>, Error>;
    async fn get_by_user_and_polls(&mut self, user_id: i64, poll_ids: Vec<i64>) -> Result<Vec<Vote>, Error>;
    // polls the user voted in, most recent vote first
    async fn voted_poll_ids(&mut self, user_id: i64, page: i64, size: i64) -> Result<Vec<i64>, Error>;
    async fn count_by_user(&mut self, user_id: i64) -> Result<i64, Error>;
}

pub trait UserCommon {
    async fn insert(&mut self, user: UserInsert) -> Result<i64, Error>;
    async fn get(&mut self, id: i64) -> Result<Option<User>, Error>;
    async fn get_by_ids(&mut self, ids: Vec<i64>) -> Result<Vec<User>, Error>;
    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error>;
    async fn get_by_username_or_email(&mut self, identity: &str) -> Result<Option<User>, Error>;
    async fn username_exists(&mut self, username: &str) -> Result<bool, Error>;
    async fn email_exists(&mut self, email: &str) -> Result<bool, Error>;
}

pub trait Common: PollCommon + ChoiceCommon + VoteCommon + UserCommon {}

pub trait Store: Common {}

pub trait TxStore: Store {
    async fn commit(self) -> Result<(), Error>;
    async fn rollback(self) -> Result<(), Error>;
}
