use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use chrono::{DateTime, Utc};

use crate::core::models::{
    poll::{Choice, ChoiceVoteCount, Poll, PollInsert},
    user::{User, UserInsert},
    vote::{Vote, VoteInsert},
};
use crate::core::ports::repository::{ChoiceCommon, Common, PollCommon, Store, TxStore, UserCommon, VoteCommon};
use crate::error::Error;

#[derive(Debug, Default)]
pub(crate) struct MemState {
    pub polls: Vec<Poll>,
    pub choices: Vec<Choice>,
    pub votes: Vec<Vote>,
    pub users: Vec<User>,
    next_id: i64,
}

impl MemState {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

// shared handle so a store consumed by a transactional call stays inspectable
#[derive(Debug, Clone, Default)]
pub(crate) struct MemStore(pub Rc<RefCell<MemState>>);

impl PollCommon for MemStore {
    async fn insert(&mut self, poll: PollInsert) -> Result<i64, Error> {
        let mut state = self.0.borrow_mut();
        let id = state.next_id();
        state.polls.push(Poll {
            id,
            question: poll.question,
            created_by: poll.created_by,
            created_at: poll.created_at,
            expires_at: poll.expires_at,
        });
        Ok(id)
    }

    async fn get(&mut self, id: i64) -> Result<Option<Poll>, Error> {
        Ok(self.0.borrow().polls.iter().find(|p| p.id == id).cloned())
    }

    async fn query(&mut self, page: i64, size: i64) -> Result<Vec<Poll>, Error> {
        let mut polls = self.0.borrow().polls.clone();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls.into_iter().skip(page.saturating_mul(size) as usize).take(size as usize).collect())
    }

    async fn count(&mut self) -> Result<i64, Error> {
        Ok(self.0.borrow().polls.len() as i64)
    }

    async fn query_by_creator(&mut self, creator_id: i64, page: i64, size: i64) -> Result<Vec<Poll>, Error> {
        let mut polls: Vec<Poll> = self.0.borrow().polls.iter().filter(|p| p.created_by == creator_id).cloned().collect();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls.into_iter().skip(page.saturating_mul(size) as usize).take(size as usize).collect())
    }

    async fn count_by_creator(&mut self, creator_id: i64) -> Result<i64, Error> {
        Ok(self.0.borrow().polls.iter().filter(|p| p.created_by == creator_id).count() as i64)
    }

    async fn get_by_ids(&mut self, ids: Vec<i64>) -> Result<Vec<Poll>, Error> {
        let mut polls: Vec<Poll> = self.0.borrow().polls.iter().filter(|p| ids.contains(&p.id)).cloned().collect();
        polls.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(polls)
    }
}

impl ChoiceCommon for MemStore {
    async fn insert_many(&mut self, poll_id: i64, texts: Vec<String>) -> Result<(), Error> {
        let mut state = self.0.borrow_mut();
        for text in texts {
            let id = state.next_id();
            state.choices.push(Choice { id, text, poll_id });
        }
        Ok(())
    }

    async fn of_poll(&mut self, poll_id: i64) -> Result<Vec<Choice>, Error> {
        let mut choices: Vec<Choice> = self.0.borrow().choices.iter().filter(|c| c.poll_id == poll_id).cloned().collect();
        choices.sort_by_key(|c| c.id);
        Ok(choices)
    }

    async fn of_polls(&mut self, poll_ids: Vec<i64>) -> Result<Vec<Choice>, Error> {
        let mut choices: Vec<Choice> = self.0.borrow().choices.iter().filter(|c| poll_ids.contains(&c.poll_id)).cloned().collect();
        choices.sort_by_key(|c| c.id);
        Ok(choices)
    }
}

impl VoteCommon for MemStore {
    async fn insert(&mut self, vote: VoteInsert) -> Result<Option<i64>, Error> {
        let mut state = self.0.borrow_mut();
        if state.votes.iter().any(|v| v.poll_id == vote.poll_id && v.user_id == vote.user_id) {
            return Ok(None);
        }
        let id = state.next_id();
        state.votes.push(Vote {
            id,
            poll_id: vote.poll_id,
            choice_id: vote.choice_id,
            user_id: vote.user_id,
            created_at: Utc::now(),
        });
        Ok(Some(id))
    }

    async fn count_grouped_by_choice(&mut self, poll_ids: Vec<i64>) -> Result<Vec<ChoiceVoteCount>, Error> {
        let mut counts: HashMap<i64, i64> = HashMap::new();
        for vote in self.0.borrow().votes.iter().filter(|v| poll_ids.contains(&v.poll_id)) {
            *counts.entry(vote.choice_id).or_insert(0) += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(choice_id, vote_count)| ChoiceVoteCount { choice_id, vote_count })
            .collect())
    }

    async fn get_by_user_and_poll(&mut self, user_id: i64, poll_id: i64) -> Result<Option<Vote>, Error> {
        Ok(self
            .0
            .borrow()
            .votes
            .iter()
            .find(|v| v.user_id == user_id && v.poll_id == poll_id)
            .cloned())
    }

    async fn get_by_user_and_polls(&mut self, user_id: i64, poll_ids: Vec<i64>) -> Result<Vec<Vote>, Error> {
        Ok(self
            .0
            .borrow()
            .votes
            .iter()
            .filter(|v| v.user_id == user_id && poll_ids.contains(&v.poll_id))
            .cloned()
            .collect())
    }

    async fn voted_poll_ids(&mut self, user_id: i64, page: i64, size: i64) -> Result<Vec<i64>, Error> {
        let mut votes: Vec<Vote> = self.0.borrow().votes.iter().filter(|v| v.user_id == user_id).cloned().collect();
        votes.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(votes
            .into_iter()
            .map(|v| v.poll_id)
            .skip(page.saturating_mul(size) as usize)
            .take(size as usize)
            .collect())
    }

    async fn count_by_user(&mut self, user_id: i64) -> Result<i64, Error> {
        Ok(self.0.borrow().votes.iter().filter(|v| v.user_id == user_id).count() as i64)
    }
}

impl UserCommon for MemStore {
    async fn insert(&mut self, user: UserInsert) -> Result<i64, Error> {
        let mut state = self.0.borrow_mut();
        let id = state.next_id();
        state.users.push(User {
            id,
            username: user.username,
            email: user.email,
            name: user.name,
            password: user.password,
            salt: user.salt,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn get(&mut self, id: i64) -> Result<Option<User>, Error> {
        Ok(self.0.borrow().users.iter().find(|u| u.id == id).cloned())
    }

    async fn get_by_ids(&mut self, ids: Vec<i64>) -> Result<Vec<User>, Error> {
        Ok(self.0.borrow().users.iter().filter(|u| ids.contains(&u.id)).cloned().collect())
    }

    async fn get_by_username(&mut self, username: &str) -> Result<Option<User>, Error> {
        Ok(self.0.borrow().users.iter().find(|u| u.username == username).cloned())
    }

    async fn get_by_username_or_email(&mut self, identity: &str) -> Result<Option<User>, Error> {
        Ok(self
            .0
            .borrow()
            .users
            .iter()
            .find(|u| u.username == identity || u.email == identity)
            .cloned())
    }

    async fn username_exists(&mut self, username: &str) -> Result<bool, Error> {
        Ok(self.0.borrow().users.iter().any(|u| u.username == username))
    }

    async fn email_exists(&mut self, email: &str) -> Result<bool, Error> {
        Ok(self.0.borrow().users.iter().any(|u| u.email == email))
    }
}

impl Common for MemStore {}

impl Store for MemStore {}

impl TxStore for MemStore {
    async fn commit(self) -> Result<(), Error> {
        Ok(())
    }

    async fn rollback(self) -> Result<(), Error> {
        Ok(())
    }
}

pub(crate) fn seed_user(store: &MemStore, username: &str, name: &str) -> i64 {
    let mut state = store.0.borrow_mut();
    let id = state.next_id();
    state.users.push(User {
        id,
        username: username.to_owned(),
        email: format!("{}@example.com", username),
        name: name.to_owned(),
        password: "hashed".to_owned(),
        salt: "salt".to_owned(),
        created_at: Utc::now(),
    });
    id
}

pub(crate) fn seed_poll(
    store: &MemStore,
    created_by: i64,
    question: &str,
    choices: &[&str],
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> (i64, Vec<i64>) {
    let mut state = store.0.borrow_mut();
    let poll_id = state.next_id();
    state.polls.push(Poll {
        id: poll_id,
        question: question.to_owned(),
        created_by,
        created_at,
        expires_at,
    });
    let mut choice_ids = Vec::with_capacity(choices.len());
    for text in choices {
        let id = state.next_id();
        state.choices.push(Choice {
            id,
            text: (*text).to_owned(),
            poll_id,
        });
        choice_ids.push(id);
    }
    (poll_id, choice_ids)
}

pub(crate) fn seed_vote(store: &MemStore, user_id: i64, poll_id: i64, choice_id: i64) {
    let mut state = store.0.borrow_mut();
    let id = state.next_id();
    state.votes.push(Vote {
        id,
        poll_id,
        choice_id,
        user_id,
        created_at: Utc::now(),
    });
}

pub(crate) fn persisted_votes(store: &MemStore) -> usize {
    store.0.borrow().votes.len()
}
