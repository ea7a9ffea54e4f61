use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use itertools::Itertools;

use crate::core::models::common::MAX_PAGE_SIZE;
use crate::core::models::{
    poll::{Choice, Poll, PollInsert},
    user::User,
    vote::VoteInsert,
};
use crate::core::ports::repository::{ChoiceCommon, PollCommon, Store, TxStore, UserCommon, VoteCommon};
use crate::error::Error;
use crate::request::PollCreation;
use crate::response::{ChoiceView, Page, PollView, UserSummary};

const MAX_QUESTION_LEN: usize = 140;
const MIN_CHOICES: usize = 2;
const MAX_CHOICES: usize = 6;

fn validate_page_params(page: i64, size: i64) -> Result<(), Error> {
    if page < 0 {
        return Err(Error::InvalidRequest("page number cannot be less than zero".into()));
    }
    if size < 1 {
        return Err(Error::InvalidRequest("page size must be greater than zero".into()));
    }
    if size > MAX_PAGE_SIZE {
        return Err(Error::InvalidRequest(format!("page size must not be greater than {}", MAX_PAGE_SIZE)));
    }
    Ok(())
}

fn missing_creator(user_id: i64, poll_id: i64) -> Error {
    Error::ReferenceNotFound(format!("user {} referenced by poll {} does not exist", user_id, poll_id))
}

// grouped count over the whole poll set; choices nobody voted for are simply absent
async fn choice_vote_counts<D>(db: &mut D, poll_ids: Vec<i64>) -> Result<HashMap<i64, i64>, Error>
where
    D: Store,
{
    let counts = VoteCommon::count_grouped_by_choice(db, poll_ids).await?;
    Ok(counts.into_iter().map(|c| (c.choice_id, c.vote_count)).collect())
}

// poll id -> choice the viewer picked there; anonymous viewers resolve to no selections
async fn viewer_selections<D>(db: &mut D, viewer: Option<i64>, poll_ids: Vec<i64>) -> Result<HashMap<i64, i64>, Error>
where
    D: Store,
{
    let viewer_id = match viewer {
        Some(id) => id,
        None => return Ok(HashMap::new()),
    };
    let votes = VoteCommon::get_by_user_and_polls(db, viewer_id, poll_ids).await?;
    Ok(votes.into_iter().map(|v| (v.poll_id, v.choice_id)).collect())
}

async fn poll_creators<D>(db: &mut D, polls: &[Poll]) -> Result<HashMap<i64, User>, Error>
where
    D: Store,
{
    let creator_ids: Vec<i64> = polls.iter().map(|p| p.created_by).unique().collect();
    let users = UserCommon::get_by_ids(db, creator_ids).await?;
    let creators: HashMap<i64, User> = users.into_iter().map(|u| (u.id, u)).collect();
    for poll in polls {
        if !creators.contains_key(&poll.created_by) {
            return Err(missing_creator(poll.created_by, poll.id));
        }
    }
    Ok(creators)
}

async fn choices_by_poll<D>(db: &mut D, poll_ids: Vec<i64>) -> Result<HashMap<i64, Vec<Choice>>, Error>
where
    D: Store,
{
    let choices = ChoiceCommon::of_polls(db, poll_ids).await?;
    Ok(choices.into_iter().map(|c| (c.poll_id, c)).into_group_map())
}

// the single place vote totals are computed
fn assemble(poll: &Poll, choices: &[Choice], tally: &HashMap<i64, i64>, creator: &User, selected: Option<i64>, now: DateTime<Utc>) -> PollView {
    let choices: Vec<ChoiceView> = choices
        .iter()
        .map(|c| ChoiceView {
            id: c.id,
            text: c.text.clone(),
            vote_count: tally.get(&c.id).copied().unwrap_or(0),
        })
        .collect();
    let total_votes = choices.iter().map(|c| c.vote_count).sum();
    PollView {
        id: poll.id,
        question: poll.question.clone(),
        choices,
        created_by: UserSummary {
            id: creator.id,
            username: creator.username.clone(),
            name: creator.name.clone(),
        },
        creation_time: poll.created_at,
        expiration_time: poll.expires_at,
        is_expired: poll.expires_at <= now,
        selected_choice: selected,
        total_votes,
    }
}

async fn assemble_page<D>(db: &mut D, polls: Vec<Poll>, viewer: Option<i64>, page: i64, size: i64, total: i64) -> Result<Page<PollView>, Error>
where
    D: Store,
{
    if polls.is_empty() {
        return Ok(Page::new(vec![], page, size, total));
    }
    let poll_ids: Vec<i64> = polls.iter().map(|p| p.id).collect();
    let tally = choice_vote_counts(db, poll_ids.clone()).await?;
    let selections = viewer_selections(db, viewer, poll_ids.clone()).await?;
    let creators = poll_creators(db, &polls).await?;
    let mut choices = choices_by_poll(db, poll_ids).await?;
    let now = Utc::now();
    let mut views = Vec::with_capacity(polls.len());
    for poll in &polls {
        let creator = creators.get(&poll.created_by).ok_or_else(|| missing_creator(poll.created_by, poll.id))?;
        let poll_choices = choices.remove(&poll.id).unwrap_or_default();
        views.push(assemble(poll, &poll_choices, &tally, creator, selections.get(&poll.id).copied(), now));
    }
    Ok(Page::new(views, page, size, total))
}

pub async fn list_polls<D>(db: &mut D, viewer: Option<i64>, page: i64, size: i64) -> Result<Page<PollView>, Error>
where
    D: Store,
{
    validate_page_params(page, size)?;
    let total = PollCommon::count(db).await?;
    let polls = PollCommon::query(db, page, size).await?;
    assemble_page(db, polls, viewer, page, size, total).await
}

pub async fn polls_created_by<D>(db: &mut D, username: &str, viewer: Option<i64>, page: i64, size: i64) -> Result<Page<PollView>, Error>
where
    D: Store,
{
    validate_page_params(page, size)?;
    let user = UserCommon::get_by_username(db, username)
        .await?
        .ok_or_else(|| Error::not_found("User", "username", username))?;
    let total = PollCommon::count_by_creator(db, user.id).await?;
    let polls = PollCommon::query_by_creator(db, user.id, page, size).await?;
    assemble_page(db, polls, viewer, page, size, total).await
}

pub async fn polls_voted_by<D>(db: &mut D, username: &str, viewer: Option<i64>, page: i64, size: i64) -> Result<Page<PollView>, Error>
where
    D: Store,
{
    validate_page_params(page, size)?;
    let user = UserCommon::get_by_username(db, username)
        .await?
        .ok_or_else(|| Error::not_found("User", "username", username))?;
    let total = VoteCommon::count_by_user(db, user.id).await?;
    let poll_ids = VoteCommon::voted_poll_ids(db, user.id, page, size).await?;
    let polls = PollCommon::get_by_ids(db, poll_ids).await?;
    assemble_page(db, polls, viewer, page, size, total).await
}

pub async fn poll_detail<D>(db: &mut D, viewer: Option<i64>, poll_id: i64) -> Result<PollView, Error>
where
    D: Store,
{
    let poll = PollCommon::get(db, poll_id)
        .await?
        .ok_or_else(|| Error::not_found("Poll", "id", poll_id))?;
    let choices = ChoiceCommon::of_poll(db, poll_id).await?;
    let tally = choice_vote_counts(db, vec![poll_id]).await?;
    let creator = UserCommon::get(db, poll.created_by)
        .await?
        .ok_or_else(|| missing_creator(poll.created_by, poll.id))?;
    let selected = match viewer {
        Some(uid) => VoteCommon::get_by_user_and_poll(db, uid, poll_id).await?.map(|v| v.choice_id),
        None => None,
    };
    Ok(assemble(&poll, &choices, &tally, &creator, selected, Utc::now()))
}

pub async fn create_poll<T>(mut db: T, creator_id: i64, poll: PollCreation) -> Result<i64, Error>
where
    T: TxStore,
{
    if poll.question.trim().is_empty() {
        return Err(Error::InvalidRequest("question must not be blank".into()));
    }
    if poll.question.chars().count() > MAX_QUESTION_LEN {
        return Err(Error::InvalidRequest(format!("question must not exceed {} characters", MAX_QUESTION_LEN)));
    }
    if poll.choices.len() < MIN_CHOICES || poll.choices.len() > MAX_CHOICES {
        return Err(Error::InvalidRequest(format!("a poll must have between {} and {} choices", MIN_CHOICES, MAX_CHOICES)));
    }
    if poll.choices.iter().any(|c| c.text.trim().is_empty()) {
        return Err(Error::InvalidRequest("choice text must not be blank".into()));
    }
    if poll.poll_length.days < 0 || poll.poll_length.hours < 0 {
        return Err(Error::InvalidRequest("poll length must not be negative".into()));
    }
    let created_at = Utc::now();
    let expires_at = Duration::try_days(poll.poll_length.days)
        .zip(Duration::try_hours(poll.poll_length.hours))
        .and_then(|(days, hours)| days.checked_add(&hours))
        .and_then(|length| created_at.checked_add_signed(length))
        .ok_or_else(|| Error::InvalidRequest("poll length is out of range".into()))?;
    let poll_id = PollCommon::insert(
        &mut db,
        PollInsert {
            question: poll.question,
            created_by: creator_id,
            created_at,
            expires_at,
        },
    )
    .await?;
    ChoiceCommon::insert_many(&mut db, poll_id, poll.choices.into_iter().map(|c| c.text).collect()).await?;
    db.commit().await?;
    Ok(poll_id)
}

pub async fn cast_vote<D>(db: &mut D, voter: i64, poll_id: i64, choice_id: i64) -> Result<PollView, Error>
where
    D: Store,
{
    let poll = PollCommon::get(db, poll_id)
        .await?
        .ok_or_else(|| Error::not_found("Poll", "id", poll_id))?;
    if poll.expires_at <= Utc::now() {
        return Err(Error::Expired);
    }
    let choices = ChoiceCommon::of_poll(db, poll_id).await?;
    if !choices.iter().any(|c| c.id == choice_id) {
        return Err(Error::not_found("Choice", "id", choice_id));
    }
    let inserted = VoteCommon::insert(
        db,
        VoteInsert {
            poll_id,
            choice_id,
            user_id: voter,
        },
    )
    .await?;
    if inserted.is_none() {
        return Err(Error::DuplicateVote);
    }
    let tally = choice_vote_counts(db, vec![poll_id]).await?;
    let creator = UserCommon::get(db, poll.created_by)
        .await?
        .ok_or_else(|| missing_creator(poll.created_by, poll.id))?;
    Ok(assemble(&poll, &choices, &tally, &creator, Some(choice_id), Utc::now()))
}
