use crate::core::ports::repository::{PollCommon, Store, UserCommon, VoteCommon};
use crate::error::Error;
use crate::response::{UserProfile, UserSummary};

pub async fn current_user<D>(db: &mut D, user_id: i64) -> Result<UserSummary, Error>
where
    D: Store,
{
    let user = UserCommon::get(db, user_id)
        .await?
        .ok_or_else(|| Error::not_found("User", "id", user_id))?;
    Ok(UserSummary {
        id: user.id,
        username: user.username,
        name: user.name,
    })
}

pub async fn profile<D>(db: &mut D, username: &str) -> Result<UserProfile, Error>
where
    D: Store,
{
    let user = UserCommon::get_by_username(db, username)
        .await?
        .ok_or_else(|| Error::not_found("User", "username", username))?;
    let poll_count = PollCommon::count_by_creator(db, user.id).await?;
    let vote_count = VoteCommon::count_by_user(db, user.id).await?;
    Ok(UserProfile {
        id: user.id,
        username: user.username,
        name: user.name,
        joined_at: user.created_at,
        poll_count,
        vote_count,
    })
}

pub async fn username_available<D>(db: &mut D, username: &str) -> Result<bool, Error>
where
    D: Store,
{
    Ok(!UserCommon::username_exists(db, username).await?)
}

pub async fn email_available<D>(db: &mut D, email: &str) -> Result<bool, Error>
where
    D: Store,
{
    Ok(!UserCommon::email_exists(db, email).await?)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::core::services::testing::{seed_poll, seed_user, seed_vote, MemStore};
    use chrono::{Duration, Utc};

    #[tokio::test]
    async fn profile_counts_polls_and_votes() {
        let mut store = MemStore::default();
        let now = Utc::now();
        let alice = seed_user(&store, "alice", "Alice");
        let bob = seed_user(&store, "bob", "Bob");
        let (first, first_choices) = seed_poll(&store, alice, "First?", &["A", "B"], now - Duration::minutes(2), now + Duration::days(1));
        let (second, second_choices) = seed_poll(&store, alice, "Second?", &["C", "D"], now - Duration::minutes(1), now + Duration::days(1));
        seed_vote(&store, alice, first, first_choices[0]);
        seed_vote(&store, bob, first, first_choices[1]);
        seed_vote(&store, bob, second, second_choices[0]);
        let alice_profile = profile(&mut store, "alice").await.unwrap();
        assert_eq!(alice_profile.username, "alice");
        assert_eq!(alice_profile.poll_count, 2);
        assert_eq!(alice_profile.vote_count, 1);
        let bob_profile = profile(&mut store, "bob").await.unwrap();
        assert_eq!(bob_profile.poll_count, 0);
        assert_eq!(bob_profile.vote_count, 2);
    }

    #[tokio::test]
    async fn profile_of_unknown_user_is_rejected() {
        let mut store = MemStore::default();
        let res = profile(&mut store, "ghost").await;
        assert!(matches!(res, Err(Error::NotFound { .. })));
    }

    #[tokio::test]
    async fn availability_checks_reflect_existing_identities() {
        let mut store = MemStore::default();
        seed_user(&store, "alice", "Alice");
        assert!(!username_available(&mut store, "alice").await.unwrap());
        assert!(username_available(&mut store, "bob").await.unwrap());
        assert!(!email_available(&mut store, "alice@example.com").await.unwrap());
        assert!(email_available(&mut store, "bob@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn current_user_summarizes_identity() {
        let mut store = MemStore::default();
        let alice = seed_user(&store, "alice", "Alice");
        let summary = current_user(&mut store, alice).await.unwrap();
        assert_eq!(summary.id, alice);
        assert_eq!(summary.username, "alice");
        assert_eq!(summary.name, "Alice");
        let res = current_user(&mut store, 999).await;
        assert!(matches!(res, Err(Error::NotFound { .. })));
    }
}
