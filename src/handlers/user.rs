use actix_web::web::{Data, Json, Path, Query};
use serde::Deserialize;

use crate::context::{MaybeUser, UserInfo};
use crate::core::services::{poll, user};
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::request::Pagination;
use crate::response::{Page, PollView, UserIdentityAvailability, UserProfile, UserSummary};

pub async fn me(user_info: UserInfo, db: Data<PgSqlxManager>) -> Result<Json<UserSummary>, Error> {
    let mut store = db.acquire().await?;
    let summary = user::current_user(&mut store, user_info.id).await?;
    Ok(Json(summary))
}

pub async fn profile(path: Path<(String,)>, db: Data<PgSqlxManager>) -> Result<Json<UserProfile>, Error> {
    let (username,) = path.into_inner();
    let mut store = db.acquire().await?;
    let profile = user::profile(&mut store, &username).await?;
    Ok(Json(profile))
}

pub async fn created_polls(
    viewer: MaybeUser,
    path: Path<(String,)>,
    Query(Pagination { page, size }): Query<Pagination>,
    db: Data<PgSqlxManager>,
) -> Result<Json<Page<PollView>>, Error> {
    let (username,) = path.into_inner();
    let mut store = db.acquire().await?;
    let polls = poll::polls_created_by(&mut store, &username, viewer.id(), page, size).await?;
    Ok(Json(polls))
}

pub async fn voted_polls(
    viewer: MaybeUser,
    path: Path<(String,)>,
    Query(Pagination { page, size }): Query<Pagination>,
    db: Data<PgSqlxManager>,
) -> Result<Json<Page<PollView>>, Error> {
    let (username,) = path.into_inner();
    let mut store = db.acquire().await?;
    let polls = poll::polls_voted_by(&mut store, &username, viewer.id(), page, size).await?;
    Ok(Json(polls))
}

#[derive(Debug, Deserialize)]
pub struct UsernameCheck {
    username: String,
}

pub async fn check_username_availability(Query(UsernameCheck { username }): Query<UsernameCheck>, db: Data<PgSqlxManager>) -> Result<Json<UserIdentityAvailability>, Error> {
    let mut store = db.acquire().await?;
    let available = user::username_available(&mut store, &username).await?;
    Ok(Json(UserIdentityAvailability { available }))
}

#[derive(Debug, Deserialize)]
pub struct EmailCheck {
    email: String,
}

pub async fn check_email_availability(Query(EmailCheck { email }): Query<EmailCheck>, db: Data<PgSqlxManager>) -> Result<Json<UserIdentityAvailability>, Error> {
    let mut store = db.acquire().await?;
    let available = user::email_available(&mut store, &email).await?;
    Ok(Json(UserIdentityAvailability { available }))
}
