use actix_web::{
    http::StatusCode,
    web::{Data, Json, Path, Query},
    HttpResponse,
};

use crate::context::{MaybeUser, UserInfo};
use crate::core::services::poll;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::request::{Pagination, PollCreation, VoteCast};
use crate::response::{ApiResponse, Page, PollView};

pub async fn list(viewer: MaybeUser, Query(Pagination { page, size }): Query<Pagination>, db: Data<PgSqlxManager>) -> Result<Json<Page<PollView>>, Error> {
    let mut store = db.acquire().await?;
    let polls = poll::list_polls(&mut store, viewer.id(), page, size).await?;
    Ok(Json(polls))
}

pub async fn create(user_info: UserInfo, Json(data): Json<PollCreation>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let tx = db.begin().await?;
    let id = poll::create_poll(tx, user_info.id, data).await?;
    Ok(HttpResponse::build(StatusCode::CREATED)
        .insert_header(("Location", format!("/api/polls/{}", id)))
        .json(ApiResponse::success("poll created successfully")))
}

pub async fn detail(viewer: MaybeUser, path: Path<(i64,)>, db: Data<PgSqlxManager>) -> Result<Json<PollView>, Error> {
    let (poll_id,) = path.into_inner();
    let mut store = db.acquire().await?;
    let view = poll::poll_detail(&mut store, viewer.id(), poll_id).await?;
    Ok(Json(view))
}

pub async fn cast_vote(
    user_info: UserInfo,
    path: Path<(i64,)>,
    Json(VoteCast { choice_id }): Json<VoteCast>,
    db: Data<PgSqlxManager>,
) -> Result<Json<PollView>, Error> {
    let (poll_id,) = path.into_inner();
    let mut store = db.acquire().await?;
    let view = poll::cast_vote(&mut store, user_info.id, poll_id, choice_id).await?;
    Ok(Json(view))
}
