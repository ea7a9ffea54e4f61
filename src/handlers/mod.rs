pub mod poll;
pub mod user;

use actix_web::{
    http::StatusCode,
    web::{Data, Json},
    HttpResponse,
};
use chrono::{Duration, Utc};

use crate::core::ports::tokener::Tokener;
use crate::core::services::auth;
use crate::database::sqlx::PgSqlxManager;
use crate::error::Error;
use crate::impls::tokener::jwt::JWT;
use crate::middlewares::jwt::{Claim, JWT_SECRET};
use crate::request::{Signin, Signup};
use crate::response::{ApiResponse, JwtAuthentication};

const TOKEN_TTL_DAYS: i64 = 7;

pub async fn signin(
    Json(Signin {
        username_or_email,
        password,
    }): Json<Signin>,
    db: Data<PgSqlxManager>,
) -> Result<Json<JwtAuthentication>, Error> {
    let mut store = db.acquire().await?;
    let user = auth::authenticate(&mut store, &username_or_email, &password).await?;
    let claim = Claim {
        user: user.id.to_string(),
        exp: (Utc::now() + Duration::days(TOKEN_TTL_DAYS)).timestamp(),
    };
    let secret = dotenv::var(JWT_SECRET)?;
    let tokener = JWT::new(secret.as_bytes().to_owned());
    let token = tokener.gen_token(&claim)?;
    Ok(Json(JwtAuthentication::bearer(token)))
}

pub async fn signup(Json(signup): Json<Signup>, db: Data<PgSqlxManager>) -> Result<HttpResponse, Error> {
    let mut store = db.acquire().await?;
    auth::register(&mut store, signup).await?;
    Ok(HttpResponse::build(StatusCode::CREATED).json(ApiResponse::success("user registered successfully")))
}
