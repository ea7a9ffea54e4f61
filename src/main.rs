mod context;
mod core;
mod database;
mod error;
mod handlers;
mod impls;
mod middlewares;
mod request;
mod response;

use actix_web::web::{get, post, resource, scope, Data};
use actix_web::HttpServer;
use database::sqlx::PgSqlxManager;
use middlewares::jwt::{Jwt, JWT_SECRET};
use sqlx::postgres::PgPoolOptions;

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    dotenv::dotenv().ok();
    std::env::set_var("RUST_LOG", "info");
    env_logger::init();
    let database_url = dotenv::var("DATABASE_URL").expect("environment variable DATABASE_URL not been set");
    let secret = dotenv::var(JWT_SECRET).expect("environment variable JWT_SECRET not been set");
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&database_url)
        .await
        .expect("failed to connect to database");
    HttpServer::new(move || {
        actix_web::App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(Jwt::new(secret.as_bytes().to_owned()))
            .app_data(Data::new(PgSqlxManager::new(pool.clone())))
            .service(
                scope("api")
                    .service(
                        scope("auth")
                            .service(resource("signin").route(post().to(handlers::signin)))
                            .service(resource("signup").route(post().to(handlers::signup))),
                    )
                    .service(
                        scope("polls")
                            .route("", get().to(handlers::poll::list))
                            .route("", post().to(handlers::poll::create))
                            .service(
                                scope("{poll_id}")
                                    .route("", get().to(handlers::poll::detail))
                                    .route("votes", post().to(handlers::poll::cast_vote)),
                            ),
                    )
                    .service(
                        scope("user")
                            .route("me", get().to(handlers::user::me))
                            .route("checkUsernameAvailability", get().to(handlers::user::check_username_availability))
                            .route("checkEmailAvailability", get().to(handlers::user::check_email_availability)),
                    )
                    .service(
                        scope("users").service(
                            scope("{username}")
                                .route("", get().to(handlers::user::profile))
                                .route("polls", get().to(handlers::user::created_polls))
                                .route("votes", get().to(handlers::user::voted_polls)),
                        ),
                    ),
            )
    })
    .bind(("0.0.0.0", 8000))?
    .run()
    .await
}
