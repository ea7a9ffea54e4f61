use std::future::{ready, Future, Ready};
use std::pin::Pin;
use std::task::{Context, Poll};

use actix_web::{
    dev::{Service, ServiceRequest, Transform},
    error::ErrorUnauthorized,
    Error, HttpMessage,
};
use serde::{Deserialize, Serialize};

use crate::context::UserInfo;
use crate::core::ports::tokener::{Payload, Tokener};
use crate::impls::tokener::jwt::JWT;

pub static JWT_SECRET: &str = "JWT_SECRET";

#[derive(Debug, Deserialize, Serialize)]
pub struct Claim {
    pub user: String,
    pub exp: i64,
}

impl Payload for Claim {
    fn user(&self) -> &str {
        &self.user
    }
}

pub struct Jwt {
    secret: Vec<u8>,
}

impl Jwt {
    pub fn new(secret: Vec<u8>) -> Self {
        Self { secret }
    }
}

impl<S> Transform<S, ServiceRequest> for Jwt
where
    S: Service<ServiceRequest, Error = Error> + 'static,
    S::Future: 'static,
{
    type Response = S::Response;
    type Error = Error;
    type Transform = JwtService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtService {
            tokener: JWT::new(self.secret.clone()),
            next_service: service,
        }))
    }
}

pub struct JwtService<S> {
    tokener: JWT,
    next_service: S,
}

impl<S> Service<ServiceRequest> for JwtService<S>
where
    S: Service<ServiceRequest, Error = Error>,
    S::Future: 'static,
{
    type Response = S::Response;
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    fn poll_ready(&self, ctx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.next_service.poll_ready(ctx)
    }

    // requests without credentials pass through as anonymous; bad credentials are rejected
    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(header) = req.headers().get("Authorization").cloned() {
            match header.to_str() {
                Err(e) => return Box::pin(async move { Err(ErrorUnauthorized(e)) }),
                Ok(value) => {
                    let token = value.strip_prefix("Bearer ").unwrap_or(value);
                    match <JWT as Tokener<Claim>>::verify_token(&self.tokener, token) {
                        Err(e) => return Box::pin(async move { Err(ErrorUnauthorized(e)) }),
                        Ok(claim) => match claim.user().parse::<i64>() {
                            Err(e) => return Box::pin(async move { Err(ErrorUnauthorized(e)) }),
                            Ok(id) => {
                                req.extensions_mut().insert(UserInfo { id });
                            }
                        },
                    }
                }
            }
        }
        Box::pin(self.next_service.call(req))
    }
}
