pub mod auth;
pub mod poll;
pub mod user;

#[cfg(test)]
pub(crate) mod testing;
