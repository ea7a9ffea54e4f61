pub mod common;
pub mod poll;
pub mod user;
pub mod vote;
