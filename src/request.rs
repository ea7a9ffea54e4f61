use serde::Deserialize;

use crate::core::models::common::{DEFAULT_PAGE, DEFAULT_PAGE_SIZE};

fn default_page() -> i64 {
    DEFAULT_PAGE
}

fn default_size() -> i64 {
    DEFAULT_PAGE_SIZE
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    #[serde(default = "default_page")]
    pub page: i64,
    #[serde(default = "default_size")]
    pub size: i64,
}

#[derive(Debug, Deserialize)]
pub struct ChoiceCreation {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct PollLength {
    pub days: i64,
    pub hours: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollCreation {
    pub question: String,
    pub choices: Vec<ChoiceCreation>,
    pub poll_length: PollLength,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCast {
    pub choice_id: i64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Signin {
    pub username_or_email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct Signup {
    pub name: String,
    pub username: String,
    pub email: String,
    pub password: String,
}
