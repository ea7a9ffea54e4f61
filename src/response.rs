use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse {
    pub success: bool,
    pub message: String,
}

impl ApiResponse {
    pub fn success(message: impl Into<String>) -> Self {
        ApiResponse {
            success: true,
            message: message.into(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        ApiResponse {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JwtAuthentication {
    pub access_token: String,
    pub token_type: String,
}

impl JwtAuthentication {
    pub fn bearer(access_token: String) -> Self {
        JwtAuthentication {
            access_token,
            token_type: "Bearer".to_owned(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct UserSummary {
    pub id: i64,
    pub username: String,
    pub name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub name: String,
    pub joined_at: DateTime<Utc>,
    pub poll_count: i64,
    pub vote_count: i64,
}

#[derive(Debug, Serialize)]
pub struct UserIdentityAvailability {
    pub available: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceView {
    pub id: i64,
    pub text: String,
    pub vote_count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollView {
    pub id: i64,
    pub question: String,
    pub choices: Vec<ChoiceView>,
    pub created_by: UserSummary,
    pub creation_time: DateTime<Utc>,
    pub expiration_time: DateTime<Utc>,
    pub is_expired: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selected_choice: Option<i64>,
    pub total_votes: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub last: bool,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, page: i64, size: i64, total_elements: i64) -> Self {
        let total_pages = if size > 0 {
            (total_elements + size - 1) / size
        } else {
            0
        };
        let last = total_elements == 0 || page == total_pages - 1;
        Page {
            content,
            page,
            size,
            total_elements,
            total_pages,
            last,
        }
    }
}
