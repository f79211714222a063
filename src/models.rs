use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::RecordId;
use crate::store::Document;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: RecordId,
    pub title: String,
    pub content: String,
    pub user: Option<RecordId>,
    pub likes: Vec<RecordId>,
    pub image: Image,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(rename = "v")]
    pub version: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: RecordId,
    pub text: String,
    pub user: Option<RecordId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub url: String,
    pub public_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: RecordId,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub rhythm_game: RhythmGameStats,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RhythmGameStats {
    pub peak_p_level: i32,
    pub difficulty: String,
    pub last_played: Option<DateTime<Utc>>,
}

impl Document for Post {
    fn id(&self) -> RecordId {
        self.id
    }
}

impl Document for User {
    fn id(&self) -> RecordId {
        self.id
    }
}

/// A single slice of an infinite scroll, newest first.
///
/// `next_cursor` is the id of the last item (empty when there are none) and
/// is echoed back by the client to fetch the following slice.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    #[serde(rename = "data")]
    pub items: Vec<T>,
    #[serde(rename = "next_id")]
    pub next_cursor: String,
    pub has_more: bool,
}

#[derive(Serialize)]
pub(crate) struct Health {
    pub(crate) status: &'static str,
}

#[derive(Serialize)]
pub(crate) struct ErrorBody {
    pub(crate) error: String,
}
