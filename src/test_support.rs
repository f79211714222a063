use chrono::{DateTime, TimeZone, Utc};

use crate::id::RecordId;
use crate::models::{Comment, Image, Post, RhythmGameStats, User};

const EPOCH_SECONDS: u32 = 1_700_000_000;

/// An id created `seconds` after a fixed instant, so numbering follows
/// creation order.
pub(crate) fn id_at(seconds: u32, salt: u8) -> RecordId {
    let [a, b, c, d] = (EPOCH_SECONDS + seconds).to_be_bytes();
    RecordId::from_bytes([a, b, c, d, 0xde, 0xad, 0xbe, 0xef, 0, 0, 0, salt])
}

fn time_at(seconds: u32) -> DateTime<Utc> {
    Utc.timestamp_opt(i64::from(EPOCH_SECONDS + seconds), 0).unwrap()
}

/// The n-th post ever created.
pub(crate) fn numbered_post(n: u32) -> Post {
    Post {
        id: id_at(n, 0),
        title: format!("Post {n}"),
        content: format!("Content of post {n}"),
        user: Some(id_at(0, 1)),
        likes: vec![id_at(0, 2)],
        image: Image {
            url: format!("https://img.example.com/{n}.png"),
            public_id: format!("posts/{n}"),
        },
        comments: vec![Comment {
            id: id_at(n, 3),
            text: "nice".to_string(),
            user: Some(id_at(0, 2)),
            created_at: time_at(n),
        }],
        created_at: time_at(n),
        updated_at: time_at(n),
        version: 0,
    }
}

pub(crate) fn numbered_posts(count: u32) -> Vec<Post> {
    (1..=count).map(numbered_post).collect()
}

pub(crate) fn numbered_user(n: u32) -> User {
    User {
        id: id_at(n, 9),
        username: format!("user{n}"),
        email: format!("user{n}@example.com"),
        password: "$2b$10$hash".to_string(),
        rhythm_game: RhythmGameStats {
            peak_p_level: n as i32,
            difficulty: "hard".to_string(),
            last_played: Some(time_at(n)),
        },
    }
}
