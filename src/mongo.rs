//! MongoDB-backed collections.
//!
//! Documents are decoded into raw BSON-shaped records first and converted to
//! the API models afterwards, so BSON dates and object ids never leak into
//! the JSON the server emits.
use std::marker::PhantomData;
use std::time::Duration;

use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use log::{info, warn};
use mongodb::bson::{self, doc, oid::ObjectId};
use mongodb::{Client, Database};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use crate::error::StoreError;
use crate::id::RecordId;
use crate::models::{Comment, Image, Post, RhythmGameStats, User};
use crate::store::{bounded, Collection, Document, KeysetQuery};

/// Connects and pings the database so a bad URI fails at startup instead of
/// on the first request.
pub async fn connect(uri: &str, database: &str, timeout: Duration) -> Result<Database, StoreError> {
    let client = Client::with_uri_str(uri).await?;
    let database = client.database(database);
    bounded(timeout, async {
        database.run_command(doc! { "ping": 1 }).await?;
        Ok::<_, StoreError>(())
    })
    .await?;
    info!("Connected to database {}", database.name());
    Ok(database)
}

/// A model stored in a named MongoDB collection.
pub trait MongoDocument: Document {
    const COLLECTION: &'static str;
    type Raw: DeserializeOwned + TryInto<Self, Error = StoreError> + Unpin + Send + Sync + 'static;
}

pub struct MongoCollection<D: MongoDocument> {
    inner: mongodb::Collection<D::Raw>,
    _model: PhantomData<fn() -> D>,
}

impl<D: MongoDocument> MongoCollection<D> {
    pub fn new(database: &Database) -> Self {
        Self {
            inner: database.collection(D::COLLECTION),
            _model: PhantomData,
        }
    }
}

impl<D: MongoDocument> Clone for MongoCollection<D> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _model: PhantomData,
        }
    }
}

/// Filter, sort and limit of a keyset page query.
#[derive(Debug, PartialEq)]
struct KeysetFind {
    filter: bson::Document,
    sort: bson::Document,
    limit: i64,
}

impl From<KeysetQuery> for KeysetFind {
    fn from(query: KeysetQuery) -> Self {
        let filter = match query.before {
            // Object ids lead with their creation time: smaller is older.
            Some(before) => doc! { "_id": { "$lt": before.object_id() } },
            None => doc! {},
        };
        KeysetFind {
            filter,
            sort: doc! { "_id": -1 },
            limit: i64::from(query.limit),
        }
    }
}

fn convert_all<D: MongoDocument>(raws: Vec<D::Raw>) -> Result<Vec<D>, StoreError> {
    raws.into_iter().map(TryInto::try_into).collect()
}

impl<D: MongoDocument> Collection<D> for MongoCollection<D> {
    async fn find_by_id(&self, id: RecordId) -> Result<Option<D>, StoreError> {
        let raw = self.inner.find_one(doc! { "_id": id.object_id() }).await?;
        raw.map(TryInto::try_into).transpose()
    }

    async fn find_before(&self, query: KeysetQuery) -> Result<Vec<D>, StoreError> {
        let find = KeysetFind::from(query);
        let cursor = self
            .inner
            .find(find.filter)
            .sort(find.sort)
            .limit(find.limit)
            .await?;
        convert_all(cursor.try_collect().await?)
    }

    async fn find_all(&self) -> Result<Vec<D>, StoreError> {
        let cursor = self.inner.find(doc! {}).await?;
        convert_all(cursor.try_collect().await?)
    }
}

fn to_chrono(value: bson::DateTime) -> Result<DateTime<Utc>, StoreError> {
    let millis = value.timestamp_millis();
    DateTime::<Utc>::from_timestamp_millis(millis).ok_or_else(|| {
        warn!("Stored date {millis}ms is out of range");
        StoreError::Decode(format!("date {millis}ms is out of range"))
    })
}

#[derive(Debug, Deserialize)]
pub struct PostRecord {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    content: String,
    user: Option<ObjectId>,
    #[serde(default)]
    likes: Vec<ObjectId>,
    #[serde(default)]
    image: ImageRecord,
    #[serde(default)]
    comments: Vec<CommentRecord>,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
    #[serde(rename = "updatedAt")]
    updated_at: bson::DateTime,
    #[serde(rename = "__v", default)]
    version: i32,
}

#[derive(Debug, Default, Deserialize)]
struct ImageRecord {
    #[serde(default)]
    url: String,
    #[serde(default)]
    public_id: String,
}

#[derive(Debug, Deserialize)]
struct CommentRecord {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    text: String,
    user: Option<ObjectId>,
    #[serde(rename = "createdAt")]
    created_at: bson::DateTime,
}

impl TryFrom<PostRecord> for Post {
    type Error = StoreError;

    fn try_from(raw: PostRecord) -> Result<Self, Self::Error> {
        let comments = raw
            .comments
            .into_iter()
            .map(|c| {
                Ok(Comment {
                    id: c.id.into(),
                    text: c.text,
                    user: c.user.map(RecordId::from),
                    created_at: to_chrono(c.created_at)?,
                })
            })
            .collect::<Result<_, StoreError>>()?;

        Ok(Post {
            id: raw.id.into(),
            title: raw.title,
            content: raw.content,
            user: raw.user.map(RecordId::from),
            likes: raw.likes.into_iter().map(RecordId::from).collect(),
            image: Image {
                url: raw.image.url,
                public_id: raw.image.public_id,
            },
            comments,
            created_at: to_chrono(raw.created_at)?,
            updated_at: to_chrono(raw.updated_at)?,
            version: raw.version,
        })
    }
}

impl MongoDocument for Post {
    const COLLECTION: &'static str = "posts";
    type Raw = PostRecord;
}

#[derive(Debug, Deserialize)]
pub struct UserRecord {
    #[serde(rename = "_id")]
    id: ObjectId,
    #[serde(default)]
    username: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(rename = "rhythmGame", default)]
    rhythm_game: RhythmGameRecord,
}

#[derive(Debug, Default, Deserialize)]
struct RhythmGameRecord {
    #[serde(rename = "peakPLevel", default)]
    peak_p_level: i32,
    #[serde(default)]
    difficulty: String,
    #[serde(rename = "lastPlayed")]
    last_played: Option<bson::DateTime>,
}

impl TryFrom<UserRecord> for User {
    type Error = StoreError;

    fn try_from(raw: UserRecord) -> Result<Self, Self::Error> {
        Ok(User {
            id: raw.id.into(),
            username: raw.username,
            email: raw.email,
            password: raw.password,
            rhythm_game: RhythmGameStats {
                peak_p_level: raw.rhythm_game.peak_p_level,
                difficulty: raw.rhythm_game.difficulty,
                last_played: raw.rhythm_game.last_played.map(to_chrono).transpose()?,
            },
        })
    }
}

impl MongoDocument for User {
    const COLLECTION: &'static str = "users";
    type Raw = UserRecord;
}
