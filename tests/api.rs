use std::time::Duration;

use chrono::{TimeZone, Utc};
use scrollfeed::{
    routes, Api, Collection, Image, KeysetQuery, MemoryCollection, Post, RecordId,
    RhythmGameStats, StoreError, User,
};
use serde_json::Value;
use warp::http::StatusCode;

fn id(seconds: u32, salt: u8) -> RecordId {
    let [a, b, c, d] = (1_700_000_000 + seconds).to_be_bytes();
    RecordId::from_bytes([a, b, c, d, 1, 2, 3, 4, 5, 0, 0, salt])
}

fn post(n: u32) -> Post {
    let at = Utc.timestamp_opt(1_700_000_000 + i64::from(n), 0).unwrap();
    Post {
        id: id(n, 0),
        title: format!("Post {n}"),
        content: "body".to_string(),
        user: Some(id(0, 7)),
        likes: Vec::new(),
        image: Image::default(),
        comments: Vec::new(),
        created_at: at,
        updated_at: at,
        version: 0,
    }
}

fn user(n: u32) -> User {
    User {
        id: id(n, 9),
        username: format!("user{n}"),
        email: format!("user{n}@example.com"),
        password: "secret".to_string(),
        rhythm_game: RhythmGameStats::default(),
    }
}

fn api(posts: u32, users: u32) -> Api<MemoryCollection<User>, MemoryCollection<Post>> {
    Api::new(
        MemoryCollection::from_records((1..=users).map(user)),
        MemoryCollection::from_records((1..=posts).map(post)),
        Duration::from_secs(10),
    )
}

async fn get<U, P>(api: Api<U, P>, path: &str) -> (StatusCode, Value)
where
    U: Collection<User>,
    P: Collection<Post>,
{
    let response = warp::test::request()
        .method("GET")
        .path(path)
        .reply(&routes(api))
        .await;
    let body = serde_json::from_slice(response.body()).unwrap_or(Value::Null);
    (response.status(), body)
}

fn titles(body: &Value) -> Vec<String> {
    body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["title"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn health() {
    let (status, body) = get(api(0, 0), "/v1/health").await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["status"].is_string());
}

#[tokio::test]
async fn posts_scroll_through_pages() {
    let api = api(25, 0);

    let (status, first) = get(api.clone(), "/v1/posts?limit=10").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&first).first().unwrap(), "Post 25");
    assert_eq!(titles(&first).last().unwrap(), "Post 16");
    assert_eq!(first["next_id"], post(16).id.encode());
    assert_eq!(first["has_more"], true);

    let path = format!("/v1/posts?limit=10&last_id={}", first["next_id"].as_str().unwrap());
    let (_, second) = get(api.clone(), &path).await;
    assert_eq!(titles(&second).first().unwrap(), "Post 15");
    assert_eq!(second["next_id"], post(6).id.encode());

    let path = format!("/v1/posts?limit=10&last_id={}", second["next_id"].as_str().unwrap());
    let (_, third) = get(api, &path).await;
    assert_eq!(titles(&third).len(), 5);
    assert_eq!(third["next_id"], post(1).id.encode());
    assert_eq!(third["has_more"], false);
}

#[tokio::test]
async fn posts_default_to_ten_newest() {
    let (status, body) = get(api(12, 0), "/v1/posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&body).len(), 10);
    assert_eq!(body["has_more"], true);

    let (_, body) = get(api(12, 0), "/v1/posts?limit=abc&last_id=").await;
    assert_eq!(titles(&body).len(), 10);
}

#[tokio::test]
async fn large_limits_are_served_in_full() {
    let api = api(300, 0);

    let (status, first) = get(api.clone(), "/v1/posts?limit=150").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(titles(&first).len(), 150);
    assert_eq!(first["has_more"], true);
    assert_eq!(first["next_id"], post(151).id.encode());

    let path = format!("/v1/posts?limit=150&last_id={}", first["next_id"].as_str().unwrap());
    let (_, second) = get(api.clone(), &path).await;
    assert_eq!(titles(&second).len(), 150);
    assert_eq!(titles(&second).last().unwrap(), "Post 1");

    let (_, everything) = get(api, "/v1/posts?limit=99999999999999999999").await;
    assert_eq!(titles(&everything).len(), 300);
    assert_eq!(everything["has_more"], false);
}

#[tokio::test]
async fn empty_feed() {
    let (status, body) = get(api(0, 0), "/v1/posts").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!({"data": [], "next_id": "", "has_more": false}));
}

#[tokio::test]
async fn malformed_cursor_is_bad_request() {
    let (status, body) = get(api(5, 0), "/v1/posts?last_id=P16").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("cursor"));
}

#[tokio::test]
async fn post_lookup() {
    let wanted = post(3);
    let (status, body) = get(api(5, 0), &format!("/v1/post/{}", wanted.id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], wanted.id.encode());
    assert_eq!(body["createdAt"], "2023-11-14T22:13:23Z");

    let (status, _) = get(api(5, 0), &format!("/v1/post/{}", post(6).id)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = get(api(5, 0), "/v1/post/123").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn users_listing_and_lookup() {
    let (status, body) = get(api(0, 3), "/v1/users").await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 3);
    assert!(users.iter().all(|u| u.get("password").is_none()));

    let (status, body) = get(api(0, 3), &format!("/v1/user/{}", user(2).id)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "user2");

    let (status, _) = get(api(0, 3), "/v1/user/nope").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (status, _) = get(api(0, 0), "/v1/comments").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[derive(Clone)]
struct Down;

impl<D: scrollfeed::Document> Collection<D> for Down {
    async fn find_by_id(&self, _id: RecordId) -> Result<Option<D>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn find_before(&self, _query: KeysetQuery) -> Result<Vec<D>, StoreError> {
        Err(StoreError::Backend("connection refused".into()))
    }

    async fn find_all(&self) -> Result<Vec<D>, StoreError> {
        std::future::pending().await
    }
}

#[tokio::test(start_paused = true)]
async fn store_failures_map_to_gateway_errors() {
    let down = Api::new(Down, Down, Duration::from_secs(10));

    let (status, _) = get(down.clone(), "/v1/posts").await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = get(down.clone(), &format!("/v1/post/{}", post(1).id)).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);

    let (status, _) = get(down, "/v1/users").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
}
