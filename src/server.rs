use std::net::SocketAddr;
use std::time::Duration;

use env_logger::Env;
use log::{error, info};
use serde::{Deserialize, Serialize};
use tokio::signal;
use warp::reply::Response;
use warp::{Filter, Reply};

use crate::config::Config;
use crate::error::{Error, StoreError};
use crate::lookup::Lookup;
use crate::models::{ErrorBody, Health, Post, User};
use crate::mongo::{self, MongoCollection};
use crate::paginator::{PageLimit, Paginator};
use crate::store::Collection;

/// Everything the `/v1` routes read from.
#[derive(Debug, Clone)]
pub struct Api<U, P> {
    pub users: Lookup<U>,
    pub posts: Lookup<P>,
    pub feed: Paginator<P>,
}

impl<U: Clone, P: Clone> Api<U, P> {
    pub fn new(users: U, posts: P, timeout: Duration) -> Self {
        Api {
            users: Lookup::with_timeout(users, timeout),
            posts: Lookup::with_timeout(posts.clone(), timeout),
            feed: Paginator::with_timeout(posts, timeout),
        }
    }
}

/// `GET /v1/posts` query string. Both values are taken as raw text so a bad
/// `limit` falls back to the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct PostsQuery {
    pub limit: Option<String>,
    pub last_id: Option<String>,
}

impl PostsQuery {
    /// Non-numeric or missing values use the default. Zero and negative
    /// values become one, and sizes too large to count saturate.
    pub fn page_limit(&self) -> PageLimit {
        let Some(raw) = self.limit.as_deref().map(str::trim) else {
            return PageLimit::default();
        };
        let (negative, digits) = match raw.strip_prefix('-') {
            Some(digits) => (true, digits),
            None => (false, raw.strip_prefix('+').unwrap_or(raw)),
        };
        if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return PageLimit::default();
        }
        if negative {
            return PageLimit::at_least_one(0);
        }
        // Only digits remain, so the parse can only fail by overflowing.
        PageLimit::at_least_one(digits.parse().unwrap_or(u32::MAX))
    }
}

pub fn routes<U, P>(
    api: Api<U, P>,
) -> impl Filter<Extract = (impl Reply,), Error = warp::Rejection> + Clone
where
    U: Collection<User>,
    P: Collection<Post>,
{
    let health = warp::path!("v1" / "health").and(warp::get()).map(|| {
        warp::reply::json(&Health {
            status: "Rust backend running",
        })
    });

    let users_api = api.users.clone();
    let users_route = warp::path!("v1" / "users")
        .and(warp::get())
        .and_then(move || list_users(users_api.clone()));

    let user_api = api.users.clone();
    let user_route = warp::path!("v1" / "user" / String)
        .and(warp::get())
        .and_then(move |id: String| get_user(user_api.clone(), id));

    let feed = api.feed.clone();
    let posts_route = warp::path!("v1" / "posts")
        .and(warp::get())
        .and(warp::query::<PostsQuery>())
        .and_then(move |query: PostsQuery| get_posts(feed.clone(), query));

    let post_api = api.posts;
    let post_route = warp::path!("v1" / "post" / String)
        .and(warp::get())
        .and_then(move |id: String| get_post(post_api.clone(), id));

    health
        .or(users_route)
        .or(user_route)
        .or(posts_route)
        .or(post_route)
}

/// Installs `env_logger` with an `info` default. Call it before
/// [`Config::load_env_config`] so configuration warnings reach the output.
/// Returns `false` when a logger was already installed.
pub fn init_logging() -> bool {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .try_init()
        .is_ok()
}

/// Connects with `config` and serves the `/v1` routes until Ctrl-C or SIGTERM.
///
/// Does not install a logger; see [`init_logging`].
///
/// Fails when the database cannot be reached at startup.
///
/// # Panics
///
/// Panics if unable to bind to the provided address.
pub async fn serve(config: Config, address: impl Into<SocketAddr>) -> Result<(), StoreError> {
    let database = mongo::connect(&config.mongo_uri, &config.database, config.store_timeout).await?;
    let api = Api::new(
        MongoCollection::<User>::new(&database),
        MongoCollection::<Post>::new(&database),
        config.store_timeout,
    );

    let routes = routes(api).with(warp::log::custom(|info| {
        let method = info.method();
        let path = info.path();
        let status = info.status();
        let elapsed = info.elapsed().as_millis();

        if status.is_success() {
            info!(
                "Method: {}, Path: {}, Status: {}, Elapsed Time: {}ms",
                method, path, status, elapsed
            );
        } else {
            error!(
                "Method: {}, Path: {}, Status: {}, Elapsed Time: {}ms",
                method, path, status, elapsed,
            );
        }
    }));

    let (address, server) =
        warp::serve(routes).bind_with_graceful_shutdown(address.into(), shutdown_signal());
    info!("Serving on {address}");
    server.await;
    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

async fn list_users<U: Collection<User>>(users: Lookup<U>) -> Result<Response, warp::Rejection> {
    Ok(respond(users.list_all::<User>().await))
}

async fn get_user<U: Collection<User>>(
    users: Lookup<U>,
    id: String,
) -> Result<Response, warp::Rejection> {
    Ok(respond(users.get_by_id::<User>(&id).await))
}

async fn get_posts<P: Collection<Post>>(
    feed: Paginator<P>,
    query: PostsQuery,
) -> Result<Response, warp::Rejection> {
    let page = feed
        .paginate::<Post>(query.page_limit(), query.last_id.as_deref())
        .await;
    Ok(respond(page))
}

async fn get_post<P: Collection<Post>>(
    posts: Lookup<P>,
    id: String,
) -> Result<Response, warp::Rejection> {
    Ok(respond(posts.get_by_id::<Post>(&id).await))
}

fn respond<T: Serialize>(result: Result<T, Error>) -> Response {
    match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(e) => {
            let status = e.status();
            if status.is_server_error() {
                error!("{e}");
            }
            let body = ErrorBody {
                error: e.to_string(),
            };
            warp::reply::with_status(warp::reply::json(&body), status).into_response()
        }
    }
}
