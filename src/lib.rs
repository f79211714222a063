mod config;
mod error;
mod id;
mod lookup;
mod memory;
mod models;
mod mongo;
mod paginator;
mod server;
mod store;
#[cfg(test)]
mod test_support;

pub use config::Config;
pub use error::{ConfigError, Error, StoreError};
pub use id::{MalformedId, RecordId};
pub use lookup::Lookup;
pub use memory::MemoryCollection;
pub use models::{Comment, Image, Page, Post, RhythmGameStats, User};
pub use mongo::{connect, MongoCollection, MongoDocument, PostRecord, UserRecord};
pub use paginator::{PageLimit, Paginator};
pub use server::{init_logging, routes, serve, Api, PostsQuery};
pub use store::{Collection, Document, KeysetQuery, DEFAULT_STORE_TIMEOUT};
