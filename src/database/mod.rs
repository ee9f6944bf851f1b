pub mod feedback_store;
#[cfg(test)]
pub mod memory;
pub mod token_store;
pub mod user_store;

pub use feedback_store::*;
pub use token_store::*;
pub use user_store::*;

use mongodb::bson::{doc, Document};
use mongodb::error::{ErrorKind, WriteFailure};
use mongodb::options::IndexOptions;
use mongodb::{Client, Collection, Database, IndexModel};
use std::time::Duration;
use thiserror::Error;

pub const AUTH_TOKENS: &str = "auth_tokens";
pub const USERS: &str = "users";
pub const FEEDBACKS: &str = "feedbacks";

/// MongoDB server code for a unique index violation.
const DUPLICATE_KEY_CODE: i32 = 11000;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique index rejected the write. Callers that expect concurrent
    /// duplicates recover from this; everyone else treats it as a failure.
    #[error("duplicate key")]
    DuplicateKey,

    #[error("{0}")]
    Backend(String),
}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        if is_duplicate_key(&err) {
            StoreError::DuplicateKey
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

pub fn is_duplicate_key(err: &mongodb::error::Error) -> bool {
    match err.kind.as_ref() {
        ErrorKind::Write(WriteFailure::WriteError(e)) => e.code == DUPLICATE_KEY_CODE,
        ErrorKind::Command(e) => e.code == DUPLICATE_KEY_CODE,
        _ => false,
    }
}

/// Pooled client plus the application database. Created once in `main` and
/// handed to each store; there is no process-wide handle.
#[derive(Clone)]
pub struct MongoDB {
    db: Database,
}

impl MongoDB {
    pub async fn connect(uri: &str, db_name: &str) -> Result<Self, StoreError> {
        let mut client_options = mongodb::options::ClientOptions::parse(uri).await?;

        client_options.max_pool_size = Some(20);
        client_options.min_pool_size = Some(2);
        client_options.max_idle_time = Some(Duration::from_secs(300));
        client_options.connect_timeout = Some(Duration::from_secs(5));
        client_options.server_selection_timeout = Some(Duration::from_secs(10));

        let client = Client::with_options(client_options)?;
        let db = client.database(db_name);

        db.run_command(doc! { "ping": 1 }).await?;
        log::info!("✅ Connected to MongoDB database: {}", db_name);

        Ok(Self { db })
    }

    /// Creates the unique and TTL indexes every exactly-once guarantee in the
    /// service relies on. Existing identical indexes are a no-op on the server.
    pub async fn ensure_indexes(&self) -> Result<(), StoreError> {
        log::info!("🔧 Creating database indexes...");

        let tokens = self.collection::<Document>(AUTH_TOKENS);
        tokens
            .create_indexes(vec![
                IndexModel::builder()
                    .keys(doc! { "token": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "email": 1, "created_at": -1 })
                    .build(),
                IndexModel::builder()
                    .keys(doc! { "expires_at": 1 })
                    .options(
                        IndexOptions::builder()
                            .expire_after(Duration::from_secs(0))
                            .build(),
                    )
                    .build(),
            ])
            .await?;
        log::info!(
            "   ✅ Indexes ready: auth_tokens(token unique, email+created_at, expires_at TTL)"
        );

        let users = self.collection::<Document>(USERS);
        users
            .create_index(
                IndexModel::builder()
                    .keys(doc! { "email": 1 })
                    .options(IndexOptions::builder().unique(true).build())
                    .build(),
            )
            .await?;
        log::info!("   ✅ Index ready: users(email unique)");

        let feedbacks = self.collection::<Document>(FEEDBACKS);
        feedbacks
            .create_indexes(vec![
                IndexModel::builder()
                    .keys(doc! { "idempotency_key": 1 })
                    .options(IndexOptions::builder().unique(true).sparse(true).build())
                    .build(),
                IndexModel::builder().keys(doc! { "user_id": 1 }).build(),
            ])
            .await?;
        log::info!("   ✅ Indexes ready: feedbacks(idempotency_key unique sparse, user_id)");

        log::info!("✅ Database indexes ready");
        Ok(())
    }

    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}
