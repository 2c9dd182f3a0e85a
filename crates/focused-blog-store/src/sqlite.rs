//! SQLite implementation of the Store trait.
//!
//! This is the primary storage backend for Focused Blog. It uses rusqlite
//! with bundled SQLite, wrapped in async via tokio::spawn_blocking. Every
//! mutation runs inside one SQLite transaction.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use focused_blog_core::{AccountId, PostRecord, TokenId};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::Store;

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations use spawn_blocking
/// to avoid blocking the async runtime.
pub struct SqliteStore {
    /// The SQLite connection, protected by a mutex.
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path, minting from token id 0.
    ///
    /// Creates the file and runs migrations if it doesn't exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_origin(path, TokenId(0))
    }

    /// Open a SQLite database at the given path.
    ///
    /// `origin` only applies when the database is created; an existing
    /// database keeps the origin it was created with.
    pub fn open_with_origin(path: impl AsRef<Path>, origin: TokenId) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn, origin)
    }

    /// Open an in-memory SQLite database.
    ///
    /// Useful for testing.
    pub fn open_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?, TokenId(0))
    }

    fn init(mut conn: Connection, origin: TokenId) -> Result<Self> {
        migration::migrate(&mut conn)?;
        conn.execute(
            "INSERT OR IGNORE INTO registry_meta (id, token_origin, next_token_id)
             VALUES (0, ?1, ?1)",
            params![to_sql_id(origin)?],
        )?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let mut conn = conn.lock().map_err(|e| {
                StoreError::Database(rusqlite::Error::SqliteFailure(
                    rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_LOCKED),
                    Some(format!("mutex poisoned: {}", e)),
                ))
            })?;
            f(&mut *conn)
        })
        .await
        .map_err(|e| {
            StoreError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_ERROR),
                Some(format!("spawn_blocking failed: {}", e)),
            ))
        })?
    }
}

fn to_sql_id(token_id: TokenId) -> Result<i64> {
    i64::try_from(token_id.0)
        .map_err(|_| StoreError::InvalidData(format!("token id {} out of range", token_id.0)))
}

fn to_sql_index(index: u64) -> i64 {
    i64::try_from(index).unwrap_or(i64::MAX)
}

// Helper to convert a blob column to AccountId
fn account_from_blob(bytes: Vec<u8>, column: usize) -> rusqlite::Result<AccountId> {
    AccountId::try_from(bytes.as_slice()).map_err(|_| {
        rusqlite::Error::InvalidColumnType(column, "account".into(), rusqlite::types::Type::Blob)
    })
}

// Helper to convert a row to PostRecord
fn row_to_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRecord> {
    let token_id: i64 = row.get("token_id")?;
    let author_bytes: Vec<u8> = row.get("original_author")?;

    Ok(PostRecord {
        token_id: TokenId(token_id as u64),
        post_uri: row.get("post_uri")?,
        original_author: account_from_blob(author_bytes, 2)?,
        published_at: row.get("published_at")?,
    })
}

fn count_held(conn: &Connection, owner: &AccountId) -> rusqlite::Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM tokens WHERE owner = ?1",
        params![owner.0.as_slice()],
        |row| row.get(0),
    )
}

#[async_trait]
impl Store for SqliteStore {
    async fn publish_post(
        &self,
        author: &AccountId,
        post_uri: &str,
        published_at: i64,
    ) -> Result<PostRecord> {
        if author.is_zero() {
            return Err(StoreError::InvalidAuthor);
        }

        let author = *author;
        let post_uri = post_uri.to_owned();

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let next: i64 = tx.query_row(
                "SELECT next_token_id FROM registry_meta WHERE id = 0",
                [],
                |row| row.get(0),
            )?;
            let author_index: i64 = tx.query_row(
                "SELECT COUNT(*) FROM posts WHERE original_author = ?1",
                params![author.0.as_slice()],
                |row| row.get(0),
            )?;
            let owner_index = count_held(&tx, &author)?;

            tx.execute(
                "INSERT INTO posts (token_id, post_uri, original_author, published_at, author_index)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![next, &post_uri, author.0.as_slice(), published_at, author_index],
            )?;
            tx.execute(
                "INSERT INTO tokens (token_id, owner, owner_index) VALUES (?1, ?2, ?3)",
                params![next, author.0.as_slice(), owner_index],
            )?;
            tx.execute(
                "UPDATE registry_meta SET next_token_id = ?1 WHERE id = 0",
                params![next + 1],
            )?;

            tx.commit()?;

            let token_id = TokenId(next as u64);
            debug!(%token_id, %author, published_at, "minted post token");
            Ok(PostRecord::new(token_id, post_uri, author, published_at))
        })
        .await
    }

    async fn get_post(&self, token_id: TokenId) -> Result<Option<PostRecord>> {
        let id = to_sql_id(token_id)?;

        self.run(move |conn| {
            conn.query_row(
                "SELECT token_id, post_uri, original_author, published_at
                 FROM posts WHERE token_id = ?1",
                params![id],
                row_to_post,
            )
            .optional()
            .map_err(StoreError::from)
        })
        .await
    }

    async fn author_post_count(&self, author: &AccountId) -> Result<u64> {
        let author = *author;

        self.run(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE original_author = ?1",
                params![author.0.as_slice()],
                |row| row.get(0),
            )?;
            Ok(count as u64)
        })
        .await
    }

    async fn author_post_at(&self, author: &AccountId, index: u64) -> Result<Option<TokenId>> {
        let author = *author;
        let index = to_sql_index(index);

        self.run(move |conn| {
            let id: Option<i64> = conn
                .query_row(
                    "SELECT token_id FROM posts WHERE original_author = ?1 AND author_index = ?2",
                    params![author.0.as_slice(), index],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id.map(|id| TokenId(id as u64)))
        })
        .await
    }

    async fn balance_of(&self, owner: &AccountId) -> Result<u64> {
        let owner = *owner;

        self.run(move |conn| Ok(count_held(conn, &owner)? as u64))
            .await
    }

    async fn token_of_owner_by_index(
        &self,
        owner: &AccountId,
        index: u64,
    ) -> Result<Option<TokenId>> {
        let owner = *owner;
        let index = to_sql_index(index);

        self.run(move |conn| {
            let id: Option<i64> = conn
                .query_row(
                    "SELECT token_id FROM tokens WHERE owner = ?1 AND owner_index = ?2",
                    params![owner.0.as_slice(), index],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id.map(|id| TokenId(id as u64)))
        })
        .await
    }

    async fn owner_of(&self, token_id: TokenId) -> Result<Option<AccountId>> {
        let id = to_sql_id(token_id)?;

        self.run(move |conn| {
            let owner: Option<Vec<u8>> = conn
                .query_row(
                    "SELECT owner FROM tokens WHERE token_id = ?1",
                    params![id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(owner.map(|bytes| account_from_blob(bytes, 0)).transpose()?)
        })
        .await
    }

    async fn total_supply(&self) -> Result<u64> {
        self.run(|conn| {
            let count: i64 = conn.query_row("SELECT COUNT(*) FROM tokens", [], |row| row.get(0))?;
            Ok(count as u64)
        })
        .await
    }

    async fn token_by_index(&self, index: u64) -> Result<Option<TokenId>> {
        let index = to_sql_index(index);

        self.run(move |conn| {
            let id: Option<i64> = conn
                .query_row(
                    "SELECT token_id FROM tokens ORDER BY token_id LIMIT 1 OFFSET ?1",
                    params![index],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(id.map(|id| TokenId(id as u64)))
        })
        .await
    }

    async fn transfer(&self, from: &AccountId, to: &AccountId, token_id: TokenId) -> Result<()> {
        if to.is_zero() {
            return Err(StoreError::InvalidRecipient);
        }

        let from = *from;
        let to = *to;
        let id = to_sql_id(token_id)?;

        self.run(move |conn| {
            let tx = conn.transaction()?;

            let row: Option<(Vec<u8>, i64)> = tx
                .query_row(
                    "SELECT owner, owner_index FROM tokens WHERE token_id = ?1",
                    params![id],
                    |row| Ok((row.get(0)?, row.get(1)?)),
                )
                .optional()?;
            let Some((owner_bytes, position)) = row else {
                return Err(StoreError::UnknownToken(token_id));
            };

            if account_from_blob(owner_bytes, 0)? != from {
                return Err(StoreError::NotOwner {
                    token_id,
                    claimed: from,
                });
            }
            if from == to {
                return Ok(());
            }

            let last = count_held(&tx, &from)? - 1;
            let to_index = count_held(&tx, &to)?;

            // Move the token out first so its slot is free for the swap.
            tx.execute(
                "UPDATE tokens SET owner = ?1, owner_index = ?2 WHERE token_id = ?3",
                params![to.0.as_slice(), to_index, id],
            )?;
            if position != last {
                tx.execute(
                    "UPDATE tokens SET owner_index = ?1 WHERE owner = ?2 AND owner_index = ?3",
                    params![position, from.0.as_slice(), last],
                )?;
            }

            tx.commit()?;
            debug!(%token_id, %from, %to, "transferred token");
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::traits::StoreExt;
    use proptest::prelude::*;

    #[tokio::test]
    async fn test_publish_and_get_post() {
        let store = SqliteStore::open_memory().unwrap();
        let author = AccountId::derive("alice");

        let post = store
            .publish_post(&author, "https://example.com", 1_700_000_000)
            .await
            .unwrap();
        assert_eq!(post.token_id, TokenId(0));

        let retrieved = store.get_post(TokenId(0)).await.unwrap().unwrap();
        assert_eq!(retrieved.post_uri, "https://example.com");
        assert_eq!(retrieved.original_author, author);
        assert_eq!(retrieved.published_at, 1_700_000_000);

        assert!(store.get_post(TokenId(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ownership_index() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = AccountId::derive("alice");
        let bob = AccountId::derive("bob");

        store.publish_post(&alice, "a0", 1).await.unwrap();
        store.publish_post(&bob, "b0", 2).await.unwrap();
        store.publish_post(&alice, "a1", 3).await.unwrap();

        assert_eq!(store.balance_of(&alice).await.unwrap(), 2);
        assert_eq!(store.balance_of(&bob).await.unwrap(), 1);
        assert_eq!(
            store.token_of_owner_by_index(&alice, 1).await.unwrap(),
            Some(TokenId(2))
        );
        assert_eq!(store.token_of_owner_by_index(&alice, 2).await.unwrap(), None);
        assert_eq!(store.total_supply().await.unwrap(), 3);
        assert_eq!(store.token_by_index(2).await.unwrap(), Some(TokenId(2)));
    }

    #[tokio::test]
    async fn test_transfer_keeps_history() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = AccountId::derive("alice");
        let bob = AccountId::derive("bob");

        for i in 0..3 {
            store.publish_post(&alice, "p", i).await.unwrap();
        }
        store.transfer(&alice, &bob, TokenId(0)).await.unwrap();

        assert_eq!(
            store.tokens_of_owner(&alice).await.unwrap(),
            vec![TokenId(2), TokenId(1)]
        );
        assert_eq!(store.tokens_of_owner(&bob).await.unwrap(), vec![TokenId(0)]);
        assert_eq!(store.author_post_count(&alice).await.unwrap(), 3);
        assert_eq!(store.author_post_at(&alice, 0).await.unwrap(), Some(TokenId(0)));
    }

    #[tokio::test]
    async fn test_transfer_errors_leave_state() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = AccountId::derive("alice");
        let bob = AccountId::derive("bob");
        store.publish_post(&alice, "p", 1).await.unwrap();

        assert!(matches!(
            store.transfer(&bob, &alice, TokenId(0)).await,
            Err(StoreError::NotOwner { .. })
        ));
        assert!(matches!(
            store.transfer(&alice, &bob, TokenId(5)).await,
            Err(StoreError::UnknownToken(TokenId(5)))
        ));
        assert!(matches!(
            store.transfer(&alice, &AccountId::ZERO, TokenId(0)).await,
            Err(StoreError::InvalidRecipient)
        ));
        assert_eq!(store.owner_of(TokenId(0)).await.unwrap(), Some(alice));
    }

    #[tokio::test]
    async fn test_null_author_rejected() {
        let store = SqliteStore::open_memory().unwrap();
        let err = store.publish_post(&AccountId::ZERO, "x", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidAuthor));
        assert_eq!(store.total_supply().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_reopen_keeps_ledger_and_origin() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blog.db");
        let alice = AccountId::derive("alice");

        {
            let store = SqliteStore::open_with_origin(&path, TokenId(1)).unwrap();
            store.publish_post(&alice, "first", 10).await.unwrap();
        }

        // The origin passed on reopen is ignored.
        let store = SqliteStore::open_with_origin(&path, TokenId(50)).unwrap();
        let post = store.publish_post(&alice, "second", 20).await.unwrap();
        assert_eq!(post.token_id, TokenId(2));

        let history = store.author_history(&alice).await.unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].token_id, TokenId(1));
        assert_eq!(history[0].post_uri, "first");
    }

    #[derive(Debug, Clone)]
    enum Op {
        Publish { author: usize, at: i64 },
        Transfer { from: usize, to: usize, token: u64 },
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (0usize..3, 0i64..1_000_000).prop_map(|(author, at)| Op::Publish { author, at }),
            (0usize..4, 0usize..4, 0u64..12)
                .prop_map(|(from, to, token)| Op::Transfer { from, to, token }),
        ]
    }

    /// Outcome of an operation, comparable across backends.
    fn outcome<T: std::fmt::Debug>(result: Result<T>) -> String {
        match result {
            Ok(value) => format!("ok {:?}", value),
            Err(StoreError::InvalidAuthor) => "invalid author".into(),
            Err(StoreError::InvalidRecipient) => "invalid recipient".into(),
            Err(StoreError::UnknownToken(id)) => format!("unknown {}", id),
            Err(StoreError::NotOwner { token_id, .. }) => format!("not owner {}", token_id),
            Err(e) => panic!("unexpected store error: {}", e),
        }
    }

    async fn apply<S: Store>(store: &S, accounts: &[AccountId], op: &Op) -> String {
        match op {
            Op::Publish { author, at } => {
                outcome(store.publish_post(&accounts[*author], "p", *at).await)
            }
            Op::Transfer { from, to, token } => outcome(
                store
                    .transfer(&accounts[*from], &accounts[*to], TokenId(*token))
                    .await,
            ),
        }
    }

    async fn snapshot<S: Store>(store: &S, accounts: &[AccountId]) -> Vec<String> {
        let mut out = vec![format!("supply {}", store.total_supply().await.unwrap())];
        for account in accounts {
            out.push(format!(
                "{} holds {:?} wrote {:?}",
                account,
                store.tokens_of_owner(account).await.unwrap(),
                store.author_history(account).await.unwrap()
            ));
        }
        out
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn test_backends_agree(ops in prop::collection::vec(op(), 0..40)) {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .unwrap();

            // The last account is the null account.
            let accounts = [
                AccountId::derive("alice"),
                AccountId::derive("bob"),
                AccountId::derive("carol"),
                AccountId::ZERO,
            ];

            let (memory_log, sqlite_log, memory_state, sqlite_state) = rt.block_on(async {
                let memory = MemoryStore::new();
                let sqlite = SqliteStore::open_memory().unwrap();

                let mut memory_log = Vec::new();
                let mut sqlite_log = Vec::new();
                for op in &ops {
                    memory_log.push(apply(&memory, &accounts, op).await);
                    sqlite_log.push(apply(&sqlite, &accounts, op).await);
                }

                (
                    memory_log,
                    sqlite_log,
                    snapshot(&memory, &accounts).await,
                    snapshot(&sqlite, &accounts).await,
                )
            });

            prop_assert_eq!(memory_log, sqlite_log);
            prop_assert_eq!(memory_state, sqlite_state);
        }
    }
}
