//! Cinedex-DB: Store schema, migrations, and query operations
//!
//! This crate persists the ingestion pipeline's collections (directories,
//! movies, images, cast members and the name index) in SQLite using rusqlite
//! and r2d2 connection pooling.
//!
//! # Modules
//!
//! - `migrations` - Database schema migrations
//! - `pool` - Connection pool management
//! - `models` - Rust models matching database schema
//! - `queries` - Per-collection query functions taking `&Connection`
//! - `store` - The `Store` trait and its SQLite implementation
//!
//! # Example
//!
//! ```no_run
//! use cinedex_db::pool::init_pool;
//! use cinedex_db::store::{SqliteStore, Store};
//!
//! let pool = init_pool("/var/lib/cinedex/cinedex.db").unwrap();
//! let store = SqliteStore::new(pool);
//!
//! let dir = store.add_directory("/media/movies", true, Some(2)).unwrap();
//! println!("Watching {} ({})", dir.path, dir.id);
//! ```

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod store;

pub use store::{SqliteStore, Store};
