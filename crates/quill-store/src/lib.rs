//! quill-store
//!
//! Typed key-value façade over sled for the wallet core. Owns the storage
//! schema; all multi-key writes go through [`WriteBatch`] and commit
//! atomically.

pub mod schema;
pub mod store;

pub use schema::{tx_key, AccountRecord};
pub use store::{Store, WriteBatch};
