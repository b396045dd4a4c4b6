//! Key-value storage adapters.
//!
//! Provides [`FileKeyValueStore`], the durable implementation of the
//! [`KeyValueStore`](chatline_application::KeyValueStore) port. The
//! in-memory fallback lives next to the port in the application layer.

mod file_store;

pub use file_store::FileKeyValueStore;
