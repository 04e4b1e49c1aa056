pub mod kv;
pub mod session_store;

pub use kv::{KvStore, SqliteStore};
pub use session_store::SessionStore;

#[cfg(test)]
mod tests;
