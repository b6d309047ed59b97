pub mod models;
pub mod store;
pub mod dbs;
pub mod error;

pub use models::{Session, SessionSummary, Sender, Turn, TurnCounts, DEFAULT_TITLE};
pub use store::SessionStore;
pub use dbs::memory::InMemorySessionStore;
#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoSessionStore;
pub use error::{PersistError, Result};
