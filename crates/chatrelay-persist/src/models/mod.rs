mod session;

pub use session::{Session, SessionSummary, Sender, Turn, TurnCounts, DEFAULT_TITLE};
