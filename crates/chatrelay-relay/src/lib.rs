//! Conversation relay
//!
//! Sits between callers and the session store, forwarding each user turn to
//! the generation backend and folding its reply back into the session:
//!
//! - [`ConversationRelay`]: create sessions, add messages, read history
//! - [`ChatListing`]: paged listing, rename, delete
//! - [`AvailabilityGuard`]: pre-flight and per-call backend classification
//!
//! ```ignore
//! let (relay, listing) = ConversationRelay::builder()
//!     .store(store)
//!     .generation(Arc::new(HttpGenerationClient::new(config)?))
//!     .build()?;
//! ```

pub mod error;
pub mod types;
pub mod guard;
pub mod relay;
pub mod listing;
pub mod builder;

pub use error::{RelayError, Result};
pub use types::{BackendStatus, ChatPage, CreatedSession, MessageOutcome, RetryPolicy};
pub use guard::AvailabilityGuard;
pub use relay::ConversationRelay;
pub use listing::{ChatListing, PAGE_SIZE};
pub use builder::RelayBuilder;
