use std::sync::Arc;

use chatrelay_relay::{ChatListing, ConversationRelay};

use crate::config::Config;

/// Shared application state passed to all handlers
///
/// Backend clients and the store are injected once at startup and live for
/// the whole process.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub relay: Arc<ConversationRelay>,
    pub listing: Arc<ChatListing>,
}

impl AppState {
    pub fn new(config: Config, relay: ConversationRelay, listing: ChatListing) -> Self {
        Self {
            config: Arc::new(config),
            relay: Arc::new(relay),
            listing: Arc::new(listing),
        }
    }
}
