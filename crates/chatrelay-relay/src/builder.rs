use std::sync::Arc;

use anyhow::{anyhow, Result};
use chatrelay_backend::{GenerationBackend, ResourceLookup};
use chatrelay_persist::SessionStore;

use crate::guard::AvailabilityGuard;
use crate::listing::ChatListing;
use crate::relay::ConversationRelay;
use crate::types::RetryPolicy;

/// Builder wiring the store and backend clients into a relay and listing service
pub struct RelayBuilder {
    store: Option<Arc<dyn SessionStore>>,
    generation: Option<Arc<dyn GenerationBackend>>,
    lookup: Option<Arc<dyn ResourceLookup>>,
    retry: RetryPolicy,
}

impl RelayBuilder {
    pub fn new() -> Self {
        Self {
            store: None,
            generation: None,
            lookup: None,
            retry: RetryPolicy::default(),
        }
    }

    /// Set the session store
    pub fn store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Set the generation backend
    pub fn generation(mut self, backend: Arc<dyn GenerationBackend>) -> Self {
        self.generation = Some(backend);
        self
    }

    /// Enable reference enrichment
    pub fn with_lookup(mut self, lookup: Arc<dyn ResourceLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Build the relay and the listing service over the same store
    pub fn build(self) -> Result<(ConversationRelay, ChatListing)> {
        let store = self.store
            .ok_or_else(|| anyhow!("Session store is required"))?;
        let generation = self.generation
            .ok_or_else(|| anyhow!("Generation backend is required"))?;

        let relay = ConversationRelay::new(
            Arc::clone(&store),
            AvailabilityGuard::new(generation),
            self.lookup,
            self.retry,
        );
        Ok((relay, ChatListing::new(store)))
    }
}

impl Default for RelayBuilder {
    fn default() -> Self {
        Self::new()
    }
}
