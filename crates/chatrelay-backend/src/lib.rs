pub mod types;
pub mod traits;
pub mod config;
pub mod error;
pub mod http;

pub use traits::{GenerationBackend, ResourceLookup};
pub use types::{GenerationRequest, GenerationReply, LookupRequest, LookupEntry, ResourceLink};
pub use config::{GenerationClientConfig, LookupClientConfig};
pub use error::{BackendError, Result};
pub use http::{HttpGenerationClient, HttpResourceLookup};
