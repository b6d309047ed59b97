mod generation;
mod lookup;

pub use generation::HttpGenerationClient;
pub use lookup::HttpResourceLookup;
