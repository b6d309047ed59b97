pub mod session;

pub use session::MongoSessionRepository;
