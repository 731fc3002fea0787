pub mod api;
pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod session;
pub mod store;
pub mod sync;

// Re-export the types front-ends touch on every call path.
pub use api::{ApiClient, HttpTransport, Transport};
pub use config::CoreConfig;
pub use error::ApiError;
pub use session::{Session, SessionStore, UserInfo};
