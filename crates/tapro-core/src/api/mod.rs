pub mod client;
mod profiles;
pub mod transport;

pub use client::ApiClient;
pub use transport::{ApiRequest, HttpTransport, Method, Transport};
