// feedline-api: Async HTTP client and wire types for the EONET and GitHub feeds

pub mod client;
pub mod eonet;
pub mod error;
pub mod github;
pub mod request;
pub mod transport;

pub use client::HttpClient;
pub use error::Error;
pub use request::{Request, RequestIdentity, ResponseEnvelope};
pub use transport::TransportConfig;
