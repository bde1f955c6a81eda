pub mod auth;
pub mod client;
pub mod error;
pub mod features;
pub mod types;

pub use auth::TokenStore;
pub use client::WashmapClient;
pub use error::ApiError;
