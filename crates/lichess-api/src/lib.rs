//! HTTP client for the lichess.org bot API
//!
//! A thin binding layer over the documented bot endpoints: every method
//! formats a path, issues one HTTP request, and decodes the JSON response.
//! Non-streaming calls run under a bounded constant-interval retry policy
//! that distinguishes transient failures (connection errors, timeouts, 5xx)
//! from final ones (4xx); the two long-lived NDJSON streams bypass retry
//! entirely so reconnect logic can live with the caller.
//!
//! ```rust,no_run
//! use lichess_api::{BotClient, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), lichess_api::ApiError> {
//!     let config = ClientConfig::from_env();
//!     let mut client = BotClient::new(config)?;
//!
//!     let profile = client.get_profile().await?;
//!     println!("logged in as {}", profile["username"]);
//!
//!     let mut events = client.get_event_stream().await?;
//!     while let Some(event) = events.next().await {
//!         println!("event: {:?}", event?);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod endpoint;
pub mod error;
pub mod pool;
pub mod retry;
pub mod stream;

pub use client::BotClient;
pub use config::ClientConfig;
pub use endpoint::Endpoint;
pub use error::{ApiError, Result};
pub use pool::OpponentPool;
pub use retry::RetryPolicy;
pub use stream::{NdjsonStream, StreamLine};
