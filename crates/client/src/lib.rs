//! Typed client for the URAMix rewards server.
//!
//! ```rust,no_run
//! use uramix_client::{ClientConfig, UramixClient};
//!
//! #[tokio::main]
//! async fn main() -> uramix_client::Result<()> {
//!     let client = UramixClient::new(ClientConfig::default())?;
//!     let wallet = client.wallet("asha@example.com").await?;
//!     println!("{} credits ({})", wallet.credits, wallet.currency_value);
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;

pub use client::UramixClient;
pub use config::{ClientConfig, DEFAULT_SERVER_URL};
pub use error::{ClientError, Result};
