//! Upstream data sources
//!
//! - **congress_client** - Congress.gov JSON API (hearings, record issues, House votes)
//! - **senate_client** - Senate.gov roll-call XML feed
//! - **payloads** - Congress.gov response shapes

pub mod congress_client;
pub mod payloads;
pub mod senate_client;

pub use congress_client::CongressClient;
pub use senate_client::SenateClient;
