//! Table access for the marketplace backend.
//!
//! `DataClient` is the seam: `RestClient` talks to the hosted REST endpoint,
//! `MemoryDataClient` evaluates the same queries in process.

pub mod client;
pub mod memory;
pub mod query;
pub mod rest;
pub mod table;
pub mod token;

pub use client::{query_single, BackendResult, DataClient};
pub use memory::MemoryDataClient;
pub use query::{escape_like, like_matches, Embed, Filter, Order, Query, Select};
pub use rest::RestClient;
pub use table::Table;
pub use token::AccessToken;

#[cfg(any(test, feature = "test-utils"))]
pub use client::MockDataClient;
