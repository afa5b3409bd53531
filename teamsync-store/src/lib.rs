//! teamsync Store - document store access for teamsync
//!
//! This crate reads the team record tree from a Firebase-style realtime
//! database over its REST interface and exposes it as a
//! [`teamsync_core::RecordSource`].

mod client;
mod error;

pub use client::RealtimeDbClient;
pub use error::{Error, Result};
