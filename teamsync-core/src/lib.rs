//! teamsync Core - Core library for teamsync repository synchronization
//!
//! This crate fetches team records from a record source and keeps one local
//! git clone per team in sync with the repository the record names.

pub mod config;
pub mod credentials;
pub mod error;
pub mod git;
pub mod pass;
pub mod records;
pub mod source;
pub mod sync;

pub use config::Config;
pub use credentials::StoreToken;
pub use error::{Error, Result};
pub use git::{GitCli, VersionControlClient};
pub use pass::SyncPass;
pub use records::{RecordTree, TeamRecord};
pub use source::{RecordSource, StaticSource};
pub use sync::{SyncResult, SyncStatus, Synchronizer};
