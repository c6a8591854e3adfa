//! Thin async facade over the `git` command line.
//!
//! [`Repository`] addresses one directory and runs each operation as a
//! single git process through [`GitRunner`]. Output is parsed into typed
//! records ([`Remote`], [`Commit`], [`StatusEntry`]) and every failure
//! surfaces as a [`GitError`].

pub mod branch;
pub mod errors;
pub mod log;
pub mod message;
pub mod reachability;
pub mod remote;
pub mod repository;
pub mod runner;
pub mod status;
pub mod url_parser;

pub use errors::{GitError, ParseError};
pub use log::Commit;
pub use message::sanitize_message;
pub use reachability::{HttpProbe, ReachabilityCache, ReachabilityProbe};
pub use remote::Remote;
pub use repository::Repository;
pub use runner::{GitCommand, GitRunner};
pub use status::StatusEntry;
