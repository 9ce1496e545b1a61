pub mod config;
pub mod contracts;
pub mod download;
pub mod humanize;
pub mod notify;
pub mod observability;
pub mod operation;
pub mod session;
pub mod transport;

pub use session::{Session, SessionError};
