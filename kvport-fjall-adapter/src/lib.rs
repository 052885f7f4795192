//! Fjall document-store backend for kvport.
//!
//! Register [`FjallAdapterModule`] with a `kvport::store::AdapterRegistry` to use
//! a fjall keyspace as transfer source or destination.

mod adapter;
mod config;
mod database;
mod module;
mod record;

pub use adapter::FjallAdapter;
pub use config::*;
pub use module::*;
pub use record::{RecordError, RecordResult};
