//! # kvport - Heterogeneous Key-Value Store Transfer
//!
//! kvport copies the full contents of one key-value store into a different one,
//! keeping each key's logical type: scalar, hash, set, ordered set or list.
//! Keys the backends derive on their own, such as session records and search
//! indices, are excluded.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use kvport::store::AdapterRegistry;
//! use kvport::store::memory::InMemoryAdapterModule;
//! use kvport::transfer::transfer;
//! use kvport::transfer_config::TransferConfig;
//! use kvport_fjall_adapter::FjallAdapterModule;
//!
//! let mut registry = AdapterRegistry::new();
//! registry
//!     .register(InMemoryAdapterModule::new())
//!     .register(FjallAdapterModule::with_config().db_path("/tmp/kv").build());
//!
//! let config = TransferConfig::builder()
//!     .source_name("memory")
//!     .destination_name("fjall")
//!     .build()?;
//!
//! let report = transfer(&config, &registry).into_result()?;
//! println!("{}", report);
//! ```
//!
//! ## How a transfer runs
//!
//! 1. Both adapters are built and connected concurrently
//! 2. Every portable key on the destination is deleted in one call
//! 3. Every portable source key is copied, one after another
//!
//! The first error stops the run. Nothing is retried and nothing is rolled back.
//!
//! ## Module Organization
//!
//! - [`common`] - Values, key types and range resolution
//! - [`errors`] - Error types and result definitions
//! - [`store`] - Adapter contract, registry and the in-memory backend
//! - [`transfer`] - Key filter, per-type copy, task runner and the transfer job
//! - [`transfer_config`] - Transfer configuration

pub mod common;
pub mod errors;
pub mod store;
pub mod transfer;
pub mod transfer_config;
