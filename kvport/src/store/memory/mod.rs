//! In-process key-value backend.
//!
//! [`InMemoryAdapterModule`] builds [`InMemoryAdapter`]s over an
//! [`InMemoryDataset`]. Keep a clone of the dataset to seed or inspect the store
//! from outside a transfer.

mod adapter;
mod dataset;
mod module;

pub use adapter::*;
pub use dataset::InMemoryDataset;
pub use module::*;
