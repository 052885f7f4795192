//! Storage backends and their uniform adapter contract.
//!
//! The transfer engine only ever sees a [`StoreAdapter`]: a handle over some
//! [`StoreAdapterProvider`] implementation. Backends are identified by a
//! [`BackendKind`], built by an [`AdapterModule`] and looked up through an
//! [`AdapterRegistry`].
//!
//! # Backends
//!
//! - **In-Memory**: [`memory::InMemoryAdapterModule`], a key-value store living in
//!   the process, used for tests and as a scratch destination
//! - **Fjall**: `kvport-fjall-adapter`, a persistent document store
//!
//! # Session stores
//!
//! Which backend holds a store's session records is resolved once through
//! [`resolve_session_store`] and handed to the adapter in its [`AdapterContext`].

mod adapter_module;
mod backend;
pub mod memory;
mod registry;
mod session;
mod store_adapter;

pub use adapter_module::*;
pub use backend::*;
pub use registry::*;
pub use session::*;
pub use store_adapter::*;
