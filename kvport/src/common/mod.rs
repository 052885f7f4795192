//! Common types shared by adapters and the transfer engine.
//!
//! - [`Value`] and [`HashFields`]: hash field values as stores hand them over
//! - [`KeyType`]: the logical type of a stored key
//! - [`resolve_range`]: Redis-style inclusive index windows used by range readers

mod key_type;
mod range;
mod value;

pub use key_type::*;
pub use range::*;
pub use value::*;
