//! The transfer engine.
//!
//! A [`TransferJob`] clears the destination's portable keys, then copies every
//! portable source key through the [`TypeDispatcher`], one key at a time, and
//! stops at the first error. [`transfer`] runs a whole job from configuration.
//!
//! Per-type transforms:
//! - hash fields are re-typed by [`coerce_fields`]
//! - ordered-set scores are rebuilt by [`reconstruct_scores`]
//!
//! Keys matching the [`KeyFilter`] exclusion patterns are never deleted or copied.

mod coercion;
mod dispatcher;
mod job;
mod key_filter;
mod report;
mod runner;
mod scores;

pub use coercion::*;
pub use dispatcher::*;
pub use job::*;
pub use key_filter::*;
pub use report::*;
pub use runner::*;
pub use scores::*;
