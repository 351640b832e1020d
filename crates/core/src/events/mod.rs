//! Domain events module.
//!
//! Provides domain event types and the sink trait for emitting events after
//! successful domain mutations. Hosts implement the sink to translate domain
//! events into platform-specific actions (indexing services, notifications,
//! ledger event logs).

mod domain_event;
mod sink;

pub use domain_event::*;
pub use sink::*;
