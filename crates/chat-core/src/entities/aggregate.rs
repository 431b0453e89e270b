//! Shared behaviour of versioned aggregates

use crate::events::{AggregateType, DomainEvent};
use crate::value_objects::Snowflake;

/// A consistency boundary that is saved as a unit
///
/// `version` starts at 1 on creation and grows by exactly one per state
/// change. Repositories use it for compare-and-swap on save.
pub trait AggregateRoot {
    const AGGREGATE_TYPE: AggregateType;

    fn id(&self) -> Snowflake;

    fn version(&self) -> i64;

    /// Events recorded since the last `take_events`
    fn pending_events(&self) -> &[DomainEvent];

    /// Drain the pending events
    fn take_events(&mut self) -> Vec<DomainEvent>;
}
