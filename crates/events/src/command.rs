use customerflow_core::AggregateId;

/// A command targets a specific aggregate (command abstraction).
///
/// Commands represent **intent**: a request to perform an action on an aggregate.
/// They are transient and turn into zero or more events when handled.
///
/// - **Command**: intent to do something (e.g. "confirm this email address")
/// - **Event**: fact that something happened (e.g. "email address confirmed")
///
/// An aggregate must refuse a command whose target is not itself; that is a
/// caller bug, not a business outcome.
pub trait Command: Clone + core::fmt::Debug + Send + Sync + 'static {
    fn target_aggregate_id(&self) -> AggregateId;
}
