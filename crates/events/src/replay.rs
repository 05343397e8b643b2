//! Ordered replay of a single aggregate stream.
//!
//! Envelopes are checked, never reordered: the caller's order is the history.
//! A stream is accepted only if every envelope belongs to the same aggregate
//! and sequence numbers strictly increase.

use thiserror::Error;

use customerflow_core::AggregateId;

use crate::{Event, EventEnvelope};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReplayError {
    #[error("event stream is empty")]
    EmptyStream,

    #[error("stream mixes aggregates (expected {expected}, found {found})")]
    AggregateMismatch {
        expected: AggregateId,
        found: AggregateId,
    },

    #[error("stream mixes aggregate types (expected '{expected}', found '{found}')")]
    AggregateTypeMismatch { expected: String, found: String },

    #[error("non-monotonic sequence number (last {last}, found {found})")]
    NonMonotonicSequence { last: u64, found: u64 },

    #[error("envelope at sequence {sequence} says '{declared}' but carries '{actual}'")]
    EventTypeMismatch {
        sequence: u64,
        declared: String,
        actual: &'static str,
    },
}

/// Position reached while walking a stream.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StreamCursor {
    aggregate_id: AggregateId,
    last_sequence_number: u64,
}

impl StreamCursor {
    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn last_sequence_number(&self) -> u64 {
        self.last_sequence_number
    }
}

/// Validate a stream and return its payloads in order, oldest first.
pub fn ordered_payloads<'a, E>(
    envelopes: impl IntoIterator<Item = &'a EventEnvelope<E>>,
) -> Result<(Vec<E>, StreamCursor), ReplayError>
where
    E: Event,
{
    let mut payloads = Vec::new();
    let mut cursor: Option<StreamCursor> = None;
    let mut aggregate_type: Option<&str> = None;

    for env in envelopes {
        let found_seq = env.sequence_number();

        if env.event_type() != env.payload().event_type() {
            return Err(ReplayError::EventTypeMismatch {
                sequence: found_seq,
                declared: env.event_type().to_string(),
                actual: env.payload().event_type(),
            });
        }

        match aggregate_type {
            None => aggregate_type = Some(env.aggregate_type()),
            Some(expected) if expected != env.aggregate_type() => {
                return Err(ReplayError::AggregateTypeMismatch {
                    expected: expected.to_string(),
                    found: env.aggregate_type().to_string(),
                });
            }
            Some(_) => {}
        }

        match cursor {
            None => {
                cursor = Some(StreamCursor {
                    aggregate_id: env.aggregate_id(),
                    last_sequence_number: found_seq,
                });
            }
            Some(mut c) => {
                if c.aggregate_id != env.aggregate_id() {
                    return Err(ReplayError::AggregateMismatch {
                        expected: c.aggregate_id,
                        found: env.aggregate_id(),
                    });
                }
                if found_seq <= c.last_sequence_number {
                    return Err(ReplayError::NonMonotonicSequence {
                        last: c.last_sequence_number,
                        found: found_seq,
                    });
                }
                c.last_sequence_number = found_seq;
                cursor = Some(c);
            }
        }

        payloads.push(env.payload().clone());
    }

    let cursor = cursor.ok_or(ReplayError::EmptyStream)?;
    tracing::trace!(
        aggregate_id = %cursor.aggregate_id,
        events = payloads.len(),
        last_sequence_number = cursor.last_sequence_number,
        "validated event stream"
    );
    Ok((payloads, cursor))
}
