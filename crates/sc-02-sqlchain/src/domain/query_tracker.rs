//! Per-chain query records and the acked-query index.
//!
//! The tracker enforces the lifecycle ordering only. Signature checks are
//! done by the caller, which then either records the step or calls
//! [`QueryTracker::reject`].

use sc_01_chain_mux::{AckedQuery, ChainError};
use shared_types::{Query, QueryAck, QueryId, QueryResponse};
use std::collections::{BTreeMap, HashMap};

use super::query_state::QueryState;

/// Everything known about one query.
#[derive(Debug, Clone)]
pub struct TrackedQuery {
    pub query: Query,
    pub state: QueryState,
    pub response: Option<QueryResponse>,
    pub ack: Option<QueryAck>,
    /// Position in ack order, set on `Acked`.
    pub ack_sequence: Option<u64>,
    /// Height of the block that committed it.
    pub committed_at: Option<u64>,
}

#[derive(Debug, Default)]
pub struct QueryTracker {
    /// Every query ever submitted. Committed and rejected records are kept
    /// for the life of the instance, so a resubmitted id stays a duplicate.
    queries: HashMap<QueryId, TrackedQuery>,
    /// Acked, not yet committed, keyed by ack sequence.
    acked: BTreeMap<u64, QueryId>,
    last_ack_sequence: u64,
}

impl QueryTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &QueryId) -> Option<&TrackedQuery> {
        self.queries.get(id)
    }

    pub fn state(&self, id: &QueryId) -> Option<QueryState> {
        self.queries.get(id).map(|q| q.state)
    }

    /// Queries that are neither committed nor rejected.
    pub fn pending_count(&self) -> usize {
        self.queries
            .values()
            .filter(|q| !q.state.is_terminal())
            .count()
    }

    pub fn acked_count(&self) -> usize {
        self.acked.len()
    }

    /// Admit a new query in `Submitted`.
    pub fn submit(&mut self, query: Query) -> Result<QueryId, ChainError> {
        let id = query.id();
        if self.queries.contains_key(&id) {
            return Err(ChainError::DuplicateQuery { query_id: id });
        }
        self.queries.insert(
            id,
            TrackedQuery {
                query,
                state: QueryState::Submitted,
                response: None,
                ack: None,
                ack_sequence: None,
                committed_at: None,
            },
        );
        Ok(id)
    }

    /// Check that `id` is known and may move to `next`.
    pub fn ensure_transition(&self, id: &QueryId, next: QueryState) -> Result<&TrackedQuery, ChainError> {
        let tracked = self
            .queries
            .get(id)
            .ok_or(ChainError::QueryNotFound { query_id: *id })?;
        if !tracked.state.can_transition_to(next) {
            return Err(ChainError::InvalidTransition {
                query_id: *id,
                from: tracked.state.as_str(),
                to: next.as_str(),
            });
        }
        Ok(tracked)
    }

    /// Submitted → Responsed.
    pub fn record_response(&mut self, response: QueryResponse) -> Result<(), ChainError> {
        let id = response.query_id;
        self.ensure_transition(&id, QueryState::Responsed)?;
        if let Some(tracked) = self.queries.get_mut(&id) {
            tracked.state = QueryState::Responsed;
            tracked.response = Some(response);
        }
        Ok(())
    }

    /// Responsed → Acked. Returns the assigned ack sequence.
    pub fn record_ack(&mut self, ack: QueryAck) -> Result<u64, ChainError> {
        let id = ack.query_id;
        self.ensure_transition(&id, QueryState::Acked)?;
        let sequence = self.last_ack_sequence + 1;
        if let Some(tracked) = self.queries.get_mut(&id) {
            tracked.state = QueryState::Acked;
            tracked.ack = Some(ack);
            tracked.ack_sequence = Some(sequence);
        }
        self.last_ack_sequence = sequence;
        self.acked.insert(sequence, id);
        Ok(sequence)
    }

    /// Move a non-terminal query to `Rejected`. No-op for unknown or terminal queries.
    pub fn reject(&mut self, id: &QueryId) {
        if let Some(tracked) = self.queries.get_mut(id) {
            if tracked.state.can_transition_to(QueryState::Rejected) {
                if let Some(sequence) = tracked.ack_sequence {
                    self.acked.remove(&sequence);
                }
                tracked.state = QueryState::Rejected;
            }
        }
    }

    /// Every locally known query in `ids` must be `Acked`. Unknown ids are ignored.
    pub fn check_committable(&self, ids: &[QueryId]) -> Result<(), ChainError> {
        for id in ids {
            if let Some(tracked) = self.queries.get(id) {
                if tracked.state != QueryState::Acked {
                    return Err(ChainError::QueryNotAcked { query_id: *id });
                }
            }
        }
        Ok(())
    }

    /// Acked → Committed for every known id. Returns how many moved.
    pub fn commit(&mut self, ids: &[QueryId], height: u64) -> usize {
        let mut committed = 0;
        for id in ids {
            if let Some(tracked) = self.queries.get_mut(id) {
                if tracked.state.can_transition_to(QueryState::Committed) {
                    tracked.state = QueryState::Committed;
                    tracked.committed_at = Some(height);
                    if let Some(sequence) = tracked.ack_sequence {
                        self.acked.remove(&sequence);
                    }
                    committed += 1;
                }
            }
        }
        committed
    }

    /// Acked, uncommitted queries with sequence greater than `cursor`, ascending.
    ///
    /// Returns the page and the cursor for the next call.
    pub fn acked_after(&self, cursor: u64, limit: usize) -> (Vec<AckedQuery>, u64) {
        let mut next_cursor = cursor;
        let page = self
            .acked
            .range(cursor.saturating_add(1)..)
            .take(limit)
            .filter_map(|(sequence, id)| {
                let tracked = self.queries.get(id)?;
                next_cursor = *sequence;
                Some(AckedQuery {
                    sequence: *sequence,
                    query: tracked.query.clone(),
                    response: tracked.response.clone()?,
                    ack: tracked.ack.clone()?,
                })
            })
            .collect();
        (page, next_cursor)
    }
}
