use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use verdict_types::SessionId;

/// Outcome of one audited check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckResult {
    Pass,
    Fail,
}

/// One record in the audit ledger: the check performed, its result,
/// and the identifiers of the inputs it examined.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Monotonic per-session sequence number.
    pub seq: u64,
    pub timestamp: DateTime<Utc>,
    pub check: String,
    pub result: CheckResult,
    pub detail: String,
    pub inputs: Vec<String>,
}

/// Append-only audit ledger for one session.
///
/// Entries are never mutated or deleted; the only mutation is
/// `append`. Sequence numbers are assigned monotonically so the causal
/// chain for every output can be reconstructed in order.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AuditLog {
    session: SessionId,
    entries: Vec<AuditEntry>,
    next_seq: u64,
}

impl AuditLog {
    pub fn new(session: SessionId) -> Self {
        Self {
            session,
            entries: Vec::new(),
            next_seq: 0,
        }
    }

    pub fn session(&self) -> &SessionId {
        &self.session
    }

    /// Append a new entry and return its sequence number. This is the
    /// ledger's only mutation.
    pub fn append(
        &mut self,
        check: impl Into<String>,
        result: CheckResult,
        detail: impl Into<String>,
        inputs: Vec<String>,
    ) -> u64 {
        let seq = self.next_seq;
        self.entries.push(AuditEntry {
            seq,
            timestamp: Utc::now(),
            check: check.into(),
            result,
            detail: detail.into(),
            inputs,
        });
        self.next_seq += 1;
        seq
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn append_assigns_monotonic_sequence() {
        let mut log = AuditLog::new(SessionId::new());
        log.append("format", CheckResult::Pass, "ok", vec![]);
        log.append("content", CheckResult::Fail, "bad", vec!["q".into()]);

        let seqs: Vec<u64> = log.entries().iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1]);
    }

    #[test]
    fn earlier_entries_unchanged_by_later_appends() {
        // append() is the only mutation on AuditLog; entries are only
        // ever handed out as immutable references.
        let mut log = AuditLog::new(SessionId::new());
        log.append("format", CheckResult::Pass, "ok", vec![]);
        let first = log.entries()[0].clone();

        log.append("content", CheckResult::Pass, "ok", vec![]);
        assert_eq!(log.entries()[0], first);
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn entries_serialize_for_export() {
        let mut log = AuditLog::new(SessionId::new());
        log.append("quantitative", CheckResult::Pass, "within limit", vec![]);
        let json = serde_json::to_string(log.entries()).unwrap();
        assert!(json.contains("quantitative"));
    }
}
