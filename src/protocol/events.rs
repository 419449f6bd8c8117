//! Engine events and the append-only audit log.
//!
//! Every record carries a sequence number and a SHA256 chain hash over the
//! previous hash and the bincode encoding of the event, so any rewrite of
//! history is detectable with [`EventLog::verify_chain`].

use serde::{Deserialize, Serialize};

use crate::core::registry::AssetId;
use crate::error::{Error, Result};
use crate::utils::crypto::{Address, Hash};

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Observable engine events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Collateral credited to an account
    CollateralDeposited {
        /// Depositing account
        account: Address,
        /// Collateral asset
        asset: AssetId,
        /// Amount deposited
        amount: u128,
    },
    /// Collateral debited from `from` and paid to `to`
    CollateralRedeemed {
        /// Account whose collateral was debited
        from: Address,
        /// Recipient of the asset (differs from `from` during liquidation)
        to: Address,
        /// Collateral asset
        asset: AssetId,
        /// Amount redeemed
        amount: u128,
    },
}

impl EngineEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CollateralDeposited { .. } => "CollateralDeposited",
            Self::CollateralRedeemed { .. } => "CollateralRedeemed",
        }
    }

    /// Whether `account` appears in the event
    pub fn involves(&self, account: &Address) -> bool {
        match self {
            Self::CollateralDeposited { account: a, .. } => a == account,
            Self::CollateralRedeemed { from, to, .. } => from == account || to == account,
        }
    }
}

/// A logged event with its position in the chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Zero-based position in the log
    pub sequence: u64,
    /// The event
    pub event: EngineEvent,
    /// Chain hash through this record
    pub hash: Hash,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only, hash-chained event log
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vec<EventRecord>,
}

impl EventLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its chained hash
    pub fn emit(&mut self, event: EngineEvent) -> Result<Hash> {
        let encoded = bincode::serialize(&event).map_err(|e| Error::Serialization(e.to_string()))?;
        let hash = self.head().chain(&encoded);
        let sequence = self.records.len() as u64;
        tracing::debug!(sequence, kind = event.event_type(), "event emitted");
        self.records.push(EventRecord { sequence, event, hash });
        Ok(hash)
    }

    /// Hash of the latest record (zero for an empty log)
    pub fn head(&self) -> Hash {
        self.records.last().map(|r| r.hash).unwrap_or_default()
    }

    /// All records in order
    pub fn all(&self) -> &[EventRecord] {
        &self.records
    }

    /// Records involving `account`
    pub fn for_account<'a>(&'a self, account: &'a Address) -> impl Iterator<Item = &'a EventRecord> + 'a {
        self.records.iter().filter(move |r| r.event.involves(account))
    }

    /// Number of records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the log is empty
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop records past `len`. Only used to discard the events of a
    /// transaction that rolled back.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.records.truncate(len);
    }

    /// Recompute every chain hash and sequence number
    pub fn verify_chain(&self) -> bool {
        let mut head = Hash::zero();
        for (i, record) in self.records.iter().enumerate() {
            let Ok(encoded) = bincode::serialize(&record.event) else {
                return false;
            };
            head = head.chain(&encoded);
            if record.sequence != i as u64 || record.hash != head {
                return false;
            }
        }
        true
    }
}
