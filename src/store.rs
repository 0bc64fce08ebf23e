use serde::{Deserialize, Serialize};

use crate::errors::{ObligationError, Result};
use crate::installments::InstallmentPlan;
use crate::model::{CreditInstrument, LimitIncreaseRecord, Subscription, Transaction};
use crate::types::InstrumentId;

/// full in-memory snapshot the core computes over
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Portfolio {
    pub instruments: Vec<CreditInstrument>,
    pub subscriptions: Vec<Subscription>,
    pub transactions: Vec<Transaction>,
    pub limit_increase_records: Vec<LimitIncreaseRecord>,
    pub installment_plans: Vec<InstallmentPlan>,
}

impl Portfolio {
    pub fn instrument(&self, id: InstrumentId) -> Option<&CreditInstrument> {
        self.instruments.iter().find(|i| i.id == id)
    }

    pub fn active_instruments(&self) -> impl Iterator<Item = &CreditInstrument> {
        self.instruments.iter().filter(|i| !i.is_archived)
    }

    pub fn transactions_for(&self, card_id: InstrumentId) -> impl Iterator<Item = &Transaction> {
        self.transactions.iter().filter(move |t| t.card_id == card_id)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| ObligationError::Store {
            message: e.to_string(),
        })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| ObligationError::Store {
            message: e.to_string(),
        })
    }
}

/// Persistent store collaborator.
///
/// The core never calls it; the tracker loads a full snapshot, computes, then writes the
/// whole snapshot back once.
pub trait Store {
    fn load(&self) -> Result<Portfolio>;

    fn save_all(&mut self, portfolio: Portfolio) -> Result<()>;
}

/// store backed by a serialized snapshot held in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    snapshot: String,
    saves: usize,
}

impl MemoryStore {
    pub fn new(portfolio: &Portfolio) -> Result<Self> {
        Ok(Self {
            snapshot: portfolio.to_json_pretty()?,
            saves: 0,
        })
    }

    /// number of `save_all` calls so far
    pub fn saves(&self) -> usize {
        self.saves
    }
}

impl Store for MemoryStore {
    fn load(&self) -> Result<Portfolio> {
        if self.snapshot.is_empty() {
            return Ok(Portfolio::default());
        }
        Portfolio::from_json(&self.snapshot)
    }

    fn save_all(&mut self, portfolio: Portfolio) -> Result<()> {
        self.snapshot = portfolio.to_json_pretty()?;
        self.saves += 1;
        Ok(())
    }
}
