//! Economy ledger - persistent currency and unlock state.
//!
//! The ledger keeps a cached [`Account`] as the synchronous source of truth
//! for the UI and writes every mutation through an [`AccountStore`]. Writes
//! are optimistic: a failed store call keeps the local state, marks the
//! ledger dirty, and is retried via [`Ledger::flush`]. A failure is logged,
//! never swallowed silently.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use thiserror::Error;
use uuid::Uuid;

use quiz_rules::{Catalog, LanguageId, LevelId};

/// Unique identifier for a player account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub Uuid);

impl UserId {
    /// Create a new random user ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a user ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Persistent, cross-run account state. The balance can never go negative:
/// it is unsigned and purchases are rejected before deduction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub currency: u32,
    pub unlocked_languages: HashSet<LanguageId>,
    pub unlocked_levels: HashSet<LevelId>,
}

impl Account {
    /// A fresh account holding the catalog's free tier.
    pub fn starter(catalog: &Catalog) -> Self {
        Self {
            currency: 0,
            unlocked_languages: catalog.free_languages().cloned().collect(),
            unlocked_levels: catalog.free_levels().cloned().collect(),
        }
    }

    pub fn has_language(&self, id: &LanguageId) -> bool {
        self.unlocked_languages.contains(id)
    }

    pub fn has_level(&self, id: &LevelId) -> bool {
        self.unlocked_levels.contains(id)
    }
}

/// Something purchasable on the selection screens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnlockItem {
    Language(LanguageId),
    Level(LevelId),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("account store unavailable: {0}")]
    Unavailable(String),

    #[error("account serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum EconomyError {
    /// The purchase costs more than the balance. No state was changed;
    /// `shortfall` is exactly how much is missing, for display.
    #[error("insufficient funds: {shortfall} more needed")]
    InsufficientFunds { shortfall: u32 },

    /// A balance mutation re-entered while another was mid-flight.
    #[error("another account operation is in progress")]
    OperationInProgress,
}

/// The external key-value account store. Assumed read-after-write consistent
/// within a session.
pub trait AccountStore {
    fn load(&mut self, user: UserId) -> Result<Option<Account>, StoreError>;
    fn save(&mut self, user: UserId, account: &Account) -> Result<(), StoreError>;
}

/// In-memory store keeping accounts as serialized JSON records, usable for
/// tests and offline play.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: HashMap<UserId, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AccountStore for MemoryStore {
    fn load(&mut self, user: UserId) -> Result<Option<Account>, StoreError> {
        match self.records.get(&user) {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    fn save(&mut self, user: UserId, account: &Account) -> Result<(), StoreError> {
        let raw = serde_json::to_string(account)?;
        self.records.insert(user, raw);
        Ok(())
    }
}

/// The economy ledger: cached account plus write-through persistence.
pub struct Ledger {
    user: UserId,
    account: Account,
    store: Box<dyn AccountStore>,
    /// Local state is ahead of the store; `flush` retries the write.
    dirty: bool,
    /// Mutual-exclusion flag serializing read-modify-write sequences.
    busy: bool,
}

impl std::fmt::Debug for Ledger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Ledger")
            .field("user", &self.user)
            .field("account", &self.account)
            .field("dirty", &self.dirty)
            .field("busy", &self.busy)
            .finish()
    }
}

impl Ledger {
    /// Load the user's account from the store, or persist a fresh starter
    /// account on first authentication.
    pub fn open(
        user: UserId,
        mut store: Box<dyn AccountStore>,
        starter: Account,
    ) -> Result<Self, StoreError> {
        let account = match store.load(user)? {
            Some(existing) => existing,
            None => {
                store.save(user, &starter)?;
                starter
            }
        };

        Ok(Self {
            user,
            account,
            store,
            dirty: false,
            busy: false,
        })
    }

    pub fn user(&self) -> UserId {
        self.user
    }

    /// The cached account - synchronous source of truth for the UI.
    pub fn account(&self) -> &Account {
        &self.account
    }

    pub fn balance(&self) -> u32 {
        self.account.currency
    }

    /// A store write failed and has not been re-applied yet.
    pub fn has_pending_write(&self) -> bool {
        self.dirty
    }

    /// Add currency to the balance. The local update always succeeds;
    /// persistence failures leave the ledger dirty for a later `flush`.
    pub fn credit(&mut self, amount: u32) -> Result<(), EconomyError> {
        self.mutate(|account| {
            account.currency = account.currency.saturating_add(amount);
        })
    }

    /// Buy an unlock. Deducting the price and inserting the unlock happen as
    /// one local mutation persisted in a single store write, so the store
    /// never observes a deduction without its unlock.
    pub fn purchase(&mut self, item: UnlockItem, price: u32) -> Result<(), EconomyError> {
        if self.account.currency < price {
            return Err(EconomyError::InsufficientFunds {
                shortfall: price - self.account.currency,
            });
        }

        self.mutate(|account| {
            account.currency -= price;
            match item {
                UnlockItem::Language(id) => {
                    account.unlocked_languages.insert(id);
                }
                UnlockItem::Level(id) => {
                    account.unlocked_levels.insert(id);
                }
            }
        })
    }

    /// Retry a pending store write.
    pub fn flush(&mut self) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        self.store.save(self.user, &self.account)?;
        self.dirty = false;
        Ok(())
    }

    fn mutate(&mut self, apply: impl FnOnce(&mut Account)) -> Result<(), EconomyError> {
        if self.busy {
            return Err(EconomyError::OperationInProgress);
        }
        self.busy = true;

        apply(&mut self.account);
        if let Err(error) = self.store.save(self.user, &self.account) {
            log::warn!(
                "account write failed for {user}; keeping optimistic local state: {error}",
                user = self.user
            );
            self.dirty = true;
        } else {
            self.dirty = false;
        }

        self.busy = false;
        Ok(())
    }
}
