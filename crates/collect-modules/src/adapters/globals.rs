//! # Module Globals Adapter
//!
//! Governance-owned whitelist and treasury configuration, held in memory.

use crate::domain::value_objects::{Address, CurrencyId, BPS_MAX};
use crate::ports::outbound::{CurrencyWhitelist, ModuleGlobals};
use parking_lot::RwLock;
use std::collections::HashSet;

#[derive(Debug, Default)]
struct GlobalsState {
    whitelist: HashSet<CurrencyId>,
    treasury: Address,
    treasury_fee_bps: u16,
}

/// In-memory governance globals.
#[derive(Debug, Default)]
pub struct InMemoryModuleGlobals {
    state: RwLock<GlobalsState>,
}

impl InMemoryModuleGlobals {
    /// Creates globals with an empty whitelist.
    ///
    /// `treasury_fee_bps` above 100% is clamped.
    #[must_use]
    pub fn new(treasury: Address, treasury_fee_bps: u16) -> Self {
        Self {
            state: RwLock::new(GlobalsState {
                whitelist: HashSet::new(),
                treasury,
                treasury_fee_bps: treasury_fee_bps.min(BPS_MAX),
            }),
        }
    }

    /// Adds `currency` to, or removes it from, the whitelist.
    pub fn whitelist_currency(&self, currency: CurrencyId, allowed: bool) {
        let mut state = self.state.write();
        if allowed {
            state.whitelist.insert(currency);
        } else {
            state.whitelist.remove(&currency);
        }
    }

    /// Changes the treasury account.
    pub fn set_treasury(&self, treasury: Address) {
        self.state.write().treasury = treasury;
    }

    /// Changes the treasury fee. Values above 100% are clamped.
    pub fn set_treasury_fee(&self, treasury_fee_bps: u16) {
        self.state.write().treasury_fee_bps = treasury_fee_bps.min(BPS_MAX);
    }
}

impl CurrencyWhitelist for InMemoryModuleGlobals {
    fn is_whitelisted(&self, currency: CurrencyId) -> bool {
        self.state.read().whitelist.contains(&currency)
    }
}

impl ModuleGlobals for InMemoryModuleGlobals {
    fn treasury(&self) -> Address {
        self.state.read().treasury
    }

    fn treasury_fee_bps(&self) -> u16 {
        self.state.read().treasury_fee_bps
    }
}
