//! # Host Adapter
//!
//! In-memory stand-in for the social-graph host: profile ownership, follow
//! relationships and collect token minting.

use crate::domain::value_objects::{Address, PublicationKey, TokenId};
use crate::errors::GatewayError;
use crate::ports::outbound::HostGateway;
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

#[derive(Debug, Default)]
struct HostState {
    owners: HashMap<u64, Address>,
    follows: HashSet<(u64, Address)>,
    /// Collect token holders per publication; token ids start at 1.
    minted: HashMap<PublicationKey, Vec<Address>>,
    mint_rejection: Option<String>,
}

/// In-memory host protocol.
#[derive(Debug, Default)]
pub struct InMemoryHost {
    state: Mutex<HostState>,
}

impl InMemoryHost {
    /// Creates a host with no profiles.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `profile_id` as owned by `owner`.
    pub fn create_profile(&self, profile_id: u64, owner: Address) {
        self.state.lock().owners.insert(profile_id, owner);
    }

    /// Makes `follower` follow `profile_id`.
    pub fn follow(&self, profile_id: u64, follower: Address) {
        self.state.lock().follows.insert((profile_id, follower));
    }

    /// Drops the follow of `follower` on `profile_id`.
    pub fn unfollow(&self, profile_id: u64, follower: Address) {
        self.state.lock().follows.remove(&(profile_id, follower));
    }

    /// Makes every mint fail with `reason`, or lifts that with `None`.
    pub fn set_mint_rejection(&self, reason: Option<&str>) {
        self.state.lock().mint_rejection = reason.map(str::to_string);
    }

    /// Holders of the collect tokens of `key`, in mint order.
    #[must_use]
    pub fn minted_to(&self, key: PublicationKey) -> Vec<Address> {
        self.state
            .lock()
            .minted
            .get(&key)
            .cloned()
            .unwrap_or_default()
    }

    /// Holder of collect token `token_id` of `key`.
    #[must_use]
    pub fn token_owner(&self, key: PublicationKey, token_id: TokenId) -> Option<Address> {
        let index = usize::try_from(token_id.checked_sub(1)?).ok()?;
        self.state.lock().minted.get(&key)?.get(index).copied()
    }
}

impl HostGateway for InMemoryHost {
    fn is_following(&self, profile_id: u64, follower: Address) -> bool {
        self.state.lock().follows.contains(&(profile_id, follower))
    }

    fn profile_owner(&self, profile_id: u64) -> Option<Address> {
        self.state.lock().owners.get(&profile_id).copied()
    }

    fn mint_collect_token(
        &self,
        key: PublicationKey,
        recipient: Address,
    ) -> Result<TokenId, GatewayError> {
        let mut state = self.state.lock();
        if let Some(reason) = &state.mint_rejection {
            return Err(GatewayError::MintRejected(reason.clone()));
        }
        if !state.owners.contains_key(&key.profile_id) {
            return Err(GatewayError::PublicationNotFound(key));
        }
        let holders = state.minted.entry(key).or_default();
        holders.push(recipient);
        let token_id = holders.len() as TokenId;
        debug!(%key, %recipient, token_id, "Collect token minted");
        Ok(token_id)
    }
}
