//! Consensus role view used by the seal verifier
//!
//! The election subsystem decides which accounts hold which role at a given
//! block; the engine only reads the resulting graph to check that a block's
//! coinbase is entitled to mine it.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::types::Address;

/// Account role in the election topology
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Miner,
    BackupMiner,
    CandidateMiner,
    Validator,
    BackupValidator,
    CandidateValidator,
    Broadcast,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Miner => "Miner",
            Role::BackupMiner => "BackupMiner",
            Role::CandidateMiner => "CandidateMiner",
            Role::Validator => "Validator",
            Role::BackupValidator => "BackupValidator",
            Role::CandidateValidator => "CandidateValidator",
            Role::Broadcast => "Broadcast",
        }
    }
}

/// Role assignments in effect after a given block
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TopologyGraph {
    pub number: u64,
    roles: HashMap<Address, Role>,
}

impl TopologyGraph {
    pub fn new(number: u64) -> Self {
        Self {
            number,
            roles: HashMap::new(),
        }
    }

    /// Builder-style role assignment
    pub fn with_role(mut self, account: Address, role: Role) -> Self {
        self.roles.insert(account, role);
        self
    }

    pub fn set_role(&mut self, account: Address, role: Role) {
        self.roles.insert(account, role);
    }

    pub fn role_of(&self, account: &Address) -> Option<Role> {
        self.roles.get(account).copied()
    }

    /// Check if `account` currently holds `role`
    pub fn check_account_role(&self, account: &Address, role: Role) -> bool {
        self.role_of(account) == Some(role)
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}
