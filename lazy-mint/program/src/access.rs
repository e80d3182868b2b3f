//! Role-based access control

use {
    crate::{error::LazyMintError, MAX_ROLE_HOLDERS},
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::pubkey::Pubkey,
    std::fmt,
};

/// Roles a registry can grant
#[derive(Clone, Copy, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub enum Role {
    /// May grant and revoke every role, pause, configure and withdraw
    Admin,
    /// May issue assets directly without a voucher
    Minter,
    /// May publish new issuer allowlist roots
    Maintenance,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Admin => f.write_str("admin"),
            Role::Minter => f.write_str("minter"),
            Role::Maintenance => f.write_str("maintenance"),
        }
    }
}

/// Holders of each role. Roles are independent: holding one grants nothing
/// under another, and only admins may change membership.
#[derive(Clone, Debug, Default, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct RoleRegistry {
    admins: Vec<Pubkey>,
    minters: Vec<Pubkey>,
    maintainers: Vec<Pubkey>,
}

impl RoleRegistry {
    /// Serialized size with every role at capacity
    pub const LEN: usize = 3 * (4 + MAX_ROLE_HOLDERS * 32);

    /// Registry in which the deployer holds every role
    pub fn genesis(deployer: &Pubkey) -> Self {
        Self {
            admins: vec![*deployer],
            minters: vec![*deployer],
            maintainers: vec![*deployer],
        }
    }

    fn holders(&self, role: Role) -> &Vec<Pubkey> {
        match role {
            Role::Admin => &self.admins,
            Role::Minter => &self.minters,
            Role::Maintenance => &self.maintainers,
        }
    }

    fn holders_mut(&mut self, role: Role) -> &mut Vec<Pubkey> {
        match role {
            Role::Admin => &mut self.admins,
            Role::Minter => &mut self.minters,
            Role::Maintenance => &mut self.maintainers,
        }
    }

    /// Current holders of `role`
    pub fn members(&self, role: Role) -> &[Pubkey] {
        self.holders(role)
    }

    /// Check whether `account` holds `role`
    pub fn has_role(&self, role: Role, account: &Pubkey) -> bool {
        self.holders(role).contains(account)
    }

    /// Fail with `Unauthorized` unless `account` holds `role`
    pub fn require_role(&self, role: Role, account: &Pubkey) -> Result<(), LazyMintError> {
        if self.has_role(role, account) {
            Ok(())
        } else {
            Err(LazyMintError::Unauthorized)
        }
    }

    /// Add `account` to `role`. Returns whether membership changed.
    pub fn grant(&mut self, role: Role, account: &Pubkey) -> Result<bool, LazyMintError> {
        let holders = self.holders_mut(role);
        if holders.contains(account) {
            return Ok(false);
        }
        if holders.len() >= MAX_ROLE_HOLDERS {
            return Err(LazyMintError::RoleCapacityExceeded);
        }
        holders.push(*account);
        Ok(true)
    }

    /// Remove `account` from `role`. Returns whether membership changed.
    pub fn revoke(&mut self, role: Role, account: &Pubkey) -> bool {
        let holders = self.holders_mut(role);
        let before = holders.len();
        holders.retain(|holder| holder != account);
        holders.len() != before
    }
}
