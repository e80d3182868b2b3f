//! State transition types

use {
    crate::{
        access::RoleRegistry,
        address::{EthAddress, ETH_ADDRESS_LEN},
        error::LazyMintError,
        merkle::{Node, EMPTY_ROOT},
        DEFAULT_MINIMUM_PRICE, MAX_URI_LEN, URI_PREFIX,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        account_info::AccountInfo, borsh1::try_from_slice_unchecked, program_error::ProgramError,
        pubkey::Pubkey,
    },
};

/// LazyMint account type
#[derive(Clone, Copy, Debug, Default, PartialEq, BorshDeserialize, BorshSerialize)]
pub enum LazyMintAccountType {
    /// Uninitialized account
    #[default]
    Uninitialized,
    /// Registry holding roles, the allowlist root and the treasury
    Registry,
    /// Record of one minted asset
    Asset,
}

/// Registry account: every piece of shared mutable state lives here, so each
/// instruction reads and writes it as one unit.
#[derive(Clone, Debug, Default, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct Registry {
    /// Account type, reserved for future compat
    pub account_type: LazyMintAccountType,
    /// Chain id bound into every voucher signature
    pub chain_id: u64,
    /// Role holders
    pub roles: RoleRegistry,
    /// Root of the current issuer allowlist
    pub merkle_root: Node,
    /// Emergency halt flag
    pub paused: bool,
    /// Registry-wide lamport floor for redemptions
    pub minimum_price: u64,
    /// Fixed recipient of withdrawn funds
    pub treasury: Pubkey,
    /// Lamports collected and not yet withdrawn
    pub treasury_balance: u64,
}

impl Registry {
    /// Account size to allocate for a registry
    pub const LEN: usize = 1 + 8 + RoleRegistry::LEN + 32 + 1 + 8 + 32 + 8;

    /// Fresh registry in which `deployer` holds every role
    pub fn new(deployer: &Pubkey, chain_id: u64, treasury: &Pubkey) -> Self {
        Self {
            account_type: LazyMintAccountType::Registry,
            chain_id,
            roles: RoleRegistry::genesis(deployer),
            merkle_root: EMPTY_ROOT,
            paused: false,
            minimum_price: DEFAULT_MINIMUM_PRICE,
            treasury: *treasury,
            treasury_balance: 0,
        }
    }

    /// Deserialize a registry from its account info
    pub fn from_account_info(
        account_info: &AccountInfo,
        program_id: &Pubkey,
    ) -> Result<Self, ProgramError> {
        if account_info.owner != program_id || account_info.data_len() < Self::LEN {
            return Err(LazyMintError::InvalidRegistryAccount.into());
        }
        let registry = try_from_slice_unchecked::<Registry>(&account_info.data.borrow())?;
        if registry.account_type != LazyMintAccountType::Registry {
            return Err(LazyMintError::InvalidRegistryAccount.into());
        }
        Ok(registry)
    }

    /// Serialize the registry into its account
    pub fn save(&self, account_info: &AccountInfo) -> Result<(), ProgramError> {
        borsh::to_writer(&mut account_info.data.borrow_mut()[..], self).map_err(|e| e.into())
    }

    /// Fail with `Paused` if the registry is halted
    pub fn require_active(&self) -> Result<(), LazyMintError> {
        if self.paused {
            Err(LazyMintError::Paused)
        } else {
            Ok(())
        }
    }

    /// Active -> Paused
    pub fn pause(&mut self) -> Result<(), LazyMintError> {
        if self.paused {
            return Err(LazyMintError::InvalidState);
        }
        self.paused = true;
        Ok(())
    }

    /// Paused -> Active
    pub fn unpause(&mut self) -> Result<(), LazyMintError> {
        if !self.paused {
            return Err(LazyMintError::InvalidState);
        }
        self.paused = false;
        Ok(())
    }

    /// Add an accepted payment to the treasury
    pub fn record_payment(&mut self, amount: u64) -> Result<(), LazyMintError> {
        self.treasury_balance = self
            .treasury_balance
            .checked_add(amount)
            .ok_or(LazyMintError::Overflow)?;
        Ok(())
    }

    /// Empty the treasury, returning what it held
    pub fn take_treasury_balance(&mut self) -> u64 {
        std::mem::take(&mut self.treasury_balance)
    }
}

/// Record of a minted asset, stored at the address derived from its registry
/// and asset id
#[derive(Clone, Debug, Default, PartialEq, BorshDeserialize, BorshSerialize)]
pub struct AssetRecord {
    /// Account type, reserved for future compat
    pub account_type: LazyMintAccountType,
    /// Registry the asset was minted through
    pub registry: Pubkey,
    /// Asset id, unique within the registry
    pub asset_id: u64,
    /// Current owner
    pub owner: Pubkey,
    /// Issuer that authorized the asset
    pub creator: EthAddress,
    /// Metadata locator including the `ipfs://` prefix
    pub uri: String,
}

impl AssetRecord {
    /// Account size to allocate for an asset record
    pub const LEN: usize = 1 + 32 + 8 + 32 + ETH_ADDRESS_LEN + 4 + URI_PREFIX.len() + MAX_URI_LEN;

    /// Deserialize an asset record from its account info
    pub fn from_account_info(
        account_info: &AccountInfo,
        program_id: &Pubkey,
    ) -> Result<Self, ProgramError> {
        if account_info.owner != program_id {
            return Err(LazyMintError::InvalidAssetAccount.into());
        }
        let data = account_info.data.borrow();
        // other account types do not share the record layout past the tag
        if try_from_slice_unchecked::<LazyMintAccountType>(&data).ok()
            != Some(LazyMintAccountType::Asset)
        {
            return Err(LazyMintError::InvalidAssetAccount.into());
        }
        Ok(try_from_slice_unchecked::<AssetRecord>(&data)?)
    }

    /// Full metadata locator of the asset
    pub fn token_uri(&self) -> &str {
        &self.uri
    }
}
