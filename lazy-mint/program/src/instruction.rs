//! Program instructions

use {
    crate::{
        access::Role, address::EthAddress, find_asset_address, id, merkle::Node,
        voucher::Voucher,
    },
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_program,
    },
};

/// Instructions supported by the program
#[derive(Clone, Debug, BorshSerialize, BorshDeserialize, PartialEq)]
pub enum LazyMintInstruction {
    /// Initialize a registry, giving the signer every role
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account, allocated with `Registry::LEN` bytes
    ///    and owned by the program
    /// 1. `[signer]` Deployer
    /// 2. `[]` Treasury account, the fixed recipient of withdrawals. Must be
    ///    rent-exempt and distinct from the registry.
    Initialize {
        /// Chain id bound into voucher signatures
        chain_id: u64,
    },

    /// Publish a new issuer allowlist root
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[signer]` Maintenance role holder
    UpdateMembershipRoot {
        /// New root
        root: Node,
    },

    /// Grant a role
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[signer]` Admin
    GrantRole {
        /// Role to grant
        role: Role,
        /// New holder
        holder: Pubkey,
    },

    /// Revoke a role
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[signer]` Admin
    RevokeRole {
        /// Role to revoke
        role: Role,
        /// Holder losing the role
        holder: Pubkey,
    },

    /// Grant the maintenance role
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[signer]` Admin
    AddMaintenance {
        /// New maintenance holder
        holder: Pubkey,
    },

    /// Give up a role held by the signer
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[signer]` Role holder
    RenounceRole {
        /// Role to give up
        role: Role,
    },

    /// Redeem a signed voucher, creating the asset for a recipient
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[writable]` Asset account, derived with `find_asset_address`
    /// 2. `[]` Recipient
    /// 3. `[writable, signer]` Payer
    /// 4. `[]` System program
    Redeem {
        /// Voucher to redeem
        voucher: Voucher,
        /// Issuer's `r || s || v` signature over the voucher
        signature: Vec<u8>,
        /// Allowlist proof for the issuer
        proof: Vec<Node>,
        /// Lamports to pay
        payment: u64,
    },

    /// Issue an asset on behalf of an issuer without a voucher
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[writable]` Asset account, derived with `find_asset_address`
    /// 2. `[]` Recipient
    /// 3. `[writable, signer]` Minter, also the payer
    /// 4. `[]` System program
    DirectIssue {
        /// Issuer recorded as creator
        issuer: EthAddress,
        /// Price floor for this issuance
        min_price: u64,
        /// Asset id
        asset_id: u64,
        /// Metadata locator, without the scheme prefix
        uri: String,
        /// Lamports to pay
        payment: u64,
    },

    /// Set the registry-wide minimum price
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[signer]` Admin
    SetMinimumPrice {
        /// New minimum, in lamports
        minimum_price: u64,
    },

    /// Move the whole treasury balance to the treasury account
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[writable]` Treasury account recorded at initialization
    /// 2. `[signer]` Admin
    WithdrawAll,

    /// Halt redemption, issuance, root updates and withdrawals
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[signer]` Admin
    Pause,

    /// Resume a paused registry
    ///
    /// Accounts expected by this instruction:
    ///
    /// 0. `[writable]` Registry account
    /// 1. `[signer]` Admin
    Unpause,
}

fn registry_instruction(
    registry: &Pubkey,
    signer: &Pubkey,
    instruction: &LazyMintInstruction,
) -> Instruction {
    Instruction::new_with_borsh(
        id(),
        instruction,
        vec![
            AccountMeta::new(*registry, false),
            AccountMeta::new_readonly(*signer, true),
        ],
    )
}

/// Create a `LazyMintInstruction::Initialize` instruction
pub fn initialize(
    registry: &Pubkey,
    deployer: &Pubkey,
    chain_id: u64,
    treasury: &Pubkey,
) -> Instruction {
    Instruction::new_with_borsh(
        id(),
        &LazyMintInstruction::Initialize { chain_id },
        vec![
            AccountMeta::new(*registry, false),
            AccountMeta::new_readonly(*deployer, true),
            AccountMeta::new_readonly(*treasury, false),
        ],
    )
}

/// Create a `LazyMintInstruction::UpdateMembershipRoot` instruction
pub fn update_membership_root(registry: &Pubkey, maintainer: &Pubkey, root: Node) -> Instruction {
    registry_instruction(
        registry,
        maintainer,
        &LazyMintInstruction::UpdateMembershipRoot { root },
    )
}

/// Create a `LazyMintInstruction::GrantRole` instruction
pub fn grant_role(registry: &Pubkey, admin: &Pubkey, role: Role, holder: &Pubkey) -> Instruction {
    registry_instruction(
        registry,
        admin,
        &LazyMintInstruction::GrantRole {
            role,
            holder: *holder,
        },
    )
}

/// Create a `LazyMintInstruction::RevokeRole` instruction
pub fn revoke_role(registry: &Pubkey, admin: &Pubkey, role: Role, holder: &Pubkey) -> Instruction {
    registry_instruction(
        registry,
        admin,
        &LazyMintInstruction::RevokeRole {
            role,
            holder: *holder,
        },
    )
}

/// Create a `LazyMintInstruction::AddMaintenance` instruction
pub fn add_maintenance(registry: &Pubkey, admin: &Pubkey, holder: &Pubkey) -> Instruction {
    registry_instruction(
        registry,
        admin,
        &LazyMintInstruction::AddMaintenance { holder: *holder },
    )
}

/// Create a `LazyMintInstruction::RenounceRole` instruction
pub fn renounce_role(registry: &Pubkey, holder: &Pubkey, role: Role) -> Instruction {
    registry_instruction(registry, holder, &LazyMintInstruction::RenounceRole { role })
}

fn issuance_instruction(
    registry: &Pubkey,
    asset_id: u64,
    recipient: &Pubkey,
    payer: &Pubkey,
    instruction: &LazyMintInstruction,
) -> Instruction {
    let asset = find_asset_address(&id(), registry, asset_id);
    Instruction::new_with_borsh(
        id(),
        instruction,
        vec![
            AccountMeta::new(*registry, false),
            AccountMeta::new(asset, false),
            AccountMeta::new_readonly(*recipient, false),
            AccountMeta::new(*payer, true),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
    )
}

/// Create a `LazyMintInstruction::Redeem` instruction
pub fn redeem(
    registry: &Pubkey,
    recipient: &Pubkey,
    payer: &Pubkey,
    voucher: Voucher,
    signature: Vec<u8>,
    proof: Vec<Node>,
    payment: u64,
) -> Instruction {
    let asset_id = voucher.asset_id;
    issuance_instruction(
        registry,
        asset_id,
        recipient,
        payer,
        &LazyMintInstruction::Redeem {
            voucher,
            signature,
            proof,
            payment,
        },
    )
}

/// Create a `LazyMintInstruction::DirectIssue` instruction
#[allow(clippy::too_many_arguments)]
pub fn direct_issue(
    registry: &Pubkey,
    recipient: &Pubkey,
    minter: &Pubkey,
    issuer: &EthAddress,
    min_price: u64,
    asset_id: u64,
    uri: String,
    payment: u64,
) -> Instruction {
    issuance_instruction(
        registry,
        asset_id,
        recipient,
        minter,
        &LazyMintInstruction::DirectIssue {
            issuer: *issuer,
            min_price,
            asset_id,
            uri,
            payment,
        },
    )
}

/// Create a `LazyMintInstruction::SetMinimumPrice` instruction
pub fn set_minimum_price(registry: &Pubkey, admin: &Pubkey, minimum_price: u64) -> Instruction {
    registry_instruction(
        registry,
        admin,
        &LazyMintInstruction::SetMinimumPrice { minimum_price },
    )
}

/// Create a `LazyMintInstruction::WithdrawAll` instruction
pub fn withdraw_all(registry: &Pubkey, treasury: &Pubkey, admin: &Pubkey) -> Instruction {
    Instruction::new_with_borsh(
        id(),
        &LazyMintInstruction::WithdrawAll,
        vec![
            AccountMeta::new(*registry, false),
            AccountMeta::new(*treasury, false),
            AccountMeta::new_readonly(*admin, true),
        ],
    )
}

/// Create a `LazyMintInstruction::Pause` instruction
pub fn pause(registry: &Pubkey, admin: &Pubkey) -> Instruction {
    registry_instruction(registry, admin, &LazyMintInstruction::Pause)
}

/// Create a `LazyMintInstruction::Unpause` instruction
pub fn unpause(registry: &Pubkey, admin: &Pubkey) -> Instruction {
    registry_instruction(registry, admin, &LazyMintInstruction::Unpause)
}
