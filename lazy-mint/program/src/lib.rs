#![deny(missing_docs)]

//! A program for lazily minting unique assets from issuer-signed vouchers

pub mod access;
pub mod address;
pub mod engine;
pub mod error;
pub mod events;
pub mod instruction;
pub mod merkle;
pub mod processor;
pub mod state;
pub mod voucher;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

// export current sdk types for downstream users building with a different sdk
// version
pub use solana_program;
use solana_program::pubkey::Pubkey;

solana_program::declare_id!("LazyMint11111111111111111111111111111111111");

const ASSET_PREFIX: &[u8] = b"asset";

/// Lamports every redemption must pay unless lowered by an administrator
pub const DEFAULT_MINIMUM_PRICE: u64 = 25_000_000;

/// Scheme prefix prepended to every voucher URI when the asset is stored
pub const URI_PREFIX: &str = "ipfs://";

/// Longest voucher URI (without the scheme prefix) an asset record can hold
pub const MAX_URI_LEN: usize = 200;

/// Most holders a single role may have
pub const MAX_ROLE_HOLDERS: usize = 8;

fn find_asset_address_and_bump(
    program_id: &Pubkey,
    registry_address: &Pubkey,
    asset_id: u64,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[
            ASSET_PREFIX,
            registry_address.as_ref(),
            &asset_id.to_le_bytes(),
        ],
        program_id,
    )
}

/// Find the asset record address for an asset id minted through a registry.
pub fn find_asset_address(program_id: &Pubkey, registry_address: &Pubkey, asset_id: u64) -> Pubkey {
    find_asset_address_and_bump(program_id, registry_address, asset_id).0
}
