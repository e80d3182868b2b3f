//! Redemption and direct issuance checks.
//!
//! Everything here is read-only: a successful check yields an [`Issuance`]
//! describing the writes to perform, and the processor performs them only
//! after every check has passed.

use {
    crate::{
        access::Role,
        address::EthAddress,
        error::LazyMintError,
        merkle::{self, Node},
        state::{AssetRecord, LazyMintAccountType, Registry},
        voucher::{self, Voucher, VoucherDomain},
        MAX_URI_LEN, URI_PREFIX,
    },
    solana_program::pubkey::Pubkey,
};

/// An authorized asset creation, ready to be committed
#[derive(Clone, Debug, PartialEq)]
pub struct Issuance {
    /// Id of the asset to create
    pub asset_id: u64,
    /// Issuer recorded as the asset's creator
    pub issuer: EthAddress,
    /// Owner of the asset once created
    pub recipient: Pubkey,
    /// Voucher URI, without the scheme prefix
    pub uri: String,
    /// Lamports accrued to the treasury
    pub payment: u64,
}

impl Issuance {
    /// Asset record to store for this issuance
    pub fn into_record(self, registry_address: &Pubkey) -> AssetRecord {
        AssetRecord {
            account_type: LazyMintAccountType::Asset,
            registry: *registry_address,
            asset_id: self.asset_id,
            owner: self.recipient,
            creator: self.issuer,
            uri: format!("{}{}", URI_PREFIX, self.uri),
        }
    }
}

/// Checks a payment against a voucher price and the registry minimum.
///
/// The floor is the larger of the two. A shortfall is reported as
/// `BelowMinimumPrice` when the registry minimum is met and only the voucher
/// price is missed, and as `InsufficientFunds` otherwise.
pub fn check_price(payment: u64, min_price: u64, minimum_price: u64) -> Result<(), LazyMintError> {
    if payment >= min_price.max(minimum_price) {
        Ok(())
    } else if payment >= minimum_price {
        Err(LazyMintError::BelowMinimumPrice)
    } else {
        Err(LazyMintError::InsufficientFunds)
    }
}

fn check_uri(uri: &str) -> Result<(), LazyMintError> {
    if uri.len() > MAX_URI_LEN {
        Err(LazyMintError::UriTooLong)
    } else {
        Ok(())
    }
}

/// Authorizes redemption of a signed voucher
#[allow(clippy::too_many_arguments)]
pub fn authorize_redemption(
    registry: &Registry,
    domain: &VoucherDomain,
    asset_exists: bool,
    recipient: &Pubkey,
    voucher: &Voucher,
    signature: &[u8],
    proof: &[Node],
    payment: u64,
) -> Result<Issuance, LazyMintError> {
    registry.require_active()?;
    if asset_exists {
        return Err(LazyMintError::AlreadyMinted);
    }
    let issuer = voucher::recover_signer(voucher, signature, domain)?;
    if !merkle::verify(&registry.merkle_root, &issuer, proof) {
        return Err(LazyMintError::NotAuthorized);
    }
    check_price(payment, voucher.min_price, registry.minimum_price)?;
    check_uri(&voucher.uri)?;

    Ok(Issuance {
        asset_id: voucher.asset_id,
        issuer,
        recipient: *recipient,
        uri: voucher.uri.clone(),
        payment,
    })
}

/// Authorizes a minter to issue an asset on behalf of `issuer` without a
/// voucher
#[allow(clippy::too_many_arguments)]
pub fn authorize_direct_issue(
    registry: &Registry,
    caller: &Pubkey,
    asset_exists: bool,
    recipient: &Pubkey,
    issuer: &EthAddress,
    min_price: u64,
    asset_id: u64,
    uri: &str,
    payment: u64,
) -> Result<Issuance, LazyMintError> {
    registry.roles.require_role(Role::Minter, caller)?;
    registry.require_active()?;
    if asset_exists {
        return Err(LazyMintError::AlreadyMinted);
    }
    if payment < min_price.max(registry.minimum_price) {
        return Err(LazyMintError::InsufficientFunds);
    }
    check_uri(uri)?;

    Ok(Issuance {
        asset_id,
        issuer: *issuer,
        recipient: *recipient,
        uri: uri.to_string(),
        payment,
    })
}
