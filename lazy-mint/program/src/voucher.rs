//! Vouchers and their EIP-712 signatures.
//!
//! Issuers sign vouchers off-chain with any EIP-712 capable wallet
//! (`eth_signTypedData_v4`). The program rebuilds the typed-data digest and
//! recovers the signer; whether that signer may issue is decided separately
//! against the allowlist.

use {
    crate::{address::EthAddress, error::LazyMintError},
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{keccak::hashv, pubkey::Pubkey, secp256k1_recover::secp256k1_recover},
};

/// EIP-712 domain name
pub const DOMAIN_NAME: &str = "PoignartVoucher";

/// EIP-712 domain version
pub const DOMAIN_VERSION: &str = "1";

const DOMAIN_TYPE: &str =
    "EIP712Domain(string name,string version,uint256 chainId,address verifyingContract)";

const VOUCHER_TYPE: &str = "NFTVoucher(uint256 tokenId,uint256 minPrice,string uri)";

/// Length of an `r || s || v` signature
pub const SIGNATURE_LEN: usize = 65;

/// Upper bound for the `s` value of a canonical signature (secp256k1 n / 2)
const HALF_CURVE_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0x5d, 0x57, 0x6e, 0x73, 0x57, 0xa4, 0x50, 0x1d, 0xdf, 0xe9, 0x2f, 0x46, 0x68, 0x1b, 0x20, 0xa0,
];

/// An issuer's off-chain authorization to mint one asset
#[derive(Clone, Debug, Default, PartialEq, BorshSerialize, BorshDeserialize)]
pub struct Voucher {
    /// Id of the asset to create, consumed on redemption
    pub asset_id: u64,
    /// Lowest payment, in lamports, the issuer accepts
    pub min_price: u64,
    /// Metadata locator, stored behind the `ipfs://` prefix
    pub uri: String,
}

/// Deployment-specific part of the EIP-712 domain
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VoucherDomain {
    /// Chain id recorded in the registry
    pub chain_id: u64,
    /// 20-byte identity of the registry account
    pub verifying_contract: EthAddress,
}

impl VoucherDomain {
    /// Domain for vouchers redeemable against one registry account
    pub fn new(chain_id: u64, registry_address: &Pubkey) -> Self {
        Self {
            chain_id,
            verifying_contract: EthAddress::from_pubkey(registry_address),
        }
    }

    /// EIP-712 domain separator; recomputed on every call so that vouchers
    /// never outlive a change of chain or registry
    pub fn separator(&self) -> [u8; 32] {
        hashv(&[
            &hashv(&[DOMAIN_TYPE.as_bytes()]).to_bytes(),
            &hashv(&[DOMAIN_NAME.as_bytes()]).to_bytes(),
            &hashv(&[DOMAIN_VERSION.as_bytes()]).to_bytes(),
            &encode_u64(self.chain_id),
            &encode_address(&self.verifying_contract),
        ])
        .to_bytes()
    }
}

impl Voucher {
    /// EIP-712 `hashStruct` of the voucher
    pub fn struct_hash(&self) -> [u8; 32] {
        hashv(&[
            &hashv(&[VOUCHER_TYPE.as_bytes()]).to_bytes(),
            &encode_u64(self.asset_id),
            &encode_u64(self.min_price),
            &hashv(&[self.uri.as_bytes()]).to_bytes(),
        ])
        .to_bytes()
    }

    /// Digest the issuer signs
    pub fn signing_digest(&self, domain: &VoucherDomain) -> [u8; 32] {
        hashv(&[b"\x19\x01", &domain.separator(), &self.struct_hash()]).to_bytes()
    }
}

/// ABI-encodes an integer as a `uint256` word
fn encode_u64(value: u64) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[24..].copy_from_slice(&value.to_be_bytes());
    word
}

/// ABI-encodes an address as a left-padded word
fn encode_address(address: &EthAddress) -> [u8; 32] {
    let mut word = [0u8; 32];
    word[12..].copy_from_slice(address.as_ref());
    word
}

/// Recovers the address that signed `voucher` under `domain`.
///
/// Only malformed signatures are errors. A well-formed signature by the wrong
/// key recovers to some other address, which the allowlist then rejects.
pub fn recover_signer(
    voucher: &Voucher,
    signature: &[u8],
    domain: &VoucherDomain,
) -> Result<EthAddress, LazyMintError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(LazyMintError::InvalidSignature);
    }
    let (rs, v) = signature.split_at(64);
    let recovery_id = match v[0] {
        0 | 1 => v[0],
        27 | 28 => v[0] - 27,
        _ => return Err(LazyMintError::InvalidSignature),
    };
    if rs[32..] > HALF_CURVE_ORDER[..] {
        return Err(LazyMintError::InvalidSignature);
    }

    let digest = voucher.signing_digest(domain);
    let public_key = secp256k1_recover(&digest, recovery_id, rs)
        .map_err(|_| LazyMintError::InvalidSignature)?;
    Ok(EthAddress::from_public_key(&public_key.to_bytes()))
}
