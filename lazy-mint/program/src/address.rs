//! Ethereum-style issuer addresses

use {
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{keccak, pubkey::Pubkey},
    std::{fmt, str::FromStr},
    thiserror::Error,
};

/// Length of an issuer address in bytes
pub const ETH_ADDRESS_LEN: usize = 20;

/// A 20-byte Ethereum-style address, as recovered from a secp256k1 signature.
///
/// Parsing is case-insensitive; `Display` always renders the EIP-55 checksum
/// form, so two spellings of the same address collapse to one identity.
#[derive(
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    BorshSerialize,
    BorshDeserialize,
)]
pub struct EthAddress(pub [u8; ETH_ADDRESS_LEN]);

/// Errors returned when parsing an [`EthAddress`] from a string
#[derive(Clone, Debug, Eq, Error, PartialEq)]
pub enum AddressParseError {
    /// Not 40 hex digits after the optional `0x` prefix
    #[error("address must be 40 hex digits, got {0}")]
    InvalidLength(usize),
    /// Contains a character outside `[0-9a-fA-F]`
    #[error("address is not valid hex")]
    InvalidHex,
    /// Mixed-case address whose casing does not match its EIP-55 checksum
    #[error("address has an invalid EIP-55 checksum")]
    BadChecksum,
}

impl EthAddress {
    /// Derive the address of an uncompressed secp256k1 public key (without
    /// the `0x04` tag byte).
    pub fn from_public_key(public_key: &[u8; 64]) -> Self {
        Self::from_hash(keccak::hash(public_key).to_bytes())
    }

    /// Derive a 20-byte identity for a Solana account, used to bind voucher
    /// signatures to one registry deployment.
    pub fn from_pubkey(pubkey: &Pubkey) -> Self {
        Self::from_hash(keccak::hash(pubkey.as_ref()).to_bytes())
    }

    fn from_hash(hash: [u8; 32]) -> Self {
        let mut address = [0u8; ETH_ADDRESS_LEN];
        address.copy_from_slice(&hash[12..]);
        Self(address)
    }

    /// The EIP-55 mixed-case checksum encoding, `0x` prefixed
    pub fn to_checksum(&self) -> String {
        let lower = hex::encode(self.0);
        let hash = keccak::hash(lower.as_bytes()).to_bytes();
        let mut out = String::with_capacity(2 + lower.len());
        out.push_str("0x");
        for (i, c) in lower.chars().enumerate() {
            let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
            if c.is_ascii_alphabetic() && nibble >= 8 {
                out.push(c.to_ascii_uppercase());
            } else {
                out.push(c);
            }
        }
        out
    }
}

impl AsRef<[u8]> for EthAddress {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; ETH_ADDRESS_LEN]> for EthAddress {
    fn from(bytes: [u8; ETH_ADDRESS_LEN]) -> Self {
        Self(bytes)
    }
}

impl FromStr for EthAddress {
    type Err = AddressParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s
            .strip_prefix("0x")
            .or_else(|| s.strip_prefix("0X"))
            .unwrap_or(s);
        if digits.len() != 2 * ETH_ADDRESS_LEN {
            return Err(AddressParseError::InvalidLength(digits.len()));
        }
        let mut address = [0u8; ETH_ADDRESS_LEN];
        hex::decode_to_slice(digits, &mut address).map_err(|_| AddressParseError::InvalidHex)?;
        let address = Self(address);

        let has_lower = digits.chars().any(|c| c.is_ascii_lowercase());
        let has_upper = digits.chars().any(|c| c.is_ascii_uppercase());
        if has_lower && has_upper && address.to_checksum()[2..] != *digits {
            return Err(AddressParseError::BadChecksum);
        }
        Ok(address)
    }
}

impl fmt::Display for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_checksum())
    }
}

impl fmt::Debug for EthAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EthAddress({})", self.to_checksum())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // EIP-55 reference vectors
    const CHECKSUMMED: [&str; 4] = [
        "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed",
        "0xfB6916095ca1df60bB79Ce92cE3Ea74c37c5d359",
        "0xdbF03B407c01E7cD3CBea99509d93f8DDDC8C6FB",
        "0xD1220A0cf47c7B9Be7A2E6BA89F429762e7b9aDb",
    ];

    #[test]
    fn checksum_round_trip() {
        for s in CHECKSUMMED {
            let address = EthAddress::from_str(s).unwrap();
            assert_eq!(address.to_string(), s);
        }
    }

    #[test]
    fn parse_is_case_insensitive() {
        for s in CHECKSUMMED {
            let canonical = EthAddress::from_str(s).unwrap();
            assert_eq!(EthAddress::from_str(&s.to_lowercase()).unwrap(), canonical);
            let upper = format!("0x{}", s[2..].to_uppercase());
            assert_eq!(EthAddress::from_str(&upper).unwrap(), canonical);
            assert_eq!(EthAddress::from_str(&s[2..]).unwrap(), canonical);
        }
    }

    #[test]
    fn parse_rejects_bad_checksum() {
        // flip the case of the first letter of a checksummed address
        let bad = "0x5AAeb6053F3E94C9b9A09f33669435E7Ef1BeAed";
        assert_eq!(
            EthAddress::from_str(bad).unwrap_err(),
            AddressParseError::BadChecksum
        );
    }

    #[test]
    fn parse_rejects_malformed() {
        assert_eq!(
            EthAddress::from_str("0x1234").unwrap_err(),
            AddressParseError::InvalidLength(4)
        );
        assert_eq!(
            EthAddress::from_str("0xzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzzz").unwrap_err(),
            AddressParseError::InvalidHex
        );
    }

    #[test]
    fn public_key_derivation() {
        let secret = libsecp256k1::SecretKey::parse(&[7u8; 32]).unwrap();
        let public = libsecp256k1::PublicKey::from_secret_key(&secret).serialize();
        let mut key = [0u8; 64];
        key.copy_from_slice(&public[1..]);
        let address = EthAddress::from_public_key(&key);
        assert_eq!(
            address.0[..],
            keccak::hash(&public[1..]).to_bytes()[12..]
        );
    }
}
