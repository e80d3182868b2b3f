//! Error types

use {
    num_derive::FromPrimitive,
    solana_program::{
        decode_error::DecodeError,
        msg,
        program_error::{PrintProgramError, ProgramError},
    },
    thiserror::Error,
};

/// Errors that may be returned by the LazyMint program.
#[derive(Clone, Copy, Debug, Eq, Error, FromPrimitive, PartialEq)]
pub enum LazyMintError {
    // 0.
    /// Caller does not hold the role the operation requires.
    #[error("Unauthorized")]
    Unauthorized,
    /// The registry is paused.
    #[error("Paused")]
    Paused,
    /// The registry is already in the requested pause state.
    #[error("InvalidState")]
    InvalidState,
    /// An asset record already exists for the asset id.
    #[error("AlreadyMinted")]
    AlreadyMinted,
    /// Voucher signature is malformed and no signer can be recovered.
    #[error("InvalidSignature")]
    InvalidSignature,

    // 5.
    /// Voucher signer is not in the current issuer allowlist.
    #[error("NotAuthorized")]
    NotAuthorized,
    /// Payment is below the effective price floor.
    #[error("InsufficientFunds")]
    InsufficientFunds,
    /// Payment meets the registry minimum but not the voucher's own price.
    #[error("BelowMinimumPrice")]
    BelowMinimumPrice,
    /// Registry account is already initialized.
    #[error("AlreadyInitialized")]
    AlreadyInitialized,
    /// Registry account is not owned by the program, too small, or
    /// uninitialized.
    #[error("InvalidRegistryAccount")]
    InvalidRegistryAccount,

    // 10
    /// Provided asset account does not match the address derived from the
    /// registry and asset id.
    #[error("InvalidAssetAccount")]
    InvalidAssetAccount,
    /// Treasury is not the recorded one, or cannot hold a withdrawal.
    #[error("InvalidTreasuryAccount")]
    InvalidTreasuryAccount,
    /// A role already has the maximum number of holders.
    #[error("RoleCapacityExceeded")]
    RoleCapacityExceeded,
    /// Voucher URI does not fit in an asset record.
    #[error("UriTooLong")]
    UriTooLong,
    /// Lamport arithmetic overflowed.
    #[error("Overflow")]
    Overflow,
}
impl From<LazyMintError> for ProgramError {
    fn from(e: LazyMintError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
impl<T> DecodeError<T> for LazyMintError {
    fn type_of() -> &'static str {
        "Lazy Mint Error"
    }
}
impl PrintProgramError for LazyMintError {
    fn print<E>(&self)
    where
        E: 'static
            + std::error::Error
            + DecodeError<E>
            + PrintProgramError
            + num_traits::FromPrimitive,
    {
        match self {
            LazyMintError::Unauthorized => msg!("Error: Caller is missing the required role."),
            LazyMintError::Paused => msg!("Error: Registry is paused."),
            LazyMintError::InvalidState => {
                msg!("Error: Registry is already in the requested pause state.")
            }
            LazyMintError::AlreadyMinted => msg!("Error: Asset id has already been minted."),
            LazyMintError::InvalidSignature => msg!("Error: Voucher signature is malformed."),
            LazyMintError::NotAuthorized => {
                msg!("Error: Voucher signer is not an allowlisted issuer.")
            }
            LazyMintError::InsufficientFunds => msg!("Error: Insufficient funds to redeem."),
            LazyMintError::BelowMinimumPrice => {
                msg!("Error: Payment is below the voucher's minimum price.")
            }
            LazyMintError::AlreadyInitialized => msg!("Error: Registry is already initialized."),
            LazyMintError::InvalidRegistryAccount => msg!(
                "Error: Registry account is not owned by the program, too small, or uninitialized."
            ),
            LazyMintError::InvalidAssetAccount => msg!(
                "Error: Asset account does not match the address derived from the registry and asset id."
            ),
            LazyMintError::InvalidTreasuryAccount => {
                msg!("Error: Treasury is not the registry treasury or is not rent-exempt.")
            }
            LazyMintError::RoleCapacityExceeded => {
                msg!("Error: Role already has the maximum number of holders.")
            }
            LazyMintError::UriTooLong => msg!("Error: Voucher URI is too long."),
            LazyMintError::Overflow => msg!("Error: Lamport arithmetic overflowed."),
        }
    }
}
