//! Events logged by the program.
//!
//! Each event is written twice: as a human-readable `msg!` line and as the
//! borsh encoding of [`LazyMintEvent`] through `sol_log_data`, which indexers
//! pick up from the transaction's `Program data:` log entries.

use {
    crate::{access::Role, address::EthAddress, merkle::Node},
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{log::sol_log_data, msg, pubkey::Pubkey},
};

/// Event emitted by a successful instruction
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum LazyMintEvent {
    /// An asset was created from a voucher or by a minter
    Redeemed {
        /// Issuer that authorized the asset
        issuer: EthAddress,
        /// Owner of the new asset
        recipient: Pubkey,
        /// Asset id
        asset_id: u64,
        /// Lamports paid
        amount: u64,
    },
    /// An asset record was created with its issuer as first owner
    Minted {
        /// Asset id
        asset_id: u64,
        /// Issuer that authorized the asset
        creator: EthAddress,
    },
    /// Ownership moved from the issuer to the recipient
    Transferred {
        /// Asset id
        asset_id: u64,
        /// Previous owner
        from: EthAddress,
        /// New owner
        to: Pubkey,
    },
    /// The treasury balance was swept
    Withdrawn {
        /// Treasury account
        recipient: Pubkey,
        /// Lamports moved
        amount: u64,
    },
    /// A new allowlist root was published
    RootUpdated {
        /// The new root
        root: Node,
    },
    /// A role was granted
    RoleGranted {
        /// Role
        role: Role,
        /// New holder
        holder: Pubkey,
    },
    /// A role was revoked or renounced
    RoleRevoked {
        /// Role
        role: Role,
        /// Former holder
        holder: Pubkey,
    },
    /// The registry was paused
    Paused,
    /// The registry was unpaused
    Unpaused,
    /// The registry minimum price changed
    MinimumPriceUpdated {
        /// New minimum, in lamports
        minimum_price: u64,
    },
}

impl LazyMintEvent {
    /// Logs the event
    pub fn emit(&self) {
        match self {
            Self::Redeemed {
                issuer,
                recipient,
                asset_id,
                amount,
            } => msg!(
                "Redeemed: asset {} from {} to {} for {} lamports",
                asset_id,
                issuer,
                recipient,
                amount
            ),
            Self::Minted { asset_id, creator } => msg!("Minted: asset {} to {}", asset_id, creator),
            Self::Transferred { asset_id, from, to } => {
                msg!("Transferred: asset {} from {} to {}", asset_id, from, to)
            }
            Self::Withdrawn { recipient, amount } => {
                msg!("Withdrawn: {} lamports to {}", amount, recipient)
            }
            Self::RootUpdated { root } => msg!("RootUpdated: {}", hex::encode(root)),
            Self::RoleGranted { role, holder } => msg!("RoleGranted: {} to {}", role, holder),
            Self::RoleRevoked { role, holder } => msg!("RoleRevoked: {} from {}", role, holder),
            Self::Paused => msg!("Paused"),
            Self::Unpaused => msg!("Unpaused"),
            Self::MinimumPriceUpdated { minimum_price } => {
                msg!("MinimumPriceUpdated: {} lamports", minimum_price)
            }
        }
        if let Ok(data) = borsh::to_vec(self) {
            sol_log_data(&[&data]);
        }
    }
}

/// Events for one asset creation, in the order they are emitted
pub fn issuance_events(
    issuer: &EthAddress,
    recipient: &Pubkey,
    asset_id: u64,
    amount: u64,
) -> [LazyMintEvent; 3] {
    [
        LazyMintEvent::Minted {
            asset_id,
            creator: *issuer,
        },
        LazyMintEvent::Transferred {
            asset_id,
            from: *issuer,
            to: *recipient,
        },
        LazyMintEvent::Redeemed {
            issuer: *issuer,
            recipient: *recipient,
            asset_id,
            amount,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issuance_emits_creation_then_transfer_then_redemption() {
        let issuer = EthAddress([3; 20]);
        let recipient = Pubkey::new_unique();
        let events = issuance_events(&issuer, &recipient, 9, 40);
        assert!(matches!(events[0], LazyMintEvent::Minted { asset_id: 9, .. }));
        assert!(matches!(events[1], LazyMintEvent::Transferred { to, .. } if to == recipient));
        assert_eq!(
            events[2],
            LazyMintEvent::Redeemed {
                issuer,
                recipient,
                asset_id: 9,
                amount: 40,
            }
        );
    }

    #[test]
    fn event_decodes_from_log_data() {
        let event = LazyMintEvent::RoleGranted {
            role: Role::Maintenance,
            holder: Pubkey::new_unique(),
        };
        let data = borsh::to_vec(&event).unwrap();
        assert_eq!(LazyMintEvent::try_from_slice(&data).unwrap(), event);
        // emitting outside the runtime only writes to the test logger
        event.emit();
    }
}
