//! Program state processor

use {
    crate::{
        access::Role,
        address::EthAddress,
        engine::{self, Issuance},
        error::LazyMintError,
        events::{issuance_events, LazyMintEvent},
        find_asset_address_and_bump,
        instruction::LazyMintInstruction,
        merkle::Node,
        state::{AssetRecord, LazyMintAccountType, Registry},
        voucher::{Voucher, VoucherDomain},
        ASSET_PREFIX,
    },
    borsh::BorshDeserialize,
    solana_program::{
        account_info::{next_account_info, AccountInfo},
        borsh1::try_from_slice_unchecked,
        entrypoint::ProgramResult,
        msg,
        program::{invoke, invoke_signed},
        program_error::ProgramError,
        pubkey::Pubkey,
        rent::Rent,
        system_instruction, system_program,
        sysvar::Sysvar,
    },
};

/// Check that the account signed the transaction
fn check_signer(account_info: &AccountInfo) -> Result<(), ProgramError> {
    if !account_info.is_signer {
        msg!("Expected {} to sign the transaction", account_info.key);
        Err(ProgramError::MissingRequiredSignature)
    } else {
        Ok(())
    }
}

/// Check system program address
fn check_system_program(program_id: &Pubkey) -> Result<(), ProgramError> {
    if *program_id != system_program::id() {
        msg!(
            "Expected system program {}, received {}",
            system_program::id(),
            program_id
        );
        Err(ProgramError::IncorrectProgramId)
    } else {
        Ok(())
    }
}

/// Check the asset account address, returning its bump seed
fn check_asset_address(
    program_id: &Pubkey,
    registry_address: &Pubkey,
    asset_id: u64,
    asset_info: &AccountInfo,
) -> Result<u8, ProgramError> {
    let (address, bump_seed) =
        find_asset_address_and_bump(program_id, registry_address, asset_id);
    if address != *asset_info.key {
        msg!(
            "Incorrect asset address for asset {}: expected {}, received {}",
            asset_id,
            address,
            asset_info.key
        );
        Err(LazyMintError::InvalidAssetAccount.into())
    } else {
        Ok(bump_seed)
    }
}

/// Check that the treasury can receive any withdrawal: a separate account
/// that already holds its rent-exempt reserve
fn check_treasury_account(
    registry_info: &AccountInfo,
    treasury_info: &AccountInfo,
) -> Result<(), ProgramError> {
    if treasury_info.key == registry_info.key {
        msg!("Treasury cannot be the registry account");
        return Err(LazyMintError::InvalidTreasuryAccount.into());
    }
    let rent = Rent::get()?;
    if !rent.is_exempt(treasury_info.lamports(), treasury_info.data_len()) {
        msg!(
            "Treasury {} holds {} lamports, rent exemption needs {}",
            treasury_info.key,
            treasury_info.lamports(),
            rent.minimum_balance(treasury_info.data_len())
        );
        return Err(LazyMintError::InvalidTreasuryAccount.into());
    }
    Ok(())
}

/// Allocate and assign the asset account, topping up lamports that were sent
/// to the address ahead of time
fn create_asset_account<'a>(
    program_id: &Pubkey,
    payer_info: &AccountInfo<'a>,
    asset_info: &AccountInfo<'a>,
    system_program_info: &AccountInfo<'a>,
    asset_seeds: &[&[u8]],
) -> ProgramResult {
    let rent = Rent::get()?;
    let required_lamports = rent.minimum_balance(AssetRecord::LEN).max(1);

    if asset_info.lamports() > 0 {
        let top_up = required_lamports.saturating_sub(asset_info.lamports());
        if top_up > 0 {
            invoke(
                &system_instruction::transfer(payer_info.key, asset_info.key, top_up),
                &[
                    payer_info.clone(),
                    asset_info.clone(),
                    system_program_info.clone(),
                ],
            )?;
        }
        invoke_signed(
            &system_instruction::allocate(asset_info.key, AssetRecord::LEN as u64),
            &[asset_info.clone(), system_program_info.clone()],
            &[asset_seeds],
        )?;
        invoke_signed(
            &system_instruction::assign(asset_info.key, program_id),
            &[asset_info.clone(), system_program_info.clone()],
            &[asset_seeds],
        )
    } else {
        invoke_signed(
            &system_instruction::create_account(
                payer_info.key,
                asset_info.key,
                required_lamports,
                AssetRecord::LEN as u64,
                program_id,
            ),
            &[
                payer_info.clone(),
                asset_info.clone(),
                system_program_info.clone(),
            ],
            &[asset_seeds],
        )
    }
}

/// Program state handler.
pub struct Processor {}
impl Processor {
    /// Loads the registry and checks that `authority` signed and holds `role`
    fn load_registry_as(
        program_id: &Pubkey,
        registry_info: &AccountInfo,
        authority_info: &AccountInfo,
        role: Role,
    ) -> Result<Registry, ProgramError> {
        check_signer(authority_info)?;
        let registry = Registry::from_account_info(registry_info, program_id)?;
        registry.roles.require_role(role, authority_info.key)?;
        Ok(registry)
    }

    fn process_initialize(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        chain_id: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let deployer_info = next_account_info(account_info_iter)?;
        let treasury_info = next_account_info(account_info_iter)?;

        check_signer(deployer_info)?;
        if registry_info.owner != program_id || registry_info.data_len() < Registry::LEN {
            return Err(LazyMintError::InvalidRegistryAccount.into());
        }
        let existing = try_from_slice_unchecked::<Registry>(&registry_info.data.borrow())?;
        if existing.account_type != LazyMintAccountType::Uninitialized {
            return Err(LazyMintError::AlreadyInitialized.into());
        }
        check_treasury_account(registry_info, treasury_info)?;

        let registry = Registry::new(deployer_info.key, chain_id, treasury_info.key);
        registry.save(registry_info)?;
        for role in [Role::Admin, Role::Minter, Role::Maintenance] {
            LazyMintEvent::RoleGranted {
                role,
                holder: *deployer_info.key,
            }
            .emit();
        }
        Ok(())
    }

    fn process_update_membership_root(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        root: Node,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let maintainer_info = next_account_info(account_info_iter)?;

        let mut registry =
            Self::load_registry_as(program_id, registry_info, maintainer_info, Role::Maintenance)?;
        registry.require_active()?;

        registry.merkle_root = root;
        registry.save(registry_info)?;
        LazyMintEvent::RootUpdated { root }.emit();
        Ok(())
    }

    fn process_grant_role(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        role: Role,
        holder: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let admin_info = next_account_info(account_info_iter)?;

        let mut registry =
            Self::load_registry_as(program_id, registry_info, admin_info, Role::Admin)?;
        if registry.roles.grant(role, holder)? {
            registry.save(registry_info)?;
            LazyMintEvent::RoleGranted {
                role,
                holder: *holder,
            }
            .emit();
        }
        Ok(())
    }

    fn process_revoke_role(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        role: Role,
        holder: &Pubkey,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let admin_info = next_account_info(account_info_iter)?;

        let mut registry =
            Self::load_registry_as(program_id, registry_info, admin_info, Role::Admin)?;
        if registry.roles.revoke(role, holder) {
            registry.save(registry_info)?;
            LazyMintEvent::RoleRevoked {
                role,
                holder: *holder,
            }
            .emit();
        }
        Ok(())
    }

    fn process_renounce_role(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        role: Role,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let holder_info = next_account_info(account_info_iter)?;

        check_signer(holder_info)?;
        let mut registry = Registry::from_account_info(registry_info, program_id)?;
        if registry.roles.revoke(role, holder_info.key) {
            registry.save(registry_info)?;
            LazyMintEvent::RoleRevoked {
                role,
                holder: *holder_info.key,
            }
            .emit();
        }
        Ok(())
    }

    /// Performs the writes of an authorized issuance: payment, asset account
    /// and registry. Nothing here may fail for a reason the checks could have
    /// caught.
    #[allow(clippy::too_many_arguments)]
    fn commit_issuance<'a>(
        program_id: &Pubkey,
        registry_info: &AccountInfo<'a>,
        mut registry: Registry,
        asset_info: &AccountInfo<'a>,
        asset_bump: u8,
        payer_info: &AccountInfo<'a>,
        system_program_info: &AccountInfo<'a>,
        issuance: Issuance,
    ) -> ProgramResult {
        registry.record_payment(issuance.payment)?;

        if issuance.payment > 0 {
            invoke(
                &system_instruction::transfer(payer_info.key, registry_info.key, issuance.payment),
                &[
                    payer_info.clone(),
                    registry_info.clone(),
                    system_program_info.clone(),
                ],
            )?;
        }

        let asset_id_bytes = issuance.asset_id.to_le_bytes();
        let asset_seeds: &[&[u8]] = &[
            ASSET_PREFIX,
            registry_info.key.as_ref(),
            &asset_id_bytes,
            &[asset_bump],
        ];
        create_asset_account(
            program_id,
            payer_info,
            asset_info,
            system_program_info,
            asset_seeds,
        )?;

        let events = issuance_events(
            &issuance.issuer,
            &issuance.recipient,
            issuance.asset_id,
            issuance.payment,
        );
        let record = issuance.into_record(registry_info.key);
        borsh::to_writer(&mut asset_info.data.borrow_mut()[..], &record)?;
        registry.save(registry_info)?;

        for event in &events {
            event.emit();
        }
        Ok(())
    }

    fn process_redeem(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        voucher: Voucher,
        signature: Vec<u8>,
        proof: Vec<Node>,
        payment: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let asset_info = next_account_info(account_info_iter)?;
        let recipient_info = next_account_info(account_info_iter)?;
        let payer_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        check_signer(payer_info)?;
        check_system_program(system_program_info.key)?;
        let registry = Registry::from_account_info(registry_info, program_id)?;
        let asset_bump =
            check_asset_address(program_id, registry_info.key, voucher.asset_id, asset_info)?;

        let domain = VoucherDomain::new(registry.chain_id, registry_info.key);
        let issuance = engine::authorize_redemption(
            &registry,
            &domain,
            asset_info.owner == program_id,
            recipient_info.key,
            &voucher,
            &signature,
            &proof,
            payment,
        )?;

        Self::commit_issuance(
            program_id,
            registry_info,
            registry,
            asset_info,
            asset_bump,
            payer_info,
            system_program_info,
            issuance,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn process_direct_issue(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        issuer: &EthAddress,
        min_price: u64,
        asset_id: u64,
        uri: &str,
        payment: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let asset_info = next_account_info(account_info_iter)?;
        let recipient_info = next_account_info(account_info_iter)?;
        let minter_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        check_signer(minter_info)?;
        check_system_program(system_program_info.key)?;
        let registry = Registry::from_account_info(registry_info, program_id)?;
        let asset_bump = check_asset_address(program_id, registry_info.key, asset_id, asset_info)?;

        let issuance = engine::authorize_direct_issue(
            &registry,
            minter_info.key,
            asset_info.owner == program_id,
            recipient_info.key,
            issuer,
            min_price,
            asset_id,
            uri,
            payment,
        )?;

        Self::commit_issuance(
            program_id,
            registry_info,
            registry,
            asset_info,
            asset_bump,
            minter_info,
            system_program_info,
            issuance,
        )
    }

    fn process_set_minimum_price(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        minimum_price: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let admin_info = next_account_info(account_info_iter)?;

        let mut registry =
            Self::load_registry_as(program_id, registry_info, admin_info, Role::Admin)?;
        registry.minimum_price = minimum_price;
        registry.save(registry_info)?;
        LazyMintEvent::MinimumPriceUpdated { minimum_price }.emit();
        Ok(())
    }

    fn process_withdraw_all(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let treasury_info = next_account_info(account_info_iter)?;
        let admin_info = next_account_info(account_info_iter)?;

        let mut registry =
            Self::load_registry_as(program_id, registry_info, admin_info, Role::Admin)?;
        registry.require_active()?;
        if registry.treasury != *treasury_info.key {
            msg!(
                "Expected treasury {}, received {}",
                registry.treasury,
                treasury_info.key
            );
            return Err(LazyMintError::InvalidTreasuryAccount.into());
        }

        let amount = registry.treasury_balance;
        let registry_lamports = registry_info
            .lamports()
            .checked_sub(amount)
            .ok_or(LazyMintError::Overflow)?;
        let treasury_lamports = treasury_info
            .lamports()
            .checked_add(amount)
            .ok_or(LazyMintError::Overflow)?;

        registry.take_treasury_balance();
        registry.save(registry_info)?;
        **registry_info.try_borrow_mut_lamports()? = registry_lamports;
        **treasury_info.try_borrow_mut_lamports()? = treasury_lamports;

        LazyMintEvent::Withdrawn {
            recipient: *treasury_info.key,
            amount,
        }
        .emit();
        Ok(())
    }

    fn process_set_paused(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        paused: bool,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let registry_info = next_account_info(account_info_iter)?;
        let admin_info = next_account_info(account_info_iter)?;

        let mut registry =
            Self::load_registry_as(program_id, registry_info, admin_info, Role::Admin)?;
        if paused {
            registry.pause()?;
        } else {
            registry.unpause()?;
        }
        registry.save(registry_info)?;
        if paused {
            LazyMintEvent::Paused.emit();
        } else {
            LazyMintEvent::Unpaused.emit();
        }
        Ok(())
    }

    /// Processes [Instruction](enum.Instruction.html).
    pub fn process(program_id: &Pubkey, accounts: &[AccountInfo], input: &[u8]) -> ProgramResult {
        let instruction = LazyMintInstruction::try_from_slice(input)?;
        match instruction {
            LazyMintInstruction::Initialize { chain_id } => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts, chain_id)
            }
            LazyMintInstruction::UpdateMembershipRoot { root } => {
                msg!("Instruction: UpdateMembershipRoot");
                Self::process_update_membership_root(program_id, accounts, root)
            }
            LazyMintInstruction::GrantRole { role, holder } => {
                msg!("Instruction: GrantRole");
                Self::process_grant_role(program_id, accounts, role, &holder)
            }
            LazyMintInstruction::RevokeRole { role, holder } => {
                msg!("Instruction: RevokeRole");
                Self::process_revoke_role(program_id, accounts, role, &holder)
            }
            LazyMintInstruction::AddMaintenance { holder } => {
                msg!("Instruction: AddMaintenance");
                Self::process_grant_role(program_id, accounts, Role::Maintenance, &holder)
            }
            LazyMintInstruction::RenounceRole { role } => {
                msg!("Instruction: RenounceRole");
                Self::process_renounce_role(program_id, accounts, role)
            }
            LazyMintInstruction::Redeem {
                voucher,
                signature,
                proof,
                payment,
            } => {
                msg!("Instruction: Redeem");
                Self::process_redeem(program_id, accounts, voucher, signature, proof, payment)
            }
            LazyMintInstruction::DirectIssue {
                issuer,
                min_price,
                asset_id,
                uri,
                payment,
            } => {
                msg!("Instruction: DirectIssue");
                Self::process_direct_issue(
                    program_id, accounts, &issuer, min_price, asset_id, &uri, payment,
                )
            }
            LazyMintInstruction::SetMinimumPrice { minimum_price } => {
                msg!("Instruction: SetMinimumPrice");
                Self::process_set_minimum_price(program_id, accounts, minimum_price)
            }
            LazyMintInstruction::WithdrawAll => {
                msg!("Instruction: WithdrawAll");
                Self::process_withdraw_all(program_id, accounts)
            }
            LazyMintInstruction::Pause => {
                msg!("Instruction: Pause");
                Self::process_set_paused(program_id, accounts, true)
            }
            LazyMintInstruction::Unpause => {
                msg!("Instruction: Unpause");
                Self::process_set_paused(program_id, accounts, false)
            }
        }
    }
}
