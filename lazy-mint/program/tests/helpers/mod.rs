#![allow(dead_code)] // needed because cargo doesn't understand test usage

use {
    solana_program_test::*,
    solana_sdk::{
        account::Account as SolanaAccount,
        account_info::IntoAccountInfo,
        instruction::{Instruction, InstructionError},
        program_error::ProgramError,
        pubkey::Pubkey,
        signature::{Keypair, Signer},
        system_instruction,
        transaction::{Transaction, TransactionError},
    },
    spl_lazy_mint::{
        address::EthAddress,
        find_asset_address, id, instruction,
        merkle::MembershipTree,
        processor::Processor,
        solana_program::borsh1::try_from_slice_unchecked,
        state::{AssetRecord, Registry},
        voucher::{Voucher, VoucherDomain},
    },
};

pub const CHAIN_ID: u64 = 31337;
pub const USER_STARTING_LAMPORTS: u64 = 10_000_000_000; // 10 sol

pub fn program_test() -> ProgramTest {
    let mut program_test = ProgramTest::default();
    program_test.add_program("spl_lazy_mint", id(), processor!(Processor::process));
    program_test.prefer_bpf(false);
    program_test
}

pub fn issuer_secret(seed: u8) -> libsecp256k1::SecretKey {
    libsecp256k1::SecretKey::parse(&[seed; 32]).unwrap()
}

pub fn issuer_address(secret: &libsecp256k1::SecretKey) -> EthAddress {
    let public = libsecp256k1::PublicKey::from_secret_key(secret).serialize();
    let mut key = [0u8; 64];
    key.copy_from_slice(&public[1..]);
    EthAddress::from_public_key(&key)
}

/// `r || s || v` signature over a voucher for one registry, v in {27, 28}
pub fn sign_voucher(
    secret: &libsecp256k1::SecretKey,
    voucher: &Voucher,
    registry: &Pubkey,
) -> Vec<u8> {
    let domain = VoucherDomain::new(CHAIN_ID, registry);
    let message = libsecp256k1::Message::parse(&voucher.signing_digest(&domain));
    let (signature, recovery_id) = libsecp256k1::sign(&message, secret);
    let mut out = signature.serialize().to_vec();
    out.push(recovery_id.serialize() + 27);
    out
}

pub fn voucher(asset_id: u64, min_price: u64, uri: &str) -> Voucher {
    Voucher {
        asset_id,
        min_price,
        uri: uri.to_string(),
    }
}

pub async fn process(
    context: &mut ProgramTestContext,
    instructions: &[Instruction],
    signers: &[&Keypair],
) -> Result<(), BanksClientError> {
    let mut all_signers = vec![&context.payer];
    all_signers.extend_from_slice(signers);
    let transaction = Transaction::new_signed_with_payer(
        instructions,
        Some(&context.payer.pubkey()),
        &all_signers,
        context.last_blockhash,
    );
    context.banks_client.process_transaction(transaction).await
}

pub async fn get_account(banks_client: &mut BanksClient, pubkey: &Pubkey) -> SolanaAccount {
    banks_client
        .get_account(*pubkey)
        .await
        .expect("client error")
        .expect("account not found")
}

pub async fn create_funded_keypair(context: &mut ProgramTestContext) -> Keypair {
    let keypair = Keypair::new();
    let transfer = system_instruction::transfer(
        &context.payer.pubkey(),
        &keypair.pubkey(),
        USER_STARTING_LAMPORTS,
    );
    process(context, &[transfer], &[]).await.unwrap();
    keypair
}

pub fn check_error<T: Into<ProgramError>>(got: BanksClientError, expected: T) {
    let expected: ProgramError = expected.into();
    match got.unwrap() {
        TransactionError::InstructionError(_, InstructionError::Custom(code)) => {
            assert_eq!(ProgramError::Custom(code), expected)
        }
        TransactionError::InstructionError(_, e) => {
            let got: ProgramError = e.try_into().unwrap();
            assert_eq!(got, expected)
        }
        e => panic!("unexpected transaction error {:?}", e),
    }
}

/// A registry whose allowlist holds issuers 1, 2 and 3
pub struct RegistryAccounts {
    pub registry: Keypair,
    pub admin: Keypair,
    pub treasury: Pubkey,
    pub tree: MembershipTree,
}

impl RegistryAccounts {
    pub fn new() -> Self {
        let members: Vec<EthAddress> = (1..=3)
            .map(|seed| issuer_address(&issuer_secret(seed)))
            .collect();
        Self {
            registry: Keypair::new(),
            admin: Keypair::new(),
            treasury: Pubkey::new_unique(),
            tree: MembershipTree::new(&members),
        }
    }

    pub fn registry_key(&self) -> Pubkey {
        self.registry.pubkey()
    }

    /// Funds the treasury, creates and initializes the registry, publishes the
    /// allowlist root and sets the registry minimum price
    pub async fn initialize(&self, context: &mut ProgramTestContext, minimum_price: u64) {
        let rent = context.banks_client.get_rent().await.unwrap();
        let instructions = [
            system_instruction::transfer(
                &context.payer.pubkey(),
                &self.treasury,
                rent.minimum_balance(0),
            ),
            system_instruction::create_account(
                &context.payer.pubkey(),
                &self.registry.pubkey(),
                rent.minimum_balance(Registry::LEN),
                Registry::LEN as u64,
                &id(),
            ),
            instruction::initialize(
                &self.registry.pubkey(),
                &self.admin.pubkey(),
                CHAIN_ID,
                &self.treasury,
            ),
            instruction::update_membership_root(
                &self.registry.pubkey(),
                &self.admin.pubkey(),
                self.tree.root(),
            ),
            instruction::set_minimum_price(
                &self.registry.pubkey(),
                &self.admin.pubkey(),
                minimum_price,
            ),
        ];
        process(context, &instructions, &[&self.registry, &self.admin])
            .await
            .unwrap();
    }

    pub fn proof(&self, secret: &libsecp256k1::SecretKey) -> Vec<[u8; 32]> {
        self.tree.proof(&issuer_address(secret)).unwrap_or_default()
    }

    pub fn redeem_instruction(
        &self,
        issuer: &libsecp256k1::SecretKey,
        voucher: Voucher,
        recipient: &Pubkey,
        payer: &Pubkey,
        payment: u64,
    ) -> Instruction {
        let signature = sign_voucher(issuer, &voucher, &self.registry.pubkey());
        instruction::redeem(
            &self.registry.pubkey(),
            recipient,
            payer,
            voucher,
            signature,
            self.proof(issuer),
            payment,
        )
    }

    pub async fn registry_state(&self, banks_client: &mut BanksClient) -> Registry {
        let account = get_account(banks_client, &self.registry.pubkey()).await;
        try_from_slice_unchecked::<Registry>(&account.data).unwrap()
    }

    /// Loads an asset record the way the program does, failing for an id that
    /// was never minted
    pub async fn asset(
        &self,
        banks_client: &mut BanksClient,
        asset_id: u64,
    ) -> Result<AssetRecord, ProgramError> {
        let address = find_asset_address(&id(), &self.registry.pubkey(), asset_id);
        let mut account = banks_client
            .get_account(address)
            .await
            .unwrap()
            .unwrap_or_default();
        let account_info = (&address, &mut account).into_account_info();
        AssetRecord::from_account_info(&account_info, &id())
    }
}
