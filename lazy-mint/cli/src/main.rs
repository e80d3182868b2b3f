//! Offline companion for lazy mint registries: publishes allowlist roots,
//! hands out issuer proofs and computes voucher digests.

use {
    anyhow::{anyhow, bail, Context, Result},
    clap::{Parser, Subcommand},
    solana_program::pubkey::Pubkey,
    spl_lazy_mint::{
        address::EthAddress,
        find_asset_address,
        merkle::{self, MembershipTree, Node},
        voucher::{Voucher, VoucherDomain},
    },
    std::{
        fs,
        path::{Path, PathBuf},
    },
};

#[derive(Parser)]
#[clap(name = "spl-lazy-mint", version, about = "Lazy mint allowlist and voucher tooling")]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the allowlist root of a JSON array of issuer addresses
    Root {
        /// JSON file holding the issuer addresses
        addresses: PathBuf,
    },
    /// Print the membership proof of one issuer as a JSON array
    Proof {
        /// JSON file holding the issuer addresses
        addresses: PathBuf,
        /// Issuer to prove
        address: EthAddress,
    },
    /// Check a membership proof against a root
    Verify {
        /// Allowlist root, hex encoded
        root: String,
        /// Issuer address
        address: EthAddress,
        /// JSON array of hex encoded proof nodes
        proof: String,
    },
    /// Print the EIP-712 digest an issuer signs for a voucher
    Digest {
        #[clap(long)]
        chain_id: u64,
        /// Registry account the voucher is redeemable against
        #[clap(long)]
        registry: Pubkey,
        #[clap(long)]
        asset_id: u64,
        /// Lowest accepted payment, in lamports
        #[clap(long)]
        min_price: u64,
        /// Metadata locator without the `ipfs://` prefix
        #[clap(long)]
        uri: String,
    },
    /// Print the asset record address of an asset id
    Pda {
        #[clap(long)]
        registry: Pubkey,
        #[clap(long)]
        asset_id: u64,
        #[clap(long, default_value_t = spl_lazy_mint::id())]
        program_id: Pubkey,
    },
}

fn encode_node(node: &Node) -> String {
    format!("0x{}", hex::encode(node))
}

fn parse_node(s: &str) -> Result<Node> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let mut node = [0u8; 32];
    hex::decode_to_slice(digits, &mut node).with_context(|| format!("invalid node {}", s))?;
    Ok(node)
}

fn parse_addresses(json: &str) -> Result<Vec<EthAddress>> {
    let entries: Vec<String> =
        serde_json::from_str(json).context("expected a JSON array of address strings")?;
    entries
        .iter()
        .map(|entry| {
            entry
                .parse::<EthAddress>()
                .with_context(|| format!("invalid address {}", entry))
        })
        .collect()
}

fn read_addresses(path: &Path) -> Result<Vec<EthAddress>> {
    let json = fs::read_to_string(path)
        .with_context(|| format!("unable to read {}", path.display()))?;
    parse_addresses(&json)
}

fn command_root(addresses: &[EthAddress]) -> String {
    encode_node(&merkle::compute_root(addresses))
}

fn command_proof(addresses: &[EthAddress], address: &EthAddress) -> Result<String> {
    let proof = MembershipTree::new(addresses)
        .proof(address)
        .ok_or_else(|| anyhow!("{} is not in the allowlist", address))?;
    let nodes: Vec<String> = proof.iter().map(encode_node).collect();
    Ok(serde_json::to_string(&nodes)?)
}

fn command_verify(root: &str, address: &EthAddress, proof: &str) -> Result<bool> {
    let root = parse_node(root)?;
    let nodes: Vec<String> =
        serde_json::from_str(proof).context("expected a JSON array of hex strings")?;
    let proof = nodes
        .iter()
        .map(|node| parse_node(node.as_str()))
        .collect::<Result<Vec<_>>>()?;
    Ok(merkle::verify(&root, address, &proof))
}

fn command_digest(chain_id: u64, registry: &Pubkey, voucher: &Voucher) -> Result<String> {
    if voucher.uri.len() > spl_lazy_mint::MAX_URI_LEN {
        bail!(
            "uri is {} bytes, at most {} fit in an asset record",
            voucher.uri.len(),
            spl_lazy_mint::MAX_URI_LEN
        );
    }
    let domain = VoucherDomain::new(chain_id, registry);
    Ok(encode_node(&voucher.signing_digest(&domain)))
}

fn run(command: Command) -> Result<String> {
    match command {
        Command::Root { addresses } => Ok(command_root(&read_addresses(&addresses)?)),
        Command::Proof { addresses, address } => {
            command_proof(&read_addresses(&addresses)?, &address)
        }
        Command::Verify {
            root,
            address,
            proof,
        } => Ok(command_verify(&root, &address, &proof)?.to_string()),
        Command::Digest {
            chain_id,
            registry,
            asset_id,
            min_price,
            uri,
        } => command_digest(
            chain_id,
            &registry,
            &Voucher {
                asset_id,
                min_price,
                uri,
            },
        ),
        Command::Pda {
            registry,
            asset_id,
            program_id,
        } => Ok(find_asset_address(&program_id, &registry, asset_id).to_string()),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    println!("{}", run(cli.command)?);
    Ok(())
}
