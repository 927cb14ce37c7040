//! CLI commands for the distributor
//!
//! Implements all command handlers for the CLI interface.

use crate::client::Client;
use crate::crypto::{claim_leaf, Hash32, Identity, MerkleTree};
use crate::distributor::DistributorId;
use crate::ledger::Ledger;
use crate::multisig::{DisbursementAction, Proposal, ProposalId};
use crate::program::{InitializeArgs, ProgramEvent};
use crate::storage::{Storage, StorageConfig};
use crate::wallet::Keystore;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Result type for CLI operations
pub type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

/// Seed of the program identity every data directory hosts
pub const PROGRAM_SEED: &[u8] = b"multisig-distributor";

/// Name accepted wherever an identity is expected
const TREASURY: &str = "treasury";

pub fn program_id() -> Identity {
    Identity::derive(&[PROGRAM_SEED])
}

/// Application state
pub struct AppState {
    pub ledger: Ledger,
    pub storage: Storage,
    pub keystore: Keystore,
    pub data_dir: PathBuf,
}

impl AppState {
    pub fn new(data_dir: PathBuf) -> CliResult<Self> {
        let storage = Storage::new(StorageConfig::with_data_dir(data_dir.clone()))?;
        let keystore = Keystore::new(&data_dir.join("keys"))?;
        let ledger = storage.load_or_create(program_id())?;

        Ok(Self {
            ledger,
            storage,
            keystore,
            data_dir,
        })
    }

    pub fn save(&self) -> CliResult<()> {
        self.storage.save(&self.ledger)?;
        Ok(())
    }

    /// Key label, raw identity or `treasury`
    pub fn resolve(&self, name: &str) -> CliResult<Identity> {
        if name == TREASURY {
            return Ok(self.ledger.state().treasury());
        }
        Ok(self.keystore.resolve(name)?)
    }

    /// Run `f` with a client for `payer` and persist the ledger afterwards
    fn with_client<T>(
        &mut self,
        payer: &str,
        f: impl FnOnce(&mut Client) -> Result<T, crate::ledger::LedgerError>,
    ) -> CliResult<T> {
        let key_pair = self.keystore.load(payer)?;
        let result = f(&mut Client::new(&mut self.ledger, &key_pair))?;
        self.save()?;
        Ok(result)
    }
}

/// One entry of a claims file
#[derive(Debug, Deserialize)]
struct ClaimEntry {
    /// Key label or identity
    claimant: String,
    amount: u64,
}

/// Claims in leaf order with the merkle tree over them
struct ClaimSet {
    claims: Vec<(Identity, u64)>,
    tree: MerkleTree,
    total: u64,
}

impl ClaimSet {
    fn load(state: &AppState, path: &Path) -> CliResult<Self> {
        let entries: Vec<ClaimEntry> = serde_json::from_str(&fs::read_to_string(path)?)?;

        let mut claims = Vec::with_capacity(entries.len());
        let mut total: u64 = 0;
        for entry in entries {
            total = total
                .checked_add(entry.amount)
                .ok_or("total claim amount overflows u64")?;
            claims.push((state.resolve(&entry.claimant)?, entry.amount));
        }

        let leaves = claims
            .iter()
            .enumerate()
            .map(|(i, (claimant, amount))| claim_leaf(i as u64, claimant, *amount))
            .collect();
        let tree = MerkleTree::new(leaves).ok_or("claims file is empty")?;

        Ok(Self {
            claims,
            tree,
            total,
        })
    }

    fn total(&self) -> u64 {
        self.total
    }
}

fn short(hash: &Hash32) -> String {
    hex::encode(&hash[..8])
}

/// Generate a named key pair
pub fn cmd_keygen(state: &AppState, label: &str) -> CliResult<()> {
    let key_pair = state.keystore.create(label)?;

    println!("🔐 New key created!");
    println!("   🏷️  Label: {}", label);
    println!("   📍 Identity: {}", key_pair.identity());
    println!("   🔑 Public Key: {}...", &key_pair.public_key_hex()[..32]);
    println!("\n   ⚠️  IMPORTANT: The private key is stored in {:?}", state.data_dir.join("keys"));

    Ok(())
}

/// List stored keys
pub fn cmd_keys(state: &AppState) -> CliResult<()> {
    let keys = state.keystore.list()?;

    if keys.is_empty() {
        println!("📭 No keys found. Create one with: distributor keygen --label <name>");
        return Ok(());
    }

    let registry = state.ledger.state().registry.as_ref();
    println!("📋 Keys:");
    for key in &keys {
        let signer = registry.map(|r| r.is_signer(&key.identity)).unwrap_or(false);
        println!(
            "   {} ({}){}",
            key.identity,
            key.label,
            if signer { " ✍️  signer" } else { "" }
        );
    }

    Ok(())
}

/// Initialize the signer registry
pub fn cmd_init(
    state: &mut AppState,
    payer: &str,
    signers: &[String],
    threshold: Option<u8>,
) -> CliResult<()> {
    let signers = if signers.is_empty() {
        None
    } else {
        let mut resolved = Vec::with_capacity(signers.len());
        for signer in signers {
            resolved.push(state.resolve(signer)?);
        }
        Some(resolved)
    };

    let signature = state.with_client(payer, |client| {
        client.initialize(InitializeArgs { signers, threshold })
    })?;

    let program = state.ledger.state();
    println!("✅ Multisig initialized!");
    println!("   📁 Data directory: {:?}", state.data_dir);
    println!("   🆔 Program: {}", program.program_id);
    println!("   🏦 Treasury: {}", program.treasury());
    if let Some(registry) = &program.registry {
        println!("   🔏 Policy: {}", registry.description());
        for signer in registry.signers() {
            println!("   └─ {}", signer);
        }
    }
    println!("   Your transaction signature {}", signature);

    Ok(())
}

/// Create a mint owned by the payer
pub fn cmd_mint(
    state: &mut AppState,
    payer: &str,
    symbol: &str,
    decimals: u8,
    supply: u64,
) -> CliResult<()> {
    let (signature, asset) =
        state.with_client(payer, |client| client.create_mint(symbol, decimals, supply))?;

    println!("🪙 Mint created!");
    println!("   Asset: {}", asset);
    println!("   Symbol: {} ({} decimals)", symbol, decimals);
    println!("   Supply: {}", supply);
    println!("   Signature: {}", signature);

    Ok(())
}

/// Move the payer's own tokens
pub fn cmd_transfer(
    state: &mut AppState,
    payer: &str,
    asset: &str,
    to: &str,
    amount: u64,
) -> CliResult<()> {
    let asset = Identity::new(asset);
    let recipient = state.resolve(to)?;
    let signature =
        state.with_client(payer, |client| client.transfer(&asset, &recipient, amount))?;

    println!("📤 Transferred {} of {} to {}", amount, asset, recipient);
    println!("   Signature: {}", signature);

    Ok(())
}

/// Propose a transfer out of the treasury
pub fn cmd_propose_transfer(
    state: &mut AppState,
    payer: &str,
    asset: &str,
    to: &str,
    amount: u64,
) -> CliResult<()> {
    let action = DisbursementAction::Transfer {
        asset: Identity::new(asset),
        recipient: state.resolve(to)?,
        amount,
    };
    propose(state, payer, action)
}

/// Propose funding a distributor for a claims file
pub fn cmd_propose_distributor(
    state: &mut AppState,
    payer: &str,
    asset: &str,
    claims: &Path,
) -> CliResult<()> {
    let set = ClaimSet::load(state, claims)?;
    let action = DisbursementAction::FundDistributor {
        asset: Identity::new(asset),
        root: set.tree.root(),
        max_total_claim: set.total(),
        max_num_nodes: set.claims.len() as u64,
    };
    propose(state, payer, action)
}

fn propose(state: &mut AppState, payer: &str, action: DisbursementAction) -> CliResult<()> {
    println!("📝 Proposing: {}", action);
    let (signature, id) = state.with_client(payer, |client| client.create_proposal(action))?;

    let proposal = state.ledger.state().proposals.get_proposal(id)?;
    println!("\n✅ Proposal {} created", id);
    print_approvals(state, proposal);
    println!("   Signature: {}", signature);

    Ok(())
}

/// Approve a pending proposal
pub fn cmd_approve(state: &mut AppState, payer: &str, proposal: u64) -> CliResult<()> {
    let id = ProposalId(proposal);
    let signature = state.with_client(payer, |client| client.approve(id))?;

    let proposal = state.ledger.state().proposals.get_proposal(id)?;
    println!("✍️  Proposal {} approved", id);
    print_approvals(state, proposal);
    println!("   Signature: {}", signature);

    Ok(())
}

/// Execute an approved proposal
pub fn cmd_execute(state: &mut AppState, payer: &str, proposal: u64) -> CliResult<()> {
    let id = ProposalId(proposal);
    let signature = state.with_client(payer, |client| client.execute(id))?;

    println!("🚀 Proposal {} executed", id);
    if let Some(receipt) = state.ledger.receipt(&signature) {
        for event in &receipt.events {
            println!("   └─ {}", describe(event));
        }
    }
    println!("   Signature: {}", signature);

    Ok(())
}

/// Cancel a pending proposal
pub fn cmd_cancel(state: &mut AppState, payer: &str, proposal: u64) -> CliResult<()> {
    let id = ProposalId(proposal);
    let signature = state.with_client(payer, |client| client.cancel(id))?;

    println!("🛑 Proposal {} cancelled", id);
    println!("   Signature: {}", signature);

    Ok(())
}

/// Display one proposal
pub fn cmd_show(state: &AppState, proposal: u64) -> CliResult<()> {
    let proposal = state
        .ledger
        .state()
        .proposals
        .get_proposal(ProposalId(proposal))?;

    println!("📄 Proposal {}", proposal.id);
    println!("   ├─ Action: {}", proposal.action);
    println!("   ├─ Proposer: {}", proposal.proposer);
    println!("   ├─ Status: {}", proposal.status());
    println!(
        "   ├─ Created: {}",
        proposal.created_at.format("%Y-%m-%d %H:%M:%S")
    );
    print_approvals(state, proposal);

    Ok(())
}

/// List proposals
pub fn cmd_list(state: &AppState, pending_only: bool) -> CliResult<()> {
    let proposals = if pending_only {
        state.ledger.state().proposals.pending()
    } else {
        state.ledger.state().proposals.list()
    };

    if proposals.is_empty() {
        println!("📭 No proposals found.");
        return Ok(());
    }

    let threshold = state
        .ledger
        .state()
        .registry
        .as_ref()
        .map(|r| r.threshold())
        .unwrap_or(0);
    println!("🗂️  Proposals:");
    for proposal in proposals {
        println!(
            "   {} | {} | {}/{} | {}",
            proposal.id,
            proposal.status(),
            proposal.approval_count(),
            threshold,
            proposal.action
        );
    }

    Ok(())
}

fn print_approvals(state: &AppState, proposal: &Proposal) {
    let threshold = state
        .ledger
        .state()
        .registry
        .as_ref()
        .map(|r| r.threshold())
        .unwrap_or(0);
    println!(
        "   └─ Approvals: {}/{}",
        proposal.approval_count(),
        threshold
    );
    for signer in proposal.approvals() {
        println!("      └─ {}", signer);
    }
}

/// Show token balances of an identity
pub fn cmd_balance(state: &AppState, holder: &str, asset: Option<&str>) -> CliResult<()> {
    let holder = state.resolve(holder)?;
    let tokens = &state.ledger.state().tokens;

    println!("💰 Balances for {}", holder);
    match asset {
        Some(asset) => {
            let asset = Identity::new(asset);
            println!("   {}: {}", asset, tokens.balance_of(&asset, &holder)?);
        }
        None => {
            let holdings = tokens.holdings(&holder);
            if holdings.is_empty() {
                println!("   (none)");
            }
            for (mint, balance) in holdings {
                println!("   {} ({}): {}", mint.symbol, mint.asset, balance);
            }
        }
    }

    Ok(())
}

/// Print the merkle root and proofs for a claims file
pub fn cmd_merkle_root(state: &AppState, claims: &Path) -> CliResult<()> {
    let set = ClaimSet::load(state, claims)?;

    println!("🌳 Merkle root: {}", hex::encode(set.tree.root()));
    println!("   Leaves: {}", set.tree.leaf_count());
    println!("   Total claim: {}", set.total());
    for (index, (claimant, amount)) in set.claims.iter().enumerate() {
        let proof = set.tree.proof(index).unwrap_or_default();
        let path: Vec<String> = proof.iter().map(short).collect();
        println!(
            "   #{} {} = {} | proof [{}]",
            index,
            claimant,
            amount,
            path.join(", ")
        );
    }

    Ok(())
}

/// Claim leaf `index` of a claims file from a distributor
pub fn cmd_claim(
    state: &mut AppState,
    payer: &str,
    distributor: u64,
    claims: &Path,
    index: usize,
) -> CliResult<()> {
    let set = ClaimSet::load(state, claims)?;
    let (claimant, amount) = set
        .claims
        .get(index)
        .cloned()
        .ok_or_else(|| format!("claims file has no entry {}", index))?;
    let proof = set.tree.proof(index).unwrap_or_default();

    let signature = state.with_client(payer, |client| {
        if client.payer() != claimant {
            log::warn!("Payer is not the claimant of entry {}, proof will fail", index);
        }
        client.claim(DistributorId(distributor), index as u64, amount, proof)
    })?;

    println!("🎁 Claimed {} from distributor {}", amount, DistributorId(distributor));
    println!("   Claimant: {}", claimant);
    println!("   Signature: {}", signature);

    Ok(())
}

/// Show recent transaction receipts
pub fn cmd_events(state: &AppState, count: usize) -> CliResult<()> {
    let receipts = state.ledger.receipts();
    if receipts.is_empty() {
        println!("📭 No transactions yet.");
        return Ok(());
    }

    println!("📜 Recent transactions (slot {}):", state.ledger.slot());
    for receipt in receipts.iter().rev().take(count) {
        println!(
            "   slot {} | {} | {} | {}",
            receipt.slot,
            receipt.instruction,
            receipt.payer,
            receipt.processed_at.format("%Y-%m-%d %H:%M:%S")
        );
        for event in &receipt.events {
            println!("      └─ {}", describe(event));
        }
    }

    Ok(())
}

fn describe(event: &ProgramEvent) -> String {
    match event {
        ProgramEvent::Initialized {
            signers, threshold, ..
        } => format!("initialized {}-of-{}", threshold, signers.len()),
        ProgramEvent::ProposalCreated {
            proposal, action, ..
        } => format!("proposal {} created: {}", proposal, action),
        ProgramEvent::ProposalApproved {
            proposal,
            signer,
            approvals,
            threshold_met,
        } => format!(
            "proposal {} approved by {} ({} approvals{})",
            proposal,
            signer,
            approvals,
            if *threshold_met { ", threshold met" } else { "" }
        ),
        ProgramEvent::ProposalExecuted {
            proposal,
            approvals,
        } => format!("proposal {} executed with {} approvals", proposal, approvals),
        ProgramEvent::ProposalCancelled {
            proposal,
            canceller,
        } => format!("proposal {} cancelled by {}", proposal, canceller),
        ProgramEvent::MintCreated { asset, supply, .. } => {
            format!("mint {} created with supply {}", asset, supply)
        }
        ProgramEvent::Transferred {
            asset,
            from,
            to,
            amount,
        } => format!("{} of {} moved {} -> {}", amount, asset, from, to),
        ProgramEvent::DistributorFunded {
            distributor,
            root,
            amount,
            ..
        } => format!(
            "distributor {} funded with {} (root {})",
            distributor,
            amount,
            short(root)
        ),
        ProgramEvent::Claimed {
            distributor,
            index,
            claimant,
            amount,
        } => format!(
            "drop {} of distributor {} claimed by {}: {}",
            index, distributor, claimant, amount
        ),
    }
}
