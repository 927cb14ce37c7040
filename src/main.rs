//! Multisig distributor CLI
//!
//! Runs the distributor program against a ledger kept in the data directory.

use clap::{Parser, Subcommand};
use multisig_distributor::cli::{self, AppState};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "distributor")]
#[command(author = "Darshan")]
#[command(version = "0.1.0")]
#[command(about = "Multisig-gated token distributions", long_about = None)]
struct Cli {
    /// Data directory for the ledger and keys
    #[arg(short, long, default_value = ".distributor_data")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a named key pair
    Keygen {
        #[arg(short, long)]
        label: String,
    },

    /// List stored keys
    Keys,

    /// Initialize the signer registry
    Init {
        /// Key paying for the transaction
        #[arg(short, long)]
        payer: String,

        /// Signers (labels or identities, comma-separated); defaults to the payer
        #[arg(short, long, value_delimiter = ',')]
        signers: Vec<String>,

        /// Approvals required to execute; defaults to 1
        #[arg(short, long)]
        threshold: Option<u8>,
    },

    /// Create a fixed-supply mint
    Mint {
        #[arg(short, long)]
        payer: String,

        #[arg(short, long)]
        symbol: String,

        #[arg(long, default_value = "0")]
        decimals: u8,

        #[arg(long)]
        supply: u64,
    },

    /// Transfer the payer's tokens (use `treasury` to fund the program)
    Transfer {
        #[arg(short, long)]
        payer: String,

        #[arg(short, long)]
        asset: String,

        #[arg(short, long)]
        to: String,

        #[arg(long)]
        amount: u64,
    },

    /// Propose a disbursement from the treasury
    Propose {
        #[arg(short, long)]
        payer: String,

        #[command(subcommand)]
        action: ProposeCommands,
    },

    /// Approve a pending proposal
    Approve {
        #[arg(short, long)]
        payer: String,

        #[arg(long)]
        proposal: u64,
    },

    /// Execute a proposal that reached the threshold
    Execute {
        #[arg(short, long)]
        payer: String,

        #[arg(long)]
        proposal: u64,
    },

    /// Cancel a pending proposal
    Cancel {
        #[arg(short, long)]
        payer: String,

        #[arg(long)]
        proposal: u64,
    },

    /// Show one proposal
    Show {
        #[arg(long)]
        proposal: u64,
    },

    /// List proposals
    List {
        /// Only pending proposals
        #[arg(long)]
        pending: bool,
    },

    /// Show token balances
    Balance {
        /// Key label, identity or `treasury`
        #[arg(long)]
        holder: String,

        #[arg(short, long)]
        asset: Option<String>,
    },

    /// Compute the merkle root and proofs of a claims file
    MerkleRoot {
        #[arg(short, long)]
        claims: PathBuf,
    },

    /// Claim an entry of a claims file from a distributor
    Claim {
        #[arg(short, long)]
        payer: String,

        #[arg(long)]
        distributor: u64,

        #[arg(short, long)]
        claims: PathBuf,

        #[arg(short, long)]
        index: usize,
    },

    /// Show recent transactions and their events
    Events {
        #[arg(short, long, default_value = "10")]
        count: usize,
    },
}

#[derive(Subcommand)]
enum ProposeCommands {
    /// Transfer treasury tokens to a recipient
    Transfer {
        #[arg(short, long)]
        asset: String,

        #[arg(short, long)]
        to: String,

        #[arg(long)]
        amount: u64,
    },

    /// Fund a merkle distributor for a claims file
    Distributor {
        #[arg(short, long)]
        asset: String,

        #[arg(short, long)]
        claims: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut state = AppState::new(cli.data_dir.clone())?;

    match cli.command {
        Commands::Keygen { label } => {
            cli::cmd_keygen(&state, &label)?;
        }

        Commands::Keys => {
            cli::cmd_keys(&state)?;
        }

        Commands::Init {
            payer,
            signers,
            threshold,
        } => {
            cli::cmd_init(&mut state, &payer, &signers, threshold)?;
        }

        Commands::Mint {
            payer,
            symbol,
            decimals,
            supply,
        } => {
            cli::cmd_mint(&mut state, &payer, &symbol, decimals, supply)?;
        }

        Commands::Transfer {
            payer,
            asset,
            to,
            amount,
        } => {
            cli::cmd_transfer(&mut state, &payer, &asset, &to, amount)?;
        }

        Commands::Propose { payer, action } => match action {
            ProposeCommands::Transfer { asset, to, amount } => {
                cli::cmd_propose_transfer(&mut state, &payer, &asset, &to, amount)?;
            }
            ProposeCommands::Distributor { asset, claims } => {
                cli::cmd_propose_distributor(&mut state, &payer, &asset, &claims)?;
            }
        },

        Commands::Approve { payer, proposal } => {
            cli::cmd_approve(&mut state, &payer, proposal)?;
        }

        Commands::Execute { payer, proposal } => {
            cli::cmd_execute(&mut state, &payer, proposal)?;
        }

        Commands::Cancel { payer, proposal } => {
            cli::cmd_cancel(&mut state, &payer, proposal)?;
        }

        Commands::Show { proposal } => {
            cli::cmd_show(&state, proposal)?;
        }

        Commands::List { pending } => {
            cli::cmd_list(&state, pending)?;
        }

        Commands::Balance { holder, asset } => {
            cli::cmd_balance(&state, &holder, asset.as_deref())?;
        }

        Commands::MerkleRoot { claims } => {
            cli::cmd_merkle_root(&state, &claims)?;
        }

        Commands::Claim {
            payer,
            distributor,
            claims,
            index,
        } => {
            cli::cmd_claim(&mut state, &payer, distributor, &claims, index)?;
        }

        Commands::Events { count } => {
            cli::cmd_events(&state, count)?;
        }
    }

    Ok(())
}
