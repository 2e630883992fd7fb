//! Devnet wallet CLI.
//!
//! # Commands
//!
//! ```text
//! devnet-wallet create                       new keypair → keystore
//! devnet-wallet list [--show-secrets]        stored wallets
//! devnet-wallet airdrop <ADDRESS> <SOL>      faucet request + confirmation
//! devnet-wallet balance <ADDRESS>            balance in SOL
//! devnet-wallet transfer --from <ADDRESS> <RECIPIENT> <SOL> [--no-confirm]
//! ```
//!
//! Configuration comes from `--config` (TOML), then `RPC_URL` /
//! `WALLET_KEYSTORE`, then the `--rpc-url` / `--keystore` flags.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use devnet_wallet::config::{resolve_config, ConfigError, ConfigOverrides, WalletConfig};
use devnet_wallet::keystore::WalletStore;
use devnet_wallet::ledger::amount::{format_sol, parse_sol};
use devnet_wallet::ledger::{
    request_airdrop, wait_for_confirmation, Address, LedgerEndpoint, RpcClient, TransferError,
    TransferSubmitter,
};
use devnet_wallet::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "devnet-wallet")]
#[command(about = "Create wallets, request test funds and send transfers", long_about = None)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides config and RPC_URL).
    #[arg(long)]
    rpc_url: Option<String>,

    /// Wallet file (overrides config and WALLET_KEYSTORE).
    #[arg(long)]
    keystore: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a new wallet
    Create,
    /// List all wallets
    List {
        /// Also print secret keys
        #[arg(long)]
        show_secrets: bool,
    },
    /// Request test-network SOL
    Airdrop {
        /// Receiving address
        address: String,
        /// Amount in SOL
        amount: String,
    },
    /// Show the balance of an address
    Balance {
        address: String,
    },
    /// Send SOL from a stored wallet
    Transfer {
        /// Sending wallet (must be in the keystore)
        #[arg(long)]
        from: String,
        /// Receiving address
        recipient: String,
        /// Amount in SOL
        amount: String,
        /// Return once the endpoint accepts the transaction
        #[arg(long)]
        no_confirm: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    };
    init_logging(&config.logging);

    tracing::debug!(
        rpc_url = %config.rpc.url,
        keystore = %config.keystore.path.display(),
        "Configuration loaded"
    );

    if let Err(e) = run(cli.command, &config).await {
        match e.downcast_ref::<TransferError>() {
            Some(transfer_error) => {
                tracing::error!(error = %transfer_error, "Command failed");
                eprintln!("{}", transfer_error.user_message());
            }
            None => {
                tracing::error!(error = %e, "Command failed");
                eprintln!("Error: {}", e);
            }
        }
        std::process::exit(1);
    }
}

fn load(cli: &Cli) -> Result<WalletConfig, ConfigError> {
    let overrides = ConfigOverrides {
        rpc_url: cli.rpc_url.clone(),
        keystore: cli.keystore.clone(),
    };
    resolve_config(cli.config.as_deref(), &overrides)
}

async fn run(command: Commands, config: &WalletConfig) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Commands::Create => {
            let mut store = WalletStore::open(&config.keystore.path)?;
            let keypair = store.create()?;
            println!("Wallet created successfully!");
            println!("Public Key: {}", keypair.pubkey());
        }
        Commands::List { show_secrets } => {
            let store = WalletStore::open(&config.keystore.path)?;
            if store.is_empty() {
                println!("No wallets in {}", store.path().display());
            }
            for (index, wallet) in store.entries().iter().enumerate() {
                println!("\nWallet {}:", index + 1);
                println!("Public Key: {}", wallet.public_key);
                if show_secrets {
                    println!("Secret Key: {}", wallet.secret_key);
                }
            }
        }
        Commands::Airdrop { address, amount } => {
            let address: Address = address.parse().map_err(TransferError::InvalidAddress)?;
            let lamports = parse_sol(&amount)?;
            let client = RpcClient::new(config.rpc.clone())?;

            println!("Requesting airdrop...");
            let confirmation =
                request_airdrop(&client, &address, lamports, &config.confirmation).await?;
            println!(
                "Airdropped {} SOL to {} at {}",
                format_sol(lamports),
                address,
                confirmation.id
            );
        }
        Commands::Balance { address } => {
            let address: Address = address.parse().map_err(TransferError::InvalidAddress)?;
            let client = RpcClient::new(config.rpc.clone())?;
            let lamports = client
                .get_balance(&address)
                .await
                .map_err(TransferError::BalanceFetch)?;
            println!("Balance: {} SOL", format_sol(lamports));
        }
        Commands::Transfer { from, recipient, amount, no_confirm } => {
            let from: Address = from.parse().map_err(TransferError::InvalidAddress)?;
            let store = WalletStore::open(&config.keystore.path)?;
            let signer = store.keypair(&from)?;
            let lamports = parse_sol(&amount)?;

            let client = RpcClient::new(config.rpc.clone())?;
            let submitter = TransferSubmitter::new(client);

            println!("Creating transfer transaction...");
            let submission = submitter
                .submit_transfer(&signer, &recipient, i128::from(lamports))
                .await?;

            if no_confirm {
                println!("Transfer submitted: {}", submission.id);
                return Ok(());
            }

            println!("Waiting for confirmation of {}...", submission.id);
            wait_for_confirmation(submitter.endpoint(), &submission, &config.confirmation).await?;
            println!(
                "Transfer successful! {} SOL sent to {} at {}",
                format_sol(lamports),
                recipient,
                submission.id
            );
            match submitter.endpoint().get_balance(&from).await {
                Ok(balance) => println!("Remaining balance: {} SOL", format_sol(balance)),
                Err(e) => tracing::warn!(address = %from, error = %e, "Balance refresh failed"),
            }
        }
    }
    Ok(())
}
