//! `property-cli`: command-line front end for the property registry.
//!
//! ```text
//!   CLI args ──▶ config ──▶ WalletSession::connect
//!                                │
//!                                ▼
//!         TransactionLifecycle::run / query_owner
//!                                │
//!   stdout ◀── status events ◀───┘
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use alloy::primitives::Address;
use clap::{Parser, Subcommand};
use serde_json::json;

use property_registry::blockchain::{wallet::PRIVATE_KEY_ENV_VAR, RpcWalletProvider, Wallet};
use property_registry::config::loader::read_config;
use property_registry::config::validation::validate_config;
use property_registry::config::RegistryConfig;
use property_registry::observability::logging;
use property_registry::registry::{
    self, query_owner, ContractGateway, ErrorKind, Failure, Operation, Outcome, StatusEvent,
    TransactionLifecycle, WalletSession,
};

#[derive(Parser)]
#[command(name = "property-cli")]
#[command(about = "Register, transfer and look up properties on the on-chain registry", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// JSON-RPC endpoint (overrides config)
    #[arg(long)]
    rpc_url: Option<String>,

    /// Chain ID (overrides config)
    #[arg(long)]
    chain_id: Option<u64>,

    /// Registry contract address (overrides config)
    #[arg(long)]
    contract: Option<String>,

    /// Ask for approval before connecting and signing
    #[arg(long)]
    confirm: bool,

    /// Print status updates as JSON lines
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect the wallet and print the account
    Connect,
    /// Register a new property owned by the connected account
    Register { id: String },
    /// Transfer a property to a new owner
    Transfer { id: String, new_owner: String },
    /// Show the current owner of a property
    Owner { id: String },
    /// Print the bytes32 key for a property ID
    Encode { id: String },
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => read_config(path)?,
        None => RegistryConfig::default(),
    };
    apply_overrides(&mut config, &cli);
    if let Err(errors) = validate_config(&config) {
        for err in &errors {
            eprintln!("config: {}", err);
        }
        return Ok(ExitCode::FAILURE);
    }

    logging::init(&config.observability.log_level);
    tracing::debug!(rpc_url = %config.network.rpc_url, contract = %config.contract.address, "Configuration loaded");

    if let Commands::Encode { id } = &cli.command {
        return Ok(match registry::encode(id) {
            Ok(key) => {
                print_line(cli.json, json!({ "id": id, "key": key }), &key.to_string());
                ExitCode::SUCCESS
            }
            Err(err) => report_failure(cli.json, &Failure::from(registry::RegistryError::from(err))),
        });
    }

    let provider = Wallet::from_env(config.network.chain_id)?
        .map(|wallet| RpcWalletProvider::new(&config.network, wallet, config.wallet.confirm_signing))
        .transpose()?
        .map(Arc::new);
    let session = Arc::new(WalletSession::new(provider));

    let account = match session.connect().await {
        Ok(account) => account,
        Err(err) => return Ok(report_failure(cli.json, &Failure::from(err))),
    };
    print_line(
        cli.json,
        json!({ "event": "connected", "account": account }),
        &format!("Connected: {}", account),
    );

    let contract: Address = config.contract.address.parse()?;
    let gateway = Arc::new(ContractGateway::new(
        session,
        contract,
        config.network.confirmations,
    ));

    let op = match cli.command {
        Commands::Connect | Commands::Encode { .. } => return Ok(ExitCode::SUCCESS),
        Commands::Owner { id } => {
            return Ok(match query_owner(&*gateway, &id).await {
                Ok(owner) => {
                    print_line(cli.json, json!({ "id": id, "owner": owner }), &owner.to_string());
                    ExitCode::SUCCESS
                }
                Err(failure) => report_failure(cli.json, &failure),
            });
        }
        Commands::Register { id } => Operation::Register { identifier: id },
        Commands::Transfer { id, new_owner } => Operation::Transfer {
            identifier: id,
            new_owner,
        },
    };

    let json_output = cli.json;
    let sink = move |event: StatusEvent| match serde_json::to_string(&event) {
        Ok(line) if json_output => println!("{}", line),
        _ => println!("{}", event.message()),
    };

    let mut lifecycle = TransactionLifecycle::new(gateway, sink);
    Ok(match lifecycle.run(op).await {
        Outcome::Confirmed { .. } => ExitCode::SUCCESS,
        Outcome::Failed { .. } => ExitCode::FAILURE,
    })
}

fn apply_overrides(config: &mut RegistryConfig, cli: &Cli) {
    if let Some(url) = &cli.rpc_url {
        config.network.rpc_url = url.clone();
    }
    if let Some(chain_id) = cli.chain_id {
        config.network.chain_id = chain_id;
    }
    if let Some(contract) = &cli.contract {
        config.contract.address = contract.clone();
    }
    if cli.confirm {
        config.wallet.confirm_signing = true;
    }
}

fn print_line(json_output: bool, value: serde_json::Value, text: &str) {
    if json_output {
        println!("{}", value);
    } else {
        println!("{}", text);
    }
}

fn report_failure(json_output: bool, failure: &Failure) -> ExitCode {
    if json_output {
        println!("{}", json!({ "event": "error", "kind": failure.kind, "message": failure.message }));
    } else {
        eprintln!("Error: {}", failure.message);
        if failure.kind == ErrorKind::WalletUnavailable {
            eprintln!(
                "Set {} to the hex private key of the account to use.",
                PRIVATE_KEY_ENV_VAR
            );
        }
    }
    ExitCode::FAILURE
}
