mod args;

use args::GlobalArgs;
use clap::{Parser, Subcommand};
use solana_sdk::pubkey::Pubkey;
use solsweep_lib::{
    action::{build_action_instructions, ActionKind, ActionRequest},
    constant::{LAMPORTS_PER_SIGNATURE, TOKEN_ACCOUNT_SIZE},
    error::SweepError,
    gateway::{LedgerGateway, RetryPolicy, RpcGateway},
    log::LoggingFormat,
    orchestrator::{
        encode_transaction_b64, new_unsigned_transaction, LocalSigner, TransactionSigner,
        TransactionStage,
    },
    rpc::get_rpc_client,
    scan::AccountCategory,
    Config, SweepEngine,
};
use std::{str::FromStr, sync::Arc};

#[derive(Subcommand)]
enum Commands {
    /// Scan the wallet and list classified token accounts
    Scan {
        /// Show all accounts, including unclassifiable ones
        #[arg(long, default_value_t = false)]
        all: bool,

        /// Keep re-scanning at this interval (e.g. "30s")
        #[arg(long)]
        watch: Option<String>,
    },
    /// Close an empty token account and reclaim its rent
    Reclaim {
        /// Address of the token account to close
        account: String,

        /// Submit the transaction (default is dry-run)
        #[arg(long, default_value_t = false)]
        execute: bool,
    },
    /// Burn a token account's full balance
    Burn {
        /// Address of the token account to burn from
        account: String,

        /// Submit the transaction (default is dry-run)
        #[arg(long, default_value_t = false)]
        execute: bool,
    },
}

#[derive(Parser)]
#[command(author, version, about = "Solsweep - token account cleanup for Solana wallets", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    pub global_args: GlobalArgs,
}

#[tokio::main]
async fn main() -> Result<(), SweepError> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();

    setup_logging(&cli.global_args.logging_format);

    let config = Config::load_config(&cli.global_args.config).unwrap_or_else(|e| {
        print_error(&format!("Failed to load config: {e}"));
        std::process::exit(1);
    });

    let rpc_client = get_rpc_client(&cli.global_args.rpc_url, config.commitment());
    let gateway = Arc::new(RpcGateway::new(
        rpc_client,
        config.commitment(),
        RetryPolicy::new(config.scan.rpc_retry_attempts, config.rpc_retry_backoff()),
    ));

    let signer = Arc::new(
        LocalSigner::from_private_key_string(&cli.global_args.keypair).unwrap_or_else(|e| {
            print_error(&format!("Failed to load wallet key: {e}"));
            std::process::exit(1);
        }),
    );
    let owner = signer.pubkey();

    let engine = SweepEngine::new(gateway.clone(), signer, &config)?;

    match cli.command {
        Commands::Scan { all, watch } => {
            let interval = watch
                .map(|raw| {
                    humantime::parse_duration(&raw).unwrap_or_else(|e| {
                        print_error(&format!("Invalid watch interval {raw}: {e}"));
                        std::process::exit(1);
                    })
                });

            run_scan(&engine, &owner, all).await?;
            if let Some(interval) = interval {
                loop {
                    tokio::time::sleep(interval).await;
                    run_scan(&engine, &owner, all).await?;
                }
            }
        }
        Commands::Reclaim { account, execute } => {
            run_action(&engine, gateway.as_ref(), &owner, &account, ActionKind::Reclaim, execute)
                .await?;
        }
        Commands::Burn { account, execute } => {
            run_action(&engine, gateway.as_ref(), &owner, &account, ActionKind::Burn, execute)
                .await?;
        }
    }

    Ok(())
}

async fn run_scan(engine: &SweepEngine, owner: &Pubkey, all: bool) -> Result<(), SweepError> {
    println!("Scanning token accounts for {owner}...");
    let snapshot = engine.refresh(owner).await?;

    let mut categories =
        vec![AccountCategory::Cleanable, AccountCategory::Nft, AccountCategory::FungibleToken];
    if all {
        categories.push(AccountCategory::Ignored);
    }

    for category in categories {
        for account in snapshot.accounts_in(category) {
            println!(
                "[{}] {} | Mint: {} | Program: {} | Rent: {:.6} SOL | Balance: {}",
                category.label().to_uppercase(),
                account.record.account_address,
                account.record.mint_address,
                account.record.owner_program,
                lamports_to_sol(account.record.rent_lamports),
                account.ui_amount(),
            );
        }
    }

    let cleanable = snapshot.accounts_in(AccountCategory::Cleanable).count();
    let burnable = snapshot.accounts_in(AccountCategory::Nft).count()
        + snapshot.accounts_in(AccountCategory::FungibleToken).count();
    println!(
        "{cleanable} reclaimable account(s) worth {:.6} SOL, {burnable} burnable, {} unresolved",
        lamports_to_sol(snapshot.reclaimable_lamports()),
        snapshot.unresolved,
    );
    Ok(())
}

async fn run_action(
    engine: &SweepEngine,
    gateway: &RpcGateway,
    owner: &Pubkey,
    account: &str,
    kind: ActionKind,
    execute: bool,
) -> Result<(), SweepError> {
    let account_address = Pubkey::from_str(account).map_err(|e| {
        SweepError::InvalidAction(format!("Invalid account address {account}: {e}"))
    })?;

    let snapshot = engine.refresh(owner).await?;

    if execute {
        let outcome = engine.perform_action(&account_address, kind).await?;
        println!("{}", outcome.message);
        if outcome.stage != TransactionStage::Confirmed {
            std::process::exit(1);
        }
        return Ok(());
    }

    // Dry-run: show what would be signed without touching the chain
    let target = snapshot
        .find(&account_address)
        .cloned()
        .ok_or_else(|| SweepError::AccountNotFound(account_address.to_string()))?;
    let request = ActionRequest::new(target, kind)?;
    let instructions = build_action_instructions(&request, engine.fee(), owner)?;
    let rent_minimum = gateway.get_rent_exempt_minimum(TOKEN_ACCOUNT_SIZE).await?;

    println!("Dry-run for {kind:?} of {account_address}:");
    for (index, instruction) in instructions.iter().enumerate() {
        println!(
            "  [{index}] program {} ({} account(s))",
            instruction.program_id,
            instruction.accounts.len()
        );
    }
    println!(
        "  Service fee: {:.6} SOL to {}",
        lamports_to_sol(engine.fee().lamports),
        engine.fee().recipient
    );
    println!("  Estimated network fee: {:.6} SOL", lamports_to_sol(LAMPORTS_PER_SIGNATURE));
    match kind {
        ActionKind::Reclaim => println!(
            "  Rent recovered on close: {:.6} SOL (rent-exempt minimum is {:.6} SOL)",
            lamports_to_sol(request.target().record.rent_lamports),
            lamports_to_sol(rent_minimum),
        ),
        ActionKind::Burn => {
            println!("  Burns the full balance of {}", request.target().ui_amount())
        }
    }

    let transaction = new_unsigned_transaction(&instructions, owner);
    println!("  Unsigned transaction (base64): {}", encode_transaction_b64(&transaction)?);
    println!("Re-run with --execute to sign and submit.");
    Ok(())
}

fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1_000_000_000.0
}

fn print_error(message: &str) {
    eprintln!("Error: {message}");
}

fn setup_logging(format: &LoggingFormat) {
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into());

    let subscriber = tracing_subscriber::fmt().with_env_filter(env_filter);
    match format {
        LoggingFormat::Standard => subscriber.init(),
        LoggingFormat::Json => subscriber.json().init(),
    }
}
