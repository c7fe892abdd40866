use clap::Parser;
use solsweep_lib::log::LoggingFormat;

/// Global arguments used by all subcommands
#[derive(Debug, Parser)]
#[command(name = "solsweep")]
pub struct GlobalArgs {
    /// Solana RPC endpoint URL
    #[arg(long, env = "RPC_URL", default_value = "http://127.0.0.1:8899")]
    pub rpc_url: String,

    /// Path to solsweep configuration file (TOML format)
    #[arg(long, default_value = "solsweep.toml")]
    pub config: String,

    /// Wallet private key: base58 string, "[0, 1, ...]" byte array, or a
    /// path to a JSON keypair file
    #[arg(long, env = "SOLSWEEP_KEYPAIR", default_value = "wallet.json")]
    pub keypair: String,

    /// Output format for logs (standard or json)
    #[arg(long, default_value = "standard")]
    pub logging_format: LoggingFormat,
}
