pub const LAMPORTS_PER_SIGNATURE: u64 = 5000;

/// Packed size of a token account under both token programs (base layout).
pub const TOKEN_ACCOUNT_SIZE: usize = 165;

// Service fee
pub const DEFAULT_SERVICE_FEE_LAMPORTS: u64 = 100_000_000; // 0.1 SOL
pub const DEFAULT_FEE_RECIPIENT: &str = "GiLefarGmT5zvaeiFiLNmrckRen3MNjrXQ8fHCtAdN3s";

// Scan / confirmation timing
pub const DEFAULT_REFRESH_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_COMMITMENT: &str = "confirmed";
pub const DEFAULT_CONFIRM_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_CONFIRM_POLL_MILLIS: u64 = 400;

// RPC retry policy (read-only calls only)
pub const DEFAULT_RPC_RETRY_ATTEMPTS: u32 = 3;
pub const DEFAULT_RPC_RETRY_BACKOFF_MILLIS: u64 = 500;
