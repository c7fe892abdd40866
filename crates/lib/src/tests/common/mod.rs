/// Centralized re-exports of the mock utilities shared across unit tests.
pub use super::account_mock::*;
pub use super::rpc_mock::*;
