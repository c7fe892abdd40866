pub mod action;
pub mod config;
pub mod constant;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod inventory;
pub mod log;
pub mod orchestrator;
pub mod rpc;
pub mod scan;
pub mod token;

pub use config::Config;
pub use engine::SweepEngine;
pub use error::SweepError;

#[cfg(test)]
pub mod tests;
