
#[cfg(test)]
pub mod common;

#[cfg(test)]
pub mod rpc_mock;
