pub mod consumer;
pub mod rpc;
