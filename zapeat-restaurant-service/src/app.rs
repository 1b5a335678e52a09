pub mod producer;
pub mod rpc;
