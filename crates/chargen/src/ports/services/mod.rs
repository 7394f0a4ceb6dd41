//! Service Ports

mod generation_client;

pub use generation_client::*;
