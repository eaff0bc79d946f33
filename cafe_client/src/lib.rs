pub mod domain;
pub mod frameworks;
pub mod interface_adapters;
pub mod use_cases;

pub use frameworks::runtime::{ClientConfig, ClientSession, connect, run, run_with_config};
