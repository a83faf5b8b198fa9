pub mod config;
pub mod env;
pub mod profiling;

pub use config::EnvConfig;
pub use env::load_env;
