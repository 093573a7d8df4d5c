pub mod config;
pub mod error;
pub mod middleware;
pub mod policy;
pub mod protocol;
pub mod registry;
pub mod server;
pub mod storage;
pub mod utils;

pub use config::ShareConfig;
pub use error::ShareError;
pub use server::Server;
