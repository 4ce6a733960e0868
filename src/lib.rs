pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod server;
pub mod session;
pub mod transport;

// Re-export specific items for convenient access
pub use config::Config;
pub use error::{Error, Result};
pub use server::Server;
