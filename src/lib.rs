pub mod config;
pub mod db;
pub mod error;
pub mod peers;
pub mod server;
pub mod utils;

pub use config::Config;
pub use error::ServiceError;
