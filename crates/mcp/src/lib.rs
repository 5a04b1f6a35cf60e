pub mod config;
pub mod server;
pub mod session;
pub mod sheets;
pub mod tools;
pub mod transport;
