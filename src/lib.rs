pub mod cache;
pub mod common;
pub mod configs;
pub mod proxy;
pub mod resolver;
pub mod server;
pub mod sources;
pub mod transport;
