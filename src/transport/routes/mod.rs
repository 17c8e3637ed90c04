pub mod info;
pub mod metadata;
pub mod proxies;
pub mod stream;
