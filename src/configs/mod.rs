pub mod base;
pub mod cache;
pub mod logging;
pub mod proxies;
pub mod resolver;
pub mod server;
pub mod youtube;

pub use base::*;
pub use cache::*;
pub use logging::*;
pub use proxies::*;
pub use resolver::*;
pub use server::*;
pub use youtube::*;
