pub mod config;
pub mod diff;
pub mod extract;
pub mod fetch;
pub mod notify;
pub mod pdf;
pub mod store;
pub mod types;
pub mod watcher;

pub use fetch::CatalogClient;
pub use watcher::Watcher;
