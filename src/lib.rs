pub mod backend;
pub mod bridge;
pub mod mapping_store;
pub mod recognition_poller;
pub mod settings;
pub mod snapshot;
pub mod types;
