pub mod api;
pub mod conditions;
pub mod config;
pub mod firebase;
pub mod irrigation;
pub mod response_store;
pub mod sensors;
pub mod snapshot_cache;
pub mod weather;
