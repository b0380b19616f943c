pub mod fallback;
pub mod models;
pub mod normalizer;
pub mod service;

pub use service::SensorService;
