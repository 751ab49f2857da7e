pub mod models;
pub mod service;
pub mod storage;

pub use service::create_app;
