//! HTTP middleware for the serve mode.

pub mod request_logger;

pub use request_logger::RequestLogger;
