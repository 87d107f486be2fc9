pub mod config;
pub mod daemon;
pub mod device;
pub mod probe;
pub mod sanitize;
