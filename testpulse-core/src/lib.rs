//! Testpulse library exports

pub mod buildmeta;
pub mod classify;
pub mod config;
pub mod debug;
pub mod harness;
pub mod mapper;
pub mod records;
pub mod shell;
pub mod sink;
