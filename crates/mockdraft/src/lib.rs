// Library root: re-exports all modules so integration tests and the binary
// can access the crate's public API.

pub mod app;
pub mod config;
pub mod draft;
pub mod grade;
pub mod protocol;
pub mod report;
pub mod valuation;
