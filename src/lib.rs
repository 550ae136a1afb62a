pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod form;
pub mod report;
pub mod storage;
