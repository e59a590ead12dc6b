pub mod clear;
pub mod config;
pub mod delete;
pub mod due;
pub mod duplicate;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod new;
