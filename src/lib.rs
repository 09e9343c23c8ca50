pub mod api;
pub mod catalog;
pub mod config;
pub mod ledger;
pub mod portfolio;
pub mod session;
pub mod trading;
pub mod types;
