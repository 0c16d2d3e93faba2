pub mod config;
pub mod logging;

pub mod ledger;
pub mod listing;
pub mod lock;
pub mod mirror;
pub mod oracle;
pub mod retry;
pub mod storage;
pub mod transfer;
pub mod transport;
pub mod url_model;
pub mod verify;
