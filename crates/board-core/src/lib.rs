pub mod board;
pub mod config;
pub mod dashboard;
pub mod document;
pub mod error;
pub mod io;
pub mod ledger;
pub mod mission;
pub mod notification;
pub mod profile;
pub mod storage;
pub mod team;
pub mod toast;
pub mod types;

pub use board::Board;
pub use error::{BoardError, Result};
