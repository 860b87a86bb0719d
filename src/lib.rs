//! stock-agent - chat assistant with an inventory lookup tool
//!
//! One exchange is one question: the model is called with the stock tool
//! available, the tool runs at most once, and a second text-only call turns
//! its output into the final answer.

pub mod agent;
pub mod inventory;
pub mod templates;
pub mod tools;
pub mod adapters;
pub mod config;
pub mod error;
pub mod ui;

pub use error::{Error, Result};
