pub mod config;
mod output;
pub mod replay;
pub mod stage;
