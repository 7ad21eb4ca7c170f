pub mod listener;
pub mod manager;
pub mod strategy;
pub mod types;


pub use listener::*;
pub use manager::*;
pub use strategy::*;
pub use types::*;
