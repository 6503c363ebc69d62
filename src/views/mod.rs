pub mod cat;
pub mod homepage;
pub mod layout;
pub mod result;

// Re-export commonly used functions from layout
pub use layout::{page, render, titled};
