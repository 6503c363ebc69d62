pub mod cat;
pub mod homepage;
