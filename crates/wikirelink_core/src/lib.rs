pub mod config;
pub mod input;
pub mod rewrite;
pub mod runtime;

pub use rewrite::transform;
