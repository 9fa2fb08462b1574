pub mod cache;
pub mod common;
pub mod fetch;
pub mod lifecycle;
pub mod push;
