pub mod api_defaults;
pub mod cache;
pub mod cli;
pub mod cmds;
pub mod config;
pub mod error;
pub mod http;
pub mod io;
pub mod notify;
pub mod proxy;
pub mod refresh;
pub mod test;
pub mod time;
pub type Result<T> = anyhow::Result<T>;
pub type Error = anyhow::Error;
pub type Cmd<T> = Box<dyn FnOnce() -> Result<T> + Send + Sync>;

#[macro_use]
extern crate log;

#[macro_use]
extern crate lazy_static;

#[macro_use]
extern crate derive_builder;
