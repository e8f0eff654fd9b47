pub mod api;
pub mod bootstrap;
pub mod error;
pub mod health;
pub mod openapi;

pub use bootstrap::{bootstrap, bootstrap_with_config, build_router, Application, BootstrapError};
