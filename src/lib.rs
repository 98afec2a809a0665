pub mod api;
pub mod cli;
pub mod config;
pub mod console;
pub mod error;
pub mod form;
pub mod mirror;
pub mod model;
pub mod notify;
pub mod upload;

pub use api::{HttpApi, ResourceApi};
pub use config::Config;
pub use console::Console;
pub use error::{ApiError, ConsoleError, SubmitError, ValidationError};
pub use mirror::Mirror;
pub use notify::{Level, NotificationCenter};
