pub mod config;
pub mod distribute;
pub mod error;
pub mod facade;
pub mod generate;
pub mod io;
pub mod model;
pub mod store;
pub mod validate;

pub use error::{Result, ToolError};
