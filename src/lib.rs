pub mod catalog;
pub mod chartrepo;
pub mod error;
pub mod filter;
pub mod http;
pub mod model;
pub mod project;

pub use error::{Error, Result};
