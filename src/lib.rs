pub mod core;
pub mod gitlab;
pub mod settings;

pub use crate::core::config::Config;
pub use crate::core::error::{ApiError, Error, Result};
pub use crate::core::request::{ListOptions, Page, Pagination, RequestOption, Response};
