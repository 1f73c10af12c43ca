pub mod instance_variables;
pub mod sidekiq;

#[cfg(test)]
pub(crate) mod fixtures;

use crate::core::config::Config;
use crate::core::error::Result;

pub use instance_variables::{InstanceVariables, InstanceVariablesService};
pub use sidekiq::{SidekiqMetrics, SidekiqService};

pub struct Client<'a> {
    pub http_client: crate::core::client::Client<'a>,
}

impl<'a> Client<'a> {
    pub fn new(config: &'a Config) -> Result<Self> {
        Ok(Self {
            http_client: crate::core::client::Client::new(config)?,
        })
    }
}
