pub mod client;
pub mod config;
pub mod error;
pub mod request;

#[cfg(test)]
pub(crate) mod test_server;
