pub mod api;
pub mod config;
pub mod credentials;
pub mod errors;

#[cfg(test)]
mod testutils;
