pub mod dates;
pub mod day;
pub mod db;
pub mod error;
pub mod goals;
pub mod migration;
pub mod models;
pub mod range;
pub mod service;
pub mod settings;
pub mod store;

#[cfg(test)]
mod test_support;
