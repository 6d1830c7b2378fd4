pub mod config;
pub mod data_set;
pub mod error;
pub mod importer;
pub mod merchant_profile_writer;
pub mod publish;
