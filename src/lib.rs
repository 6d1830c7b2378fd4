//! Merchant profile import: writes normalized merchant profile data sets into the
//! profile, glossary and URL stores and reports what needs re-publishing.
pub mod data_import;
pub mod database_ops;
pub mod normalization;

pub mod util {
    pub mod env;
}

pub use data_import::config::{ErrorPolicy, ImporterConfig, WriterConfig};
pub use data_import::data_set::MerchantProfileDataSet;
pub use data_import::error::ImportError;
pub use data_import::importer::{DataImporter, DataImporterReport};
pub use data_import::merchant_profile_writer::MerchantProfileWriterStep;
pub use data_import::publish::{PublishEvent, PublishEventName, PublishEvents};
pub use database_ops::error::StoreError;
