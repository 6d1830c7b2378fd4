use anyhow::{Context, Result};
use tracing::{info, instrument, warn};

use crate::data_import::config::{ErrorPolicy, ImporterConfig};
use crate::data_import::data_set::MerchantProfileDataSet;
use crate::data_import::merchant_profile_writer::MerchantProfileWriterStep;
use crate::data_import::publish::PublishEvents;
use crate::database_ops::entities::{
    GlossaryKeyRow, GlossaryTranslationRow, MerchantProfileRow, UrlRow,
};
use crate::database_ops::repository::Repository;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportFailure {
    /// Zero-based position of the data set in the batch.
    pub position: usize,
    pub id_merchant: Option<i64>,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct DataImporterReport {
    pub imported: usize,
    pub failed: usize,
    pub failures: Vec<ImportFailure>,
    /// Events of every successfully written data set, deduplicated.
    pub events: PublishEvents,
}

impl DataImporterReport {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Runs the writer step over a batch and merges the publish events.
pub struct DataImporter<P, G, U> {
    step: MerchantProfileWriterStep<P, G, U>,
    error_policy: ErrorPolicy,
}

impl<P, G, U> DataImporter<P, G, U>
where
    P: Repository<MerchantProfileRow>,
    G: Repository<GlossaryKeyRow> + Repository<GlossaryTranslationRow>,
    U: Repository<UrlRow>,
{
    pub fn new(step: MerchantProfileWriterStep<P, G, U>, error_policy: ErrorPolicy) -> Self {
        Self { step, error_policy }
    }

    pub fn from_config(profiles: P, glossary: G, urls: U, config: ImporterConfig) -> Self {
        let step =
            MerchantProfileWriterStep::new(profiles, glossary, urls).with_config(config.writer);
        Self::new(step, config.error_policy)
    }

    /// Import every data set in order.
    ///
    /// With [`ErrorPolicy::Abort`] the first failure is returned (the report so far
    /// is dropped); with [`ErrorPolicy::Skip`] it is logged and recorded.
    #[instrument(skip_all, fields(error_policy = ?self.error_policy))]
    pub fn import<'a, I>(&mut self, data_sets: I) -> Result<DataImporterReport>
    where
        I: IntoIterator<Item = &'a MerchantProfileDataSet>,
    {
        let mut report = DataImporterReport::default();

        for (position, data_set) in data_sets.into_iter().enumerate() {
            match self.step.execute(data_set) {
                Ok(events) => {
                    report.imported += 1;
                    report.events.merge(events);
                }
                Err(err) => match self.error_policy {
                    ErrorPolicy::Abort => {
                        return Err(err).with_context(|| {
                            format!(
                                "data set #{position} (id_merchant={:?}) failed",
                                data_set.id_merchant
                            )
                        });
                    }
                    ErrorPolicy::Skip => {
                        warn!(
                            position,
                            id_merchant = ?data_set.id_merchant,
                            error = %err,
                            "data set skipped"
                        );
                        report.failed += 1;
                        report.failures.push(ImportFailure {
                            position,
                            id_merchant: data_set.id_merchant,
                            message: err.to_string(),
                        });
                    }
                },
            }
        }

        info!(
            imported = report.imported,
            failed = report.failed,
            events = report.events.len(),
            "merchant profile import finished"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_import::config::WriterConfig;
    use crate::data_import::error::ImportError;
    use crate::data_import::publish::PublishEventName;
    use crate::database_ops::db::Db;
    use crate::database_ops::memory::{InMemoryGlossaryStore, InMemoryRepository};

    const EN: i64 = 66;

    fn init_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    }

    fn batch() -> Vec<MerchantProfileDataSet> {
        vec![
            MerchantProfileDataSet::new(1).with_localized(EN, "title", "One"),
            MerchantProfileDataSet::default().with_localized(EN, "title", "orphan"),
            MerchantProfileDataSet::new(2)
                .with_localized(EN, "title", "Two")
                .with_localized(EN, "url", "/en/two"),
        ]
    }

    fn config(error_policy: ErrorPolicy) -> ImporterConfig {
        ImporterConfig {
            writer: WriterConfig::default(),
            error_policy,
        }
    }

    #[test]
    fn skip_policy_records_failures_and_continues() {
        init_tracing();
        let mut profiles = InMemoryRepository::<MerchantProfileRow>::new();
        let mut glossary = InMemoryGlossaryStore::new();
        let mut urls = InMemoryRepository::<UrlRow>::new();
        let mut importer = DataImporter::from_config(
            &mut profiles,
            &mut glossary,
            &mut urls,
            config(ErrorPolicy::Skip),
        );

        let report = importer.import(&batch()).unwrap();

        assert_eq!(report.imported, 2);
        assert_eq!(report.failed, 1);
        assert!(!report.is_success());
        assert_eq!(
            report.failures,
            vec![ImportFailure {
                position: 1,
                id_merchant: None,
                message: "\"id_merchant\" is required.".to_string(),
            }]
        );
        assert_eq!(report.events.count_of(PublishEventName::MerchantProfile), 2);
        assert_eq!(report.events.count_of(PublishEventName::GlossaryKey), 2);
        assert_eq!(report.events.count_of(PublishEventName::Url), 1);
        drop(importer);
        assert_eq!(profiles.len(), 2);
    }

    #[test]
    fn abort_policy_stops_at_first_failure() {
        init_tracing();
        let mut profiles = InMemoryRepository::<MerchantProfileRow>::new();
        let mut glossary = InMemoryGlossaryStore::new();
        let mut urls = InMemoryRepository::<UrlRow>::new();
        let mut importer = DataImporter::from_config(
            &mut profiles,
            &mut glossary,
            &mut urls,
            config(ErrorPolicy::Abort),
        );

        let err = importer.import(&batch()).unwrap_err();

        assert!(err.to_string().contains("data set #1"));
        let cause = err.downcast_ref::<ImportError>().unwrap();
        assert!(cause.is_invalid_data());
        drop(importer);
        assert_eq!(profiles.len(), 1);
        assert!(urls.is_empty());
    }

    #[test]
    fn second_run_over_sqlite_only_republishes_profiles() {
        init_tracing();
        let db = Db::open_in_memory().unwrap();
        let data_sets: Vec<_> = batch()
            .into_iter()
            .filter(|d| d.id_merchant.is_some())
            .collect();
        let mut importer = DataImporter::from_config(
            db.repository(),
            db.repository(),
            db.repository(),
            config(ErrorPolicy::Abort),
        );

        let first = importer.import(&data_sets).unwrap();
        assert!(first.is_success());
        assert_eq!(first.events.len(), 5);

        let second = importer.import(&data_sets).unwrap();
        assert_eq!(second.imported, 2);
        let grouped = second.events.grouped();
        assert_eq!(grouped.len(), 1);
        assert_eq!(grouped[&PublishEventName::MerchantProfile].len(), 2);
    }
}
