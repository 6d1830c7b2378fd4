//! Writer step of the merchant profile import.
//!
//! One data set becomes: the merchant profile row, a glossary key plus
//! translation per localized text attribute, and a URL row per locale. Only rows
//! that were actually written produce publish events; the profile itself is
//! always published.
use indexmap::IndexMap;
use tracing::{debug, info, instrument};

use crate::data_import::config::WriterConfig;
use crate::data_import::data_set::{MerchantProfileDataSet, ID_MERCHANT};
use crate::data_import::error::ImportError;
use crate::data_import::publish::{PublishEventName, PublishEvents};
use crate::database_ops::entities::{
    GlossaryKeyRow, GlossaryTranslationRow, MerchantProfileRow, UrlRow,
};
use crate::database_ops::repository::Repository;
use crate::database_ops::tracked::Tracked;
use crate::normalization::glossary_key::MerchantGlossaryKey;
use crate::normalization::value::{is_blank, is_blank_str};

pub struct MerchantProfileWriterStep<P, G, U> {
    profiles: P,
    glossary: G,
    urls: U,
    config: WriterConfig,
}

impl<P, G, U> MerchantProfileWriterStep<P, G, U>
where
    P: Repository<MerchantProfileRow>,
    G: Repository<GlossaryKeyRow> + Repository<GlossaryTranslationRow>,
    U: Repository<UrlRow>,
{
    pub fn new(profiles: P, glossary: G, urls: U) -> Self {
        Self {
            profiles,
            glossary,
            urls,
            config: WriterConfig::default(),
        }
    }

    pub fn with_config(mut self, config: WriterConfig) -> Self {
        self.config = config;
        self
    }

    /// Write one data set and return the publish events it caused.
    ///
    /// Validation happens before the first read, so an invalid data set leaves the
    /// stores untouched. Store errors are returned as they come; rolling back the
    /// writes that already happened is the caller's transaction's job.
    #[instrument(skip_all, fields(id_merchant = ?data_set.id_merchant))]
    pub fn execute(
        &mut self,
        data_set: &MerchantProfileDataSet,
    ) -> Result<PublishEvents, ImportError> {
        let id_merchant = self.validate_data_set(data_set)?;
        let mut events = PublishEvents::new();

        let mut profile = self.profiles.find_or_create(&id_merchant)?;
        profile.row_mut().apply_attributes(
            data_set
                .attributes
                .iter()
                .filter(|(_, value)| !is_blank(value)),
        );
        self.profiles.save(&mut profile)?;

        self.save_localized_attributes(
            &mut profile,
            &data_set.localized_attributes,
            &mut events,
        )?;

        // Glossary references were added to the profile above.
        self.profiles.save(&mut profile)?;
        let id_merchant_profile = profile.persisted_id()?;
        events.add(PublishEventName::MerchantProfile, id_merchant_profile);

        info!(
            id_merchant,
            id_merchant_profile,
            events = events.len(),
            "merchant profile imported"
        );
        Ok(events)
    }

    /// Check every required key and return the merchant id.
    fn validate_data_set(&self, data_set: &MerchantProfileDataSet) -> Result<i64, ImportError> {
        for key in &self.config.required_keys {
            let present = data_set.get(key).is_some_and(|value| !is_blank(&value));
            if !present {
                return Err(ImportError::InvalidData { key: key.clone() });
            }
        }
        // The merchant id is the profile's identity, required or not.
        match data_set.id_merchant {
            Some(id) if id > 0 => Ok(id),
            _ => Err(ImportError::InvalidData {
                key: ID_MERCHANT.to_string(),
            }),
        }
    }

    fn save_localized_attributes(
        &mut self,
        profile: &mut Tracked<MerchantProfileRow>,
        localized_attributes: &IndexMap<i64, IndexMap<String, String>>,
        events: &mut PublishEvents,
    ) -> Result<(), ImportError> {
        let id_merchant = profile.row().fk_merchant;
        let id_merchant_profile = profile.persisted_id()?;

        for (&id_locale, attributes) in localized_attributes {
            for (attribute, value) in attributes {
                let attribute = attribute.trim();
                if is_blank_str(value) {
                    debug!(id_locale, attribute = %attribute, "blank localized value skipped");
                    continue;
                }
                if attribute == self.config.url_attribute {
                    self.save_url(id_merchant_profile, id_locale, value, events)?;
                    continue;
                }

                let key = MerchantGlossaryKey::new(
                    &self.config.glossary_key_prefix,
                    attribute,
                    id_merchant,
                );
                profile.row_mut().set_glossary_key(attribute, key.as_str());
                self.save_glossary_translation(key, id_locale, value, events)?;
            }
        }
        Ok(())
    }

    fn save_glossary_translation(
        &mut self,
        key: MerchantGlossaryKey,
        id_locale: i64,
        value: &str,
        events: &mut PublishEvents,
    ) -> Result<(), ImportError> {
        let mut key_row: Tracked<GlossaryKeyRow> =
            Repository::<GlossaryKeyRow>::find_or_create(&mut self.glossary, &key.into_string())?;
        // No-op for a key that already exists.
        let key_changed = Repository::<GlossaryKeyRow>::save(&mut self.glossary, &mut key_row)?;
        let id_glossary_key = key_row.persisted_id()?;

        let mut translation: Tracked<GlossaryTranslationRow> =
            Repository::<GlossaryTranslationRow>::find_or_create(
                &mut self.glossary,
                &(id_glossary_key, id_locale),
            )?;
        translation.row_mut().value = value.to_string();
        let translation_changed =
            Repository::<GlossaryTranslationRow>::save(&mut self.glossary, &mut translation)?;

        debug!(
            id_glossary_key,
            id_locale,
            ?key_changed,
            ?translation_changed,
            "glossary translation processed"
        );
        if key_changed.is_changed() || translation_changed.is_changed() {
            events.add(PublishEventName::GlossaryKey, id_glossary_key);
        }
        Ok(())
    }

    fn save_url(
        &mut self,
        id_merchant_profile: i64,
        id_locale: i64,
        value: &str,
        events: &mut PublishEvents,
    ) -> Result<(), ImportError> {
        let mut url = self.urls.find_or_create(&(id_merchant_profile, id_locale))?;
        url.row_mut().url = value.to_string();
        let changed = self.urls.save(&mut url)?;
        let id_url = url.persisted_id()?;

        debug!(id_url, id_locale, ?changed, "merchant profile url processed");
        if changed.is_changed() {
            events.add(PublishEventName::Url, id_url);
        }
        Ok(())
    }
}
