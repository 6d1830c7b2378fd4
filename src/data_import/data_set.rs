use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Data set key of the merchant id.
pub const ID_MERCHANT: &str = "id_merchant";
/// Localized attribute that holds the profile URL instead of a translatable text.
pub const URL: &str = "url";

/// One normalized merchant profile row, as handed over by the extraction steps.
///
/// `localized_attributes` maps a locale id to attribute name -> value. Map order is
/// kept, so rows are written in the order the source listed them. Deserialize from
/// text (`serde_json::from_str`); going through `serde_json::Value` sorts object
/// keys and loses that order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MerchantProfileDataSet {
    #[serde(default)]
    pub id_merchant: Option<i64>,
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    #[serde(default)]
    pub localized_attributes: IndexMap<i64, IndexMap<String, String>>,
}

impl MerchantProfileDataSet {
    pub fn new(id_merchant: i64) -> Self {
        Self {
            id_merchant: Some(id_merchant),
            ..Default::default()
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    pub fn with_localized(
        mut self,
        id_locale: i64,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.localized_attributes
            .entry(id_locale)
            .or_default()
            .insert(name.into(), value.into());
        self
    }

    /// Value of a data set key; `id_merchant` is a dedicated field, everything else
    /// lives in `attributes`.
    pub fn get(&self, key: &str) -> Option<Value> {
        if key == ID_MERCHANT {
            return self.id_merchant.map(Value::from);
        }
        self.attributes.get(key).cloned()
    }
}
