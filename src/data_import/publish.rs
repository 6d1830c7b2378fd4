use std::fmt;

use indexmap::{IndexMap, IndexSet};

/// Publish event names understood by the storefront publisher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PublishEventName {
    MerchantProfile,
    GlossaryKey,
    Url,
}

impl PublishEventName {
    pub fn as_str(self) -> &'static str {
        match self {
            PublishEventName::MerchantProfile => "Entity.spy_merchant_profile.publish",
            PublishEventName::GlossaryKey => "Glossary.key.publish",
            PublishEventName::Url => "Url.publish",
        }
    }
}

impl fmt::Display for PublishEventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublishEvent {
    pub name: PublishEventName,
    pub entity_id: i64,
}

/// Publish events produced by one or more step runs.
///
/// An entity is queued once per event name no matter how often it is touched;
/// iteration follows first-emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishEvents {
    events: IndexSet<PublishEvent>,
}

impl PublishEvents {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an event; false when it was already queued.
    pub fn add(&mut self, name: PublishEventName, entity_id: i64) -> bool {
        self.events.insert(PublishEvent { name, entity_id })
    }

    pub fn merge(&mut self, other: PublishEvents) {
        self.events.extend(other.events);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn contains(&self, name: PublishEventName, entity_id: i64) -> bool {
        self.events.contains(&PublishEvent { name, entity_id })
    }

    pub fn count_of(&self, name: PublishEventName) -> usize {
        self.events.iter().filter(|e| e.name == name).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PublishEvent> {
        self.events.iter()
    }

    /// Entity ids per event name, the shape a publisher triggers in bulk.
    pub fn grouped(&self) -> IndexMap<PublishEventName, Vec<i64>> {
        let mut grouped: IndexMap<PublishEventName, Vec<i64>> = IndexMap::new();
        for event in &self.events {
            grouped.entry(event.name).or_default().push(event.entity_id);
        }
        grouped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicates_are_queued_once() {
        let mut events = PublishEvents::new();
        assert!(events.add(PublishEventName::GlossaryKey, 4));
        assert!(!events.add(PublishEventName::GlossaryKey, 4));
        assert!(events.add(PublishEventName::Url, 4));
        assert_eq!(events.len(), 2);
    }

    #[test]
    fn merge_keeps_first_emission_order() {
        let mut first = PublishEvents::new();
        first.add(PublishEventName::Url, 1);
        first.add(PublishEventName::MerchantProfile, 1);

        let mut second = PublishEvents::new();
        second.add(PublishEventName::MerchantProfile, 1);
        second.add(PublishEventName::MerchantProfile, 2);

        first.merge(second);
        let order: Vec<(PublishEventName, i64)> =
            first.iter().map(|e| (e.name, e.entity_id)).collect();
        assert_eq!(
            order,
            vec![
                (PublishEventName::Url, 1),
                (PublishEventName::MerchantProfile, 1),
                (PublishEventName::MerchantProfile, 2),
            ]
        );
    }

    #[test]
    fn grouped_collects_ids_per_name() {
        let mut events = PublishEvents::new();
        events.add(PublishEventName::GlossaryKey, 1);
        events.add(PublishEventName::MerchantProfile, 9);
        events.add(PublishEventName::GlossaryKey, 2);

        let grouped = events.grouped();
        assert_eq!(grouped[&PublishEventName::GlossaryKey], vec![1, 2]);
        assert_eq!(grouped[&PublishEventName::MerchantProfile], vec![9]);
        assert_eq!(events.count_of(PublishEventName::Url), 0);
    }

    #[test]
    fn names_match_publisher_contract() {
        assert_eq!(
            PublishEventName::MerchantProfile.to_string(),
            "Entity.spy_merchant_profile.publish"
        );
        assert_eq!(PublishEventName::GlossaryKey.as_str(), "Glossary.key.publish");
        assert_eq!(PublishEventName::Url.as_str(), "Url.publish");
    }
}
