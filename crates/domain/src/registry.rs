//! Registry — bus identity to device record.
//!
//! Entries are created once per identity and never removed; the bus has no
//! removal event.

use std::collections::HashMap;
use std::collections::hash_map::Entry;

use crate::id::DeviceIdentity;
use crate::record::DeviceRecord;

#[derive(Debug, Default)]
pub struct Registry {
    records: HashMap<DeviceIdentity, DeviceRecord>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn contains(&self, identity: &DeviceIdentity) -> bool {
        self.records.contains_key(identity)
    }

    #[must_use]
    pub fn get(&self, identity: &DeviceIdentity) -> Option<&DeviceRecord> {
        self.records.get(identity)
    }

    pub fn get_mut(&mut self, identity: &DeviceIdentity) -> Option<&mut DeviceRecord> {
        self.records.get_mut(identity)
    }

    /// Insert a record for a new identity.
    ///
    /// Returns the stored record, or `None` (leaving the existing entry
    /// untouched) when the identity is already registered.
    pub fn insert(&mut self, record: DeviceRecord) -> Option<&mut DeviceRecord> {
        match self.records.entry(record.identity().clone()) {
            Entry::Occupied(_) => None,
            Entry::Vacant(slot) => Some(slot.insert(record)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DeviceRecord> {
        self.records.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::DeviceCategory;

    #[test]
    fn should_insert_new_identity_once() {
        let mut registry = Registry::new();
        assert!(registry.insert(DeviceRecord::new("1".into(), "A", "pir")).is_some());
        assert!(registry.insert(DeviceRecord::new("1".into(), "B", "temp")).is_none());
        assert_eq!(registry.len(), 1);

        let kept = registry.get(&"1".into()).unwrap();
        assert_eq!(kept.name(), "A");
        assert_eq!(kept.category(), DeviceCategory::Motion);
    }

    #[test]
    fn should_mutate_record_in_place() {
        let mut registry = Registry::new();
        registry.insert(DeviceRecord::new("2".into(), "Lamp", "lightchannel"));
        let _ = registry.get_mut(&"2".into()).unwrap().send_on_off(true);
        assert_eq!(registry.get(&"2".into()).unwrap().state(), Some(true));
    }

    #[test]
    fn should_report_unknown_identity() {
        let registry = Registry::new();
        assert!(registry.is_empty());
        assert!(!registry.contains(&"nope".into()));
        assert!(registry.get(&"nope".into()).is_none());
    }
}
