//! In-memory alarm collection. Lives for the session only.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::model::{Alarm, AlarmId, NewAlarm};

/// Store shared between the form, the list and the map view.
pub type SharedAlarms = Arc<Mutex<AlarmStore>>;

/// Alarms in insertion order.
#[derive(Debug, Clone, Default)]
pub struct AlarmStore {
    alarms: Vec<Alarm>,
}

impl AlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedAlarms {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Appends a new alarm and returns its freshly generated id.
    pub fn add(&mut self, new: NewAlarm) -> AlarmId {
        let mut id = AlarmId::generate();
        while self.get(&id).is_some() {
            id = AlarmId::generate();
        }

        tracing::info!("Added alarm '{}' ({}) at {}, {}", new.name, id, new.latitude, new.longitude);

        self.alarms.push(Alarm {
            id,
            latitude: new.latitude,
            longitude: new.longitude,
            name: new.name,
            message: new.message,
            category: new.category,
            estimated_time: None,
        });

        id
    }

    /// Removes the alarm with `id`. Returns `false` if there was none.
    pub fn delete(&mut self, id: &AlarmId) -> bool {
        let before = self.alarms.len();
        self.alarms.retain(|a| a.id != *id);
        let removed = self.alarms.len() != before;
        if removed {
            tracing::info!("Deleted alarm {}", id);
        }
        removed
    }

    pub fn set_estimated_time(&mut self, id: &AlarmId, label: impl Into<String>) -> bool {
        match self.alarms.iter_mut().find(|a| a.id == *id) {
            Some(alarm) => {
                alarm.estimated_time = Some(label.into());
                true
            }
            None => false,
        }
    }

    pub fn get(&self, id: &AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|a| a.id == *id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Alarm> {
        self.alarms.iter()
    }

    pub fn as_slice(&self) -> &[Alarm] {
        &self.alarms
    }

    /// Owned copy, for work that must not hold the lock.
    pub fn snapshot(&self) -> Vec<Alarm> {
        self.alarms.clone()
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Category;
    use std::collections::HashSet;

    fn new_alarm(name: &str) -> NewAlarm {
        NewAlarm {
            latitude: 12.9,
            longitude: 77.6,
            name: name.into(),
            message: "(No message)".into(),
            category: Category::Work,
        }
    }

    #[test]
    fn add_appends_in_order_with_unique_ids() {
        let mut store = AlarmStore::new();
        let ids: Vec<_> = (0..50).map(|i| store.add(new_alarm(&format!("alarm {i}")))).collect();

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());

        let names: Vec<_> = store.iter().map(|a| a.name.clone()).collect();
        assert_eq!(names.first().map(String::as_str), Some("alarm 0"));
        assert_eq!(names.last().map(String::as_str), Some("alarm 49"));
        assert!(store.iter().all(|a| a.estimated_time.is_none()));
    }

    #[test]
    fn delete_removes_only_the_target() {
        let mut store = AlarmStore::new();
        let home = store.add(new_alarm("Home"));
        let work = store.add(new_alarm("Work"));

        assert!(store.delete(&home));
        assert_eq!(store.len(), 1);
        assert!(store.get(&work).is_some());
    }

    #[test]
    fn delete_missing_id_is_noop() {
        let mut store = AlarmStore::new();
        store.add(new_alarm("Home"));
        let before = store.snapshot();

        assert!(!store.delete(&AlarmId::generate()));
        assert_eq!(store.snapshot(), before);
    }

    #[test]
    fn set_estimated_time_updates_matching_alarm() {
        let mut store = AlarmStore::new();
        let id = store.add(new_alarm("Home"));

        assert!(store.set_estimated_time(&id, "12 min"));
        assert_eq!(store.get(&id).unwrap().estimated_time.as_deref(), Some("12 min"));

        assert!(!store.set_estimated_time(&AlarmId::generate(), "5 min"));
    }
}
