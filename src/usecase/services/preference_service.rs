use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::column::VisibleColumnSet;
use crate::domain::entities::entity::EntityDescriptor;
use crate::domain::entities::list_query::SortDirection;
use crate::domain::entities::preference::{
    encode_text, encode_visible_columns, sanitize_preference, PersistedPreference,
    PreferenceKeys, StoredPreference,
};
use crate::usecase::ports::preference_store::PreferenceStore;

/// Reads and writes list-view preferences. Store failures are logged and
/// never reach the caller.
#[derive(Clone)]
pub struct PreferenceService {
    store: Arc<dyn PreferenceStore>,
}

impl PreferenceService {
    pub fn new(store: Arc<dyn PreferenceStore>) -> Self {
        Self { store }
    }

    pub fn load(&self, descriptor: &EntityDescriptor) -> PersistedPreference {
        let keys = PreferenceKeys::for_descriptor(descriptor);
        let stored = StoredPreference {
            visible_columns: self.read(&keys.visible_columns),
            sort_by: self.read(&keys.sort_by),
            sort_direction: self.read(&keys.sort_direction),
        };

        let (preference, issues) = sanitize_preference(descriptor, &stored);
        for issue in issues {
            warn!(
                entity = descriptor.kind().slug(),
                "ignoring stored list preference: {issue}"
            );
        }
        preference
    }

    pub fn save_visible_columns(&self, descriptor: &EntityDescriptor, columns: &VisibleColumnSet) {
        let keys = PreferenceKeys::for_descriptor(descriptor);
        self.write(&keys.visible_columns, &encode_visible_columns(columns));
    }

    pub fn save_sort(&self, descriptor: &EntityDescriptor, key: &str, direction: SortDirection) {
        let keys = PreferenceKeys::for_descriptor(descriptor);
        self.write(&keys.sort_by, &encode_text(key));
        self.write(&keys.sort_direction, &encode_text(direction.as_str()));
    }

    pub fn clear(&self, descriptor: &EntityDescriptor) {
        let keys = PreferenceKeys::for_descriptor(descriptor);
        for key in keys.all() {
            if let Err(err) = self.store.remove(key) {
                warn!(key, "failed to remove list preference: {err}");
            }
        }
    }

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(err) => {
                warn!(key, "failed to read list preference: {err}");
                None
            }
        }
    }

    fn write(&self, key: &str, value: &str) {
        match self.store.set(key, value) {
            Ok(()) => debug!(key, "stored list preference"),
            Err(err) => warn!(key, "failed to store list preference: {err}"),
        }
    }
}
