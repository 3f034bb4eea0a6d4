use std::fmt;

use crate::domain::entities::column::VisibleColumnSet;
use crate::domain::entities::entity::EntityDescriptor;
use crate::domain::entities::list_query::SortDirection;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedPreference {
    pub visible_columns: VisibleColumnSet,
    pub sort_key: String,
    pub sort_direction: SortDirection,
}

impl PersistedPreference {
    pub fn defaults(descriptor: &EntityDescriptor) -> Self {
        Self {
            visible_columns: VisibleColumnSet::defaults(descriptor.columns()),
            sort_key: descriptor.default_sort_key().to_string(),
            sort_direction: descriptor.default_sort_direction(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceKeys {
    pub visible_columns: String,
    pub sort_by: String,
    pub sort_direction: String,
}

impl PreferenceKeys {
    pub fn for_descriptor(descriptor: &EntityDescriptor) -> Self {
        let prefix = descriptor.storage_prefix();
        Self {
            visible_columns: format!("{prefix}.visible_columns"),
            sort_by: format!("{prefix}.sort_by"),
            sort_direction: format!("{prefix}.sort_direction"),
        }
    }

    pub fn all(&self) -> [&str; 3] {
        [&self.visible_columns, &self.sort_by, &self.sort_direction]
    }
}

/// Raw values as read from the store, before any parsing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredPreference {
    pub visible_columns: Option<String>,
    pub sort_by: Option<String>,
    pub sort_direction: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreferenceIssue {
    UnreadableColumns(String),
    UnknownColumn(String),
    MissingLockedColumn,
    UnreadableSortKey(String),
    UnknownSortKey(String),
    UnreadableSortDirection(String),
}

impl fmt::Display for PreferenceIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreferenceIssue::UnreadableColumns(raw) => write!(f, "unreadable column list: {raw}"),
            PreferenceIssue::UnknownColumn(id) => write!(f, "unknown column id: {id}"),
            PreferenceIssue::MissingLockedColumn => write!(f, "locked column missing or misplaced"),
            PreferenceIssue::UnreadableSortKey(raw) => write!(f, "unreadable sort key: {raw}"),
            PreferenceIssue::UnknownSortKey(key) => write!(f, "unknown sort key: {key}"),
            PreferenceIssue::UnreadableSortDirection(raw) => {
                write!(f, "unreadable sort direction: {raw}")
            }
        }
    }
}

/// Turns whatever the store held into a valid preference. Anything that
/// cannot be used falls back to the entity defaults and is reported as an
/// issue instead of an error.
pub fn sanitize_preference(
    descriptor: &EntityDescriptor,
    stored: &StoredPreference,
) -> (PersistedPreference, Vec<PreferenceIssue>) {
    let mut preference = PersistedPreference::defaults(descriptor);
    let mut issues = Vec::new();
    let locked_id = descriptor.locked_column().id.as_str();

    if let Some(raw) = stored.visible_columns.as_deref() {
        match serde_json::from_str::<Vec<String>>(raw) {
            Ok(ids) => {
                for id in &ids {
                    if descriptor.column(id).is_none() {
                        issues.push(PreferenceIssue::UnknownColumn(id.clone()));
                    }
                }
                if ids.first().map(String::as_str) != Some(locked_id) {
                    issues.push(PreferenceIssue::MissingLockedColumn);
                }
                preference.visible_columns =
                    VisibleColumnSet::sanitize(&ids, descriptor.columns(), locked_id);
            }
            Err(_) => issues.push(PreferenceIssue::UnreadableColumns(raw.to_string())),
        }
    }

    let mut sort_key_valid = true;
    if let Some(raw) = stored.sort_by.as_deref() {
        match serde_json::from_str::<String>(raw) {
            Ok(key) if descriptor.is_sortable(&key) => preference.sort_key = key,
            Ok(key) => {
                sort_key_valid = false;
                issues.push(PreferenceIssue::UnknownSortKey(key));
            }
            Err(_) => {
                sort_key_valid = false;
                issues.push(PreferenceIssue::UnreadableSortKey(raw.to_string()));
            }
        }
    }

    // A direction only means something next to the key it was stored with.
    if let Some(raw) = stored.sort_direction.as_deref() {
        let parsed = serde_json::from_str::<String>(raw)
            .ok()
            .and_then(|value| SortDirection::parse(&value));
        match parsed {
            Some(direction) if sort_key_valid => preference.sort_direction = direction,
            Some(_) => {}
            None => issues.push(PreferenceIssue::UnreadableSortDirection(raw.to_string())),
        }
    }

    (preference, issues)
}

pub fn encode_visible_columns(columns: &VisibleColumnSet) -> String {
    serde_json::Value::from(columns.ids().to_vec()).to_string()
}

pub fn encode_text(value: &str) -> String {
    serde_json::Value::from(value).to_string()
}
