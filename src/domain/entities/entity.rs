use std::collections::BTreeSet;

use thiserror::Error;

use crate::domain::entities::column::{ColumnKind, ColumnSpec};
use crate::domain::entities::list_query::SortDirection;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Contacts,
    Developers,
    Owners,
    Inventory,
    TenancyContracts,
    Properties,
    Projects,
    Reports,
}

impl EntityKind {
    pub const ALL: [EntityKind; 8] = [
        EntityKind::Contacts,
        EntityKind::Developers,
        EntityKind::Owners,
        EntityKind::Inventory,
        EntityKind::TenancyContracts,
        EntityKind::Properties,
        EntityKind::Projects,
        EntityKind::Reports,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            EntityKind::Contacts => "contacts",
            EntityKind::Developers => "developers",
            EntityKind::Owners => "owners",
            EntityKind::Inventory => "inventory",
            EntityKind::TenancyContracts => "tenancy_contracts",
            EntityKind::Properties => "properties",
            EntityKind::Projects => "projects",
            EntityKind::Reports => "reports",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityKind::Contacts => "Contacts",
            EntityKind::Developers => "Developers",
            EntityKind::Owners => "Owners",
            EntityKind::Inventory => "Inventory",
            EntityKind::TenancyContracts => "Tenancy Contracts",
            EntityKind::Properties => "Properties",
            EntityKind::Projects => "Projects",
            EntityKind::Reports => "Reports",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    #[error("{entity}: no columns declared")]
    NoColumns { entity: &'static str },

    #[error("{entity}: duplicate column id {id}")]
    DuplicateColumn { entity: &'static str, id: String },

    #[error("{entity}: expected exactly one locked column, found {count}")]
    LockedColumnCount { entity: &'static str, count: usize },

    #[error("{entity}: locked column {id} must be declared first")]
    LockedColumnNotFirst { entity: &'static str, id: String },

    #[error("{entity}: no sort options declared")]
    NoSortOptions { entity: &'static str },

    #[error("{entity}: duplicate sort key {key}")]
    DuplicateSortKey { entity: &'static str, key: String },

    #[error("{entity}: default sort key {key} is not a declared sort option")]
    UnknownDefaultSort { entity: &'static str, key: String },
}

/// Everything a list view needs to know about one entity type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityDescriptor {
    kind: EntityKind,
    columns: Vec<ColumnSpec>,
    sort_options: Vec<SortOption>,
    default_sort_key: String,
    default_sort_direction: SortDirection,
    storage_prefix: String,
    endpoint: String,
}

impl EntityDescriptor {
    pub fn builder(kind: EntityKind) -> EntityDescriptorBuilder {
        EntityDescriptorBuilder::new(kind)
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn columns(&self) -> &[ColumnSpec] {
        &self.columns
    }

    pub fn column(&self, id: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|column| column.id == id)
    }

    pub fn locked_column(&self) -> &ColumnSpec {
        // build() guarantees the locked column sits at index 0
        &self.columns[0]
    }

    pub fn sort_options(&self) -> &[SortOption] {
        &self.sort_options
    }

    pub fn is_sortable(&self, key: &str) -> bool {
        self.sort_options.iter().any(|option| option.key == key)
    }

    pub fn default_sort_key(&self) -> &str {
        &self.default_sort_key
    }

    pub fn default_sort_direction(&self) -> SortDirection {
        self.default_sort_direction
    }

    pub fn storage_prefix(&self) -> &str {
        &self.storage_prefix
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

pub struct EntityDescriptorBuilder {
    kind: EntityKind,
    columns: Vec<ColumnSpec>,
    sort_options: Vec<SortOption>,
    default_sort: Option<(String, SortDirection)>,
    storage_prefix: Option<String>,
    endpoint: Option<String>,
}

impl EntityDescriptorBuilder {
    fn new(kind: EntityKind) -> Self {
        Self {
            kind,
            columns: Vec::new(),
            sort_options: Vec::new(),
            default_sort: None,
            storage_prefix: None,
            endpoint: None,
        }
    }

    pub fn locked_column(mut self, id: &str, title: &str) -> Self {
        self.columns.push(ColumnSpec::new(id, title).kind(ColumnKind::Identifier).locked());
        self
    }

    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.columns.push(column);
        self
    }

    pub fn sort_option(mut self, key: &str, label: &str) -> Self {
        self.sort_options.push(SortOption {
            key: key.to_string(),
            label: label.to_string(),
        });
        self
    }

    pub fn default_sort(mut self, key: &str, direction: SortDirection) -> Self {
        self.default_sort = Some((key.to_string(), direction));
        self
    }

    #[allow(dead_code)]
    pub fn storage_prefix(mut self, prefix: &str) -> Self {
        self.storage_prefix = Some(prefix.to_string());
        self
    }

    pub fn endpoint(mut self, endpoint: &str) -> Self {
        self.endpoint = Some(endpoint.to_string());
        self
    }

    pub fn build(self) -> Result<EntityDescriptor, DescriptorError> {
        let entity = self.kind.slug();

        if self.columns.is_empty() {
            return Err(DescriptorError::NoColumns { entity });
        }

        let mut ids = BTreeSet::new();
        for column in &self.columns {
            if !ids.insert(column.id.as_str()) {
                return Err(DescriptorError::DuplicateColumn {
                    entity,
                    id: column.id.clone(),
                });
            }
        }

        let locked: Vec<&ColumnSpec> = self.columns.iter().filter(|c| c.locked).collect();
        if locked.len() != 1 {
            return Err(DescriptorError::LockedColumnCount {
                entity,
                count: locked.len(),
            });
        }
        if !self.columns[0].locked {
            return Err(DescriptorError::LockedColumnNotFirst {
                entity,
                id: locked[0].id.clone(),
            });
        }

        if self.sort_options.is_empty() {
            return Err(DescriptorError::NoSortOptions { entity });
        }
        let mut keys = BTreeSet::new();
        for option in &self.sort_options {
            if !keys.insert(option.key.as_str()) {
                return Err(DescriptorError::DuplicateSortKey {
                    entity,
                    key: option.key.clone(),
                });
            }
        }

        let (default_sort_key, default_sort_direction) = self
            .default_sort
            .unwrap_or_else(|| (self.sort_options[0].key.clone(), SortDirection::Desc));
        if !keys.contains(default_sort_key.as_str()) {
            return Err(DescriptorError::UnknownDefaultSort {
                entity,
                key: default_sort_key,
            });
        }

        Ok(EntityDescriptor {
            kind: self.kind,
            columns: self.columns,
            sort_options: self.sort_options,
            default_sort_key,
            default_sort_direction,
            storage_prefix: self.storage_prefix.unwrap_or_else(|| entity.to_string()),
            endpoint: self
                .endpoint
                .unwrap_or_else(|| format!("/{}", entity.replace('_', "-"))),
        })
    }
}
