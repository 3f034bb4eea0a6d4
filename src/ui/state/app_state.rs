use std::sync::Arc;

use dioxus::prelude::{use_signal, Signal};

use crate::config::AppConfig;
use crate::domain::entities::entity::{EntityDescriptor, EntityKind};
use crate::usecase::ports::data_provider::PagedDataProvider;
use crate::usecase::services::list_view_controller::ListViewController;
use crate::usecase::services::preference_service::PreferenceService;

pub type Record = serde_json::Value;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropdownId {
    Sort,
    Columns,
}

/// Long-lived collaborators shared with every list page through context.
#[derive(Clone)]
pub struct AppServices {
    pub config: Arc<AppConfig>,
    pub provider: Arc<dyn PagedDataProvider<Record>>,
    pub preferences: PreferenceService,
}

pub struct AppState {
    pub active_entity: Signal<EntityKind>,
    pub status: Signal<String>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            active_entity: use_signal(|| EntityKind::Contacts),
            status: use_signal(|| "Ready".to_string()),
        }
    }
}

pub struct ListPageState {
    pub controller: Signal<ListViewController<Record>>,
    pub open_dropdown: Signal<Option<DropdownId>>,
    pub dropdown_pos: Signal<Option<(f64, f64)>>,
    pub page_input: Signal<String>,
}

impl ListPageState {
    pub fn new(descriptor: Arc<EntityDescriptor>, services: &AppServices) -> Self {
        let preferences = services.preferences.clone();
        let page_size = services.config.page_size;
        Self {
            controller: use_signal(move || {
                ListViewController::new(descriptor, preferences, page_size)
            }),
            open_dropdown: use_signal(|| None::<DropdownId>),
            dropdown_pos: use_signal(|| None::<(f64, f64)>),
            page_input: use_signal(String::new),
        }
    }
}
