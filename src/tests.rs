use std::collections::{BTreeMap, VecDeque};
use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use async_trait::async_trait;
use chrono::NaiveDate;
use rusqlite::Connection;
use serde_json::{json, Value};

use crate::config::{parse_config_file, AppConfig, ConfigError, ConfigFile};
use crate::domain::entities::column::{ColumnKind, ColumnSpec, VisibleColumnSet};
use crate::domain::entities::entity::{DescriptorError, EntityDescriptor, EntityKind};
use crate::domain::entities::list_query::{ListQuery, PagedResult, SortDirection};
use crate::domain::entities::preference::{
    sanitize_preference, PersistedPreference, PreferenceIssue, PreferenceKeys, StoredPreference,
};
use crate::ensure_webview_data_dir;
use crate::infra::export::csv::{export_rows_to_csv, write_csv};
use crate::infra::rest::client::{decode_page, endpoint_url, error_message, RestDataProvider};
use crate::infra::sqlite::repo::SqlitePreferenceStore;
use crate::infra::sqlite::schema::init_db;
use crate::logging::{default_filter, init_tracing};
use crate::ui::format::{
    cell_text, column_alignment, format_cell_value, format_number_with_commas,
};
use crate::ui::table::{build_grid, export_file_name, page_summary};
use crate::usecase::ports::data_provider::{PagedDataProvider, ProviderError};
use crate::usecase::ports::preference_store::{PreferenceStore, StoreError};
use crate::usecase::services::debounce::{wait_until_settled, Debouncer};
use crate::usecase::services::list_view_controller::{
    ListViewController, ListViewError, LoadState,
};
use crate::usecase::services::preference_service::PreferenceService;

fn unique_test_dir(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("propdash-{prefix}-{nanos}"))
}

#[derive(Default)]
struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    fn with(entries: &[(&str, &str)]) -> Arc<Self> {
        let store = MemoryStore::default();
        {
            let mut values = store.values.lock().expect("store lock");
            for (key, value) in entries {
                values.insert(key.to_string(), value.to_string());
            }
        }
        Arc::new(store)
    }

    fn value(&self, key: &str) -> Option<String> {
        self.values.lock().expect("store lock").get(key).cloned()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .expect("store lock")
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().expect("store lock").remove(key);
        Ok(())
    }
}

struct FailingStore;

impl PreferenceStore for FailingStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable("disk gone".to_string()))
    }

    fn set(&self, _key: &str, _value: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk gone".to_string()))
    }

    fn remove(&self, _key: &str) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk gone".to_string()))
    }
}

#[derive(Default)]
struct RecordingProvider {
    queries: Mutex<Vec<ListQuery>>,
    outcomes: Mutex<VecDeque<Result<PagedResult<Value>, ProviderError>>>,
}

impl RecordingProvider {
    fn push(&self, outcome: Result<PagedResult<Value>, ProviderError>) {
        self.outcomes.lock().expect("outcome lock").push_back(outcome);
    }

    fn queries(&self) -> Vec<ListQuery> {
        self.queries.lock().expect("query lock").clone()
    }
}

#[async_trait]
impl PagedDataProvider<Value> for RecordingProvider {
    async fn fetch(
        &self,
        _entity: EntityKind,
        query: &ListQuery,
    ) -> Result<PagedResult<Value>, ProviderError> {
        self.queries.lock().expect("query lock").push(query.clone());
        let next = self.outcomes.lock().expect("outcome lock").pop_front();
        next.unwrap_or_else(|| Ok(PagedResult::new(Vec::new(), 0, query.page, query.page_size)))
    }
}

fn contacts() -> Arc<EntityDescriptor> {
    Arc::new(
        EntityKind::Contacts
            .descriptor()
            .expect("contacts descriptor should build"),
    )
}

fn controller_with(store: Arc<dyn PreferenceStore>) -> ListViewController<Value> {
    ListViewController::new(contacts(), PreferenceService::new(store), 25)
}

fn page_of(names: &[&str], total_items: u64, page: u32) -> PagedResult<Value> {
    let items = names
        .iter()
        .enumerate()
        .map(|(idx, name)| json!({ "id": idx + 1, "full_name": name }))
        .collect();
    PagedResult::new(items, total_items, page, 25)
}

fn loaded_controller(total_items: u64) -> ListViewController<Value> {
    let mut controller = controller_with(MemoryStore::with(&[]));
    let ticket = controller.begin_fetch();
    controller.complete_fetch(ticket.token, Ok(page_of(&["Acme"], total_items, 1)));
    controller
}

#[test]
fn list_query_params_use_backend_names_and_skip_empty_search() {
    let mut query = ListQuery::new(25, "created_at", SortDirection::Desc);
    assert_eq!(
        query.to_params(),
        vec![
            ("page", "1".to_string()),
            ("per_page", "25".to_string()),
            ("sort_by", "created_at".to_string()),
            ("sort_direction", "desc".to_string()),
        ]
    );

    query.search_text = "  acme ".to_string();
    assert!(query
        .to_params()
        .contains(&("search", "acme".to_string())));
}

#[test]
fn paged_result_rounds_total_pages_up() {
    let result: PagedResult<Value> = PagedResult::new(Vec::new(), 51, 0, 25);
    assert_eq!(result.total_pages, 3);
    assert_eq!(result.current_page, 1, "page is never zero");

    let empty: PagedResult<Value> = PagedResult::new(Vec::new(), 0, 1, 25);
    assert_eq!(empty.total_pages, 0);
}

#[test]
fn sort_direction_parses_loosely() {
    assert_eq!(SortDirection::parse(" DESC "), Some(SortDirection::Desc));
    assert_eq!(SortDirection::parse("asc"), Some(SortDirection::Asc));
    assert_eq!(SortDirection::parse("sideways"), None);
    assert_eq!(SortDirection::Asc.toggled(), SortDirection::Desc);
}

#[test]
fn descriptor_builder_requires_locked_column_first() {
    let result = EntityDescriptor::builder(EntityKind::Owners)
        .column(ColumnSpec::new("full_name", "Name"))
        .locked_column("id", "ID")
        .sort_option("created_at", "Created")
        .build();

    assert_eq!(
        result,
        Err(DescriptorError::LockedColumnNotFirst {
            entity: "owners",
            id: "id".to_string(),
        })
    );
}

#[test]
fn descriptor_builder_rejects_duplicate_columns_and_missing_lock() {
    let duplicate = EntityDescriptor::builder(EntityKind::Owners)
        .locked_column("id", "ID")
        .column(ColumnSpec::new("email", "Email"))
        .column(ColumnSpec::new("email", "Email again"))
        .sort_option("created_at", "Created")
        .build();
    assert!(matches!(
        duplicate,
        Err(DescriptorError::DuplicateColumn { ref id, .. }) if id == "email"
    ));

    let unlocked = EntityDescriptor::builder(EntityKind::Owners)
        .column(ColumnSpec::new("email", "Email"))
        .sort_option("created_at", "Created")
        .build();
    assert!(matches!(
        unlocked,
        Err(DescriptorError::LockedColumnCount { count: 0, .. })
    ));
}

#[test]
fn descriptor_builder_rejects_undeclared_default_sort() {
    let result = EntityDescriptor::builder(EntityKind::Projects)
        .locked_column("id", "ID")
        .sort_option("created_at", "Created")
        .default_sort("budget", SortDirection::Asc)
        .build();

    assert!(matches!(
        result,
        Err(DescriptorError::UnknownDefaultSort { ref key, .. }) if key == "budget"
    ));
}

#[test]
fn descriptor_builder_honours_custom_prefix_and_endpoint() {
    let descriptor = EntityDescriptor::builder(EntityKind::Inventory)
        .locked_column("id", "ID")
        .column(ColumnSpec::new("unit_number", "Unit"))
        .sort_option("unit_number", "Unit")
        .storage_prefix("crm.inventory")
        .endpoint("/units")
        .build()
        .expect("descriptor should build");

    assert_eq!(descriptor.endpoint(), "/units");
    assert_eq!(descriptor.default_sort_key(), "unit_number");
    assert_eq!(
        PreferenceKeys::for_descriptor(&descriptor).sort_by,
        "crm.inventory.sort_by"
    );
}

#[test]
fn catalog_builds_every_entity_with_locked_id_first() {
    for kind in EntityKind::ALL {
        let descriptor = kind.descriptor().expect("catalog entry should build");
        assert_eq!(descriptor.columns()[0].id, "id");
        assert!(descriptor.columns()[0].locked);
        assert!(descriptor.is_sortable(descriptor.default_sort_key()));
        assert_eq!(descriptor.columns()[0].kind, ColumnKind::Identifier);
    }
    assert_eq!(EntityKind::ALL.len(), 8);

    let contacts = contacts();
    assert_eq!(contacts.default_sort_key(), "created_at");
    assert_eq!(contacts.default_sort_direction(), SortDirection::Desc);
    assert!(contacts
        .sort_options()
        .iter()
        .any(|option| option.key == "full_name" && option.label == "Name"));
    assert_eq!(
        EntityKind::TenancyContracts
            .descriptor()
            .expect("tenancy contracts should build")
            .endpoint(),
        "/tenancy-contracts"
    );

    let reports = EntityKind::Reports
        .descriptor()
        .expect("reports should build");
    assert_eq!(reports.endpoint(), "/reports");
    assert_eq!(reports.storage_prefix(), "reports");
    assert_eq!(reports.default_sort_key(), "created_at");
    assert!(reports.is_sortable("title"));
}

#[test]
fn visible_set_sanitize_drops_unknown_and_puts_locked_first() {
    let descriptor = contacts();
    let set = VisibleColumnSet::sanitize(
        ["email", "ghost", "id", "email", "full_name"],
        descriptor.columns(),
        "id",
    );
    assert_eq!(set.ids(), ["id", "email", "full_name"]);
}

#[test]
fn visible_set_toggle_reinserts_in_declaration_order() {
    let descriptor = contacts();
    let mut set = VisibleColumnSet::defaults(descriptor.columns());
    let original = set.clone();

    assert!(set.toggle("email", descriptor.columns()));
    assert!(!set.contains("email"));
    assert!(set.toggle("email", descriptor.columns()));
    assert_eq!(set, original);

    assert!(!set.toggle("id", descriptor.columns()));
    assert!(!set.toggle("ghost", descriptor.columns()));
    assert_eq!(set, original);
}

#[test]
fn stored_unknown_column_is_dropped_and_locked_stays_first() {
    let descriptor = contacts();
    let stored = StoredPreference {
        visible_columns: Some(r#"["email","legacy_score","phone"]"#.to_string()),
        ..StoredPreference::default()
    };

    let (preference, issues) = sanitize_preference(&descriptor, &stored);

    assert_eq!(preference.visible_columns.ids(), ["id", "email", "phone"]);
    assert!(issues.contains(&PreferenceIssue::UnknownColumn("legacy_score".to_string())));
    assert!(issues.contains(&PreferenceIssue::MissingLockedColumn));
}

#[test]
fn stored_invalid_sort_key_falls_back_to_entity_default() {
    let descriptor = contacts();
    let stored = StoredPreference {
        visible_columns: None,
        sort_by: Some(r#""shoe_size""#.to_string()),
        sort_direction: Some(r#""asc""#.to_string()),
    };

    let (preference, issues) = sanitize_preference(&descriptor, &stored);

    assert_eq!(preference.sort_key, "created_at");
    assert_eq!(preference.sort_direction, SortDirection::Desc);
    assert_eq!(
        issues,
        vec![PreferenceIssue::UnknownSortKey("shoe_size".to_string())]
    );
}

#[test]
fn unreadable_stored_values_fall_back_to_defaults() {
    let descriptor = contacts();
    let stored = StoredPreference {
        visible_columns: Some("id,email".to_string()),
        sort_by: Some(r#""full_name""#.to_string()),
        sort_direction: Some(r#""upwards""#.to_string()),
    };

    let (preference, issues) = sanitize_preference(&descriptor, &stored);

    assert_eq!(
        preference.visible_columns,
        PersistedPreference::defaults(&descriptor).visible_columns
    );
    assert_eq!(preference.sort_key, "full_name");
    assert_eq!(preference.sort_direction, SortDirection::Desc);
    assert_eq!(issues.len(), 2);
}

#[test]
fn preference_service_swallows_store_failures() {
    let descriptor = contacts();
    let service = PreferenceService::new(Arc::new(FailingStore));

    let preference = service.load(&descriptor);
    service.save_sort(&descriptor, "full_name", SortDirection::Asc);
    service.clear(&descriptor);

    assert_eq!(preference, PersistedPreference::defaults(&descriptor));
}

#[test]
fn search_change_resets_page_to_one() {
    let mut controller = loaded_controller(75);
    assert_eq!(controller.set_page(3), 3);

    let ticket = controller.set_search_text("a");

    assert!(ticket.is_some());
    assert_eq!(controller.query().page, 1);
    assert_eq!(controller.query().search_text, "a");
}

#[test]
fn repeating_the_same_search_text_is_a_no_op() {
    let mut controller = loaded_controller(75);
    let first = controller
        .set_search_text("acme")
        .expect("first change should bump");
    controller.set_page(2);

    assert!(controller.set_search_text("acme").is_none());
    assert_eq!(controller.query().page, 2);
    assert!(controller.is_latest_search(first));
}

#[test]
fn whitespace_only_search_edits_keep_page_and_skip_requests() {
    let mut controller = loaded_controller(75);
    controller.set_search_text("acme").expect("first change should bump");
    controller.set_page(2);

    assert!(controller.set_search_text("acme ").is_none());
    assert!(controller.set_search_text(" acme").is_none());
    assert_eq!(controller.query().search_text, " acme");
    assert_eq!(controller.query().page, 2);

    assert!(controller.set_search_text("acme l").is_some());
    assert_eq!(controller.query().page, 1);
}

#[test]
fn toggling_a_column_twice_restores_membership() {
    let descriptor = contacts();
    for column in descriptor.columns().iter().filter(|column| !column.locked) {
        let mut controller = controller_with(MemoryStore::with(&[]));
        controller.enter_column_edit_mode();
        let before = controller
            .column_choices()
            .into_iter()
            .map(|choice| (choice.column.id.clone(), choice.visible))
            .collect::<Vec<_>>();

        assert!(controller.toggle_column(&column.id));
        assert!(controller.toggle_column(&column.id));

        let after = controller
            .column_choices()
            .into_iter()
            .map(|choice| (choice.column.id.clone(), choice.visible))
            .collect::<Vec<_>>();
        assert_eq!(before, after, "round trip for {}", column.id);
    }
}

#[test]
fn toggling_the_locked_column_never_changes_the_set() {
    let mut controller = controller_with(MemoryStore::with(&[]));
    controller.toggle_column("email");
    let before = controller.column_choices().iter().filter(|c| c.visible).count();

    assert!(!controller.toggle_column("id"));
    assert!(!controller.toggle_column("id"));

    let after = controller.column_choices().iter().filter(|c| c.visible).count();
    assert_eq!(before, after);
    assert!(controller
        .column_choices()
        .iter()
        .any(|choice| choice.column.id == "id" && choice.visible));
}

#[test]
fn cancel_column_edits_restores_pre_edit_set() {
    let store = MemoryStore::with(&[]);
    let mut controller = controller_with(store.clone());
    let committed = controller.visible_column_set().clone();

    controller.enter_column_edit_mode();
    controller.toggle_column("email");
    controller.toggle_column("company");
    controller.toggle_column("phone");
    controller.toggle_column("email");
    controller.cancel_column_edits();

    assert!(!controller.is_editing_columns());
    assert_eq!(controller.visible_column_set(), &committed);
    assert_eq!(store.value("contacts.visible_columns"), None);
}

#[test]
fn commit_column_edits_persists_for_the_next_mount() {
    let store = MemoryStore::with(&[]);
    let mut controller = controller_with(store.clone());

    controller.enter_column_edit_mode();
    controller.toggle_column("email");
    controller.toggle_column("company");
    assert!(controller.commit_column_edits());
    assert!(!controller.is_editing_columns());

    let ids = controller
        .visible_columns()
        .iter()
        .map(|column| column.id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(
        ids,
        ["id", "full_name", "phone", "company", "contact_type", "created_at"]
    );

    let remounted = controller_with(store);
    assert_eq!(remounted.visible_column_set(), controller.visible_column_set());
}

#[test]
fn column_edits_do_not_touch_load_state() {
    let mut controller = loaded_controller(10);
    controller.enter_column_edit_mode();
    controller.toggle_column("email");
    controller.commit_column_edits();

    assert_eq!(controller.state(), LoadState::Loaded);
}

#[test]
fn sort_changes_persist_and_reset_page() {
    let store = MemoryStore::with(&[]);
    let mut controller = controller_with(store.clone());
    let ticket = controller.begin_fetch();
    controller.complete_fetch(ticket.token, Ok(page_of(&["A"], 100, 1)));
    controller.set_page(3);

    controller
        .set_sort_key("email")
        .expect("email should be sortable");
    assert_eq!(controller.query().page, 1);

    controller.set_page(2);
    controller.set_sort_direction(SortDirection::Asc);
    assert_eq!(controller.query().page, 1);

    assert_eq!(store.value("contacts.sort_by").as_deref(), Some(r#""email""#));
    assert_eq!(
        store.value("contacts.sort_direction").as_deref(),
        Some(r#""asc""#)
    );
}

#[test]
fn unknown_sort_key_is_rejected_without_changes() {
    let mut controller = controller_with(MemoryStore::with(&[]));

    let result = controller.set_sort_key("phone");

    assert_eq!(
        result,
        Err(ListViewError::UnknownSortKey {
            entity: "contacts",
            key: "phone".to_string(),
        })
    );
    assert_eq!(controller.query().sort_key, "created_at");
}

#[test]
fn set_page_clamps_into_known_range() {
    let mut fresh = controller_with(MemoryStore::with(&[]));
    assert_eq!(fresh.set_page(0), 1);
    assert_eq!(fresh.set_page(7), 7, "no bound before the first result");

    let mut controller = loaded_controller(60);
    assert_eq!(controller.set_page(10), 3);
    assert_eq!(controller.set_page(0), 1);
    assert!(controller.has_next_page());
    assert!(!controller.has_previous_page());

    let mut empty = loaded_controller(0);
    assert_eq!(empty.set_page(4), 1);
    assert!(!empty.next_page());
}

#[test]
fn page_bound_ignores_results_of_an_older_search() {
    let mut controller = controller_with(MemoryStore::with(&[]));
    controller.set_search_text("acme");
    let ticket = controller.begin_fetch();
    controller.complete_fetch(ticket.token, Ok(page_of(&["Acme"], 1, 1)));
    assert_eq!(controller.set_page(3), 1);

    controller.set_search_text("");
    assert_eq!(controller.set_page(3), 3);
    assert!(!controller.has_next_page());

    let ticket = controller.begin_fetch();
    controller.complete_fetch(ticket.token, Ok(page_of(&["Acme", "Birch"], 60, 3)));
    assert_eq!(controller.set_page(9), 3);

    controller
        .set_sort("full_name", SortDirection::Asc)
        .expect("full_name should be sortable");
    assert_eq!(controller.set_page(9), 9);
}

#[test]
fn out_of_order_responses_keep_the_latest_request() {
    let mut controller = controller_with(MemoryStore::with(&[]));
    controller.set_search_text("ac");
    let first = controller.begin_fetch();
    controller.set_search_text("acme");
    let second = controller.begin_fetch();

    assert!(controller.complete_fetch(second.token, Ok(page_of(&["Acme Ltd"], 1, 1))));
    assert!(!controller.complete_fetch(first.token, Ok(page_of(&["Acorn", "Acme Ltd"], 2, 1))));

    let result = controller.result().expect("latest result should be applied");
    assert_eq!(result.items, vec![json!({ "id": 1, "full_name": "Acme Ltd" })]);
    assert_eq!(second.query.search_text, "acme");
    assert_eq!(controller.state(), LoadState::Loaded);
}

#[test]
fn stale_response_is_dropped_even_while_loading() {
    let mut controller = controller_with(MemoryStore::with(&[]));
    let first = controller.begin_fetch();
    let _second = controller.begin_fetch();

    assert!(!controller.complete_fetch(first.token, Ok(page_of(&["Old"], 1, 1))));
    assert!(controller.result().is_none());
    assert_eq!(controller.state(), LoadState::Loading);
}

#[test]
fn fetch_error_keeps_last_good_result() {
    let mut controller = loaded_controller(1);
    let before = controller.result().cloned();

    let ticket = controller.begin_fetch();
    controller.complete_fetch(
        ticket.token,
        Err(ProviderError::Status {
            status: 503,
            message: "maintenance".to_string(),
        }),
    );

    assert_eq!(controller.state(), LoadState::Errored);
    assert_eq!(controller.result().cloned(), before);
    assert_eq!(controller.error(), Some("server returned 503: maintenance"));

    controller.dismiss_error();
    assert_eq!(controller.error(), None);
    assert_eq!(controller.result().cloned(), before);
}

#[test]
fn reset_preferences_restores_defaults_and_clears_store() {
    let store = MemoryStore::with(&[]);
    let mut controller = controller_with(store.clone());
    controller
        .set_sort("full_name", SortDirection::Asc)
        .expect("full_name should be sortable");
    controller.toggle_column("email");
    controller.commit_column_edits();

    controller.reset_preferences();

    let descriptor = contacts();
    let defaults = PersistedPreference::defaults(&descriptor);
    assert_eq!(controller.query().sort_key, defaults.sort_key);
    assert_eq!(controller.query().sort_direction, defaults.sort_direction);
    assert_eq!(controller.visible_column_set(), &defaults.visible_columns);
    let keys = PreferenceKeys::for_descriptor(&descriptor);
    for key in keys.all() {
        assert_eq!(store.value(key), None, "{key} should be removed");
    }
}

#[tokio::test]
async fn contacts_search_then_name_ascending() {
    let provider = RecordingProvider::default();
    provider.push(Ok(page_of(&["Acme"], 60, 1)));
    let mut controller = controller_with(MemoryStore::with(&[]));

    controller.set_search_text("acme");
    assert!(controller.fetch(&provider).await);
    controller.set_page(2);
    controller
        .set_sort("full_name", SortDirection::Asc)
        .expect("Name should be sortable");
    assert!(controller.fetch(&provider).await);

    let params = provider
        .queries()
        .iter()
        .map(ListQuery::to_params)
        .collect::<Vec<_>>();
    assert_eq!(
        params,
        vec![
            vec![
                ("page", "1".to_string()),
                ("per_page", "25".to_string()),
                ("search", "acme".to_string()),
                ("sort_by", "created_at".to_string()),
                ("sort_direction", "desc".to_string()),
            ],
            vec![
                ("page", "1".to_string()),
                ("per_page", "25".to_string()),
                ("search", "acme".to_string()),
                ("sort_by", "full_name".to_string()),
                ("sort_direction", "asc".to_string()),
            ],
        ]
    );
}

#[tokio::test]
async fn retry_recovers_after_a_failed_fetch() {
    let provider = RecordingProvider::default();
    provider.push(Err(ProviderError::Transport("connection refused".to_string())));
    provider.push(Ok(page_of(&["Acme"], 1, 1)));
    let mut controller = controller_with(MemoryStore::with(&[]));

    controller.fetch(&provider).await;
    assert_eq!(controller.state(), LoadState::Errored);
    assert!(controller.result().is_none());

    let ticket = controller.retry();
    assert_eq!(controller.state(), LoadState::Loading);
    assert!(controller.error().is_some(), "banner stays until the retry lands");
    let outcome = provider.fetch(EntityKind::Contacts, &ticket.query).await;
    assert!(controller.complete_fetch(ticket.token, outcome));
    assert_eq!(controller.state(), LoadState::Loaded);
    assert_eq!(controller.error(), None);
    assert_eq!(provider.queries().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn debounce_only_settles_the_latest_ticket() {
    let mut debouncer = Debouncer::default();
    let first = debouncer.bump();
    let second = debouncer.bump();
    let window = Duration::from_millis(400);
    let started = tokio::time::Instant::now();

    assert!(!wait_until_settled(window, || debouncer.is_latest(first)).await);
    assert!(wait_until_settled(window, || debouncer.is_latest(second)).await);
    assert!(started.elapsed() >= window * 2);
}

#[test]
fn typing_supersedes_earlier_search_tickets() {
    let mut controller = controller_with(MemoryStore::with(&[]));
    let first = controller.set_search_text("a").expect("should bump");
    let second = controller.set_search_text("ac").expect("should bump");

    assert!(!controller.is_latest_search(first));
    assert!(controller.is_latest_search(second));
}

#[test]
fn init_db_creates_preference_table() {
    let temp_dir = unique_test_dir("init-db");
    let db_path = temp_dir.join("prefs.sqlite");

    init_db(&db_path).expect("init_db should succeed");

    let conn = Connection::open(&db_path).expect("should open sqlite db");
    let table_count: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'preference'",
            [],
            |row| row.get(0),
        )
        .expect("table count query should succeed");
    assert_eq!(table_count, 1);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn sqlite_store_round_trips_and_overwrites() {
    let temp_dir = unique_test_dir("sqlite-store");
    let store = SqlitePreferenceStore::open(temp_dir.join("prefs.sqlite"))
        .expect("store should open");

    assert_eq!(store.get("contacts.sort_by").expect("get"), None);
    store.set("contacts.sort_by", r#""email""#).expect("set");
    store.set("contacts.sort_by", r#""full_name""#).expect("overwrite");
    assert_eq!(
        store.get("contacts.sort_by").expect("get").as_deref(),
        Some(r#""full_name""#)
    );

    store.remove("contacts.sort_by").expect("remove");
    assert_eq!(store.get("contacts.sort_by").expect("get"), None);

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn preferences_survive_remount_through_sqlite() {
    let temp_dir = unique_test_dir("sqlite-remount");
    let db_path = temp_dir.join("prefs.sqlite");
    {
        let store = SqlitePreferenceStore::open(db_path.clone()).expect("store should open");
        let mut controller = controller_with(Arc::new(store));
        controller
            .set_sort("full_name", SortDirection::Asc)
            .expect("full_name should be sortable");
        controller.toggle_column("phone");
        controller.commit_column_edits();
    }

    let store = SqlitePreferenceStore::open(db_path).expect("store should reopen");
    let controller = controller_with(Arc::new(store));
    assert_eq!(controller.query().sort_key, "full_name");
    assert_eq!(controller.query().sort_direction, SortDirection::Asc);
    assert!(!controller.visible_column_set().contains("phone"));

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn decode_page_reads_envelope_and_derives_last_page() {
    let query = ListQuery::new(25, "created_at", SortDirection::Desc);
    let body = br#"{"data":[{"id":7,"full_name":"Acme"}],"total":51,"current_page":2,"per_page":25}"#;

    let page: PagedResult<Value> = decode_page(body, &query).expect("envelope should decode");

    assert_eq!(page.items.len(), 1);
    assert_eq!(page.total_items, 51);
    assert_eq!(page.total_pages, 3);
    assert_eq!(page.current_page, 2);

    let with_last: PagedResult<Value> =
        decode_page(br#"{"data":[],"total":0,"last_page":1}"#, &query).expect("should decode");
    assert_eq!(with_last.total_pages, 1);
    assert_eq!(with_last.current_page, 1);
}

#[test]
fn decode_page_reports_malformed_body() {
    let query = ListQuery::new(25, "created_at", SortDirection::Desc);
    let result: Result<PagedResult<Value>, ProviderError> =
        decode_page(br#"{"items":[]}"#, &query);
    assert!(matches!(result, Err(ProviderError::Decode(_))));
}

#[test]
fn error_message_prefers_json_message() {
    assert_eq!(
        error_message(r#"{"message":"Unauthenticated."}"#, Some("Unauthorized")),
        "Unauthenticated."
    );
    assert_eq!(error_message("   ", Some("Bad Gateway")), "Bad Gateway");
    assert_eq!(error_message("upstream down", None), "upstream down");
}

#[test]
fn endpoint_urls_join_without_double_slashes() {
    assert_eq!(
        endpoint_url("https://api.example.com/api/", "/contacts"),
        "https://api.example.com/api/contacts"
    );

    let provider = RestDataProvider::new("https://api.example.com/api", None, Duration::from_secs(5))
        .expect("client should build")
        .with_endpoint(EntityKind::Inventory, "/units");
    assert_eq!(
        provider.url_for(EntityKind::Inventory),
        "https://api.example.com/api/units"
    );
    assert_eq!(
        provider.url_for(EntityKind::TenancyContracts),
        "https://api.example.com/api/tenancy-contracts"
    );
}

#[test]
fn write_csv_emits_header_and_rows() {
    let mut output = Vec::new();
    let count = write_csv(
        &mut output,
        &["ID".to_string(), "Name".to_string()],
        &[vec!["1".to_string(), "Acme, Ltd".to_string()]],
    )
    .expect("csv should write");

    assert_eq!(count, 1);
    assert_eq!(
        String::from_utf8(output).expect("utf8"),
        "ID,Name\n1,\"Acme, Ltd\"\n"
    );
}

#[test]
fn export_rows_to_csv_requires_headers() {
    let temp_dir = unique_test_dir("export-csv");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");
    let path = temp_dir.join("contacts.csv");

    assert!(export_rows_to_csv(&path, &[], &[]).is_err());
    let written = export_rows_to_csv(&path, &["ID".to_string()], &[vec!["1".to_string()]])
        .expect("export should succeed");
    assert_eq!(written, 1);
    assert_eq!(fs::read_to_string(&path).expect("read back"), "ID\n1\n");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn config_layers_file_then_env() {
    let mut config = AppConfig::with_db_path(PathBuf::from("/tmp/prefs.sqlite"));
    let file = parse_config_file(
        "api_base_url: https://file.example.com/api\npage_size: 50\nsearch_debounce_ms: 300\n",
    )
    .expect("yaml should parse");
    config.apply_file(file);
    config
        .apply_env(|name| match name {
            "PROPDASH_API_URL" => Some("https://env.example.com/api".to_string()),
            "PROPDASH_API_TOKEN" => Some("secret".to_string()),
            _ => None,
        })
        .expect("env should apply");

    assert_eq!(config.api_base_url, "https://env.example.com/api");
    assert_eq!(config.api_token.as_deref(), Some("secret"));
    assert_eq!(config.page_size, 50);
    assert_eq!(config.search_debounce(), Duration::from_millis(300));
    assert!(config.validate().is_ok());
}

#[test]
fn config_rejects_invalid_values() {
    let mut config = AppConfig::with_db_path(PathBuf::from("/tmp/prefs.sqlite"));
    let result = config.apply_env(|name| (name == "PROPDASH_PAGE_SIZE").then(|| "many".to_string()));
    assert!(matches!(
        result,
        Err(ConfigError::Invalid {
            field: "PROPDASH_PAGE_SIZE",
            ..
        })
    ));

    config.page_size = 0;
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "page_size", .. })
    ));

    let mut config = AppConfig::with_db_path(PathBuf::from("/tmp/prefs.sqlite"));
    config.api_base_url = "ftp://example.com".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Invalid { field: "api_base_url", .. })
    ));
}

#[test]
fn empty_config_file_means_no_overrides() {
    assert_eq!(parse_config_file("  \n").expect("should parse"), ConfigFile::default());
}

#[test]
fn ensure_webview_data_dir_creates_webview2_subdir() {
    let temp_dir = unique_test_dir("webview-data-dir");
    fs::create_dir_all(&temp_dir).expect("should create temp dir");

    let webview_dir =
        ensure_webview_data_dir(&temp_dir).expect("webview data dir should be created");

    assert_eq!(webview_dir, temp_dir.join("webview2"));
    assert!(webview_dir.is_dir(), "webview2 directory should exist");

    fs::remove_dir_all(&temp_dir).expect("should cleanup temp dir");
}

#[test]
fn tracing_init_is_idempotent() {
    init_tracing(false);
    init_tracing(true);
    assert_eq!(default_filter(false), "propdash=info,warn");
}

#[test]
fn format_number_with_commas_handles_decimals() {
    assert_eq!(format_number_with_commas(12345.678, 0), "12,346");
    assert_eq!(format_number_with_commas(12345.678, 2), "12,345.68");
    assert_eq!(format_number_with_commas(-1234.5, 2), "-1,234.50");
    assert_eq!(format_number_with_commas(999.0, 0), "999");
}

#[test]
fn format_cell_value_applies_column_kind_rules() {
    assert_eq!(format_cell_value(ColumnKind::Money, "125000"), "125,000.00");
    assert_eq!(format_cell_value(ColumnKind::Number, "1450"), "1,450");
    assert_eq!(
        format_cell_value(ColumnKind::Date, "2024-03-05T10:15:00Z"),
        "2024-03-05"
    );
    assert_eq!(
        format_cell_value(ColumnKind::Date, "2024-03-05 10:15:00"),
        "2024-03-05"
    );
    assert_eq!(format_cell_value(ColumnKind::Status, "under_construction"), "Under construction");
    assert_eq!(format_cell_value(ColumnKind::Money, "n/a"), "n/a");
    assert_eq!(format_cell_value(ColumnKind::Text, "0050"), "0050");
    assert_eq!(format_cell_value(ColumnKind::Identifier, "12345"), "12345");
    assert_eq!(column_alignment(ColumnKind::Identifier), "right");
    assert_eq!(column_alignment(ColumnKind::Money), "right");
    assert_eq!(column_alignment(ColumnKind::Date), "left");
}

#[test]
fn cell_text_walks_nested_paths() {
    let record = json!({
        "id": 3,
        "owner": { "full_name": "Dana Reyes" },
        "furnished": true,
        "notes": null,
    });

    assert_eq!(cell_text(&record, "id"), "3");
    assert_eq!(cell_text(&record, "owner.full_name"), "Dana Reyes");
    assert_eq!(cell_text(&record, "furnished"), "Yes");
    assert_eq!(cell_text(&record, "notes"), "");
    assert_eq!(cell_text(&record, "owner.email"), "");
}

#[test]
fn build_grid_follows_visible_columns() {
    let mut controller = loaded_controller(1);
    controller.toggle_column("email");
    controller.commit_column_edits();

    let result = controller.result().expect("loaded");
    let grid = build_grid(&controller.visible_columns(), &result.items);

    assert_eq!(grid.headers[..2], ["ID".to_string(), "Name".to_string()]);
    assert!(!grid.headers.contains(&"Email".to_string()));
    assert_eq!(grid.rows[0][..2], ["1".to_string(), "Acme".to_string()]);
    assert_eq!(grid.alignments[0], "right");
}

#[test]
fn identifier_cells_stay_unformatted_in_grid_and_csv() {
    let descriptor = contacts();
    let columns = vec![descriptor.locked_column()];
    let grid = build_grid(&columns, &[json!({ "id": 12345 })]);

    assert_eq!(grid.rows, vec![vec!["12345".to_string()]]);

    let mut output = Vec::new();
    write_csv(&mut output, &grid.headers, &grid.rows).expect("csv should write");
    assert_eq!(String::from_utf8(output).expect("utf8"), "ID\n12345\n");
}

#[test]
fn export_name_and_summary_text() {
    let date = NaiveDate::from_ymd_opt(2026, 10, 18).expect("valid date");
    assert_eq!(
        export_file_name(EntityKind::TenancyContracts, date),
        "tenancy-contracts-20261018.csv"
    );
    assert_eq!(page_summary(2, 3, 51), "Page 2 of 3 (51 records)");
    assert_eq!(page_summary(1, 0, 0), "Page 1 of 1 (0 records)");
}
