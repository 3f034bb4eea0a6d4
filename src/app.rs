use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use dioxus::prelude::*;
use rfd::{FileDialog, MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};
use tracing::info;

use crate::config::AppConfig;
use crate::domain::entities::entity::{EntityKind, SortOption};
use crate::domain::entities::list_query::SortDirection;
use crate::infra::export::csv::export_rows_to_csv;
use crate::infra::rest::client::RestDataProvider;
use crate::infra::sqlite::repo::SqlitePreferenceStore;
use crate::ui::state::app_state::{
    AppServices, AppState, DropdownId, ListPageState, Record,
};
use crate::ui::table::{build_grid, export_file_name, page_summary, Grid};
use crate::usecase::ports::data_provider::PagedDataProvider;
use crate::usecase::services::debounce::wait_until_settled;
use crate::usecase::services::list_view_controller::{
    FetchTicket, ListViewController, LoadState,
};
use crate::usecase::services::preference_service::PreferenceService;

const BUTTON_STYLE: &str =
    "border: 1px solid #bbb; background: #fff; padding: 4px 10px; border-radius: 6px; cursor: pointer;";
const CELL_STYLE: &str = "border: 1px solid #bbb; padding: 4px 6px;";

/// One sort menu entry: a sortable key in one direction.
#[derive(Clone, Debug, PartialEq)]
struct SortChoice {
    key: String,
    direction: SortDirection,
    label: String,
}

#[derive(Clone, Debug, PartialEq)]
struct ColumnChoiceView {
    id: String,
    title: String,
    locked: bool,
    visible: bool,
}

fn direction_word(direction: SortDirection) -> &'static str {
    match direction {
        SortDirection::Asc => "ascending",
        SortDirection::Desc => "descending",
    }
}

fn sort_choices(options: &[SortOption]) -> Vec<SortChoice> {
    options
        .iter()
        .flat_map(|option| {
            [SortDirection::Asc, SortDirection::Desc]
                .into_iter()
                .map(move |direction| SortChoice {
                    key: option.key.clone(),
                    direction,
                    label: format!("{} {}", option.label, direction_word(direction)),
                })
        })
        .collect()
}

fn header_marker(active: bool, direction: SortDirection) -> &'static str {
    match (active, direction) {
        (false, _) => "",
        (true, SortDirection::Asc) => " ▲",
        (true, SortDirection::Desc) => " ▼",
    }
}

fn nav_button_style(active: bool) -> &'static str {
    if active {
        "text-align: left; padding: 6px 10px; border: 1px solid #7aa7ff; border-radius: 6px; background: #eef4ff; cursor: pointer;"
    } else {
        "text-align: left; padding: 6px 10px; border: 1px solid transparent; border-radius: 6px; background: transparent; cursor: pointer;"
    }
}

fn build_services() -> Result<AppServices> {
    let config = AppConfig::load()?;
    let store = SqlitePreferenceStore::open(config.db_path.clone())?;

    let mut rest = RestDataProvider::new(
        &config.api_base_url,
        config.api_token.clone(),
        config.request_timeout(),
    )?;
    for kind in EntityKind::ALL {
        let descriptor = kind.descriptor()?;
        rest = rest.with_endpoint(kind, descriptor.endpoint());
    }

    info!(
        api = %config.api_base_url,
        db = %config.db_path.display(),
        "services ready"
    );

    let provider: Arc<dyn PagedDataProvider<Record>> = Arc::new(rest);
    Ok(AppServices {
        config: Arc::new(config),
        provider,
        preferences: PreferenceService::new(Arc::new(store)),
    })
}

/// Starts a fetch for the current query. Only the newest response is applied.
fn spawn_fetch(
    mut controller: Signal<ListViewController<Record>>,
    provider: Arc<dyn PagedDataProvider<Record>>,
) {
    let ticket = controller.write().begin_fetch();
    spawn_request(controller, provider, ticket);
}

fn spawn_request(
    mut controller: Signal<ListViewController<Record>>,
    provider: Arc<dyn PagedDataProvider<Record>>,
    ticket: FetchTicket,
) {
    let kind = controller.peek().descriptor().kind();
    spawn(async move {
        let outcome = provider.fetch(kind, &ticket.query).await;
        controller.write().complete_fetch(ticket.token, outcome);
    });
}

/// Sort menu. Each entry sets key and direction together.
#[component]
fn SortMenu(
    choices: Vec<SortChoice>,
    sort_key: String,
    direction: SortDirection,
    mut open_dropdown: Signal<Option<DropdownId>>,
    mut dropdown_pos: Signal<Option<(f64, f64)>>,
    on_select: EventHandler<SortChoice>,
) -> Element {
    let is_open = open_dropdown() == Some(DropdownId::Sort);
    let current = choices
        .iter()
        .find(|choice| choice.key == sort_key && choice.direction == direction)
        .map(|choice| choice.label.clone())
        .unwrap_or_else(|| sort_key.clone());
    let (left, top) = dropdown_pos().unwrap_or((0.0, 0.0));

    rsx! {
        div {
            style: "display: inline-flex; align-items: center; gap: 6px;",
            span { "Sort" }
            button {
                style: BUTTON_STYLE,
                onclick: move |event| {
                    event.stop_propagation();
                    if is_open {
                        open_dropdown.set(None);
                        return;
                    }
                    let point = event.client_coordinates();
                    dropdown_pos.set(Some((point.x, point.y + 24.0)));
                    open_dropdown.set(Some(DropdownId::Sort));
                },
                "{current}"
            }
        }

        if is_open {
            div {
                style: "position: fixed; left: {left}px; top: {top}px; min-width: 220px; max-height: 320px; overflow-y: auto; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200;",
                onclick: move |event| event.stop_propagation(),
                {choices.iter().map(|choice| {
                    let item_key = format!("{}-{}", choice.key, choice.direction);
                    let label = choice.label.clone();
                    let active = choice.key == sort_key && choice.direction == direction;
                    let background = if active { "#eef4ff" } else { "transparent" };
                    let picked = choice.clone();
                    rsx!(
                        div {
                            key: "{item_key}",
                            style: "padding: 8px 10px; cursor: pointer; background: {background};",
                            onclick: move |_| {
                                open_dropdown.set(None);
                                on_select.call(picked.clone());
                            },
                            "{label}"
                        }
                    )
                })}
            }
        }
    }
}

/// Column picker. Changes stay in a working set until applied.
#[component]
fn ColumnVisibilityDropdown(
    id: DropdownId,
    choices: Vec<ColumnChoiceView>,
    visible_count: usize,
    mut open_dropdown: Signal<Option<DropdownId>>,
    mut dropdown_pos: Signal<Option<(f64, f64)>>,
    on_open: EventHandler<()>,
    on_toggle: EventHandler<String>,
    on_commit: EventHandler<()>,
    on_cancel: EventHandler<()>,
) -> Element {
    let is_open = open_dropdown() == Some(id);
    let (left, top) = dropdown_pos().unwrap_or((0.0, 0.0));

    rsx! {
        button {
            style: BUTTON_STYLE,
            onclick: move |event| {
                event.stop_propagation();
                if open_dropdown() == Some(id) {
                    open_dropdown.set(None);
                    on_cancel.call(());
                    return;
                }
                let point = event.client_coordinates();
                dropdown_pos.set(Some((point.x, point.y + 24.0)));
                open_dropdown.set(Some(id));
                on_open.call(());
            },
            "Columns ({visible_count})"
        }

        if is_open {
            div {
                style: "position: fixed; left: {left}px; top: {top}px; min-width: 220px; max-height: 360px; overflow-y: auto; background: #fff; border: 1px solid #bbb; border-radius: 8px; box-shadow: 0 10px 24px rgba(0,0,0,0.15); z-index: 1200; padding: 6px;",
                onclick: move |event| event.stop_propagation(),
                {choices.iter().map(|choice| {
                    let column_id = choice.id.clone();
                    let checked = choice.visible;
                    let locked = choice.locked;
                    let title = choice.title.clone();
                    rsx!(
                        label {
                            key: "{column_id}",
                            style: "display: flex; align-items: center; gap: 8px; padding: 6px 4px; cursor: pointer;",
                            input {
                                r#type: "checkbox",
                                checked: checked,
                                disabled: locked,
                                onclick: move |_| on_toggle.call(column_id.clone()),
                            }
                            span { "{title}" }
                        }
                    )
                })}
                div {
                    style: "display: flex; justify-content: flex-end; gap: 8px; padding-top: 6px; border-top: 1px solid #eee;",
                    button {
                        style: BUTTON_STYLE,
                        onclick: move |_| {
                            open_dropdown.set(None);
                            on_cancel.call(());
                        },
                        "Cancel"
                    }
                    button {
                        style: BUTTON_STYLE,
                        onclick: move |_| {
                            open_dropdown.set(None);
                            on_commit.call(());
                        },
                        "Apply"
                    }
                }
            }
        }
    }
}

#[component]
fn ErrorBanner(message: String, on_retry: EventHandler<()>, on_dismiss: EventHandler<()>) -> Element {
    rsx! {
        div {
            style: "display: flex; align-items: center; gap: 12px; padding: 8px 12px; margin: 8px 0; background: #fdecea; border: 1px solid #f5c2c0; border-radius: 6px; color: #8a1f17;",
            span { style: "flex: 1;", "Could not load records: {message}" }
            button { style: BUTTON_STYLE, onclick: move |_| on_retry.call(()), "Retry" }
            button { style: BUTTON_STYLE, onclick: move |_| on_dismiss.call(()), "Dismiss" }
        }
    }
}

#[component]
fn RecordTable(
    grid: Grid,
    loading: bool,
    sort_keys: Vec<Option<String>>,
    sort_key: String,
    direction: SortDirection,
    on_sort: EventHandler<String>,
) -> Element {
    if grid.rows.is_empty() {
        let message = if loading { "Loading…" } else { "No records" };
        return rsx! {
            p { style: "color: #666; padding: 12px;", "{message}" }
        };
    }

    rsx! {
        div {
            style: "flex: 1; overflow: auto; min-height: 0;",
            table { style: "border-collapse: collapse; width: 100%; background: #fff;",
                thead {
                    tr {
                        {grid.headers.iter().zip(sort_keys.iter()).map(|(header, key)| {
                            let key = key.clone();
                            let marker = header_marker(key.as_deref() == Some(sort_key.as_str()), direction);
                            let cursor = if key.is_some() { "pointer" } else { "default" };
                            rsx!(
                                th {
                                    style: "position: sticky; top: 0; background: #f5f5f5; z-index: 1; {CELL_STYLE} text-align: left; cursor: {cursor};",
                                    onclick: move |_| {
                                        if let Some(key) = key.clone() {
                                            on_sort.call(key);
                                        }
                                    },
                                    "{header}{marker}"
                                }
                            )
                        })}
                    }
                }
                tbody {
                    for (row_idx, row) in grid.rows.iter().enumerate() {
                        tr { key: "{row_idx}",
                            for (cell, alignment) in row.iter().zip(grid.alignments.iter()) {
                                td { style: "{CELL_STYLE} text-align: {alignment};", "{cell}" }
                            }
                        }
                    }
                }
            }
        }
    }
}

#[component]
fn ListPage(kind: EntityKind, mut status: Signal<String>) -> Element {
    let services = use_context::<AppServices>();
    let descriptor = use_hook(move || {
        kind.descriptor()
            .map(Arc::new)
            .map_err(|err| err.to_string())
    });
    let title = kind.label();
    let descriptor = match descriptor {
        Ok(descriptor) => descriptor,
        Err(err) => {
            return rsx! {
                p { "Cannot show {title}: {err}" }
            };
        }
    };

    let ListPageState {
        mut controller,
        mut open_dropdown,
        dropdown_pos,
        mut page_input,
    } = ListPageState::new(descriptor, &services);

    let provider_for_mount = services.provider.clone();
    use_effect(move || spawn_fetch(controller, provider_for_mount.clone()));

    let debounce = services.config.search_debounce();
    let provider_for_search = services.provider.clone();
    let provider_for_sort_select = services.provider.clone();
    let provider_for_sort_toggle = services.provider.clone();
    let provider_for_header_sort = services.provider.clone();
    let provider_for_retry = services.provider.clone();
    let provider_for_prev = services.provider.clone();
    let provider_for_next = services.provider.clone();
    let provider_for_page_jump = services.provider.clone();
    let provider_for_reset = services.provider.clone();

    let view = controller.read();
    let query = view.query().clone();
    let state = view.state();
    let error = view.error().map(str::to_string);
    let sort_menu = sort_choices(view.sort_options());
    let header_sort_keys = view
        .visible_columns()
        .iter()
        .map(|column| {
            view.descriptor()
                .is_sortable(&column.id)
                .then(|| column.id.clone())
        })
        .collect::<Vec<_>>();
    let visible_count = view.visible_column_set().ids().len();
    let column_choices = view
        .column_choices()
        .into_iter()
        .map(|choice| ColumnChoiceView {
            id: choice.column.id.clone(),
            title: choice.column.title.clone(),
            locked: choice.column.locked,
            visible: choice.visible,
        })
        .collect::<Vec<_>>();
    let grid = view
        .result()
        .map(|result| build_grid(&view.visible_columns(), &result.items))
        .unwrap_or_default();
    let (total_pages, total_items) = view
        .result()
        .map(|result| (result.total_pages, result.total_items))
        .unwrap_or((0, 0));
    let has_previous = view.has_previous_page();
    let has_next = view.has_next_page();
    drop(view);

    let summary = page_summary(query.page, total_pages, total_items);
    let direction_label = match query.sort_direction {
        SortDirection::Asc => "↑ Ascending",
        SortDirection::Desc => "↓ Descending",
    };
    let state_label = match state {
        LoadState::Idle => "",
        LoadState::Loading => "Loading…",
        LoadState::Loaded => "",
        LoadState::Errored => "Showing last loaded data",
    };

    rsx! {
        div {
            style: "display: flex; flex-direction: column; height: 100%; min-height: 0;",
            onclick: move |_| {
                if open_dropdown().is_some() {
                    open_dropdown.set(None);
                    if controller.peek().is_editing_columns() {
                        controller.write().cancel_column_edits();
                    }
                }
            },

            div {
                style: "display: flex; gap: 12px; align-items: center; flex-wrap: wrap; padding: 8px 0;",
                h2 { style: "margin: 0 12px 0 0;", "{title}" }
                input {
                    style: "padding: 4px 8px; min-width: 220px;",
                    placeholder: "Search…",
                    value: "{query.search_text}",
                    oninput: move |event| {
                        let ticket = controller.write().set_search_text(event.value());
                        let Some(ticket) = ticket else {
                            return;
                        };
                        let provider = provider_for_search.clone();
                        spawn(async move {
                            let settled = wait_until_settled(debounce, || {
                                controller.peek().is_latest_search(ticket)
                            })
                            .await;
                            if settled {
                                spawn_fetch(controller, provider);
                            }
                        });
                    },
                }

                SortMenu {
                    choices: sort_menu,
                    sort_key: query.sort_key.clone(),
                    direction: query.sort_direction,
                    open_dropdown,
                    dropdown_pos,
                    on_select: move |choice: SortChoice| {
                        let result = controller.write().set_sort(&choice.key, choice.direction);
                        match result {
                            Ok(()) => spawn_fetch(controller, provider_for_sort_select.clone()),
                            Err(err) => status.set(err.to_string()),
                        }
                    },
                }

                button {
                    style: BUTTON_STYLE,
                    onclick: move |_| {
                        let next = controller.peek().query().sort_direction.toggled();
                        controller.write().set_sort_direction(next);
                        spawn_fetch(controller, provider_for_sort_toggle.clone());
                    },
                    "{direction_label}"
                }

                ColumnVisibilityDropdown {
                    id: DropdownId::Columns,
                    choices: column_choices,
                    visible_count,
                    open_dropdown,
                    dropdown_pos,
                    on_open: move |_| controller.write().enter_column_edit_mode(),
                    on_toggle: move |column_id: String| {
                        controller.write().toggle_column(&column_id);
                    },
                    on_commit: move |_| {
                        controller.write().commit_column_edits();
                    },
                    on_cancel: move |_| controller.write().cancel_column_edits(),
                }

                button {
                    style: BUTTON_STYLE,
                    onclick: move |_| {
                        let snapshot = {
                            let view = controller.read();
                            view.result().map(|result| {
                                (
                                    view.descriptor().kind(),
                                    build_grid(&view.visible_columns(), &result.items),
                                )
                            })
                        };
                        let Some((kind, grid)) = snapshot else {
                            status.set("Nothing to export yet".to_string());
                            return;
                        };
                        let file_name = export_file_name(kind, Local::now().date_naive());
                        let Some(path) = FileDialog::new()
                            .add_filter("CSV", &["csv"])
                            .set_file_name(file_name)
                            .save_file() else {
                            status.set("Export cancelled".to_string());
                            return;
                        };
                        match export_rows_to_csv(&path, &grid.headers, &grid.rows) {
                            Ok(count) => {
                                status.set(format!("Exported {count} rows to {}", path.display()));
                            }
                            Err(err) => status.set(format!("Export failed: {err:#}")),
                        }
                    },
                    "Export CSV"
                }

                button {
                    style: BUTTON_STYLE,
                    onclick: move |_| {
                        let confirmed = MessageDialog::new()
                            .set_level(MessageLevel::Warning)
                            .set_title("Reset view")
                            .set_description("Restore the default columns and sort order for this list?")
                            .set_buttons(MessageButtons::YesNo)
                            .show();
                        if confirmed != MessageDialogResult::Yes {
                            return;
                        }
                        controller.write().reset_preferences();
                        status.set("View reset to defaults".to_string());
                        spawn_fetch(controller, provider_for_reset.clone());
                    },
                    "Reset view"
                }

                span { style: "color: #666;", "{state_label}" }
            }

            if let Some(message) = error {
                ErrorBanner {
                    message,
                    on_retry: move |_| {
                        let ticket = controller.write().retry();
                        spawn_request(controller, provider_for_retry.clone(), ticket);
                    },
                    on_dismiss: move |_| controller.write().dismiss_error(),
                }
            }

            RecordTable {
                grid,
                loading: state == LoadState::Loading,
                sort_keys: header_sort_keys,
                sort_key: query.sort_key.clone(),
                direction: query.sort_direction,
                on_sort: move |key: String| {
                    let current = controller.peek().query().clone();
                    let result = if current.sort_key == key {
                        controller.write().set_sort_direction(current.sort_direction.toggled());
                        Ok(())
                    } else {
                        controller.write().set_sort_key(&key)
                    };
                    match result {
                        Ok(()) => spawn_fetch(controller, provider_for_header_sort.clone()),
                        Err(err) => status.set(err.to_string()),
                    }
                },
            }

            div {
                style: "display: flex; gap: 8px; align-items: center; padding: 8px 0;",
                button {
                    style: BUTTON_STYLE,
                    disabled: !has_previous,
                    onclick: move |_| {
                        if controller.write().previous_page() {
                            spawn_fetch(controller, provider_for_prev.clone());
                        }
                    },
                    "Previous"
                }
                span { "{summary}" }
                button {
                    style: BUTTON_STYLE,
                    disabled: !has_next,
                    onclick: move |_| {
                        if controller.write().next_page() {
                            spawn_fetch(controller, provider_for_next.clone());
                        }
                    },
                    "Next"
                }
                input {
                    style: "width: 64px; padding: 4px;",
                    r#type: "number",
                    min: "1",
                    placeholder: "Go to",
                    value: page_input(),
                    oninput: move |event| page_input.set(event.value()),
                    onkeydown: move |event| {
                        if event.key() != Key::Enter {
                            return;
                        }
                        let Ok(requested) = page_input().trim().parse::<u32>() else {
                            status.set("Enter a page number".to_string());
                            return;
                        };
                        let selected = controller.write().set_page(requested);
                        page_input.set(String::new());
                        if selected != requested {
                            status.set(format!("Page {requested} is out of range, showing page {selected}"));
                        }
                        spawn_fetch(controller, provider_for_page_jump.clone());
                    },
                }
            }
        }
    }
}

#[component]
pub fn App() -> Element {
    let services = use_hook(|| build_services().map_err(|err| format!("{err:#}")));
    let services = match services {
        Ok(services) => services,
        Err(err) => {
            return rsx! {
                div {
                    p { "Unable to start: {err}" }
                }
            };
        }
    };
    use_context_provider(move || services);

    let AppState {
        mut active_entity,
        status,
    } = AppState::new();
    let active = active_entity();
    let active_slug = active.slug();

    rsx! {
        div {
            style: "display: flex; height: 100vh; font-family: sans-serif; background: #fafafa;",
            nav {
                style: "width: 200px; padding: 12px; border-right: 1px solid #ddd; display: flex; flex-direction: column; gap: 6px;",
                h3 { style: "margin: 0 0 8px 0;", "propdash" }
                {EntityKind::ALL.into_iter().map(|kind| {
                    let slug = kind.slug();
                    let label = kind.label();
                    rsx!(
                        button {
                            key: "{slug}",
                            style: nav_button_style(kind == active),
                            onclick: move |_| active_entity.set(kind),
                            "{label}"
                        }
                    )
                })}
            }
            main {
                style: "flex: 1; display: flex; flex-direction: column; padding: 0 16px; min-width: 0;",
                ListPage { key: "{active_slug}", kind: active, status }
                div {
                    style: "padding: 6px 0; border-top: 1px solid #ddd; color: #444;",
                    "{status}"
                }
            }
        }
    }
}
