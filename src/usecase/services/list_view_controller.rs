use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::domain::entities::column::{ColumnSpec, VisibleColumnSet};
use crate::domain::entities::entity::{EntityDescriptor, SortOption};
use crate::domain::entities::list_query::{ListQuery, PagedResult, SortDirection};
use crate::domain::entities::preference::PersistedPreference;
use crate::usecase::ports::data_provider::{PagedDataProvider, ProviderError};
use crate::usecase::services::debounce::{DebounceTicket, Debouncer};
use crate::usecase::services::preference_service::PreferenceService;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loading,
    Loaded,
    Errored,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(u64);

/// A request handed out by [`ListViewController::begin_fetch`]. The result
/// must come back through `complete_fetch` with the same token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub token: RequestToken,
    pub query: ListQuery,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ListViewError {
    #[error("{entity} cannot be sorted by {key}")]
    UnknownSortKey { entity: &'static str, key: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChoice<'a> {
    pub column: &'a ColumnSpec,
    pub visible: bool,
}

/// Search, sort, paging and column-visibility state of one entity list.
///
/// Query mutations only update state; the owner decides when to fetch.
/// Responses are applied only when they answer the most recent request.
pub struct ListViewController<T> {
    descriptor: Arc<EntityDescriptor>,
    preferences: PreferenceService,
    query: ListQuery,
    columns: VisibleColumnSet,
    working_columns: Option<VisibleColumnSet>,
    search: Debouncer,
    state: LoadState,
    result: Option<PagedResult<T>>,
    result_query: Option<ListQuery>,
    error: Option<String>,
    issued: u64,
    latest: Option<FetchTicket>,
}

impl<T> ListViewController<T> {
    pub fn new(
        descriptor: Arc<EntityDescriptor>,
        preferences: PreferenceService,
        page_size: u32,
    ) -> Self {
        let PersistedPreference {
            visible_columns,
            sort_key,
            sort_direction,
        } = preferences.load(&descriptor);

        Self {
            query: ListQuery::new(page_size, sort_key, sort_direction),
            columns: visible_columns,
            working_columns: None,
            search: Debouncer::default(),
            state: LoadState::Idle,
            result: None,
            result_query: None,
            error: None,
            issued: 0,
            latest: None,
            descriptor,
            preferences,
        }
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    pub fn query(&self) -> &ListQuery {
        &self.query
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    /// Last successfully applied page, kept through later failures.
    pub fn result(&self) -> Option<&PagedResult<T>> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn dismiss_error(&mut self) {
        self.error = None;
    }

    pub fn sort_options(&self) -> &[SortOption] {
        self.descriptor.sort_options()
    }

    pub fn set_search_text(&mut self, text: impl Into<String>) -> Option<DebounceTicket> {
        let text = text.into();
        if text.trim() == self.query.search_text.trim() {
            self.query.search_text = text;
            return None;
        }
        self.query.search_text = text;
        self.query.page = 1;
        Some(self.search.bump())
    }

    pub fn is_latest_search(&self, ticket: DebounceTicket) -> bool {
        self.search.is_latest(ticket)
    }

    pub fn set_sort_key(&mut self, key: &str) -> Result<(), ListViewError> {
        self.ensure_sortable(key)?;
        if self.query.sort_key != key {
            self.query.sort_key = key.to_string();
            self.query.page = 1;
        }
        self.persist_sort();
        Ok(())
    }

    pub fn set_sort_direction(&mut self, direction: SortDirection) {
        if self.query.sort_direction != direction {
            self.query.sort_direction = direction;
            self.query.page = 1;
        }
        self.persist_sort();
    }

    pub fn set_sort(&mut self, key: &str, direction: SortDirection) -> Result<(), ListViewError> {
        self.ensure_sortable(key)?;
        if self.query.sort_key != key || self.query.sort_direction != direction {
            self.query.sort_key = key.to_string();
            self.query.sort_direction = direction;
            self.query.page = 1;
        }
        self.persist_sort();
        Ok(())
    }

    /// Moves to `page`, clamped into the page range of the last result for
    /// this search and sort. Returns the page actually selected.
    pub fn set_page(&mut self, page: u32) -> u32 {
        let upper = self
            .current_result()
            .map(|result| result.total_pages.max(1))
            .unwrap_or(u32::MAX);
        let clamped = page.clamp(1, upper);
        if clamped != page {
            debug!(
                entity = self.descriptor.kind().slug(),
                requested = page,
                clamped,
                "page out of range"
            );
        }
        self.query.page = clamped;
        clamped
    }

    pub fn has_next_page(&self) -> bool {
        self.current_result()
            .map(|result| self.query.page < result.total_pages)
            .unwrap_or(false)
    }

    pub fn has_previous_page(&self) -> bool {
        self.query.page > 1
    }

    pub fn next_page(&mut self) -> bool {
        if !self.has_next_page() {
            return false;
        }
        self.set_page(self.query.page + 1);
        true
    }

    pub fn previous_page(&mut self) -> bool {
        if !self.has_previous_page() {
            return false;
        }
        self.set_page(self.query.page - 1);
        true
    }

    /// Committed columns in display order.
    pub fn visible_columns(&self) -> Vec<&ColumnSpec> {
        self.columns
            .ids()
            .iter()
            .filter_map(|id| self.descriptor.column(id))
            .collect()
    }

    pub fn visible_column_set(&self) -> &VisibleColumnSet {
        &self.columns
    }

    /// Every column with its membership in the set being edited, or the
    /// committed set outside edit mode.
    pub fn column_choices(&self) -> Vec<ColumnChoice<'_>> {
        let set = self.working_columns.as_ref().unwrap_or(&self.columns);
        self.descriptor
            .columns()
            .iter()
            .map(|column| ColumnChoice {
                column,
                visible: set.contains(&column.id),
            })
            .collect()
    }

    pub fn is_editing_columns(&self) -> bool {
        self.working_columns.is_some()
    }

    pub fn enter_column_edit_mode(&mut self) {
        self.working_columns = Some(self.columns.clone());
    }

    pub fn toggle_column(&mut self, id: &str) -> bool {
        let toggleable = self
            .descriptor
            .column(id)
            .map(|column| !column.locked)
            .unwrap_or(false);
        if !toggleable {
            return false;
        }
        let descriptor = Arc::clone(&self.descriptor);
        self.working_columns
            .get_or_insert_with(|| self.columns.clone())
            .toggle(id, descriptor.columns())
    }

    pub fn commit_column_edits(&mut self) -> bool {
        let Some(working) = self.working_columns.take() else {
            return false;
        };
        self.columns = working;
        self.preferences
            .save_visible_columns(&self.descriptor, &self.columns);
        true
    }

    pub fn cancel_column_edits(&mut self) {
        self.working_columns = None;
    }

    /// Restores the entity defaults for columns and sort and forgets what
    /// was stored.
    pub fn reset_preferences(&mut self) {
        self.preferences.clear(&self.descriptor);
        let defaults = PersistedPreference::defaults(&self.descriptor);
        self.columns = defaults.visible_columns;
        self.working_columns = None;
        self.query.sort_key = defaults.sort_key;
        self.query.sort_direction = defaults.sort_direction;
        self.query.page = 1;
        info!(
            entity = self.descriptor.kind().slug(),
            "list preferences reset"
        );
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        let token = RequestToken(self.issued);
        self.state = LoadState::Loading;
        debug!(
            entity = self.descriptor.kind().slug(),
            token = self.issued,
            page = self.query.page,
            search = %self.query.search_text,
            "fetch started"
        );
        let ticket = FetchTicket {
            token,
            query: self.query.clone(),
        };
        self.latest = Some(ticket.clone());
        ticket
    }

    /// Applies a provider response. Returns false when the response was
    /// superseded by a newer request and dropped.
    pub fn complete_fetch(
        &mut self,
        token: RequestToken,
        outcome: Result<PagedResult<T>, ProviderError>,
    ) -> bool {
        let Some(latest) = self.latest.as_ref().filter(|latest| latest.token == token) else {
            debug!(
                entity = self.descriptor.kind().slug(),
                token = token.0,
                "dropping stale response"
            );
            return false;
        };
        let answered = latest.query.clone();

        match outcome {
            Ok(result) => {
                debug!(
                    entity = self.descriptor.kind().slug(),
                    items = result.items.len(),
                    total = result.total_items,
                    "fetch finished"
                );
                self.result = Some(result);
                self.result_query = Some(answered);
                self.error = None;
                self.state = LoadState::Loaded;
            }
            Err(err) => {
                warn!(
                    entity = self.descriptor.kind().slug(),
                    "fetch failed: {err}"
                );
                self.error = Some(err.to_string());
                self.state = LoadState::Errored;
            }
        }
        true
    }

    /// Runs one request to completion without an event loop in between.
    #[allow(dead_code)]
    pub async fn fetch<P>(&mut self, provider: &P) -> bool
    where
        P: PagedDataProvider<T> + ?Sized,
    {
        let ticket = self.begin_fetch();
        let outcome = provider
            .fetch(self.descriptor.kind(), &ticket.query)
            .await;
        self.complete_fetch(ticket.token, outcome)
    }

    /// Re-issues the current query after a failure. The error stays visible
    /// until the new response arrives.
    pub fn retry(&mut self) -> FetchTicket {
        info!(
            entity = self.descriptor.kind().slug(),
            page = self.query.page,
            "retrying fetch"
        );
        self.begin_fetch()
    }

    /// The last applied result, when it answered the current search and
    /// sort. The page may differ.
    fn current_result(&self) -> Option<&PagedResult<T>> {
        let answered = self.result_query.as_ref()?;
        let same_query = answered.search_text.trim() == self.query.search_text.trim()
            && answered.sort_key == self.query.sort_key
            && answered.sort_direction == self.query.sort_direction
            && answered.page_size == self.query.page_size;
        if same_query {
            self.result.as_ref()
        } else {
            None
        }
    }

    fn ensure_sortable(&self, key: &str) -> Result<(), ListViewError> {
        if self.descriptor.is_sortable(key) {
            Ok(())
        } else {
            Err(ListViewError::UnknownSortKey {
                entity: self.descriptor.kind().slug(),
                key: key.to_string(),
            })
        }
    }

    fn persist_sort(&self) {
        self.preferences.save_sort(
            &self.descriptor,
            &self.query.sort_key,
            self.query.sort_direction,
        );
    }
}
