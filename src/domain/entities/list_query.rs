use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" => Some(SortDirection::Asc),
            "desc" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized request for one page of an entity list.
///
/// `page` is 1-based and never zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListQuery {
    pub search_text: String,
    pub page: u32,
    pub page_size: u32,
    pub sort_key: String,
    pub sort_direction: SortDirection,
}

impl ListQuery {
    pub fn new(page_size: u32, sort_key: impl Into<String>, sort_direction: SortDirection) -> Self {
        Self {
            search_text: String::new(),
            page: 1,
            page_size: page_size.max(1),
            sort_key: sort_key.into(),
            sort_direction,
        }
    }

    /// Named parameters in the form the backend expects. `search` is left out
    /// when there is nothing to filter on.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("per_page", self.page_size.to_string()),
        ];
        let search = self.search_text.trim();
        if !search.is_empty() {
            params.push(("search", search.to_string()));
        }
        params.push(("sort_by", self.sort_key.clone()));
        params.push(("sort_direction", self.sort_direction.as_str().to_string()));
        params
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PagedResult<T> {
    pub items: Vec<T>,
    pub total_items: u64,
    pub total_pages: u32,
    pub current_page: u32,
}

impl<T> PagedResult<T> {
    pub fn new(items: Vec<T>, total_items: u64, current_page: u32, page_size: u32) -> Self {
        Self {
            items,
            total_items,
            total_pages: total_pages_for(total_items, page_size),
            current_page: current_page.max(1),
        }
    }
}

pub fn total_pages_for(total_items: u64, page_size: u32) -> u32 {
    if page_size == 0 {
        return 0;
    }
    let pages = total_items.div_ceil(u64::from(page_size));
    u32::try_from(pages).unwrap_or(u32::MAX)
}
