use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Record identifiers and codes: shown as stored, right-aligned.
    Identifier,
    Text,
    Number,
    Money,
    Date,
    Status,
}

/// One displayable field of an entity list. `id` is also the dot-separated
/// path of the field inside a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSpec {
    pub id: String,
    pub title: String,
    pub default_visible: bool,
    pub locked: bool,
    pub kind: ColumnKind,
}

impl ColumnSpec {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            default_visible: true,
            locked: false,
            kind: ColumnKind::Text,
        }
    }

    pub fn kind(mut self, kind: ColumnKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn hidden_by_default(mut self) -> Self {
        self.default_visible = false;
        self
    }

    pub(crate) fn locked(mut self) -> Self {
        self.locked = true;
        self.default_visible = true;
        self
    }
}

/// Ordered set of visible column ids. The locked column is always first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct VisibleColumnSet {
    ids: Vec<String>,
}

impl VisibleColumnSet {
    pub fn defaults(columns: &[ColumnSpec]) -> Self {
        Self {
            ids: columns
                .iter()
                .filter(|column| column.locked || column.default_visible)
                .map(|column| column.id.clone())
                .collect(),
        }
    }

    /// Keeps only known ids (first occurrence wins) and puts the locked
    /// column in front.
    pub fn sanitize<I, S>(stored: I, columns: &[ColumnSpec], locked_id: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let known: BTreeSet<&str> = columns.iter().map(|column| column.id.as_str()).collect();
        let mut seen = BTreeSet::new();
        let mut ids = vec![locked_id.to_string()];
        seen.insert(locked_id.to_string());

        for id in stored {
            let id = id.as_ref();
            if !known.contains(id) || !seen.insert(id.to_string()) {
                continue;
            }
            ids.push(id.to_string());
        }

        Self { ids }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids.iter().any(|visible| visible == id)
    }

    /// Flips membership of `id`. Re-added ids take the slot implied by the
    /// declaration order in `columns`. Returns false for the locked or an
    /// unknown id, leaving the set untouched.
    pub fn toggle(&mut self, id: &str, columns: &[ColumnSpec]) -> bool {
        let Some(position) = columns.iter().position(|column| column.id == id) else {
            return false;
        };
        if columns[position].locked {
            return false;
        }

        if let Some(idx) = self.ids.iter().position(|visible| visible == id) {
            self.ids.remove(idx);
            return true;
        }

        let declared_before = |visible: &String| {
            columns
                .iter()
                .position(|column| &column.id == visible)
                .map(|idx| idx < position)
                .unwrap_or(false)
        };
        let insert_at = self
            .ids
            .iter()
            .rposition(declared_before)
            .map(|idx| idx + 1)
            .unwrap_or(self.ids.len().min(1));
        self.ids.insert(insert_at, id.to_string());
        true
    }
}
