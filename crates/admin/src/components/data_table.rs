//! Data table and form field types.
//!
//! Every list page is a [`DataTableConfig`] plus rows of display strings, and
//! every create/edit modal is a list of [`FormField`]s, so one pair of
//! templates serves all resources.

/// Column definition for a data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableColumn {
    pub key: &'static str,
    pub label: &'static str,
    /// Numeric columns are right-aligned.
    pub numeric: bool,
}

impl TableColumn {
    #[must_use]
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            numeric: false,
        }
    }

    #[must_use]
    pub const fn numeric(key: &'static str, label: &'static str) -> Self {
        Self {
            key,
            label,
            numeric: true,
        }
    }
}

/// Option for select filters and select fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterOption {
    pub value: String,
    pub label: String,
}

impl FilterOption {
    #[must_use]
    pub fn new(value: &str, label: &str) -> Self {
        Self {
            value: value.to_string(),
            label: label.to_string(),
        }
    }
}

/// Select filter shown next to the search box.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableFilter {
    pub key: &'static str,
    pub label: &'static str,
    pub options: Vec<FilterOption>,
    /// Currently selected value; empty for "all".
    pub selected: String,
}

impl TableFilter {
    #[must_use]
    pub fn select(key: &'static str, label: &'static str, options: Vec<FilterOption>) -> Self {
        Self {
            key,
            label,
            options,
            selected: String::new(),
        }
    }

    #[must_use]
    pub fn with_selected(mut self, value: Option<&str>) -> Self {
        self.selected = value.unwrap_or_default().to_string();
        self
    }
}

/// Extra per-row link beside Edit and Delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLink {
    pub href: String,
    pub label: &'static str,
}

/// One rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRow {
    pub id: String,
    pub cells: Vec<String>,
    pub links: Vec<RowLink>,
}

/// Configuration for a data table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataTableConfig {
    /// Element id of the table container, the target of reloads.
    pub table_id: String,
    pub columns: Vec<TableColumn>,
    pub filters: Vec<TableFilter>,
    pub search_placeholder: String,
    pub empty_title: String,
    pub empty_description: Option<String>,
}

impl DataTableConfig {
    #[must_use]
    pub fn new(table_id: &str) -> Self {
        Self {
            table_id: table_id.to_string(),
            columns: vec![],
            filters: vec![],
            search_placeholder: "Search...".to_string(),
            empty_title: "No items found".to_string(),
            empty_description: None,
        }
    }

    #[must_use]
    pub fn column(mut self, column: TableColumn) -> Self {
        self.columns.push(column);
        self
    }

    #[must_use]
    pub fn filter(mut self, filter: TableFilter) -> Self {
        self.filters.push(filter);
        self
    }

    #[must_use]
    pub fn search_placeholder(mut self, placeholder: &str) -> Self {
        self.search_placeholder = placeholder.to_string();
        self
    }

    #[must_use]
    pub fn empty_state(mut self, title: &str, description: Option<&str>) -> Self {
        self.empty_title = title.to_string();
        self.empty_description = description.map(ToString::to_string);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    Url,
    TextArea,
    DateTime,
    Checkbox,
    Select,
}

/// One input in a create/edit modal.
///
/// `value` is what the operator last saw or typed, so a form that fails
/// validation re-renders with their input intact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: &'static str,
    pub label: &'static str,
    pub kind: FieldKind,
    pub value: String,
    pub required: bool,
    pub hint: Option<&'static str>,
    pub options: Vec<FilterOption>,
}

impl FormField {
    fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        Self {
            name,
            label,
            kind,
            value: String::new(),
            required: false,
            hint: None,
            options: vec![],
        }
    }

    #[must_use]
    pub fn text(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Text)
    }

    #[must_use]
    pub fn number(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Number)
    }

    #[must_use]
    pub fn url(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Url)
    }

    #[must_use]
    pub fn textarea(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::TextArea)
    }

    #[must_use]
    pub fn datetime(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::DateTime)
    }

    #[must_use]
    pub fn checkbox(name: &'static str, label: &'static str) -> Self {
        Self::new(name, label, FieldKind::Checkbox)
    }

    #[must_use]
    pub fn select(name: &'static str, label: &'static str, options: Vec<FilterOption>) -> Self {
        Self {
            options,
            ..Self::new(name, label, FieldKind::Select)
        }
    }

    #[must_use]
    pub const fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub const fn hint(mut self, hint: &'static str) -> Self {
        self.hint = Some(hint);
        self
    }

    #[must_use]
    pub fn value(mut self, value: impl ToString) -> Self {
        self.value = value.to_string();
        self
    }

    /// Set the value when there is one.
    #[must_use]
    pub fn maybe<T: ToString>(self, value: Option<T>) -> Self {
        match value {
            Some(value) => self.value(value),
            None => self,
        }
    }

    #[must_use]
    pub fn checked(self, on: bool) -> Self {
        self.value(if on { "on" } else { "" })
    }

    /// `type` attribute for plain `<input>` fields.
    #[must_use]
    pub const fn input_type(&self) -> &'static str {
        match self.kind {
            FieldKind::Number => "number",
            FieldKind::Url => "url",
            FieldKind::DateTime => "datetime-local",
            FieldKind::Checkbox => "checkbox",
            FieldKind::Text | FieldKind::TextArea | FieldKind::Select => "text",
        }
    }

    #[must_use]
    pub fn is_textarea(&self) -> bool {
        self.kind == FieldKind::TextArea
    }

    #[must_use]
    pub fn is_select(&self) -> bool {
        self.kind == FieldKind::Select
    }

    #[must_use]
    pub fn is_checkbox(&self) -> bool {
        self.kind == FieldKind::Checkbox
    }

    #[must_use]
    pub fn is_checked(&self) -> bool {
        self.is_checkbox() && !self.value.is_empty()
    }

    #[must_use]
    pub fn is_selected(&self, value: &str) -> bool {
        self.value == value
    }
}
