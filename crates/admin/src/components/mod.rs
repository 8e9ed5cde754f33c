//! Reusable UI pieces for the admin pages.

pub mod data_table;
pub mod toast;

pub use data_table::{
    DataTableConfig, FieldKind, FilterOption, FormField, RowLink, TableColumn, TableFilter,
    TableRow,
};
pub use toast::{Toast, ToastLevel};
