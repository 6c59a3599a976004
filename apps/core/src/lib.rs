//! Platform-neutral logic behind the PseudoDojo periodic table page.
//!
//! The browser front end and the terminal browser both drive the same
//! lookups, dropdown rules and per-cell state machine from this crate.

pub mod cell;
pub mod dropdown;
pub mod elements;
pub mod error;
pub mod preferences;
pub mod summary;
pub mod tables;

pub use cell::{
    banner_text, complete_probe, download_name, CellEffect, CellEvent, CellMachine, CellState,
    CellTag, Completion, Delivery, Notice, Paint, ProbeFailurePolicy,
};
pub use dropdown::{configure, DropdownOptions, PseudoType};
pub use error::DojoError;
pub use preferences::{Layout, PreferenceKey, Remembered};
pub use summary::{
    compute_table_summary, detail_panel, select_element, DetailPanel, MetricKey, MetricMean,
    TableSummary,
};
pub use tables::{ArchiveTable, Catalog, Choice, ElementMeta, FileTable, MetaByElement, Selection};
