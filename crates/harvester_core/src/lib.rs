//! Harvester core: the pure domain of the corpus harvester.
//!
//! Addresses and storage paths, catalog entries, content records, the
//! per-section lifecycle and the cross-version divergence report. Nothing in
//! here performs IO.
mod address;
mod catalog;
mod effect;
mod msg;
mod record;
mod state;
mod update;
mod verify;
mod view_model;

pub use address::{
    AddressError, AddressScheme, CodeOverrides, PlannedSection, SectionAddress, SectionLocator,
    ShortCodeTable, SplitDestination, WorkMapping, WorkPlan, RECORD_EXTENSION,
};
pub use catalog::{Catalog, CatalogEntry, Testament};
pub use effect::SectionEffect;
pub use msg::SectionMsg;
pub use record::{ContentRecord, Extraction, RecordError, RecordMeta, SubUnits};
pub use state::{SectionState, WorkTally};
pub use update::update;
pub use verify::{report, Cell, CountTable, DivergenceEntry, DivergenceReport};
pub use view_model::{ReportRowView, ReportViewModel, MISSING_CELL};
