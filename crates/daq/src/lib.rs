//! Streaming data-acquisition pipeline
//!
//! Deterministic event-transform stages over a shared buffer of interaction
//! records. Each stage commits only the prefix it can prove final, so the
//! pipeline streams: events flow stage to stage as their timing horizons
//! close, and the driver never holds more than the open windows in flight.

// Split into subfiles for development, but anything important is re-exported
mod blur;
mod builder;
mod coinc;
mod deadtime;
mod error;
mod filter;
mod merge;
mod model;
mod process;
mod sort;
mod stats;

#[doc(inline)]
pub use blur::{BlurFunctor, BlurProcess};

#[doc(inline)]
pub use builder::build_daq_model;

#[doc(inline)]
pub use coinc::{CoincProcess, MultiplesPolicy};

#[doc(inline)]
pub use deadtime::DeadtimeProcess;

#[doc(inline)]
pub use error::Error;

#[doc(inline)]
pub use filter::{FilterFunctor, FilterProcess};

#[doc(inline)]
pub use merge::{MergeFunctor, MergeProcess};

#[doc(inline)]
pub use model::{DaqModel, DrainedEvents};

#[doc(inline)]
pub use process::{IdLookup, Process};

#[doc(inline)]
pub use sort::SortProcess;

#[doc(inline)]
pub use stats::{DaqStats, ProcessStats};
