//! Exhibitor extraction: the record model, per-field rules, the extractor
//! that applies them to a loaded page, the harvest loop and the writers.
//!
//! The crate is engine-agnostic; anything implementing
//! [`expo_drivers::PageSession`] can be harvested.
//!
//! ```rust
//! use expo_extract::export::csv_header;
//! use expo_extract::record::ExhibitorRecord;
//!
//! let records = [ExhibitorRecord::failed("https://expo.example/1", "Timeout")];
//! assert_eq!(csv_header(&records), vec!["url", "error"]);
//! ```
pub mod export;
pub mod extractor;
pub mod harvest;
pub mod record;
pub mod rules;

pub use extractor::ExhibitorExtractor;
pub use harvest::{harvest, harvest_to_file, read_url_list, write_harvest, HarvestSummary};
pub use record::{ExhibitorFields, ExhibitorRecord, LabeledLink, Link};
