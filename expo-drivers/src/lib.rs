//! Driver layer for page navigation and DOM queries.
//!
//! This crate exposes the page-session capability set the extractor consumes
//! and the engines that provide it.
//!
//! - [`session::PageSession`] / [`session::ElementHandle`]: navigate, wait,
//!   query, read text and attributes
//! - [`session::Selector`]: CSS or "element following a label" lookups
//! - [`expo_browser::driver::ExpoDriver`]: WebDriver session wrapper
//! - [`expo_browser::page::ExpoPage`]: WebDriver-backed page with a
//!   network-idle navigation wait
//! - [`snapshot::HtmlPage`]: static HTML snapshot fetched over HTTP
pub mod expo_browser;
pub mod session;
pub mod snapshot;

pub use session::{DriverError, ElementHandle, PageSession, Selector};
