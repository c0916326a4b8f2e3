//! Stache - a mustache-style template engine driven by a pluggable data provider.
//!
//! The engine knows nothing about data. It scans a template for tags,
//! keeps track of sections, and delegates every question about values,
//! truthiness, iteration and partial text to a [`Provider`]. That makes the
//! engine usable over any data model: JSON, a database row, a struct tree.
//!
//! # Quick Start
//!
//! ```rust
//! use stache::{Provider, Renderer, Result, SBuf};
//!
//! // A provider with one value and one list section.
//! struct Greeting<'a> {
//!     names: &'a [&'a str],
//!     index: Option<usize>,
//! }
//!
//! impl<'a> Provider<'a> for Greeting<'a> {
//!     fn supports_get(&self) -> bool {
//!         true
//!     }
//!
//!     fn get(&mut self, name: &str) -> Result<SBuf<'a>> {
//!         Ok(match (name, self.index) {
//!             ("name", Some(i)) => SBuf::borrowed(self.names[i]),
//!             ("count", _) => SBuf::owned(self.names.len().to_string()),
//!             _ => SBuf::empty(),
//!         })
//!     }
//!
//!     fn enter(&mut self, name: &str) -> Result<bool> {
//!         if name == "people" && !self.names.is_empty() {
//!             self.index = Some(0);
//!             return Ok(true);
//!         }
//!         Ok(false)
//!     }
//!
//!     fn next(&mut self) -> Result<bool> {
//!         let next = self.index.map_or(0, |i| i + 1);
//!         self.index = Some(next);
//!         Ok(next < self.names.len())
//!     }
//!
//!     fn leave(&mut self) -> Result<()> {
//!         self.index = None;
//!         Ok(())
//!     }
//! }
//!
//! let names = ["Ada", "Grace"];
//! let mut provider = Greeting { names: &names, index: None };
//! let out = Renderer::new()
//!     .render_to_string("{{count}}:{{#people}} {{name}}{{/people}}", &mut provider)
//!     .unwrap();
//! assert_eq!(out, "2: Ada Grace");
//! ```
//!
//! # Tags
//!
//! | Form | Meaning |
//! |------|---------|
//! | `{{name}}` | value, escaped through [`Provider::emit`] |
//! | `{{{name}}}`, `{{&name}}` | value, unescaped |
//! | `{{#name}}...{{/name}}` | section, rendered while the provider iterates it |
//! | `{{^name}}...{{/name}}` | inverted section, rendered when the provider does not enter it |
//! | `{{>name}}` | partial, rendered in place |
//! | `{{! comment }}` | nothing |
//! | `{{=<% %>=}}` | switch delimiters for the rest of the template |
//!
//! # Errors
//!
//! Every failure is an [`Error`]; rendering stops at the first one. Each
//! variant maps to an [`ErrorKind`] with a stable label and numeric code.

mod engine;
mod error;
mod partial;
mod provider;
mod sbuf;
mod scanner;
mod sink;
mod stack;

// Re-export public API
#[cfg(unix)]
pub use engine::render_fd;
pub use engine::{render_file, render_to, render_to_string, Renderer, DEFAULT_MAX_PARTIAL_DEPTH};
pub use error::{BoxError, Error, ErrorKind, Result};
pub use provider::Provider;
pub use sbuf::SBuf;
pub use scanner::{Delimiters, ScanOptions, Scanner, Tag, Token, NAME_LENGTH_MAX};
pub use sink::{write_raw, Capture};
pub use stack::{Frame, SectionStack, DEPTH_MAX};
