//! JSON data provider for the stache template engine.
//!
//! [`JsonProvider`] renders templates from a borrowed [`serde_json::Value`].
//! Beyond plain mustache it understands JSON pointers, object member
//! iteration and comparison sections, each switchable through
//! [`JsonOptions`].
//!
//! # Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use stache_json::{render_json, JsonOptions};
//!
//! let data = json!({
//!     "title": "Fish & Chips",
//!     "items": [{"name": "cod", "price": 9}, {"name": "chips", "price": 3}],
//!     "meta": {"origin": "UK"}
//! });
//!
//! let template = "{{title}}:{{#items}} {{name}}{{#price>5}}!{{/price>5}}{{/items}}\
//!                 {{#meta.*}} {{*}}={{.}}{{/meta.*}}";
//! let out = render_json(template, &data, JsonOptions::default()).unwrap();
//! assert_eq!(out, "Fish &amp; Chips: cod! chips origin=UK");
//! ```

mod condition;
mod format;
mod options;
mod provider;

use std::io::Write;

use serde_json::Value;
use stache::{Renderer, Result};

// Re-export public API
pub use condition::{Condition, Op};
pub use format::{format_value, is_truthy, write_escaped};
pub use options::JsonOptions;
pub use provider::JsonProvider;

/// Renders `template` against `root` into a string.
pub fn render_json(template: &str, root: &Value, options: JsonOptions) -> Result<String> {
    let mut provider = JsonProvider::with_options(root, options);
    Renderer::new().render_to_string(template, &mut provider)
}

/// Renders `template` against `root` into `out`.
pub fn render_json_to<W: Write>(
    template: &str,
    root: &Value,
    options: JsonOptions,
    out: &mut W,
) -> Result<()> {
    let mut provider = JsonProvider::with_options(root, options);
    Renderer::new().render_to(template, &mut provider, out)
}
