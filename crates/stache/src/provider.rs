//! The data provider interface.
//!
//! A [`Provider`] binds the engine to a concrete data model. The engine only
//! ever talks to data through this trait: it asks for values, enters and
//! leaves sections, iterates them, resolves partials and hands raw text back
//! for emission.
//!
//! Not every capability has to be implemented. `get`, `put` and `partial`
//! are optional and advertised through the `supports_*` queries; the engine
//! adapts to whatever subset is present:
//!
//! | Operation | Used for | Fallback when absent |
//! |-----------|----------|----------------------|
//! | `put` | value substitution | `get` + `emit` |
//! | `get` | value substitution, partial text | [`Error::InvalidInterface`] |
//! | `partial` | partial text | `get`, then captured `put` output |
//! | `emit` | every write to the sink | raw write |
//!
//! The lifetime `'a` is the lifetime of the data being rendered. Values
//! returned as [`SBuf<'a>`] may borrow from it without borrowing the provider,
//! which stays free to be called again while the value is in use.

use std::io::Write;

use crate::error::{Error, Result};
use crate::sbuf::SBuf;
use crate::sink;

/// The capability set a data model implements to be rendered.
pub trait Provider<'a> {
    /// Called once before rendering starts.
    fn start(&mut self) -> Result<()> {
        Ok(())
    }

    /// Whether [`get`](Self::get) is implemented.
    fn supports_get(&self) -> bool {
        false
    }

    /// Returns the value for `name`.
    fn get(&mut self, name: &str) -> Result<SBuf<'a>> {
        let _ = name;
        Err(Error::InvalidInterface)
    }

    /// Whether [`put`](Self::put) is implemented.
    fn supports_put(&self) -> bool {
        false
    }

    /// Writes the value for `name` straight to `sink`.
    ///
    /// Takes precedence over [`get`](Self::get) for substitutions.
    fn put(&mut self, name: &str, escape: bool, sink: &mut dyn Write) -> Result<()> {
        let _ = (name, escape, sink);
        Err(Error::InvalidInterface)
    }

    /// Enters the section `name`. Returns `true` when the section is truthy
    /// or has at least one iteration.
    fn enter(&mut self, name: &str) -> Result<bool>;

    /// Advances the innermost entered section. Returns `true` when there is
    /// another iteration to render.
    fn next(&mut self) -> Result<bool>;

    /// Leaves the innermost entered section.
    fn leave(&mut self) -> Result<()>;

    /// Whether [`partial`](Self::partial) is implemented.
    fn supports_partial(&self) -> bool {
        false
    }

    /// Returns the template text of the partial `name`.
    fn partial(&mut self, name: &str) -> Result<SBuf<'a>> {
        let _ = name;
        Err(Error::InvalidInterface)
    }

    /// Writes `text` to `sink`, escaping it when `escape` is set.
    ///
    /// The default writes verbatim and ignores `escape`; providers override
    /// this to implement their escaping.
    fn emit(&mut self, text: &str, escape: bool, sink: &mut dyn Write) -> Result<()> {
        let _ = escape;
        sink::write_raw(sink, text)
    }
}

/// Substitutes the value of `name` into `sink` through whichever capability
/// the provider offers.
pub(crate) fn put_value<'a, P>(
    provider: &mut P,
    name: &str,
    escape: bool,
    sink: &mut dyn Write,
) -> Result<()>
where
    P: Provider<'a> + ?Sized,
{
    if provider.supports_put() {
        provider.put(name, escape, sink)
    } else if !provider.supports_get() {
        Err(Error::InvalidInterface)
    } else {
        let value = provider.get(name)?;
        provider.emit(value.as_str(), escape, sink)
    }
}
