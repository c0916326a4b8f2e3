//! Partial resolution.
//!
//! Partial text comes from the provider's `partial` capability when it has
//! one, otherwise from `get`. A provider offering neither has the output of
//! its `put` captured into memory and used as the partial text.

use tracing::debug;

use crate::error::Result;
use crate::provider::{put_value, Provider};
use crate::sbuf::SBuf;
use crate::sink::Capture;

/// Resolves the template text of the partial `name`.
pub(crate) fn resolve_partial<'a, P>(provider: &mut P, name: &str) -> Result<SBuf<'a>>
where
    P: Provider<'a> + ?Sized,
{
    if provider.supports_partial() {
        provider.partial(name)
    } else if provider.supports_get() {
        provider.get(name)
    } else {
        capture_put(provider, name)
    }
}

/// Drives `put` into a temporary capture and hands back what it wrote.
fn capture_put<'a, P>(provider: &mut P, name: &str) -> Result<SBuf<'a>>
where
    P: Provider<'a> + ?Sized,
{
    debug!(partial = name, "capturing put output as partial text");
    let mut capture = Capture::new();
    if let Err(err) = put_value(provider, name, false, &mut capture) {
        capture.abort();
        return Err(err);
    }
    Ok(SBuf::owned(capture.finish()?))
}
