//! Buffer handles for values handed to the engine.
//!
//! An [`SBuf`] is what a provider returns from `get` and `partial`. Its text is
//! either borrowed from provider data for the lifetime `'a` or owned by the
//! handle itself. Independently of that, a provider can attach a release hook
//! which runs exactly once when the engine is done with the value, including
//! when the render fails halfway.

use std::borrow::Cow;
use std::fmt;

type ReleaseHook<'a> = Box<dyn FnOnce(&str) + 'a>;

/// A borrowed-or-owned string with an optional release notification.
///
/// # Example
///
/// ```rust
/// use std::cell::Cell;
/// use stache::SBuf;
///
/// let released = Cell::new(0);
/// {
///     let buf = SBuf::borrowed("hello").on_release(|value| {
///         assert_eq!(value, "hello");
///         released.set(released.get() + 1);
///     });
///     assert_eq!(buf.as_str(), "hello");
///     assert!(!buf.is_owned());
/// }
/// assert_eq!(released.get(), 1);
/// ```
pub struct SBuf<'a> {
    value: Cow<'a, str>,
    release: Option<ReleaseHook<'a>>,
}

impl<'a> SBuf<'a> {
    /// A value borrowed from provider-owned storage.
    pub fn borrowed(value: &'a str) -> Self {
        Self {
            value: Cow::Borrowed(value),
            release: None,
        }
    }

    /// A value whose allocation belongs to the handle and is freed with it.
    pub fn owned(value: impl Into<String>) -> Self {
        Self {
            value: Cow::Owned(value.into()),
            release: None,
        }
    }

    /// The empty string.
    pub fn empty() -> Self {
        Self::borrowed("")
    }

    /// Attaches a hook called with the value once the engine has consumed it.
    ///
    /// Replaces any previously attached hook without running it.
    pub fn on_release(mut self, hook: impl FnOnce(&str) + 'a) -> Self {
        self.release = Some(Box::new(hook));
        self
    }

    pub fn as_str(&self) -> &str {
        &self.value
    }

    /// Whether the handle owns its allocation.
    pub fn is_owned(&self) -> bool {
        matches!(self.value, Cow::Owned(_))
    }

    pub fn len(&self) -> usize {
        self.value.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }
}

impl Drop for SBuf<'_> {
    fn drop(&mut self) {
        if let Some(hook) = self.release.take() {
            hook(&self.value);
        }
    }
}

impl AsRef<str> for SBuf<'_> {
    fn as_ref(&self) -> &str {
        &self.value
    }
}

impl fmt::Debug for SBuf<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SBuf")
            .field("value", &self.value)
            .field("owned", &self.is_owned())
            .field("release", &self.release.is_some())
            .finish()
    }
}

impl<'a> From<&'a str> for SBuf<'a> {
    fn from(value: &'a str) -> Self {
        Self::borrowed(value)
    }
}

impl From<String> for SBuf<'_> {
    fn from(value: String) -> Self {
        Self::owned(value)
    }
}

impl<'a> From<Cow<'a, str>> for SBuf<'a> {
    fn from(value: Cow<'a, str>) -> Self {
        Self {
            value,
            release: None,
        }
    }
}
