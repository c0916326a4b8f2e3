//! Section stack machine.
//!
//! Tracks the nested `{{#name}}` / `{{^name}}` sections of one template and
//! the enabled flag that decides whether anything renders. Every open tag
//! pushes a [`Frame`] even when output is already suppressed, so nesting is
//! checked the same way in rendered and skipped branches.
//!
//! The stack has a hard capacity of [`DEPTH_MAX`] frames.

use crate::error::{Error, Result};
use crate::provider::Provider;

/// Maximum number of sections open at the same time.
pub const DEPTH_MAX: usize = 256;

/// One open section.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'t> {
    /// Trimmed section name, matched byte for byte by the close tag.
    pub name: &'t str,
    /// Cursor offset of the section body, where repetition resumes.
    pub resume: usize,
    /// Enabled flag of the enclosing context.
    pub parent_enabled: bool,
    /// Whether the provider entered the section.
    pub entered: bool,
}

/// The open sections of one template, innermost last.
#[derive(Debug)]
pub struct SectionStack<'t> {
    frames: Vec<Frame<'t>>,
    enabled: bool,
}

impl<'t> SectionStack<'t> {
    pub fn new() -> Self {
        Self {
            frames: Vec::new(),
            enabled: true,
        }
    }

    /// Whether output and provider queries are currently allowed.
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Handles a section-open tag whose body starts at `resume`.
    ///
    /// The provider is only asked to enter the section when the current
    /// context is enabled.
    pub fn open<'a, P>(
        &mut self,
        name: &'t str,
        inverted: bool,
        resume: usize,
        provider: &mut P,
    ) -> Result<()>
    where
        P: Provider<'a> + ?Sized,
    {
        if self.frames.len() >= DEPTH_MAX {
            return Err(Error::TooDeep { limit: DEPTH_MAX });
        }
        let entered = if self.enabled {
            provider.enter(name)?
        } else {
            false
        };
        self.frames.push(Frame {
            name,
            resume,
            parent_enabled: self.enabled,
            entered,
        });
        if inverted == entered {
            self.enabled = false;
        }
        Ok(())
    }

    /// Handles a section-close tag.
    ///
    /// Returns the offset to rewind to when the provider has another
    /// iteration, `None` once the section is finished.
    pub fn close<'a, P>(&mut self, name: &str, provider: &mut P) -> Result<Option<usize>>
    where
        P: Provider<'a> + ?Sized,
    {
        let frame = self.frames.pop().ok_or_else(|| Error::Closing {
            expected: None,
            found: name.to_string(),
        })?;
        if frame.name != name {
            return Err(Error::Closing {
                expected: Some(frame.name.to_string()),
                found: name.to_string(),
            });
        }

        let again = if self.enabled && frame.entered {
            provider.next()?
        } else {
            false
        };
        if again {
            self.frames.push(frame);
            return Ok(Some(frame.resume));
        }

        self.enabled = frame.parent_enabled;
        if self.enabled && frame.entered {
            provider.leave()?;
        }
        Ok(None)
    }
}

impl Default for SectionStack<'_> {
    fn default() -> Self {
        Self::new()
    }
}
