//! Render driver.
//!
//! [`Renderer`] holds the render configuration and runs the scan loop: the
//! [`Scanner`] produces tokens, literal text and values go to the sink through
//! the provider, section tags drive the [`SectionStack`], and partial tags
//! recurse into a fresh scan of the partial text with the delimiters active at
//! the point of inclusion.
//!
//! Three destinations are offered:
//!
//! | Method | Destination | On error |
//! |--------|-------------|----------|
//! | [`Renderer::render_to`] | caller's writer | bytes already written stay |
//! | [`Renderer::render_to_string`] | growable buffer | buffer discarded |
//! | [`Renderer::render_file`] / `render_fd` | file or descriptor | nothing written |

use std::fs::File;
use std::io::Write;

use tracing::{debug, trace};

use crate::error::{Error, Result};
use crate::partial::resolve_partial;
use crate::provider::{put_value, Provider};
use crate::scanner::{Delimiters, ScanOptions, Scanner, Tag, Token};
use crate::sink::Capture;
use crate::stack::SectionStack;

/// Default limit on nested partial inclusions.
pub const DEFAULT_MAX_PARTIAL_DEPTH: usize = 64;

/// Renders templates against a [`Provider`].
///
/// A renderer is plain configuration and can be shared freely; all render
/// state lives in the call.
///
/// # Example
///
/// ```rust
/// use stache::{Renderer, ErrorKind};
///
/// let renderer = Renderer::new()
///     .allow_empty_tag(false)
///     .max_partial_depth(8);
/// assert!(!renderer.options().allow_empty_tag);
///
/// let custom = Renderer::new().with_delimiters("<%", "%>").unwrap();
/// assert_eq!(custom.delimiters().open(), "<%");
///
/// let err = Renderer::new().with_delimiters("", "%>").unwrap_err();
/// assert_eq!(err.kind(), ErrorKind::BadDelimiters);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Renderer {
    delimiters: Delimiters,
    options: ScanOptions,
    max_partial_depth: usize,
}

impl Renderer {
    /// Creates a renderer with `{{ }}` delimiters, empty tags allowed and the
    /// colon extension enabled.
    pub fn new() -> Self {
        Self {
            delimiters: Delimiters::default(),
            options: ScanOptions::default(),
            max_partial_depth: DEFAULT_MAX_PARTIAL_DEPTH,
        }
    }

    /// A renderer that rejects empty tags and treats `:` as part of names.
    pub fn strict() -> Self {
        Self::new().allow_empty_tag(false).colon_extension(false)
    }

    /// Accept or reject tags with an empty name.
    pub fn allow_empty_tag(mut self, allow: bool) -> Self {
        self.options.allow_empty_tag = allow;
        self
    }

    /// Enable or disable the `{{:name}}` sigil.
    pub fn colon_extension(mut self, enabled: bool) -> Self {
        self.options.colon_extension = enabled;
        self
    }

    /// Limit how deep partials may include other partials.
    pub fn max_partial_depth(mut self, depth: usize) -> Self {
        self.max_partial_depth = depth;
        self
    }

    /// Start rendering with a delimiter pair other than `{{ }}`.
    pub fn with_delimiters(
        mut self,
        open: impl Into<String>,
        close: impl Into<String>,
    ) -> Result<Self> {
        self.delimiters = Delimiters::new(open, close)?;
        Ok(self)
    }

    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    pub fn options(&self) -> ScanOptions {
        self.options
    }

    /// Renders `template` into `out`.
    ///
    /// `out` is flushed on success. On failure, whatever was written before
    /// the error stays in `out`.
    pub fn render_to<'a, P, W>(&self, template: &str, provider: &mut P, out: &mut W) -> Result<()>
    where
        P: Provider<'a> + ?Sized,
        W: Write,
    {
        debug!(bytes = template.len(), "render start");
        provider.start()?;
        self.process(template, provider, out, self.delimiters.clone(), 0)?;
        out.flush()?;
        debug!("render done");
        Ok(())
    }

    /// Renders `template` into a new string. Nothing is returned on failure.
    pub fn render_to_string<'a, P>(&self, template: &str, provider: &mut P) -> Result<String>
    where
        P: Provider<'a> + ?Sized,
    {
        let mut capture = Capture::new();
        match self.render_to(template, provider, &mut capture) {
            Ok(()) => capture.finish(),
            Err(err) => {
                capture.abort();
                Err(err)
            }
        }
    }

    /// Renders `template` into `file`, which is closed afterwards.
    ///
    /// The output is staged in memory and written only once the whole render
    /// succeeded, so a failed render leaves the file untouched.
    pub fn render_file<'a, P>(&self, template: &str, provider: &mut P, mut file: File) -> Result<()>
    where
        P: Provider<'a> + ?Sized,
    {
        let mut capture = Capture::new();
        self.render_to(template, provider, &mut capture)?;
        file.write_all(capture.as_bytes())?;
        file.flush()?;
        Ok(())
    }

    /// Renders `template` into the descriptor `fd`, taking ownership of it.
    ///
    /// Same staging as [`render_file`](Self::render_file).
    #[cfg(unix)]
    pub fn render_fd<'a, P>(
        &self,
        template: &str,
        provider: &mut P,
        fd: std::os::fd::OwnedFd,
    ) -> Result<()>
    where
        P: Provider<'a> + ?Sized,
    {
        self.render_file(template, provider, File::from(fd))
    }

    /// Runs the scan loop over one template: the top-level one or a partial.
    fn process<'a, P>(
        &self,
        template: &str,
        provider: &mut P,
        out: &mut dyn Write,
        delimiters: Delimiters,
        partial_depth: usize,
    ) -> Result<()>
    where
        P: Provider<'a> + ?Sized,
    {
        let mut scanner = Scanner::new(template, delimiters, self.options);
        let mut stack = SectionStack::new();

        while let Some(token) = scanner.next_token()? {
            let tag = match token {
                Token::Text(text) => {
                    if stack.enabled() {
                        provider.emit(text, false, out)?;
                    }
                    continue;
                }
                Token::Tag(tag) => tag,
            };
            trace!(?tag, enabled = stack.enabled(), depth = stack.depth(), "tag");

            match tag {
                Tag::Comment => {}
                Tag::SetDelimiters { open, close } => {
                    debug!(open, close, "delimiters redefined");
                }
                Tag::Open { name, inverted } => {
                    stack.open(name, inverted, scanner.position(), provider)?;
                }
                Tag::Close { name } => {
                    if let Some(resume) = stack.close(name, provider)? {
                        scanner.seek(resume);
                    }
                }
                Tag::Partial { name } => {
                    if stack.enabled() {
                        let delimiters = scanner.delimiters().clone();
                        self.expand_partial(name, provider, out, delimiters, partial_depth)?;
                    }
                }
                Tag::Value { name, escape } => {
                    if stack.enabled() {
                        put_value(provider, name, escape, out)?;
                    }
                }
            }
        }

        if stack.is_empty() {
            Ok(())
        } else {
            Err(Error::UnexpectedEnd)
        }
    }

    fn expand_partial<'a, P>(
        &self,
        name: &str,
        provider: &mut P,
        out: &mut dyn Write,
        delimiters: Delimiters,
        partial_depth: usize,
    ) -> Result<()>
    where
        P: Provider<'a> + ?Sized,
    {
        if partial_depth >= self.max_partial_depth {
            return Err(Error::TooDeep {
                limit: self.max_partial_depth,
            });
        }
        let text = resolve_partial(provider, name)?;
        debug!(
            partial = name,
            bytes = text.len(),
            owned = text.is_owned(),
            depth = partial_depth + 1,
            "expanding partial"
        );
        self.process(text.as_str(), provider, out, delimiters, partial_depth + 1)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders `template` into `out` with the default [`Renderer`].
pub fn render_to<'a, P, W>(template: &str, provider: &mut P, out: &mut W) -> Result<()>
where
    P: Provider<'a> + ?Sized,
    W: Write,
{
    Renderer::new().render_to(template, provider, out)
}

/// Renders `template` into a string with the default [`Renderer`].
pub fn render_to_string<'a, P>(template: &str, provider: &mut P) -> Result<String>
where
    P: Provider<'a> + ?Sized,
{
    Renderer::new().render_to_string(template, provider)
}

/// Renders `template` into `file` with the default [`Renderer`].
pub fn render_file<'a, P>(template: &str, provider: &mut P, file: File) -> Result<()>
where
    P: Provider<'a> + ?Sized,
{
    Renderer::new().render_file(template, provider, file)
}

/// Renders `template` into the descriptor `fd` with the default [`Renderer`].
#[cfg(unix)]
pub fn render_fd<'a, P>(template: &str, provider: &mut P, fd: std::os::fd::OwnedFd) -> Result<()>
where
    P: Provider<'a> + ?Sized,
{
    Renderer::new().render_fd(template, provider, fd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::sbuf::SBuf;
    use std::collections::HashMap;

    /// Values and partials from maps, sections from a truthiness map.
    #[derive(Default)]
    struct MapProvider {
        values: HashMap<&'static str, &'static str>,
        partials: HashMap<&'static str, &'static str>,
        sections: HashMap<&'static str, bool>,
    }

    impl MapProvider {
        fn value(mut self, name: &'static str, value: &'static str) -> Self {
            self.values.insert(name, value);
            self
        }

        fn partial(mut self, name: &'static str, text: &'static str) -> Self {
            self.partials.insert(name, text);
            self
        }

        fn section(mut self, name: &'static str, truthy: bool) -> Self {
            self.sections.insert(name, truthy);
            self
        }
    }

    impl Provider<'static> for MapProvider {
        fn supports_get(&self) -> bool {
            true
        }
        fn get(&mut self, name: &str) -> Result<SBuf<'static>> {
            Ok(SBuf::borrowed(self.values.get(name).copied().unwrap_or("")))
        }
        fn supports_partial(&self) -> bool {
            true
        }
        fn partial(&mut self, name: &str) -> Result<SBuf<'static>> {
            self.partials
                .get(name)
                .copied()
                .map(SBuf::borrowed)
                .ok_or_else(|| Error::PartialNotFound(name.to_string()))
        }
        fn enter(&mut self, name: &str) -> Result<bool> {
            Ok(self.sections.get(name).copied().unwrap_or(false))
        }
        fn next(&mut self) -> Result<bool> {
            Ok(false)
        }
        fn leave(&mut self) -> Result<()> {
            Ok(())
        }
    }

    fn render(template: &str, provider: &mut MapProvider) -> Result<String> {
        Renderer::new().render_to_string(template, provider)
    }

    #[test]
    fn test_plain_text() {
        let out = render("no tags here", &mut MapProvider::default()).unwrap();
        assert_eq!(out, "no tags here");
    }

    #[test]
    fn test_value_substitution() {
        let mut provider = MapProvider::default().value("name", "World");
        assert_eq!(render("Hello, {{name}}!", &mut provider).unwrap(), "Hello, World!");
    }

    #[test]
    fn test_section_truthy_and_falsy() {
        let mut provider = MapProvider::default().section("yes", true).section("no", false);
        let out = render("{{#yes}}Y{{/yes}}{{#no}}N{{/no}}{{^no}}!{{/no}}", &mut provider).unwrap();
        assert_eq!(out, "Y!");
    }

    #[test]
    fn test_unclosed_section_is_unexpected_end() {
        let err = render("{{#open}}body", &mut MapProvider::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedEnd);
    }

    #[test]
    fn test_partial_inherits_delimiters() {
        let mut provider = MapProvider::default()
            .partial("p", "<%v%>{{v}}")
            .value("v", "1");
        let out = render("{{=<% %>=}}<%>p%>", &mut provider).unwrap();
        assert_eq!(out, "1{{v}}");
    }

    #[test]
    fn test_partial_redefinition_stays_local() {
        let mut provider = MapProvider::default()
            .partial("p", "{{=[ ]=}}[v]")
            .value("v", "1");
        let out = render("{{>p}}{{v}}", &mut provider).unwrap();
        assert_eq!(out, "11");
    }

    #[test]
    fn test_self_recursive_partial_hits_depth_limit() {
        let mut provider = MapProvider::default().partial("loop", "x{{>loop}}");
        let err = Renderer::new()
            .max_partial_depth(5)
            .render_to_string("{{>loop}}", &mut provider)
            .unwrap_err();
        assert!(matches!(err, Error::TooDeep { limit: 5 }));
    }

    #[test]
    fn test_partial_in_disabled_section_not_resolved() {
        let mut provider = MapProvider::default();
        let out = render("{{#off}}{{>missing}}{{/off}}done", &mut provider).unwrap();
        assert_eq!(out, "done");
    }

    #[test]
    fn test_custom_start_delimiters() {
        let mut provider = MapProvider::default().value("x", "42");
        let out = Renderer::new()
            .with_delimiters("[[", "]]")
            .unwrap()
            .render_to_string("{{x}} [[x]]", &mut provider)
            .unwrap();
        assert_eq!(out, "{{x}} 42");
    }

    #[test]
    fn test_strict_rejects_empty_tag() {
        let err = Renderer::strict()
            .render_to_string("{{ }}", &mut MapProvider::default())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::EmptyTag);
    }

    #[test]
    fn test_render_to_keeps_partial_output() {
        let mut out = Vec::new();
        let err = Renderer::new()
            .render_to("before {{/x}}", &mut MapProvider::default(), &mut out)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Closing);
        assert_eq!(out, b"before ");
    }
}
