//! Tag scanner.
//!
//! The scanner walks a template and splits it into literal text and tags,
//! using whichever [`Delimiters`] are active. It owns the active pair, so a
//! `{{=<% %>=}}` tag takes effect for every tag scanned after it.
//!
//! The scanner's cursor is a plain byte offset: the section machine rewinds
//! it with [`Scanner::seek`] to repeat a section body.
//!
//! # Tag forms
//!
//! | Form | Tag |
//! |------|-----|
//! | `{{name}}` | escaped value |
//! | `{{{name}}}`, `{{&name}}` | unescaped value |
//! | `{{:name}}` | escaped value whose name may start with a sigil (colon extension) |
//! | `{{#name}}`, `{{^name}}` | section open, normal or inverted |
//! | `{{/name}}` | section close |
//! | `{{>name}}` | partial |
//! | `{{! text}}` | comment |
//! | `{{=open close=}}` | delimiter redefinition |

use crate::error::{Error, Result};

/// Maximum length of a tag name, in bytes.
pub const NAME_LENGTH_MAX: usize = 1024;

/// The whitespace set trimmed from tag names and separating delimiter tokens.
fn is_space(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\n' | '\r' | '\x0b' | '\x0c')
}

/// An open/close delimiter pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delimiters {
    open: String,
    close: String,
}

impl Delimiters {
    /// Creates a delimiter pair.
    ///
    /// Both delimiters must be non-empty and free of whitespace.
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Result<Self> {
        let open = open.into();
        let close = close.into();
        let valid = |s: &str| !s.is_empty() && !s.contains(is_space);
        if !valid(&open) || !valid(&close) {
            return Err(Error::BadDelimiters);
        }
        Ok(Self { open, close })
    }

    pub fn open(&self) -> &str {
        &self.open
    }

    pub fn close(&self) -> &str {
        &self.close
    }

    /// Whether the close delimiter is made of `}` only, in which case the
    /// triple form takes its extra brace after the close delimiter.
    fn close_is_braces(&self) -> bool {
        self.close.bytes().all(|b| b == b'}')
    }
}

impl Default for Delimiters {
    fn default() -> Self {
        Self {
            open: "{{".to_string(),
            close: "}}".to_string(),
        }
    }
}

/// Tag syntax switches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanOptions {
    /// Accept tags whose trimmed name is empty.
    pub allow_empty_tag: bool,
    /// Recognise `:` as a sigil that is stripped from the name.
    pub colon_extension: bool,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            allow_empty_tag: true,
            colon_extension: true,
        }
    }
}

/// A classified tag. Names are trimmed and borrow from the template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag<'t> {
    /// `{{! ... }}`
    Comment,
    /// `{{=open close=}}`, already applied to the scanner.
    SetDelimiters { open: &'t str, close: &'t str },
    /// `{{#name}}` or `{{^name}}`
    Open { name: &'t str, inverted: bool },
    /// `{{/name}}`
    Close { name: &'t str },
    /// `{{>name}}`
    Partial { name: &'t str },
    /// `{{name}}`, `{{&name}}`, `{{{name}}}`, `{{:name}}`
    Value { name: &'t str, escape: bool },
}

/// A unit of scanned template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token<'t> {
    /// Literal text, never empty.
    Text(&'t str),
    Tag(Tag<'t>),
}

/// Splits a template into [`Token`]s.
#[derive(Debug, Clone)]
pub struct Scanner<'t> {
    template: &'t str,
    pos: usize,
    delimiters: Delimiters,
    options: ScanOptions,
}

impl<'t> Scanner<'t> {
    pub fn new(template: &'t str, delimiters: Delimiters, options: ScanOptions) -> Self {
        Self {
            template,
            pos: 0,
            delimiters,
            options,
        }
    }

    /// The current byte offset into the template.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor back to an offset previously returned by
    /// [`position`](Self::position).
    pub fn seek(&mut self, pos: usize) {
        debug_assert!(pos <= self.template.len());
        self.pos = pos;
    }

    /// The delimiters currently in effect.
    pub fn delimiters(&self) -> &Delimiters {
        &self.delimiters
    }

    /// Returns the next token, or `None` at the end of the template.
    pub fn next_token(&mut self) -> Result<Option<Token<'t>>> {
        let template = self.template;
        let remaining = &template[self.pos..];
        if remaining.is_empty() {
            return Ok(None);
        }

        match remaining.find(self.delimiters.open.as_str()) {
            Some(0) => self.scan_tag().map(|tag| Some(Token::Tag(tag))),
            Some(offset) => {
                self.pos += offset;
                Ok(Some(Token::Text(&remaining[..offset])))
            }
            None => {
                self.pos = template.len();
                Ok(Some(Token::Text(remaining)))
            }
        }
    }

    /// Scans the tag starting at the cursor, which sits on an open delimiter.
    fn scan_tag(&mut self) -> Result<Tag<'t>> {
        let template = self.template;
        let body_start = self.pos + self.delimiters.open.len();
        let body_len = template[body_start..]
            .find(self.delimiters.close.as_str())
            .ok_or(Error::UnexpectedEnd)?;
        let body = &template[body_start..body_start + body_len];
        let mut end = body_start + body_len + self.delimiters.close.len();

        let tag = match body.as_bytes().first() {
            Some(b'!') => Tag::Comment,
            Some(b'=') => self.redefine(body)?,
            Some(b'{') => {
                let inner = if self.delimiters.close_is_braces() {
                    if template.as_bytes().get(end) != Some(&b'}') {
                        return Err(Error::BadUnescapeTag);
                    }
                    end += 1;
                    &body[1..]
                } else {
                    body[1..].strip_suffix('}').ok_or(Error::BadUnescapeTag)?
                };
                Tag::Value {
                    name: self.name(inner)?,
                    escape: false,
                }
            }
            Some(b'#') => Tag::Open {
                name: self.name(&body[1..])?,
                inverted: false,
            },
            Some(b'^') => Tag::Open {
                name: self.name(&body[1..])?,
                inverted: true,
            },
            Some(b'/') => Tag::Close {
                name: self.name(&body[1..])?,
            },
            Some(b'>') => Tag::Partial {
                name: self.name(&body[1..])?,
            },
            Some(b'&') => Tag::Value {
                name: self.name(&body[1..])?,
                escape: false,
            },
            Some(b':') if self.options.colon_extension => Tag::Value {
                name: self.name(&body[1..])?,
                escape: true,
            },
            _ => Tag::Value {
                name: self.name(body)?,
                escape: true,
            },
        };

        self.pos = end;
        Ok(tag)
    }

    /// Applies a `=open close=` body.
    fn redefine(&mut self, body: &'t str) -> Result<Tag<'t>> {
        let inner = body
            .strip_prefix('=')
            .and_then(|b| b.strip_suffix('='))
            .ok_or(Error::BadDelimiters)?;
        let mut tokens = inner.split(is_space).filter(|t| !t.is_empty());
        let (open, close) = match (tokens.next(), tokens.next(), tokens.next()) {
            (Some(open), Some(close), None) => (open, close),
            _ => return Err(Error::BadDelimiters),
        };
        self.delimiters = Delimiters::new(open, close)?;
        Ok(Tag::SetDelimiters { open, close })
    }

    /// Trims and validates a tag name.
    fn name(&self, raw: &'t str) -> Result<&'t str> {
        let name = raw.trim_matches(is_space);
        if name.is_empty() && !self.options.allow_empty_tag {
            return Err(Error::EmptyTag);
        }
        if name.len() > NAME_LENGTH_MAX {
            return Err(Error::TagTooLong { length: name.len() });
        }
        Ok(name)
    }
}
