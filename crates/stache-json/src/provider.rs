//! [`Provider`] implementation over a `serde_json::Value` tree.

use std::fs;
use std::io::Write;

use serde_json::Value;
use stache::{Error, Provider, Result, SBuf};
use tracing::trace;

use crate::condition::Condition;
use crate::format::{format_value, is_truthy, write_escaped};
use crate::options::JsonOptions;

static NULL: Value = Value::Null;

/// One level of the section context.
#[derive(Debug)]
enum Frame<'a> {
    /// A truthy value or a satisfied condition.
    Single(&'a Value),
    /// Iteration over array elements.
    Items { items: &'a [Value], index: usize },
    /// Iteration over object members.
    Members {
        members: Vec<(&'a str, &'a Value)>,
        index: usize,
    },
}

impl<'a> Frame<'a> {
    fn current(&self) -> &'a Value {
        match self {
            Frame::Single(value) => *value,
            Frame::Items { items, index } => (*items).get(*index).unwrap_or(&NULL),
            Frame::Members { members, index } => members.get(*index).map_or(&NULL, |(_, v)| *v),
        }
    }

    fn key(&self) -> Option<&'a str> {
        match self {
            Frame::Members { members, index } => members.get(*index).map(|(k, _)| *k),
            _ => None,
        }
    }

    /// Steps to the next iteration. Returns `false` once exhausted.
    fn advance(&mut self) -> bool {
        match self {
            Frame::Single(_) => false,
            Frame::Items { items, index } => {
                *index += 1;
                *index < items.len()
            }
            Frame::Members { members, index } => {
                *index += 1;
                *index < members.len()
            }
        }
    }
}

/// Renders data from a borrowed JSON document.
///
/// Names resolve against the section context, innermost first: inside
/// `{{#user}}`, `{{name}}` finds `user.name` before a top-level `name`.
///
/// | Name | Resolves to |
/// |------|-------------|
/// | `.` | the current value |
/// | `a.b.0` | key `a`, then key `b`, then array index 0 |
/// | `/a/b` | JSON pointer, when enabled |
/// | `*` | key of the current member in an object iteration |
#[derive(Debug)]
pub struct JsonProvider<'a> {
    root: &'a Value,
    options: JsonOptions,
    frames: Vec<Frame<'a>>,
}

impl<'a> JsonProvider<'a> {
    pub fn new(root: &'a Value) -> Self {
        Self::with_options(root, JsonOptions::default())
    }

    pub fn with_options(root: &'a Value, options: JsonOptions) -> Self {
        Self {
            root,
            options,
            frames: vec![Frame::Single(root)],
        }
    }

    pub fn options(&self) -> &JsonOptions {
        &self.options
    }

    fn current(&self) -> &'a Value {
        self.frames.last().map_or(self.root, Frame::current)
    }

    fn member_key(&self) -> Option<&'a str> {
        self.frames.last().and_then(Frame::key)
    }

    /// Finds the value a name refers to.
    fn resolve(&self, name: &str) -> Option<&'a Value> {
        if name.is_empty() || name == "." {
            return Some(self.current());
        }
        if self.options.json_pointer && name.starts_with('/') {
            return self
                .frames
                .iter()
                .rev()
                .find_map(|frame| frame.current().pointer(name));
        }
        let (first, rest) = match name.split_once('.') {
            Some((first, rest)) => (first, Some(rest)),
            None => (name, None),
        };
        let base = self
            .frames
            .iter()
            .rev()
            .find_map(|frame| child(frame.current(), first))?;
        match rest {
            Some(rest) => descend(base, rest),
            None => Some(base),
        }
    }

    /// Resolves the object behind `{{#*}}` or `{{#key.*}}`.
    fn members_of(&self, name: &str) -> Option<Option<&'a Value>> {
        if !self.options.object_iter {
            return None;
        }
        if name == "*" {
            return Some(Some(self.current()));
        }
        name.strip_suffix(".*").map(|prefix| self.resolve(prefix))
    }

    fn push(&mut self, frame: Frame<'a>) -> bool {
        self.frames.push(frame);
        true
    }

    fn undefined(&self, name: &str) -> Result<SBuf<'a>> {
        if self.options.error_undefined {
            return Err(Error::ItemNotFound(name.to_string()));
        }
        trace!(name, "value not found");
        Ok(SBuf::empty())
    }

    fn partial_from_files(&self, name: &str) -> Result<Option<SBuf<'a>>> {
        for path in self.options.partial_candidates(name) {
            if path.is_file() {
                trace!(partial = name, path = %path.display(), "partial file");
                return Ok(Some(SBuf::owned(fs::read_to_string(&path)?)));
            }
        }
        Ok(None)
    }

    fn partial_from_data(&self, name: &str) -> Option<SBuf<'a>> {
        match self.resolve(name) {
            Some(Value::String(text)) => Some(SBuf::borrowed(text)),
            _ => None,
        }
    }
}

fn child<'v>(value: &'v Value, segment: &str) -> Option<&'v Value> {
    match value {
        Value::Object(map) => map.get(segment),
        Value::Array(items) => items.get(segment.parse::<usize>().ok()?),
        _ => None,
    }
}

fn descend<'v>(value: &'v Value, path: &str) -> Option<&'v Value> {
    path.split('.').try_fold(value, child)
}

impl<'a> Provider<'a> for JsonProvider<'a> {
    fn start(&mut self) -> Result<()> {
        self.frames.clear();
        self.frames.push(Frame::Single(self.root));
        Ok(())
    }

    fn supports_get(&self) -> bool {
        true
    }

    fn get(&mut self, name: &str) -> Result<SBuf<'a>> {
        if self.options.object_iter && name == "*" {
            return match self.member_key() {
                Some(key) => Ok(SBuf::borrowed(key)),
                None => self.undefined(name),
            };
        }
        match self.resolve(name) {
            Some(value) => Ok(format_value(value)),
            None => self.undefined(name),
        }
    }

    fn enter(&mut self, name: &str) -> Result<bool> {
        if let Some(target) = self.members_of(name) {
            let members: Vec<(&'a str, &'a Value)> = match target {
                Some(Value::Object(map)) => map.iter().map(|(k, v)| (k.as_str(), v)).collect(),
                _ => Vec::new(),
            };
            if members.is_empty() {
                return Ok(false);
            }
            return Ok(self.push(Frame::Members { members, index: 0 }));
        }

        if let Some(condition) = Condition::parse(name, self.options.equal, self.options.compare) {
            let value = self.resolve(condition.key);
            if !condition.holds(value) {
                return Ok(false);
            }
            let current = self.current();
            return Ok(self.push(Frame::Single(value.unwrap_or(current))));
        }

        match self.resolve(name) {
            Some(Value::Array(items)) if !items.is_empty() => {
                Ok(self.push(Frame::Items { items, index: 0 }))
            }
            Some(value) if is_truthy(value) => Ok(self.push(Frame::Single(value))),
            Some(_) => Ok(false),
            None => {
                trace!(name, "section not found");
                Ok(false)
            }
        }
    }

    fn next(&mut self) -> Result<bool> {
        Ok(self.frames.last_mut().is_some_and(Frame::advance))
    }

    fn leave(&mut self) -> Result<()> {
        if self.frames.len() > 1 {
            self.frames.pop();
        }
        Ok(())
    }

    fn supports_partial(&self) -> bool {
        true
    }

    fn partial(&mut self, name: &str) -> Result<SBuf<'a>> {
        let found = if self.options.partial_data_first {
            match self.partial_from_data(name) {
                Some(text) => Some(text),
                None => self.partial_from_files(name)?,
            }
        } else {
            match self.partial_from_files(name)? {
                Some(text) => Some(text),
                None => self.partial_from_data(name),
            }
        };
        match found {
            Some(text) => Ok(text),
            None if self.options.error_undefined => Err(Error::PartialNotFound(name.to_string())),
            None => {
                trace!(partial = name, "partial not found");
                Ok(SBuf::empty())
            }
        }
    }

    fn emit(&mut self, text: &str, escape: bool, sink: &mut dyn Write) -> Result<()> {
        if escape {
            write_escaped(sink, text)
        } else {
            stache::write_raw(sink, text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    mod resolution {
        use super::*;

        #[test]
        fn test_dotted_and_indexed_paths() {
            let data = json!({"user": {"tags": ["a", "b"]}});
            let provider = JsonProvider::new(&data);
            assert_eq!(provider.resolve("user.tags.1"), Some(&json!("b")));
            assert_eq!(provider.resolve("user.missing"), None);
            assert_eq!(provider.resolve("user.tags.9"), None);
        }

        #[test]
        fn test_pointer_only_when_enabled() {
            let data = json!({"a": {"b/c": 1}});
            let provider = JsonProvider::new(&data);
            assert_eq!(provider.resolve("/a/b~1c"), Some(&json!(1)));

            let plain = JsonProvider::with_options(&data, JsonOptions::none());
            assert_eq!(plain.resolve("/a/b~1c"), None);
        }

        #[test]
        fn test_inner_context_wins() {
            let data = json!({"name": "outer", "inner": {"name": "inner"}});
            let mut provider = JsonProvider::new(&data);
            assert!(provider.enter("inner").unwrap());
            assert_eq!(provider.resolve("name"), Some(&json!("inner")));
            provider.leave().unwrap();
            assert_eq!(provider.resolve("name"), Some(&json!("outer")));
        }

        #[test]
        fn test_root_never_popped() {
            let data = json!({"x": 1});
            let mut provider = JsonProvider::new(&data);
            provider.leave().unwrap();
            assert_eq!(provider.resolve("x"), Some(&json!(1)));
        }
    }

    mod sections {
        use super::*;

        #[test]
        fn test_array_iteration() {
            let data = json!({"list": [1, 2]});
            let mut provider = JsonProvider::new(&data);
            assert!(provider.enter("list").unwrap());
            assert_eq!(provider.current(), &json!(1));
            assert!(provider.next().unwrap());
            assert_eq!(provider.current(), &json!(2));
            assert!(!provider.next().unwrap());
        }

        #[test]
        fn test_empty_array_not_entered() {
            let data = json!({"list": []});
            let mut provider = JsonProvider::new(&data);
            assert!(!provider.enter("list").unwrap());
        }

        #[test]
        fn test_member_iteration_exposes_keys() {
            let data = json!({"m": {"k1": "v1"}});
            let mut provider = JsonProvider::new(&data);
            assert!(provider.enter("m.*").unwrap());
            assert_eq!(provider.get("*").unwrap().as_str(), "k1");
            assert_eq!(provider.get(".").unwrap().as_str(), "v1");
            assert!(!provider.next().unwrap());
        }

        #[test]
        fn test_condition_keeps_context() {
            let data = json!({"n": 5, "label": "five"});
            let mut provider = JsonProvider::new(&data);
            assert!(provider.enter("n>3").unwrap());
            assert_eq!(provider.get("label").unwrap().as_str(), "five");
            assert!(!provider.enter("n<3").unwrap());
        }
    }

    mod undefined {
        use super::*;
        use stache::ErrorKind;

        #[test]
        fn test_missing_value_empty_by_default() {
            let data = json!({});
            let mut provider = JsonProvider::new(&data);
            assert_eq!(provider.get("nope").unwrap().as_str(), "");
        }

        #[test]
        fn test_missing_value_error_when_requested() {
            let data = json!({});
            let options = JsonOptions::default().error_undefined(true);
            let mut provider = JsonProvider::with_options(&data, options);
            assert_eq!(provider.get("nope").unwrap_err().kind(), ErrorKind::ItemNotFound);
            assert_eq!(provider.partial("nope").unwrap_err().kind(), ErrorKind::PartialNotFound);
        }
    }
}
