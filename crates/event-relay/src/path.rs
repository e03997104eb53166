// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Dotted-path addressing over `serde_json::Value` trees.
//!
//! [`get`] resolves paths such as `properties.$os` against an arbitrary
//! nested value. Besides the plain split-and-walk it supports:
//!
//! - keys that themselves contain the separator, either found as a literal key
//!   on the immediate target (`{"a.b": 1}` resolves `a.b`) or by re-joining
//!   successive segments until a key matches,
//! - backslash escapes (`a\.b` addresses the key `a.b`),
//! - a custom separator, join and split functions and a validity predicate
//!   consulted on every matched segment.
//!
//! [`set`] writes a value at a dotted path, creating intermediate maps and
//! replacing any non-container value that is in the way.

use serde_json::{Map, Value};
use std::borrow::Cow;
use std::fmt::Debug;

pub const DEFAULT_SEPARATOR: &str = ".";
const ESCAPE: char = '\\';

pub type JoinFn = Box<dyn Fn(&str, &str) -> String + Send + Sync>;
pub type SplitFn = Box<dyn Fn(&str) -> Vec<String> + Send + Sync>;
pub type IsValidFn = Box<dyn Fn(&str, &Value) -> bool + Send + Sync>;

/// A path to resolve: either a single string to be split or pre-split segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Path<'a> {
    Dotted(Cow<'a, str>),
    Segments(Vec<Cow<'a, str>>),
}

impl<'a> From<&'a str> for Path<'a> {
    fn from(path: &'a str) -> Self {
        Path::Dotted(Cow::Borrowed(path))
    }
}

impl From<String> for Path<'static> {
    fn from(path: String) -> Self {
        Path::Dotted(Cow::Owned(path))
    }
}

impl From<u64> for Path<'static> {
    fn from(index: u64) -> Self {
        Path::Dotted(Cow::Owned(index.to_string()))
    }
}

impl From<usize> for Path<'static> {
    fn from(index: usize) -> Self {
        Path::Dotted(Cow::Owned(index.to_string()))
    }
}

impl<'a> From<&'a [&'a str]> for Path<'a> {
    fn from(segments: &'a [&'a str]) -> Self {
        Path::Segments(segments.iter().map(|s| Cow::Borrowed(*s)).collect())
    }
}

impl<'a, const N: usize> From<[&'a str; N]> for Path<'a> {
    fn from(segments: [&'a str; N]) -> Self {
        Path::Segments(segments.into_iter().map(Cow::Borrowed).collect())
    }
}

impl From<Vec<String>> for Path<'static> {
    fn from(segments: Vec<String>) -> Self {
        Path::Segments(segments.into_iter().map(Cow::Owned).collect())
    }
}

/// Options for [`get_with`].
#[derive(Default)]
pub struct GetOptions {
    /// Returned instead of "absent" when resolution fails.
    pub default: Option<Value>,
    /// Segment separator, `.` when unset or empty.
    pub separator: Option<String>,
    /// Used to re-join segments, defaults to the separator.
    pub join_char: Option<String>,
    pub join: Option<JoinFn>,
    pub split: Option<SplitFn>,
    /// Consulted with `(key, container)` for every matched segment.
    pub is_valid: Option<IsValidFn>,
}

impl GetOptions {
    #[must_use]
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    #[must_use]
    pub fn with_separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = Some(separator.into());
        self
    }

    #[must_use]
    pub fn with_join_char(mut self, join_char: impl Into<String>) -> Self {
        self.join_char = Some(join_char.into());
        self
    }

    #[must_use]
    pub fn with_join(mut self, join: impl Fn(&str, &str) -> String + Send + Sync + 'static) -> Self {
        self.join = Some(Box::new(join));
        self
    }

    #[must_use]
    pub fn with_split(mut self, split: impl Fn(&str) -> Vec<String> + Send + Sync + 'static) -> Self {
        self.split = Some(Box::new(split));
        self
    }

    #[must_use]
    pub fn with_is_valid(
        mut self,
        is_valid: impl Fn(&str, &Value) -> bool + Send + Sync + 'static,
    ) -> Self {
        self.is_valid = Some(Box::new(is_valid));
        self
    }

    fn separator(&self) -> &str {
        self.separator
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SEPARATOR)
    }

    fn join_char(&self) -> &str {
        self.join_char
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| self.separator())
    }

    fn join(&self, head: &str, tail: &str) -> String {
        match &self.join {
            Some(join) => join(head, tail),
            None => format!("{head}{}{tail}", self.join_char()),
        }
    }

    fn split(&self, path: &str) -> Vec<String> {
        match &self.split {
            Some(split) => split(path),
            None => path.split(self.separator()).map(String::from).collect(),
        }
    }

    fn is_valid(&self, key: &str, target: &Value) -> bool {
        self.is_valid
            .as_ref()
            .map_or(true, |is_valid| is_valid(key, target))
    }
}

impl Debug for GetOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GetOptions")
            .field("default", &self.default)
            .field("separator", &self.separator)
            .field("join_char", &self.join_char)
            .field("join", &self.join.is_some())
            .field("split", &self.split.is_some())
            .field("is_valid", &self.is_valid.is_some())
            .finish()
    }
}

/// Resolves `path` against `target` with default options.
///
/// Returns `None` when the path does not resolve. A key that exists with a
/// `null` value resolves to `Some(&Value::Null)`.
pub fn get<'a, 'p>(target: &'a Value, path: impl Into<Path<'p>>) -> Option<&'a Value> {
    lookup(target, path.into(), &GetOptions::default())
}

/// Resolves `path` against `target`, returning `default` when it does not resolve.
pub fn get_or<'a, 'p>(target: &'a Value, path: impl Into<Path<'p>>, default: &'a Value) -> &'a Value {
    get(target, path).unwrap_or(default)
}

/// Resolves `path` against `target` with the given options.
///
/// Falls back to `options.default` whenever resolution fails or `is_valid`
/// rejects a segment.
pub fn get_with<'a, 'p>(
    target: &'a Value,
    path: impl Into<Path<'p>>,
    options: &'a GetOptions,
) -> Option<&'a Value> {
    lookup(target, path.into(), options).or(options.default.as_ref())
}

fn lookup<'a>(target: &'a Value, path: Path<'_>, options: &GetOptions) -> Option<&'a Value> {
    if !is_addressable(target) {
        return None;
    }

    let segments = match path {
        Path::Dotted(path) => {
            // a literal key wins over any split interpretation
            if let Some(value) = child(target, &path) {
                return options.is_valid(&path, target).then_some(value);
            }
            options.split(&path)
        }
        Path::Segments(segments) => segments.into_iter().map(Cow::into_owned).collect(),
    };

    resolve(target, &segments, options)
}

fn resolve<'a>(mut target: &'a Value, segments: &[String], options: &GetOptions) -> Option<&'a Value> {
    let len = segments.len();
    let mut idx = 0;

    loop {
        let mut prop = segments.get(idx)?.clone();

        while prop.ends_with(ESCAPE) && idx < len {
            prop.pop();
            idx += 1;
            let next = segments.get(idx).map_or("", String::as_str);
            prop = options.join(&prop, next);
        }

        if let Some(next) = child(target, &prop) {
            if !options.is_valid(&prop, target) {
                return None;
            }
            target = next;
        } else {
            let mut matched = false;
            let mut n = idx + 1;
            while n < len {
                prop = options.join(&prop, &segments[n]);
                n += 1;
                if let Some(next) = child(target, &prop) {
                    if !options.is_valid(&prop, target) {
                        return None;
                    }
                    target = next;
                    idx = n - 1;
                    matched = true;
                    break;
                }
            }
            if !matched {
                return None;
            }
        }

        idx += 1;
        if idx >= len || !is_addressable(target) {
            break;
        }
    }

    (idx == len).then_some(target)
}

/// Writes `value` at the dotted `path`, creating intermediate maps as needed.
///
/// Any intermediate value that is not a map (or an array addressed by an
/// in-bounds index) is replaced by an empty map. Siblings of the written path
/// are left untouched.
pub fn set(target: &mut Value, path: &str, value: Value) {
    let keys: Vec<&str> = path.split(DEFAULT_SEPARATOR).collect();
    set_segments(target, &keys, value);
}

/// Like [`set`], with the path already split. Segments are used as literal keys.
pub fn set_segments(target: &mut Value, keys: &[&str], value: Value) {
    let Some((last, parents)) = keys.split_last() else {
        return;
    };

    let mut current = target;
    for key in parents {
        current = slot(current, key);
    }
    *slot(current, last) = value;
}

fn slot<'v>(current: &'v mut Value, key: &str) -> &'v mut Value {
    if let Some(index) = index_key(key) {
        if current.as_array().is_some_and(|items| index < items.len()) {
            return &mut current[index];
        }
    }
    if !current.is_object() {
        *current = Value::Object(Map::new());
    }
    &mut current[key]
}

fn is_addressable(value: &Value) -> bool {
    matches!(value, Value::Object(_) | Value::Array(_))
}

fn child<'a>(target: &'a Value, key: &str) -> Option<&'a Value> {
    match target {
        Value::Object(map) => map.get(key),
        Value::Array(items) => index_key(key).and_then(|index| items.get(index)),
        _ => None,
    }
}

/// Only canonical decimal keys address array elements (`"1"`, not `"01"` or `"+1"`).
fn index_key(key: &str) -> Option<usize> {
    key.parse::<usize>()
        .ok()
        .filter(|index| index.to_string() == key)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_get_nested() {
        let target = json!({"a": {"b": {"c": 5}}});
        assert_eq!(get(&target, "a.b.c"), Some(&json!(5)));
        assert_eq!(get(&target, "a.b"), Some(&json!({"c": 5})));
    }

    #[test]
    fn test_get_missing_returns_default() {
        let target = json!({"a": 1});
        assert_eq!(get(&target, "x.y"), None);
        assert_eq!(get_or(&target, "x.y", &json!("default")), &json!("default"));

        let options = GetOptions::default().with_default(json!("default"));
        assert_eq!(get_with(&target, "x.y", &options), Some(&json!("default")));
    }

    #[test]
    fn test_get_null_is_present() {
        let target = json!({"a": {"b": null}});
        assert_eq!(get(&target, "a.b"), Some(&Value::Null));
    }

    #[test]
    fn test_get_through_scalar_fails() {
        let target = json!({"a": 1});
        assert_eq!(get(&target, "a.b"), None);
    }

    #[test]
    fn test_get_non_addressable_target() {
        let options = GetOptions::default().with_default(json!("fallback"));
        assert_eq!(get(&json!(5), "a"), None);
        assert_eq!(get(&json!("text"), "0"), None);
        assert_eq!(get_with(&Value::Null, "a", &options), Some(&json!("fallback")));
    }

    #[test]
    fn test_get_literal_key_with_separator() {
        let target = json!({"a.b": 1, "a": {"b": 2}});
        assert_eq!(get(&target, "a.b"), Some(&json!(1)));
    }

    #[test]
    fn test_get_joins_segments_until_key_matches() {
        let target = json!({"a": {"b.c": {"d": 3}}});
        assert_eq!(get(&target, "a.b.c.d"), Some(&json!(3)));
    }

    #[test]
    fn test_get_escaped_separator() {
        let target = json!({"a.b": {"c": 7}});
        assert_eq!(get(&target, "a\\.b.c"), Some(&json!(7)));
    }

    #[test]
    fn test_get_numeric_path() {
        let target = json!({"1": "one"});
        assert_eq!(get(&target, 1_usize), Some(&json!("one")));

        let items = json!(["zero", "one"]);
        assert_eq!(get(&items, 1_u64), Some(&json!("one")));
    }

    #[test]
    fn test_get_array_indices() {
        let target = json!({"items": [{"id": 10}, {"id": 20}]});
        assert_eq!(get(&target, "items.1.id"), Some(&json!(20)));
        assert_eq!(get(&target, "items.2.id"), None);
        assert_eq!(get(&target, "items.01.id"), None);
    }

    #[test]
    fn test_get_segments() {
        let target = json!({"a.b": {"c": 9}});
        assert_eq!(get(&target, ["a.b", "c"]), Some(&json!(9)));
        assert_eq!(
            get(&target, vec!["a.b".to_string(), "c".to_string()]),
            Some(&json!(9))
        );
        let empty: &[&str] = &[];
        assert_eq!(get(&target, empty), None);
    }

    #[test]
    fn test_get_is_valid_rejects() {
        let target = json!({"public": {"secret": 1, "open": 2}});
        let options = GetOptions::default()
            .with_default(json!("denied"))
            .with_is_valid(|key, _| key != "secret");
        assert_eq!(get_with(&target, "public.open", &options), Some(&json!(2)));
        assert_eq!(
            get_with(&target, "public.secret", &options),
            Some(&json!("denied"))
        );
    }

    #[test]
    fn test_get_is_valid_rejects_literal_key() {
        let target = json!({"a.b": 1, "a": {"b": 2}});
        let options = GetOptions::default()
            .with_default(json!("denied"))
            .with_is_valid(|key, _| key != "a.b");
        assert_eq!(get_with(&target, "a.b", &options), Some(&json!("denied")));
    }

    #[test]
    fn test_get_is_valid_sees_container() {
        let target = json!({"a": {"b": 1}});
        let options = GetOptions::default().with_is_valid(|_, container| container.is_object());
        assert_eq!(get_with(&target, "a.b", &options), Some(&json!(1)));
    }

    #[test]
    fn test_get_custom_separator() {
        let target = json!({"a": {"b": 4}, "a.b": "literal-not-used"});
        let options = GetOptions::default().with_separator("/");
        assert_eq!(get_with(&target, "a/b", &options), Some(&json!(4)));
    }

    #[test]
    fn test_get_custom_join_char() {
        let target = json!({"a-b": {"c": 5}});
        let options = GetOptions::default().with_join_char("-");
        assert_eq!(get_with(&target, "a.b.c", &options), Some(&json!(5)));
    }

    #[test]
    fn test_get_custom_split_and_join() {
        let target = json!({"a": {"b|c": 6}});
        let options = GetOptions::default()
            .with_split(|path| path.split(':').map(String::from).collect())
            .with_join(|head, tail| format!("{head}|{tail}"));
        assert_eq!(get_with(&target, "a:b:c", &options), Some(&json!(6)));
    }

    #[test]
    fn test_set_creates_intermediates() {
        let mut target = json!({});
        set(&mut target, "a.b", json!(9));
        assert_eq!(get(&target, "a.b"), Some(&json!(9)));
        assert_eq!(target, json!({"a": {"b": 9}}));
    }

    #[test]
    fn test_set_replaces_scalar_intermediate() {
        let mut target = json!({"a": 1});
        set(&mut target, "a.b", json!(2));
        assert_eq!(target, json!({"a": {"b": 2}}));
    }

    #[test]
    fn test_set_keeps_siblings() {
        let mut target = json!({"properties": {"$os": "Linux"}, "type": "track"});
        set(&mut target, "properties.plan", json!("pro"));
        assert_eq!(
            target,
            json!({"properties": {"$os": "Linux", "plan": "pro"}, "type": "track"})
        );
    }

    #[test]
    fn test_set_overwrites_leaf() {
        let mut target = json!({"a": {"b": {"c": 1}}});
        set(&mut target, "a.b", json!("leaf"));
        assert_eq!(target, json!({"a": {"b": "leaf"}}));
    }

    #[test]
    fn test_set_into_array_index() {
        let mut target = json!({"items": [{"id": 1}, {"id": 2}]});
        set(&mut target, "items.1.id", json!(3));
        assert_eq!(target, json!({"items": [{"id": 1}, {"id": 3}]}));

        set(&mut target, "items.5", json!(true));
        assert_eq!(target, json!({"items": {"5": true}}));
    }

    #[test]
    fn test_set_segments_literal_keys() {
        let mut target = json!({});
        set_segments(&mut target, &["properties", "a.b"], json!(1));
        assert_eq!(target, json!({"properties": {"a.b": 1}}));
    }

    #[test]
    fn test_set_on_scalar_root() {
        let mut target = json!("scalar");
        set(&mut target, "a", json!(1));
        assert_eq!(target, json!({"a": 1}));
    }

    proptest! {
        #[test]
        fn prop_set_then_get(
            keys in proptest::collection::vec("[a-z$_][a-z0-9_]{0,8}", 1..5),
            value in any::<i64>(),
        ) {
            let path = keys.join(".");
            let mut target = json!({});
            set(&mut target, &path, json!(value));
            prop_assert_eq!(get(&target, path.as_str()), Some(&json!(value)));
        }

        #[test]
        fn prop_set_does_not_touch_sibling(
            keys in proptest::collection::vec("[a-z][a-z0-9]{0,6}", 1..4),
            value in any::<bool>(),
        ) {
            let mut target = json!({"sibling": {"kept": 1}});
            let path = format!("branch.{}", keys.join("."));
            set(&mut target, &path, json!(value));
            prop_assert_eq!(get(&target, "sibling.kept"), Some(&json!(1)));
        }
    }
}
