use crate::{Error, Result};

use indexmap::{IndexMap, IndexSet};

/// Attributes that take no value.
const FLAGS: &[&str] = &[
    "-",
    "null",
    "index",
    "unique",
    "pk",
    "auto",
    "auto_now",
    "auto_now_add",
];

/// Attributes that take a value.
const KEYS: &[&str] = &[
    "size",
    "column",
    "default",
    "rel",
    "reverse",
    "rel_table",
    "rel_through",
    "digits",
    "decimals",
    "on_delete",
    "type",
];

/// A parsed field tag.
///
/// Attributes are separated by `;`. Valued attributes are written either as
/// `key=value` or `key(value)`:
///
/// ```
/// # use rivet_core::schema::Tag;
/// let tag = Tag::parse("pk;auto;column(user_id)").unwrap();
/// assert!(tag.has("pk"));
/// assert_eq!(tag.get("column"), Some("user_id"));
/// ```
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Tag {
    flags: IndexSet<String>,
    values: IndexMap<String, String>,
}

impl Tag {
    pub fn parse(src: &str) -> Result<Tag> {
        let mut tag = Tag::default();

        for attr in src.split(';').map(str::trim).filter(|attr| !attr.is_empty()) {
            let (key, value) = split_attr(attr);

            match value {
                Some(value) => {
                    if !KEYS.contains(&key) {
                        return Err(unsupported(key, FLAGS.contains(&key)));
                    }
                    tag.values.insert(key.to_string(), value.to_string());
                }
                None => {
                    if !FLAGS.contains(&key) {
                        return Err(unsupported(key, KEYS.contains(&key)));
                    }
                    tag.flags.insert(key.to_string());
                }
            }
        }

        Ok(tag)
    }

    pub fn has(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    /// Returns the value of `key`. An empty value reads as absent.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

fn split_attr(attr: &str) -> (&str, Option<&str>) {
    let paren = |open: usize| (attr[..open].trim(), Some(&attr[open + 1..attr.len() - 1]));

    match (attr.find('='), attr.find('(')) {
        (Some(eq), Some(open)) if open < eq && attr.ends_with(')') => paren(open),
        (Some(eq), _) => (attr[..eq].trim(), Some(attr[eq + 1..].trim())),
        (None, Some(open)) if attr.ends_with(')') => paren(open),
        _ => (attr, None),
    }
}

fn unsupported(key: &str, wrong_form: bool) -> Error {
    if wrong_form {
        Error::invalid_schema(format!("wrong tag format for `{key}`"))
    } else {
        Error::invalid_schema(format!("unsupported tag `{key}`"))
    }
}
