use std::collections::BTreeMap;

use crate::error::{Error, Result};

/// One row of a query result: attribute name to string value, as sent by
/// the device in `=key=value` words.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// The value for `key`, or the empty string when absent.
    pub fn text(&self, key: &str) -> String {
        self.get(key).unwrap_or("").to_string()
    }

    /// The value for `key` parsed as an integer, or 0 when absent or not
    /// a number.
    pub fn number(&self, key: &str) -> u64 {
        self.get(key).and_then(|v| v.parse().ok()).unwrap_or(0)
    }

    /// True iff the value for `key` is the literal string `"true"`.
    pub fn flag(&self, key: &str) -> bool {
        self.get(key) == Some("true")
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }
}

pub(crate) enum Progress {
    Continue,
    Done,
}

/// Folds the words of a reply into records.
///
/// `=key=value` words accumulate into the current record; `!re` commits it
/// and starts the next; `!done` commits whatever is pending and finishes
/// the reply. A `!trap` switches accumulation to the trap's own attributes,
/// which surface as [`Error::Device`] once the reply completes. Words in
/// none of these shapes are ignored, as the device may add markers this
/// client has no use for.
#[derive(Default)]
pub(crate) struct ReplyParser {
    records: Vec<Record>,
    current: Record,
    trap: Option<Record>,
}

impl ReplyParser {
    pub fn feed(&mut self, word: &str) -> Result<Progress> {
        match word {
            "!re" => self.commit(),
            "!done" => {
                self.commit();
                if let Some(trap) = &self.trap {
                    let message = trap
                        .get("message")
                        .unwrap_or("device returned a trap")
                        .to_string();
                    return Err(Error::Device(message));
                }
                return Ok(Progress::Done);
            }
            "!trap" => self.trap = Some(Record::default()),
            _ => {
                if let Some((key, value)) = split_attribute(word) {
                    match &mut self.trap {
                        Some(trap) => trap.insert(key, value),
                        None => self.current.insert(key, value),
                    }
                }
            }
        }
        Ok(Progress::Continue)
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }

    fn commit(&mut self) {
        if !self.current.is_empty() {
            self.records.push(std::mem::take(&mut self.current));
        }
    }
}

fn split_attribute(word: &str) -> Option<(&str, &str)> {
    let rest = word.strip_prefix('=')?;
    let eq = rest.find('=')?;
    Some((&rest[..eq], &rest[eq + 1..]))
}
