//! Metadata extraction and sanitization
//!
//! Pulls the required fields out of a candidate, filters its tags against
//! the dictionary, and escapes quotes in text headed for storage.
//!
//! Attribute lookup order for every required field:
//! 1. the search descriptor's own attributes
//! 2. the detail payload's top-level attributes
//! 3. each immediate child of the detail payload, in order
//!
//! First match wins. One missing or unstorable field rejects the whole
//! extraction.

use crate::types::{PhotoDescriptor, PhotoDetail, PhotoFields, WordList};
use palette_common::time::unix_to_sql_date;
use std::collections::BTreeSet;
use thiserror::Error;

/// Default maximum length of the joined tag string
pub const DEFAULT_MAX_TAG_LEN: usize = 300;

/// Characters stripped from tag text before dictionary lookup
const TAG_PUNCTUATION: &[char] = &[
    '"', '\'', '!', '@', '#', '$', '%', '^', '&', '*', '(', ')', '-', '_', '+', '=', '[', '{',
    ']', '}', '|', '\\', '/', '?', ',', '<', '.', '>', ';', ':', '~', '`',
];

const LICENSE: &str = "license";
const USERNAME: &str = "username";
const REALNAME: &str = "realname";
const TAKEN: &str = "taken";
const POSTED: &str = "posted";

/// Why metadata extraction rejected a candidate
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MetadataError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Field {0} is not storable text")]
    InvalidEncoding(&'static str),

    #[error("Field {field} has invalid value: {value}")]
    InvalidField { field: &'static str, value: String },
}

/// Find an attribute by key using descriptor → detail → children priority
pub fn find_attribute<'a>(
    descriptor: &'a PhotoDescriptor,
    detail: &'a PhotoDetail,
    key: &str,
) -> Option<&'a str> {
    if key.is_empty() {
        return None;
    }

    descriptor
        .attributes
        .get(key)
        .or_else(|| detail.attributes.get(key))
        .or_else(|| {
            detail
                .children
                .iter()
                .find_map(|child| child.attributes.get(key))
        })
        .map(String::as_str)
}

/// Text is storable unless it carries decoding damage or NUL bytes
fn is_storable_text(text: &str) -> bool {
    !text.contains(char::REPLACEMENT_CHARACTER) && !text.contains('\0')
}

fn required_field<'d>(
    descriptor: &'d PhotoDescriptor,
    detail: &'d PhotoDetail,
    key: &'static str,
) -> Result<&'d str, MetadataError> {
    let value = find_attribute(descriptor, detail, key).ok_or(MetadataError::MissingField(key))?;
    if is_storable_text(value) {
        Ok(value)
    } else {
        Err(MetadataError::InvalidEncoding(key))
    }
}

/// Escape single and double quotes with a leading backslash
pub fn escape_quotes(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '"' || c == '\'' {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Lowercase and strip punctuation from one tag
fn normalize_tag(tag: &str) -> String {
    tag.to_lowercase()
        .chars()
        .filter(|c| !TAG_PUNCTUATION.contains(c))
        .collect()
}

pub struct MetadataExtractor<'a> {
    word_list: &'a dyn WordList,
    max_tag_len: usize,
}

impl<'a> MetadataExtractor<'a> {
    pub fn new(word_list: &'a dyn WordList, max_tag_len: usize) -> Self {
        Self {
            word_list,
            max_tag_len,
        }
    }

    /// Extract the required fields; all-or-nothing
    pub fn extract(
        &self,
        descriptor: &PhotoDescriptor,
        detail: &PhotoDetail,
    ) -> Result<PhotoFields, MetadataError> {
        let license_text = required_field(descriptor, detail, LICENSE)?;
        let username = required_field(descriptor, detail, USERNAME)?;
        let realname = required_field(descriptor, detail, REALNAME)?;
        let taken = required_field(descriptor, detail, TAKEN)?;
        let posted = required_field(descriptor, detail, POSTED)?;

        let license = license_text
            .trim()
            .parse::<i64>()
            .map_err(|_| MetadataError::InvalidField {
                field: LICENSE,
                value: license_text.to_string(),
            })?;

        let date_uploaded = unix_to_sql_date(posted).ok_or_else(|| MetadataError::InvalidField {
            field: POSTED,
            value: posted.to_string(),
        })?;

        Ok(PhotoFields {
            license,
            username: username.to_string(),
            realname: realname.to_string(),
            date_taken: taken.to_string(),
            date_uploaded,
        })
    }

    /// Comma-joined dictionary words found in the tags
    ///
    /// Tokens are collected from every tag (lowercased, punctuation
    /// stripped, split on whitespace), kept only if they are dictionary
    /// words, then joined in lexicographic order. Joining stops before
    /// the string would exceed the configured maximum length.
    pub fn extract_tags(&self, detail: &PhotoDetail) -> String {
        let tokens: BTreeSet<String> = detail
            .tags
            .iter()
            .filter(|tag| is_storable_text(tag))
            .map(|tag| normalize_tag(tag))
            .flat_map(|tag| {
                tag.split_whitespace()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .filter(|token| self.word_list.is_word(token))
            .collect();

        // Length is measured in characters, not bytes
        let mut joined = String::new();
        let mut joined_chars = 0usize;
        for token in tokens {
            let separator = usize::from(!joined.is_empty());
            let token_chars = token.chars().count();
            if joined_chars + separator + token_chars > self.max_tag_len {
                break;
            }
            if separator == 1 {
                joined.push(',');
            }
            joined.push_str(&token);
            joined_chars += separator + token_chars;
        }

        joined.trim_matches(',').to_string()
    }
}

/// Escape every text field of extracted metadata for storage
pub fn sanitize_fields(fields: &PhotoFields) -> PhotoFields {
    PhotoFields {
        license: fields.license,
        username: escape_quotes(&fields.username),
        realname: escape_quotes(&fields.realname),
        date_taken: escape_quotes(&fields.date_taken),
        date_uploaded: escape_quotes(&fields.date_uploaded),
    }
}
