//! Object paths: `/`, `/'group'` and `/'group'/'channel'`.
//!
//! Names are single-quoted; a quote inside a name is written as `''`.

use std::fmt;

use crate::error::{Result, TdmsError};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ObjectPath {
    Root,
    Group(String),
    Channel { group: String, channel: String },
}

impl ObjectPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let Some(mut rest) = raw.strip_prefix('/') else {
            return Err(TdmsError::invalid_path(raw));
        };
        if rest.is_empty() {
            return Ok(Self::Root);
        }
        let mut names = Vec::with_capacity(2);
        loop {
            let (name, tail) = parse_quoted(rest).ok_or_else(|| TdmsError::invalid_path(raw))?;
            names.push(name);
            if tail.is_empty() {
                break;
            }
            rest = tail
                .strip_prefix('/')
                .ok_or_else(|| TdmsError::invalid_path(raw))?;
        }
        let mut names = names.into_iter();
        match (names.next(), names.next(), names.next()) {
            (Some(group), None, None) => Ok(Self::Group(group)),
            (Some(group), Some(channel), None) => Ok(Self::Channel { group, channel }),
            _ => Err(TdmsError::invalid_path(raw)),
        }
    }

    pub fn group(group: impl Into<String>) -> Self {
        Self::Group(group.into())
    }

    pub fn channel(group: impl Into<String>, channel: impl Into<String>) -> Self {
        Self::Channel {
            group: group.into(),
            channel: channel.into(),
        }
    }

    /// Name of the group this path belongs to, if any.
    pub fn group_name(&self) -> Option<&str> {
        match self {
            Self::Root => None,
            Self::Group(group) | Self::Channel { group, .. } => Some(group),
        }
    }
}

/// Split `'name'rest` into the unescaped name and `rest`.
fn parse_quoted(input: &str) -> Option<(String, &str)> {
    let body = input.strip_prefix('\'')?;
    let mut name = String::new();
    let mut chars = body.char_indices().peekable();
    while let Some((idx, ch)) = chars.next() {
        if ch != '\'' {
            name.push(ch);
            continue;
        }
        if let Some((_, '\'')) = chars.peek() {
            name.push('\'');
            chars.next();
            continue;
        }
        return Some((name, &body[idx + 1..]));
    }
    None
}

fn write_quoted(f: &mut fmt::Formatter<'_>, name: &str) -> fmt::Result {
    write!(f, "/'{}'", name.replace('\'', "''"))
}

impl fmt::Display for ObjectPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Root => f.write_str("/"),
            Self::Group(group) => write_quoted(f, group),
            Self::Channel { group, channel } => {
                write_quoted(f, group)?;
                write_quoted(f, channel)
            }
        }
    }
}
