use std::collections::HashSet;

use super::{segments_from_names, PathSegment, PathStrategy};
use crate::error::{Error, Result};

const SEPARATOR: char = '\\';
const ALT_SEPARATOR: char = '/';

const RESERVED_CHARS: [char; 7] = ['<', '>', ':', '"', '|', '?', '*'];

const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Path rules for Windows: drive-rooted, `\`-separated paths.
///
/// `/` is accepted as an alternate separator. UNC and device paths are not
/// supported.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsPathStrategy;

impl WindowsPathStrategy {
    fn is_separator(c: char) -> bool {
        c == SEPARATOR || c == ALT_SEPARATOR
    }

    fn check_segment(path: &str, name: &str) -> Result<()> {
        if name.is_empty() {
            return Err(Error::invalid_path(path, "path contains a duplicate separator"));
        }
        if name == "." || name == ".." {
            return Err(Error::invalid_path(path, "path contains a relative segment"));
        }
        if name
            .chars()
            .any(|c| c.is_ascii_control() || RESERVED_CHARS.contains(&c))
        {
            return Err(Error::invalid_path(path, "path contains an invalid character"));
        }
        if name.ends_with('.') || name.ends_with(' ') {
            return Err(Error::invalid_path(path, "segment ends with a dot or a space"));
        }

        // `NUL.txt` is as reserved as `NUL`
        let stem = name.split('.').next().unwrap_or(name);
        if RESERVED_NAMES
            .iter()
            .any(|reserved| reserved.eq_ignore_ascii_case(stem))
        {
            return Err(Error::invalid_path(path, "segment is a reserved device name"));
        }

        Ok(())
    }
}

impl PathStrategy for WindowsPathStrategy {
    fn parse_path(&self, path: &str) -> Result<Vec<PathSegment>> {
        if path.is_empty() {
            return Err(Error::invalid_path(path, "path is empty"));
        }

        let mut chars = path.chars();
        let (Some(letter), Some(':')) = (chars.next(), chars.next()) else {
            return Err(Error::invalid_path(path, "path must start with a drive letter"));
        };
        if !letter.is_ascii_alphabetic() {
            return Err(Error::invalid_path(path, "path must start with a drive letter"));
        }

        let drive = PathSegment::drive(&path[..2]);
        let rest = &path[2..];
        if rest.is_empty() {
            return Ok(vec![drive]);
        }

        let Some(rest) = rest.strip_prefix(Self::is_separator) else {
            return Err(Error::invalid_path(
                path,
                "drive letter must be followed by a separator",
            ));
        };
        if rest.is_empty() {
            return Ok(vec![drive]);
        }

        let trailing_separator = rest.ends_with(Self::is_separator);
        let body = rest.strip_suffix(Self::is_separator).unwrap_or(rest);

        let names: Vec<&str> = body.split(Self::is_separator).collect();
        for name in &names {
            Self::check_segment(path, name)?;
        }

        let mut segments = Vec::with_capacity(names.len() + 1);
        segments.push(drive);
        segments.extend(segments_from_names(&names, trailing_separator));
        Ok(segments)
    }

    fn invalid_path_chars(&self) -> HashSet<char> {
        RESERVED_CHARS
            .into_iter()
            .chain((0u8..0x20).map(char::from))
            .collect()
    }

    fn join_segments(&self, segments: &[PathSegment]) -> String {
        let mut path = String::new();
        for (idx, segment) in segments.iter().enumerate() {
            if idx > 0 && !path.ends_with(SEPARATOR) {
                path.push(SEPARATOR);
            }
            path.push_str(segment.name());
            if segment.is_drive() {
                path.push(SEPARATOR);
            }
        }
        path
    }
}
