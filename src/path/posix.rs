use std::collections::HashSet;

use super::{segments_from_names, PathSegment, PathStrategy};
use crate::error::{Error, Result};

const SEPARATOR: char = '/';
const ROOT: &str = "/";

/// Path rules for POSIX systems: absolute `/`-separated paths.
///
/// The root itself parses to a single drive segment `/`; any deeper path
/// leaves the root implicit, so `/home/user` parses to `home`, `user`.
#[derive(Debug, Clone, Copy, Default)]
pub struct PosixPathStrategy;

impl PathStrategy for PosixPathStrategy {
    fn parse_path(&self, path: &str) -> Result<Vec<PathSegment>> {
        if path.is_empty() {
            return Err(Error::invalid_path(path, "path is empty"));
        }
        if path.contains('\0') {
            return Err(Error::invalid_path(path, "path contains a NUL character"));
        }

        let Some(rest) = path.strip_prefix(SEPARATOR) else {
            return Err(Error::invalid_path(path, "path must be absolute"));
        };
        if rest.is_empty() {
            return Ok(vec![PathSegment::drive(ROOT)]);
        }

        let trailing_separator = rest.ends_with(SEPARATOR);
        let body = rest.strip_suffix(SEPARATOR).unwrap_or(rest);

        let names: Vec<&str> = body.split(SEPARATOR).collect();
        for name in &names {
            match *name {
                "" => return Err(Error::invalid_path(path, "path contains a duplicate separator")),
                "." | ".." => {
                    return Err(Error::invalid_path(path, "path contains a relative segment"))
                }
                _ => {}
            }
        }

        Ok(segments_from_names(&names, trailing_separator))
    }

    fn invalid_path_chars(&self) -> HashSet<char> {
        HashSet::from(['\0'])
    }

    fn join_segments(&self, segments: &[PathSegment]) -> String {
        let names: Vec<&str> = segments
            .iter()
            .filter(|segment| !segment.is_drive())
            .map(PathSegment::name)
            .collect();

        format!("{ROOT}{}", names.join(ROOT))
    }
}
