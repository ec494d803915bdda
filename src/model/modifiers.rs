//! Item-spec modifiers: built-in metadata computed from an item's spec.
//!
//! `%(FullPath)`, `%(Filename)`, `%(ModifiedTime)` and friends. Names are
//! recognised case-insensitively. Results are escaped.

use std::path::Path;

use chrono::{NaiveDateTime, Timelike};

use crate::base::escaping::{escape, unescape};
use crate::base::{ExpandError, Result};

use super::fs::FileSystem;
use super::paths;

pub const FULL_PATH: &str = "FullPath";
pub const ROOT_DIR: &str = "RootDir";
pub const FILENAME: &str = "Filename";
pub const EXTENSION: &str = "Extension";
pub const RELATIVE_DIR: &str = "RelativeDir";
pub const DIRECTORY: &str = "Directory";
pub const RECURSIVE_DIR: &str = "RecursiveDir";
pub const IDENTITY: &str = "Identity";
pub const MODIFIED_TIME: &str = "ModifiedTime";
pub const CREATED_TIME: &str = "CreatedTime";
pub const ACCESSED_TIME: &str = "AccessedTime";
pub const DEFINING_PROJECT_FULL_PATH: &str = "DefiningProjectFullPath";
pub const DEFINING_PROJECT_DIRECTORY: &str = "DefiningProjectDirectory";
pub const DEFINING_PROJECT_NAME: &str = "DefiningProjectName";
pub const DEFINING_PROJECT_EXTENSION: &str = "DefiningProjectExtension";

/// Every item-spec modifier, in canonical spelling.
pub const ALL: &[&str] = &[
    FULL_PATH,
    ROOT_DIR,
    FILENAME,
    EXTENSION,
    RELATIVE_DIR,
    DIRECTORY,
    RECURSIVE_DIR,
    IDENTITY,
    MODIFIED_TIME,
    CREATED_TIME,
    ACCESSED_TIME,
    DEFINING_PROJECT_FULL_PATH,
    DEFINING_PROJECT_DIRECTORY,
    DEFINING_PROJECT_NAME,
    DEFINING_PROJECT_EXTENSION,
];

/// Canonical spelling of a modifier name, if it is one.
pub fn canonical(name: &str) -> Option<&'static str> {
    // Quick reject: every modifier is 7 to 24 characters long.
    if !(7..=24).contains(&name.len()) {
        return None;
    }
    ALL.iter().copied().find(|m| m.eq_ignore_ascii_case(name))
}

pub fn is_item_spec_modifier(name: &str) -> bool {
    canonical(name).is_some()
}

/// Modifiers that read timestamps from disk.
pub fn is_time_modifier(name: &str) -> bool {
    matches!(
        canonical(name),
        Some(MODIFIED_TIME | CREATED_TIME | ACCESSED_TIME)
    )
}

/// Format used for the time modifiers: `yyyy-MM-dd HH:mm:ss.fffffff`.
pub fn format_file_time(time: &NaiveDateTime) -> String {
    format!(
        "{}.{:07}",
        time.format("%Y-%m-%d %H:%M:%S"),
        time.nanosecond() % 1_000_000_000 / 100
    )
}

/// Inputs for evaluating a modifier on one item spec.
#[derive(Clone, Copy)]
pub struct ModifierInput<'a> {
    /// Directory relative specs are resolved against.
    pub current_directory: Option<&'a Path>,
    /// The escaped item spec.
    pub item_spec: &'a str,
    /// Full path of the project that defined the item, if known.
    pub defining_project: Option<&'a Path>,
}

/// Evaluate `modifier` for one item spec.
///
/// `RecursiveDir` needs the pre-wildcard include and is answered by the
/// item; here it is empty, as are unknown names.
pub fn evaluate(modifier: &str, input: ModifierInput<'_>, fs: &dyn FileSystem) -> Result<String> {
    let Some(modifier) = canonical(modifier) else {
        return Ok(String::new());
    };

    let spec = input.item_spec;
    let value = match modifier {
        IDENTITY => spec.to_string(),
        FILENAME => {
            // A spec ending in a separator names a directory, not a file.
            if paths::ends_with_separator(spec) {
                String::new()
            } else {
                paths::file_name_without_extension(spec).to_string()
            }
        }
        EXTENSION => {
            if paths::ends_with_separator(spec) {
                String::new()
            } else {
                paths::extension(spec).to_string()
            }
        }
        RELATIVE_DIR => paths::fix_separators(paths::directory_with_separator(spec)),
        RECURSIVE_DIR => String::new(),
        FULL_PATH => full_path_escaped(spec, input.current_directory, fs)?,
        ROOT_DIR => {
            let full = full_path_escaped(spec, input.current_directory, fs)?;
            paths::root(&full)
        }
        DIRECTORY => {
            let full = full_path_escaped(spec, input.current_directory, fs)?;
            directory_without_root(&full)
        }
        MODIFIED_TIME | CREATED_TIME | ACCESSED_TIME => {
            let full = unescape(&full_path_escaped(spec, input.current_directory, fs)?).into_owned();
            let times = fs
                .file_times(Path::new(&full))
                .map_err(|err| ExpandError::file_system(&full, &err))?;
            let time = times.and_then(|t| match modifier {
                MODIFIED_TIME => t.modified,
                CREATED_TIME => t.created,
                _ => t.accessed,
            });
            time.as_ref().map(format_file_time).unwrap_or_default()
        }
        DEFINING_PROJECT_FULL_PATH
        | DEFINING_PROJECT_DIRECTORY
        | DEFINING_PROJECT_NAME
        | DEFINING_PROJECT_EXTENSION => {
            let Some(project) = input.defining_project else {
                return Ok(String::new());
            };
            let project = escape(&project.to_string_lossy()).into_owned();
            match modifier {
                DEFINING_PROJECT_FULL_PATH => project,
                DEFINING_PROJECT_DIRECTORY => {
                    paths::fix_separators(paths::directory_with_separator(&project))
                }
                DEFINING_PROJECT_NAME => paths::file_name_without_extension(&project).to_string(),
                _ => paths::extension(&project).to_string(),
            }
        }
        _ => String::new(),
    };
    Ok(value)
}

fn full_path_escaped(
    spec: &str,
    current_directory: Option<&Path>,
    fs: &dyn FileSystem,
) -> Result<String> {
    let unescaped = unescape(spec);
    let base = match current_directory {
        Some(dir) => dir.to_path_buf(),
        None if paths::is_rooted(&unescaped) => Default::default(),
        None => fs
            .current_directory()
            .map_err(|err| ExpandError::file_system(".", &err))?,
    };
    let full = paths::full_path(&unescaped, &base.to_string_lossy());
    Ok(escape(&full).into_owned())
}

/// Directory of a full path with the root removed, with a trailing
/// separator.
fn directory_without_root(full: &str) -> String {
    let dir = paths::directory_with_separator(full);
    let root_len = paths::root_len(dir);
    paths::fix_separators(&dir[root_len..])
}
