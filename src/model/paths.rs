//! Lexical path helpers.
//!
//! Build files mix `/` and `\` freely, so both are treated as separators on
//! input. Output uses the platform separator. Nothing here touches the disk.

use std::path::MAIN_SEPARATOR;

#[inline]
pub fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

#[inline]
fn is_separator_byte(b: u8) -> bool {
    b == b'/' || b == b'\\'
}

/// Convert every separator to the platform separator.
pub fn fix_separators(path: &str) -> String {
    path.chars()
        .map(|c| if is_separator(c) { MAIN_SEPARATOR } else { c })
        .collect()
}

/// Off Windows, rewrite `\` as `/` so text joined from pieces, such as
/// `$(Dir)\file.txt`, names a path on this platform.
pub fn adjust_separators(value: String) -> String {
    if cfg!(windows) || !value.contains('\\') {
        return value;
    }
    value.replace('\\', "/")
}

/// Length of the root prefix: `/`, `\\`, `C:\`, or `C:`.
pub fn root_len(path: &str) -> usize {
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        if bytes.get(2).is_some_and(|&b| is_separator_byte(b)) {
            return 3;
        }
        return 2;
    }
    let mut n = 0;
    while n < bytes.len() && is_separator_byte(bytes[n]) {
        n += 1;
    }
    n
}

pub fn is_rooted(path: &str) -> bool {
    root_len(path) > 0
}

/// The root of `path` with platform separators, or `""` when relative.
pub fn root(path: &str) -> String {
    let len = root_len(path);
    if len == 0 {
        return String::new();
    }
    let bytes = path.as_bytes();
    if bytes.len() >= 2 && bytes[1] == b':' {
        let mut root = path[..2].to_string();
        if len == 3 {
            root.push(MAIN_SEPARATOR);
        }
        root
    } else {
        MAIN_SEPARATOR.to_string()
    }
}

/// Whether the path ends with a separator.
pub fn ends_with_separator(path: &str) -> bool {
    path.ends_with(is_separator)
}

/// Join two paths; a rooted `relative` replaces `base`.
pub fn combine(base: &str, relative: &str) -> String {
    if base.is_empty() || is_rooted(relative) {
        return relative.to_string();
    }
    if relative.is_empty() {
        return base.to_string();
    }
    let mut out = String::with_capacity(base.len() + relative.len() + 1);
    out.push_str(base);
    if !ends_with_separator(base) {
        out.push(MAIN_SEPARATOR);
    }
    out.push_str(relative);
    out
}

/// Collapse `.`, `..` and repeated separators. A trailing separator is kept.
pub fn normalize(path: &str) -> String {
    let root_len = root_len(path);
    let root = root(path);
    let mut segments: Vec<&str> = Vec::new();
    for segment in path[root_len..].split(is_separator) {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if root.is_empty() {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    let mut out = root;
    out.push_str(&segments.join(&MAIN_SEPARATOR.to_string()));
    if !segments.is_empty() && ends_with_separator(path) {
        out.push(MAIN_SEPARATOR);
    }
    out
}

/// Resolve `path` against `current_directory` and normalize.
pub fn full_path(path: &str, current_directory: &str) -> String {
    normalize(&combine(current_directory, path))
}

/// Everything before the last separator, like `Path.GetDirectoryName`.
///
/// `None` for a bare root; `Some("")` when there is no separator.
pub fn directory_name(path: &str) -> Option<String> {
    let root_len = root_len(path);
    if path.len() <= root_len {
        return if root_len > 0 { None } else { Some(String::new()) };
    }
    match path[root_len..].rfind(is_separator) {
        Some(pos) => {
            let mut dir = path[..root_len + pos].to_string();
            while dir.len() > root_len && dir.ends_with(is_separator) {
                dir.pop();
            }
            Some(fix_separators(&dir))
        }
        None => Some(fix_separators(&path[..root_len])),
    }
}

/// The directory part including its trailing separator, or `""`.
pub fn directory_with_separator(path: &str) -> &str {
    match path.rfind(is_separator) {
        Some(pos) => &path[..=pos],
        None => {
            let root_len = root_len(path);
            &path[..root_len]
        }
    }
}

/// The final path component.
pub fn file_name(path: &str) -> &str {
    let root_len = root_len(path);
    match path[root_len..].rfind(is_separator) {
        Some(pos) => &path[root_len + pos + 1..],
        None => &path[root_len..],
    }
}

/// The extension including its dot, or `""`.
pub fn extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(pos) if pos + 1 < name.len() => &name[pos..],
        _ => "",
    }
}

pub fn file_name_without_extension(path: &str) -> &str {
    let name = file_name(path);
    match name.rfind('.') {
        Some(pos) => &name[..pos],
        None => name,
    }
}

/// Replace the extension; `None` removes it.
pub fn change_extension(path: &str, new_extension: Option<&str>) -> String {
    let name = file_name(path);
    let stem_len = match name.rfind('.') {
        Some(pos) => path.len() - name.len() + pos,
        None => path.len(),
    };
    let mut out = path[..stem_len].to_string();
    if let Some(ext) = new_extension.filter(|e| !e.is_empty()) {
        if !ext.starts_with('.') {
            out.push('.');
        }
        out.push_str(ext);
    }
    out
}

/// Append the platform separator unless the path is empty or has one.
pub fn ensure_trailing_slash(path: &str) -> String {
    let mut out = path.to_string();
    if !out.is_empty() && !ends_with_separator(&out) {
        out.push(MAIN_SEPARATOR);
    }
    out
}

/// Express `path` relative to `base`.
///
/// A relative `path` is returned as is. Paths with nothing in common come
/// back as the full path; identical paths give `"."`.
pub fn make_relative(base: &str, path: &str, current_directory: &str) -> String {
    if base.is_empty() || !is_rooted(path) {
        return path.to_string();
    }

    let full_base = full_path(base, current_directory);
    let full = full_path(path, current_directory);
    if root(&full_base).to_ascii_lowercase() != root(&full).to_ascii_lowercase() {
        return full;
    }

    let base_segments: Vec<&str> = full_base.split(is_separator).filter(|s| !s.is_empty()).collect();
    let path_segments: Vec<&str> = full.split(is_separator).filter(|s| !s.is_empty()).collect();

    let common = base_segments
        .iter()
        .zip(&path_segments)
        .take_while(|(a, b)| segments_equal(a, b))
        .count();

    if common == base_segments.len() && common == path_segments.len() {
        return ".".to_string();
    }
    if common == 0 {
        return full;
    }

    let mut parts: Vec<&str> = Vec::new();
    parts.extend(std::iter::repeat_n("..", base_segments.len() - common));
    parts.extend(&path_segments[common..]);
    let mut out = parts.join(&MAIN_SEPARATOR.to_string());
    if ends_with_separator(path) && !out.is_empty() {
        out.push(MAIN_SEPARATOR);
    }
    out
}

#[inline]
fn segments_equal(a: &str, b: &str) -> bool {
    if cfg!(windows) {
        a.eq_ignore_ascii_case(b)
    } else {
        a == b
    }
}

/// Every ancestor directory of `path` (nearest first), excluding the path.
pub fn ancestors(path: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut current = directory_name(path);
    while let Some(dir) = current {
        if dir.is_empty() {
            break;
        }
        let next = directory_name(&dir);
        out.push(dir);
        current = next;
    }
    out
}
