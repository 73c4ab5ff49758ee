use std::path::{Component, Path};

/// A single normal path component: no separators, not `.` or `..`.
pub(crate) fn is_plain_file_name(name: &str) -> bool {
    if name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(c)), None) if c == name
    )
}

/// Relative, and never escaping the output root.
pub(crate) fn is_safe_subfolder(subfolder: &str) -> bool {
    let path = Path::new(subfolder);
    path.components().next().is_some()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}
