/// Turn a record title into a file name component.
///
/// Spaces and path separators become underscores, one for one; everything
/// else is kept, leading and trailing spaces included.
/// Example: `"Go / Rust Engineer"` → `"Go___Rust_Engineer"`
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect()
}

/// File name for a record: the sanitized title plus `.json`.
pub fn record_file_name(title: &str) -> String {
    let stem = sanitize_title(title);
    if stem.is_empty() {
        "untitled.json".to_string()
    } else {
        format!("{stem}.json")
    }
}
