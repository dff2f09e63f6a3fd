use std::path::Path;

pub fn simplify_file_name(path: &str) -> String {
    Path::new(path)
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string())
}

/// Excel workbooks are recognized by their extension, anything else is read
/// as CSV.
pub fn input_type_from_path(path: &str) -> String {
    match Path::new(path)
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
    {
        Some(ext) if ext == "xlsx" => "xlsx".to_string(),
        _ => "csv".to_string(),
    }
}
