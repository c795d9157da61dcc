use crate::error::DashboardResult;
use crate::logging;
use std::path::Path;

/// True for file names whose lines are comma-delimited records
pub fn is_delimited(file_name: &str) -> bool {
    file_name.to_lowercase().ends_with(".csv")
}

/// Pull submittable lines out of an uploaded file's contents
pub fn extract_lines(file_name: &str, contents: &str, max_lines: usize, min_chars: usize) -> Vec<String> {
    let delimited = is_delimited(file_name);

    contents
        .lines()
        .map(|line| {
            if delimited {
                first_field(line)
            } else {
                line.trim().to_string()
            }
        })
        .filter(|line| line.chars().count() > min_chars)
        .take(max_lines)
        .collect()
}

fn first_field(line: &str) -> String {
    let field = line.split(',').next().unwrap_or("").trim();
    let field = match field.strip_prefix('"').and_then(|f| f.strip_suffix('"')) {
        Some(inner) => inner,
        None => field,
    };
    field.trim().to_string()
}

/// Read an upload from disk and extract its lines
pub async fn read_upload(path: &Path, max_lines: usize, min_chars: usize) -> DashboardResult<Vec<String>> {
    let contents = tokio::fs::read_to_string(path).await?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    let lines = extract_lines(&file_name, &contents, max_lines, min_chars);
    logging::log_analysis(None, &format!(
        "Extracted {} lines from upload {}", lines.len(), file_name
    ));
    Ok(lines)
}
