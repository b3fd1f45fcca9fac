//! JSON document output

use crate::output::types::{OutputResult, SiteResult};
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Pretty-printed JSON document for a site result
pub fn to_json_string(result: &SiteResult) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Timestamped file name derived from the seed host
///
/// Characters outside `[A-Za-z0-9.-]` in the host are replaced with `_`.
///
/// # Example
///
/// `sift_results_example.com_20240115_093000.json`
pub fn default_output_filename(host: &str, timestamp: DateTime<Utc>) -> String {
    let host: String = host
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();
    let host = if host.is_empty() { "site".to_string() } else { host };

    format!(
        "sift_results_{}_{}.json",
        host,
        timestamp.format("%Y%m%d_%H%M%S")
    )
}

/// Writes the JSON document for `result` into `directory`
///
/// # Arguments
///
/// * `result` - The site result to persist
/// * `directory` - Target directory (created if missing)
/// * `host` - Seed host used in the file name
/// * `timestamp` - Run timestamp used in the file name
///
/// # Returns
///
/// * `Ok(PathBuf)` - Path of the written file
/// * `Err(OutputError)` - Failed to serialize or write
pub fn write_json(
    result: &SiteResult,
    directory: &Path,
    host: &str,
    timestamp: DateTime<Utc>,
) -> OutputResult<PathBuf> {
    std::fs::create_dir_all(directory)?;
    let path = directory.join(default_output_filename(host, timestamp));

    let json = to_json_string(result)?;
    let mut file = File::create(&path)?;
    file.write_all(json.as_bytes())?;
    file.write_all(b"\n")?;

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn timestamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_default_output_filename() {
        assert_eq!(
            default_output_filename("example.com", timestamp()),
            "sift_results_example.com_20240115_093000.json"
        );
        assert_eq!(
            default_output_filename("127.0.0.1:8080", timestamp()),
            "sift_results_127.0.0.1_8080_20240115_093000.json"
        );
    }

    #[test]
    fn test_write_json_round_trips() {
        let dir = TempDir::new().unwrap();
        let result = SiteResult::empty("https://example.com/");

        let path = write_json(&result, &dir.path().join("out"), "example.com", timestamp()).unwrap();
        assert!(path.exists());

        let contents = std::fs::read_to_string(&path).unwrap();
        let parsed: SiteResult = serde_json::from_str(&contents).unwrap();
        assert_eq!(parsed, result);
    }
}
