use std::path::Path;

use tracing::{debug, warn};

/// Best-effort dump of a fetched page for post-run inspection. A failed write
/// is logged and swallowed; diagnostics must never sink a run.
pub fn dump_page(dir: &Path, tag: &str, html: &str) {
    write_file(dir, &format!("{}.html", file_stem(tag)), html);
}

/// Dump the field names the mapper derived. Names only; values can carry
/// credentials and are never written out.
pub fn dump_login_fields(dir: &Path, tag: &str, data: &[(String, String)]) {
    let names: Vec<&str> = data.iter().map(|(n, _)| n.as_str()).collect();
    write_file(dir, &format!("{}.fields.txt", file_stem(tag)), &names.join("\n"));
}

fn file_stem(tag: &str) -> String {
    let ts = chrono::Utc::now().format("%Y%m%dT%H%M%S");
    let safe: String = tag
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect();
    format!("{}-{}", ts, safe)
}

fn write_file(dir: &Path, name: &str, contents: &str) {
    if let Err(e) = std::fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), error = %e, "cannot create dump directory");
        return;
    }
    let path = dir.join(name);
    match std::fs::write(&path, contents) {
        Ok(()) => debug!(path = %path.display(), "dumped"),
        Err(e) => warn!(path = %path.display(), error = %e, "dump write failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dump_writes_page_and_field_names() {
        let dir = tempfile::tempdir().unwrap();
        dump_page(dir.path(), "https://host/vendor/", "<html></html>");
        dump_login_fields(
            dir.path(),
            "https://host/vendor/",
            &[
                ("mno".to_string(), "vendor42".to_string()),
                ("mpasswd".to_string(), "s3cret".to_string()),
            ],
        );

        let mut wrote_fields = false;
        for entry in std::fs::read_dir(dir.path()).unwrap() {
            let path = entry.unwrap().path();
            let contents = std::fs::read_to_string(&path).unwrap();
            if path.to_string_lossy().ends_with(".fields.txt") {
                wrote_fields = true;
                assert!(contents.contains("mpasswd"));
                // Never the values
                assert!(!contents.contains("s3cret"));
                assert!(!contents.contains("vendor42"));
            }
        }
        assert!(wrote_fields);
    }

    #[test]
    fn test_unwritable_dir_does_not_panic() {
        dump_page(Path::new("/proc/no-such-dir/x"), "tag", "<html></html>");
    }
}
