//! Input-file discovery.
//!
//! Walks a sample directory tree, filters candidate files by extension and
//! path markers, and pairs each file with its event count. Files whose
//! count cannot be determined are skipped with a warning; they never abort
//! the run.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::{IngestError, Result};
use crate::source::EventSource;

/// Which side of the train/test split to enumerate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SampleSet {
    /// Training/validation files; paths under a `test_sample` segment are
    /// excluded.
    TrainVal,
    /// Held-out test files; only paths under a `test_sample` segment are
    /// included.
    Test,
}

/// An ordered file list with parallel event counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileSet {
    pub files: Vec<PathBuf>,
    pub event_counts: Vec<u64>,
    pub total_events: u64,
}

const TEST_SAMPLE_MARKER: &str = "test_sample";
const SKIP_MARKERS: [&str; 2] = ["failed", "ignore"];

/// Recursively discovers data files under `root` and queries each one's
/// event count.
///
/// Directories whose path contains a `failed` or `ignore` marker are
/// pruned. File order follows directory traversal order; callers needing a
/// platform-stable order must sort.
pub fn discover_files(
    root: &Path,
    extension: &str,
    sample_set: SampleSet,
    tree: &str,
    source: &dyn EventSource,
) -> Result<FileSet> {
    if !root.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut set = FileSet::default();
    walk(root, extension, sample_set, tree, source, &mut set)?;
    set.total_events = set.event_counts.iter().sum();

    info!(
        root = %root.display(),
        files = set.files.len(),
        events = set.total_events,
        "created file list"
    );
    Ok(set)
}

fn walk(
    dir: &Path,
    extension: &str,
    sample_set: SampleSet,
    tree: &str,
    source: &dyn EventSource,
    set: &mut FileSet,
) -> Result<()> {
    let dir_text = dir.to_string_lossy();
    if SKIP_MARKERS.iter().any(|marker| dir_text.contains(marker)) {
        return Ok(());
    }

    let entries = std::fs::read_dir(dir).map_err(|source| IngestError::DirectoryRead {
        path: dir.to_path_buf(),
        source,
    })?;

    for entry_result in entries {
        let entry = entry_result.map_err(|source| IngestError::DirectoryRead {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();

        if path.is_dir() {
            walk(&path, extension, sample_set, tree, source, set)?;
            continue;
        }

        let matches_extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case(extension))
            .unwrap_or(false);
        if !matches_extension {
            continue;
        }

        let in_test_sample = path
            .components()
            .any(|component| component.as_os_str() == TEST_SAMPLE_MARKER);
        let wanted = match sample_set {
            SampleSet::TrainVal => !in_test_sample,
            SampleSet::Test => in_test_sample,
        };
        if !wanted {
            continue;
        }

        match source.count_events(&path, tree) {
            Some(count) if count > 0 => {
                set.files.push(path);
                set.event_counts.push(count);
            }
            _ => {
                warn!(path = %path.display(), "ignoring file with no readable events");
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use std::fs;
    use tempfile::TempDir;

    /// Counts one event per line after the header; no file I/O beyond that.
    struct LineCounter;

    impl EventSource for LineCounter {
        fn count_events(&self, path: &Path, _tree: &str) -> Option<u64> {
            let text = fs::read_to_string(path).ok()?;
            Some(text.lines().count().saturating_sub(1) as u64)
        }

        fn read_schema(&self, _path: &Path, _tree: &str) -> Result<Vec<jetmeta_model::FieldSchema>> {
            unimplemented!("discovery only needs counts")
        }

        fn read_events(
            &self,
            _path: &Path,
            _request: &crate::source::ReadRequest<'_>,
        ) -> Result<crate::columnar::RecordBatch> {
            unimplemented!("discovery only needs counts")
        }
    }

    fn write(dir: &Path, rel: &str, lines: usize) {
        let path = dir.join(rel);
        fs::create_dir_all(path.parent().unwrap()).expect("mkdir");
        let mut text = String::from("fj_pt\n");
        for i in 0..lines {
            text.push_str(&format!("{i}\n"));
        }
        fs::write(path, text).expect("write file");
    }

    #[test]
    fn discovers_train_files_and_skips_markers() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "qcd/part0.csv", 3);
        write(dir.path(), "qcd/part1.csv", 2);
        write(dir.path(), "qcd_failed/part2.csv", 5);
        write(dir.path(), "ignore_me/part3.csv", 5);
        write(dir.path(), "test_sample/part4.csv", 7);
        write(dir.path(), "qcd/notes.txt", 4);
        write(dir.path(), "qcd/empty.csv", 0);

        let set = discover_files(
            dir.path(),
            "csv",
            SampleSet::TrainVal,
            "events",
            &LineCounter,
        )
        .expect("discover");

        assert_eq!(set.files.len(), set.event_counts.len());
        assert_eq!(set.files.len(), 2);
        assert_eq!(set.total_events, 5);
        assert_eq!(set.total_events, set.event_counts.iter().sum::<u64>());

        // Traversal order is platform-dependent; compare as a set.
        let names: BTreeSet<String> = set
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(
            names,
            BTreeSet::from(["part0.csv".to_string(), "part1.csv".to_string()])
        );
    }

    #[test]
    fn test_mode_requires_test_sample_segment() {
        let dir = TempDir::new().expect("temp dir");
        write(dir.path(), "qcd/part0.csv", 3);
        write(dir.path(), "test_sample/part4.csv", 7);

        let set = discover_files(dir.path(), "csv", SampleSet::Test, "events", &LineCounter)
            .expect("discover");
        assert_eq!(set.files.len(), 1);
        assert_eq!(set.total_events, 7);
    }

    #[test]
    fn missing_root_is_an_error() {
        let err = discover_files(
            Path::new("/nonexistent/dataset"),
            "csv",
            SampleSet::TrainVal,
            "events",
            &LineCounter,
        )
        .expect_err("missing root");
        assert!(matches!(err, IngestError::DirectoryNotFound { .. }));
    }
}
