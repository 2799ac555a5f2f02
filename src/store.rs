use crate::{error::*, types::*};
use chrono::NaiveDate;
use directories::ProjectDirs;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const ERRORS_FILE: &str = "errors.log";
const DATE_FORMAT: &str = "%Y-%m-%d";

pub trait LinkStore {
    /// Persist one batch and return where it went.
    fn put_batch(&self, batch: &TagBatch) -> Result<PathBuf>;
    fn get_batches(&self, date: NaiveDate) -> Result<Vec<TagBatch>>;
    fn list_dates(&self) -> Result<Vec<NaiveDate>>;
    fn log_error(&self, entry: &ErrorEntry) -> Result<()>;
    fn read_errors(&self, date: NaiveDate) -> Result<Vec<ErrorEntry>>;
    fn stats(&self, date: NaiveDate) -> Result<BatchStats>;
}

/// Batches as JSON files, one directory per day and per source:
///
/// ```text
/// <root>/<YYYY-MM-DD>/<source>/<HH.MM.SS.ffffff>-<kind>.json
/// <root>/<YYYY-MM-DD>/errors.log
/// ```
pub struct LocalFsStore {
    root: PathBuf,
}

impl LocalFsStore {
    /// Store under the platform data directory.
    pub fn new() -> Result<Self> {
        let proj = ProjectDirs::from("be", "linktag", "linktag")
            .ok_or_else(|| TaggerError::Other("could not resolve data dir".into()))?;
        Self::at(proj.data_local_dir().join("batches"))
    }

    pub fn at(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)
            .map_err(|e| TaggerError::storage_error("create root", e.to_string()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn day_dir(&self, date: NaiveDate) -> PathBuf {
        self.root.join(date.format(DATE_FORMAT).to_string())
    }

    fn batch_path(&self, batch: &TagBatch) -> PathBuf {
        let dir = self
            .day_dir(batch.fetched_at.date_naive())
            .join(sanitize_component(&batch.source));
        let stem = format!(
            "{}-{}",
            batch.fetched_at.format("%H.%M.%S.%6f"),
            batch.kind.as_str()
        );
        let mut path = dir.join(format!("{}.json", stem));
        let mut n = 1;
        while path.exists() {
            path = dir.join(format!("{}-{}.json", stem, n));
            n += 1;
        }
        path
    }
}

/// Keep source names usable as a single path component.
fn sanitize_component(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '-' || c == '_' || c == '.' { c } else { '_' })
        .collect();
    match cleaned.trim_matches('.') {
        "" => "_".to_string(),
        s => s.to_string(),
    }
}

fn read_batch(path: &Path) -> Option<TagBatch> {
    let file = fs::File::open(path).ok()?;
    match serde_json::from_reader(BufReader::new(file)) {
        Ok(batch) => Some(batch),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Skipping corrupt batch");
            None
        }
    }
}

impl LinkStore for LocalFsStore {
    fn put_batch(&self, batch: &TagBatch) -> Result<PathBuf> {
        let path = self.batch_path(batch);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .map_err(|e| TaggerError::storage_error("put_batch", e.to_string()))?;
        }
        let bytes = serde_json::to_vec_pretty(batch)
            .map_err(|e| TaggerError::storage_error("put_batch", e.to_string()))?;
        // readers only pick up `.json`, so a half-written file is never seen
        let partial = path.with_extension("json.partial");
        fs::write(&partial, bytes)
            .and_then(|_| fs::rename(&partial, &path))
            .map_err(|e| {
                let _ = fs::remove_file(&partial);
                TaggerError::storage_error("put_batch", e.to_string())
            })?;
        debug!(path = %path.display(), links = batch.links.len(), "Stored batch");
        Ok(path)
    }

    fn get_batches(&self, date: NaiveDate) -> Result<Vec<TagBatch>> {
        let day = self.day_dir(date);
        let mut paths = Vec::new();
        if !day.is_dir() {
            return Ok(Vec::new());
        }
        for source in fs::read_dir(&day)? {
            let source = source?.path();
            if !source.is_dir() {
                continue;
            }
            for entry in fs::read_dir(&source)? {
                let path = entry?.path();
                if path.extension().and_then(|s| s.to_str()) == Some("json") {
                    paths.push(path);
                }
            }
        }
        paths.sort();
        Ok(paths.iter().filter_map(|p| read_batch(p)).collect())
    }

    fn list_dates(&self) -> Result<Vec<NaiveDate>> {
        let mut dates = Vec::new();
        for entry in fs::read_dir(&self.root)? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            if let Some(date) = name
                .to_str()
                .and_then(|n| NaiveDate::parse_from_str(n, DATE_FORMAT).ok())
            {
                dates.push(date);
            }
        }
        dates.sort();
        Ok(dates)
    }

    fn log_error(&self, entry: &ErrorEntry) -> Result<()> {
        let day = self.day_dir(entry.timestamp.date_naive());
        let write = || -> std::io::Result<()> {
            fs::create_dir_all(&day)?;
            let mut file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(day.join(ERRORS_FILE))?;
            let line = serde_json::to_string(entry)?;
            writeln!(file, "{}", line)
        };
        write().map_err(|e| TaggerError::storage_error("log_error", e.to_string()))
    }

    fn read_errors(&self, date: NaiveDate) -> Result<Vec<ErrorEntry>> {
        let path = self.day_dir(date).join(ERRORS_FILE);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let reader = BufReader::new(fs::File::open(&path)?);
        let mut entries = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping corrupt error line"),
            }
        }
        Ok(entries)
    }

    fn stats(&self, date: NaiveDate) -> Result<BatchStats> {
        let mut stats = BatchStats {
            date: date.format(DATE_FORMAT).to_string(),
            ..Default::default()
        };
        for batch in self.get_batches(date)? {
            stats.batches += 1;
            stats.links += batch.links.len();
            for link in &batch.links {
                for tag in &link.tags {
                    *stats.tag_counts.entry(tag.clone()).or_insert(0) += 1;
                }
            }
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tag::make_tagged_url;
    use chrono::{TimeZone, Timelike, Utc};

    fn tags(list: &[&str]) -> TagSet {
        list.iter().map(|t| t.to_string()).collect()
    }

    fn batch(source: &str, micros: u32, kind: PageKind) -> TagBatch {
        TagBatch {
            source: source.to_string(),
            page_url: format!("http://www.{}.be/a.html", source),
            kind,
            fetched_at: Utc
                .with_ymd_and_hms(2024, 3, 5, 14, 7, 9)
                .unwrap()
                .with_nanosecond(micros * 1_000)
                .unwrap(),
            links: vec![
                make_tagged_url("/b.html", "B", tags(&["internal", "in text"])),
                make_tagged_url("http://www.rtbf.be/", "RTBF", tags(&["external"])),
            ],
        }
    }

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 5).unwrap()
    }

    #[test]
    fn test_put_batch_layout() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::at(dir.path()).unwrap();

        let path = store.put_batch(&batch("lesoir", 123456, PageKind::Article)).unwrap();
        assert_eq!(
            path,
            dir.path().join("2024-03-05/lesoir/14.07.09.123456-article.json")
        );

        let again = store.put_batch(&batch("lesoir", 123456, PageKind::Article)).unwrap();
        assert_eq!(
            again,
            dir.path().join("2024-03-05/lesoir/14.07.09.123456-article-1.json")
        );
    }

    #[test]
    fn test_put_batch_leaves_only_complete_files() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::at(dir.path()).unwrap();
        let path = store.put_batch(&batch("lesoir", 7, PageKind::Article)).unwrap();

        let names: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(names, vec!["14.07.09.000007-article.json"]);
    }

    #[test]
    fn test_put_batch_failure_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::at(dir.path()).unwrap();
        // a plain file where the source directory should go
        fs::create_dir_all(dir.path().join("2024-03-05")).unwrap();
        fs::write(dir.path().join("2024-03-05/lesoir"), "").unwrap();

        let err = store.put_batch(&batch("lesoir", 1, PageKind::Article)).unwrap_err();
        assert!(matches!(err, TaggerError::Storage { ref operation, .. } if operation == "put_batch"));
        assert!(store.get_batches(day()).unwrap().is_empty());
    }

    #[test]
    fn test_get_batches_and_dates() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::at(dir.path()).unwrap();
        let first = batch("lesoir", 1, PageKind::FrontPage);
        let second = batch("dhnet", 2, PageKind::Article);
        store.put_batch(&first).unwrap();
        store.put_batch(&second).unwrap();

        let batches = store.get_batches(day()).unwrap();
        assert_eq!(batches, vec![second, first]);
        assert_eq!(store.list_dates().unwrap(), vec![day()]);
    }

    #[test]
    fn test_missing_date_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::at(dir.path()).unwrap();
        let other = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert!(store.get_batches(other).unwrap().is_empty());
        assert!(store.read_errors(other).unwrap().is_empty());
        assert_eq!(store.stats(other).unwrap().batches, 0);
        assert!(store.list_dates().unwrap().is_empty());
    }

    #[test]
    fn test_corrupt_batch_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::at(dir.path()).unwrap();
        store.put_batch(&batch("lesoir", 1, PageKind::Article)).unwrap();
        fs::write(dir.path().join("2024-03-05/lesoir/broken.json"), "{oops").unwrap();

        assert_eq!(store.get_batches(day()).unwrap().len(), 1);
    }

    #[test]
    fn test_stats_counts_tags() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::at(dir.path()).unwrap();
        store.put_batch(&batch("lesoir", 1, PageKind::Article)).unwrap();
        store.put_batch(&batch("lesoir", 2, PageKind::Article)).unwrap();

        let stats = store.stats(day()).unwrap();
        assert_eq!(stats.date, "2024-03-05");
        assert_eq!(stats.batches, 2);
        assert_eq!(stats.links, 4);
        assert_eq!(stats.tag_counts["internal"], 2);
        assert_eq!(stats.tag_counts["external"], 2);
        assert_eq!(stats.tag_counts["in text"], 2);
    }

    #[test]
    fn test_error_log_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalFsStore::at(dir.path()).unwrap();
        let entry = ErrorEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 8, 0, 0).unwrap(),
            source: "lesoir".into(),
            page_url: "http://www.lesoir.be/missing".into(),
            message: "fetch failed for http://www.lesoir.be/missing: status 404 (not found)".into(),
        };
        store.log_error(&entry).unwrap();
        store.log_error(&entry).unwrap();

        let raw = fs::read_to_string(dir.path().join("2024-03-05/errors.log")).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert_eq!(store.read_errors(day()).unwrap(), vec![entry.clone(), entry]);
        // the errors log is not a batch
        assert!(store.get_batches(day()).unwrap().is_empty());
    }

    #[test]
    fn test_sanitize_component() {
        assert_eq!(sanitize_component("lesoir"), "lesoir");
        assert_eq!(sanitize_component("../etc"), "_etc");
        assert_eq!(sanitize_component("a b/c"), "a_b_c");
        assert_eq!(sanitize_component(""), "_");
    }
}
