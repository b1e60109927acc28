//! Durable key-value storage of golden traces, one JSON file per
//! `(test_name, variant)` key.
//!
//! Layout: `<dir>/<test>.golden.json` for the default golden and
//! `<dir>/<test>.variant_<name>.golden.json` for named variants, where both
//! name components are sanitized (see [`sanitize_name`]). Sanitization runs
//! on every save *and* every lookup, so a name round-trips to the same file
//! no matter which path produced it.

use std::fs;
use std::path::{Path, PathBuf};

use crate::errors::StoreError;
use crate::golden::record::GoldenTrace;
use crate::trace::RunRecord;

/// Per-test cap: one default golden plus up to four named variants.
pub const MAX_VARIANTS: usize = 5;

const GOLDEN_SUFFIX: &str = ".golden.json";

/// Replace every character outside `[A-Za-z0-9_-]` with `_`.
///
/// Test and variant names are user-controlled strings that become filesystem
/// path components; `.` and `/` in particular must never survive into a
/// filename.
pub fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect()
}

pub struct GoldenStore {
    dir: PathBuf,
}

impl GoldenStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn file_path(&self, test_name: &str, variant: Option<&str>) -> PathBuf {
        let test = sanitize_name(test_name);
        match variant {
            None => self.dir.join(format!("{test}{GOLDEN_SUFFIX}")),
            Some(v) => self
                .dir
                .join(format!("{test}.variant_{}{GOLDEN_SUFFIX}", sanitize_name(v))),
        }
    }

    /// Bless an evaluated run as a golden baseline and return where it was
    /// written.
    ///
    /// Overwriting an existing key is always permitted; only a *new* key that
    /// would push the test past [`MAX_VARIANTS`] is rejected.
    pub fn save(
        &self,
        record: &RunRecord,
        blessed_by: &str,
        notes: Option<String>,
        variant: Option<&str>,
    ) -> Result<PathBuf, StoreError> {
        let path = self.file_path(&record.test_name, variant);
        if !path.exists() {
            let count = self.count_variants(&record.test_name);
            if count >= MAX_VARIANTS {
                return Err(StoreError::VariantLimitExceeded {
                    test_name: record.test_name.clone(),
                    count,
                    max: MAX_VARIANTS,
                });
            }
        }

        let golden = GoldenTrace::from_run(record, blessed_by, notes);
        let content =
            serde_json::to_string_pretty(&golden).map_err(|e| StoreError::Serialize {
                test_name: record.test_name.clone(),
                source: e,
            })?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| StoreError::Write {
                path: path.clone(),
                source: e,
            })?;
        }
        fs::write(&path, content).map_err(|e| StoreError::Write {
            path: path.clone(),
            source: e,
        })?;

        tracing::info!(test = %record.test_name, path = %path.display(), "blessed golden");
        Ok(path)
    }

    /// Load one golden. `None` means no golden exists for the key; a file
    /// that exists but does not parse is an error.
    pub fn load(
        &self,
        test_name: &str,
        variant: Option<&str>,
    ) -> Result<Option<GoldenTrace>, StoreError> {
        let path = self.file_path(test_name, variant);
        if !path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&path).map_err(|e| StoreError::Read {
            path: path.clone(),
            source: e,
        })?;
        let golden = serde_json::from_str(&content).map_err(|e| StoreError::Parse {
            path: path.clone(),
            source: e,
        })?;
        Ok(Some(golden))
    }

    /// Whether a default golden exists for the test.
    pub fn has(&self, test_name: &str) -> bool {
        self.file_path(test_name, None).exists()
    }

    /// Delete one golden. Returns true when a file was actually removed.
    pub fn delete(&self, test_name: &str, variant: Option<&str>) -> Result<bool, StoreError> {
        let path = self.file_path(test_name, variant);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path).map_err(|e| StoreError::Write {
            path: path.clone(),
            source: e,
        })?;
        Ok(true)
    }

    /// Metadata of every default golden, sorted by test name. Individually
    /// corrupt files are skipped with a warning rather than failing the
    /// whole listing.
    pub fn list(&self) -> Result<Vec<crate::golden::GoldenMetadata>, StoreError> {
        let mut out = Vec::new();
        for path in self.golden_files()? {
            let name = file_name(&path);
            if name.contains(".variant_") {
                continue;
            }
            match self.parse_file(&path) {
                Some(golden) => out.push(golden.metadata),
                None => continue,
            }
        }
        out.sort_by(|a, b| a.test_name.cmp(&b.test_name));
        Ok(out)
    }

    /// Default golden first (when present), then named variants in filename
    /// order. Corrupt variants are skipped with a warning.
    pub fn load_all_variants(&self, test_name: &str) -> Result<Vec<GoldenTrace>, StoreError> {
        let mut out = Vec::new();
        if let Some(default) = self.load(test_name, None)? {
            out.push(default);
        }

        let prefix = format!("{}.variant_", sanitize_name(test_name));
        let mut variant_paths: Vec<PathBuf> = self
            .golden_files()?
            .into_iter()
            .filter(|p| file_name(p).starts_with(&prefix))
            .collect();
        variant_paths.sort();

        for path in variant_paths {
            if let Some(golden) = self.parse_file(&path) {
                out.push(golden);
            }
        }
        Ok(out)
    }

    /// Number of stored goldens (default + named variants) for a test.
    pub fn count_variants(&self, test_name: &str) -> usize {
        let default = usize::from(self.has(test_name));
        let prefix = format!("{}.variant_", sanitize_name(test_name));
        let named = self
            .golden_files()
            .map(|files| {
                files
                    .iter()
                    .filter(|p| file_name(p).starts_with(&prefix))
                    .count()
            })
            .unwrap_or(0);
        default + named
    }

    fn golden_files(&self) -> Result<Vec<PathBuf>, StoreError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::Read {
            path: self.dir.clone(),
            source: e,
        })?;
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| file_name(p).ends_with(GOLDEN_SUFFIX))
            .collect();
        files.sort();
        Ok(files)
    }

    fn parse_file(&self, path: &Path) -> Option<GoldenTrace> {
        let content = match fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable golden");
                return None;
            }
        };
        match serde_json::from_str(&content) {
            Ok(golden) => Some(golden),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping corrupt golden");
                None
            }
        }
    }
}

fn file_name(path: &Path) -> &str {
    path.file_name().and_then(|n| n.to_str()).unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trace::ExecutionTrace;
    use chrono::Utc;
    use tempfile::TempDir;

    fn record(test_name: &str) -> RunRecord {
        RunRecord {
            test_name: test_name.into(),
            trace: ExecutionTrace {
                session_id: "sess".into(),
                started_at: Utc::now(),
                completed_at: Utc::now(),
                steps: Vec::new(),
                final_output: "ok".into(),
                total_cost: 0.0,
                total_latency_ms: 100.0,
                tokens: None,
                model: None,
            },
            score: 90.0,
        }
    }

    #[test]
    fn sanitize_replaces_path_chars() {
        assert_eq!(sanitize_name("a/b..c"), "a_b__c");
        assert_eq!(sanitize_name("weather lookup!"), "weather_lookup_");
        assert_eq!(sanitize_name("ok_name-1"), "ok_name-1");
    }

    #[test]
    fn save_then_load_roundtrips() {
        let tmp = TempDir::new().unwrap();
        let store = GoldenStore::new(tmp.path());
        store.save(&record("basic"), "ci", None, None).unwrap();
        let loaded = store.load("basic", None).unwrap().unwrap();
        assert_eq!(loaded.metadata.test_name, "basic");
        assert!(store.has("basic"));
    }

    #[test]
    fn load_missing_is_none_not_error() {
        let tmp = TempDir::new().unwrap();
        let store = GoldenStore::new(tmp.path());
        assert!(store.load("nothing", None).unwrap().is_none());
        assert!(!store.has("nothing"));
    }

    #[test]
    fn sanitized_names_resolve_to_same_file() {
        let tmp = TempDir::new().unwrap();
        let store = GoldenStore::new(tmp.path());
        let path = store.save(&record("a/b..c"), "ci", None, None).unwrap();

        let name = path.file_name().unwrap().to_str().unwrap();
        assert_eq!(name, "a_b__c.golden.json");
        assert!(!name.trim_end_matches(".golden.json").contains('.'));

        // Lookup under the identical raw string hits the same file.
        assert!(store.load("a/b..c", None).unwrap().is_some());
        assert!(store.delete("a/b..c", None).unwrap());
        assert!(store.load("a/b..c", None).unwrap().is_none());
    }

    #[test]
    fn variant_cap_rejects_sixth_new_variant() {
        let tmp = TempDir::new().unwrap();
        let store = GoldenStore::new(tmp.path());
        let rec = record("capped");

        store.save(&rec, "ci", None, None).unwrap();
        for v in ["a", "b", "c", "d"] {
            store.save(&rec, "ci", None, Some(v)).unwrap();
        }
        assert_eq!(store.count_variants("capped"), MAX_VARIANTS);

        let err = store.save(&rec, "ci", None, Some("e")).unwrap_err();
        assert!(matches!(err, StoreError::VariantLimitExceeded { .. }));

        // Overwriting an existing variant is always fine and keeps the count.
        store.save(&rec, "ci", None, Some("d")).unwrap();
        assert_eq!(store.count_variants("capped"), MAX_VARIANTS);
    }

    #[test]
    fn load_all_variants_default_first() {
        let tmp = TempDir::new().unwrap();
        let store = GoldenStore::new(tmp.path());
        let rec = record("multi");
        store.save(&rec, "ci", None, Some("zeta")).unwrap();
        store.save(&rec, "ci", None, None).unwrap();
        store.save(&rec, "ci", None, Some("alpha")).unwrap();

        let all = store.load_all_variants("multi").unwrap();
        assert_eq!(all.len(), 3);
        // Default first, then named variants in filename order.
        assert_eq!(all[0].metadata.test_name, "multi");
    }

    #[test]
    fn list_skips_corrupt_entries() {
        let tmp = TempDir::new().unwrap();
        let store = GoldenStore::new(tmp.path());
        store.save(&record("good"), "ci", None, None).unwrap();
        std::fs::write(tmp.path().join("bad.golden.json"), "{not json").unwrap();

        let listed = store.list().unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].test_name, "good");
    }

    #[test]
    fn list_excludes_variants() {
        let tmp = TempDir::new().unwrap();
        let store = GoldenStore::new(tmp.path());
        let rec = record("t");
        store.save(&rec, "ci", None, None).unwrap();
        store.save(&rec, "ci", None, Some("alt")).unwrap();

        assert_eq!(store.list().unwrap().len(), 1);
        assert_eq!(store.count_variants("t"), 2);
    }
}
