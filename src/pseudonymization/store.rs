//! Durable original-to-pseudonym mapping, one per category
//!
//! A store is loaded fully into memory, mutated during a run and written back
//! in full at checkpoints. On disk it is a two-column CSV file:
//!
//! ```text
//! Origin,Transformed
//! 10.0.0.1,5f0c...
//! ```
//!
//! Files written without the header row are still accepted on load.
//! Writes go to a temporary file in the same directory that is fsynced and
//! renamed over the destination, so a crash leaves either the old or the new
//! content.

use crate::domain::{Category, StoreError};
use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

/// Header row of a mapping file
pub const HEADER: [&str; 2] = ["Origin", "Transformed"];

/// How reverse lookups are served
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReverseLookup {
    /// Scan the forward map on every lookup; no extra memory
    #[default]
    OnDemand,
    /// Keep a pseudonym-to-original index updated on every insert
    Indexed,
}

/// Mapping for a single category
#[derive(Debug)]
pub struct PseudonymStore {
    category: Category,
    path: PathBuf,
    forward: HashMap<String, String>,
    reverse: Option<HashMap<String, Vec<String>>>,
    dirty: bool,
}

impl PseudonymStore {
    /// Create an empty, in-memory store bound to `path`
    ///
    /// Nothing is written until [`flush`](Self::flush).
    pub fn empty(category: Category, path: impl Into<PathBuf>, mode: ReverseLookup) -> Self {
        Self {
            category,
            path: path.into(),
            forward: HashMap::new(),
            reverse: match mode {
                ReverseLookup::OnDemand => None,
                ReverseLookup::Indexed => Some(HashMap::new()),
            },
            dirty: false,
        }
    }

    /// Load every persisted pair from `path`
    ///
    /// A missing file is not an error: the store starts empty and the file is
    /// created holding only the header row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Io`] if the file cannot be read or created and
    /// [`StoreError::Corrupt`] if a row does not have two columns or an
    /// original appears with two different pseudonyms.
    pub fn load(
        category: Category,
        path: impl Into<PathBuf>,
        mode: ReverseLookup,
    ) -> Result<Self, StoreError> {
        Self::open(category, path.into(), mode, true)
    }

    /// Like [`load`](Self::load), but a missing file is left missing
    ///
    /// Used by read-only callers, which must not touch the mapping directory.
    pub fn load_existing(
        category: Category,
        path: impl Into<PathBuf>,
        mode: ReverseLookup,
    ) -> Result<Self, StoreError> {
        Self::open(category, path.into(), mode, false)
    }

    fn open(
        category: Category,
        path: PathBuf,
        mode: ReverseLookup,
        create_missing: bool,
    ) -> Result<Self, StoreError> {
        let mut store = Self::empty(category, path, mode);

        if !store.path.exists() {
            if !create_missing {
                tracing::debug!(
                    category = %category,
                    path = %store.path.display(),
                    "Mapping file absent, starting empty"
                );
                return Ok(store);
            }
            store.write_to(&store.path)?;
            tracing::info!(
                category = %category,
                path = %store.path.display(),
                "Created empty pseudonym mapping file"
            );
            return Ok(store);
        }

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&store.path)
            .map_err(|e| StoreError::io(&store.path, e))?;

        for (idx, record) in reader.records().enumerate() {
            let record = record.map_err(|e| {
                let line = e.position().map(|p| p.line()).unwrap_or(idx as u64 + 1);
                if e.is_io_error() {
                    StoreError::io(&store.path, &e)
                } else {
                    StoreError::Corrupt {
                        path: store.path.clone(),
                        line,
                        reason: e.to_string(),
                    }
                }
            })?;
            let line = record
                .position()
                .map(|p| p.line())
                .unwrap_or(idx as u64 + 1);

            if idx == 0 && record.len() == 2 && record[0] == *HEADER[0] && record[1] == *HEADER[1]
            {
                continue;
            }

            if record.len() != 2 {
                return Err(StoreError::Corrupt {
                    path: store.path.clone(),
                    line,
                    reason: format!("expected 2 columns, found {}", record.len()),
                });
            }

            let (original, pseudonym) = (&record[0], &record[1]);
            match store.forward.get(original) {
                Some(existing) if existing != pseudonym => {
                    return Err(StoreError::Corrupt {
                        path: store.path.clone(),
                        line,
                        reason: "original is mapped to two different pseudonyms".to_string(),
                    });
                }
                Some(_) => continue,
                None => {
                    store.upsert(original.to_string(), pseudonym.to_string());
                }
            }
        }

        store.dirty = false;

        tracing::info!(
            category = %category,
            path = %store.path.display(),
            entries = store.len(),
            "Loaded pseudonym mapping"
        );

        Ok(store)
    }

    /// Pseudonym for `original`, if it was ever pseudonymized
    pub fn lookup_forward(&self, original: &str) -> Option<&str> {
        self.forward.get(original).map(String::as_str)
    }

    /// Original for `pseudonym`
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::AmbiguousPseudonym`] when more than one original
    /// maps to the pseudonym.
    pub fn lookup_reverse(&self, pseudonym: &str) -> Result<Option<&str>, StoreError> {
        let matches: Vec<&str> = match &self.reverse {
            Some(index) => index
                .get(pseudonym)
                .map(|originals| originals.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            None => self
                .forward
                .iter()
                .filter(|(_, p)| p.as_str() == pseudonym)
                .map(|(o, _)| o.as_str())
                .collect(),
        };

        match matches.as_slice() {
            [] => Ok(None),
            [original] => Ok(Some(*original)),
            many => Err(StoreError::AmbiguousPseudonym {
                category: self.category,
                pseudonym: pseudonym.to_string(),
                count: many.len(),
            }),
        }
    }

    /// Insert the pair unless `original` is already mapped
    ///
    /// Returns `true` if the store grew. An existing mapping is never
    /// replaced.
    pub fn upsert(&mut self, original: String, pseudonym: String) -> bool {
        if self.forward.contains_key(&original) {
            return false;
        }

        if let Some(index) = self.reverse.as_mut() {
            let originals = index.entry(pseudonym.clone()).or_default();
            originals.push(original.clone());
            if originals.len() > 1 {
                tracing::warn!(
                    category = %self.category,
                    pseudonym = %pseudonym,
                    originals = originals.len(),
                    "Pseudonym collision; reverse lookups for it are ambiguous"
                );
            }
        }

        self.forward.insert(original, pseudonym);
        self.dirty = true;
        true
    }

    /// Write the full mapping back to the store's own file
    pub fn flush(&mut self) -> Result<(), StoreError> {
        self.write_to(&self.path)?;
        self.dirty = false;

        tracing::debug!(
            category = %self.category,
            path = %self.path.display(),
            entries = self.len(),
            "Flushed pseudonym mapping"
        );
        Ok(())
    }

    /// Write the full mapping to `destination`, replacing it atomically
    pub fn flush_to(&self, destination: &Path) -> Result<(), StoreError> {
        self.write_to(destination)
    }

    fn write_to(&self, destination: &Path) -> Result<(), StoreError> {
        let dir = match destination.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        fs::create_dir_all(dir).map_err(|e| StoreError::io(destination, e))?;

        let tmp = NamedTempFile::new_in(dir).map_err(|e| StoreError::io(destination, e))?;
        {
            let mut writer = csv::Writer::from_writer(tmp.as_file());
            writer
                .write_record(HEADER)
                .map_err(|e| StoreError::io(destination, e))?;

            let sorted: BTreeMap<&String, &String> = self.forward.iter().collect();
            for (original, pseudonym) in sorted {
                writer
                    .write_record([original.as_str(), pseudonym.as_str()])
                    .map_err(|e| StoreError::io(destination, e))?;
            }
            writer.flush().map_err(|e| StoreError::io(destination, e))?;
        }
        tmp.as_file()
            .sync_all()
            .map_err(|e| StoreError::io(destination, e))?;
        tmp.persist(destination)
            .map_err(|e| StoreError::io(destination, e.error))?;

        Ok(())
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    /// Whether the store changed since it was loaded or last flushed
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }
}

/// The stores for every category, loaded from one mapping directory
#[derive(Debug)]
pub struct StoreSet {
    ip: PseudonymStore,
    device: PseudonymStore,
}

impl StoreSet {
    /// Load (or create) `ip.csv` and `device.csv` under `dir`
    pub fn load(dir: &Path, mode: ReverseLookup) -> Result<Self, StoreError> {
        Ok(Self {
            ip: PseudonymStore::load(Category::Ip, dir.join(Category::Ip.file_name()), mode)?,
            device: PseudonymStore::load(
                Category::Device,
                dir.join(Category::Device.file_name()),
                mode,
            )?,
        })
    }

    /// Load whatever mapping files exist under `dir` without creating any
    pub fn load_existing(dir: &Path, mode: ReverseLookup) -> Result<Self, StoreError> {
        Ok(Self {
            ip: PseudonymStore::load_existing(
                Category::Ip,
                dir.join(Category::Ip.file_name()),
                mode,
            )?,
            device: PseudonymStore::load_existing(
                Category::Device,
                dir.join(Category::Device.file_name()),
                mode,
            )?,
        })
    }

    /// Build a set from already constructed stores
    pub fn from_stores(ip: PseudonymStore, device: PseudonymStore) -> Self {
        Self { ip, device }
    }

    pub fn get(&self, category: Category) -> &PseudonymStore {
        match category {
            Category::Ip => &self.ip,
            Category::Device => &self.device,
        }
    }

    pub fn get_mut(&mut self, category: Category) -> &mut PseudonymStore {
        match category {
            Category::Ip => &mut self.ip,
            Category::Device => &mut self.device,
        }
    }

    /// Total number of mappings across categories
    pub fn total_len(&self) -> usize {
        self.ip.len() + self.device.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn read(path: &Path) -> String {
        fs::read_to_string(path).unwrap()
    }

    #[test]
    fn test_load_missing_file_creates_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ip.csv");

        let store = PseudonymStore::load(Category::Ip, &path, ReverseLookup::OnDemand).unwrap();

        assert!(store.is_empty());
        assert!(!store.is_dirty());
        assert_eq!(read(&path), "Origin,Transformed\n");
    }

    #[test]
    fn test_flush_and_reload() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device.csv");

        let mut store =
            PseudonymStore::load(Category::Device, &path, ReverseLookup::OnDemand).unwrap();
        assert!(store.upsert("dev-b".to_string(), "bbb".to_string()));
        assert!(store.upsert("dev-a".to_string(), "aaa".to_string()));
        assert!(store.is_dirty());
        store.flush().unwrap();
        assert!(!store.is_dirty());

        assert_eq!(read(&path), "Origin,Transformed\ndev-a,aaa\ndev-b,bbb\n");

        let reloaded =
            PseudonymStore::load(Category::Device, &path, ReverseLookup::OnDemand).unwrap();
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.lookup_forward("dev-a"), Some("aaa"));
    }

    #[test]
    fn test_upsert_never_replaces() {
        let mut store = PseudonymStore::empty(Category::Ip, "ip.csv", ReverseLookup::Indexed);
        assert!(store.upsert("1.1.1.1".to_string(), "first".to_string()));
        assert!(!store.upsert("1.1.1.1".to_string(), "second".to_string()));
        assert_eq!(store.lookup_forward("1.1.1.1"), Some("first"));
        assert_eq!(store.lookup_reverse("second").unwrap(), None);
    }

    #[test]
    fn test_load_headerless_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ip.csv");
        fs::write(&path, "10.0.0.1,aaa\r\n10.0.0.2,bbb\r\n").unwrap();

        let store = PseudonymStore::load(Category::Ip, &path, ReverseLookup::OnDemand).unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.lookup_forward("10.0.0.2"), Some("bbb"));
    }

    #[test]
    fn test_load_values_with_commas() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("device.csv");

        let mut store =
            PseudonymStore::load(Category::Device, &path, ReverseLookup::OnDemand).unwrap();
        store.upsert("a,b".to_string(), "ccc".to_string());
        store.flush().unwrap();

        let reloaded =
            PseudonymStore::load(Category::Device, &path, ReverseLookup::OnDemand).unwrap();
        assert_eq!(reloaded.lookup_forward("a,b"), Some("ccc"));
    }

    #[test]
    fn test_load_rejects_wrong_column_count() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ip.csv");
        fs::write(&path, "Origin,Transformed\n10.0.0.1,aaa,extra\n").unwrap();

        let err = PseudonymStore::load(Category::Ip, &path, ReverseLookup::OnDemand).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { line: 2, .. }));
    }

    #[test]
    fn test_load_rejects_conflicting_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ip.csv");
        fs::write(&path, "Origin,Transformed\n10.0.0.1,aaa\n10.0.0.1,bbb\n").unwrap();

        let err = PseudonymStore::load(Category::Ip, &path, ReverseLookup::OnDemand).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
    }

    #[test]
    fn test_load_tolerates_duplicate_identical_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("ip.csv");
        fs::write(&path, "Origin,Transformed\n10.0.0.1,aaa\n10.0.0.1,aaa\n").unwrap();

        let store = PseudonymStore::load(Category::Ip, &path, ReverseLookup::OnDemand).unwrap();
        assert_eq!(store.len(), 1);
        assert!(!store.is_dirty());
    }

    #[test]
    fn test_reverse_lookup_modes_agree() {
        for mode in [ReverseLookup::OnDemand, ReverseLookup::Indexed] {
            let mut store = PseudonymStore::empty(Category::Ip, "ip.csv", mode);
            store.upsert("10.0.0.1".to_string(), "aaa".to_string());
            store.upsert("10.0.0.2".to_string(), "bbb".to_string());

            assert_eq!(store.lookup_reverse("bbb").unwrap(), Some("10.0.0.2"));
            assert_eq!(store.lookup_reverse("zzz").unwrap(), None);
        }
    }

    #[test]
    fn test_reverse_lookup_reports_collision() {
        for mode in [ReverseLookup::OnDemand, ReverseLookup::Indexed] {
            let mut store = PseudonymStore::empty(Category::Device, "device.csv", mode);
            store.upsert("one".to_string(), "same".to_string());
            store.upsert("two".to_string(), "same".to_string());

            let err = store.lookup_reverse("same").unwrap_err();
            assert!(matches!(
                err,
                StoreError::AmbiguousPseudonym { count: 2, category: Category::Device, .. }
            ));
        }
    }

    #[test]
    fn test_flush_to_other_destination() {
        let dir = TempDir::new().unwrap();
        let mut store = PseudonymStore::empty(
            Category::Ip,
            dir.path().join("ip.csv"),
            ReverseLookup::OnDemand,
        );
        store.upsert("10.0.0.1".to_string(), "aaa".to_string());

        let backup = dir.path().join("backup").join("ip.csv");
        store.flush_to(&backup).unwrap();

        assert_eq!(read(&backup), "Origin,Transformed\n10.0.0.1,aaa\n");
        assert!(!dir.path().join("ip.csv").exists());
        assert!(store.is_dirty());
    }

    #[test]
    fn test_store_set_keeps_categories_apart() {
        let dir = TempDir::new().unwrap();
        let mut set = StoreSet::load(dir.path(), ReverseLookup::OnDemand).unwrap();

        set.get_mut(Category::Ip)
            .upsert("shared".to_string(), "ip-p".to_string());

        assert_eq!(set.get(Category::Ip).lookup_forward("shared"), Some("ip-p"));
        assert_eq!(set.get(Category::Device).lookup_forward("shared"), None);
        assert_eq!(set.total_len(), 1);
        assert!(dir.path().join("ip.csv").exists());
        assert!(dir.path().join("device.csv").exists());
    }

    #[test]
    fn test_load_existing_creates_nothing() {
        let dir = TempDir::new().unwrap();
        let mapping_dir = dir.path().join("mappings");
        fs::create_dir(&mapping_dir).unwrap();
        fs::write(mapping_dir.join("ip.csv"), "Origin,Transformed\n10.0.0.1,aaaa\n").unwrap();

        let set = StoreSet::load_existing(&mapping_dir, ReverseLookup::OnDemand).unwrap();

        assert_eq!(set.get(Category::Ip).lookup_forward("10.0.0.1"), Some("aaaa"));
        assert!(set.get(Category::Device).is_empty());
        assert!(!mapping_dir.join("device.csv").exists());
        assert!(StoreSet::load_existing(&dir.path().join("absent"), ReverseLookup::OnDemand)
            .unwrap()
            .get(Category::Ip)
            .is_empty());
        assert!(!dir.path().join("absent").exists());
    }
}
