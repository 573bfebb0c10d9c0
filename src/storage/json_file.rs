//! Whole-document JSON stores with atomic replace-on-write.
//!
//! Each store is loaded fully into memory, mutated, and written back in full by
//! `flush`. A flush writes a sibling temp file and renames it over the target,
//! so a crash mid-write leaves either the old or the new document.
//!
//! Records are parsed one at a time. A record that does not match the schema is
//! kept as raw JSON and written back untouched. A document that cannot be read
//! at all marks the store unreadable, and an unreadable store refuses to flush.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use rand::Rng;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};

use super::traits::{Record, RecordStore};
use crate::domain::{SignupRecord, SolutionRecord};
use crate::error::{DeliveryError, Result};
use crate::id::now_ms;

/// Write `value` as pretty JSON to `path` via temp file + rename.
pub fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let payload = serde_json::to_vec_pretty(value)?;
    let suffix: u32 = rand::rng().random();
    let file_name = path
        .file_name()
        .ok_or_else(|| DeliveryError::Storage(format!("Not a file path: {}", path.display())))?;
    let temp_path = path.with_file_name(format!(
        ".{}.{:08x}.tmp",
        file_name.to_string_lossy(),
        suffix
    ));

    fs::write(&temp_path, payload)
        .map_err(|e| DeliveryError::Storage(format!("Failed to write {}: {}", temp_path.display(), e)))?;

    if let Err(e) = fs::rename(&temp_path, path) {
        let _ = fs::remove_file(&temp_path);
        return Err(DeliveryError::Storage(format!(
            "Failed to finalize {}: {}",
            path.display(),
            e
        )));
    }

    Ok(())
}

/// A JSON document as loaded from disk.
#[derive(Debug)]
pub struct LoadedDocument<T> {
    pub value: T,
    /// The file exists but could not be read or parsed; `value` is the default
    pub unreadable: bool,
}

/// Load a JSON document, substituting the default when it is missing or unreadable.
///
/// A document that exists but does not parse is first copied to a new
/// `<file>.corrupt-<ms>-<hex>` file. Existing backups are never overwritten.
pub fn load_json_document<T: DeserializeOwned + Default>(path: &Path) -> LoadedDocument<T> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return LoadedDocument {
                value: T::default(),
                unreadable: false,
            };
        }
        Err(e) => {
            log::warn!("Failed to read {}: {}", path.display(), e);
            return LoadedDocument {
                value: T::default(),
                unreadable: true,
            };
        }
    };

    if content.trim().is_empty() {
        return LoadedDocument {
            value: T::default(),
            unreadable: false,
        };
    }

    match serde_json::from_str(&content) {
        Ok(value) => LoadedDocument {
            value,
            unreadable: false,
        },
        Err(e) => {
            log::warn!("Failed to parse {}: {}", path.display(), e);
            back_up_unreadable(path, content.as_bytes());
            LoadedDocument {
                value: T::default(),
                unreadable: true,
            }
        }
    }
}

/// Like `load_json_document`, for callers that never write the document back.
pub fn read_json_or_default<T: DeserializeOwned + Default>(path: &Path) -> T {
    load_json_document(path).value
}

fn back_up_unreadable(path: &Path, content: &[u8]) {
    let backup = corrupt_backup_path(path);
    let result = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(&backup)
        .and_then(|mut file| file.write_all(content));

    match result {
        Ok(()) => log::warn!("Copied unreadable {} to {}", path.display(), backup.display()),
        Err(e) => log::error!("Failed to back up {} to {}: {}", path.display(), backup.display(), e),
    }
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let suffix: u16 = rand::rng().random();
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".corrupt-{}-{:04x}", now_ms(), suffix));
    PathBuf::from(name)
}

/// One stored record: parsed, or kept verbatim because it did not match the schema.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum StoredEntry<R> {
    Parsed(R),
    Unparsed(Value),
}

impl<R: DeserializeOwned> StoredEntry<R> {
    fn from_raw(raw: Value, path: &Path, position: &str) -> Self {
        match R::deserialize(&raw) {
            Ok(record) => StoredEntry::Parsed(record),
            Err(e) => {
                log::warn!(
                    "Record {} in {} does not parse, keeping it as-is: {}",
                    position,
                    path.display(),
                    e
                );
                StoredEntry::Unparsed(raw)
            }
        }
    }
}

impl<R> StoredEntry<R> {
    fn parsed(&self) -> Option<&R> {
        match self {
            StoredEntry::Parsed(record) => Some(record),
            StoredEntry::Unparsed(_) => None,
        }
    }

    fn parsed_mut(&mut self) -> Option<&mut R> {
        match self {
            StoredEntry::Parsed(record) => Some(record),
            StoredEntry::Unparsed(_) => None,
        }
    }
}

fn refuse_unreadable(path: &Path) -> DeliveryError {
    DeliveryError::Storage(format!(
        "Refusing to overwrite {}: it could not be read when the store was opened",
        path.display()
    ))
}

/// On-disk shape of the sign-up store.
#[derive(Debug, Default, Deserialize)]
struct SignupDocument {
    #[serde(default)]
    inscriptions: Vec<Value>,

    #[serde(flatten)]
    extra: Map<String, Value>,
}

/// Sign-up store backed by `{ "inscriptions": [...] }`. Preserves file order.
#[derive(Debug)]
pub struct SignupFileStore {
    path: PathBuf,
    entries: Vec<StoredEntry<SignupRecord>>,
    extra: Map<String, Value>,
    unreadable: bool,
}

impl SignupFileStore {
    /// Load the store at `path`. Missing files yield an empty store; unreadable
    /// ones yield an empty store that will not flush.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let loaded: LoadedDocument<SignupDocument> = load_json_document(&path);
        let entries = loaded
            .value
            .inscriptions
            .into_iter()
            .enumerate()
            .map(|(i, raw)| StoredEntry::from_raw(raw, &path, &format!("#{}", i)))
            .collect();
        Self {
            path,
            entries,
            extra: loaded.value.extra,
            unreadable: loaded.unreadable,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parsed records in file order.
    pub fn records(&self) -> Vec<&SignupRecord> {
        self.entries.iter().filter_map(StoredEntry::parsed).collect()
    }

    /// Records kept verbatim because they did not parse
    pub fn unparsed_count(&self) -> usize {
        self.entries.iter().filter(|e| e.parsed().is_none()).count()
    }

    pub fn is_unreadable(&self) -> bool {
        self.unreadable
    }
}

impl RecordStore<SignupRecord> for SignupFileStore {
    fn get(&self, key: &str) -> Option<SignupRecord> {
        self.entries
            .iter()
            .filter_map(StoredEntry::parsed)
            .find(|r| r.key() == key)
            .cloned()
    }

    fn upsert(&mut self, record: SignupRecord) {
        let existing = self
            .entries
            .iter_mut()
            .filter_map(StoredEntry::parsed_mut)
            .find(|r| r.key() == record.key());
        match existing {
            Some(existing) => *existing = record,
            None => self.entries.push(StoredEntry::Parsed(record)),
        }
    }

    fn list_by_status(&self, status: <SignupRecord as Record>::Status) -> Vec<SignupRecord> {
        self.entries
            .iter()
            .filter_map(StoredEntry::parsed)
            .filter(|r| Record::status(*r) == status)
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.iter().filter(|e| e.parsed().is_some()).count()
    }

    fn flush(&self) -> Result<()> {
        if self.unreadable {
            return Err(refuse_unreadable(&self.path));
        }

        #[derive(Serialize)]
        struct Borrowed<'a> {
            inscriptions: &'a [StoredEntry<SignupRecord>],
            #[serde(flatten)]
            extra: &'a Map<String, Value>,
        }
        write_json_atomic(
            &self.path,
            &Borrowed {
                inscriptions: &self.entries,
                extra: &self.extra,
            },
        )
    }
}

/// Solution store backed by a JSON object keyed by sign-up id.
#[derive(Debug)]
pub struct SolutionFileStore {
    path: PathBuf,
    entries: BTreeMap<String, StoredEntry<SolutionRecord>>,
    unreadable: bool,
}

impl SolutionFileStore {
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let loaded: LoadedDocument<BTreeMap<String, Value>> = load_json_document(&path);
        let entries = loaded
            .value
            .into_iter()
            .map(|(key, raw)| {
                let entry = StoredEntry::from_raw(raw, &path, &format!("{:?}", key));
                (key, entry)
            })
            .collect();
        Self {
            path,
            entries,
            unreadable: loaded.unreadable,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_unreadable(&self) -> bool {
        self.unreadable
    }
}

impl RecordStore<SolutionRecord> for SolutionFileStore {
    fn get(&self, key: &str) -> Option<SolutionRecord> {
        self.entries.get(key).and_then(StoredEntry::parsed).cloned()
    }

    fn upsert(&mut self, record: SolutionRecord) {
        self.entries
            .insert(record.key().to_string(), StoredEntry::Parsed(record));
    }

    fn list_by_status(&self, status: <SolutionRecord as Record>::Status) -> Vec<SolutionRecord> {
        self.entries
            .values()
            .filter_map(StoredEntry::parsed)
            .filter(|r| Record::status(*r) == status)
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.values().filter(|e| e.parsed().is_some()).count()
    }

    fn flush(&self) -> Result<()> {
        if self.unreadable {
            return Err(refuse_unreadable(&self.path));
        }
        write_json_atomic(&self.path, &self.entries)
    }
}
