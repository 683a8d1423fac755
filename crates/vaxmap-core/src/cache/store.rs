use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::debug;

use crate::models::{CenterCategory, Position, VaccinationCenter};

/// Snapshot of every stored center, shared with all feed subscribers.
pub type CenterSnapshot = Arc<Vec<VaccinationCenter>>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedData<T> {
    pub data: T,
    pub cached_at: DateTime<Utc>,
}

fn age_display(minutes: i64) -> String {
    if minutes < 1 {
        // Negative ages come from clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        if minutes % 60 >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        if (minutes % 1440) / 60 >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// On-disk row. The position is kept as a `"<lat>;<lng>"` string column.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct StoredCenter {
    id: i64,
    pos: String,
    address: String,
    center_name: String,
    facility_name: String,
    phone_number: String,
    updated_at: String,
    center_type: String,
}

impl From<&VaccinationCenter> for StoredCenter {
    fn from(center: &VaccinationCenter) -> Self {
        Self {
            id: center.id,
            pos: center.position.encode(),
            address: center.address.clone(),
            center_name: center.center_name.clone(),
            facility_name: center.facility_name.clone(),
            phone_number: center.phone_number.clone(),
            updated_at: center.updated_at.clone(),
            center_type: center.category.label().to_string(),
        }
    }
}

impl StoredCenter {
    fn into_center(self) -> Result<VaccinationCenter> {
        let position = Position::decode(&self.pos)
            .with_context(|| format!("Stored center {} has a corrupt position", self.id))?;
        Ok(VaccinationCenter {
            id: self.id,
            position,
            address: self.address,
            center_name: self.center_name,
            facility_name: self.facility_name,
            phone_number: self.phone_number,
            updated_at: self.updated_at,
            category: CenterCategory::from(self.center_type),
        })
    }
}

struct Rows {
    centers: Vec<VaccinationCenter>,
    written_at: Option<DateTime<Utc>>,
}

/// Local persistent collection of vaccination centers.
///
/// Rows live in memory and are written through to a JSON file on every
/// mutation. Every mutation also publishes a fresh snapshot on the change
/// feed returned by [`CenterStore::get_all`].
pub struct CenterStore {
    path: Option<PathBuf>,
    rows: Mutex<Rows>,
    feed: watch::Sender<CenterSnapshot>,
}

impl CenterStore {
    /// Open the store backed by `path`, loading existing rows if the file exists.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create cache directory {}", parent.display()))?;
        }

        let (centers, written_at) = match Self::load(&path)? {
            Some(cached) => {
                let centers = cached
                    .data
                    .into_iter()
                    .map(StoredCenter::into_center)
                    .collect::<Result<Vec<_>>>()?;
                (centers, Some(cached.cached_at))
            }
            None => (Vec::new(), None),
        };
        debug!(path = %path.display(), count = centers.len(), "Center store opened");

        Ok(Self::with_rows(Some(path), centers, written_at))
    }

    /// A store that never touches the filesystem.
    pub fn in_memory() -> Self {
        Self::with_rows(None, Vec::new(), None)
    }

    fn with_rows(
        path: Option<PathBuf>,
        centers: Vec<VaccinationCenter>,
        written_at: Option<DateTime<Utc>>,
    ) -> Self {
        let (feed, _) = watch::channel(Arc::new(centers.clone()));
        Self {
            path,
            rows: Mutex::new(Rows { centers, written_at }),
            feed,
        }
    }

    fn load(path: &Path) -> Result<Option<CachedData<Vec<StoredCenter>>>> {
        if !path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read center store: {}", path.display()))?;
        let cached = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse center store: {}", path.display()))?;
        Ok(Some(cached))
    }

    fn rows(&self) -> MutexGuard<'_, Rows> {
        self.rows.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Persist `centers`, then make them the current rows and publish them.
    /// Called with the lock held so that file contents and feed snapshots
    /// follow mutation order. On a failed write the current rows are kept.
    fn commit(&self, rows: &mut Rows, centers: Vec<VaccinationCenter>) -> Result<()> {
        let now = Utc::now();
        if let Some(ref path) = self.path {
            let stored: Vec<StoredCenter> = centers.iter().map(StoredCenter::from).collect();
            let cached = CachedData { data: stored, cached_at: now };
            let contents = serde_json::to_string(&cached)?;
            std::fs::write(path, contents)
                .with_context(|| format!("Failed to write center store: {}", path.display()))?;
        }
        rows.centers = centers;
        rows.written_at = Some(now);
        self.feed.send_replace(Arc::new(rows.centers.clone()));
        Ok(())
    }

    /// Live feed of the full row set. The receiver starts at the current
    /// snapshot and observes every later mutation.
    pub fn get_all(&self) -> watch::Receiver<CenterSnapshot> {
        self.feed.subscribe()
    }

    /// Current rows, without subscribing.
    pub fn snapshot(&self) -> CenterSnapshot {
        self.feed.borrow().clone()
    }

    /// Insert one or more centers. A center whose id is already stored
    /// replaces the existing row.
    pub fn insert(&self, centers: &[VaccinationCenter]) -> Result<()> {
        if centers.is_empty() {
            return Ok(());
        }
        let mut rows = self.rows();
        let mut next = rows.centers.clone();
        for center in centers {
            match next.iter_mut().find(|c| c.id == center.id) {
                Some(existing) => *existing = center.clone(),
                None => next.push(center.clone()),
            }
        }
        self.commit(&mut rows, next)
    }

    /// Delete a single center. Returns whether a row was removed.
    pub fn delete(&self, center: &VaccinationCenter) -> Result<bool> {
        let mut rows = self.rows();
        if !rows.centers.iter().any(|c| c.id == center.id) {
            return Ok(false);
        }
        let next = rows.centers.iter().filter(|c| c.id != center.id).cloned().collect();
        self.commit(&mut rows, next)?;
        Ok(true)
    }

    pub fn delete_all(&self) -> Result<()> {
        let mut rows = self.rows();
        self.commit(&mut rows, Vec::new())
    }

    pub fn count(&self) -> usize {
        self.rows().centers.len()
    }

    pub fn get(&self, id: i64) -> Option<VaccinationCenter> {
        self.rows().centers.iter().find(|c| c.id == id).cloned()
    }

    /// Time of the last write, if the store was ever written.
    pub fn last_written(&self) -> Option<DateTime<Utc>> {
        self.rows().written_at
    }

    /// Human-readable age of the last write ("5m ago"), or "never".
    pub fn age_display(&self) -> String {
        match self.last_written() {
            Some(at) => age_display((Utc::now() - at).num_minutes()),
            None => "never".to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn center(id: i64, category: &str) -> VaccinationCenter {
        VaccinationCenter {
            id,
            position: Position::new(37.5, 127.0 + id as f64),
            address: format!("주소 {}", id),
            center_name: format!("센터 {}", id),
            facility_name: "시설".to_string(),
            phone_number: "02-000-0000".to_string(),
            updated_at: "2021-07-16 04:55:08".to_string(),
            category: CenterCategory::from_label(category),
        }
    }

    #[test]
    fn test_age_display() {
        assert_eq!(age_display(-3), "just now");
        assert_eq!(age_display(0), "just now");
        assert_eq!(age_display(5), "5m ago");
        assert_eq!(age_display(90), "2h ago");
        assert_eq!(age_display(61), "1h ago");
        assert_eq!(age_display(1440 * 3), "3d ago");
    }

    #[test]
    fn test_insert_count_and_delete() {
        let store = CenterStore::in_memory();
        assert_eq!(store.count(), 0);
        assert_eq!(store.age_display(), "never");
        assert!(store.last_written().is_none());

        store.insert(&[center(1, "지역"), center(2, "중앙/권역")]).unwrap();
        store.insert(&[center(3, "기타")]).unwrap();
        assert_eq!(store.count(), 3);
        assert_eq!(store.age_display(), "just now");
        assert!(store.last_written().is_some());

        assert!(store.delete(&center(2, "")).unwrap());
        assert!(!store.delete(&center(2, "")).unwrap());
        assert_eq!(store.count(), 2);
        assert!(store.get(2).is_none());

        store.delete_all().unwrap();
        assert_eq!(store.count(), 0);
    }

    #[test]
    fn test_insert_same_id_replaces() {
        let store = CenterStore::in_memory();
        store.insert(&[center(1, "지역")]).unwrap();
        store.insert(&[center(1, "중앙/권역")]).unwrap();

        assert_eq!(store.count(), 1);
        assert_eq!(store.get(1).unwrap().category, CenterCategory::CentralRegional);
    }

    #[test]
    fn test_feed_sees_mutations() {
        let store = CenterStore::in_memory();
        let mut feed = store.get_all();
        assert!(feed.borrow_and_update().is_empty());

        store.insert(&[center(1, "지역")]).unwrap();
        assert!(feed.has_changed().unwrap());
        assert_eq!(feed.borrow_and_update().len(), 1);

        store.delete_all().unwrap();
        assert!(feed.borrow_and_update().is_empty());
    }

    #[test]
    fn test_file_store_persists_position_string() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("centers.json");

        {
            let store = CenterStore::open(&path).unwrap();
            store.insert(&[center(1, "지역"), center(2, "임시")]).unwrap();
        }

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains(r#""pos":"37.5;128""#));

        let reopened = CenterStore::open(&path).unwrap();
        assert_eq!(reopened.count(), 2);
        let restored = reopened.get(2).unwrap();
        assert_eq!(restored, center(2, "임시"));
        assert_eq!(reopened.snapshot().len(), 2);
    }

    #[test]
    fn test_failed_write_keeps_rows_in_step() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("centers.json");
        let store = CenterStore::open(&path).unwrap();
        store.insert(&[center(1, "지역")]).unwrap();
        let feed = store.get_all();

        // A directory where the file should be makes every write fail
        std::fs::remove_file(&path).unwrap();
        std::fs::create_dir(&path).unwrap();

        assert!(store.insert(&[center(2, "지역")]).is_err());
        assert!(store.delete_all().is_err());
        assert!(store.delete(&center(1, "")).is_err());

        assert_eq!(store.count(), 1);
        assert!(store.get(1).is_some());
        assert!(store.get(2).is_none());
        assert_eq!(store.snapshot().len(), 1);
        assert!(!feed.has_changed().unwrap());
    }

    #[test]
    fn test_corrupt_position_fails_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("centers.json");
        std::fs::write(
            &path,
            r#"{"data":[{"id":1,"pos":"nowhere","address":"","center_name":"","facility_name":"","phone_number":"","updated_at":"","center_type":""}],"cached_at":"2021-07-16T04:55:08Z"}"#,
        )
        .unwrap();

        assert!(CenterStore::open(&path).is_err());
    }
}
