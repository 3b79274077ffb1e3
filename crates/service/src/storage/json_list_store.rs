use std::{io, marker::PhantomData, path::{Path, PathBuf}, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use serde_json::{ser::PrettyFormatter, Value};
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

use crate::errors::ServiceError;

/// Generic JSON file-backed ordered list.
///
/// Every call reads or rewrites the whole file; nothing is cached between
/// calls. All access within the process goes through one async mutex, so a
/// read-modify-write done via [`JsonListStore::update`] never loses a
/// concurrent writer's change. Other processes writing the same file are
/// not coordinated with.
pub struct JsonListStore<T> {
    file_path: PathBuf,
    lock: Mutex<()>,
    _records: PhantomData<fn() -> T>,
}

impl<T> JsonListStore<T>
where
    T: Serialize + DeserializeOwned,
{
    /// Create the store for `path`, creating parent directories if needed.
    /// The file itself is created lazily on first read.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(ServiceError::storage)?;
        }
        Ok(Arc::new(Self { file_path, lock: Mutex::new(()), _records: PhantomData }))
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read the whole list.
    ///
    /// A missing file is initialized to `[]`. A file that is not a JSON array
    /// is treated as an empty list and left on disk until the next save.
    /// Entries that do not decode as `T` are skipped; the next save drops them.
    pub async fn load_all(&self) -> Result<Vec<T>, ServiceError> {
        let _guard = self.lock.lock().await;
        self.read_unlocked().await
    }

    /// Overwrite the file with `items`.
    pub async fn save_all(&self, items: &[T]) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        self.write_unlocked(items).await
    }

    /// Load, mutate and persist under the lock. Nothing is written when `f`
    /// returns an error.
    pub async fn update<F, R>(&self, f: F) -> Result<R, ServiceError>
    where
        F: FnOnce(&mut Vec<T>) -> Result<R, ServiceError>,
    {
        let _guard = self.lock.lock().await;
        let mut items = self.read_unlocked().await?;
        let out = f(&mut items)?;
        self.write_unlocked(&items).await?;
        Ok(out)
    }

    async fn read_unlocked(&self) -> Result<Vec<T>, ServiceError> {
        match fs::read(&self.file_path).await {
            Ok(bytes) => Ok(self.decode_records(&bytes)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.file_path.display(), "initializing empty data file");
                self.write_unlocked(&[]).await?;
                Ok(Vec::new())
            }
            Err(e) => Err(ServiceError::storage(e)),
        }
    }

    /// Records are decoded one by one so a single malformed entry does not
    /// take the rest of the file with it.
    fn decode_records(&self, bytes: &[u8]) -> Vec<T> {
        let raw = match serde_json::from_slice::<Vec<Value>>(bytes) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.file_path.display(), error = %e, "unreadable data file; treating as empty");
                return Vec::new();
            }
        };
        raw.into_iter()
            .enumerate()
            .filter_map(|(index, value)| match serde_json::from_value::<T>(value) {
                Ok(item) => Some(item),
                Err(e) => {
                    warn!(path = %self.file_path.display(), index, error = %e, "skipping malformed record");
                    None
                }
            })
            .collect()
    }

    async fn write_unlocked(&self, items: &[T]) -> Result<(), ServiceError> {
        let mut data = Vec::new();
        let mut ser = serde_json::Serializer::with_formatter(&mut data, PrettyFormatter::with_indent(b"    "));
        items.serialize(&mut ser).map_err(ServiceError::storage)?;
        fs::write(&self.file_path, data).await.map_err(ServiceError::storage)?;
        Ok(())
    }
}
