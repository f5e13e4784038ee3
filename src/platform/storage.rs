//! Platform storage backends

use crate::persistence::KeyValueStore;

#[cfg(target_arch = "wasm32")]
pub use web::LocalStorageStore;

/// Open the default persisted store for this platform.
///
/// Native: `<data_dir>/save.json`. Web: window LocalStorage (the directory is
/// ignored). Falls back to an in-memory store when nothing persistent is
/// available.
#[cfg(not(target_arch = "wasm32"))]
pub fn open_default_store(data_dir: &std::path::Path) -> Box<dyn KeyValueStore> {
    let store = crate::persistence::FileStore::open_or_recover(data_dir.join("save.json"));
    log::info!("Using save file {}", store.path().display());
    Box::new(store)
}

#[cfg(target_arch = "wasm32")]
pub fn open_default_store(_data_dir: &std::path::Path) -> Box<dyn KeyValueStore> {
    match LocalStorageStore::open() {
        Some(store) => Box::new(store),
        None => {
            log::warn!("LocalStorage unavailable - progress will not persist");
            Box::new(crate::persistence::MemoryStore::new())
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use crate::error::StoreError;
    use crate::persistence::KeyValueStore;

    /// Browser LocalStorage; every write is immediately durable
    pub struct LocalStorageStore {
        storage: web_sys::Storage,
    }

    impl LocalStorageStore {
        pub fn open() -> Option<Self> {
            let storage = web_sys::window()
                .and_then(|w| w.local_storage().ok())
                .flatten()?;
            Some(Self { storage })
        }
    }

    impl KeyValueStore for LocalStorageStore {
        fn get(&self, key: &str) -> Option<String> {
            self.storage.get_item(key).ok().flatten()
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
            self.storage
                .set_item(key, value)
                .map_err(|_| StoreError::Rejected {
                    key: key.to_string(),
                })
        }

        fn remove(&mut self, key: &str) -> Result<(), StoreError> {
            self.storage
                .remove_item(key)
                .map_err(|_| StoreError::Unavailable)
        }

        fn flush(&mut self) -> Result<(), StoreError> {
            Ok(())
        }
    }
}
