use anyhow::anyhow;
use web_sys::Storage;

pub const TOKEN_KEY: &str = "access_token";

/// Key/value persistence used by the stores.
pub trait TokenStorage {
    fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error>;
    fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error>;
    fn remove(&self, key: &str) -> Result<(), anyhow::Error>;
}

/// Browser `localStorage`.
pub struct LocalStorage(Storage);

impl LocalStorage {
    pub fn new(storage: Storage) -> Self {
        Self(storage)
    }
}

impl TokenStorage for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
        self.0
            .get_item(key)
            .map_err(|e| anyhow!("error read {}: {:?}", key, e))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        self.0
            .set_item(key, value)
            .map_err(|e| anyhow!("error write {}: {:?}", key, e))
    }

    fn remove(&self, key: &str) -> Result<(), anyhow::Error> {
        self.0
            .remove_item(key)
            .map_err(|e| anyhow!("error remove {}: {:?}", key, e))
    }
}

#[cfg(test)]
pub use memory::MemoryStorage;

#[cfg(test)]
mod memory {
    use std::{cell::RefCell, collections::HashMap};

    use super::TokenStorage;

    #[derive(Default)]
    pub struct MemoryStorage {
        items: RefCell<HashMap<String, String>>,
    }

    impl TokenStorage for MemoryStorage {
        fn get(&self, key: &str) -> Result<Option<String>, anyhow::Error> {
            Ok(self.items.borrow().get(key).cloned())
        }

        fn set(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
            self.items
                .borrow_mut()
                .insert(key.to_string(), value.to_string());
            Ok(())
        }

        fn remove(&self, key: &str) -> Result<(), anyhow::Error> {
            self.items.borrow_mut().remove(key);
            Ok(())
        }
    }
}
