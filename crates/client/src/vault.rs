use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::PoisonError;

/// Durable key-value storage for session artifacts.
/// The client only ever uses the key [`booking_core::TOKEN_KEY`].
pub trait Vault: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&self, key: &str, value: &str) -> std::io::Result<()>;
    /// Removing an absent key succeeds.
    fn clear(&self, key: &str) -> std::io::Result<()>;
}

/// One file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileVault {
    dir: PathBuf,
}

impl FileVault {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl Vault for FileVault {
    fn load(&self, key: &str) -> Option<String> {
        std::fs::read_to_string(self.path(key))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    }
    fn store(&self, key: &str, value: &str) -> std::io::Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        std::fs::write(self.path(key), value)
    }
    fn clear(&self, key: &str) -> std::io::Result<()> {
        match std::fs::remove_file(self.path(key)) {
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}

#[derive(Debug, Default)]
pub struct MemoryVault {
    entries: Mutex<HashMap<String, String>>,
}

impl Vault for MemoryVault {
    fn load(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
    fn store(&self, key: &str, value: &str) -> std::io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
    fn clear(&self, key: &str) -> std::io::Result<()> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use booking_core::TOKEN_KEY;

    #[test]
    fn file_vault_keeps_one_file_per_key() {
        let dir = std::env::temp_dir().join(format!("booking-vault-{}", std::process::id()));
        let vault = FileVault::new(&dir);
        assert_eq!(vault.load(TOKEN_KEY), None);
        vault.store(TOKEN_KEY, "T1").unwrap();
        assert_eq!(vault.load(TOKEN_KEY).as_deref(), Some("T1"));
        assert!(dir.join(TOKEN_KEY).exists());
        vault.clear(TOKEN_KEY).unwrap();
        vault.clear(TOKEN_KEY).unwrap();
        assert_eq!(vault.load(TOKEN_KEY), None);
        std::fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn memory_vault_forgets_on_clear() {
        let vault = MemoryVault::default();
        vault.store(TOKEN_KEY, "T1").unwrap();
        assert_eq!(vault.load(TOKEN_KEY).as_deref(), Some("T1"));
        vault.clear(TOKEN_KEY).unwrap();
        assert_eq!(vault.load(TOKEN_KEY), None);
    }
}
