//! Display preference persisted alongside the chat history.

use colored::Colorize;
use luatchat_types::DARK_MODE_STORAGE_KEY;

use crate::storage::KvStorage;

/// Dark-mode preference, stored as the string "true"/"false".
#[derive(Debug, Clone, Copy)]
pub struct DisplayPrefs {
    dark_mode: bool,
}

impl DisplayPrefs {
    pub fn load(storage: &dyn KvStorage) -> Self {
        Self {
            dark_mode: storage.get(DARK_MODE_STORAGE_KEY).as_deref() == Some("true"),
        }
    }

    pub fn dark_mode(&self) -> bool {
        self.dark_mode
    }

    /// Flip the preference, write it through, and return the new value.
    pub fn toggle(&mut self, storage: &mut dyn KvStorage) -> bool {
        self.dark_mode = !self.dark_mode;
        let value = if self.dark_mode { "true" } else { "false" };
        if let Err(err) = storage.set(DARK_MODE_STORAGE_KEY, value) {
            eprintln!("{} Could not save display preference: {}", "⚠".yellow(), err);
        }
        self.dark_mode
    }
}
