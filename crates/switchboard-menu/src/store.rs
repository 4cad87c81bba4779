//! Durable storage contract for the current menu of an entity.
//!
//! The state machine only ever persists one value, the current menu name.
//! Everything else it holds is rebuilt from the menu body on every pass.

use switchboard_types::MenuName;
use thiserror::Error;

/// Errors reported by a [`MenuStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The backing store failed to read or write.
    #[error("menu store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The record that owns the current menu no longer exists.
    #[error("menu store record missing: {0}")]
    Missing(String),
}

/// Loads and saves the current menu name of a single entity.
pub trait MenuStore {
    /// Returns the stored menu name, or `None` if the entity has never
    /// entered a menu.
    fn load(&self) -> Result<Option<MenuName>, StoreError>;

    /// Durably records `menu` as the entity's current menu.
    fn save(&mut self, menu: &MenuName) -> Result<(), StoreError>;
}

impl<S: MenuStore + ?Sized> MenuStore for &mut S {
    fn load(&self) -> Result<Option<MenuName>, StoreError> {
        (**self).load()
    }

    fn save(&mut self, menu: &MenuName) -> Result<(), StoreError> {
        (**self).save(menu)
    }
}

/// A [`MenuStore`] that keeps the current menu in memory.
///
/// Useful for tests and for hosts that persist the menu name themselves
/// after each request.
#[derive(Debug, Clone, Default)]
pub struct MemoryMenuStore {
    current: Option<MenuName>,
    writes: usize,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that already holds `menu`.
    pub fn with_menu(menu: impl Into<MenuName>) -> Self {
        Self {
            current: Some(menu.into()),
            writes: 0,
        }
    }

    pub fn current(&self) -> Option<&MenuName> {
        self.current.as_ref()
    }

    /// Number of successful saves since creation.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl MenuStore for MemoryMenuStore {
    fn load(&self) -> Result<Option<MenuName>, StoreError> {
        Ok(self.current.clone())
    }

    fn save(&mut self, menu: &MenuName) -> Result<(), StoreError> {
        self.current = Some(menu.clone());
        self.writes += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryMenuStore::new();
        assert_eq!(store.load().expect("load should succeed"), None);

        store
            .save(&MenuName::new("second_menu"))
            .expect("save should succeed");
        assert_eq!(
            store.load().expect("load should succeed"),
            Some(MenuName::new("second_menu"))
        );
        assert_eq!(store.writes(), 1);
    }

    fn save_through<S: MenuStore>(mut store: S, menu: &str) {
        store
            .save(&MenuName::new(menu))
            .expect("save should succeed");
    }

    #[test]
    fn borrowed_store_writes_through() {
        let mut store = MemoryMenuStore::with_menu("opening_menu");
        save_through(&mut store, "third_menu");
        assert_eq!(store.current(), Some(&MenuName::new("third_menu")));
        assert_eq!(store.writes(), 1);
    }
}
