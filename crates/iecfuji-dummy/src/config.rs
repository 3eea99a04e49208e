//! Settings kept in memory

use std::cell::RefCell;
use std::rc::Rc;

use iecfuji_core::error::{Error, Result};
use iecfuji_core::platform::{ConfigStore, Settings};

#[derive(Debug, Default)]
struct ConfigState {
    stored: Option<Settings>,
    saves: usize,
    fail_load: bool,
}

/// Configuration store backed by a shared [`Settings`] value
#[derive(Debug, Clone, Default)]
pub struct DummyConfig {
    state: Rc<RefCell<ConfigState>>,
}

impl DummyConfig {
    /// Empty store; loading yields defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that loads `settings`
    pub fn with_settings(settings: Settings) -> Self {
        let config = Self::new();
        config.state.borrow_mut().stored = Some(settings);
        config
    }

    /// Make the next loads fail
    pub fn fail_load(&self) {
        self.state.borrow_mut().fail_load = true;
    }

    /// Last saved settings
    pub fn stored(&self) -> Option<Settings> {
        self.state.borrow().stored.clone()
    }

    /// Number of saves
    pub fn save_count(&self) -> usize {
        self.state.borrow().saves
    }
}

impl ConfigStore for DummyConfig {
    fn load(&mut self) -> Result<Settings> {
        let state = self.state.borrow();
        if state.fail_load {
            return Err(Error::io("config unreadable"));
        }
        Ok(state.stored.clone().unwrap_or_default())
    }

    fn save(&mut self, settings: &Settings) -> Result<()> {
        let mut state = self.state.borrow_mut();
        state.stored = Some(settings.clone());
        state.saves += 1;
        Ok(())
    }
}
