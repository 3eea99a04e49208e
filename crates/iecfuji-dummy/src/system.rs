//! System services

use std::cell::RefCell;
use std::rc::Rc;

use iecfuji_core::platform::System;

#[derive(Debug, Default)]
struct SystemState {
    reboots: usize,
    delays: Vec<u32>,
}

/// Counts reboots and records delays instead of sleeping
#[derive(Debug, Clone, Default)]
pub struct DummySystem {
    state: Rc<RefCell<SystemState>>,
}

impl DummySystem {
    /// Fresh system
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reboots requested
    pub fn reboots(&self) -> usize {
        self.state.borrow().reboots
    }

    /// Every delay requested, in milliseconds
    pub fn delays(&self) -> Vec<u32> {
        self.state.borrow().delays.clone()
    }
}

impl System for DummySystem {
    fn reboot(&mut self) {
        self.state.borrow_mut().reboots += 1;
    }

    fn version(&self) -> String {
        concat!("dummy-", env!("CARGO_PKG_VERSION")).to_string()
    }

    fn delay_ms(&mut self, ms: u32) {
        self.state.borrow_mut().delays.push(ms);
    }
}
