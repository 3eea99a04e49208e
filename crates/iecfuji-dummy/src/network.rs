//! Scripted WiFi station

use std::cell::RefCell;
use std::rc::Rc;

use iecfuji_core::error::{Error, Result};
use iecfuji_core::platform::{NetInfo, Network, ScanResult, WifiSettings};

/// CRC-8 (polynomial 0x07) of a network name
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0u8, |crc, &b| {
        (0..8).fold(crc ^ b, |c, _| {
            if c & 0x80 != 0 {
                (c << 1) ^ 0x07
            } else {
                c << 1
            }
        })
    })
}

#[derive(Debug, Default)]
struct NetworkState {
    connected: bool,
    visible: Vec<ScanResult>,
    last_scan: Vec<ScanResult>,
    credentials: Vec<(String, String)>,
    restarts: Vec<WifiSettings>,
    info: NetInfo,
}

/// Network whose visible access points and valid passwords are set by the
/// test
#[derive(Debug, Clone, Default)]
pub struct DummyNetwork {
    state: Rc<RefCell<NetworkState>>,
}

impl DummyNetwork {
    /// Offline, nothing in range
    pub fn new() -> Self {
        Self::default()
    }

    /// Put an access point in range
    pub fn add_access_point(&self, ssid: &str, password: &str, rssi: i8) -> &Self {
        let mut state = self.state.borrow_mut();
        state.visible.push(ScanResult {
            ssid: ssid.to_string(),
            rssi,
        });
        state
            .credentials
            .push((ssid.to_string(), password.to_string()));
        self
    }

    /// Force the association state
    pub fn set_connected(&self, connected: bool) {
        self.state.borrow_mut().connected = connected;
    }

    /// Set the interface details reported while connected
    pub fn set_info(&self, info: NetInfo) {
        self.state.borrow_mut().info = info;
    }

    /// WiFi settings passed to each restart
    pub fn restarts(&self) -> Vec<WifiSettings> {
        self.state.borrow().restarts.clone()
    }
}

impl Network for DummyNetwork {
    fn connected(&self) -> bool {
        self.state.borrow().connected
    }

    fn scan_networks(&mut self) -> u8 {
        let mut state = self.state.borrow_mut();
        state.last_scan = state.visible.clone();
        state.last_scan.len().min(u8::MAX as usize) as u8
    }

    fn scan_result(&self, index: u8) -> Option<ScanResult> {
        self.state.borrow().last_scan.get(index as usize).cloned()
    }

    fn test_connect(&mut self, ssid: &str, password: &str) -> Result<()> {
        let mut state = self.state.borrow_mut();
        if state
            .credentials
            .iter()
            .any(|(s, p)| s == ssid && p == password)
        {
            state.connected = true;
            state.info.ssid = ssid.to_string();
            Ok(())
        } else {
            state.connected = false;
            Err(Error::NotConnected)
        }
    }

    fn restart(&mut self, wifi: &WifiSettings) {
        self.state.borrow_mut().restarts.push(wifi.clone());
    }

    fn info(&self) -> NetInfo {
        self.state.borrow().info.clone()
    }

    fn network_name_by_crc8(&self, crc: u8) -> Option<String> {
        self.state
            .borrow()
            .last_scan
            .iter()
            .find(|ap| crc8(ap.ssid.as_bytes()) == crc)
            .map(|ap| ap.ssid.clone())
    }
}
