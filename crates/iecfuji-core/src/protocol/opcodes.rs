//! RAW command opcodes

/// RAW opcodes understood by the control device
#[allow(missing_docs)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Reset = 0xFF,
    GetSsid = 0xFE,
    ScanNetworks = 0xFD,
    GetScanResult = 0xFC,
    SetSsid = 0xFB,
    GetWifiStatus = 0xFA,
    MountHost = 0xF9,
    MountImage = 0xF8,
    OpenDirectory = 0xF7,
    ReadDirEntry = 0xF6,
    CloseDirectory = 0xF5,
    ReadHostSlots = 0xF4,
    WriteHostSlots = 0xF3,
    ReadDeviceSlots = 0xF2,
    WriteDeviceSlots = 0xF1,
    GetWifiEnabled = 0xEA,
    UnmountImage = 0xE9,
    GetAdapterConfig = 0xE8,
    UnmountHost = 0xE6,
    GetDirectoryPosition = 0xE5,
    SetDirectoryPosition = 0xE4,
    SetDeviceFullpath = 0xE2,
    WriteAppKey = 0xDE,
    ReadAppKey = 0xDD,
    OpenAppKey = 0xDC,
    CloseAppKey = 0xDB,
    GetDeviceFullpath = 0xDA,
    ConfigBoot = 0xD9,
    MountAll = 0xD7,
    SetBootMode = 0xD6,
    EnableDevice = 0xD5,
    DisableDevice = 0xD4,
    HashInput = 0xC8,
    HashCompute = 0xC7,
    HashLength = 0xC6,
    HashOutput = 0xC5,
    GetAdapterConfigExtended = 0xC4,
    HashComputeNoClear = 0xC3,
    HashClear = 0xC2,
    Status = 0x53,
}

impl Opcode {
    /// Every supported opcode
    pub const ALL: [Opcode; 40] = [
        Opcode::Reset,
        Opcode::GetSsid,
        Opcode::ScanNetworks,
        Opcode::GetScanResult,
        Opcode::SetSsid,
        Opcode::GetWifiStatus,
        Opcode::MountHost,
        Opcode::MountImage,
        Opcode::OpenDirectory,
        Opcode::ReadDirEntry,
        Opcode::CloseDirectory,
        Opcode::ReadHostSlots,
        Opcode::WriteHostSlots,
        Opcode::ReadDeviceSlots,
        Opcode::WriteDeviceSlots,
        Opcode::GetWifiEnabled,
        Opcode::UnmountImage,
        Opcode::GetAdapterConfig,
        Opcode::UnmountHost,
        Opcode::GetDirectoryPosition,
        Opcode::SetDirectoryPosition,
        Opcode::SetDeviceFullpath,
        Opcode::WriteAppKey,
        Opcode::ReadAppKey,
        Opcode::OpenAppKey,
        Opcode::CloseAppKey,
        Opcode::GetDeviceFullpath,
        Opcode::ConfigBoot,
        Opcode::MountAll,
        Opcode::SetBootMode,
        Opcode::EnableDevice,
        Opcode::DisableDevice,
        Opcode::HashInput,
        Opcode::HashCompute,
        Opcode::HashLength,
        Opcode::HashOutput,
        Opcode::GetAdapterConfigExtended,
        Opcode::HashComputeNoClear,
        Opcode::HashClear,
        Opcode::Status,
    ];

    /// Look up a supported opcode by its wire value
    pub fn from_byte(b: u8) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| *op as u8 == b)
    }

    /// Whether the opcode runs as soon as the open frame arrives
    ///
    /// All other opcodes wait for one continuation frame with parameters.
    pub fn is_immediate(self) -> bool {
        matches!(
            self,
            Opcode::Reset
                | Opcode::GetSsid
                | Opcode::ScanNetworks
                | Opcode::GetWifiStatus
                | Opcode::GetWifiEnabled
                | Opcode::CloseDirectory
                | Opcode::ReadHostSlots
                | Opcode::WriteHostSlots
                | Opcode::ReadDeviceSlots
                | Opcode::GetAdapterConfig
                | Opcode::GetAdapterConfigExtended
                | Opcode::GetDirectoryPosition
                | Opcode::ReadAppKey
                | Opcode::CloseAppKey
                | Opcode::Status
                | Opcode::MountAll
                | Opcode::HashClear
        )
    }

    /// Short name for log output
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Reset => "RESET",
            Opcode::GetSsid => "GET_SSID",
            Opcode::ScanNetworks => "SCAN_NETWORKS",
            Opcode::GetScanResult => "GET_SCAN_RESULT",
            Opcode::SetSsid => "SET_SSID",
            Opcode::GetWifiStatus => "GET_WIFISTATUS",
            Opcode::MountHost => "MOUNT_HOST",
            Opcode::MountImage => "MOUNT_IMAGE",
            Opcode::OpenDirectory => "OPEN_DIRECTORY",
            Opcode::ReadDirEntry => "READ_DIR_ENTRY",
            Opcode::CloseDirectory => "CLOSE_DIRECTORY",
            Opcode::ReadHostSlots => "READ_HOST_SLOTS",
            Opcode::WriteHostSlots => "WRITE_HOST_SLOTS",
            Opcode::ReadDeviceSlots => "READ_DEVICE_SLOTS",
            Opcode::WriteDeviceSlots => "WRITE_DEVICE_SLOTS",
            Opcode::GetWifiEnabled => "GET_WIFI_ENABLED",
            Opcode::UnmountImage => "UNMOUNT_IMAGE",
            Opcode::GetAdapterConfig => "GET_ADAPTERCONFIG",
            Opcode::UnmountHost => "UNMOUNT_HOST",
            Opcode::GetDirectoryPosition => "GET_DIRECTORY_POSITION",
            Opcode::SetDirectoryPosition => "SET_DIRECTORY_POSITION",
            Opcode::SetDeviceFullpath => "SET_DEVICE_FULLPATH",
            Opcode::WriteAppKey => "WRITE_APPKEY",
            Opcode::ReadAppKey => "READ_APPKEY",
            Opcode::OpenAppKey => "OPEN_APPKEY",
            Opcode::CloseAppKey => "CLOSE_APPKEY",
            Opcode::GetDeviceFullpath => "GET_DEVICE_FULLPATH",
            Opcode::ConfigBoot => "CONFIG_BOOT",
            Opcode::MountAll => "MOUNT_ALL",
            Opcode::SetBootMode => "SET_BOOT_MODE",
            Opcode::EnableDevice => "ENABLE_DEVICE",
            Opcode::DisableDevice => "DISABLE_DEVICE",
            Opcode::HashInput => "HASH_INPUT",
            Opcode::HashCompute => "HASH_COMPUTE",
            Opcode::HashLength => "HASH_LENGTH",
            Opcode::HashOutput => "HASH_OUTPUT",
            Opcode::GetAdapterConfigExtended => "GET_ADAPTERCONFIG_EXTENDED",
            Opcode::HashComputeNoClear => "HASH_COMPUTE_NO_CLEAR",
            Opcode::HashClear => "HASH_CLEAR",
            Opcode::Status => "STATUS",
        }
    }
}
