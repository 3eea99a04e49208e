//! BASIC keyword table
//!
//! Keywords are resolved by substring search, first match wins. Whenever one
//! keyword contains another (`unmounthost` / `mounthost`, `scanresult` /
//! `scan`, `getdrivefilename` / `getdrive`), the longer one must come first.

/// Commands reachable from a BASIC line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BasicCommand {
    /// `ADAPTERCONFIG`
    AdapterConfig,
    /// `SETSSID:ssid,pass`
    SetSsid,
    /// `GETSSID`
    GetSsid,
    /// `SCANRESULT:n`
    ScanResult,
    /// `SCAN`
    ScanNetworks,
    /// `WIFIENABLE`
    WifiEnable,
    /// `WIFIDISABLE`
    WifiDisable,
    /// `WIFISTATUS`
    WifiStatus,
    /// `UNMOUNTHOST:n`
    UnmountHost,
    /// `MOUNTHOST:n`
    MountHost,
    /// `UNMOUNTDRIVE:n`
    UnmountDrive,
    /// `MOUNTDRIVE:n,mode`
    MountDrive,
    /// `MOUNTALL`
    MountAll,
    /// `OPENDIR:host,path[~pattern]`
    OpenDir,
    /// `READDIR:maxlen,opts`
    ReadDir,
    /// `CLOSEDIR`
    CloseDir,
    /// `GETDIRPOS`
    GetDirPos,
    /// `SETDIRPOS:pos`
    SetDirPos,
    /// `GETHOST:n`
    ReadHostSlot,
    /// `PUTHOST:n[,name]`
    WriteHostSlot,
    /// `SETDRIVEFILENAME:slot,host,mode,name`
    SetDriveFilename,
    /// `DRIVEFILENAME:n`
    GetDriveFilename,
    /// `GETDRIVE:n`
    ReadDriveSlot,
    /// `PUTDRIVE:slot,host,name,mode`
    WriteDriveSlot,
    /// `WRITEAPPKEY:len,data`
    WriteAppKey,
    /// `READAPPKEY`
    ReadAppKey,
    /// `OPENAPPKEY:creator,app,key,mode`
    OpenAppKey,
    /// `CLOSEAPPKEY`
    CloseAppKey,
    /// `BOOTCONFIG:0|1`
    BootConfig,
    /// `BOOTMODE:n`
    BootMode,
    /// `FUJISTATUS`
    Status,
    /// `LOCALIP`
    LocalIp,
    /// `RESET`
    Reset,
    /// `ENABLE:ids`
    EnableDevice,
    /// `DISABLE:ids`
    DisableDevice,
}

/// Keyword table in precedence order
pub const KEYWORDS: &[(&str, BasicCommand)] = &[
    ("adapterconfig", BasicCommand::AdapterConfig),
    ("setssid", BasicCommand::SetSsid),
    ("getssid", BasicCommand::GetSsid),
    ("scanresult", BasicCommand::ScanResult),
    ("scan", BasicCommand::ScanNetworks),
    ("wifienable", BasicCommand::WifiEnable),
    ("wifidisable", BasicCommand::WifiDisable),
    ("wifistatus", BasicCommand::WifiStatus),
    ("unmounthost", BasicCommand::UnmountHost),
    ("mounthost", BasicCommand::MountHost),
    ("unmountdrive", BasicCommand::UnmountDrive),
    ("mountdrive", BasicCommand::MountDrive),
    ("mountall", BasicCommand::MountAll),
    ("opendir", BasicCommand::OpenDir),
    ("readdir", BasicCommand::ReadDir),
    ("closedir", BasicCommand::CloseDir),
    ("getdirpos", BasicCommand::GetDirPos),
    ("setdirpos", BasicCommand::SetDirPos),
    ("gethost", BasicCommand::ReadHostSlot),
    ("flh", BasicCommand::ReadHostSlot),
    ("puthost", BasicCommand::WriteHostSlot),
    ("fhost", BasicCommand::WriteHostSlot),
    ("setdrivefilename", BasicCommand::SetDriveFilename),
    ("drivefilename", BasicCommand::GetDriveFilename),
    ("getdrive", BasicCommand::ReadDriveSlot),
    ("putdrive", BasicCommand::WriteDriveSlot),
    ("writeappkey", BasicCommand::WriteAppKey),
    ("readappkey", BasicCommand::ReadAppKey),
    ("openappkey", BasicCommand::OpenAppKey),
    ("closeappkey", BasicCommand::CloseAppKey),
    ("bootconfig", BasicCommand::BootConfig),
    ("bootmode", BasicCommand::BootMode),
    ("fujistatus", BasicCommand::Status),
    ("localip", BasicCommand::LocalIp),
    ("reset", BasicCommand::Reset),
    ("enable", BasicCommand::EnableDevice),
    ("disable", BasicCommand::DisableDevice),
];

/// Resolve a keyword, first table entry contained in `keyword` wins
///
/// Matching is ASCII case-insensitive.
pub fn match_keyword(keyword: &str) -> Option<BasicCommand> {
    let lowered = keyword.to_ascii_lowercase();
    KEYWORDS
        .iter()
        .find(|(kw, _)| lowered.contains(kw))
        .map(|(_, cmd)| *cmd)
}
