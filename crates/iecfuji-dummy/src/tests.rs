//! End-to-end protocol tests against the in-memory platform

use iecfuji_core::frame::CommandState;
use iecfuji_core::media::MediaType;
use iecfuji_core::platform::{AccessMode, MountSettings, NetInfo, Settings};
use iecfuji_core::protocol::wire::{ADAPTER_CONFIG_EXTENDED_LEN, ADAPTER_CONFIG_LEN, DEVICE_BLOCK_LEN, HOST_BLOCK_LEN};
use iecfuji_core::protocol::{Opcode, DIR_END_SENTINEL, RAW_MARKER};
use iecfuji_core::{FujiDevice, Reply, WireFormat};

use super::*;

fn basic(device: &mut FujiDevice, line: &str) -> Reply {
    device.process_frame(line.as_bytes())
}

fn raw(device: &mut FujiDevice, op: Opcode) -> Reply {
    device.process_frame(&[RAW_MARKER, op as u8])
}

fn raw_with(device: &mut FujiDevice, op: Opcode, data: &[u8]) -> Reply {
    let open = raw(device, op);
    assert!(open.data.is_empty());
    assert_eq!(device.command_state(), CommandState::AwaitingContinuation(op));
    device.process_frame(data)
}

fn assert_ok(reply: &Reply) {
    assert!(reply.status.is_ok(), "unexpected failure: {}", reply.status.message);
}

/// Platform with an SD host in slot 0 holding a few images
fn sd_platform() -> (DummyPlatform, FujiDevice) {
    let platform = DummyPlatform::new();
    platform
        .hosts
        .add_file("SD", "/games/elite.d64", 174_848)
        .add_file("SD", "/games/zork.d81", 819_200)
        .add_dir("SD", "/games/demos")
        .add_file("SD", "/readme.txt", 120);
    let mut device = platform.device();
    assert_ok(&basic(&mut device, "PUTHOST:0,SD"));
    (platform, device)
}

#[test]
fn test_mount_then_unmount_host_every_slot() {
    let platform = DummyPlatform::new();
    platform.hosts.add_host("SD");
    let mut device = platform.device();

    for h in 0..8u8 {
        assert_ok(&basic(&mut device, &format!("PUTHOST:{},SD", h)));
        let reply = basic(&mut device, &format!("MOUNTHOST:{}", h));
        assert_ok(&reply);
        assert_eq!(reply.data, b"SD MOUNTED.");
        assert!(device.slots().host(h).unwrap().is_mounted());

        let reply = basic(&mut device, &format!("UNMOUNTHOST:{}", h));
        assert_ok(&reply);
        assert_eq!(reply.data, b"ok");
        assert!(!device.slots().host(h).unwrap().is_mounted());
    }
    assert!(!platform.hosts.is_mounted("SD"));
}

#[test]
fn test_raw_mount_host() {
    let (platform, mut device) = sd_platform();
    let reply = raw_with(&mut device, Opcode::MountHost, &[0]);
    assert_ok(&reply);
    assert_eq!(reply.format, WireFormat::Raw);
    assert!(reply.data.is_empty());
    assert!(platform.hosts.is_mounted("SD"));
    assert_eq!(device.command_state(), CommandState::Idle);

    let reply = raw_with(&mut device, Opcode::UnmountHost, &[0]);
    assert_ok(&reply);
    assert!(!platform.hosts.is_mounted("SD"));
}

#[test]
fn test_mount_empty_or_unreachable_host_fails() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();

    let reply = basic(&mut device, "MOUNTHOST:3");
    assert_eq!(reply.status.code, 3);
    assert_eq!(reply.data, b"no host configured in slot");

    assert_ok(&basic(&mut device, "PUTHOST:3,tnfs.example.org"));
    let reply = basic(&mut device, "MOUNTHOST:3");
    assert_eq!(reply.status.code, 4);
    assert!(!device.slots().host(3).unwrap().is_mounted());
}

#[test]
fn test_unmount_image_is_idempotent() {
    let (_platform, mut device) = sd_platform();
    for _ in 0..2 {
        let reply = raw_with(&mut device, Opcode::UnmountImage, &[3]);
        assert_ok(&reply);
    }
    assert!(!device.slots().disk(3).unwrap().has_media());

    let reply = raw_with(&mut device, Opcode::UnmountImage, &[8]);
    assert_eq!(reply.status.code, 2);
    assert_eq!(reply.status.message, "invalid device slot 8");
}

#[test]
fn test_mount_drive_and_unmount() {
    let (platform, mut device) = sd_platform();
    assert!(device.boot_config());

    assert_ok(&basic(&mut device, "SETDRIVEFILENAME:0,0,1,/games/elite.d64"));
    let reply = basic(&mut device, "MOUNTDRIVE:0,1");
    assert_ok(&reply);
    assert_eq!(reply.data, b"mounted");

    let disk = platform.drives.inserted(0).unwrap();
    assert_eq!(disk.filename, "/games/elite.d64");
    assert_eq!(disk.size, 174_848);
    assert_eq!(disk.media, MediaType::D64);
    assert_eq!(
        platform.hosts.opened(),
        vec![("/games/elite.d64".to_string(), AccessMode::Read)]
    );
    assert!(!device.boot_config());

    assert_eq!(basic(&mut device, "GETDRIVE:0").data, b"elite.d64");
    assert_eq!(basic(&mut device, "DRIVEFILENAME:0").data, b"/games/elite.d64");

    assert_ok(&basic(&mut device, "UNMOUNTDRIVE:0"));
    assert_eq!(platform.drives.inserted(0), None);
    assert_eq!(device.slots().disk(0).unwrap().filename(), "");
}

#[test]
fn test_unmounted_image_stays_gone_after_restart() {
    let (platform, mut device) = sd_platform();
    assert_ok(&basic(&mut device, "SETDRIVEFILENAME:0,0,1,/games/elite.d64"));
    assert_ok(&basic(&mut device, "MOUNTDRIVE:0,1"));
    let stored = platform.config.stored().unwrap();
    assert_eq!(stored.mounts[0].path, "/games/elite.d64");
    assert!(!stored.boot_config);

    let saves = platform.config.save_count();
    assert_ok(&basic(&mut device, "UNMOUNTDRIVE:0"));
    assert!(platform.config.save_count() > saves);
    assert_eq!(platform.config.stored().unwrap().mounts[0], MountSettings::default());
    drop(device);

    let device = platform.device();
    assert_eq!(device.slots().disk(0).unwrap().filename(), "");
    assert!(platform.drives.inserted(0).is_none());
}

#[test]
fn test_mount_all_persists_boot_config() {
    let (platform, mut device) = sd_platform();
    assert!(platform.config.stored().unwrap().boot_config);
    assert_ok(&raw(&mut device, Opcode::MountAll));
    assert!(!platform.config.stored().unwrap().boot_config);
}

#[test]
fn test_raw_mount_image_read_write() {
    let (platform, mut device) = sd_platform();
    let mut data = vec![1, 0, 2];
    data.extend_from_slice(b"/games/zork.d81");
    assert_ok(&raw_with(&mut device, Opcode::SetDeviceFullpath, &data));

    let reply = raw_with(&mut device, Opcode::MountImage, &[1, 2]);
    assert_ok(&reply);
    assert_eq!(platform.drives.inserted(1).unwrap().media, MediaType::D81);
    assert_eq!(device.slots().disk(1).unwrap().mode(), AccessMode::ReadWrite);

    let reply = raw_with(&mut device, Opcode::GetDeviceFullpath, &[1]);
    assert_eq!(reply.data, b"/games/zork.d81");
    let reply = raw_with(&mut device, Opcode::GetDeviceFullpath, &[5]);
    assert_eq!(reply.data, [0]);
}

#[test]
fn test_mount_image_missing_parameters() {
    let (_platform, mut device) = sd_platform();
    let reply = raw_with(&mut device, Opcode::MountImage, &[0]);
    assert_eq!(reply.status.code, 1);
    assert_eq!(device.command_state(), CommandState::Idle);
}

#[test]
fn test_mount_all_stops_at_first_failure() {
    let (platform, mut device) = sd_platform();
    assert_ok(&basic(&mut device, "SETDRIVEFILENAME:0,0,1,/games/elite.d64"));
    assert_ok(&basic(&mut device, "SETDRIVEFILENAME:1,0,1,/games/missing.d64"));
    assert_ok(&basic(&mut device, "SETDRIVEFILENAME:2,0,1,/games/zork.d81"));

    let reply = raw(&mut device, Opcode::MountAll);
    assert_eq!(reply.status.code, 4);
    assert_eq!(reply.status.message, "no file handle");
    assert_eq!(device.command_state(), CommandState::Idle);

    // Slot 0 stays mounted, slot 2 was never reached
    assert!(platform.drives.inserted(0).is_some());
    assert!(platform.drives.inserted(1).is_none());
    assert!(platform.drives.inserted(2).is_none());
    assert!(!device.boot_config());
}

#[test]
fn test_mount_all_without_media_clears_boot_config() {
    let (_platform, mut device) = sd_platform();
    assert!(device.boot_config());
    let reply = basic(&mut device, "MOUNTALL");
    assert_ok(&reply);
    assert_eq!(reply.data, b"ok");
    assert!(!device.boot_config());
}

#[test]
fn test_empty_filename_invalidates_host_and_is_skipped() {
    let (platform, mut device) = sd_platform();
    assert_ok(&basic(&mut device, "SETDRIVEFILENAME:0,0,1,/games/elite.d64"));
    assert_ok(&basic(&mut device, "SETDRIVEFILENAME:1,0,1,"));
    assert_eq!(device.slots().disk(1).unwrap().host_slot(), None);

    // Same through RAW, with no name bytes at all
    assert_ok(&raw_with(&mut device, Opcode::SetDeviceFullpath, &[2, 0, 1]));
    assert_eq!(device.slots().disk(2).unwrap().host_slot(), None);

    assert_ok(&raw(&mut device, Opcode::MountAll));
    assert!(platform.drives.inserted(0).is_some());
    assert!(platform.drives.inserted(1).is_none());
    assert!(platform.drives.inserted(2).is_none());
}

#[test]
fn test_open_directory_replaces_previous_cursor() {
    let platform = DummyPlatform::new();
    platform
        .hosts
        .add_file("SD", "/alpha.d64", 10)
        .add_file("tnfs.local", "/beta.d64", 10);
    let mut device = platform.device();
    assert_ok(&basic(&mut device, "PUTHOST:0,SD"));
    assert_ok(&basic(&mut device, "PUTHOST:1,tnfs.local"));
    assert_ok(&basic(&mut device, "MOUNTHOST:0"));
    assert_ok(&basic(&mut device, "MOUNTHOST:1"));

    assert_ok(&basic(&mut device, "OPENDIR:0,/"));
    assert_eq!(device.directory().open_on(), Some(0));
    assert_ok(&basic(&mut device, "OPENDIR:1,/"));
    assert_eq!(device.directory().open_on(), Some(1));

    let reply = basic(&mut device, "READDIR:32");
    assert_ok(&reply);
    assert_eq!(reply.data, b"beta.d64");
}

#[test]
fn test_open_directory_failure_leaves_cursor_closed() {
    let (_platform, mut device) = sd_platform();
    assert_ok(&basic(&mut device, "MOUNTHOST:0"));
    let reply = basic(&mut device, "OPENDIR:0,/nope");
    assert_eq!(reply.status.code, 4);
    assert_eq!(device.directory().open_on(), None);

    let reply = basic(&mut device, "OPENDIR:9,/");
    assert_eq!(reply.status.code, 2);
}

#[test]
fn test_directory_exhaustion_sentinel() {
    let (_platform, mut device) = sd_platform();
    assert_ok(&raw_with(&mut device, Opcode::MountHost, &[0]));
    assert_ok(&raw_with(&mut device, Opcode::OpenDirectory, b"\x00/games"));

    let names: Vec<Vec<u8>> = (0..3)
        .map(|_| raw_with(&mut device, Opcode::ReadDirEntry, &[32, 0]).data)
        .collect();
    assert_eq!(names, [b"demos/".to_vec(), b"elite.d64".to_vec(), b"zork.d81".to_vec()]);

    for _ in 0..3 {
        let reply = raw_with(&mut device, Opcode::ReadDirEntry, &[32, 0]);
        assert_ok(&reply);
        assert_eq!(reply.data, DIR_END_SENTINEL);
    }
    assert_eq!(device.directory().open_on(), Some(0));

    // Seeking back rewinds past the end marker
    assert_eq!(raw(&mut device, Opcode::GetDirectoryPosition).data, [3, 0]);
    assert_ok(&raw_with(&mut device, Opcode::SetDirectoryPosition, &[1, 0]));
    let reply = raw_with(&mut device, Opcode::ReadDirEntry, &[32, 0]);
    assert_eq!(reply.data, b"elite.d64");

    assert_ok(&raw(&mut device, Opcode::CloseDirectory));
    assert_ok(&raw(&mut device, Opcode::CloseDirectory));
    let reply = raw_with(&mut device, Opcode::ReadDirEntry, &[32, 0]);
    assert_eq!(reply.status.code, 3);
    assert_eq!(reply.status.message, "no currently open directory");
}

#[test]
fn test_raw_and_basic_open_directory_agree() {
    let (_p1, mut raw_device) = sd_platform();
    let (_p2, mut basic_device) = sd_platform();
    assert_ok(&basic(&mut raw_device, "MOUNTHOST:0"));
    assert_ok(&basic(&mut basic_device, "MOUNTHOST:0"));

    assert_ok(&raw_with(&mut raw_device, Opcode::OpenDirectory, b"\x00/games\x00*.d64"));
    assert_ok(&basic(&mut basic_device, "OPENDIR:0,/games/~*.d64"));
    assert_eq!(raw_device.directory().open_on(), basic_device.directory().open_on());

    for _ in 0..3 {
        let from_raw = raw_with(&mut raw_device, Opcode::ReadDirEntry, &[32, 0]).data;
        let from_basic = basic(&mut basic_device, "READDIR:32,0").data;
        assert_eq!(from_raw, from_basic);
    }
}

#[test]
fn test_extended_directory_entry() {
    let platform = DummyPlatform::new();
    // 2024-03-05 14:30:15 UTC
    platform
        .hosts
        .add_file_at("SD", "/elite.d64", 174_848, 1_709_649_015);
    let mut device = platform.device();
    assert_ok(&basic(&mut device, "PUTHOST:0,SD"));
    assert_ok(&basic(&mut device, "MOUNTHOST:0"));
    assert_ok(&basic(&mut device, "OPENDIR:0,/"));

    let reply = basic(&mut device, "READDIR:40,128");
    assert_ok(&reply);
    assert_eq!(&reply.data[..10], &[124, 3, 5, 14, 30, 15, 0xFF, 0xFF, 0, 1]);
    assert_eq!(&reply.data[10..], b"elite.d64");
}

#[test]
fn test_directory_position_requires_open_cursor() {
    let (_platform, mut device) = sd_platform();
    let reply = basic(&mut device, "GETDIRPOS");
    assert_eq!(reply.status.code, 3);
    let reply = raw(&mut device, Opcode::GetDirectoryPosition);
    assert_eq!(reply.status.code, 3);
    assert!(reply.data.is_empty());
}

#[test]
fn test_write_app_key_requires_write_session() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();

    let reply = raw_with(&mut device, Opcode::WriteAppKey, b"secret");
    assert_eq!(reply.status.code, 1);
    assert_eq!(platform.sd.file_count(), 0);

    // A read session is not enough either
    assert_ok(&raw_with(&mut device, Opcode::OpenAppKey, &[0x34, 0x12, 1, 2, 0, 0]));
    let reply = raw_with(&mut device, Opcode::WriteAppKey, b"secret");
    assert_eq!(reply.status.code, 1);
    assert_eq!(platform.sd.file_count(), 0);
}

#[test]
fn test_app_key_roundtrip() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();

    assert_ok(&raw_with(&mut device, Opcode::OpenAppKey, &[0x34, 0x12, 1, 2, 1, 0]));
    assert_ok(&raw_with(&mut device, Opcode::WriteAppKey, b"hello"));
    assert_eq!(platform.sd.file("/FujiNet/12340102.key"), Some(b"hello".to_vec()));

    // The write consumed the session
    assert_eq!(device.app_key().current().creator, 0);
    let reply = raw_with(&mut device, Opcode::WriteAppKey, b"again");
    assert_eq!(reply.status.code, 1);
    assert_eq!(platform.sd.file("/FujiNet/12340102.key"), Some(b"hello".to_vec()));

    assert_ok(&basic(&mut device, "OPENAPPKEY:1234,01,02,0"));
    let reply = raw(&mut device, Opcode::ReadAppKey);
    assert_ok(&reply);
    assert_eq!(reply.data, b"hello");
    let reply = basic(&mut device, "READAPPKEY");
    assert_eq!(reply.data, b"hello");

    assert_ok(&raw(&mut device, Opcode::CloseAppKey));
    assert_eq!(raw(&mut device, Opcode::ReadAppKey).status.code, 1);
}

#[test]
fn test_basic_write_app_key_respects_length() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();
    assert_ok(&basic(&mut device, "OPENAPPKEY:0xBEEF,1,1,1"));
    let reply = basic(&mut device, "WRITEAPPKEY:3,hello");
    assert_ok(&reply);
    assert_eq!(platform.sd.file("/FujiNet/beef0101.key"), Some(b"hel".to_vec()));
}

#[test]
fn test_basic_write_app_key_keeps_commas() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();
    assert_ok(&basic(&mut device, "OPENAPPKEY:0xBEEF,1,1,1"));
    assert_ok(&basic(&mut device, "WRITEAPPKEY:11,hi,there,x"));
    assert_eq!(
        platform.sd.file("/FujiNet/beef0101.key"),
        Some(b"hi,there,x".to_vec())
    );
}

#[test]
fn test_app_key_needs_sd_card() {
    let platform = DummyPlatform::new();
    platform.sd.set_inserted(false);
    let mut device = platform.device();
    assert_ok(&raw_with(&mut device, Opcode::OpenAppKey, &[0x34, 0x12, 1, 2, 1, 0]));
    let reply = raw_with(&mut device, Opcode::WriteAppKey, b"hello");
    assert_eq!(reply.status.code, 3);
    assert_eq!(reply.status.message, "sd card not mounted");
    assert_eq!(platform.sd.file_count(), 0);
}

#[test]
fn test_short_app_key_write_is_an_io_error() {
    let platform = DummyPlatform::new();
    platform.sd.limit_writes(2);
    let mut device = platform.device();
    assert_ok(&raw_with(&mut device, Opcode::OpenAppKey, &[1, 0, 1, 1, 1, 0]));
    let reply = raw_with(&mut device, Opcode::WriteAppKey, b"hello");
    assert_eq!(reply.status.code, 4);
    assert_eq!(reply.status.message, "only wrote 2 bytes of expected 5");
}

#[test]
fn test_hash_md5_abc() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();

    assert_ok(&raw(&mut device, Opcode::HashClear));
    assert_ok(&raw_with(&mut device, Opcode::HashInput, b"abc"));
    assert_ok(&raw_with(&mut device, Opcode::HashComputeNoClear, &[0]));

    let reply = raw_with(&mut device, Opcode::HashOutput, &[1]);
    assert_ok(&reply);
    assert_eq!(reply.data, b"900150983cd24fb0d6963f7d28e17f72");
    assert_eq!(raw_with(&mut device, Opcode::HashLength, &[1]).data, [32]);
    assert_eq!(raw_with(&mut device, Opcode::HashLength, &[0]).data, [16]);

    // Computing again without clearing digests the same input
    assert_ok(&raw_with(&mut device, Opcode::HashComputeNoClear, &[0]));
    assert_eq!(device.hash().pending_input(), b"abc");
    let reply = raw_with(&mut device, Opcode::HashOutput, &[1]);
    assert_eq!(reply.data, b"900150983cd24fb0d6963f7d28e17f72");

    // The clearing variant drops the input
    assert_ok(&raw_with(&mut device, Opcode::HashCompute, &[2]));
    assert!(device.hash().pending_input().is_empty());
    assert_eq!(raw_with(&mut device, Opcode::HashOutput, &[0]).data.len(), 32);
}

#[test]
fn test_hash_bad_parameters() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();
    let reply = raw_with(&mut device, Opcode::HashCompute, &[9]);
    assert_eq!(reply.status.code, 1);
    let reply = raw_with(&mut device, Opcode::HashOutput, &[1, 1]);
    assert_eq!(reply.status.code, 1);
    assert_eq!(reply.status.message, "input should be 1 byte");
    let reply = raw_with(&mut device, Opcode::HashLength, &[1, 0]);
    assert_eq!(reply.status.code, 1);
    assert_eq!(reply.status.message, "input should be 1 byte");
}

#[test]
fn test_hash_hex_flag_is_exactly_one() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();
    assert_ok(&raw_with(&mut device, Opcode::HashInput, b"abc"));
    assert_ok(&raw_with(&mut device, Opcode::HashComputeNoClear, &[0]));

    // Any flag other than 1 selects the binary digest
    assert_eq!(raw_with(&mut device, Opcode::HashLength, &[2]).data, [16]);
    assert_eq!(raw_with(&mut device, Opcode::HashOutput, &[2]).data.len(), 16);
    assert_eq!(raw_with(&mut device, Opcode::HashLength, &[1]).data, [32]);
}

#[test]
fn test_keyword_precedence() {
    let (platform, mut device) = sd_platform();
    let reply = basic(&mut device, "MOUNTHOST:0");
    assert_eq!(reply.data, b"SD MOUNTED.");
    assert!(platform.hosts.is_mounted("SD"));

    // Lowercase and comma separated forms reach the same handler
    assert_ok(&basic(&mut device, "unmounthost,0"));
    assert!(!platform.hosts.is_mounted("SD"));
    assert_ok(&basic(&mut device, "mounthost:0\r\n"));
    assert!(platform.hosts.is_mounted("SD"));
}

#[test]
fn test_host_slot_blocks() {
    let (platform, mut device) = sd_platform();
    assert_ok(&basic(&mut device, "PUTHOST:1,tnfs.example.org"));

    let reply = raw(&mut device, Opcode::ReadHostSlots);
    assert_ok(&reply);
    assert_eq!(reply.data.len(), HOST_BLOCK_LEN);
    assert_eq!(&reply.data[..3], b"SD\0");
    assert_eq!(&reply.data[32..48], b"tnfs.example.org");

    assert_eq!(basic(&mut device, "GETHOST:1").data, b"tnfs.example.org");
    assert_eq!(basic(&mut device, "FLH:5").data, b"<empty>");

    let stored = platform.config.stored().unwrap();
    assert_eq!(stored.hosts[1].name, "tnfs.example.org");

    // Clearing a slot
    assert_ok(&basic(&mut device, "FHOST:1"));
    assert_eq!(basic(&mut device, "GETHOST:1").data, b"<empty>");
}

#[test]
fn test_raw_write_host_slots_rejects_open_frame() {
    let (_platform, mut device) = sd_platform();
    let reply = raw(&mut device, Opcode::WriteHostSlots);
    assert_eq!(reply.status.code, 1);
    assert_eq!(reply.status.message, "payload size incorrect");
    assert_eq!(device.command_state(), CommandState::Idle);
    assert_eq!(device.slots().host(0).unwrap().hostname(), "SD");
}

#[test]
fn test_device_slot_blocks() {
    let (platform, mut device) = sd_platform();
    let mut block = Vec::new();
    for i in 0..8 {
        let mut record = [0u8; 38];
        if i == 0 {
            record[0] = 0;
            record[1] = 1;
            record[2..18].copy_from_slice(b"/games/elite.d64");
        } else {
            record[0] = 0xFF;
            record[1] = 1;
        }
        block.extend_from_slice(&record);
    }
    assert_eq!(block.len(), DEVICE_BLOCK_LEN);

    assert_ok(&raw_with(&mut device, Opcode::WriteDeviceSlots, &block));
    assert_eq!(device.slots().disk(0).unwrap().filename(), "/games/elite.d64");
    assert_eq!(
        platform.config.stored().unwrap().mounts[0].path,
        "/games/elite.d64"
    );

    let reply = raw(&mut device, Opcode::ReadDeviceSlots);
    assert_eq!(reply.data, block);

    let reply = raw_with(&mut device, Opcode::WriteDeviceSlots, &block[..100]);
    assert_eq!(reply.status.code, 1);
}

#[test]
fn test_put_drive() {
    let (_platform, mut device) = sd_platform();
    assert_ok(&basic(&mut device, "PUTDRIVE:4,0,/games/zork.d81,2"));
    let disk = device.slots().disk(4).unwrap();
    assert_eq!(disk.host_slot(), Some(0));
    assert_eq!(disk.mode(), AccessMode::ReadWrite);
    assert_eq!(disk.filename(), "/games/zork.d81");

    let reply = basic(&mut device, "PUTDRIVE:4,0");
    assert_eq!(reply.status.code, 1);
    assert_eq!(reply.data, b"invalid # of parameters");
}

#[test]
fn test_settings_survive_restart() {
    let (platform, mut device) = sd_platform();
    assert_ok(&basic(&mut device, "SETDRIVEFILENAME:0,0,1,/games/elite.d64"));
    assert_ok(&raw_with(&mut device, Opcode::ConfigBoot, &[0]));
    drop(device);

    let device = platform.device();
    assert_eq!(device.slots().host(0).unwrap().hostname(), "SD");
    assert_eq!(device.slots().disk(0).unwrap().filename(), "/games/elite.d64");
    assert!(!device.boot_config());
}

#[test]
fn test_unreadable_settings_fall_back_to_defaults() {
    let platform = DummyPlatform::new();
    platform.config.fail_load();
    let device = platform.device();
    assert_eq!(device.settings(), &Settings::default());
}

#[test]
fn test_status_persists_and_raw_status_does_not_overwrite() {
    let (_platform, mut device) = sd_platform();
    let reply = basic(&mut device, "MOUNTHOST:9");
    assert_eq!(reply.status.code, 2);
    assert_eq!(reply.data, b"invalid host slot 9");

    let reply = raw(&mut device, Opcode::Status);
    assert_eq!(&reply.data[..3], &[2, 0, 15]);
    assert_eq!(&reply.data[3..], b"invalid host slot 9");
    assert_eq!(reply.status.code, 2);

    let reply = basic(&mut device, "FUJISTATUS");
    assert_eq!(reply.data, b"err=2,conn=0,chan=15,msg=invalid host slot 9");
    assert_eq!(reply.status.code, 0);
    assert_eq!(reply.status.message, "err=2,conn=0,chan=15,msg=invalid host slot 9");
}

#[test]
fn test_unsupported_raw_opcode() {
    let (_platform, mut device) = sd_platform();
    let reply = device.process_frame(&[RAW_MARKER, 0x42]);
    assert_eq!(reply.format, WireFormat::Raw);
    assert_eq!(reply.status.code, 5);
    assert!(reply.data.is_empty());
    assert_eq!(device.command_state(), CommandState::Idle);
}

#[test]
fn test_unknown_basic_and_empty_frames_change_nothing() {
    let (_platform, mut device) = sd_platform();
    let before = device.status().clone();
    let reply = basic(&mut device, "FORMAT:0");
    assert!(reply.data.is_empty());
    assert_eq!(reply.status, before);

    let reply = device.process_frame(&[]);
    assert!(reply.data.is_empty());
    assert_eq!(device.command_state(), CommandState::Idle);
}

#[test]
fn test_pending_command_waits_until_bus_reset() {
    let (_platform, mut device) = sd_platform();
    raw(&mut device, Opcode::MountHost);
    assert_eq!(
        device.command_state(),
        CommandState::AwaitingContinuation(Opcode::MountHost)
    );
    device.process_frame(&[]);
    assert_eq!(
        device.command_state(),
        CommandState::AwaitingContinuation(Opcode::MountHost)
    );

    device.bus_reset();
    assert_eq!(device.command_state(), CommandState::Idle);
}

#[test]
fn test_bus_reset_clears_sessions() {
    let (_platform, mut device) = sd_platform();
    assert_ok(&basic(&mut device, "MOUNTHOST:0"));
    assert_ok(&basic(&mut device, "OPENDIR:0,/games"));
    assert_ok(&basic(&mut device, "OPENAPPKEY:1234,1,2,1"));

    device.bus_reset();
    assert_eq!(device.directory().open_on(), None);
    assert_eq!(device.app_key().current().creator, 0);
    // The host itself stays mounted
    assert!(device.slots().host(0).unwrap().is_mounted());
}

#[test]
fn test_raw_output_is_not_sent_to_basic_callers() {
    let (_platform, mut device) = sd_platform();
    // BASIC GETSSID answers in text; the RAW form answers in binary
    let reply = basic(&mut device, "GETSSID");
    assert_eq!(reply.format, WireFormat::Basic);
    assert!(reply.data.is_empty());

    let reply = raw(&mut device, Opcode::GetSsid);
    assert_eq!(reply.format, WireFormat::Raw);
    assert_eq!(reply.data.len(), 33 + 64);
}

#[test]
fn test_scan_networks() {
    let platform = DummyPlatform::new();
    platform.network.add_access_point("retro", "commodore", -40);
    let mut device = platform.device();

    let reply = basic(&mut device, "SCAN");
    assert_eq!(reply.data, b"1");
    assert_eq!(platform.system.delays(), [5000]);

    assert_eq!(basic(&mut device, "SCANRESULT:0").data, b"-40,\"retro\"");

    assert_eq!(raw(&mut device, Opcode::ScanNetworks).data, [1]);
    let reply = raw_with(&mut device, Opcode::GetScanResult, &[0]);
    assert_eq!(reply.data.len(), 34);
    assert_eq!(&reply.data[..6], b"retro\0");
    assert_eq!(reply.data[33], (-40i8) as u8);

    let reply = raw_with(&mut device, Opcode::GetScanResult, &[7]);
    assert_eq!(reply.data, [0u8; 34]);
}

#[test]
fn test_set_ssid_raw() {
    let platform = DummyPlatform::new();
    platform.network.add_access_point("retro", "commodore", -40);
    let mut device = platform.device();

    let reply = raw_with(&mut device, Opcode::SetSsid, b"retro\0commodore\0");
    assert_ok(&reply);
    assert!(reply.status.connected);
    assert_eq!(platform.config.stored().unwrap().wifi.ssid, "retro");
    assert_eq!(platform.network.restarts().len(), 1);
    assert_eq!(platform.system.delays(), [4000]);

    let reply = raw(&mut device, Opcode::GetSsid);
    assert_eq!(&reply.data[..6], b"retro\0");
    assert_eq!(&reply.data[33..43], b"commodore\0");
}

#[test]
fn test_set_ssid_wrong_password_still_restarts() {
    let platform = DummyPlatform::new();
    platform.network.add_access_point("retro", "commodore", -40);
    let mut device = platform.device();

    let reply = basic(&mut device, "SETSSID:retro,amiga");
    assert_eq!(reply.status.code, 207);
    assert_eq!(reply.data, b"not connected");
    assert_eq!(device.settings().wifi.ssid, "");
    assert_eq!(platform.network.restarts().len(), 1);
    assert_eq!(platform.system.delays(), [4000]);
}

#[test]
fn test_set_ssid_basic_decodes_and_resolves_crc() {
    let platform = DummyPlatform::new();
    platform.network.add_access_point("my net", "pa+ss", -50);
    let mut device = platform.device();

    let reply = basic(&mut device, "SETSSID:my%20net,pa+ss");
    assert_ok(&reply);
    assert_eq!(reply.status.message, "ssid set");

    basic(&mut device, "SCAN");
    let line = format!("SETSSID:{},pa+ss", crc8(b"my net"));
    assert_ok(&basic(&mut device, &line));
    assert_eq!(device.settings().wifi.ssid, "my net");

    let reply = basic(&mut device, "SETSSID:onlyone");
    assert_eq!(reply.status.code, 1);
}

#[test]
fn test_wifi_flags_and_status() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();

    assert_eq!(raw(&mut device, Opcode::GetWifiStatus).data, [6]);
    assert_eq!(basic(&mut device, "WIFISTATUS").data, b"disconnected");
    platform.network.set_connected(true);
    assert_eq!(raw(&mut device, Opcode::GetWifiStatus).data, [3]);

    assert_eq!(raw(&mut device, Opcode::GetWifiEnabled).data, [1]);
    assert_ok(&basic(&mut device, "WIFIDISABLE"));
    assert_eq!(raw(&mut device, Opcode::GetWifiEnabled).data, [0]);
    assert!(!platform.config.stored().unwrap().wifi.enabled);
    assert_ok(&basic(&mut device, "WIFIENABLE"));
    assert!(platform.config.stored().unwrap().wifi.enabled);
}

#[test]
fn test_adapter_config() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();

    let reply = raw(&mut device, Opcode::GetAdapterConfig);
    assert_eq!(reply.data.len(), ADAPTER_CONFIG_LEN);
    assert_eq!(&reply.data[..14], b"NOT CONNECTED\0");
    assert_eq!(&reply.data[33..47], b"NOT CONNECTED\0");

    platform.network.set_connected(true);
    platform.network.set_info(NetInfo {
        hostname: "fujinet".into(),
        ssid: "retro".into(),
        ip: [192, 168, 1, 64],
        ..Default::default()
    });
    let reply = raw(&mut device, Opcode::GetAdapterConfig);
    assert_eq!(&reply.data[..6], b"retro\0");
    assert_eq!(&reply.data[97..101], &[192, 168, 1, 64]);
    assert_eq!(&reply.data[125..131], b"dummy-");

    let reply = raw(&mut device, Opcode::GetAdapterConfigExtended);
    assert_eq!(reply.data.len(), ADAPTER_CONFIG_EXTENDED_LEN);
    assert_eq!(&reply.data[ADAPTER_CONFIG_LEN..ADAPTER_CONFIG_LEN + 13], b"192.168.1.64\0");

    let reply = basic(&mut device, "LOCALIP");
    assert_ok(&reply);
    assert_eq!(reply.status.message, "192.168.1.64");

    let reply = basic(&mut device, "ADAPTERCONFIG");
    assert!(reply.data.starts_with(b"use localip"));
}

#[test]
fn test_boot_settings() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();

    assert_ok(&raw_with(&mut device, Opcode::ConfigBoot, &[0]));
    assert!(!device.boot_config());
    assert_ok(&raw_with(&mut device, Opcode::SetBootMode, &[2]));
    assert!(device.boot_config());
    assert_eq!(device.boot_device(), 2);

    let stored = platform.config.stored().unwrap();
    assert!(stored.boot_config);
    assert_eq!(stored.boot_device, 2);

    assert_ok(&basic(&mut device, "BOOTCONFIG:0"));
    assert!(!device.boot_config());
    assert_eq!(basic(&mut device, "BOOTCONFIG:x").status.code, 1);
}

#[test]
fn test_enable_and_disable_devices() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();

    assert_ok(&basic(&mut device, "DISABLE:9,10"));
    assert!(!platform.drives.is_active(9));
    assert!(!platform.drives.is_active(10));
    assert!(platform.drives.is_active(8));
    assert!(!platform.config.stored().unwrap().device_enabled(9));

    assert_ok(&raw_with(&mut device, Opcode::EnableDevice, &[10]));
    assert!(platform.drives.is_active(10));

    // Flags are applied again on start-up
    let mut restarted = platform.clone();
    restarted.drives = DummyDrives::new();
    let _device = restarted.device();
    assert!(!restarted.drives.is_active(9));
    assert!(restarted.drives.is_active(10));
}

#[test]
fn test_every_pending_opcode_ends_with_its_data_frame() {
    for byte in 0..=u8::MAX {
        let Some(op) = Opcode::from_byte(byte) else {
            continue;
        };
        if op.is_immediate() {
            continue;
        }
        let (_platform, mut device) = sd_platform();
        let reply = raw_with(&mut device, op, &[0xFF]);
        assert_eq!(reply.format, WireFormat::Raw);
        assert_eq!(device.command_state(), CommandState::Idle, "{} stayed pending", op.name());
    }
}

#[test]
fn test_parameters_never_select_a_command() {
    let (platform, mut device) = sd_platform();
    assert_ok(&basic(&mut device, "PUTHOST:1,reset"));
    assert_eq!(device.slots().host(1).unwrap().hostname(), "reset");
    assert_eq!(platform.system.reboots(), 0);
    assert_eq!(basic(&mut device, "GETHOST:1").data, b"reset");
}

#[test]
fn test_reset_reboots() {
    let platform = DummyPlatform::new();
    let mut device = platform.device();
    assert_ok(&raw(&mut device, Opcode::Reset));
    basic(&mut device, "RESET");
    assert_eq!(platform.system.reboots(), 2);
}
