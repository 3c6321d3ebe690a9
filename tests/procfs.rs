//! Counter Reader parsing tests against synthetic pseudo-file content.

use std::fs;

use twintop::procfs::{
    parse_cpu_lines, parse_diskstats, parse_loadavg, parse_meminfo, parse_mounts, parse_net_dev,
    parse_uptime, read_temps,
};

#[test]
fn cpu_lines_stop_at_first_non_cpu_line() {
    let stat = "\
cpu  100 0 50 800 20 0 5 0 0 0
cpu0 50 0 25 400 10 0 2 0 0 0
cpu1 50 0 25 400 10 0 3 0 0 0
intr 123456 0 0
ctxt 99999
";
    let lines = parse_cpu_lines(stat);
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].0, "cpu");
    assert_eq!(lines[0].1, vec![100, 0, 50, 800, 20, 0, 5, 0, 0, 0]);
    assert_eq!(lines[2].0, "cpu1");
}

#[test]
fn cpu_line_with_bad_counter_is_skipped() {
    let stat = "cpu  1 2 3 4 5 6 7 8 9 10\ncpu0 1 2 x 4 5 6 7 8 9 10\ncpu1 2 2 2 2 2 2 2 2 2 2\n";
    let lines = parse_cpu_lines(stat);
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[1].0, "cpu1");
}

#[test]
fn meminfo_fields_are_kilobytes() {
    let meminfo = "\
MemTotal:        8000000 kB
MemFree:          500000 kB
MemAvailable:    3000000 kB
SwapTotal:       2000000 kB
Hugepagesize:       2048 kB
BrokenLine without colon
Weird:          notanumber kB
";
    let info = parse_meminfo(meminfo);
    assert_eq!(info.get("MemTotal"), Some(&8_000_000));
    assert_eq!(info.get("MemAvailable"), Some(&3_000_000));
    assert_eq!(info.get("Hugepagesize"), Some(&2048));
    assert!(!info.contains_key("Weird"));
    assert_eq!(info.len(), 5);
}

#[test]
fn loadavg_takes_first_three_tokens() {
    assert_eq!(
        parse_loadavg("0.52 0.58 0.59 1/189 10345\n"),
        Some(["0.52".into(), "0.58".into(), "0.59".into()])
    );
    assert_eq!(parse_loadavg("0.52 0.58\n"), None);
}

#[test]
fn uptime_takes_first_token_as_seconds() {
    assert_eq!(parse_uptime("12345.67 98010.55\n"), Some(12345.67));
    assert_eq!(parse_uptime("garbage\n"), None);
}

#[test]
fn net_dev_skips_headers_and_short_lines() {
    let net = "\
Inter-|   Receive                                                |  Transmit
 face |bytes    packets errs drop fifo frame compressed multicast|bytes    packets errs drop fifo colls carrier compressed
    lo: 1234 10 0 0 0 0 0 0 5678 10 0 0 0 0 0 0
  eth0: 100 2 0 0 0 0 0 0 200 2 0 0 0 0 0 0
  bad0: 1 2 3
";
    let data = parse_net_dev(net);
    assert_eq!(data.len(), 2);
    assert_eq!(data.get("lo"), Some(&(1234, 5678)));
    assert_eq!(data.get("eth0"), Some(&(100, 200)));
    assert!(!data.contains_key("bad0"));
}

#[test]
fn diskstats_keeps_only_storage_devices() {
    let stats = "\
   8       0 sda 1000 0 2000 0 500 0 3000 0 0 0 0
   8       1 sda1 100 0 200 0 50 0 300 0 0 0 0
   7       0 loop0 10 0 20 0 5 0 30 0 0 0 0
 259       0 nvme0n1 400 0 800 0 100 0 1600 0 0 0 0
 179       0 mmcblk0 1 0 2 0 1 0 4 0 0 0 0
   1       0 ram0 1 2 3
";
    let stats = parse_diskstats(stats);
    assert_eq!(stats.get("sda"), Some(&(2000, 3000)));
    assert_eq!(stats.get("sda1"), Some(&(200, 300)));
    assert_eq!(stats.get("nvme0n1"), Some(&(800, 1600)));
    assert_eq!(stats.get("mmcblk0"), Some(&(2, 4)));
    assert!(!stats.contains_key("loop0"));
    assert!(!stats.contains_key("ram0"));
}

#[test]
fn mounts_deduplicate_and_sort_and_drop_pseudo_fs() {
    let mounts = "\
/dev/sda2 /home ext4 rw 0 0
proc /proc proc rw 0 0
tmpfs /run tmpfs rw 0 0
/dev/sda1 / ext4 rw 0 0
/dev/sdb1 /home btrfs rw 0 0
overlay /var/lib/docker overlay rw 0 0
short line
";
    let mounts = parse_mounts(mounts);
    assert_eq!(
        mounts,
        vec![
            ("/".to_string(), "ext4".to_string()),
            ("/home".to_string(), "ext4".to_string()),
        ]
    );
}

#[test]
fn thermal_zones_win_over_hwmon() {
    let dir = tempfile::tempdir().unwrap();
    let thermal = dir.path().join("thermal");
    let hwmon = dir.path().join("hwmon");
    fs::create_dir_all(thermal.join("thermal_zone0")).unwrap();
    fs::create_dir_all(thermal.join("thermal_zone1")).unwrap();
    fs::create_dir_all(thermal.join("cooling_device0")).unwrap();
    fs::create_dir_all(hwmon.join("hwmon0")).unwrap();
    fs::write(thermal.join("thermal_zone0/temp"), "48123\n").unwrap();
    fs::write(thermal.join("thermal_zone1/temp"), "55\n").unwrap();
    fs::write(thermal.join("cooling_device0/temp"), "99000\n").unwrap();
    fs::write(hwmon.join("hwmon0/temp1_input"), "42000\n").unwrap();

    let temps = read_temps(&thermal, &hwmon);
    assert_eq!(temps, vec![48.123, 55.0]);
}

#[test]
fn hwmon_is_the_fallback_and_garbage_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let thermal = dir.path().join("thermal");
    let hwmon = dir.path().join("hwmon");
    fs::create_dir_all(&thermal).unwrap();
    fs::create_dir_all(hwmon.join("hwmon0")).unwrap();
    fs::write(hwmon.join("hwmon0/temp1_input"), "42000\n").unwrap();
    fs::write(hwmon.join("hwmon0/temp2_input"), "not a number\n").unwrap();
    fs::write(hwmon.join("hwmon0/fan1_input"), "1200\n").unwrap();

    let temps = read_temps(&thermal, &hwmon);
    assert_eq!(temps, vec![42.0]);
}

#[test]
fn missing_sensor_directories_yield_no_temps() {
    let dir = tempfile::tempdir().unwrap();
    let temps = read_temps(&dir.path().join("nope"), &dir.path().join("also-nope"));
    assert!(temps.is_empty());
}
