//! Counter Reader: parsers for the kernel pseudo-files the sampler consumes.
//!
//! Each parser is a pure function over the file's text so it can be tested
//! without a live `/proc`; the path-based wrappers live in the sampler. A
//! malformed line is skipped, never fatal, and a missing source degrades to
//! an empty value at the call site.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::snapshot::{CpuLine, MountEntry};

pub const PROC_STAT: &str = "/proc/stat";
pub const PROC_MEMINFO: &str = "/proc/meminfo";
pub const PROC_LOADAVG: &str = "/proc/loadavg";
pub const PROC_UPTIME: &str = "/proc/uptime";
pub const PROC_NET_DEV: &str = "/proc/net/dev";
pub const PROC_DISKSTATS: &str = "/proc/diskstats";
pub const PROC_MOUNTS: &str = "/proc/mounts";
pub const SYS_THERMAL: &str = "/sys/class/thermal";
pub const SYS_HWMON: &str = "/sys/class/hwmon";

/// Virtual/pseudo filesystem types excluded from the mount list.
const SKIP_FS: &[&str] = &[
    "proc",
    "sysfs",
    "tmpfs",
    "devtmpfs",
    "devpts",
    "overlay",
    "squashfs",
    "cgroup",
    "cgroup2",
    "pstore",
    "debugfs",
    "tracefs",
    "securityfs",
    "mqueue",
    "hugetlbfs",
    "configfs",
    "fusectl",
];

/// Block devices worth reporting IO rates for.
const DISK_DEV_PREFIXES: &[&str] = &["sd", "nvme", "mmcblk"];

/// Parse the leading `cpu*` lines of `/proc/stat` into (label, ticks) pairs.
/// Stops at the first non-cpu line; a line with an unparseable counter is
/// skipped.
pub fn parse_cpu_lines(s: &str) -> Vec<CpuLine> {
    let mut lines = Vec::new();
    for line in s.lines() {
        if !line.starts_with("cpu") {
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(label) = parts.next() else { continue };
        let ticks: Option<Vec<u64>> = parts.map(|t| t.parse().ok()).collect();
        if let Some(ticks) = ticks {
            lines.push((label.to_string(), ticks));
        }
    }
    lines
}

/// Parse `/proc/meminfo` `Key: value kB` lines into field -> kilobytes.
pub fn parse_meminfo(s: &str) -> BTreeMap<String, u64> {
    let mut info = BTreeMap::new();
    for line in s.lines() {
        let Some((key, rest)) = line.split_once(':') else { continue };
        let Some(tok) = rest.split_whitespace().next() else { continue };
        if let Ok(val) = tok.parse::<u64>() {
            info.insert(key.trim().to_string(), val);
        }
    }
    info
}

/// First three whitespace-separated tokens of `/proc/loadavg`.
pub fn parse_loadavg(s: &str) -> Option<[String; 3]> {
    let mut it = s.split_whitespace().map(str::to_string);
    Some([it.next()?, it.next()?, it.next()?])
}

/// First token of `/proc/uptime`, as seconds.
pub fn parse_uptime(s: &str) -> Option<f64> {
    s.split_whitespace().next()?.parse().ok()
}

/// Parse `/proc/net/dev` into interface -> cumulative (rx, tx) bytes.
/// The first two lines are headers; rx is field 0 and tx is field 8 of the
/// body, and lines with fewer than 16 fields are skipped.
pub fn parse_net_dev(s: &str) -> BTreeMap<String, (u64, u64)> {
    let mut data = BTreeMap::new();
    for line in s.lines().skip(2) {
        let Some((iface, body)) = line.split_once(':') else { continue };
        let parts: Vec<&str> = body.split_whitespace().collect();
        if parts.len() < 16 {
            continue;
        }
        let (Ok(rx), Ok(tx)) = (parts[0].parse(), parts[8].parse()) else {
            continue;
        };
        data.insert(iface.trim().to_string(), (rx, tx));
    }
    data
}

/// Parse `/proc/diskstats` into device -> cumulative (read, write) sectors.
/// Only devices with a recognized storage prefix are kept.
pub fn parse_diskstats(s: &str) -> BTreeMap<String, (u64, u64)> {
    let mut stats = BTreeMap::new();
    for line in s.lines() {
        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < 10 {
            continue;
        }
        let name = parts[2];
        if !DISK_DEV_PREFIXES.iter().any(|p| name.starts_with(p)) {
            continue;
        }
        let (Ok(read), Ok(write)) = (parts[5].parse(), parts[9].parse()) else {
            continue;
        };
        stats.insert(name.to_string(), (read, write));
    }
    stats
}

/// Parse `/proc/mounts`, dropping pseudo filesystems, keeping the first
/// occurrence of each mount point, and sorting by mount path.
pub fn parse_mounts(s: &str) -> Vec<MountEntry> {
    let mut mounts: Vec<MountEntry> = Vec::new();
    for line in s.lines() {
        let mut parts = line.split_whitespace();
        let (Some(_dev), Some(mount), Some(fstype)) =
            (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };
        if SKIP_FS.contains(&fstype) {
            continue;
        }
        if mounts.iter().any(|(m, _)| m == mount) {
            continue;
        }
        mounts.push((mount.to_string(), fstype.to_string()));
    }
    mounts.sort_by(|a, b| a.0.cmp(&b.0));
    mounts
}

/// Read temperatures in Celsius, thermal zones first, hwmon as a fallback.
/// The first non-empty source wins; the two are never merged.
pub fn read_temps(thermal_dir: &Path, hwmon_dir: &Path) -> Vec<f64> {
    let mut temps = Vec::new();
    if let Ok(entries) = fs::read_dir(thermal_dir) {
        let mut zones: Vec<_> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| n.starts_with("thermal_zone"))
            })
            .collect();
        zones.sort();
        for zone in zones {
            if let Some(t) = read_temp_value(&zone.join("temp")) {
                temps.push(t);
            }
        }
    }
    if !temps.is_empty() {
        return temps;
    }
    collect_hwmon_temps(hwmon_dir, 2, &mut temps);
    temps
}

/// A raw integer above 1000 is millidegrees; otherwise whole degrees.
fn read_temp_value(path: &Path) -> Option<f64> {
    let raw = fs::read_to_string(path).ok()?;
    let val: i64 = raw.trim().parse().ok()?;
    if val > 1000 {
        Some(val as f64 / 1000.0)
    } else {
        Some(val as f64)
    }
}

/// Gather `temp*_input` readings under a hwmon hierarchy. Depth is bounded
/// because sysfs device links loop back on themselves.
fn collect_hwmon_temps(dir: &Path, depth: usize, out: &mut Vec<f64>) {
    let Ok(entries) = fs::read_dir(dir) else { return };
    let mut paths: Vec<_> = entries.flatten().map(|e| e.path()).collect();
    paths.sort();
    for path in paths {
        if path.is_dir() {
            if depth > 0 {
                collect_hwmon_temps(&path, depth - 1, out);
            }
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if name.starts_with("temp") && name.ends_with("_input") {
            if let Some(t) = read_temp_value(&path) {
                out.push(t);
            }
        }
    }
}
