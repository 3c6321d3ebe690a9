//! Raw snapshot types that mirror the remote probe's JSON schema.
//!
//! The wire format encodes rows as JSON arrays, so the row types here are
//! tuples; missing keys deserialize to typed defaults rather than failing.

use std::collections::BTreeMap;

use serde::Deserialize;

/// One `/proc/stat` line: label ("cpu", "cpu0", ...) and its tick counters.
pub type CpuLine = (String, Vec<u64>);

/// One process row: (pid, command, cpu%, mem%), all as printed by `ps`.
pub type ProcRow = (String, String, String, String);

/// One mount table entry: (mount point, filesystem type).
pub type MountEntry = (String, String);

/// Space usage for one mount: (mount point, fstype, total bytes, used bytes).
pub type DiskUsage = (String, String, u64, u64);

/// One point-in-time set of raw counter readings from a host.
///
/// Counters are cumulative; rates come from diffing two snapshots. The
/// `BTreeMap` keys keep interfaces and devices in lexicographic order, which
/// is the order the panel shows them in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawSnapshot {
    #[serde(default)]
    pub cpu_lines: Vec<CpuLine>,
    /// `/proc/meminfo` field name -> value in kilobytes.
    #[serde(default)]
    pub meminfo: BTreeMap<String, u64>,
    /// The first three tokens of `/proc/loadavg`, kept as printed.
    #[serde(default)]
    pub loadavg: Vec<String>,
    #[serde(default)]
    pub uptime: f64,
    /// Interface -> cumulative (rx bytes, tx bytes).
    #[serde(default)]
    pub net_bytes: BTreeMap<String, (u64, u64)>,
    /// Device -> cumulative (read sectors, written sectors).
    #[serde(default)]
    pub diskstats: BTreeMap<String, (u64, u64)>,
    /// Real mounts only, deduplicated by path and sorted by path.
    #[serde(default)]
    pub mounts: Vec<MountEntry>,
    #[serde(default)]
    pub temps: Vec<f64>,
    #[serde(default)]
    pub top_cpu: Vec<ProcRow>,
    #[serde(default)]
    pub top_mem: Vec<ProcRow>,
    /// Computed inline with enumeration (one pass per snapshot) so the
    /// metrics engine never has to touch the filesystem itself.
    #[serde(default)]
    pub disk_usage: Option<Vec<DiskUsage>>,
}
