//! Metrics Engine: turns a raw snapshot plus the previous sample into the
//! normalized values the panel renders. Pure function of (raw, prev, now);
//! no I/O and no state of its own.

use std::collections::BTreeMap;
use std::time::Instant;

use crate::snapshot::{CpuLine, DiskUsage, ProcRow, RawSnapshot};

/// Bytes per block-device sector in `/proc/diskstats`.
pub const SECTOR_BYTES: f64 = 512.0;

/// Floor for the elapsed interval so rates never divide by zero.
const MIN_ELAPSED_SECS: f64 = 0.001;

/// The slice of a snapshot carried across cycles for delta computation,
/// plus when it was taken. Owned by the render loop, one per host.
#[derive(Debug, Clone)]
pub struct PrevSample {
    cpu_lines: Vec<CpuLine>,
    net_bytes: BTreeMap<String, (u64, u64)>,
    diskstats: BTreeMap<String, (u64, u64)>,
    taken_at: Instant,
}

impl PrevSample {
    pub fn capture(raw: &RawSnapshot, taken_at: Instant) -> Self {
        Self {
            cpu_lines: raw.cpu_lines.clone(),
            net_bytes: raw.net_bytes.clone(),
            diskstats: raw.diskstats.clone(),
            taken_at,
        }
    }
}

/// Derived values for one host and one render cycle. Always fully defined:
/// missing inputs degrade to zero or empty, never an absent field.
#[derive(Debug, Clone, Default)]
pub struct HostMetrics {
    /// (label, usage %) per `/proc/stat` line, aggregate first.
    pub cpu_pcts: Vec<(String, f64)>,
    pub mem_used: u64,
    pub mem_total: u64,
    pub swap_used: u64,
    pub swap_total: u64,
    pub loadavg: [String; 3],
    pub uptime_secs: f64,
    pub temps: Vec<f64>,
    /// (interface, rx bytes/s, tx bytes/s), lexicographic; empty on the
    /// first cycle when there is no previous sample yet.
    pub net_rates: Vec<(String, f64, f64)>,
    /// (device, read bytes/s, write bytes/s), lexicographic.
    pub disk_rates: Vec<(String, f64, f64)>,
    pub disk_usage: Vec<DiskUsage>,
    pub top_cpu: Vec<ProcRow>,
    pub top_mem: Vec<ProcRow>,
}

/// Usage percentage from two tick-counter samples of the same line.
/// Index 3 is idle and index 4 is iowait; a non-positive total delta (first
/// sample, counter reset, clock skew) yields exactly 0.0.
pub fn cpu_usage(prev: &[u64], curr: &[u64]) -> f64 {
    let sum = |ticks: &[u64]| ticks.iter().copied().map(i128::from).sum::<i128>();
    let idle = |ticks: &[u64]| {
        i128::from(ticks.get(3).copied().unwrap_or(0)) + i128::from(ticks.get(4).copied().unwrap_or(0))
    };
    let total_delta = sum(curr) - sum(prev);
    if total_delta <= 0 {
        return 0.0;
    }
    let idle_delta = idle(curr) - idle(prev);
    (total_delta - idle_delta) as f64 / total_delta as f64 * 100.0
}

pub fn compute(raw: &RawSnapshot, prev: Option<&PrevSample>, now: Instant) -> HostMetrics {
    let cpu_pcts = raw
        .cpu_lines
        .iter()
        .enumerate()
        .map(|(i, (label, ticks))| {
            // Pair by position, verified by label; a mismatch (topology
            // change, reboot) degrades that line to 0.0 instead of dropping it.
            let pct = prev
                .and_then(|p| p.cpu_lines.get(i))
                .filter(|(prev_label, _)| prev_label == label)
                .map(|(_, prev_ticks)| cpu_usage(prev_ticks, ticks))
                .unwrap_or(0.0);
            (label.clone(), pct)
        })
        .collect();

    // meminfo is in kilobytes; MemAvailable falls back to MemFree.
    let kb = |key: &str| raw.meminfo.get(key).copied().unwrap_or(0) * 1024;
    let mem_total = kb("MemTotal");
    let mem_avail = raw
        .meminfo
        .get("MemAvailable")
        .or_else(|| raw.meminfo.get("MemFree"))
        .copied()
        .unwrap_or(0)
        * 1024;
    let swap_total = kb("SwapTotal");

    let mut loadavg: [String; 3] = std::array::from_fn(|_| "0.00".to_string());
    for (slot, val) in loadavg.iter_mut().zip(raw.loadavg.iter()) {
        *slot = val.clone();
    }

    let (net_rates, disk_rates) = match prev {
        Some(p) => {
            let elapsed = now
                .duration_since(p.taken_at)
                .as_secs_f64()
                .max(MIN_ELAPSED_SECS);
            (
                counter_rates(&raw.net_bytes, &p.net_bytes, elapsed, 1.0),
                counter_rates(&raw.diskstats, &p.diskstats, elapsed, SECTOR_BYTES),
            )
        }
        None => (Vec::new(), Vec::new()),
    };

    HostMetrics {
        cpu_pcts,
        mem_used: mem_total.saturating_sub(mem_avail),
        mem_total,
        swap_used: swap_total.saturating_sub(kb("SwapFree")),
        swap_total,
        loadavg,
        uptime_secs: raw.uptime,
        temps: raw.temps.clone(),
        net_rates,
        disk_rates,
        disk_usage: raw.disk_usage.clone().unwrap_or_default(),
        top_cpu: raw.top_cpu.clone(),
        top_mem: raw.top_mem.clone(),
    }
}

/// Per-key byte rates from two cumulative counter maps. A key absent from
/// the previous sample defaults its baseline to the current value (zero rate
/// for a newly appeared interface), and deltas clamp at zero so a counter
/// reset shows one quiet cycle instead of a spike.
fn counter_rates(
    curr: &BTreeMap<String, (u64, u64)>,
    prev: &BTreeMap<String, (u64, u64)>,
    elapsed: f64,
    unit_bytes: f64,
) -> Vec<(String, f64, f64)> {
    if prev.is_empty() {
        return Vec::new();
    }
    curr.iter()
        .map(|(name, &(a, b))| {
            let &(pa, pb) = prev.get(name).unwrap_or(&(a, b));
            (
                name.clone(),
                a.saturating_sub(pa) as f64 * unit_bytes / elapsed,
                b.saturating_sub(pb) as f64 * unit_bytes / elapsed,
            )
        })
        .collect()
}
