//! Panel Formatter: renders one host's metrics into an ordered block of
//! text lines, each hard-clipped to the panel width. The layout is a fixed
//! grid, so lines are truncated, never wrapped.

use crate::metrics::HostMetrics;
use crate::snapshot::ProcRow;

/// Per-core lines after the aggregate.
const MAX_CORE_LINES: usize = 8;
const MAX_NET_LINES: usize = 5;
const MAX_DISK_USAGE_LINES: usize = 4;
const MAX_DISK_IO_LINES: usize = 4;
const MAX_TOP_LINES: usize = 3;
const MAX_TEMPS_SHOWN: usize = 3;
/// Command and mount names are clipped to keep the columns aligned.
const NAME_COLS: usize = 10;

/// Bytes with one decimal place and the first unit below 1024.
pub fn fmt_bytes(n: f64) -> String {
    let mut n = n;
    for unit in ["B", "KB", "MB", "GB", "TB"] {
        if n < 1024.0 {
            return format!("{n:.1}{unit}");
        }
        n /= 1024.0;
    }
    format!("{n:.1}PB")
}

/// `1d 01h 00m` once there are whole days, `01h 01m 01s` otherwise.
pub fn fmt_duration(seconds: f64) -> String {
    let total = seconds.max(0.0) as u64;
    let days = total / 86_400;
    let hours = total % 86_400 / 3_600;
    let mins = total % 3_600 / 60;
    let secs = total % 60;
    if days > 0 {
        format!("{days}d {hours:02}h {mins:02}m")
    } else {
        format!("{hours:02}h {mins:02}m {secs:02}s")
    }
}

/// `[####----]` gauge for a 0..100 value; out-of-range values clamp.
pub fn draw_bar(value: f64, width: usize) -> String {
    let value = value.clamp(0.0, 100.0);
    let filled = ((value / 100.0 * width as f64).round() as usize).min(width);
    format!("[{}{}]", "#".repeat(filled), "-".repeat(width - filled))
}

fn bar_width(panel_width: usize) -> usize {
    panel_width.saturating_sub(18).clamp(8, 30)
}

fn clip(s: &str, width: usize) -> String {
    s.chars().take(width).collect()
}

fn pct_of(used: u64, total: u64) -> f64 {
    if total == 0 {
        0.0
    } else {
        used as f64 / total as f64 * 100.0
    }
}

fn proc_line((pid, comm, cpu, mem): &ProcRow) -> String {
    format!("  {pid:>5} {:<10} {cpu:>5}% {mem:>5}%", clip(comm, NAME_COLS))
}

/// Render one host's block. The field order is fixed; every line is
/// truncated to `width` characters.
pub fn build_panel_lines(m: &HostMetrics, title: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(title.to_string());

    let bar_w = bar_width(width);
    match m.cpu_pcts.first() {
        Some((_, total_pct)) => {
            lines.push(format!("CPU  {total_pct:5.1}% {}", draw_bar(*total_pct, bar_w)));
            for (name, pct) in m.cpu_pcts.iter().skip(1).take(MAX_CORE_LINES) {
                lines.push(format!("{name:<4} {pct:5.1}%"));
            }
        }
        None => lines.push("CPU  N/A".to_string()),
    }

    let mem_pct = pct_of(m.mem_used, m.mem_total);
    lines.push(format!(
        "MEM  {mem_pct:5.1}% {} {} / {}",
        draw_bar(mem_pct, bar_w),
        fmt_bytes(m.mem_used as f64),
        fmt_bytes(m.mem_total as f64)
    ));
    let swap_pct = pct_of(m.swap_used, m.swap_total);
    lines.push(format!(
        "SWAP {swap_pct:5.1}% {} {} / {}",
        draw_bar(swap_pct, bar_w),
        fmt_bytes(m.swap_used as f64),
        fmt_bytes(m.swap_total as f64)
    ));

    let temps_text = if m.temps.is_empty() {
        "N/A".to_string()
    } else {
        m.temps
            .iter()
            .take(MAX_TEMPS_SHOWN)
            .map(|t| format!("{t:.1}C"))
            .collect::<Vec<_>>()
            .join(", ")
    };
    lines.push(format!("TEMP {temps_text}"));

    let [l1, l5, l15] = &m.loadavg;
    lines.push(format!("LOAD {l1} {l5} {l15}"));
    lines.push(format!("UPTIME {}", fmt_duration(m.uptime_secs)));

    lines.push("NET".to_string());
    for (iface, rx, tx) in m.net_rates.iter().take(MAX_NET_LINES) {
        lines.push(format!(
            "  {iface:<8} RX {}/s TX {}/s",
            fmt_bytes(*rx),
            fmt_bytes(*tx)
        ));
    }

    lines.push("DISK USAGE".to_string());
    for (mount, _fstype, total, used) in m.disk_usage.iter().take(MAX_DISK_USAGE_LINES) {
        lines.push(format!(
            "  {:<10} {:5.1}% {} / {}",
            clip(mount, NAME_COLS),
            pct_of(*used, *total),
            fmt_bytes(*used as f64),
            fmt_bytes(*total as f64)
        ));
    }

    lines.push("DISK IO".to_string());
    for (dev, read, write) in m.disk_rates.iter().take(MAX_DISK_IO_LINES) {
        lines.push(format!(
            "  {dev:<8} R {}/s W {}/s",
            fmt_bytes(*read),
            fmt_bytes(*write)
        ));
    }

    lines.push("TOP CPU".to_string());
    for row in m.top_cpu.iter().take(MAX_TOP_LINES) {
        lines.push(proc_line(row));
    }
    lines.push("TOP MEM".to_string());
    for row in m.top_mem.iter().take(MAX_TOP_LINES) {
        lines.push(proc_line(row));
    }

    lines.iter().map(|l| clip(l, width)).collect()
}

/// Two-line stand-in when a host produced an error instead of data.
pub fn error_panel_lines(title: &str, err: &str, width: usize) -> Vec<String> {
    vec![clip(title, width), clip(&format!("Error: {err}"), width)]
}
