//! Process Lister: ranked process rows via an external `ps` query.

use std::process::Command;

use crate::snapshot::ProcRow;

/// Capability seam for the process-ranking query, so the sampler can take a
/// mock in tests without touching the metrics engine.
pub trait ProcessLister {
    /// Up to `limit` rows of (pid, comm, cpu%, mem%), sorted by `sort_field`
    /// descending. Any invocation failure yields an empty result.
    fn top(&self, sort_field: &str, limit: usize) -> Vec<ProcRow>;
}

/// Lister backed by `ps -eo pid,comm,%cpu,%mem --sort <field>`.
pub struct PsLister;

impl ProcessLister for PsLister {
    fn top(&self, sort_field: &str, limit: usize) -> Vec<ProcRow> {
        let output = Command::new("ps")
            .args(["-eo", "pid,comm,%cpu,%mem", "--sort", sort_field])
            .output();
        match output {
            Ok(out) if out.status.success() => {
                parse_ps_output(&String::from_utf8_lossy(&out.stdout), limit)
            }
            _ => Vec::new(),
        }
    }
}

/// Parse `ps` tabular output: one header line, then one row per process.
/// Rows with fewer than 4 fields are skipped. The pid is the first field
/// and cpu%/mem% are the last two, so a command name containing spaces
/// (`tmux: server`) stays in the command column instead of shifting the
/// percentages.
pub fn parse_ps_output(out: &str, limit: usize) -> Vec<ProcRow> {
    out.trim()
        .lines()
        .skip(1)
        .take(limit)
        .filter_map(|line| {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 4 {
                return None;
            }
            Some((
                parts[0].to_string(),
                parts[1..parts.len() - 2].join(" "),
                parts[parts.len() - 2].to_string(),
                parts[parts.len() - 1].to_string(),
            ))
        })
        .collect()
}
