//! Local Sampler: composes the counter readers and the process lister into
//! one raw snapshot of this host. Every source degrades independently: a
//! missing or unreadable pseudo-file becomes an empty/zero field, never an
//! error past this boundary.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use sysinfo::Disks;

use crate::procfs;
use crate::ps::ProcessLister;
use crate::snapshot::{DiskUsage, MountEntry, RawSnapshot};

/// How many process rows to sample per ranking; the panel shows fewer.
pub const TOP_PROCESSES: usize = 5;

pub fn collect_local(lister: &dyn ProcessLister) -> RawSnapshot {
    let mounts = fs::read_to_string(procfs::PROC_MOUNTS)
        .map(|s| procfs::parse_mounts(&s))
        .unwrap_or_default();
    let disk_usage = disk_usage_for_mounts(&mounts);
    RawSnapshot {
        cpu_lines: fs::read_to_string(procfs::PROC_STAT)
            .map(|s| procfs::parse_cpu_lines(&s))
            .unwrap_or_default(),
        meminfo: fs::read_to_string(procfs::PROC_MEMINFO)
            .map(|s| procfs::parse_meminfo(&s))
            .unwrap_or_default(),
        loadavg: fs::read_to_string(procfs::PROC_LOADAVG)
            .ok()
            .and_then(|s| procfs::parse_loadavg(&s))
            .map(Vec::from)
            .unwrap_or_default(),
        uptime: fs::read_to_string(procfs::PROC_UPTIME)
            .ok()
            .and_then(|s| procfs::parse_uptime(&s))
            .unwrap_or(0.0),
        net_bytes: fs::read_to_string(procfs::PROC_NET_DEV)
            .map(|s| procfs::parse_net_dev(&s))
            .unwrap_or_default(),
        diskstats: fs::read_to_string(procfs::PROC_DISKSTATS)
            .map(|s| procfs::parse_diskstats(&s))
            .unwrap_or_default(),
        temps: procfs::read_temps(Path::new(procfs::SYS_THERMAL), Path::new(procfs::SYS_HWMON)),
        top_cpu: lister.top("-%cpu", TOP_PROCESSES),
        top_mem: lister.top("-%mem", TOP_PROCESSES),
        mounts,
        disk_usage: Some(disk_usage),
    }
}

/// Space usage per mount point. Mounts the refreshed disk list does not know
/// about (unmounted between enumeration and query) are dropped, not zeroed.
pub fn disk_usage_for_mounts(mounts: &[MountEntry]) -> Vec<DiskUsage> {
    let disks = Disks::new_with_refreshed_list();
    let by_mount: HashMap<PathBuf, (u64, u64)> = disks
        .iter()
        .map(|d| {
            let total = d.total_space();
            (
                d.mount_point().to_path_buf(),
                (total, total.saturating_sub(d.available_space())),
            )
        })
        .collect();
    mounts
        .iter()
        .filter_map(|(mount, fstype)| {
            let &(total, used) = by_mount.get(Path::new(mount))?;
            Some((mount.clone(), fstype.clone(), total, used))
        })
        .collect()
}
