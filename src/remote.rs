//! Remote Bridge: samples the peer host by feeding a self-contained probe to
//! `python3 -` over ssh and parsing the one-line JSON document it prints.
//!
//! This is the only call allowed to stall the render cycle, and it is bounded
//! twice: ssh's own ConnectTimeout plus an overall execution timeout here. A
//! hang becomes a bounded wait, never an indefinite one.

use std::process::Stdio;
use std::time::Duration;

use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tokio::time::timeout;

use crate::config::Config;
use crate::snapshot::RawSnapshot;

const CONNECT_TIMEOUT_SECS: u64 = 2;
const EXEC_TIMEOUT: Duration = Duration::from_secs(3);

/// The three remote-channel failure kinds. Each renders as a message inside
/// the remote panel; none is fatal, and the next poll is the retry.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RemoteError {
    #[error("ssh timeout")]
    Timeout,
    /// Trimmed stderr of a failed invocation, or "ssh failed" when empty.
    #[error("{0}")]
    Failed(String),
    #[error("invalid remote data")]
    InvalidData,
}

/// Sampling routine executed on the remote host. Mirrors the local sampler,
/// plus a disk-usage pass done inline so no second round trip is needed.
const REMOTE_PROBE: &str = r#"
import json
import os
import shutil
import subprocess

SKIP_FS = {
    "proc", "sysfs", "tmpfs", "devtmpfs", "devpts", "overlay", "squashfs",
    "cgroup", "cgroup2", "pstore", "debugfs", "tracefs", "securityfs",
    "mqueue", "hugetlbfs", "configfs", "fusectl",
}
DISK_DEV_PREFIXES = ("sd", "nvme", "mmcblk")


def read_cpu_lines():
    lines = []
    with open("/proc/stat", "r", encoding="utf-8") as f:
        for line in f:
            if not line.startswith("cpu"):
                break
            parts = line.strip().split()
            lines.append((parts[0], [int(p) for p in parts[1:]]))
    return lines


def read_meminfo():
    info = {}
    with open("/proc/meminfo", "r", encoding="utf-8") as f:
        for line in f:
            key, val = line.split(":", 1)
            info[key.strip()] = int(val.strip().split()[0])
    return info


def read_loadavg():
    with open("/proc/loadavg", "r", encoding="utf-8") as f:
        return f.read().strip().split()[:3]


def read_uptime_seconds():
    with open("/proc/uptime", "r", encoding="utf-8") as f:
        return float(f.read().split()[0])


def read_net_bytes():
    data = {}
    with open("/proc/net/dev", "r", encoding="utf-8") as f:
        lines = f.readlines()[2:]
    for line in lines:
        if ":" not in line:
            continue
        iface, body = line.split(":", 1)
        parts = body.split()
        if len(parts) < 16:
            continue
        data[iface.strip()] = (int(parts[0]), int(parts[8]))
    return data


def read_diskstats():
    stats = {}
    with open("/proc/diskstats", "r", encoding="utf-8") as f:
        for line in f:
            parts = line.split()
            if len(parts) < 10:
                continue
            name = parts[2]
            if not name.startswith(DISK_DEV_PREFIXES):
                continue
            stats[name] = (int(parts[5]), int(parts[9]))
    return stats


def list_mounts():
    mounts = []
    seen = set()
    with open("/proc/mounts", "r", encoding="utf-8") as f:
        for line in f:
            parts = line.split()
            if len(parts) < 3:
                continue
            mount, fstype = parts[1], parts[2]
            if fstype in SKIP_FS or mount in seen:
                continue
            seen.add(mount)
            mounts.append((mount, fstype))
    mounts.sort(key=lambda m: m[0])
    return mounts


def read_temps_c():
    temps = []
    base = "/sys/class/thermal"
    if os.path.isdir(base):
        for name in sorted(os.listdir(base)):
            if not name.startswith("thermal_zone"):
                continue
            try:
                with open(os.path.join(base, name, "temp"), "r", encoding="utf-8") as f:
                    val = int(f.read().strip())
                temps.append(val / 1000.0 if val > 1000 else float(val))
            except (OSError, ValueError):
                continue
    if temps:
        return temps
    hwmon = "/sys/class/hwmon"
    if os.path.isdir(hwmon):
        for root, _, files in os.walk(hwmon, followlinks=True):
            if root[len(hwmon):].count(os.sep) > 2:
                continue
            for name in sorted(files):
                if not name.startswith("temp") or not name.endswith("_input"):
                    continue
                try:
                    with open(os.path.join(root, name), "r", encoding="utf-8") as f:
                        val = int(f.read().strip())
                    temps.append(val / 1000.0 if val > 1000 else float(val))
                except (OSError, ValueError):
                    continue
    return temps


def read_top_processes(sort_field, limit):
    cmd = ["ps", "-eo", "pid,comm,%cpu,%mem", "--sort", sort_field]
    try:
        out = subprocess.check_output(cmd, text=True)
    except (OSError, subprocess.CalledProcessError):
        return []
    procs = []
    for line in out.strip().splitlines()[1 : limit + 1]:
        parts = line.split(None, 3)
        if len(parts) < 4:
            continue
        procs.append(parts)
    return procs


def disk_usage_for_mounts(mounts):
    usage = []
    for mount, fstype in mounts:
        try:
            total, used, _ = shutil.disk_usage(mount)
            usage.append((mount, fstype, total, used))
        except OSError:
            continue
    return usage


mounts = list_mounts()
data = {
    "cpu_lines": read_cpu_lines(),
    "meminfo": read_meminfo(),
    "loadavg": read_loadavg(),
    "uptime": read_uptime_seconds(),
    "net_bytes": read_net_bytes(),
    "diskstats": read_diskstats(),
    "mounts": mounts,
    "temps": read_temps_c(),
    "top_cpu": read_top_processes("-%cpu", 5),
    "top_mem": read_top_processes("-%mem", 5),
    "disk_usage": disk_usage_for_mounts(mounts),
}
print(json.dumps(data))
"#;

/// Bridge to one configured remote host. The sampling contract is the same
/// as the local sampler's; failures come back categorized, never panicking
/// and never unbounded.
pub struct SshBridge {
    host: String,
    user: String,
    identity: String,
}

impl SshBridge {
    pub fn new(config: &Config) -> Self {
        Self {
            host: config.remote_host.clone(),
            user: config.remote_user.clone(),
            identity: config.remote_key.to_string_lossy().into_owned(),
        }
    }

    /// ssh argv, batch mode so a password prompt can never block the loop.
    pub fn ssh_args(&self) -> Vec<String> {
        vec![
            "-i".into(),
            self.identity.clone(),
            "-o".into(),
            "BatchMode=yes".into(),
            "-o".into(),
            format!("ConnectTimeout={CONNECT_TIMEOUT_SECS}"),
            format!("{}@{}", self.user, self.host),
            "python3".into(),
            "-".into(),
        ]
    }

    pub async fn sample(&self) -> Result<RawSnapshot, RemoteError> {
        let run = async {
            let mut child = Command::new("ssh")
                .args(self.ssh_args())
                .stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped())
                .kill_on_drop(true)
                .spawn()
                .map_err(|e| RemoteError::Failed(e.to_string()))?;
            if let Some(mut stdin) = child.stdin.take() {
                stdin
                    .write_all(REMOTE_PROBE.as_bytes())
                    .await
                    .map_err(|e| RemoteError::Failed(e.to_string()))?;
                // dropping stdin sends EOF so the interpreter starts
            }
            child
                .wait_with_output()
                .await
                .map_err(|e| RemoteError::Failed(e.to_string()))
        };
        let output = match timeout(EXEC_TIMEOUT, run).await {
            Ok(result) => result?,
            Err(_) => return Err(RemoteError::Timeout),
        };
        interpret_output(output.status.success(), &output.stdout, &output.stderr)
    }
}

/// Classify a finished invocation: non-zero exit reports trimmed stderr (or
/// "ssh failed"), unparseable stdout is invalid data, otherwise the snapshot.
pub fn interpret_output(
    success: bool,
    stdout: &[u8],
    stderr: &[u8],
) -> Result<RawSnapshot, RemoteError> {
    if !success {
        let err = String::from_utf8_lossy(stderr).trim().to_string();
        return Err(RemoteError::Failed(if err.is_empty() {
            "ssh failed".to_string()
        } else {
            err
        }));
    }
    serde_json::from_slice(stdout).map_err(|_| RemoteError::InvalidData)
}
