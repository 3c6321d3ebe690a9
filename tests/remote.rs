//! Remote Bridge contract tests: failure taxonomy and document parsing.

use std::time::{Duration, Instant};

use twintop::config::Config;
use twintop::remote::{interpret_output, RemoteError, SshBridge};

#[test]
fn timeout_renders_as_ssh_timeout() {
    assert_eq!(RemoteError::Timeout.to_string(), "ssh timeout");
}

#[tokio::test]
async fn hanging_ssh_resolves_to_timeout_within_the_bound() {
    use std::os::unix::fs::PermissionsExt;

    // Resolve `ssh` to a shim that hangs forever; the bridge must convert
    // that into a bounded wait ending in Timeout, not block the caller.
    let dir = tempfile::tempdir().unwrap();
    let shim = dir.path().join("ssh");
    std::fs::write(&shim, "#!/bin/sh\nexec sleep 30\n").unwrap();
    std::fs::set_permissions(&shim, std::fs::Permissions::from_mode(0o755)).unwrap();

    // The only test in this binary that touches the process environment.
    let real_path = std::env::var("PATH").unwrap_or_default();
    std::env::set_var("PATH", format!("{}:{real_path}", dir.path().display()));

    let config = Config::from_lookup(|key| match key {
        "TWINTOP_REMOTE_HOST" => Some("192.0.2.1".to_string()),
        "TWINTOP_REMOTE_USER" => Some("nobody".to_string()),
        "TWINTOP_REMOTE_KEY" => Some("/dev/null".to_string()),
        _ => None,
    });
    let started = Instant::now();
    let err = SshBridge::new(&config).sample().await.unwrap_err();
    std::env::set_var("PATH", real_path);

    assert_eq!(err, RemoteError::Timeout);
    assert!(
        started.elapsed() < Duration::from_secs(5),
        "sample() blocked for {:?}",
        started.elapsed()
    );
}

#[test]
fn nonzero_exit_with_empty_stderr_is_ssh_failed() {
    let err = interpret_output(false, b"", b"").unwrap_err();
    assert_eq!(err, RemoteError::Failed("ssh failed".to_string()));
    assert_eq!(err.to_string(), "ssh failed");
}

#[test]
fn nonzero_exit_reports_trimmed_stderr() {
    let err = interpret_output(false, b"", b"  Permission denied (publickey).  \n").unwrap_err();
    assert_eq!(err.to_string(), "Permission denied (publickey).");
}

#[test]
fn unparseable_stdout_is_invalid_remote_data() {
    let err = interpret_output(true, b"definitely not json", b"").unwrap_err();
    assert_eq!(err, RemoteError::InvalidData);
    assert_eq!(err.to_string(), "invalid remote data");
}

#[test]
fn valid_document_parses_into_a_snapshot() {
    let doc = br#"{
        "cpu_lines": [["cpu", [1,2,3,4,5,6,7,8,9,10]], ["cpu0", [1,2,3,4,5,6,7,8,9,10]]],
        "meminfo": {"MemTotal": 1000, "MemAvailable": 400},
        "loadavg": ["0.10", "0.20", "0.30"],
        "uptime": 123.5,
        "net_bytes": {"eth0": [100, 200]},
        "diskstats": {"sda": [10, 20]},
        "mounts": [["/", "ext4"]],
        "temps": [45.0],
        "top_cpu": [["1", "init", "0.0", "0.1"]],
        "top_mem": [],
        "disk_usage": [["/", "ext4", 1000, 400]]
    }"#;
    let snap = interpret_output(true, doc, b"").unwrap();
    assert_eq!(snap.cpu_lines.len(), 2);
    assert_eq!(snap.cpu_lines[0].0, "cpu");
    assert_eq!(snap.meminfo.get("MemTotal"), Some(&1000));
    assert_eq!(snap.uptime, 123.5);
    assert_eq!(snap.net_bytes.get("eth0"), Some(&(100, 200)));
    assert_eq!(snap.mounts, vec![("/".to_string(), "ext4".to_string())]);
    assert_eq!(snap.top_cpu[0].1, "init");
    assert_eq!(
        snap.disk_usage,
        Some(vec![("/".to_string(), "ext4".to_string(), 1000, 400)])
    );
}

#[test]
fn missing_keys_deserialize_to_typed_defaults() {
    let snap = interpret_output(true, b"{}", b"").unwrap();
    assert!(snap.cpu_lines.is_empty());
    assert!(snap.meminfo.is_empty());
    assert_eq!(snap.uptime, 0.0);
    assert_eq!(snap.disk_usage, None);
}

#[test]
fn ssh_invocation_is_batch_mode_with_a_connect_timeout() {
    let config = Config::from_lookup(|key| match key {
        "TWINTOP_REMOTE_HOST" => Some("203.0.113.9".to_string()),
        "TWINTOP_REMOTE_USER" => Some("ops".to_string()),
        "TWINTOP_REMOTE_KEY" => Some("/tmp/key".to_string()),
        _ => None,
    });
    let args = SshBridge::new(&config).ssh_args();
    assert!(args.contains(&"BatchMode=yes".to_string()));
    assert!(args.contains(&"ConnectTimeout=2".to_string()));
    assert!(args.contains(&"ops@203.0.113.9".to_string()));
    let key_pos = args.iter().position(|a| a == "-i").unwrap();
    assert_eq!(args[key_pos + 1], "/tmp/key");
    assert_eq!(&args[args.len() - 2..], ["python3", "-"]);
}
