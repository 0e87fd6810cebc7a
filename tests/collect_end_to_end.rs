use getlogs::prelude::*;
use std::io::Write;
use xz2::write::XzEncoder;

fn write_remote(root: &std::path::Path, path: &str, content: &[u8]) {
    let path = root.join(path);
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, content).unwrap();
}

#[test]
fn one_host_group_with_exception_and_returned_file() {
    let remote = tempfile::tempdir().unwrap();
    write_remote(remote.path(), "var/log/app/keep.log", b"keep me");
    write_remote(remote.path(), "var/log/app/skip.log", b"skip me");
    write_remote(remote.path(), "tmp/report.txt", b"report");
    let local = tempfile::tempdir().unwrap();

    let raw_config = "---
remote_ipaddr: localhost
getfiles:
  app:
    - /var/log/app
exceptfiles:
  /var/log/app/skip.log:
executetasks:
  task01:
    taskexecute: printf '   /tmp/report.txt   \\n'
    taskget: return
";
    let config = Config::from_str(raw_config, ConfigFormat::Yaml).unwrap();
    let mut managed_host =
        ManagedHost::new("localhost", "localhost", LocalHostHandler::new(remote.path()));

    let report = managed_host.process(&config, local.path()).unwrap();

    assert_eq!(report.files_transferred, 2);
    assert_eq!(report.tasks_executed, 1);
    assert_eq!(
        std::fs::read(local.path().join("var/log/app/localhost-keep.log")).unwrap(),
        b"keep me"
    );
    assert!(!local.path().join("var/log/app/localhost-skip.log").exists());
    assert_eq!(std::fs::read(local.path().join("report.txt")).unwrap(), b"report");
}

#[test]
fn compressed_logs_are_unpacked_and_kept() {
    let original = b"Oct 17 10:00:00 host kernel: boot\n".repeat(50);
    let mut encoder = XzEncoder::new(Vec::new(), 6);
    encoder.write_all(&original).unwrap();
    let compressed = encoder.finish().unwrap();

    let remote = tempfile::tempdir().unwrap();
    write_remote(remote.path(), "var/log/kern.log.1.xz", &compressed);
    write_remote(remote.path(), "var/log/kern.log", b"current");
    let local = tempfile::tempdir().unwrap();

    let raw_config = "---
remote_ipaddr: localhost
getfiles:
  kernel:
    - /var/log/*.xz
";
    let config = Config::from_str(raw_config, ConfigFormat::Yaml).unwrap();
    let mut managed_host =
        ManagedHost::new("localhost", "localhost", LocalHostHandler::new(remote.path()));

    let report = managed_host.process(&config, local.path()).unwrap();

    assert_eq!(report.files_transferred, 1);
    assert!(local.path().join("var/log/localhost-kern.log.1.xz").is_file());
    assert_eq!(
        std::fs::read(local.path().join("var/log/localhost-kern.log.1")).unwrap(),
        original
    );
    assert!(!local.path().join("var/log/localhost-kern.log").exists());
}

#[test]
fn iteration_count_carries_to_the_next_task() {
    let remote = tempfile::tempdir().unwrap();
    let local = tempfile::tempdir().unwrap();

    let raw_config = "---
remote_ipaddr: localhost
executetasks:
  task01:
    taskexecute: echo 'there are 2 dumps'
    taskget: iterate
  task02:
    taskexecute: echo dump-iterate >> dumps.txt
    taskget: none
  task03:
    taskexecute: cat dumps.txt
    taskget: console
";
    let config = Config::from_str(raw_config, ConfigFormat::Yaml).unwrap();
    let mut managed_host =
        ManagedHost::new("localhost", "localhost", LocalHostHandler::new(remote.path()));

    let report = managed_host.process(&config, local.path()).unwrap();

    assert_eq!(
        std::fs::read_to_string(remote.path().join("dumps.txt")).unwrap(),
        "dump-1\ndump-2\n"
    );
    // 1 count + 2 iterations + 1 cat
    assert_eq!(report.tasks_executed, 4);
}
