//! Integration tests for the command-driven backend.
//!
//! Host tools are replaced by small shell scripts that keep their state in a
//! temporary directory. The fake `docker exec` runs the real mount probe
//! against a per-container mount table file. Everything runs in one test so
//! no other thread forks while a script is still open for writing.
#![cfg(unix)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use volman::identity::{derive_prefix, derive_suffix};
use volman::{
    CommandBackend, CommandBackendConfig, ContainerRuntimeId, SessionToken, VolmanError,
    VolumeBackend, VolumeId,
};

const WORK_DIR: &str = "/home/jovyan/work";

fn write_script(dir: &Path, name: &str, body: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, format!("#!/bin/sh\n{body}")).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

fn fake_tools(state: &Path, bin: &Path) -> CommandBackendConfig {
    let state = state.display();

    let docker = write_script(
        bin,
        "docker",
        &format!(
            r#"STATE="{state}"
if [ "$1 $2" = "volume ls" ]; then
  if [ -f "$STATE/fail-ls" ]; then
    echo "Cannot connect to the Docker daemon" >&2
    exit 1
  fi
  echo "DRIVER              VOLUME NAME"
  if [ -f "$STATE/volumes" ]; then
    sed 's/^/local               /' "$STATE/volumes"
  fi
  exit 0
fi
if [ "$1 $2 $3" = "volume create --name" ]; then
  if [ -f "$STATE/fail-create" ]; then
    echo "Error: no space left on device" >&2
    exit 1
  fi
  echo "$4" >> "$STATE/volumes"
  echo "$4"
  exit 0
fi
if [ "$1" = "exec" ] && [ "$3 $4" = "sh -c" ]; then
  table="$STATE/proc-mounts-$2"
  touch "$table"
  script=$(printf '%s' "$5" | sed "s#/proc/mounts#$table#")
  sh -c "$script"
  exit $?
fi
echo "unexpected: $*" >&2
exit 2
"#
        ),
    );

    let enter = write_script(
        bin,
        "docker-enter",
        &format!(
            r#"STATE="{state}"
table="$STATE/proc-mounts-$1"
if [ "$2" = "umount" ] && [ -f "$table" ] && grep -q " $3 " "$table"; then
  grep -v " $3 " "$table" > "$table.tmp"
  mv "$table.tmp" "$table"
  exit 0
fi
echo "umount: $3: not mounted" >&2
exit 32
"#
        ),
    );

    let attach = write_script(
        bin,
        "attach_work.sh",
        &format!(
            r#"STATE="{state}"
if [ -f "$STATE/fail-attach" ]; then
  echo "container $CONTAINER is not running" >&2
  exit 1
fi
echo "$CONTAINER $VOLUME $HOSTMOUNT $(pwd)" >> "$STATE/attached"
echo "/dev/sdb1 {WORK_DIR} ext4 rw,relatime 0 0" >> "$STATE/proc-mounts-$CONTAINER"
"#
        ),
    );

    CommandBackendConfig::default()
        .with_docker(docker)
        .with_enter(enter)
        .with_attach_helper(attach, Some(bin.to_path_buf()))
        .with_host_mount("/host")
}

#[tokio::test]
async fn command_backend_lifecycle() {
    let state = tempfile::tempdir().unwrap();
    let bin = tempfile::tempdir().unwrap();
    let backend = CommandBackend::new(fake_tools(state.path(), bin.path()));

    // Volumes
    let prefix = derive_prefix("alice");
    assert!(backend.find_volume(&prefix).await.unwrap().is_none());

    let volume = VolumeId::from_parts(&prefix, &derive_suffix("password1", 4).unwrap());
    backend.create_volume(&volume).await.unwrap();
    assert_eq!(
        backend.find_volume(&prefix).await.unwrap(),
        Some(volume.clone())
    );
    assert!(
        backend
            .find_volume(&derive_prefix("bob"))
            .await
            .unwrap()
            .is_none()
    );

    // Mounts, probed through the container's mount table
    let container = ContainerRuntimeId::from_session("tmp.", &SessionToken::new("abc").unwrap());
    assert!(!backend.has_mount(&container, WORK_DIR).await.unwrap());
    backend.mount_volume(&volume, &container).await.unwrap();
    assert!(backend.has_mount(&container, WORK_DIR).await.unwrap());
    assert!(!backend.has_mount(&container, "/srv/data").await.unwrap());

    let other = ContainerRuntimeId::from_session("tmp.", &SessionToken::new("def").unwrap());
    assert!(!backend.has_mount(&other, WORK_DIR).await.unwrap());

    let attached = std::fs::read_to_string(state.path().join("attached")).unwrap();
    let fields: Vec<&str> = attached.split_whitespace().collect();
    assert_eq!(fields[0], "tmp.abc");
    assert_eq!(fields[1], volume.as_str());
    assert_eq!(fields[2], "/host");
    assert_eq!(
        std::fs::canonicalize(fields[3]).unwrap(),
        std::fs::canonicalize(bin.path()).unwrap()
    );

    assert!(backend.unmount_volume(&container, WORK_DIR).await.unwrap());
    assert!(!backend.has_mount(&container, WORK_DIR).await.unwrap());
    // Unmounting nothing is a refusal, not an error.
    assert!(!backend.unmount_volume(&container, WORK_DIR).await.unwrap());

    // Attach failure keeps the helper's stderr
    std::fs::write(state.path().join("fail-attach"), "").unwrap();
    let err = backend.mount_volume(&volume, &container).await.unwrap_err();
    match err {
        VolmanError::Backend { stderr, .. } => {
            assert_eq!(stderr, "container tmp.abc is not running");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!backend.has_mount(&container, WORK_DIR).await.unwrap());

    // Create failure keeps the CLI's stderr
    std::fs::write(state.path().join("fail-create"), "").unwrap();
    let bob = VolumeId::from_parts(&derive_prefix("bob"), "c3VmZml4");
    let err = backend.create_volume(&bob).await.unwrap_err();
    match err {
        VolmanError::Backend { stderr, .. } => {
            assert_eq!(stderr, "Error: no space left on device");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Listing failure
    std::fs::write(state.path().join("fail-ls"), "").unwrap();
    let err = backend.find_volume(&prefix).await.unwrap_err();
    match err {
        VolmanError::Backend { command, stderr } => {
            assert!(command.ends_with("volume ls"));
            assert_eq!(stderr, "Cannot connect to the Docker daemon");
        }
        other => panic!("unexpected error: {other}"),
    }

    // Missing tools
    let missing = CommandBackend::new(
        CommandBackendConfig::default().with_docker(bin.path().join("no-such-docker")),
    );
    let err = missing.find_volume(&prefix).await.unwrap_err();
    assert!(matches!(err, VolmanError::Spawn { .. }));
}
