//! Integration tests for idempotent environment provisioning.
//!
//! Creating a real venv needs a python interpreter; tests bail out
//! quietly when none is on PATH.

use mproject::interpreter::find_python;
use mproject::venv::{pip_install_with, EnvBuilder, PipMode};
use tempfile::TempDir;

#[test]
fn provision_creates_then_reuses() {
    let Ok(python) = find_python(None) else {
        return;
    };

    let tmp = TempDir::new().unwrap();
    let env_dir = tmp.path().join("venv");

    // skip pip to keep creation fast; the directory layout is the same
    let builder = EnvBuilder::new(&env_dir, &python).with_pip(false);

    let context = builder.provision().unwrap();
    assert!(context.cfg_path.exists(), "pyvenv.cfg written on create");
    assert!(context.is_provisioned(), "interpreter placed in bin dir");

    // a marker survives the second provision: the environment is reused,
    // not recreated
    let marker = env_dir.join("marker.txt");
    std::fs::write(&marker, "keep me").unwrap();

    let context2 = builder.provision().unwrap();
    assert_eq!(context.env_dir, context2.env_dir);
    assert!(marker.exists(), "second provision must not recreate the env");
    assert_eq!(std::fs::read_to_string(&marker).unwrap(), "keep me");
}

#[test]
fn provision_clear_recreates() {
    let Ok(python) = find_python(None) else {
        return;
    };

    let tmp = TempDir::new().unwrap();
    let env_dir = tmp.path().join("venv");

    let builder = EnvBuilder::new(&env_dir, &python).with_pip(false);
    builder.provision().unwrap();

    let marker = env_dir.join("marker.txt");
    std::fs::write(&marker, "stale").unwrap();

    let cleared = builder.clone().clear(true);
    let context = cleared.provision().unwrap();
    assert!(context.cfg_path.exists());
    assert!(!marker.exists(), "--clear removes previous contents");
}

#[cfg(unix)]
#[test]
fn pip_failure_carries_child_stderr() {
    use std::os::unix::fs::PermissionsExt;

    // stand-in interpreter that fails like pip does, on stderr
    let tmp = TempDir::new().unwrap();
    let fake = tmp.path().join("python");
    std::fs::write(
        &fake,
        "#!/bin/sh\necho 'No matching distribution found for ghost' >&2\nexit 1\n",
    )
    .unwrap();
    std::fs::set_permissions(&fake, std::fs::Permissions::from_mode(0o755)).unwrap();

    let err = pip_install_with(&fake, &["ghost".to_string()], PipMode::Install).unwrap_err();
    assert!(
        err.to_string()
            .contains("No matching distribution found for ghost"),
        "error must carry the child's stderr, got: {err}"
    );
}
