use crate::error::{Pdf2TxtError, Result};
use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;
use tracing::{debug, info};

/// Program and arguments that open `path` in the platform file browser
pub fn opener_command(path: &Path) -> (&'static str, Vec<OsString>) {
    if cfg!(target_os = "macos") {
        ("open", vec![path.as_os_str().to_owned()])
    } else if cfg!(target_os = "windows") {
        (
            "cmd",
            vec![
                OsString::from("/c"),
                OsString::from("start"),
                // `start` treats the first quoted argument as a window title
                OsString::from(""),
                path.as_os_str().to_owned(),
            ],
        )
    } else {
        ("xdg-open", vec![path.as_os_str().to_owned()])
    }
}

/// Open a folder without waiting for the file browser to exit
pub fn open_folder(path: &Path) -> Result<()> {
    let (program, args) = opener_command(path);
    spawn_detached(program, &args, path)?;

    info!("Opened folder {}", path.display());
    Ok(())
}

/// Spawn `program` and reap it on a background thread
fn spawn_detached(program: &str, args: &[OsString], path: &Path) -> Result<()> {
    let mut child = Command::new(program)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .map_err(|e| Pdf2TxtError::OpenFolder {
            path: path.to_path_buf(),
            reason: format!("{}: {}", program, e),
        })?;

    let program = program.to_string();
    thread::spawn(move || match child.wait() {
        Ok(status) if !status.success() => debug!("{} exited with {}", program, status),
        Ok(_) => {}
        Err(e) => debug!("Failed to wait for {}: {}", program, e),
    });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_opener_command_targets_path() {
        let path = Path::new("/tmp/PDF Conversions/docs");
        let (program, args) = opener_command(path);

        assert!(!program.is_empty());
        assert_eq!(args.last().map(OsString::as_os_str), Some(path.as_os_str()));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_linux_uses_xdg_open() {
        let (program, args) = opener_command(Path::new("/tmp"));
        assert_eq!(program, "xdg-open");
        assert_eq!(args.len(), 1);
    }

    #[cfg(target_os = "windows")]
    #[test]
    fn test_windows_uses_start() {
        let (program, args) = opener_command(Path::new("C:\\out"));
        assert_eq!(program, "cmd");
        assert_eq!(args[0], OsString::from("/c"));
        assert_eq!(args[1], OsString::from("start"));
    }

    #[test]
    fn test_missing_opener_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let err = spawn_detached("pdf2txt-no-such-opener", &[], dir.path()).unwrap_err();

        match err {
            Pdf2TxtError::OpenFolder { path, reason } => {
                assert_eq!(path, dir.path());
                assert!(reason.starts_with("pdf2txt-no-such-opener: "));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_spawned_opener_runs_detached() {
        let dir = tempfile::tempdir().unwrap();
        let marker = dir.path().join("opened");
        let args = vec![
            OsString::from("-c"),
            OsString::from("touch \"$0\""),
            marker.clone().into(),
        ];

        spawn_detached("sh", &args, dir.path()).unwrap();

        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !marker.exists() && std::time::Instant::now() < deadline {
            thread::sleep(std::time::Duration::from_millis(20));
        }
        assert!(marker.exists());
    }
}
