use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

const PASSPHRASE: &str = "test-passphrase-secure-123";

fn bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_veil"))
}

struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new() -> Self {
        Self {
            dir: TempDir::new().expect("temp dir"),
        }
    }

    fn container(&self) -> PathBuf {
        self.dir.path().join("secret.veil")
    }

    fn config_file(&self) -> PathBuf {
        self.dir.path().join("config").join("veil").join("config.toml")
    }

    fn command(&self, passphrase: Option<&str>) -> Command {
        let mut cmd = Command::new(bin());
        cmd.env("XDG_CONFIG_HOME", self.dir.path().join("config"))
            .env("XDG_DATA_HOME", self.dir.path().join("data"))
            .env_remove("VEIL_PATH")
            .env_remove("VEIL_CONFIG")
            .env_remove("VEIL_PASSPHRASE")
            .env_remove("RUST_LOG");
        if let Some(value) = passphrase {
            cmd.env("VEIL_PASSPHRASE", value);
        }
        cmd
    }

    fn init(&self, path: &Path) -> Output {
        self.command(Some(PASSPHRASE))
            .args(["init", "--opslimit", "1", "--memlimit", "65536"])
            .arg(path)
            .output()
            .expect("run veil init")
    }

    fn write(&self, path: &Path, passphrase: &str, data: &[u8]) -> Output {
        let mut child = self
            .command(Some(passphrase))
            .arg("write")
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .expect("spawn veil write");
        child
            .stdin
            .take()
            .expect("stdin")
            .write_all(data)
            .expect("write stdin");
        child.wait_with_output().expect("wait veil write")
    }

    fn read(&self, path: &Path, passphrase: &str) -> Output {
        self.command(Some(passphrase))
            .arg("read")
            .arg(path)
            .output()
            .expect("run veil read")
    }
}

fn assert_success(output: &Output) {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
}

#[test]
fn test_init_write_read_flow() {
    let sandbox = Sandbox::new();
    let path = sandbox.container();

    let output = sandbox.init(&path);
    assert_success(&output);
    assert!(String::from_utf8_lossy(&output.stdout).contains("Initialized new container"));
    assert_eq!(std::fs::metadata(&path).expect("container").len(), 60);

    assert_success(&sandbox.write(&path, PASSPHRASE, b"Hello world"));
    let output = sandbox.read(&path, PASSPHRASE);
    assert_success(&output);
    assert_eq!(output.stdout, b"Hello world");

    assert_success(&sandbox.write(&path, PASSPHRASE, b"Hello"));
    let output = sandbox.read(&path, PASSPHRASE);
    assert_success(&output);
    assert_eq!(output.stdout, b"Hello");
    assert_eq!(std::fs::metadata(&path).expect("container").len(), 60 + 5 + 16);
}

#[test]
fn test_read_wrong_passphrase_exit_code() {
    let sandbox = Sandbox::new();
    let path = sandbox.container();
    assert_success(&sandbox.init(&path));
    assert_success(&sandbox.write(&path, PASSPHRASE, b"payload"));

    let output = sandbox.read(&path, "wrong-passphrase");
    assert_eq!(output.status.code(), Some(5));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_write_wrong_passphrase_leaves_container() {
    let sandbox = Sandbox::new();
    let path = sandbox.container();
    assert_success(&sandbox.init(&path));
    assert_success(&sandbox.write(&path, PASSPHRASE, b"original"));
    let before = std::fs::read(&path).expect("container");

    let output = sandbox.write(&path, "wrong-passphrase", b"clobbered");
    assert_eq!(output.status.code(), Some(5));
    assert_eq!(std::fs::read(&path).expect("container"), before);
}

#[test]
fn test_read_missing_container_exit_code() {
    let sandbox = Sandbox::new();

    let output = sandbox.read(&sandbox.container(), PASSPHRASE);
    assert_eq!(output.status.code(), Some(3));
    assert!(String::from_utf8_lossy(&output.stderr).contains("veil init"));
}

#[test]
fn test_read_empty_container_exit_code() {
    let sandbox = Sandbox::new();
    let path = sandbox.container();
    assert_success(&sandbox.init(&path));

    let output = sandbox.read(&path, PASSPHRASE);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn test_init_refuses_existing_without_force() {
    let sandbox = Sandbox::new();
    let path = sandbox.container();
    assert_success(&sandbox.init(&path));
    assert_success(&sandbox.write(&path, PASSPHRASE, b"keep me"));

    let output = sandbox.init(&path);
    assert_eq!(output.status.code(), Some(4));

    let output = sandbox
        .command(Some(PASSPHRASE))
        .args(["init", "--force", "--opslimit", "1", "--memlimit", "65536"])
        .arg(&path)
        .output()
        .expect("run veil init --force");
    assert_success(&output);
    assert_eq!(std::fs::metadata(&path).expect("container").len(), 60);
}

#[test]
fn test_init_rejects_zero_opslimit() {
    let sandbox = Sandbox::new();

    let output = sandbox
        .command(Some(PASSPHRASE))
        .args(["init", "--opslimit", "0"])
        .arg(sandbox.container())
        .output()
        .expect("run veil init");
    assert_eq!(output.status.code(), Some(4));
    assert!(!sandbox.container().exists());
}

#[test]
fn test_info_shows_parameters() {
    let sandbox = Sandbox::new();
    let path = sandbox.container();
    assert_success(&sandbox.init(&path));
    assert_success(&sandbox.write(&path, PASSPHRASE, b"Hello world"));

    let output = sandbox
        .command(None)
        .arg("info")
        .arg(&path)
        .output()
        .expect("run veil info");
    assert_success(&output);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains(&format!("Container: {}", path.display())));
    assert!(stdout.contains("Version:   1"));
    assert!(stdout.contains("opslimit 1, memlimit 65536 bytes"));
    assert!(stdout.contains("Payload:   11 bytes"));
}

#[test]
fn test_info_rejects_non_container() {
    let sandbox = Sandbox::new();
    let path = sandbox.container();
    std::fs::write(&path, b"not a container").expect("write file");

    let output = sandbox
        .command(None)
        .arg("info")
        .arg(&path)
        .output()
        .expect("run veil info");
    assert_eq!(output.status.code(), Some(6));
}

#[test]
fn test_init_writes_config_used_by_later_commands() {
    let sandbox = Sandbox::new();
    let path = sandbox.container();
    assert_success(&sandbox.init(&path));

    let config = std::fs::read_to_string(sandbox.config_file()).expect("config written");
    assert!(config.contains("[container]"));
    assert!(config.contains("secret.veil"));

    // No path argument: resolved from the config file.
    let mut child = sandbox
        .command(Some(PASSPHRASE))
        .arg("write")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("spawn veil write");
    child
        .stdin
        .take()
        .expect("stdin")
        .write_all(b"via config")
        .expect("write stdin");
    assert_success(&child.wait_with_output().expect("wait veil write"));

    let output = sandbox
        .command(Some(PASSPHRASE))
        .arg("read")
        .output()
        .expect("run veil read");
    assert_success(&output);
    assert_eq!(output.stdout, b"via config");
}

#[test]
fn test_missing_passphrase_without_tty_fails() {
    let sandbox = Sandbox::new();

    let output = sandbox
        .command(None)
        .args(["init", "--opslimit", "1", "--memlimit", "65536"])
        .arg(sandbox.container())
        .stdin(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .expect("run veil init");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("VEIL_PASSPHRASE"));
}
