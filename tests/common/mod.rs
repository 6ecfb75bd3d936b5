//! Shared test helpers for gatehouse integration tests.
//!
//! All tests use temp directories; no side effects outside them. Each test
//! gets a bare "server-side" repository plus a work clone to create real
//! commits with, via `TestRepo::new()`.

use std::io::Write as _;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use tempfile::TempDir;

/// All-zero object id, as git sends it for ref creations and deletions.
pub const ZERO: &str = "0000000000000000000000000000000000000000";

/// A bare repository (as the gatehouse binary sees it) plus a work clone
/// for making commits.
pub struct TestRepo {
    _tmp: TempDir,
    /// The bare repository, named `widget.git` so the derived project name
    /// is `widget`.
    pub remote: PathBuf,
    /// Working clone pushing into `remote`.
    pub work: PathBuf,
    /// Where `write_system_config` puts the system-wide file. Hook
    /// invocations always point `GATEHOUSE_SYSTEM_CONFIG` here; while the
    /// file is missing the binary sees defaults.
    pub system_config: PathBuf,
}

impl TestRepo {
    pub fn new() -> Self {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let remote = tmp.path().join("widget.git");
        let work = tmp.path().join("work");
        let system_config = tmp.path().join("system.toml");

        git(tmp.path(), &["init", "--bare", "widget.git"]);
        git(tmp.path(), &["init", "-b", "main", "work"]);
        git(&work, &["config", "user.email", "test@example.com"]);
        git(&work, &["config", "user.name", "Test User"]);
        git(
            &work,
            &["remote", "add", "origin", remote.to_str().unwrap()],
        );

        Self {
            _tmp: tmp,
            remote,
            work,
            system_config,
        }
    }

    /// Create an empty commit in the work clone; returns its full hash.
    pub fn commit(&self, message: &str) -> String {
        git(&self.work, &["commit", "--allow-empty", "-m", message]);
        git(&self.work, &["rev-parse", "HEAD"]).trim().to_owned()
    }

    /// Push a refspec to the bare repository, asserting success. Only valid
    /// while no rejecting hooks are installed.
    pub fn push(&self, refspec: &str) {
        git(&self.work, &["push", "origin", refspec]);
    }

    /// `git push` expected to be rejected; returns stderr (which carries the
    /// hook output as `remote:` lines).
    pub fn push_rejected(&self, refspec: &str, envs: &[(&str, &str)]) -> String {
        let out = self.push_with_env(refspec, envs);
        assert!(
            !out.status.success(),
            "expected push of {refspec} to be rejected.\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr),
        );
        String::from_utf8_lossy(&out.stderr).to_string()
    }

    /// `git push` expected to succeed; returns stderr.
    pub fn push_accepted(&self, refspec: &str, envs: &[(&str, &str)]) -> String {
        let out = self.push_with_env(refspec, envs);
        assert!(
            out.status.success(),
            "expected push of {refspec} to succeed.\nstdout: {}\nstderr: {}",
            String::from_utf8_lossy(&out.stdout),
            String::from_utf8_lossy(&out.stderr),
        );
        String::from_utf8_lossy(&out.stderr).to_string()
    }

    fn push_with_env(&self, refspec: &str, envs: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new("git");
        cmd.args(["push", "origin", refspec])
            .current_dir(&self.work)
            .env("GATEHOUSE_SYSTEM_CONFIG", &self.system_config);
        for (key, value) in envs {
            cmd.env(key, value);
        }
        cmd.output().expect("failed to run git push")
    }

    /// Write the per-repository configuration into the bare repo.
    pub fn write_project_config(&self, toml: &str) {
        std::fs::write(self.remote.join("gatehouse.toml"), toml)
            .expect("failed to write gatehouse.toml");
    }

    /// Write the system-wide configuration the hook invocations will see.
    pub fn write_system_config(&self, toml: &str) {
        std::fs::write(&self.system_config, toml).expect("failed to write system.toml");
    }

    /// Run the gatehouse binary with the given args against the bare repo.
    pub fn gatehouse(&self, args: &[&str], stdin: &str, envs: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_gatehouse"));
        cmd.args(args)
            .current_dir(&self.remote)
            .env_remove("GIT_DIR")
            .env("GATEHOUSE_SYSTEM_CONFIG", &self.system_config)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        for (key, value) in envs {
            cmd.env(key, value);
        }
        let mut child = cmd.spawn().expect("failed to spawn gatehouse");
        child
            .stdin
            .take()
            .expect("stdin is piped")
            .write_all(stdin.as_bytes())
            .expect("failed to write hook stdin");
        child
            .wait_with_output()
            .expect("failed to wait for gatehouse")
    }

    /// Run a hook and return (exit code, stderr).
    pub fn hook(&self, hook: &str, stdin: &str, envs: &[(&str, &str)]) -> (i32, String) {
        let out = self.gatehouse(&[hook], stdin, envs);
        let code = out.status.code().expect("gatehouse was killed by a signal");
        (code, String::from_utf8_lossy(&out.stderr).to_string())
    }
}

/// One stdin line in the receive-hook wire format.
pub fn update_line(old: &str, new: &str, ref_name: &str) -> String {
    format!("{old} {new} {ref_name}\n")
}

/// Run a git command, panicking on failure. Returns stdout as a string.
pub fn git(dir: &Path, args: &[&str]) -> String {
    let out = Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap_or_else(|e| panic!("failed to run git {}: {e}", args.join(" ")));
    assert!(
        out.status.success(),
        "git {} failed:\nstdout: {}\nstderr: {}",
        args.join(" "),
        String::from_utf8_lossy(&out.stdout),
        String::from_utf8_lossy(&out.stderr),
    );
    String::from_utf8_lossy(&out.stdout).to_string()
}
