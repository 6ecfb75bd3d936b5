//! `gatehouse install`: write the hook scripts into a repository.

use std::path::Path;

use anyhow::{Context as _, Result};

/// Marker line identifying hooks written by us. Install refuses to replace
/// a hook without it unless forced.
const MARKER: &str = "# installed by gatehouse";

const HOOKS: [&str; 2] = ["pre-receive", "post-receive"];

pub fn run(git_dir: &Path, force: bool) -> Result<()> {
    anyhow::ensure!(git_dir.is_dir(), "{} is not a directory", git_dir.display());
    let hooks_dir = git_dir.join("hooks");
    std::fs::create_dir_all(&hooks_dir)
        .with_context(|| format!("could not create {}", hooks_dir.display()))?;
    let exe = std::env::current_exe().context("could not resolve the gatehouse binary path")?;

    for hook in HOOKS {
        let path = hooks_dir.join(hook);
        if path.exists() && !force {
            let existing = std::fs::read_to_string(&path).unwrap_or_default();
            anyhow::ensure!(
                existing.contains(MARKER),
                "{} already exists and was not written by gatehouse (use --force to replace it)",
                path.display()
            );
        }
        let script = format!("#!/bin/sh\n{MARKER}\nexec {} {hook} \"$@\"\n", exe.display());
        std::fs::write(&path, script)
            .with_context(|| format!("could not write {}", path.display()))?;
        set_executable(&path)?;
        println!("installed {}", path.display());
    }
    Ok(())
}

#[cfg(unix)]
fn set_executable(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt as _;
    let mut perms = std::fs::metadata(path)?.permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_executable(_path: &Path) -> Result<()> {
    Ok(())
}
