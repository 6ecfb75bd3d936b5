//! `gatehouse check`: validate configuration without a push.

use std::path::{Path, PathBuf};

use anyhow::Result;

use gatehouse::clients::{GerritHttp, JenkinsHttp, JiraHttp};
use gatehouse::config::{PROJECT_CONFIG_FILE, ProjectConfig, SystemConfig};
use gatehouse::registry::ActionRegistry;
use gatehouse::runner::HookType;
use gatehouse_git::{CliGit, GitClient as _};

/// Load both configuration files, resolve the action plans exactly as a
/// push would, and report what a hook invocation would see.
pub fn run(git_dir: Option<&Path>) -> Result<()> {
    let git_dir = resolve_git_dir(git_dir)?;
    let mut all_ok = true;

    // --- configuration files ---
    let project_path = git_dir.join(PROJECT_CONFIG_FILE);
    let project_config = match ProjectConfig::load(&project_path) {
        Ok(cfg) => {
            if project_path.exists() {
                println!("[OK] {}", project_path.display());
            } else {
                println!("[OK] {} (missing, using defaults)", project_path.display());
            }
            cfg
        }
        Err(e) => {
            println!("[FAIL] {e}");
            anyhow::bail!("configuration is not valid");
        }
    };

    let system_path = SystemConfig::default_path();
    let system = match SystemConfig::load(&system_path) {
        Ok(cfg) => {
            if system_path.exists() {
                println!("[OK] {}", system_path.display());
            } else {
                println!("[OK] {} (missing, using defaults)", system_path.display());
            }
            cfg
        }
        Err(e) => {
            println!("[FAIL] {e}");
            anyhow::bail!("configuration is not valid");
        }
    };

    // --- identity and scope ---
    let project = match &project_config.project {
        Some(name) => name.clone(),
        None => CliGit::new(&git_dir).project_name()?,
    };
    println!("[OK] project: {project}");
    println!("[OK] watch refs: {}", project_config.watch_refs.join(", "));
    if system.freeze.is_frozen(&project) {
        println!("[WARN] project {project} is currently frozen");
    }

    // --- endpoints ---
    let jenkins = match &system.jenkins {
        None => None,
        Some(cfg) => match JenkinsHttp::from_config(cfg) {
            Ok(client) => {
                println!("[OK] jenkins endpoint: {}", cfg.url);
                Some(client)
            }
            Err(e) => {
                println!("[FAIL] jenkins: {e}");
                all_ok = false;
                None
            }
        },
    };
    let gerrit = match &system.gerrit {
        None => None,
        Some(cfg) => match GerritHttp::from_config(cfg) {
            Ok(client) => {
                println!("[OK] gerrit endpoint: {}", cfg.url);
                Some(client)
            }
            Err(e) => {
                println!("[FAIL] gerrit: {e}");
                all_ok = false;
                None
            }
        },
    };
    let jira = match &system.jira {
        None => None,
        Some(cfg) => match JiraHttp::from_config(cfg) {
            Ok(client) => {
                println!("[OK] jira endpoint: {}", cfg.url);
                Some(client)
            }
            Err(e) => {
                println!("[FAIL] jira: {e}");
                all_ok = false;
                None
            }
        },
    };

    // --- action plans ---
    let mut registry = ActionRegistry::new(project, system.freeze.clone());
    if let Some(jenkins) = &jenkins {
        registry = registry.with_build_server(jenkins);
    }
    if let Some(gerrit) = &gerrit {
        registry = registry.with_review_server(gerrit);
    }
    if let Some(jira) = &jira {
        registry = registry.with_issue_tracker(jira);
    }

    for hook in [HookType::PreReceive, HookType::PostReceive] {
        let entries = match hook {
            HookType::PreReceive => &project_config.pre_receive,
            HookType::PostReceive => &project_config.post_receive,
        };
        match registry.plan(hook, entries) {
            Ok(plan) if plan.is_empty() => println!("[OK] {hook}: no actions configured"),
            Ok(plan) => {
                println!("[OK] {hook}:");
                for (i, action) in plan.iter().enumerate() {
                    println!("       {}. {}", i + 1, action.kind());
                }
            }
            Err(e) => {
                println!("[FAIL] {hook}: {e}");
                all_ok = false;
            }
        }
    }

    if all_ok {
        Ok(())
    } else {
        anyhow::bail!("configuration is not valid")
    }
}

// $GIT_DIR is resolved by clap before we get here.
fn resolve_git_dir(arg: Option<&Path>) -> Result<PathBuf> {
    let dir = match arg {
        Some(dir) => dir.to_owned(),
        None => std::env::current_dir()?,
    };
    anyhow::ensure!(dir.is_dir(), "{} is not a directory", dir.display());
    Ok(dir)
}
