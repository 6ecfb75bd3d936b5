use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use gatehouse::clients::{GerritHttp, JenkinsHttp, JiraHttp};
use gatehouse::config::{ConfigError, PROJECT_CONFIG_FILE, ProjectConfig, SystemConfig};
use gatehouse::controller::HookController;
use gatehouse::error::HookError;
use gatehouse::registry::ActionRegistry;
use gatehouse::runner::HookType;
use gatehouse_git::{CliGit, GitClient as _};

mod check;
mod install;

/// Server-side git hook pipeline
///
/// gatehouse runs as a repository's pre-receive and post-receive hook. It
/// reads the update stream git provides on stdin, expands each watched ref
/// update into individual commits, and runs the repository's configured
/// action chain (build triggers, review gates, freeze checks, notifications)
/// against every one of them. A pre-receive failure rejects the push;
/// post-receive failures are logged and never block.
///
/// CONFIGURATION:
///
///   <git-dir>/gatehouse.toml          per-repository actions and watch refs
///   /etc/gatehouse/system.toml        endpoints and freeze policy
///
/// INSTALL:
///
///   gatehouse install --git-dir /srv/git/widget.git
///
/// writes hooks/pre-receive and hooks/post-receive scripts that exec this
/// binary. When the binary itself is named pre-receive or post-receive the
/// hook type is inferred from argv[0] and no subcommand is needed.
#[derive(Parser)]
#[command(name = "gatehouse")]
#[command(version, about)]
#[command(after_help = "See 'gatehouse <command> --help' for more detail on a command.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the pre-receive pipeline (reads update lines from stdin)
    PreReceive,

    /// Run the post-receive pipeline (reads update lines from stdin)
    PostReceive,

    /// Validate configuration and print the resolved action plans
    ///
    /// Loads both configuration files, resolves the pre-receive and
    /// post-receive plans exactly as a push would, and reports what it
    /// finds. Exits non-zero if the configuration could not run.
    Check {
        /// Git directory to check (defaults to $GIT_DIR, then the cwd)
        #[arg(long, env = "GIT_DIR")]
        git_dir: Option<PathBuf>,
    },

    /// Install the hook scripts into a repository
    ///
    /// Writes hooks/pre-receive and hooks/post-receive. Refuses to replace
    /// hooks it did not write itself unless --force is given.
    Install {
        /// Git directory to install into
        #[arg(long)]
        git_dir: PathBuf,

        /// Overwrite existing hooks not written by gatehouse
        #[arg(long)]
        force: bool,
    },
}

fn main() -> ExitCode {
    gatehouse::telemetry::init();

    // git executes hooks by path; when argv[0] is a hook name the
    // subcommand grammar is bypassed entirely.
    if let Some(hook) = hook_from_argv0() {
        return run_hook(hook);
    }

    let cli = Cli::parse();
    match cli.command {
        Commands::PreReceive => run_hook(HookType::PreReceive),
        Commands::PostReceive => run_hook(HookType::PostReceive),
        Commands::Check { git_dir } => exit_from(check::run(git_dir.as_deref())),
        Commands::Install { git_dir, force } => exit_from(install::run(&git_dir, force)),
    }
}

fn hook_from_argv0() -> Option<HookType> {
    let argv0 = std::env::args_os().next()?;
    let name = Path::new(&argv0).file_name()?.to_str()?;
    HookType::from_hook_name(name)
}

fn exit_from(result: anyhow::Result<()>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("gatehouse: {e:#}");
            ExitCode::FAILURE
        }
    }
}

/// Exit codes: 0 all passed, 1 push rejected, 2 deployment defect
/// (configuration or protocol error). git only cares about zero versus
/// non-zero; the 1/2 split is for operators reading hook logs.
fn run_hook(hook: HookType) -> ExitCode {
    match hook_main(hook) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let code = if e.is_hard() {
                ExitCode::from(2)
            } else {
                ExitCode::FAILURE
            };
            // stderr reaches the pushing user as `remote:` lines; include
            // the cause chain so a rejection explains itself.
            let report = anyhow::Error::new(e);
            eprintln!("gatehouse: {report:#}");
            code
        }
    }
}

/// Wire up one hook invocation and run it over stdin.
fn hook_main(hook: HookType) -> Result<(), HookError> {
    let git = CliGit::from_env()?;
    let project_config = ProjectConfig::load(&git.git_dir().join(PROJECT_CONFIG_FILE))?;
    let system = SystemConfig::load_default()?;

    let project = match &project_config.project {
        Some(name) => name.clone(),
        None => git.project_name()?,
    };

    let jenkins = match &system.jenkins {
        Some(cfg) => Some(JenkinsHttp::from_config(cfg).map_err(client_setup_error)?),
        None => None,
    };
    let gerrit = match &system.gerrit {
        Some(cfg) => Some(GerritHttp::from_config(cfg).map_err(client_setup_error)?),
        None => None,
    };
    let jira = match &system.jira {
        Some(cfg) => Some(JiraHttp::from_config(cfg).map_err(client_setup_error)?),
        None => None,
    };

    let mut registry = ActionRegistry::new(project.clone(), system.freeze.clone());
    if let Some(jenkins) = &jenkins {
        registry = registry.with_build_server(jenkins);
    }
    if let Some(gerrit) = &gerrit {
        registry = registry.with_review_server(gerrit);
    }
    if let Some(jira) = &jira {
        registry = registry.with_issue_tracker(jira);
    }

    let controller = HookController::new(&git, project, &project_config, registry);
    let stdin = std::io::stdin();
    controller.run(hook, stdin.lock())
}

/// A client that cannot even be constructed is a deployment defect, not a
/// commit defect.
fn client_setup_error(e: gatehouse::clients::ClientError) -> HookError {
    HookError::Config(ConfigError {
        path: None,
        message: format!("could not build HTTP client: {e}"),
    })
}
