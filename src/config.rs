//! gatehouse configuration.
//!
//! Two TOML files drive the pipeline:
//!
//! - **Per-repository** (`gatehouse.toml` in the git directory): the project
//!   name override, the ref watch-list, and the ordered `[[pre_receive]]` /
//!   `[[post_receive]]` action tables.
//! - **System-wide** (`/etc/gatehouse/system.toml`, overridable via
//!   `GATEHOUSE_SYSTEM_CONFIG`): freeze policy and the Jenkins/Gerrit/JIRA
//!   endpoints shared by every repository on the host.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

/// File name of the per-repository configuration, relative to the git
/// directory.
pub const PROJECT_CONFIG_FILE: &str = "gatehouse.toml";

/// Default location of the system-wide configuration.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/gatehouse/system.toml";

/// Environment variable overriding [`SYSTEM_CONFIG_PATH`].
pub const SYSTEM_CONFIG_ENV: &str = "GATEHOUSE_SYSTEM_CONFIG";

// ---------------------------------------------------------------------------
// ProjectConfig
// ---------------------------------------------------------------------------

/// Per-repository configuration.
///
/// Parsed from `gatehouse.toml` in the git directory. Missing fields use
/// defaults; a missing file means "no actions configured" (every push passes
/// untouched), not an error.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProjectConfig {
    /// Project name override. When absent the name is derived from the git
    /// directory (`widget.git` -> `widget`).
    pub project: Option<String>,

    /// Refs for which hook processing is performed. Updates to any other ref
    /// are logged and skipped before a single git call is made.
    #[serde(default = "default_watch_refs")]
    pub watch_refs: Vec<String>,

    /// Ordered actions evaluated before a push is accepted. The first
    /// failure rejects the push.
    #[serde(default)]
    pub pre_receive: Vec<ActionEntry>,

    /// Ordered actions evaluated after a push is accepted. Failures are
    /// logged and never affect the push.
    #[serde(default)]
    pub post_receive: Vec<ActionEntry>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            project: None,
            watch_refs: default_watch_refs(),
            pre_receive: Vec::new(),
            post_receive: Vec::new(),
        }
    }
}

fn default_watch_refs() -> Vec<String> {
    // Both spellings of the integration branch; repositories with other
    // conventions set `watch_refs` explicitly.
    vec!["refs/heads/main".to_owned(), "refs/heads/master".to_owned()]
}

// ---------------------------------------------------------------------------
// ActionEntry
// ---------------------------------------------------------------------------

/// One configured hook action.
///
/// The `action` tag selects the behavior; the remaining fields are
/// per-action parameters, each ignored by actions that do not use it.
/// Which parameters are required for which action is validated when the
/// run plan is built, before any action executes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ActionEntry {
    /// Which action to run.
    pub action: ActionKind,

    /// Disabled entries are skipped without being constructed. They are
    /// still parsed, so a disabled entry with a bad shape is caught.
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Build job name for `build-trigger` and `build-health-gate`. Supports
    /// a `{project}` placeholder; defaults to the project name itself.
    pub job: Option<String>,

    /// Job submitted instead of `job` when a commit message carries the
    /// `{deploy}` directive. Only read by `build-trigger`.
    pub deploy_job: Option<String>,

    /// Commit-subject token exempting a commit from an unhealthy build
    /// gate. Only read by `build-health-gate`; default `{buildFix}`.
    pub build_fix_token: Option<String>,
}

const fn default_enabled() -> bool {
    true
}

impl ActionEntry {
    /// Resolve the build job name for `project`, expanding the `{project}`
    /// placeholder.
    #[must_use]
    pub fn job_for(&self, project: &str) -> String {
        self.job
            .as_deref()
            .map_or_else(|| project.to_owned(), |j| j.replace("{project}", project))
    }

    /// The effective build-fix token.
    #[must_use]
    pub fn build_fix_token(&self) -> &str {
        self.build_fix_token.as_deref().unwrap_or("{buildFix}")
    }
}

/// The closed set of hook actions.
///
/// Configuration names one of these tags; there is no lookup of arbitrary
/// identifiers at runtime, so a typo here fails the parse rather than a
/// push at midnight.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ActionKind {
    /// Submit a build for the pushed commit.
    BuildTrigger,
    /// Reject commits while the build is broken ("stop the line").
    BuildHealthGate,
    /// Require an approved review matching the commit's Change-Id.
    ReviewApprovalGate,
    /// Reject pushes to frozen projects.
    CodeFreezeGate,
    /// Mark the matching review merged.
    ReviewMergeNotifier,
    /// Abandon open reviews superseded by this push.
    ReviewAbandonNotifier,
    /// Comment on issues referenced by the commit message.
    IssueCommentNotifier,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuildTrigger => write!(f, "build-trigger"),
            Self::BuildHealthGate => write!(f, "build-health-gate"),
            Self::ReviewApprovalGate => write!(f, "review-approval-gate"),
            Self::CodeFreezeGate => write!(f, "code-freeze-gate"),
            Self::ReviewMergeNotifier => write!(f, "review-merge-notifier"),
            Self::ReviewAbandonNotifier => write!(f, "review-abandon-notifier"),
            Self::IssueCommentNotifier => write!(f, "issue-comment-notifier"),
        }
    }
}

// ---------------------------------------------------------------------------
// SystemConfig
// ---------------------------------------------------------------------------

/// Host-wide configuration shared by all repositories.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct SystemConfig {
    /// Code-freeze policy.
    #[serde(default)]
    pub freeze: FreezeConfig,

    /// Build server endpoint. Required by `build-trigger` and
    /// `build-health-gate`.
    pub jenkins: Option<JenkinsConfig>,

    /// Review server endpoint. Required by the review gate and notifiers.
    pub gerrit: Option<GerritConfig>,

    /// Issue tracker endpoint. Required by `issue-comment-notifier`.
    pub jira: Option<JiraConfig>,
}

/// Code-freeze policy.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct FreezeConfig {
    /// Frozen project names, or the single sentinel `"all"`.
    #[serde(default)]
    pub frozen: Vec<String>,

    /// Users allowed to push to frozen projects.
    #[serde(default)]
    pub superusers: Vec<String>,

    /// Name of the environment variable carrying the pushing user. When
    /// unset, the superuser bypass is disabled entirely and a freeze applies
    /// to everyone.
    pub user_env: Option<String>,
}

impl FreezeConfig {
    /// Return `true` if `project` is frozen.
    #[must_use]
    pub fn is_frozen(&self, project: &str) -> bool {
        self.frozen.iter().any(|f| f == "all" || f == project)
    }

    /// Return `true` if `user` may push despite a freeze.
    #[must_use]
    pub fn is_superuser(&self, user: &str) -> bool {
        self.superusers.iter().any(|u| u == user)
    }
}

/// Jenkins endpoint settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JenkinsConfig {
    /// Base URL, e.g. `https://ci.example.com`.
    pub url: String,

    /// Basic-auth user.
    pub user: Option<String>,

    /// API token for `user`.
    pub token: Option<String>,

    /// Connect/read timeout for each request.
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

/// Gerrit endpoint settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GerritConfig {
    /// Base URL, e.g. `https://review.example.com`.
    pub url: String,

    /// HTTP-auth user.
    pub user: Option<String>,

    /// HTTP password for `user` (Gerrit's generated password, not LDAP).
    pub password: Option<String>,

    /// Connect/read timeout for each request.
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

/// JIRA endpoint settings.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JiraConfig {
    /// Base URL, e.g. `https://jira.example.com`.
    pub url: String,

    /// Basic-auth user.
    pub user: Option<String>,

    /// API token for `user`.
    pub token: Option<String>,

    /// Connect/read timeout for each request.
    #[serde(default = "default_http_timeout")]
    pub timeout_seconds: u64,
}

const fn default_http_timeout() -> u64 {
    10
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Error loading a gatehouse configuration file.
#[derive(Debug)]
pub struct ConfigError {
    /// The path that was being loaded (if available).
    pub path: Option<std::path::PathBuf>,
    /// Human-readable message with line-level detail when possible.
    pub message: String,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(p) = &self.path {
            write!(f, "{}: {}", p.display(), self.message)
        } else {
            write!(f, "config error: {}", self.message)
        }
    }
}

impl std::error::Error for ConfigError {}

fn parse_toml<T: serde::de::DeserializeOwned>(toml_str: &str) -> Result<T, ConfigError> {
    toml::from_str(toml_str).map_err(|e| {
        let mut message = e.message().to_owned();
        if let Some(span) = e.span() {
            // Calculate line number from byte offset.
            let line = toml_str[..span.start]
                .chars()
                .filter(|&c| c == '\n')
                .count()
                + 1;
            message = format!("line {line}: {message}");
        }
        ConfigError {
            path: None,
            message,
        }
    })
}

fn load_toml<T: serde::de::DeserializeOwned + Default>(path: &Path) -> Result<T, ConfigError> {
    let contents = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(T::default());
        }
        Err(e) => {
            return Err(ConfigError {
                path: Some(path.to_owned()),
                message: format!("could not read file: {e}"),
            });
        }
    };
    parse_toml(&contents).map_err(|mut e: ConfigError| {
        e.path = Some(path.to_owned());
        e
    })
}

impl ProjectConfig {
    /// Load the per-repository configuration from a TOML file.
    ///
    /// - If the file does not exist, returns all defaults (not an error).
    /// - If the file exists but contains invalid TOML, unknown fields, or an
    ///   unknown action tag, returns a [`ConfigError`] with line-level
    ///   detail.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse
    /// errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    /// Parse the per-repository configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        parse_toml(toml_str)
    }
}

impl SystemConfig {
    /// Load the system-wide configuration.
    ///
    /// Missing file means defaults: no freeze, no endpoints configured.
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse
    /// errors.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        load_toml(path)
    }

    /// The path [`load_default`](Self::load_default) reads:
    /// [`SYSTEM_CONFIG_ENV`] if set, else [`SYSTEM_CONFIG_PATH`].
    #[must_use]
    pub fn default_path() -> std::path::PathBuf {
        std::env::var_os(SYSTEM_CONFIG_ENV)
            .map_or_else(|| std::path::PathBuf::from(SYSTEM_CONFIG_PATH), Into::into)
    }

    /// Load from [`default_path`](Self::default_path).
    ///
    /// # Errors
    /// Returns `ConfigError` on I/O errors (other than not-found) or parse
    /// errors.
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(&Self::default_path())
    }

    /// Parse the system-wide configuration from a TOML string.
    ///
    /// # Errors
    /// Returns `ConfigError` on invalid TOML or unknown fields.
    pub fn parse(toml_str: &str) -> Result<Self, ConfigError> {
        parse_toml(toml_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
