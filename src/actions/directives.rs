//! Commit-message directives understood by the build actions.
//!
//! Directives are curly-brace tokens authors put in the commit message to
//! steer the pipeline: `{nobuild: "reason"}` skips build submission,
//! `{deploy}` submits the deploy job instead of the default one. The
//! build-fix token checked by the health gate is configurable and matched
//! verbatim, so it is not parsed here.

use std::sync::LazyLock;

use regex::Regex;

static NOBUILD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"\{nobuild:\s*"([^"]*)"\s*\}"#).expect("nobuild pattern is valid")
});

/// The reason string from a `{nobuild: "..."}` directive, if present.
pub(crate) fn nobuild_reason(message: &str) -> Option<&str> {
    NOBUILD
        .captures(message)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// `true` if the message carries the `{deploy}` directive.
pub(crate) fn wants_deploy(message: &str) -> bool {
    message.contains("{deploy}")
}
