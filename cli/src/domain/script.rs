//! Remote shell scripts for each deploy step.
//!
//! Scripts are plain strings sent to `bash -s` over SSH stdin, so the git
//! token never appears in a process argument list on either host. Every
//! interpolated value goes through [`shell_quote`].

use crate::domain::request::Secret;
use crate::domain::steps::DeployStep;

/// Remote environment variable that carries the token inside one script.
pub const TOKEN_ENV: &str = "DEPLOYER_GIT_TOKEN";

/// Username sent with token authentication over HTTPS.
const TOKEN_USERNAME: &str = "x-access-token";

/// Quote `s` for a POSIX shell as a single word.
#[must_use]
pub fn shell_quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "'\\''"))
}

// ── Credential scope ─────────────────────────────────────────────────────────

/// Git credentials scoped to a single remote shell.
///
/// Expressed as command-scope git configuration through `GIT_CONFIG_COUNT`,
/// so nothing is written to the remote user's global git config and
/// concurrent runs cannot observe each other's token.
#[derive(Debug, Clone)]
pub struct GitCredentialScope {
    source_host: String,
    token: Secret,
}

impl GitCredentialScope {
    #[must_use]
    pub fn new(source_host: &str, token: Secret) -> Self {
        Self {
            source_host: source_host.to_string(),
            token,
        }
    }

    #[must_use]
    pub fn token(&self) -> &Secret {
        &self.token
    }

    /// Ordered `(key, value)` git config entries applied by the scope.
    ///
    /// The empty `credential.helper` clears helpers from every other config
    /// scope before the token helper is registered.
    #[must_use]
    pub fn config_entries(&self) -> Vec<(String, String)> {
        let host = &self.source_host;
        let https_base = format!("https://{host}/");
        let helper = format!(
            "!f() {{ test \"$1\" = get || exit 0; echo username={TOKEN_USERNAME}; echo \"password=${{{TOKEN_ENV}}}\"; }}; f"
        );
        vec![
            ("credential.helper".to_string(), String::new()),
            (format!("credential.https://{host}.helper"), helper),
            (
                format!("url.{https_base}.insteadOf"),
                format!("ssh://git@{host}/"),
            ),
            (format!("url.{https_base}.insteadOf"), format!("git@{host}:")),
        ]
    }

    /// Shell lines exporting the scope into the current remote shell.
    #[must_use]
    pub fn prelude(&self) -> String {
        let entries = self.config_entries();
        let mut out = String::new();
        out.push_str("export GIT_TERMINAL_PROMPT=0\n");
        out.push_str(&format!(
            "export {TOKEN_ENV}={}\n",
            shell_quote(self.token.expose())
        ));
        out.push_str(&format!("export GIT_CONFIG_COUNT={}\n", entries.len()));
        for (i, (key, value)) in entries.iter().enumerate() {
            out.push_str(&format!("export GIT_CONFIG_KEY_{i}={}\n", shell_quote(key)));
            out.push_str(&format!(
                "export GIT_CONFIG_VALUE_{i}={}\n",
                shell_quote(value)
            ));
        }
        out
    }
}

// ── Remote layout ────────────────────────────────────────────────────────────

/// Where things live on the remote host for one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    /// Absolute checkout directory.
    pub checkout: String,
    /// Upstream clone URL.
    pub upstream_url: String,
    /// Virtual environment directory, relative to the checkout.
    pub venv: String,
    /// Install entrypoint, run from the checkout.
    pub install: String,
    /// Control entrypoint; `stop`/`start` are appended.
    pub control: String,
}

impl RemoteLayout {
    fn cd(&self) -> String {
        format!("cd {}\n", shell_quote(&self.checkout))
    }

    fn activate(&self) -> String {
        let activate = format!("{}/bin/activate", self.venv.trim_end_matches('/'));
        let quoted = shell_quote(&activate);
        format!("if [ -f {quoted} ]; then set +u; . {quoted}; set -u; fi\n")
    }

    fn parent_dir(&self) -> &str {
        match self.checkout.rsplit_once('/') {
            Some(("", _)) | None => "/",
            Some((parent, _)) => parent,
        }
    }
}

/// Header shared by every script: fail on any error, unset variable, or
/// failed pipeline stage.
const STRICT_MODE: &str = "set -euo pipefail\n";

/// Build the script for `step`.
///
/// `scope` is applied to steps where [`DeployStep::needs_credentials`]
/// holds and ignored otherwise. `Credentials` has no remote command of its
/// own and yields only the strict-mode header.
#[must_use]
pub fn step_script(
    step: DeployStep,
    layout: &RemoteLayout,
    branch: &str,
    scope: Option<&GitCredentialScope>,
) -> String {
    let mut script = String::from(STRICT_MODE);
    if step.needs_credentials() {
        if let Some(scope) = scope {
            script.push_str(&scope.prelude());
        }
    }
    let branch_q = shell_quote(branch);
    match step {
        DeployStep::Credentials => {}
        DeployStep::Probe => {
            script.push_str(&format!(
                "test -d {}\n",
                shell_quote(&format!("{}/.git", layout.checkout))
            ));
        }
        DeployStep::Clone => {
            script.push_str(&format!("mkdir -p {}\n", shell_quote(layout.parent_dir())));
            script.push_str(&format!(
                "git clone --branch {branch_q} -- {} {}\n",
                shell_quote(&layout.upstream_url),
                shell_quote(&layout.checkout)
            ));
        }
        DeployStep::Fetch => {
            script.push_str(&layout.cd());
            script.push_str("git fetch --prune origin\n");
        }
        DeployStep::Checkout => {
            script.push_str(&layout.cd());
            script.push_str(&format!("git checkout {branch_q}\n"));
        }
        DeployStep::Pull => {
            script.push_str(&layout.cd());
            script.push_str(&format!("git pull --ff-only origin {branch_q}\n"));
        }
        DeployStep::Reset => {
            script.push_str(&layout.cd());
            script.push_str(&format!(
                "git reset --hard {}\n",
                shell_quote(&format!("origin/{branch}"))
            ));
        }
        DeployStep::Install => {
            script.push_str(&layout.cd());
            script.push_str(&layout.activate());
            script.push_str(&layout.install);
            script.push('\n');
        }
        DeployStep::Stop | DeployStep::Start => {
            script.push_str(&layout.cd());
            script.push_str(&layout.activate());
            script.push_str(&format!("{} {step}\n", layout.control));
        }
        DeployStep::Verify => {
            script.push_str(&layout.cd());
            script.push_str("git rev-parse HEAD\n");
            script.push_str(&format!(
                "git rev-parse {}\n",
                shell_quote(&format!("origin/{branch}"))
            ));
        }
    }
    script
}

/// Read-only status script: prints `absent`, or `present` followed by the
/// current branch, HEAD, and upstream tip (empty when unknown).
#[must_use]
pub fn status_script(layout: &RemoteLayout, branch: &str) -> String {
    let git_dir = shell_quote(&format!("{}/.git", layout.checkout));
    let upstream = shell_quote(&format!("origin/{branch}"));
    format!(
        "{STRICT_MODE}if [ ! -d {git_dir} ]; then echo absent; exit 0; fi\n\
         {cd}echo present\n\
         git rev-parse --abbrev-ref HEAD\n\
         git rev-parse HEAD\n\
         git rev-parse --verify --quiet {upstream} || echo\n",
        cd = layout.cd(),
    )
}

/// Parse the two SHAs printed by the `Verify` step.
///
/// Returns `None` unless the output has exactly two hex object ids.
#[must_use]
pub fn parse_verify_output(stdout: &str) -> Option<(String, String)> {
    let mut lines = stdout.lines().map(str::trim).filter(|l| !l.is_empty());
    let head = lines.next()?;
    let upstream = lines.next()?;
    if lines.next().is_some() || !is_object_id(head) || !is_object_id(upstream) {
        return None;
    }
    Some((head.to_string(), upstream.to_string()))
}

/// SHA-1 or SHA-256 hex object id.
#[must_use]
pub fn is_object_id(s: &str) -> bool {
    (s.len() == 40 || s.len() == 64) && s.chars().all(|c| c.is_ascii_hexdigit())
}
