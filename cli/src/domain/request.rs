//! Deployment request types and pure input validation.
//!
//! Zero imports from `tokio`, `std::fs`, `crate::infra`, `crate::commands`,
//! or `crate::application`.

use std::sync::LazyLock;

use regex::Regex;

use crate::domain::error::RequestError;

/// Project names are interpolated into remote paths and repository URLs.
pub static PROJECT_NAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]{0,99}$").expect("valid regex")
});

/// DNS names and IPv4 literals.
static HOSTNAME_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[A-Za-z0-9]([A-Za-z0-9-]{0,62})(\.[A-Za-z0-9]([A-Za-z0-9-]{0,62}))*$")
        .expect("valid regex")
});

/// POSIX login names.
static USER_RE: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[a-z_][a-z0-9_-]{0,31}$").expect("valid regex")
});

// ── Secret ────────────────────────────────────────────────────────────────────

/// A secret string that never prints its value.
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrow the secret value. Callers must not log the result.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Replace every occurrence of the secret in `text` with `[REDACTED]`.
    #[must_use]
    pub fn redact(&self, text: &str) -> String {
        if self.0.is_empty() {
            return text.to_string();
        }
        text.replace(&self.0, "[REDACTED]")
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

impl std::fmt::Display for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

// ── RemoteHost ────────────────────────────────────────────────────────────────

/// An SSH destination parsed from `[user@]host[:port]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteHost {
    pub user: Option<String>,
    pub host: String,
    pub port: Option<u16>,
}

impl RemoteHost {
    /// Parse and validate an SSH destination.
    ///
    /// IPv6 literals must be bracketed when a port is given (`[::1]:2222`).
    ///
    /// # Errors
    ///
    /// Returns `RequestError::InvalidHost` when any component is malformed.
    pub fn parse(input: &str) -> Result<Self, RequestError> {
        let invalid = |reason| RequestError::InvalidHost {
            host: input.to_string(),
            reason,
        };

        if input.is_empty() {
            return Err(invalid("must not be empty"));
        }
        if input.starts_with('-') {
            return Err(invalid("must not start with '-'"));
        }

        let (user, rest) = match input.split_once('@') {
            Some((user, rest)) => {
                if !USER_RE.is_match(user) {
                    return Err(invalid("user must be a valid login name"));
                }
                (Some(user.to_string()), rest)
            }
            None => (None, input),
        };

        let (host, port) = if let Some(bracketed) = rest.strip_prefix('[') {
            let (addr, after) = bracketed
                .split_once(']')
                .ok_or_else(|| invalid("unterminated '[' in IPv6 address"))?;
            if addr.parse::<std::net::Ipv6Addr>().is_err() {
                return Err(invalid("bracketed address must be IPv6"));
            }
            let port = if after.is_empty() {
                None
            } else {
                let p = after
                    .strip_prefix(':')
                    .ok_or_else(|| invalid("expected ':' after ']'"))?;
                Some(parse_port(p).ok_or_else(|| invalid("port must be 1-65535"))?)
            };
            (addr.to_string(), port)
        } else if rest.parse::<std::net::Ipv6Addr>().is_ok() {
            (rest.to_string(), None)
        } else {
            match rest.rsplit_once(':') {
                Some((h, p)) => (
                    h.to_string(),
                    Some(parse_port(p).ok_or_else(|| invalid("port must be 1-65535"))?),
                ),
                None => (rest.to_string(), None),
            }
        };

        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        if !is_ip && !HOSTNAME_RE.is_match(&host) {
            return Err(invalid("host must be a DNS name or IP address"));
        }

        Ok(Self { user, host, port })
    }

    /// `user@host` destination for ssh, falling back to `default_user`.
    #[must_use]
    pub fn destination(&self, default_user: &str) -> String {
        let user = self.user.as_deref().unwrap_or(default_user);
        format!("{user}@{}", self.host)
    }
}

impl std::fmt::Display for RemoteHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(user) = &self.user {
            write!(f, "{user}@")?;
        }
        let bracket = self.host.contains(':');
        match (bracket, self.port) {
            (true, Some(port)) => write!(f, "[{}]:{port}", self.host),
            (false, Some(port)) => write!(f, "{}:{port}", self.host),
            (_, None) => f.write_str(&self.host),
        }
    }
}

fn parse_port(s: &str) -> Option<u16> {
    s.parse::<u16>().ok().filter(|p| *p != 0)
}

// ── Validators ────────────────────────────────────────────────────────────────

/// Validates a project identifier.
///
/// # Errors
///
/// Returns `RequestError::InvalidProject` if the name could escape the
/// checkout root or the repository path.
pub fn validate_project(name: &str) -> Result<(), RequestError> {
    if !PROJECT_NAME_RE.is_match(name) || name.ends_with(".git") {
        return Err(RequestError::InvalidProject(name.to_string()));
    }
    Ok(())
}

/// Validates a branch name against the subset of `git check-ref-format`
/// rules that matter for shell and ref safety.
///
/// # Errors
///
/// Returns `RequestError::InvalidBranch` naming the first violated rule.
pub fn validate_branch(name: &str) -> Result<(), RequestError> {
    let reject = |reason| {
        Err(RequestError::InvalidBranch {
            name: name.to_string(),
            reason,
        })
    };

    if name.is_empty() {
        return reject("must not be empty");
    }
    if name == "@" {
        return reject("'@' is not a valid branch");
    }
    if name.starts_with('-') {
        return reject("must not start with '-'");
    }
    if name.starts_with('/') || name.ends_with('/') {
        return reject("must not start or end with '/'");
    }
    if name.ends_with(".lock") || name.ends_with('.') {
        return reject("must not end with '.lock' or '.'");
    }
    if name.contains("..") || name.contains("//") || name.contains("@{") {
        return reject("must not contain '..', '//' or '@{'");
    }
    if name
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || "~^:?*[\\".contains(c))
    {
        return reject("must not contain whitespace, control characters or any of ~^:?*[\\");
    }
    if name.split('/').any(|part| part.starts_with('.')) {
        return reject("path components must not start with '.'");
    }
    Ok(())
}

// ── DeploymentRequest ────────────────────────────────────────────────────────

/// Everything one deployment run needs from its caller.
///
/// Built once per invocation and never mutated.
#[derive(Debug, Clone)]
pub struct DeploymentRequest {
    project: String,
    branch: String,
    remote_host: RemoteHost,
    github_token: Secret,
}

impl DeploymentRequest {
    /// Validate raw inputs and build a request.
    ///
    /// # Errors
    ///
    /// Returns a `RequestError` if any input is invalid or the token is empty.
    pub fn new(
        project: &str,
        branch: &str,
        remote_host: &str,
        github_token: Secret,
    ) -> Result<Self, RequestError> {
        validate_project(project)?;
        validate_branch(branch)?;
        let remote_host = RemoteHost::parse(remote_host)?;
        if github_token.expose().trim().is_empty() {
            return Err(RequestError::MissingSecret("DEPLOYER_GIT_TOKEN"));
        }
        Ok(Self {
            project: project.to_string(),
            branch: branch.to_string(),
            remote_host,
            github_token,
        })
    }

    #[must_use]
    pub fn project(&self) -> &str {
        &self.project
    }

    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    #[must_use]
    pub fn remote_host(&self) -> &RemoteHost {
        &self.remote_host
    }

    #[must_use]
    pub fn github_token(&self) -> &Secret {
        &self.github_token
    }
}

/// `https://<source_host>/<org>/<project>.git`
#[must_use]
pub fn upstream_url(source_host: &str, org: &str, project: &str) -> String {
    format!("https://{source_host}/{org}/{project}.git")
}

/// `<checkout_root>/<project>` on the remote host.
#[must_use]
pub fn checkout_path(checkout_root: &str, project: &str) -> String {
    format!("{}/{project}", checkout_root.trim_end_matches('/'))
}
