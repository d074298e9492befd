//! Git output and remote URL parsing helpers.

use std::process::Output;
use std::sync::OnceLock;

use regex::Regex;

/// Formats a git error with both stdout and stderr for better debugging.
pub fn format_git_error(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
    let stdout = String::from_utf8_lossy(&output.stdout).trim().to_string();

    match (stderr.is_empty(), stdout.is_empty()) {
        (true, true) => format!(
            "Command failed with exit code {}",
            output.status.code().unwrap_or(-1)
        ),
        (true, false) => stdout,
        (false, true) => stderr,
        (false, false) => format!("{}\n{}", stderr, stdout),
    }
}

fn ssh_host_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r".+@(.+?):").expect("valid regex"))
}

fn http_host_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://(.+?)/").expect("valid regex"))
}

/// Extracts the host of an scp-style (`git@host:org/repo.git`) or HTTP(S)
/// remote URL. Local paths and `file://` URLs yield `None`.
pub fn git_host(url: &str) -> Option<String> {
    ssh_host_regex()
        .captures(url)
        .or_else(|| http_host_regex().captures(url))
        .map(|c| c[1].to_string())
}

/// Whether a `known_hosts` file already has an unhashed entry for `host`.
pub fn known_hosts_contains(content: &str, host: &str) -> bool {
    let with_comma = format!("{},", host);
    let with_space = format!("{} ", host);
    content.lines().map(str::trim).any(|line| {
        line.starts_with(&with_comma) || line.starts_with(&with_space)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_host_ssh() {
        assert_eq!(
            git_host("git@github.com:acme/cluster-backup.git").as_deref(),
            Some("github.com")
        );
        assert_eq!(
            git_host("ssh://git@git.example.com:2222/acme/backup.git").as_deref(),
            Some("git.example.com")
        );
    }

    #[test]
    fn test_git_host_https() {
        assert_eq!(
            git_host("https://gitlab.example.com/ops/backup.git").as_deref(),
            Some("gitlab.example.com")
        );
        assert_eq!(
            git_host("http://10.0.0.5/ops/backup.git").as_deref(),
            Some("10.0.0.5")
        );
    }

    #[test]
    fn test_git_host_local() {
        assert_eq!(git_host("/srv/git/backup.git"), None);
        assert_eq!(git_host("file:///srv/git/backup.git"), None);
    }

    #[test]
    fn test_known_hosts_contains() {
        let content = "\
github.com,140.82.121.4 ssh-rsa AAAA
  gitlab.example.com ecdsa-sha2-nistp256 AAAA
|1|hashed= ssh-ed25519 AAAA
";
        assert!(known_hosts_contains(content, "github.com"));
        assert!(known_hosts_contains(content, "gitlab.example.com"));
        assert!(!known_hosts_contains(content, "example.com"));
        assert!(!known_hosts_contains(content, "github.co"));
    }
}
