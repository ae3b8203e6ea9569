use anyhow::{bail, Context, Result};
use std::process::Command;

use sshconf::Host;

const FALLBACK_SHELL: &str = "/bin/bash";

/// Shell used to launch `ssh`: the configured one, then `$SHELL`, then bash.
pub fn resolve_shell(configured: Option<&str>, env_shell: Option<String>) -> String {
    configured
        .map(str::to_string)
        .or(env_shell.filter(|shell| !shell.trim().is_empty()))
        .unwrap_or_else(|| FALLBACK_SHELL.to_string())
}

/// `ssh '<name>'`, quoted so the shell passes the alias through untouched.
pub fn ssh_command_line(host: &Host) -> String {
    format!("ssh '{}'", host.name.replace('\'', r"'\''"))
}

/// Boxed summary printed before handing the terminal to ssh.
pub fn connection_summary(host: &Host) -> String {
    let mut rows = vec![format!("Connecting to {}", host.name)];
    if let Some(hostname) = &host.hostname {
        rows.push(format!("HostName: {}", hostname));
    }
    if let Some(user) = &host.user {
        rows.push(format!("User: {}", user));
    }
    if let Some(port) = &host.port {
        rows.push(format!("Port: {}", port));
    }

    let width = rows.iter().map(|row| row.chars().count()).max().unwrap_or(0);
    let border = "─".repeat(width + 2);

    let mut out = format!("╭{}╮\n", border);
    for row in &rows {
        out.push_str(&format!("│ {:<width$} │\n", row, width = width));
    }
    out.push_str(&format!("╰{}╯\n", border));
    out
}

/// Run ssh for `host` in an interactive shell, inheriting the terminal.
pub fn connect(host: &Host, configured_shell: Option<&str>) -> Result<()> {
    let shell = resolve_shell(configured_shell, std::env::var("SHELL").ok());
    let command_line = ssh_command_line(host);

    print!("{}", connection_summary(host));
    log::info!("Running {} -i -c {}", shell, command_line);

    let status = Command::new(&shell)
        .arg("-i")
        .arg("-c")
        .arg(&command_line)
        .status()
        .with_context(|| format!("failed to start {}", shell))?;

    if !status.success() {
        bail!("ssh to {} exited with {}", host.name, status);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_precedence() {
        assert_eq!(
            resolve_shell(Some("/bin/zsh"), Some("/bin/fish".into())),
            "/bin/zsh"
        );
        assert_eq!(resolve_shell(None, Some("/bin/fish".into())), "/bin/fish");
        assert_eq!(resolve_shell(None, Some(String::new())), FALLBACK_SHELL);
        assert_eq!(resolve_shell(None, None), FALLBACK_SHELL);
    }

    #[test]
    fn test_ssh_command_line_quotes_name() {
        assert_eq!(ssh_command_line(&Host::new("web")), "ssh 'web'");
        assert_eq!(ssh_command_line(&Host::new("it's")), r"ssh 'it'\''s'");
    }

    #[test]
    fn test_connection_summary_lists_known_fields() {
        let mut host = Host::new("db");
        host.hostname = Some("db.internal".to_string());
        host.port = Some("2222".to_string());

        let summary = connection_summary(&host);
        let lines: Vec<&str> = summary.lines().collect();

        assert_eq!(lines.len(), 5);
        assert!(lines[1].contains("Connecting to db"));
        assert!(lines[2].contains("HostName: db.internal"));
        assert!(lines[3].contains("Port: 2222"));
        assert!(!summary.contains("User:"));
        let widths: Vec<usize> = lines.iter().map(|l| l.chars().count()).collect();
        assert!(widths.iter().all(|w| *w == widths[0]));
    }
}
