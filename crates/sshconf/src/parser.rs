use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::host::Host;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read SSH config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// `<home>/.ssh/config`, or an empty path when no home directory is known.
pub fn default_config_path(home: Option<&Path>) -> PathBuf {
    match home {
        Some(home) => home.join(".ssh").join("config"),
        None => PathBuf::new(),
    }
}

/// Parse configuration text into hosts, in file order.
///
/// Never fails: blank lines, comments, single-token lines and directives
/// outside of any `Host` block are skipped.
pub fn parse_hosts(content: &str) -> Vec<Host> {
    let mut collector = HostCollector::default();
    for line in content.lines() {
        collector.feed(line);
    }
    collector.finish()
}

#[derive(Default)]
struct HostCollector {
    hosts: Vec<Host>,
    current: Option<Host>,
}

impl HostCollector {
    fn feed(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }

        let mut tokens = line.split_whitespace();
        let Some(directive) = tokens.next() else {
            return;
        };
        let value = tokens.collect::<Vec<_>>().join(" ");
        if value.is_empty() {
            return;
        }

        let key = directive.to_lowercase();
        if key == "host" {
            if let Some(host) = self.current.take() {
                self.hosts.push(host);
            }
            self.current = Some(Host::new(value));
            return;
        }

        let Some(host) = self.current.as_mut() else {
            return;
        };
        match key.as_str() {
            "hostname" => host.hostname = Some(value),
            "port" => host.port = Some(value),
            "user" => host.user = Some(value),
            _ => {
                host.options.insert(key, value);
            }
        }
    }

    fn finish(mut self) -> Vec<Host> {
        if let Some(host) = self.current.take() {
            self.hosts.push(host);
        }
        self.hosts
    }
}

/// Hosts read from one SSH config file.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    hosts: Vec<Host>,
}

impl ConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            hosts: Vec::new(),
        }
    }

    /// Store pointed at `<home>/.ssh/config`.
    pub fn with_home(home: Option<&Path>) -> Self {
        Self::new(default_config_path(home))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn hosts(&self) -> &[Host] {
        &self.hosts
    }

    /// Re-read the file, replacing every previously loaded host.
    ///
    /// Only I/O failures are errors; on error the host list is left empty.
    pub fn load(&mut self) -> Result<(), ConfigError> {
        self.hosts.clear();

        let io_err = |source| ConfigError::Io {
            path: self.path.clone(),
            source,
        };
        let file = File::open(&self.path).map_err(io_err)?;

        // Bytes that are not UTF-8 are replaced rather than rejected.
        let mut reader = BufReader::new(file);
        let mut collector = HostCollector::default();
        let mut buf = Vec::new();
        loop {
            buf.clear();
            if reader.read_until(b'\n', &mut buf).map_err(io_err)? == 0 {
                break;
            }
            collector.feed(&String::from_utf8_lossy(&buf));
        }

        self.hosts = collector.finish();
        log::info!(
            "Loaded {} hosts from {}",
            self.hosts.len(),
            self.path.display()
        );
        Ok(())
    }
}
