use std::collections::HashMap;

/// One `Host` block of an SSH client configuration.
///
/// `hostname`, `port` and `user` are lifted out of the directive list; every
/// other directive lands in `options`, keyed by its lowercased name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Host {
    pub name: String,
    pub hostname: Option<String>,
    pub port: Option<String>,
    pub user: Option<String>,
    pub options: HashMap<String, String>,
}

impl Host {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn option(&self, key: &str) -> Option<&str> {
        self.options.get(&key.to_ascii_lowercase()).map(String::as_str)
    }

    /// Options in key order, for stable display.
    pub fn sorted_options(&self) -> Vec<(&str, &str)> {
        let mut options: Vec<(&str, &str)> = self
            .options
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        options.sort_by(|a, b| a.0.cmp(b.0));
        options
    }
}
