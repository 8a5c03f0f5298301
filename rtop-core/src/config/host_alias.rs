//! Host alias resolution from the per-user SSH config
//!
//! Only the `Host`, `HostName`, `Port`, `User` and `IdentityFile` directives
//! are understood; everything else is ignored. Sections keep the order in
//! which they were first defined, which decides ties between glob patterns.

use std::path::Path;

use regex::Regex;

use crate::error::{ConfigError, ConfigResult};

/// Pattern of the section that supplies defaults
pub const DEFAULTS_PATTERN: &str = "*";

/// Settings collected under one `Host` pattern
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostAliasSection {
    /// `HostName` override
    pub hostname: Option<String>,
    /// `Port` override
    pub port: Option<u16>,
    /// `User` override
    pub user: Option<String>,
    /// `IdentityFile` path, unexpanded
    pub identity_file: Option<String>,
}

/// Connection fields resolved for one alias
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedHost {
    /// Host to connect to
    pub hostname: String,
    /// Port, if any section set one
    pub port: Option<u16>,
    /// User, if any section set one
    pub user: Option<String>,
    /// Identity file, if any section set one
    pub identity_file: Option<String>,
}

/// Parsed host alias table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasTable {
    sections: Vec<(String, HostAliasSection)>,
}

impl AliasTable {
    /// Loads an alias table from `path`.
    ///
    /// A missing file yields an empty table.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file exists but cannot be read.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let table = Self::parse(&content);
                tracing::debug!(path = %path.display(), sections = table.len(), "Loaded host aliases");
                Ok(table)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No SSH config file");
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }

    /// Parses alias table text.
    ///
    /// Malformed lines are skipped.
    #[must_use]
    pub fn parse(content: &str) -> Self {
        let mut table = Self::default();
        // Indices of the sections opened by the most recent `Host` line
        let mut open: Vec<usize> = Vec::new();

        for (lineno, raw) in content.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let parts: Vec<&str> = line.split_whitespace().collect();
            let key = parts[0].to_ascii_lowercase();

            if key == "host" {
                if parts.len() < 2 {
                    tracing::trace!(line = lineno + 1, "Skipping Host line without patterns");
                    continue;
                }
                open = parts[1..].iter().map(|p| table.section_index(p)).collect();
                continue;
            }

            if parts.len() != 2 || open.is_empty() {
                tracing::trace!(line = lineno + 1, "Skipping SSH config line");
                continue;
            }
            let value = parts[1];

            let port = match key.as_str() {
                "hostname" | "user" | "identityfile" => None,
                "port" => match value.parse::<u16>() {
                    Ok(port) if port > 0 => Some(port),
                    _ => {
                        tracing::trace!(line = lineno + 1, value, "Skipping invalid port");
                        continue;
                    }
                },
                _ => continue,
            };

            for &idx in &open {
                let section = &mut table.sections[idx].1;
                match key.as_str() {
                    "hostname" => section.hostname = Some(value.to_string()),
                    "user" => section.user = Some(value.to_string()),
                    "identityfile" => section.identity_file = Some(value.to_string()),
                    _ => section.port = port,
                }
            }
        }

        table
    }

    /// Number of distinct `Host` patterns
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len()
    }

    /// Returns `true` if no `Host` pattern was defined
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    /// Returns the section defined under exactly `pattern`
    #[must_use]
    pub fn section(&self, pattern: &str) -> Option<&HostAliasSection> {
        self.sections
            .iter()
            .find(|(p, _)| p == pattern)
            .map(|(_, s)| s)
    }

    /// Resolves `alias` to connection fields.
    ///
    /// An exact pattern match wins; otherwise the first-defined glob pattern
    /// (other than `*`) that matches. Fields the selected section leaves
    /// unset come from the `*` section. Without any match the alias itself
    /// is the hostname.
    #[must_use]
    pub fn resolve(&self, alias: &str) -> ResolvedHost {
        let defaults = self.section(DEFAULTS_PATTERN).cloned().unwrap_or_default();

        let selected = self.section(alias).or_else(|| {
            self.sections
                .iter()
                .filter(|(p, _)| p != DEFAULTS_PATTERN)
                .find(|(p, _)| glob_matches(p, alias))
                .map(|(_, s)| s)
        });

        let hostname = match selected {
            Some(section) => section
                .hostname
                .clone()
                .or_else(|| defaults.hostname.clone())
                .unwrap_or_else(|| alias.to_string()),
            None => alias.to_string(),
        };
        let section = selected.cloned().unwrap_or_default();

        ResolvedHost {
            hostname,
            port: section.port.or(defaults.port),
            user: section.user.or(defaults.user),
            identity_file: section.identity_file.or(defaults.identity_file),
        }
    }

    fn section_index(&mut self, pattern: &str) -> usize {
        if let Some(idx) = self.sections.iter().position(|(p, _)| p == pattern) {
            return idx;
        }
        self.sections
            .push((pattern.to_string(), HostAliasSection::default()));
        self.sections.len() - 1
    }
}

/// Matches `name` against a `Host` pattern with `*` and `?` wildcards
#[must_use]
pub fn glob_matches(pattern: &str, name: &str) -> bool {
    if !pattern.contains(['*', '?']) {
        return pattern == name;
    }
    let translated = regex::escape(pattern)
        .replace(r"\*", ".*")
        .replace(r"\?", ".");
    Regex::new(&format!("^{translated}$")).is_ok_and(|re| re.is_match(name))
}
