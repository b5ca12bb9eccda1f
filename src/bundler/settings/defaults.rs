//! Default values for archive rules.

use super::{ArchiveConfig, ArchiveSpec, FileRule};
use crate::bundler::error::{Error, Result};
use std::collections::BTreeMap;

/// Archive name template used when none is configured.
pub const DEFAULT_NAME_TEMPLATE: &str =
    "{{ProjectName}}_{{Version}}_{{Os}}_{{Arch}}{{#if Arm}}v{{Arm}}{{/if}}{{#if Mips}}_{{Mips}}{{/if}}";

/// Name template for the `binary` format when none is configured.
pub const DEFAULT_BINARY_NAME_TEMPLATE: &str =
    "{{Binary}}_{{Version}}_{{Os}}_{{Arch}}{{#if Arm}}v{{Arm}}{{/if}}{{#if Mips}}_{{Mips}}{{/if}}";

/// Identifier given to archive rules without one.
pub const DEFAULT_ID: &str = "default";

/// Globs for license, readme and changelog files, in both spellings and cases.
pub const DEFAULT_FILES: [&str; 8] = [
    "licence*",
    "LICENCE*",
    "license*",
    "LICENSE*",
    "readme*",
    "README*",
    "changelog*",
    "CHANGELOG*",
];

/// Counts identifiers within one configuration section.
#[derive(Debug)]
pub struct IdCounter {
    section: &'static str,
    counts: BTreeMap<String, usize>,
}

impl IdCounter {
    /// Creates an empty counter for `section`.
    pub fn new(section: &'static str) -> Self {
        Self {
            section,
            counts: BTreeMap::new(),
        }
    }

    /// Records one use of `id`.
    pub fn inc(&mut self, id: &str) {
        *self.counts.entry(id.to_string()).or_default() += 1;
    }

    /// Fails on the first identifier used more than once.
    pub fn validate(&self) -> Result<()> {
        match self.counts.iter().find(|(_, count)| **count > 1) {
            Some((id, count)) => Err(Error::DuplicateId {
                section: self.section,
                id: id.clone(),
                count: *count,
            }),
            None => Ok(()),
        }
    }
}

/// Fills unset fields of every archive rule and checks identifier uniqueness.
///
/// An empty list yields a single rule built entirely from defaults.
/// `build_ids` are the configured build identifiers, used for rules that do
/// not name their builds.
pub fn resolve_archives(
    configs: Vec<ArchiveConfig>,
    build_ids: &[String],
) -> Result<Vec<ArchiveSpec>> {
    let configs = if configs.is_empty() {
        vec![ArchiveConfig::default()]
    } else {
        configs
    };

    let mut ids = IdCounter::new("archives");
    let mut specs = Vec::with_capacity(configs.len());

    for config in configs {
        let format = config.format.unwrap_or_default();
        let id = config
            .id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| DEFAULT_ID.to_string());

        let files = if config.files.is_empty() {
            DEFAULT_FILES.iter().map(|glob| FileRule::glob(*glob)).collect()
        } else {
            config.files
        };

        let name_template = match config.name_template.filter(|t| !t.is_empty()) {
            Some(template) => template,
            None if format.is_binary() => DEFAULT_BINARY_NAME_TEMPLATE.to_string(),
            None => DEFAULT_NAME_TEMPLATE.to_string(),
        };

        let builds = match config.builds {
            Some(builds) if !builds.is_empty() => builds,
            _ => build_ids.to_vec(),
        };

        ids.inc(&id);
        specs.push(ArchiveSpec {
            id,
            format,
            format_overrides: config.format_overrides,
            wrap_in_directory: config.wrap_in_directory,
            name_template,
            files,
            builds,
            replacements: config.replacements,
            allow_different_binary_count: config.allow_different_binary_count,
        });
    }

    ids.validate()?;
    Ok(specs)
}
