//! Name template rendering.
//!
//! Templates use Handlebars syntax in strict mode: referencing a field that
//! does not exist is an error rather than an empty string. Output is not
//! HTML-escaped.
//!
//! # Fields
//!
//! | Field | Value |
//! |-------|-------|
//! | `ProjectName`, `Version`, `Tag` | from [`Settings`] |
//! | `Major`, `Minor`, `Patch` | semver parts of the version (empty if not semver) |
//! | `Date`, `Timestamp` | run time, RFC 3339 and unix seconds |
//! | `Env` | environment map |
//! | `Os`, `Arch`, `Arm`, `Mips` | artifact platform, after replacements |
//! | `Binary`, `ArtifactName` | artifact binary name and display name |

use crate::bundler::{
    artifact::Artifact,
    error::{Error, Result},
    settings::Settings,
};
use handlebars::Handlebars;
use serde_json::{Value, json};
use std::collections::BTreeMap;

/// A set of template fields ready to render strings.
#[derive(Debug, Clone)]
pub struct Template {
    fields: BTreeMap<&'static str, Value>,
}

impl Template {
    /// Template with the project-wide fields of `settings`.
    pub fn new(settings: &Settings) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert("ProjectName", json!(settings.project_name()));
        fields.insert("Version", json!(settings.version_string()));
        fields.insert("Tag", json!(settings.tag()));

        let semver = semver::Version::parse(settings.version_string().trim_start_matches('v')).ok();
        let part = |f: fn(&semver::Version) -> u64| {
            semver
                .as_ref()
                .map(|v| f(v).to_string())
                .unwrap_or_default()
        };
        fields.insert("Major", json!(part(|v| v.major)));
        fields.insert("Minor", json!(part(|v| v.minor)));
        fields.insert("Patch", json!(part(|v| v.patch)));

        fields.insert("Date", json!(settings.date().to_rfc3339()));
        fields.insert("Timestamp", json!(settings.date().timestamp()));
        fields.insert("Env", json!(settings.env()));

        Self { fields }
    }

    /// Adds the platform and name fields of `artifact`.
    ///
    /// `Os`, `Arch`, `Arm` and `Mips` are looked up in `replacements` and
    /// replaced when a mapping exists. Missing ARM/MIPS variants render as
    /// empty strings.
    pub fn with_artifact(
        mut self,
        artifact: &Artifact,
        replacements: &BTreeMap<String, String>,
    ) -> Self {
        let replace = |value: &str| -> String {
            replacements
                .get(value)
                .cloned()
                .unwrap_or_else(|| value.to_string())
        };
        let platform = &artifact.platform;

        self.fields.insert("Os", json!(replace(&platform.os)));
        self.fields.insert("Arch", json!(replace(&platform.arch)));
        self.fields.insert(
            "Arm",
            json!(platform.arm.as_deref().map(replace).unwrap_or_default()),
        );
        self.fields.insert(
            "Mips",
            json!(platform.mips.as_deref().map(replace).unwrap_or_default()),
        );
        self.fields.insert("Binary", json!(artifact.binary_name()));
        self.fields.insert("ArtifactName", json!(artifact.name));
        self
    }

    /// Renders `template` with these fields.
    ///
    /// An empty template renders to an empty string.
    pub fn apply(&self, template: &str) -> Result<String> {
        if template.is_empty() {
            return Ok(String::new());
        }

        let mut handlebars = Handlebars::new();
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(true);

        handlebars
            .render_template(template, &self.fields)
            .map_err(|e| Error::Template {
                template: template.to_string(),
                reason: e.to_string(),
            })
    }
}
