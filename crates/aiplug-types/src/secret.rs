use serde::{Deserialize, Serialize};

use std::fmt;

/// Identifier of the platform project (tenant) a request runs under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(pub u64);

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scope determines whether a secret is globally available or bound to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecretScope {
    /// Available to every project.
    Global,
    /// Available only to the specified project.
    Project(ProjectId),
}

impl SecretScope {
    /// Scope for an optional project context. No project means global.
    pub fn for_project(project: Option<ProjectId>) -> Self {
        match project {
            Some(id) => SecretScope::Project(id),
            None => SecretScope::Global,
        }
    }
}

impl fmt::Display for SecretScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretScope::Global => write!(f, "global"),
            SecretScope::Project(id) => write!(f, "project:{id}"),
        }
    }
}

/// A credential as it arrives in integration settings.
///
/// Either a raw string, or the platform's stored form: `{value, from_secrets}`
/// where `from_secrets: true` means `value` is a `{{secret.<name>}}` reference
/// that only the secret service can resolve.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecretField {
    Plain(String),
    Stored {
        value: String,
        #[serde(default)]
        from_secrets: bool,
    },
}

impl SecretField {
    /// Name of the referenced secret, if this field points into the secret store.
    ///
    /// Accepts both `{{secret.name}}` and a bare `name`.
    pub fn secret_name(&self) -> Option<&str> {
        match self {
            SecretField::Stored {
                value,
                from_secrets: true,
            } => {
                let trimmed = value.trim();
                let name = trimmed
                    .strip_prefix("{{")
                    .and_then(|s| s.strip_suffix("}}"))
                    .map(str::trim)
                    .and_then(|s| s.strip_prefix("secret."))
                    .unwrap_or(trimmed);
                Some(name)
            }
            _ => None,
        }
    }

    /// The literal value when this field is not a secret reference.
    pub fn literal(&self) -> Option<&str> {
        match self {
            SecretField::Plain(value) => Some(value),
            SecretField::Stored {
                value,
                from_secrets: false,
            } => Some(value),
            SecretField::Stored { .. } => None,
        }
    }
}

impl fmt::Debug for SecretField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.secret_name() {
            Some(name) => write!(f, "SecretField(secret:{name})"),
            None => write!(f, "SecretField(\"***\")"),
        }
    }
}

/// A wrapper that redacts secret values in Debug and Display output.
///
/// Serializes as the plain string: resolved keys have to reach the executor.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Redacted(String);

impl Redacted {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Access the underlying secret value.
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Show masked representation: last 4 chars visible.
    pub fn masked(&self) -> String {
        if self.0.len() <= 4 {
            "****".to_string()
        } else {
            format!("****{}", &self.0[self.0.len() - 4..])
        }
    }
}

impl fmt::Debug for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Redacted(\"***\")")
    }
}

impl fmt::Display for Redacted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "***")
    }
}
