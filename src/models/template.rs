//! Email template model
//!
//! Templates carry `{{placeholder}}` markers that are substituted at render
//! time. Not part of the financial core, but included in snapshots and the
//! merge reconciler.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::ids::TemplateId;

/// A reusable email template with placeholder substitution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailTemplate {
    /// Unique identifier
    pub id: TemplateId,

    /// Template name shown in pickers
    pub name: String,

    /// Subject line (may contain placeholders)
    #[serde(default)]
    pub subject: String,

    /// Body text (may contain placeholders)
    pub body: String,

    /// When the template was created
    pub created_at: DateTime<Utc>,
}

impl EmailTemplate {
    /// Create a new template
    pub fn new(name: impl Into<String>, subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            id: TemplateId::new(),
            name: name.into(),
            subject: subject.into(),
            body: body.into(),
            created_at: Utc::now(),
        }
    }

    /// Render subject and body with `{{key}}` placeholders substituted
    ///
    /// Unknown placeholders are left as-is so a human can spot and fill them.
    pub fn render(&self, values: &HashMap<&str, String>) -> (String, String) {
        (
            substitute(&self.subject, values),
            substitute(&self.body, values),
        )
    }

    /// List the placeholder names referenced by this template
    pub fn placeholders(&self) -> Vec<String> {
        let mut names = Vec::new();
        for text in [&self.subject, &self.body] {
            let mut rest = text.as_str();
            while let Some(start) = rest.find("{{") {
                let Some(end) = rest[start + 2..].find("}}") else {
                    break;
                };
                let name = rest[start + 2..start + 2 + end].trim().to_string();
                if !names.contains(&name) {
                    names.push(name);
                }
                rest = &rest[start + 2 + end + 2..];
            }
        }
        names
    }
}

fn substitute(text: &str, values: &HashMap<&str, String>) -> String {
    let mut out = text.to_string();
    for (key, value) in values {
        out = out.replace(&format!("{{{{{}}}}}", key), value);
    }
    out
}
