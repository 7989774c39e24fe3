//! Minijinja templates for the reminder subject and body.
//!
//! The body is the concatenation of five fragments. Only the first one sees
//! the node name (`{{ node_name }}`); the rest are rendered with an empty
//! context. A localized set can be loaded from YAML:
//!
//! ```yaml
//! subject: "Erinnerung: Knoten offline"
//! body1: "Der Knoten {{ node_name }} ist noch offline.\n"
//! body2: "..."
//! body3: "..."
//! body4: "..."
//! body5: "..."
//! ```

use std::path::Path;

use minijinja::{context, Environment};
use serde::Deserialize;

use crate::traits::NotifyError;

/// Number of body fragments in a reminder.
pub const BODY_FRAGMENTS: usize = 5;

/// Subject and body fragment templates for one locale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderTemplates {
    pub subject: String,
    pub body: [String; BODY_FRAGMENTS],
}

#[derive(Debug, Deserialize)]
struct TemplatesFile {
    subject: String,
    body1: String,
    body2: String,
    body3: String,
    body4: String,
    body5: String,
}

impl ReminderTemplates {
    /// Built-in English templates.
    pub fn english() -> Self {
        Self {
            subject: "Reminder: a build node you took offline is still offline".to_string(),
            body: [
                "The node '{{ node_name }}' is still offline. You disconnected it manually.\n\n"
                    .to_string(),
                "If you have finished with it, please bring it back online so builds can use it again.\n"
                    .to_string(),
                "If it has to stay offline, please update the offline reason so others know why.\n\n"
                    .to_string(),
                "You will keep receiving this reminder for as long as the node stays offline.\n\n"
                    .to_string(),
                "-- \nThis message was sent automatically by the offline node reminder.\n"
                    .to_string(),
            ],
        }
    }

    /// Parse a localized template set from YAML and validate every fragment.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, NotifyError> {
        let file: TemplatesFile = serde_yaml::from_str(yaml)
            .map_err(|e| NotifyError::Config(format!("invalid templates file: {e}")))?;
        let templates = Self {
            subject: file.subject,
            body: [file.body1, file.body2, file.body3, file.body4, file.body5],
        };
        templates.validate()?;
        Ok(templates)
    }

    /// Load a localized template set from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, NotifyError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| {
            NotifyError::Config(format!("cannot read templates {}: {e}", path.display()))
        })?;
        Self::from_yaml_str(&yaml)
    }

    fn build_env<'a>() -> Environment<'a> {
        let mut env = Environment::new();
        // Fragments are concatenated, so their trailing newlines matter.
        env.set_keep_trailing_newline(true);
        env
    }

    /// Check that every template parses.
    pub fn validate(&self) -> Result<(), NotifyError> {
        let env = Self::build_env();
        for (name, source) in self.named_sources() {
            env.template_from_str(source)
                .map_err(|e| NotifyError::Template(format!("{name}: {e}")))?;
        }
        Ok(())
    }

    fn named_sources(&self) -> impl Iterator<Item = (String, &str)> + '_ {
        std::iter::once(("subject".to_string(), self.subject.as_str())).chain(
            self.body
                .iter()
                .enumerate()
                .map(|(i, s)| (format!("body{}", i + 1), s.as_str())),
        )
    }

    pub fn render_subject(&self) -> Result<String, NotifyError> {
        Self::build_env()
            .render_str(&self.subject, context! {})
            .map_err(|e| NotifyError::Template(e.to_string()))
    }

    /// Render and concatenate the body fragments for `node_name`.
    pub fn render_body(&self, node_name: &str) -> Result<String, NotifyError> {
        let env = Self::build_env();
        let mut body = String::new();
        for (i, fragment) in self.body.iter().enumerate() {
            let rendered = if i == 0 {
                env.render_str(fragment, context! { node_name => node_name })
            } else {
                env.render_str(fragment, context! {})
            };
            body.push_str(&rendered.map_err(|e| NotifyError::Template(e.to_string()))?);
        }
        Ok(body)
    }
}

impl Default for ReminderTemplates {
    fn default() -> Self {
        Self::english()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn english_body_names_the_node() {
        let body = ReminderTemplates::english().render_body("build-07").unwrap();
        assert!(body.starts_with("The node 'build-07' is still offline."));
        assert!(body.ends_with("offline node reminder.\n"));
    }

    #[test]
    fn fragments_keep_their_newlines() {
        let templates = ReminderTemplates {
            subject: "s".to_string(),
            body: [
                "a {{ node_name }}\n".to_string(),
                "b\n".to_string(),
                "c".to_string(),
                "d\n".to_string(),
                "e".to_string(),
            ],
        };
        assert_eq!(templates.render_body("n1").unwrap(), "a n1\nb\ncd\ne");
    }

    #[test]
    fn node_name_only_reaches_first_fragment() {
        let templates = ReminderTemplates {
            subject: "s".to_string(),
            body: [
                "[{{ node_name }}]".to_string(),
                "[{{ node_name }}]".to_string(),
                String::new(),
                String::new(),
                String::new(),
            ],
        };
        assert_eq!(templates.render_body("n1").unwrap(), "[n1][]");
    }

    #[test]
    fn loads_localized_yaml() {
        let yaml = r#"
subject: "Erinnerung: Knoten offline"
body1: "Der Knoten {{ node_name }} ist noch offline.\n"
body2: "Bitte wieder online nehmen.\n"
body3: ""
body4: ""
body5: "-- \nAutomatische Nachricht\n"
"#;
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(yaml.as_bytes()).unwrap();

        let templates = ReminderTemplates::from_yaml_file(file.path()).unwrap();
        assert_eq!(templates.render_subject().unwrap(), "Erinnerung: Knoten offline");
        let body = templates.render_body("build-03").unwrap();
        assert!(body.starts_with("Der Knoten build-03 ist noch offline.\n"));
    }

    #[test]
    fn missing_fragment_is_config_error() {
        let err = ReminderTemplates::from_yaml_str("subject: x\nbody1: y\n").unwrap_err();
        assert!(matches!(err, NotifyError::Config(_)), "got: {err:?}");
    }

    #[test]
    fn invalid_fragment_is_template_error() {
        let yaml = "subject: x\nbody1: '{{ unclosed'\nbody2: ''\nbody3: ''\nbody4: ''\nbody5: ''\n";
        match ReminderTemplates::from_yaml_str(yaml) {
            Err(NotifyError::Template(msg)) => assert!(msg.starts_with("body1"), "got: {msg}"),
            other => panic!("expected template error, got: {other:?}"),
        }
    }

    #[test]
    fn missing_file_is_config_error() {
        let err = ReminderTemplates::from_yaml_file(Path::new("/nonexistent/templates.yaml"))
            .unwrap_err()
            .to_string();
        assert!(err.contains("cannot read templates"), "got: {err}");
    }
}
