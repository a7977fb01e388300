use serde::{Deserialize, Serialize};

/// Identity of the running application as seen by clients through alert headers.
///
/// The same binary serves both the `myApp` flavour (bare entity names) and the
/// `myApp2` flavour (namespaced entity names). Both send translated alerts; sentence
/// alerts are only used when translation is switched off.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApplicationConfig {
    /// Application name; header names are `X-{name}-alert` / `X-{name}-params`.
    /// TOML: `application.name`. Default: `myApp`.
    #[serde(default = "default_name")]
    pub name: String,

    /// `true`: alerts carry translation keys (`myApp.a.created`).
    /// `false`: alerts carry English sentences.
    /// TOML: `application.enable_translation`. Default: `true`.
    #[serde(default = "default_enable_translation")]
    pub enable_translation: bool,

    /// Optional prefix for entity names in alerts and errors.
    /// `"myApp2"` turns `c` into `myApp2C`.
    /// TOML: `application.entity_namespace`. Default: empty.
    #[serde(default)]
    pub entity_namespace: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_name(),
            enable_translation: default_enable_translation(),
            entity_namespace: String::new(),
        }
    }
}

impl ApplicationConfig {
    /// Entity name as it appears in alert metadata and problem bodies.
    pub fn alert_entity_name(&self, entity_name: &str) -> String {
        if self.entity_namespace.is_empty() {
            return entity_name.to_string();
        }
        let mut chars = entity_name.chars();
        match chars.next() {
            Some(first) => format!(
                "{}{}{}",
                self.entity_namespace,
                first.to_uppercase(),
                chars.as_str()
            ),
            None => self.entity_namespace.clone(),
        }
    }
}

fn default_name() -> String {
    "myApp".to_string()
}

fn default_enable_translation() -> bool {
    true
}
