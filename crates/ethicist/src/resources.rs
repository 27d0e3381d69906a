//! Resource resolution: URI to pretty-printed JSON from the knowledge base.

use serde::Serialize;
use tracing::debug;

use crate::knowledge::{
    self, FrameworkTable, GuidelineTable, AI_ETHICS_GUIDELINES, ETHICAL_FRAMEWORKS,
};
use crate::registry::{FRAMEWORKS_ALL_URI, FRAMEWORK_URI_PREFIX, GUIDELINES_URI};

#[derive(Debug, thiserror::Error)]
pub enum ResourceError {
    #[error("Unknown framework '{key}' ({uri})")]
    UnknownFramework { key: String, uri: String },

    #[error("Unknown resource URI: {0}")]
    UnknownUri(String),

    #[error("failed to serialize {uri}: {source}")]
    Serialize {
        uri: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Resolve `uri` to its JSON document.
///
/// The two aggregate URIs are matched exactly before the framework prefix,
/// so `frameworks/all` never reaches the per-framework lookup. Framework
/// keys are looked up in the ethical map first, then the responsible-AI map.
pub fn read(uri: &str) -> Result<String, ResourceError> {
    debug!(%uri, "resolving resource");

    match uri {
        FRAMEWORKS_ALL_URI => render(uri, &FrameworkTable(ETHICAL_FRAMEWORKS)),
        GUIDELINES_URI => render(uri, &GuidelineTable(AI_ETHICS_GUIDELINES)),
        _ => {
            let Some(key) = uri.strip_prefix(FRAMEWORK_URI_PREFIX) else {
                return Err(ResourceError::UnknownUri(uri.to_string()));
            };

            let framework = knowledge::ethical_framework(key)
                .or_else(|| knowledge::responsible_ai_framework(key))
                .ok_or_else(|| ResourceError::UnknownFramework {
                    key: key.to_string(),
                    uri: uri.to_string(),
                })?;

            render(uri, framework)
        }
    }
}

fn render<T: Serialize + ?Sized>(uri: &str, value: &T) -> Result<String, ResourceError> {
    serde_json::to_string_pretty(value).map_err(|source| ResourceError::Serialize {
        uri: uri.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::resource_definitions;
    use serde_json::Value;

    #[test]
    fn every_listed_resource_parses_and_round_trips() {
        for resource in resource_definitions() {
            let text = read(&resource.uri).unwrap();
            let parsed: Value = serde_json::from_str(&text).unwrap();
            let again: Value =
                serde_json::from_str(&serde_json::to_string_pretty(&parsed).unwrap()).unwrap();
            assert_eq!(parsed, again, "{}", resource.uri);
        }
    }

    #[test]
    fn virtue_framework_document() {
        let value: Value = serde_json::from_str(&read("ethicist://frameworks/virtue").unwrap()).unwrap();
        assert_eq!(value["name"], "Virtue Ethics");
        assert!(value["key_principles"].as_array().unwrap().len() >= 3);
    }

    #[test]
    fn responsible_ai_keys_resolve_through_the_same_prefix() {
        let value: Value =
            serde_json::from_str(&read("ethicist://frameworks/nist_ai_rmf").unwrap()).unwrap();
        assert_eq!(value["name"], "NIST AI Risk Management Framework");
    }

    #[test]
    fn aggregate_documents_are_keyed_objects() {
        let all: Value = serde_json::from_str(&read(FRAMEWORKS_ALL_URI).unwrap()).unwrap();
        assert_eq!(all.as_object().unwrap().len(), 4);
        assert_eq!(all["care"]["name"], "Ethics of Care");

        let guidelines: Value = serde_json::from_str(&read(GUIDELINES_URI).unwrap()).unwrap();
        assert!(guidelines["human_autonomy"].is_string());
    }

    #[test]
    fn output_is_pretty_printed() {
        assert!(read(GUIDELINES_URI).unwrap().contains("\n  \"fairness\": "));
    }

    #[test]
    fn unknown_framework_names_the_uri() {
        let err = read("ethicist://frameworks/stoicism").unwrap_err();
        assert!(matches!(err, ResourceError::UnknownFramework { .. }));
        assert!(err.to_string().contains("ethicist://frameworks/stoicism"));
    }

    #[test]
    fn unknown_scheme_names_the_uri() {
        let err = read("other://frameworks/virtue").unwrap_err();
        assert_eq!(err.to_string(), "Unknown resource URI: other://frameworks/virtue");
    }

    #[test]
    fn nested_key_is_not_a_framework() {
        assert!(read("ethicist://frameworks/virtue/extra").is_err());
    }
}
