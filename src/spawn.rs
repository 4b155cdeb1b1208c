use glam::Vec2;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::ecs::AgentKind;
use crate::error::{SimError, SimResult};

/// `{ "kind": "walker", "position": [64.0, 32.0], "payload": { ... } }`
///
/// The payload is opaque here; its shape belongs to the target agent kind.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SpawnDirective {
    pub kind: AgentKind,
    pub position: Vec2,
    #[serde(default)]
    pub payload: Value,
}

impl SpawnDirective {
    pub fn new(kind: AgentKind, position: Vec2) -> Self {
        Self {
            kind,
            position,
            payload: Value::Null,
        }
    }

    pub fn with_payload(mut self, payload: Value) -> Self {
        self.payload = payload;
        self
    }

    /// Parse a JSON array of directives.
    pub fn list_from_json(json: &str) -> SimResult<Vec<Self>> {
        Ok(serde_json::from_str(json)?)
    }

    /// Decode the payload as the kind-specific type `T`. A missing payload
    /// decodes like an empty object, so all-default payload types accept it.
    pub fn payload_as<T: DeserializeOwned>(&self) -> SimResult<T> {
        let value = match &self.payload {
            Value::Null => Value::Object(Default::default()),
            other => other.clone(),
        };
        serde_json::from_value(value).map_err(|source| SimError::InvalidPayload {
            kind: self.kind.name(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    #[serde(default)]
    struct Speed {
        speed: f32,
    }

    #[test]
    fn parses_directive_list() {
        let list = SpawnDirective::list_from_json(
            r#"[
                { "kind": "player", "position": [16.0, 32.0] },
                { "kind": "walker", "position": [80.0, 32.0], "payload": { "speed": 25.0 } }
            ]"#,
        )
        .unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].kind, AgentKind::Player);
        assert_eq!(list[0].position, Vec2::new(16.0, 32.0));
        assert_eq!(list[1].payload_as::<Speed>().unwrap().speed, 25.0);
    }

    #[test]
    fn missing_payload_uses_defaults() {
        let d = SpawnDirective::new(AgentKind::Walker, Vec2::ZERO);
        assert_eq!(d.payload_as::<Speed>().unwrap(), Speed::default());
    }

    #[test]
    fn bad_payload_names_the_kind() {
        let d = SpawnDirective::new(AgentKind::Walker, Vec2::ZERO)
            .with_payload(json!({ "speed": "fast" }));
        let err = d.payload_as::<Speed>().unwrap_err();
        assert!(err.to_string().contains("walker"), "{err}");
    }

    #[test]
    fn unknown_kind_is_rejected() {
        assert!(SpawnDirective::list_from_json(r#"[{ "kind": "dragon", "position": [0, 0] }]"#).is_err());
    }
}
