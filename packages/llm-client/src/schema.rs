//! Function parameter schemas generated from Rust types.
//!
//! ```rust,ignore
//! #[derive(Deserialize, JsonSchema)]
//! struct SetupMonitoringArgs {
//!     risk_id: String,
//!     kris: Option<Vec<String>>,
//! }
//!
//! let parameters = SetupMonitoringArgs::parameters_schema();
//! assert_eq!(parameters["type"], "object");
//! ```

use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

const DEFINITIONS_PREFIX: &str = "#/definitions/";

/// Argument types whose schema can be sent as function `parameters`.
///
/// The root is an object, nested types are inlined rather than referenced, and
/// objects with declared properties are closed. Free-form maps keep their
/// `additionalProperties` so the model can fill them.
pub trait ParameterSchema: JsonSchema + DeserializeOwned {
    fn parameters_schema() -> Value {
        let mut value = serde_json::to_value(schema_for!(Self)).unwrap_or_default();

        let definitions = match &mut value {
            Value::Object(root) => {
                root.remove("$schema");
                root.remove("title");
                match root.remove("definitions") {
                    Some(Value::Object(definitions)) => definitions,
                    _ => Map::new(),
                }
            }
            _ => return value,
        };

        inline(&mut value, &definitions);
        close_declared_objects(&mut value);

        if let Value::Object(root) = &mut value {
            // Parameterless functions still need an object with a properties map
            if root.get("type").and_then(Value::as_str) == Some("object") {
                root.entry("properties").or_insert_with(|| Value::Object(Map::new()));
            }
        }
        value
    }
}

impl<T: JsonSchema + DeserializeOwned> ParameterSchema for T {}

/// Replace every `$ref` with the definition it points at.
fn inline(value: &mut Value, definitions: &Map<String, Value>) {
    let target = value
        .get("$ref")
        .and_then(Value::as_str)
        .and_then(|path| path.strip_prefix(DEFINITIONS_PREFIX))
        .and_then(|name| definitions.get(name))
        .cloned();
    if let Some(definition) = target {
        *value = definition;
    }

    match value {
        Value::Object(map) => map.values_mut().for_each(|v| inline(v, definitions)),
        Value::Array(items) => items.iter_mut().for_each(|v| inline(v, definitions)),
        _ => {}
    }
}

fn close_declared_objects(value: &mut Value) {
    match value {
        Value::Object(map) => {
            let declared = map.get("type").and_then(Value::as_str) == Some("object")
                && map.contains_key("properties");
            if declared {
                map.entry("additionalProperties").or_insert(Value::Bool(false));
            }
            map.values_mut().for_each(close_declared_objects);
        }
        Value::Array(items) => items.iter_mut().for_each(close_declared_objects),
        _ => {}
    }
}
