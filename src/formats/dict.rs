// Reduce a registry to plain name -> value mappings

use std::collections::HashMap;

use crate::bitwise::DecodedValue;
use crate::fields::{FieldRegistry, FieldResult};

/// Every field's value keyed by name
pub fn to_dict(registry: &FieldRegistry) -> FieldResult<HashMap<String, DecodedValue>> {
    registry
        .values()
        .map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
}

/// Same values as [`to_dict`], kept in registration order
pub fn to_ordered(registry: &FieldRegistry) -> FieldResult<Vec<(String, DecodedValue)>> {
    registry
        .values()
        .map(|(name, value)| value.map(|v| (name.to_string(), v)))
        .collect()
}

/// JSON object of every field's value
pub fn to_json(registry: &FieldRegistry) -> FieldResult<serde_json::Value> {
    let mut object = serde_json::Map::new();
    for (name, value) in to_ordered(registry)? {
        object.insert(name, serde_json::Value::from(&value));
    }
    Ok(serde_json::Value::Object(object))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitwise::DataType;

    fn registry() -> FieldRegistry {
        let mut registry = FieldRegistry::new(vec![0x12, 0x34, 0x56, 0x78, 0x34, 0x32]);
        registry.add(DataType::Bool, "enabled", 1, 1).unwrap();
        registry.add(DataType::UInt, "testval", 8, 8).unwrap();
        registry.add(DataType::Ascii, "answer", 32, 16).unwrap();
        registry
    }

    #[test]
    fn test_to_dict() {
        let dict = to_dict(&registry()).unwrap();

        assert_eq!(dict.len(), 3);
        assert_eq!(dict["enabled"], DecodedValue::Bool(true));
        assert_eq!(dict["testval"].as_u64(), Some(52));
        assert_eq!(dict["answer"], DecodedValue::Text("42".to_string()));
    }

    #[test]
    fn test_to_ordered() {
        let names: Vec<String> = to_ordered(&registry())
            .unwrap()
            .into_iter()
            .map(|(name, _)| name)
            .collect();
        assert_eq!(names, vec!["enabled", "testval", "answer"]);
    }

    #[test]
    fn test_to_json() {
        assert_eq!(
            to_json(&registry()).unwrap(),
            serde_json::json!({"enabled": true, "testval": 52, "answer": "42"})
        );
    }

    #[test]
    fn test_empty_registry() {
        let registry = FieldRegistry::new(Vec::<u8>::new());
        assert!(to_dict(&registry).unwrap().is_empty());
        assert_eq!(to_json(&registry).unwrap(), serde_json::json!({}));
    }
}
