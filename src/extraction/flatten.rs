use serde_json::{Map, Value};

use crate::extraction::schema;

/// Member whose presence marks a grouped (nested) extraction payload.
pub const NESTED_MARKER: &str = "childDetails";

/// Groups merged ahead of the repeated-group fields.
const LEADING_GROUPS: &[&str] = &[
    "childDetails",
    "motherDetails",
    "fatherDetails",
    "additionalInfo",
];

/// Groups merged after the repeated-group fields; later groups win on key collision.
const TRAILING_GROUPS: &[&str] = &[
    "independenceSkills",
    "toileting",
    "behaviorMoods",
    "playingLearning",
    "preSchoolExperience",
    "physicalHealth",
    "talkingListening",
    "consents",
];

/// A positionally indexed array mapped onto numbered flat fields.
struct RepeatedGroup {
    source: &'static str,
    prefix: &'static str,
    slots: usize,
    members: &'static [(&'static str, &'static str)],
}

const OTHER_CHILDREN: RepeatedGroup = RepeatedGroup {
    source: "otherChildren",
    prefix: "otherChild",
    slots: 2,
    members: &[
        ("name", "Name"),
        ("age", "Age"),
        ("relationship", "Relationship"),
    ],
};

const EMERGENCY_CONTACTS: RepeatedGroup = RepeatedGroup {
    source: "emergencyContacts",
    prefix: "emergencyContact",
    slots: 2,
    members: &[
        ("name", "Name"),
        ("address", "Address"),
        ("phone", "Phone"),
        ("relationship", "Relationship"),
    ],
};

const FAMILY_INFO_SOURCE: &str = "familyInfo";
const FAMILY_INFO_FIELDS: &[&str] = &["familyDoctor", "familyCircumstances", "childLivesWith"];

/// Shape of a raw `extracted_schema` payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RawExtraction {
    /// Grouped by form section, with repeated groups as arrays.
    Nested(Map<String, Value>),
    /// Anything else, assumed to already be keyed by schema field names.
    Flat(Value),
}

impl RawExtraction {
    pub fn classify(raw: Value) -> Self {
        match raw {
            Value::Object(map) if is_nested(&map) => Self::Nested(map),
            other => Self::Flat(other),
        }
    }
}

pub fn is_nested(raw: &Map<String, Value>) -> bool {
    matches!(raw.get(NESTED_MARKER), Some(Value::Object(_)))
}

/// Flattens a raw extraction payload onto the field schema.
///
/// Nested payloads yield every schema key, defaulting to `""`. Flat payloads
/// are returned untouched, extra keys included.
pub fn flatten(raw: Value) -> Value {
    match RawExtraction::classify(raw) {
        RawExtraction::Nested(groups) => Value::Object(flatten_nested(&groups)),
        RawExtraction::Flat(value) => value,
    }
}

fn flatten_nested(groups: &Map<String, Value>) -> Map<String, Value> {
    let mut record: Map<String, Value> = schema::field_names()
        .map(|name| (name.to_string(), empty()))
        .collect();

    for group in LEADING_GROUPS {
        merge_group(&mut record, groups.get(*group));
    }

    expand_repeated(&mut record, groups, &OTHER_CHILDREN);

    let family = groups.get(FAMILY_INFO_SOURCE);
    for field in FAMILY_INFO_FIELDS {
        record.insert(
            field.to_string(),
            or_empty(family.and_then(|info| info.get(*field))),
        );
    }

    expand_repeated(&mut record, groups, &EMERGENCY_CONTACTS);

    for group in TRAILING_GROUPS {
        merge_group(&mut record, groups.get(*group));
    }

    record
}

fn merge_group(record: &mut Map<String, Value>, group: Option<&Value>) {
    if let Some(Value::Object(fields)) = group {
        for (key, value) in fields {
            record.insert(key.clone(), value.clone());
        }
    }
}

fn expand_repeated(record: &mut Map<String, Value>, groups: &Map<String, Value>, spec: &RepeatedGroup) {
    let items = groups.get(spec.source).and_then(Value::as_array);
    for slot in 0..spec.slots {
        let item = items.and_then(|items| items.get(slot));
        for (member, suffix) in spec.members {
            let key = format!("{}{}{}", spec.prefix, slot + 1, suffix);
            record.insert(key, or_empty(item.and_then(|item| item.get(*member))));
        }
    }
}

fn empty() -> Value {
    Value::String(String::new())
}

/// Falls back to `""` for absent or empty values; anything else passes through as-is.
fn or_empty(value: Option<&Value>) -> Value {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => empty(),
        Some(Value::String(text)) if text.is_empty() => empty(),
        Some(Value::Number(number)) if number.as_f64() == Some(0.0) => empty(),
        Some(other) => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn or_empty_treats_falsy_values_as_missing() {
        assert_eq!(or_empty(None), empty());
        assert_eq!(or_empty(Some(&Value::Null)), empty());
        assert_eq!(or_empty(Some(&Value::Bool(false))), empty());
        assert_eq!(or_empty(Some(&serde_json::json!(0))), empty());
        assert_eq!(or_empty(Some(&serde_json::json!(""))), empty());
        assert_eq!(or_empty(Some(&serde_json::json!(4))), serde_json::json!(4));
        assert_eq!(or_empty(Some(&Value::Bool(true))), Value::Bool(true));
    }

    #[test]
    fn marker_must_be_an_object() {
        let map = serde_json::json!({ "childDetails": "Amy" });
        let Value::Object(map) = map else {
            unreachable!()
        };
        assert!(!is_nested(&map));
    }
}
