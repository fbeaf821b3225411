use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Identifier as Xtream panels send it: a number on one server, a quoted
/// number or free text on another, sometimes null.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum FlexId {
    Number(i64),
    Text(String),
    #[default]
    Null,
}

impl FlexId {
    /// Canonical string form used to compare ids and build stream URLs.
    /// Returns `None` for null ids.
    pub fn key(&self) -> Option<String> {
        match self {
            FlexId::Number(n) => Some(n.to_string()),
            FlexId::Text(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            FlexId::Text(_) | FlexId::Null => None,
        }
    }

    pub fn is_null(&self) -> bool {
        self.key().is_none()
    }
}

impl From<&str> for FlexId {
    fn from(value: &str) -> Self {
        match value.trim().parse::<i64>() {
            Ok(n) => FlexId::Number(n),
            Err(_) => FlexId::Text(value.to_string()),
        }
    }
}

impl fmt::Display for FlexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlexId::Number(n) => write!(f, "{}", n),
            FlexId::Text(s) => write!(f, "{}", s),
            FlexId::Null => write!(f, "null"),
        }
    }
}

impl Serialize for FlexId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FlexId::Number(n) => serializer.serialize_i64(*n),
            FlexId::Text(s) => serializer.serialize_str(s),
            FlexId::Null => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for FlexId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::{self, Visitor};

        struct FlexIdVisitor;

        impl<'de> Visitor<'de> for FlexIdVisitor {
            type Value = FlexId;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a number, string, or null")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<FlexId, E> {
                Ok(FlexId::Number(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<FlexId, E> {
                i64::try_from(v)
                    .map(FlexId::Number)
                    .or_else(|_| Ok(FlexId::Text(v.to_string())))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<FlexId, E> {
                if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
                    Ok(FlexId::Number(v as i64))
                } else {
                    Ok(FlexId::Text(v.to_string()))
                }
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<FlexId, E> {
                Ok(FlexId::from(v))
            }

            fn visit_bool<E: de::Error>(self, _v: bool) -> Result<FlexId, E> {
                Ok(FlexId::Null)
            }

            fn visit_none<E: de::Error>(self) -> Result<FlexId, E> {
                Ok(FlexId::Null)
            }

            fn visit_unit<E: de::Error>(self) -> Result<FlexId, E> {
                Ok(FlexId::Null)
            }
        }

        deserializer.deserialize_any(FlexIdVisitor)
    }
}
