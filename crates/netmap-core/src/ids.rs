//! `<domain-type>:<id>` identities shared by nodes and links.

use crate::{Error, Result};
use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectRef {
    pub kind: String,
    pub id: String,
}

impl ObjectRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    /// Numeric form of the id, when the backend uses integer keys.
    pub fn numeric_id(&self) -> Option<i64> {
        self.id.parse::<i64>().ok()
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

impl FromStr for ObjectRef {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.split_once(':') {
            Some((kind, id)) if !kind.is_empty() && !id.is_empty() => Ok(Self::new(kind, id)),
            _ => Err(Error::InvalidObjectRef {
                value: s.to_string(),
            }),
        }
    }
}

/// Accepts both `"12"` and `12` for backend ids.
pub(crate) fn de_id<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Str(String),
        Int(i64),
        Uint(u64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Str(s) => s,
        RawId::Int(n) => n.to_string(),
        RawId::Uint(n) => n.to_string(),
    })
}

pub(crate) fn de_opt_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrap(#[serde(deserialize_with = "de_id")] String);

    Ok(Option::<Wrap>::deserialize(deserializer)?.map(|w| w.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_formats_object_refs() {
        let r: ObjectRef = "managedobject:42".parse().expect("valid ref");
        assert_eq!(r.kind, "managedobject");
        assert_eq!(r.numeric_id(), Some(42));
        assert_eq!(r.to_string(), "managedobject:42");
    }

    #[test]
    fn rejects_refs_without_a_kind() {
        assert!(":42".parse::<ObjectRef>().is_err());
        assert!("plain".parse::<ObjectRef>().is_err());
    }
}
