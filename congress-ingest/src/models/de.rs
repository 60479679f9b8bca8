//! Lenient deserializers for upstream payloads and hand-edited snapshots
//!
//! Congress.gov returns some identifiers as numbers in one endpoint and as
//! strings in another, and uses `null` where a list is expected.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum Flex {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
}

/// `Option<String>` accepting strings or numbers
pub fn opt_flex_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Flex>::deserialize(deserializer)?.map(|v| match v {
        Flex::Str(s) => s,
        Flex::Int(i) => i.to_string(),
        Flex::Float(f) => f.to_string(),
        Flex::Bool(b) => b.to_string(),
    }))
}

/// `Option<u32>` accepting numbers or numeric strings; anything else is `None`
pub fn opt_flex_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Flex>::deserialize(deserializer)?.and_then(|v| match v {
        Flex::Str(s) => s.trim().parse().ok(),
        Flex::Int(i) => u32::try_from(i).ok(),
        Flex::Float(f) if f >= 0.0 && f.fract() == 0.0 && f <= u32::MAX as f64 => Some(f as u32),
        _ => None,
    }))
}

/// Treat `null` like a missing field
pub fn default_on_null<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A field that is sometimes a single object, sometimes a list
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    pub fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(v) => v,
            OneOrMany::One(v) => vec![v],
        }
    }
}
