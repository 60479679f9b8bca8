//! Sub-records shared across datasets

use serde::{Deserialize, Serialize};

/// A link to content about a record (transcript, video, XML, issue page)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLink {
    #[serde(default)]
    pub url: String,

    /// `text`, `video`, `pdf`, `html`, `xml`
    #[serde(
        rename = "type",
        alias = "source_type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub source_type: Option<String>,

    /// Publisher (`congress.gov`, `govinfo`, `senate.gov`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    #[serde(alias = "label", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl SourceLink {
    pub fn new(url: impl Into<String>, source_type: &str, source: &str) -> Self {
        Self {
            url: url.into(),
            source_type: Some(source_type.to_string()),
            source: Some(source.to_string()),
            description: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// A member or witness attached to a hearing
///
/// Snapshots may list people either as bare names or as full mappings;
/// both deserialize to this shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PersonRepr")]
pub struct Person {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub party: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl Person {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PersonRepr {
    Name(String),
    Full(PersonFields),
}

#[derive(Deserialize)]
struct PersonFields {
    #[serde(default)]
    name: String,
    #[serde(default)]
    role: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    organization: Option<String>,
    #[serde(default)]
    party: Option<String>,
    #[serde(default)]
    state: Option<String>,
}

impl From<PersonRepr> for Person {
    fn from(repr: PersonRepr) -> Self {
        match repr {
            PersonRepr::Name(name) => Person::named(name),
            PersonRepr::Full(f) => Person {
                name: f.name,
                role: f.role,
                title: f.title,
                organization: f.organization,
                party: f.party,
                state: f.state,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_from_bare_name() {
        let people: Vec<Person> = serde_yaml::from_str("- A\n- name: B\n  title: Director\n").unwrap();
        assert_eq!(people[0], Person::named("A"));
        assert_eq!(people[1].name, "B");
        assert_eq!(people[1].title.as_deref(), Some("Director"));
    }

    #[test]
    fn test_source_link_accepts_vote_style_keys() {
        let link: SourceLink =
            serde_yaml::from_str("url: https://x\nsource_type: xml\nlabel: Senate.gov XML\n")
                .unwrap();
        assert_eq!(link.source_type.as_deref(), Some("xml"));
        assert_eq!(link.description.as_deref(), Some("Senate.gov XML"));
    }
}
