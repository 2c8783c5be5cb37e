//! Front-matter parsing

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::error::Result;

/// Opening and closing line of a YAML front-matter block
const DELIMITER: &str = "---";

/// Custom deserializer that handles both a single string and a list of strings
fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<Scalar>()? {
                vec.push(item.0);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// A YAML scalar read as text, so `title: 2024` or `date: 2024-01-01` stay strings
struct Scalar(String);

impl<'de> Deserialize<'de> for Scalar {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        use serde::de::{self, Visitor};

        struct ScalarVisitor;

        impl Visitor<'_> for ScalarVisitor {
            type Value = Scalar;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a string, number or boolean")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<Scalar, E> {
                Ok(Scalar(v.to_string()))
            }
        }

        deserializer.deserialize_any(ScalarVisitor)
    }
}

fn optional_scalar<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Scalar>::deserialize(deserializer)?.map(|s| s.0))
}

/// Front-matter data from a post
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontMatter {
    #[serde(deserialize_with = "optional_scalar")]
    pub title: Option<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub date: Option<String>,
    #[serde(deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub description: Option<String>,
    #[serde(deserialize_with = "optional_scalar")]
    pub author: Option<String>,
}

impl FrontMatter {
    /// Parse front-matter from content string
    /// Returns (front_matter, remaining_content)
    pub fn parse(content: &str) -> Result<(Self, &str)> {
        let content = content.trim_start_matches('\u{feff}');

        let Some((yaml, body)) = split_block(content) else {
            return Ok((FrontMatter::default(), content));
        };

        if yaml.trim().is_empty() {
            return Ok((FrontMatter::default(), body));
        }

        // A leading thematic break followed by prose is content, not metadata
        if !looks_like_yaml(yaml) {
            return Ok((FrontMatter::default(), content));
        }

        let fm: FrontMatter = serde_yaml::from_str(yaml)?;
        Ok((fm, body))
    }
}

/// Split `---\n<yaml>\n---\n<body>` into its yaml and body parts
fn split_block(content: &str) -> Option<(&str, &str)> {
    let first_line_end = content.find('\n')?;
    if content[..first_line_end].trim_end() != DELIMITER {
        return None;
    }
    let rest = &content[first_line_end + 1..];

    let mut offset = 0;
    for line in rest.split_inclusive('\n') {
        if line.trim_end() == DELIMITER {
            let yaml = &rest[..offset];
            let body = rest[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return Some((yaml, body));
        }
        offset += line.len();
    }
    None
}

/// At least one line must be a `key:` pair with a plain identifier key
fn looks_like_yaml(block: &str) -> bool {
    block.lines().any(|line| {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return false;
        }
        let Some((key, after)) = trimmed.split_once(':') else {
            return false;
        };
        !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
            && !matches!(key, "http" | "https" | "ftp")
            && (after.is_empty() || after.starts_with(' '))
    })
}
