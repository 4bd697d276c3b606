//! Loosely-typed upstream JSON records.
//!
//! The provider API is inconsistent about field presence and scalar types
//! (ids arrive as strings or numbers, timing fields as strings or epoch
//! numbers). Every field is optional and deserialized leniently: a value of
//! an unexpected shape behaves like an absent one instead of failing the
//! whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserialize into `T`, treating values of the wrong shape as absent
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    Ok(serde_json::from_value(value).ok())
}

/// Deserialize a list, keeping only the items that have the expected shape
fn lenient_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    match Value::deserialize(deserializer)? {
        Value::Array(items) => Ok(items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect()),
        _ => Ok(Vec::new()),
    }
}

/// Coerce a scalar JSON value to a non-empty string
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => {
            let trimmed = s.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_string())
        }
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn values_to_strings(values: &[Value]) -> Vec<String> {
    values.iter().filter_map(value_to_string).collect()
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawImage {
    #[serde(default, deserialize_with = "lenient")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawProgrammeList {
    #[serde(default, deserialize_with = "lenient_list")]
    pub list: Vec<RawProgramme>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawChannel {
    #[serde(default, deserialize_with = "lenient")]
    pub epg_id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub full_synopsis: Option<Value>,
    /// Upstream spells this field "catogory"
    #[serde(default, alias = "category", deserialize_with = "lenient_list")]
    pub catogory: Vec<Value>,
    #[serde(default, alias = "genreIds", deserialize_with = "lenient_list")]
    pub genres: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<RawImage>,
    #[serde(default, deserialize_with = "lenient")]
    pub epg_programs: Option<RawProgrammeList>,
}

impl RawChannel {
    /// Channel id: the EPG-specific id when usable, else the generic id
    pub fn resolved_id(&self) -> Option<String> {
        self.epg_id
            .as_ref()
            .and_then(value_to_string)
            .or_else(|| self.id.as_ref().and_then(value_to_string))
    }

    pub fn title(&self) -> Option<String> {
        self.title.as_ref().and_then(value_to_string)
    }

    pub fn full_synopsis(&self) -> Option<String> {
        self.full_synopsis.as_ref().and_then(value_to_string)
    }

    pub fn category_tags(&self) -> Vec<String> {
        values_to_strings(&self.catogory)
    }

    pub fn genre_ids(&self) -> Vec<String> {
        values_to_strings(&self.genres)
    }

    pub fn first_image_path(&self) -> Option<&str> {
        self.images.first().and_then(|img| img.path.as_deref())
    }

    /// Upstream programmes, or `None` when the list is absent or empty
    pub fn programmes(&self) -> Option<&[RawProgramme]> {
        self.epg_programs
            .as_ref()
            .map(|p| p.list.as_slice())
            .filter(|list| !list.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProgramme {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub full_synopsis: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub short_synopsis: Option<Value>,
    #[serde(default, alias = "category", deserialize_with = "lenient_list")]
    pub catogory: Vec<Value>,
    #[serde(default, alias = "genreIds", deserialize_with = "lenient_list")]
    pub genres: Vec<Value>,
    #[serde(default, deserialize_with = "lenient_list")]
    pub images: Vec<RawImage>,
    /// ISO-8601 instant, or epoch milliseconds
    #[serde(default, deserialize_with = "lenient")]
    pub start: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub stop: Option<Value>,
    /// Provider-local calendar date (`YYYY-MM-DD`)
    #[serde(default, deserialize_with = "lenient")]
    pub date: Option<Value>,
    /// Time-of-day string paired with `date`, or epoch milliseconds
    #[serde(default, deserialize_with = "lenient")]
    pub start_time: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub end_time: Option<Value>,
}

impl RawProgramme {
    pub fn upstream_id(&self) -> Option<String> {
        self.id.as_ref().and_then(value_to_string)
    }

    pub fn title(&self) -> Option<String> {
        self.title.as_ref().and_then(value_to_string)
    }

    pub fn full_synopsis(&self) -> Option<String> {
        self.full_synopsis.as_ref().and_then(value_to_string)
    }

    pub fn short_synopsis(&self) -> Option<String> {
        self.short_synopsis.as_ref().and_then(value_to_string)
    }

    pub fn category_tags(&self) -> Vec<String> {
        values_to_strings(&self.catogory)
    }

    pub fn genre_ids(&self) -> Vec<String> {
        values_to_strings(&self.genres)
    }

    pub fn first_image_path(&self) -> Option<&str> {
        self.images.first().and_then(|img| img.path.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawGenre {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<Value>,
    #[serde(default, alias = "title", deserialize_with = "lenient")]
    pub name: Option<Value>,
}

impl RawGenre {
    pub fn id(&self) -> Option<String> {
        self.id.as_ref().and_then(value_to_string)
    }

    pub fn name(&self) -> Option<String> {
        self.name.as_ref().and_then(value_to_string)
    }
}
