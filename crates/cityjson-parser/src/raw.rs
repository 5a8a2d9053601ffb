// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raw document structure, as deserialized from JSON
//!
//! Only the members the model needs are typed; anything else in the
//! document is ignored.

use cityjson_model::{DocumentMetadata, GeometryDef};
use rustc_hash::FxHashSet;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::fmt;

/// Fail if any object in `content`, at any depth, repeats a key
///
/// `serde_json` keeps only the last of several equal keys, so the document
/// is walked once with this check before it is deserialized.
pub fn check_unique_keys(content: &str) -> serde_json::Result<()> {
    serde_json::from_str::<UniqueKeys>(content).map(|_| ())
}

/// Any JSON value whose objects have distinct keys
struct UniqueKeys;

impl<'de> Deserialize<'de> for UniqueKeys {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(UniqueKeysVisitor)
    }
}

struct UniqueKeysVisitor;

impl<'de> Visitor<'de> for UniqueKeysVisitor {
    type Value = UniqueKeys;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_str<E: de::Error>(self, _: &str) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_unit<E: de::Error>(self) -> Result<UniqueKeys, E> {
        Ok(UniqueKeys)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<UniqueKeys, A::Error> {
        while seq.next_element::<UniqueKeys>()?.is_some() {}
        Ok(UniqueKeys)
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<UniqueKeys, A::Error> {
        let mut seen = FxHashSet::default();
        while let Some(key) = map.next_key::<String>()? {
            if seen.contains(&key) {
                return Err(de::Error::custom(format!("duplicate key '{key}'")));
            }
            map.next_value::<UniqueKeys>()?;
            seen.insert(key);
        }
        Ok(UniqueKeys)
    }
}

/// Top-level CityJSON document
#[derive(Debug, Deserialize)]
pub struct RawDocument {
    /// Must be "CityJSON"
    #[serde(rename = "type")]
    pub document_type: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    /// City objects by id, kept in document order
    #[serde(rename = "CityObjects", default)]
    pub city_objects: Map<String, Value>,
    #[serde(default)]
    pub vertices: Vec<[f64; 3]>,
    #[serde(default)]
    pub transform: Option<Transform>,
    #[serde(default)]
    pub appearance: Option<Map<String, Value>>,
}

/// Vertex compression transform: `real = stored * scale + translate`
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Transform {
    pub scale: [f64; 3],
    pub translate: [f64; 3],
}

impl Transform {
    /// Decompress one stored vertex
    pub fn apply(&self, v: [f64; 3]) -> [f64; 3] {
        [
            v[0] * self.scale[0] + self.translate[0],
            v[1] * self.scale[1] + self.translate[1],
            v[2] * self.scale[2] + self.translate[2],
        ]
    }
}

/// One entry of `CityObjects`
#[derive(Debug, Deserialize)]
pub struct RawCityObject {
    #[serde(rename = "type")]
    pub object_type: String,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub parents: Vec<String>,
    #[serde(default)]
    pub children: Vec<String>,
    #[serde(default)]
    pub geometry: Vec<GeometryDef>,
}

impl RawDocument {
    /// Extract version, CRS and extent
    ///
    /// The EPSG code is read from `metadata.crs.epsg`, or else from the
    /// trailing number of `metadata.referenceSystem` (both
    /// `urn:ogc:def:crs:EPSG::7415` and `.../EPSG/0/7415` forms). The extent
    /// is `metadata.geographicalExtent`, or `metadata.bbox`.
    pub fn document_metadata(&self) -> DocumentMetadata {
        let epsg = self
            .metadata
            .get("crs")
            .and_then(|crs| crs.get("epsg"))
            .and_then(Value::as_u64)
            .and_then(|code| u32::try_from(code).ok())
            .or_else(|| {
                self.metadata
                    .get("referenceSystem")
                    .and_then(Value::as_str)
                    .and_then(epsg_from_reference_system)
            });

        let bbox: Option<Vec<f64>> = ["geographicalExtent", "bbox"]
            .iter()
            .find_map(|key| self.metadata.get(*key))
            .and_then(Value::as_array)
            .and_then(|values| values.iter().map(Value::as_f64).collect());

        DocumentMetadata {
            version: self.version.clone(),
            epsg,
            bbox,
        }
    }

    /// Whether `appearance` has the given member
    pub fn has_appearance(&self, member: &str) -> bool {
        self.appearance
            .as_ref()
            .is_some_and(|appearance| appearance.contains_key(member))
    }
}

fn epsg_from_reference_system(reference: &str) -> Option<u32> {
    reference
        .rsplit(|c: char| c == ':' || c == '/')
        .find(|part| !part.is_empty())
        .and_then(|code| code.parse().ok())
}
