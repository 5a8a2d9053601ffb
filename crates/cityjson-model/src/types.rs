// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core types for CityJSON geometry representation
//!
//! This module defines the closed set of geometry shapes, the level-of-detail
//! tag and the attribute values carried by semantic surfaces.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Geometry type of a CityJSON geometry object
///
/// Each variant fixes how deeply its boundary array is nested.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
pub enum ShapeKind {
    MultiPoint,
    MultiLineString,
    MultiSurface,
    CompositeSurface,
    Solid,
    CompositeSolid,
}

impl ShapeKind {
    /// All shape kinds, from shallowest to deepest
    pub const ALL: [ShapeKind; 6] = [
        ShapeKind::MultiPoint,
        ShapeKind::MultiLineString,
        ShapeKind::MultiSurface,
        ShapeKind::CompositeSurface,
        ShapeKind::Solid,
        ShapeKind::CompositeSolid,
    ];

    /// Parse a geometry type tag (case-insensitive)
    pub fn parse(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::shape_kind(s))
    }

    /// Get the CityJSON type name
    pub fn name(&self) -> &'static str {
        match self {
            ShapeKind::MultiPoint => "MultiPoint",
            ShapeKind::MultiLineString => "MultiLineString",
            ShapeKind::MultiSurface => "MultiSurface",
            ShapeKind::CompositeSurface => "CompositeSurface",
            ShapeKind::Solid => "Solid",
            ShapeKind::CompositeSolid => "CompositeSolid",
        }
    }

    /// Number of indices needed to reach a vertex index in the boundaries
    ///
    /// MultiPoint: point. MultiLineString: line, point.
    /// MultiSurface/CompositeSurface: surface, ring, point.
    /// Solid: shell, surface, ring, point.
    /// CompositeSolid: solid, shell, surface, ring, point.
    pub fn boundary_depth(&self) -> usize {
        match self {
            ShapeKind::MultiPoint => 1,
            ShapeKind::MultiLineString => 2,
            ShapeKind::MultiSurface | ShapeKind::CompositeSurface => 3,
            ShapeKind::Solid => 4,
            ShapeKind::CompositeSolid => 5,
        }
    }

    /// Number of indices in a surface index path
    ///
    /// A semantic value is attached per point, per line, or per surface;
    /// rings and vertices are never addressed individually.
    pub fn semantic_depth(&self) -> usize {
        match self {
            ShapeKind::MultiPoint | ShapeKind::MultiLineString => 1,
            ShapeKind::MultiSurface | ShapeKind::CompositeSurface => 1,
            ShapeKind::Solid => 2,
            ShapeKind::CompositeSolid => 3,
        }
    }

    /// Check if this kind describes a volume
    pub fn is_solid(&self) -> bool {
        matches!(self, ShapeKind::Solid | ShapeKind::CompositeSolid)
    }
}

impl FromStr for ShapeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ShapeKind::parse(s)
    }
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Level of detail tag, passed through unchanged
///
/// CityJSON 1.0 uses numbers (`2`, `2.2`), later versions use strings (`"2.2"`).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LevelOfDetail {
    Number(f64),
    Text(String),
}

impl fmt::Display for LevelOfDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LevelOfDetail::Number(n) => write!(f, "{n}"),
            LevelOfDetail::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for LevelOfDetail {
    fn from(lod: f64) -> Self {
        LevelOfDetail::Number(lod)
    }
}

impl From<&str> for LevelOfDetail {
    fn from(lod: &str) -> Self {
        LevelOfDetail::Text(lod.to_string())
    }
}

/// Value of a semantic surface attribute
#[derive(Clone, Debug, PartialEq, Default, Serialize)]
#[serde(untagged)]
pub enum AttributeValue {
    #[default]
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// List of values
    List(Vec<AttributeValue>),
    /// Nested object, ordered by key
    Map(Attributes),
}

impl From<&Value> for AttributeValue {
    fn from(value: &Value) -> Self {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => AttributeValue::Integer(i),
                None => n.as_f64().map_or(AttributeValue::Null, AttributeValue::Float),
            },
            Value::String(s) => AttributeValue::String(s.clone()),
            Value::Array(items) => AttributeValue::List(items.iter().map(Into::into).collect()),
            Value::Object(fields) => AttributeValue::Map(
                fields
                    .iter()
                    .map(|(name, value)| (name.clone(), value.into()))
                    .collect(),
            ),
        }
    }
}

impl AttributeValue {
    /// Try to get as string
    pub fn as_string(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as float
    pub fn as_float(&self) -> Option<f64> {
        match self {
            AttributeValue::Float(f) => Some(*f),
            AttributeValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    /// Try to get as integer
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            AttributeValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Try to get as boolean
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttributeValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[AttributeValue]> {
        match self {
            AttributeValue::List(list) => Some(list),
            _ => None,
        }
    }

    /// Try to get as nested object
    pub fn as_map(&self) -> Option<&Attributes> {
        match self {
            AttributeValue::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Check if this is a null value
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Integer(i)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

/// Attribute map of a semantic surface, ordered by key
pub type Attributes = BTreeMap<String, AttributeValue>;
