// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Semantic surfaces
//!
//! A geometry's semantics block holds a flat list of surface descriptors and
//! a `values` array shaped like the boundaries (minus the ring and vertex
//! levels) whose leaves point into that list. Resolution turns this around:
//! for every surface that is actually used, it records each index path at
//! which the surface occurs.

use crate::{AttributeValue, Attributes, Error, Result, SemanticValues};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::btree_map;
use std::collections::BTreeMap;

/// Sequence of array indices locating one occurrence of a surface
pub type SurfacePath = Vec<usize>;

/// Surface id -> every path at which it occurs, in encounter order
pub type SurfaceIndex = BTreeMap<usize, Vec<SurfacePath>>;

/// Resolved surfaces keyed by id (position in the descriptor list)
pub type SemanticMap = BTreeMap<usize, SemanticSurface>;

/// Semantic surface descriptor as stored in the document
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceDef {
    /// Surface type (e.g., "WallSurface", "RoofSurface", "Door")
    #[serde(rename = "type")]
    pub surface_type: String,
    /// Parent surface id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    /// Child surface ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<usize>>,
    /// Every other field of the descriptor
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SurfaceDef {
    /// Create a descriptor with no links and no attributes
    pub fn new(surface_type: impl Into<String>) -> Self {
        Self {
            surface_type: surface_type.into(),
            parent: None,
            children: None,
            extra: Map::new(),
        }
    }
}

/// Semantics block of a geometry object
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RawSemantics {
    /// Surface descriptors; the position is the surface id
    #[serde(default)]
    pub surfaces: Vec<SurfaceDef>,
    /// Per-location surface ids
    #[serde(default)]
    pub values: Option<SemanticValues>,
}

/// Semantic surface merged with the locations it occupies
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SemanticSurface {
    /// Surface type
    #[serde(rename = "type")]
    pub surface_type: String,
    /// Descriptor fields other than type, parent and children
    pub attributes: Attributes,
    /// Parent surface id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<usize>,
    /// Child surface ids
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<usize>>,
    /// Index paths into the boundaries, in encounter order
    pub surface_idx: Vec<SurfacePath>,
}

impl SemanticSurface {
    /// Check the surface type, ignoring ASCII case
    pub fn is_type(&self, type_name: &str) -> bool {
        self.surface_type.eq_ignore_ascii_case(type_name)
    }

    /// Get an attribute by name
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

/// Build the reverse index from surface id to locations
///
/// Walks `values` depth-first, outer to inner and left to right, appending
/// the path of every non-null leaf to the list of its surface id. `None`,
/// `[null]` or an array of nulls yield an empty index. Ids are not checked
/// against any descriptor list here.
pub fn index_surface_boundaries(values: Option<&SemanticValues>) -> SurfaceIndex {
    let mut index = SurfaceIndex::new();
    if let Some(values) = values {
        values.for_each_leaf(|path, value| {
            if let Some(id) = value {
                index.entry(*id).or_default().push(path.to_vec());
            }
        });
    }
    index
}

/// Merge descriptors with a surface index
///
/// Only ids present in `index` appear in the result; a descriptor that is
/// never referenced contributes nothing.
///
/// # Errors
/// `Error::SurfaceIndex` if the index names an id past the end of
/// `surfaces`.
pub fn resolve_surfaces(surfaces: &[SurfaceDef], index: SurfaceIndex) -> Result<SemanticMap> {
    let mut resolved = SemanticMap::new();
    for (id, surface_idx) in index {
        let def = surfaces.get(id).ok_or(Error::SurfaceIndex {
            id,
            count: surfaces.len(),
        })?;
        let attributes: Attributes = def
            .extra
            .iter()
            .map(|(name, value)| (name.clone(), AttributeValue::from(value)))
            .collect();
        resolved.insert(
            id,
            SemanticSurface {
                surface_type: def.surface_type.clone(),
                attributes,
                parent: def.parent,
                children: def.children.clone(),
                surface_idx,
            },
        );
    }

    let unused = surfaces.len() - resolved.len();
    if unused > 0 {
        log::debug!("{unused} of {} semantic surfaces are never referenced", surfaces.len());
    }
    Ok(resolved)
}

/// Index and merge a semantics block in one step
pub fn resolve_semantics(raw: &RawSemantics) -> Result<SemanticMap> {
    resolve_surfaces(&raw.surfaces, index_surface_boundaries(raw.values.as_ref()))
}

/// Lazy iterator over the surfaces of one type, in ascending id order
///
/// Clone the iterator (or ask the geometry again) to start over.
#[derive(Clone, Debug)]
pub struct Surfaces<'a> {
    inner: Option<btree_map::Iter<'a, usize, SemanticSurface>>,
    type_name: String,
}

impl<'a> Surfaces<'a> {
    pub(crate) fn new(map: Option<&'a SemanticMap>, type_name: &str) -> Self {
        Self {
            inner: map.map(|m| m.iter()),
            type_name: type_name.to_string(),
        }
    }
}

impl<'a> Iterator for Surfaces<'a> {
    type Item = (usize, &'a SemanticSurface);

    fn next(&mut self) -> Option<Self::Item> {
        let type_name = &self.type_name;
        self.inner
            .as_mut()?
            .find(|(_, surface)| surface.is_type(type_name))
            .map(|(&id, surface)| (id, surface))
    }
}
