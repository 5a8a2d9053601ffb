// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Geometry objects with dereferenced boundaries and resolved semantics

use crate::semantics::{index_surface_boundaries, resolve_surfaces};
use crate::{
    Coordinates, Error, LevelOfDetail, RawSemantics, Result, SemanticMap, SemanticSurface,
    ShapeKind, SurfaceIndex, SurfacePath, Surfaces, VertexIndices, VertexPool,
};
use serde::{Deserialize, Serialize};

/// Geometry fragment as stored in a city object
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeometryDef {
    /// Geometry type tag (e.g., "Solid")
    #[serde(rename = "type")]
    pub geometry_type: String,
    /// Level of detail
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lod: Option<LevelOfDetail>,
    /// Vertex indices nested according to the geometry type
    #[serde(default)]
    pub boundaries: VertexIndices,
    /// Semantic surfaces
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantics: Option<RawSemantics>,
}

/// Fully resolved, read-only geometry
///
/// Construction checks the boundary depth against the shape kind, replaces
/// every vertex index by its coordinate and resolves the semantics. Either
/// all of that succeeds or no geometry is returned.
#[derive(Clone, Debug)]
pub struct Geometry {
    kind: ShapeKind,
    lod: Option<LevelOfDetail>,
    boundaries: Coordinates,
    semantics: Option<SemanticMap>,
}

impl Geometry {
    /// Build a geometry without semantics
    pub fn new(kind: ShapeKind, boundaries: &VertexIndices, vertices: &VertexPool) -> Result<Self> {
        Self::build(kind, None, boundaries, None, vertices)
    }

    /// Build a geometry from a document fragment
    ///
    /// # Errors
    /// `Error::ShapeKind` for an unknown type tag, plus everything
    /// [`Geometry::build`] reports.
    pub fn from_def(def: &GeometryDef, vertices: &VertexPool) -> Result<Self> {
        let kind = ShapeKind::parse(&def.geometry_type)?;
        Self::build(
            kind,
            def.lod.clone(),
            &def.boundaries,
            def.semantics.as_ref(),
            vertices,
        )
    }

    /// Build a geometry
    ///
    /// # Arguments
    /// * `kind` - Shape kind fixing the boundary depth
    /// * `lod` - Level of detail, kept as is
    /// * `boundaries` - Raw vertex indices
    /// * `semantics` - Optional semantics block
    /// * `vertices` - The document's vertex pool
    ///
    /// # Errors
    /// `Error::ShapeMismatch` if the boundaries or semantic values are nested
    /// to the wrong depth, `Error::VertexIndex` for an index outside the
    /// pool, `Error::PathIndex` if a semantic value has no matching boundary,
    /// `Error::SurfaceIndex` if a semantic value names a missing surface.
    pub fn build(
        kind: ShapeKind,
        lod: Option<LevelOfDetail>,
        boundaries: &VertexIndices,
        semantics: Option<&RawSemantics>,
        vertices: &VertexPool,
    ) -> Result<Self> {
        let expected = kind.boundary_depth();
        boundaries
            .check_depth(expected)
            .map_err(|actual| Error::shape_mismatch(kind, "boundaries", expected, actual))?;

        let boundaries = dereference_boundaries(boundaries, vertices)?;

        let semantics = match semantics {
            Some(raw) => {
                let index = index_surface_boundaries(raw.values.as_ref());
                check_surface_paths(kind, &boundaries, &index)?;
                Some(resolve_surfaces(&raw.surfaces, index)?)
            }
            None => None,
        };

        log::trace!(
            "built {kind} with {} vertices and {} semantic surfaces",
            boundaries.leaf_count(),
            semantics.as_ref().map_or(0, SemanticMap::len)
        );

        Ok(Self {
            kind,
            lod,
            boundaries,
            semantics,
        })
    }

    /// Shape kind
    pub fn kind(&self) -> ShapeKind {
        self.kind
    }

    /// Level of detail
    pub fn lod(&self) -> Option<&LevelOfDetail> {
        self.lod.as_ref()
    }

    /// Boundaries with coordinates in place of vertex indices
    pub fn boundaries(&self) -> &Coordinates {
        &self.boundaries
    }

    /// Resolved semantic surfaces, if the geometry has a semantics block
    pub fn semantics(&self) -> Option<&SemanticMap> {
        self.semantics.as_ref()
    }

    /// Get a resolved surface by id
    pub fn surface(&self, id: usize) -> Option<&SemanticSurface> {
        self.semantics.as_ref()?.get(&id)
    }

    /// Number of vertex references in the boundaries
    pub fn vertex_count(&self) -> usize {
        self.boundaries.leaf_count()
    }

    /// Surfaces whose type matches `type_name`, ignoring ASCII case
    ///
    /// The iterator is lazy and yields `(id, surface)` in ascending id order;
    /// call again or clone it to restart.
    pub fn get_surfaces(&self, type_name: &str) -> Surfaces<'_> {
        Surfaces::new(self.semantics.as_ref(), type_name)
    }

    /// Sub-arrays of the boundaries at each path, in the order given
    ///
    /// An empty slice gives an empty result.
    ///
    /// # Errors
    /// `Error::PathIndex` if a path leaves the boundaries. Paths stored in
    /// this geometry's semantics were checked at construction and never fail.
    pub fn get_surface_boundaries(&self, surface_idx: &[SurfacePath]) -> Result<Vec<&Coordinates>> {
        surface_idx
            .iter()
            .map(|path| self.boundaries.get_path(path))
            .collect()
    }
}

/// Replace every vertex index by its coordinate, keeping the nesting
pub fn dereference_boundaries(
    boundaries: &VertexIndices,
    vertices: &VertexPool,
) -> Result<Coordinates> {
    boundaries.try_map(&mut |&index| vertices.get(index))
}

fn check_surface_paths(kind: ShapeKind, boundaries: &Coordinates, index: &SurfaceIndex) -> Result<()> {
    let expected = kind.semantic_depth();
    for path in index.values().flatten() {
        if path.len() != expected {
            return Err(Error::shape_mismatch(
                kind,
                "semantic values",
                expected,
                path.len(),
            ));
        }
        boundaries.get_path(path)?;
    }
    Ok(())
}
