// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for geometry resolution and document loading

use crate::ShapeKind;
use thiserror::Error;

/// Result type alias for model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building or querying a city model
#[derive(Error, Debug)]
pub enum Error {
    /// Unrecognized geometry type tag
    #[error("Unknown geometry type: {0}")]
    ShapeKind(String),

    /// Nesting depth of an array disagrees with the geometry type
    #[error("{part} of {kind} must be nested {expected} levels deep, found {actual}")]
    ShapeMismatch {
        kind: ShapeKind,
        part: &'static str,
        expected: usize,
        actual: usize,
    },

    /// Vertex index outside the vertex pool
    #[error("Vertex index {index} out of range for a pool of {pool_size} vertices")]
    VertexIndex { index: usize, pool_size: usize },

    /// Surface index path does not address anything in the boundaries
    #[error("Surface path {path:?} out of range at level {level} (length {len})")]
    PathIndex {
        path: Vec<usize>,
        level: usize,
        len: usize,
    },

    /// Semantic value referencing a surface that does not exist
    #[error("Semantic surface {id} referenced but only {count} surfaces are defined")]
    SurfaceIndex { id: usize, count: usize },

    /// Not a CityJSON document
    #[error("Invalid CityJSON format: {0}")]
    InvalidFormat(String),

    /// Geometry failure inside a specific city object
    #[error("City object '{id}': {source}")]
    CityObject {
        id: String,
        #[source]
        source: Box<Error>,
    },

    /// Malformed JSON handed over by the loader
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an unknown geometry type error
    pub fn shape_kind(tag: impl Into<String>) -> Self {
        Error::ShapeKind(tag.into())
    }

    /// Create a depth mismatch error
    pub fn shape_mismatch(
        kind: ShapeKind,
        part: &'static str,
        expected: usize,
        actual: usize,
    ) -> Self {
        Error::ShapeMismatch {
            kind,
            part,
            expected,
            actual,
        }
    }

    /// Create a vertex index error
    pub fn vertex_index(index: usize, pool_size: usize) -> Self {
        Error::VertexIndex { index, pool_size }
    }

    /// Create a path index error
    pub fn path_index(path: &[usize], level: usize, len: usize) -> Self {
        Error::PathIndex {
            path: path.to_vec(),
            level,
            len,
        }
    }

    /// Create a format error
    pub fn format(msg: impl Into<String>) -> Self {
        Error::InvalidFormat(msg.into())
    }

    /// Attach the owning city object id to an error
    pub fn in_city_object(self, id: impl Into<String>) -> Self {
        Error::CityObject {
            id: id.into(),
            source: Box::new(self),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_mismatch_message() {
        let err = Error::shape_mismatch(ShapeKind::CompositeSurface, "boundaries", 3, 5);
        assert_eq!(
            err.to_string(),
            "boundaries of CompositeSurface must be nested 3 levels deep, found 5"
        );
    }

    #[test]
    fn test_semantic_values_mismatch_message() {
        let err = Error::shape_mismatch(ShapeKind::Solid, "semantic values", 2, 3);
        assert_eq!(
            err.to_string(),
            "semantic values of Solid must be nested 2 levels deep, found 3"
        );
    }

    #[test]
    fn test_city_object_wraps_source() {
        let err = Error::vertex_index(9, 6).in_city_object("building-1");
        assert_eq!(
            err.to_string(),
            "City object 'building-1': Vertex index 9 out of range for a pool of 6 vertices"
        );
        assert!(std::error::Error::source(&err).is_some());
    }
}
