// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Document-wide vertex pool

use crate::{Error, Result};
use nalgebra::Point3;
use std::sync::Arc;

/// Shared, immutable list of vertex coordinates
///
/// Cloning a pool only bumps a reference count, so every geometry built
/// from one document can hold the same coordinates without copying them.
/// The pool is never mutated after construction, which makes it safe to
/// read from many threads at once.
#[derive(Clone, Debug)]
pub struct VertexPool {
    points: Arc<[Point3<f64>]>,
}

impl VertexPool {
    /// Create a pool from coordinate triples
    pub fn new(points: impl IntoIterator<Item = [f64; 3]>) -> Self {
        Self {
            points: points
                .into_iter()
                .map(|[x, y, z]| Point3::new(x, y, z))
                .collect(),
        }
    }

    /// Look up a vertex by index
    ///
    /// # Returns
    /// The coordinate, or `Error::VertexIndex` naming the index and pool size
    pub fn get(&self, index: usize) -> Result<Point3<f64>> {
        self.points
            .get(index)
            .copied()
            .ok_or_else(|| Error::vertex_index(index, self.points.len()))
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the pool has no vertices
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// All vertices in index order
    pub fn as_slice(&self) -> &[Point3<f64>] {
        &self.points
    }

    /// Check if two handles share the same storage
    pub fn ptr_eq(&self, other: &VertexPool) -> bool {
        Arc::ptr_eq(&self.points, &other.points)
    }
}

impl Default for VertexPool {
    fn default() -> Self {
        Self {
            points: Arc::from(Vec::new()),
        }
    }
}

impl From<Vec<[f64; 3]>> for VertexPool {
    fn from(points: Vec<[f64; 3]>) -> Self {
        VertexPool::new(points)
    }
}
