// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Nested boundary arrays
//!
//! CityJSON encodes every geometry as arrays nested to a depth fixed by the
//! geometry type. [`Nested`] models such an array generically so that the
//! same depth check, dereferencing and path lookup serve all six shapes, the
//! raw vertex indices, the resolved coordinates and the semantic values.

use crate::{Error, Result};
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Arbitrarily nested array with leaves of type `T`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Nested<T> {
    Leaf(T),
    List(Vec<Nested<T>>),
}

/// Boundary array of vertex indices, as stored in the document
pub type VertexIndices = Nested<usize>;

/// Boundary array with every index replaced by its coordinate
pub type Coordinates = Nested<Point3<f64>>;

/// Semantic values array; `None` means no surface at that location
pub type SemanticValues = Nested<Option<usize>>;

impl<T> Default for Nested<T> {
    fn default() -> Self {
        Nested::List(Vec::new())
    }
}

impl<T> From<Vec<T>> for Nested<T> {
    fn from(leaves: Vec<T>) -> Self {
        Nested::List(leaves.into_iter().map(Nested::Leaf).collect())
    }
}

impl<T> Nested<T> {
    /// Try to get as leaf
    pub fn as_leaf(&self) -> Option<&T> {
        match self {
            Nested::Leaf(value) => Some(value),
            Nested::List(_) => None,
        }
    }

    /// Try to get as list
    pub fn as_list(&self) -> Option<&[Nested<T>]> {
        match self {
            Nested::Leaf(_) => None,
            Nested::List(items) => Some(items),
        }
    }

    /// Number of direct children (0 for a leaf)
    pub fn len(&self) -> usize {
        self.as_list().map_or(0, <[_]>::len)
    }

    /// Check if this is an empty list
    pub fn is_empty(&self) -> bool {
        matches!(self, Nested::List(items) if items.is_empty())
    }

    /// Deepest nesting level below this node
    ///
    /// A leaf has depth 0, `[]` and `[1, 2]` have depth 1, `[[1]]` depth 2.
    pub fn depth(&self) -> usize {
        match self {
            Nested::Leaf(_) => 0,
            Nested::List(items) => 1 + items.iter().map(Nested::depth).max().unwrap_or(0),
        }
    }

    /// Total number of leaves
    pub fn leaf_count(&self) -> usize {
        match self {
            Nested::Leaf(_) => 1,
            Nested::List(items) => items.iter().map(Nested::leaf_count).sum(),
        }
    }

    /// Verify that every leaf sits exactly `expected` levels deep
    ///
    /// Empty lists above the leaf level are accepted, so `[]` or `[[]]`
    /// pass for any depth they do not exceed.
    ///
    /// # Returns
    /// `Err(actual)` with the depth of the first offending leaf, in
    /// traversal order
    pub fn check_depth(&self, expected: usize) -> std::result::Result<(), usize> {
        match self.first_misplaced(0, expected) {
            Some(actual) => Err(actual),
            None => Ok(()),
        }
    }

    fn first_misplaced(&self, level: usize, expected: usize) -> Option<usize> {
        match self {
            Nested::Leaf(_) => (level != expected).then_some(level),
            Nested::List(_) if level >= expected => Some(level + self.depth()),
            Nested::List(items) => items
                .iter()
                .find_map(|item| item.first_misplaced(level + 1, expected)),
        }
    }

    /// Build a new array of the same shape by converting every leaf
    ///
    /// Stops at the first leaf for which `f` fails.
    pub fn try_map<U, E, F>(&self, f: &mut F) -> std::result::Result<Nested<U>, E>
    where
        F: FnMut(&T) -> std::result::Result<U, E>,
    {
        Ok(match self {
            Nested::Leaf(value) => Nested::Leaf(f(value)?),
            Nested::List(items) => Nested::List(
                items
                    .iter()
                    .map(|item| item.try_map(f))
                    .collect::<std::result::Result<_, _>>()?,
            ),
        })
    }

    /// Follow a path of indices, one per level
    ///
    /// An empty path returns `self`.
    ///
    /// # Returns
    /// The sub-array at the end of the path, or `Error::PathIndex` naming
    /// the level at which the path left the array
    pub fn get_path(&self, path: &[usize]) -> Result<&Nested<T>> {
        let mut node = self;
        for (level, &index) in path.iter().enumerate() {
            node = match node {
                Nested::List(items) => items
                    .get(index)
                    .ok_or_else(|| Error::path_index(path, level, items.len()))?,
                Nested::Leaf(_) => return Err(Error::path_index(path, level, 0)),
            };
        }
        Ok(node)
    }

    /// Visit every leaf depth-first, left to right, with its index path
    pub fn for_each_leaf<F>(&self, mut f: F)
    where
        F: FnMut(&[usize], &T),
    {
        let mut path = Vec::new();
        self.visit_leaves(&mut path, &mut f);
    }

    fn visit_leaves<F>(&self, path: &mut Vec<usize>, f: &mut F)
    where
        F: FnMut(&[usize], &T),
    {
        match self {
            Nested::Leaf(value) => f(path, value),
            Nested::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    path.push(i);
                    item.visit_leaves(path, f);
                    path.pop();
                }
            }
        }
    }
}
