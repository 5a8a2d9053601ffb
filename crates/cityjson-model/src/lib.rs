// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityJSON Model - Typed geometry and semantics for CityJSON documents
//!
//! This crate turns the index-based geometry encoding of CityJSON into a
//! typed model. Boundary arrays are checked against their geometry type and
//! dereferenced against the document's shared vertex pool, and semantic
//! surfaces are resolved to the exact locations they occupy in those arrays.
//!
//! # Architecture
//!
//! - [`VertexPool`] - Document-wide coordinates, shared by reference
//! - [`Nested`] - Boundary arrays of any depth, raw or resolved
//! - [`Geometry`] - One resolved geometry object
//! - [`index_surface_boundaries`] / [`resolve_surfaces`] - Semantic resolution
//! - [`DocumentParser`] / [`CityModel`] - Traits for document loaders
//!
//! # Example
//!
//! ```ignore
//! use cityjson_model::{Geometry, GeometryDef, VertexPool};
//!
//! let vertices = VertexPool::new(raw_vertices);
//! let geom = Geometry::from_def(&def, &vertices)?;
//!
//! for (id, roof) in geom.get_surfaces("RoofSurface") {
//!     let parts = geom.get_surface_boundaries(&roof.surface_idx)?;
//!     println!("roof {id}: {} parts", parts.len());
//! }
//! ```

pub mod boundary;
pub mod document;
pub mod error;
pub mod geometry;
pub mod semantics;
pub mod traits;
pub mod types;
pub mod vertices;

// Re-export all public types
pub use boundary::*;
pub use document::*;
pub use error::*;
pub use geometry::*;
pub use semantics::*;
pub use traits::*;
pub use types::*;
pub use vertices::*;
