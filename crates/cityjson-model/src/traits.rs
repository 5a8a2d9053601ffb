// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Core traits for CityJSON parsing
//!
//! These traits separate the document loader from the consumers of the
//! resolved model.

use crate::{CityObject, DocumentMetadata, ModelInfo, Result, ShapeKind, VertexPool};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Progress callback type for parsing operations
pub type ProgressCallback = Box<dyn Fn(&str, f32) + Send>;

/// Main parsing interface - entry point for loading CityJSON content
///
/// # Example
///
/// ```ignore
/// use cityjson_model::{CityModel, DocumentParser};
///
/// let parser: Box<dyn DocumentParser> = get_parser();
/// let model = parser.parse(content)?;
/// println!("{} city objects", model.city_object_count());
/// ```
pub trait DocumentParser: Send + Sync {
    /// Parse CityJSON content and return a model
    ///
    /// # Arguments
    /// * `content` - The document text
    ///
    /// # Returns
    /// An `Arc<dyn CityModel>` on success, or an `Error` on failure
    fn parse(&self, content: &str) -> Result<Arc<dyn CityModel>>;

    /// Parse CityJSON content with progress reporting
    ///
    /// # Arguments
    /// * `content` - The document text
    /// * `on_progress` - Callback function receiving (phase_name, percent_complete)
    fn parse_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<Arc<dyn CityModel>>;
}

/// Read-only access to a parsed CityJSON document
///
/// The model is thread-safe (`Send + Sync`); nothing in it changes after
/// parsing.
pub trait CityModel: Send + Sync {
    /// Document metadata (version, CRS, extent)
    fn metadata(&self) -> &DocumentMetadata;

    /// The shared vertex pool
    fn vertices(&self) -> &VertexPool;

    /// Get a city object by id
    fn city_object(&self, id: &str) -> Option<&CityObject>;

    /// All city object ids in document order
    fn city_object_ids(&self) -> Vec<&str>;

    /// Find city objects by type name (case-insensitive)
    fn city_objects_by_type(&self, type_name: &str) -> Vec<&CityObject>;

    /// Whether the appearance block declares materials
    fn has_materials(&self) -> bool;

    /// Whether the appearance block declares textures
    fn has_textures(&self) -> bool;

    /// Number of city objects
    fn city_object_count(&self) -> usize {
        self.city_object_ids().len()
    }

    /// All city objects in document order
    fn city_objects(&self) -> Vec<&CityObject> {
        self.city_object_ids()
            .into_iter()
            .filter_map(|id| self.city_object(id))
            .collect()
    }

    /// Summarize the document
    fn info(&self) -> ModelInfo {
        let objects = self.city_objects();
        let object_types: BTreeSet<&str> =
            objects.iter().map(|o| o.object_type.as_str()).collect();
        let shape_kinds: BTreeSet<ShapeKind> =
            objects.iter().flat_map(|o| o.shape_kinds()).collect();
        let metadata = self.metadata();

        ModelInfo {
            cityjson_version: metadata.version.clone(),
            crs: metadata.epsg,
            bbox: metadata.bbox.clone(),
            cityobjects_total: objects.len(),
            vertices_total: self.vertices().len(),
            cityobjects_present: object_types.into_iter().map(str::to_string).collect(),
            geom_primitives_present: shape_kinds.into_iter().collect(),
            materials: self.has_materials(),
            textures: self.has_textures(),
        }
    }
}
