// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! CityJSON Parser - Document loader for CityJSON files
//!
//! This crate reads CityJSON documents into the typed model defined in
//! `cityjson-model`. It implements the `DocumentParser` and `CityModel`
//! traits from that crate.
//!
//! # Features
//!
//! - **Shared vertex pool** - one `Arc`-backed pool per document
//! - **Compressed vertices** - `transform` is applied while loading
//! - **Parallel geometry** resolution using `rayon`
//! - **Progress reporting** for large files
//!
//! # Example
//!
//! ```ignore
//! use cityjson_parser::CityJsonParser;
//! use cityjson_model::DocumentParser;
//!
//! let parser = CityJsonParser::new().with_parallel(true);
//! let model = parser.parse(content)?;
//!
//! for building in model.city_objects_by_type("Building") {
//!     for geom in &building.geometry {
//!         println!("{}: {} roofs", building.id, geom.get_surfaces("RoofSurface").count());
//!     }
//! }
//! ```

mod model;
mod raw;

pub use model::ParsedModel;

use cityjson_model::{CityModel, DocumentParser, ProgressCallback, Result};
use std::sync::Arc;

/// Main CityJSON parser implementing `DocumentParser` trait
///
/// Creates a `ParsedModel` with every geometry resolved against the
/// document's vertex pool.
pub struct CityJsonParser {
    /// Whether to resolve semantic surfaces
    pub resolve_semantics: bool,
    /// Whether to resolve city objects in parallel
    pub parallel: bool,
}

impl Default for CityJsonParser {
    fn default() -> Self {
        Self::new()
    }
}

impl CityJsonParser {
    /// Create a new parser with default settings
    pub fn new() -> Self {
        Self {
            resolve_semantics: true,
            parallel: false,
        }
    }

    /// Create a parser that skips semantic surfaces
    pub fn geometry_only() -> Self {
        Self {
            resolve_semantics: false,
            parallel: false,
        }
    }

    /// Set whether to resolve semantics
    pub fn with_semantics(mut self, enabled: bool) -> Self {
        self.resolve_semantics = enabled;
        self
    }

    /// Set whether to resolve city objects in parallel
    pub fn with_parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}

impl DocumentParser for CityJsonParser {
    fn parse(&self, content: &str) -> Result<Arc<dyn CityModel>> {
        ParsedModel::parse(content, self.resolve_semantics, self.parallel)
            .map(|m| Arc::new(m) as Arc<dyn CityModel>)
    }

    fn parse_with_progress(
        &self,
        content: &str,
        on_progress: ProgressCallback,
    ) -> Result<Arc<dyn CityModel>> {
        ParsedModel::parse_with_progress(
            content,
            self.resolve_semantics,
            self.parallel,
            on_progress,
        )
        .map(|m| Arc::new(m) as Arc<dyn CityModel>)
    }
}

/// Quick parse function for simple use cases
pub fn parse(content: &str) -> Result<Arc<dyn CityModel>> {
    CityJsonParser::new().parse(content)
}

/// Parse with progress reporting
pub fn parse_with_progress(
    content: &str,
    on_progress: impl Fn(&str, f32) + Send + 'static,
) -> Result<Arc<dyn CityModel>> {
    CityJsonParser::new().parse_with_progress(content, Box::new(on_progress))
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"{
      "type": "CityJSON",
      "version": "2.0",
      "CityObjects": {
        "b1": {
          "type": "Building",
          "geometry": [{
            "type": "MultiSurface",
            "lod": "2",
            "boundaries": [[[0, 1, 2]], [[0, 2, 3]]],
            "semantics": {
              "surfaces": [{"type": "GroundSurface"}, {"type": "RoofSurface"}],
              "values": [0, 1]
            }
          }]
        }
      },
      "vertices": [[0, 0, 0], [1, 0, 0], [1, 1, 0], [0, 1, 0]]
    }"#;

    #[test]
    fn test_parser_defaults() {
        let parser = CityJsonParser::default();
        assert!(parser.resolve_semantics);
        assert!(!parser.parallel);

        let parser = CityJsonParser::geometry_only().with_parallel(true);
        assert!(!parser.resolve_semantics);
        assert!(parser.parallel);
    }

    #[test]
    fn test_parse_through_trait() {
        let model = parse(MINIMAL).unwrap();
        assert_eq!(model.city_object_count(), 1);

        let geom = &model.city_object("b1").unwrap().geometry[0];
        let (id, ground) = geom.get_surfaces("GroundSurface").next().unwrap();
        assert_eq!(id, 0);
        assert_eq!(ground.surface_idx, vec![vec![0]]);
    }

    #[test]
    fn test_geometry_only_parser() {
        let model = CityJsonParser::geometry_only().parse(MINIMAL).unwrap();
        let geom = &model.city_object("b1").unwrap().geometry[0];
        assert!(geom.semantics().is_none());
        assert_eq!(geom.vertex_count(), 6);
    }
}
