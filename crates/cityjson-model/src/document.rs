// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! City objects, document metadata and the summary report

use crate::{Geometry, Result, ShapeKind};
use serde::Serialize;
use serde_json::{Map, Value};

/// A city object with its geometries resolved
#[derive(Clone, Debug)]
pub struct CityObject {
    /// Key of the object in the document
    pub id: String,
    /// Object type (e.g., "Building", "Road")
    pub object_type: String,
    /// Object attributes, as found in the document
    pub attributes: Map<String, Value>,
    /// Ids of parent objects
    pub parents: Vec<String>,
    /// Ids of child objects
    pub children: Vec<String>,
    /// Geometries in document order
    pub geometry: Vec<Geometry>,
}

impl CityObject {
    /// Check the object type, ignoring ASCII case
    pub fn is_type(&self, type_name: &str) -> bool {
        self.object_type.eq_ignore_ascii_case(type_name)
    }

    /// Shape kinds of this object's geometries
    pub fn shape_kinds(&self) -> impl Iterator<Item = ShapeKind> + '_ {
        self.geometry.iter().map(Geometry::kind)
    }
}

/// Document-level metadata
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DocumentMetadata {
    /// CityJSON version (e.g., "1.0")
    pub version: String,
    /// EPSG code of the coordinate reference system
    pub epsg: Option<u32>,
    /// Bounding box [minx, miny, minz, maxx, maxy, maxz]
    pub bbox: Option<Vec<f64>>,
}

/// Summary of a parsed document
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ModelInfo {
    pub cityjson_version: String,
    pub crs: Option<u32>,
    /// Reported under the key `box`
    #[serde(rename = "box")]
    pub bbox: Option<Vec<f64>>,
    pub cityobjects_total: usize,
    pub vertices_total: usize,
    /// Distinct city object types, sorted
    pub cityobjects_present: Vec<String>,
    /// Distinct geometry types, sorted from shallowest to deepest
    pub geom_primitives_present: Vec<ShapeKind>,
    pub materials: bool,
    pub textures: bool,
}

impl ModelInfo {
    /// Render as indented JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_json_field_order() {
        let info = ModelInfo {
            cityjson_version: "1.0".to_string(),
            crs: Some(7415),
            bbox: None,
            cityobjects_total: 2,
            vertices_total: 8,
            cityobjects_present: vec!["Building".to_string()],
            geom_primitives_present: vec![ShapeKind::MultiSurface, ShapeKind::Solid],
            materials: false,
            textures: true,
        };
        let json = info.to_json_pretty().unwrap();

        let keys: Vec<_> = json
            .lines()
            .filter_map(|line| line.trim().strip_prefix('"'))
            .filter_map(|line| line.split('"').next())
            .filter(|key| key.contains('_') || ["crs", "box", "materials", "textures"].contains(key))
            .collect();
        assert_eq!(
            keys,
            vec![
                "cityjson_version",
                "crs",
                "box",
                "cityobjects_total",
                "vertices_total",
                "cityobjects_present",
                "geom_primitives_present",
                "materials",
                "textures",
            ]
        );
        assert!(json.contains("\"Solid\""));
        assert!(json.contains("\"box\": null"));
    }
}
