// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! ParsedModel - Main CityJSON model implementation

use crate::raw::{check_unique_keys, RawCityObject, RawDocument};

use cityjson_model::{
    CityModel, CityObject, DocumentMetadata, Error, Geometry, GeometryDef, ProgressCallback,
    Result, ShapeKind, VertexPool,
};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde_json::Value;

/// CityJSON versions this loader has been checked against
const KNOWN_VERSIONS: [&str; 4] = ["1.0", "1.1", "2.0", "2.0.1"];

/// Parsed CityJSON document implementing the `CityModel` trait
///
/// Every geometry is resolved during parsing; afterwards the model is
/// read-only apart from [`ParsedModel::set_epsg`].
pub struct ParsedModel {
    /// Shared coordinates
    vertices: VertexPool,
    /// City objects in document order
    objects: Vec<CityObject>,
    /// Object id -> position in `objects`
    index: FxHashMap<String, usize>,
    /// Lowercased object type -> positions in `objects`
    type_index: FxHashMap<String, Vec<usize>>,
    /// Document metadata
    metadata: DocumentMetadata,
    materials: bool,
    textures: bool,
}

impl ParsedModel {
    /// Parse CityJSON content and create a model
    pub fn parse(content: &str, resolve_semantics: bool, parallel: bool) -> Result<Self> {
        Self::parse_with_progress(content, resolve_semantics, parallel, Box::new(|_, _| {}))
    }

    /// Parse with progress reporting
    pub fn parse_with_progress(
        content: &str,
        resolve_semantics: bool,
        parallel: bool,
        on_progress: ProgressCallback,
    ) -> Result<Self> {
        on_progress("Reading document", 0.0);
        check_unique_keys(content)?;
        let raw: RawDocument = serde_json::from_str(content)?;
        if raw.document_type != "CityJSON" {
            return Err(Error::format("Not a CityJSON file"));
        }
        if !KNOWN_VERSIONS.contains(&raw.version.as_str()) {
            log::warn!("CityJSON version '{}' has not been tested", raw.version);
        }
        let metadata = raw.document_metadata();
        let materials = raw.has_appearance("materials");
        let textures = raw.has_appearance("textures");

        on_progress("Building vertex pool", 20.0);
        let vertices = match &raw.transform {
            Some(transform) => VertexPool::new(raw.vertices.iter().map(|v| transform.apply(*v))),
            None => VertexPool::new(raw.vertices.iter().copied()),
        };
        log::debug!(
            "{} vertices, {} city objects",
            vertices.len(),
            raw.city_objects.len()
        );

        on_progress("Resolving geometry", 40.0);
        let entries: Vec<(String, Value)> = raw.city_objects.into_iter().collect();
        let build = |(id, value): (String, Value)| {
            build_city_object(id, value, &vertices, resolve_semantics)
        };
        let objects: Vec<CityObject> = if parallel {
            entries.into_par_iter().map(build).collect::<Result<_>>()?
        } else {
            entries.into_iter().map(build).collect::<Result<_>>()?
        };

        on_progress("Indexing city objects", 90.0);
        let mut index = FxHashMap::default();
        let mut type_index: FxHashMap<String, Vec<usize>> = FxHashMap::default();
        for (position, object) in objects.iter().enumerate() {
            index.insert(object.id.clone(), position);
            type_index
                .entry(object.object_type.to_ascii_lowercase())
                .or_default()
                .push(position);
        }

        on_progress("Complete", 100.0);

        Ok(Self {
            vertices,
            objects,
            index,
            type_index,
            metadata,
            materials,
            textures,
        })
    }

    /// Set the EPSG code of the coordinate reference system
    ///
    /// Only the metadata changes; coordinates are not transformed.
    ///
    /// # Returns
    /// `true` if `code` is an integer and was stored, `false` otherwise (the
    /// previous code is kept)
    pub fn set_epsg(&mut self, code: &str) -> bool {
        match code.trim().parse::<u32>() {
            Ok(epsg) => {
                self.metadata.epsg = Some(epsg);
                true
            }
            Err(_) => {
                log::debug!("ignoring non-numeric EPSG code '{code}'");
                false
            }
        }
    }
}

fn build_city_object(
    id: String,
    value: Value,
    vertices: &VertexPool,
    resolve_semantics: bool,
) -> Result<CityObject> {
    let raw: RawCityObject = match serde_json::from_value(value) {
        Ok(raw) => raw,
        Err(e) => return Err(Error::from(e).in_city_object(id)),
    };

    let geometry = match raw
        .geometry
        .iter()
        .map(|def| build_geometry(def, vertices, resolve_semantics))
        .collect::<Result<Vec<_>>>()
    {
        Ok(geometry) => geometry,
        Err(e) => return Err(e.in_city_object(id)),
    };

    Ok(CityObject {
        id,
        object_type: raw.object_type,
        attributes: raw.attributes,
        parents: raw.parents,
        children: raw.children,
        geometry,
    })
}

fn build_geometry(
    def: &GeometryDef,
    vertices: &VertexPool,
    resolve_semantics: bool,
) -> Result<Geometry> {
    if resolve_semantics {
        return Geometry::from_def(def, vertices);
    }
    let kind = ShapeKind::parse(&def.geometry_type)?;
    Geometry::build(kind, def.lod.clone(), &def.boundaries, None, vertices)
}

impl CityModel for ParsedModel {
    fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }

    fn vertices(&self) -> &VertexPool {
        &self.vertices
    }

    fn city_object(&self, id: &str) -> Option<&CityObject> {
        self.index.get(id).map(|&position| &self.objects[position])
    }

    fn city_object_ids(&self) -> Vec<&str> {
        self.objects.iter().map(|o| o.id.as_str()).collect()
    }

    fn city_objects_by_type(&self, type_name: &str) -> Vec<&CityObject> {
        self.type_index
            .get(&type_name.to_ascii_lowercase())
            .map(|positions| positions.iter().map(|&p| &self.objects[p]).collect())
            .unwrap_or_default()
    }

    fn has_materials(&self) -> bool {
        self.materials
    }

    fn has_textures(&self) -> bool {
        self.textures
    }

    fn city_object_count(&self) -> usize {
        self.objects.len()
    }

    fn city_objects(&self) -> Vec<&CityObject> {
        self.objects.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cityjson_model::AttributeValue;
    use std::sync::{Arc, Mutex};

    const TEST_CITYJSON: &str = r#"{
  "type": "CityJSON",
  "version": "1.0",
  "metadata": {
    "crs": {"epsg": 7415},
    "geographicalExtent": [0.0, 1.0, 0.0, 5.0, 1.0, 0.0]
  },
  "CityObjects": {
    "building-2": {
      "type": "Building",
      "attributes": {"measuredHeight": 12.5},
      "children": ["part-1"],
      "geometry": [{
        "type": "CompositeSolid",
        "lod": 2,
        "boundaries": [
          [
            [[[0, 0, 0, 0, 0]], [[1, 1, 1, 1]], [[2, 2, 2, 2]], [[3, 3, 3, 3]]],
            [[[2, 2, 2, 2]], [[3, 3, 3, 3]], [[4, 4, 4, 4]], [[5, 5, 5, 5]]]
          ],
          [
            [[[0, 0, 0, 0, 0]], [[1, 1, 1, 1]], [[2, 2, 2, 2]], [[3, 3, 3, 3]]]
          ]
        ],
        "semantics": {
          "surfaces": [
            {"type": "WallSurface", "slope": 33.4, "children": [2], "parent": 1},
            {"type": "RoofSurface", "slope": 66.6, "children": [0]},
            {"type": "Door", "parent": 0, "colour": "blue"},
            {"type": "Door", "parent": 0, "colour": "red"}
          ],
          "values": [
            [[2, 1, 0, 3], [2, 1, 0, 3]],
            [null]
          ]
        }
      }]
    },
    "part-1": {
      "type": "BuildingPart",
      "parents": ["building-2"],
      "geometry": [{
        "type": "MultiSurface",
        "lod": "1.2",
        "boundaries": [[[0, 1, 2]], [[3, 4, 5]]]
      }]
    },
    "tree-1": {
      "type": "SolitaryVegetationObject",
      "geometry": [{"type": "MultiPoint", "lod": 1, "boundaries": [2, 4, 5]}]
    }
  },
  "vertices": [
    [0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [2.0, 1.0, 0.0],
    [3.0, 1.0, 0.0], [4.0, 1.0, 0.0], [5.0, 1.0, 0.0]
  ],
  "appearance": {"textures": []}
}"#;

    #[test]
    fn test_parse_model() {
        let model = ParsedModel::parse(TEST_CITYJSON, true, false).unwrap();

        assert_eq!(model.metadata().version, "1.0");
        assert_eq!(model.metadata().epsg, Some(7415));
        assert_eq!(model.vertices().len(), 6);
        assert_eq!(model.city_object_count(), 3);

        // document order, not key order
        assert_eq!(
            model.city_object_ids(),
            vec!["building-2", "part-1", "tree-1"]
        );

        let part = model.city_object("part-1").unwrap();
        assert_eq!(part.parents, vec!["building-2".to_string()]);
        assert_eq!(part.geometry[0].kind(), ShapeKind::MultiSurface);
        assert_eq!(part.geometry[0].lod().unwrap().to_string(), "1.2");
    }

    #[test]
    fn test_multipoint_dereferenced() {
        let model = ParsedModel::parse(TEST_CITYJSON, true, false).unwrap();
        let tree = model.city_object("tree-1").unwrap();
        let points = tree.geometry[0].boundaries().as_list().unwrap();
        let x: Vec<f64> = points
            .iter()
            .map(|p| p.as_leaf().unwrap().x)
            .collect();
        assert_eq!(x, vec![2.0, 4.0, 5.0]);
    }

    #[test]
    fn test_semantic_queries() {
        let model = ParsedModel::parse(TEST_CITYJSON, true, false).unwrap();
        let building = model.city_object("building-2").unwrap();
        let geom = &building.geometry[0];

        let doors: Vec<_> = geom.get_surfaces("DOOR").collect();
        assert_eq!(doors.len(), 2);
        assert_eq!(doors[1].1.attribute("colour"), Some(&AttributeValue::from("red")));

        let (_, roof) = geom.get_surfaces("roofsurface").next().unwrap();
        let parts = geom.get_surface_boundaries(&roof.surface_idx).unwrap();
        assert_eq!(parts.len(), 2);
        assert_eq!(parts[1].leaf_count(), 4);
    }

    #[test]
    fn test_without_semantics() {
        let model = ParsedModel::parse(TEST_CITYJSON, false, false).unwrap();
        let geom = &model.city_object("building-2").unwrap().geometry[0];
        assert!(geom.semantics().is_none());
        assert_eq!(geom.get_surfaces("door").count(), 0);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let sequential = ParsedModel::parse(TEST_CITYJSON, true, false).unwrap();
        let parallel = ParsedModel::parse(TEST_CITYJSON, true, true).unwrap();

        assert_eq!(sequential.city_object_ids(), parallel.city_object_ids());
        for id in sequential.city_object_ids() {
            let a = &sequential.city_object(id).unwrap().geometry;
            let b = &parallel.city_object(id).unwrap().geometry;
            assert_eq!(a.len(), b.len());
            for (ga, gb) in a.iter().zip(b) {
                assert_eq!(ga.boundaries(), gb.boundaries());
                assert_eq!(ga.semantics(), gb.semantics());
            }
        }
    }

    #[test]
    fn test_objects_by_type() {
        let model = ParsedModel::parse(TEST_CITYJSON, true, false).unwrap();
        let buildings = model.city_objects_by_type("building");
        assert_eq!(buildings.len(), 1);
        assert_eq!(buildings[0].id, "building-2");
        assert!(model.city_objects_by_type("Bridge").is_empty());
    }

    #[test]
    fn test_info() {
        let model = ParsedModel::parse(TEST_CITYJSON, true, false).unwrap();
        let info = model.info();

        assert_eq!(info.cityjson_version, "1.0");
        assert_eq!(info.crs, Some(7415));
        assert_eq!(info.bbox, Some(vec![0.0, 1.0, 0.0, 5.0, 1.0, 0.0]));
        assert_eq!(info.cityobjects_total, 3);
        assert_eq!(info.vertices_total, 6);
        assert_eq!(
            info.cityobjects_present,
            vec!["Building", "BuildingPart", "SolitaryVegetationObject"]
        );
        assert_eq!(
            info.geom_primitives_present,
            vec![
                ShapeKind::MultiPoint,
                ShapeKind::MultiSurface,
                ShapeKind::CompositeSolid
            ]
        );
        assert!(!info.materials);
        assert!(info.textures);
    }

    #[test]
    fn test_set_epsg() {
        let mut model = ParsedModel::parse(TEST_CITYJSON, true, false).unwrap();

        assert!(model.set_epsg("28992"));
        assert_eq!(model.metadata().epsg, Some(28992));

        assert!(!model.set_epsg("hugo"));
        assert_eq!(model.metadata().epsg, Some(28992));
    }

    #[test]
    fn test_not_cityjson() {
        let err = ParsedModel::parse(r#"{"type": "FeatureCollection"}"#, true, false)
            .err()
            .unwrap();
        assert!(matches!(err, Error::InvalidFormat(_)));
    }

    #[test]
    fn test_malformed_json() {
        let err = ParsedModel::parse("{\"type\": ", true, false).err().unwrap();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_duplicate_city_object_rejected() {
        let content = r#"{
          "type": "CityJSON",
          "version": "1.1",
          "CityObjects": {
            "b1": {"type": "Building", "geometry": [{"type": "MultiPoint", "boundaries": [0]}]},
            "b1": {"type": "Road"}
          },
          "vertices": [[0, 0, 0]]
        }"#;
        let err = ParsedModel::parse(content, true, false).err().unwrap();
        assert!(matches!(err, Error::Json(_)));
        assert!(err.to_string().contains("duplicate key 'b1'"));
    }

    #[test]
    fn test_object_valued_surface_attribute() {
        let content = r#"{
          "type": "CityJSON",
          "version": "1.1",
          "CityObjects": {
            "b1": {"type": "Building", "geometry": [{
              "type": "MultiSurface",
              "lod": "2",
              "boundaries": [[[0, 1, 2]]],
              "semantics": {
                "surfaces": [{"type": "RoofSurface", "address": {"street": "x"}}],
                "values": [0]
              }
            }]}
          },
          "vertices": [[0, 0, 0], [1, 0, 0], [1, 1, 0]]
        }"#;
        let model = ParsedModel::parse(content, true, false).unwrap();
        let geom = &model.city_object("b1").unwrap().geometry[0];
        let (_, roof) = geom.get_surfaces("RoofSurface").next().unwrap();
        let address = roof.attribute("address").unwrap().as_map().unwrap();
        assert_eq!(address["street"].as_string(), Some("x"));
    }

    #[test]
    fn test_bad_geometry_names_city_object() {
        let content = TEST_CITYJSON.replace("[2, 4, 5]", "[2, 4, 9]");
        let err = ParsedModel::parse(&content, true, true).err().unwrap();
        match err {
            Error::CityObject { id, source } => {
                assert_eq!(id, "tree-1");
                assert!(matches!(
                    *source,
                    Error::VertexIndex {
                        index: 9,
                        pool_size: 6
                    }
                ));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_transform_applied() {
        let content = r#"{
          "type": "CityJSON",
          "version": "1.1",
          "transform": {"scale": [0.5, 0.5, 1.0], "translate": [10.0, 20.0, 0.0]},
          "CityObjects": {
            "p": {"type": "CityFurniture", "geometry": [{"type": "MultiPoint", "lod": "1", "boundaries": [0]}]}
          },
          "vertices": [[4, 6, 3]]
        }"#;
        let model = ParsedModel::parse(content, true, false).unwrap();
        let p = model.vertices().get(0).unwrap();
        approx::assert_relative_eq!(p.x, 12.0);
        approx::assert_relative_eq!(p.y, 23.0);
        approx::assert_relative_eq!(p.z, 3.0);
    }

    #[test]
    fn test_progress_phases() {
        let phases = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&phases);
        ParsedModel::parse_with_progress(
            TEST_CITYJSON,
            true,
            false,
            Box::new(move |phase, percent| {
                sink.lock().unwrap().push((phase.to_string(), percent));
            }),
        )
        .unwrap();

        let phases = phases.lock().unwrap();
        assert_eq!(phases.first().unwrap().0, "Reading document");
        assert_eq!(phases.last().unwrap(), &("Complete".to_string(), 100.0));
    }
}
