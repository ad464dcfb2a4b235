//! Visual geometry attached to MJCF bodies
//!
//! Only `type="mesh"` geoms are collected. Primitive shapes are skipped and
//! bodies that end up with no meshes are left out of the result entirely.
//!
//! Mesh files are resolved against the `meshdir` declared in `<compiler>`,
//! itself relative to the directory holding the MJCF file.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, info, warn};
use roxmltree::Document;

use crate::attributes::{GeomAttributes, MeshAssetAttributes};
use crate::document::{child_elements, first_child, preorder_bodies};
use crate::error::{MjcfError, Result};
use crate::mesh::SurfaceMesh;

/// Renderable meshes of one body, already in the body's local frame
#[derive(Debug, Clone, PartialEq)]
pub struct BodyGeometry {
    /// Index of the body in pre-order, matching [`crate::KinematicModel`]
    pub body_index: usize,
    pub name: String,
    pub meshes: Vec<SurfaceMesh>,
}

/// Per-body visual geometry of a robot, in body order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisualGeometry {
    entries: Vec<BodyGeometry>,
}

impl VisualGeometry {
    /// Load the visual geometry of an MJCF file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let geometry = Self::parse(&text, base_dir)?;
        info!(
            "Loaded visual geometry from {}: {} bodies, {} meshes",
            path.display(),
            geometry.len(),
            geometry.mesh_count()
        );
        Ok(geometry)
    }

    /// Load visual geometry from an in-memory document
    ///
    /// `base_dir` plays the role of the directory containing the file.
    pub fn parse(xml: &str, base_dir: &Path) -> Result<Self> {
        let doc = Document::parse(xml)?;
        Self::from_document(&doc, base_dir)
    }

    pub(crate) fn from_document(doc: &Document<'_>, base_dir: &Path) -> Result<Self> {
        let mesh_base = mesh_directory(doc, base_dir);
        let assets = mesh_assets(doc)?;
        let bodies = preorder_bodies(doc)?;

        // Check every reference before touching the filesystem
        let mut attachments = Vec::new();
        for visit in &bodies {
            let body_name = visit.name();
            let mut geoms = Vec::new();
            for node in child_elements(visit.node, "geom") {
                let geom = GeomAttributes::from_node(node)?;
                if !geom.is_mesh() {
                    debug!(
                        "Skipping {} geom on body '{}'",
                        geom.geom_type, body_name
                    );
                    continue;
                }
                let Some(mesh_name) = geom.mesh.as_deref() else {
                    warn!("Mesh geom without mesh attribute on body '{}'", body_name);
                    continue;
                };
                if !assets.contains_key(mesh_name) {
                    return Err(MjcfError::UnknownMeshReference {
                        mesh: mesh_name.to_string(),
                        body: body_name,
                    });
                }
                geoms.push(geom);
            }
            if !geoms.is_empty() {
                attachments.push((visit.index, body_name, geoms));
            }
        }

        let mut cache: HashMap<&str, SurfaceMesh> = HashMap::new();
        let mut entries = Vec::with_capacity(attachments.len());
        for (body_index, name, geoms) in attachments {
            let mut meshes = Vec::with_capacity(geoms.len());
            for geom in &geoms {
                let Some((mesh_name, asset)) = geom
                    .mesh
                    .as_deref()
                    .and_then(|m| assets.get_key_value(m))
                else {
                    continue;
                };

                let template = match cache.get(mesh_name.as_str()) {
                    Some(mesh) => mesh.clone(),
                    None => {
                        let mut mesh = SurfaceMesh::load(mesh_base.join(&asset.file))?;
                        mesh.apply_scale(asset.scale);
                        mesh.recompute_normals();
                        cache.insert(mesh_name.as_str(), mesh.clone());
                        mesh
                    }
                };

                let mut mesh = template;
                mesh.apply_transform(geom.quat, geom.pos);
                mesh.set_color(geom.rgba);
                meshes.push(mesh);
            }
            entries.push(BodyGeometry {
                body_index,
                name,
                meshes,
            });
        }

        Ok(Self { entries })
    }

    /// Meshes attached to the named body
    pub fn get(&self, name: &str) -> Option<&BodyGeometry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Meshes attached to the body with the given index
    pub fn get_by_index(&self, body_index: usize) -> Option<&BodyGeometry> {
        self.entries.iter().find(|e| e.body_index == body_index)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &BodyGeometry> {
        self.entries.iter()
    }

    /// Number of bodies with at least one mesh
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total number of meshes over all bodies
    pub fn mesh_count(&self) -> usize {
        self.entries.iter().map(|e| e.meshes.len()).sum()
    }
}

impl<'a> IntoIterator for &'a VisualGeometry {
    type Item = &'a BodyGeometry;
    type IntoIter = std::slice::Iter<'a, BodyGeometry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Directory mesh files are resolved against
pub fn mesh_directory(doc: &Document<'_>, base_dir: &Path) -> PathBuf {
    let meshdir = first_child(doc.root_element(), "compiler")
        .and_then(|c| c.attribute("meshdir"))
        .unwrap_or("");
    base_dir.join(meshdir)
}

/// Mesh assets declared under `<asset>`, keyed by name
pub fn mesh_assets(doc: &Document<'_>) -> Result<HashMap<String, MeshAssetAttributes>> {
    let mut assets = HashMap::new();
    for asset in child_elements(doc.root_element(), "asset") {
        for node in child_elements(asset, "mesh") {
            let mesh = MeshAssetAttributes::from_node(node)?;
            assets.insert(mesh.name.clone(), mesh);
        }
    }
    Ok(assets)
}
