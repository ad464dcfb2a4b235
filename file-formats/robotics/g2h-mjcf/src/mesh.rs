//! Triangle surface meshes referenced by MJCF `<mesh>` assets
//!
//! Robot packages ship their link meshes as STL (binary or ASCII) or as
//! Wavefront OBJ. Both are read into the same indexed triangle form.

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use log::debug;

use crate::error::{MjcfError, Result};

/// Supported mesh file formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeshFormat {
    Stl,
    Obj,
}

impl MeshFormat {
    /// Detect the format from a file extension (case-insensitive)
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "stl" => Some(Self::Stl),
            "obj" => Some(Self::Obj),
            _ => None,
        }
    }
}

/// An indexed triangle mesh with a uniform color
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde-support", derive(serde::Serialize))]
pub struct SurfaceMesh {
    pub vertices: Vec<Vec3>,
    pub faces: Vec<[u32; 3]>,
    /// One unit normal per face
    pub face_normals: Vec<Vec3>,
    /// 8-bit RGBA applied to every face
    pub color: [u8; 4],
    /// File the mesh was read from, if any
    pub source: Option<PathBuf>,
}

impl SurfaceMesh {
    /// Build a mesh from raw vertices and faces
    pub fn from_parts(vertices: Vec<Vec3>, faces: Vec<[u32; 3]>) -> Self {
        let mut mesh = Self {
            vertices,
            faces,
            face_normals: Vec::new(),
            color: [255, 255, 255, 255],
            source: None,
        };
        mesh.recompute_normals();
        mesh
    }

    /// Load a mesh file, choosing the reader by extension
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(MjcfError::AssetNotFound(path.to_path_buf()));
        }

        let mut mesh = match MeshFormat::from_path(path) {
            Some(MeshFormat::Stl) => load_stl(path)?,
            Some(MeshFormat::Obj) => load_obj(path)?,
            None => return Err(MjcfError::UnsupportedMeshFormat(path.to_path_buf())),
        };
        mesh.source = Some(path.to_path_buf());

        debug!(
            "Loaded mesh {}: {} vertices, {} faces",
            path.display(),
            mesh.vertex_count(),
            mesh.face_count()
        );
        Ok(mesh)
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Apply a per-axis scale to every vertex
    ///
    /// A mirroring scale (odd number of negative factors) flips the winding
    /// of every face so normals keep pointing outward.
    pub fn apply_scale(&mut self, scale: Vec3) {
        if scale == Vec3::ONE {
            return;
        }
        for v in &mut self.vertices {
            *v *= scale;
        }
        if scale.x * scale.y * scale.z < 0.0 {
            for face in &mut self.faces {
                face.swap(1, 2);
            }
        }
    }

    /// Recompute face normals from the current vertex positions
    ///
    /// Degenerate faces get a zero normal.
    pub fn recompute_normals(&mut self) {
        self.face_normals = self
            .faces
            .iter()
            .map(|face| {
                let [a, b, c] = face.map(|i| self.vertices.get(i as usize).copied());
                match (a, b, c) {
                    (Some(a), Some(b), Some(c)) => (b - a).cross(c - a).normalize_or_zero(),
                    _ => Vec3::ZERO,
                }
            })
            .collect();
    }

    /// Apply a rigid transform: rotate then translate every vertex
    pub fn apply_transform(&mut self, rotation: Quat, translation: Vec3) {
        for v in &mut self.vertices {
            *v = rotation * *v + translation;
        }
        for n in &mut self.face_normals {
            *n = rotation * *n;
        }
    }

    /// Set the uniform face color from MJCF `rgba` floats
    ///
    /// The mesh is always drawn fully opaque.
    pub fn set_color(&mut self, rgba: [f32; 4]) {
        let [r, g, b] = rgba_to_rgb8(rgba);
        self.color = [r, g, b, 255];
    }

    /// Axis-aligned bounds, `None` for an empty mesh
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }
}

/// Reduce a 0-1 float color to an 8-bit RGB triple
pub fn rgba_to_rgb8(rgba: [f32; 4]) -> [u8; 3] {
    // Truncates like an integer cast of `c * 255`
    let channel = |c: f32| (c * 255.0).clamp(0.0, 255.0) as u8;
    [channel(rgba[0]), channel(rgba[1]), channel(rgba[2])]
}

fn load_stl(path: &Path) -> Result<SurfaceMesh> {
    let bytes = fs::read(path)?;
    let mut cursor = Cursor::new(bytes);
    let reader = stl_io::create_stl_reader(&mut cursor).map_err(|e| MjcfError::MeshLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    for triangle in reader {
        let triangle = triangle.map_err(|e| MjcfError::MeshLoad {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let base = u32::try_from(vertices.len()).map_err(|_| MjcfError::MeshLoad {
            path: path.to_path_buf(),
            reason: "too many vertices".to_string(),
        })?;
        vertices.extend(triangle.vertices.iter().map(|v| Vec3::from_array(v.0)));
        faces.push([base, base + 1, base + 2]);
    }

    Ok(SurfaceMesh::from_parts(vertices, faces))
}

fn load_obj(path: &Path) -> Result<SurfaceMesh> {
    let bytes = fs::read(path)?;
    let (models, _materials) = tobj::load_obj_buf(
        &mut Cursor::new(bytes),
        &tobj::LoadOptions {
            single_index: true,
            triangulate: true,
            ..Default::default()
        },
        |_material_path| Err(tobj::LoadError::MaterialParseError),
    )
    .map_err(|e| MjcfError::MeshLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // Every object in the file becomes part of one mesh
    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    for model in &models {
        let mesh = &model.mesh;
        let base = u32::try_from(vertices.len()).map_err(|_| MjcfError::MeshLoad {
            path: path.to_path_buf(),
            reason: "too many vertices".to_string(),
        })?;
        vertices.extend(
            mesh.positions
                .chunks_exact(3)
                .map(|p| Vec3::new(p[0], p[1], p[2])),
        );
        faces.extend(
            mesh.indices
                .chunks_exact(3)
                .map(|t| [base + t[0], base + t[1], base + t[2]]),
        );
    }

    Ok(SurfaceMesh::from_parts(vertices, faces))
}
