//! Defaulted attribute sets for MJCF elements
//!
//! Every element kind the parser understands is read into one of the
//! structures below in a single pass. Absent attributes take the MuJoCo
//! defaults, malformed ones fail with [`MjcfError::MalformedTopology`].

use std::path::{Path, PathBuf};

use glam::{Quat, Vec3};
use roxmltree::Node;

use crate::coordinate::quat_from_wxyz;
use crate::error::{MjcfError, Result};

/// Default geom color used by MuJoCo when `rgba` is absent
pub const DEFAULT_GEOM_RGBA: [f32; 4] = [0.7, 0.7, 0.7, 1.0];

/// Parse a whitespace separated list of exactly `N` floats
///
/// Returns `default` when the attribute is absent. A list with the wrong
/// number of elements is rejected rather than truncated or padded.
pub fn parse_floats<const N: usize>(
    node: Node<'_, '_>,
    attribute: &str,
    default: [f32; N],
) -> Result<[f32; N]> {
    let Some(raw) = node.attribute(attribute) else {
        return Ok(default);
    };

    let malformed = |reason: String| MjcfError::MalformedTopology {
        element: node.tag_name().name().to_string(),
        attribute: attribute.to_string(),
        reason,
    };

    let mut values = [0.0f32; N];
    let mut count = 0usize;
    for token in raw.split_whitespace() {
        let value: f32 = token
            .parse()
            .map_err(|_| malformed(format!("invalid number '{token}'")))?;
        if count < N {
            values[count] = value;
        }
        count += 1;
    }

    if count != N {
        return Err(malformed(format!("expected {N} values, found {count}")));
    }

    Ok(values)
}

/// Position and orientation of a `<body>` relative to its parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyAttributes {
    pub pos: Vec3,
    pub quat: Quat,
}

impl Default for BodyAttributes {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            quat: Quat::IDENTITY,
        }
    }
}

impl BodyAttributes {
    pub fn from_node(node: Node<'_, '_>) -> Result<Self> {
        let defaults = Self::default();
        let pos = parse_floats(node, "pos", defaults.pos.to_array())?;
        let quat = parse_floats(node, "quat", [1.0, 0.0, 0.0, 0.0])?;
        Ok(Self {
            pos: Vec3::from_array(pos),
            quat: quat_from_wxyz(quat),
        })
    }
}

/// Rotation axis of a single `<joint>`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JointAttributes {
    pub axis: Vec3,
}

impl Default for JointAttributes {
    fn default() -> Self {
        Self { axis: Vec3::Z }
    }
}

impl JointAttributes {
    pub fn from_node(node: Node<'_, '_>) -> Result<Self> {
        let axis = parse_floats(node, "axis", Self::default().axis.to_array())?;
        Ok(Self {
            axis: Vec3::from_array(axis),
        })
    }
}

/// Visual attributes of a `<geom>`
#[derive(Debug, Clone, PartialEq)]
pub struct GeomAttributes {
    /// Shape type; MuJoCo defaults to `sphere`
    pub geom_type: String,
    /// Referenced mesh asset name, if any
    pub mesh: Option<String>,
    pub pos: Vec3,
    pub quat: Quat,
    pub rgba: [f32; 4],
}

impl Default for GeomAttributes {
    fn default() -> Self {
        Self {
            geom_type: "sphere".to_string(),
            mesh: None,
            pos: Vec3::ZERO,
            quat: Quat::IDENTITY,
            rgba: DEFAULT_GEOM_RGBA,
        }
    }
}

impl GeomAttributes {
    pub fn from_node(node: Node<'_, '_>) -> Result<Self> {
        let defaults = Self::default();
        let pos = parse_floats(node, "pos", defaults.pos.to_array())?;
        let quat = parse_floats(node, "quat", [1.0, 0.0, 0.0, 0.0])?;
        let rgba = parse_floats(node, "rgba", defaults.rgba)?;
        Ok(Self {
            geom_type: node
                .attribute("type")
                .map_or(defaults.geom_type, str::to_string),
            mesh: node.attribute("mesh").map(str::to_string),
            pos: Vec3::from_array(pos),
            quat: quat_from_wxyz(quat),
            rgba,
        })
    }

    /// Whether this geom is rendered from a mesh asset
    pub fn is_mesh(&self) -> bool {
        self.geom_type == "mesh"
    }
}

/// A `<mesh>` declared in the `<asset>` section
#[derive(Debug, Clone, PartialEq)]
pub struct MeshAssetAttributes {
    pub name: String,
    pub file: PathBuf,
    pub scale: Vec3,
}

impl MeshAssetAttributes {
    pub fn from_node(node: Node<'_, '_>) -> Result<Self> {
        let file = node
            .attribute("file")
            .map(PathBuf::from)
            .ok_or_else(|| MjcfError::MalformedTopology {
                element: "mesh".to_string(),
                attribute: "file".to_string(),
                reason: "attribute is required".to_string(),
            })?;

        // MuJoCo names unnamed mesh assets after the file stem
        let name = match node.attribute("name") {
            Some(name) => name.to_string(),
            None => file_stem(&file),
        };

        let scale = parse_floats(node, "scale", [1.0, 1.0, 1.0])?;

        Ok(Self {
            name,
            file,
            scale: Vec3::from_array(scale),
        })
    }
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use roxmltree::Document;
    use test_case::test_case;

    fn first_element<'a, 'input>(doc: &'a Document<'input>) -> Node<'a, 'input> {
        doc.root_element()
    }

    #[test]
    fn test_absent_attributes_use_defaults() {
        let doc = Document::parse("<body/>").unwrap();
        let attrs = BodyAttributes::from_node(first_element(&doc)).unwrap();
        assert_eq!(attrs, BodyAttributes::default());
    }

    #[test]
    fn test_body_quat_is_scalar_first() {
        let doc = Document::parse(r#"<body pos="1 2 3" quat="0 0 0 1"/>"#).unwrap();
        let attrs = BodyAttributes::from_node(first_element(&doc)).unwrap();
        assert_eq!(attrs.pos, Vec3::new(1.0, 2.0, 3.0));
        // w=0, z=1: half turn about z
        assert_eq!(attrs.quat, Quat::from_xyzw(0.0, 0.0, 1.0, 0.0));
    }

    #[test_case(r#"<body pos="1 2"/>"#, "pos" ; "too few values")]
    #[test_case(r#"<body pos="1 2 3 4"/>"#, "pos" ; "too many values")]
    #[test_case(r#"<body quat="1 0 0"/>"#, "quat" ; "short quaternion")]
    #[test_case(r#"<body pos="1 x 3"/>"#, "pos" ; "not a number")]
    fn test_malformed_lists_fail_fast(xml: &str, expected_attribute: &str) {
        let doc = Document::parse(xml).unwrap();
        let err = BodyAttributes::from_node(first_element(&doc)).unwrap_err();
        match err {
            MjcfError::MalformedTopology { attribute, .. } => {
                assert_eq!(attribute, expected_attribute);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_joint_axis_defaults_to_z() {
        let doc = Document::parse(r#"<joint name="hinge"/>"#).unwrap();
        let attrs = JointAttributes::from_node(first_element(&doc)).unwrap();
        assert_eq!(attrs.axis, Vec3::Z);
    }

    #[test]
    fn test_geom_defaults() {
        let doc = Document::parse("<geom/>").unwrap();
        let attrs = GeomAttributes::from_node(first_element(&doc)).unwrap();
        assert!(!attrs.is_mesh());
        assert_eq!(attrs.rgba, DEFAULT_GEOM_RGBA);
        assert_eq!(attrs.mesh, None);
    }

    #[test]
    fn test_mesh_asset_name_falls_back_to_file_stem() {
        let doc = Document::parse(r#"<mesh file="meshes/pelvis.STL" scale="1 1 -1"/>"#).unwrap();
        let attrs = MeshAssetAttributes::from_node(first_element(&doc)).unwrap();
        assert_eq!(attrs.name, "pelvis");
        assert_eq!(attrs.scale, Vec3::new(1.0, 1.0, -1.0));
    }

    #[test]
    fn test_mesh_asset_requires_file() {
        let doc = Document::parse(r#"<mesh name="pelvis"/>"#).unwrap();
        assert!(matches!(
            MeshAssetAttributes::from_node(first_element(&doc)),
            Err(MjcfError::MalformedTopology { .. })
        ));
    }
}
