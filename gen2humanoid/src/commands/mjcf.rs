//! MJCF robot description inspection

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use g2h_mjcf::{KinematicModel, VisualGeometry, load_robot};

use crate::config::Config;
use crate::utils::{
    NodeType, TreeNode, TreeOptions, format_vec3, render_tree, report_row, report_table,
};

#[derive(Subcommand)]
pub enum MjcfCommands {
    /// Display the body table of a robot
    Info {
        /// Registered robot name or path to an MJCF file
        robot: String,

        /// Include mesh details per body
        #[arg(short, long)]
        detailed: bool,
    },

    /// Display the body hierarchy as a tree
    Tree {
        /// Registered robot name or path to an MJCF file
        robot: String,

        /// Maximum depth to display
        #[arg(short, long)]
        depth: Option<usize>,

        /// Show mesh nodes and their files
        #[arg(short, long)]
        meshes: bool,

        /// Show only one line per node
        #[arg(long)]
        compact: bool,

        /// Disable colors
        #[arg(long)]
        no_color: bool,
    },
}

pub fn execute(config: &Config, cmd: MjcfCommands) -> Result<()> {
    match cmd {
        MjcfCommands::Info { robot, detailed } => {
            let xml = config.resolve_robot(&robot)?;
            handle_info(&xml, detailed)
        }
        MjcfCommands::Tree {
            robot,
            depth,
            meshes,
            compact,
            no_color,
        } => {
            let xml = config.resolve_robot(&robot)?;
            let options = TreeOptions {
                max_depth: depth,
                show_external_refs: meshes,
                no_color,
                show_metadata: true,
                compact,
            };
            handle_tree(&xml, meshes, &options)
        }
    }
}

fn load(xml: &Path) -> Result<(KinematicModel, VisualGeometry)> {
    load_robot(xml).with_context(|| format!("Failed to load robot description {}", xml.display()))
}

fn handle_info(xml: &Path, detailed: bool) -> Result<()> {
    let (model, geometry) = load(xml)?;

    println!("Robot: {}", xml.display());
    println!("Bodies: {}", model.len());
    println!("Degrees of freedom: {}", model.num_dof());
    println!("Meshes: {}", geometry.mesh_count());
    println!();

    let mut table = report_table(&["Index", "Body", "Parent", "DOF", "Axis", "Offset", "Meshes"]);
    for (index, body) in model.bodies().iter().enumerate() {
        let parent = body
            .parent_index()
            .and_then(|p| model.body(p))
            .map_or_else(|| "-".to_string(), |p| p.name.clone());
        let axis = body.joint_axis.map_or_else(|| "-".to_string(), format_vec3);
        let meshes = geometry
            .get_by_index(index)
            .map_or(0, |entry| entry.meshes.len());

        report_row(
            &mut table,
            [
                index.to_string(),
                body.name.clone(),
                parent,
                body.dof().to_string(),
                axis,
                format_vec3(body.local_offset),
                meshes.to_string(),
            ],
        );
    }
    table.printstd();

    if detailed {
        println!("\nJoint order: {}", model.joint_body_names().join(", "));
        for entry in &geometry {
            for (i, mesh) in entry.meshes.iter().enumerate() {
                let source = mesh
                    .source
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |p| p.display().to_string());
                println!(
                    "  {}/geom_{}: {} vertices, {} faces, rgba {:?}, {}",
                    entry.name,
                    i,
                    mesh.vertex_count(),
                    mesh.face_count(),
                    mesh.color,
                    source
                );
            }
        }
    }
    Ok(())
}

/// Build the body hierarchy; bodies come in pre-order so children follow parents
fn build_tree(
    name: &str,
    model: &KinematicModel,
    geometry: &VisualGeometry,
    meshes: bool,
) -> TreeNode {
    fn body_node(
        index: usize,
        model: &KinematicModel,
        geometry: &VisualGeometry,
        meshes: bool,
    ) -> TreeNode {
        let body = &model.bodies()[index];
        let mut node = match body.joint_axis {
            Some(axis) => TreeNode::new(body.name.clone(), NodeType::Joint)
                .with_metadata("axis", &format_vec3(axis)),
            None => TreeNode::new(body.name.clone(), NodeType::Fixed),
        };

        if meshes && let Some(entry) = geometry.get_by_index(index) {
            for (i, mesh) in entry.meshes.iter().enumerate() {
                let mut child = TreeNode::new(format!("geom_{i}"), NodeType::Mesh)
                    .with_metadata("faces", &mesh.face_count().to_string());
                if let Some(source) = &mesh.source {
                    if let Ok(meta) = fs::metadata(source) {
                        child = child.with_size(meta.len());
                    }
                    child = child.with_external_ref(&source.display().to_string(), Some(source.exists()));
                }
                node = node.add_child(child);
            }
        }

        for (child, _) in model
            .bodies()
            .iter()
            .enumerate()
            .filter(|(_, b)| b.parent_index() == Some(index))
        {
            node = node.add_child(body_node(child, model, geometry, meshes));
        }
        node
    }

    let mut root = TreeNode::new(name, NodeType::Robot)
        .with_metadata("bodies", &model.len().to_string())
        .with_metadata("dof", &model.num_dof().to_string());
    for (index, _) in model.bodies().iter().enumerate().filter(|(_, b)| b.is_root()) {
        root = root.add_child(body_node(index, model, geometry, meshes));
    }
    root
}

fn handle_tree(xml: &Path, meshes: bool, options: &TreeOptions) -> Result<()> {
    let (model, geometry) = load(xml)?;
    let name = xml
        .file_stem()
        .map_or_else(|| xml.display().to_string(), |s| s.to_string_lossy().into_owned());

    let tree = build_tree(&name, &model, &geometry, meshes);
    print!("{}", render_tree(&tree, options));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const XML: &str = r#"
<mujoco>
  <worldbody>
    <body name="pelvis">
      <body name="left_hip" pos="0 0.1 0"><joint axis="0 1 0"/></body>
      <body name="right_hip" pos="0 -0.1 0"><joint axis="0 1 0"/>
        <body name="right_knee" pos="0 0 -0.4"><joint axis="0 1 0"/></body>
      </body>
    </body>
  </worldbody>
</mujoco>
"#;

    #[test]
    fn test_tree_follows_parents() {
        let model = KinematicModel::parse(XML).unwrap();
        let tree = build_tree("legs", &model, &VisualGeometry::default(), false);

        assert_eq!(tree.children.len(), 1);
        let pelvis = &tree.children[0];
        assert_eq!(pelvis.name, "pelvis");
        assert_eq!(pelvis.node_type, NodeType::Fixed);
        let names: Vec<&str> = pelvis.children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["left_hip", "right_hip"]);
        assert_eq!(pelvis.children[1].children[0].name, "right_knee");
        assert_eq!(tree.metadata["dof"], "3");
    }
}
