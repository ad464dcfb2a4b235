//! Project layout and robot registry
//!
//! Every path is stored relative to the project root unless absolute. Robot
//! description paths are relative to the retargeter's `assets` directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use log::debug;
use serde::{Deserialize, Serialize};

/// Default playback and conversion frame rate
pub const DEFAULT_FPS: f32 = 30.0;

/// Robots shipped with the retargeter, as (name, description path under `assets`)
const DEFAULT_ROBOTS: &[(&str, &str)] = &[
    ("unitree_g1", "unitree_g1/g1_mocap_29dof.xml"),
    ("unitree_g1_with_hands", "unitree_g1/g1_mocap_29dof_with_hands.xml"),
    ("unitree_h1", "unitree_h1/h1.xml"),
    ("unitree_h1_2", "unitree_h1_2/h1_2_handless.xml"),
    ("booster_t1", "booster_t1/T1_serial.xml"),
    ("booster_t1_29dof", "booster_t1_29dof/t1_mocap.xml"),
    ("stanford_toddy", "stanford_toddy/toddy_mocap.xml"),
    ("fourier_n1", "fourier_n1/n1_mocap.xml"),
    ("engineai_pm01", "engineai_pm01/pm_v2.xml"),
    ("kuavo_s45", "kuavo_s45/biped_s45_collision.xml"),
    ("hightorque_hi", "hightorque_hi/hi_25dof.xml"),
    ("galaxea_r1pro", "galaxea_r1pro/r1_pro.xml"),
    ("berkeley_humanoid_lite", "berkeley_humanoid_lite/bhl_scene.xml"),
    ("booster_k1", "booster_k1/K1_serial.xml"),
    ("pnd_adam_lite", "pnd_adam_lite/scene.xml"),
    ("tienkung", "tienkung/mjcf/tienkung.xml"),
    ("pal_talos", "pal_talos/talos.xml"),
    ("fourier_gr3", "fourier_gr3v2_1_1/mjcf/gr3v2_1_1_dummy_hand.xml"),
];

/// Effective configuration of one invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub project_root: PathBuf,
    /// Interpreter used for the generator and retargeter scripts
    pub python: String,
    /// Text-to-motion generator checkout
    pub generator_dir: PathBuf,
    /// Directory holding one sub-directory per generator model
    pub checkpoint_dir: PathBuf,
    /// Retargeter checkout
    pub retargeter_dir: PathBuf,
    pub body_models_dir: PathBuf,
    /// Sub-folder of the generator output that holds the clips
    pub prompt_folder: String,
    pub fps: f32,
    pub robots: BTreeMap<String, PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            project_root: PathBuf::from("."),
            python: "python".to_string(),
            generator_dir: PathBuf::from("third_party/HY-Motion-1.0"),
            checkpoint_dir: PathBuf::from("third_party/HY-Motion-1.0/ckpts/tencent"),
            retargeter_dir: PathBuf::from("third_party/GMR"),
            body_models_dir: PathBuf::from("third_party/GMR/assets/body_models/smplx"),
            prompt_folder: "prompts_subset".to_string(),
            fps: DEFAULT_FPS,
            robots: DEFAULT_ROBOTS
                .iter()
                .map(|(name, path)| ((*name).to_string(), PathBuf::from(path)))
                .collect(),
        }
    }
}

impl Config {
    /// Parse a YAML configuration; missing fields keep their defaults
    pub fn from_yaml(text: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&text)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    /// Override the project root when one is given
    pub fn with_project_root(mut self, root: Option<PathBuf>) -> Self {
        if let Some(root) = root {
            self.project_root = root;
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if !(self.fps.is_finite() && self.fps > 0.0) {
            bail!("fps must be positive, got {}", self.fps);
        }
        if self.prompt_folder.trim().is_empty() {
            bail!("prompt_folder must not be empty");
        }
        Ok(())
    }

    /// Resolve a configured path against the project root
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project_root.join(path)
        }
    }

    pub fn generator_dir(&self) -> PathBuf {
        self.resolve(&self.generator_dir)
    }

    pub fn checkpoint_dir(&self) -> PathBuf {
        self.resolve(&self.checkpoint_dir)
    }

    pub fn retargeter_dir(&self) -> PathBuf {
        self.resolve(&self.retargeter_dir)
    }

    pub fn body_models_dir(&self) -> PathBuf {
        self.resolve(&self.body_models_dir)
    }

    /// Description path of a registered robot
    pub fn robot_xml(&self, name: &str) -> Option<PathBuf> {
        let path = self.robots.get(name)?;
        Some(if path.is_absolute() {
            path.clone()
        } else {
            self.retargeter_dir().join("assets").join(path)
        })
    }

    /// Resolve a robot given by registered name or by description path
    pub fn resolve_robot(&self, robot: &str) -> Result<PathBuf> {
        if let Some(path) = self.robot_xml(robot) {
            return Ok(path);
        }
        let path = PathBuf::from(robot);
        if path.extension().is_some_and(|ext| ext.eq_ignore_ascii_case("xml")) {
            return Ok(path);
        }
        bail!(
            "Unknown robot '{}'. Registered robots: {}",
            robot,
            self.robots.keys().cloned().collect::<Vec<_>>().join(", ")
        )
    }
}
