use anyhow::Context;
use serde::Deserialize;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

/// Which ray strategy the renderer uses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CasterKind {
    #[default]
    Dda,
    Marching,
}

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Spawn {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub angle: f32,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct EnemySpawn {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub angle: f32,
    #[serde(default)]
    pub walk_to: Option<[f32; 2]>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub target_fps: u32,
    pub fov_degrees: f32,
    pub caster: CasterKind,

    pub player_speed: f32,
    /// radians per frame while a turn key is held
    pub rotation_step: f32,
    /// radians per pixel of relative pointer motion
    pub mouse_sensitivity: f32,
    pub eye_height: f32,
    pub half_width: f32,
    pub spawn: Spawn,

    pub map: PathBuf,
    pub wall_textures: Vec<PathBuf>,
    pub floor_texture: Option<PathBuf>,
    pub ceiling_texture: Option<PathBuf>,
    pub enemy_sprites: Option<PathBuf>,
    pub enemies: Vec<EnemySpawn>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            title: "wolfcast".into(),
            width: 800,
            height: 600,
            target_fps: 60,
            fov_degrees: 45.,
            caster: CasterKind::Dda,
            player_speed: 2.,
            rotation_step: 0.05,
            mouse_sensitivity: 0.002,
            eye_height: 0.5,
            half_width: 0.25,
            spawn: Spawn {
                x: 5.,
                y: 5.,
                angle: 0.,
            },
            map: "assets/testMap.txt".into(),
            wall_textures: vec![],
            floor_texture: None,
            ceiling_texture: None,
            enemy_sprites: None,
            enemies: vec![],
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        log::info!("loading config at {}", path.display());
        let src = read_to_string(path)
            .with_context(|| format!("failed to read config: {}", path.display()))?;
        Self::parse(&src).with_context(|| format!("invalid config: {}", path.display()))
    }

    pub fn parse(src: &str) -> anyhow::Result<Self> {
        let this: Self = toml::from_str(src)?;
        if this.width == 0 || this.height == 0 {
            anyhow::bail!("screen size must be non-zero, got {}x{}", this.width, this.height);
        }
        if !(this.fov_degrees > 0. && this.fov_degrees < 180.) {
            anyhow::bail!("fov must be between 0 and 180 degrees, got {}", this.fov_degrees);
        }
        if !(this.eye_height > 0. && this.eye_height < 1.) {
            anyhow::bail!("eye height must be between floor and ceiling, got {}", this.eye_height);
        }
        Ok(this)
    }

    pub fn fov(&self) -> f32 {
        self.fov_degrees.to_radians()
    }
}
