use crate::config::Config;
use crate::enemy::{Enemy, SpriteManifest};
use crate::map::GridMap;
use crate::player::{InputSnapshot, Player, Pose};
use crate::ray::Caster;
use crate::render::{draw_frame, Renderer, TextureRef};
use glam::Vec2;
use std::collections::HashMap;
use std::path::Path;

/// Everything one frame reads and writes. The map is only read during a frame; the player and
/// each enemy own their own state.
pub struct World {
    pub config: Config,
    pub map: GridMap,
    pub player: Player,
    pub enemies: Vec<Enemy>,
    pub caster: Caster,
    /// indexed by `tile - 1`; a slot whose texture failed to load stays `None`
    wall_textures: Vec<Option<TextureRef>>,
    pub floor_texture: Option<TextureRef>,
    pub ceiling_texture: Option<TextureRef>,
    enemy_sprites: HashMap<(usize, u8), TextureRef>,
}

impl World {
    pub fn new(config: Config, map: GridMap) -> Self {
        let spawn = config.spawn;
        let player = Player::new(Pose::new(spawn.x, spawn.y, spawn.angle), &config);

        let enemies = config
            .enemies
            .iter()
            .map(|spawn| {
                let mut enemy = Enemy::new(spawn.x, spawn.y, spawn.angle);
                if let Some([x, y]) = spawn.walk_to {
                    enemy.walk_to(x, y);
                }
                enemy
            })
            .collect();

        Self {
            caster: config.caster.into(),
            config,
            map,
            player,
            enemies,
            wall_textures: vec![],
            floor_texture: None,
            ceiling_texture: None,
            enemy_sprites: HashMap::new(),
        }
    }

    /// Build from config, loading the map it names. A map that fails to load is logged and
    /// replaced with an empty one so the game still starts.
    pub fn from_config(config: Config) -> Self {
        let map = GridMap::load(&config.map).unwrap_or_else(|err| {
            log::error!("{err:#}");
            GridMap::empty()
        });
        log::info!("map is {}x{}", map.width(), map.height());
        Self::new(config, map)
    }

    pub fn screen_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn place_player_at(&mut self, x: f32, y: f32, angle: f32) {
        self.player.place_at(x, y, angle);
    }

    pub fn is_inside_wall(&self, x: f32, y: f32) -> bool {
        self.map.is_inside_wall(Vec2::new(x, y))
    }

    pub fn wall_texture(&self, idx: usize) -> Option<TextureRef> {
        self.wall_textures.get(idx).copied().flatten()
    }

    /// Sprite for an animation frame seen from a sector, falling back to the front view.
    pub fn enemy_sprite(&self, frame: usize, sector: u8) -> Option<TextureRef> {
        self.enemy_sprites
            .get(&(frame, sector))
            .or_else(|| self.enemy_sprites.get(&(frame, 0)))
            .copied()
    }

    fn load(renderer: &mut impl Renderer, path: &Path) -> Option<TextureRef> {
        let id = match renderer.load_texture(path) {
            Ok(id) => id,
            Err(err) => {
                log::error!("failed to load texture {}: {err:#}", path.display());
                return None;
            }
        };
        let Some((width, height)) = renderer.texture_size(id) else {
            log::error!("texture {} has no size", path.display());
            return None;
        };
        log::debug!("loaded {} ({width}x{height})", path.display());
        Some(TextureRef { id, width, height })
    }

    /// Append the texture for the next tile value. Failures keep their slot so later textures
    /// still line up with their tile values.
    pub fn add_wall_texture(&mut self, renderer: &mut impl Renderer, path: &Path) {
        let texture = Self::load(renderer, path);
        self.wall_textures.push(texture);
    }

    pub fn set_floor_texture(&mut self, renderer: &mut impl Renderer, path: &Path) {
        self.floor_texture = Self::load(renderer, path);
    }

    pub fn set_ceiling_texture(&mut self, renderer: &mut impl Renderer, path: &Path) {
        self.ceiling_texture = Self::load(renderer, path);
    }

    pub fn add_enemy_sprites(&mut self, renderer: &mut impl Renderer, manifest: &SpriteManifest) {
        for (&key, path) in &manifest.entries {
            if let Some(texture) = Self::load(renderer, path) {
                self.enemy_sprites.insert(key, texture);
            }
        }
    }

    /// Load every texture the config names.
    pub fn load_assets(&mut self, renderer: &mut impl Renderer) {
        for path in self.config.wall_textures.clone() {
            self.add_wall_texture(renderer, &path);
        }
        if let Some(path) = self.config.floor_texture.clone() {
            self.set_floor_texture(renderer, &path);
        }
        if let Some(path) = self.config.ceiling_texture.clone() {
            self.set_ceiling_texture(renderer, &path);
        }
        if let Some(path) = self.config.enemy_sprites.clone() {
            match SpriteManifest::load(&path) {
                Ok(manifest) => self.add_enemy_sprites(renderer, &manifest),
                Err(err) => log::error!("{err:#}"),
            }
        }
    }

    pub fn handle_input(&mut self, input: &InputSnapshot) {
        self.player.handle_input(input);
    }

    pub fn update(&mut self, dt: f32) {
        self.player.update(dt, &self.map);

        let viewer = self.player.pose.pos;
        for enemy in &mut self.enemies {
            enemy.process(dt);
            enemy.update_direction_wrt(viewer);
        }
    }

    /// One frame: input, simulation, draw, present.
    pub fn tick(
        &mut self,
        input: &InputSnapshot,
        dt: f32,
        renderer: &mut impl Renderer,
    ) -> anyhow::Result<()> {
        self.handle_input(input);
        self.update(dt);
        draw_frame(self, renderer)?;
        renderer.present()
    }
}
