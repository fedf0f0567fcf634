use crate::player::Pose;
use crate::project::{
    distance_shade, side_shade, texture_column, wrap_texel, Band, FloorCaster, SpriteProjection,
    WallStrip,
};
use crate::ray::{cast_column, RayHit};
use crate::world::World;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const SKY: Self = Self::rgb(135, 206, 235);
    pub const FLOOR: Self = Self::rgb(64, 64, 64);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn gray(v: u8) -> Self {
        Self::rgb(v, v, v)
    }

    pub fn scaled(self, factor: f32) -> Self {
        let f = |c: u8| (c as f32 * factor.clamp(0., 1.)) as u8;
        Self::rgb(f(self.r), f(self.g), f(self.b))
    }
}

/// Handle to a texture owned by the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureId(pub usize);

/// A texture handle with the size it had when it was loaded. That size is the one the renderer
/// samples with.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TextureRef {
    pub id: TextureId,
    pub width: u32,
    pub height: u32,
}

/// Drawing primitives the platform provides. Rows are inclusive on both ends.
pub trait Renderer {
    fn load_texture(&mut self, path: &Path) -> anyhow::Result<TextureId>;

    fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)>;

    fn clear(&mut self, color: Color) -> anyhow::Result<()>;

    fn draw_vertical_line(
        &mut self,
        column: u32,
        y_start: i32,
        y_end: i32,
        color: Color,
    ) -> anyhow::Result<()>;

    /// Stretch texture column `tex_x`, rows `v.0..v.1` (as fractions of the texture height),
    /// over the screen rows. `shade` multiplies the texel colour.
    #[allow(clippy::too_many_arguments)]
    fn draw_textured_column(
        &mut self,
        column: u32,
        y_start: i32,
        y_end: i32,
        texture: TextureId,
        tex_x: u32,
        v: (f32, f32),
        shade: f32,
    ) -> anyhow::Result<()>;

    fn draw_pixel(&mut self, x: u32, y: u32, color: Color) -> anyhow::Result<()>;

    fn draw_textured_pixel(
        &mut self,
        x: u32,
        y: u32,
        texture: TextureId,
        tex_x: u32,
        tex_y: u32,
    ) -> anyhow::Result<()>;

    fn present(&mut self) -> anyhow::Result<()>;
}

/// Raycast and draw one full frame: ceiling and floor bands, walls, then enemies.
pub fn draw_frame(world: &World, renderer: &mut impl Renderer) -> anyhow::Result<()> {
    let (width, height) = world.screen_size();
    let fov = world.config.fov();
    let pose = world.player.pose;

    renderer.clear(Color::SKY)?;

    let floor_caster = FloorCaster {
        eye_height: world.config.eye_height,
        screen_height: height,
    };
    let floor_rows = floor_caster.row_table(Band::Floor);
    let ceiling_rows = floor_caster.row_table(Band::Ceiling);

    // corrected wall distance per column, for sprite occlusion
    let mut depth = Vec::with_capacity(width as usize);

    for column in 0..width {
        let hit = cast_column(&world.caster, &world.map, &pose, column, width, fov);
        depth.push(hit.distance);

        let Some(strip) = WallStrip::project(hit.distance, height) else {
            log::trace!("column {column}: degenerate wall distance {}", hit.distance);
            continue;
        };

        draw_floor(world, renderer, &pose, &hit, &strip, column, &floor_rows)?;
        draw_ceiling(world, renderer, &pose, &hit, &strip, column, &ceiling_rows)?;
        draw_wall(world, renderer, &hit, &strip, column)?;
    }

    draw_enemies(world, renderer, &depth)
}

fn draw_wall(
    world: &World,
    renderer: &mut impl Renderer,
    hit: &RayHit,
    strip: &WallStrip,
    column: u32,
) -> anyhow::Result<()> {
    match hit.texture.and_then(|idx| world.wall_texture(idx)) {
        Some(tex) => renderer.draw_textured_column(
            column,
            strip.draw_start,
            strip.draw_end,
            tex.id,
            texture_column(hit, tex.width),
            (strip.v_start, strip.v_end),
            side_shade(hit.side),
        ),
        // no texture for this tile (or the ray left the map): flat shaded strip
        None => renderer.draw_vertical_line(
            column,
            strip.draw_start,
            strip.draw_end,
            Color::gray(distance_shade(hit.raw_distance)),
        ),
    }
}

fn draw_floor(
    world: &World,
    renderer: &mut impl Renderer,
    pose: &Pose,
    hit: &RayHit,
    strip: &WallStrip,
    column: u32,
    rows: &[Option<f32>],
) -> anyhow::Result<()> {
    let height = rows.len() as i32;
    let first = strip.draw_end + 1;
    if first >= height {
        return Ok(());
    }

    let texture = world.floor_texture;
    for y in first..height {
        let Some(distance) = rows.get(y as usize).copied().flatten() else {
            continue;
        };
        let Some(tex) = texture else {
            let shade = distance_shade(distance) as f32 / 255.;
            renderer.draw_pixel(column, y as u32, Color::FLOOR.scaled(shade))?;
            continue;
        };
        let Some(point) = FloorCaster::world_point(pose, hit, distance) else {
            continue;
        };
        renderer.draw_textured_pixel(
            column,
            y as u32,
            tex.id,
            wrap_texel(point.x, tex.width),
            wrap_texel(point.y, tex.height),
        )?;
    }
    Ok(())
}

fn draw_ceiling(
    world: &World,
    renderer: &mut impl Renderer,
    pose: &Pose,
    hit: &RayHit,
    strip: &WallStrip,
    column: u32,
    rows: &[Option<f32>],
) -> anyhow::Result<()> {
    // untextured ceilings are just the clear colour
    let Some(tex) = world.ceiling_texture else {
        return Ok(());
    };

    for y in 0..strip.draw_start.max(0) {
        let Some(distance) = rows.get(y as usize).copied().flatten() else {
            continue;
        };
        let Some(point) = FloorCaster::world_point(pose, hit, distance) else {
            continue;
        };
        renderer.draw_textured_pixel(
            column,
            y as u32,
            tex.id,
            wrap_texel(point.x, tex.width),
            wrap_texel(point.y, tex.height),
        )?;
    }
    Ok(())
}

fn draw_enemies(world: &World, renderer: &mut impl Renderer, depth: &[f32]) -> anyhow::Result<()> {
    let (width, height) = world.screen_size();
    let pose = world.player.pose;
    let fov = world.config.fov();

    let mut visible = world
        .enemies
        .iter()
        .filter_map(|enemy| {
            let proj = SpriteProjection::project(
                &pose,
                fov,
                width,
                height,
                enemy.position(),
                enemy.size,
            )?;
            let tex = world.enemy_sprite(enemy.current_frame(), enemy.direction_sector())?;
            Some((proj, tex))
        })
        .collect::<Vec<_>>();

    // far to near so closer sprites overdraw
    visible.sort_by(|a, b| b.0.depth.total_cmp(&a.0.depth));

    for (proj, tex) in visible {
        let top = proj.top.max(0.).ceil() as i32;
        let bottom = ((proj.top + proj.size) as i32).min(height as i32 - 1);
        if bottom < top {
            continue;
        }
        let v = (
            (top as f32 - proj.top) / proj.size,
            (bottom as f32 - proj.top) / proj.size,
        );

        for column in proj.columns(width) {
            if depth
                .get(column as usize)
                .is_some_and(|&wall| wall <= proj.depth)
            {
                continue;
            }
            renderer.draw_textured_column(
                column as u32,
                top,
                bottom,
                tex.id,
                proj.texture_column(column, tex.width),
                v,
                1.,
            )?;
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::config::Config;
    use crate::enemy::{Enemy, SpriteManifest};
    use crate::map::GridMap;
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Call {
        Clear,
        Line { column: u32, color: Color },
        Column { column: u32, texture: TextureId, tex_x: u32 },
        Pixel,
        TexturedPixel { x: u32, y: u32, texture: TextureId },
        Present,
    }

    /// Records every draw call. Textures load from a fixed table of paths.
    #[derive(Default)]
    pub(crate) struct Recorder {
        pub calls: Vec<Call>,
        pub sizes: HashMap<PathBuf, (u32, u32)>,
        pub loaded: Vec<(u32, u32)>,
    }

    impl Recorder {
        pub fn with_textures(textures: &[(&str, u32, u32)]) -> Self {
            Self {
                sizes: textures
                    .iter()
                    .map(|&(path, w, h)| (PathBuf::from(path), (w, h)))
                    .collect(),
                ..Self::default()
            }
        }

        pub fn columns(&self) -> impl Iterator<Item = (u32, TextureId, u32)> + '_ {
            self.calls.iter().filter_map(|call| match *call {
                Call::Column {
                    column,
                    texture,
                    tex_x,
                } => Some((column, texture, tex_x)),
                _ => None,
            })
        }
    }

    impl Renderer for Recorder {
        fn load_texture(&mut self, path: &Path) -> anyhow::Result<TextureId> {
            let Some(&size) = self.sizes.get(path) else {
                anyhow::bail!("no such texture: {}", path.display());
            };
            self.loaded.push(size);
            Ok(TextureId(self.loaded.len() - 1))
        }

        fn texture_size(&self, texture: TextureId) -> Option<(u32, u32)> {
            self.loaded.get(texture.0).copied()
        }

        fn clear(&mut self, _color: Color) -> anyhow::Result<()> {
            self.calls.push(Call::Clear);
            Ok(())
        }

        fn draw_vertical_line(
            &mut self,
            column: u32,
            y_start: i32,
            y_end: i32,
            color: Color,
        ) -> anyhow::Result<()> {
            assert!(y_start <= y_end, "empty line {y_start}..{y_end}");
            self.calls.push(Call::Line { column, color });
            Ok(())
        }

        fn draw_textured_column(
            &mut self,
            column: u32,
            y_start: i32,
            y_end: i32,
            texture: TextureId,
            tex_x: u32,
            v: (f32, f32),
            _shade: f32,
        ) -> anyhow::Result<()> {
            assert!(y_start <= y_end, "empty column {y_start}..{y_end}");
            assert!(v.0 >= 0. && v.1 <= 1.0001 && v.0 <= v.1, "bad v range {v:?}");
            self.calls.push(Call::Column {
                column,
                texture,
                tex_x,
            });
            Ok(())
        }

        fn draw_pixel(&mut self, _x: u32, _y: u32, _color: Color) -> anyhow::Result<()> {
            self.calls.push(Call::Pixel);
            Ok(())
        }

        fn draw_textured_pixel(
            &mut self,
            x: u32,
            y: u32,
            texture: TextureId,
            tex_x: u32,
            tex_y: u32,
        ) -> anyhow::Result<()> {
            let (w, h) = self.loaded[texture.0];
            assert!(tex_x < w && tex_y < h, "texel ({tex_x}, {tex_y}) out of {w}x{h}");
            self.calls.push(Call::TexturedPixel { x, y, texture });
            Ok(())
        }

        fn present(&mut self) -> anyhow::Result<()> {
            self.calls.push(Call::Present);
            Ok(())
        }
    }

    fn small_config() -> Config {
        Config {
            width: 32,
            height: 24,
            fov_degrees: 60.,
            ..Config::default()
        }
    }

    fn room() -> GridMap {
        GridMap::parse(
            "1111111\n\
             1000001\n\
             1000001\n\
             1000001\n\
             1111111",
        )
    }

    #[test]
    fn untextured_walls_fall_back_to_shaded_lines() {
        let mut world = World::new(small_config(), room());
        world.place_player_at(2.5, 2.5, 0.);
        let mut recorder = Recorder::default();
        draw_frame(&world, &mut recorder).unwrap();

        assert_eq!(recorder.calls.first(), Some(&Call::Clear));
        let wall_lines = recorder
            .calls
            .iter()
            .filter(|c| matches!(c, Call::Line { .. }))
            .count();
        assert_eq!(wall_lines, 32);
        assert!(recorder.calls.contains(&Call::Pixel));
        assert_eq!(recorder.columns().count(), 0);
    }

    #[test]
    fn textured_walls_use_tile_texture() {
        let mut recorder = Recorder::with_textures(&[("brick.png", 64, 64)]);
        let mut world = World::new(small_config(), room());
        world.place_player_at(2.5, 2.5, 0.);
        world.add_wall_texture(&mut recorder, Path::new("brick.png"));
        draw_frame(&world, &mut recorder).unwrap();

        let columns = recorder.columns().collect::<Vec<_>>();
        assert_eq!(columns.len(), 32);
        assert!(columns.iter().all(|&(_, tex, x)| tex == TextureId(0) && x < 64));
        assert!(columns.iter().enumerate().all(|(i, c)| c.0 == i as u32));
    }

    #[test]
    fn missing_texture_slot_degrades() {
        let mut recorder = Recorder::default();
        let mut world = World::new(small_config(), room());
        world.add_wall_texture(&mut recorder, Path::new("missing.png"));
        assert_eq!(world.wall_texture(0), None);
        draw_frame(&world, &mut recorder).unwrap();
        assert_eq!(recorder.columns().count(), 0);
    }

    #[test]
    fn textured_floor_and_ceiling_fill_bands() {
        let mut recorder =
            Recorder::with_textures(&[("floor.png", 16, 16), ("ceiling.png", 8, 8)]);
        let mut world = World::new(small_config(), room());
        world.place_player_at(3.5, 2.5, 0.);
        world.set_floor_texture(&mut recorder, Path::new("floor.png"));
        world.set_ceiling_texture(&mut recorder, Path::new("ceiling.png"));
        draw_frame(&world, &mut recorder).unwrap();

        let floor = recorder
            .calls
            .iter()
            .filter(|c| matches!(c, Call::TexturedPixel { texture: TextureId(0), y, .. } if *y > 12))
            .count();
        let ceiling = recorder
            .calls
            .iter()
            .filter(|c| matches!(c, Call::TexturedPixel { texture: TextureId(1), y, .. } if *y < 12))
            .count();
        assert!(floor > 0);
        assert!(ceiling > 0);
        // the horizon row is never sampled
        assert!(!recorder
            .calls
            .iter()
            .any(|c| matches!(c, Call::TexturedPixel { y: 12, .. })));
    }

    #[test]
    fn enemy_sprite_is_drawn_and_occluded() {
        let mut recorder = Recorder::with_textures(&[("guard.png", 32, 32)]);
        let mut world = World::new(small_config(), room());
        world.place_player_at(1.5, 2.5, 0.);
        world.enemies.push(Enemy::new(4.5, 2.5, std::f32::consts::PI));
        let manifest = SpriteManifest::parse("0 0 guard.png").unwrap();
        world.add_enemy_sprites(&mut recorder, &manifest);
        world.update(0.);

        draw_frame(&world, &mut recorder).unwrap();
        assert!(recorder.columns().count() > 0);

        // put a wall between player and enemy
        let blocked = GridMap::parse(
            "1111111\n\
             1000001\n\
             1010001\n\
             1000001\n\
             1111111",
        );
        world.map = blocked;
        world.place_player_at(1.5, 2.5, 0.);
        let mut recorder2 = Recorder::with_textures(&[("guard.png", 32, 32)]);
        recorder2.loaded = recorder.loaded.clone();
        draw_frame(&world, &mut recorder2).unwrap();
        let near_center = recorder2
            .columns()
            .filter(|&(column, _, _)| (14..18).contains(&column))
            .count();
        assert_eq!(near_center, 0);
    }
}
