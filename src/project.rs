use crate::enemy::normalize_angle;
use crate::player::Pose;
use crate::ray::{HitSide, RayHit};
use glam::Vec2;

/// Rows a wall occupies in one screen column. `v_start..v_end` is the slice of the texture
/// still visible after the strip was clipped to the screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct WallStrip {
    pub line_height: i32,
    pub draw_start: i32,
    pub draw_end: i32,
    pub v_start: f32,
    pub v_end: f32,
}

impl WallStrip {
    /// Project a fisheye-corrected distance. Height follows `screen_height / distance`, centered
    /// on the horizon and clamped to the screen. Returns `None` for a degenerate distance, and
    /// the caller skips the strip.
    pub fn project(distance: f32, screen_height: u32) -> Option<Self> {
        if !(distance > 0.) || !distance.is_finite() || screen_height == 0 {
            return None;
        }

        let h = screen_height as i32;
        // float to int casts saturate, so walls touching the camera stay finite
        let line_height = (screen_height as f32 / distance) as i32;
        let top = h / 2 - line_height / 2;
        let bottom = h / 2 + line_height / 2;
        let draw_start = top.max(0);
        let draw_end = bottom.min(h - 1);

        let (v_start, v_end) = if line_height > 0 {
            (
                (draw_start - top) as f32 / line_height as f32,
                (draw_end - top) as f32 / line_height as f32,
            )
        } else {
            (0., 1.)
        };

        Some(Self {
            line_height,
            draw_start,
            draw_end,
            v_start,
            v_end,
        })
    }
}

/// Texture column for a wall hit. Faces seen from the +x or -y side are mirrored so every
/// face reads the same way round no matter which side it is approached from.
pub fn texture_column(hit: &RayHit, texture_width: u32) -> u32 {
    if texture_width == 0 {
        return 0;
    }

    let w = texture_width as i32;
    let mut tex_x = (hit.wall_x * w as f32) as i32;
    let mirrored = match hit.side {
        HitSide::Vertical => hit.dir.x > 0.,
        HitSide::Horizontal => hit.dir.y < 0.,
    };
    if mirrored {
        tex_x = w - tex_x - 1;
    }
    tex_x.clamp(0, w - 1) as u32
}

/// Exponential falloff on raw ray distance, for untextured walls.
pub fn distance_shade(raw_distance: f32) -> u8 {
    (255. * (-raw_distance.max(0.) * 0.15).exp()) as u8
}

/// Brightness multiplier for textured walls. Horizontal-side faces are darkened to fake a
/// light coming from one direction.
pub fn side_shade(side: HitSide) -> f32 {
    match side {
        HitSide::Vertical => 1.,
        HitSide::Horizontal => 0.7,
    }
}

/// Wrap a world coordinate into a texel index so the texture tiles once per grid cell.
pub fn wrap_texel(coord: f32, size: u32) -> u32 {
    if size == 0 || !coord.is_finite() {
        return 0;
    }
    ((coord * size as f32).floor() as i64).rem_euclid(size as i64) as u32
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Band {
    Floor,
    Ceiling,
}

/// Inverse perspective for the floor and ceiling bands.
#[derive(Clone, Copy, Debug)]
pub struct FloorCaster {
    pub eye_height: f32,
    pub screen_height: u32,
}

impl FloorCaster {
    /// Perpendicular distance to the floor (or ceiling) point seen on a screen row. The row at
    /// the horizon, and rows on the wrong side of it for the band, have no answer.
    pub fn row_distance(&self, row: u32, band: Band) -> Option<f32> {
        if self.screen_height == 0 {
            return None;
        }
        let fraction = row as f32 / self.screen_height as f32;
        let (height, denom) = match band {
            Band::Floor => (self.eye_height, fraction - 0.5),
            Band::Ceiling => (1. - self.eye_height, 0.5 - fraction),
        };
        if denom <= f32::EPSILON {
            return None;
        }
        Some(height / denom)
    }

    /// Every row's distance for one band, computed once per frame.
    pub fn row_table(&self, band: Band) -> Vec<Option<f32>> {
        (0..self.screen_height)
            .map(|row| self.row_distance(row, band))
            .collect()
    }

    /// World position under a screen pixel. `row_distance` is perpendicular, so it is
    /// stretched along off-center rays to match the fisheye-corrected walls.
    pub fn world_point(pose: &Pose, hit: &RayHit, row_distance: f32) -> Option<Vec2> {
        let cos = (hit.angle - pose.angle).cos();
        if cos <= f32::EPSILON {
            return None;
        }
        Some(pose.pos + hit.dir * (row_distance / cos))
    }
}

/// Where a billboard lands on screen.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteProjection {
    pub center_x: f32,
    pub size: f32,
    /// perpendicular depth, comparable with corrected wall distances
    pub depth: f32,
    pub left: f32,
    pub top: f32,
}

impl SpriteProjection {
    pub fn project(
        pose: &Pose,
        fov: f32,
        screen_width: u32,
        screen_height: u32,
        at: Vec2,
        scale: f32,
    ) -> Option<Self> {
        let rel = at - pose.pos;
        let dist = rel.length();
        if dist < 0.1 {
            return None;
        }

        let diff = normalize_angle(rel.y.atan2(rel.x) - pose.angle);
        let depth = dist * diff.cos();
        if depth < 0.1 {
            return None;
        }

        let size = screen_height as f32 / depth * scale;
        let center_x = (diff / fov + 0.5) * screen_width as f32;
        let left = center_x - size / 2.;
        if left + size < 0. || left >= screen_width as f32 {
            return None;
        }

        Some(Self {
            center_x,
            size,
            depth,
            left,
            top: screen_height as f32 / 2. - size / 2.,
        })
    }

    /// Visible screen columns.
    pub fn columns(&self, screen_width: u32) -> std::ops::Range<i32> {
        let start = self.left.max(0.) as i32;
        let end = (self.left + self.size).min(screen_width as f32) as i32;
        start..end.max(start)
    }

    /// Texture column for a screen column inside the sprite.
    pub fn texture_column(&self, column: i32, texture_width: u32) -> u32 {
        let u = (column as f32 + 0.5 - self.left) / self.size;
        ((u * texture_width as f32) as i64).clamp(0, texture_width.saturating_sub(1) as i64) as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::IVec2;
    use std::f32::consts::FRAC_PI_2;

    fn hit(side: HitSide, dir: Vec2, wall_x: f32) -> RayHit {
        RayHit {
            angle: dir.to_angle(),
            dir,
            distance: 1.,
            raw_distance: 1.,
            side,
            wall_x,
            cell: IVec2::ZERO,
            texture: Some(0),
        }
    }

    #[test]
    fn strip_is_centered_and_shrinks_with_distance() {
        let near = WallStrip::project(1., 600).unwrap();
        assert_eq!(near.line_height, 600);
        assert_eq!(near.draw_start, 0);
        assert_eq!(near.draw_end, 599);

        let far = WallStrip::project(4., 600).unwrap();
        assert_eq!(far.line_height, 150);
        assert_eq!(far.draw_start, 225);
        assert_eq!(far.draw_end, 375);
        assert_eq!((far.v_start, far.v_end), (0., 1.));
    }

    #[test]
    fn clipped_strip_keeps_middle_of_texture() {
        let strip = WallStrip::project(0.5, 600).unwrap();
        assert_eq!(strip.line_height, 1200);
        assert_eq!(strip.draw_start, 0);
        assert_eq!(strip.draw_end, 599);
        assert!((strip.v_start - 0.25).abs() < 1e-6);
        assert!((strip.v_end - 599. / 1200. - 0.25).abs() < 1e-6);
    }

    #[test]
    fn degenerate_distances_are_skipped() {
        assert!(WallStrip::project(0., 600).is_none());
        assert!(WallStrip::project(-1., 600).is_none());
        assert!(WallStrip::project(f32::NAN, 600).is_none());
        assert!(WallStrip::project(f32::INFINITY, 600).is_none());
        let tiny = WallStrip::project(1e-30, 600).unwrap();
        assert_eq!((tiny.draw_start, tiny.draw_end), (0, 599));
    }

    #[test]
    fn texture_column_mirrors_by_approach() {
        assert_eq!(texture_column(&hit(HitSide::Vertical, -Vec2::X, 0.25), 64), 16);
        assert_eq!(texture_column(&hit(HitSide::Vertical, Vec2::X, 0.25), 64), 47);
        assert_eq!(texture_column(&hit(HitSide::Horizontal, Vec2::Y, 0.25), 64), 16);
        assert_eq!(texture_column(&hit(HitSide::Horizontal, -Vec2::Y, 0.25), 64), 47);
        assert_eq!(texture_column(&hit(HitSide::Vertical, -Vec2::X, 0.9999), 64), 63);
        assert_eq!(texture_column(&hit(HitSide::Vertical, -Vec2::X, 0.5), 0), 0);
    }

    #[test]
    fn shading() {
        assert_eq!(distance_shade(0.), 255);
        assert!(distance_shade(2.) > distance_shade(6.));
        assert!(side_shade(HitSide::Horizontal) < side_shade(HitSide::Vertical));
    }

    #[test]
    fn texels_wrap() {
        assert_eq!(wrap_texel(0.5, 64), 32);
        assert_eq!(wrap_texel(3.5, 64), 32);
        assert_eq!(wrap_texel(-0.25, 64), 48);
        assert_eq!(wrap_texel(1.0, 0), 0);
        assert_eq!(wrap_texel(f32::NAN, 64), 0);
    }

    #[test]
    fn horizon_row_has_no_distance() {
        let caster = FloorCaster {
            eye_height: 0.5,
            screen_height: 600,
        };
        assert_eq!(caster.row_distance(300, Band::Floor), None);
        assert_eq!(caster.row_distance(300, Band::Ceiling), None);
        assert_eq!(caster.row_distance(100, Band::Floor), None);
        assert_eq!(caster.row_distance(500, Band::Ceiling), None);
    }

    #[test]
    fn floor_meets_wall_bottom() {
        // a wall 4 cells away ends at row 375; the floor there is also 4 cells away
        let caster = FloorCaster {
            eye_height: 0.5,
            screen_height: 600,
        };
        let strip = WallStrip::project(4., 600).unwrap();
        let d = caster.row_distance(strip.draw_end as u32, Band::Floor).unwrap();
        assert!((d - 4.).abs() < 1e-4);
        let d = caster.row_distance(strip.draw_start as u32, Band::Ceiling).unwrap();
        assert!((d - 4.).abs() < 1e-4);

        let table = caster.row_table(Band::Floor);
        assert_eq!(table.len(), 600);
        assert!(table[599].unwrap() < table[400].unwrap());
    }

    #[test]
    fn low_eye_sees_ceiling_further_than_floor() {
        let caster = FloorCaster {
            eye_height: 0.25,
            screen_height: 400,
        };
        // ceiling sits 0.75 above the eye, floor 0.25 below it
        let ceiling = caster.row_distance(100, Band::Ceiling).unwrap();
        let floor = caster.row_distance(300, Band::Floor).unwrap();
        assert!((ceiling - 3.).abs() < 1e-4);
        assert!((floor - 1.).abs() < 1e-4);
    }

    #[test]
    fn world_point_follows_ray() {
        let pose = Pose::new(2., 2., 0.);
        let straight = hit(HitSide::Vertical, Vec2::X, 0.);
        let p = FloorCaster::world_point(&pose, &straight, 3.).unwrap();
        assert!(p.abs_diff_eq(Vec2::new(5., 2.), 1e-5));

        let side = hit(HitSide::Vertical, Vec2::from_angle(FRAC_PI_2), 0.);
        assert_eq!(FloorCaster::world_point(&pose, &side, 3.), None);
    }

    #[test]
    fn sprite_straight_ahead_is_centered() {
        let pose = Pose::new(1., 1., 0.);
        let sprite = SpriteProjection::project(&pose, 1., 800, 600, Vec2::new(3., 1.), 1.).unwrap();
        assert!((sprite.center_x - 400.).abs() < 1e-3);
        assert!((sprite.depth - 2.).abs() < 1e-5);
        assert!((sprite.size - 300.).abs() < 1e-3);
        assert_eq!(sprite.columns(800), 250..550);
        assert_eq!(sprite.texture_column(250, 64), 0);
        assert_eq!(sprite.texture_column(549, 64), 63);
    }

    #[test]
    fn sprite_behind_is_culled() {
        let pose = Pose::new(1., 1., 0.);
        assert!(SpriteProjection::project(&pose, 1., 800, 600, Vec2::new(-3., 1.), 1.).is_none());
        assert!(SpriteProjection::project(&pose, 1., 800, 600, Vec2::new(1., 1.), 1.).is_none());
    }
}
