use crate::config::CasterKind;
use crate::map::GridMap;
use crate::player::Pose;
use glam::{IVec2, Vec2};

/// Which family of grid line the ray crossed last.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitSide {
    /// crossed an x = const line (a wall face running north-south)
    Vertical,
    /// crossed a y = const line
    Horizontal,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    pub angle: f32,
    pub dir: Vec2,
    /// fisheye-corrected distance, used for projection
    pub distance: f32,
    /// distance along the ray, used for shading
    pub raw_distance: f32,
    pub side: HitSide,
    /// where along the wall face the ray landed, in `[0, 1)`
    pub wall_x: f32,
    pub cell: IVec2,
    /// `None` when the ray left the grid instead of hitting a tile
    pub texture: Option<usize>,
}

/// Uncorrected result of marching one ray.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RawHit {
    pub distance: f32,
    pub side: HitSide,
    pub wall_x: f32,
    pub cell: IVec2,
    pub texture: Option<usize>,
}

/// One way of finding the first wall along a ray.
pub trait RayCaster {
    fn march(&self, map: &GridMap, origin: Vec2, dir: Vec2) -> RawHit;
}

fn texture_of(map: &GridMap, cell: IVec2) -> Option<usize> {
    map.tile(cell.x, cell.y)
        .filter(|&t| t > 0)
        .map(|t| t as usize - 1)
}

/// Cell-exact grid traversal. Terminates because out-of-bounds reads as a wall and every step
/// strictly grows one of the two side distances.
#[derive(Clone, Copy, Debug, Default)]
pub struct Dda;

impl RayCaster for Dda {
    fn march(&self, map: &GridMap, origin: Vec2, dir: Vec2) -> RawHit {
        let mut cell = origin.floor().as_ivec2();

        // length of ray between two consecutive x (resp. y) grid lines
        let delta = Vec2::new(
            if dir.x == 0. { f32::INFINITY } else { (1. / dir.x).abs() },
            if dir.y == 0. { f32::INFINITY } else { (1. / dir.y).abs() },
        );

        let (step_x, mut side_x) = if dir.x < 0. {
            (-1, (origin.x - cell.x as f32) * delta.x)
        } else {
            (1, (cell.x as f32 + 1. - origin.x) * delta.x)
        };
        let (step_y, mut side_y) = if dir.y < 0. {
            (-1, (origin.y - cell.y as f32) * delta.y)
        } else {
            (1, (cell.y as f32 + 1. - origin.y) * delta.y)
        };

        let side = loop {
            let side = if side_x < side_y {
                side_x += delta.x;
                cell.x += step_x;
                HitSide::Vertical
            } else {
                side_y += delta.y;
                cell.y += step_y;
                HitSide::Horizontal
            };

            if map.is_wall(cell.x, cell.y) {
                break side;
            }
        };

        // back off the last increment to land on the face that was hit
        let distance = match side {
            HitSide::Vertical => side_x - delta.x,
            HitSide::Horizontal => side_y - delta.y,
        };
        let hit = origin + dir * distance;
        let wall_x = match side {
            HitSide::Vertical => hit.y - hit.y.floor(),
            HitSide::Horizontal => hit.x - hit.x.floor(),
        };

        RawHit {
            distance,
            side,
            wall_x,
            cell,
            texture: texture_of(map, cell),
        }
    }
}

/// Fixed-step marching for untextured walls. Stops at `max_depth`, and leaving the grid is an
/// immediate hit at `max_depth`.
#[derive(Clone, Copy, Debug)]
pub struct Marching {
    pub step: f32,
    pub max_depth: f32,
}

impl Default for Marching {
    fn default() -> Self {
        Self {
            step: 0.05,
            max_depth: 20.,
        }
    }
}

impl RayCaster for Marching {
    fn march(&self, map: &GridMap, origin: Vec2, dir: Vec2) -> RawHit {
        let mut prev = origin.floor().as_ivec2();
        let mut distance = 0.;

        while distance < self.max_depth {
            distance += self.step;
            let point = origin + dir * distance;
            let cell = point.floor().as_ivec2();
            let side = if cell.x != prev.x {
                HitSide::Vertical
            } else {
                HitSide::Horizontal
            };

            match map.tile(cell.x, cell.y) {
                None => {
                    return RawHit {
                        distance: self.max_depth,
                        side,
                        wall_x: 0.,
                        cell,
                        texture: None,
                    };
                }
                Some(tile) if tile > 0 => {
                    let wall_x = match side {
                        HitSide::Vertical => point.y.fract(),
                        HitSide::Horizontal => point.x.fract(),
                    };
                    return RawHit {
                        distance,
                        side,
                        wall_x,
                        cell,
                        texture: Some(tile as usize - 1),
                    };
                }
                Some(_) => prev = cell,
            }
        }

        RawHit {
            distance: self.max_depth,
            side: HitSide::Horizontal,
            wall_x: 0.,
            cell: prev,
            texture: None,
        }
    }
}

/// Either strategy, picked from config.
#[derive(Clone, Copy, Debug)]
pub enum Caster {
    Dda(Dda),
    Marching(Marching),
}

impl From<CasterKind> for Caster {
    fn from(kind: CasterKind) -> Self {
        match kind {
            CasterKind::Dda => Self::Dda(Dda),
            CasterKind::Marching => Self::Marching(Marching::default()),
        }
    }
}

impl RayCaster for Caster {
    fn march(&self, map: &GridMap, origin: Vec2, dir: Vec2) -> RawHit {
        match self {
            Self::Dda(dda) => dda.march(map, origin, dir),
            Self::Marching(marching) => marching.march(map, origin, dir),
        }
    }
}

/// Angle of the ray for a screen column. Column 0 is the left edge of the view.
pub fn ray_angle(pose: &Pose, column: u32, screen_width: u32, fov: f32) -> f32 {
    pose.angle - fov / 2. + column as f32 * (fov / screen_width as f32)
}

/// Cast the ray for one screen column and remove the fisheye bulge.
pub fn cast_column(
    caster: &impl RayCaster,
    map: &GridMap,
    pose: &Pose,
    column: u32,
    screen_width: u32,
    fov: f32,
) -> RayHit {
    let angle = ray_angle(pose, column, screen_width, fov);
    let dir = Vec2::from_angle(angle);
    let raw = caster.march(map, pose.pos, dir);

    RayHit {
        angle,
        dir,
        distance: raw.distance * (angle - pose.angle).cos(),
        raw_distance: raw.distance,
        side: raw.side,
        wall_x: raw.wall_x,
        cell: raw.cell,
        texture: raw.texture,
    }
}
