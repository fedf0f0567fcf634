use crate::config::Config;
use crate::map::GridMap;
use glam::Vec2;
use std::collections::HashSet;
use std::f32::consts::FRAC_PI_2;

/// Position in grid-cell units plus a facing angle in radians. Angles grow clockwise on
/// screen (the map's y axis points down), so `Vec2::from_angle` gives the facing vector.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Pose {
    pub pos: Vec2,
    pub angle: f32,
}

impl Pose {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            angle,
        }
    }

    pub fn direction(&self) -> Vec2 {
        Vec2::from_angle(self.angle)
    }
}

/// Directional keys the player can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Action {
    Forward,
    Backward,
    StrafeLeft,
    StrafeRight,
    TurnLeft,
    TurnRight,
}

/// What the platform saw this frame.
#[derive(Clone, Debug, Default)]
pub struct InputSnapshot {
    pub pressed: HashSet<Action>,
    /// relative pointer motion since last frame, in pixels
    pub mouse_dx: i32,
}

impl InputSnapshot {
    pub fn with(actions: impl IntoIterator<Item = Action>) -> Self {
        Self {
            pressed: actions.into_iter().collect(),
            mouse_dx: 0,
        }
    }

    fn held(&self, action: Action) -> bool {
        self.pressed.contains(&action)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Player {
    pub pose: Pose,
    pub speed: f32,
    pub rotation_step: f32,
    pub mouse_sensitivity: f32,
    pub half_width: f32,
    move_dir: Vec2,
}

impl Player {
    pub fn new(pose: Pose, config: &Config) -> Self {
        Self {
            pose,
            speed: config.player_speed,
            rotation_step: config.rotation_step,
            mouse_sensitivity: config.mouse_sensitivity,
            half_width: config.half_width,
            move_dir: Vec2::ZERO,
        }
    }

    pub fn place_at(&mut self, x: f32, y: f32, angle: f32) {
        self.pose = Pose::new(x, y, angle);
        self.move_dir = Vec2::ZERO;
        self.log_position();
    }

    pub fn log_position(&self) {
        log::debug!(
            "player at ({:.3}, {:.3}) facing {:.3} rad",
            self.pose.pos.x,
            self.pose.pos.y,
            self.pose.angle
        );
    }

    /// Raw (unnormalized) movement accumulated by the last `handle_input`.
    pub fn move_intent(&self) -> Vec2 {
        self.move_dir
    }

    /// Rebuild the movement vector from held keys and turn immediately. The angle is never
    /// wrapped; everything downstream goes through `sin`/`cos`.
    pub fn handle_input(&mut self, input: &InputSnapshot) {
        let facing = self.pose.direction();
        let mut dir = Vec2::ZERO;

        if input.held(Action::Forward) {
            dir += facing;
        }
        if input.held(Action::Backward) {
            dir -= facing;
        }
        if input.held(Action::StrafeLeft) {
            dir += Vec2::from_angle(self.pose.angle - FRAC_PI_2);
        }
        if input.held(Action::StrafeRight) {
            dir += Vec2::from_angle(self.pose.angle + FRAC_PI_2);
        }
        self.move_dir = dir;

        if input.held(Action::TurnLeft) {
            self.pose.angle -= self.rotation_step;
        }
        if input.held(Action::TurnRight) {
            self.pose.angle += self.rotation_step;
        }
        self.pose.angle += input.mouse_dx as f32 * self.mouse_sensitivity;
    }

    /// Move along the normalized intent, resolving x and y separately so the player slides
    /// along walls instead of stopping dead.
    pub fn update(&mut self, dt: f32, map: &GridMap) {
        let dir = self.move_dir.normalize_or_zero();
        if dir == Vec2::ZERO {
            return;
        }

        let step = dir * self.speed * dt;
        let margin = self.half_width * 0.5;
        let pos = &mut self.pose.pos;

        if step.x != 0.0 {
            let new_x = pos.x + step.x;
            let probe = new_x + margin.copysign(step.x);
            if !map.is_wall(probe.floor() as i32, pos.y.floor() as i32) {
                pos.x = new_x;
            }
        }

        if step.y != 0.0 {
            let new_y = pos.y + step.y;
            let probe = new_y + margin.copysign(step.y);
            if !map.is_wall(pos.x.floor() as i32, probe.floor() as i32) {
                pos.y = new_y;
            }
        }
    }
}
