use crate::player::Pose;
use anyhow::Context;
use glam::Vec2;
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_4, FRAC_PI_8, PI, TAU};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Number of directional sprite sets per animation frame.
pub const SECTORS: u8 = 8;

/// Wrap an angle into `(-PI, PI]`.
pub fn normalize_angle(a: f32) -> f32 {
    let wrapped = (a + PI).rem_euclid(TAU) - PI;
    if wrapped <= -PI {
        wrapped + TAU
    } else {
        wrapped
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EnemyState {
    Idle,
    Walk,
}

impl FromStr for EnemyState {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "idle" | "enemy_idle" => Ok(Self::Idle),
            "walk" | "enemy_walk" => Ok(Self::Walk),
            other => anyhow::bail!("unrecognized enemy state: {other}"),
        }
    }
}

/// Sprite frame indices played, in order and looping, for each state.
pub type Animations = HashMap<EnemyState, Vec<usize>>;

pub fn default_animations() -> Animations {
    HashMap::from([
        (EnemyState::Idle, vec![0]),
        (EnemyState::Walk, vec![1, 2, 3, 4]),
    ])
}

#[derive(Clone, Debug, PartialEq)]
pub struct Enemy {
    pose: Pose,
    state: EnemyState,
    destination: Option<Vec2>,
    animations: Animations,
    pub size: f32,
    pub speed: f32,
    pub frame_duration: f32,
    elapsed: f32,
    frame_index: usize,
    current_frame: usize,
    direction: u8,
}

impl Enemy {
    pub fn new(x: f32, y: f32, angle: f32) -> Self {
        Self {
            pose: Pose::new(x, y, angle),
            state: EnemyState::Idle,
            destination: None,
            animations: default_animations(),
            size: 1.,
            speed: 1.,
            frame_duration: 0.25,
            elapsed: 0.,
            frame_index: 0,
            current_frame: 0,
            direction: 0,
        }
    }

    pub fn with_animations(mut self, animations: Animations) -> Self {
        self.animations = animations;
        self.current_frame = self.frames().first().copied().unwrap_or(0);
        self
    }

    pub fn add_frame(&mut self, state: EnemyState, frame: usize) {
        self.animations.entry(state).or_default().push(frame);
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn position(&self) -> Vec2 {
        self.pose.pos
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn destination(&self) -> Option<Vec2> {
        self.destination
    }

    pub fn current_frame(&self) -> usize {
        self.current_frame
    }

    pub fn direction_sector(&self) -> u8 {
        self.direction
    }

    fn frames(&self) -> &[usize] {
        self.animations
            .get(&self.state)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn set_state(&mut self, state: EnemyState) {
        if self.state != state {
            log::debug!("enemy at {:?}: {:?} -> {:?}", self.pose.pos, self.state, state);
        }
        self.state = state;
        self.elapsed = 0.;
        self.frame_index = 0;
        self.current_frame = self.frames().first().copied().unwrap_or(0);
    }

    /// Start walking toward `(x, y)`, turning to face it.
    pub fn walk_to(&mut self, x: f32, y: f32) {
        let target = Vec2::new(x, y);
        let delta = target - self.pose.pos;
        if delta != Vec2::ZERO {
            self.pose.angle = delta.y.atan2(delta.x);
        }
        self.destination = Some(target);
        self.set_state(EnemyState::Walk);
    }

    pub fn next_frame(&mut self) {
        let frames = self.frames();
        if frames.is_empty() {
            return;
        }
        let index = (self.frame_index + 1) % frames.len();
        let frame = frames[index];
        self.frame_index = index;
        self.current_frame = frame;
    }

    /// Advance animation and movement by one tick.
    pub fn process(&mut self, dt: f32) {
        match self.state {
            EnemyState::Idle => {
                self.elapsed = 0.;
                self.frame_index = 0;
                self.current_frame = self.frames().first().copied().unwrap_or(0);
            }
            EnemyState::Walk => {
                self.elapsed += dt;
                // keep leftover time so slow ticks skip frames instead of losing them
                while self.frame_duration > 0. && self.elapsed > self.frame_duration {
                    self.next_frame();
                    self.elapsed -= self.frame_duration;
                }
            }
        }

        let Some(destination) = self.destination else {
            return;
        };
        let step = self.speed * dt;
        let to = destination - self.pose.pos;
        if to.length_squared() <= step * step {
            self.pose.pos = destination;
            self.destination = None;
            self.set_state(EnemyState::Idle);
        } else {
            // re-aim every tick so rounding can't carry the enemy past its destination
            self.pose.pos += to.normalize_or_zero() * step;
        }
    }

    /// Pick which of the eight directional sprites faces a viewer at `viewer`. Sector 0 means
    /// the viewer is straight ahead of the enemy, sector 4 straight behind, and the index
    /// grows as the viewer moves around the enemy with increasing angle.
    pub fn update_direction_wrt(&mut self, viewer: Vec2) {
        let delta = viewer - self.pose.pos;
        let bearing = delta.y.atan2(delta.x);
        let rel = normalize_angle(bearing - self.pose.angle);
        let sector = ((rel + FRAC_PI_8) / FRAC_PI_4).floor() as i32;
        self.direction = sector.rem_euclid(SECTORS as i32) as u8;
    }
}

/// Which texture to draw for each `(frame, sector)` pair.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SpriteManifest {
    pub entries: HashMap<(usize, u8), PathBuf>,
}

impl SpriteManifest {
    pub fn load(name: &Path) -> anyhow::Result<Self> {
        log::info!("loading enemy sprite manifest at {}", name.display());
        let src = read_to_string(name)
            .with_context(|| format!("failed to open sprite manifest: {}", name.display()))?;
        let mut this = Self::parse(&src)?;

        let prefix = name.parent().map(Path::to_path_buf).unwrap_or_default();
        for path in this.entries.values_mut() {
            *path = prefix.join(&*path);
        }
        Ok(this)
    }

    /// One `frame sector path` record per line. Blank lines and `#` comments are skipped.
    pub fn parse(src: &str) -> anyhow::Result<Self> {
        let mut entries = HashMap::new();
        for (n, line) in src.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let mut fields = line.split_whitespace();
            let (Some(frame), Some(sector), Some(path)) =
                (fields.next(), fields.next(), fields.next())
            else {
                anyhow::bail!("line {}: expected `frame sector path`", n + 1);
            };
            let frame: usize = frame
                .parse()
                .with_context(|| format!("line {}: bad frame index {frame}", n + 1))?;
            let sector: u8 = sector
                .parse()
                .with_context(|| format!("line {}: bad sector {sector}", n + 1))?;
            if sector >= SECTORS {
                anyhow::bail!("line {}: sector {sector} out of range", n + 1);
            }
            entries.insert((frame, sector), PathBuf::from(path));
        }
        Ok(Self { entries })
    }
}
