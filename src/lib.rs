//! Grid-based first-person raycaster.
//!
//! The player walks a 2D tile grid; every screen column casts one ray through the grid and the
//! nearest wall is projected into a vertical strip. Floor and ceiling are filled by inverse
//! perspective per row, and enemies are drawn as billboards picked by animation frame and the
//! direction they are seen from. Drawing goes through the [`render::Renderer`] trait, so the
//! simulation never touches a window.

pub mod config;
pub mod enemy;
pub mod framebuffer;
pub mod map;
pub mod player;
pub mod project;
pub mod ray;
pub mod render;
pub mod world;

pub use config::Config;
pub use map::GridMap;
pub use render::{draw_frame, Renderer};
pub use world::World;
