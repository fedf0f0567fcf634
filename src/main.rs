use platform::SdlRenderer;
use sdl2::event::Event;
use sdl2::image::InitFlag;
use sdl2::keyboard::Keycode;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use wolfcast::player::{Action, InputSnapshot};
use wolfcast::{Config, World};

mod platform;

// helper trait to convert strings into std::error types
trait StringToAnyhow<T> {
    fn ah(self) -> anyhow::Result<T>;
}

impl<T> StringToAnyhow<T> for Result<T, String> {
    fn ah(self) -> anyhow::Result<T> {
        self.map_err(|err| anyhow::anyhow!("{err}"))
    }
}

fn load_config() -> Config {
    let path = std::env::var_os("WOLFCAST_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|| "wolfcast.toml".into());

    if !path.exists() {
        log::info!("no config at {}, using defaults", path.display());
        return Config::default();
    }
    Config::load(&path).unwrap_or_else(|err| {
        log::error!("{err:#}; using defaults");
        Config::default()
    })
}

fn action_for(key: Keycode) -> Option<Action> {
    match key {
        Keycode::W => Some(Action::Forward),
        Keycode::S => Some(Action::Backward),
        Keycode::A => Some(Action::StrafeLeft),
        Keycode::D => Some(Action::StrafeRight),
        Keycode::Left => Some(Action::TurnLeft),
        Keycode::Right => Some(Action::TurnRight),
        _ => None,
    }
}

fn main() -> anyhow::Result<()> {
    pretty_env_logger::init_custom_env("WOLFCAST_LOG");
    let config = load_config();

    // sdl boilerplate
    log::info!("initializing sdl2");
    let sdl_ctx = sdl2::init().ah()?;
    log::info!("initializing video");
    let video = sdl_ctx.video().ah()?;
    log::info!("initializing image loading");
    let _image_ctx = sdl2::image::init(InitFlag::PNG | InitFlag::JPG).ah()?;

    log::info!("initializing window");
    let window = video
        .window(&config.title, config.width, config.height)
        .position_centered()
        .build()?;
    log::info!("creating canvas");
    let canvas = window.into_canvas().build()?;
    let texture_creator = canvas.texture_creator();
    let mut renderer = SdlRenderer::new(canvas, &texture_creator, config.width, config.height)?;

    sdl_ctx.mouse().set_relative_mouse_mode(true);
    log::info!("pumping events");
    let mut events = sdl_ctx.event_pump().ah()?;

    log::info!("initializing world");
    let mut world = World::from_config(config);
    world.load_assets(&mut renderer);
    world.player.log_position();

    let frame = Duration::from_secs_f32(1. / world.config.target_fps.max(1) as f32);
    let mut keys = HashSet::new();
    let mut last = Instant::now();

    'main_loop: loop {
        let start = Instant::now();
        let dt = (start - last).as_secs_f32();
        last = start;

        // handle events
        for ev in events.poll_iter() {
            match ev {
                Event::Quit { .. }
                | Event::KeyDown {
                    keycode: Some(Keycode::Escape),
                    ..
                } => break 'main_loop,
                Event::KeyDown {
                    keycode: Some(k), ..
                } => {
                    keys.insert(k);
                }
                Event::KeyUp {
                    keycode: Some(k), ..
                } => {
                    keys.remove(&k);
                }
                _ => {}
            }
        }

        let input = InputSnapshot {
            pressed: keys.iter().copied().filter_map(action_for).collect(),
            mouse_dx: events.relative_mouse_state().x(),
        };

        // a bad frame is dropped, not fatal
        if let Err(err) = world.tick(&input, dt, &mut renderer) {
            log::error!("error while drawing frame: {err:#}");
        }

        let elapsed = start.elapsed();
        if elapsed < frame {
            std::thread::sleep(frame - elapsed);
        }
    }

    log::info!("exiting");
    Ok(())
}
