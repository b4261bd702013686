//! Toybox entry point
//!
//! On the web this starts the toy named by the page's canvas. Natively it
//! runs a toy headless for a fixed number of frames and reports what
//! happened, which is handy for profiling and for checking determinism.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }
    log::info!("Toybox starting...");
    toybox::platform::web::start()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match headless::Args::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(msg) => {
            eprintln!("{msg}");
            eprintln!("usage: toybox [toy] [frames] [--settings path.json]");
            std::process::exit(2);
        }
    };

    if let Err(e) = headless::run(&args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use toybox::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH, TICK_SECONDS};
    use toybox::platform::FrameLoop;
    use toybox::renderer::DrawList;
    use toybox::sim::Bounds;
    use toybox::{FrameInput, Result, Settings, toys};

    const DEFAULT_FRAMES: u64 = 600;
    const DEFAULT_SEED: u64 = 1;

    #[derive(Debug, Default, PartialEq)]
    pub struct Args {
        pub toy: Option<String>,
        pub frames: Option<u64>,
        pub settings: Option<String>,
    }

    impl Args {
        pub fn parse(args: impl IntoIterator<Item = String>) -> std::result::Result<Self, String> {
            let mut parsed = Args::default();
            let mut args = args.into_iter();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--settings" => {
                        let path = args.next().ok_or("--settings needs a path")?;
                        parsed.settings = Some(path);
                    }
                    flag if flag.starts_with("--") => return Err(format!("unknown flag {flag}")),
                    _ if parsed.toy.is_none() => parsed.toy = Some(arg.clone()),
                    _ if parsed.frames.is_none() => {
                        let frames = arg
                            .parse()
                            .map_err(|_| format!("frames must be a whole number, got '{arg}'"))?;
                        parsed.frames = Some(frames);
                    }
                    _ => return Err(format!("unexpected argument '{arg}'")),
                }
            }
            Ok(parsed)
        }
    }

    /// Headless runs are reproducible unless the settings pin a seed
    pub fn seed_for(settings: &Settings) -> u64 {
        settings.seed.unwrap_or(DEFAULT_SEED)
    }

    pub fn run(args: &Args) -> Result<()> {
        let settings = match &args.settings {
            Some(path) => Settings::load_file(path)?,
            None => Settings::default(),
        };
        let name = args.toy.clone().unwrap_or_else(|| settings.toy.clone());
        let frames = args.frames.unwrap_or(DEFAULT_FRAMES);
        let seed = seed_for(&settings);
        let bounds = Bounds::from_size(DEFAULT_WIDTH, DEFAULT_HEIGHT);

        let mut toy = toys::create_with(&name, seed, bounds, &settings)?;
        let mut frame_loop = FrameLoop::new();
        let mut list = DrawList::new();
        // One tap in the middle so interactive toys have something to do
        let mut input = FrameInput {
            pointer: Some(bounds.center()),
            pressed: Some(bounds.center()),
            ..Default::default()
        };

        let frame_ms = TICK_SECONDS * 1000.0;
        let mut notes = 0;
        for i in 0..frames {
            frame_loop.run_frame(toy.as_mut(), &mut input, i as f64 * frame_ms, &mut list);
            notes += toy.drain_notes().len();
            if (i + 1) % 60 == 0 {
                log::info!(
                    "frame {:>5}: population {:>5}, {} draw commands",
                    i + 1,
                    toy.population(),
                    list.len()
                );
            }
        }

        let sound = toy
            .sound_loop()
            .map(|l| format!("{:.1}s loop", l.duration_secs()))
            .unwrap_or_else(|| "silent".to_string());
        println!(
            "{name}: {} ticks, population {}, {} draw commands ({} circles), {notes} notes, {sound}",
            frame_loop.ticks(),
            toy.population(),
            list.len(),
            list.circle_count(),
        );
        Ok(())
    }

}
