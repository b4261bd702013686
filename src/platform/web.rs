//! Browser backend
//!
//! Owns the canvas, replays each frame's draw list with the 2D context,
//! feeds DOM pointer/key events into [`FrameInput`], binds toy controls to
//! elements by id and drives the frame loop from `requestAnimationFrame`.
//! The page picks a toy with `<canvas id="canvas" data-toy="...">`.

use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec2;
use wasm_bindgen::prelude::*;
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{
    CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement, HtmlSelectElement,
    ImageData, KeyboardEvent, PointerEvent, Window,
};

use super::{CanvasRect, ControlKind, FrameLoop, SurfaceSize, client_to_canvas};
use crate::audio::web::{AudioOut, LoopVoice};
use crate::renderer::{DrawCommand, DrawList, PixelBuffer};
use crate::settings::Settings;
use crate::sim::Bounds;
use crate::toys::{self, FrameInput, Toy};

const CANVAS_ID: &str = "canvas";
const RESET_ID: &str = "reset";
/// Ticks between FPS log lines
const STATS_EVERY: u64 = 600;

/// Everything one running toy page needs
struct App {
    toy: Box<dyn Toy>,
    frame: FrameLoop,
    input: FrameInput,
    list: DrawList,

    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    // Offscreen canvas for scaling pixel buffers up
    scratch: HtmlCanvasElement,
    scratch_ctx: CanvasRenderingContext2d,

    audio: AudioOut,
    loop_voice: Option<(u64, LoopVoice)>,
}

impl App {
    fn on_frame(&mut self, time: f64) {
        let ticks = self
            .frame
            .run_frame(self.toy.as_mut(), &mut self.input, time, &mut self.list);

        for note in self.toy.drain_notes() {
            // Voices stop themselves at the end of the note
            let _ = self.audio.play(&note);
        }
        self.sync_loop();
        self.paint();

        if ticks > 0 && self.frame.ticks() % STATS_EVERY < ticks as u64 {
            log::debug!(
                "{}: {} fps, population {}",
                self.toy.name(),
                self.frame.fps(),
                self.toy.population()
            );
        }
    }

    /// Start, restart or stop the looping sample voice to match the toy
    fn sync_loop(&mut self) {
        let wanted = self.toy.sound_loop().map(|l| l.version);
        let sounding = self.loop_voice.as_ref().map(|(v, _)| *v);
        if wanted == sounding {
            return;
        }
        if let Some((_, voice)) = self.loop_voice.take() {
            voice.stop();
        }
        if let Some(sound) = self.toy.sound_loop() {
            self.loop_voice = self
                .audio
                .play_loop(&sound.samples)
                .map(|voice| (sound.version, voice));
        }
    }

    fn paint(&self) {
        let ctx = &self.ctx;
        let (w, h) = (self.canvas.width() as f64, self.canvas.height() as f64);

        for command in self.list.commands() {
            match command {
                DrawCommand::Clear(color) => {
                    ctx.set_fill_style_str(&color.to_css());
                    ctx.fill_rect(0.0, 0.0, w, h);
                }
                DrawCommand::Circle {
                    center,
                    radius,
                    fill,
                } => {
                    ctx.set_fill_style_str(&fill.to_css());
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        radius.max(0.0) as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.fill();
                }
                DrawCommand::Rect { rect, fill } => {
                    ctx.set_fill_style_str(&fill.to_css());
                    ctx.fill_rect(
                        rect.min.x as f64,
                        rect.min.y as f64,
                        rect.width() as f64,
                        rect.height() as f64,
                    );
                }
                DrawCommand::Line {
                    from,
                    to,
                    width,
                    color,
                } => self.stroke(&[*from, *to], *width, &color.to_css()),
                DrawCommand::Polyline {
                    points,
                    width,
                    color,
                } => self.stroke(points, *width, &color.to_css()),
                DrawCommand::Text {
                    pos,
                    text,
                    size,
                    color,
                } => {
                    ctx.set_fill_style_str(&color.to_css());
                    ctx.set_font(&format!("{size}px sans-serif"));
                    let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
                }
                DrawCommand::Image { dest, pixels } => {
                    if let Err(e) = self.blit(dest, pixels) {
                        log::warn!("Image blit failed: {e:?}");
                    }
                }
            }
        }
    }

    fn stroke(&self, points: &[Vec2], width: f32, css: &str) {
        let Some((first, rest)) = points.split_first() else {
            return;
        };
        let ctx = &self.ctx;
        ctx.set_stroke_style_str(css);
        ctx.set_line_width(width as f64);
        ctx.begin_path();
        ctx.move_to(first.x as f64, first.y as f64);
        for p in rest {
            ctx.line_to(p.x as f64, p.y as f64);
        }
        ctx.stroke();
    }

    /// Scale a pixel buffer over `dest` without smoothing
    fn blit(&self, dest: &Bounds, pixels: &PixelBuffer) -> Result<(), JsValue> {
        let (pw, ph) = (pixels.width() as u32, pixels.height() as u32);
        if self.scratch.width() != pw || self.scratch.height() != ph {
            self.scratch.set_width(pw);
            self.scratch.set_height(ph);
        }
        let data = ImageData::new_with_u8_clamped_array_and_sh(Clamped(pixels.as_bytes()), pw, ph)?;
        self.scratch_ctx.put_image_data(&data, 0.0, 0.0)?;

        self.ctx.set_image_smoothing_enabled(false);
        self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
            &self.scratch,
            dest.min.x as f64,
            dest.min.y as f64,
            dest.width() as f64,
            dest.height() as f64,
        )
    }

    /// Pointer position in canvas pixels
    fn canvas_pos(&self, event: &PointerEvent) -> Vec2 {
        let r = self.canvas.get_bounding_client_rect();
        let rect = CanvasRect {
            left: r.left() as f32,
            top: r.top() as f32,
            width: r.width() as f32,
            height: r.height() as f32,
        };
        let client = Vec2::new(event.client_x() as f32, event.client_y() as f32);
        let size = Vec2::new(self.canvas.width() as f32, self.canvas.height() as f32);
        client_to_canvas(client, &rect, size)
    }
}

fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, JsValue> {
    canvas
        .get_context("2d")?
        .ok_or("2d context unavailable")?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(JsValue::from)
}

fn surface_of(window: &Window, canvas: &HtmlCanvasElement) -> SurfaceSize {
    SurfaceSize::from_css(
        canvas.client_width() as f32,
        canvas.client_height() as f32,
        window.device_pixel_ratio() as f32,
    )
}

fn to_js(e: crate::ToyError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Build the toy named by the canvas and start its frame loop
pub fn start() -> Result<(), JsValue> {
    let window = web_sys::window().ok_or("no window")?;
    let document = window.document().ok_or("no document")?;
    let settings = Settings::load();

    let canvas: HtmlCanvasElement = document
        .get_element_by_id(CANVAS_ID)
        .ok_or("no canvas")?
        .dyn_into()?;
    let surface = surface_of(&window, &canvas);
    canvas.set_width(surface.pixel_width());
    canvas.set_height(surface.pixel_height());

    let name = canvas
        .get_attribute("data-toy")
        .unwrap_or_else(|| settings.toy.clone());
    let seed = settings.seed.unwrap_or_else(|| js_sys::Date::now() as u64);
    let toy = toys::create_with(&name, seed, surface.bounds(), &settings).map_err(to_js)?;

    let ctx = context_2d(&canvas)?;
    let scratch: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
    let scratch_ctx = context_2d(&scratch)?;

    let mut audio = AudioOut::new(settings.volume());
    audio.set_muted(settings.muted);

    let app = Rc::new(RefCell::new(App {
        toy,
        frame: FrameLoop::new(),
        input: FrameInput::default(),
        list: DrawList::new(),
        canvas: canvas.clone(),
        ctx,
        scratch,
        scratch_ctx,
        audio,
        loop_voice: None,
    }));

    setup_pointer(&canvas, app.clone())?;
    setup_keys(&window, app.clone())?;
    setup_controls(&document, app.clone())?;
    setup_resize(&window, app.clone())?;

    log::info!(
        "Running '{}' at {}x{} (dpr {})",
        name,
        surface.pixel_width(),
        surface.pixel_height(),
        surface.dpr
    );
    request_frame(app);
    Ok(())
}

fn request_frame(app: Rc<RefCell<App>>) {
    let Some(window) = web_sys::window() else {
        return;
    };
    let closure = Closure::once(move |time: f64| {
        let running = {
            let mut a = app.borrow_mut();
            a.on_frame(time);
            a.frame.is_running()
        };
        if running {
            request_frame(app);
        }
    });
    let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
    closure.forget();
}

fn setup_pointer(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    // Down: one-shot press, start holding; also the gesture that unlocks audio
    {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            event.prevent_default();
            let mut a = app.borrow_mut();
            let pos = a.canvas_pos(&event);
            a.input.pointer = Some(pos);
            a.input.pointer_held = true;
            a.input.pressed = Some(pos);
            a.audio.resume();
        });
        canvas.add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
            let mut a = app.borrow_mut();
            let pos = a.canvas_pos(&event);
            a.input.pointer = Some(pos);
        });
        canvas.add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    for kind in ["pointerup", "pointerleave", "pointercancel"] {
        let app = app.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: PointerEvent| {
            app.borrow_mut().input.pointer_held = false;
        });
        canvas.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn setup_keys(window: &Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
        let mut a = app.borrow_mut();
        match event.key().as_str() {
            " " => {
                event.prevent_default();
                a.input.toggle = true;
            }
            "r" | "R" => a.toy.reset(),
            _ => {}
        }
    });
    window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}

/// Read an element's current raw value the way its control kind expects
fn raw_value(element: &web_sys::Element, kind: &ControlKind) -> Option<String> {
    match kind {
        ControlKind::Slider { .. } => element
            .dyn_ref::<HtmlInputElement>()
            .map(|input| input.value()),
        ControlKind::Checkbox => element
            .dyn_ref::<HtmlInputElement>()
            .map(|input| input.checked().to_string()),
        ControlKind::Select(_) => element
            .dyn_ref::<HtmlSelectElement>()
            .map(|select| select.value()),
        ControlKind::Button => Some(String::new()),
    }
}

fn apply(app: &Rc<RefCell<App>>, id: &str, raw: &str) {
    let mut a = app.borrow_mut();
    if let Err(e) = toys::apply_control(a.toy.as_mut(), id, raw) {
        log::warn!("Ignoring control value: {e}");
    }
}

fn setup_controls(document: &Document, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let specs = app.borrow().toy.controls();
    for spec in specs {
        let Some(element) = document.get_element_by_id(spec.id) else {
            log::debug!("No element for control '{}'", spec.id);
            continue;
        };

        // Pick up whatever the page starts with
        if !matches!(spec.kind, ControlKind::Button) {
            if let Some(raw) = raw_value(&element, &spec.kind) {
                apply(&app, spec.id, &raw);
            }
        }

        let event = match spec.kind {
            ControlKind::Slider { .. } => "input",
            ControlKind::Select(_) | ControlKind::Checkbox => "change",
            ControlKind::Button => "click",
        };
        let app = app.clone();
        let target = element.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            if let Some(raw) = raw_value(&target, &spec.kind) {
                apply(&app, spec.id, &raw);
            }
        });
        element.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }

    if let Some(button) = document.get_element_by_id(RESET_ID) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            app.borrow_mut().toy.reset();
        });
        button.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn setup_resize(window: &Window, app: Rc<RefCell<App>>) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
        let Some(window) = web_sys::window() else {
            return;
        };
        let mut a = app.borrow_mut();
        let surface = surface_of(&window, &a.canvas);
        if surface.pixel_width() == a.canvas.width() && surface.pixel_height() == a.canvas.height() {
            return;
        }
        a.canvas.set_width(surface.pixel_width());
        a.canvas.set_height(surface.pixel_height());
        a.toy.resize(surface.bounds());
        log::info!("Resized to {}x{}", surface.pixel_width(), surface.pixel_height());
    });
    window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref())?;
    closure.forget();
    Ok(())
}
