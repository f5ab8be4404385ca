//! Micro Derby entry point
//!
//! Web: WebGPU canvas plus DOM wiring for the setup and results popups.
//! Native: headless batch races, useful for checking pacing and outcomes.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement};

    use micro_derby::consts::*;
    use micro_derby::notify::HttpPenaltyNotifier;
    use micro_derby::renderer::RenderState;
    use micro_derby::sim::{ROSTER, RacePhase, Viewport};
    use micro_derby::{EngineConfig, RaceEngine};

    /// Game instance holding all state
    struct Game {
        engine: RaceEngine<HttpPenaltyNotifier>,
        render_state: Option<RenderState>,
        last_time: f64,
        /// Phase shown by the popups, to rebuild the DOM only on change
        shown_phase: Option<RacePhase>,
        device_pixel_ratio: f64,
    }

    impl Game {
        fn new(config: EngineConfig, viewport: Viewport, seed: u64, dpr: f64) -> Self {
            let notifier = HttpPenaltyNotifier::new(config.penalty_endpoint.clone());
            Self {
                engine: RaceEngine::new(config, viewport, notifier, seed),
                render_state: None,
                last_time: 0.0,
                shown_phase: None,
                device_pixel_ratio: dpr,
            }
        }

        /// Fire due timers, then tick
        fn update(&mut self, time: f64) {
            let dt = if self.last_time > 0.0 {
                time - self.last_time
            } else {
                FRAME_MS
            };
            self.last_time = time;

            if let Some(outcome) = self.engine.frame(dt) {
                log::info!("{}", outcome.status_text());
            }
        }

        /// Render the current frame
        fn render(&mut self) {
            let vertices = self.engine.render();
            if let Some(ref mut render_state) = self.render_state {
                match render_state.render(&vertices) {
                    Ok(_) => {}
                    Err(wgpu::SurfaceError::Lost) => {
                        render_state.resize(render_state.size.0, render_state.size.1);
                    }
                    Err(wgpu::SurfaceError::OutOfMemory) => {
                        log::error!("Out of memory!");
                    }
                    Err(e) => log::warn!("Render error: {:?}", e),
                }
            }
        }

        /// Sync popups and racer outlines with the engine
        fn update_ui(&mut self, document: &Document) {
            let phase = self.engine.phase();
            if self.shown_phase != Some(phase) {
                self.shown_phase = Some(phase);
                set_hidden(document, "setup-popup", phase != RacePhase::Setup);
                set_hidden(document, "results-popup", phase != RacePhase::Finished);
                if phase == RacePhase::Finished {
                    self.show_results(document);
                }
            }
            self.update_highlights(document);
        }

        fn show_results(&self, document: &Document) {
            if let Some(el) = document.get_element_by_id("results-title") {
                el.set_text_content(Some(&format!(
                    "Qualified Specimens (Top {})",
                    self.engine.difficulty()
                )));
            }
            if let Some(list) = document.get_element_by_id("results-list") {
                let html: String = self
                    .engine
                    .results()
                    .iter()
                    .map(|r| {
                        format!(
                            "<li class=\"{}\"><span class=\"rank\">{}.</span> {} {}{}</li>",
                            if r.is_pick { "pick" } else { "" },
                            r.rank,
                            r.profile.emoji,
                            r.profile.name,
                            if r.is_pick { " <span class=\"you\">YOU</span>" } else { "" },
                        )
                    })
                    .collect();
                list.set_inner_html(&html);
            }
            if let (Some(el), Some(outcome)) = (
                document.get_element_by_id("status-text"),
                self.engine.outcome(),
            ) {
                el.set_text_content(Some(&outcome.status_text()));
                let class = if outcome.is_qualified() { "safe" } else { "defeat" };
                let _ = el.set_attribute("class", class);
            }
        }

        fn update_highlights(&self, document: &Document) {
            let Some(layer) = document.get_element_by_id("highlights") else {
                return;
            };
            let dpr = self.device_pixel_ratio;
            let html: String = self
                .engine
                .highlights()
                .iter()
                .map(|h| {
                    format!(
                        "<div class=\"outline\" style=\"left:{:.1}px;top:{:.1}px;border-color:{};box-shadow:0 0 8px {}80\"></div>",
                        h.pos.x as f64 / dpr,
                        h.pos.y as f64 / dpr,
                        h.css,
                        h.css,
                    )
                })
                .collect();
            layer.set_inner_html(&html);
        }
    }

    fn set_hidden(document: &Document, id: &str, hidden: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", hidden);
        }
    }

    /// Canvas size in device pixels
    fn canvas_size(canvas: &HtmlCanvasElement, dpr: f64) -> (u32, u32) {
        let width = (canvas.client_width() as f64 * dpr) as u32;
        let height = (canvas.client_height() as f64 * dpr) as u32;
        (width.max(1), height.max(1))
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Micro Derby starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.class_list().add_1("hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let dpr = window.device_pixel_ratio();
        let (width, height) = canvas_size(&canvas, dpr);
        canvas.set_width(width);
        canvas.set_height(height);

        let config = EngineConfig::load();
        let seed = config.seed.unwrap_or(js_sys::Date::now() as u64);
        let viewport = Viewport::new(width as f32, height as f32);
        let game = Rc::new(RefCell::new(Game::new(config, viewport, seed, dpr)));

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .expect("Failed to create surface");

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::LowPower,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .expect("Failed to get adapter");

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        match RenderState::new(surface, &adapter, width, height).await {
            Ok(render_state) => game.borrow_mut().render_state = Some(render_state),
            Err(e) => log::error!("Failed to create device: {}", e),
        }

        setup_racer_buttons(game.clone());
        setup_difficulty_slider(game.clone());
        setup_restart_button(game.clone());
        setup_resize(&canvas, game.clone());

        request_animation_frame(game);

        log::info!("Micro Derby running!");
    }

    fn setup_racer_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        for profile in ROSTER.iter() {
            let Some(btn) = document.get_element_by_id(&format!("racer-btn-{}", profile.id)) else {
                continue;
            };
            let game = game.clone();
            let id = profile.id;
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if let Err(e) = game.borrow_mut().engine.start_race(id) {
                    log::warn!("Could not start race: {}", e);
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_difficulty_slider(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        let Some(input) = document
            .get_element_by_id("difficulty")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };

        let current = game.borrow().engine.difficulty();
        input.set_value(&current.to_string());
        update_difficulty_label(&document, current);

        let slider = input.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Ok(value) = slider.value().parse::<u8>() else {
                return;
            };
            let mut g = game.borrow_mut();
            match g.engine.set_difficulty(value) {
                Ok(()) => {
                    g.engine.config().save();
                    if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                        update_difficulty_label(&document, value);
                    }
                }
                Err(e) => log::warn!("{}", e),
            }
        });
        let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn update_difficulty_label(document: &Document, difficulty: u8) {
        if let Some(el) = document.get_element_by_id("difficulty-label") {
            el.set_text_content(Some(&format!("TOP {} Finishers", difficulty)));
        }
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();
        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().engine.restart();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let Some(window) = web_sys::window() else {
                return;
            };
            let dpr = window.device_pixel_ratio();
            let (width, height) = canvas_size(&canvas, dpr);
            canvas.set_width(width);
            canvas.set_height(height);

            let mut g = game.borrow_mut();
            g.device_pixel_ratio = dpr;
            if let Some(ref mut render_state) = g.render_state {
                render_state.resize(width, height);
            }
            g.engine.resize(Viewport::new(width as f32, height as f32));
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            g.update(time);
            g.render();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_ui(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Micro Derby (native) starting...");
    log::info!("Native mode runs headless races - run with `trunk serve` for the web version");

    let races = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(5);
    native::run_batch(races);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::time::{SystemTime, UNIX_EPOCH};

    use micro_derby::consts::*;
    use micro_derby::notify::{HttpPenaltyNotifier, LogPenaltyNotifier};
    use micro_derby::sim::{PenaltyNotifier, Viewport, profile};
    use micro_derby::{EngineConfig, RaceEngine};

    const VIEWPORT: Viewport = Viewport {
        width: 1280.0,
        height: 720.0,
    };

    /// Run `races` headless races, rotating the pick through the roster.
    ///
    /// An empty `MICRO_DERBY_ENDPOINT` switches the penalty to a dry run.
    pub fn run_batch(races: u32) {
        let config = EngineConfig::load();
        let seed = config.seed.unwrap_or_else(|| {
            SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        });

        let notifier: Box<dyn PenaltyNotifier> = if config.penalty_endpoint.is_empty() {
            Box::new(LogPenaltyNotifier)
        } else {
            Box::new(HttpPenaltyNotifier::new(config.penalty_endpoint.clone()))
        };

        let mut engine = RaceEngine::new(config, VIEWPORT, notifier, seed);
        let mut qualified = 0;

        for race in 0..races {
            let bet = (race % RACER_COUNT as u32) as u8 + 1;
            if let Err(e) = engine.start_race(bet) {
                log::error!("Race {} could not start: {}", race + 1, e);
                break;
            }

            let mut outcome = None;
            for _ in 0..MAX_TICKS {
                outcome = engine.frame(FRAME_MS);
                if outcome.is_some() {
                    break;
                }
            }

            let session = engine.session();
            let name = profile(bet).map_or("?", |p| p.name);
            match outcome {
                Some(outcome) => {
                    if outcome.is_qualified() {
                        qualified += 1;
                    }
                    println!(
                        "Race {:>3}: pick #{} {:<14} rankings {:?} after {} ticks ({:.1} s) -> {}",
                        race + 1,
                        bet,
                        name,
                        session.rankings,
                        session.ticks,
                        session.elapsed_ms / 1000.0,
                        outcome.status_text()
                    );
                }
                None => println!("Race {:>3}: did not finish within {} ticks", race + 1, MAX_TICKS),
            }

            engine.restart();
        }

        println!("{}/{} picks qualified", qualified, races);
    }
}
