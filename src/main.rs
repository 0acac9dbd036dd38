//! Spud Survivors entry point
//!
//! The browser build drives the game from `requestAnimationFrame` on a canvas 2D context.
//! The native build runs a headless session with a simple bot and logs the result.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, KeyboardEvent};

    use spud_survivors::consts::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
    use spud_survivors::renderer::{Background, CanvasSurface, Sprite, draw_frame};
    use spud_survivors::sim::{Bounds, Game, GameEvent, GamePhase, TickInput, tick};
    use spud_survivors::{HighScore, Settings, Tuning};

    const PLAYER_SPRITE: &str = "assets/Hero_SweetPotato.png";
    const ENEMY_SPRITE: &str = "assets/Ugly_Fairy.png";
    const ASPECT: f64 = 4.0 / 3.0;

    /// Directional keys currently held
    #[derive(Default)]
    struct HeldKeys {
        up: bool,
        down: bool,
        left: bool,
        right: bool,
    }

    struct App {
        game: Game,
        surface: CanvasSurface,
        canvas: HtmlCanvasElement,
        document: Document,
        background: Background,
        settings: Settings,
        keys: HeldKeys,
        /// One-shot inputs consumed by the next tick
        pending: TickInput,
        last_phase: GamePhase,
        /// Markup currently in the upgrade menu
        menu_html: String,
    }

    impl App {
        fn frame(&mut self, wall: f64) {
            let movement = TickInput::from_buttons(
                self.keys.up,
                self.keys.down,
                self.keys.left,
                self.keys.right,
            )
            .movement;
            let pending = std::mem::take(&mut self.pending);
            let input = TickInput {
                movement,
                ..pending
            };

            tick(&mut self.game, &input, wall);

            for event in self.game.drain_events() {
                self.handle_event(event);
            }

            draw_frame(
                Some(&mut self.surface),
                &self.game,
                &self.settings,
                &self.background,
            );
            self.update_hud();
        }

        fn handle_event(&mut self, event: GameEvent) {
            match event {
                GameEvent::NewHighScore { score } => {
                    log::info!("New high score {} s, saving", score);
                    self.game.high_score.save();
                }
                GameEvent::GameOver { score } => log::info!("Survived {} s", score),
                other => log::debug!("Event: {:?}", other),
            }
        }

        fn start(&mut self, wall: f64) {
            self.pending = TickInput::default();
            self.game.start(wall);
        }

        /// Fit the canvas to its container at 4:3
        fn resize(&mut self) {
            let (mut width, mut height) = (DEFAULT_WIDTH as f64, DEFAULT_HEIGHT as f64);
            if let Some(container) = self.document.get_element_by_id("game-container") {
                let cw = container.client_width() as f64;
                let ch = container.client_height() as f64;
                if cw > 0.0 && ch > 0.0 {
                    if cw / ch > ASPECT {
                        width = ch * ASPECT;
                        height = ch;
                    } else {
                        width = cw;
                        height = cw / ASPECT;
                    }
                }
            }
            self.canvas.set_width(width as u32);
            self.canvas.set_height(height as u32);
            self.game.resize(width as f32, height as f32);
            log::debug!("Canvas resized to {}x{}", width as u32, height as u32);
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let classes = el.class_list();
                let _ = if hidden {
                    classes.add_1("hidden")
                } else {
                    classes.remove_1("hidden")
                };
            }
        }

        fn update_hud(&mut self) {
            let snap = self.game.snapshot();

            self.set_text("score", &format!("Time: {}s", snap.survival_secs));
            self.set_text("high-score", &snap.high_score.to_string());
            let hearts: String = (0..snap.max_lives)
                .map(|i| if i < snap.lives { '\u{2665}' } else { '\u{2661}' })
                .collect();
            self.set_text("lives", &hearts);
            self.set_text(
                "exp-text",
                &format!(
                    "Level {} ({}/{} XP)",
                    snap.level, snap.experience, snap.exp_to_next_level
                ),
            );
            if let Some(fill) = self.document.get_element_by_id("exp-fill") {
                let pct = if snap.exp_to_next_level > 0 {
                    snap.experience as f64 / snap.exp_to_next_level as f64 * 100.0
                } else {
                    0.0
                };
                let _ = fill.set_attribute("style", &format!("width: {:.1}%", pct));
            }

            let html: String = snap
                .upgrade_menu
                .iter()
                .enumerate()
                .map(|(i, option)| {
                    format!(
                        "<div class=\"upgrade-option\" data-index=\"{}\"><h3>[{}] {} ({}/{})</h3><p>{}</p><p>{}</p></div>",
                        i,
                        i + 1,
                        option.title,
                        option.level,
                        option.max_level,
                        option.description,
                        option.current_effect
                    )
                })
                .collect();
            if html != self.menu_html {
                if let Some(menu) = self.document.get_element_by_id("upgrade-menu") {
                    menu.set_inner_html(&html);
                }
                self.menu_html = html;
            }
            self.set_hidden("upgrade-menu", !snap.upgrading);

            if snap.phase != self.last_phase {
                self.set_hidden("start-screen", snap.phase != GamePhase::Start);
                self.set_hidden("pause-screen", snap.phase != GamePhase::Paused);
                self.set_hidden("game-over-screen", snap.phase != GamePhase::GameOver);
                if snap.phase == GamePhase::GameOver {
                    self.set_text("final-score", &snap.survival_secs.to_string());
                    self.set_text("game-over-high-score", &snap.high_score.to_string());
                }
                self.last_phase = snap.phase;
            }
        }
    }

    fn now() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or(0.0)
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Spud Survivors starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;
        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let mut surface = CanvasSurface::new(&canvas)?;
        surface.load_sprite(Sprite::Player, PLAYER_SPRITE)?;
        surface.load_sprite(Sprite::Enemy, ENEMY_SPRITE)?;

        let seed = js_sys::Date::now() as u64;
        let high_score = HighScore::load();
        let game = Game::new(Tuning::default(), Bounds::default(), seed, high_score);
        log::info!("Game initialized with seed: {}", seed);

        let app = Rc::new(RefCell::new(App {
            game,
            surface,
            canvas,
            document: document.clone(),
            background: Background::new(seed),
            settings: Settings::load(),
            keys: HeldKeys::default(),
            pending: TickInput::default(),
            last_phase: GamePhase::GameOver,
            menu_html: String::new(),
        }));
        app.borrow_mut().resize();

        setup_input_handlers(&window, app.clone());
        setup_buttons(&document, app.clone());
        setup_upgrade_clicks(&document, app.clone());
        setup_auto_pause(&window, app.clone());

        request_animation_frame(app);
        log::info!("Spud Survivors running!");
        Ok(())
    }

    fn setup_input_handlers(window: &web_sys::Window, app: Rc<RefCell<App>>) {
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    "w" | "W" | "ArrowUp" => a.keys.up = true,
                    "s" | "S" | "ArrowDown" => a.keys.down = true,
                    "a" | "A" | "ArrowLeft" => a.keys.left = true,
                    "d" | "D" | "ArrowRight" => a.keys.right = true,
                    " " => a.pending.dash = true,
                    "Escape" => a.pending.pause = true,
                    "Enter" => {
                        if matches!(a.game.phase, GamePhase::Start | GamePhase::GameOver) {
                            a.start(now());
                        }
                    }
                    "q" | "Q" => {
                        a.settings.cycle_quality();
                        a.settings.save();
                    }
                    "p" | "P" => {
                        a.settings.particles = !a.settings.particles;
                        log::info!("Particles {}", if a.settings.particles { "on" } else { "off" });
                        a.settings.save();
                    }
                    "m" | "M" => {
                        a.settings.reduced_motion = !a.settings.reduced_motion;
                        log::info!("Reduced motion {}", a.settings.reduced_motion);
                        a.settings.save();
                    }
                    key @ ("1" | "2" | "3" | "4") => {
                        let index = key.parse::<usize>().unwrap_or(1) - 1;
                        let menu = a.game.upgrades.menu(&a.game.weapons);
                        a.pending.upgrade = menu.get(index).map(|option| option.kind);
                    }
                    _ => return,
                }
                event.prevent_default();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut a = app.borrow_mut();
                match event.key().as_str() {
                    "w" | "W" | "ArrowUp" => a.keys.up = false,
                    "s" | "S" | "ArrowDown" => a.keys.down = false,
                    "a" | "A" | "ArrowLeft" => a.keys.left = false,
                    "d" | "D" | "ArrowRight" => a.keys.right = false,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().resize();
            });
            let _ = window
                .add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, app: Rc<RefCell<App>>) {
        for id in ["start-button", "restart-button"] {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                    app.borrow_mut().start(now());
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    /// Clicking an option queues it like its number key
    fn setup_upgrade_clicks(document: &Document, app: Rc<RefCell<App>>) {
        let Some(menu) = document.get_element_by_id("upgrade-menu") else {
            log::warn!("No upgrade menu element, upgrades are keyboard only");
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let Some(option) = event
                .target()
                .and_then(|target| target.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(".upgrade-option").ok().flatten())
            else {
                return;
            };
            let Some(index) = option
                .get_attribute("data-index")
                .and_then(|i| i.parse::<usize>().ok())
            else {
                return;
            };
            let mut a = app.borrow_mut();
            let menu = a.game.upgrades.menu(&a.game.weapons);
            a.pending.upgrade = menu.get(index).map(|option| option.kind);
        });
        let _ = menu.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_auto_pause(window: &web_sys::Window, app: Rc<RefCell<App>>) {
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut a = app.borrow_mut();
            if a.game.phase == GamePhase::Playing {
                a.pending.pause = true;
                log::info!("Auto-paused (window blur)");
            }
        });
        let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            log::error!("No window, stopping the frame loop");
            return;
        };
        let closure = Closure::once(move |time: f64| {
            app.borrow_mut().frame(time);
            request_animation_frame(app);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Spud Survivors (native) starting...");
    log::info!("Native mode runs a headless demo - build for wasm32 to play in the browser");

    if let Err(err) = headless::run(std::env::args().skip(1).collect()) {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::error::Error;

    use glam::Vec2;

    use spud_survivors::consts::FRAME_MS;
    use spud_survivors::renderer::{Background, RecordingSurface, draw_frame};
    use spud_survivors::sim::{Bounds, Game, GameEvent, GamePhase, TickInput, tick};
    use spud_survivors::{HighScore, QualityPreset, Settings, Tuning};

    /// Simulated minutes before the demo gives up waiting for a game over
    const MAX_MINUTES: f64 = 5.0;
    const DANGER_RADIUS: f32 = 180.0;
    const DASH_RADIUS: f32 = 60.0;

    /// `spud-survivors [tuning.json] [seed] [low|medium|high]`
    pub fn run(args: Vec<String>) -> Result<(), Box<dyn Error>> {
        let tuning = match args.first() {
            Some(path) => {
                let json = std::fs::read_to_string(path)?;
                log::info!("Loaded tuning from {}", path);
                Tuning::from_json(&json)?
            }
            None => Tuning::default(),
        };
        let seed = match args.get(1) {
            Some(seed) => seed.parse::<u64>()?,
            None => 42,
        };

        let mut game = Game::new(tuning, Bounds::default(), seed, HighScore::load());
        let mut settings = Settings::load();
        if let Some(name) = args.get(2) {
            settings.quality = QualityPreset::from_str(name)
                .ok_or_else(|| format!("unknown quality preset '{}'", name))?;
            log::info!("Drawing at {} quality", settings.quality.as_str());
            settings.save();
        }
        let background = Background::new(seed);
        let mut surface = RecordingSurface::new();

        game.start(0.0);
        let max_frames = (MAX_MINUTES * 60_000.0 / FRAME_MS) as u64;
        let mut draw_calls = 0usize;
        let mut frame = 0u64;

        while game.phase != GamePhase::GameOver && frame < max_frames {
            frame += 1;
            let input = bot_input(&game);
            tick(&mut game, &input, frame as f64 * FRAME_MS);

            for event in game.drain_events() {
                match event {
                    GameEvent::NewHighScore { .. } => game.high_score.save(),
                    GameEvent::Hit { lives_left } => log::info!("Bot hit, {} lives left", lives_left),
                    _ => {}
                }
            }

            surface.clear_commands();
            draw_frame(Some(&mut surface), &game, &settings, &background);
            draw_calls += surface.commands.len();
        }

        let snap = game.snapshot();
        log::info!(
            "Demo finished after {} frames: survived {} s, level {}, wave {}, {} draw calls",
            frame,
            snap.survival_secs,
            snap.level,
            snap.wave,
            draw_calls
        );
        println!("{}", serde_json::to_string_pretty(&snap)?);
        Ok(())
    }

    /// Flee the closest enemy, drift back to the center otherwise, always take the first upgrade
    fn bot_input(game: &Game) -> TickInput {
        if game.is_upgrading() {
            return TickInput {
                upgrade: game.upgrades.available().next(),
                ..TickInput::default()
            };
        }

        let pos = game.player.pos;
        let closest = game
            .spawner
            .enemies
            .iter()
            .map(|enemy| (enemy.pos, enemy.pos.distance(pos)))
            .min_by(|a, b| a.1.total_cmp(&b.1));

        let (movement, dash) = match closest {
            Some((enemy, dist)) if dist < DANGER_RADIUS => {
                ((pos - enemy).normalize_or_zero(), dist < DASH_RADIUS)
            }
            _ => {
                let home = game.bounds.center() - pos;
                let step = if home.length() > 20.0 {
                    home.normalize_or_zero()
                } else {
                    Vec2::ZERO
                };
                (step, false)
            }
        };

        TickInput {
            movement,
            dash,
            ..TickInput::default()
        }
    }
}
