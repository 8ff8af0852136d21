//! Arcane Archer entry point
//!
//! Handles platform-specific initialization and runs the game loop.
//! All gameplay lives in `arcane_archer::sim`; this file only wires DOM,
//! input, and the audio backend to the core's events.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{HtmlDialogElement, HtmlElement, HtmlInputElement};

    use arcane_archer::audio::AudioManager;
    use arcane_archer::highscores::{self, HIGHSCORE_URL};
    use arcane_archer::sim::{GameEvent, GamePhase, GameState, TickInput, plan_flight, tick};
    use arcane_archer::{Settings, consts::MAX_ARROWS};

    /// Game instance holding all state
    struct Game {
        state: GameState,
        audio: AudioManager,
        input: TickInput,
        last_time: f64,
        last_phase: GamePhase,
        /// Live-region text staged for the next frame; the clear-then-set
        /// split makes repeated identical announcements re-read.
        pending_announcement: Option<String>,
        /// Frames left until the initials field takes focus after the
        /// high-score dialog opens.
        focus_initials_frames: u8,
        /// Final score shown in the open high-score dialog.
        submitting_score: u32,
    }

    impl Game {
        fn new(seed: u64, settings: &Settings) -> Self {
            let mut state = GameState::new(seed);
            state.sweep_scale = settings.sweep_speed.multiplier();

            let mut audio = AudioManager::new();
            audio.set_master_volume(settings.master_volume);
            audio.set_muted(settings.muted);

            Self {
                state,
                audio,
                input: TickInput::default(),
                last_time: 0.0,
                last_phase: GamePhase::Idle,
                pending_announcement: None,
                focus_initials_frames: 0,
                submitting_score: 0,
            }
        }

        /// Run one frame of the simulation and realize its events
        fn update(&mut self, dt: f32) {
            let input = self.input.clone();
            tick(&mut self.state, &input, dt);
            self.input.primary = false;

            for event in self.state.take_events() {
                self.dispatch(event);
            }

            // The power pad is modulated continuously rather than evented
            if self.state.phase == GamePhase::SettingPower {
                if let Some(sweep) = self.state.power_sweep.as_ref() {
                    if let Some(value) = sweep.value() {
                        self.audio.update_power_tone(value, sweep.in_sweep_window());
                    }
                }
            }

            let phase = self.state.phase;
            if phase != self.last_phase {
                self.last_phase = phase;
                apply_focus_layout(phase);
            }
        }

        fn dispatch(&mut self, event: GameEvent) {
            match event {
                GameEvent::StateLabel(msg) => set_text("state-text", &msg),
                GameEvent::Announce(msg) => self.announce(msg),
                GameEvent::TargetRise(target) => self.audio.target_rise(&target),
                GameEvent::TargetLocated(target) => self.audio.target_located(&target),
                GameEvent::TargetPing(target) => self.audio.target_ping(&target),
                GameEvent::AngleStep(step) => self.audio.angle_step(step),
                GameEvent::LastShotPing { pan } => self.audio.last_shot_ping(pan),
                GameEvent::Confirm => self.audio.confirm(),
                GameEvent::PowerToneStarted => self.audio.start_power_tone(),
                GameEvent::PowerToneStopped => self.audio.stop_power_tone(),
                GameEvent::ArrowFired {
                    angle_norm,
                    power_norm,
                } => {
                    let plan = plan_flight(
                        angle_norm,
                        power_norm,
                        &self.state.tuning.ballistics,
                        &self.state.tuning.flight,
                    );
                    self.audio.play_flight(&plan);
                    show_shot_token(plan.duration_secs);
                }
                GameEvent::TargetHit(target) => {
                    self.audio.target_hit(&target);
                    hide_shot_token();
                }
                GameEvent::MissedLow { pan } => {
                    self.audio.miss_low(pan);
                    hide_shot_token();
                }
                GameEvent::MissedHigh => {
                    self.audio.miss_high();
                    hide_shot_token();
                }
                GameEvent::SubmitScore(score) => self.open_highscore_dialog(score),
            }
        }

        /// Queue a live-region announcement. The region is cleared this
        /// frame and repopulated on the next so screen readers always
        /// re-announce.
        fn announce(&mut self, msg: String) {
            set_text("live-region", "");
            self.pending_announcement = Some(msg);
        }

        /// Flush per-frame DOM updates
        fn render_dom(&mut self) {
            set_text("round-value", &self.state.round.to_string());
            set_text("score-value", &self.state.score.to_string());
            set_text("arrows-value", &self.state.arrows_left.to_string());

            if let Some(msg) = self.pending_announcement.take() {
                set_text("live-region", &msg);
            }

            if self.focus_initials_frames > 0 {
                self.focus_initials_frames -= 1;
                if self.focus_initials_frames == 0 {
                    focus_element("hs-initials");
                }
            }
        }

        fn open_highscore_dialog(&mut self, score: u32) {
            self.submitting_score = score;
            set_text("final-score-display", &score.to_string());
            if let Some(input) = element_as::<HtmlInputElement>("hs-initials") {
                input.set_value("");
            }
            self.announce(format!("Game Over, new high score of {score}"));

            if let Some(dialog) = element_as::<HtmlDialogElement>("highscore-dialog") {
                set_inert("highscore-section", false);
                let _ = dialog.show_modal();
                // Focus once the dialog has had a frame to render
                self.focus_initials_frames = 2;
            }
        }
    }

    fn document() -> web_sys::Document {
        web_sys::window().unwrap().document().unwrap()
    }

    fn element_as<T: JsCast>(id: &str) -> Option<T> {
        document().get_element_by_id(id)?.dyn_into::<T>().ok()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn set_inert(id: &str, inert: bool) {
        if let Some(el) = document().get_element_by_id(id) {
            if inert {
                let _ = el.set_attribute("inert", "");
            } else {
                let _ = el.remove_attribute("inert");
            }
        }
    }

    fn set_hidden(id: &str, hidden: bool) {
        if let Some(el) = document().get_element_by_id(id) {
            if hidden {
                let _ = el.set_attribute("hidden", "");
            } else {
                let _ = el.remove_attribute("hidden");
            }
        }
    }

    fn focus_element(id: &str) {
        if let Some(el) = element_as::<HtmlElement>(id) {
            let _ = el.focus();
        }
    }

    /// Keep focus inside whatever the current phase makes interactive
    fn apply_focus_layout(phase: GamePhase) {
        let idle_like = matches!(phase, GamePhase::Idle | GamePhase::GameOver);

        set_inert("hud-section", idle_like);
        set_inert("instructions-section", !idle_like);
        set_inert("footer", !idle_like);
        set_inert("highscore-section", !idle_like);
        set_inert("start-btn", !idle_like);
        set_hidden("set-aim-btn", idle_like);
    }

    fn show_shot_token(duration_secs: f32) {
        if let Some(el) = element_as::<HtmlElement>("shot-token") {
            let style = el.style();
            let _ = style.set_property("opacity", "1");
            let _ = style.set_property(
                "transition",
                &format!("transform {}ms linear", (duration_secs * 1000.0) as u32),
            );
            let _ = style.set_property("transform", "translateX(260px)");
        }
    }

    fn hide_shot_token() {
        if let Some(el) = element_as::<HtmlElement>("shot-token") {
            let style = el.style();
            let _ = style.set_property("opacity", "0");
            let _ = style.set_property("transition", "none");
            let _ = style.set_property("transform", "translateX(0)");
        }
    }

    fn highscore_dialog_open() -> bool {
        element_as::<HtmlDialogElement>("highscore-dialog")
            .map(|d| d.open())
            .unwrap_or(false)
    }

    /// Fetch the leaderboard and render it into the sidebar list
    fn load_high_scores() {
        wasm_bindgen_futures::spawn_local(async {
            match highscores::fetch_scores(HIGHSCORE_URL).await {
                Ok(scores) => {
                    let Some(list) = document().get_element_by_id("highscore-list") else {
                        return;
                    };
                    list.set_inner_html("");
                    for entry in &scores {
                        if let Ok(li) = document().create_element("li") {
                            li.set_text_content(Some(&format!(
                                "{}, {}",
                                entry.initials, entry.score
                            )));
                            let _ = list.append_child(&li);
                        }
                    }
                    set_hidden("highscore-list", false);
                    set_hidden("hs-loading", true);
                }
                Err(msg) => {
                    set_hidden("hs-loading", false);
                    set_text("hs-loading", &msg);
                }
            }
        });
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Arcane Archer starting...");

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, &settings)));
        log::info!("Game initialized with seed: {}", seed);

        // Idle screen layout
        set_text(
            "state-text",
            "Ready? Press Space or the Start Game button.",
        );
        set_text("arrows-value", &MAX_ARROWS.to_string());
        apply_focus_layout(GamePhase::Idle);

        setup_input_handlers(game.clone());
        setup_highscore_dialog(game.clone());
        load_high_scores();

        request_animation_frame(game);

        log::info!("Arcane Archer running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        // Keyboard: Space/Enter is the primary action everywhere except
        // inside the high-score dialog, which keeps native form handling
        {
            let game = game.clone();
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                match event.code().as_str() {
                    "Space" | "Enter" => {
                        if highscore_dialog_open() {
                            return;
                        }
                        event.prevent_default();
                        let mut g = game.borrow_mut();
                        g.audio.unlock();
                        g.input.primary = true;
                    }
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Start and aim buttons share the primary action
        for id in ["start-btn", "set-aim-btn"] {
            if let Some(btn) = document().get_element_by_id(id) {
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    let mut g = game.borrow_mut();
                    g.audio.unlock();
                    g.input.primary = true;
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }
    }

    fn setup_highscore_dialog(game: Rc<RefCell<Game>>) {
        // Submit: validate initials, post, refresh the board
        if let Some(form) = document().get_element_by_id("highscore-form") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::SubmitEvent| {
                event.prevent_default();

                let Some(input) = element_as::<HtmlInputElement>("hs-initials") else {
                    return;
                };
                let Some(initials) = highscores::validate_initials(&input.value()) else {
                    if let Some(window) = web_sys::window() {
                        let _ = window.alert_with_message(
                            "Please enter 1 to 3 letters or numbers for your initials.",
                        );
                    }
                    let _ = input.focus();
                    return;
                };

                let score = game.borrow().submitting_score;
                wasm_bindgen_futures::spawn_local(async move {
                    match highscores::submit_score(HIGHSCORE_URL, &initials, score).await {
                        Ok(()) => {
                            if let Some(dialog) =
                                element_as::<HtmlDialogElement>("highscore-dialog")
                            {
                                dialog.close_with_return_value("submit");
                            }
                            load_high_scores();
                            focus_element("start-btn");
                        }
                        Err(msg) => {
                            if let Some(window) = web_sys::window() {
                                let _ = window.alert_with_message(&msg);
                            }
                        }
                    }
                });
            });
            let _ =
                form.add_event_listener_with_callback("submit", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Cancel button
        if let Some(btn) = document().get_element_by_id("hs-cancel-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                if let Some(dialog) = element_as::<HtmlDialogElement>("highscore-dialog") {
                    dialog.close_with_return_value("cancel");
                }
                focus_element("start-btn");
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Escape or any other close path: put focus somewhere sensible
        if let Some(dialog) = document().get_element_by_id("highscore-dialog") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let submitted = element_as::<HtmlDialogElement>("highscore-dialog")
                    .map(|d| d.return_value() == "submit")
                    .unwrap_or(false);
                if !submitted {
                    focus_element("start-btn");
                }
            });
            let _ =
                dialog.add_event_listener_with_callback("close", closure.as_ref().unchecked_ref());
            closure.forget();
        }
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

            let dt = if g.last_time > 0.0 {
                (((time - g.last_time) / 1000.0) as f32).min(0.1)
            } else {
                1.0 / 60.0
            };
            g.last_time = time;

            g.update(dt);
            g.render_dom();
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
    log::info!("Arcane Archer (native) starting...");
    log::info!("Native mode has no audio output - run with `trunk serve` for the web version");

    // Headless smoke run of the core
    println!("\nRunning scripted round...");
    demo_round();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn demo_round() {
    use arcane_archer::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    let mut state = GameState::new(42);
    let dt = 1.0 / 60.0;
    let press = TickInput { primary: true };
    let idle = TickInput::default();

    tick(&mut state, &press, dt);
    assert_eq!(state.phase, GamePhase::TargetRising);

    let mut events = state.take_events();
    for _ in 0..600 {
        if state.phase == GamePhase::SettingAngle {
            break;
        }
        tick(&mut state, &idle, dt);
        events.append(&mut state.take_events());
    }
    assert_eq!(state.phase, GamePhase::SettingAngle);

    // Sweep briefly, then lock both values and let the arrow fly
    for _ in 0..30 {
        tick(&mut state, &idle, dt);
    }
    tick(&mut state, &press, dt);
    assert_eq!(state.phase, GamePhase::SettingPower);
    tick(&mut state, &press, dt);
    assert_eq!(state.phase, GamePhase::Flight);

    for _ in 0..150 {
        tick(&mut state, &idle, dt);
        events.append(&mut state.take_events());
    }
    assert!(state.phase != GamePhase::Flight, "shot should have resolved");

    let fired = events
        .iter()
        .any(|e| matches!(e, GameEvent::ArrowFired { .. }));
    assert!(fired, "arrow release event missing");

    println!(
        "✓ Scripted round resolved: phase {:?}, score {}, arrows left {}",
        state.phase, state.score, state.arrows_left
    );
}
