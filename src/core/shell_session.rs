use super::app_log::AppLog;
use super::shortcuts::{next_zoom, ZoomChange, DEFAULT_ZOOM};
use super::window_state_store::WindowStateStore;
use crate::models::{ContentSource, WindowBounds, WindowState};
use parking_lot::Mutex;
use serde_json::json;

const LOG_SCOPE: &str = "session";

/// Host operations the session needs from the live main window.
pub trait ShellWindow {
    fn maximize(&self) -> Result<(), String>;
    fn show(&self) -> Result<(), String>;
    fn hide(&self) -> Result<(), String>;
    fn bounds(&self) -> Result<WindowBounds, String>;
    fn is_maximized(&self) -> Result<bool, String>;
    fn is_minimized(&self) -> Result<bool, String>;
    fn load(&self, source: &ContentSource) -> Result<(), String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellEvent {
    Resized,
    Moved,
    CloseRequested,
    /// A page finished loading; `bootstrap` marks the placeholder page the
    /// window is created with.
    PageLoaded { bootstrap: bool },
}

/// Events that rewrite the persisted geometry.
pub const PERSIST_EVENTS: [ShellEvent; 3] = [
    ShellEvent::Resized,
    ShellEvent::Moved,
    ShellEvent::CloseRequested,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    CreatedHidden,
    Shown,
}

/// Side effect the host still has to carry out after an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventEffect {
    None,
    NotifyHiddenToTray,
}

struct SessionState {
    phase: Phase,
    content: Option<ContentSource>,
    zoom: f64,
    tray_notice_sent: bool,
}

/// Runtime context binding the main window to its persisted geometry.
pub struct ShellSession<W> {
    window: W,
    store: WindowStateStore,
    log: AppLog,
    state: Mutex<SessionState>,
}

impl<W: ShellWindow> ShellSession<W> {
    /// Loads the stored geometry, creates the window with it, then applies the
    /// maximized flag on top of the created size and position.
    pub fn open<F>(store: WindowStateStore, log: AppLog, create: F) -> Result<Self, String>
    where
        F: FnOnce(&WindowState) -> Result<W, String>,
    {
        let geometry = store.load();
        let window = create(&geometry)?;

        if geometry.is_maximized {
            if let Err(e) = window.maximize() {
                let _ = log.warn(LOG_SCOPE, "maximize_failed", json!({ "error": e }));
            }
        }

        let _ = log.record(
            "info",
            LOG_SCOPE,
            "window_created",
            Some(json!({
                "width": geometry.width,
                "height": geometry.height,
                "position": geometry.position(),
                "is_maximized": geometry.is_maximized,
            })),
        );

        Ok(Self {
            window,
            store,
            log,
            state: Mutex::new(SessionState {
                phase: Phase::CreatedHidden,
                content: None,
                zoom: DEFAULT_ZOOM,
                tray_notice_sent: false,
            }),
        })
    }

    pub fn log(&self) -> &AppLog {
        &self.log
    }

    pub fn handle_event(&self, event: ShellEvent) -> EventEffect {
        if PERSIST_EVENTS.contains(&event) {
            self.persist_geometry();
        }

        match event {
            ShellEvent::CloseRequested => self.hide_to_tray(),
            ShellEvent::PageLoaded { bootstrap } => {
                self.on_page_loaded(bootstrap);
                EventEffect::None
            }
            ShellEvent::Resized | ShellEvent::Moved => EventEffect::None,
        }
    }

    /// Captures the live bounds and overwrites the stored record.
    pub fn persist_geometry(&self) {
        if self.window.is_minimized().unwrap_or(false) {
            return;
        }

        let captured = self.window.bounds().and_then(|bounds| {
            let is_maximized = self.window.is_maximized()?;
            Ok(WindowState::from_bounds(bounds, is_maximized))
        });

        match captured {
            Ok(Some(state)) => self.store.save(&state),
            Ok(None) => {}
            Err(e) => {
                let _ = self
                    .log
                    .warn(LOG_SCOPE, "capture_failed", json!({ "error": e }));
            }
        }
    }

    /// Points the window at the chosen content. Only the first choice sticks.
    ///
    /// A remote target that fails to load degrades to the fallback page. When
    /// nothing could be loaded no page load will ever arrive, so the window is
    /// shown as it is.
    pub fn apply_content(&self, source: ContentSource) {
        {
            let mut state = self.state.lock();
            if state.content.is_some() {
                return;
            }
            state.content = Some(source.clone());
        }

        let Err(e) = self.window.load(&source) else {
            return;
        };
        self.log_load_failure(&source, &e);

        if matches!(source, ContentSource::Remote(_)) {
            self.state.lock().content = Some(ContentSource::Fallback);
            match self.window.load(&ContentSource::Fallback) {
                Ok(()) => return,
                Err(e) => self.log_load_failure(&ContentSource::Fallback, &e),
            }
        }

        if let Err(e) = self.reveal() {
            let _ = self.log.warn(LOG_SCOPE, "show_failed", json!({ "error": e }));
        }
    }

    fn log_load_failure(&self, source: &ContentSource, error: &str) {
        let _ = self.log.error(
            LOG_SCOPE,
            "content_load_failed",
            json!({ "source": source.label(), "error": error }),
        );
    }

    /// Shows the window and marks it shown, so a later page load leaves it be.
    pub fn reveal(&self) -> Result<(), String> {
        // not under the state lock: showing can dispatch to the event loop,
        // whose page-load handler takes the same lock
        self.window.show()?;
        self.state.lock().phase = Phase::Shown;
        Ok(())
    }

    fn on_page_loaded(&self, bootstrap: bool) {
        {
            let state = self.state.lock();
            if bootstrap || state.content.is_none() || state.phase == Phase::Shown {
                return;
            }
        }

        if let Err(e) = self.reveal() {
            let _ = self.log.warn(LOG_SCOPE, "show_failed", json!({ "error": e }));
        }
    }

    fn hide_to_tray(&self) -> EventEffect {
        if let Err(e) = self.window.hide() {
            let _ = self.log.warn(LOG_SCOPE, "hide_failed", json!({ "error": e }));
        }

        let mut state = self.state.lock();
        if state.tray_notice_sent {
            return EventEffect::None;
        }
        state.tray_notice_sent = true;
        EventEffect::NotifyHiddenToTray
    }

    /// Applies a zoom step and returns the new factor for the host to apply.
    pub fn step_zoom(&self, change: ZoomChange) -> f64 {
        let mut state = self.state.lock();
        state.zoom = next_zoom(state.zoom, change);
        state.zoom
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::window_state_store::WINDOW_STATE_FILE_NAME;
    use std::sync::Arc;
    use tauri::Url;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Create {
            width: u32,
            height: u32,
            position: Option<(i32, i32)>,
        },
        Maximize,
        Show,
        Hide,
        Load(ContentSource),
    }

    #[derive(Clone, Default)]
    struct FakeWindow {
        ops: Arc<Mutex<Vec<Op>>>,
        bounds: Arc<Mutex<Option<WindowBounds>>>,
        maximized: Arc<Mutex<bool>>,
        minimized: Arc<Mutex<bool>>,
        failing_loads: Arc<Mutex<Vec<&'static str>>>,
    }

    impl FakeWindow {
        fn ops(&self) -> Vec<Op> {
            self.ops.lock().clone()
        }

        fn set_bounds(&self, x: i32, y: i32, width: u32, height: u32) {
            *self.bounds.lock() = Some(WindowBounds {
                x,
                y,
                width,
                height,
            });
        }
    }

    impl ShellWindow for FakeWindow {
        fn maximize(&self) -> Result<(), String> {
            *self.maximized.lock() = true;
            self.ops.lock().push(Op::Maximize);
            Ok(())
        }

        fn show(&self) -> Result<(), String> {
            self.ops.lock().push(Op::Show);
            Ok(())
        }

        fn hide(&self) -> Result<(), String> {
            self.ops.lock().push(Op::Hide);
            Ok(())
        }

        fn bounds(&self) -> Result<WindowBounds, String> {
            let bounds = *self.bounds.lock();
            bounds.ok_or_else(|| "no bounds".to_string())
        }

        fn is_maximized(&self) -> Result<bool, String> {
            Ok(*self.maximized.lock())
        }

        fn is_minimized(&self) -> Result<bool, String> {
            Ok(*self.minimized.lock())
        }

        fn load(&self, source: &ContentSource) -> Result<(), String> {
            self.ops.lock().push(Op::Load(source.clone()));
            if self.failing_loads.lock().contains(&source.label()) {
                return Err(format!("cannot load {}", source.label()));
            }
            Ok(())
        }
    }

    struct Fixture {
        dir: tempfile::TempDir,
        store: WindowStateStore,
        log: AppLog,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let log = AppLog::new(dir.path().join("logs"));
        let store = WindowStateStore::new(dir.path().join(WINDOW_STATE_FILE_NAME), log.clone());
        Fixture {
            dir,
            store,
            log,
        }
    }

    fn open(fx: &Fixture) -> (FakeWindow, ShellSession<FakeWindow>) {
        let fake = FakeWindow::default();
        let handle = fake.clone();
        let session = ShellSession::open(fx.store.clone(), fx.log.clone(), move |geometry| {
            handle.ops.lock().push(Op::Create {
                width: geometry.width,
                height: geometry.height,
                position: geometry.position(),
            });
            handle.set_bounds(
                geometry.x.unwrap_or(0),
                geometry.y.unwrap_or(0),
                geometry.width,
                geometry.height,
            );
            Ok(handle)
        })
        .unwrap();
        (fake, session)
    }

    #[test]
    fn first_run_creates_window_with_defaults() {
        let fx = fixture();
        let (fake, session) = open(&fx);
        assert_eq!(
            fake.ops(),
            vec![Op::Create {
                width: 992,
                height: 600,
                position: None,
            }]
        );
        assert_eq!(session.state.lock().phase, Phase::CreatedHidden);
    }

    #[test]
    fn maximize_is_applied_after_creation_with_stored_size() {
        let fx = fixture();
        fx.store.save(&WindowState {
            width: 1300,
            height: 850,
            x: Some(60),
            y: Some(40),
            is_maximized: true,
        });

        let (fake, _session) = open(&fx);
        assert_eq!(
            fake.ops(),
            vec![
                Op::Create {
                    width: 1300,
                    height: 850,
                    position: Some((60, 40)),
                },
                Op::Maximize,
            ]
        );
        assert!(*fake.maximized.lock());
    }

    #[test]
    fn geometry_events_save_current_bounds() {
        let fx = fixture();
        let (fake, session) = open(&fx);

        fake.set_bounds(200, 150, 1100, 700);
        session.handle_event(ShellEvent::Resized);
        assert_eq!(
            fx.store.load(),
            WindowState {
                width: 1100,
                height: 700,
                x: Some(200),
                y: Some(150),
                is_maximized: false,
            }
        );

        fake.set_bounds(-40, 10, 1100, 700);
        *fake.maximized.lock() = true;
        session.handle_event(ShellEvent::Moved);
        let stored = fx.store.load();
        assert_eq!(stored.position(), Some((-40, 10)));
        assert!(stored.is_maximized);
    }

    #[test]
    fn close_saves_hides_and_notifies_once() {
        let fx = fixture();
        let (fake, session) = open(&fx);
        fake.set_bounds(5, 6, 900, 650);

        assert_eq!(
            session.handle_event(ShellEvent::CloseRequested),
            EventEffect::NotifyHiddenToTray
        );
        assert_eq!(fx.store.load().width, 900);
        assert_eq!(fake.ops().last(), Some(&Op::Hide));

        assert_eq!(
            session.handle_event(ShellEvent::CloseRequested),
            EventEffect::None
        );
    }

    #[test]
    fn minimized_window_is_not_persisted() {
        let fx = fixture();
        let (fake, session) = open(&fx);
        fake.set_bounds(-32000, -32000, 160, 28);
        *fake.minimized.lock() = true;

        session.handle_event(ShellEvent::Moved);
        assert!(fx.store.try_load().unwrap().is_none());
    }

    #[test]
    fn page_load_events_do_not_persist() {
        let fx = fixture();
        let (_fake, session) = open(&fx);
        session.handle_event(ShellEvent::PageLoaded { bootstrap: false });
        assert!(fx.store.try_load().unwrap().is_none());
    }

    #[test]
    fn window_is_shown_only_after_chosen_content_loads() {
        let fx = fixture();
        let (fake, session) = open(&fx);

        session.handle_event(ShellEvent::PageLoaded { bootstrap: true });
        session.handle_event(ShellEvent::PageLoaded { bootstrap: false });
        assert!(!fake.ops().contains(&Op::Show));
        assert_eq!(session.state.lock().phase, Phase::CreatedHidden);

        let remote = ContentSource::Remote(Url::parse("https://app.example.com/").unwrap());
        session.apply_content(remote.clone());
        session.handle_event(ShellEvent::PageLoaded { bootstrap: true });
        assert_eq!(session.state.lock().phase, Phase::CreatedHidden);

        session.handle_event(ShellEvent::PageLoaded { bootstrap: false });
        session.handle_event(ShellEvent::PageLoaded { bootstrap: false });
        assert_eq!(session.state.lock().phase, Phase::Shown);

        let shows = fake.ops().iter().filter(|op| **op == Op::Show).count();
        assert_eq!(shows, 1);
        assert!(fake.ops().contains(&Op::Load(remote)));
    }

    #[test]
    fn content_decision_is_not_revisited() {
        let fx = fixture();
        let (fake, session) = open(&fx);

        session.apply_content(ContentSource::Fallback);
        session.apply_content(ContentSource::Remote(
            Url::parse("https://app.example.com/").unwrap(),
        ));

        let loads: Vec<_> = fake
            .ops()
            .into_iter()
            .filter(|op| matches!(op, Op::Load(_)))
            .collect();
        assert_eq!(loads, vec![Op::Load(ContentSource::Fallback)]);
        assert_eq!(session.state.lock().content, Some(ContentSource::Fallback));
    }

    #[test]
    fn failed_remote_load_degrades_to_fallback() {
        let fx = fixture();
        let (fake, session) = open(&fx);
        fake.failing_loads.lock().push("remote");

        let remote = ContentSource::Remote(Url::parse("https://app.example.com/").unwrap());
        session.apply_content(remote.clone());

        assert_eq!(
            &fake.ops()[1..],
            &[Op::Load(remote), Op::Load(ContentSource::Fallback)]
        );
        assert_eq!(session.state.lock().content, Some(ContentSource::Fallback));

        session.handle_event(ShellEvent::PageLoaded { bootstrap: false });
        assert_eq!(session.state.lock().phase, Phase::Shown);
    }

    #[test]
    fn window_is_shown_when_nothing_can_be_loaded() {
        let fx = fixture();
        let (fake, session) = open(&fx);
        fake.failing_loads.lock().extend(["remote", "fallback"]);

        session.apply_content(ContentSource::Fallback);
        assert_eq!(fake.ops().last(), Some(&Op::Show));
        assert_eq!(session.state.lock().phase, Phase::Shown);

        // the bootstrap page is all the window holds, and it stays visible
        session.handle_event(ShellEvent::PageLoaded { bootstrap: true });
        assert_eq!(session.state.lock().phase, Phase::Shown);

        let log = std::fs::read_to_string(fx.dir.path().join("logs").join("app.log.jsonl"))
            .unwrap();
        assert!(log.contains("content_load_failed"));
    }

    #[test]
    fn early_reveal_is_not_repeated_when_content_loads() {
        let fx = fixture();
        let (fake, session) = open(&fx);

        session.reveal().unwrap();
        assert_eq!(session.state.lock().phase, Phase::Shown);

        session.apply_content(ContentSource::Fallback);
        session.handle_event(ShellEvent::PageLoaded { bootstrap: false });

        let shows = fake.ops().iter().filter(|op| **op == Op::Show).count();
        assert_eq!(shows, 1);
    }

    #[test]
    fn zoom_steps_accumulate() {
        let fx = fixture();
        let (_fake, session) = open(&fx);
        session.step_zoom(ZoomChange::In);
        let level = session.step_zoom(ZoomChange::In);
        assert!((level - 1.2).abs() < 1e-9);
        assert_eq!(session.step_zoom(ZoomChange::Reset), DEFAULT_ZOOM);
    }
}
