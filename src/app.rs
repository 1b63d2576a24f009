//! Terminal host: song selection, transport control and the tick loop.

use crossterm::event::KeyEvent;
use ratatui::widgets::ListState;
use std::time::{Duration, Instant};

use crate::config::Config;
use crate::input::{dispatch, Action, InputContext};
use crate::library::SongLibrary;
use crate::pipeline::Pipeline;
use crate::session::{Session, SyncNotice, SyncRequest};
use crate::transport::{AudioTransport, ProcessTransport};

/// Top-level application state driven by the terminal loop.
pub struct App {
    /// Loaded configuration
    pub config: Config,
    /// Songs found at startup
    pub library: SongLibrary,
    /// Loaded song, lyrics and sync state
    pub session: Session,
    /// Audio playback
    pub transport: Box<dyn AudioTransport>,
    /// Indices into `library.songs()` currently shown
    pub visible: Vec<usize>,
    /// Selection within `visible`
    pub song_list_state: ListState,
    /// Search query is being edited
    pub search_active: bool,
    /// Current song filter
    pub search_query: String,
    /// Error shown as a blocking modal
    pub error_message: Option<String>,
    /// Non-blocking message in the status bar
    pub status_message: Option<String>,
    /// Help overlay visible
    pub show_help: bool,
    /// Last reported playback position, seconds
    pub position: f64,
    should_quit: bool,
    next_tick: Instant,
}

impl App {
    /// Build the app with the stock pipeline and player.
    pub fn new(config: Config) -> Self {
        let pipeline = Pipeline::from_config(&config);
        let transport = Box::new(ProcessTransport::new(&config.player_bin));
        Self::with_parts(config, pipeline, transport)
    }

    /// Build an app from explicit collaborators.
    pub fn with_parts(config: Config, pipeline: Pipeline, transport: Box<dyn AudioTransport>) -> Self {
        let (library, error_message) = match SongLibrary::scan(&config.songs_dir) {
            Ok(library) => (library, None),
            Err(e) => (SongLibrary::default(), Some(format!("{e}. Set SONGS_DIR to a folder of .mp3 + .txt pairs."))),
        };

        let session = Session::new(pipeline, config.alignment());
        let mut app = Self {
            config,
            library,
            session,
            transport,
            visible: Vec::new(),
            song_list_state: ListState::default(),
            search_active: false,
            search_query: String::new(),
            error_message,
            status_message: None,
            show_help: false,
            position: 0.0,
            should_quit: false,
            next_tick: Instant::now(),
        };
        app.refresh_filter();
        app
    }

    /// Whether the main loop should exit.
    pub const fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Request exit.
    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Time until the next tick is due.
    pub fn until_next_tick(&self) -> Duration {
        self.next_tick.saturating_duration_since(Instant::now())
    }

    /// Run a tick if one is due. Ticks continue while paused.
    pub fn handle_updates(&mut self) {
        let now = Instant::now();
        if now < self.next_tick {
            return;
        }
        self.next_tick = now + self.config.tick_interval();

        if self.session.song().is_none() {
            return;
        }
        self.position = self.transport.position_seconds();
        let outcome = self.session.on_tick(self.position);

        match outcome.notice {
            Some(SyncNotice::Completed { aligned, reference_words }) => {
                self.status_message = Some(format!("Synchronized: {aligned} of {reference_words} words aligned"));
            }
            Some(SyncNotice::Failed(message)) => {
                self.status_message = None;
                self.error_message = Some(message);
            }
            None => {}
        }
    }

    /// Handle a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        let ctx = InputContext {
            search_active: self.search_active,
            overlay_shown: self.error_message.is_some() || self.show_help,
        };
        self.apply(dispatch(key, ctx));
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::None => {}
            Action::Quit => self.quit(),
            Action::SelectPrevious => self.move_selection(-1),
            Action::SelectNext => self.move_selection(1),
            Action::LoadSelected => self.load_selected(),
            Action::Play => self.play(),
            Action::Pause => {
                if let Err(e) = self.transport.pause() {
                    self.error_message = Some(e.to_string());
                }
            }
            Action::Sync => self.sync(),
            Action::StartSearch => self.search_active = true,
            Action::SearchInput(c) => {
                self.search_query.push(c);
                self.refresh_filter();
            }
            Action::SearchBackspace => {
                self.search_query.pop();
                self.refresh_filter();
            }
            Action::SearchCommit => self.search_active = false,
            Action::SearchCancel => {
                self.search_active = false;
                self.search_query.clear();
                self.refresh_filter();
            }
            Action::Dismiss => {
                self.error_message = None;
                self.show_help = false;
            }
            Action::ToggleHelp => self.show_help = !self.show_help,
        }
    }

    fn refresh_filter(&mut self) {
        let hits = self.library.filter(&self.search_query);
        let songs = self.library.songs();
        self.visible = hits
            .iter()
            .filter_map(|hit| songs.iter().position(|s| s.id == hit.id))
            .collect();
        self.song_list_state
            .select((!self.visible.is_empty()).then_some(0));
    }

    #[allow(clippy::cast_possible_wrap, clippy::cast_sign_loss)]
    fn move_selection(&mut self, delta: isize) {
        if self.visible.is_empty() {
            return;
        }
        let len = self.visible.len() as isize;
        let current = self.song_list_state.selected().unwrap_or(0) as isize;
        let next = (current + delta).rem_euclid(len);
        self.song_list_state.select(Some(next as usize));
    }

    fn load_selected(&mut self) {
        let Some(song) = self
            .song_list_state
            .selected()
            .and_then(|i| self.visible.get(i))
            .and_then(|&idx| self.library.songs().get(idx))
            .cloned()
        else {
            return;
        };

        self.position = 0.0;
        if let Err(e) = self.transport.load(&song.music_path) {
            // Playback is stopped, so the previous song's lyrics no longer apply
            self.session.on_song_changed();
            self.error_message = Some(e.to_string());
            return;
        }
        let title = song.title.clone();
        match self.session.load_song(song) {
            Ok(()) => self.status_message = Some(format!("Loaded {title}. Press s to sync, p to play.")),
            Err(e) => self.error_message = Some(e.to_string()),
        }
    }

    fn play(&mut self) {
        if self.session.song().is_none() {
            self.status_message = Some("Load a song first".to_string());
            return;
        }
        if let Err(e) = self.transport.play() {
            self.error_message = Some(e.to_string());
        }
    }

    fn sync(&mut self) {
        self.status_message = Some(
            match self.session.trigger_sync() {
                SyncRequest::Started => "Synchronizing... this can take a few minutes",
                SyncRequest::AlreadyRunning => "Synchronization already running",
                SyncRequest::NoSong => "Load a song first",
            }
            .to_string(),
        );
    }

    /// Whether a sync job is in flight.
    pub const fn is_loading(&self) -> bool {
        self.session.is_syncing()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]

    use super::*;
    use crate::error::{Error, Result};
    use crate::tracker::TrackerPhase;
    use crossterm::event::{KeyCode, KeyModifiers};
    use std::path::Path;

    #[derive(Default)]
    struct FakeTransport {
        fail_loads: bool,
        loaded: bool,
        playing: bool,
        position: f64,
    }

    impl AudioTransport for FakeTransport {
        fn load(&mut self, path: &Path) -> Result<()> {
            if self.fail_loads {
                self.loaded = false;
                return Err(Error::Transport(format!("cannot open {}", path.display())));
            }
            self.loaded = true;
            self.position = 0.0;
            Ok(())
        }
        fn play(&mut self) -> Result<()> {
            self.playing = self.loaded;
            Ok(())
        }
        fn pause(&mut self) -> Result<()> {
            self.playing = false;
            Ok(())
        }
        fn position_seconds(&mut self) -> f64 {
            self.position
        }
        fn is_playing(&mut self) -> bool {
            self.playing
        }
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::empty())
    }

    fn app_with_songs(names: &[&str]) -> (App, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        for name in names {
            std::fs::write(dir.path().join(format!("{name}.mp3")), b"").unwrap();
            std::fs::write(dir.path().join(format!("{name}.txt")), "hello my friend hello").unwrap();
        }
        let config = Config { songs_dir: dir.path().to_path_buf(), ..Config::default() };
        let pipeline = Pipeline::from_config(&config);
        let app = App::with_parts(config, pipeline, Box::<FakeTransport>::default());
        (app, dir)
    }

    #[tokio::test]
    async fn search_filters_and_escape_restores() {
        let (mut app, _dir) = app_with_songs(&["Alpha", "Beta", "Gamma"]);
        assert_eq!(app.visible.len(), 3);

        app.handle_key(key(KeyCode::Char('/')));
        for c in "gam".chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
        assert_eq!(app.visible.len(), 1);

        app.handle_key(key(KeyCode::Esc));
        assert!(!app.search_active);
        assert_eq!(app.visible.len(), 3);
    }

    #[tokio::test]
    async fn selection_wraps() {
        let (mut app, _dir) = app_with_songs(&["Alpha", "Beta"]);
        app.handle_key(key(KeyCode::Up));
        assert_eq!(app.song_list_state.selected(), Some(1));
        app.handle_key(key(KeyCode::Down));
        assert_eq!(app.song_list_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn enter_loads_lyrics() {
        let (mut app, _dir) = app_with_songs(&["Alpha"]);
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.session.document().text(), "hello my friend hello");
        assert!(app.error_message.is_none());
    }

    #[tokio::test]
    async fn failed_load_unloads_previous_song() {
        let (mut app, _dir) = app_with_songs(&["Alpha", "Beta"]);
        app.handle_key(key(KeyCode::Enter));
        assert!(app.session.song().is_some());

        app.transport = Box::new(FakeTransport { fail_loads: true, ..FakeTransport::default() });
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));

        assert!(app.error_message.is_some());
        assert!(app.session.song().is_none());
        assert_eq!(app.session.phase(), TrackerPhase::Idle);
        assert_eq!(app.session.document().text(), "");
    }

    #[tokio::test]
    async fn missing_songs_dir_shows_error() {
        let config = Config { songs_dir: "/nonexistent/lyricsync".into(), ..Config::default() };
        let pipeline = Pipeline::from_config(&config);
        let mut app = App::with_parts(config, pipeline, Box::<FakeTransport>::default());
        assert!(app.error_message.is_some());

        // Any key dismisses the error
        app.handle_key(key(KeyCode::Char('q')));
        assert!(app.error_message.is_none());
        assert!(!app.should_quit());
    }
}
