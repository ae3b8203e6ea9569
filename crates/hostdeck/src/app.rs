use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use ratatui::widgets::ListState;
use std::path::{Path, PathBuf};

use sshconf::{ConfigStore, Host};

use crate::editor::{EditorAction, ModalEditor};
use crate::keys::Key;
use crate::persister::{self, PersistError, SaveReport};
use crate::settings::Settings;
use crate::status_manager::StatusManager;
use crate::ui::BrowseLayout;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Browse,
    Edit,
}

pub struct App {
    pub settings: Settings,
    pub store: ConfigStore,
    pub editor: ModalEditor,
    pub status: StatusManager,
    pub list_state: ListState,
    view: View,
    load_error: Option<String>,
    // Last content known to be on disk; the editor starts from this.
    config_content: String,
    should_quit: bool,
    connect_to: Option<Host>,
}

impl App {
    pub fn new(settings: Settings, config_path: PathBuf) -> Self {
        let mut app = Self {
            settings,
            store: ConfigStore::new(config_path),
            editor: ModalEditor::new(),
            status: StatusManager::new(),
            list_state: ListState::default(),
            view: View::Browse,
            load_error: None,
            config_content: String::new(),
            should_quit: false,
            connect_to: None,
        };
        app.reload();
        app
    }

    /// Re-parse the config file and refresh the preview text.
    pub fn reload(&mut self) {
        match self.store.load() {
            Ok(()) => {
                self.load_error = None;
                match std::fs::read(self.store.path()) {
                    Ok(bytes) => {
                        self.config_content = String::from_utf8_lossy(&bytes).into_owned()
                    }
                    Err(e) => log::warn!("Failed to read config for preview: {}", e),
                }
            }
            Err(e) => {
                log::error!("{}", e);
                self.load_error = Some(e.to_string());
            }
        }
        self.clamp_selection();
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn hosts(&self) -> &[Host] {
        self.store.hosts()
    }

    pub fn config_path(&self) -> &Path {
        self.store.path()
    }

    pub fn config_content(&self) -> &str {
        &self.config_content
    }

    pub fn load_error(&self) -> Option<&str> {
        self.load_error.as_deref()
    }

    pub fn selected_index(&self) -> usize {
        self.list_state.selected().unwrap_or(0)
    }

    pub fn selected_host(&self) -> Option<&Host> {
        self.hosts().get(self.selected_index())
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Host chosen with Enter, if the app is exiting to connect.
    pub fn take_connection(&mut self) -> Option<Host> {
        self.connect_to.take()
    }

    pub fn update_status(&mut self) {
        self.status.update();
    }

    pub async fn handle_key_event(&mut self, key: KeyEvent) -> Result<()> {
        match self.view {
            View::Browse => self.handle_browse_key(key),
            View::Edit => self.handle_editor_key(key).await,
        }
        Ok(())
    }

    fn handle_browse_key(&mut self, key: KeyEvent) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.quit();
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Up | KeyCode::Char('k') => self.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.select_next(),
            KeyCode::Enter | KeyCode::Char(' ') => {
                if let Some(host) = self.selected_host().cloned() {
                    log::info!("Connecting to {}", host.name);
                    self.connect_to = Some(host);
                    self.quit();
                }
            }
            KeyCode::Char('e') => self.open_editor(),
            _ => {}
        }
    }

    async fn handle_editor_key(&mut self, key: KeyEvent) {
        match self.editor.handle_key(Key::from(key)) {
            EditorAction::Continue => {}
            EditorAction::Exit => self.close_editor(),
            EditorAction::Save => {
                self.save_buffer().await;
            }
            EditorAction::SaveAndExit => {
                if self.save_buffer().await {
                    self.close_editor();
                }
            }
        }
    }

    /// Persist the editor buffer; on success reload the host list.
    async fn save_buffer(&mut self) -> bool {
        let content = self.editor.content();
        let path = self.store.path().to_path_buf();

        let result = persister::save(&content, &path).await;
        self.finish_save(content, &path, result)
    }

    fn finish_save(
        &mut self,
        content: String,
        path: &Path,
        result: Result<SaveReport, PersistError>,
    ) -> bool {
        match result {
            Ok(report) => {
                self.config_content = content;
                self.editor.save_succeeded(format!(
                    "\"{}\" {}L, {}B written",
                    path.display(),
                    report.line_count,
                    report.bytes_written
                ));
                self.reload();
                self.status
                    .set_success(format!("Saved, {} hosts loaded", self.hosts().len()));
                true
            }
            Err(e) => {
                log::error!("Save failed: {}", e);
                if e.is_permission_error() {
                    // The new content is on disk; keep the preview in sync.
                    self.config_content = content;
                    self.reload();
                }
                self.editor.save_failed(e.to_string());
                false
            }
        }
    }

    pub fn open_editor(&mut self) {
        log::debug!("Opening editor on {}", self.store.path().display());
        self.editor.open(&self.config_content);
        self.view = View::Edit;
    }

    fn close_editor(&mut self) {
        log::debug!("Leaving editor");
        if self.editor.is_modified() {
            self.status.set_info("Unsaved changes discarded".to_string());
        }
        self.view = View::Browse;
    }

    fn select_next(&mut self) {
        let len = self.hosts().len();
        if len == 0 {
            return;
        }
        let next = (self.selected_index() + 1).min(len - 1);
        self.list_state.select(Some(next));
    }

    fn select_previous(&mut self) {
        if self.hosts().is_empty() {
            return;
        }
        let previous = self.selected_index().saturating_sub(1);
        self.list_state.select(Some(previous));
    }

    fn clamp_selection(&mut self) {
        let len = self.hosts().len();
        if len == 0 {
            self.list_state.select(None);
        } else {
            self.list_state.select(Some(self.selected_index().min(len - 1)));
        }
    }

    /// Left clicks in the browse view: the preview opens the editor, a host
    /// row selects that host.
    pub fn handle_mouse_event(&mut self, mouse: MouseEvent, area: Rect) {
        if self.view != View::Browse || mouse.kind != MouseEventKind::Down(MouseButton::Left) {
            return;
        }

        let layout = BrowseLayout::new(area, self.settings.list_width_percent);
        let (col, row) = (mouse.column, mouse.row);

        if contains(layout.preview, col, row) {
            self.open_editor();
            return;
        }

        if contains(layout.list, col, row) {
            let first_row = layout.list.y + 1;
            if row < first_row {
                return;
            }
            let index = self.list_state.offset() + usize::from(row - first_row);
            if index < self.hosts().len() {
                self.list_state.select(Some(index));
            }
        }
    }
}

fn contains(rect: Rect, col: u16, row: u16) -> bool {
    col >= rect.x && col < rect.x + rect.width && row >= rect.y && row < rect.y + rect.height
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editor::EditorMode;
    use crate::status_manager::MessageType;
    use tempfile::TempDir;

    const CONFIG: &str = "Host alpha\n    HostName alpha.example.com\n\nHost beta\n    HostName beta.example.com\n    User root\n";

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    async fn press(app: &mut App, keys: &str) {
        for c in keys.chars() {
            app.handle_key_event(key(KeyCode::Char(c))).await.unwrap();
        }
    }

    fn app_with_config(content: &str) -> (TempDir, App) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, content).unwrap();
        let app = App::new(Settings::default(), path);
        (dir, app)
    }

    #[test]
    fn test_app_loads_hosts() {
        let (_dir, app) = app_with_config(CONFIG);
        assert_eq!(app.view(), View::Browse);
        assert_eq!(app.hosts().len(), 2);
        assert_eq!(app.selected_host().unwrap().name, "alpha");
        assert_eq!(app.config_content(), CONFIG);
        assert!(app.load_error().is_none());
    }

    #[test]
    fn test_missing_config_sets_load_error() {
        let dir = TempDir::new().unwrap();
        let app = App::new(Settings::default(), dir.path().join("missing"));
        assert!(app.load_error().is_some());
        assert!(app.hosts().is_empty());
        assert!(app.selected_host().is_none());
    }

    #[test]
    fn test_invalid_utf8_config_still_browses() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, b"# Caf\xe9 servers\nHost web\n  HostName web.example.com\n").unwrap();

        let app = App::new(Settings::default(), path);
        assert!(app.load_error().is_none());
        assert_eq!(app.hosts().len(), 1);
        assert!(app.config_content().contains("Host web"));
        assert!(app.config_content().contains('\u{FFFD}'));
    }

    #[tokio::test]
    async fn test_browse_navigation_is_clamped() {
        let (_dir, mut app) = app_with_config(CONFIG);
        press(&mut app, "k").await;
        assert_eq!(app.selected_index(), 0);
        press(&mut app, "jjj").await;
        assert_eq!(app.selected_index(), 1);
        app.handle_key_event(key(KeyCode::Up)).await.unwrap();
        assert_eq!(app.selected_host().unwrap().name, "alpha");
    }

    #[tokio::test]
    async fn test_enter_selects_connection_and_quits() {
        let (_dir, mut app) = app_with_config(CONFIG);
        press(&mut app, "j").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert!(app.should_quit());
        assert_eq!(app.take_connection().unwrap().name, "beta");
        assert!(app.take_connection().is_none());
    }

    #[tokio::test]
    async fn test_q_quits_without_connecting() {
        let (_dir, mut app) = app_with_config(CONFIG);
        press(&mut app, "q").await;
        assert!(app.should_quit());
        assert!(app.take_connection().is_none());
    }

    #[tokio::test]
    async fn test_open_editor_loads_last_known_content() {
        let (_dir, mut app) = app_with_config(CONFIG);
        press(&mut app, "e").await;
        assert_eq!(app.view(), View::Edit);
        assert_eq!(app.editor.mode(), EditorMode::Normal);
        assert_eq!(app.editor.content(), CONFIG);
    }

    #[tokio::test]
    async fn test_write_quit_saves_and_reloads() {
        let (_dir, mut app) = app_with_config(CONFIG);
        press(&mut app, "e").await;
        press(&mut app, "dd").await;
        press(&mut app, ":wq").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.view(), View::Browse);
        let on_disk = std::fs::read_to_string(app.config_path()).unwrap();
        assert_eq!(on_disk, CONFIG.split_once('\n').unwrap().1);
        assert_eq!(app.config_content(), on_disk);
        // The HostName line now sits outside any block, so only beta remains.
        assert_eq!(app.hosts().len(), 1);
        assert_eq!(app.hosts()[0].name, "beta");
    }

    #[tokio::test]
    async fn test_write_stays_in_editor() {
        let (_dir, mut app) = app_with_config(CONFIG);
        press(&mut app, "e").await;
        press(&mut app, "o").await;
        press(&mut app, "Host gamma").await;
        app.handle_key_event(key(KeyCode::Esc)).await.unwrap();
        assert!(app.editor.is_modified());

        press(&mut app, ":w").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.view(), View::Edit);
        assert!(!app.editor.is_modified());
        assert_eq!(app.hosts().len(), 3);
        assert_eq!(app.hosts()[2].name, "gamma");
    }

    #[tokio::test]
    async fn test_unknown_command_leaves_file_alone() {
        let (_dir, mut app) = app_with_config(CONFIG);
        press(&mut app, "e").await;
        press(&mut app, ":bogus").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();

        assert_eq!(app.view(), View::Edit);
        assert_eq!(app.editor.mode(), EditorMode::Normal);
        assert_eq!(app.editor.content(), CONFIG);
        assert_eq!(std::fs::read_to_string(app.config_path()).unwrap(), CONFIG);
    }

    #[tokio::test]
    async fn test_failed_save_keeps_edits_and_editor_open() {
        let (_dir, mut app) = app_with_config(CONFIG);
        std::fs::create_dir(persister::backup_path(app.config_path())).unwrap();

        press(&mut app, "e").await;
        press(&mut app, "dd").await;
        press(&mut app, "ZZ").await;

        assert_eq!(app.view(), View::Edit);
        assert!(app.editor.state().last_error.is_some());
        assert_ne!(app.editor.content(), CONFIG);
        assert_eq!(std::fs::read_to_string(app.config_path()).unwrap(), CONFIG);
    }

    #[test]
    fn test_permission_error_keeps_editor_open_and_syncs_preview() {
        let (_dir, mut app) = app_with_config(CONFIG);
        app.open_editor();
        let path = app.config_path().to_path_buf();

        // The content write went through; only restoring the mode failed.
        let written = "Host gamma\n    User ops\n".to_string();
        std::fs::write(&path, &written).unwrap();
        let err = PersistError::Permissions {
            path: path.clone(),
            mode: 0o644,
            source: std::io::Error::from(std::io::ErrorKind::PermissionDenied),
        };

        let saved = app.finish_save(written.clone(), &path, Err(err));

        assert!(!saved);
        assert_eq!(app.view(), View::Edit);
        assert!(app
            .editor
            .state()
            .last_error
            .as_deref()
            .unwrap()
            .contains("restore permissions"));
        assert_eq!(app.config_content(), written);
        assert_eq!(app.hosts().len(), 1);
        assert_eq!(app.hosts()[0].name, "gamma");
    }

    #[tokio::test]
    async fn test_quit_discards_and_reopen_starts_clean() {
        let (_dir, mut app) = app_with_config(CONFIG);
        press(&mut app, "e").await;
        press(&mut app, "dd:q!").await;
        app.handle_key_event(key(KeyCode::Enter)).await.unwrap();
        assert_eq!(app.view(), View::Browse);

        let message = app.status.current_message().unwrap();
        assert_eq!(message.message_type, MessageType::Info);
        assert_eq!(message.content, "Unsaved changes discarded");

        press(&mut app, "e").await;
        assert_eq!(app.editor.content(), CONFIG);
        assert!(!app.editor.is_modified());
    }

    #[test]
    fn test_mouse_click_selects_host_and_opens_editor() {
        let (_dir, mut app) = app_with_config(CONFIG);
        let area = Rect::new(0, 0, 100, 40);
        let layout = BrowseLayout::new(area, app.settings.list_width_percent);

        let click = |column, row| MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column,
            row,
            modifiers: KeyModifiers::NONE,
        };

        app.handle_mouse_event(click(layout.list.x + 2, layout.list.y + 2), area);
        assert_eq!(app.selected_host().unwrap().name, "beta");

        app.handle_mouse_event(click(layout.preview.x + 5, layout.preview.y + 5), area);
        assert_eq!(app.view(), View::Edit);
    }
}
