// hostdeck library exports

pub mod app;
pub mod buffer;
pub mod command_line;
pub mod connect;
pub mod editor;
pub mod key_sequence;
pub mod keys;
pub mod persister;
pub mod settings;
pub mod status_manager;
pub mod ui;

pub use app::{App, View};
pub use buffer::TextBuffer;
pub use editor::{transition, EditorAction, EditorMode, EditorState, ModalEditor};
pub use persister::{PersistError, SaveReport};
pub use settings::Settings;
