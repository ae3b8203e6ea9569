use crate::buffer::{Direction, TextBuffer};
use crate::command_line::{CommandError, CommandLine, ExCommand};
use crate::key_sequence::{KeySequence, SequenceCommand};
use crate::keys::Key;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditorMode {
    #[default]
    Normal,
    Insert,
    Command,
}

impl EditorMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EditorMode::Normal => "NORMAL",
            EditorMode::Insert => "INSERT",
            EditorMode::Command => "COMMAND",
        }
    }
}

/// Everything the editor remembers between keystrokes, apart from the text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorState {
    pub mode: EditorMode,
    pub sequence: KeySequence,
    pub command_line: CommandLine,
    pub modified: bool,
    pub last_error: Option<String>,
    pub notice: Option<String>,
}

/// Text change requested by a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferEdit {
    InsertChar(char),
    InsertNewline,
    DeleteBackward,
    DeleteForward,
    Move(Direction),
    AppendNewline,
    DeleteLine,
}

/// What the surrounding application has to do after a keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorAction {
    Continue,
    Save,
    SaveAndExit,
    Exit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Edit(BufferEdit),
    Request(EditorAction),
}

/// Pure state machine step: the next state plus the effects to carry out.
pub fn transition(state: &EditorState, key: Key) -> (EditorState, Vec<Effect>) {
    let mut next = state.clone();
    next.notice = None;
    let mut effects = Vec::new();

    match state.mode {
        EditorMode::Normal => normal_mode(&mut next, key, &mut effects),
        EditorMode::Insert => insert_mode(&mut next, key, &mut effects),
        EditorMode::Command => command_mode(&mut next, key, &mut effects),
    }

    (next, effects)
}

fn normal_mode(state: &mut EditorState, key: Key, effects: &mut Vec<Effect>) {
    let c = match key {
        Key::Char(c) => c,
        Key::Esc => {
            state.sequence.clear();
            effects.push(Effect::Request(EditorAction::Exit));
            return;
        }
        Key::Left | Key::Right | Key::Up | Key::Down => {
            state.sequence.clear();
            effects.push(Effect::Edit(BufferEdit::Move(arrow_direction(key))));
            return;
        }
        _ => {
            state.sequence.clear();
            return;
        }
    };

    if let Some(command) = state.sequence.push(c) {
        match command {
            SequenceCommand::DeleteLine => {
                state.modified = true;
                effects.push(Effect::Edit(BufferEdit::DeleteLine));
            }
            SequenceCommand::SaveAndExit => {
                effects.push(Effect::Request(EditorAction::SaveAndExit));
            }
        }
        return;
    }

    match c {
        'i' => {
            state.sequence.clear();
            state.mode = EditorMode::Insert;
        }
        'a' => {
            state.sequence.clear();
            effects.push(Effect::Edit(BufferEdit::Move(Direction::Right)));
            state.mode = EditorMode::Insert;
        }
        'o' => {
            state.sequence.clear();
            state.modified = true;
            effects.push(Effect::Edit(BufferEdit::AppendNewline));
            state.mode = EditorMode::Insert;
        }
        ':' => {
            state.sequence.clear();
            state.command_line.open();
            state.mode = EditorMode::Command;
        }
        'h' | 'j' | 'k' | 'l' => {
            state.sequence.clear();
            let direction = match c {
                'h' => Direction::Left,
                'j' => Direction::Down,
                'k' => Direction::Up,
                _ => Direction::Right,
            };
            effects.push(Effect::Edit(BufferEdit::Move(direction)));
        }
        _ => {}
    }
}

fn insert_mode(state: &mut EditorState, key: Key, effects: &mut Vec<Effect>) {
    let edit = match key {
        Key::Esc => {
            state.mode = EditorMode::Normal;
            return;
        }
        Key::Char(c) => Some(BufferEdit::InsertChar(c)),
        Key::Tab => Some(BufferEdit::InsertChar('\t')),
        Key::Enter => Some(BufferEdit::InsertNewline),
        Key::Backspace => Some(BufferEdit::DeleteBackward),
        Key::Delete => Some(BufferEdit::DeleteForward),
        Key::Left | Key::Right | Key::Up | Key::Down => {
            Some(BufferEdit::Move(arrow_direction(key)))
        }
        Key::Other => None,
    };

    if let Some(edit) = edit {
        effects.push(Effect::Edit(edit));
    }
    state.modified = true;
}

fn command_mode(state: &mut EditorState, key: Key, effects: &mut Vec<Effect>) {
    match key {
        Key::Esc => {
            state.command_line.clear();
            state.mode = EditorMode::Normal;
        }
        Key::Enter => {
            let command = state.command_line.command().to_string();
            state.command_line.clear();
            state.mode = EditorMode::Normal;
            dispatch(state, &command, effects);
        }
        Key::Backspace => state.command_line.backspace(),
        Key::Char(c) if !c.is_control() => state.command_line.push(c),
        _ => {}
    }
}

fn dispatch(state: &mut EditorState, command: &str, effects: &mut Vec<Effect>) {
    let action = match ExCommand::parse(command) {
        Ok(ExCommand::Write) => EditorAction::Save,
        Ok(ExCommand::WriteQuit) => EditorAction::SaveAndExit,
        Ok(ExCommand::Quit) | Ok(ExCommand::ForceQuit) => EditorAction::Exit,
        Err(CommandError::Empty) => return,
        Err(err) => {
            log::debug!("Ignoring command line: {}", err);
            state.notice = Some(err.to_string());
            return;
        }
    };
    effects.push(Effect::Request(action));
}

fn arrow_direction(key: Key) -> Direction {
    match key {
        Key::Left => Direction::Left,
        Key::Up => Direction::Up,
        Key::Down => Direction::Down,
        _ => Direction::Right,
    }
}

/// Modal editor over the raw config text.
///
/// Buffer edits are applied here; saving and leaving are handed back to the
/// caller as an [`EditorAction`], which reports the outcome through
/// [`ModalEditor::save_succeeded`] / [`ModalEditor::save_failed`].
#[derive(Debug, Clone, Default)]
pub struct ModalEditor {
    state: EditorState,
    buffer: TextBuffer,
}

impl ModalEditor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh editing session on `content`.
    pub fn open(&mut self, content: &str) {
        self.state = EditorState::default();
        self.buffer.set_content(content);
    }

    pub fn handle_key(&mut self, key: Key) -> EditorAction {
        let (next, effects) = transition(&self.state, key);
        if next.mode != self.state.mode {
            log::debug!(
                "Editor mode {} -> {}",
                self.state.mode.as_str(),
                next.mode.as_str()
            );
        }
        self.state = next;

        let mut action = EditorAction::Continue;
        for effect in effects {
            match effect {
                Effect::Edit(edit) => self.apply(edit),
                Effect::Request(requested) => action = requested,
            }
        }
        action
    }

    fn apply(&mut self, edit: BufferEdit) {
        match edit {
            BufferEdit::InsertChar(c) => self.buffer.insert_char(c),
            BufferEdit::InsertNewline => self.buffer.insert_newline(),
            BufferEdit::DeleteBackward => self.buffer.delete_backward(),
            BufferEdit::DeleteForward => self.buffer.delete_forward(),
            BufferEdit::Move(direction) => self.buffer.move_cursor(direction),
            BufferEdit::AppendNewline => self.buffer.append_newline(),
            BufferEdit::DeleteLine => self.buffer.delete_line(),
        }
    }

    pub fn save_succeeded(&mut self, message: String) {
        self.state.modified = false;
        self.state.last_error = None;
        self.state.notice = Some(message);
    }

    pub fn save_failed(&mut self, error: String) {
        self.state.last_error = Some(error);
    }

    pub fn state(&self) -> &EditorState {
        &self.state
    }

    pub fn mode(&self) -> EditorMode {
        self.state.mode
    }

    pub fn buffer(&self) -> &TextBuffer {
        &self.buffer
    }

    pub fn content(&self) -> String {
        self.buffer.content()
    }

    pub fn is_modified(&self) -> bool {
        self.state.modified
    }

    pub fn pending_keys(&self) -> &str {
        self.state.sequence.pending()
    }

    pub fn command_line(&self) -> &str {
        self.state.command_line.as_str()
    }
}
