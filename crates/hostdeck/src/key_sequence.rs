/// Multi-key Normal mode commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceCommand {
    DeleteLine,
    SaveAndExit,
}

/// Known multi-key sequences. New sequences only need an entry here.
pub const SEQUENCES: &[(&str, SequenceCommand)] = &[
    ("dd", SequenceCommand::DeleteLine),
    ("ZZ", SequenceCommand::SaveAndExit),
];

/// Accumulates Normal mode keystrokes until they spell a known sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeySequence {
    pending: String,
}

impl KeySequence {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn pending(&self) -> &str {
        &self.pending
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }

    /// Append `key`; returns the command once a full sequence is typed.
    ///
    /// When the pending keys can no longer become a known sequence they are
    /// dropped and only `key` is kept, so a stray key never blocks the next
    /// sequence.
    pub fn push(&mut self, key: char) -> Option<SequenceCommand> {
        self.pending.push(key);

        if let Some(command) = lookup(&self.pending) {
            self.pending.clear();
            return Some(command);
        }

        if !is_prefix(&self.pending) {
            self.pending.clear();
            self.pending.push(key);
        }
        None
    }
}

fn lookup(keys: &str) -> Option<SequenceCommand> {
    SEQUENCES
        .iter()
        .find(|(sequence, _)| *sequence == keys)
        .map(|(_, command)| *command)
}

fn is_prefix(keys: &str) -> bool {
    SEQUENCES
        .iter()
        .any(|(sequence, _)| sequence.starts_with(keys))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dd_fires_delete_line() {
        let mut seq = KeySequence::new();
        assert_eq!(seq.push('d'), None);
        assert_eq!(seq.pending(), "d");
        assert_eq!(seq.push('d'), Some(SequenceCommand::DeleteLine));
        assert!(seq.is_empty());
    }

    #[test]
    fn test_zz_fires_save_and_exit() {
        let mut seq = KeySequence::new();
        assert_eq!(seq.push('Z'), None);
        assert_eq!(seq.push('Z'), Some(SequenceCommand::SaveAndExit));
    }

    #[test]
    fn test_mismatch_restarts_from_latest_key() {
        let mut seq = KeySequence::new();
        seq.push('d');
        assert_eq!(seq.push('x'), None);
        assert_eq!(seq.pending(), "x");

        // A sequence can still start right after the stray key.
        assert_eq!(seq.push('d'), None);
        assert_eq!(seq.pending(), "d");
        assert_eq!(seq.push('d'), Some(SequenceCommand::DeleteLine));
    }

    #[test]
    fn test_mixed_case_does_not_match() {
        let mut seq = KeySequence::new();
        seq.push('Z');
        assert_eq!(seq.push('z'), None);
        assert_eq!(seq.pending(), "z");
    }

    #[test]
    fn test_pending_never_exceeds_longest_sequence() {
        let longest = SEQUENCES.iter().map(|(s, _)| s.len()).max().unwrap();
        let mut seq = KeySequence::new();
        for key in "qwertyd".chars() {
            seq.push(key);
            assert!(seq.pending().len() <= longest);
        }
        assert_eq!(seq.pending(), "d");
    }
}
