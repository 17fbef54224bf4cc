use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    Interrupted,
    Eof,
}

/// Source of lines for the nested chat loops.
pub trait LineInput {
    fn read_line(&mut self, prompt: &str) -> ReadOutcome;
}

/// Plain rustyline editor, created on first use.
#[derive(Default)]
pub struct EditorInput {
    editor: Option<DefaultEditor>,
}

impl EditorInput {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LineInput for EditorInput {
    fn read_line(&mut self, prompt: &str) -> ReadOutcome {
        if self.editor.is_none() {
            match DefaultEditor::new() {
                Ok(editor) => self.editor = Some(editor),
                Err(err) => {
                    warn!("failed to open line editor: {err}");
                    return ReadOutcome::Eof;
                }
            }
        }
        let Some(editor) = self.editor.as_mut() else {
            return ReadOutcome::Eof;
        };

        match editor.readline(prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    let _ = editor.add_history_entry(line.as_str());
                }
                ReadOutcome::Line(line)
            }
            Err(ReadlineError::Interrupted) => ReadOutcome::Interrupted,
            Err(ReadlineError::Eof) => ReadOutcome::Eof,
            Err(err) => {
                warn!("input error: {err}");
                ReadOutcome::Eof
            }
        }
    }
}

/// Replays canned lines, then reports end of input.
#[cfg(test)]
pub struct ScriptedInput {
    lines: std::collections::VecDeque<String>,
}

#[cfg(test)]
impl ScriptedInput {
    pub fn new(lines: &[&str]) -> Self {
        Self {
            lines: lines.iter().map(|line| line.to_string()).collect(),
        }
    }
}

#[cfg(test)]
impl LineInput for ScriptedInput {
    fn read_line(&mut self, _prompt: &str) -> ReadOutcome {
        match self.lines.pop_front() {
            Some(line) => ReadOutcome::Line(line),
            None => ReadOutcome::Eof,
        }
    }
}
