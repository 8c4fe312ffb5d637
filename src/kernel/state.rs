use super::registry::ProgramRegistry;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Screen {
    #[default]
    Gallery,
    Program,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgramTab {
    #[default]
    Run,
    Source,
}

impl ProgramTab {
    pub fn toggled(self) -> Self {
        match self {
            ProgramTab::Run => ProgramTab::Source,
            ProgramTab::Source => ProgramTab::Run,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SourceListing {
    #[default]
    NotRequested,
    Unavailable,
    Loading,
    Loaded(String),
    Failed(String),
}

/// Single-line text input. `cursor` is a char index.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLine {
    text: String,
    cursor: usize,
}

impl InputLine {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Display width of the text left of the cursor.
    pub fn cursor_width(&self) -> usize {
        let byte = self.byte_index(self.cursor);
        UnicodeWidthStr::width(&self.text[..byte])
    }

    pub fn insert(&mut self, ch: char) {
        let byte = self.byte_index(self.cursor);
        self.text.insert(byte, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        let byte = self.byte_index(self.cursor);
        self.text.remove(byte);
        true
    }

    pub fn delete(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        let byte = self.byte_index(self.cursor);
        self.text.remove(byte);
        true
    }

    pub fn move_left(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        true
    }

    pub fn move_right(&mut self) -> bool {
        if self.cursor >= self.char_len() {
            return false;
        }
        self.cursor += 1;
        true
    }

    pub fn home(&mut self) -> bool {
        let changed = self.cursor != 0;
        self.cursor = 0;
        changed
    }

    pub fn end(&mut self) -> bool {
        let len = self.char_len();
        let changed = self.cursor != len;
        self.cursor = len;
        changed
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, char_idx: usize) -> usize {
        self.text
            .char_indices()
            .nth(char_idx)
            .map(|(idx, _)| idx)
            .unwrap_or(self.text.len())
    }
}

#[derive(Debug, Clone, Default)]
pub struct GalleryState {
    pub selected: usize,
}

#[derive(Debug, Clone)]
pub struct ProgramView {
    pub program_id: String,
    pub tab: ProgramTab,
    pub input: InputLine,
    pub source: SourceListing,
    /// Lines scrolled up from the bottom of the output.
    pub scroll: usize,
}

impl ProgramView {
    pub fn new(program_id: impl Into<String>) -> Self {
        Self {
            program_id: program_id.into(),
            tab: ProgramTab::Run,
            input: InputLine::default(),
            source: SourceListing::NotRequested,
            scroll: 0,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub registry: ProgramRegistry,
    pub screen: Screen,
    pub gallery: GalleryState,
    pub program: Option<ProgramView>,
    pub notice: Option<String>,
}

impl AppState {
    pub fn new(registry: ProgramRegistry) -> Self {
        Self {
            registry,
            screen: Screen::Gallery,
            gallery: GalleryState::default(),
            program: None,
            notice: None,
        }
    }
}
