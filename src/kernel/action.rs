use super::bridge::LoadCompletion;
use super::state::ProgramTab;

#[derive(Debug)]
pub enum Action {
    GalleryMoveSelection(isize),
    GalleryOpenSelected,
    OpenProgram(String),
    Back,
    SetTab(ProgramTab),
    ToggleTab,
    InputInsert(char),
    InputBackspace,
    InputDelete,
    InputCursorLeft,
    InputCursorRight,
    InputHome,
    InputEnd,
    Start,
    Submit,
    ScrollOutput(isize),
    UnitLoaded(LoadCompletion),
    SourceLoaded { program_id: String, content: String },
    SourceFailed { program_id: String, error: String },
    Tick,
}
