use crate::kernel::{Action, LoadCompletion};

/// Results posted back to the UI thread by background work.
#[derive(Debug)]
pub enum AppMessage {
    UnitLoaded(LoadCompletion),
    SourceLoaded { program_id: String, content: String },
    SourceFailed { program_id: String, error: String },
}

impl From<AppMessage> for Action {
    fn from(msg: AppMessage) -> Self {
        match msg {
            AppMessage::UnitLoaded(completion) => Action::UnitLoaded(completion),
            AppMessage::SourceLoaded {
                program_id,
                content,
            } => Action::SourceLoaded {
                program_id,
                content,
            },
            AppMessage::SourceFailed { program_id, error } => {
                Action::SourceFailed { program_id, error }
            }
        }
    }
}
