use super::bridge::{ModuleBridge, RunState, UnitStatus};
use super::error::InvocationError;
use super::invoke;
use super::output::OutputSink;
use super::registry::ProgramRegistry;
use super::state::{InputLine, ProgramTab, ProgramView, Screen, SourceListing};
use super::{Action, AppState, Effect};

pub struct DispatchResult {
    pub effects: Vec<Effect>,
    pub state_changed: bool,
}

impl DispatchResult {
    fn changed(state_changed: bool) -> Self {
        Self {
            effects: Vec::new(),
            state_changed,
        }
    }

    fn with_effect(effect: Effect) -> Self {
        Self {
            effects: vec![effect],
            state_changed: true,
        }
    }
}

/// The hosting surface: UI state plus the bridge that owns the running unit.
pub struct Store {
    state: AppState,
    bridge: ModuleBridge,
}

impl Store {
    pub fn new(registry: ProgramRegistry, sink: OutputSink) -> Self {
        Self {
            state: AppState::new(registry),
            bridge: ModuleBridge::new(sink),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn bridge(&self) -> &ModuleBridge {
        &self.bridge
    }

    pub fn sink(&self) -> &OutputSink {
        self.bridge.sink()
    }

    pub fn status(&self) -> UnitStatus {
        self.bridge.status()
    }

    pub fn run_state(&self) -> RunState {
        self.bridge.run_state()
    }

    pub fn dispatch(&mut self, action: Action) -> DispatchResult {
        match action {
            Action::GalleryMoveSelection(delta) => self.move_selection(delta),
            Action::GalleryOpenSelected => {
                let Some(id) = self
                    .state
                    .registry
                    .programs()
                    .get(self.state.gallery.selected)
                    .map(|p| p.id.clone())
                else {
                    return DispatchResult::changed(false);
                };
                self.open_program(&id)
            }
            Action::OpenProgram(id) => self.open_program(&id),
            Action::Back => self.back(),
            Action::SetTab(tab) => self.set_tab(tab),
            Action::ToggleTab => {
                let Some(view) = self.state.program.as_ref() else {
                    return DispatchResult::changed(false);
                };
                let tab = view.tab.toggled();
                self.set_tab(tab)
            }
            Action::InputInsert(ch) => self.edit_input(|input| {
                input.insert(ch);
                true
            }),
            Action::InputBackspace => self.edit_input(|input| input.backspace()),
            Action::InputDelete => self.edit_input(|input| input.delete()),
            Action::InputCursorLeft => self.edit_input(|input| input.move_left()),
            Action::InputCursorRight => self.edit_input(|input| input.move_right()),
            Action::InputHome => self.edit_input(|input| input.home()),
            Action::InputEnd => self.edit_input(|input| input.end()),
            Action::Start => {
                if !self.run_tab_active() {
                    return DispatchResult::changed(false);
                }
                if let Err(e) = invoke::start(&mut self.bridge) {
                    tracing::debug!(error = %e, "start rejected");
                }
                self.scroll_to_bottom();
                DispatchResult::changed(true)
            }
            Action::Submit => self.submit(),
            Action::ScrollOutput(delta) => self.scroll_output(delta),
            Action::UnitLoaded(completion) => {
                DispatchResult::changed(self.bridge.complete_load(completion))
            }
            Action::SourceLoaded {
                program_id,
                content,
            } => self.set_source(&program_id, SourceListing::Loaded(content)),
            Action::SourceFailed { program_id, error } => self.set_source(
                &program_id,
                SourceListing::Failed(format!("Error loading code: {error}")),
            ),
            Action::Tick => DispatchResult::changed(false),
        }
    }

    fn move_selection(&mut self, delta: isize) -> DispatchResult {
        if self.state.screen != Screen::Gallery || self.state.registry.is_empty() {
            return DispatchResult::changed(false);
        }
        let len = self.state.registry.len();
        let prev = self.state.gallery.selected;
        let next = prev.saturating_add_signed(delta).min(len - 1);
        self.state.gallery.selected = next;
        DispatchResult::changed(next != prev)
    }

    fn open_program(&mut self, id: &str) -> DispatchResult {
        let Some(descriptor) = self.state.registry.get(id).cloned() else {
            tracing::warn!(program = %id, "program not found");
            self.state.notice = Some(format!("The program ID \"{id}\" is not recognized."));
            return DispatchResult::changed(true);
        };

        if let Some(idx) = self
            .state
            .registry
            .programs()
            .iter()
            .position(|p| p.id == descriptor.id)
        {
            self.state.gallery.selected = idx;
        }

        self.state.notice = None;
        self.state.screen = Screen::Program;
        self.state.program = Some(ProgramView::new(descriptor.id.clone()));

        // The previous unit's channel is fenced by begin_load; clearing first would let
        // its reader thread write into the fresh log.
        let request = self.bridge.begin_load(&descriptor);
        self.bridge.sink().clear();
        DispatchResult::with_effect(Effect::LoadUnit(request))
    }

    fn back(&mut self) -> DispatchResult {
        if self.state.screen == Screen::Gallery {
            return DispatchResult::changed(false);
        }
        self.bridge.teardown();
        self.state.screen = Screen::Gallery;
        self.state.program = None;
        DispatchResult::changed(true)
    }

    fn set_tab(&mut self, tab: ProgramTab) -> DispatchResult {
        let Some(view) = self.state.program.as_mut() else {
            return DispatchResult::changed(false);
        };
        if view.tab == tab {
            return DispatchResult::changed(false);
        }
        view.tab = tab;

        if tab != ProgramTab::Source || view.source != SourceListing::NotRequested {
            return DispatchResult::changed(true);
        }

        let location = self
            .state
            .registry
            .get(&view.program_id)
            .and_then(|p| p.source_listing_location.clone());
        match location {
            Some(location) => {
                view.source = SourceListing::Loading;
                DispatchResult::with_effect(Effect::LoadSourceListing {
                    program_id: view.program_id.clone(),
                    location,
                })
            }
            None => {
                view.source = SourceListing::Unavailable;
                DispatchResult::changed(true)
            }
        }
    }

    fn set_source(&mut self, program_id: &str, listing: SourceListing) -> DispatchResult {
        let Some(view) = self.state.program.as_mut() else {
            return DispatchResult::changed(false);
        };
        if view.program_id != program_id || view.source != SourceListing::Loading {
            tracing::debug!(program = %program_id, "ignoring stale source listing");
            return DispatchResult::changed(false);
        }
        view.source = listing;
        DispatchResult::changed(true)
    }

    fn edit_input(&mut self, f: impl FnOnce(&mut InputLine) -> bool) -> DispatchResult {
        if !self.run_tab_active() {
            return DispatchResult::changed(false);
        }
        let Some(view) = self.state.program.as_mut() else {
            return DispatchResult::changed(false);
        };
        DispatchResult::changed(f(&mut view.input))
    }

    fn submit(&mut self) -> DispatchResult {
        if !self.run_tab_active() {
            return DispatchResult::changed(false);
        }
        let Some(view) = self.state.program.as_mut() else {
            return DispatchResult::changed(false);
        };

        let text = view.input.text().to_string();
        let result = invoke::submit_line(&mut self.bridge, &text);
        if !matches!(result, Err(InvocationError::EmptyInput)) {
            view.input.clear();
        }
        view.scroll = 0;
        DispatchResult::changed(true)
    }

    fn scroll_output(&mut self, delta: isize) -> DispatchResult {
        let max = self.bridge.sink().len().saturating_sub(1);
        let Some(view) = self.state.program.as_mut() else {
            return DispatchResult::changed(false);
        };
        let prev = view.scroll;
        view.scroll = prev.saturating_add_signed(delta).min(max);
        DispatchResult::changed(view.scroll != prev)
    }

    fn scroll_to_bottom(&mut self) {
        if let Some(view) = self.state.program.as_mut() {
            view.scroll = 0;
        }
    }

    fn run_tab_active(&self) -> bool {
        self.state.screen == Screen::Program
            && self
                .state
                .program
                .as_ref()
                .is_some_and(|v| v.tab == ProgramTab::Run)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/store.rs"]
mod tests;
