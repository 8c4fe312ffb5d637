use crate::kernel::{
    LineKind, OutputLine, ProgramTab, ProgramView, Screen, SourceListing, Store, UnitStatus,
};
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Tabs, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

const STATUS_HEIGHT: u16 = 1;
const INPUT_HEIGHT: u16 = 3;
const TABS_HEIGHT: u16 = 1;

const NO_LISTING: &str = "No code path provided or code could not be loaded.";

pub fn render(store: &Store, log_line: Option<&str>, frame: &mut Frame) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(STATUS_HEIGHT)])
        .split(area);

    match store.state().screen {
        Screen::Gallery => render_gallery(store, frame, chunks[0]),
        Screen::Program => match store.state().program.as_ref() {
            Some(view) => render_program(store, view, frame, chunks[0]),
            None => render_gallery(store, frame, chunks[0]),
        },
    }

    render_status(store, log_line, frame, chunks[1]);
}

fn render_gallery(store: &Store, frame: &mut Frame, area: Rect) {
    let state = store.state();
    let items: Vec<ListItem> = state
        .registry
        .programs()
        .iter()
        .map(|program| {
            let mut spans = vec![Span::styled(
                program.display_name.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            if let Some(description) = program.description.as_deref() {
                spans.push(Span::raw("  "));
                spans.push(Span::styled(
                    description.to_string(),
                    Style::default().fg(Color::DarkGray),
                ));
            }
            ListItem::new(Line::from(spans))
        })
        .collect();

    let title = match state.notice.as_deref() {
        Some(notice) => format!(" Programs | {notice} "),
        None => " Programs ".to_string(),
    };
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(Style::default().bg(Color::Blue).fg(Color::White))
        .highlight_symbol("> ");

    let mut list_state = ListState::default();
    if !state.registry.is_empty() {
        list_state.select(Some(state.gallery.selected));
    }
    frame.render_stateful_widget(list, area, &mut list_state);
}

fn render_program(store: &Store, view: &ProgramView, frame: &mut Frame, area: Rect) {
    let title = store
        .state()
        .registry
        .get(&view.program_id)
        .map(|p| p.display_name.as_str())
        .unwrap_or(view.program_id.as_str());

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(TABS_HEIGHT), Constraint::Min(0)])
        .split(area);

    let selected = match view.tab {
        ProgramTab::Run => 0,
        ProgramTab::Source => 1,
    };
    let tabs = Tabs::new(vec![format!("Run {title}"), "View Original Code".to_string()])
        .select(selected)
        .highlight_style(Style::default().add_modifier(Modifier::REVERSED));
    frame.render_widget(tabs, chunks[0]);

    match view.tab {
        ProgramTab::Run => render_run_tab(store, view, frame, chunks[1]),
        ProgramTab::Source => render_source_tab(view, frame, chunks[1]),
    }
}

fn render_run_tab(store: &Store, view: &ProgramView, frame: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(INPUT_HEIGHT)])
        .split(area);

    let output_area = chunks[0];
    let visible = output_area.height.saturating_sub(2) as usize;
    let lines: Vec<Line> = store.sink().with_lines(|all| {
        let end = all.len().saturating_sub(view.scroll);
        let start = end.saturating_sub(visible);
        all[start..end].iter().map(output_line).collect()
    });

    let output_title = if view.scroll > 0 {
        format!(" Output (+{}) ", view.scroll)
    } else {
        " Output ".to_string()
    };
    let output = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .title(output_title),
    );
    frame.render_widget(output, output_area);

    let input_area = chunks[1];
    let enabled = store.status() == UnitStatus::Ready;
    let input_style = if enabled {
        Style::default()
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let input = Paragraph::new(view.input.text().to_string())
        .style(input_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Input (Enter send, Ctrl+R start, Esc back) "),
        );
    frame.render_widget(input, input_area);

    let max_x = input_area.width.saturating_sub(2);
    let x = (view.input.cursor_width() as u16).min(max_x);
    frame.set_cursor_position((input_area.x + 1 + x, input_area.y + 1));
}

fn render_source_tab(view: &ProgramView, frame: &mut Frame, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(" Source ");
    let paragraph = match &view.source {
        SourceListing::Loaded(content) => Paragraph::new(content.as_str()),
        SourceListing::Loading => Paragraph::new("Loading...").style(dim()),
        SourceListing::Failed(message) => {
            Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red))
        }
        SourceListing::NotRequested | SourceListing::Unavailable => {
            Paragraph::new(NO_LISTING).style(dim())
        }
    };
    frame.render_widget(paragraph.block(block).wrap(Wrap { trim: false }), area);
}

fn render_status(store: &Store, log_line: Option<&str>, frame: &mut Frame, area: Rect) {
    let left = match store.bridge().descriptor() {
        Some(program) => format!("{} | {}", program.display_name, store.status().label()),
        None => store.status().label().to_string(),
    };

    let width = area.width as usize;
    let text = match log_line {
        Some(log) if left.width() + 3 < width => {
            let room = width - left.width() - 3;
            let log: String = log.chars().take(room).collect();
            format!("{left} | {log}")
        }
        _ => left,
    };
    frame.render_widget(Paragraph::new(text).style(dim()), area);
}

fn output_line(line: &OutputLine) -> Line<'static> {
    let style = match line.kind {
        LineKind::Standard => Style::default(),
        LineKind::Error | LineKind::Fatal => Style::default().fg(Color::Red),
        LineKind::Echo => Style::default().fg(Color::Cyan),
        LineKind::Notice => Style::default().fg(Color::Yellow),
    };
    Line::styled(line.render(), style)
}

fn dim() -> Style {
    Style::default().fg(Color::DarkGray)
}
