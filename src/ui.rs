use anyhow::Result;
use asset_tracker::{
    AssetGroup, AssetId, AssetTracker, AssetType, DraftField, DynGateway, SessionMode, ViewState,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    List,
    Form,
}

/// Form rows, top to bottom
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormField {
    Type,
    Name,
    Description,
    Value,
}

impl FormField {
    pub fn next(&self) -> Self {
        match self {
            FormField::Type => FormField::Name,
            FormField::Name => FormField::Description,
            FormField::Description => FormField::Value,
            FormField::Value => FormField::Type,
        }
    }

    pub fn previous(&self) -> Self {
        match self {
            FormField::Type => FormField::Value,
            FormField::Name => FormField::Type,
            FormField::Description => FormField::Name,
            FormField::Value => FormField::Description,
        }
    }

    fn draft_field(&self) -> Option<DraftField> {
        match self {
            FormField::Type => None,
            FormField::Name => Some(DraftField::Name),
            FormField::Description => Some(DraftField::Description),
            FormField::Value => Some(DraftField::Value),
        }
    }
}

pub struct App {
    pub tracker: AssetTracker<DynGateway>,
    pub screen: Screen,
    /// Highlighted category within the active group
    pub category_cursor: usize,
    pub entries_state: TableState,
    pub form_field: FormField,
    pub status: Option<String>,
}

impl App {
    pub fn new(tracker: AssetTracker<DynGateway>) -> Self {
        Self {
            tracker,
            screen: Screen::List,
            category_cursor: 0,
            entries_state: TableState::default(),
            form_field: FormField::Type,
            status: None,
        }
    }

    fn group_types(&self) -> &'static [AssetType] {
        self.tracker.view().active_group().types()
    }

    pub fn highlighted_type(&self) -> AssetType {
        let types = self.group_types();
        types[self.category_cursor.min(types.len() - 1)]
    }

    pub fn selected_entry(&self) -> Option<AssetId> {
        let state = self.tracker.view_state();
        self.entries_state
            .selected()
            .and_then(|i| state.entries().get(i))
            .map(|r| r.id())
    }

    fn reset_entry_cursor(&mut self) {
        if self.tracker.view_state().entries().is_empty() {
            self.entries_state.select(None);
        } else {
            self.entries_state.select(Some(0));
        }
    }

    // ========================================================================
    // LIST SCREEN
    // ========================================================================

    pub fn toggle_group(&mut self) {
        let next = self.tracker.view().active_group().toggle();
        self.tracker.select_group(next);
        self.category_cursor = 0;
    }

    pub fn next_category(&mut self) {
        self.category_cursor = (self.category_cursor + 1) % self.group_types().len();
    }

    pub fn previous_category(&mut self) {
        let len = self.group_types().len();
        self.category_cursor = (self.category_cursor + len - 1) % len;
    }

    pub fn select_highlighted(&mut self) {
        let asset_type = self.highlighted_type();
        self.tracker.select_category(asset_type);
        self.reset_entry_cursor();
        self.status = None;
    }

    pub fn next_entry(&mut self) {
        let len = self.tracker.view_state().entries().len();
        if len == 0 {
            return;
        }
        let i = match self.entries_state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.entries_state.select(Some(i));
    }

    pub fn previous_entry(&mut self) {
        let len = self.tracker.view_state().entries().len();
        if len == 0 {
            return;
        }
        let i = match self.entries_state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.entries_state.select(Some(i));
    }

    pub fn delete_selected(&mut self) {
        let Some(id) = self.selected_entry() else {
            return;
        };

        self.status = Some(match self.tracker.delete_record(id) {
            Ok(report) if report.is_persisted() => format!("Deleted {}", report.record.name()),
            Ok(report) => format!("Deleted {} (not saved!)", report.record.name()),
            Err(e) => format!("Delete failed: {}", e),
        });
        self.reset_entry_cursor();
    }

    pub fn open_create(&mut self) {
        self.tracker.request_create();
        self.form_field = FormField::Type;
        self.screen = Screen::Form;
        self.status = None;
    }

    pub fn open_selected(&mut self) {
        let Some(id) = self.selected_entry() else {
            return;
        };
        match self.tracker.request_view(id) {
            Ok(()) => {
                self.form_field = FormField::Type;
                self.screen = Screen::Form;
                self.status = None;
            }
            Err(e) => self.status = Some(e.to_string()),
        }
    }

    // ========================================================================
    // FORM SCREEN
    // ========================================================================

    fn cycle_draft_type(&mut self, forward: bool) {
        let current = self.tracker.session().draft().asset_type;
        let all = &AssetType::ALL;
        let next = match all.iter().position(|t| *t == current) {
            Some(i) if forward => all[(i + 1) % all.len()],
            Some(i) => all[(i + all.len() - 1) % all.len()],
            None if forward => all[0],
            None => all[all.len() - 1],
        };
        if let Err(e) = self.tracker.select_draft_type(next) {
            self.status = Some(e.to_string());
        }
    }

    fn edit_text(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(field) = self.form_field.draft_field() else {
            return;
        };
        let draft = self.tracker.session().draft();
        let mut text = match field {
            DraftField::Name => draft.name.clone(),
            DraftField::Description => draft.description.clone(),
            DraftField::Value => draft.value.clone(),
        };
        edit(&mut text);
        if let Err(e) = self.tracker.set_field(field, &text) {
            self.status = Some(e.to_string());
        }
    }

    pub fn commit(&mut self) {
        match self.tracker.commit_edit() {
            Ok(report) => {
                let asset_type = report.record.asset_type();
                self.status = Some(if report.is_persisted() {
                    format!("Saved {}", report.record.name())
                } else {
                    format!("Saved {} in memory only (write failed)", report.record.name())
                });
                self.screen = Screen::List;
                self.tracker.select_category(asset_type);
                if let Some(i) = self.group_types().iter().position(|t| *t == asset_type) {
                    self.category_cursor = i;
                }
                self.reset_entry_cursor();
            }
            Err(e) => {
                self.status = Some(e.to_string());
                if !self.tracker.session().is_open() {
                    self.screen = Screen::List;
                    self.reset_entry_cursor();
                }
            }
        }
    }

    pub fn cancel(&mut self) {
        self.tracker.cancel_edit();
        self.screen = Screen::List;
        self.status = None;
    }

    /// Handle one key press; returns true when the app should quit
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        match self.screen {
            Screen::List => match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return true,
                KeyCode::Tab => self.toggle_group(),
                KeyCode::Right | KeyCode::Char('l') => self.next_category(),
                KeyCode::Left | KeyCode::Char('h') => self.previous_category(),
                KeyCode::Char(' ') => self.select_highlighted(),
                KeyCode::Down | KeyCode::Char('j') => self.next_entry(),
                KeyCode::Up | KeyCode::Char('k') => self.previous_entry(),
                KeyCode::Enter => self.open_selected(),
                KeyCode::Char('a') => self.open_create(),
                KeyCode::Char('d') => self.delete_selected(),
                _ => {}
            },
            Screen::Form => {
                let mode = self.tracker.session().mode();
                match key.code {
                    KeyCode::Esc => self.cancel(),
                    KeyCode::Char('e') if mode == SessionMode::Viewing => {
                        if let Err(e) = self.tracker.request_edit() {
                            self.status = Some(e.to_string());
                        }
                    }
                    KeyCode::Char('s') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                        self.commit()
                    }
                    KeyCode::Enter => self.commit(),
                    KeyCode::Tab | KeyCode::Down => self.form_field = self.form_field.next(),
                    KeyCode::BackTab | KeyCode::Up => self.form_field = self.form_field.previous(),
                    KeyCode::Right if self.form_field == FormField::Type => {
                        self.cycle_draft_type(true)
                    }
                    KeyCode::Left if self.form_field == FormField::Type => {
                        self.cycle_draft_type(false)
                    }
                    KeyCode::Backspace => self.edit_text(|text| {
                        text.pop();
                    }),
                    KeyCode::Char(c) if mode.is_writable() => self.edit_text(|text| text.push(c)),
                    _ => {}
                }
            }
        }
        false
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Run the app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            if app.handle_key(key) {
                return Ok(());
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with group tabs
            Constraint::Length(3), // Category indicators
            Constraint::Min(0),    // Entries or form
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);
    render_categories(f, chunks[1], app);

    match app.screen {
        Screen::List => render_entries(f, chunks[2], app),
        Screen::Form => render_form(f, chunks[2], app),
    }

    render_status_bar(f, chunks[3], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let active = app.tracker.view().active_group();

    let mut tab_spans = vec![];
    for (i, group) in [AssetGroup::Personal, AssetGroup::Business].iter().enumerate() {
        if i > 0 {
            tab_spans.push(Span::raw(" │ "));
        }

        let style = if *group == active {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        tab_spans.push(Span::styled(group.as_str(), style));
    }

    let catalog = app.tracker.catalog();
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Assets: {}", catalog.len()),
        Style::default().fg(Color::White),
    ));
    tab_spans.push(Span::raw("  |  "));
    tab_spans.push(Span::styled(
        format!("Total: ${}", catalog.total_value(None)),
        Style::default().fg(Color::Green),
    ));

    let header = Paragraph::new(vec![Line::from(tab_spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn render_categories(f: &mut Frame, area: Rect, app: &App) {
    let highlighted = app.highlighted_type();

    let mut spans = vec![];
    for (i, indicator) in app.tracker.indicators().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }

        let mut style = if indicator.has_entries {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        if indicator.selected {
            style = style.fg(Color::Yellow).add_modifier(Modifier::BOLD);
        }
        if indicator.asset_type == highlighted && app.screen == Screen::List {
            style = style.add_modifier(Modifier::REVERSED);
        }

        spans.push(Span::styled(format!(" {} ", indicator.asset_type.as_str()), style));
    }

    let categories = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).title(" Categories "));

    f.render_widget(categories, area);
}

fn render_message(f: &mut Frame, area: Rect, message: &str) {
    let paragraph = Paragraph::new(message.to_string())
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::default().borders(Borders::ALL).title(" Assets "));
    f.render_widget(paragraph, area);
}

fn render_entries(f: &mut Frame, area: Rect, app: &mut App) {
    let (asset_type, entries, hidden) = match app.tracker.view_state() {
        ViewState::Empty => {
            return render_message(f, area, "No assets yet. Press 'a' to add one.");
        }
        ViewState::NoSelection => {
            return render_message(f, area, "Pick a category (←/→, Space) to see its assets.");
        }
        ViewState::SelectedButNoEntries { asset_type } => {
            let message = format!("No {} assets left. Press 'a' to add one.", asset_type.as_str());
            return render_message(f, area, &message);
        }
        ViewState::ShowingEntries {
            asset_type,
            entries,
            hidden,
        } => (asset_type, entries, hidden),
    };

    let header_cells = ["Name", "Description", "Value"].iter().map(|h| {
        Cell::from(*h).style(
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    });

    let header = Row::new(header_cells)
        .style(Style::default().bg(Color::DarkGray))
        .height(1);

    let rows = entries.iter().map(|record| {
        Row::new(vec![
            Cell::from(truncate(record.name(), 30)),
            Cell::from(truncate(record.description(), 50)),
            Cell::from(format!("${}", record.value())).style(Style::default().fg(Color::Green)),
        ])
        .height(1)
    });

    let mut title = format!(" {} ", asset_type.as_str());
    if hidden > 0 {
        title.push_str(&format!("(+{} not shown) ", hidden));
    }

    let table = Table::new(
        rows,
        [
            Constraint::Length(32),
            Constraint::Min(20),
            Constraint::Length(14),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    )
    .highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.entries_state);
}

fn render_form(f: &mut Frame, area: Rect, app: &App) {
    let session = app.tracker.session();
    let draft = session.draft();
    let writable = session.mode().is_writable();

    let value = if draft.value.is_empty() {
        String::new()
    } else {
        format!("${}", draft.value)
    };

    let rows = [
        (FormField::Type, "Category", draft.asset_type.as_str().to_string()),
        (FormField::Name, "Name", draft.name.clone()),
        (FormField::Description, "Description", draft.description.clone()),
        (FormField::Value, "Value", value),
    ];

    let mut lines = vec![];
    for (field, label, text) in rows {
        let focused = field == app.form_field && writable;
        let label_style = if focused {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::Cyan)
        };
        let text_style = if writable {
            Style::default().fg(Color::White)
        } else {
            Style::default().fg(Color::Gray)
        };

        lines.push(Line::from(vec![
            Span::styled(format!("{:>12}: ", label), label_style),
            Span::styled(text, text_style),
            Span::raw(if focused { "▏" } else { "" }),
        ]));
        lines.push(Line::from(""));
    }

    let save_style = if session.can_commit() {
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    match session.mode() {
        SessionMode::Viewing => lines.push(Line::from(Span::styled(
            "[e] Edit",
            Style::default().fg(Color::Yellow),
        ))),
        _ => lines.push(Line::from(Span::styled("[Enter] Save", save_style))),
    }

    let title = match session.mode() {
        SessionMode::Creating => " New asset ",
        SessionMode::Viewing => " Asset ",
        SessionMode::Editing => " Edit asset ",
        SessionMode::Closed => " ",
    };

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(title),
    );

    f.render_widget(form, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let mut status_spans = vec![];

    if let Some(status) = &app.status {
        status_spans.push(Span::styled(
            format!(" {} ", status),
            Style::default().fg(Color::Green),
        ));
        status_spans.push(Span::raw(" | "));
    }

    let keys: &[(&str, &str)] = match app.screen {
        Screen::List => &[
            ("Tab", "Group"),
            ("←/→", "Category"),
            ("Space", "Show"),
            ("↑/↓", "Nav"),
            ("Enter", "Open"),
            ("a", "Add"),
            ("d", "Delete"),
            ("q", "Quit"),
        ],
        Screen::Form => &[
            ("Tab", "Field"),
            ("←/→", "Category"),
            ("Enter", "Save"),
            ("Esc", "Back"),
        ],
    };

    for (i, (key, label)) in keys.iter().enumerate() {
        if i > 0 {
            status_spans.push(Span::raw(" | "));
        }
        status_spans.push(Span::styled(*key, Style::default().fg(Color::Yellow)));
        status_spans.push(Span::raw(format!(" {}", label)));
    }

    let status = Paragraph::new(Line::from(status_spans))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(status, area);
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
