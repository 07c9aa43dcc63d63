use std::io;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use nrr_terminal::calc_client::CalcClient;
use nrr_terminal::calc_worker::spawn_calc_provider;
use nrr_terminal::config::AppConfig;
use nrr_terminal::result_view::interpret;
use nrr_terminal::state::{AppState, Delta, DisplayState, FormState, ProviderCommand, apply_delta};
use nrr_terminal::validation::{Field, Toss};

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(state: AppState, cmd_tx: Option<mpsc::Sender<ProviderCommand>>) -> Self {
        Self {
            state,
            should_quit: false,
            cmd_tx,
        }
    }

    fn on_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Char('c') | KeyCode::Char('q') if ctrl => {
                self.should_quit = true;
                return;
            }
            _ => {}
        }

        if self.state.display.is_open() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.close_display();
            }
            return;
        }

        match key.code {
            KeyCode::Char('r') if ctrl => {
                self.state.reset_form();
                self.state.push_log("[INFO] Form cleared");
            }
            KeyCode::Tab | KeyCode::Down => self.state.focus_next(),
            KeyCode::BackTab | KeyCode::Up => self.state.focus_prev(),
            KeyCode::Left => self.state.cycle_option(false),
            KeyCode::Right => self.state.cycle_option(true),
            KeyCode::Backspace => self.state.backspace(),
            KeyCode::Enter => self.submit(),
            KeyCode::Char(ch) if !ctrl => self.state.type_char(ch),
            _ => {}
        }
    }

    fn submit(&mut self) {
        let Some(cmd) = self.state.submit() else {
            return;
        };
        let ProviderCommand::Calculate { submission, .. } = &cmd;
        let submission = *submission;
        let Some(tx) = &self.cmd_tx else {
            self.state.abandon(submission, "Calculation service unavailable");
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.abandon(submission, "Calculation worker stopped");
        }
    }
}

fn main() -> Result<()> {
    let cfg = AppConfig::load().context("failed to load configuration")?;
    let client = CalcClient::from_config(&cfg)?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_calc_provider(client, tx, cmd_rx);

    let mut state = AppState::new(cfg.roster.clone());
    state.push_log(format!("[INFO] Calculation service: {}", cfg.api_url));
    let mut app = App::new(state, Some(cmd_tx));
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(1),
            Constraint::Length(6),
            Constraint::Length(2),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_form(frame, chunks[1], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .block(Block::default().title("Console").borders(Borders::ALL));
    frame.render_widget(console, chunks[2]);

    let footer = Paragraph::new(footer_text(&app.state))
        .block(Block::default().borders(Borders::TOP));
    frame.render_widget(footer, chunks[3]);

    match &app.state.display {
        DisplayState::Closed => {}
        DisplayState::Showing { result, input } => {
            if let Some(view) = interpret(result, input) {
                let mut lines = view.lines();
                lines.push(String::new());
                lines.push("Enter/Esc Close".to_string());
                render_dialog(frame, view.title(), &lines.join("\n"), Color::Blue);
            }
        }
        DisplayState::Error(message) => {
            let text = format!("Error: {message}\n\nEnter/Esc Close");
            render_dialog(frame, "Calculation failed", &text, Color::Red);
        }
    }
}

fn header_text(state: &AppState) -> String {
    match state.pending {
        Some(id) => format!("NRR CALCULATOR | Calculating #{}...", id.0),
        None => "NRR CALCULATOR".to_string(),
    }
}

fn footer_text(state: &AppState) -> String {
    if state.display.is_open() {
        return "Enter/Esc Close | Ctrl-C Quit".to_string();
    }
    "Tab/↑/↓ Field | ←/→ Choose | Enter Calculate | Ctrl-R Reset | Ctrl-C Quit".to_string()
}

fn render_form(frame: &mut Frame, area: Rect, state: &AppState) {
    let block = Block::default().title("Match").borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(block, area);

    const ROW_HEIGHT: u16 = 2;
    let constraints = Field::ALL
        .iter()
        .map(|_| Constraint::Length(ROW_HEIGHT))
        .chain(std::iter::once(Constraint::Min(0)))
        .collect::<Vec<_>>();
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(constraints)
        .split(inner);

    for (idx, field) in Field::ALL.iter().copied().enumerate() {
        render_field(frame, rows[idx], state, field);
    }
}

fn render_field(frame: &mut Frame, area: Rect, state: &AppState, field: Field) {
    if area.height == 0 {
        return;
    }
    let focused = state.form.focus == field;
    let label_style = if focused {
        Style::default().add_modifier(Modifier::BOLD).fg(Color::Cyan)
    } else {
        Style::default()
    };
    let marker = if focused { ">" } else { " " };
    let value = field_display(state, field);
    let line = format!("{marker} {:<18} {value}", field.label());
    let value_area = Rect { height: 1, ..area };
    frame.render_widget(Paragraph::new(line).style(label_style), value_area);

    if area.height < 2 {
        return;
    }
    if let Some(err) = state.form.errors.first(field) {
        let err_area = Rect {
            y: area.y + 1,
            height: 1,
            ..area
        };
        let err_line = format!("  {:<18} {err}", "");
        frame.render_widget(
            Paragraph::new(err_line).style(Style::default().fg(Color::Red)),
            err_area,
        );
    }
}

fn field_display(state: &AppState, field: Field) -> String {
    let raw = state.form.values.get(field);
    if !FormState::is_select(field) {
        return if raw.is_empty() {
            placeholder(field).to_string()
        } else {
            raw.to_string()
        };
    }
    let shown = match field {
        Field::TossResult => match Toss::parse(raw) {
            Some(Toss::Bat) => "Batting First",
            Some(Toss::Bowl) => "Bowling First",
            None => "Choose...",
        },
        _ if raw.is_empty() => "Select Team",
        _ => raw,
    };
    format!("< {shown} >")
}

fn placeholder(field: Field) -> &'static str {
    match field {
        Field::MatchOvers => "e.g. 20",
        Field::DesiredPosition => "1-5",
        Field::RunsScored => "e.g. 120",
        _ => "",
    }
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No activity yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(4)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_dialog(frame: &mut Frame, title: &str, text: &str, accent: Color) {
    let popup_area = centered_rect(70, 50, frame.size());
    frame.render_widget(Clear, popup_area);

    let dialog = Paragraph::new(text.to_string())
        .wrap(Wrap { trim: true })
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(accent)),
        );
    frame.render_widget(dialog, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
