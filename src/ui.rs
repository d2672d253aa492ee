//! Terminal replay of a saved reign's event log.

use std::io;
use std::path::Path;
use std::time::{Duration, Instant};

use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph, Sparkline},
};

use crate::events::{Event as GameEvent, EventLogger, EventType};

/// The duchy as reconstructed from the event log up to the current year.
#[derive(Debug, Default)]
struct DuchyView {
    peasants: i32,
    land: i32,
    grain: i32,
    crop_yield: String,
    at_war: bool,
    grain_history: Vec<u64>,
    peasant_history: Vec<u64>,
}

/// Replay state.
pub struct UiState {
    events: Vec<GameEvent>,
    current_year: i32,
    max_year: i32,
    duchy: DuchyView,
    recent_events: Vec<String>,
    seconds_per_year: f32,
    paused: bool,
    last_step_time: Instant,
}

impl UiState {
    pub fn new(events: Vec<GameEvent>) -> Self {
        let max_year = events.iter().map(|e| e.year).max().unwrap_or(0);
        let mut ui = Self {
            events,
            current_year: 0,
            max_year,
            duchy: DuchyView::default(),
            recent_events: Vec::new(),
            seconds_per_year: 1.0,
            paused: false,
            last_step_time: Instant::now(),
        };
        ui.replay_to_year(1);
        ui
    }

    fn process_event(&mut self, event: &GameEvent) {
        if self.recent_events.len() >= 12 {
            self.recent_events.remove(0);
        }
        self.recent_events.push(event.to_string());

        match &event.event_type {
            EventType::WarThreatened { .. } => self.duchy.at_war = true,
            EventType::YearSummary {
                peasants,
                land,
                grain,
                crop_yield,
            } => {
                self.duchy.peasants = *peasants;
                self.duchy.land = *land;
                self.duchy.grain = *grain;
                self.duchy.crop_yield = crop_yield.clone();
                self.duchy.at_war = false;
                self.duchy.grain_history.push((*grain).max(0) as u64);
                self.duchy.peasant_history.push((*peasants).max(0) as u64);
            }
            _ => {}
        }
    }

    fn step_forward(&mut self) {
        if self.current_year < self.max_year {
            let next = self.current_year + 1;
            let year_events: Vec<GameEvent> = self
                .events
                .iter()
                .filter(|e| e.year == next)
                .cloned()
                .collect();
            for event in &year_events {
                self.process_event(event);
            }
            self.current_year = next;
        }
    }

    fn step_backward(&mut self) {
        if self.current_year > 1 {
            let target = self.current_year - 1;
            self.replay_to_year(target);
        }
    }

    /// Rebuild the view from scratch up to and including `year`.
    fn replay_to_year(&mut self, year: i32) {
        self.duchy = DuchyView::default();
        self.recent_events.clear();
        self.current_year = 0;
        let target = year.min(self.max_year);
        while self.current_year < target {
            self.step_forward();
        }
    }
}

/// Load a saved event log and replay it in the terminal.
pub fn run_ui(event_file: &str) -> io::Result<()> {
    if !Path::new(event_file).exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("Event file not found: {}", event_file),
        ));
    }
    let events = EventLogger::load_from_file(event_file)?.get_events().to_vec();
    if events.is_empty() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidData,
            "No events found in file",
        ));
    }

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut ui_state = UiState::new(events);
    let res = run_app(&mut terminal, &mut ui_state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    ui_state: &mut UiState,
) -> io::Result<()> {
    loop {
        terminal.draw(|f| draw_ui(f, ui_state))?;

        if event::poll(Duration::from_millis(50))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    match key.code {
                        KeyCode::Char('q') => return Ok(()),
                        KeyCode::Char(' ') => ui_state.paused = !ui_state.paused,
                        KeyCode::Right => {
                            ui_state.step_forward();
                            ui_state.last_step_time = Instant::now();
                        }
                        KeyCode::Left => {
                            ui_state.step_backward();
                            ui_state.last_step_time = Instant::now();
                        }
                        KeyCode::Home => {
                            ui_state.replay_to_year(1);
                            ui_state.last_step_time = Instant::now();
                        }
                        KeyCode::End => {
                            ui_state.replay_to_year(ui_state.max_year);
                            ui_state.last_step_time = Instant::now();
                        }
                        KeyCode::Char('+') | KeyCode::Char('=') => {
                            ui_state.seconds_per_year =
                                (ui_state.seconds_per_year / 2.0).max(0.125);
                        }
                        KeyCode::Char('-') => {
                            ui_state.seconds_per_year = (ui_state.seconds_per_year * 2.0).min(4.0);
                        }
                        _ => {}
                    }
                }
            }
        }

        if !ui_state.paused && ui_state.current_year < ui_state.max_year {
            let elapsed = ui_state.last_step_time.elapsed().as_secs_f32();
            if elapsed >= ui_state.seconds_per_year {
                ui_state.step_forward();
                ui_state.last_step_time = Instant::now();
            }
        }
    }
}

fn draw_ui(f: &mut Frame, ui_state: &UiState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(10),
            Constraint::Length(14),
            Constraint::Length(1),
        ])
        .split(f.area());

    let header = Paragraph::new(format!(
        "Dukedom Reign Replay - Year {}/{} {}",
        ui_state.current_year,
        ui_state.max_year,
        if ui_state.paused { "[PAUSED]" } else { "" }
    ))
    .style(
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    draw_duchy(f, chunks[1], &ui_state.duchy);

    let events: Vec<ListItem> = ui_state
        .recent_events
        .iter()
        .map(|e| ListItem::new(e.as_str()))
        .collect();
    let events_list = List::new(events)
        .block(Block::default().borders(Borders::ALL).title("Chronicle"))
        .style(Style::default().fg(Color::White));
    f.render_widget(events_list, chunks[2]);

    let footer = Paragraph::new("[Q] Quit  [Space] Pause  [←→] Step  [Home/End] Jump  [+/-] Speed")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    f.render_widget(footer, chunks[3]);
}

fn draw_duchy(f: &mut Frame, area: Rect, duchy: &DuchyView) {
    let block = Block::default().borders(Borders::ALL).title(" The Duchy ");
    f.render_widget(block, area);
    let inner = Block::default().borders(Borders::ALL).inner(area);
    let inner_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Length(3),
            Constraint::Min(1),
        ])
        .split(inner);

    let peasant_color = if duchy.peasants < 40 {
        Color::Red
    } else if duchy.peasants < 70 {
        Color::Yellow
    } else {
        Color::Green
    };
    let grain_color = if duchy.grain < 1000 {
        Color::Red
    } else if duchy.grain < 2500 {
        Color::Yellow
    } else {
        Color::White
    };

    let stats = vec![Line::from(vec![
        Span::raw("Peasants: "),
        Span::styled(
            format!("{:3}", duchy.peasants),
            Style::default()
                .fg(peasant_color)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  Land: "),
        Span::styled(format!("{:4} HA", duchy.land), Style::default().fg(Color::White)),
        Span::raw("  Grain: "),
        Span::styled(
            format!("{:5} HL", duchy.grain),
            Style::default().fg(grain_color),
        ),
        Span::raw("  Yield: "),
        Span::styled(duchy.crop_yield.clone(), Style::default().fg(Color::White)),
        Span::raw(if duchy.at_war { "  ⚔ AT WAR" } else { "" }),
    ])];
    f.render_widget(Paragraph::new(stats), inner_chunks[0]);

    let grain_spark = Sparkline::default()
        .block(Block::default().title("Grain over the years"))
        .data(&duchy.grain_history)
        .style(Style::default().fg(Color::Yellow));
    f.render_widget(grain_spark, inner_chunks[1]);

    let peasant_spark = Sparkline::default()
        .block(Block::default().title("Peasants over the years"))
        .data(&duchy.peasant_history)
        .style(Style::default().fg(Color::Green));
    f.render_widget(peasant_spark, inner_chunks[2]);
}
