use std::io::stdout;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind},
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame, Terminal,
};

use mousespeed_core::{PreferenceValue, SettingStore, Severity, SpeedController};

/// Which control Enter/Space acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Focus {
    Slider,
    Apply,
    Reset,
}

impl Focus {
    fn next(self) -> Self {
        match self {
            Focus::Slider => Focus::Apply,
            Focus::Apply => Focus::Reset,
            Focus::Reset => Focus::Slider,
        }
    }

    fn prev(self) -> Self {
        match self {
            Focus::Slider => Focus::Reset,
            Focus::Apply => Focus::Slider,
            Focus::Reset => Focus::Apply,
        }
    }
}

struct Panel<'a, S> {
    controller: &'a mut SpeedController<S>,
    /// Store description shown in the title bar
    title: String,
    focus: Focus,
    should_quit: bool,
    show_help: bool,
}

impl<'a, S: SettingStore> Panel<'a, S> {
    fn new(controller: &'a mut SpeedController<S>) -> Self {
        let title = controller.store().describe();
        Self {
            controller,
            title,
            focus: Focus::Slider,
            should_quit: false,
            show_help: false,
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.show_help {
            // Any key dismisses help
            self.show_help = false;
            return;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Char('?') => self.show_help = true,
            KeyCode::Left | KeyCode::Char('h') => self.controller.nudge(-1),
            KeyCode::Right | KeyCode::Char('l') => self.controller.nudge(1),
            KeyCode::Home => self.controller.edit(PreferenceValue::MIN),
            KeyCode::End => self.controller.edit(PreferenceValue::MAX),
            KeyCode::Char('0') => self.controller.edit(PreferenceValue::DEFAULT.get()),
            KeyCode::Char('a') => self.controller.apply(),
            KeyCode::Char('r') => self.controller.reset(),
            KeyCode::Tab => self.focus = self.focus.next(),
            KeyCode::BackTab => self.focus = self.focus.prev(),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate(),
            _ => {}
        }
    }

    fn activate(&mut self) {
        match self.focus {
            Focus::Slider | Focus::Apply => self.controller.apply(),
            Focus::Reset => self.controller.reset(),
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let chunks = Layout::vertical([
            Constraint::Length(1),
            Constraint::Min(11),
            Constraint::Length(1),
        ])
        .split(area);

        self.draw_title(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);

        if self.show_help {
            self.draw_help(frame, area);
        }
    }

    fn draw_title(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" mousespeed: {} ", self.title);
        let para = Paragraph::new(Line::from(vec![Span::styled(
            title,
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )]))
        .style(Style::default().bg(Color::Cyan));
        frame.render_widget(para, area);
    }

    fn draw_body(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Mouse Speed Setting ")
            .title_alignment(Alignment::Center)
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            );
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let rows = Layout::vertical([
            Constraint::Length(1), // current value
            Constraint::Length(1),
            Constraint::Length(1), // slider
            Constraint::Length(2), // end labels
            Constraint::Length(1),
            Constraint::Length(1), // buttons
            Constraint::Length(1),
            Constraint::Length(1), // status
        ])
        .split(inner);

        self.draw_value(frame, rows[0]);
        self.draw_slider(frame, rows[2]);
        self.draw_end_labels(frame, rows[3]);
        self.draw_buttons(frame, rows[5]);
        self.draw_status(frame, rows[7]);
    }

    fn draw_value(&self, frame: &mut Frame, area: Rect) {
        let mut spans = vec![Span::styled(
            format!("Current: {}", self.controller.pending()),
            Style::default().fg(Color::White).add_modifier(Modifier::BOLD),
        )];
        if self.controller.is_dirty() {
            spans.push(Span::styled("  (modified)", Style::default().fg(Color::Yellow)));
        }
        let para = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
        frame.render_widget(para, area);
    }

    fn draw_slider(&self, frame: &mut Frame, area: Rect) {
        let width = (area.width as usize).saturating_sub(2);
        let track = slider_track(self.controller.pending(), width);
        let marker_style = if self.focus == Focus::Slider {
            Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::White)
        };

        let spans: Vec<Span> = track
            .chars()
            .map(|ch| {
                if ch == MARKER {
                    Span::styled(ch.to_string(), marker_style)
                } else {
                    Span::styled(ch.to_string(), Style::default().fg(Color::DarkGray))
                }
            })
            .collect();
        let para = Paragraph::new(Line::from(spans)).alignment(Alignment::Center);
        frame.render_widget(para, area);
    }

    fn draw_end_labels(&self, frame: &mut Frame, area: Rect) {
        let halves = Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .split(area);
        let style = Style::default().fg(Color::Gray);
        let left = Paragraph::new(vec![
            Line::from(Span::styled(format!(" {:.1}", PreferenceValue::MIN), style)),
            Line::from(Span::styled(" (Slower)", style)),
        ]);
        let right = Paragraph::new(vec![
            Line::from(Span::styled(format!("{:.1} ", PreferenceValue::MAX), style)),
            Line::from(Span::styled("(Faster) ", style)),
        ])
        .alignment(Alignment::Right);
        frame.render_widget(left, halves[0]);
        frame.render_widget(right, halves[1]);
    }

    fn draw_buttons(&self, frame: &mut Frame, area: Rect) {
        let button = |label: &'static str, focus: Focus| {
            let style = if self.focus == focus {
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::White)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            };
            Span::styled(format!("[ {} ]", label), style)
        };
        let line = Line::from(vec![
            button("Apply Setting", Focus::Apply),
            Span::raw("   "),
            button("Reset to 0", Focus::Reset),
        ]);
        frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
    }

    fn draw_status(&self, frame: &mut Frame, area: Rect) {
        let status = self.controller.status();
        let color = match status.severity() {
            Severity::Info => Color::Blue,
            Severity::Success => Color::Green,
            Severity::Error => Color::Red,
        };
        let para = Paragraph::new(Span::styled(status.message(), Style::default().fg(color)))
            .alignment(Alignment::Center);
        frame.render_widget(para, area);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let text = " ←/→ adjust  Tab focus  a apply  r reset  ?: help  q quit ";
        let para = Paragraph::new(Line::from(vec![Span::styled(
            text,
            Style::default().fg(Color::Black).bg(Color::DarkGray),
        )]))
        .style(Style::default().bg(Color::DarkGray));
        frame.render_widget(para, area);
    }

    fn draw_help(&self, frame: &mut Frame, area: Rect) {
        let help_lines = [
            "",
            "  Slider",
            "  ------",
            "  arrows / h l      Slower / faster by 0.1",
            "  Home / End        -1.0 / 1.0",
            "  0                 Center (not applied)",
            "",
            "  Actions",
            "  -------",
            "  a                 Apply setting",
            "  r                 Reset to 0 and apply",
            "  Tab / Shift+Tab   Move focus",
            "  Enter / Space     Press focused control",
            "",
            "  General",
            "  -------",
            "  q / Esc           Quit",
            "  ?                 Toggle this help",
            "",
        ];
        let help_width: u16 = 48;
        let help_height: u16 = help_lines.len() as u16 + 2;

        let x = area.width.saturating_sub(help_width) / 2;
        let y = area.height.saturating_sub(help_height) / 2;
        let popup = Rect::new(
            area.x + x,
            area.y + y,
            help_width.min(area.width),
            help_height.min(area.height),
        );

        let lines: Vec<Line> = help_lines
            .iter()
            .map(|s| Line::from(Span::styled(*s, Style::default().fg(Color::White))))
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan))
            .title(" Keybindings ")
            .title_style(
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
            .style(Style::default().bg(Color::Black));

        frame.render_widget(Clear, popup);
        let para = Paragraph::new(lines).block(block);
        frame.render_widget(para, popup);
    }
}

const MARKER: char = '●';
const TICK: char = '┼';
const RAIL: char = '─';

/// Slider track `width` columns wide: a tick per notch, the marker on the
/// notch nearest `value`. Out-of-range values sit at the matching end.
fn slider_track(value: PreferenceValue, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let last_notch = PreferenceValue::notch_count() - 1;
    let column = |notch: usize| notch * (width - 1) / last_notch;

    let mut cells = vec![RAIL; width];
    for notch in 0..=last_notch {
        cells[column(notch)] = TICK;
    }
    cells[column(value.notch())] = MARKER;
    cells.into_iter().collect()
}

/// Run the interactive panel until the user quits.
pub fn run<S: SettingStore>(controller: &mut SpeedController<S>) -> Result<(), String> {
    let panel = Panel::new(controller);
    run_app(panel)
}

fn run_app<S: SettingStore>(mut panel: Panel<'_, S>) -> Result<(), String> {
    terminal::enable_raw_mode()
        .map_err(|e| format!("failed to enable raw mode: {}", e))?;
    stdout()
        .execute(EnterAlternateScreen)
        .map_err(|e| format!("failed to enter alternate screen: {}", e))?;

    struct Cleanup;
    impl Drop for Cleanup {
        fn drop(&mut self) {
            let _ = stdout().execute(LeaveAlternateScreen);
            let _ = terminal::disable_raw_mode();
        }
    }
    let _cleanup = Cleanup;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| format!("failed to create terminal: {}", e))?;

    loop {
        terminal
            .draw(|frame| panel.draw(frame))
            .map_err(|e| format!("draw error: {}", e))?;

        if event::poll(Duration::from_millis(100))
            .map_err(|e| format!("event poll error: {}", e))?
        {
            if let Event::Key(key) =
                event::read().map_err(|e| format!("event read error: {}", e))?
            {
                panel.handle_key(key);
            }
        }

        if panel.should_quit {
            break;
        }
    }

    Ok(())
}
