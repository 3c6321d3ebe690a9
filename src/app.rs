//! App state and render loop: terminal lifecycle, input handling, the
//! poll/compute/format/paint cycle, and the narrow-terminal fallback.

use std::io;
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::{
    event::{self, Event, KeyCode},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Text},
    widgets::Paragraph,
    Terminal,
};
use tokio::time::sleep;

use crate::config::Config;
use crate::metrics::{self, HostMetrics, PrevSample};
use crate::panel::{build_panel_lines, error_panel_lines};
use crate::ps::PsLister;
use crate::remote::SshBridge;
use crate::sampler;

/// Below this panel width the remote column is dropped for the cycle.
const MIN_PANEL_WIDTH: u16 = 40;
const PANEL_GAP: u16 = 2;
const TICK: Duration = Duration::from_millis(500);

const HEADER: &str = "twintop: local + remote host monitor (press q to quit)";
const NARROW_HINT: &str = "Widen terminal for remote panel";

pub struct App {
    bridge: SshBridge,
    lister: PsLister,

    // Previous-sample state, one per host, overwritten every cycle. This is
    // the only mutable state in the program and nothing else reads it.
    prev_local: Option<PrevSample>,
    prev_remote: Option<PrevSample>,

    local: Option<HostMetrics>,
    remote: Result<HostMetrics, String>,

    should_quit: bool,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            bridge: SshBridge::new(config),
            lister: PsLister,
            prev_local: None,
            prev_remote: None,
            local: None,
            remote: Err("no data".to_string()),
            should_quit: false,
        }
    }

    pub async fn run(&mut self) -> anyhow::Result<()> {
        // Terminal setup
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.clear()?;

        let res = self.event_loop(&mut terminal).await;

        // Teardown
        disable_raw_mode()?;
        execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
        terminal.show_cursor()?;

        res
    }

    async fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> anyhow::Result<()> {
        loop {
            // Input (non-blocking)
            while event::poll(Duration::from_millis(10))? {
                if let Event::Key(k) = event::read()? {
                    if matches!(
                        k.code,
                        KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc
                    ) {
                        self.should_quit = true;
                    }
                }
            }
            if self.should_quit {
                break;
            }

            let now = Instant::now();

            let local_raw = sampler::collect_local(&self.lister);
            self.local = Some(metrics::compute(&local_raw, self.prev_local.as_ref(), now));
            self.prev_local = Some(PrevSample::capture(&local_raw, now));

            // A remote failure leaves prev_remote alone; the next success
            // diffs against the older sample over its true elapsed time.
            match self.bridge.sample().await {
                Ok(remote_raw) => {
                    self.remote = Ok(metrics::compute(
                        &remote_raw,
                        self.prev_remote.as_ref(),
                        now,
                    ));
                    self.prev_remote = Some(PrevSample::capture(&remote_raw, now));
                }
                Err(err) => self.remote = Err(err.to_string()),
            }

            terminal.draw(|f| self.draw(f))?;

            sleep(TICK).await;
        }

        Ok(())
    }

    fn draw(&self, f: &mut ratatui::Frame<'_>) {
        let area = f.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(1), // header
                Constraint::Min(5),    // panels
                Constraint::Length(1), // footer
            ])
            .split(area);

        f.render_widget(Paragraph::new(HEADER), rows[0]);

        let col_width = area.width.saturating_sub(PANEL_GAP) / 2;
        let footer = if col_width < MIN_PANEL_WIDTH {
            // Presentational fallback only: the remote host is still polled.
            self.render_local(f, rows[1], rows[1].width as usize);
            NARROW_HINT.to_string()
        } else {
            let cols = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([
                    Constraint::Length(col_width),
                    Constraint::Length(PANEL_GAP),
                    Constraint::Min(0),
                ])
                .split(rows[1]);
            let width = col_width as usize;
            self.render_local(f, cols[0], width);
            let remote_lines = match &self.remote {
                Ok(m) => build_panel_lines(m, "REMOTE", width),
                Err(err) => error_panel_lines("REMOTE", err, width),
            };
            f.render_widget(paragraph(remote_lines), cols[2]);
            format!("Updated: {}", Local::now().format("%H:%M:%S"))
        };
        f.render_widget(Paragraph::new(footer), rows[2]);
    }

    fn render_local(&self, f: &mut ratatui::Frame<'_>, area: Rect, width: usize) {
        let lines = match &self.local {
            Some(m) => build_panel_lines(m, "LOCAL", width),
            None => vec!["LOCAL".to_string()],
        };
        f.render_widget(paragraph(lines), area);
    }
}

fn paragraph(lines: Vec<String>) -> Paragraph<'static> {
    Paragraph::new(Text::from(
        lines.into_iter().map(Line::from).collect::<Vec<_>>(),
    ))
}
