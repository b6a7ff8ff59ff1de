//! Player — the interactive terminal front end.
//!
//! Maps key presses to intents, schedules animation steps at the reader's
//! frame interval and writes rasterized frames to the terminal. All page
//! logic lives in the engine; the player only decides *when* to step.

mod menubar;

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use crossterm::{cursor, event, execute, queue, style, terminal};
use tracing::info;

use crate::config::{Keymap, any_matches};
use crate::engine::animator::Step;
use crate::engine::{Intent, Reader};
use crate::renderer::{CellCanvas, CellMetrics, Renderer};
use crate::types::{Cell, Color, Frame, NamedColor};

use menubar::print_menu_item;

/// Rows reserved above the canvas for the menu bar.
const CANVAS_OFFSET: u16 = 1;

/// How long to block on input while no page is turning.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct Player {
    reader: Reader,
    keymap: Keymap,
    canvas: CellCanvas,
    /// What is currently on screen, for diffing.
    shown: Option<Vec<Vec<Cell>>>,
    fullscreen: bool,
}

enum Flow {
    Continue,
    Quit,
}

impl Player {
    pub fn new(reader: Reader, keymap: Keymap, cell: CellMetrics) -> Self {
        let contract = cell.contract_for(reader.geometry());
        Self {
            reader,
            keymap,
            canvas: CellCanvas::new(contract, cell),
            shown: None,
            fullscreen: false,
        }
    }

    /// Run the reader in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        let contract = self.canvas.contract();
        // +2: one row for menu bar, one row for status bar
        if term_w < contract.width || term_h < contract.height + 2 {
            bail!(
                "Terminal too small: need {}x{}, have {}x{}",
                contract.width,
                contract.height + 2,
                term_w,
                term_h,
            );
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.reader.draw(&mut self.canvas);
        self.render_menubar(stdout)?;
        self.present(stdout)?;
        self.render_status(stdout)?;

        let mut next_frame: Option<Instant> = None;

        loop {
            // Frame interval is the only suspension point; input that arrives
            // meanwhile is still read, and dropped by the reader if a turn is
            // in flight.
            let timeout = match next_frame {
                Some(at) => at.saturating_duration_since(Instant::now()),
                None => IDLE_POLL,
            };

            if event::poll(timeout)? {
                if let Flow::Quit = self.handle_event(stdout, event::read()?)? {
                    break;
                }
                if next_frame.is_none() && self.reader.current_view().animating {
                    next_frame = Some(Instant::now());
                }
            }

            if let Some(at) = next_frame {
                if Instant::now() >= at {
                    let step = self.reader.step(&mut self.canvas);
                    self.present(stdout)?;
                    next_frame = match step {
                        Step::Continue => Some(at + self.reader.frame_interval()),
                        Step::Done { .. } | Step::Idle => {
                            self.render_status(stdout)?;
                            None
                        }
                    };
                }
            }
        }

        info!(page = self.reader.current_view().page, "reader closed");
        Ok(())
    }

    fn handle_event(&mut self, stdout: &mut io::Stdout, ev: event::Event) -> Result<Flow> {
        match ev {
            event::Event::Key(key) if key.kind == event::KeyEventKind::Press => {
                let km = &self.keymap;
                if any_matches(&km.quit, &key) {
                    return Ok(Flow::Quit);
                } else if any_matches(&km.next, &key) {
                    if self.reader.handle_intent(Intent::TurnNext) {
                        self.render_status(stdout)?;
                    }
                } else if any_matches(&km.prev, &key) {
                    if self.reader.handle_intent(Intent::TurnPrev) {
                        self.render_status(stdout)?;
                    }
                } else if any_matches(&km.fullscreen, &key) {
                    self.fullscreen = !self.fullscreen;
                    if self.fullscreen {
                        stdout.write_all(b"\x1b[10;1t")?;
                    } else {
                        stdout.write_all(b"\x1b[10;0t")?;
                    }
                    stdout.flush()?;
                }
            }
            event::Event::Resize(_, _) => {
                execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                self.shown = None;
                self.render_menubar(stdout)?;
                self.present(stdout)?;
                self.render_status(stdout)?;
            }
            _ => {}
        }
        Ok(Flow::Continue)
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render_menubar(&self, stdout: &mut io::Stdout) -> Result<()> {
        let items: &[&str] = &["[←] prev page", "[→][Space] next page", "[q][Esc] quit", "[F11] full"];

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(" "),
        )?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                queue!(stdout, style::Print("  "))?;
            }
            print_menu_item(stdout, item)?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Write whatever changed on the canvas since the last call.
    fn present(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        match Renderer::frame(self.shown.as_deref(), self.canvas.grid()) {
            Frame::Full { cells } => {
                for (y, row) in cells.iter().enumerate() {
                    queue!(stdout, cursor::MoveTo(0, y as u16 + CANVAS_OFFSET))?;
                    for cell in row {
                        queue!(stdout, style::PrintStyledContent(styled(cell)))?;
                    }
                }
            }
            Frame::Diff { changes } => {
                for change in changes {
                    queue!(
                        stdout,
                        cursor::MoveTo(change.x, change.y + CANVAS_OFFSET),
                        style::PrintStyledContent(styled(&change.cell)),
                    )?;
                }
            }
        }
        stdout.flush()?;
        self.shown = Some(self.canvas.grid().to_vec());
        Ok(())
    }

    fn render_status(&self, stdout: &mut io::Stdout) -> Result<()> {
        let status_y = self.canvas.contract().height + CANVAS_OFFSET;
        let (_, term_h) = terminal::size()?;
        if status_y >= term_h {
            return Ok(()); // No room for status bar.
        }

        let view = self.reader.current_view();
        let page = if view.page == 0 {
            "Cover".to_string()
        } else {
            format!("Page {}/{}", view.page, view.last_page)
        };
        let turning = if view.animating { " | turning…" } else { "" };
        let status = format!(" {page}{turning} | \u{2190}\u{2192}: turn | q: quit ");

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, status_y),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Style conversion
// ---------------------------------------------------------------------------

fn styled(cell: &Cell) -> style::StyledContent<char> {
    let mut cs = style::ContentStyle::default();
    cs.foreground_color = cell.fg.map(to_ct_color);
    cs.background_color = cell.bg.map(to_ct_color);
    style::StyledContent::new(cs, cell.ch)
}

pub fn to_ct_color(c: Color) -> style::Color {
    match c {
        Color::Named(NamedColor::Black) => style::Color::Black,
        Color::Named(NamedColor::White) => style::Color::White,
        Color::Rgb { r, g, b } => style::Color::Rgb { r, g, b },
    }
}
