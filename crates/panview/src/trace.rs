#![forbid(unsafe_code)]

//! Input traces and their deterministic replay.
//!
//! A trace is JSON lines, one timestamped input per line:
//!
//! ```text
//! {"t_ms": 0,   "input": "engine", "signal": "load_finished", "success": true}
//! {"t_ms": 100, "input": "press", "x": 400, "y": 300}
//! {"t_ms": 250, "input": "release", "x": 400, "y": 300}
//! {"t_ms": 900, "input": "wheel", "x": 400, "y": 300, "steps": 2}
//! ```
//!
//! Blank lines and lines starting with `#` are skipped. Timestamps must not
//! go backwards.
//!
//! [`replay`] drives a [`Shell`] over [`StaticPage`]s with a virtual clock.
//! Inputs land at their timestamps, frames tick every [`FRAME_MS`] in
//! between, and a settle period at the end lets pending timers fire. If the
//! shell has no window yet, one is opened over the page first. Every shell
//! event is written as one JSON line tagged with the time it surfaced.

use std::io::Write;

use panview_core::{Duration, Instant, PointF, PointerEvent, PointerKind};
use panview_web::{EngineSignal, PageDescription, StaticPage};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ShellError};
use crate::shell::{Shell, ShellEvent};

/// Virtual frame interval.
pub const FRAME_MS: u64 = 16;

/// Time simulated after the last input.
pub const SETTLE_MS: u64 = 3000;

/// One line of a trace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    pub t_ms: u64,
    #[serde(flatten)]
    pub input: TraceInput,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "input", rename_all = "snake_case")]
pub enum TraceInput {
    Press { x: f64, y: f64 },
    Move { x: f64, y: f64 },
    Release { x: f64, y: f64 },
    DoubleClick { x: f64, y: f64 },
    Wheel { x: f64, y: f64, steps: f64 },
    /// Delivered to the active window.
    Engine(EngineSignal),
    /// Open another window over the trace's page.
    Open,
    Close { window: usize },
    Select { window: usize },
    Home,
    Toolbar { visible: bool },
    Fullscreen { enabled: bool },
}

/// Parse a whole trace, reporting the first bad line (1-based).
pub fn parse_trace(text: &str) -> Result<Vec<TraceRecord>> {
    let mut records: Vec<TraceRecord> = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let record: TraceRecord =
            serde_json::from_str(line).map_err(|e| ShellError::trace(line_no, e.to_string()))?;
        if let Some(prev) = records.last().filter(|prev| record.t_ms < prev.t_ms) {
            return Err(ShellError::trace(
                line_no,
                format!("timestamp {} ms goes back from {} ms", record.t_ms, prev.t_ms),
            ));
        }
        records.push(record);
    }
    Ok(records)
}

/// What a replay did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReplaySummary {
    pub inputs: usize,
    pub frames: usize,
    pub events: usize,
    /// Virtual time at which the replay stopped.
    pub end_ms: u64,
}

#[derive(Serialize)]
struct OutputLine<'a> {
    t_ms: u64,
    #[serde(flatten)]
    event: &'a ShellEvent,
}

struct Replayer<'a, W> {
    shell: &'a mut Shell<StaticPage>,
    page: &'a PageDescription,
    base: Instant,
    clock: u64,
    out: W,
    summary: ReplaySummary,
}

impl<W: Write> Replayer<'_, W> {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.clock)
    }

    fn advance_to(&mut self, t_ms: u64) -> Result<()> {
        while self.clock + FRAME_MS < t_ms {
            self.clock += FRAME_MS;
            self.shell.tick(self.now());
            self.summary.frames += 1;
            self.flush()?;
        }
        self.clock = self.clock.max(t_ms);
        Ok(())
    }

    fn apply(&mut self, input: &TraceInput) -> Result<()> {
        let now = self.now();
        let pointer = |kind, x, y| PointerEvent::new(kind, PointF::new(x, y), now);
        match *input {
            TraceInput::Press { x, y } => {
                self.shell.handle_pointer(&pointer(PointerKind::Press, x, y), now);
            }
            TraceInput::Move { x, y } => {
                self.shell.handle_pointer(&pointer(PointerKind::Move, x, y), now);
            }
            TraceInput::Release { x, y } => {
                self.shell.handle_pointer(&pointer(PointerKind::Release, x, y), now);
            }
            TraceInput::DoubleClick { x, y } => {
                self.shell
                    .handle_pointer(&pointer(PointerKind::DoubleClick, x, y), now);
            }
            TraceInput::Wheel { x, y, steps } => {
                self.shell.handle_wheel(steps, PointF::new(x, y), now);
            }
            TraceInput::Engine(ref signal) => {
                let Some(index) = self.shell.active_index() else {
                    tracing::warn!(target: "panview.shell", "engine signal with no active window");
                    return Ok(());
                };
                if let Some(engine) = self
                    .shell
                    .window_mut(index)
                    .and_then(|w| w.view_mut().viewport_mut().engine_mut())
                {
                    engine.apply_signal(signal);
                }
                self.shell.handle_engine_signal(index, signal, now)?;
            }
            TraceInput::Open => self.open_window(),
            TraceInput::Close { window } => {
                self.shell.close_window(window)?;
            }
            TraceInput::Select { window } => self.shell.select_window(window)?,
            TraceInput::Home => self.shell.show_home(),
            TraceInput::Toolbar { visible } => self.shell.set_toolbar_visible(visible),
            TraceInput::Fullscreen { enabled } => self.shell.set_fullscreen(enabled),
        }
        self.summary.inputs += 1;
        Ok(())
    }

    /// Open a window over a fresh copy of the page, fitted to width as a
    /// finished load would leave it.
    fn open_window(&mut self) {
        let now = self.now();
        let index = self
            .shell
            .open_window(StaticPage::new(self.page.clone()), now);
        if let Some(window) = self.shell.window_mut(index) {
            window.view_mut().viewport_mut().fit_to_width();
        }
    }

    /// Write out pending events. A home-grid request for a new window is
    /// answered with another copy of the page.
    fn flush(&mut self) -> Result<()> {
        let events = self.shell.drain_events();
        let mut open = false;
        for event in &events {
            open |= *event == ShellEvent::NewWindowRequested;
            serde_json::to_writer(
                &mut self.out,
                &OutputLine {
                    t_ms: self.clock,
                    event,
                },
            )?;
            self.out.write_all(b"\n")?;
        }
        self.summary.events += events.len();
        if open {
            self.open_window();
            self.flush()?;
        }
        Ok(())
    }
}

/// Replay `records` against `shell`, writing events to `out`.
pub fn replay<W: Write>(
    shell: &mut Shell<StaticPage>,
    page: &PageDescription,
    records: &[TraceRecord],
    base: Instant,
    out: W,
) -> Result<ReplaySummary> {
    let mut replayer = Replayer {
        shell,
        page,
        base,
        clock: 0,
        out,
        summary: ReplaySummary::default(),
    };
    let _span = tracing::debug_span!(target: "panview.shell", "replay", records = records.len())
        .entered();
    if replayer.shell.window_count() == 0 {
        replayer.open_window();
    }
    replayer.flush()?;
    for record in records {
        replayer.advance_to(record.t_ms)?;
        replayer.apply(&record.input)?;
        replayer.flush()?;
    }
    let end = replayer.clock + SETTLE_MS;
    replayer.advance_to(end)?;
    replayer.summary.end_ms = replayer.clock;
    replayer.out.flush()?;
    Ok(replayer.summary)
}
