//! Replays recorded pointer samples through a tracing session and writes one
//! JSON object per sample.

use anyhow::{Result, anyhow};
use std::{
    io::{BufRead, Write},
    time::Duration,
};

use shapetrace::backends::NullBackend;
use shapetrace::clock::ManualClock;
use shapetrace::geometry::{DEFAULT_SIMPLIFY_TOLERANCE, Point};
use shapetrace::{FeedbackCoordinator, ShapeFrame, ShapeKind, TracingSession};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Sample {
    Move { point: Point, t_ms: Option<u64> },
    End,
}

/// Parses `x y [t_ms]` (commas or whitespace), `end`, or skips blanks and
/// `#` comments.
pub fn parse_sample(line: &str) -> Result<Option<Sample>> {
    let line = line.split('#').next().unwrap_or("").trim();
    if line.is_empty() {
        return Ok(None);
    }
    if line.eq_ignore_ascii_case("end") {
        return Ok(Some(Sample::End));
    }

    let fields: Vec<&str> = line
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    let (x, y, t) = match fields.as_slice() {
        [x, y] => (x, y, None),
        [x, y, t] => (x, y, Some(t)),
        _ => return Err(anyhow!("expected `x y [t_ms]`, got '{line}'")),
    };
    let x: f64 = x.parse().map_err(|_| anyhow!("bad x coordinate '{x}'"))?;
    let y: f64 = y.parse().map_err(|_| anyhow!("bad y coordinate '{y}'"))?;
    let t_ms = match t {
        Some(t) => Some(t.parse::<u64>().map_err(|_| anyhow!("bad timestamp '{t}'"))?),
        None => None,
    };
    Ok(Some(Sample::Move {
        point: Point::new(x, y),
        t_ms,
    }))
}

pub struct ReplayOptions {
    pub shape: ShapeKind,
    pub frame: ShapeFrame,
    pub cooldown: Duration,
    pub tone: Duration,
    /// Clock step for samples without a timestamp.
    pub interval: Duration,
}

pub fn run<R: BufRead, W: Write>(opts: &ReplayOptions, input: R, mut out: W) -> Result<()> {
    let clock = ManualClock::new();
    let mut feedback = FeedbackCoordinator::new(
        clock.clone(),
        Box::new(NullBackend),
        Box::new(NullBackend),
        Box::new(NullBackend),
    );
    feedback.set_cooldown(opts.cooldown);
    feedback.set_tone_duration(opts.tone);
    let mut session = TracingSession::new(opts.shape, opts.frame, feedback);

    let mut elapsed = Duration::ZERO;
    for (idx, line) in input.lines().enumerate() {
        let line = line?;
        let sample = parse_sample(&line).map_err(|e| anyhow!("line {}: {e}", idx + 1))?;
        match sample {
            None => {}
            Some(Sample::End) => session.end_gesture(),
            Some(Sample::Move { point, t_ms }) => {
                elapsed = match t_ms {
                    Some(t) => Duration::from_millis(t),
                    None => elapsed + opts.interval,
                };
                clock.set_offset(elapsed);

                let step = session.handle_move(point);
                let record = serde_json::json!({
                    "t_ms": elapsed.as_millis() as u64,
                    "x": point.x,
                    "y": point.y,
                    "distance": step.distance,
                    "on_path": step.on_path,
                    "at_vertex": step.at_vertex,
                    "feedback": step.commands,
                    "dispatched": step.dispatched(),
                });
                writeln!(out, "{record}")?;
            }
        }
    }

    let summary = session.summary(DEFAULT_SIMPLIFY_TOLERANCE);
    writeln!(out, "{}", serde_json::json!({ "summary": summary }))?;
    session.finish();
    Ok(())
}
