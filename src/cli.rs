use anyhow::{Result, anyhow};
use pico_args::Arguments;
use std::{
    env, fs,
    io::{self, BufReader},
    path::{Path, PathBuf},
    time::Duration,
};

use shapetrace::config::{self, Profile};
use shapetrace::feedback;
use shapetrace::{PathTracker, Point, ShapeFrame, ShapeKind};

use crate::input;
use crate::live::{self, LiveOptions};
use crate::replay::{self, ReplayOptions};

/// Options shared by the subcommands; pulled out before the free arguments.
struct Opts {
    profile: Option<PathBuf>,
    size: Option<f64>,
    center: Option<Point>,
    width: Option<f64>,
    height: Option<f64>,
    input: Option<PathBuf>,
    device: Option<String>,
    interval_ms: Option<u64>,
}

fn parse_point(s: &str) -> Result<Point, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse().map_err(|_| format!("bad x in '{s}'"))?;
    let y = y.trim().parse().map_err(|_| format!("bad y in '{s}'"))?;
    Ok(Point::new(x, y))
}

impl Opts {
    fn from_args(pargs: &mut Arguments) -> Result<Self> {
        Ok(Self {
            profile: pargs.opt_value_from_str("--profile")?,
            size: pargs.opt_value_from_str("--size")?,
            center: pargs.opt_value_from_fn("--center", parse_point)?,
            width: pargs.opt_value_from_str("--width")?,
            height: pargs.opt_value_from_str("--height")?,
            input: pargs.opt_value_from_str("--input")?,
            device: pargs.opt_value_from_str("--device")?,
            interval_ms: pargs.opt_value_from_str("--interval-ms")?,
        })
    }

    fn load_profile(&self) -> Result<(PathBuf, Profile)> {
        match &self.profile {
            Some(p) => Ok((p.clone(), Profile::load(p)?)),
            None => Profile::load_or_install_default(),
        }
    }

    /// Explicit `--size` wins; otherwise the shape is fitted to the surface
    /// given by `--width/--height` or the profile.
    fn frame(&self, shape: ShapeKind, profile: &Profile) -> ShapeFrame {
        let fitted = match (self.width, self.height) {
            (None, None) => profile.frame_for(shape),
            (w, h) => ShapeFrame::fit(
                shape,
                w.unwrap_or(profile.surface.width),
                h.unwrap_or(profile.surface.height),
            ),
        };
        match self.size {
            Some(size) => ShapeFrame::new(self.center.unwrap_or(fitted.center), size),
            None => ShapeFrame::new(self.center.unwrap_or(fitted.center), fitted.size),
        }
    }
}

fn shape_arg(pargs: &mut Arguments, usage: &str, fallback: Option<ShapeKind>) -> Result<ShapeKind> {
    match pargs.opt_free_from_str::<String>()? {
        Some(s) => Ok(s.parse()?),
        None => fallback.ok_or_else(|| anyhow!("usage: {usage}")),
    }
}

pub fn run() -> Result<()> {
    let mut pargs = Arguments::from_env();

    // No args -> general help
    if env::args().len() == 1 {
        print_help();
        return Ok(());
    }

    if pargs.contains("-h") || pargs.contains("--help") {
        print_help();
        return Ok(());
    }

    let opts = Opts::from_args(&mut pargs)?;
    let subcmd: Option<String> = pargs.opt_free_from_str()?;

    match subcmd.as_deref() {
        Some("help") => {
            let topic: Option<String> = pargs.opt_free_from_str()?;
            match topic {
                Some(t) => print_subcmd_help(&t),
                None => print_help(),
            }
            Ok(())
        }

        Some("shapes") => {
            let list: Vec<_> = ShapeKind::ALL
                .iter()
                .map(|k| {
                    serde_json::json!({
                        "shape": k,
                        "name": k.name(),
                        "tolerance": k.tolerance(),
                        "vertex_tolerance": k.vertex_tolerance(),
                        "description": k.accessibility_description(),
                    })
                })
                .collect();
            print_response(&serde_json::json!({ "ok": true, "data": list }));
            Ok(())
        }

        Some("check") => {
            let usage = "shapetrace check <shape> <x> <y>";
            let shape = shape_arg(&mut pargs, usage, None)?;
            let x: f64 = pargs.free_from_str().map_err(|_| anyhow!("usage: {usage}"))?;
            let y: f64 = pargs.free_from_str().map_err(|_| anyhow!("usage: {usage}"))?;
            let (_, profile) = opts.load_profile()?;
            let frame = opts.frame(shape, &profile);

            let mut tracker = PathTracker::with_frame(shape, frame);
            let p = Point::new(x, y);
            let distance = tracker.distance_to_path(p);
            let state = tracker.update_position(p);
            print_response(&serde_json::json!({
                "ok": true,
                "data": {
                    "shape": shape,
                    "frame": frame,
                    "point": p,
                    "distance": distance,
                    "on_path": state.is_on_path,
                    "at_vertex": state.is_at_vertex,
                    "feedback": feedback::decide(state),
                }
            }));
            Ok(())
        }

        Some("trace") => {
            let (_, profile) = opts.load_profile()?;
            let shape = shape_arg(
                &mut pargs,
                "shapetrace trace <shape> [--input FILE]",
                Some(profile.session.shape),
            )?;
            let replay_opts = ReplayOptions {
                shape,
                frame: opts.frame(shape, &profile),
                cooldown: profile.cooldown(),
                tone: profile.tone_duration(),
                interval: Duration::from_millis(opts.interval_ms.unwrap_or(16)),
            };
            let stdout = io::stdout().lock();
            match &opts.input {
                Some(path) if path != Path::new("-") => {
                    let f = fs::File::open(path)
                        .map_err(|e| anyhow!("failed to open {}: {e}", path.display()))?;
                    replay::run(&replay_opts, BufReader::new(f), stdout)
                }
                _ => replay::run(&replay_opts, io::stdin().lock(), stdout),
            }
        }

        Some("live") => {
            let (profile_path, profile) = opts.load_profile()?;
            let shape = shape_arg(
                &mut pargs,
                "shapetrace live <shape> [--device PATH]",
                Some(profile.session.shape),
            )?;
            live::run(LiveOptions {
                shape,
                frame: opts.frame(shape, &profile),
                device: opts.device.clone(),
                profile_path,
                profile,
            })
        }

        Some("doctor") => {
            print_response(&serde_json::json!({ "ok": true, "data": doctor_report(&opts) }));
            Ok(())
        }

        Some(other) => {
            eprintln!("unknown subcommand: {other}\n");
            print_help();
            Ok(())
        }

        None => {
            print_help();
            Ok(())
        }
    }
}

fn doctor_report(opts: &Opts) -> serde_json::Value {
    let profile_path = match &opts.profile {
        Some(p) => Some(p.clone()),
        None => config::default_profile_path().ok(),
    };
    let profile_status = match &profile_path {
        Some(p) if p.exists() => match Profile::load(p) {
            Ok(prof) => format!("ok ({})", prof.name()),
            Err(e) => format!("invalid: {e}"),
        },
        Some(_) => "missing (installed on first run)".to_string(),
        None => "no home directory".to_string(),
    };
    let devices: Vec<_> = input::discover_touch_devices()
        .into_iter()
        .map(|d| {
            serde_json::json!({
                "path": d.path,
                "name": d.name,
                "multitouch": d.multitouch,
            })
        })
        .collect();

    serde_json::json!({
        "profile": profile_path,
        "profile_status": profile_status,
        "input_group_member": check_in_input_group(),
        "devices": devices,
        "hints": {
            "add_user_to_input_group": "sudo usermod -aG input $USER && newgrp input"
        }
    })
}

fn check_in_input_group() -> bool {
    let Ok(s) = fs::read_to_string("/etc/group") else {
        return false;
    };
    let user = whoami::username();
    s.lines()
        .filter(|line| line.starts_with("input:"))
        .any(|line| {
            line.split(':')
                .nth(3)
                .unwrap_or("")
                .split(',')
                .any(|u| u == user)
        })
}

fn print_help() {
    println!(
        r#"shapetrace — trace circles, squares and cubes with on-path feedback

USAGE:
  shapetrace help [command]                  Show general or command-specific help
  shapetrace shapes                          List shapes and their tolerances
  shapetrace check <shape> <x> <y>           Classify a single point
  shapetrace trace [shape] [--input FILE]    Replay pointer samples as JSON lines
  shapetrace live [shape] [--device PATH]    Trace with a touch device
  shapetrace doctor                          Diagnose profile and input devices

FRAME OPTIONS:
  --size S --center X,Y                      Place the shape explicitly
  --width W --height H                       Fit the shape into a W x H surface

GLOBAL:
  --profile FILE                             Use FILE instead of the default profile

TIPS:
  - Profile: ~/.config/shapetrace/profile.toml
  - Shapes: circle, square, cube3d (or cube)
"#
    );
}

fn print_subcmd_help(cmd: &str) {
    match cmd {
        "shapes" => println!("usage: shapetrace shapes\nLists shapes, tolerances and vertex tolerances."),
        "check" => println!(
            "usage: shapetrace check <shape> <x> <y> [--size S] [--center X,Y] [--width W --height H]\nReports distance to the outline, on-path and vertex flags, and the feedback that would fire."
        ),
        "trace" => println!(
            "usage: shapetrace trace [shape] [--input FILE] [--interval-ms N]\nReads `x y [t_ms]` lines (stdin by default; `end` marks a lifted finger).\nSamples without a timestamp advance the clock by N ms (default 16)."
        ),
        "live" => println!(
            "usage: shapetrace live [shape] [--device PATH]\nTraces with the first touch device (or PATH); feedback goes to the log.\nEdits to the profile's [feedback] section apply immediately."
        ),
        "doctor" => println!(
            "usage: shapetrace doctor\nChecks the profile, input group membership and lists touch devices."
        ),
        _ => {
            eprintln!("unknown command: {cmd}\n");
            print_help();
        }
    }
}

fn print_response(v: &serde_json::Value) {
    println!("{}", serde_json::to_string_pretty(v).unwrap_or_default());
}
