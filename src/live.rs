use anyhow::{Result, anyhow};
use log::{debug, error, info, warn};
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::{
    path::{Path, PathBuf},
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
        mpsc,
    },
    thread,
    time::Duration,
};

use evdev::{AbsoluteAxisCode, Device, EventType, KeyCode, SynchronizationCode};
use signal_hook::consts::{SIGINT, SIGTERM};

use shapetrace::config::Profile;
use shapetrace::{FeedbackCoordinator, ShapeFrame, ShapeKind, TracingSession};

use crate::input::{self, AxisMapper, ContactState};

pub struct LiveOptions {
    pub shape: ShapeKind,
    pub frame: ShapeFrame,
    pub device: Option<String>,
    pub profile_path: PathBuf,
    pub profile: Profile,
}

fn open_device(requested: Option<&str>) -> Result<Device> {
    let path = match requested {
        Some(p) => p.to_string(),
        None => {
            let devices = input::discover_touch_devices();
            let first = devices
                .into_iter()
                .next()
                .ok_or_else(|| anyhow!("no touch devices detected; try `shapetrace doctor`"))?;
            info!("live: using {} ({})", first.name, first.path);
            first.path
        }
    };
    let dev = Device::open(&path).map_err(|e| anyhow!("failed to open {path}: {e}"))?;
    dev.set_nonblocking(true)?;
    Ok(dev)
}

fn watch_profile(
    path: &Path,
    tx: mpsc::Sender<notify::Result<Event>>,
) -> Result<RecommendedWatcher> {
    let mut watcher = notify::recommended_watcher(tx)?;
    // editors replace the file, so watch its directory
    let dir = path.parent().unwrap_or(Path::new("."));
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    Ok(watcher)
}

fn touches_profile(ev: &Event, path: &Path) -> bool {
    matches!(ev.kind, EventKind::Modify(_) | EventKind::Create(_))
        && ev.paths.iter().any(|p| p.file_name() == path.file_name())
}

pub fn run(opts: LiveOptions) -> Result<()> {
    let LiveOptions {
        shape,
        frame,
        device,
        profile_path,
        profile,
    } = opts;

    let term = Arc::new(AtomicBool::new(false));
    signal_hook::flag::register(SIGINT, Arc::clone(&term))?;
    signal_hook::flag::register(SIGTERM, Arc::clone(&term))?;

    let (tx, rx) = mpsc::channel();
    let _watcher = match watch_profile(&profile_path, tx) {
        Ok(w) => Some(w),
        Err(e) => {
            warn!("live: profile hot-reload unavailable: {e}");
            None
        }
    };

    let mut dev = open_device(device.as_deref())?;
    let mapper = AxisMapper::new(profile.input, &profile.surface);

    let mut session = TracingSession::new(shape, frame, FeedbackCoordinator::logging());
    profile.apply_to_session(&mut session);
    info!("live: profile '{}', press Ctrl-C to stop", profile.name());

    let mut contact = ContactState::default();
    // only the first contact traces; other fingers are ignored
    let mut slot: i32 = 0;

    while !term.load(Ordering::Relaxed) {
        while let Ok(res) = rx.try_recv() {
            match res {
                Ok(ev) if touches_profile(&ev, &profile_path) => match Profile::load(&profile_path) {
                    Ok(p) => {
                        p.apply_to_session(&mut session);
                        info!("live: feedback settings reloaded from '{}'", p.name());
                    }
                    Err(e) => error!("live: reload failed, keeping last good profile: {e}"),
                },
                Ok(_) => {}
                Err(e) => warn!("live: watch error: {e}"),
            }
        }

        let mut any_event = false;
        if let Ok(events) = dev.fetch_events() {
            for ev in events {
                any_event = true;
                let (ty, code, value) = (ev.event_type(), ev.code(), ev.value());

                if ty == EventType::ABSOLUTE {
                    if code == AbsoluteAxisCode::ABS_MT_SLOT.0 {
                        slot = value;
                    } else if slot != 0 {
                        continue;
                    } else if code == AbsoluteAxisCode::ABS_MT_TRACKING_ID.0 {
                        if value < 0 {
                            if contact.end() {
                                session.end_gesture();
                            }
                        } else {
                            contact.begin();
                        }
                    } else if code == AbsoluteAxisCode::ABS_MT_POSITION_X.0
                        || code == AbsoluteAxisCode::ABS_X.0
                    {
                        contact.set_x(mapper.x(value));
                    } else if code == AbsoluteAxisCode::ABS_MT_POSITION_Y.0
                        || code == AbsoluteAxisCode::ABS_Y.0
                    {
                        contact.set_y(mapper.y(value));
                    }
                } else if ty == EventType::KEY && code == KeyCode::BTN_TOUCH.0 {
                    if value == 0 {
                        if contact.end() {
                            session.end_gesture();
                        }
                    } else {
                        contact.begin();
                    }
                } else if ty == EventType::SYNCHRONIZATION && code == SynchronizationCode::SYN_REPORT.0 {
                    if let Some(p) = contact.take_sample() {
                        let step = session.handle_move(p);
                        debug!(
                            "live: ({:.1}, {:.1}) on_path={} at_vertex={}",
                            p.x, p.y, step.on_path, step.at_vertex
                        );
                    }
                }
            }
        }

        if !any_event {
            thread::sleep(Duration::from_millis(4));
        }
    }

    let summary = session.summary(shapetrace::geometry::DEFAULT_SIMPLIFY_TOLERANCE);
    info!(
        "live: stopped; {} samples, {} on path, {:.0} px traced",
        summary.samples, summary.on_path_samples, summary.path_length
    );
    session.finish();
    Ok(())
}
