//! Terminal event abstraction for the preview.
//!
//! Two background tasks feed one channel: a blocking reader that forwards
//! crossterm input, and a frame clock that emits [`AppEvent::Frame`] at a
//! fixed cadence.  Frames keep flowing while input streams in, so throttled
//! pipelines and timers advance during a long scroll.

use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};
use tokio::sync::mpsc;

/// High-level events consumed by the preview loop.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    /// Animation-frame tick.
    Frame,
}

/// How long the input reader blocks before checking whether the receiver is
/// still alive.
const INPUT_POLL: Duration = Duration::from_millis(50);

/// Spawn the input reader and frame clock; both stop once the returned
/// receiver is dropped.
pub fn spawn_event_reader(frame_interval: Duration) -> mpsc::UnboundedReceiver<AppEvent> {
    let (tx, rx) = mpsc::unbounded_channel();

    let input_tx = tx.clone();
    tokio::task::spawn_blocking(move || loop {
        if input_tx.is_closed() {
            break;
        }
        match event::poll(INPUT_POLL) {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                tracing::warn!(%err, "terminal poll failed, stopping input reader");
                break;
            }
        }
        let app_event = match event::read() {
            Ok(CtEvent::Key(k)) => AppEvent::Key(k),
            Ok(CtEvent::Mouse(m)) => AppEvent::Mouse(m),
            Ok(CtEvent::Resize(w, h)) => AppEvent::Resize(w, h),
            Ok(_) => continue,
            Err(err) => {
                tracing::debug!(%err, "dropping unreadable terminal event");
                continue;
            }
        };
        if input_tx.send(app_event).is_err() {
            break;
        }
    });

    tokio::spawn(async move {
        let mut clock = tokio::time::interval(frame_interval);
        clock.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            clock.tick().await;
            if tx.send(AppEvent::Frame).is_err() {
                break;
            }
        }
    });

    rx
}
