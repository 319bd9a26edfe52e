//! Interval-driven calling.
//!
//! Live sessions usually let the host fire calls automatically every few
//! seconds instead of clicking each one. [`AutoCaller`] runs a small task
//! around [`RoomSession::call_next`] with pause/resume, and stops on its
//! own when the pool runs out or the session goes away.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::RoomSession;

enum CallerCommand {
    Pause,
    Resume,
    Stop,
}

/// Handle to a running auto-call task.
pub struct AutoCaller {
    commands: mpsc::Sender<CallerCommand>,
}

impl AutoCaller {
    /// Starts calling on `session` every `interval`.
    pub fn spawn(session: RoomSession, interval: Duration) -> Self {
        let (tx, rx) = mpsc::channel(8);
        tokio::spawn(run(session, interval, rx));
        Self { commands: tx }
    }

    /// Suspends calling; the schedule resumes from now, not from the
    /// missed ticks.
    pub async fn pause(&self) {
        let _ = self.commands.send(CallerCommand::Pause).await;
    }

    pub async fn resume(&self) {
        let _ = self.commands.send(CallerCommand::Resume).await;
    }

    pub async fn stop(&self) {
        let _ = self.commands.send(CallerCommand::Stop).await;
    }
}

async fn run(
    session: RoomSession,
    interval: Duration,
    mut commands: mpsc::Receiver<CallerCommand>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick of a tokio interval fires immediately; swallow it
    // so the first call lands one full interval after spawn.
    ticker.tick().await;

    let mut paused = false;

    loop {
        tokio::select! {
            _ = ticker.tick(), if !paused => {
                match session.call_next().await {
                    Ok(Some(_)) => {}
                    Ok(None) => {
                        tracing::info!("auto-caller stopping: pool exhausted");
                        break;
                    }
                    Err(_) => {
                        tracing::debug!("auto-caller stopping: session gone");
                        break;
                    }
                }
            }
            cmd = commands.recv() => {
                match cmd {
                    Some(CallerCommand::Pause) => {
                        paused = true;
                        tracing::debug!("auto-caller paused");
                    }
                    Some(CallerCommand::Resume) => {
                        paused = false;
                        ticker.reset();
                        tracing::debug!("auto-caller resumed");
                    }
                    Some(CallerCommand::Stop) | None => break,
                }
            }
        }
    }
}
