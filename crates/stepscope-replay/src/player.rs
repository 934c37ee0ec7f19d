//! Timer-driven playback on a tokio task.
//!
//! The [`Player`] task owns a [`ReplayController`]. Handles talk to it over a
//! command channel and observe it through a `watch` channel, so the replay
//! position is written in exactly one place.
//!
//! The advance timer is a `sleep_until` branch of the task's `select!` and is
//! only armed while playing. Any transition out of playing (pause, step,
//! reload, reaching the end) drops it, and dropping the [`Player`] aborts the
//! task, so no tick can land after teardown.

use std::sync::Arc;
use std::time::Duration;

use stepscope_trace::Trace;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep_until, Instant};
use tracing::{debug, trace};

use crate::controller::{ReplayController, ReplayStatus, Tick};
use crate::error::{Error, Result};

/// Configuration for a player.
#[derive(Debug, Clone)]
pub struct PlayerConfig {
    /// Time between advances at 1x speed.
    pub base_interval: Duration,
    /// Capacity of the command channel.
    pub command_buffer: usize,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(500),
            command_buffer: 32,
        }
    }
}

impl PlayerConfig {
    /// Set the interval between advances at 1x speed.
    #[must_use]
    pub fn with_base_interval(mut self, interval: Duration) -> Self {
        self.base_interval = interval;
        self
    }

    /// Set the command channel capacity.
    #[must_use]
    pub fn with_command_buffer(mut self, capacity: usize) -> Self {
        self.command_buffer = capacity.max(1);
        self
    }
}

#[derive(Debug)]
enum Op {
    Load(Arc<Trace>),
    Clear,
    Play,
    Pause,
    StepForward,
    StepBackward,
    Seek(i64),
    SetSpeed(f64),
}

struct Command {
    op: Op,
    reply: oneshot::Sender<Result<ReplayStatus>>,
}

/// Handle to a running playback task.
pub struct Player {
    commands: mpsc::Sender<Command>,
    status: watch::Receiver<ReplayStatus>,
    task: Option<JoinHandle<()>>,
}

impl Player {
    /// Spawn the playback task on the current tokio runtime.
    pub fn spawn(config: PlayerConfig) -> Self {
        let controller = ReplayController::new();
        let (status_tx, status_rx) = watch::channel(ReplayStatus::from(&controller));
        let (command_tx, command_rx) = mpsc::channel(config.command_buffer.max(1));

        let task = tokio::spawn(run(controller, config, command_rx, status_tx));

        Self {
            commands: command_tx,
            status: status_rx,
            task: Some(task),
        }
    }

    /// Latest published status.
    pub fn status(&self) -> ReplayStatus {
        self.status.borrow().clone()
    }

    /// A receiver that sees every status change.
    pub fn subscribe(&self) -> watch::Receiver<ReplayStatus> {
        self.status.clone()
    }

    /// Install a trace; stops playback and rewinds to the first step.
    pub async fn load_trace(&self, trace: impl Into<Arc<Trace>>) -> Result<ReplayStatus> {
        self.request(Op::Load(trace.into())).await
    }

    /// Drop the loaded trace.
    pub async fn clear(&self) -> Result<ReplayStatus> {
        self.request(Op::Clear).await
    }

    pub async fn play(&self) -> Result<ReplayStatus> {
        self.request(Op::Play).await
    }

    pub async fn pause(&self) -> Result<ReplayStatus> {
        self.request(Op::Pause).await
    }

    pub async fn step_forward(&self) -> Result<ReplayStatus> {
        self.request(Op::StepForward).await
    }

    pub async fn step_backward(&self) -> Result<ReplayStatus> {
        self.request(Op::StepBackward).await
    }

    pub async fn seek(&self, index: i64) -> Result<ReplayStatus> {
        self.request(Op::Seek(index)).await
    }

    /// Change the speed multiplier. While playing, the next advance is
    /// rescheduled from the previous one.
    pub async fn set_speed(&self, multiplier: f64) -> Result<ReplayStatus> {
        self.request(Op::SetSpeed(multiplier)).await
    }

    /// Wait until playback is no longer running.
    pub async fn wait_until_paused(&self) -> Result<ReplayStatus> {
        let mut rx = self.status.clone();
        let status = rx
            .wait_for(|s| !s.is_playing())
            .await
            .map_err(|_| Error::PlayerClosed)?;
        Ok(status.clone())
    }

    /// Stop the task and wait for it to exit.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        debug!("player shut down");
    }

    async fn request(&self, op: Op) -> Result<ReplayStatus> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(Command { op, reply })
            .await
            .map_err(|_| Error::PlayerClosed)?;
        response.await.map_err(|_| Error::PlayerClosed)?
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run(
    mut controller: ReplayController,
    config: PlayerConfig,
    mut commands: mpsc::Receiver<Command>,
    status: watch::Sender<ReplayStatus>,
) {
    let mut last_advance = Instant::now();

    loop {
        let deadline = if controller.is_playing() {
            last_advance.checked_add(controller.speed().interval(config.base_interval))
        } else {
            None
        };

        tokio::select! {
            command = commands.recv() => {
                let Some(Command { op, reply }) = command else {
                    break;
                };
                let was_playing = controller.is_playing();
                let restarts_clock = matches!(op, Op::Seek(_));

                let result = apply(&mut controller, op);
                if controller.is_playing() && (!was_playing || restarts_clock) {
                    last_advance = Instant::now();
                }

                let snapshot = ReplayStatus::from(&controller);
                status.send_replace(snapshot.clone());
                let _ = reply.send(result.map(|()| snapshot));
            }
            _ = wait_for(deadline) => {
                match controller.tick() {
                    Ok(Tick::Advanced(index)) => trace!(index, "advanced"),
                    Ok(Tick::Finished(index)) => debug!(index, "reached last step"),
                    Ok(Tick::Idle) | Err(_) => {}
                }
                // Schedule from the previous deadline so intervals do not drift.
                if let Some(deadline) = deadline {
                    last_advance = deadline;
                }
                status.send_replace(ReplayStatus::from(&controller));
            }
        }
    }

    trace!("player task exiting");
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn apply(controller: &mut ReplayController, op: Op) -> Result<()> {
    match op {
        Op::Load(trace) => {
            controller.load_trace(trace);
            Ok(())
        }
        Op::Clear => {
            controller.clear();
            Ok(())
        }
        Op::Play => controller.play().map(drop),
        Op::Pause => controller.pause(),
        Op::StepForward => controller.step_forward().map(drop),
        Op::StepBackward => controller.step_backward().map(drop),
        Op::Seek(index) => controller.seek(index).map(drop),
        Op::SetSpeed(multiplier) => controller.set_speed(multiplier),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::ReplayState;
    use stepscope_trace::{Payload, Step, StepKind};
    use tokio::time::sleep;
    use tokio_test::{assert_err, assert_ok};

    const BASE: Duration = Duration::from_millis(100);

    fn make_trace(len: usize) -> Trace {
        let steps = (0..len)
            .map(|i| {
                let kind = match i {
                    0 => StepKind::Start,
                    i if i == len - 1 => StepKind::Finish,
                    _ => StepKind::Visit,
                };
                Step::new(kind, Payload::new(), format!("step {}", i))
            })
            .collect::<Vec<_>>();
        Trace::try_from(steps).unwrap()
    }

    fn spawn() -> Player {
        Player::spawn(PlayerConfig::default().with_base_interval(BASE))
    }

    #[tokio::test(start_paused = true)]
    async fn rejects_playback_without_trace() {
        let player = spawn();
        assert_eq!(player.play().await, Err(Error::NoTrace));
        assert_eq!(player.step_forward().await, Err(Error::NoTrace));
        assert_eq!(player.status().state, ReplayState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn plays_to_the_end_and_pauses() {
        let player = spawn();
        assert_ok!(player.load_trace(make_trace(5)).await);

        let started = Instant::now();
        let status = assert_ok!(player.play().await);
        assert!(status.is_playing());

        let status = assert_ok!(player.wait_until_paused().await);
        assert_eq!(status.current_index, 4);
        assert_eq!(status.state, ReplayState::Paused);
        assert_eq!(status.kind, Some(StepKind::Finish));
        assert_eq!(started.elapsed(), BASE * 4);

        // Stays at the end
        sleep(BASE * 10).await;
        assert_eq!(player.status().current_index, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn pause_stops_the_timer() {
        let player = spawn();
        assert_ok!(player.load_trace(make_trace(10)).await);
        assert_ok!(player.play().await);

        sleep(Duration::from_millis(250)).await;
        let status = assert_ok!(player.pause().await);
        assert_eq!(status.current_index, 2);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(player.status().current_index, 2);
        assert!(!player.status().is_playing());
    }

    #[tokio::test(start_paused = true)]
    async fn speed_change_keeps_elapsed_time() {
        let player = spawn();
        assert_ok!(player.load_trace(make_trace(10)).await);
        assert_ok!(player.play().await);

        // One advance at 100ms, 50ms into the next interval
        sleep(Duration::from_millis(150)).await;
        assert_eq!(player.status().current_index, 1);

        // At 2x the next advance is due 50ms after the last one, i.e. now
        assert_ok!(player.set_speed(2.0).await);
        sleep(Duration::from_millis(60)).await;
        assert_eq!(player.status().current_index, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_speed_is_rejected() {
        let player = spawn();
        assert_err!(player.set_speed(0.0).await);
        assert_eq!(player.status().speed, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn extreme_speeds_keep_the_task_alive() {
        let player = spawn();
        assert_ok!(player.load_trace(make_trace(5)).await);

        assert_eq!(player.set_speed(1e-300).await, Err(Error::InvalidSpeed(1e-300)));
        assert_eq!(player.set_speed(1e300).await, Err(Error::InvalidSpeed(1e300)));
        assert_ok!(player.play().await);

        sleep(Duration::from_millis(150)).await;
        let status = assert_ok!(player.pause().await);
        assert_eq!(status.current_index, 1);
        assert_eq!(status.speed, 1.0);
    }

    #[tokio::test(start_paused = true)]
    async fn stepping_while_playing_pauses() {
        let player = spawn();
        assert_ok!(player.load_trace(make_trace(10)).await);
        assert_ok!(player.play().await);

        let status = assert_ok!(player.step_forward().await);
        assert_eq!(status.current_index, 1);
        assert_eq!(status.state, ReplayState::Paused);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(player.status().current_index, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn reload_mid_play_cancels_timer() {
        let player = spawn();
        assert_ok!(player.load_trace(make_trace(10)).await);
        assert_ok!(player.play().await);
        sleep(Duration::from_millis(350)).await;

        let status = assert_ok!(player.load_trace(make_trace(4)).await);
        assert_eq!(status.current_index, 0);
        assert_eq!(status.total_steps, 4);
        assert_eq!(status.state, ReplayState::Paused);

        sleep(Duration::from_secs(1)).await;
        assert_eq!(player.status().current_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn seek_while_playing_keeps_playing() {
        let player = spawn();
        assert_ok!(player.load_trace(make_trace(10)).await);
        assert_ok!(player.play().await);

        let status = assert_ok!(player.seek(6).await);
        assert!(status.is_playing());

        sleep(Duration::from_millis(150)).await;
        assert_eq!(player.status().current_index, 7);

        let status = assert_ok!(player.seek(-3).await);
        assert_eq!(status.current_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_task() {
        let player = spawn();
        assert_ok!(player.load_trace(make_trace(10)).await);
        assert_ok!(player.play().await);

        let rx = player.subscribe();
        drop(player);
        sleep(Duration::from_secs(2)).await;

        assert!(rx.has_changed().is_err());
        assert_eq!(rx.borrow().current_index, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_waits_for_exit() {
        let player = spawn();
        assert_ok!(player.load_trace(make_trace(3)).await);
        let rx = player.subscribe();
        player.shutdown().await;
        assert!(rx.has_changed().is_err());
    }
}
