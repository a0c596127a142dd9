//! The playback controller thread.
//!
//! A fixed-interval crossbeam ticker drives scheduler ticks; a command
//! channel delivers on-demand triggers (play, pause, seek, rate,
//! visibility). Force stop bypasses the queue entirely through the shared
//! [`ForceStop`] signal, so it pre-empts even an in-flight tick. The cpal
//! graph is constructed inside the thread (output streams are not `Send`).

use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossbeam_channel::{unbounded, Sender};
use framecut_audio::{AudioGraph, AudioScheduler, BufferCache, ForceStop, SharedClock};
use framecut_core::Result;
use framecut_timeline::Project;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{info, warn};

/// On-demand playback triggers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackCommand {
    Play,
    Pause,
    Seek(f64),
    SetRate(f64),
    /// Tab visibility / window focus changed.
    Visibility(bool),
    Shutdown,
}

/// Owns the scheduler thread.
pub struct PlaybackController {
    commands: Sender<PlaybackCommand>,
    clock: SharedClock,
    force_stop: ForceStop,
    thread: Option<JoinHandle<()>>,
}

impl PlaybackController {
    /// Spawn the scheduler thread. `graph_factory` runs on that thread.
    pub fn spawn(
        project: Arc<RwLock<Project>>,
        clock: SharedClock,
        cache: Arc<BufferCache>,
        graph_factory: impl FnOnce() -> Result<Box<dyn AudioGraph>> + Send + 'static,
        tick_interval: Duration,
    ) -> Self {
        let (commands, command_rx) = unbounded::<PlaybackCommand>();
        let force_stop = ForceStop::new();
        let thread_force_stop = force_stop.clone();
        let thread_clock = clock.clone();

        let thread = std::thread::spawn(move || {
            let graph = match graph_factory() {
                Ok(graph) => graph,
                Err(e) => {
                    warn!("audio graph unavailable, playback is silent: {e}");
                    return;
                }
            };
            let mut scheduler = AudioScheduler::new(graph, cache);
            scheduler.use_force_stop(thread_force_stop);
            {
                let project = project.read();
                scheduler.observe(project.bus().subscribe());
            }

            let ticker = crossbeam_channel::tick(tick_interval);
            info!("playback thread started");

            let run_tick = |scheduler: &mut AudioScheduler| {
                let now = Instant::now();
                let snapshot = {
                    let mut clock = thread_clock.lock();
                    clock.advance(now);
                    clock.snapshot()
                };
                let (tracks, clips) = {
                    let project = project.read();
                    (project.tracks.clone(), project.clips.clone())
                };
                scheduler.tick(&tracks, &clips, snapshot, now);
            };

            loop {
                crossbeam_channel::select! {
                    recv(ticker) -> _ => run_tick(&mut scheduler),
                    recv(command_rx) -> command => {
                        let command = match command {
                            Ok(command) => command,
                            Err(_) => break,
                        };
                        match command {
                            PlaybackCommand::Play => {
                                thread_clock.lock().play(Instant::now());
                            }
                            PlaybackCommand::Pause => {
                                thread_clock.lock().pause();
                            }
                            PlaybackCommand::Seek(time) => {
                                thread_clock.lock().seek(time);
                            }
                            PlaybackCommand::SetRate(rate) => {
                                thread_clock.lock().set_rate(rate);
                            }
                            PlaybackCommand::Visibility(foreground) => {
                                scheduler.set_foreground(foreground);
                            }
                            PlaybackCommand::Shutdown => break,
                        }
                        run_tick(&mut scheduler);
                    }
                }
            }

            scheduler.stop_all();
            info!("playback thread stopped");
        });

        Self {
            commands,
            clock,
            force_stop,
            thread: Some(thread),
        }
    }

    pub fn send(&self, command: PlaybackCommand) {
        let _ = self.commands.send(command);
    }

    /// Synchronous stop: raised immediately, honored mid-tick.
    pub fn force_stop(&self) {
        self.force_stop.raise();
        let _ = self.commands.send(PlaybackCommand::Pause);
    }

    pub fn clock(&self) -> SharedClock {
        self.clock.clone()
    }
}

impl Drop for PlaybackController {
    fn drop(&mut self) {
        let _ = self.commands.send(PlaybackCommand::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
