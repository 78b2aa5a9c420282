//! Live session driving the engine from a camera feed
//!
//! A session runs two independent periodic tasks:
//! - **Inference** - asks the [`PoseSource`] for a new estimate at its own
//!   cadence and publishes it to the latest-snapshot slot. Each estimate is
//!   awaited before the next tick is taken, so at most one call is ever in
//!   flight; slow estimates cause ticks to be skipped, never queued.
//! - **Render** - once per display refresh, runs the gesture pipeline on
//!   any newly published snapshot, steers the simulator, advances it, and
//!   hands the position buffer to the [`FrameSink`].
//!
//! The tasks share nothing but the snapshot slot and the shutdown signal.
//! The wrist history lives in the render task's pipeline and the particle
//! arena in its simulator. [`Session::shutdown`] stops both tasks, waits for
//! them to finish, releases the capture resource and disposes the simulator.

pub mod snapshot;

pub use snapshot::{snapshot_slot, PoseSnapshot, SnapshotPublisher, SnapshotReader};

use crate::core_types::{EffectParamsUpdate, GestureLabel, HandPose, Vec2};
use crate::error::SessionError;
use crate::gesture::{CoordinateSpace, GesturePipeline, GestureReading};
use crate::simulation::{MaterialState, ParticleSimulator, SimulationStats};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info};

/// Longest measured frame step handed to the simulator (seconds)
///
/// A render stall longer than this is integrated as a single capped step.
pub const MAX_FRAME_DT: f32 = 0.1;

/// Step between two render ticks; the first frame gets zero
fn frame_dt(last: Option<Instant>, now: Instant) -> f32 {
    last.map_or(0.0, |prev| {
        now.saturating_duration_since(prev)
            .as_secs_f32()
            .min(MAX_FRAME_DT)
    })
}

/// External hand-pose producer (camera plus estimation model)
#[async_trait]
pub trait PoseSource: Send + 'static {
    /// Estimate the hand in the most recent camera frame
    ///
    /// Failures are reported as `None`, the same as "no hand".
    async fn estimate(&mut self) -> Option<HandPose>;

    /// Release the capture device and model
    async fn release(&mut self) {}
}

/// One rendered frame handed to the external renderer
#[derive(Debug, Clone, Copy)]
pub struct RenderFrame<'a> {
    pub positions: &'a [[f32; 3]],
    pub material: MaterialState,
    pub gesture: GestureLabel,
    /// Normalized target in `[0, 1]`
    pub target: Vec2,
    /// Frame step passed to the simulator
    pub dt: f32,
}

/// External consumer of particle positions
pub trait FrameSink: Send + 'static {
    fn present(&mut self, frame: &RenderFrame<'_>);
}

impl<F> FrameSink for F
where
    F: FnMut(&RenderFrame<'_>) + Send + 'static,
{
    fn present(&mut self, frame: &RenderFrame<'_>) {
        self(frame);
    }
}

/// Sink that discards every frame
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl FrameSink for NullSink {
    fn present(&mut self, _frame: &RenderFrame<'_>) {}
}

/// Session cadence and producer conventions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Render ticks per second
    pub render_hz: f32,
    /// Inference ticks per second
    pub inference_hz: f32,
    pub coordinate_space: CoordinateSpace,
    /// Mirror the target horizontally for a front-facing camera
    pub mirror_x: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            render_hz: 60.0,
            inference_hz: 15.0,
            coordinate_space: CoordinateSpace::Normalized,
            mirror_x: true,
        }
    }
}

impl SessionConfig {
    fn period(hz: f32) -> Duration {
        let hz = if hz.is_finite() { hz.clamp(1.0, 1000.0) } else { 60.0 };
        Duration::from_secs_f64(1.0 / f64::from(hz))
    }

    pub fn render_period(&self) -> Duration {
        Self::period(self.render_hz)
    }

    pub fn inference_period(&self) -> Duration {
        Self::period(self.inference_hz)
    }

    fn pipeline(&self) -> GesturePipeline {
        let pipeline = GesturePipeline::new(self.coordinate_space);
        if self.mirror_x {
            pipeline
        } else {
            pipeline.without_mirror()
        }
    }
}

/// Summary returned by [`Session::shutdown`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub frames: u64,
    pub inferences: u64,
    /// Simulator statistics captured just before disposal
    pub stats: SimulationStats,
    pub last_reading: GestureReading,
}

/// State owned by the render task
struct RenderContext<K> {
    simulator: ParticleSimulator,
    pipeline: GesturePipeline,
    reader: SnapshotReader,
    controls: mpsc::UnboundedReceiver<EffectParamsUpdate>,
    sink: K,
    reading: GestureReading,
    last_frame: Option<Instant>,
    frames: u64,
}

struct RenderOutcome {
    frames: u64,
    stats: SimulationStats,
    last_reading: GestureReading,
}

impl<K: FrameSink> RenderContext<K> {
    fn tick(&mut self, now: Instant) {
        while let Ok(update) = self.controls.try_recv() {
            self.simulator.set_effect_params(update);
        }

        if let Some(snapshot) = self.reader.take_fresh() {
            self.reading = self
                .pipeline
                .observe(snapshot.timestamp, snapshot.pose.as_ref());
        }

        match self.reading.target {
            Some(target) => self
                .simulator
                .set_target(target.x, target.y, Some(self.reading.label)),
            None => {
                let held = self.simulator.normalized_target();
                self.simulator.set_target(held.x, held.y, None);
            }
        }

        let dt = frame_dt(self.last_frame, now);
        self.last_frame = Some(now);
        self.simulator.update(dt);

        self.sink.present(&RenderFrame {
            positions: self.simulator.positions(),
            material: self.simulator.material(),
            gesture: self.simulator.gesture(),
            target: self.simulator.normalized_target(),
            dt,
        });
        self.frames += 1;
    }

    fn finish(mut self) -> RenderOutcome {
        let stats = self.simulator.stats();
        self.simulator.dispose();
        RenderOutcome {
            frames: self.frames,
            stats,
            last_reading: self.reading,
        }
    }
}

/// State owned by the inference task
struct InferenceContext<S> {
    source: S,
    publisher: SnapshotPublisher,
    started: Instant,
    inferences: u64,
}

async fn render_loop<K: FrameSink>(
    mut ctx: RenderContext<K>,
    mut shutdown: watch::Receiver<bool>,
    period: Duration,
) -> RenderOutcome {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        let now = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            now = ticker.tick() => now,
        };
        ctx.tick(now);
    }

    debug!("Render task stopped after {} frames", ctx.frames);
    ctx.finish()
}

async fn inference_loop<S: PoseSource>(
    mut ctx: InferenceContext<S>,
    mut shutdown: watch::Receiver<bool>,
    period: Duration,
) -> u64 {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {}
        }

        let pose = tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            pose = ctx.source.estimate() => pose,
        };
        let timestamp = ctx.started.elapsed().as_secs_f64();
        ctx.publisher.publish(timestamp, pose);
        ctx.inferences += 1;
    }

    ctx.source.release().await;
    debug!("Inference task stopped after {} estimates", ctx.inferences);
    ctx.inferences
}

/// Handle to a running session
///
/// Must be started from within a tokio runtime.
pub struct Session {
    shutdown: watch::Sender<bool>,
    controls: mpsc::UnboundedSender<EffectParamsUpdate>,
    observer: SnapshotReader,
    render: JoinHandle<RenderOutcome>,
    inference: JoinHandle<u64>,
}

impl Session {
    /// Spawn the render and inference tasks
    ///
    /// The session takes ownership of the simulator, the pose source and
    /// the sink until [`Session::shutdown`].
    pub fn start<S, K>(
        config: SessionConfig,
        simulator: ParticleSimulator,
        source: S,
        sink: K,
    ) -> Self
    where
        S: PoseSource,
        K: FrameSink,
    {
        info!(
            "Starting session: render {:.0} Hz, inference {:.0} Hz, {} particles",
            config.render_hz,
            config.inference_hz,
            simulator.len()
        );

        let (shutdown, shutdown_rx) = watch::channel(false);
        let (controls, controls_rx) = mpsc::unbounded_channel();
        let (publisher, reader) = snapshot_slot();
        let observer = publisher.subscribe();
        let started = Instant::now();

        let render_ctx = RenderContext {
            simulator,
            pipeline: config.pipeline(),
            reader,
            controls: controls_rx,
            sink,
            reading: GestureReading::absent(),
            last_frame: None,
            frames: 0,
        };
        let inference_ctx = InferenceContext {
            source,
            publisher,
            started,
            inferences: 0,
        };

        let render = tokio::spawn(render_loop(
            render_ctx,
            shutdown_rx.clone(),
            config.render_period(),
        ));
        let inference = tokio::spawn(inference_loop(
            inference_ctx,
            shutdown_rx,
            config.inference_period(),
        ));

        Self {
            shutdown,
            controls,
            observer,
            render,
            inference,
        }
    }

    /// Queue a settings update for the next render tick
    ///
    /// Returns `false` if the render task has already stopped.
    pub fn set_effect_params(&self, update: EffectParamsUpdate) -> bool {
        self.controls.send(update).is_ok()
    }

    /// Most recently published pose snapshot
    pub fn latest_snapshot(&self) -> Option<Arc<PoseSnapshot>> {
        self.observer.latest()
    }

    /// Stop both tasks and wait for them to finish
    ///
    /// No render or inference callback runs after this returns.
    pub async fn shutdown(self) -> Result<SessionReport, SessionError> {
        self.shutdown.send_replace(true);

        let inferences = self
            .inference
            .await
            .map_err(|source| SessionError::TaskFailed {
                task: "inference",
                source,
            })?;
        let render = self
            .render
            .await
            .map_err(|source| SessionError::TaskFailed {
                task: "render",
                source,
            })?;

        info!(
            "Session stopped: {} frames, {} estimates",
            render.frames, inferences
        );
        Ok(SessionReport {
            frames: render.frames,
            inferences,
            stats: render.stats,
            last_reading: render.last_reading,
        })
    }
}
