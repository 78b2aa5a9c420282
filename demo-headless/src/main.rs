use async_trait::async_trait;
use clap::Parser;
use gesture_particles_core::core_types::landmark::{FINGERTIPS, INDEX_TIP, LANDMARK_COUNT, THUMB_TIP};
use gesture_particles_core::core_types::validate_intensity;
use gesture_particles_core::{
    EffectParams, EffectStyle, GestureLabel, HandPose, ParticleSimulator,
    PerformanceMode, PoseSource, RenderFrame, Rgb, Session, SessionConfig, SimulatorOptions, Vec3,
};
use std::time::Duration;
use tokio::time::Instant;
use tracing_subscriber::EnvFilter;

/// Headless gesture particle demo driven by a scripted hand
#[derive(Parser, Debug)]
#[command(name = "gesture-particles-demo")]
#[command(about = "Gesture-steered particle simulation without a camera or window", long_about = None)]
struct Args {
    /// Run duration in seconds
    #[arg(short, long, default_value_t = 15.0)]
    duration: f32,

    /// Effect intensity (0-1)
    #[arg(short, long, default_value_t = 0.7, value_parser = parse_intensity)]
    intensity: f32,

    /// Effect style (trail, swirl, burst, blended)
    #[arg(short, long, default_value_t = EffectStyle::Blended)]
    style: EffectStyle,

    /// Performance mode (low, balanced, high)
    #[arg(short, long, default_value_t = PerformanceMode::Balanced)]
    mode: PerformanceMode,

    /// Particle color as #rrggbb
    #[arg(short, long, default_value_t = Rgb::default())]
    color: Rgb,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Render ticks per second
    #[arg(long, default_value_t = 60.0)]
    render_hz: f32,

    /// Pose estimates per second
    #[arg(long, default_value_t = 15.0)]
    inference_hz: f32,

    /// Seconds spent in each scripted gesture phase
    #[arg(long, default_value_t = 3.0)]
    phase: f32,

    /// Simulated estimation latency in milliseconds
    #[arg(long, default_value_t = 30)]
    latency_ms: u64,
}

fn parse_intensity(s: &str) -> Result<f32, String> {
    let value: f32 = s.parse().map_err(|e: std::num::ParseFloatError| e.to_string())?;
    validate_intensity(value).map_err(|e| e.to_string())
}

/// Scripted phases played by the synthetic hand
const SCRIPT: [Phase; 5] = [Phase::Open, Phase::Wave, Phase::Fist, Phase::Pinch, Phase::Absent];

#[derive(Debug, Clone, Copy)]
enum Phase {
    Open,
    Wave,
    Fist,
    Pinch,
    Absent,
}

/// Hand with the wrist at `(x, 0.65)` and fingertips `reach` above it
fn hand(wrist_x: f32, reach: f32) -> HandPose {
    let wrist = Vec3::new(wrist_x, 0.65, 0.0);
    let mut points = vec![wrist; LANDMARK_COUNT];
    for &tip in &FINGERTIPS {
        points[tip] = wrist - Vec3::new(0.0, reach, 0.0);
    }
    HandPose::new(points)
}

fn pinching_hand(wrist_x: f32) -> HandPose {
    let mut pose = hand(wrist_x, 0.16).landmarks().to_vec();
    let tip = pose[INDEX_TIP];
    pose[THUMB_TIP] = tip - Vec3::new(0.01, 0.0, 0.0);
    HandPose::new(pose)
}

/// Pose source replaying a fixed gesture script instead of a camera
struct ScriptedHand {
    started: Instant,
    phase_secs: f32,
    latency: Duration,
}

impl ScriptedHand {
    fn phase_at(&self, t: f32) -> Phase {
        let index = (t / self.phase_secs) as usize % SCRIPT.len();
        SCRIPT[index]
    }
}

#[async_trait]
impl PoseSource for ScriptedHand {
    async fn estimate(&mut self) -> Option<HandPose> {
        tokio::time::sleep(self.latency).await;

        let t = self.started.elapsed().as_secs_f32();
        let drift = 0.5 + 0.1 * (t * 0.5).sin();
        match self.phase_at(t) {
            Phase::Open => Some(hand(drift, 0.3)),
            // 1.5 Hz swing with 0.4 of travel
            Phase::Wave => Some(hand(0.5 + 0.2 * (t * 3.0 * std::f32::consts::PI).sin(), 0.3)),
            Phase::Fist => Some(hand(drift, 0.05)),
            Phase::Pinch => Some(pinching_hand(drift)),
            Phase::Absent => None,
        }
    }

    async fn release(&mut self) {
        tracing::info!("Scripted hand released");
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    println!("=== Gesture Particles Demo ===\n");

    let params = EffectParams {
        intensity: args.intensity,
        color: args.color,
        effect_style: args.style,
        performance_mode: args.mode,
    };
    let simulator = ParticleSimulator::with_options(params, SimulatorOptions { seed: args.seed });
    println!(
        "Created simulator with {} particles ({} mode, {} style, color {})",
        simulator.len(),
        args.mode,
        args.style,
        args.color
    );

    let config = SessionConfig {
        render_hz: args.render_hz,
        inference_hz: args.inference_hz,
        ..SessionConfig::default()
    };
    let source = ScriptedHand {
        started: Instant::now(),
        phase_secs: args.phase.max(0.5),
        latency: Duration::from_millis(args.latency_ms),
    };

    let report_every = args.render_hz.max(1.0) as u64;
    let mut frames = 0_u64;
    let mut last_gesture = GestureLabel::Idle;
    let sink = move |frame: &RenderFrame<'_>| {
        frames += 1;
        if frame.gesture != last_gesture {
            println!(
                "[frame {:>5}] gesture {:<5} -> {:<5} target ({:.2}, {:.2})",
                frames, last_gesture, frame.gesture, frame.target.x, frame.target.y
            );
            last_gesture = frame.gesture;
        }
        if frames % report_every == 0 {
            tracing::debug!(
                "frame {}: size {:.3}, opacity {:.2}, dt {:.4}",
                frames,
                frame.material.size,
                frame.material.opacity,
                frame.dt
            );
        }
    };

    let session = Session::start(config, simulator, source, sink);
    tokio::time::sleep(Duration::from_secs_f32(args.duration.clamp(0.0, 86_400.0))).await;

    match session.shutdown().await {
        Ok(report) => {
            println!("\n=== Session Report ===");
            println!("Frames rendered:   {}", report.frames);
            println!("Pose estimates:    {}", report.inferences);
            println!("Particles:         {}", report.stats.particle_count);
            println!("Simulated time:    {:.2}s", report.stats.elapsed);
            println!(
                "Final gesture:     {} ({} style)",
                report.stats.gesture, report.stats.style
            );
        }
        Err(err) => {
            tracing::error!("Session failed: {}", err);
            std::process::exit(1);
        }
    }
}
