//! Clip Timeline demo
//!
//! Runs a scripted, headless session: generated clips, streaming notches and a
//! handful of mouse gestures, rendered offscreen with wgpu when an adapter is
//! available and through the recording backend otherwise.

use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use clip_timeline::core::interaction::MouseSample;
use clip_timeline::core::notch_source::{NotchProducer, NotchStore, ProducerConfig};
use clip_timeline::render::{FrameStats, OffscreenTarget, RecordingBackend, WgpuBackend};
use clip_timeline::state::{Binding, NotchMeta, PixelSize, SelectionState, TimelineCoord};
use clip_timeline::timeline::{sample_clips, sample_markers};
use clip_timeline::{Result, TimelineConfig, TimelineViewController};

const VIEW_SIZE: PixelSize = PixelSize::new(1280.0, 720.0);

enum DemoBackend {
    Gpu {
        backend: WgpuBackend,
        target: OffscreenTarget,
    },
    Recording(RecordingBackend),
}

impl DemoBackend {
    fn create() -> Self {
        match WgpuBackend::headless() {
            Ok(backend) => {
                let target = backend.create_target(VIEW_SIZE);
                Self::Gpu { backend, target }
            }
            Err(err) => {
                log::warn!("{}; falling back to the recording backend", err);
                Self::Recording(RecordingBackend::new())
            }
        }
    }

    fn render(
        &mut self,
        controller: &mut TimelineViewController,
        clear: [f64; 4],
    ) -> Result<FrameStats> {
        match self {
            Self::Gpu { backend, target } => {
                let stats = controller.render(backend, target.size)?;
                backend.finish_frame(&target.view, clear);
                Ok(stats)
            }
            Self::Recording(backend) => {
                let stats = controller.render(backend, VIEW_SIZE)?;
                backend.take_draws();
                Ok(stats)
            }
        }
    }
}

fn scripted_samples() -> Vec<MouseSample> {
    let bottom = VIEW_SIZE.height - 1.0;
    vec![
        MouseSample::hover(40.0, bottom),
        // press on clip 0, then scrub
        MouseSample::left(40.0, bottom),
        MouseSample::left(400.0, bottom),
        MouseSample::hover(400.0, bottom),
        // press on empty space above the staircase
        MouseSample::left(10.0, 5.0),
        MouseSample::hover(10.0, 5.0),
        // pan right by dragging left
        MouseSample::right(600.0, 300.0),
        MouseSample::right(400.0, 300.0),
        MouseSample::right(200.0, 300.0),
        MouseSample::hover(200.0, 300.0),
        // zoom out, then in
        MouseSample::scroll(200.0, 300.0, -20.0),
        MouseSample::scroll(200.0, 300.0, 35.0),
        MouseSample::hover(640.0, 360.0),
    ]
}

async fn run(config: TimelineConfig) -> Result<()> {
    let view = Binding::new(config.initial_view_meta());
    let selection = SelectionState::default();
    let store = NotchStore::new();

    let on_empty_click = |coord: TimelineCoord| {
        log::info!("Clicked empty space at ({},{})", coord.x, coord.y);
    };
    let mut controller =
        TimelineViewController::new(view.clone(), selection.clone(), store.clone(), on_empty_click)
            .with_config(&config);

    let clips = sample_clips(100, config.clip_colour());
    controller.sync_clips(&clips);
    controller.sync_markers(&sample_markers(12, 40, config.marker_colour()));
    log::info!("Minimum display height {}px", controller.min_display_height_px());

    let notch_meta = NotchMeta {
        colour: config.notch_colour(),
        notch_row: 0,
        min_width_px: 1.0,
    };
    let producers: Vec<NotchProducer> = clips
        .iter()
        .take(4)
        .map(|clip| {
            NotchProducer::spawn(
                store.clone(),
                clip.id,
                notch_meta,
                ProducerConfig {
                    interval: Duration::from_millis(4),
                    frame_step: 10,
                    max_notches: Some(clip.width as usize / 10),
                    ..ProducerConfig::default()
                },
            )
        })
        .collect();

    let mut backend = DemoBackend::create();
    for sample in scripted_samples() {
        controller.handle_mouse(&sample);
        if controller.poll_view_change() {
            log::debug!("View changed: {:?}", view.get());
        }
        let stats = backend.render(&mut controller, config.clear_colour)?;
        log::info!(
            "{} | {} draws, {} instances",
            controller.overlay_lines().join(" | "),
            stats.draw_calls(),
            stats.instances
        );
        tokio::time::sleep(Duration::from_millis(16)).await;
    }

    for producer in producers {
        let clip = producer.clip();
        let produced = producer.stop().await;
        log::info!("Clip {} received {} notches", clip, produced);
    }
    if let Some(selected) = selection.selected_clip() {
        log::info!("Selected clip {}", selected);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => match TimelineConfig::load(&path) {
            Ok(config) => config,
            Err(err) => {
                log::error!("Failed to load {}: {}", path.display(), err);
                return ExitCode::FAILURE;
            }
        },
        None => TimelineConfig::default(),
    };

    match run(config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{}", err);
            ExitCode::FAILURE
        }
    }
}
