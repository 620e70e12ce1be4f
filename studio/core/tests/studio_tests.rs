//! Session-level tests for the studio orchestrator.
//!
//! These drive [`Studio`] the way a surface does: send [`SurfaceEvent`]s,
//! poll the in-flight generation, and fold the resulting
//! [`StudioMessage`]s.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use tokio::sync::{mpsc, Notify};

use studio_core::{
    Coordinates, NotifyLevel, PosterEngine, ProgressSink, Radius, RenderError, RenderJob,
    ResolveError, StudioConfig, StudioMessage, StudioState, SurfaceEvent, ThemeColors, ThemeConfig,
    ThemeError, ThemeId,
};
use studio_core::{GenerationRequest, Studio};

// ============================================================================
// Stub Engine
// ============================================================================

#[derive(Default)]
struct StubEngine {
    fail_resolve: bool,
    /// When set, render blocks until the test opens the gate.
    gate: Option<Arc<Notify>>,
}

#[async_trait]
impl PosterEngine for StubEngine {
    fn name(&self) -> &str {
        "stub-engine"
    }

    async fn health_check(&self) -> bool {
        true
    }

    async fn list_themes(&self) -> Result<Vec<ThemeId>, ThemeError> {
        Ok(vec![ThemeId::from("blueprint"), ThemeId::from("noir")])
    }

    async fn load_theme(&self, id: &ThemeId) -> Result<ThemeConfig, ThemeError> {
        Ok(ThemeConfig {
            id: id.clone(),
            name: "Blueprint".to_string(),
            description: None,
            colors: ThemeColors {
                background: "#0b2a4a".into(),
                water: "#10395f".into(),
                parks: "#0e3255".into(),
                roads: "#e8f1f8".into(),
                text: "#e8f1f8".into(),
            },
        })
    }

    async fn resolve_coordinates(
        &self,
        _city: &str,
        _country: &str,
        sink: &dyn ProgressSink,
    ) -> Result<Coordinates, ResolveError> {
        sink.on_fragment("Resolving...").await;
        if self.fail_resolve {
            return Err(ResolveError::Engine {
                status: 3,
                detail: "no match for city".to_string(),
            });
        }
        Ok(Coordinates {
            lat: 52.52,
            lon: 13.405,
        })
    }

    async fn render(&self, job: &RenderJob, sink: &dyn ProgressSink) -> Result<(), RenderError> {
        if let Some(gate) = &self.gate {
            gate.notified().await;
        }
        sink.on_fragment("Rendering...").await;
        let img = image::RgbaImage::from_pixel(10, 10, image::Rgba([11, 42, 74, 255]));
        img.save(&job.output).unwrap();
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

struct Harness {
    studio: Studio<StubEngine>,
    rx: mpsc::Receiver<StudioMessage>,
    scratch: tempfile::TempDir,
    downloads: tempfile::TempDir,
}

impl Harness {
    fn new(engine: StubEngine) -> Self {
        let scratch = tempfile::tempdir().unwrap();
        let downloads = tempfile::tempdir().unwrap();
        let config = StudioConfig {
            scratch_dir: scratch.path().to_path_buf(),
            downloads_dir: downloads.path().to_path_buf(),
            ..StudioConfig::default()
        };

        let (tx, rx) = mpsc::channel(256);
        let studio = Studio::new(engine, config, tx);
        Self {
            studio,
            rx,
            scratch,
            downloads,
        }
    }

    fn drain(&mut self) -> Vec<StudioMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = self.rx.try_recv() {
            messages.push(msg);
        }
        messages
    }

    /// Poll the generation until a terminal message arrives.
    async fn run_generation_to_end(&mut self) -> Vec<StudioMessage> {
        let mut messages = Vec::new();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        loop {
            self.studio.poll_generation().await;
            messages.extend(self.drain());
            let done = messages.iter().any(|m| {
                matches!(
                    m,
                    StudioMessage::PosterReady { .. } | StudioMessage::GenerationFailed { .. }
                )
            });
            if done {
                return messages;
            }
            assert!(
                tokio::time::Instant::now() < deadline,
                "generation never finished; saw {messages:?}"
            );
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    }

    fn residual_files(&self) -> usize {
        count_files(self.scratch.path())
    }
}

fn count_files(dir: &Path) -> usize {
    std::fs::read_dir(dir).map_or(0, |entries| entries.count())
}

fn berlin_request() -> GenerationRequest {
    GenerationRequest::new(
        "Berlin",
        "Germany",
        ThemeId::from("blueprint"),
        Radius::try_new(5_000).unwrap(),
    )
}

// ============================================================================
// Startup
// ============================================================================

#[tokio::test]
async fn start_announces_the_session_picture() {
    let mut h = Harness::new(StubEngine::default());
    h.studio.start().await.unwrap();

    let messages = h.drain();
    assert!(messages
        .iter()
        .any(|m| matches!(m, StudioMessage::EngineInfo { ready: true, .. })));
    assert!(messages.iter().any(|m| matches!(
        m,
        StudioMessage::ThemeList { default: Some(d), .. } if d == &ThemeId::from("blueprint")
    )));
    assert!(messages.iter().any(|m| matches!(
        m,
        StudioMessage::State {
            state: StudioState::Ready
        }
    )));
}

// ============================================================================
// Generation Flow
// ============================================================================

#[tokio::test]
async fn generate_streams_progress_then_lands_the_poster() {
    let mut h = Harness::new(StubEngine::default());
    h.studio.start().await.unwrap();
    h.drain();

    h.studio
        .handle_event(SurfaceEvent::GenerateRequested {
            request: berlin_request(),
        })
        .await
        .unwrap();

    let accepted = h.drain();
    assert!(accepted.iter().any(|m| matches!(
        m,
        StudioMessage::State {
            state: StudioState::Generating
        }
    )));
    assert!(accepted
        .iter()
        .any(|m| matches!(m, StudioMessage::GenerationStarted { .. })));

    let messages = h.run_generation_to_end().await;

    // Progress snapshots arrive in prefix order.
    let transcripts: Vec<&str> = messages
        .iter()
        .filter_map(|m| match m {
            StudioMessage::Progress { transcript, .. } => Some(transcript.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(transcripts, vec!["Resolving...", "Resolving...Rendering..."]);

    let (preview, file_name) = messages
        .iter()
        .find_map(|m| match m {
            StudioMessage::PosterReady {
                preview, file_name, ..
            } => Some((preview, file_name)),
            _ => None,
        })
        .expect("a PosterReady message");
    assert_eq!((preview.width, preview.height), (10, 10));
    assert_eq!(file_name, "Berlin_5000_blueprint.png");

    assert_eq!(h.studio.state(), StudioState::Ready);
    assert!(h.studio.has_unsaved_poster());
}

#[tokio::test]
async fn failed_generation_reports_the_original_error_text() {
    let mut h = Harness::new(StubEngine {
        fail_resolve: true,
        ..StubEngine::default()
    });
    h.studio.start().await.unwrap();
    h.drain();

    h.studio
        .handle_event(SurfaceEvent::GenerateRequested {
            request: berlin_request(),
        })
        .await
        .unwrap();

    let messages = h.run_generation_to_end().await;
    let error = messages
        .iter()
        .find_map(|m| match m {
            StudioMessage::GenerationFailed { error, .. } => Some(error.clone()),
            _ => None,
        })
        .expect("a GenerationFailed message");
    assert_eq!(
        error,
        "Error generating poster: Coordinate resolution failed (3): no match for city"
    );

    // The session survives the failure, ready for a retry.
    assert_eq!(h.studio.state(), StudioState::Ready);
    assert!(!h.studio.has_unsaved_poster());
    assert_eq!(h.residual_files(), 0);
}

#[tokio::test]
async fn a_second_request_in_flight_is_rejected() {
    let gate = Arc::new(Notify::new());
    let mut h = Harness::new(StubEngine {
        gate: Some(Arc::clone(&gate)),
        ..StubEngine::default()
    });
    h.studio.start().await.unwrap();
    h.drain();

    h.studio
        .handle_event(SurfaceEvent::GenerateRequested {
            request: berlin_request(),
        })
        .await
        .unwrap();
    h.drain();
    assert!(h.studio.is_generating());

    h.studio
        .handle_event(SurfaceEvent::GenerateRequested {
            request: berlin_request(),
        })
        .await
        .unwrap();

    let messages = h.drain();
    assert!(messages.iter().any(|m| matches!(
        m,
        StudioMessage::Notify {
            level: NotifyLevel::Warning,
            ..
        }
    )));
    // The rejected request never became a generation.
    assert!(!messages
        .iter()
        .any(|m| matches!(m, StudioMessage::GenerationStarted { .. })));

    gate.notify_one();
    h.run_generation_to_end().await;
    assert!(!h.studio.is_generating());
}

#[tokio::test]
async fn a_new_request_replaces_the_unsaved_poster() {
    let mut h = Harness::new(StubEngine::default());
    h.studio.start().await.unwrap();
    h.drain();

    h.studio
        .handle_event(SurfaceEvent::GenerateRequested {
            request: berlin_request(),
        })
        .await
        .unwrap();
    h.run_generation_to_end().await;
    assert_eq!(h.residual_files(), 1);

    h.studio
        .handle_event(SurfaceEvent::GenerateRequested {
            request: berlin_request(),
        })
        .await
        .unwrap();
    h.run_generation_to_end().await;

    // The replaced poster's artifact is gone; only the new one remains.
    assert_eq!(h.residual_files(), 1);
}

// ============================================================================
// Save Flow
// ============================================================================

#[tokio::test]
async fn save_writes_the_download_and_releases_the_artifact() {
    let mut h = Harness::new(StubEngine::default());
    h.studio.start().await.unwrap();
    h.drain();

    h.studio
        .handle_event(SurfaceEvent::GenerateRequested {
            request: berlin_request(),
        })
        .await
        .unwrap();
    h.run_generation_to_end().await;

    h.studio
        .handle_event(SurfaceEvent::SaveRequested)
        .await
        .unwrap();

    let messages = h.drain();
    let saved: PathBuf = messages
        .iter()
        .find_map(|m| match m {
            StudioMessage::Saved { path } => Some(path.clone()),
            _ => None,
        })
        .expect("a Saved message");

    assert_eq!(
        saved,
        h.downloads.path().join("Berlin_5000_blueprint.png")
    );
    assert!(saved.exists());
    // Saved bytes are the poster itself.
    assert!(image::open(&saved).is_ok());

    assert!(!h.studio.has_unsaved_poster());
    assert_eq!(h.residual_files(), 0);
}

#[tokio::test]
async fn save_without_a_poster_is_a_notice() {
    let mut h = Harness::new(StubEngine::default());
    h.studio.start().await.unwrap();
    h.drain();

    h.studio
        .handle_event(SurfaceEvent::SaveRequested)
        .await
        .unwrap();

    let messages = h.drain();
    assert!(messages.iter().any(|m| matches!(
        m,
        StudioMessage::Notify {
            level: NotifyLevel::Info,
            ..
        }
    )));
    assert!(!messages
        .iter()
        .any(|m| matches!(m, StudioMessage::Saved { .. })));
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn quit_releases_the_unsaved_poster() {
    let mut h = Harness::new(StubEngine::default());
    h.studio.start().await.unwrap();
    h.drain();

    h.studio
        .handle_event(SurfaceEvent::GenerateRequested {
            request: berlin_request(),
        })
        .await
        .unwrap();
    h.run_generation_to_end().await;
    assert_eq!(h.residual_files(), 1);

    h.studio
        .handle_event(SurfaceEvent::QuitRequested)
        .await
        .unwrap();

    let messages = h.drain();
    assert!(messages
        .iter()
        .any(|m| matches!(m, StudioMessage::Quit { .. })));
    assert_eq!(h.studio.state(), StudioState::ShuttingDown);
    assert_eq!(h.residual_files(), 0);
}
