//! Per-tick driver: input → pose → composition → submission.
//!
//! The core is [`tick`], which updates the pose from elapsed time and returns
//! the frame's [`FrameCommands`] without touching the GPU. [`RenderLoop`]
//! adds the mesh cache and submission so the host only has to call
//! `tick` + `submit` once per display refresh.

use std::fmt;
use std::time::{Duration, Instant};

use crate::backend::{MeshLibrary, RenderBackend};
use crate::composer::{FrameCommands, SceneComposer};
use crate::pose::{Joint, Pose};

/// Degrees of global rotation per pixel of horizontal drag.
pub const DEFAULT_DRAG_SENSITIVITY: f32 = 0.5;

/// Already-normalized input delivered between ticks.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlEvent {
    /// Set a joint to an absolute angle (degrees).
    SetAngle(Joint, f32),
    /// Change a joint by a relative amount (degrees).
    AdjustAngle(Joint, f32),
    SetAnimation(bool),
    ToggleAnimation,
    /// Reaction trigger pressed (`true`) or released (`false`).
    Trigger(bool),
    /// Horizontal pointer drag in pixels.
    Drag { dx: f32 },
    /// Absolute value of the global-rotation slider (degrees).
    SetGlobalRotation(f32),
    /// Relative change of the global-rotation slider (degrees).
    AdjustGlobalRotation(f32),
}

/// All mutable application state. Only input handling and [`tick`] write to it.
#[derive(Clone, Debug)]
pub struct AppState {
    pub pose: Pose,
    slider_rotation: f32,
    drag_rotation: f32,
    drag_sensitivity: f32,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(DEFAULT_DRAG_SENSITIVITY)
    }
}

impl AppState {
    pub fn new(drag_sensitivity: f32) -> Self {
        Self {
            pose: Pose::new(),
            slider_rotation: 0.0,
            drag_rotation: 0.0,
            drag_sensitivity,
        }
    }

    pub fn drag_sensitivity(&self) -> f32 {
        self.drag_sensitivity
    }

    /// Global rotation in degrees: slider and accumulated drag combined.
    pub fn global_rotation(&self) -> f32 {
        self.slider_rotation + self.drag_rotation
    }

    pub fn apply(&mut self, event: ControlEvent) {
        match event {
            ControlEvent::SetAngle(joint, degrees) => {
                if !self.pose.set_angle(joint, degrees) {
                    log::debug!("ignoring {} angle while animating", joint.name());
                }
            }
            ControlEvent::AdjustAngle(joint, delta) => {
                let current = self.pose.angle(joint);
                self.apply(ControlEvent::SetAngle(joint, current + delta));
            }
            ControlEvent::SetAnimation(on) => self.pose.set_auto_animate(on),
            ControlEvent::ToggleAnimation => {
                let on = !self.pose.is_animating();
                self.pose.set_auto_animate(on);
            }
            ControlEvent::Trigger(held) => self.pose.set_trigger(held),
            ControlEvent::Drag { dx } => self.drag_rotation += dx * self.drag_sensitivity,
            ControlEvent::SetGlobalRotation(degrees) => self.slider_rotation = degrees,
            ControlEvent::AdjustGlobalRotation(delta) => self.slider_rotation += delta,
        }
    }
}

/// Advances `state` to `elapsed` seconds and composes the frame.
pub fn tick(state: &mut AppState, composer: &SceneComposer, elapsed: f32) -> FrameCommands {
    state.pose.update(elapsed);
    composer.compose_frame(&state.pose, state.global_rotation())
}

/// Outcome of submitting one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameReport {
    pub parts: usize,
    /// Parts whose draw was abandoned this frame.
    pub failed: usize,
    /// Time spent issuing the frame's parts to the backend.
    pub duration: Duration,
}

impl FrameReport {
    pub fn fps(&self) -> Option<f64> {
        let secs = self.duration.as_secs_f64();
        (secs > 0.0).then(|| 1.0 / secs)
    }
}

impl fmt::Display for FrameReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "parts: {} ms: {}", self.parts, self.duration.as_millis())?;
        match self.fps() {
            Some(fps) => write!(f, " fps: {:.1}", fps)?,
            None => write!(f, " fps: -")?,
        }
        if self.failed > 0 {
            write!(f, " failed: {}", self.failed)?;
        }
        Ok(())
    }
}

/// Pose state, composer and mesh cache for one backend.
pub struct RenderLoop {
    pub state: AppState,
    composer: SceneComposer,
    library: MeshLibrary,
}

impl RenderLoop {
    pub fn new(state: AppState, composer: SceneComposer) -> Self {
        Self {
            state,
            composer,
            library: MeshLibrary::new(),
        }
    }

    pub fn tick(&mut self, elapsed: f32) -> FrameCommands {
        tick(&mut self.state, &self.composer, elapsed)
    }

    /// Sends `frame` to `backend` in draw order and times the submission.
    ///
    /// A part that fails is logged and skipped; the rest of the frame still
    /// goes out.
    pub fn submit(
        &mut self,
        frame: &FrameCommands,
        backend: &mut dyn RenderBackend,
    ) -> FrameReport {
        let start = Instant::now();

        backend.set_global_rotation(frame.global_rotation.matrix());

        let mut failed = 0;
        for part in &frame.parts {
            if let Err(e) = part.primitive.render(backend, &mut self.library) {
                log::warn!("Skipping {:?} this frame: {e}", part.kind);
                failed += 1;
            }
        }

        FrameReport {
            parts: frame.parts.len(),
            failed,
            duration: start.elapsed(),
        }
    }

    /// Drops cached buffers so they are uploaded again to a new backend.
    pub fn reset_meshes(&mut self) {
        self.library.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::testing::{Call, RecordingBackend};
    use crate::composer::PartKind;

    #[test]
    fn drag_changes_only_global_rotation() {
        let mut state = AppState::default();
        let pose_before = state.pose.clone();

        state.apply(ControlEvent::Drag { dx: 10.0 });

        assert_eq!(state.global_rotation(), 10.0 * DEFAULT_DRAG_SENSITIVITY);
        assert_eq!(state.pose, pose_before);
    }

    #[test]
    fn drag_applies_while_animating() {
        let mut state = AppState::new(0.25);
        state.apply(ControlEvent::SetAnimation(true));
        state.apply(ControlEvent::Drag { dx: 8.0 });
        state.apply(ControlEvent::Drag { dx: -4.0 });
        assert_eq!(state.global_rotation(), 1.0);
    }

    #[test]
    fn slider_and_drag_add_up() {
        let mut state = AppState::default();
        state.apply(ControlEvent::SetGlobalRotation(30.0));
        state.apply(ControlEvent::Drag { dx: 20.0 });
        state.apply(ControlEvent::AdjustGlobalRotation(5.0));
        assert_eq!(state.global_rotation(), 45.0);

        state.apply(ControlEvent::SetGlobalRotation(0.0));
        assert_eq!(state.global_rotation(), 10.0);
    }

    #[test]
    fn angle_events_respect_animation() {
        let mut state = AppState::default();
        state.apply(ControlEvent::SetAngle(Joint::Head, 15.0));
        state.apply(ControlEvent::AdjustAngle(Joint::Head, 5.0));
        assert_eq!(state.pose.head, 20.0);

        state.apply(ControlEvent::ToggleAnimation);
        state.apply(ControlEvent::SetAngle(Joint::Head, 90.0));
        assert_eq!(state.pose.head, 20.0);
        assert!(state.pose.is_animating());
    }

    #[test]
    fn tick_animates_from_elapsed_time() {
        let mut state = AppState::default();
        state.apply(ControlEvent::SetAnimation(true));
        let composer = SceneComposer::new();

        let frame = tick(&mut state, &composer, 0.0);
        assert_eq!(state.pose.head, 0.0);
        assert_eq!(state.pose.left_arm, 200.0);
        assert_eq!(frame.parts.len(), 18);

        tick(&mut state, &composer, 0.4);
        assert_ne!(state.pose.head, 0.0);
    }

    #[test]
    fn stop_animating_takes_effect_next_tick() {
        let mut state = AppState::default();
        let composer = SceneComposer::new();
        state.apply(ControlEvent::SetAnimation(true));
        tick(&mut state, &composer, 0.3);
        let frozen = state.pose.head;

        state.apply(ControlEvent::SetAnimation(false));
        tick(&mut state, &composer, 0.9);
        assert_eq!(state.pose.head, frozen);
    }

    #[test]
    fn submit_uploads_global_rotation_first_then_parts_in_order() {
        let mut render_loop = RenderLoop::new(AppState::default(), SceneComposer::new());
        render_loop.state.apply(ControlEvent::SetGlobalRotation(45.0));
        let frame = render_loop.tick(0.0);

        let mut backend = RecordingBackend::default();
        let report = render_loop.submit(&frame, &mut backend);

        assert_eq!(report.parts, 18);
        assert_eq!(report.failed, 0);
        assert_eq!(
            backend.calls[0],
            Call::GlobalRotation(frame.global_rotation.matrix())
        );
        // 16 cubes × 2 draws + 2 cones × 2 draws
        assert_eq!(backend.draws().count(), 36);
        // Cube buffers once, one cone slice count (base + sides).
        assert_eq!(backend.uploads(), 3);

        let models: Vec<_> = backend
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Model(m) => Some(*m),
                _ => None,
            })
            .collect();
        let expected: Vec<_> = frame.parts.iter().map(|p| p.primitive.model_matrix()).collect();
        assert_eq!(models, expected);
    }

    #[test]
    fn failed_part_does_not_stop_the_frame() {
        let mut render_loop = RenderLoop::new(AppState::default(), SceneComposer::new());
        let frame = render_loop.tick(0.0);
        let mut backend = RecordingBackend {
            fail_uploads_matching: Some("Cone"),
            ..Default::default()
        };

        let report = render_loop.submit(&frame, &mut backend);

        let ears = frame.parts_of(PartKind::Ear).count();
        assert_eq!(report.failed, ears);
        assert_eq!(backend.draws().count(), 2 * (frame.parts.len() - ears));
    }

    #[test]
    fn meshes_persist_across_frames() {
        let mut render_loop = RenderLoop::new(AppState::default(), SceneComposer::new());
        let mut backend = RecordingBackend::default();
        for i in 0..5 {
            let frame = render_loop.tick(i as f32 * 0.016);
            render_loop.submit(&frame, &mut backend);
        }
        assert_eq!(backend.uploads(), 3);

        render_loop.reset_meshes();
        let frame = render_loop.tick(0.1);
        render_loop.submit(&frame, &mut backend);
        assert_eq!(backend.uploads(), 6);
    }

    #[test]
    fn cheek_color_follows_the_reaction() {
        let mut render_loop = RenderLoop::new(AppState::default(), SceneComposer::new());
        render_loop.state.apply(ControlEvent::Trigger(true));
        let frame = render_loop.tick(0.0);
        let mut backend = RecordingBackend::default();
        render_loop.submit(&frame, &mut backend);

        let cheek = render_loop.state.pose.cheek_color;
        assert_ne!(cheek, crate::pose::CHEEK_BASELINE);
        assert!(backend.colors().contains(&cheek));
    }

    /// Delegates to a [`RecordingBackend`] but takes a while per draw.
    struct SlowBackend {
        inner: RecordingBackend,
        per_draw: Duration,
    }

    impl RenderBackend for SlowBackend {
        fn upload_vertices(
            &mut self,
            label: &str,
            mesh: &crate::mesh::Mesh,
        ) -> Result<crate::backend::BufferId, crate::error::RenderError> {
            self.inner.upload_vertices(label, mesh)
        }

        fn set_global_rotation(&mut self, matrix: glam::Mat4) {
            self.inner.set_global_rotation(matrix);
        }

        fn set_color(&mut self, color: crate::color::Color) {
            self.inner.set_color(color);
        }

        fn set_model_matrix(&mut self, matrix: glam::Mat4) {
            self.inner.set_model_matrix(matrix);
        }

        fn draw_triangles(
            &mut self,
            buffer: crate::backend::BufferId,
            first: u32,
            count: u32,
        ) -> Result<(), crate::error::RenderError> {
            std::thread::sleep(self.per_draw);
            self.inner.draw_triangles(buffer, first, count)
        }
    }

    #[test]
    fn report_times_the_whole_submission() {
        let mut render_loop = RenderLoop::new(AppState::default(), SceneComposer::new());
        let frame = render_loop.tick(0.0);
        let mut backend = SlowBackend {
            inner: RecordingBackend::default(),
            per_draw: Duration::from_micros(200),
        };

        let report = render_loop.submit(&frame, &mut backend);

        let draws = backend.inner.draws().count() as u32;
        assert_eq!(draws, 36);
        assert!(report.duration >= backend.per_draw * draws);
    }

    #[test]
    fn report_formats_like_a_status_line() {
        let report = FrameReport {
            parts: 18,
            failed: 0,
            duration: Duration::from_millis(4),
        };
        assert_eq!(report.to_string(), "parts: 18 ms: 4 fps: 250.0");

        let idle = FrameReport {
            parts: 0,
            failed: 2,
            duration: Duration::ZERO,
        };
        assert_eq!(idle.to_string(), "parts: 0 ms: 0 fps: - failed: 2");
    }
}
