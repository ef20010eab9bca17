//! # Critter
//!
//! **An articulated blocky creature, drawn from cubes and cones with wgpu.**
//!
//! The scene is rebuilt every frame from a small [`Pose`]: joint angles, an
//! idle animation driven by elapsed time, and a short "reaction" that swells
//! the eyes and flushes the cheeks while a trigger is held.
//!
//! ## Quick Start
//!
//! ```no_run
//! critter::run_with_config(critter::AppConfig::new().auto_animate(true))
//!     .expect("viewer failed");
//! ```
//!
//! ## Without a window
//!
//! Composition never touches the GPU, so a frame can be built and inspected
//! directly:
//!
//! ```
//! use critter::{AppState, ControlEvent, SceneComposer, tick};
//!
//! let mut state = AppState::default();
//! state.apply(ControlEvent::SetAnimation(true));
//! state.apply(ControlEvent::Drag { dx: 10.0 });
//!
//! let frame = tick(&mut state, &SceneComposer::new(), 0.5);
//! assert_eq!(frame.parts.len(), 18);
//! assert_eq!(state.global_rotation(), 5.0);
//! ```
//!
//! ## Layers
//!
//! - **Geometry**: [`Transform`], [`Mesh`], [`cube_mesh`], [`cone_mesh`]
//! - **Scene**: [`Primitive`], [`Pose`], [`SceneComposer`], [`FrameCommands`]
//! - **Loop**: [`AppState`], [`tick`], [`RenderLoop`], [`FrameReport`]
//! - **GPU**: [`RenderBackend`] and its wgpu implementation [`ModelPass`]

mod app;
mod backend;
mod color;
mod composer;
mod error;
mod gpu;
mod input;
mod mesh;
mod model_pass;
mod pose;
mod primitive;
mod render_loop;
mod transform;

pub use app::{AppConfig, run, run_with_config};
pub use backend::{BufferId, ConeBuffers, CubeBuffers, MeshLibrary, RenderBackend};
pub use color::Color;
pub use composer::{
    BODY_ANCHOR, BODY_COLOR, BODY_SCALE, FACE_COLOR, FrameCommands, LIMB_COLOR, Part, PartKind,
    STRIPE_COLOR, SceneComposer,
};
pub use error::{AppError, RenderError};
pub use gpu::GpuContext;
pub use input::{Controls, Input, KEY_STEP_DEGREES};
pub use mesh::{
    CUBE_BOTTOM_VERTICES, CUBE_VERTEX_COUNT, ConeMesh, DEFAULT_CONE_SLICES, Mesh, Vertex3d,
    cone_mesh, cube_mesh,
};
pub use model_pass::{GlobalUniforms, ModelPass, ModelUniforms};
pub use pose::{
    ARM_BASELINE, CHEEK_BASELINE, CHEEK_SPARK, EYE_SCALE_BASELINE, Joint, Pose, REACTION_END,
    REACTION_START, REACTION_STEP,
};
pub use primitive::{Cone, Cube, Primitive};
pub use render_loop::{
    AppState, ControlEvent, DEFAULT_DRAG_SENSITIVITY, FrameReport, RenderLoop, tick,
};
pub use transform::Transform;
