//! The rendering-context seam and the per-backend mesh cache.
//!
//! [`RenderBackend`] is the narrow set of operations the scene needs from a
//! GPU: upload a vertex buffer, set the three uniforms, draw a triangle range.
//! [`ModelPass`](crate::ModelPass) implements it on top of wgpu; tests use a
//! recording double.

use std::collections::HashMap;

use glam::Mat4;

use crate::color::Color;
use crate::error::RenderError;
use crate::mesh::{Mesh, cone_mesh, cube_mesh};

/// Type-safe handle to a vertex buffer owned by a [`RenderBackend`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) usize);

impl BufferId {
    /// Wraps a backend-specific buffer index.
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

/// Operations the scene issues against a rendering context.
///
/// Uniform setters are sticky: every `draw_triangles` call uses whatever
/// color and model matrix were set last, and the global rotation set at the
/// start of the frame.
pub trait RenderBackend {
    /// Uploads a vertex buffer and returns its handle.
    fn upload_vertices(&mut self, label: &str, mesh: &Mesh) -> Result<BufferId, RenderError>;

    /// Sets the global-rotation matrix applied outside every model matrix.
    fn set_global_rotation(&mut self, matrix: Mat4);

    fn set_color(&mut self, color: Color);

    fn set_model_matrix(&mut self, matrix: Mat4);

    /// Draws `count` vertices of `buffer` starting at `first` as a triangle list.
    fn draw_triangles(&mut self, buffer: BufferId, first: u32, count: u32)
    -> Result<(), RenderError>;
}

/// Uploaded cube geometry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CubeBuffers {
    pub vertices: BufferId,
    pub vertex_count: u32,
}

/// Uploaded cone geometry for one slice count.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ConeBuffers {
    pub base: BufferId,
    pub sides: BufferId,
    pub vertex_count: u32,
}

/// Lazily generated, uploaded-once meshes for a single backend.
///
/// Mesh data never depends on the pose, so each generator runs at most once
/// per backend. Cones are cached per slice count.
#[derive(Debug, Default)]
pub struct MeshLibrary {
    cube: Option<CubeBuffers>,
    cones: HashMap<u32, ConeBuffers>,
}

impl MeshLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cube buffers, uploading them on first use.
    pub fn cube(&mut self, backend: &mut dyn RenderBackend) -> Result<CubeBuffers, RenderError> {
        if let Some(cube) = self.cube {
            return Ok(cube);
        }

        let mesh = cube_mesh();
        let cube = CubeBuffers {
            vertices: backend.upload_vertices("Cube Vertices", &mesh)?,
            vertex_count: mesh.vertex_count(),
        };
        self.cube = Some(cube);
        Ok(cube)
    }

    /// Returns the cone buffers for `slices`, uploading them on first use.
    pub fn cone(
        &mut self,
        backend: &mut dyn RenderBackend,
        slices: u32,
    ) -> Result<ConeBuffers, RenderError> {
        if let Some(cone) = self.cones.get(&slices) {
            return Ok(*cone);
        }

        let mesh = cone_mesh(slices);
        let cone = ConeBuffers {
            base: backend.upload_vertices("Cone Base Vertices", &mesh.base)?,
            sides: backend.upload_vertices("Cone Side Vertices", &mesh.sides)?,
            vertex_count: mesh.sides.vertex_count(),
        };
        self.cones.insert(slices, cone);
        Ok(cone)
    }

    /// Forgets every cached buffer, e.g. after the backend was recreated.
    pub fn clear(&mut self) {
        self.cube = None;
        self.cones.clear();
    }
}
