//! Procedural triangle meshes for the creature's building blocks.
//!
//! This module provides the pure geometry generators used by every
//! [`Primitive`](crate::Primitive):
//!
//! - [`cube_mesh`]: a unit cube spanning x∈\[0,1\], y∈\[0,1\], z∈\[-1,0\]
//! - [`cone_mesh`]: a unit cone (radius 1, height 1) split into a base fan
//!   and a side fan, with a configurable slice count
//!
//! Nothing here touches the GPU. Meshes do not depend on the pose, so the
//! renderer generates each one once and keeps the uploaded buffer around
//! (see [`MeshLibrary`](crate::MeshLibrary)).
//!
//! # Layout
//!
//! A [`Mesh`] is a flat triangle list: three [`Vertex3d`]s per triangle and no
//! index buffer. Viewed as floats it has stride 3, so its length is always a
//! multiple of 9.
//!
//! | Attribute | Format    | Offset | Shader Location |
//! |-----------|-----------|--------|-----------------|
//! | position  | Float32x3 | 0      | 0               |
//!
//! # Winding Order
//!
//! Winding is **not** consistent between (or even within) the generators.
//! The pipeline renders with culling disabled and relies on the depth test.
//!
//! # Example
//!
//! ```
//! use critter::{cone_mesh, cube_mesh};
//!
//! let cube = cube_mesh();
//! assert_eq!(cube.triangle_count(), 12);
//!
//! let cone = cone_mesh(12);
//! assert_eq!(cone.base.triangle_count(), 12);
//! assert_eq!(cone.sides.as_floats().len(), 9 * 12);
//! ```

use std::f32::consts::TAU;

/// A single mesh vertex: just a model-space position.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex3d {
    pub position: [f32; 3],
}

impl Vertex3d {
    /// The wgpu vertex buffer layout for [`Vertex3d`]: 12 bytes, position at location 0.
    pub const LAYOUT: wgpu::VertexBufferLayout<'static> = wgpu::VertexBufferLayout {
        array_stride: std::mem::size_of::<Vertex3d>() as u64,
        step_mode: wgpu::VertexStepMode::Vertex,
        attributes: &[wgpu::VertexAttribute {
            offset: 0,
            shader_location: 0,
            format: wgpu::VertexFormat::Float32x3,
        }],
    };

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: [x, y, z],
        }
    }
}

/// A flat, non-indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex3d>,
}

impl Mesh {
    pub fn new(vertices: Vec<Vertex3d>) -> Self {
        Self { vertices }
    }

    pub fn vertices(&self) -> &[Vertex3d] {
        &self.vertices
    }

    /// The vertex data as a flat `x, y, z, x, y, z, ...` slice.
    pub fn as_floats(&self) -> &[f32] {
        bytemuck::cast_slice(&self.vertices)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Iterates the triangles as vertex triples.
    pub fn triangles(&self) -> impl Iterator<Item = &[Vertex3d]> {
        self.vertices.chunks_exact(3)
    }

    fn push_triangle(&mut self, a: [f32; 3], b: [f32; 3], c: [f32; 3]) {
        self.vertices.push(Vertex3d { position: a });
        self.vertices.push(Vertex3d { position: b });
        self.vertices.push(Vertex3d { position: c });
    }
}

/// Number of vertices in [`cube_mesh`].
pub const CUBE_VERTEX_COUNT: u32 = 36;

/// Vertices of the cube's bottom face, the last six in [`cube_mesh`].
pub const CUBE_BOTTOM_VERTICES: u32 = 6;

/// Default slice count for cones.
pub const DEFAULT_CONE_SLICES: u32 = 12;

/// Generates the unit cube: 12 triangles spanning x∈\[0,1\], y∈\[0,1\], z∈\[-1,0\].
///
/// Faces are emitted in the order front, back, left, right, top, bottom, two
/// triangles each. The bottom face comes last so it can be drawn separately
/// with a darker shade.
pub fn cube_mesh() -> Mesh {
    #[rustfmt::skip]
    const TRIANGLES: [[[f32; 3]; 3]; 12] = [
        // Front
        [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, -1.0]],
        [[0.0, 0.0, 0.0], [1.0, 0.0, -1.0], [0.0, 0.0, -1.0]],
        // Back
        [[0.0, 1.0, 0.0], [1.0, 1.0, 0.0], [1.0, 1.0, -1.0]],
        [[0.0, 1.0, 0.0], [1.0, 1.0, -1.0], [0.0, 1.0, -1.0]],
        // Left
        [[0.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, -1.0]],
        [[0.0, 0.0, 0.0], [0.0, 1.0, -1.0], [0.0, 1.0, 0.0]],
        // Right
        [[1.0, 0.0, 0.0], [1.0, 0.0, -1.0], [1.0, 1.0, -1.0]],
        [[1.0, 0.0, 0.0], [1.0, 1.0, -1.0], [1.0, 1.0, 0.0]],
        // Top
        [[0.0, 0.0, 0.0], [1.0, 1.0, 0.0], [1.0, 0.0, 0.0]],
        [[0.0, 0.0, 0.0], [0.0, 1.0, 0.0], [1.0, 1.0, 0.0]],
        // Bottom
        [[0.0, 0.0, -1.0], [1.0, 0.0, -1.0], [1.0, 1.0, -1.0]],
        [[0.0, 0.0, -1.0], [1.0, 1.0, -1.0], [0.0, 1.0, -1.0]],
    ];

    let mut mesh = Mesh::default();
    for [a, b, c] in TRIANGLES {
        mesh.push_triangle(a, b, c);
    }
    mesh
}

/// The two triangle fans making up a cone.
#[derive(Clone, Debug, PartialEq)]
pub struct ConeMesh {
    /// `slices` triangles from the origin to consecutive rim points (y = 0).
    pub base: Mesh,
    /// `slices` triangles from consecutive rim points to the apex (0, 1, 0).
    pub sides: Mesh,
}

/// Generates a cone of radius 1 and height 1 standing on the x-z plane.
///
/// Rim point `i` sits at angle `i · 2π/slices`; the fan closes by pairing the
/// last point with `(i + 1) mod slices`. Slice counts below 3 are not
/// rejected and simply produce degenerate triangles.
pub fn cone_mesh(slices: u32) -> ConeMesh {
    let step = TAU / slices as f32;
    let rim = |i: u32| {
        let angle = (i % slices.max(1)) as f32 * step;
        [angle.cos(), 0.0, angle.sin()]
    };

    let apex = [0.0, 1.0, 0.0];
    let center = [0.0, 0.0, 0.0];

    let mut base = Mesh::default();
    let mut sides = Mesh::default();
    for i in 0..slices {
        let (here, next) = (rim(i), rim(i + 1));
        base.push_triangle(center, here, next);
        sides.push_triangle(here, next, apex);
    }

    ConeMesh { base, sides }
}
