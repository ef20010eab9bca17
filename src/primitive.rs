//! Renderable units: a mesh, a color and a [`Transform`].

use glam::Mat4;

use crate::backend::{MeshLibrary, RenderBackend};
use crate::color::Color;
use crate::error::RenderError;
use crate::mesh::{CUBE_BOTTOM_VERTICES, DEFAULT_CONE_SLICES};
use crate::transform::Transform;

/// Shade applied to the cube's bottom face so edges stay readable without lighting.
const BOTTOM_FACE_SHADE: f32 = 0.9;

/// A unit cube placed by its transform.
#[derive(Clone, Debug, PartialEq)]
pub struct Cube {
    pub color: Color,
    pub transform: Transform,
}

impl Cube {
    pub fn new(color: Color, transform: Transform) -> Self {
        Self { color, transform }
    }

    /// Draws the cube in two calls: five faces in `color`, then the bottom
    /// face slightly darker.
    pub fn render(
        &self,
        backend: &mut dyn RenderBackend,
        library: &mut MeshLibrary,
    ) -> Result<(), RenderError> {
        let cube = library.cube(backend)?;
        let lit = cube.vertex_count - CUBE_BOTTOM_VERTICES;

        backend.set_model_matrix(self.transform.matrix());
        backend.set_color(self.color);
        backend.draw_triangles(cube.vertices, 0, lit)?;

        backend.set_color(self.color.shade(BOTTOM_FACE_SHADE));
        backend.draw_triangles(cube.vertices, lit, CUBE_BOTTOM_VERTICES)
    }
}

/// A cone standing on its base, apex along +Y.
#[derive(Clone, Debug, PartialEq)]
pub struct Cone {
    pub color: Color,
    pub transform: Transform,
    pub height: f32,
    pub radius: f32,
    /// Must be at least 3 for a non-degenerate cone; not checked.
    pub slices: u32,
}

impl Cone {
    pub fn new(color: Color, transform: Transform) -> Self {
        Self {
            color,
            transform,
            height: 1.0,
            radius: 1.0,
            slices: DEFAULT_CONE_SLICES,
        }
    }

    pub fn slices(mut self, slices: u32) -> Self {
        self.slices = slices;
        self
    }

    pub fn size(mut self, radius: f32, height: f32) -> Self {
        self.radius = radius;
        self.height = height;
        self
    }

    /// The model matrix including the cone's own radius/height.
    pub fn model_matrix(&self) -> Mat4 {
        let mut model = self.transform.clone();
        model.scale(self.radius, self.height, self.radius);
        model.matrix()
    }

    /// Draws the base fan, then the side fan, both in `color`.
    pub fn render(
        &self,
        backend: &mut dyn RenderBackend,
        library: &mut MeshLibrary,
    ) -> Result<(), RenderError> {
        let cone = library.cone(backend, self.slices)?;

        backend.set_model_matrix(self.model_matrix());
        backend.set_color(self.color);
        backend.draw_triangles(cone.base, 0, cone.vertex_count)?;
        backend.draw_triangles(cone.sides, 0, cone.vertex_count)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Primitive {
    Cube(Cube),
    Cone(Cone),
}

impl Primitive {
    pub fn color(&self) -> Color {
        match self {
            Primitive::Cube(cube) => cube.color,
            Primitive::Cone(cone) => cone.color,
        }
    }

    /// The matrix uploaded as the model uniform for this primitive.
    pub fn model_matrix(&self) -> Mat4 {
        match self {
            Primitive::Cube(cube) => cube.transform.matrix(),
            Primitive::Cone(cone) => cone.model_matrix(),
        }
    }

    pub fn render(
        &self,
        backend: &mut dyn RenderBackend,
        library: &mut MeshLibrary,
    ) -> Result<(), RenderError> {
        match self {
            Primitive::Cube(cube) => cube.render(backend, library),
            Primitive::Cone(cone) => cone.render(backend, library),
        }
    }
}

impl From<Cube> for Primitive {
    fn from(cube: Cube) -> Self {
        Primitive::Cube(cube)
    }
}

impl From<Cone> for Primitive {
    fn from(cone: Cone) -> Self {
        Primitive::Cone(cone)
    }
}
