// Meshes exported without tangents still need them for normal mapping,
// so missing tangents are generated at import time.

use anyhow::bail;
use bevy_mikktspace::{generate_tangents, Geometry};
use glam::Vec3;

use crate::model::{ModelPrimitive, Vertex};

/// Borrowed view of a primitive as mikktspace sees it: one face per index
/// triple, tangents written back into the shared vertices.
struct TangentSpace<'a> {
    primitive: &'a mut ModelPrimitive,
}

impl TangentSpace<'_> {
    fn corner(&self, face: usize, vert: usize) -> &Vertex {
        self.primitive.vertex_by_triangle_index(face, vert)
    }
}

impl Geometry for TangentSpace<'_> {
    fn num_faces(&self) -> usize {
        self.primitive.triangle_count()
    }

    fn num_vertices_of_face(&self, _face: usize) -> usize {
        3
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.primitive.triangle(face)[vert].to_array()
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        self.corner(face, vert).normal.to_array()
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.corner(face, vert).tex_coords.to_array()
    }

    fn set_tangent(
        &mut self,
        tangent: [f32; 3],
        _bi_tangent: [f32; 3],
        _f_mag_s: f32,
        _f_mag_t: f32,
        _bi_tangent_preserves_orientation: bool,
        face: usize,
        vert: usize,
    ) {
        let index = self.primitive.indices[face * 3 + vert] as usize;
        // Faces without UV variation yield a zero tangent
        self.primitive.vertices[index].tangent = Vec3::from_array(tangent).normalize_or(Vec3::X);
    }
}

impl ModelPrimitive {
    /// Replaces every vertex tangent with a MikkTSpace one. Primitives
    /// without faces are left alone.
    pub fn generate_tangents(&mut self) -> anyhow::Result<()> {
        if self.triangle_count() == 0 {
            return Ok(());
        }

        let index = self.index;
        if !generate_tangents(&mut TangentSpace { primitive: self }) {
            bail!("Failed to generate tangents for primitive {}", index)
        }

        Ok(())
    }
}
