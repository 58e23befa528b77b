use anyhow::{bail, Context};
use bytemuck::{Pod, Zeroable};
use glam::{Vec2, Vec3, Vec4, Vec4Swizzles};
use gltf::buffer;
use itertools::izip;

use crate::math::bounds::AABB;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub tex_coords: Vec2,
    pub tangent: Vec3,
}

pub struct ModelPrimitive {
    pub index: usize,
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl ModelPrimitive {
    pub fn vertex_by_triangle_index(&self, face: usize, vert: usize) -> &Vertex {
        &self.vertices[self.indices[face * 3 + vert] as usize]
    }

    pub fn triangle(&self, face: usize) -> [Vec3; 3] {
        [0, 1, 2].map(|vert| self.vertex_by_triangle_index(face, vert).position)
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

pub struct Model {
    pub name: String,
    pub primitives: Vec<ModelPrimitive>,
    /// Local-space bounds over all primitives
    pub bounds: AABB,
}

pub type Buffers<'a> = &'a [buffer::Data];

impl Model {
    pub fn from_gltf(
        name: impl Into<String>,
        mesh: gltf::Mesh,
        buffers: Buffers,
    ) -> anyhow::Result<Model> {
        let name = name.into();
        let mut primitives = Vec::new();

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                bail!("Unsupported primitive mode: {:?}", primitive.mode());
            }

            let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data[..]));

            let positions = reader
                .read_positions()
                .context("Primitive has no positions")?
                .map(Vec3::from)
                .collect::<Vec<_>>();
            let normals = reader
                .read_normals()
                .context("Primitive has no normals")?
                .map(Vec3::from)
                .collect::<Vec<_>>();
            let tex_coords = match reader.read_tex_coords(0) {
                Some(tex_coords) => tex_coords.into_f32().map(Vec2::from).collect::<Vec<_>>(),
                None => vec![Vec2::ZERO; positions.len()],
            };
            let tangents = reader
                .read_tangents()
                .map(|tangents| tangents.map(|t| Vec4::from(t).xyz()).collect::<Vec<_>>());
            let has_tangents = tangents.is_some();
            let tangents = tangents.unwrap_or_else(|| vec![Vec3::X; positions.len()]);

            let vertices = izip!(positions, normals, tex_coords, tangents)
                .map(|(position, normal, tex_coords, tangent)| Vertex {
                    position,
                    normal,
                    tex_coords,
                    tangent,
                })
                .collect::<Vec<Vertex>>();

            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect::<Vec<u32>>(),
                None => (0..vertices.len() as u32).collect(),
            };

            let mut model_primitive = ModelPrimitive {
                index: primitive.index(),
                vertices,
                indices,
            };

            if !has_tangents {
                model_primitive
                    .generate_tangents()
                    .with_context(|| format!("Tangent generation failed for {}", name))?;
            }

            primitives.push(model_primitive);
        }

        Self::from_primitives(name, primitives)
    }

    pub fn from_primitives(
        name: impl Into<String>,
        primitives: Vec<ModelPrimitive>,
    ) -> anyhow::Result<Model> {
        let name = name.into();

        let bounds = AABB::from_points(
            primitives
                .iter()
                .flat_map(|primitive| primitive.vertices.iter().map(|vertex| vertex.position)),
        )
        .with_context(|| format!("Mesh without vertices: {}", name))?;

        Ok(Model {
            name,
            primitives,
            bounds,
        })
    }
}

#[cfg(test)]
pub(crate) mod test_meshes {
    use super::*;

    /// Axis-aligned cube centred on the origin with edge length `size`.
    pub fn cube(size: f32) -> Model {
        let h = size * 0.5;
        let corners = [
            Vec3::new(-h, -h, -h),
            Vec3::new(h, -h, -h),
            Vec3::new(h, h, -h),
            Vec3::new(-h, h, -h),
            Vec3::new(-h, -h, h),
            Vec3::new(h, -h, h),
            Vec3::new(h, h, h),
            Vec3::new(-h, h, h),
        ];

        let vertices = corners
            .iter()
            .map(|&position| Vertex {
                position,
                normal: position.normalize(),
                tex_coords: Vec2::ZERO,
                tangent: Vec3::X,
            })
            .collect();

        #[rustfmt::skip]
        let indices = vec![
            0, 2, 1, 0, 3, 2, // back
            4, 5, 6, 4, 6, 7, // front
            0, 1, 5, 0, 5, 4, // bottom
            3, 7, 6, 3, 6, 2, // top
            0, 4, 7, 0, 7, 3, // left
            1, 2, 6, 1, 6, 5, // right
        ];

        let primitive = ModelPrimitive {
            index: 0,
            vertices,
            indices,
        };

        Model::from_primitives("cube", vec![primitive]).unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_all_vertices() {
        let cube = test_meshes::cube(2.0);

        assert_eq!(cube.bounds.min, Vec3::splat(-1.0));
        assert_eq!(cube.bounds.max, Vec3::splat(1.0));
        assert_eq!(cube.primitives[0].triangle_count(), 12);
    }

    #[test]
    fn triangles_follow_the_index_buffer() {
        let cube = test_meshes::cube(2.0);

        assert_eq!(
            cube.primitives[0].triangle(0),
            [
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, 1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
            ]
        );
    }

    #[test]
    fn empty_model_is_rejected() {
        assert!(Model::from_primitives("empty", Vec::new()).is_err());
    }
}
