use bevy::{asset::RenderAssetUsages, mesh::PrimitiveTopology, prelude::*};
use bitflags::bitflags;
use bytemuck::{Pod, Zeroable};

/// Primitive assembly used to draw a [`DrawBatch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BatchTopology {
    /// One strip for the whole batch, quads stitched with degenerate vertices.
    #[default]
    TriangleStrip,
    /// One point per vertex.
    PointList,
}

bitflags! {
    /// Which optional vertex streams a batch carries.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct BatchFlags: u32 {
        /// The batch samples a texture through its UVs.
        const TEXTURED = 1;
        /// The batch has one color per vertex.
        const VERTEX_COLORS = 1 << 1;
    }
}

/// One interleaved vertex, laid out for direct upload to a vertex buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct BatchVertex {
    pub position: [f32; 2],
    pub uv: [f32; 2],
    pub color: [u8; 4],
}

/// Geometry for a single draw call.
///
/// Emitters append to a batch in [`ParticleSystem::draw`](crate::ParticleSystem::draw);
/// whoever owns the batch clears it between emitters. `uvs` and `colors` are either
/// empty or exactly as long as `vertices`.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawBatch {
    pub topology: BatchTopology,
    /// Texture bound once for every vertex in the batch.
    pub texture: Option<Handle<Image>>,
    pub vertices: Vec<[f32; 2]>,
    pub uvs: Vec<[f32; 2]>,
    /// RGBA bytes, the same layout as a packed `0xAABBGGRR` little-endian word.
    pub colors: Vec<[u8; 4]>,
    /// Rendered size of points for [`BatchTopology::PointList`]. Not part of
    /// [`to_mesh`](Self::to_mesh); wgpu draws points 1px wide.
    pub point_size: f32,
}

impl Default for DrawBatch {
    fn default() -> Self {
        Self {
            topology: BatchTopology::default(),
            texture: None,
            vertices: Vec::new(),
            uvs: Vec::new(),
            colors: Vec::new(),
            point_size: 1.0,
        }
    }
}

impl DrawBatch {
    /// Empties every stream while keeping the allocations.
    pub fn clear(&mut self) {
        self.topology = BatchTopology::default();
        self.texture = None;
        self.vertices.clear();
        self.uvs.clear();
        self.colors.clear();
        self.point_size = 1.0;
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn flags(&self) -> BatchFlags {
        let mut flags = BatchFlags::empty();
        if self.texture.is_some() && !self.uvs.is_empty() {
            flags |= BatchFlags::TEXTURED;
        }
        if !self.colors.is_empty() {
            flags |= BatchFlags::VERTEX_COLORS;
        }
        flags
    }

    /// Interleaves the streams. Missing UVs are zero, missing colors are opaque white.
    pub fn interleaved(&self) -> Vec<BatchVertex> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(i, position)| BatchVertex {
                position: *position,
                uv: self.uvs.get(i).copied().unwrap_or([0.0, 0.0]),
                color: self.colors.get(i).copied().unwrap_or([255, 255, 255, 255]),
            })
            .collect()
    }

    /// Converts the batch into a 2D mesh with the matching primitive topology.
    pub fn to_mesh(&self) -> Mesh {
        let topology = match self.topology {
            BatchTopology::TriangleStrip => PrimitiveTopology::TriangleStrip,
            BatchTopology::PointList => PrimitiveTopology::PointList,
        };
        let positions: Vec<[f32; 3]> = self.vertices.iter().map(|[x, y]| [*x, *y, 0.0]).collect();

        let mut mesh = Mesh::new(topology, RenderAssetUsages::default());
        mesh.insert_attribute(Mesh::ATTRIBUTE_POSITION, positions);

        let flags = self.flags();
        if flags.contains(BatchFlags::TEXTURED) {
            mesh.insert_attribute(Mesh::ATTRIBUTE_UV_0, self.uvs.clone());
        }
        if flags.contains(BatchFlags::VERTEX_COLORS) {
            let colors: Vec<[f32; 4]> = self
                .colors
                .iter()
                .map(|[r, g, b, a]| {
                    let linear = LinearRgba::from(Srgba::rgba_u8(*r, *g, *b, *a));
                    [linear.red, linear.green, linear.blue, linear.alpha]
                })
                .collect();
            mesh.insert_attribute(Mesh::ATTRIBUTE_COLOR, colors);
        }
        mesh
    }
}
