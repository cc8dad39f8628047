use bevy::{mesh::PrimitiveTopology, prelude::*};
use bevy_embers::{BatchFlags, BatchTopology, BatchVertex, DrawBatch};

fn strip_batch() -> DrawBatch {
    DrawBatch {
        topology: BatchTopology::TriangleStrip,
        texture: Some(Handle::default()),
        vertices: vec![[0.0, 0.0], [0.0, 0.0], [2.0, 0.0], [0.0, 2.0], [2.0, 2.0], [2.0, 2.0]],
        uvs: vec![[0.0, 0.0], [0.0, 0.0], [1.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 1.0]],
        colors: vec![[255, 255, 255, 128]; 6],
        point_size: 1.0,
    }
}

fn point_batch() -> DrawBatch {
    DrawBatch {
        topology: BatchTopology::PointList,
        vertices: vec![[1.0, 2.0], [3.0, 4.0]],
        colors: vec![[255, 0, 0, 255], [0, 0, 255, 255]],
        point_size: 4.0,
        ..default()
    }
}

#[test]
fn flags_reflect_present_streams() {
    assert_eq!(
        strip_batch().flags(),
        BatchFlags::TEXTURED | BatchFlags::VERTEX_COLORS
    );
    assert_eq!(point_batch().flags(), BatchFlags::VERTEX_COLORS);
    assert_eq!(DrawBatch::default().flags(), BatchFlags::empty());
}

#[test]
fn strip_batch_converts_to_textured_mesh() {
    let mesh = strip_batch().to_mesh();

    assert_eq!(mesh.primitive_topology(), PrimitiveTopology::TriangleStrip);
    assert_eq!(mesh.count_vertices(), 6);
    assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_some());
    assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
}

#[test]
fn point_batch_converts_to_point_list_without_uvs() {
    let mesh = point_batch().to_mesh();

    assert_eq!(mesh.primitive_topology(), PrimitiveTopology::PointList);
    assert_eq!(mesh.count_vertices(), 2);
    assert!(mesh.attribute(Mesh::ATTRIBUTE_UV_0).is_none());
    assert!(mesh.attribute(Mesh::ATTRIBUTE_COLOR).is_some());
}

#[test]
fn interleaved_vertices_fill_missing_streams() {
    let vertices = point_batch().interleaved();

    assert_eq!(
        vertices[1],
        BatchVertex {
            position: [3.0, 4.0],
            uv: [0.0, 0.0],
            color: [0, 0, 255, 255],
        }
    );

    let uncolored = DrawBatch {
        vertices: vec![[5.0, 6.0]],
        ..default()
    };
    assert_eq!(uncolored.interleaved()[0].color, [255, 255, 255, 255]);
}

#[test]
fn interleaved_vertices_are_tightly_packed() {
    let vertices = strip_batch().interleaved();
    let bytes: &[u8] = bytemuck::cast_slice(&vertices);

    assert_eq!(std::mem::size_of::<BatchVertex>(), 20);
    assert_eq!(bytes.len(), 6 * 20);
}

#[test]
fn clear_resets_every_stream() {
    let mut batch = strip_batch();
    batch.clear();

    assert!(batch.is_empty());
    assert!(batch.uvs.is_empty());
    assert!(batch.colors.is_empty());
    assert!(batch.texture.is_none());
    assert_eq!(batch, DrawBatch::default());
}
