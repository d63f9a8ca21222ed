//! Shared base geometry for every instance: a unit quad standing on the
//! baseline, `x` in `[-0.5, 0.5]` and `y` in `[0, 1]`.

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct QuadVertex {
    pub position: [f32; 2],
}

pub const QUAD_VERTICES: [QuadVertex; 4] = [
    QuadVertex { position: [0.5, 1.0] },  // top right
    QuadVertex { position: [0.5, 0.0] },  // bottom right
    QuadVertex { position: [-0.5, 0.0] }, // bottom left
    QuadVertex { position: [-0.5, 1.0] }, // top left
];

pub const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

#[inline]
pub fn quad_index_count() -> u32 {
    QUAD_INDICES.len() as u32
}
