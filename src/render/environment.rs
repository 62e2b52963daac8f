//! Image-based lighting from a procedural room preset.
//!
//! Instead of loading an authored HDR, the environment is a small cube map
//! painted at startup: a lit ceiling panel, neutral walls, a warm window
//! wall and a dark floor. The main pass samples it by the world normal as
//! ambient irradiance, and the key light is derived from the same preset so
//! shadows agree with the brightest wall.

use glam::Vec3;

pub const FACE_SIZE: u32 = 64;

/// Cube face layer order matches wgpu: +X, -X, +Y, -Y, +Z, -Z.
const FACE_POS_X: usize = 0;
const FACE_NEG_X: usize = 1;
const FACE_POS_Y: usize = 2;
const FACE_NEG_Y: usize = 3;
const FACE_POS_Z: usize = 4;
const FACE_NEG_Z: usize = 5;

/// Directional key light implied by the room preset: down from the ceiling,
/// angled away from the window wall.
pub fn key_light_direction() -> Vec3 {
    Vec3::new(0.0, -1.0, -0.5).normalize()
}

pub fn key_light_color() -> [f32; 3] {
    [1.0, 0.98, 0.94]
}

/// Paint all six faces of the room cube map as tightly packed RGBA8.
pub fn room_cube_pixels(size: u32) -> Vec<u8> {
    let size = size.max(1);
    let mut pixels = Vec::with_capacity((size * size * 6 * 4) as usize);
    for face in 0..6 {
        for y in 0..size {
            for x in 0..size {
                let u = (x as f32 + 0.5) / size as f32;
                let v = (y as f32 + 0.5) / size as f32;
                pixels.extend_from_slice(&face_texel(face, u, v));
            }
        }
    }
    pixels
}

fn face_texel(face: usize, u: f32, v: f32) -> [u8; 4] {
    match face {
        FACE_POS_Y => ceiling_texel(u, v),
        FACE_NEG_Y => floor_texel(u, v),
        FACE_POS_Z => window_wall_texel(u, v),
        FACE_POS_X | FACE_NEG_X | FACE_NEG_Z => wall_texel(v),
        _ => [0, 0, 0, 255],
    }
}

fn ceiling_texel(u: f32, v: f32) -> [u8; 4] {
    // Bright rectangular light panel in the middle of an off-white ceiling.
    let in_panel = (u - 0.5).abs() < 0.28 && (v - 0.5).abs() < 0.18;
    if in_panel {
        [255, 252, 244, 255]
    } else {
        [204, 202, 198, 255]
    }
}

fn floor_texel(u: f32, v: f32) -> [u8; 4] {
    // Dark floor, slightly lighter toward the middle of the room.
    let center_falloff = 1.0 - ((u - 0.5).abs() + (v - 0.5).abs()).min(1.0) * 0.4;
    let value = (52.0 * center_falloff) as u8;
    [value, value, value.saturating_add(2), 255]
}

fn window_wall_texel(_u: f32, v: f32) -> [u8; 4] {
    // Warm daylight wall, brighter toward the top.
    let brightness = 0.78 + (1.0 - v) * 0.2;
    [
        (238.0 * brightness) as u8,
        (228.0 * brightness) as u8,
        (208.0 * brightness) as u8,
        255,
    ]
}

fn wall_texel(v: f32) -> [u8; 4] {
    // Neutral grey walls with a soft top-to-bottom gradient.
    let value = (150.0 - v * 36.0) as u8;
    [value, value, value, 255]
}

/// GPU half: the cube texture, its view, and the sampler bound by the main
/// pass.
pub struct Environment {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Environment {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let size = wgpu::Extent3d {
            width: FACE_SIZE,
            height: FACE_SIZE,
            depth_or_array_layers: 6,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("room environment"),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        let pixels = room_cube_pixels(FACE_SIZE);
        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            &pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(FACE_SIZE * 4),
                rows_per_image: Some(FACE_SIZE),
            },
            size,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some("room environment view"),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("room environment sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        Self { view, sampler }
    }
}

#[cfg(test)]
mod tests {
    use super::{key_light_direction, room_cube_pixels, FACE_NEG_Y, FACE_POS_Y, FACE_SIZE};

    fn face_mean_luma(pixels: &[u8], size: u32, face: usize) -> f32 {
        let face_bytes = (size * size * 4) as usize;
        let face_pixels = &pixels[face * face_bytes..(face + 1) * face_bytes];
        let mut sum = 0.0;
        for rgba in face_pixels.chunks_exact(4) {
            sum += (rgba[0] as f32 + rgba[1] as f32 + rgba[2] as f32) / 3.0;
        }
        sum / (size * size) as f32
    }

    #[test]
    fn buffer_covers_six_opaque_faces() {
        let pixels = room_cube_pixels(FACE_SIZE);
        assert_eq!(pixels.len(), (FACE_SIZE * FACE_SIZE * 6 * 4) as usize);
        assert!(pixels.chunks_exact(4).all(|rgba| rgba[3] == 255));
    }

    #[test]
    fn ceiling_is_brighter_than_the_floor() {
        let pixels = room_cube_pixels(FACE_SIZE);
        let ceiling = face_mean_luma(&pixels, FACE_SIZE, FACE_POS_Y);
        let floor = face_mean_luma(&pixels, FACE_SIZE, FACE_NEG_Y);
        assert!(ceiling > floor * 2.0);
    }

    #[test]
    fn key_light_points_downward_and_is_normalized() {
        let dir = key_light_direction();
        assert!(dir.y < 0.0);
        assert!((dir.length() - 1.0).abs() < 1e-6);
    }
}
