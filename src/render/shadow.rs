//! Directional shadow mapping.
//!
//! A depth-only pass renders every node from the key light's point of view
//! into a fixed-size depth texture; the main pass samples it with a
//! comparison sampler for a small PCF kernel. The light frustum is an
//! orthographic box refit to the loaded model's bounds.

use glam::{Mat4, Vec3};

pub const SHADOW_MAP_SIZE: u32 = 2048;

/// Orthographic view-projection for the key light, fitted around a bounding
/// sphere of the scene.
pub fn light_view_projection(center: Vec3, radius: f32, light_dir: Vec3) -> Mat4 {
    let radius = radius.max(0.1);
    let dir = light_dir.normalize_or_zero();
    let eye = center - dir * radius * 2.0;
    let up = if dir.y.abs() > 0.99 { Vec3::Z } else { Vec3::Y };
    let view = Mat4::look_at_rh(eye, center, up);
    let projection = Mat4::orthographic_rh(-radius, radius, -radius, radius, 0.05, radius * 4.0);
    projection * view
}

pub struct ShadowPass {
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub pipeline: wgpu::RenderPipeline,
    pub light_buffer: wgpu::Buffer,
    pub light_bind_group: wgpu::BindGroup,
}

impl ShadowPass {
    /// `node_layout` is the per-node bind group layout shared with the main
    /// pass; the depth-only shader reads just the node uniform out of it.
    pub fn new(device: &wgpu::Device, node_layout: &wgpu::BindGroupLayout) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("shadow map"),
            size: wgpu::Extent3d {
                width: SHADOW_MAP_SIZE,
                height: SHADOW_MAP_SIZE,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Depth32Float,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("shadow sampler"),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Linear,
            min_filter: wgpu::FilterMode::Linear,
            compare: Some(wgpu::CompareFunction::LessEqual),
            ..Default::default()
        });

        let light_buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("shadow light uniform"),
            size: std::mem::size_of::<[[f32; 4]; 4]>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });
        let light_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("shadow light layout"),
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: None,
                },
                count: None,
            }],
        });
        let light_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("shadow light bind group"),
            layout: &light_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: light_buffer.as_entire_binding(),
            }],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("shadow shader"),
            source: wgpu::ShaderSource::Wgsl(include_str!("shadow.wgsl").into()),
        });
        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("shadow pipeline layout"),
            bind_group_layouts: &[&light_layout, node_layout],
            push_constant_ranges: &[],
        });
        let pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("shadow pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: wgpu::PipelineCompilationOptions::default(),
                buffers: &[super::Vertex::layout()],
            },
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                cull_mode: Some(wgpu::Face::Back),
                ..Default::default()
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: wgpu::TextureFormat::Depth32Float,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                // Nudge depth to keep self-shadow acne off flat surfaces.
                bias: wgpu::DepthBiasState {
                    constant: 2,
                    slope_scale: 2.0,
                    clamp: 0.0,
                },
            }),
            multisample: wgpu::MultisampleState::default(),
            fragment: None,
            multiview: None,
            cache: None,
        });

        Self {
            view,
            sampler,
            pipeline,
            light_buffer,
            light_bind_group,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::light_view_projection;
    use glam::{Vec3, Vec4};

    #[test]
    fn scene_center_lands_in_the_middle_of_the_light_frustum() {
        let center = Vec3::new(2.0, 1.0, -3.0);
        let matrix = light_view_projection(center, 4.0, Vec3::new(0.0, -1.0, -0.5));
        let clip = matrix * Vec4::new(center.x, center.y, center.z, 1.0);
        let ndc = clip / clip.w;
        assert!(ndc.x.abs() < 1e-4);
        assert!(ndc.y.abs() < 1e-4);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn points_within_the_radius_stay_inside_the_frustum() {
        let center = Vec3::ZERO;
        let radius = 5.0;
        let matrix = light_view_projection(center, radius, Vec3::new(0.3, -1.0, 0.2));
        for offset in [
            Vec3::new(3.0, 0.0, 0.0),
            Vec3::new(0.0, 3.0, 0.0),
            Vec3::new(0.0, 0.0, 3.0),
            Vec3::new(-2.0, -2.0, 1.0),
        ] {
            let p = center + offset;
            let clip = matrix * Vec4::new(p.x, p.y, p.z, 1.0);
            let ndc = clip / clip.w;
            assert!(ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0);
            assert!((0.0..=1.0).contains(&ndc.z));
        }
    }

    #[test]
    fn straight_down_light_does_not_degenerate() {
        let matrix = light_view_projection(Vec3::ZERO, 2.0, Vec3::new(0.0, -1.0, 0.0));
        assert!(matrix.is_finite());
    }
}
