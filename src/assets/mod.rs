//! glTF model loading.
//!
//! Flattens the asset's node hierarchy into a list of named mesh
//! primitives with world transforms, CPU geometry, and decoded base-color
//! images, ready for GPU upload and ray picking. Loading is synchronous
//! and reports either a complete model or a described failure.

use glam::{Mat4, Vec3};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("failed to read glTF at {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to import glTF at {path}: {source}")]
    Import {
        path: String,
        #[source]
        source: gltf::Error,
    },
    #[error("glTF at {path} contains no mesh primitives")]
    NoMeshes { path: String },
}

/// Decoded RGBA8 image for a mesh's base-color slot.
#[derive(Debug, Clone)]
pub struct ImageData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

/// One mesh primitive, flattened out of the glTF node hierarchy.
#[derive(Debug, Clone)]
pub struct MeshData {
    pub name: String,
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// World transform accumulated down the node hierarchy.
    pub transform: Mat4,
    pub base_color_factor: [f32; 4],
    pub base_color_image: Option<ImageData>,
}

impl MeshData {
    /// World-space axis-aligned bounds of this primitive.
    pub fn bounds(&self) -> ([f32; 3], [f32; 3]) {
        let mut min = Vec3::splat(f32::MAX);
        let mut max = Vec3::splat(f32::MIN);
        for position in &self.positions {
            let world = self.transform.transform_point3(Vec3::from_array(*position));
            min = min.min(world);
            max = max.max(world);
        }
        if self.positions.is_empty() {
            return ([0.0; 3], [0.0; 3]);
        }
        let center = (min + max) * 0.5;
        let extent = (max - min) * 0.5;
        (center.to_array(), extent.to_array())
    }
}

#[derive(Debug, Clone)]
pub struct ModelAsset {
    pub name: String,
    pub meshes: Vec<MeshData>,
    pub center: [f32; 3],
    pub extent: [f32; 3],
}

pub fn load_model(path: &Path) -> Result<ModelAsset, AssetError> {
    let name = PathBuf::from(path)
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("model")
        .to_string();
    let is_glb = path
        .extension()
        .and_then(|value| value.to_str())
        .map(|value| value.eq_ignore_ascii_case("glb"))
        .unwrap_or(false);
    if is_glb {
        // Self-contained binary asset: read it ourselves so IO failures
        // are reported distinctly from malformed content.
        let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
            path: path.display().to_string(),
            source,
        })?;
        return load_model_from_slice(&bytes, &name);
    }
    // .gltf may reference sibling buffer/image files; let the importer
    // resolve them relative to the path.
    let (document, buffers, images) =
        gltf::import(path).map_err(|source| AssetError::Import {
            path: path.display().to_string(),
            source,
        })?;
    build_model(&document, &buffers, &images, name, path)
}

/// Import from an in-memory `.glb`/`.gltf` byte slice.
pub fn load_model_from_slice(bytes: &[u8], name: &str) -> Result<ModelAsset, AssetError> {
    let (document, buffers, images) =
        gltf::import_slice(bytes).map_err(|source| AssetError::Import {
            path: name.to_string(),
            source,
        })?;
    build_model(&document, &buffers, &images, name.to_string(), Path::new(name))
}

fn build_model(
    document: &gltf::Document,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    name: String,
    path: &Path,
) -> Result<ModelAsset, AssetError> {
    let mut meshes = Vec::new();
    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next());
    if let Some(scene) = scene {
        for node in scene.nodes() {
            visit_node(&node, Mat4::IDENTITY, buffers, images, &mut meshes);
        }
    }
    if meshes.is_empty() {
        return Err(AssetError::NoMeshes {
            path: path.display().to_string(),
        });
    }

    let mut min = Vec3::splat(f32::MAX);
    let mut max = Vec3::splat(f32::MIN);
    for mesh in &meshes {
        let (center, extent) = mesh.bounds();
        min = min.min(Vec3::from_array(center) - Vec3::from_array(extent));
        max = max.max(Vec3::from_array(center) + Vec3::from_array(extent));
    }
    let center = ((min + max) * 0.5).to_array();
    let extent = ((max - min) * 0.5).to_array();

    log::info!(
        "Loaded '{}': {} mesh primitives, center {:?} extent {:?}",
        name,
        meshes.len(),
        center,
        extent
    );
    Ok(ModelAsset {
        name,
        meshes,
        center,
        extent,
    })
}

fn visit_node(
    node: &gltf::Node,
    parent: Mat4,
    buffers: &[gltf::buffer::Data],
    images: &[gltf::image::Data],
    out: &mut Vec<MeshData>,
) {
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let world = parent * local;

    if let Some(mesh) = node.mesh() {
        for (primitive_index, primitive) in mesh.primitives().enumerate() {
            let reader =
                primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| data.0.as_slice()));
            let Some(positions) = reader.read_positions() else {
                continue;
            };
            let positions: Vec<[f32; 3]> = positions.collect();
            let normals: Vec<[f32; 3]> = reader
                .read_normals()
                .map(|iter| iter.collect())
                .unwrap_or_else(|| vec![[0.0, 1.0, 0.0]; positions.len()]);
            let uvs: Vec<[f32; 2]> = reader
                .read_tex_coords(0)
                .map(|iter| iter.into_f32().collect())
                .unwrap_or_else(|| vec![[0.0, 0.0]; positions.len()]);
            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            let material = primitive.material();
            let pbr = material.pbr_metallic_roughness();
            let base_color_image = pbr
                .base_color_texture()
                .and_then(|info| images.get(info.texture().source().index()))
                .and_then(decode_image);

            let name = node
                .name()
                .or_else(|| mesh.name())
                .map(str::to_string)
                .unwrap_or_else(|| format!("mesh{}_{}", mesh.index(), primitive_index));

            out.push(MeshData {
                name,
                positions,
                normals,
                uvs,
                indices,
                transform: world,
                base_color_factor: pbr.base_color_factor(),
                base_color_image,
            });
        }
    }

    for child in node.children() {
        visit_node(&child, world, buffers, images, out);
    }
}

/// Expand the importer's pixel formats to RGBA8. Formats the viewer does
/// not shade with (16-bit, float) fall back to the untextured path.
fn decode_image(data: &gltf::image::Data) -> Option<ImageData> {
    use gltf::image::Format;

    let pixel_count = (data.width as usize) * (data.height as usize);
    let pixels = match data.format {
        Format::R8G8B8A8 => data.pixels.clone(),
        Format::R8G8B8 => {
            let mut rgba = Vec::with_capacity(pixel_count * 4);
            for rgb in data.pixels.chunks_exact(3) {
                rgba.extend_from_slice(&[rgb[0], rgb[1], rgb[2], 255]);
            }
            rgba
        }
        Format::R8G8 => {
            let mut rgba = Vec::with_capacity(pixel_count * 4);
            for rg in data.pixels.chunks_exact(2) {
                rgba.extend_from_slice(&[rg[0], rg[1], 0, 255]);
            }
            rgba
        }
        Format::R8 => {
            let mut rgba = Vec::with_capacity(pixel_count * 4);
            for value in &data.pixels {
                rgba.extend_from_slice(&[*value, *value, *value, 255]);
            }
            rgba
        }
        other => {
            log::debug!("Skipping base color image with unsupported format {:?}", other);
            return None;
        }
    };

    Some(ImageData {
        width: data.width,
        height: data.height,
        pixels,
    })
}

#[cfg(test)]
mod tests {
    use super::{load_model, load_model_from_slice, AssetError};
    use std::path::Path;

    /// Build a minimal binary glTF: one node named `area01` holding a
    /// single triangle in the XY plane.
    fn triangle_glb() -> Vec<u8> {
        let positions: [f32; 9] = [0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0];
        let mut bin: Vec<u8> = Vec::new();
        for value in positions {
            bin.extend_from_slice(&value.to_le_bytes());
        }
        while bin.len() % 4 != 0 {
            bin.push(0);
        }

        let json = format!(
            concat!(
                r#"{{"asset":{{"version":"2.0"}},"#,
                r#""scene":0,"scenes":[{{"nodes":[0]}}],"#,
                r#""nodes":[{{"mesh":0,"name":"area01"}}],"#,
                r#""meshes":[{{"primitives":[{{"attributes":{{"POSITION":0}}}}]}}],"#,
                r#""accessors":[{{"bufferView":0,"componentType":5126,"count":3,"type":"VEC3","#,
                r#""min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]}}],"#,
                r#""bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":{len}}}],"#,
                r#""buffers":[{{"byteLength":{len}}}]}}"#
            ),
            len = bin.len()
        );
        let mut json = json.into_bytes();
        while json.len() % 4 != 0 {
            json.push(b' ');
        }

        let total = 12 + 8 + json.len() + 8 + bin.len();
        let mut glb = Vec::with_capacity(total);
        glb.extend_from_slice(b"glTF");
        glb.extend_from_slice(&2u32.to_le_bytes());
        glb.extend_from_slice(&(total as u32).to_le_bytes());
        glb.extend_from_slice(&(json.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"JSON");
        glb.extend_from_slice(&json);
        glb.extend_from_slice(&(bin.len() as u32).to_le_bytes());
        glb.extend_from_slice(b"BIN\0");
        glb.extend_from_slice(&bin);
        glb
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let err = load_model(Path::new("definitely/not/here.glb")).unwrap_err();
        assert!(matches!(err, AssetError::Read { .. }));
    }

    #[test]
    fn garbage_bytes_are_an_import_error() {
        let err = load_model_from_slice(b"not a gltf", "garbage").unwrap_err();
        assert!(matches!(err, AssetError::Import { .. }));
    }

    #[test]
    fn triangle_glb_yields_one_named_mesh() {
        let model = load_model_from_slice(&triangle_glb(), "triangle.glb").unwrap();
        assert_eq!(model.meshes.len(), 1);
        let mesh = &model.meshes[0];
        assert_eq!(mesh.name, "area01");
        assert_eq!(mesh.positions.len(), 3);
        assert_eq!(mesh.indices, vec![0, 1, 2]);
        assert_eq!(mesh.normals.len(), 3);
        assert_eq!(mesh.uvs.len(), 3);
        let (center, extent) = mesh.bounds();
        assert!((center[0] - 0.5).abs() < 1e-6);
        assert!((extent[1] - 0.5).abs() < 1e-6);
    }
}
