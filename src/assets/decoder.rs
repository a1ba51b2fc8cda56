//! Model decoding
//!
//! Decoding is an external concern to the cache: it only sees the
//! [`ModelDecoder`] trait. [`GltfDecoder`] is the stock implementation for
//! the portable format.

#[cfg(feature = "gltf")]
use std::sync::Arc;

#[cfg(feature = "gltf")]
use glam::{Affine3A, Mat4, Vec3, Vec4};
#[cfg(feature = "gltf")]
use smallvec::SmallVec;

use crate::assets::resource::AnimationClip;
use crate::errors::{PlacementError, Result};
use crate::scene::ModelGraph;
#[cfg(feature = "gltf")]
use crate::scene::{Geometry, GraphNode, Material, Mesh, TextureKind, TextureSlot};

/// Raw decoder output, before post-processing.
#[derive(Debug, Clone, Default)]
pub struct DecodedModel {
    pub graph: ModelGraph,
    pub animations: Vec<AnimationClip>,
}

/// Turns file bytes into a model graph.
///
/// Called from a blocking worker thread when a runtime is available, so
/// implementations may do CPU-heavy work.
pub trait ModelDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DecodedModel>;
}

/// glTF 2.0 decoder (binary `.glb` or self-contained `.gltf`).
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfDecoder;

impl ModelDecoder for GltfDecoder {
    #[cfg(feature = "gltf")]
    fn decode(&self, bytes: &[u8]) -> Result<DecodedModel> {
        let gltf = gltf::Gltf::from_slice(bytes)?;
        let buffers = load_buffers(&gltf)?;

        let materials: Vec<Material> = gltf.materials().map(|m| convert_material(&m)).collect();

        // glTF node `i` maps to graph node `i`; extra primitives are appended.
        let mut graph = ModelGraph::new();
        for node in gltf.nodes() {
            let mut graph_node = GraphNode::new();
            graph_node.name = node.name().map(str::to_string);
            graph_node
                .transform
                .apply_local_matrix(Affine3A::from_mat4(Mat4::from_cols_array_2d(&node.transform().matrix())));
            graph_node.children = node.children().map(|c| c.index()).collect();
            graph.push_node(graph_node);
        }

        for node in gltf.nodes() {
            let Some(mesh) = node.mesh() else {
                continue;
            };

            let mut meshes = Vec::new();
            for primitive in mesh.primitives() {
                if primitive.mode() != gltf::mesh::Mode::Triangles {
                    log::debug!(
                        "Skipping non-triangle primitive {} of mesh {:?}",
                        primitive.index(),
                        mesh.name()
                    );
                    continue;
                }

                let geometry = load_primitive_geometry(&primitive, &buffers);
                let material = primitive
                    .material()
                    .index()
                    .and_then(|i| materials.get(i).cloned())
                    .unwrap_or_default();

                let mut engine_mesh = Mesh::new(Arc::new(geometry), material);
                engine_mesh.name = mesh
                    .name()
                    .map_or_else(|| format!("Mesh_{}", mesh.index()), str::to_string);
                meshes.push(engine_mesh);
            }

            let idx = node.index();
            if meshes.len() == 1 {
                graph.nodes[idx].mesh = meshes.pop();
            } else {
                for m in meshes {
                    let child = graph.push_node(GraphNode::with_mesh(m));
                    graph.nodes[idx].children.push(child);
                }
            }
        }

        graph.root_indices = match gltf.default_scene().or_else(|| gltf.scenes().next()) {
            Some(scene) => scene.nodes().map(|n| n.index()).collect(),
            None => {
                let mut is_child = vec![false; gltf.nodes().len()];
                for node in gltf.nodes() {
                    for child in node.children() {
                        is_child[child.index()] = true;
                    }
                }
                (0..is_child.len()).filter(|&i| !is_child[i]).collect()
            }
        };

        let animations = load_animations(&gltf, &buffers);

        Ok(DecodedModel { graph, animations })
    }

    #[cfg(not(feature = "gltf"))]
    fn decode(&self, _bytes: &[u8]) -> Result<DecodedModel> {
        Err(PlacementError::FeatureNotEnabled(
            "glTF decoder. Enable it with `features = [\"gltf\"]`".to_string(),
        ))
    }
}

#[cfg(feature = "gltf")]
fn load_buffers(gltf: &gltf::Gltf) -> Result<Vec<Vec<u8>>> {
    use base64::Engine as _;

    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                let blob = gltf
                    .blob
                    .as_deref()
                    .ok_or_else(|| PlacementError::DecodeError("Missing GLB binary chunk".to_string()))?;
                buffer_data.push(blob.to_vec());
            }
            gltf::buffer::Source::Uri(uri) => {
                let Some(encoded) = uri
                    .strip_prefix("data:")
                    .and_then(|rest| rest.split_once(";base64,"))
                    .map(|(_, data)| data)
                else {
                    return Err(PlacementError::DecodeError(format!(
                        "External buffer references are not supported: {uri}"
                    )));
                };
                let data = base64::engine::general_purpose::STANDARD
                    .decode(encoded)
                    .map_err(|e| PlacementError::DecodeError(format!("Invalid data URI: {e}")))?;
                buffer_data.push(data);
            }
        }
    }
    Ok(buffer_data)
}

#[cfg(feature = "gltf")]
fn convert_material(material: &gltf::Material) -> Material {
    let pbr = material.pbr_metallic_roughness();
    let color = Vec4::from_array(pbr.base_color_factor());

    let mut textures = SmallVec::new();
    let mut push_slot = |kind: TextureKind, texture: gltf::Texture| {
        textures.push(TextureSlot::new(kind, texture.source().index()));
    };
    if let Some(info) = pbr.base_color_texture() {
        push_slot(TextureKind::BaseColor, info.texture());
    }
    if let Some(info) = pbr.metallic_roughness_texture() {
        push_slot(TextureKind::MetallicRoughness, info.texture());
    }
    if let Some(info) = material.normal_texture() {
        push_slot(TextureKind::Normal, info.texture());
    }
    if let Some(info) = material.occlusion_texture() {
        push_slot(TextureKind::Occlusion, info.texture());
    }
    if let Some(info) = material.emissive_texture() {
        push_slot(TextureKind::Emissive, info.texture());
    }

    Material {
        name: material.name().map(str::to_string),
        color,
        opacity: color.w,
        transparent: material.alpha_mode() == gltf::material::AlphaMode::Blend,
        textures,
    }
}

#[cfg(feature = "gltf")]
fn load_primitive_geometry(primitive: &gltf::Primitive, buffers: &[Vec<u8>]) -> Geometry {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));

    let positions: Vec<Vec3> = reader
        .read_positions()
        .map(|iter| iter.map(Vec3::from_array).collect())
        .unwrap_or_default();

    let mut geometry = Geometry::new(positions);
    if let Some(iter) = reader.read_normals() {
        geometry = geometry.with_normals(iter.map(Vec3::from_array).collect());
    }
    if let Some(iter) = reader.read_indices() {
        geometry = geometry.with_indices(iter.into_u32().collect());
    }
    geometry
}

/// Clip names and durations, in document order.
#[cfg(feature = "gltf")]
fn load_animations(gltf: &gltf::Gltf, buffers: &[Vec<u8>]) -> Vec<AnimationClip> {
    gltf.animations()
        .map(|anim| {
            let duration = anim
                .channels()
                .filter_map(|channel| {
                    let reader = channel.reader(|buffer| buffers.get(buffer.index()).map(Vec::as_slice));
                    reader.read_inputs().map(|times| times.fold(0.0_f32, f32::max))
                })
                .fold(0.0_f32, f32::max);

            let name = anim
                .name()
                .map_or_else(|| format!("Animation_{}", anim.index()), str::to_string);

            AnimationClip { name, duration }
        })
        .collect()
}
