use std::collections::HashMap;

use crate::{
    data_structures::{geometry::Topology, material::{Material, MaterialKind}},
    pipelines::{
        basic::RasterState,
        scene::{SceneLayouts, mk_scene_pipeline},
    },
};

/// Everything that makes two scene pipelines differ.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct PipelineKey {
    pub format: wgpu::TextureFormat,
    pub kind: MaterialKind,
    pub raster: RasterState,
    pub blend: wgpu::BlendState,
}

impl PipelineKey {
    /// The pipeline needed to draw `material` with the given topology.
    pub fn for_material(format: wgpu::TextureFormat, material: &Material, topology: Topology) -> Self {
        Self {
            format,
            kind: material.kind,
            raster: RasterState {
                topology: topology.to_wgpu(),
                // Lines have no facing
                cull_mode: match topology {
                    Topology::Triangles => material.side.cull_mode(),
                    Topology::Lines => None,
                },
                depth_write: material.depth_write,
            },
            blend: material.blend_state(),
        }
    }
}

/// Scene pipelines created on first use and kept for the renderer's lifetime.
#[derive(Debug)]
pub struct PipelineCache {
    pub layouts: SceneLayouts,
    pipelines: HashMap<PipelineKey, wgpu::RenderPipeline>,
}

impl PipelineCache {
    pub fn new(device: &wgpu::Device) -> Self {
        Self {
            layouts: SceneLayouts::new(device),
            pipelines: HashMap::new(),
        }
    }

    pub fn get_or_create(&mut self, device: &wgpu::Device, key: PipelineKey) -> &wgpu::RenderPipeline {
        let layouts = &self.layouts;
        self.pipelines.entry(key).or_insert_with(|| {
            log::debug!("creating scene pipeline {:?}", key);
            mk_scene_pipeline(device, layouts, key.kind, key.format, key.blend, key.raster)
        })
    }

    pub fn get(&self, key: &PipelineKey) -> Option<&wgpu::RenderPipeline> {
        self.pipelines.get(key)
    }

    pub fn len(&self) -> usize {
        self.pipelines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipelines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{data_structures::material::Side, math::color::Color};

    const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Bgra8UnormSrgb;

    #[test]
    fn equal_materials_share_a_key() {
        let a = Material::basic(Color::from_hex(0x336699));
        let b = Material::basic(Color::WHITE);
        assert_eq!(
            PipelineKey::for_material(FORMAT, &a, Topology::Triangles),
            PipelineKey::for_material(FORMAT, &b, Topology::Triangles)
        );
    }

    #[test]
    fn side_topology_and_blend_split_keys() {
        let front = Material::basic(Color::WHITE);
        let double = front.clone().with_side(Side::Double);
        let faded = front.clone().with_opacity(0.5);
        let key = |m: &Material, t| PipelineKey::for_material(FORMAT, m, t);

        assert_ne!(key(&front, Topology::Triangles), key(&double, Topology::Triangles));
        assert_ne!(key(&front, Topology::Triangles), key(&faded, Topology::Triangles));
        assert_ne!(key(&front, Topology::Triangles), key(&front, Topology::Lines));
        // lines ignore the side
        assert_eq!(key(&front, Topology::Lines), key(&double, Topology::Lines));
    }
}
