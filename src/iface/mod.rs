//! Shader Interface
//!
//! Merge per-stage reflection into a single description of everything a
//! linked program exposes to the host.
mod ingest;
mod render;

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use ash::vk;
use log::{trace, warn};
use serde::Serialize;
use crate::refl::{StageKind, StorageQualifier, TypeDesc, TypeTag, size};
pub use ingest::*;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BlockKind {
    Uniform,
    Storage,
    Push,
}
impl BlockKind {
    pub fn name(&self) -> &'static str {
        match self {
            BlockKind::Uniform => "uniform",
            BlockKind::Storage => "storage",
            BlockKind::Push => "push",
        }
    }
}
/// Decide what kind of block a storage qualifier declares. The push constant
/// flag overrides everything else, and unrecognized qualifiers fall back to
/// ordinary uniform blocks.
pub fn classify(storage: StorageQualifier, is_push_const: bool) -> BlockKind {
    if is_push_const {
        BlockKind::Push
    } else if storage == StorageQualifier::Buffer {
        BlockKind::Storage
    } else {
        BlockKind::Uniform
    }
}

/// Split a flattened block member name like `Matrices.projection` into the
/// block name and the member name. Names with any other number of segments,
/// or with empty segments, are not block members.
pub fn resolve_member_path(name: &str) -> Option<(&str, &str)> {
    let mut segs = name.split('.');
    match (segs.next(), segs.next(), segs.next()) {
        (Some(block), Some(member), None) if !block.is_empty() && !member.is_empty() => {
            Some((block, member))
        },
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Uniform {
    #[serde(serialize_with = "render::sentinel")]
    pub binding: Option<u32>,
    /// Offset in the owning block. Only meaningful for block members.
    #[serde(serialize_with = "render::sentinel")]
    pub offset: Option<usize>,
    /// Only resolved for block members.
    #[serde(serialize_with = "render::sentinel")]
    pub size: Option<usize>,
    #[serde(rename = "type")]
    pub ty: TypeTag,
    pub read_only: bool,
    pub write_only: bool,
    #[serde(rename = "stageFlags", serialize_with = "render::stage_flags")]
    pub stages: vk::ShaderStageFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniformBlock {
    #[serde(serialize_with = "render::sentinel")]
    pub binding: Option<u32>,
    pub size: usize,
    #[serde(rename = "stageFlags", serialize_with = "render::stage_flags")]
    pub stages: vk::ShaderStageFlags,
    #[serde(rename = "type")]
    pub kind: BlockKind,
    pub uniforms: BTreeMap<String, Uniform>,
}
impl UniformBlock {
    pub fn get_uniform(&self, name: &str) -> Option<&Uniform> { self.uniforms.get(name) }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attribute {
    #[serde(rename = "set", serialize_with = "render::sentinel")]
    pub desc_set: Option<u32>,
    #[serde(serialize_with = "render::sentinel")]
    pub location: Option<u32>,
    pub size: usize,
    #[serde(rename = "type")]
    pub ty: TypeTag,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    #[serde(serialize_with = "render::sentinel")]
    pub binding: Option<u32>,
    pub size: usize,
    #[serde(rename = "stageFlags", serialize_with = "render::stage_flags")]
    pub stages: vk::ShaderStageFlags,
    #[serde(rename = "type")]
    pub ty: TypeTag,
}

/// Aggregated interface of a multi-stage program. Symbols are keyed by name
/// and never removed; the first stage to report a symbol decides its layout
/// and later stages can only extend its stage visibility.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShaderInterface {
    attributes: BTreeMap<String, Attribute>,
    uniforms: BTreeMap<String, Uniform>,
    uniform_blocks: BTreeMap<String, UniformBlock>,
    constants: BTreeMap<String, Constant>,
}
impl ShaderInterface {
    pub fn new() -> ShaderInterface { Default::default() }

    pub fn uniforms(&self) -> &BTreeMap<String, Uniform> { &self.uniforms }
    pub fn uniform_blocks(&self) -> &BTreeMap<String, UniformBlock> { &self.uniform_blocks }
    pub fn attributes(&self) -> &BTreeMap<String, Attribute> { &self.attributes }
    pub fn constants(&self) -> &BTreeMap<String, Constant> { &self.constants }

    pub fn get_uniform(&self, name: &str) -> Option<&Uniform> { self.uniforms.get(name) }
    pub fn get_uniform_block(&self, name: &str) -> Option<&UniformBlock> { self.uniform_blocks.get(name) }
    pub fn get_attribute(&self, name: &str) -> Option<&Attribute> { self.attributes.get(name) }
    pub fn get_constant(&self, name: &str) -> Option<&Constant> { self.constants.get(name) }

    pub fn is_empty(&self) -> bool {
        self.uniforms.is_empty() &&
            self.uniform_blocks.is_empty() &&
            self.attributes.is_empty() &&
            self.constants.is_empty()
    }

    pub fn merge_block(
        &mut self,
        name: &str,
        binding: Option<u32>,
        size: usize,
        stage: StageKind,
        storage: StorageQualifier,
        is_push_const: bool,
    ) {
        if let Some(block) = self.uniform_blocks.get_mut(name) {
            if block.binding != binding || block.size != size {
                warn!("block '{}' reported by {} stage as (binding={:?}, size={}) \
                    but was first seen as (binding={:?}, size={}); keeping the \
                    first", name, stage, binding, size, block.binding, block.size);
            }
            block.stages |= stage.flag();
            return;
        }
        let kind = classify(storage, is_push_const);
        trace!("discovered {} block '{}' in {} stage", kind.name(), name, stage);
        let block = UniformBlock {
            binding: binding,
            size: size,
            stages: stage.flag(),
            kind: kind,
            uniforms: BTreeMap::new(),
        };
        self.uniform_blocks.insert(name.to_owned(), block);
    }

    pub fn merge_uniform(
        &mut self,
        name: &str,
        binding: Option<u32>,
        offset: Option<usize>,
        ty: &TypeDesc,
        stage: StageKind,
        read_only: bool,
        write_only: bool,
    ) {
        if binding.is_none() {
            if let Some((block_name, member_name)) = resolve_member_path(name) {
                if let Some(block) = self.uniform_blocks.get_mut(block_name) {
                    let member = block.uniforms.entry(member_name.to_owned())
                        .or_insert_with(|| Uniform {
                            binding: None,
                            offset: offset,
                            size: Some(size(ty)),
                            ty: ty.tag(),
                            read_only: false,
                            write_only: false,
                            stages: vk::ShaderStageFlags::empty(),
                        });
                    member.stages |= stage.flag();
                    trace!("merged member '{}' of block '{}' from {} stage",
                        member_name, block_name, stage);
                    return;
                }
            }
        }
        match self.uniforms.entry(name.to_owned()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().stages |= stage.flag();
            },
            Entry::Vacant(entry) => {
                trace!("discovered uniform '{}' in {} stage", name, stage);
                entry.insert(Uniform {
                    binding: binding,
                    offset: offset,
                    size: None,
                    ty: ty.tag(),
                    read_only: read_only,
                    write_only: write_only,
                    stages: stage.flag(),
                });
            },
        }
    }

    /// Attributes are stage-local so the first stage reporting a name wins
    /// and nothing is merged afterwards.
    pub fn merge_attribute(
        &mut self,
        name: &str,
        desc_set: Option<u32>,
        location: Option<u32>,
        ty: &TypeDesc,
    ) {
        if name.is_empty() { return; }
        if let Entry::Vacant(entry) = self.attributes.entry(name.to_owned()) {
            trace!("discovered attribute '{}' at location {:?}", name, location);
            entry.insert(Attribute {
                desc_set: desc_set,
                location: location,
                size: size(ty),
                ty: ty.tag(),
            });
        }
    }

    pub fn merge_constant(
        &mut self,
        name: &str,
        binding: Option<u32>,
        ty: &TypeDesc,
        stage: StageKind,
    ) {
        if name.is_empty() { return; }
        match self.constants.entry(name.to_owned()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().stages |= stage.flag();
            },
            Entry::Vacant(entry) => {
                trace!("discovered constant '{}' in {} stage", name, stage);
                entry.insert(Constant {
                    binding: binding,
                    size: size(ty),
                    stages: stage.flag(),
                    ty: ty.tag(),
                });
            },
        }
    }
}
