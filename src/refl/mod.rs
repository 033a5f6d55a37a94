//! Per-stage reflection data.
//!
//! This is what a shader compiler hands over after a stage compiled and
//! linked successfully. Only live symbols are listed.
mod ty;

use std::fmt;
use ash::vk;
pub use ty::*;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy, PartialOrd, Ord)]
pub enum StageKind {
    Vertex,
    TessControl,
    TessEvaluation,
    Geometry,
    Fragment,
    Compute,
}
impl StageKind {
    pub fn all() -> &'static [StageKind] {
        use StageKind::*;
        &[Vertex, TessControl, TessEvaluation, Geometry, Fragment, Compute]
    }
    /// Vulkan stage bit, used as the unit of stage visibility.
    pub fn flag(&self) -> vk::ShaderStageFlags {
        use StageKind::*;
        match self {
            Vertex => vk::ShaderStageFlags::VERTEX,
            TessControl => vk::ShaderStageFlags::TESSELLATION_CONTROL,
            TessEvaluation => vk::ShaderStageFlags::TESSELLATION_EVALUATION,
            Geometry => vk::ShaderStageFlags::GEOMETRY,
            Fragment => vk::ShaderStageFlags::FRAGMENT,
            Compute => vk::ShaderStageFlags::COMPUTE,
        }
    }
    /// Conventional file extension for GLSL sources of this stage.
    pub fn ext(&self) -> &'static str {
        use StageKind::*;
        match self {
            Vertex => "vert",
            TessControl => "tesc",
            TessEvaluation => "tese",
            Geometry => "geom",
            Fragment => "frag",
            Compute => "comp",
        }
    }
}
impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.ext())
    }
}

/// Storage qualifier of a block as declared in source.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum StorageQualifier {
    Uniform,
    /// `buffer` in GLSL, shader storage block.
    Buffer,
    /// Anything else the compiler might report.
    Other,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedBlock {
    pub name: String,
    pub binding: Option<u32>,
    pub size: usize,
    pub storage: StorageQualifier,
    pub is_push_const: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedUniform {
    /// Fully qualified name. Block members are reported as `Block.member`.
    pub name: String,
    /// `None` for symbols residing in a block.
    pub binding: Option<u32>,
    pub offset: Option<usize>,
    pub ty: TypeDesc,
    pub read_only: bool,
    pub write_only: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedInput {
    /// Can be empty for placeholder inputs.
    pub name: String,
    pub desc_set: Option<u32>,
    pub location: Option<u32>,
    pub ty: TypeDesc,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReflectedConstant {
    pub name: String,
    /// Specialization constant ID.
    pub binding: Option<u32>,
    pub ty: TypeDesc,
}

/// Live symbols of one compiled stage, in the order the compiler reported
/// them.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct StageReflection {
    pub blocks: Vec<ReflectedBlock>,
    pub uniforms: Vec<ReflectedUniform>,
    pub inputs: Vec<ReflectedInput>,
    pub constants: Vec<ReflectedConstant>,
}
impl StageReflection {
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty() &&
            self.uniforms.is_empty() &&
            self.inputs.is_empty() &&
            self.constants.is_empty()
    }
}


#[cfg(test)]
mod test {
    use super::{*};
    #[test]
    fn test_stage_flags_distinct() {
        let mut acc = vk::ShaderStageFlags::empty();
        for stage in StageKind::all() {
            assert!(!acc.intersects(stage.flag()));
            acc |= stage.flag();
        }
        assert_eq!(StageKind::Vertex.flag().as_raw(), 0x1);
        assert_eq!(StageKind::Fragment.flag().as_raw(), 0x10);
    }
    #[test]
    fn test_stage_display() {
        assert_eq!(StageKind::Fragment.to_string(), "frag");
        assert_eq!(StageKind::TessEvaluation.to_string(), "tese");
    }
}
