use std::collections::HashMap;
use std::result;
use log::debug;
use crate::refl::{StageKind, StageReflection};
use crate::session::{Compiler, Diagnostics, EmitConfig};
use super::consts::HEADER_LEN;
use super::parse::SpirvBinary;
use super::{reflect_stage, Result};

const OP_SOURCE_CONTINUED: u32 = 2;
const OP_LINE: u32 = 8;
const OP_NO_LINE: u32 = 317;
const OP_MODULE_PROCESSED: u32 = 330;

fn is_debug_instr(opcode: u32) -> bool {
    (OP_SOURCE_CONTINUED..=OP_LINE).contains(&opcode) ||
        opcode == OP_NO_LINE ||
        opcode == OP_MODULE_PROCESSED
}
/// Remove source, name and line information (opcodes 2 to 8, `OpNoLine`
/// and `OpModuleProcessed`) from a module.
pub fn strip_debug_info(module: &SpirvBinary) -> Result<SpirvBinary> {
    let instrs = module.instrs()?;
    let words = module.words();
    let mut rv = words[..HEADER_LEN].to_owned();
    let mut pos = HEADER_LEN;
    for instr in instrs {
        let instr = instr?;
        let next = pos + instr.word_count();
        if !is_debug_instr(instr.opcode()) {
            rv.extend_from_slice(&words[pos..next]);
        }
        pos = next;
    }
    Ok(SpirvBinary::from(rv))
}

pub struct SpirvStage {
    stage: StageKind,
    module: SpirvBinary,
    refl: StageReflection,
}

/// Compiler for stages that are already compiled to SPIR-V offline, e.g. by
/// `glslangValidator`. Compilation only checks that the module has an entry
/// point for the stage.
#[derive(Debug, Default)]
pub struct SpirvCompiler;
impl SpirvCompiler {
    pub fn new() -> SpirvCompiler { SpirvCompiler }
}
impl Compiler for SpirvCompiler {
    type Source = SpirvBinary;
    type Stage = SpirvStage;

    fn compile(&mut self, stage: StageKind, src: &SpirvBinary) -> result::Result<SpirvStage, Diagnostics> {
        let refl = reflect_stage(src, stage)
            .map_err(|e| Diagnostics::new(e.to_string()))?;
        Ok(SpirvStage { stage: stage, module: src.clone(), refl: refl })
    }
    /// Blocks shared between stages must be bound to the same binding point.
    fn link(&mut self, stages: &[SpirvStage]) -> result::Result<(), Diagnostics> {
        let mut bindings = HashMap::new();
        for stage in stages {
            for block in stage.refl.blocks.iter() {
                let (first_stage, binding) = *bindings.entry(block.name.as_str())
                    .or_insert((stage.stage, block.binding));
                if binding != block.binding {
                    let msg = format!("block '{}' is bound to {:?} in {} stage but \
                        {:?} in {} stage", block.name, binding, first_stage,
                        block.binding, stage.stage);
                    return Err(Diagnostics::new(msg));
                }
            }
        }
        Ok(())
    }
    fn reflect(&self, stage: &SpirvStage) -> result::Result<StageReflection, Diagnostics> {
        Ok(stage.refl.clone())
    }
    fn emit(&self, stage: &SpirvStage, cfg: &EmitConfig) -> result::Result<Vec<u32>, Diagnostics> {
        if cfg.debug_info {
            return Ok(stage.module.words().to_owned());
        }
        let stripped = strip_debug_info(&stage.module)
            .map_err(|e| Diagnostics::new(e.to_string()))?;
        debug!("stripped {} words of debug info from {} stage",
            stage.module.words().len() - stripped.words().len(), stage.stage);
        Ok(stripped.into_words())
    }
}
