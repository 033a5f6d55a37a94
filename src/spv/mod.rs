//! SPIR-V Reflection
//!
//! Extract the live interface of a stage from precompiled SPIR-V, and drive
//! sessions over such modules with `SpirvCompiler`.
mod consts;
mod parse;
mod reflect;
mod error;
mod compiler;
#[cfg(test)]
mod testutil;

pub use parse::{SpirvBinary, Instrs, Instr, Operands};
pub use reflect::reflect_stage;
pub use error::Error;
pub use compiler::{SpirvCompiler, SpirvStage, strip_debug_info};

type Result<T> = std::result::Result<T, Error>;
