//! Compiler Session
//!
//! Drive a shader compiler over all stages of a program and aggregate their
//! interfaces. The compiler toolchain is acquired when a session is created
//! and released when the session is dropped.
mod config;
mod error;

use std::collections::HashSet;
use std::result;
use log::{debug, info};
use crate::iface::{ShaderInterface, ingest, ingest_with_constants};
use crate::refl::{StageKind, StageReflection};
pub use config::*;
pub use error::*;

pub type Result<T> = result::Result<T, Error>;

/// Shader compiler toolchain as seen by a session.
pub trait Compiler {
    /// Input of a single stage, e.g. GLSL text.
    type Source: ?Sized;
    /// A successfully compiled stage.
    type Stage;

    /// Process-wide setup of the toolchain.
    fn initialize(&mut self) -> result::Result<(), Diagnostics> { Ok(()) }
    fn finalize(&mut self) { }

    fn compile(&mut self, stage: StageKind, src: &Self::Source) -> result::Result<Self::Stage, Diagnostics>;
    /// Check that the stages are compatible with each other.
    fn link(&mut self, stages: &[Self::Stage]) -> result::Result<(), Diagnostics>;
    /// Enumerate live symbols of a linked stage.
    fn reflect(&self, stage: &Self::Stage) -> result::Result<StageReflection, Diagnostics>;
    /// Generate the SPIR-V instruction stream of a stage.
    fn emit(&self, stage: &Self::Stage, cfg: &EmitConfig) -> result::Result<Vec<u32>, Diagnostics>;
}

/// Output of a session build.
#[derive(Debug, Clone)]
pub struct Program {
    pub iface: ShaderInterface,
    /// Binary of each stage, in build order.
    pub binaries: Vec<(StageKind, Vec<u32>)>,
}
impl Program {
    pub fn binary(&self, stage: StageKind) -> Option<&[u32]> {
        self.binaries.iter()
            .find(|(x, _)| *x == stage)
            .map(|(_, spv)| spv.as_slice())
    }
}

pub struct Session<C: Compiler> {
    compiler: C,
    cfg: SessionConfig,
}
impl<C: Compiler> Session<C> {
    pub fn new(mut compiler: C, cfg: SessionConfig) -> Result<Session<C>> {
        compiler.initialize()
            .map_err(Error::Initialize)?;
        info!("compiler session started");
        Ok(Session { compiler: compiler, cfg: cfg })
    }

    /// Compile, link, reflect and emit all stages. Any failing stage fails
    /// the entire build and nothing is aggregated.
    pub fn build(&mut self, stages: &[(StageKind, &C::Source)]) -> Result<Program> {
        if stages.is_empty() { return Err(Error::NoStages); }
        let mut found_stages = HashSet::new();
        for (stage, _) in stages {
            if !found_stages.insert(*stage) {
                return Err(Error::DuplicateStage(*stage));
            }
        }

        let mut compiled = Vec::with_capacity(stages.len());
        for (stage, src) in stages {
            let x = self.compiler.compile(*stage, src)
                .map_err(|diag| Error::Compile { stage: *stage, diag: diag })?;
            debug!("compiled {} stage", stage);
            compiled.push(x);
        }
        self.compiler.link(&compiled)
            .map_err(Error::Link)?;
        debug!("linked {} stages", compiled.len());

        let mut iface = ShaderInterface::new();
        for ((stage, _), x) in stages.iter().zip(compiled.iter()) {
            let refl = self.compiler.reflect(x)
                .map_err(|diag| Error::Reflect { stage: *stage, diag: diag })?;
            if self.cfg.populate_consts {
                ingest_with_constants(&mut iface, &refl, *stage);
            } else {
                ingest(&mut iface, &refl, *stage);
            }
        }

        let mut binaries = Vec::with_capacity(stages.len());
        for ((stage, _), x) in stages.iter().zip(compiled.iter()) {
            let spv = self.compiler.emit(x, &self.cfg.emit)
                .map_err(|diag| Error::Emit { stage: *stage, diag: diag })?;
            binaries.push((*stage, spv));
        }
        info!("built program of {} stages", stages.len());
        Ok(Program { iface: iface, binaries: binaries })
    }
}
impl<C: Compiler> Drop for Session<C> {
    fn drop(&mut self) {
        self.compiler.finalize();
        info!("compiler session terminated");
    }
}
