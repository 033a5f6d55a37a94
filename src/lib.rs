//! Cross-stage shader interface aggregation.
//!
//! Stages are compiled by an external toolchain, each stage's reflection is
//! fed into one `ShaderInterface` which ends up describing every uniform,
//! uniform block, pipeline input and specialization constant the linked
//! program exposes.
pub mod refl;
pub mod iface;
pub mod session;
pub mod spv;

pub use refl::{StageKind, StageReflection, TypeDesc};
pub use iface::{ShaderInterface, ingest, ingest_with_constants};
pub use session::{Session, SessionConfig, EmitConfig, Compiler, Program};
