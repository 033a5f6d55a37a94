use log::{debug, trace};
use crate::refl::{StageKind, StageReflection};
use super::ShaderInterface;

/// Feed all live symbols of a stage into the interface. Blocks go first so
/// that flattened member names can find their owning block, then uniforms
/// and finally pipeline inputs. Specialization constants are left out, see
/// `ingest_with_constants`.
pub fn ingest(iface: &mut ShaderInterface, refl: &StageReflection, stage: StageKind) {
    ingest_impl(iface, refl, stage, false)
}
/// Same as `ingest`, but specialization constants are merged as well.
pub fn ingest_with_constants(iface: &mut ShaderInterface, refl: &StageReflection, stage: StageKind) {
    ingest_impl(iface, refl, stage, true)
}

fn ingest_impl(
    iface: &mut ShaderInterface,
    refl: &StageReflection,
    stage: StageKind,
    route_consts: bool,
) {
    debug!("ingesting {} stage: {} blocks, {} uniforms, {} inputs, {} constants",
        stage, refl.blocks.len(), refl.uniforms.len(), refl.inputs.len(),
        refl.constants.len());
    if refl.is_empty() { return; }
    // Last declared block first.
    for block in refl.blocks.iter().rev() {
        iface.merge_block(&block.name, block.binding, block.size, stage,
            block.storage, block.is_push_const);
    }
    for uniform in refl.uniforms.iter() {
        iface.merge_uniform(&uniform.name, uniform.binding, uniform.offset,
            &uniform.ty, stage, uniform.read_only, uniform.write_only);
    }
    for input in refl.inputs.iter() {
        iface.merge_attribute(&input.name, input.desc_set, input.location,
            &input.ty);
    }
    for constant in refl.constants.iter() {
        if route_consts {
            iface.merge_constant(&constant.name, constant.binding,
                &constant.ty, stage);
        } else {
            trace!("constant '{}' (id={:?}) of {} stage is not aggregated",
                constant.name, constant.binding, stage);
        }
    }
}
