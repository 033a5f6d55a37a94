//! Hand-assembled SPIR-V modules for tests.
use super::consts::*;
use super::SpirvBinary;

const OP_CAPABILITY: u32 = 17;
const OP_MEMORY_MODEL: u32 = 14;
const OP_TYPE_VOID: u32 = 19;
const OP_TYPE_FUNCTION: u32 = 33;
const OP_LABEL: u32 = 248;
const OP_RETURN: u32 = 253;

fn op(opcode: u32, operands: &[u32]) -> Vec<u32> {
    let mut rv = vec![((operands.len() as u32 + 1) << 16) | opcode];
    rv.extend_from_slice(operands);
    rv
}
fn lit(s: &str) -> Vec<u32> {
    let mut bytes = s.as_bytes().to_vec();
    bytes.push(0);
    while bytes.len() % 4 != 0 { bytes.push(0); }
    bytes.chunks(4)
        .map(|x| u32::from_le_bytes([x[0], x[1], x[2], x[3]]))
        .collect()
}
fn name(id: u32, s: &str) -> Vec<u32> {
    let mut operands = vec![id];
    operands.extend(lit(s));
    op(OP_NAME, &operands)
}
fn member_name(id: u32, member_idx: u32, s: &str) -> Vec<u32> {
    let mut operands = vec![id, member_idx];
    operands.extend(lit(s));
    op(OP_MEMBER_NAME, &operands)
}

/// Module equivalent to:
///
/// ```glsl
/// layout(binding=2) uniform Matrices { mat4 projection; vec4 tint; } mats;
/// layout(push_constant) uniform Push { mat4 model; };
/// layout(binding=1) uniform sampler2D tex;
/// layout(binding=3) uniform sampler2D unused;
/// layout(location=0) in vec3 inPosition;
/// layout(location=1) in vec2 _;
/// layout(constant_id=7) const int nsample = 4;
/// ```
///
/// where everything but `unused` is accessed by the entry point, which has
/// the given execution model.
pub fn module(exec_model: u32) -> SpirvBinary {
    let mut entry_point = vec![exec_model, 1];
    entry_point.extend(lit("main"));
    entry_point.extend(&[20, 21, 22]);

    let instrs = vec![
        op(OP_CAPABILITY, &[1]),
        op(OP_MEMORY_MODEL, &[0, 1]),
        op(OP_ENTRY_POINT, &entry_point),
        name(1, "main"),
        name(10, "Matrices"),
        member_name(10, 0, "projection"),
        member_name(10, 1, "tint"),
        name(11, "Push"),
        member_name(11, 0, "model"),
        name(20, "inPosition"),
        name(30, "mats"),
        name(31, "tex"),
        name(32, "unused"),
        name(40, "nsample"),
        op(OP_MEMBER_DECORATE, &[10, 0, DECO_OFFSET, 0]),
        op(OP_MEMBER_DECORATE, &[10, 0, DECO_MATRIX_STRIDE, 16]),
        op(OP_MEMBER_DECORATE, &[10, 1, DECO_OFFSET, 64]),
        op(OP_DECORATE, &[10, 2]), // Block
        op(OP_MEMBER_DECORATE, &[11, 0, DECO_OFFSET, 0]),
        op(OP_MEMBER_DECORATE, &[11, 0, DECO_MATRIX_STRIDE, 16]),
        op(OP_DECORATE, &[11, 2]),
        op(OP_DECORATE, &[30, DECO_DESCRIPTOR_SET, 0]),
        op(OP_DECORATE, &[30, DECO_BINDING, 2]),
        op(OP_DECORATE, &[31, DECO_BINDING, 1]),
        op(OP_DECORATE, &[31, DECO_NON_WRITABLE]),
        op(OP_DECORATE, &[32, DECO_BINDING, 3]),
        op(OP_DECORATE, &[20, DECO_LOCATION, 0]),
        op(OP_DECORATE, &[21, DECO_LOCATION, 1]),
        op(OP_DECORATE, &[22, DECO_BUILT_IN, 42]),
        op(OP_DECORATE, &[40, DECO_SPEC_ID, 7]),
        op(OP_TYPE_VOID, &[2]),
        op(OP_TYPE_FUNCTION, &[3, 2]),
        op(OP_TYPE_FLOAT, &[4, 32]),
        op(OP_TYPE_VECTOR, &[5, 4, 4]),
        op(OP_TYPE_MATRIX, &[6, 5, 4]),
        op(OP_TYPE_VECTOR, &[7, 4, 3]),
        op(OP_TYPE_INT, &[8, 32, 1]),
        op(OP_TYPE_VECTOR, &[9, 4, 2]),
        op(OP_TYPE_STRUCT, &[10, 6, 5]),
        op(OP_TYPE_STRUCT, &[11, 6]),
        op(OP_TYPE_POINTER, &[12, 2, 10]),
        op(OP_TYPE_POINTER, &[13, 9, 11]),
        op(OP_TYPE_POINTER, &[14, 1, 7]),
        op(OP_TYPE_POINTER, &[15, 1, 9]),
        op(OP_TYPE_POINTER, &[16, 1, 8]),
        op(OP_TYPE_IMAGE, &[17, 4, 1, 0, 0, 0, 1, 0]),
        op(OP_TYPE_SAMPLED_IMAGE, &[18, 17]),
        op(OP_TYPE_POINTER, &[19, 0, 18]),
        op(OP_TYPE_POINTER, &[23, 2, 6]),
        op(OP_TYPE_POINTER, &[24, 9, 6]),
        op(OP_SPEC_CONSTANT, &[8, 40, 4]),
        op(OP_CONSTANT, &[8, 41, 0]),
        op(OP_VARIABLE, &[12, 30, 2]),
        op(OP_VARIABLE, &[13, 33, 9]),
        op(OP_VARIABLE, &[14, 20, 1]),
        op(OP_VARIABLE, &[15, 21, 1]),
        op(OP_VARIABLE, &[16, 22, 1]),
        op(OP_VARIABLE, &[19, 31, 0]),
        op(OP_VARIABLE, &[19, 32, 0]),
        op(OP_FUNCTION, &[2, 1, 0, 3]),
        op(OP_LABEL, &[50]),
        op(OP_ACCESS_CHAIN, &[23, 51, 30, 41]),
        op(OP_LOAD, &[6, 52, 51]),
        op(OP_LOAD, &[7, 53, 20]),
        op(OP_LOAD, &[18, 54, 31]),
        op(OP_ACCESS_CHAIN, &[24, 55, 33, 41]),
        op(OP_LOAD, &[6, 56, 55]),
        op(OP_RETURN, &[]),
        op(OP_FUNCTION_END, &[]),
    ];
    assemble(instrs)
}

/// Fragment module equivalent to:
///
/// ```glsl
/// layout(binding=0) uniform B { layout(row_major) mat2x4 m; } b;
/// ```
///
/// with `b.m` accessed by the entry point.
pub fn row_major_module() -> SpirvBinary {
    let mut entry_point = vec![4, 1];
    entry_point.extend(lit("main"));

    let instrs = vec![
        op(OP_CAPABILITY, &[1]),
        op(OP_MEMORY_MODEL, &[0, 1]),
        op(OP_ENTRY_POINT, &entry_point),
        name(10, "B"),
        member_name(10, 0, "m"),
        name(30, "b"),
        op(OP_MEMBER_DECORATE, &[10, 0, DECO_OFFSET, 0]),
        op(OP_MEMBER_DECORATE, &[10, 0, DECO_ROW_MAJOR]),
        op(OP_MEMBER_DECORATE, &[10, 0, DECO_MATRIX_STRIDE, 16]),
        op(OP_DECORATE, &[10, 2]),
        op(OP_DECORATE, &[30, DECO_DESCRIPTOR_SET, 0]),
        op(OP_DECORATE, &[30, DECO_BINDING, 0]),
        op(OP_TYPE_VOID, &[2]),
        op(OP_TYPE_FUNCTION, &[3, 2]),
        op(OP_TYPE_FLOAT, &[4, 32]),
        op(OP_TYPE_VECTOR, &[5, 4, 4]),
        op(OP_TYPE_MATRIX, &[6, 5, 2]),
        op(OP_TYPE_INT, &[8, 32, 1]),
        op(OP_TYPE_STRUCT, &[10, 6]),
        op(OP_TYPE_POINTER, &[12, 2, 10]),
        op(OP_TYPE_POINTER, &[23, 2, 6]),
        op(OP_CONSTANT, &[8, 41, 0]),
        op(OP_VARIABLE, &[12, 30, 2]),
        op(OP_FUNCTION, &[2, 1, 0, 3]),
        op(OP_LABEL, &[50]),
        op(OP_ACCESS_CHAIN, &[23, 51, 30, 41]),
        op(OP_LOAD, &[6, 52, 51]),
        op(OP_RETURN, &[]),
        op(OP_FUNCTION_END, &[]),
    ];
    assemble(instrs)
}

fn assemble(instrs: Vec<Vec<u32>>) -> SpirvBinary {
    let mut words = vec![MAGIC, 0x00010300, 0, 100, 0];
    for instr in instrs {
        words.extend(instr);
    }
    SpirvBinary::from(words)
}
