use std::convert::TryFrom;
use std::collections::{HashMap, HashSet};
use num_derive::FromPrimitive;
use num_traits::FromPrimitive;
use log::{debug, warn};
use crate::refl::{StageKind, StageReflection, ReflectedBlock, ReflectedUniform,
    ReflectedInput, ReflectedConstant, StorageQualifier, TypeDesc, ArrayDim,
    StructField, ScalarType, OpaqueType, size};
use super::consts::*;
use super::parse::{SpirvBinary, Operands};
use super::{Error, Result};

type InstrId = u32;
type TypeId = InstrId;
type VariableId = InstrId;
type ConstantId = InstrId;
type FunctionId = InstrId;

#[derive(Debug, FromPrimitive, PartialEq, Eq, Clone, Copy)]
enum ExecutionModel {
    Vertex = 0,
    TessellationControl = 1,
    TessellationEvaluation = 2,
    Geometry = 3,
    Fragment = 4,
    GLCompute = 5,
}
impl ExecutionModel {
    fn stage(&self) -> StageKind {
        use ExecutionModel::*;
        match self {
            Vertex => StageKind::Vertex,
            TessellationControl => StageKind::TessControl,
            TessellationEvaluation => StageKind::TessEvaluation,
            Geometry => StageKind::Geometry,
            Fragment => StageKind::Fragment,
            GLCompute => StageKind::Compute,
        }
    }
}
#[derive(Debug, FromPrimitive, PartialEq, Eq, Clone, Copy)]
enum StorageClass {
    UniformConstant = 0,
    Input = 1,
    Uniform = 2,
    Output = 3,
    Workgroup = 4,
    CrossWorkgroup = 5,
    Private = 6,
    // Texture calls to sampler object will translate to function class.
    Function = 7,
    Generic = 8,
    PushConstant = 9,
    AtomicCounter = 10,
    Image = 11,
    StorageBuffer = 12,
}

#[derive(Debug, Clone)]
enum Type {
    Scalar(ScalarType),
    Vector(TypeId, u32),
    Matrix(TypeId, u32),
    Opaque(OpaqueType),
    /// Runtime arrays have no length constant.
    Array(TypeId, Option<ConstantId>),
    Struct(Vec<TypeId>),
    /// Storage classes outside of `StorageClass` are kept as `None`.
    Pointer(Option<StorageClass>, TypeId),
}
#[derive(Debug, Clone)]
struct Variable {
    /// Pointer type.
    ty: TypeId,
    store_cls: Option<StorageClass>,
}
#[derive(Debug, Clone)]
struct Constant {
    ty: TypeId,
    value: Vec<u32>,
}
#[derive(Default, Debug, Clone)]
struct Function {
    accessed_vars: HashSet<InstrId>,
    calls: HashSet<FunctionId>,
}
#[derive(Debug, Clone)]
struct EntryPoint {
    exec_model: ExecutionModel,
    func: FunctionId,
    name: String,
    interface: Vec<VariableId>,
}

/// Explicit layout of a matrix member. The stride is between columns, or
/// between rows for row-major matrices.
#[derive(Debug, Clone, Copy)]
struct MatrixLayout {
    stride: usize,
    row_major: bool,
}

#[derive(Default, Debug)]
struct SpirvMetadata {
    entry_points: Vec<EntryPoint>,
    name_map: HashMap<(InstrId, Option<u32>), String>,
    deco_map: HashMap<(InstrId, Option<u32>, u32), Vec<u32>>,
    ty_map: HashMap<TypeId, Type>,
    var_map: HashMap<VariableId, Variable>,
    const_map: HashMap<ConstantId, Constant>,
    spec_consts: Vec<ConstantId>,
    func_map: HashMap<FunctionId, Function>,
    /// Access chain results mapped to the variable they point into.
    access_chain_map: HashMap<InstrId, VariableId>,
}
impl TryFrom<&SpirvBinary> for SpirvMetadata {
    type Error = Error;
    fn try_from(module: &SpirvBinary) -> Result<SpirvMetadata> {
        let mut meta = SpirvMetadata::default();
        let mut func: Option<FunctionId> = None;
        for instr in module.instrs()? {
            let instr = instr?;
            let mut operands = instr.operands();
            match instr.opcode() {
                OP_ENTRY_POINT => meta.populate_entry_point(&mut operands)?,
                OP_NAME | OP_MEMBER_NAME => {
                    let target_id = operands.read_u32()?;
                    let member_idx = if instr.opcode() == OP_MEMBER_NAME {
                        Some(operands.read_u32()?)
                    } else { None };
                    let name = operands.read_str()?;
                    meta.name_map.insert((target_id, member_idx), name);
                },
                OP_DECORATE | OP_MEMBER_DECORATE => {
                    let target_id = operands.read_u32()?;
                    let member_idx = if instr.opcode() == OP_MEMBER_DECORATE {
                        Some(operands.read_u32()?)
                    } else { None };
                    let deco = operands.read_u32()?;
                    let params = operands.read_list()?.to_owned();
                    meta.deco_map.insert((target_id, member_idx, deco), params);
                },
                OP_TYPE_BOOL..=OP_TYPE_POINTER => meta.populate_ty(instr.opcode(), &mut operands)?,
                OP_CONSTANT | OP_SPEC_CONSTANT | OP_SPEC_CONSTANT_TRUE | OP_SPEC_CONSTANT_FALSE => {
                    let ty = operands.read_u32()?;
                    let const_id = operands.read_u32()?;
                    let value = match instr.opcode() {
                        OP_SPEC_CONSTANT_TRUE => vec![1],
                        OP_SPEC_CONSTANT_FALSE => vec![0],
                        _ => operands.read_list()?.to_owned(),
                    };
                    if instr.opcode() != OP_CONSTANT { meta.spec_consts.push(const_id); }
                    meta.const_map.insert(const_id, Constant { ty: ty, value: value });
                },
                OP_VARIABLE if func.is_none() => {
                    let ty = operands.read_u32()?;
                    let var_id = operands.read_u32()?;
                    let store_cls = StorageClass::from_u32(operands.read_u32()?);
                    let var = Variable { ty: ty, store_cls: store_cls };
                    if meta.var_map.insert(var_id, var).is_some() {
                        return Err(Error::CorruptedSpirv);
                    }
                },
                OP_FUNCTION => {
                    let _rty = operands.read_u32()?;
                    let func_id = operands.read_u32()?;
                    meta.func_map.entry(func_id).or_default();
                    func = Some(func_id);
                },
                OP_FUNCTION_END => func = None,
                opcode => if let Some(func_id) = func {
                    meta.populate_access(func_id, opcode, &mut operands)?;
                },
            }
        }
        Ok(meta)
    }
}
impl SpirvMetadata {
    fn populate_entry_point(&mut self, operands: &mut Operands) -> Result<()> {
        let exec_model = operands.read_u32()?;
        let func = operands.read_u32()?;
        let name = operands.read_str()?;
        let interface = operands.read_list()?.to_owned();
        if let Some(exec_model) = ExecutionModel::from_u32(exec_model) {
            let entry_point = EntryPoint {
                exec_model: exec_model,
                func: func,
                name: name,
                interface: interface,
            };
            self.entry_points.push(entry_point);
        } else {
            debug!("ignored entry point '{}' of execution model {}", name, exec_model);
        }
        Ok(())
    }
    fn populate_ty(&mut self, opcode: u32, operands: &mut Operands) -> Result<()> {
        let ty_id = operands.read_u32()?;
        let ty = match opcode {
            OP_TYPE_BOOL => Type::Scalar(ScalarType::Bool),
            OP_TYPE_INT => {
                let _nbit = operands.read_u32()?;
                let is_signed = operands.read_bool()?;
                Type::Scalar(if is_signed { ScalarType::Int } else { ScalarType::Uint })
            },
            OP_TYPE_FLOAT => {
                let nbit = operands.read_u32()?;
                Type::Scalar(if nbit == 64 { ScalarType::Double } else { ScalarType::Float })
            },
            OP_TYPE_VECTOR => Type::Vector(operands.read_u32()?, operands.read_u32()?),
            OP_TYPE_MATRIX => Type::Matrix(operands.read_u32()?, operands.read_u32()?),
            OP_TYPE_IMAGE => {
                let _prim_ty = operands.read_u32()?;
                let dim = operands.read_u32()?;
                if dim == DIM_IMAGE_SUBPASS_DATA {
                    Type::Opaque(OpaqueType::SubpassInput)
                } else {
                    Type::Opaque(OpaqueType::Image)
                }
            },
            OP_TYPE_SAMPLER => Type::Opaque(OpaqueType::Sampler),
            OP_TYPE_SAMPLED_IMAGE => Type::Opaque(OpaqueType::SampledImage),
            OP_TYPE_ARRAY => Type::Array(operands.read_u32()?, Some(operands.read_u32()?)),
            OP_TYPE_RUNTIME_ARRAY => Type::Array(operands.read_u32()?, None),
            OP_TYPE_STRUCT => Type::Struct(operands.read_list()?.to_owned()),
            OP_TYPE_POINTER => {
                let store_cls = StorageClass::from_u32(operands.read_u32()?);
                Type::Pointer(store_cls, operands.read_u32()?)
            },
            // Opaque types irrelevant to the interface, e.g. events and
            // queues.
            _ => return Ok(()),
        };
        if self.ty_map.insert(ty_id, ty).is_some() {
            return Err(Error::CorruptedSpirv);
        }
        Ok(())
    }
    fn resolve_chain(&self, id: InstrId) -> InstrId {
        self.access_chain_map.get(&id).cloned().unwrap_or(id)
    }
    fn populate_access(&mut self, func_id: FunctionId, opcode: u32, operands: &mut Operands) -> Result<()> {
        let accessed = match opcode {
            OP_LOAD | OP_IMAGE_TEXEL_POINTER | OP_ARRAY_LENGTH => {
                let _rty = operands.read_u32()?;
                let _id = operands.read_u32()?;
                vec![self.resolve_chain(operands.read_u32()?)]
            },
            OP_STORE => vec![self.resolve_chain(operands.read_u32()?)],
            OP_ACCESS_CHAIN | OP_IN_BOUNDS_ACCESS_CHAIN => {
                let _rty = operands.read_u32()?;
                let id = operands.read_u32()?;
                let base = self.resolve_chain(operands.read_u32()?);
                self.access_chain_map.insert(id, base);
                vec![base]
            },
            OP_FUNCTION_CALL => {
                let _rty = operands.read_u32()?;
                let _id = operands.read_u32()?;
                let callee = operands.read_u32()?;
                // Global variables can be passed by pointer.
                let args = operands.read_list()?.iter()
                    .map(|x| self.resolve_chain(*x))
                    .collect::<Vec<_>>();
                self.func_map.entry(func_id).or_default().calls.insert(callee);
                args
            },
            _ => return Ok(()),
        };
        self.func_map.entry(func_id)
            .or_default()
            .accessed_vars
            .extend(accessed);
        Ok(())
    }

    fn collect_fn_vars_impl(&self, func: FunctionId, visited: &mut HashSet<FunctionId>, vars: &mut HashSet<VariableId>) {
        if !visited.insert(func) { return; }
        if let Some(func) = self.func_map.get(&func) {
            let it = func.accessed_vars.iter()
                .filter(|x| self.var_map.contains_key(x));
            vars.extend(it);
            for call in func.calls.iter() {
                self.collect_fn_vars_impl(*call, visited, vars);
            }
        }
    }
    /// Variables statically accessed by a function and its callees, in
    /// declaration order.
    fn collect_fn_vars(&self, func: FunctionId) -> Vec<VariableId> {
        let mut accessed_vars = HashSet::new();
        self.collect_fn_vars_impl(func, &mut HashSet::new(), &mut accessed_vars);
        let mut rv = accessed_vars.into_iter().collect::<Vec<_>>();
        rv.sort();
        rv
    }

    fn get_deco(&self, id: InstrId, member_idx: Option<u32>, deco: u32) -> Option<&[u32]> {
        self.deco_map.get(&(id, member_idx, deco))
            .map(|x| x.as_slice())
    }
    fn get_deco_u32(&self, id: InstrId, member_idx: Option<u32>, deco: u32) -> Option<u32> {
        self.get_deco(id, member_idx, deco)
            .and_then(|x| x.first())
            .cloned()
    }
    fn get_name(&self, id: InstrId, member_idx: Option<u32>) -> Option<&str> {
        self.name_map.get(&(id, member_idx))
            .map(|x| x.as_str())
            .filter(|x| !x.is_empty())
    }
    fn get_ty(&self, ty_id: TypeId) -> Result<&Type> {
        self.ty_map.get(&ty_id)
            .ok_or(Error::CorruptedSpirv)
    }
    fn get_const_u32(&self, const_id: ConstantId) -> Result<u32> {
        self.const_map.get(&const_id)
            .and_then(|x| x.value.first())
            .cloned()
            .ok_or(Error::CorruptedSpirv)
    }
    /// Strip array layers and return the innermost type ID.
    fn strip_arrays(&self, mut ty_id: TypeId) -> Result<TypeId> {
        while let Type::Array(elem_ty, _) = self.get_ty(ty_id)? {
            ty_id = *elem_ty;
        }
        Ok(ty_id)
    }
    /// Resolve the type a variable points to.
    fn pointee(&self, var: &Variable) -> Result<TypeId> {
        if let Type::Pointer(_, target_ty) = self.get_ty(var.ty)? {
            Ok(*target_ty)
        } else { Err(Error::CorruptedSpirv) }
    }

    fn ty2desc(&self, ty_id: TypeId) -> Result<TypeDesc> {
        let desc = match self.get_ty(ty_id)? {
            Type::Scalar(scalar_ty) => TypeDesc::Scalar(*scalar_ty),
            Type::Vector(elem_ty, nelem) => {
                if let TypeDesc::Scalar(scalar_ty) = self.ty2desc(*elem_ty)? {
                    TypeDesc::Vector(scalar_ty, *nelem)
                } else { return Err(Error::CorruptedSpirv); }
            },
            Type::Matrix(col_ty, ncol) => {
                if let TypeDesc::Vector(scalar_ty, nrow) = self.ty2desc(*col_ty)? {
                    TypeDesc::Matrix(scalar_ty, *ncol, nrow)
                } else { return Err(Error::CorruptedSpirv); }
            },
            Type::Opaque(opaque_ty) => TypeDesc::Opaque(*opaque_ty),
            Type::Array(elem_ty, nelem) => {
                let dim = match nelem {
                    Some(const_id) => ArrayDim::Fixed(self.get_const_u32(*const_id)?),
                    None => ArrayDim::Unsized,
                };
                self.ty2desc(*elem_ty)?.array_of(dim)
            },
            Type::Struct(members) => {
                let mut fields = Vec::with_capacity(members.len());
                for (i, member_ty) in members.iter().enumerate() {
                    let name = self.get_name(ty_id, Some(i as u32))
                        .unwrap_or_default();
                    fields.push(StructField::new(name, self.ty2desc(*member_ty)?));
                }
                TypeDesc::Struct(fields)
            },
            // Physical pointers are not supported.
            Type::Pointer(..) => return Err(Error::UnsupportedSpirv),
        };
        Ok(desc)
    }
    /// Size of a type in a block, taking explicit layout decorations into
    /// account where they are present.
    fn layout_size(&self, ty_id: TypeId, mat_layout: Option<MatrixLayout>) -> Result<usize> {
        let nbyte = match self.get_ty(ty_id)? {
            Type::Struct(members) => {
                let mut nbyte = 0;
                for (i, member_ty) in members.iter().enumerate() {
                    let i = Some(i as u32);
                    let offset = self.get_deco_u32(ty_id, i, DECO_OFFSET)
                        .map(|x| x as usize)
                        .unwrap_or(nbyte);
                    let mat_layout = self.get_deco_u32(ty_id, i, DECO_MATRIX_STRIDE)
                        .map(|stride| MatrixLayout {
                            stride: stride as usize,
                            row_major: self.get_deco(ty_id, i, DECO_ROW_MAJOR).is_some(),
                        });
                    let member_nbyte = self.layout_size(*member_ty, mat_layout)?;
                    nbyte = nbyte.max(offset + member_nbyte);
                }
                nbyte
            },
            Type::Array(elem_ty, nelem) => {
                let nrepeat = match nelem {
                    Some(const_id) => self.get_const_u32(*const_id)? as usize,
                    None => 1,
                };
                let stride = self.get_deco_u32(ty_id, None, DECO_ARRAY_STRIDE)
                    .map(|x| x as usize);
                match stride {
                    Some(stride) => nrepeat * stride,
                    None => nrepeat * self.layout_size(*elem_ty, mat_layout)?,
                }
            },
            Type::Matrix(col_ty, ncol) => match mat_layout {
                Some(MatrixLayout { stride, row_major: true }) => {
                    if let Type::Vector(_, nrow) = self.get_ty(*col_ty)? {
                        *nrow as usize * stride
                    } else { return Err(Error::CorruptedSpirv); }
                },
                Some(MatrixLayout { stride, row_major: false }) => *ncol as usize * stride,
                None => size(&self.ty2desc(ty_id)?),
            },
            _ => size(&self.ty2desc(ty_id)?),
        };
        Ok(nbyte)
    }

    fn reflect_block(&self, var_id: VariableId, var: &Variable, refl: &mut StageReflection) -> Result<()> {
        let ty_id = self.pointee(var)?;
        let struct_id = self.strip_arrays(ty_id)?;
        let members = if let Type::Struct(members) = self.get_ty(struct_id)? {
            members
        } else { return Ok(()) };
        let name = match self.get_name(struct_id, None).or(self.get_name(var_id, None)) {
            Some(name) => name.to_owned(),
            None => {
                warn!("ignored unnamed block variable %{}", var_id);
                return Ok(());
            }
        };
        let is_push_const = var.store_cls == Some(StorageClass::PushConstant);
        let storage = if var.store_cls == Some(StorageClass::StorageBuffer) ||
            self.get_deco(struct_id, None, DECO_BUFFER_BLOCK).is_some() {
            StorageQualifier::Buffer
        } else {
            StorageQualifier::Uniform
        };
        let binding = if is_push_const {
            None
        } else {
            self.get_deco_u32(var_id, None, DECO_BINDING)
        };
        refl.blocks.push(ReflectedBlock {
            name: name.clone(),
            binding: binding,
            size: self.layout_size(struct_id, None)?,
            storage: storage,
            is_push_const: is_push_const,
        });
        for (i, member_ty) in members.iter().enumerate() {
            let i = Some(i as u32);
            let member_name = match self.get_name(struct_id, i) {
                Some(x) => x,
                None => continue,
            };
            refl.uniforms.push(ReflectedUniform {
                name: format!("{}.{}", name, member_name),
                binding: None,
                offset: self.get_deco_u32(struct_id, i, DECO_OFFSET).map(|x| x as usize),
                ty: self.ty2desc(*member_ty)?,
                read_only: false,
                write_only: false,
            });
        }
        Ok(())
    }
    fn reflect_uniform(&self, var_id: VariableId, var: &Variable, refl: &mut StageReflection) -> Result<()> {
        let name = match self.get_name(var_id, None) {
            Some(name) => name.to_owned(),
            None => return Ok(()),
        };
        refl.uniforms.push(ReflectedUniform {
            name: name,
            binding: self.get_deco_u32(var_id, None, DECO_BINDING),
            offset: None,
            ty: self.ty2desc(self.pointee(var)?)?,
            read_only: self.get_deco(var_id, None, DECO_NON_WRITABLE).is_some(),
            write_only: self.get_deco(var_id, None, DECO_NON_READABLE).is_some(),
        });
        Ok(())
    }
    fn is_builtin(&self, var_id: VariableId, var: &Variable) -> Result<bool> {
        if self.get_deco(var_id, None, DECO_BUILT_IN).is_some() { return Ok(true); }
        // Built-in blocks like `gl_PerVertex` decorate their members instead.
        let struct_id = self.strip_arrays(self.pointee(var)?)?;
        if let Type::Struct(members) = self.get_ty(struct_id)? {
            let is_builtin = (0..members.len() as u32)
                .any(|i| self.get_deco(struct_id, Some(i), DECO_BUILT_IN).is_some());
            return Ok(is_builtin);
        }
        Ok(false)
    }
    fn reflect_input(&self, var_id: VariableId, var: &Variable, refl: &mut StageReflection) -> Result<()> {
        if self.is_builtin(var_id, var)? { return Ok(()); }
        refl.inputs.push(ReflectedInput {
            name: self.get_name(var_id, None).unwrap_or_default().to_owned(),
            desc_set: self.get_deco_u32(var_id, None, DECO_DESCRIPTOR_SET),
            location: self.get_deco_u32(var_id, None, DECO_LOCATION),
            ty: self.ty2desc(self.pointee(var)?)?,
        });
        Ok(())
    }
    fn reflect_entry_point(&self, entry_point: &EntryPoint) -> Result<StageReflection> {
        let mut refl = StageReflection::default();
        for var_id in self.collect_fn_vars(entry_point.func) {
            let var = &self.var_map[&var_id];
            match var.store_cls {
                Some(StorageClass::Uniform) |
                Some(StorageClass::StorageBuffer) |
                Some(StorageClass::PushConstant) => self.reflect_block(var_id, var, &mut refl)?,
                Some(StorageClass::UniformConstant) => self.reflect_uniform(var_id, var, &mut refl)?,
                _ => {},
            }
        }
        for var_id in entry_point.interface.iter() {
            let var = self.var_map.get(var_id)
                .ok_or(Error::CorruptedSpirv)?;
            if var.store_cls == Some(StorageClass::Input) {
                self.reflect_input(*var_id, var, &mut refl)?;
            }
        }
        for const_id in self.spec_consts.iter() {
            let spec_id = match self.get_deco_u32(*const_id, None, DECO_SPEC_ID) {
                Some(x) => x,
                None => continue,
            };
            let constant = &self.const_map[const_id];
            refl.constants.push(ReflectedConstant {
                name: self.get_name(*const_id, None).unwrap_or_default().to_owned(),
                binding: Some(spec_id),
                ty: self.ty2desc(constant.ty)?,
            });
        }
        Ok(refl)
    }
}

/// Reflect the live interface of the entry point of `stage` in a SPIR-V
/// module.
pub fn reflect_stage(module: &SpirvBinary, stage: StageKind) -> Result<StageReflection> {
    let meta = SpirvMetadata::try_from(module)?;
    let entry_point = meta.entry_points.iter()
        .find(|x| x.exec_model.stage() == stage)
        .ok_or(Error::MissingEntryPoint(stage))?;
    let refl = meta.reflect_entry_point(entry_point)?;
    debug!("reflected entry point '{}' of {} stage: {} blocks, {} uniforms, \
        {} inputs, {} constants", entry_point.name, stage, refl.blocks.len(),
        refl.uniforms.len(), refl.inputs.len(), refl.constants.len());
    Ok(refl)
}
