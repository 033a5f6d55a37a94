use std::fmt;

/// Byte width of a single component. Every scalar is counted as 4 bytes,
/// doubles and booleans included.
pub const COMPONENT_NBYTE: usize = 4;

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ScalarType {
    Bool,
    Int,
    Uint,
    Float,
    Double,
}
impl ScalarType {
    /// Prefix used by GLSL for vector and matrix spellings, e.g. the `i` in
    /// `ivec3`.
    fn glsl_prefix(&self) -> &'static str {
        use ScalarType::*;
        match self {
            Bool => "b",
            Int => "i",
            Uint => "u",
            Float => "",
            Double => "d",
        }
    }
    fn glsl_name(&self) -> &'static str {
        use ScalarType::*;
        match self {
            Bool => "bool",
            Int => "int",
            Uint => "uint",
            Float => "float",
            Double => "double",
        }
    }
}

/// Resource types that have no memory layout of their own.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum OpaqueType {
    Sampler,
    Image,
    SampledImage,
    SubpassInput,
}

#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ArrayDim {
    Fixed(u32),
    /// Runtime-sized array, the length is only known when the pipeline is
    /// bound.
    Unsized,
}
impl ArrayDim {
    pub fn nelem(&self) -> Option<u32> {
        match self {
            ArrayDim::Fixed(n) => Some(*n),
            ArrayDim::Unsized => None,
        }
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct StructField {
    pub name: String,
    pub ty: TypeDesc,
}
impl StructField {
    pub fn new<S: Into<String>>(name: S, ty: TypeDesc) -> StructField {
        StructField { name: name.into(), ty: ty }
    }
}

/// Type of a shader variable as reported by the compiler.
#[derive(Debug, PartialEq, Clone)]
pub enum TypeDesc {
    Scalar(ScalarType),
    Vector(ScalarType, u32),
    /// Column count followed by row count.
    Matrix(ScalarType, u32, u32),
    Struct(Vec<StructField>),
    /// Dimensions are listed outermost first.
    Array(Vec<ArrayDim>, Box<TypeDesc>),
    Opaque(OpaqueType),
}
impl TypeDesc {
    pub fn float() -> TypeDesc { TypeDesc::Scalar(ScalarType::Float) }
    pub fn vec(n: u32) -> TypeDesc { TypeDesc::Vector(ScalarType::Float, n) }
    pub fn mat(ncol: u32, nrow: u32) -> TypeDesc { TypeDesc::Matrix(ScalarType::Float, ncol, nrow) }
    /// Wrap `self` in another array dimension. The new dimension becomes the
    /// outermost one.
    pub fn array_of(self, dim: ArrayDim) -> TypeDesc {
        match self {
            TypeDesc::Array(mut dims, inner) => {
                dims.insert(0, dim);
                TypeDesc::Array(dims, inner)
            },
            x => TypeDesc::Array(vec![dim], Box::new(x)),
        }
    }
    /// Type tag with all array dimensions stripped.
    pub fn tag(&self) -> TypeTag {
        match self {
            TypeDesc::Scalar(x) => TypeTag::Scalar(*x),
            TypeDesc::Vector(x, n) => TypeTag::Vector(*x, *n),
            TypeDesc::Matrix(x, ncol, nrow) => TypeTag::Matrix(*x, *ncol, *nrow),
            TypeDesc::Struct(_) => TypeTag::Struct,
            TypeDesc::Array(_, inner) => inner.tag(),
            TypeDesc::Opaque(x) => TypeTag::Opaque(*x),
        }
    }
}

/// Number of components in a type. Array dimensions multiply, unsized
/// dimensions count as a single element.
fn ncomp(ty: &TypeDesc) -> usize {
    match ty {
        TypeDesc::Struct(fields) => fields.iter()
            .map(|field| ncomp(&field.ty))
            .sum(),
        TypeDesc::Matrix(_, ncol, nrow) => *ncol as usize * *nrow as usize,
        TypeDesc::Vector(_, n) => *n as usize,
        TypeDesc::Scalar(_) | TypeDesc::Opaque(_) => 1,
        TypeDesc::Array(dims, inner) => {
            let nrepeat = dims.iter()
                .filter_map(ArrayDim::nelem)
                .map(|x| x as usize)
                .product::<usize>();
            ncomp(inner) * nrepeat
        },
    }
}
/// Compute the byte size of a type description.
///
/// Structs are the sum of their fields, matrices `cols * rows` components,
/// vectors their element count and scalars a single component. Fixed array
/// dimensions multiply the component count while runtime-sized ones
/// contribute a factor of 1. Padding is not taken into account.
pub fn size(ty: &TypeDesc) -> usize {
    ncomp(ty) * COMPONENT_NBYTE
}

/// Shape of a variable recorded in the aggregated interface.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum TypeTag {
    Scalar(ScalarType),
    Vector(ScalarType, u32),
    Matrix(ScalarType, u32, u32),
    Struct,
    Opaque(OpaqueType),
}
impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use TypeTag::*;
        match self {
            Scalar(x) => write!(f, "{}", x.glsl_name()),
            Vector(x, n) => write!(f, "{}vec{}", x.glsl_prefix(), n),
            Matrix(x, ncol, nrow) if ncol == nrow => write!(f, "{}mat{}", x.glsl_prefix(), ncol),
            Matrix(x, ncol, nrow) => write!(f, "{}mat{}x{}", x.glsl_prefix(), ncol, nrow),
            Struct => write!(f, "struct"),
            Opaque(OpaqueType::Sampler) => write!(f, "sampler"),
            Opaque(OpaqueType::Image) => write!(f, "image"),
            Opaque(OpaqueType::SampledImage) => write!(f, "sampler2D"),
            Opaque(OpaqueType::SubpassInput) => write!(f, "subpassInput"),
        }
    }
}


#[cfg(test)]
mod test {
    use super::{*};
    #[test]
    fn test_primitive_size() {
        assert_eq!(size(&TypeDesc::float()), 4);
        assert_eq!(size(&TypeDesc::Scalar(ScalarType::Double)), 4);
        assert_eq!(size(&TypeDesc::vec(4)), 16);
        assert_eq!(size(&TypeDesc::mat(4, 4)), 64);
        assert_eq!(size(&TypeDesc::mat(3, 4)), 48);
        assert_eq!(size(&TypeDesc::Matrix(ScalarType::Float, 0x8000, 0x20000)), 0x8000 * 0x20000 * 4);
        assert_eq!(size(&TypeDesc::Opaque(OpaqueType::SampledImage)), 4);
    }
    #[test]
    fn test_struct_size() {
        let ty = TypeDesc::Struct(vec![
            StructField::new("a", TypeDesc::vec(4)),
            StructField::new("b", TypeDesc::mat(4, 4)),
        ]);
        assert_eq!(size(&ty), 80);
        assert_eq!(size(&ty), size(&TypeDesc::vec(4)) + size(&TypeDesc::mat(4, 4)));
    }
    #[test]
    fn test_array_size() {
        let ty = TypeDesc::vec(3).array_of(ArrayDim::Fixed(3));
        assert_eq!(size(&ty), 36);
        let ty = TypeDesc::vec(3)
            .array_of(ArrayDim::Fixed(2))
            .array_of(ArrayDim::Fixed(5));
        assert_eq!(ty, TypeDesc::Array(vec![ArrayDim::Fixed(5), ArrayDim::Fixed(2)], Box::new(TypeDesc::vec(3))));
        assert_eq!(size(&ty), 10 * 12);
    }
    #[test]
    fn test_unsized_array_size() {
        let ty = TypeDesc::mat(4, 4).array_of(ArrayDim::Unsized);
        assert_eq!(size(&ty), 64);
        let ty = TypeDesc::vec(2)
            .array_of(ArrayDim::Fixed(4))
            .array_of(ArrayDim::Unsized);
        assert_eq!(size(&ty), 32);
    }
    #[test]
    fn test_nested_size() {
        let light = TypeDesc::Struct(vec![
            StructField::new("pos", TypeDesc::vec(4)),
            StructField::new("shadow", TypeDesc::mat(4, 4).array_of(ArrayDim::Fixed(6))),
        ]);
        let ty = TypeDesc::Struct(vec![
            StructField::new("count", TypeDesc::Scalar(ScalarType::Uint)),
            StructField::new("lights", light.array_of(ArrayDim::Fixed(8))),
        ]);
        assert_eq!(size(&ty), 4 + 8 * (16 + 6 * 64));
    }
    #[test]
    fn test_tag() {
        let ty = TypeDesc::mat(3, 3).array_of(ArrayDim::Fixed(2));
        assert_eq!(ty.tag(), TypeTag::Matrix(ScalarType::Float, 3, 3));
        assert_eq!(ty.tag().to_string(), "mat3");
        assert_eq!(TypeTag::Matrix(ScalarType::Double, 2, 4).to_string(), "dmat2x4");
        assert_eq!(TypeTag::Vector(ScalarType::Int, 2).to_string(), "ivec2");
        assert_eq!(TypeDesc::Struct(vec![]).tag(), TypeTag::Struct);
    }
}
