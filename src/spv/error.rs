use std::fmt;
use std::error;
use crate::refl::StageKind;

#[derive(Debug)]
pub enum Error {
    CorruptedSpirv,
    UnsupportedSpirv,
    MissingEntryPoint(StageKind),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;
        match self {
            CorruptedSpirv => write!(f, "spirv binary is corrupted"),
            UnsupportedSpirv => write!(f, "spirv binary used unsupported feature"),
            MissingEntryPoint(stage) => write!(f, "spirv binary has no entry point for {} stage", stage),
        }
    }
}
impl error::Error for Error { }
