use std::fmt;
use std::error;
use crate::refl::StageKind;

/// Text reported by the compiler toolchain on failure.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Diagnostics {
    pub info_log: String,
    pub debug_log: String,
}
impl Diagnostics {
    pub fn new<S: Into<String>>(info_log: S) -> Diagnostics {
        Diagnostics {
            info_log: info_log.into(),
            ..Default::default()
        }
    }
}
impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.info_log.trim_end())?;
        if !self.debug_log.is_empty() {
            write!(f, "\n{}", self.debug_log.trim_end())?;
        }
        Ok(())
    }
}
impl error::Error for Diagnostics { }

#[derive(Debug)]
pub enum Error {
    Initialize(Diagnostics),
    NoStages,
    DuplicateStage(StageKind),
    Compile { stage: StageKind, diag: Diagnostics },
    Link(Diagnostics),
    Reflect { stage: StageKind, diag: Diagnostics },
    Emit { stage: StageKind, diag: Diagnostics },
}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        use Error::*;
        match self {
            Initialize(diag) => write!(f, "unable to initialize compiler: {}", diag),
            NoStages => write!(f, "no shader stage to build"),
            DuplicateStage(stage) => write!(f, "{} stage is given more than once", stage),
            Compile { stage, diag } => write!(f, "{} stage failed to compile: {}", stage, diag),
            Link(diag) => write!(f, "stages failed to link: {}", diag),
            Reflect { stage, diag } => write!(f, "{} stage cannot be reflected: {}", stage, diag),
            Emit { stage, diag } => write!(f, "{} stage failed to emit binary: {}", stage, diag),
        }
    }
}
impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        use Error::*;
        match self {
            Initialize(diag) | Link(diag) => Some(diag),
            Compile { diag, .. } | Reflect { diag, .. } | Emit { diag, .. } => Some(diag),
            _ => None,
        }
    }
}
