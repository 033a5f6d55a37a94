/// Binary emission switches handed to the compiler.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmitConfig {
    /// Keep names, source text and line information in the binary.
    pub debug_info: bool,
}
impl EmitConfig {
    pub fn debug() -> Self { EmitConfig { debug_info: true } }
    pub fn release() -> Self { EmitConfig { debug_info: false } }
}
impl Default for EmitConfig {
    fn default() -> Self { EmitConfig::debug() }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct SessionConfig {
    pub emit: EmitConfig,
    /// Also aggregate specialization constants.
    pub populate_consts: bool,
}
impl SessionConfig {
    pub fn new() -> Self { Default::default() }
    pub fn with_emit(mut self, emit: EmitConfig) -> Self {
        self.emit = emit;
        self
    }
    pub fn with_constants(mut self) -> Self {
        self.populate_consts = true;
        self
    }
}
