//! Compiler configuration.

use bitflags::bitflags;

bitflags! {
    /// Switches that change what the compiler emits or accepts.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct CompileFlags: u8 {
        /// Emit `;` annotation lines into the generated assembly.
        const COMMENTS = 1 << 0;
        /// Accept `bitstart`/`bitdata` directives at the top level.
        const ALLOW_BITSET = 1 << 1;
    }
}

impl Default for CompileFlags {
    fn default() -> Self {
        CompileFlags::COMMENTS | CompileFlags::ALLOW_BITSET
    }
}

/// Settings for one compilation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompilerConfig {
    /// First address of the variable region.
    pub bitstart: u32,
    /// First address of the data region (return-address slots).
    pub bitdata: u32,
    /// Name of the top-level namespace.
    pub namespace: String,
    /// Address `putchar` writes to.
    pub output_port: u32,
    pub flags: CompileFlags,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            bitstart: 0x1000_0000,
            bitdata: 0x1020_0001,
            namespace: "main".to_string(),
            output_port: 0xFFFF_0000,
            flags: CompileFlags::default(),
        }
    }
}

impl CompilerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bitstart(mut self, bitstart: u32) -> Self {
        self.bitstart = bitstart;
        self
    }

    pub fn with_bitdata(mut self, bitdata: u32) -> Self {
        self.bitdata = bitdata;
        self
    }

    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = namespace.into();
        self
    }

    pub fn with_output_port(mut self, output_port: u32) -> Self {
        self.output_port = output_port;
        self
    }

    pub fn with_flags(mut self, flags: CompileFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Whether annotation comments are emitted.
    #[inline]
    pub fn comments(&self) -> bool {
        self.flags.contains(CompileFlags::COMMENTS)
    }
}
