use std::path::PathBuf;

pub type Result<T, E = GenError> = std::result::Result<T, E>;

/// Everything that can abort a generation run. None of these are recoverable:
/// each one points at an authoring bug in the opcode description.
#[derive(thiserror::Error, Debug)]
pub enum GenError {
    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed opcode description: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("incorrect bit count in [{opcode}]: fields cover {bits} bits, expected 16")]
    SpecificationWidth { opcode: String, bits: u32 },
    #[error("field {field} of [{opcode}] has width {bits}, expected 1..=16")]
    InvalidWidth { opcode: String, field: String, bits: u32 },
    #[error("field {field} of [{opcode}] uses addressing mode {mode}, expected 0..=14")]
    InvalidMode { opcode: String, field: String, mode: u16 },
    #[error("field {field} of [{opcode}] declares both `valid` and `modes`")]
    ConflictingDomain { opcode: String, field: String },
    #[error("field {field} of [{opcode}] declares an empty `valid` list")]
    EmptyValidSet { opcode: String, field: String },
    #[error("value [{value}] in field {field} of [{opcode}] does not fit in {bits} bits")]
    ValueOutOfRange { opcode: String, field: String, value: u32, bits: u32 },
    #[error("mapping key {key:?} in field {field} of [{opcode}] is not a decimal integer")]
    InvalidMappingKey { opcode: String, field: String, key: String },
    #[error("field {field} of [{opcode}] has no mapping entry for value {value}")]
    MappingGap { opcode: String, field: String, value: u16 },
    #[error("bit pattern ({pattern:016b}, {pattern:#06x}) for [{opcode}] is already in use by [{previous}]")]
    Collision { pattern: u16, opcode: String, previous: String },
}

impl GenError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
