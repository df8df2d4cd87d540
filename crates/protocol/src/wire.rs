//! Compact binary wire types
//!
//! Every field on the wire is preceded by a one-byte header carrying a 5-bit
//! type id, and containers carry their element types. That is what makes the
//! format self-describing: a reader can walk (or skip) any value without
//! knowing the schema.
//!
//! # Type ids
//!
//! ```text
//! STOP=0 STOP_BASE=1 BOOL=2 UINT8=3 UINT16=4 UINT32=5 UINT64=6 FLOAT=7
//! DOUBLE=8 STRING=9 STRUCT=10 LIST=11 SET=12 MAP=13 INT8=14 INT16=15
//! INT32=16 INT64=17 WSTRING=18
//! ```

/// Wire type id from a field header or container prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum WireType {
    Stop = 0,
    StopBase = 1,
    Bool = 2,
    UInt8 = 3,
    UInt16 = 4,
    UInt32 = 5,
    UInt64 = 6,
    Float = 7,
    Double = 8,
    String = 9,
    Struct = 10,
    List = 11,
    Set = 12,
    Map = 13,
    Int8 = 14,
    Int16 = 15,
    Int32 = 16,
    Int64 = 17,
    WString = 18,
}

impl WireType {
    /// Parse from raw 5-bit value; `None` for ids outside the table
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        Some(match value {
            0 => Self::Stop,
            1 => Self::StopBase,
            2 => Self::Bool,
            3 => Self::UInt8,
            4 => Self::UInt16,
            5 => Self::UInt32,
            6 => Self::UInt64,
            7 => Self::Float,
            8 => Self::Double,
            9 => Self::String,
            10 => Self::Struct,
            11 => Self::List,
            12 => Self::Set,
            13 => Self::Map,
            14 => Self::Int8,
            15 => Self::Int16,
            16 => Self::Int32,
            17 => Self::Int64,
            18 => Self::WString,
            _ => return None,
        })
    }

    /// Convert to raw byte value
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Get string representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::StopBase => "stop_base",
            Self::Bool => "bool",
            Self::UInt8 => "uint8",
            Self::UInt16 => "uint16",
            Self::UInt32 => "uint32",
            Self::UInt64 => "uint64",
            Self::Float => "float",
            Self::Double => "double",
            Self::String => "string",
            Self::Struct => "struct",
            Self::List => "list",
            Self::Set => "set",
            Self::Map => "map",
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::WString => "wstring",
        }
    }

    /// Whether this type can appear as a value (not a struct terminator)
    #[inline]
    pub const fn is_value(self) -> bool {
        !matches!(self, Self::Stop | Self::StopBase)
    }
}

impl std::fmt::Display for WireType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A decoded wire value
///
/// Signed integers of every width widen to `Int64`, unsigned to `UInt64`,
/// and `FLOAT` widens to `Double`. `Guid` only appears where the schema
/// declares a 16-byte GUID blob.
#[derive(Debug, Clone, PartialEq)]
pub enum WireValue {
    Int64(i64),
    UInt64(u64),
    Double(f64),
    Bool(bool),
    String(String),
    Guid([u8; 16]),
    /// Named fields in wire order
    Struct(Vec<(String, WireValue)>),
    /// LIST or SET elements
    Array(Vec<WireValue>),
    /// MAP entries in wire order
    Map(Vec<(WireValue, WireValue)>),
}

impl WireValue {
    /// Get string content if this is a `String`
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get a signed integer view of integral values
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int64(v) => Some(*v),
            Self::UInt64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Look up a struct field by name
    pub fn field(&self, name: &str) -> Option<&WireValue> {
        match self {
            Self::Struct(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Short name of the variant, for diagnostics
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Int64(_) => "int64",
            Self::UInt64(_) => "uint64",
            Self::Double(_) => "double",
            Self::Bool(_) => "bool",
            Self::String(_) => "string",
            Self::Guid(_) => "guid",
            Self::Struct(_) => "struct",
            Self::Array(_) => "array",
            Self::Map(_) => "map",
        }
    }
}
