//! Common Schema record layout
//!
//! Static description of the `CsProtocol` record as it appears on the wire.
//! The wire format is self-describing, so the reader never needs this table
//! to stay in sync with the producer. It only uses it to name fields and to
//! recognize 16-byte GUID blobs. Field ids absent from the table are skipped.
//!
//! ```text
//! struct Record {
//!     1: ver  2: name  3: time  4: popSample  5: iKey  6: flags  7: cV
//!     20..=42: ext* extension slots (vector<Ext>, at most one element)
//!     41: ext (vector<Data>)   51: tags (map<string,string>)
//!     60: baseType  61: baseData (vector<Data>)  70: data (vector<Data>)
//! }
//! struct Data  { 1: properties (map<string, Value>) }
//! struct Value { 1: type  2: attributes  3: stringValue  4: longValue
//!                5: doubleValue  6: guidValue  10..=13: *Array }
//! ```

/// How the reader should interpret a field beyond its wire type
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    /// Decode by wire type alone
    Any,
    /// `list<uint8>` carrying a 16-byte GUID
    Guid,
    /// Nested struct with a known layout
    Struct(&'static StructDef),
    /// LIST/SET whose elements have the given shape
    List(&'static Shape),
    /// MAP whose values have the given shape
    Map(&'static Shape),
}

/// A named field of a struct layout
#[derive(Debug, Clone, Copy)]
pub struct FieldDef {
    pub id: u16,
    pub name: &'static str,
    pub shape: Shape,
}

/// A struct layout: name and fields in id order
#[derive(Debug)]
pub struct StructDef {
    pub name: &'static str,
    pub fields: &'static [FieldDef],
}

impl StructDef {
    /// Find a field by wire id
    pub fn field(&self, id: u16) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Find a field by name
    pub fn field_by_name(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }
}

const fn any(id: u16, name: &'static str) -> FieldDef {
    FieldDef {
        id,
        name,
        shape: Shape::Any,
    }
}

// =============================================================================
// Property values
// =============================================================================

pub const PII: StructDef = StructDef {
    name: "PII",
    fields: &[any(1, "Kind")],
};

pub const CUSTOMER_CONTENT: StructDef = StructDef {
    name: "CustomerContent",
    fields: &[any(1, "Kind")],
};

pub const ATTRIBUTES: StructDef = StructDef {
    name: "Attributes",
    fields: &[
        FieldDef { id: 1, name: "pii", shape: Shape::List(&Shape::Struct(&PII)) },
        FieldDef {
            id: 2,
            name: "customerContent",
            shape: Shape::List(&Shape::Struct(&CUSTOMER_CONTENT)),
        },
    ],
};

pub const VALUE: StructDef = StructDef {
    name: "Value",
    fields: &[
        any(1, "type"),
        FieldDef { id: 2, name: "attributes", shape: Shape::List(&Shape::Struct(&ATTRIBUTES)) },
        any(3, "stringValue"),
        any(4, "longValue"),
        any(5, "doubleValue"),
        FieldDef { id: 6, name: "guidValue", shape: Shape::List(&Shape::Guid) },
        any(10, "stringArray"),
        any(11, "longArray"),
        any(12, "doubleArray"),
        FieldDef { id: 13, name: "guidArray", shape: Shape::List(&Shape::List(&Shape::Guid)) },
    ],
};

pub const DATA: StructDef = StructDef {
    name: "Data",
    fields: &[FieldDef { id: 1, name: "properties", shape: Shape::Map(&Shape::Struct(&VALUE)) }],
};

// =============================================================================
// Extensions
// =============================================================================

pub const INGEST: StructDef = StructDef {
    name: "Ingest",
    fields: &[
        any(1, "time"),
        any(2, "clientIp"),
        any(3, "auth"),
        any(4, "quality"),
        any(5, "uploadTime"),
        any(6, "userAgent"),
        any(7, "client"),
    ],
};

pub const PROTOCOL: StructDef = StructDef {
    name: "Protocol",
    fields: &[
        any(1, "metadataCrc"),
        any(2, "ticketKeys"),
        any(3, "devMake"),
        any(4, "devModel"),
        any(5, "msp"),
    ],
};

pub const USER: StructDef = StructDef {
    name: "User",
    fields: &[any(1, "id"), any(2, "localId"), any(3, "authId"), any(4, "locale")],
};

pub const DEVICE: StructDef = StructDef {
    name: "Device",
    fields: &[
        any(1, "id"),
        any(2, "localId"),
        any(3, "authId"),
        any(4, "authSecId"),
        any(5, "deviceClass"),
        any(6, "orgId"),
        any(7, "orgAuthId"),
        any(8, "make"),
        any(9, "model"),
        any(10, "authIdEnt"),
    ],
};

pub const OS: StructDef = StructDef {
    name: "Os",
    fields: &[
        any(1, "locale"),
        any(2, "expId"),
        any(3, "bootId"),
        any(4, "name"),
        any(5, "ver"),
    ],
};

pub const APP: StructDef = StructDef {
    name: "App",
    fields: &[
        any(1, "expId"),
        any(2, "userId"),
        any(3, "env"),
        any(4, "asId"),
        any(5, "id"),
        any(6, "ver"),
        any(7, "locale"),
        any(8, "name"),
        any(9, "sesId"),
    ],
};

pub const UTC: StructDef = StructDef {
    name: "Utc",
    fields: &[
        any(1, "stId"),
        any(2, "aId"),
        any(3, "raId"),
        any(4, "op"),
        any(5, "cat"),
        any(6, "flags"),
        any(7, "sqmId"),
        any(9, "mon"),
        any(10, "cpId"),
        any(11, "bSeq"),
        any(12, "epoch"),
        any(13, "seq"),
        any(14, "popSample"),
        any(15, "eventFlags"),
        any(16, "wsId"),
        any(17, "wcmp"),
        any(18, "wPId"),
    ],
};

pub const XBL: StructDef = StructDef {
    name: "Xbl",
    fields: &[
        any(5, "claims"),
        any(10, "nbf"),
        any(20, "exp"),
        any(30, "sbx"),
        any(40, "dty"),
        any(50, "did"),
        any(60, "xid"),
        any(70, "uts"),
        any(80, "pid"),
        any(90, "dvr"),
        any(100, "tid"),
        any(110, "tvr"),
        any(120, "sty"),
        any(130, "sid"),
        any(140, "eid"),
        any(150, "ip"),
    ],
};

pub const JAVASCRIPT: StructDef = StructDef {
    name: "Javascript",
    fields: &[
        any(1, "libVer"),
        any(2, "osName"),
        any(3, "browser"),
        any(4, "browserVersion"),
        any(5, "platform"),
        any(6, "make"),
        any(7, "model"),
        any(8, "screenSize"),
        any(9, "msfpc"),
        any(10, "mc1Id"),
        any(11, "mc1Lu"),
        any(12, "isMc1New"),
        any(13, "ms0"),
        any(14, "anid"),
        any(15, "a"),
        any(16, "msResearch"),
        any(17, "csrvc"),
        any(18, "rtCell"),
        any(19, "rtEndAction"),
        any(20, "rtPermId"),
        any(21, "r"),
        any(22, "wtFpc"),
        any(23, "omniId"),
        any(24, "gsfxSession"),
        any(25, "domain"),
        any(26, "userConsent"),
        any(27, "browserLang"),
        any(28, "serviceName"),
        any(29, "dnt"),
    ],
};

pub const RECEIPTS: StructDef = StructDef {
    name: "Receipts",
    fields: &[any(1, "originalTime"), any(2, "uploadTime")],
};

pub const NET: StructDef = StructDef {
    name: "Net",
    fields: &[any(1, "provider"), any(2, "cost"), any(3, "type")],
};

pub const SDK: StructDef = StructDef {
    name: "Sdk",
    fields: &[
        any(1, "libVer"),
        any(2, "epoch"),
        any(3, "seq"),
        any(4, "installId"),
        any(5, "ver"),
    ],
};

pub const LOC: StructDef = StructDef {
    name: "Loc",
    fields: &[any(1, "id"), any(2, "country"), any(3, "timezone")],
};

pub const CLOUD: StructDef = StructDef {
    name: "Cloud",
    fields: &[
        any(1, "fullEnvName"),
        any(2, "location"),
        any(3, "environment"),
        any(4, "deploymentUnit"),
        any(5, "name"),
        any(6, "roleInstance"),
        any(7, "role"),
    ],
};

pub const SERVICE: StructDef = StructDef {
    name: "Service",
    fields: &[any(1, "name"), any(2, "role"), any(3, "roleVersion")],
};

pub const CS: StructDef = StructDef {
    name: "Cs",
    fields: &[any(1, "sig")],
};

pub const M365A: StructDef = StructDef {
    name: "M365a",
    fields: &[any(1, "enrolledTenantId"), any(2, "msp")],
};

pub const MSCV: StructDef = StructDef {
    name: "Mscv",
    fields: &[any(1, "cV")],
};

pub const INT_WEB: StructDef = StructDef {
    name: "IntWeb",
    fields: &[
        any(1, "mc1Id"),
        any(2, "msfpc"),
        any(3, "anid"),
        any(4, "serviceName"),
    ],
};

pub const INT_SERVICE: StructDef = StructDef {
    name: "IntService",
    fields: &[
        any(1, "fullEnvName"),
        any(2, "location"),
        any(3, "environment"),
        any(4, "deploymentUnit"),
        any(5, "name"),
    ],
};

pub const WEB: StructDef = StructDef {
    name: "Web",
    fields: &[
        any(1, "browser"),
        any(2, "browserVer"),
        any(3, "screenRes"),
        any(4, "domain"),
        any(5, "userConsent"),
        any(6, "browserLang"),
        any(7, "isManual"),
    ],
};

// =============================================================================
// Record
// =============================================================================

pub const RECORD: StructDef = StructDef {
    name: "Record",
    fields: &[
        any(1, "ver"),
        any(2, "name"),
        any(3, "time"),
        any(4, "popSample"),
        any(5, "iKey"),
        any(6, "flags"),
        any(7, "cV"),
        FieldDef { id: 20, name: "extIngest", shape: Shape::List(&Shape::Struct(&INGEST)) },
        FieldDef { id: 21, name: "extProtocol", shape: Shape::List(&Shape::Struct(&PROTOCOL)) },
        FieldDef { id: 22, name: "extUser", shape: Shape::List(&Shape::Struct(&USER)) },
        FieldDef { id: 23, name: "extDevice", shape: Shape::List(&Shape::Struct(&DEVICE)) },
        FieldDef { id: 24, name: "extOs", shape: Shape::List(&Shape::Struct(&OS)) },
        FieldDef { id: 25, name: "extApp", shape: Shape::List(&Shape::Struct(&APP)) },
        FieldDef { id: 26, name: "extUtc", shape: Shape::List(&Shape::Struct(&UTC)) },
        FieldDef { id: 27, name: "extXbl", shape: Shape::List(&Shape::Struct(&XBL)) },
        FieldDef {
            id: 28,
            name: "extJavascript",
            shape: Shape::List(&Shape::Struct(&JAVASCRIPT)),
        },
        FieldDef { id: 29, name: "extReceipts", shape: Shape::List(&Shape::Struct(&RECEIPTS)) },
        FieldDef { id: 31, name: "extNet", shape: Shape::List(&Shape::Struct(&NET)) },
        FieldDef { id: 32, name: "extSdk", shape: Shape::List(&Shape::Struct(&SDK)) },
        FieldDef { id: 33, name: "extLoc", shape: Shape::List(&Shape::Struct(&LOC)) },
        FieldDef { id: 34, name: "extCloud", shape: Shape::List(&Shape::Struct(&CLOUD)) },
        FieldDef { id: 35, name: "extService", shape: Shape::List(&Shape::Struct(&SERVICE)) },
        FieldDef { id: 36, name: "extCs", shape: Shape::List(&Shape::Struct(&CS)) },
        FieldDef { id: 37, name: "extM365a", shape: Shape::List(&Shape::Struct(&M365A)) },
        FieldDef { id: 38, name: "extMscv", shape: Shape::List(&Shape::Struct(&MSCV)) },
        FieldDef { id: 39, name: "extIntWeb", shape: Shape::List(&Shape::Struct(&INT_WEB)) },
        FieldDef {
            id: 40,
            name: "extIntService",
            shape: Shape::List(&Shape::Struct(&INT_SERVICE)),
        },
        FieldDef { id: 41, name: "ext", shape: Shape::List(&Shape::Struct(&DATA)) },
        FieldDef { id: 42, name: "extWeb", shape: Shape::List(&Shape::Struct(&WEB)) },
        any(51, "tags"),
        any(60, "baseType"),
        FieldDef { id: 61, name: "baseData", shape: Shape::List(&Shape::Struct(&DATA)) },
        FieldDef { id: 70, name: "data", shape: Shape::List(&Shape::Struct(&DATA)) },
    ],
};

// =============================================================================
// Value kinds
// =============================================================================

/// Discriminant carried in `Value.type`
///
/// NOTE: These values are used on the wire. An absent `type` means
/// `String`, the schema default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum ValueKind {
    Int64 = 0,
    UInt64 = 1,
    Int32 = 2,
    UInt32 = 3,
    Double = 4,
    #[default]
    String = 5,
    Bool = 6,
    DateTime = 7,
    Guid = 8,
    ArrayInt64 = 9,
    ArrayUInt64 = 10,
    ArrayInt32 = 11,
    ArrayUInt32 = 12,
    ArrayDouble = 13,
    ArrayString = 14,
    ArrayBool = 15,
    ArrayDateTime = 16,
    ArrayGuid = 17,
}

impl ValueKind {
    /// Parse from the raw wire value; `None` for unknown kinds
    #[inline]
    pub const fn from_i64(value: i64) -> Option<Self> {
        Some(match value {
            0 => Self::Int64,
            1 => Self::UInt64,
            2 => Self::Int32,
            3 => Self::UInt32,
            4 => Self::Double,
            5 => Self::String,
            6 => Self::Bool,
            7 => Self::DateTime,
            8 => Self::Guid,
            9 => Self::ArrayInt64,
            10 => Self::ArrayUInt64,
            11 => Self::ArrayInt32,
            12 => Self::ArrayUInt32,
            13 => Self::ArrayDouble,
            14 => Self::ArrayString,
            15 => Self::ArrayBool,
            16 => Self::ArrayDateTime,
            17 => Self::ArrayGuid,
            _ => return None,
        })
    }

    /// Convert to raw wire value
    #[inline]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Check if this kind carries an array payload
    #[inline]
    pub const fn is_array(self) -> bool {
        self as u8 >= Self::ArrayInt64 as u8
    }

    /// Get string representation
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Int64 => "int64",
            Self::UInt64 => "uint64",
            Self::Int32 => "int32",
            Self::UInt32 => "uint32",
            Self::Double => "double",
            Self::String => "string",
            Self::Bool => "bool",
            Self::DateTime => "datetime",
            Self::Guid => "guid",
            Self::ArrayInt64 => "array_int64",
            Self::ArrayUInt64 => "array_uint64",
            Self::ArrayInt32 => "array_int32",
            Self::ArrayUInt32 => "array_uint32",
            Self::ArrayDouble => "array_double",
            Self::ArrayString => "array_string",
            Self::ArrayBool => "array_bool",
            Self::ArrayDateTime => "array_datetime",
            Self::ArrayGuid => "array_guid",
        }
    }
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
