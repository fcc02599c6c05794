use serde::{Deserialize, Serialize};
use std::fmt;

use crate::common::{HeapDbError, RecordId, Result};

/// Fixed payload width of a string field on disk. Strings are stored as a
/// 4-byte length prefix followed by this many bytes, zero-padded.
pub const STRING_LEN: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    Int,
    Str,
}

impl FieldType {
    /// On-disk width of a field of this type, in bytes.
    pub fn byte_len(&self) -> usize {
        match self {
            FieldType::Int => 4,
            FieldType::Str => 4 + STRING_LEN,
        }
    }
}

/// One field value, tagged by type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Field {
    Int(i32),
    Str(String),
}

impl Field {
    pub fn field_type(&self) -> FieldType {
        match self {
            Field::Int(_) => FieldType::Int,
            Field::Str(_) => FieldType::Str,
        }
    }

    fn encode_into(&self, buf: &mut [u8]) {
        match self {
            Field::Int(v) => buf[..4].copy_from_slice(&v.to_le_bytes()),
            Field::Str(s) => {
                let bytes = s.as_bytes();
                let len = bytes.len().min(STRING_LEN);
                buf[..4].copy_from_slice(&(len as u32).to_le_bytes());
                buf[4..4 + len].copy_from_slice(&bytes[..len]);
                buf[4 + len..4 + STRING_LEN].fill(0);
            }
        }
    }

    fn decode(ty: FieldType, buf: &[u8]) -> Result<Field> {
        match ty {
            FieldType::Int => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&buf[..4]);
                Ok(Field::Int(i32::from_le_bytes(raw)))
            }
            FieldType::Str => {
                let mut raw = [0u8; 4];
                raw.copy_from_slice(&buf[..4]);
                let len = u32::from_le_bytes(raw) as usize;
                if len > STRING_LEN {
                    return Err(HeapDbError::Corrupt(format!(
                        "string length {} exceeds maximum {}",
                        len, STRING_LEN
                    )));
                }
                let s = std::str::from_utf8(&buf[4..4 + len])
                    .map_err(|e| HeapDbError::Corrupt(format!("invalid utf-8 in string field: {e}")))?;
                Ok(Field::Str(s.to_string()))
            }
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Int(v) => write!(f, "{v}"),
            Field::Str(s) => write!(f, "{s}"),
        }
    }
}

/// Schema of a tuple: an ordered list of `(type, name)` pairs. All tuples
/// of one table share a descriptor, which fixes their on-disk width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TupleDesc {
    fields: Vec<(FieldType, String)>,
}

impl TupleDesc {
    pub fn new(fields: Vec<(FieldType, String)>) -> Self {
        Self { fields }
    }

    pub fn num_fields(&self) -> usize {
        self.fields.len()
    }

    pub fn field_type(&self, i: usize) -> FieldType {
        self.fields[i].0
    }

    pub fn field_name(&self, i: usize) -> &str {
        &self.fields[i].1
    }

    /// Total on-disk width of one tuple, in bytes.
    pub fn byte_size(&self) -> usize {
        self.fields.iter().map(|(ty, _)| ty.byte_len()).sum()
    }
}

/// One row, bound to its descriptor. Carries its [`RecordId`] once it has
/// been materialized on a page.
#[derive(Debug, Clone, PartialEq)]
pub struct Tuple {
    desc: TupleDesc,
    fields: Vec<Field>,
    record_id: Option<RecordId>,
}

impl Tuple {
    pub fn new(desc: TupleDesc, fields: Vec<Field>) -> Result<Self> {
        if fields.len() != desc.num_fields() {
            return Err(HeapDbError::SchemaMismatch(format!(
                "expected {} fields, got {}",
                desc.num_fields(),
                fields.len()
            )));
        }
        for (i, field) in fields.iter().enumerate() {
            if field.field_type() != desc.field_type(i) {
                return Err(HeapDbError::SchemaMismatch(format!(
                    "field {} has type {:?}, expected {:?}",
                    i,
                    field.field_type(),
                    desc.field_type(i)
                )));
            }
        }
        Ok(Self {
            desc,
            fields,
            record_id: None,
        })
    }

    pub fn desc(&self) -> &TupleDesc {
        &self.desc
    }

    pub fn field(&self, i: usize) -> &Field {
        &self.fields[i]
    }

    pub fn record_id(&self) -> Option<RecordId> {
        self.record_id
    }

    pub fn set_record_id(&mut self, rid: Option<RecordId>) {
        self.record_id = rid;
    }

    /// Serializes the tuple into exactly `desc.byte_size()` bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.desc.byte_size()];
        let mut offset = 0;
        for field in &self.fields {
            let len = field.field_type().byte_len();
            field.encode_into(&mut buf[offset..offset + len]);
            offset += len;
        }
        buf
    }

    pub fn from_bytes(desc: &TupleDesc, buf: &[u8]) -> Result<Self> {
        if buf.len() < desc.byte_size() {
            return Err(HeapDbError::Corrupt(format!(
                "tuple buffer too short: {} < {}",
                buf.len(),
                desc.byte_size()
            )));
        }
        let mut fields = Vec::with_capacity(desc.num_fields());
        let mut offset = 0;
        for i in 0..desc.num_fields() {
            let ty = desc.field_type(i);
            fields.push(Field::decode(ty, &buf[offset..offset + ty.byte_len()])?);
            offset += ty.byte_len();
        }
        Ok(Self {
            desc: desc.clone(),
            fields,
            record_id: None,
        })
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, "\t")?;
            }
            write!(f, "{field}")?;
        }
        Ok(())
    }
}
