use crate::{
    classfile::{Addressed, Resolvable},
    pool::{ConstantClass, ConstantEntry, ConstantNameAndType, ConstantPool, ConstantUtf8},
};
use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use support::{bytes_ext::SafeBuf, flags::AccessFlags};

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: Addressed<ConstantUtf8>,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, Default)]
pub struct Attributes {
    pub values: Vec<Attribute>,
}

impl Attributes {
    fn locate(&self, constant_pool: &ConstantPool, id: &str) -> Result<Option<&Attribute>> {
        for attr in self.values.iter() {
            if attr.name.try_resolve(constant_pool)?.string == id {
                return Ok(Some(attr));
            }
        }

        Ok(None)
    }

    pub fn find<T>(&self, constant_pool: &ConstantPool) -> Result<Option<T>>
    where
        T: KnownAttribute,
    {
        match self.locate(constant_pool, T::id())? {
            Some(attr) => {
                let bytes = Bytes::copy_from_slice(&attr.data);
                let decoded = T::decode(bytes, constant_pool)
                    .with_context(|| format!("could not decode {} attribute", T::id()))?;
                Ok(Some(decoded))
            }
            None => Ok(None),
        }
    }

    /// Whether a marker attribute such as `Deprecated` is present.
    pub fn has(&self, constant_pool: &ConstantPool, id: &str) -> Result<bool> {
        Ok(self.locate(constant_pool, id)?.is_some())
    }

    /// Names of the attributes not listed in `known`, in class file order.
    pub fn others(&self, constant_pool: &ConstantPool, known: &[&str]) -> Result<Vec<String>> {
        let mut out = vec![];
        for attr in self.values.iter() {
            let name = &attr.name.try_resolve(constant_pool)?.string;
            if !known.contains(&name.as_str()) {
                out.push(name.clone());
            }
        }

        Ok(out)
    }

    pub fn parse(bytes: &mut Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        let length = bytes.try_get_u16()?;
        let mut attributes = Attributes {
            values: Vec::with_capacity(length.into()),
        };

        for _ in 0..length {
            let name = constant_pool.address(bytes.try_get_u16()?);
            let attr_length = bytes.try_get_u32()?;
            let data = bytes.try_get_bytes(attr_length as usize)?;

            attributes.values.push(Attribute { name, data });
        }

        Ok(attributes)
    }
}

pub trait KnownAttribute
where
    Self: Sized,
{
    fn decode(bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self>;
    fn id() -> &'static str;
}

fn optional<T>(index: u16) -> Option<Addressed<T>> {
    if index == 0 {
        None
    } else {
        Some(Addressed::from(index))
    }
}

#[derive(Debug, Clone)]
pub struct CodeAttribute {
    pub max_stack: u16,
    pub max_locals: u16,
    pub code: Vec<u8>,
    pub exception_table: Vec<ExceptionEntry>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct ExceptionEntry {
    pub start_pc: u16,
    pub end_pc: u16,
    pub handler_pc: u16,
    pub catch_type: Option<Addressed<ConstantClass>>,
}

impl KnownAttribute for CodeAttribute {
    fn decode(mut bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        let max_stack = bytes.try_get_u16()?;
        let max_locals = bytes.try_get_u16()?;

        let code_length = bytes.try_get_u32()?;
        let code = bytes.try_get_bytes(code_length as usize)?;

        let exception_length = bytes.try_get_u16()?;
        let mut exception_table: Vec<ExceptionEntry> = Vec::with_capacity(exception_length.into());
        for _ in 0..exception_length {
            exception_table.push(ExceptionEntry {
                start_pc: bytes.try_get_u16()?,
                end_pc: bytes.try_get_u16()?,
                handler_pc: bytes.try_get_u16()?,
                catch_type: optional(bytes.try_get_u16()?),
            })
        }
        let attributes = Attributes::parse(&mut bytes, constant_pool)?;

        Ok(CodeAttribute {
            max_stack,
            max_locals,
            code,
            exception_table,
            attributes,
        })
    }

    fn id() -> &'static str {
        "Code"
    }
}

#[derive(Debug, Clone)]
pub struct ConstantValueAttribute {
    pub value: Addressed<ConstantEntry>,
}

impl KnownAttribute for ConstantValueAttribute {
    fn decode(mut bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        Ok(ConstantValueAttribute {
            value: constant_pool.address(bytes.try_get_u16()?),
        })
    }

    fn id() -> &'static str {
        "ConstantValue"
    }
}

#[derive(Debug, Clone)]
pub struct SignatureAttribute {
    pub signature: Addressed<ConstantUtf8>,
}

impl KnownAttribute for SignatureAttribute {
    fn decode(mut bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        Ok(SignatureAttribute {
            signature: constant_pool.address(bytes.try_get_u16()?),
        })
    }

    fn id() -> &'static str {
        "Signature"
    }
}

#[derive(Debug, Clone)]
pub struct SourceFileAttribute {
    pub source_file: Addressed<ConstantUtf8>,
}

impl KnownAttribute for SourceFileAttribute {
    fn decode(mut bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        Ok(SourceFileAttribute {
            source_file: constant_pool.address(bytes.try_get_u16()?),
        })
    }

    fn id() -> &'static str {
        "SourceFile"
    }
}

/// The whole attribute body is the (modified UTF-8) debug string.
#[derive(Debug, Clone)]
pub struct SourceDebugExtensionAttribute {
    pub debug: String,
}

impl KnownAttribute for SourceDebugExtensionAttribute {
    fn decode(bytes: Bytes, _constant_pool: &ConstantPool) -> Result<Self> {
        Ok(SourceDebugExtensionAttribute {
            debug: String::from_utf8_lossy(&bytes).into_owned(),
        })
    }

    fn id() -> &'static str {
        "SourceDebugExtension"
    }
}

#[derive(Debug, Clone)]
pub struct ExceptionsAttribute {
    pub exceptions: Vec<Addressed<ConstantClass>>,
}

impl KnownAttribute for ExceptionsAttribute {
    fn decode(mut bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        let length = bytes.try_get_u16()?;
        let mut exceptions = Vec::with_capacity(length.into());
        for _ in 0..length {
            exceptions.push(constant_pool.address(bytes.try_get_u16()?));
        }

        Ok(ExceptionsAttribute { exceptions })
    }

    fn id() -> &'static str {
        "Exceptions"
    }
}

#[derive(Debug, Clone)]
pub struct InnerClass {
    pub inner_class: Addressed<ConstantClass>,
    pub outer_class: Option<Addressed<ConstantClass>>,
    pub inner_name: Option<Addressed<ConstantUtf8>>,
    pub flags: AccessFlags,
}

#[derive(Debug, Clone)]
pub struct InnerClassesAttribute {
    pub classes: Vec<InnerClass>,
}

impl KnownAttribute for InnerClassesAttribute {
    fn decode(mut bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        let length = bytes.try_get_u16()?;
        let mut classes = Vec::with_capacity(length.into());
        for _ in 0..length {
            classes.push(InnerClass {
                inner_class: constant_pool.address(bytes.try_get_u16()?),
                outer_class: optional(bytes.try_get_u16()?),
                inner_name: optional(bytes.try_get_u16()?),
                flags: AccessFlags::from_raw(bytes.try_get_u16()? as u32),
            });
        }

        Ok(InnerClassesAttribute { classes })
    }

    fn id() -> &'static str {
        "InnerClasses"
    }
}

#[derive(Debug, Clone)]
pub struct EnclosingMethodAttribute {
    pub class: Addressed<ConstantClass>,
    pub method: Option<Addressed<ConstantNameAndType>>,
}

impl KnownAttribute for EnclosingMethodAttribute {
    fn decode(mut bytes: Bytes, constant_pool: &ConstantPool) -> Result<Self> {
        Ok(EnclosingMethodAttribute {
            class: constant_pool.address(bytes.try_get_u16()?),
            method: optional(bytes.try_get_u16()?),
        })
    }

    fn id() -> &'static str {
        "EnclosingMethod"
    }
}

/// Only the annotation type is kept, element values are skipped.
#[derive(Debug, Clone)]
pub struct Annotation {
    pub type_descriptor: Addressed<ConstantUtf8>,
}

fn skip_element_value(bytes: &mut Bytes) -> Result<()> {
    let tag = bytes.try_get_u8()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' | b'c' => {
            bytes.try_get_u16()?;
        }
        b'e' => {
            bytes.try_get_u16()?;
            bytes.try_get_u16()?;
        }
        b'@' => {
            parse_annotation(bytes)?;
        }
        b'[' => {
            let length = bytes.try_get_u16()?;
            for _ in 0..length {
                skip_element_value(bytes)?;
            }
        }
        _ => return Err(anyhow!("unknown element value tag {}", tag)),
    }

    Ok(())
}

fn parse_annotation(bytes: &mut Bytes) -> Result<Annotation> {
    let type_descriptor = Addressed::from(bytes.try_get_u16()?);
    let pairs = bytes.try_get_u16()?;
    for _ in 0..pairs {
        // element_name_index
        bytes.try_get_u16()?;
        skip_element_value(bytes)?;
    }

    Ok(Annotation { type_descriptor })
}

fn parse_annotations(bytes: &mut Bytes) -> Result<Vec<Annotation>> {
    let length = bytes.try_get_u16()?;
    let mut annotations = Vec::with_capacity(length.into());
    for _ in 0..length {
        annotations.push(parse_annotation(bytes)?);
    }

    Ok(annotations)
}

macro_rules! annotations_attribute {
    ($name: ident, $id: literal) => {
        #[derive(Debug, Clone)]
        pub struct $name {
            pub annotations: Vec<Annotation>,
        }

        impl KnownAttribute for $name {
            fn decode(mut bytes: Bytes, _constant_pool: &ConstantPool) -> Result<Self> {
                Ok($name {
                    annotations: parse_annotations(&mut bytes)?,
                })
            }

            fn id() -> &'static str {
                $id
            }
        }
    };
}

annotations_attribute!(VisibleAnnotationsAttribute, "RuntimeVisibleAnnotations");
annotations_attribute!(InvisibleAnnotationsAttribute, "RuntimeInvisibleAnnotations");
