use anyhow::{anyhow, Context, Result};
use bytes::Bytes;
use support::bytes_ext::SafeBuf;
use support::descriptor::{FieldType, MethodType};
use support::flags::AccessFlags;
use tracing::debug;

use crate::attributes::Attributes;
use crate::classfile::{Addressed, ClassFile, Field, Fields, Interfaces, MetaData, Method, Methods};
use crate::constants::MAGIC;
use crate::pool::{
    ConstantClass, ConstantDynamic, ConstantEntry, ConstantMember, ConstantMethodHandle,
    ConstantMethodType, ConstantNameAndType, ConstantNamed, ConstantPool, ConstantString,
    ConstantTag, ConstantUtf8,
};

pub struct Parser {
    bytes: Bytes,
}

impl Parser {
    pub fn new(data: &[u8]) -> Self {
        Self {
            bytes: Bytes::copy_from_slice(data),
        }
    }

    fn parse_constant_pool(&mut self) -> Result<ConstantPool> {
        let length = self.bytes.try_get_u16()?;
        let mut pool = ConstantPool::new();

        let mut i = 1;
        while i < length {
            let tag = ConstantTag::from_tag(self.bytes.try_get_u8()?)?;
            let entry = match tag {
                ConstantTag::Class => ConstantEntry::Class(ConstantClass {
                    name: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Field | ConstantTag::Method | ConstantTag::InterfaceMethod => {
                    let member = ConstantMember {
                        class: pool.address(self.bytes.try_get_u16()?),
                        name_and_type: pool.address(self.bytes.try_get_u16()?),
                    };

                    match tag {
                        ConstantTag::Field => ConstantEntry::Field(member),
                        ConstantTag::Method => ConstantEntry::Method(member),
                        _ => ConstantEntry::InterfaceMethod(member),
                    }
                }
                ConstantTag::String => ConstantEntry::String(ConstantString {
                    string: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Integer => ConstantEntry::Integer(self.bytes.try_get_i32()?),
                ConstantTag::Float => ConstantEntry::Float(self.bytes.try_get_f32()?),
                ConstantTag::Long => ConstantEntry::Long(self.bytes.try_get_i64()?),
                ConstantTag::Double => ConstantEntry::Double(self.bytes.try_get_f64()?),
                ConstantTag::NameAndType => ConstantEntry::NameAndType(ConstantNameAndType {
                    name: pool.address(self.bytes.try_get_u16()?),
                    descriptor: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Utf8 => {
                    let length = self.bytes.try_get_u16()?;
                    let bytes = self.bytes.try_get_bytes(length.into())?;

                    ConstantEntry::Utf8(ConstantUtf8 {
                        string: decode_modified_utf8(&bytes)
                            .with_context(|| format!("constant pool entry {} is not utf8", i))?,
                    })
                }
                ConstantTag::MethodHandle => ConstantEntry::MethodHandle(ConstantMethodHandle {
                    kind: self.bytes.try_get_u8()?,
                    index: self.bytes.try_get_u16()?,
                }),
                ConstantTag::MethodType => ConstantEntry::MethodType(ConstantMethodType {
                    descriptor: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Dynamic | ConstantTag::InvokeDynamic => {
                    let dynamic = ConstantDynamic {
                        method_index: self.bytes.try_get_u16()?,
                        name_and_type: pool.address(self.bytes.try_get_u16()?),
                    };

                    if tag == ConstantTag::Dynamic {
                        ConstantEntry::Dynamic(dynamic)
                    } else {
                        ConstantEntry::InvokeDynamic(dynamic)
                    }
                }
                ConstantTag::Module => ConstantEntry::Module(ConstantNamed {
                    name: pool.address(self.bytes.try_get_u16()?),
                }),
                ConstantTag::Package => ConstantEntry::Package(ConstantNamed {
                    name: pool.address(self.bytes.try_get_u16()?),
                }),
            };

            let should_reserve_next =
                matches!(entry, ConstantEntry::Long(_) | ConstantEntry::Double(_));
            pool.insert(entry);

            // Special case: 64 Bit types are supposed to take up 2 slots
            // So, insert a dummy and increment the index by an additional 1
            if should_reserve_next {
                pool.insert(ConstantEntry::Reserved);
                i += 1;
            }

            i += 1;
        }

        Ok(pool)
    }

    fn parse_interfaces(&mut self, pool: &ConstantPool) -> Result<Interfaces> {
        let length = self.bytes.try_get_u16()?;
        let mut interfaces = Interfaces {
            values: Vec::with_capacity(length.into()),
        };

        for _ in 0..length {
            interfaces
                .values
                .push(pool.address(self.bytes.try_get_u16()?));
        }

        Ok(interfaces)
    }

    fn parse_fields(&mut self, pool: &ConstantPool) -> Result<Fields> {
        let length = self.bytes.try_get_u16()?;
        let mut fields = Fields {
            values: Vec::with_capacity(length.into()),
        };

        for _ in 0..length {
            let field = Field {
                flags: AccessFlags::from_raw(self.bytes.try_get_u16()? as u32),
                name: pool.address(self.bytes.try_get_u16()?),
                descriptor: pool.address(self.bytes.try_get_u16()?),
                attributes: Attributes::parse(&mut self.bytes, pool)?,
            };

            // Format checking: field descriptors must be valid (§4.3.2)
            let descriptor = pool.utf8(&field.descriptor)?;
            FieldType::parse(&descriptor)
                .with_context(|| format!("invalid field descriptor {}", descriptor))?;

            fields.values.push(field);
        }

        Ok(fields)
    }

    fn parse_methods(&mut self, pool: &ConstantPool) -> Result<Methods> {
        let length = self.bytes.try_get_u16()?;
        let mut methods = Methods {
            values: Vec::with_capacity(length.into()),
        };

        for _ in 0..length {
            let method = Method {
                flags: AccessFlags::from_raw(self.bytes.try_get_u16()? as u32),
                name: pool.address(self.bytes.try_get_u16()?),
                descriptor: pool.address(self.bytes.try_get_u16()?),
                attributes: Attributes::parse(&mut self.bytes, pool)?,
            };

            // Format checking: method descriptors must be valid (§4.3.3)
            let descriptor = pool.utf8(&method.descriptor)?;
            MethodType::parse(&descriptor)
                .with_context(|| format!("invalid method descriptor {}", descriptor))?;

            methods.values.push(method);
        }

        Ok(methods)
    }

    pub fn parse(&mut self) -> Result<ClassFile> {
        let magic = self.bytes.try_get_u32()?;

        // Format checking: The first four bytes must contain the right magic number
        if magic != MAGIC {
            return Err(anyhow!("invalid magic value '{:#x}'", magic));
        }

        let minor = self.bytes.try_get_u16()?;
        let major = self.bytes.try_get_u16()?;

        let meta_data = MetaData {
            minor_version: minor,
            major_version: major,
        };

        let constant_pool = self.parse_constant_pool()?;
        // Format checking: The constant pool must satisfy the constraints documented throughout §4.4.
        constant_pool.perform_format_checking()?;

        let access_flags = AccessFlags::from_raw(self.bytes.try_get_u16()? as u32);
        let this_class: Addressed<ConstantClass> = constant_pool.address(self.bytes.try_get_u16()?);

        let super_class_index = self.bytes.try_get_u16()?;
        let mut super_class: Option<Addressed<ConstantClass>> = None;
        if super_class_index != 0 {
            super_class = Some(constant_pool.address(super_class_index));
        }

        let interfaces = self.parse_interfaces(&constant_pool)?;
        let fields = self.parse_fields(&constant_pool)?;
        let methods = self.parse_methods(&constant_pool)?;
        let attributes = Attributes::parse(&mut self.bytes, &constant_pool)?;

        // Format checking: The class file must not be truncated or have extra bytes at the end
        if !self.bytes.is_empty() {
            return Err(anyhow!("classfile has extra bytes at the end"));
        }

        debug!(
            "parsed class {} ({} constants, {} fields, {} methods)",
            constant_pool.class_name(&this_class)?,
            constant_pool.len(),
            fields.values.len(),
            methods.values.len()
        );

        Ok(ClassFile {
            constant_pool,
            meta_data,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            attributes,
        })
    }
}

/// Class files store strings as modified UTF-8 (JVMS 4.4.7): NUL is `C0 80` and
/// supplementary characters are written as two encoded surrogates.
pub fn decode_modified_utf8(bytes: &[u8]) -> Result<String> {
    if let Ok(str) = std::str::from_utf8(bytes) {
        return Ok(str.to_string());
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let a = bytes[i] as u16;
        let (unit, width) = if a & 0x80 == 0 {
            (a, 1)
        } else if a & 0xE0 == 0xC0 {
            let b = *bytes.get(i + 1).ok_or(anyhow!("truncated 2 byte sequence"))? as u16;
            (((a & 0x1F) << 6) | (b & 0x3F), 2)
        } else if a & 0xF0 == 0xE0 {
            let b = *bytes.get(i + 1).ok_or(anyhow!("truncated 3 byte sequence"))? as u16;
            let c = *bytes.get(i + 2).ok_or(anyhow!("truncated 3 byte sequence"))? as u16;
            (((a & 0x0F) << 12) | ((b & 0x3F) << 6) | (c & 0x3F), 3)
        } else {
            return Err(anyhow!("invalid byte {:#x} at {}", a, i));
        };

        units.push(unit);
        i += width;
    }

    Ok(String::from_utf16(&units)?)
}
