use anyhow::{anyhow, Context, Result};
use enum_as_inner::EnumAsInner;

use crate::classfile::{Addressed, Resolvable};

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<ConstantEntry>,
}

impl ConstantPool {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    pub fn insert(&mut self, entry: ConstantEntry) {
        self.entries.push(entry)
    }

    /// Looks up a 1-based constant pool index.
    pub fn get(&self, index: u16) -> Result<&ConstantEntry> {
        if index == 0 {
            return Err(anyhow!("constant pool index 0 is never valid"));
        }

        self.entries
            .get((index - 1) as usize)
            .ok_or(anyhow!("no value found @ {}", index))
    }

    pub fn address<T>(&self, for_index: u16) -> Addressed<T> {
        Addressed::from(for_index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Resolves `class` to its internal name.
    pub fn class_name(&self, class: &Addressed<ConstantClass>) -> Result<String> {
        let class = class.try_resolve(self)?;
        Ok(class.name.try_resolve(self)?.string.clone())
    }

    pub fn utf8(&self, utf8: &Addressed<ConstantUtf8>) -> Result<String> {
        Ok(utf8.try_resolve(self)?.string.clone())
    }

    pub(crate) fn perform_format_checking(&self) -> Result<()> {
        for (index, item) in self.entries.iter().enumerate() {
            let checked = match item {
                ConstantEntry::Class(data) => data.name.try_resolve(self).map(|_| ()),
                ConstantEntry::Field(data)
                | ConstantEntry::Method(data)
                | ConstantEntry::InterfaceMethod(data) => data
                    .class
                    .try_resolve(self)
                    .and(data.name_and_type.try_resolve(self).map(|_| ())),
                ConstantEntry::String(data) => data.string.try_resolve(self).map(|_| ()),
                ConstantEntry::NameAndType(data) => data
                    .name
                    .try_resolve(self)
                    .and(data.descriptor.try_resolve(self).map(|_| ())),
                ConstantEntry::MethodType(data) => data.descriptor.try_resolve(self).map(|_| ()),
                ConstantEntry::Dynamic(data) | ConstantEntry::InvokeDynamic(data) => {
                    data.name_and_type.try_resolve(self).map(|_| ())
                }
                ConstantEntry::Module(data) | ConstantEntry::Package(data) => {
                    data.name.try_resolve(self).map(|_| ())
                }
                ConstantEntry::Integer(_)
                | ConstantEntry::Float(_)
                | ConstantEntry::Long(_)
                | ConstantEntry::Double(_)
                | ConstantEntry::Utf8(_)
                | ConstantEntry::MethodHandle(_)
                | ConstantEntry::Reserved => Ok(()),
            };

            checked.with_context(|| format!("constant pool entry {} is invalid", index + 1))?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTag {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    Field,
    Method,
    InterfaceMethod,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

impl ConstantTag {
    pub fn from_tag(tag: u8) -> Result<Self> {
        Ok(match tag {
            1 => ConstantTag::Utf8,
            3 => ConstantTag::Integer,
            4 => ConstantTag::Float,
            5 => ConstantTag::Long,
            6 => ConstantTag::Double,
            7 => ConstantTag::Class,
            8 => ConstantTag::String,
            9 => ConstantTag::Field,
            10 => ConstantTag::Method,
            11 => ConstantTag::InterfaceMethod,
            12 => ConstantTag::NameAndType,
            15 => ConstantTag::MethodHandle,
            16 => ConstantTag::MethodType,
            17 => ConstantTag::Dynamic,
            18 => ConstantTag::InvokeDynamic,
            19 => ConstantTag::Module,
            20 => ConstantTag::Package,
            _ => return Err(anyhow!("{} is an unknown tag", tag)),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ConstantClass {
    pub name: Addressed<ConstantUtf8>,
}

/// Field, method and interface method references share a layout.
#[derive(Debug, Clone)]
pub struct ConstantMember {
    pub class: Addressed<ConstantClass>,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

#[derive(Debug, Clone)]
pub struct ConstantString {
    pub string: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantNameAndType {
    pub name: Addressed<ConstantUtf8>,
    pub descriptor: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantUtf8 {
    pub string: String,
}

#[derive(Debug, Clone)]
pub struct ConstantMethodHandle {
    pub kind: u8,
    pub index: u16,
}

#[derive(Debug, Clone)]
pub struct ConstantMethodType {
    pub descriptor: Addressed<ConstantUtf8>,
}

#[derive(Debug, Clone)]
pub struct ConstantDynamic {
    pub method_index: u16,
    pub name_and_type: Addressed<ConstantNameAndType>,
}

/// Module and package entries only carry a name.
#[derive(Debug, Clone)]
pub struct ConstantNamed {
    pub name: Addressed<ConstantUtf8>,
}

#[derive(EnumAsInner, Clone, Debug)]
pub enum ConstantEntry {
    Utf8(ConstantUtf8),
    Integer(i32),
    Float(f32),
    Long(i64),
    Double(f64),
    Class(ConstantClass),
    String(ConstantString),
    Field(ConstantMember),
    Method(ConstantMember),
    InterfaceMethod(ConstantMember),
    NameAndType(ConstantNameAndType),
    MethodHandle(ConstantMethodHandle),
    MethodType(ConstantMethodType),
    Dynamic(ConstantDynamic),
    InvokeDynamic(ConstantDynamic),
    Module(ConstantNamed),
    Package(ConstantNamed),

    // Second slot of a long or double.
    Reserved,
}
