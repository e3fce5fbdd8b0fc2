use crate::{
    attributes::Attributes,
    pool::{ConstantClass, ConstantEntry, ConstantNameAndType, ConstantPool, ConstantUtf8},
};
use anyhow::{anyhow, Result};
use std::{fmt, marker::PhantomData};
use support::flags::AccessFlags;

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub constant_pool: ConstantPool,
    pub meta_data: MetaData,

    pub access_flags: AccessFlags,
    pub this_class: Addressed<ConstantClass>,
    pub super_class: Option<Addressed<ConstantClass>>,

    pub interfaces: Interfaces,
    pub fields: Fields,
    pub methods: Methods,
    pub attributes: Attributes,
}

impl ClassFile {
    pub fn name(&self) -> Result<String> {
        self.constant_pool.class_name(&self.this_class)
    }
}

#[derive(Debug, Clone)]
pub struct Field {
    pub flags: AccessFlags,
    pub name: Addressed<ConstantUtf8>,
    pub descriptor: Addressed<ConstantUtf8>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Fields {
    pub(crate) values: Vec<Field>,
}

impl Fields {
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.values.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Method {
    pub flags: AccessFlags,
    pub name: Addressed<ConstantUtf8>,
    pub descriptor: Addressed<ConstantUtf8>,
    pub attributes: Attributes,
}

#[derive(Debug, Clone)]
pub struct Methods {
    pub(crate) values: Vec<Method>,
}

impl Methods {
    pub fn iter(&self) -> impl Iterator<Item = &Method> {
        self.values.iter()
    }
}

#[derive(Debug, Clone)]
pub struct Interfaces {
    pub(crate) values: Vec<Addressed<ConstantClass>>,
}

impl Interfaces {
    pub fn iter(&self) -> impl Iterator<Item = &Addressed<ConstantClass>> {
        self.values.iter()
    }
}

#[derive(Debug, Clone)]
pub struct MetaData {
    pub minor_version: u16,
    pub major_version: u16,
}

impl MetaData {
    /// `(minor << 16) | major`
    pub fn packed(&self) -> u32 {
        ((self.minor_version as u32) << 16) | self.major_version as u32
    }
}

/// A typed 1-based index into a [`ConstantPool`].
pub struct Addressed<T> {
    phantom: PhantomData<T>,
    index: u16,
}

impl<T> Addressed<T> {
    pub fn from(index: u16) -> Self {
        Self {
            phantom: PhantomData,
            index,
        }
    }

    pub fn index(&self) -> u16 {
        self.index
    }
}

impl<T> Clone for Addressed<T> {
    fn clone(&self) -> Self {
        Self::from(self.index)
    }
}

impl<T> fmt::Debug for Addressed<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Addressed {{ {} }}", self.index)
    }
}

pub trait Resolvable<T> {
    fn try_resolve<'p>(&self, pool: &'p ConstantPool) -> Result<&'p T>;
}

macro_rules! address {
    ($type: ty, $enum: ident) => {
        impl Resolvable<$type> for Addressed<$type> {
            fn try_resolve<'p>(&self, pool: &'p ConstantPool) -> Result<&'p $type> {
                match pool.get(self.index)? {
                    ConstantEntry::$enum(data) => Ok(data),
                    value => Err(anyhow!(
                        "expected {} got type {:?} @ {}",
                        stringify!($enum),
                        value,
                        self.index
                    )),
                }
            }
        }
    };
}

impl Resolvable<ConstantEntry> for Addressed<ConstantEntry> {
    fn try_resolve<'p>(&self, pool: &'p ConstantPool) -> Result<&'p ConstantEntry> {
        pool.get(self.index)
    }
}

address!(ConstantClass, Class);
address!(ConstantNameAndType, NameAndType);
address!(ConstantUtf8, Utf8);
