#![allow(dead_code)]

use std::{collections::HashMap, fs, path::PathBuf};

pub mod bin;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_VARARGS: u16 = 0x0080;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_ENUM: u16 = 0x4000;

const TMP_DIR: &str = env!("CARGO_TARGET_TMPDIR");

/// Attributes the builder knows how to lay out. Pool entries are created on demand.
#[derive(Debug, Clone)]
pub enum Attr<'a> {
    SourceFile(&'a str),
    SourceDebug(&'a str),
    Signature(&'a str),
    Deprecated,
    Synthetic,
    ConstantInt(i32),
    ConstantLong(i64),
    ConstantDouble(f64),
    ConstantString(&'a str),
    Code { max_stack: u16, max_locals: u16 },
    Exceptions(&'a [&'a str]),
    VisibleAnnotation(&'a str),
    InvisibleAnnotation(&'a str),
    InnerClass {
        inner: &'a str,
        outer: Option<&'a str>,
        name: Option<&'a str>,
        access: u16,
    },
    EnclosingMethod {
        class: &'a str,
        method: Option<(&'a str, &'a str)>,
    },
    Custom(&'a str, &'a [u8]),
}

/// Assembles class file bytes by hand so tests do not need a Java compiler.
pub struct ClassBuilder {
    name: String,
    access: u16,
    major: u16,
    minor: u16,
    super_name: Option<String>,
    interfaces: Vec<String>,

    pool: Vec<u8>,
    pool_slots: u16,
    utf8s: HashMap<String, u16>,

    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

fn u16(out: &mut Vec<u8>, v: u16) {
    out.extend_from_slice(&v.to_be_bytes());
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            access: ACC_PUBLIC | ACC_SUPER,
            major: 52,
            minor: 0,
            super_name: Some("java/lang/Object".to_string()),
            interfaces: vec![],
            pool: vec![],
            pool_slots: 0,
            utf8s: HashMap::new(),
            fields: vec![],
            methods: vec![],
            attributes: vec![],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn super_class(mut self, super_name: Option<&str>) -> Self {
        self.super_name = super_name.map(|s| s.to_string());
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    fn entry(&mut self, bytes: &[u8], slots: u16) -> u16 {
        self.pool.extend_from_slice(bytes);
        let index = self.pool_slots + 1;
        self.pool_slots += slots;
        index
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8s.get(value) {
            return *index;
        }

        let mut bytes = vec![1];
        u16(&mut bytes, value.len() as u16);
        bytes.extend_from_slice(value.as_bytes());

        let index = self.entry(&bytes, 1);
        self.utf8s.insert(value.to_string(), index);
        index
    }

    fn class(&mut self, name: &str) -> u16 {
        let name = self.utf8(name);
        let mut bytes = vec![7];
        u16(&mut bytes, name);
        self.entry(&bytes, 1)
    }

    fn attribute(&mut self, attr: &Attr) -> Vec<u8> {
        let (name, body) = match attr {
            Attr::SourceFile(file) => ("SourceFile", self.utf8(file).to_be_bytes().to_vec()),
            Attr::SourceDebug(debug) => ("SourceDebugExtension", debug.as_bytes().to_vec()),
            Attr::Signature(signature) => ("Signature", self.utf8(signature).to_be_bytes().to_vec()),
            Attr::Deprecated => ("Deprecated", vec![]),
            Attr::Synthetic => ("Synthetic", vec![]),
            Attr::ConstantInt(value) => {
                let mut bytes = vec![3];
                bytes.extend_from_slice(&value.to_be_bytes());
                ("ConstantValue", self.entry(&bytes, 1).to_be_bytes().to_vec())
            }
            Attr::ConstantLong(value) => {
                let mut bytes = vec![5];
                bytes.extend_from_slice(&value.to_be_bytes());
                ("ConstantValue", self.entry(&bytes, 2).to_be_bytes().to_vec())
            }
            Attr::ConstantDouble(value) => {
                let mut bytes = vec![6];
                bytes.extend_from_slice(&value.to_be_bytes());
                ("ConstantValue", self.entry(&bytes, 2).to_be_bytes().to_vec())
            }
            Attr::ConstantString(value) => {
                let string = self.utf8(value);
                let mut bytes = vec![8];
                u16(&mut bytes, string);
                ("ConstantValue", self.entry(&bytes, 1).to_be_bytes().to_vec())
            }
            Attr::Code {
                max_stack,
                max_locals,
            } => {
                let mut body = vec![];
                u16(&mut body, *max_stack);
                u16(&mut body, *max_locals);
                // a single `return`
                body.extend_from_slice(&1u32.to_be_bytes());
                body.push(0xB1);
                u16(&mut body, 0);
                u16(&mut body, 0);
                ("Code", body)
            }
            Attr::Exceptions(exceptions) => {
                let mut body = vec![];
                u16(&mut body, exceptions.len() as u16);
                for exception in exceptions.iter() {
                    let class = self.class(exception);
                    u16(&mut body, class);
                }
                ("Exceptions", body)
            }
            Attr::VisibleAnnotation(descriptor) | Attr::InvisibleAnnotation(descriptor) => {
                let mut body = vec![];
                u16(&mut body, 1);
                u16(&mut body, self.utf8(descriptor));
                u16(&mut body, 0);

                let name = if matches!(attr, Attr::VisibleAnnotation(_)) {
                    "RuntimeVisibleAnnotations"
                } else {
                    "RuntimeInvisibleAnnotations"
                };
                (name, body)
            }
            Attr::InnerClass {
                inner,
                outer,
                name,
                access,
            } => {
                let mut body = vec![];
                u16(&mut body, 1);
                u16(&mut body, self.class(inner));
                u16(&mut body, outer.map(|o| self.class(o)).unwrap_or(0));
                u16(&mut body, name.map(|n| self.utf8(n)).unwrap_or(0));
                u16(&mut body, *access);
                ("InnerClasses", body)
            }
            Attr::EnclosingMethod { class, method } => {
                let mut body = vec![];
                u16(&mut body, self.class(class));

                let method = match method {
                    Some((name, descriptor)) => {
                        let mut bytes = vec![12];
                        u16(&mut bytes, self.utf8(name));
                        u16(&mut bytes, self.utf8(descriptor));
                        self.entry(&bytes, 1)
                    }
                    None => 0,
                };
                u16(&mut body, method);
                ("EnclosingMethod", body)
            }
            Attr::Custom(name, body) => (*name, body.to_vec()),
        };

        let mut out = vec![];
        u16(&mut out, self.utf8(name));
        out.extend_from_slice(&(body.len() as u32).to_be_bytes());
        out.extend_from_slice(&body);
        out
    }

    fn member(&mut self, access: u16, name: &str, descriptor: &str, attributes: &[Attr]) -> Vec<u8> {
        let mut out = vec![];
        u16(&mut out, access);
        u16(&mut out, self.utf8(name));
        u16(&mut out, self.utf8(descriptor));
        u16(&mut out, attributes.len() as u16);
        for attr in attributes {
            let bytes = self.attribute(attr);
            out.extend_from_slice(&bytes);
        }
        out
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str, attributes: &[Attr]) -> Self {
        let field = self.member(access, name, descriptor, attributes);
        self.fields.push(field);
        self
    }

    pub fn method(mut self, access: u16, name: &str, descriptor: &str, attributes: &[Attr]) -> Self {
        let method = self.member(access, name, descriptor, attributes);
        self.methods.push(method);
        self
    }

    pub fn attribute_of(mut self, attr: Attr) -> Self {
        let bytes = self.attribute(&attr);
        self.attributes.push(bytes);
        self
    }

    pub fn build(mut self) -> Vec<u8> {
        let this_class = self.class(&self.name.clone());
        let super_class = match self.super_name.clone() {
            Some(name) => self.class(&name),
            None => 0,
        };
        let interfaces = self
            .interfaces
            .clone()
            .iter()
            .map(|i| self.class(i))
            .collect::<Vec<_>>();

        let mut out = vec![0xCA, 0xFE, 0xBA, 0xBE];
        u16(&mut out, self.minor);
        u16(&mut out, self.major);
        u16(&mut out, self.pool_slots + 1);
        out.extend_from_slice(&self.pool);

        u16(&mut out, self.access);
        u16(&mut out, this_class);
        u16(&mut out, super_class);

        u16(&mut out, interfaces.len() as u16);
        for interface in interfaces {
            u16(&mut out, interface);
        }

        for table in [&self.fields, &self.methods, &self.attributes] {
            u16(&mut out, table.len() as u16);
            for entry in table {
                out.extend_from_slice(entry);
            }
        }

        out
    }

    /// Writes the class under the test target dir, laid out by package, and returns its path.
    pub fn write(self) -> PathBuf {
        let path = PathBuf::from(TMP_DIR).join(format!("{}.class", self.name));
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("class directory to be created");
        }

        fs::write(&path, self.build()).expect("class file to be written");
        path
    }
}
