//! Access flags shared by classes, fields, methods and inner classes, and the keyword
//! rendering for them.
//!
//! The JVM reuses bit positions between declaration kinds (`SUPER`/`SYNCHRONIZED`,
//! `VOLATILE`/`BRIDGE`, `TRANSIENT`/`VARARGS`). Keyword rendering does not reinterpret them:
//! each set bit gets its keyword.

use bitflags::bitflags;
use tracing::{trace, warn};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct AccessFlags: u32 {
        const PUBLIC = 0x0001;
        const PRIVATE = 0x0002;
        const PROTECTED = 0x0004;
        const STATIC = 0x0008;
        const FINAL = 0x0010;
        const SUPER = 0x0020;
        const SYNCHRONIZED = 0x0020;
        const VOLATILE = 0x0040;
        const BRIDGE = 0x0040;
        const TRANSIENT = 0x0080;
        const VARARGS = 0x0080;
        const NATIVE = 0x0100;
        const INTERFACE = 0x0200;
        const ABSTRACT = 0x0400;
        const STRICT_FP = 0x0800;
        const SYNTHETIC = 0x1000;
        const ANNOTATION = 0x2000;
        const ENUM = 0x4000;
        const MODULE = 0x8000;

        // Not a class file bit. Set when the declaration carries a `Deprecated` attribute.
        const DEPRECATED = 0x20000;
    }
}

impl AccessFlags {
    /// Keeps every bit, known or not, so the raw value survives rendering.
    pub fn from_raw(raw: u32) -> Self {
        let flags = Self::from_bits_retain(raw);
        let unknown = raw & !Self::all().bits();

        if unknown != 0 {
            warn!("unrecognised access bits {:#x} in {:#x}", unknown, raw);
        }

        flags
    }

    pub fn has(&self, other: AccessFlags) -> bool {
        self.contains(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclarationKind {
    Class,
    Field,
    Method,
}

const KEYWORD_ORDER: [(AccessFlags, &str); 10] = [
    (AccessFlags::PUBLIC, "public"),
    (AccessFlags::PRIVATE, "private"),
    (AccessFlags::PROTECTED, "protected"),
    (AccessFlags::FINAL, "final"),
    (AccessFlags::STATIC, "static"),
    (AccessFlags::SYNCHRONIZED, "synchronized"),
    (AccessFlags::VOLATILE, "volatile"),
    (AccessFlags::TRANSIENT, "transient"),
    (AccessFlags::ABSTRACT, "abstract"),
    (AccessFlags::STRICT_FP, "strictfp"),
];

/// Modifier keywords for `flags`, always in the same order whatever the kind. Every set bit
/// renders, so combinations are not checked (`public private` renders as given) and a bridge
/// method shows `volatile` as well. Callers clear bits they do not want, such as `SUPER`.
pub fn keywords(flags: AccessFlags, kind: DeclarationKind) -> Vec<&'static str> {
    trace!("{:?} keywords for {:#x}", kind, flags.bits());

    KEYWORD_ORDER
        .iter()
        .filter(|(flag, _)| flags.contains(*flag))
        .map(|(_, keyword)| *keyword)
        .collect()
}

/// Appends each keyword followed by a single space.
pub fn write_keywords(out: &mut String, flags: AccessFlags, kind: DeclarationKind) {
    for keyword in keywords(flags, kind) {
        out.push_str(keyword);
        out.push(' ');
    }
}
