//! What the callback source hands to the renderer. All names are already resolved, internal
//! names use `/` separators.

use std::fmt::{self, Write};

use support::flags::AccessFlags;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassDescriptor {
    /// `(minor << 16) | major`
    pub version: u32,
    pub access: AccessFlags,
    pub name: String,
    pub signature: Option<String>,
    pub super_name: Option<String>,
    pub interfaces: Vec<String>,
}

impl ClassDescriptor {
    pub fn major(&self) -> u32 {
        self.version & 0xFFFF
    }

    pub fn minor(&self) -> u32 {
        self.version >> 16
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    pub access: AccessFlags,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub value: Option<ConstantValue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub access: AccessFlags,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub exceptions: Vec<String>,
}

/// The initial value of a `static final` field.
#[derive(Debug, Clone, PartialEq)]
pub enum ConstantValue {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl fmt::Display for ConstantValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConstantValue::Int(v) => write!(f, "{v}"),
            ConstantValue::Long(v) => write!(f, "{v}"),
            ConstantValue::Float(v) => write_floating(f, *v),
            ConstantValue::Double(v) => write_floating(f, *v),
            ConstantValue::String(v) => {
                f.write_char('"')?;
                write_escaped(f, v)?;
                f.write_char('"')
            }
        }
    }
}

/// Java's `Double.toString` layout: plain decimals for magnitudes in `[1e-3, 1e7)`, otherwise
/// `d.dddEn`, always with a fraction digit.
fn write_floating<T>(f: &mut fmt::Formatter<'_>, value: T) -> fmt::Result
where
    T: Copy + Into<f64> + fmt::Debug + fmt::LowerExp,
{
    let wide: f64 = value.into();
    if wide.is_nan() {
        return f.write_str("NaN");
    }
    if wide.is_infinite() {
        return f.write_str(if wide > 0.0 { "Infinity" } else { "-Infinity" });
    }

    let magnitude = wide.abs();
    if magnitude == 0.0 || (1e-3..1e7).contains(&magnitude) {
        // `{:?}` keeps the fraction, `1.0` rather than `1`
        return write!(f, "{value:?}");
    }

    let scientific = format!("{value:e}");
    match scientific.split_once('e') {
        Some((mantissa, exponent)) if mantissa.contains('.') => write!(f, "{mantissa}E{exponent}"),
        Some((mantissa, exponent)) => write!(f, "{mantissa}.0E{exponent}"),
        None => f.write_str(&scientific),
    }
}

/// Escapes the way a Java string literal would. Non-ASCII text is kept as is.
fn write_escaped(f: &mut fmt::Formatter<'_>, value: &str) -> fmt::Result {
    for c in value.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\r' => f.write_str("\\r")?,
            '\t' => f.write_str("\\t")?,
            '\u{8}' => f.write_str("\\b")?,
            '\u{c}' => f.write_str("\\f")?,
            c if c.is_control() => write!(f, "\\u{:04x}", c as u32)?,
            c => f.write_char(c)?,
        }
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OuterClass {
    pub owner: String,
    pub name: Option<String>,
    pub descriptor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    pub name: String,
    pub outer_name: Option<String>,
    pub inner_name: Option<String>,
    pub access: AccessFlags,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Annotation {
    pub descriptor: String,
    pub visible: bool,
}

/// An attribute the renderer has no dedicated step for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
}
