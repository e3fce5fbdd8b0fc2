use std::{fmt, iter::Peekable, str::Chars};

use anyhow::{anyhow, Result};
use enum_as_inner::EnumAsInner;

/// <BaseType> ::= 'B' | 'C' | 'D' | 'F' | 'I' | 'J' | 'S' | 'Z'
#[derive(EnumAsInner, Debug, PartialEq, Eq, Clone, Copy)]
pub enum BaseType {
    Boolean, // Z
    Char,    // C
    Float,   // F
    Double,  // D
    Byte,    // B
    Short,   // S
    Int,     // I
    Long,    // J
    Void,    // V
}

impl BaseType {
    pub fn from_char(c: char) -> Option<Self> {
        Some(match c {
            'Z' => BaseType::Boolean,
            'C' => BaseType::Char,
            'F' => BaseType::Float,
            'D' => BaseType::Double,
            'B' => BaseType::Byte,
            'S' => BaseType::Short,
            'I' => BaseType::Int,
            'J' => BaseType::Long,
            'V' => BaseType::Void,
            _ => return None,
        })
    }

    pub fn notation(&self) -> char {
        match self {
            BaseType::Boolean => 'Z',
            BaseType::Char => 'C',
            BaseType::Float => 'F',
            BaseType::Double => 'D',
            BaseType::Byte => 'B',
            BaseType::Short => 'S',
            BaseType::Int => 'I',
            BaseType::Long => 'J',
            BaseType::Void => 'V',
        }
    }

    /// The source-level spelling, as used in decoded signatures.
    pub fn keyword(&self) -> &'static str {
        match self {
            BaseType::Boolean => "boolean",
            BaseType::Char => "char",
            BaseType::Float => "float",
            BaseType::Double => "double",
            BaseType::Byte => "byte",
            BaseType::Short => "short",
            BaseType::Int => "int",
            BaseType::Long => "long",
            BaseType::Void => "void",
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.notation())
    }
}

/// <ObjectType> ::= 'L' <ClassName> ';'
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ObjectType {
    pub class_name: String,
}

impl fmt::Display for ObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{};", self.class_name)
    }
}

/// <ArrayType> ::= '[' <FieldType>
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct ArrayType {
    pub field_type: Box<FieldType>,
}

impl fmt::Display for ArrayType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}", self.field_type)
    }
}

#[derive(EnumAsInner, Debug, PartialEq, Eq, Clone)]
pub enum FieldType {
    Base(BaseType),
    Object(ObjectType),
    Array(ArrayType),
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Base(base) => base.fmt(f),
            FieldType::Object(object) => object.fmt(f),
            FieldType::Array(array) => array.fmt(f),
        }
    }
}

impl FieldType {
    fn parse_from_iterator(chars: &mut Peekable<Chars>) -> Result<Self> {
        let first = chars.next().ok_or(anyhow!("no more chars"))?;

        if let Some(base) = BaseType::from_char(first) {
            return Ok(FieldType::Base(base));
        }

        Ok(match first {
            '[' => FieldType::Array(ArrayType {
                field_type: Box::new(FieldType::parse_from_iterator(chars)?),
            }),
            'L' => {
                let mut class_name = String::new();
                loop {
                    match chars.next() {
                        Some(';') => break,
                        Some(c) => class_name.push(c),
                        None => return Err(anyhow!("unterminated class name {class_name}")),
                    }
                }

                if class_name.is_empty() {
                    return Err(anyhow!("empty class name"));
                }

                FieldType::Object(ObjectType { class_name })
            }
            _ => return Err(anyhow!("unknown type {first}")),
        })
    }

    pub fn parse(str: &str) -> Result<Self> {
        let mut chars = str.chars().peekable();
        let ty = FieldType::parse_from_iterator(&mut chars)?;

        if chars.peek().is_some() {
            return Err(anyhow!("trailing characters in field descriptor {str}"));
        }

        Ok(ty)
    }
}

/// <MethodType> ::= '(' { <FieldType> } ')' <FieldType>
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct MethodType {
    pub parameters: Vec<FieldType>,
    pub return_type: FieldType,
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for parameter in &self.parameters {
            write!(f, "{parameter}")?;
        }
        write!(f, "){}", self.return_type)
    }
}

impl MethodType {
    pub fn parse(str: &str) -> Result<Self> {
        let mut chars = str.chars().peekable();
        if chars.next() != Some('(') {
            return Err(anyhow!("descriptor did not start with ("));
        }

        let mut parameters = Vec::new();

        loop {
            match chars.peek() {
                Some(')') => break,
                Some(_) => parameters.push(FieldType::parse_from_iterator(&mut chars)?),
                None => return Err(anyhow!("descriptor {str} has no closing )")),
            }
        }

        // Skip )
        chars.next();

        let return_type = FieldType::parse_from_iterator(&mut chars)?;
        if chars.peek().is_some() {
            return Err(anyhow!("trailing characters in method descriptor {str}"));
        }

        Ok(MethodType {
            parameters,
            return_type,
        })
    }
}
