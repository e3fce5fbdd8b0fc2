//! Decoder for generic signatures (JVMS 4.7.9.1).
//!
//! Signatures are decoded straight into their source-like spelling:
//! `<T:Ljava/lang/Object;>(Ljava/util/List<TT;>;)TT;` becomes the declaration `<T>(java.util.List<T>)`
//! with the return type `T`.

use thiserror::Error;

use crate::descriptor::BaseType;

const ROOT_TYPE: &str = "java.lang.Object";

/// JVMS 4.4.1
const MAX_ARRAY_DIMENSIONS: usize = 255;
const MAX_TYPE_NESTING: usize = 255;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed signature `{signature}` at {position}: {reason}")]
pub struct SignatureError {
    pub signature: String,
    pub position: usize,
    pub reason: String,
}

/// A decoded signature.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Declaration {
    /// Formal type parameters followed by the kind specific part: the `extends` / `implements`
    /// clause of a class, the parameter list of a method or the type of a field.
    pub declaration: String,
    /// Only set for method signatures.
    pub return_type: Option<String>,
    /// `^` markers of a method signature, in order.
    pub exceptions: Vec<String>,
}

pub fn decode_class(signature: &str, is_interface: bool) -> Result<Declaration, SignatureError> {
    let mut parser = Parser::new(signature);
    let mut declaration = parser.formal_type_parameters()?;

    let super_class = parser.class_type()?;
    if super_class != ROOT_TYPE {
        declaration.push_str(" extends ");
        declaration.push_str(&super_class);
    }

    let mut interfaces = Vec::new();
    while parser.peek().is_some() {
        interfaces.push(parser.class_type()?);
    }

    if !interfaces.is_empty() {
        declaration.push_str(if is_interface {
            " extends "
        } else {
            " implements "
        });
        declaration.push_str(&interfaces.join(", "));
    }

    Ok(Declaration {
        declaration,
        return_type: None,
        exceptions: vec![],
    })
}

pub fn decode_field(signature: &str) -> Result<Declaration, SignatureError> {
    let mut parser = Parser::new(signature);
    let declaration = parser.reference_type()?;
    parser.finish()?;

    Ok(Declaration {
        declaration,
        return_type: None,
        exceptions: vec![],
    })
}

pub fn decode_method(signature: &str) -> Result<Declaration, SignatureError> {
    let mut parser = Parser::new(signature);
    let mut declaration = parser.formal_type_parameters()?;

    parser.expect('(')?;
    let mut parameters = Vec::new();
    while parser.peek() != Some(')') {
        parameters.push(parser.java_type()?);
    }
    parser.expect(')')?;

    declaration.push('(');
    declaration.push_str(&parameters.join(", "));
    declaration.push(')');

    let return_type = if parser.peek() == Some('V') {
        parser.bump()?;
        BaseType::Void.keyword().to_string()
    } else {
        parser.java_type()?
    };

    let mut exceptions = Vec::new();
    while parser.peek() == Some('^') {
        parser.bump()?;
        let exception = match parser.peek() {
            Some('T') => parser.type_variable()?,
            _ => parser.class_type()?,
        };
        exceptions.push(exception);
    }
    parser.finish()?;

    Ok(Declaration {
        declaration,
        return_type: Some(return_type),
        exceptions,
    })
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    /// Class types currently open, bounded by `MAX_TYPE_NESTING`.
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            depth: 0,
        }
    }

    fn error(&self, reason: impl Into<String>) -> SignatureError {
        SignatureError {
            signature: self.src.to_string(),
            position: self.pos,
            reason: reason.into(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn bump(&mut self) -> Result<char, SignatureError> {
        let next = self.peek().ok_or_else(|| self.error("out of chars"))?;
        self.pos += next.len_utf8();
        Ok(next)
    }

    fn expect(&mut self, expect: char) -> Result<(), SignatureError> {
        match self.peek() {
            Some(next) if next == expect => {
                self.pos += next.len_utf8();
                Ok(())
            }
            Some(next) => Err(self.error(format!("expected {expect} got {next}"))),
            None => Err(self.error(format!("expected {expect} got end of input"))),
        }
    }

    fn finish(&self) -> Result<(), SignatureError> {
        if self.pos != self.src.len() {
            return Err(self.error("trailing characters"));
        }
        Ok(())
    }

    /// Reads up to (not including) the first char in `stop`. End of input is an error, every
    /// identifier is followed by some terminator.
    fn identifier(&mut self, stop: &[char]) -> Result<&'a str, SignatureError> {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if stop.contains(&c) => break,
                Some(c) => self.pos += c.len_utf8(),
                None => return Err(self.error("unterminated identifier")),
            }
        }

        if start == self.pos {
            return Err(self.error("empty identifier"));
        }

        let src = self.src;
        Ok(&src[start..self.pos])
    }

    /// Renders `<T, U extends X & Y>`, or nothing when there are no formals.
    fn formal_type_parameters(&mut self) -> Result<String, SignatureError> {
        let mut out = String::new();
        if self.peek() != Some('<') {
            return Ok(out);
        }
        self.bump()?;
        out.push('<');

        let mut first = true;
        while self.peek() != Some('>') {
            if !first {
                out.push_str(", ");
            }
            first = false;

            let name = self.identifier(&[':', '>'])?;
            out.push_str(name);
            self.expect(':')?;

            let mut bounds = Vec::new();
            if matches!(self.peek(), Some('L' | 'T' | '[')) {
                let class_bound = self.reference_type()?;
                if class_bound != ROOT_TYPE {
                    bounds.push(class_bound);
                }
            }

            while self.peek() == Some(':') {
                self.bump()?;
                bounds.push(self.reference_type()?);
            }

            if !bounds.is_empty() {
                out.push_str(" extends ");
                out.push_str(&bounds.join(" & "));
            }
        }

        if first {
            return Err(self.error("empty formal type parameter list"));
        }

        self.expect('>')?;
        out.push('>');
        Ok(out)
    }

    fn java_type(&mut self) -> Result<String, SignatureError> {
        match self.peek() {
            Some('V') => Err(self.error("void is only allowed as a return type")),
            Some(c) => match BaseType::from_char(c) {
                Some(base) => {
                    self.bump()?;
                    Ok(base.keyword().to_string())
                }
                None => self.reference_type(),
            },
            None => Err(self.error("expected a type got end of input")),
        }
    }

    fn reference_type(&mut self) -> Result<String, SignatureError> {
        match self.peek() {
            Some('L') => self.class_type(),
            Some('T') => self.type_variable(),
            Some('[') => {
                let mut dimensions = 0;
                while self.peek() == Some('[') {
                    self.bump()?;
                    dimensions += 1;
                }

                if dimensions > MAX_ARRAY_DIMENSIONS {
                    return Err(self.error(format!("{dimensions} array dimensions")));
                }

                let component = self.java_type()?;
                Ok(format!("{component}{}", "[]".repeat(dimensions)))
            }
            Some(c) => Err(self.error(format!("expected a reference type got {c}"))),
            None => Err(self.error("expected a reference type got end of input")),
        }
    }

    fn type_variable(&mut self) -> Result<String, SignatureError> {
        self.expect('T')?;
        let name = self.identifier(&[';'])?;
        self.expect(';')?;
        Ok(name.to_string())
    }

    fn class_type(&mut self) -> Result<String, SignatureError> {
        if self.depth == MAX_TYPE_NESTING {
            return Err(self.error("type arguments nested too deeply"));
        }

        self.depth += 1;
        let class_type = self.nested_class_type();
        self.depth -= 1;
        class_type
    }

    fn nested_class_type(&mut self) -> Result<String, SignatureError> {
        self.expect('L')?;

        let mut out = self.identifier(&['<', '.', ';'])?.replace('/', ".");
        self.type_arguments(&mut out)?;

        while self.peek() == Some('.') {
            self.bump()?;
            out.push('.');
            out.push_str(self.identifier(&['<', '.', ';'])?);
            self.type_arguments(&mut out)?;
        }

        self.expect(';')?;
        Ok(out)
    }

    fn type_arguments(&mut self, out: &mut String) -> Result<(), SignatureError> {
        if self.peek() != Some('<') {
            return Ok(());
        }
        self.bump()?;

        let mut arguments = Vec::new();
        while self.peek() != Some('>') {
            let argument = match self.peek() {
                Some('*') => {
                    self.bump()?;
                    "?".to_string()
                }
                Some('+') => {
                    self.bump()?;
                    format!("? extends {}", self.reference_type()?)
                }
                Some('-') => {
                    self.bump()?;
                    format!("? super {}", self.reference_type()?)
                }
                _ => self.reference_type()?,
            };
            arguments.push(argument);
        }

        if arguments.is_empty() {
            return Err(self.error("empty type argument list"));
        }

        self.expect('>')?;
        out.push('<');
        out.push_str(&arguments.join(", "));
        out.push('>');
        Ok(())
    }
}
