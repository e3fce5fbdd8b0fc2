//! Field and method renderers. Each one renders its header when created, collects body
//! fragments, and hands back one [`Fragment`] from `finish` for the class renderer to embed.

use support::{
    flags::{write_keywords, AccessFlags, DeclarationKind},
    signature::{decode_field, decode_method},
};

use crate::{
    error::RenderError,
    model::{FieldDescriptor, MethodDescriptor},
    text::{Fragment, TAB},
};

/// The comment lines every member starts with.
fn write_preamble(out: &mut String, access: AccessFlags, signature: Option<&str>) {
    out.push('\n');
    if access.has(AccessFlags::DEPRECATED) {
        out.push_str(&format!("{TAB}// DEPRECATED\n"));
    }
    out.push_str(&format!("{TAB}// access flags {}\n", access.bits()));
    if let Some(signature) = signature {
        out.push_str(&format!("{TAB}// signature {signature}\n"));
    }
}

#[derive(Debug)]
pub struct FieldRenderer {
    fragment: Fragment,
}

impl FieldRenderer {
    pub fn new(field: &FieldDescriptor) -> Result<Self, RenderError> {
        let declared_type = match &field.signature {
            Some(signature) => decode_field(signature)?.declaration,
            None => field.descriptor.clone(),
        };

        let mut header = String::new();
        write_preamble(&mut header, field.access, field.signature.as_deref());

        header.push_str(TAB);
        write_keywords(&mut header, field.access, DeclarationKind::Field);
        if field.access.has(AccessFlags::ENUM) {
            header.push_str("enum ");
        }

        header.push_str(&declared_type);
        header.push(' ');
        header.push_str(&field.name);

        if let Some(value) = &field.value {
            header.push_str(&format!(" = {value}"));
        }
        header.push('\n');

        Ok(Self {
            fragment: Fragment::from_text(header),
        })
    }

    /// Embeds a body fragment (annotations, attributes) verbatim after what is already there.
    pub fn body(&mut self, fragment: Fragment) {
        self.fragment.append(fragment);
    }

    pub fn finish(self) -> Fragment {
        self.fragment
    }
}

#[derive(Debug)]
pub struct MethodRenderer {
    fragment: Fragment,
}

impl MethodRenderer {
    pub fn new(method: &MethodDescriptor) -> Result<Self, RenderError> {
        let declaration = match &method.signature {
            Some(signature) => {
                let decoded = decode_method(signature)?;
                let return_type = decoded.return_type.unwrap_or_default();
                format!("{} : {}", decoded.declaration, return_type)
            }
            None => method.descriptor.clone(),
        };

        let mut header = String::new();
        write_preamble(&mut header, method.access, method.signature.as_deref());

        header.push_str(TAB);
        write_keywords(&mut header, method.access, DeclarationKind::Method);
        for (flag, keyword) in [
            (AccessFlags::NATIVE, "native "),
            (AccessFlags::VARARGS, "varargs "),
            (AccessFlags::BRIDGE, "bridge "),
        ] {
            if method.access.has(flag) {
                header.push_str(keyword);
            }
        }

        header.push_str(&method.name);
        header.push_str(&declaration);

        if !method.exceptions.is_empty() {
            header.push_str(" throws ");
            header.push_str(&method.exceptions.join(", "));
        }
        header.push('\n');

        Ok(Self {
            fragment: Fragment::from_text(header),
        })
    }

    /// Embeds a body fragment (code summary, annotations, attributes) verbatim.
    pub fn body(&mut self, fragment: Fragment) {
        self.fragment.append(fragment);
    }

    pub fn finish(self) -> Fragment {
        self.fragment
    }
}

/// The body the default reader attaches to methods with a `Code` attribute.
pub fn code_summary(max_stack: u16, max_locals: u16) -> Fragment {
    Fragment::from_text(format!(
        "{TAB}{TAB}MAXSTACK = {max_stack}\n{TAB}{TAB}MAXLOCALS = {max_locals}\n"
    ))
}
