//! Walks a parsed class file and feeds the renderer in callback order.

use std::io::Write;

use anyhow::{Context, Result};
use parse::{
    attributes::{
        Attributes, CodeAttribute, ConstantValueAttribute, EnclosingMethodAttribute,
        ExceptionsAttribute, InnerClassesAttribute, InvisibleAnnotationsAttribute,
        SignatureAttribute, SourceDebugExtensionAttribute, SourceFileAttribute,
        VisibleAnnotationsAttribute,
    },
    classfile::{ClassFile, Resolvable},
    pool::{ConstantEntry, ConstantPool},
};
use support::flags::AccessFlags;
use tracing::{debug, warn};

use crate::{
    member::code_summary,
    model::{
        Annotation, Attribute, ClassDescriptor, ConstantValue, FieldDescriptor, InnerClass,
        MethodDescriptor, OuterClass,
    },
    producer::AttributeText,
    renderer::ClassRenderer,
    text::Fragment,
};

const ANNOTATIONS: [&str; 2] = ["RuntimeVisibleAnnotations", "RuntimeInvisibleAnnotations"];
const MARKERS: [&str; 3] = ["Signature", "Deprecated", "Synthetic"];

const CLASS_ATTRIBUTES: [&str; 5] = [
    "SourceFile",
    "SourceDebugExtension",
    "InnerClasses",
    "EnclosingMethod",
    "BootstrapMethods",
];
const FIELD_ATTRIBUTES: [&str; 1] = ["ConstantValue"];
const METHOD_ATTRIBUTES: [&str; 2] = ["Code", "Exceptions"];

#[derive(Debug, Clone, Default)]
pub struct DriveOptions {
    /// Leave out `SourceFile` and `SourceDebugExtension`.
    pub skip_debug: bool,
}

/// Renders `class` into `sink` and hands the sink back once it has been flushed.
pub fn render<W: Write>(class: &ClassFile, sink: W, options: &DriveOptions) -> Result<W> {
    let mut renderer = ClassRenderer::new(sink);
    drive(class, &mut renderer, options)?;

    Ok(renderer.into_inner())
}

/// Invokes every renderer step for `class`, ending the session.
pub fn drive<W: Write, A: AttributeText>(
    class: &ClassFile,
    renderer: &mut ClassRenderer<W, A>,
    options: &DriveOptions,
) -> Result<()> {
    let pool = &class.constant_pool;
    let name = class.name()?;
    debug!("driving renderer for {}", name);

    let super_name = match &class.super_class {
        Some(super_class) => Some(pool.class_name(super_class)?),
        None => None,
    };

    let interfaces = class
        .interfaces
        .iter()
        .map(|i| pool.class_name(i))
        .collect::<Result<Vec<_>>>()?;

    renderer.visit(&ClassDescriptor {
        version: class.meta_data.packed(),
        access: marked_flags(class.access_flags, &class.attributes, pool)?,
        name: name.clone(),
        signature: signature(&class.attributes, pool)?,
        super_name,
        interfaces,
    })?;

    if options.skip_debug {
        debug!("skipping debug information");
    } else {
        let file = match class.attributes.find::<SourceFileAttribute>(pool)? {
            Some(attr) => Some(pool.utf8(&attr.source_file)?),
            None => None,
        };
        let debug = class
            .attributes
            .find::<SourceDebugExtensionAttribute>(pool)?
            .map(|attr| attr.debug);

        if file.is_some() || debug.is_some() {
            renderer.visit_source(file.as_deref(), debug.as_deref())?;
        }
    }

    if let Some(enclosing) = class.attributes.find::<EnclosingMethodAttribute>(pool)? {
        let (method_name, descriptor) = match &enclosing.method {
            Some(method) => {
                let method = method.try_resolve(pool)?;
                (Some(pool.utf8(&method.name)?), Some(pool.utf8(&method.descriptor)?))
            }
            None => (None, None),
        };

        renderer.visit_outer_class(&OuterClass {
            owner: pool.class_name(&enclosing.class)?,
            name: method_name,
            descriptor,
        })?;
    }

    for annotation in annotations(&class.attributes, pool)? {
        renderer.visit_annotation(&annotation)?;
    }

    for name in others(&class.attributes, pool, &CLASS_ATTRIBUTES)? {
        renderer.visit_attribute(&Attribute { name })?;
    }

    if let Some(inner_classes) = class.attributes.find::<InnerClassesAttribute>(pool)? {
        for inner in inner_classes.classes {
            let outer_name = match &inner.outer_class {
                Some(outer) => Some(pool.class_name(outer)?),
                None => None,
            };
            let inner_name = match &inner.inner_name {
                Some(inner_name) => Some(pool.utf8(inner_name)?),
                None => None,
            };

            renderer.visit_inner_class(&InnerClass {
                name: pool.class_name(&inner.inner_class)?,
                outer_name,
                inner_name,
                access: inner.flags,
            })?;
        }
    }

    for field in class.fields.iter() {
        let field_name = pool.utf8(&field.name)?;
        let descriptor = pool.utf8(&field.descriptor)?;

        let value = match field.attributes.find::<ConstantValueAttribute>(pool)? {
            Some(attr) => constant_value(&attr, pool)
                .with_context(|| format!("bad constant value for field {}", field_name))?,
            None => None,
        };

        let mut member = renderer.visit_field(&FieldDescriptor {
            access: marked_flags(field.flags, &field.attributes, pool)?,
            name: field_name,
            descriptor,
            signature: signature(&field.attributes, pool)?,
            value,
        })?;

        for fragment in body(&field.attributes, pool, renderer.producer(), &FIELD_ATTRIBUTES)? {
            member.body(fragment);
        }

        renderer.embed(member.finish())?;
    }

    for method in class.methods.iter() {
        let method_name = pool.utf8(&method.name)?;
        let descriptor = pool.utf8(&method.descriptor)?;

        let exceptions = match method.attributes.find::<ExceptionsAttribute>(pool)? {
            Some(attr) => attr
                .exceptions
                .iter()
                .map(|e| pool.class_name(e))
                .collect::<Result<Vec<_>>>()?,
            None => vec![],
        };

        let mut member = renderer.visit_method(&MethodDescriptor {
            access: marked_flags(method.flags, &method.attributes, pool)?,
            name: method_name,
            descriptor,
            signature: signature(&method.attributes, pool)?,
            exceptions,
        })?;

        for fragment in body(&method.attributes, pool, renderer.producer(), &METHOD_ATTRIBUTES)? {
            member.body(fragment);
        }

        if let Some(code) = method.attributes.find::<CodeAttribute>(pool)? {
            member.body(code_summary(code.max_stack, code.max_locals));
        }

        renderer.embed(member.finish())?;
    }

    renderer.visit_end()?;
    Ok(())
}

/// The declared flags plus the bits carried by the `Deprecated` and `Synthetic` attributes.
fn marked_flags(flags: AccessFlags, attributes: &Attributes, pool: &ConstantPool) -> Result<AccessFlags> {
    let mut flags = flags;
    if attributes.has(pool, "Deprecated")? {
        flags |= AccessFlags::DEPRECATED;
    }
    if attributes.has(pool, "Synthetic")? {
        flags |= AccessFlags::SYNTHETIC;
    }

    Ok(flags)
}

fn signature(attributes: &Attributes, pool: &ConstantPool) -> Result<Option<String>> {
    match attributes.find::<SignatureAttribute>(pool)? {
        Some(attr) => Ok(Some(pool.utf8(&attr.signature)?)),
        None => Ok(None),
    }
}

/// Visible annotations first, then invisible ones, each in class file order.
fn annotations(attributes: &Attributes, pool: &ConstantPool) -> Result<Vec<Annotation>> {
    let mut out = vec![];
    if let Some(attr) = attributes.find::<VisibleAnnotationsAttribute>(pool)? {
        for annotation in attr.annotations {
            out.push(Annotation {
                descriptor: pool.utf8(&annotation.type_descriptor)?,
                visible: true,
            });
        }
    }

    if let Some(attr) = attributes.find::<InvisibleAnnotationsAttribute>(pool)? {
        for annotation in attr.annotations {
            out.push(Annotation {
                descriptor: pool.utf8(&annotation.type_descriptor)?,
                visible: false,
            });
        }
    }

    Ok(out)
}

/// Attributes with no dedicated rendering, skipping the ones every declaration handles.
fn others(attributes: &Attributes, pool: &ConstantPool, known: &[&str]) -> Result<Vec<String>> {
    let known = known
        .iter()
        .chain(ANNOTATIONS.iter())
        .chain(MARKERS.iter())
        .copied()
        .collect::<Vec<_>>();

    attributes.others(pool, &known)
}

/// Member body text: annotations, then unknown attributes, through the renderer's producer.
fn body<A: AttributeText>(
    attributes: &Attributes,
    pool: &ConstantPool,
    producer: &A,
    known: &[&str],
) -> Result<Vec<Fragment>> {
    let mut out = vec![];
    for annotation in annotations(attributes, pool)? {
        out.push(producer.annotation(&annotation));
    }

    for name in others(attributes, pool, known)? {
        out.push(producer.attribute(&Attribute { name }));
    }

    Ok(out)
}

fn constant_value(attr: &ConstantValueAttribute, pool: &ConstantPool) -> Result<Option<ConstantValue>> {
    let value = match attr.value.try_resolve(pool)? {
        ConstantEntry::Integer(v) => ConstantValue::Int(*v),
        ConstantEntry::Long(v) => ConstantValue::Long(*v),
        ConstantEntry::Float(v) => ConstantValue::Float(*v),
        ConstantEntry::Double(v) => ConstantValue::Double(*v),
        ConstantEntry::String(s) => ConstantValue::String(pool.utf8(&s.string)?),
        other => {
            warn!("skipping constant value of unexpected type {:?}", other);
            return Ok(None);
        }
    };

    Ok(Some(value))
}
