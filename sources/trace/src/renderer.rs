use std::io::Write;

use parse::constants::ROOT_CLASS;
use support::{
    flags::{write_keywords, AccessFlags, DeclarationKind},
    signature::decode_class,
};
use tracing::{debug, trace};

use crate::{
    error::{RenderError, State, Step},
    member::{FieldRenderer, MethodRenderer},
    model::{Annotation, Attribute, ClassDescriptor, FieldDescriptor, InnerClass, MethodDescriptor, OuterClass},
    producer::{AttributeText, DefaultAttributeText},
    text::{Fragment, TextBuffer, TAB},
};

/// Renders one class from an ordered stream of callbacks and writes it to `sink` once the
/// stream ends.
///
/// Callbacks must arrive as `visit`, `visit_source`?, `visit_outer_class`?, then annotations,
/// attributes, inner classes, fields and methods in any order, then `visit_end`. Fields and
/// methods are two-phase: `visit_field` / `visit_method` return a member renderer, and its
/// finished fragment goes back through [`ClassRenderer::embed`] before any other callback.
///
/// A renderer is one session with a single owner. Any error aborts the session.
pub struct ClassRenderer<W, A = DefaultAttributeText> {
    sink: W,
    producer: A,
    text: TextBuffer,
    state: State,
}

impl<W: Write> ClassRenderer<W> {
    pub fn new(sink: W) -> Self {
        Self::with_producer(sink, DefaultAttributeText)
    }
}

impl<W: Write, A: AttributeText> ClassRenderer<W, A> {
    pub fn with_producer(sink: W, producer: A) -> Self {
        Self {
            sink,
            producer,
            text: TextBuffer::new(),
            state: State::Started,
        }
    }

    pub fn state(&self) -> State {
        self.state
    }

    pub fn producer(&self) -> &A {
        &self.producer
    }

    /// Fragments committed so far, the closing brace included once the session ended.
    pub fn fragment_count(&self) -> usize {
        self.text.len()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }

    fn transition(&self, step: Step) -> Result<State, RenderError> {
        use State::*;

        let next = match (step, self.state) {
            (Step::Header, Started) => HeaderEmitted,
            (Step::Source, HeaderEmitted) => SourceEmitted,
            (Step::OuterClass, HeaderEmitted | SourceEmitted) => OuterClassEmitted,
            (
                Step::Annotation | Step::Attribute | Step::InnerClass,
                HeaderEmitted | SourceEmitted | OuterClassEmitted | Body,
            ) => Body,
            (Step::Field | Step::Method, HeaderEmitted | SourceEmitted | OuterClassEmitted | Body) => {
                MemberOpen
            }
            (Step::Embed, MemberOpen) => Body,
            (Step::End, HeaderEmitted | SourceEmitted | OuterClassEmitted | Body) => Ended,
            (step, state) => return Err(RenderError::OutOfOrderCallback { step, state }),
        };

        Ok(next)
    }

    /// Runs `render` for `step` if the step is allowed, and moves to the next state only when
    /// it succeeds.
    fn run<T>(
        &mut self,
        step: Step,
        render: impl FnOnce(&mut Self) -> Result<T, RenderError>,
    ) -> Result<T, RenderError> {
        let result = self.transition(step).and_then(|next| {
            let value = render(self)?;
            Ok((next, value))
        });

        match result {
            Ok((next, value)) => {
                debug!("{} ({:?} -> {:?})", step, self.state, next);
                self.state = next;
                Ok(value)
            }
            Err(err) => {
                debug!("{} failed, aborting session: {}", step, err);
                self.state = State::Aborted;
                Err(err)
            }
        }
    }

    pub fn visit(&mut self, class: &ClassDescriptor) -> Result<(), RenderError> {
        self.run(Step::Header, |this| {
            let is_interface = class.access.has(AccessFlags::INTERFACE);
            let declaration = match &class.signature {
                Some(signature) => decode_class(signature, is_interface)?.declaration,
                None => {
                    let mut declaration = String::new();
                    if let Some(super_name) = class.super_name.as_deref().filter(|s| *s != ROOT_CLASS) {
                        declaration.push_str(" extends ");
                        declaration.push_str(super_name);
                    }

                    if !class.interfaces.is_empty() {
                        declaration.push_str(if is_interface { " extends " } else { " implements " });
                        declaration.push_str(&class.interfaces.join(", "));
                    }
                    declaration
                }
            };

            let buf = this.text.scratch();
            buf.push_str(&format!(
                "// class version {}.{} ({})\n",
                class.major(),
                class.minor(),
                class.version
            ));
            if class.access.has(AccessFlags::DEPRECATED) {
                buf.push_str("// DEPRECATED\n");
            }
            buf.push_str(&format!("// access flags {}\n", class.access.bits()));
            if let Some(signature) = &class.signature {
                buf.push_str(&format!("// signature {signature}\n"));
            }

            write_keywords(buf, class.access.difference(AccessFlags::SUPER), DeclarationKind::Class);

            let kind = if class.access.has(AccessFlags::ANNOTATION) {
                "@interface"
            } else if class.access.has(AccessFlags::INTERFACE) {
                "interface"
            } else if class.access.has(AccessFlags::ENUM) {
                "enum"
            } else {
                "class"
            };

            buf.push_str(kind);
            buf.push(' ');
            buf.push_str(&class.name);
            buf.push_str(&declaration);
            buf.push_str(" {\n\n");

            this.text.commit();
            Ok(())
        })
    }

    /// Commits an empty fragment when both are absent, so every callback owns one fragment.
    pub fn visit_source(&mut self, file: Option<&str>, debug: Option<&str>) -> Result<(), RenderError> {
        self.run(Step::Source, |this| {
            let buf = this.text.scratch();
            if let Some(file) = file {
                buf.push_str(&format!("{TAB}// compiled from: {file}\n"));
            }
            if let Some(debug) = debug {
                buf.push_str(&format!("{TAB}// debug info: {debug}\n"));
            }

            this.text.commit();
            Ok(())
        })
    }

    pub fn visit_outer_class(&mut self, outer: &OuterClass) -> Result<(), RenderError> {
        self.run(Step::OuterClass, |this| {
            let buf = this.text.scratch();
            buf.push_str(TAB);
            buf.push_str("OUTERCLASS ");
            buf.push_str(&outer.owner);
            for part in [&outer.name, &outer.descriptor].into_iter().flatten() {
                buf.push(' ');
                buf.push_str(part);
            }
            buf.push('\n');

            this.text.commit();
            Ok(())
        })
    }

    pub fn visit_annotation(&mut self, annotation: &Annotation) -> Result<(), RenderError> {
        self.run(Step::Annotation, |this| {
            let mut fragment = Fragment::from_text("\n");
            fragment.append(this.producer.annotation(annotation));
            this.text.push(fragment);
            Ok(())
        })
    }

    pub fn visit_attribute(&mut self, attribute: &Attribute) -> Result<(), RenderError> {
        self.run(Step::Attribute, |this| {
            let mut fragment = Fragment::from_text("\n");
            fragment.append(this.producer.attribute(attribute));
            this.text.push(fragment);
            Ok(())
        })
    }

    pub fn visit_inner_class(&mut self, inner: &InnerClass) -> Result<(), RenderError> {
        self.run(Step::InnerClass, |this| {
            let buf = this.text.scratch();
            buf.push_str(&format!(
                "{TAB}INNERCLASS {} {} {} {}",
                inner.name,
                inner.outer_name.as_deref().unwrap_or("null"),
                inner.inner_name.as_deref().unwrap_or("null"),
                inner.access.difference(AccessFlags::SUPER).bits()
            ));
            if inner.access.has(AccessFlags::ENUM) {
                buf.push_str(" enum");
            }
            buf.push('\n');

            this.text.commit();
            Ok(())
        })
    }

    /// Renders the field header. Body fragments go into the returned renderer, and its
    /// [`FieldRenderer::finish`] output must be passed to [`ClassRenderer::embed`] next.
    pub fn visit_field(&mut self, field: &FieldDescriptor) -> Result<FieldRenderer, RenderError> {
        self.run(Step::Field, |_| FieldRenderer::new(field))
    }

    /// Like [`ClassRenderer::visit_field`], for methods.
    pub fn visit_method(&mut self, method: &MethodDescriptor) -> Result<MethodRenderer, RenderError> {
        self.run(Step::Method, |_| MethodRenderer::new(method))
    }

    pub fn embed(&mut self, member: Fragment) -> Result<(), RenderError> {
        self.run(Step::Embed, |this| {
            this.text.push(member);
            Ok(())
        })
    }

    /// Closes the class and flushes the whole rendering to the sink.
    pub fn visit_end(&mut self) -> Result<(), RenderError> {
        self.run(Step::End, |this| {
            this.text.push(Fragment::from_text("}\n"));
            Ok(())
        })?;

        self.flush()
    }

    /// Writes every fragment to the sink. Valid exactly once, after `visit_end`, which already
    /// calls it.
    pub fn flush(&mut self) -> Result<(), RenderError> {
        match self.state {
            State::Ended => {}
            State::Flushed => return Err(RenderError::AlreadyFinalized),
            state => return Err(RenderError::SessionNotFinalized(state)),
        }

        trace!("flushing {} fragments", self.text.len());
        if let Err(err) = self.text.write_to(&mut self.sink) {
            self.state = State::Aborted;
            return Err(err.into());
        }

        self.state = State::Flushed;
        Ok(())
    }
}
