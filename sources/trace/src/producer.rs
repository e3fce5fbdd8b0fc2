use crate::{
    model::{Annotation, Attribute},
    text::{Fragment, TAB},
};

/// Produces the text for annotations and attributes. The renderer only places the blank line
/// in front of what this returns.
pub trait AttributeText {
    fn annotation(&self, annotation: &Annotation) -> Fragment;
    fn attribute(&self, attribute: &Attribute) -> Fragment;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultAttributeText;

impl AttributeText for DefaultAttributeText {
    fn annotation(&self, annotation: &Annotation) -> Fragment {
        let mut text = format!("{TAB}@{}", annotation.descriptor);
        if !annotation.visible {
            text.push_str(" // invisible");
        }
        text.push('\n');

        Fragment::from_text(text)
    }

    fn attribute(&self, attribute: &Attribute) -> Fragment {
        Fragment::from_text(format!("{TAB}ATTRIBUTE {} : unknown\n", attribute.name))
    }
}
