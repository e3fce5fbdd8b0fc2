use std::fmt;

use support::signature::SignatureError;
use thiserror::Error;

/// The renderer callbacks, named for error messages and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Header,
    Source,
    OuterClass,
    Annotation,
    Attribute,
    InnerClass,
    Field,
    Method,
    Embed,
    End,
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::Header => "header",
            Step::Source => "source",
            Step::OuterClass => "outer class",
            Step::Annotation => "annotation",
            Step::Attribute => "attribute",
            Step::InnerClass => "inner class",
            Step::Field => "field",
            Step::Method => "method",
            Step::Embed => "member embed",
            Step::End => "end",
        };

        write!(f, "{name}")
    }
}

/// Where a session is in the callback grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    Started,
    HeaderEmitted,
    SourceEmitted,
    OuterClassEmitted,
    /// Annotations, attributes, inner classes and members, in any order.
    Body,
    /// A field or method renderer was handed out and has not been embedded yet.
    MemberOpen,
    Ended,
    Flushed,
    Aborted,
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("{step} callback is out of order (session is {state:?})")]
    OutOfOrderCallback { step: Step, state: State },

    #[error(transparent)]
    MalformedSignature(#[from] SignatureError),

    #[error("the session was already flushed")]
    AlreadyFinalized,

    #[error("the session has not ended (session is {0:?})")]
    SessionNotFinalized(State),

    #[error("could not write to the output sink")]
    Io(#[from] std::io::Error),
}
