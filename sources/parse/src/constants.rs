pub const MAGIC: u32 = 0xCAFEBABE;

/// Internal name of the implicit superclass, `extends` clauses naming it are not rendered.
pub const ROOT_CLASS: &str = "java/lang/Object";
