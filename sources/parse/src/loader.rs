use std::{fs, path::PathBuf};

use anyhow::{anyhow, Context, Result};
use tracing::debug;

use crate::{classfile::ClassFile, parser::Parser};

/// Finds class files either by path or by name against a list of classpath roots.
#[derive(Debug, Default)]
pub struct ClassLocator {
    class_path: Vec<PathBuf>,
}

impl ClassLocator {
    pub fn new() -> Self {
        Self { class_path: vec![] }
    }

    pub fn add_path(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.class_path.push(path.into());
        self
    }

    /// `identifier` is a path when it ends in `.class`, otherwise a fully qualified class name
    /// in either `java.lang.String` or `java/lang/String` form.
    pub fn for_identifier(&self, identifier: &str) -> Result<ClassFile> {
        let bytes = if identifier.ends_with(".class") {
            debug!("Reading class file {}", identifier);
            fs::read(identifier).with_context(|| format!("could not read {}", identifier))?
        } else {
            self.for_name(identifier)?
        };

        Parser::new(&bytes)
            .parse()
            .with_context(|| format!("could not parse {}", identifier))
    }

    fn for_name(&self, name: &str) -> Result<Vec<u8>> {
        let formatted_name = format!("{}.class", name.replace('.', "/"));
        debug!("Resolving {} ({})", name, formatted_name);

        let path = self
            .resolve_name(&formatted_name)
            .ok_or(anyhow!("Could not locate classfile {}", formatted_name))?;

        fs::read(&path).with_context(|| format!("could not read {}", path.display()))
    }

    fn resolve_name(&self, name: &str) -> Option<PathBuf> {
        self.class_path
            .iter()
            .map(|root| root.join(name))
            .find(|path| path.exists())
    }
}
