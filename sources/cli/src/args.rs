use clap::Parser;

pub const USAGE: &str = "Prints a disassembled view of the given class.
Usage: cli [--debug] <fully qualified class name or class file name>";

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// The class to print, either a fully qualified name or a path to a .class file
    pub class: String,

    #[arg(long)]
    /// Whether to print debug information (source file and debug extension)
    pub debug: bool,

    #[arg(long("cp"))]
    /// A list of paths to add to the classpath
    pub classpath: Vec<String>,

    #[arg(short, long)]
    /// Emit trace level logs to stderr
    pub verbose: bool,
}
