mod common;

use anyhow::Result;
use common::{
    bin::{exec_integration, exec_raw, input},
    Attr, ClassBuilder, ACC_PUBLIC, ACC_STATIC,
};

const USAGE: &str = "Prints a disassembled view of the given class.
Usage: cli [--debug] <fully qualified class name or class file name>
";

fn stdout(assert: assert_cmd::assert::Assert) -> Result<String> {
    Ok(String::from_utf8(assert.get_output().stdout.clone())?)
}

fn sample(name: &str) -> ClassBuilder {
    ClassBuilder::new(name)
        .attribute_of(Attr::SourceFile("Sample.java"))
        .method(
            ACC_PUBLIC | ACC_STATIC,
            "main",
            "([Ljava/lang/String;)V",
            &[Attr::Code { max_stack: 0, max_locals: 1 }],
        )
}

#[test]
fn it_prints_a_class_by_name() -> Result<()> {
    sample("cli/ByName").write();

    let out = stdout(exec_integration(input(), "cli.ByName").success())?;
    assert!(out.starts_with("// class version 52.0 (52)\n// access flags 33\npublic class cli/ByName {\n"));
    assert!(out.contains("  public static main([Ljava/lang/String;)V\n    MAXSTACK = 0\n    MAXLOCALS = 1\n"));
    assert!(!out.contains("compiled from"));
    assert!(out.ends_with("}\n"));
    Ok(())
}

#[test]
fn it_accepts_slashed_names() -> Result<()> {
    sample("cli/Slashed").write();

    let out = stdout(exec_integration(input(), "cli/Slashed").success())?;
    assert!(out.contains("public class cli/Slashed {\n"));
    Ok(())
}

#[test]
fn it_prints_debug_information_when_asked() -> Result<()> {
    sample("cli/WithDebug").write();

    let out = stdout(exec_integration(input().with_debug(), "cli.WithDebug").success())?;
    assert!(out.contains("public class cli/WithDebug {\n\n  // compiled from: Sample.java\n"));
    Ok(())
}

#[test]
fn it_logs_to_stderr_when_verbose() -> Result<()> {
    sample("cli/Verbose").write();

    let quiet = stdout(exec_integration(input(), "cli.Verbose").success())?;
    let assert = exec_integration(input().arg("--verbose"), "cli.Verbose").success();

    let stderr = String::from_utf8(assert.get_output().stderr.clone())?;
    assert!(stderr.contains("Printing cli.Verbose"));
    assert_eq!(stdout(assert)?, quiet);
    Ok(())
}

#[test]
fn it_prints_a_class_file_by_path() -> Result<()> {
    let path = sample("cli/ByPath").write();
    let path = path.to_string_lossy().to_string();

    let out = stdout(exec_raw(&[path.as_str()]).success())?;
    assert!(out.contains("public class cli/ByPath {\n"));
    Ok(())
}

#[test]
fn it_prints_usage_without_a_class() {
    exec_raw(&[]).code(1).stdout("").stderr(USAGE);
}

#[test]
fn it_prints_usage_for_unknown_options() {
    exec_raw(&["--bogus", "cli.Anything"]).code(1).stderr(USAGE);
}

#[test]
fn it_fails_for_a_missing_class() -> Result<()> {
    let out = stdout(exec_integration(input(), "cli.DoesNotExist").code(1))?;
    assert!(out.is_empty());
    Ok(())
}

#[test]
fn it_fails_for_a_malformed_signature() -> Result<()> {
    sample("cli/Broken")
        .attribute_of(Attr::Signature("Ljava/lang/Object"))
        .write();

    let out = stdout(exec_integration(input(), "cli.Broken").code(1))?;
    assert!(out.is_empty());
    Ok(())
}
