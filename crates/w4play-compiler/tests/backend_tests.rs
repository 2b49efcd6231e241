//! Integration tests for the toolchain adapters, using shell scripts that
//! mimic the `asc` and `rolandc` command lines.
#![cfg(unix)]

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use w4play_compiler::{
    AscOptions, AssemblyScript, Backend, BackendError, Compilation, Roland, RolandOptions,
};

const FAKE_ASC: &str = r#"
out=""
wat=""
while [ "$#" -gt 0 ]; do
  case "$1" in
    --outFile) out="$2"; shift ;;
    --textFile) wat="$2"; shift ;;
  esac
  shift
done
test -f wasm4.ts || { echo "missing support header" >&2; exit 3; }
if grep -q "hello world" main.ts; then
  echo "ERROR TS1005: ';' expected." >&2
  echo "FAILURE 1 parse error(s)" >&2
  exit 1
fi
if grep -q "silent failure" main.ts; then exit 1; fi
if grep -q "empty module" main.ts; then
  : > "$out"
  exit 0
fi
printf '\000asm\001\000\000\000' > "$out"
if grep -q "no disassembly" main.ts; then exit 0; fi
if [ -n "$wat" ]; then echo "(module)" > "$wat"; fi
"#;

const FAKE_ROLANDC: &str = r#"
if [ "$1" = "--version" ]; then
  echo probe >> "@COUNTER@"
  echo "rolandc 0.1.0"
  exit 0
fi
src="$3"
if grep -q "hello world" "$src"; then
  echo "Syntax error: unexpected identifier 'world'" >&2
  exit 1
fi
if grep -q "empty module" "$src"; then
  : > "${src%.rol}.wasm"
  exit 0
fi
printf '\000asm\001\000\000\000' > "${src%.rol}.wasm"
"#;

const BROKEN_ROLANDC: &str = r#"
echo probe >> "@COUNTER@"
echo "rolandc: missing standard library" >&2
exit 127
"#;

const VALID_MODULE: &[u8] = b"\0asm\x01\0\0\0";

/// Write `body` as a script and return the command line that runs it.
fn script(dir: &TempDir, name: &str, body: &str) -> String {
    let path = dir.path().join(name);
    let body = body.replace("@COUNTER@", &counter_path(dir).display().to_string());
    std::fs::write(&path, body).expect("failed to write script");
    format!("sh {}", path.display())
}

fn counter_path(dir: &TempDir) -> PathBuf {
    dir.path().join("probes")
}

fn probe_count(path: &Path) -> usize {
    std::fs::read_to_string(path)
        .map(|s| s.lines().count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_asc_success_with_text() {
    let dir = TempDir::new().unwrap();
    let asc = AssemblyScript::new(AscOptions::new().command_line(&script(&dir, "asc", FAKE_ASC)));

    let result = asc.compile("export function update(): void {}").await.unwrap();
    let artifact = result.artifact().expect("expected an artifact");
    assert_eq!(artifact.module, VALID_MODULE);
    assert_eq!(artifact.text.as_deref(), Some("(module)\n"));
}

#[tokio::test]
async fn test_asc_success_without_text() {
    let dir = TempDir::new().unwrap();
    let options = AscOptions::new()
        .command_line(&script(&dir, "asc", FAKE_ASC))
        .emit_text(false);
    let asc = AssemblyScript::new(options);

    let result = asc.compile("export function update(): void {}").await.unwrap();
    let artifact = result.artifact().expect("expected an artifact");
    assert!(!artifact.module.is_empty());
    assert_eq!(artifact.text, None);
}

#[tokio::test]
async fn test_asc_rejection_is_a_diagnostic() {
    let dir = TempDir::new().unwrap();
    let asc = AssemblyScript::new(AscOptions::new().command_line(&script(&dir, "asc", FAKE_ASC)));

    let result = asc.compile("hello world").await.unwrap();
    assert!(!result.is_artifact());
    let diagnostic = result.diagnostic().expect("expected a diagnostic");
    assert!(diagnostic.message().starts_with("FAILURE 1 parse error(s): "));
    assert!(diagnostic.message().contains("ERROR TS1005: ';' expected."));
}

#[tokio::test]
async fn test_asc_silent_rejection_reports_exit_status() {
    let dir = TempDir::new().unwrap();
    let asc = AssemblyScript::new(AscOptions::new().command_line(&script(&dir, "asc", FAKE_ASC)));

    let result = asc.compile("// silent failure").await.unwrap();
    let diagnostic = result.diagnostic().expect("expected a diagnostic");
    assert!(diagnostic.message().starts_with("compiler exited with"));
    assert!(!diagnostic.message().ends_with(": "));
}

#[tokio::test]
async fn test_asc_empty_module_is_a_diagnostic() {
    let dir = TempDir::new().unwrap();
    let asc = AssemblyScript::new(AscOptions::new().command_line(&script(&dir, "asc", FAKE_ASC)));

    let result = asc.compile("// empty module").await.unwrap();
    assert!(!result.is_artifact());
    assert!(matches!(result, Compilation::Diagnostic(_)));
}

#[tokio::test]
async fn test_asc_missing_text_output_keeps_module() {
    let dir = TempDir::new().unwrap();
    let asc = AssemblyScript::new(AscOptions::new().command_line(&script(&dir, "asc", FAKE_ASC)));

    let result = asc.compile("// no disassembly").await.unwrap();
    let artifact = result.artifact().expect("expected an artifact");
    assert_eq!(artifact.module, VALID_MODULE);
    assert_eq!(artifact.text, None);
}

#[tokio::test]
async fn test_asc_missing_program() {
    let asc = AssemblyScript::new(AscOptions::new().program("/nonexistent/w4play/asc"));
    let err = asc.compile("export function update(): void {}").await.unwrap_err();
    assert!(matches!(err, BackendError::Launch { .. }));
    assert!(err.to_string().contains("/nonexistent/w4play/asc"));
}

#[tokio::test]
async fn test_roland_success_has_no_text() {
    let dir = TempDir::new().unwrap();
    let roland = Roland::new(RolandOptions::new().command_line(&script(&dir, "rolandc", FAKE_ROLANDC)));

    let result = roland.compile("proc update() {}").await.unwrap();
    match result {
        Compilation::Artifact(artifact) => {
            assert_eq!(artifact.module, VALID_MODULE);
            assert_eq!(artifact.text, None);
        }
        Compilation::Diagnostic(d) => panic!("unexpected diagnostic: {}", d),
    }
    assert_eq!(roland.version(), Some("rolandc 0.1.0"));
}

#[tokio::test]
async fn test_roland_rejection_embeds_error() {
    let dir = TempDir::new().unwrap();
    let roland = Roland::new(RolandOptions::new().command_line(&script(&dir, "rolandc", FAKE_ROLANDC)));

    let result = roland.compile("hello world").await.unwrap();
    let diagnostic = result.diagnostic().expect("expected a diagnostic");
    assert_eq!(
        diagnostic.message(),
        "Error compiling roland: 'Syntax error: unexpected identifier 'world''"
    );
}

#[tokio::test]
async fn test_roland_empty_module_is_a_diagnostic() {
    let dir = TempDir::new().unwrap();
    let roland = Roland::new(RolandOptions::new().command_line(&script(&dir, "rolandc", FAKE_ROLANDC)));

    let result = roland.compile("// empty module").await.unwrap();
    assert!(!result.is_artifact());
    match result {
        Compilation::Diagnostic(d) => assert!(d.message().starts_with("Error compiling roland: ")),
        Compilation::Artifact(_) => panic!("empty module accepted as an artifact"),
    }
}

#[tokio::test]
async fn test_roland_initializes_once() {
    let dir = TempDir::new().unwrap();
    let roland = Roland::new(RolandOptions::new().command_line(&script(&dir, "rolandc", FAKE_ROLANDC)));

    roland.compile("proc update() {}").await.unwrap();
    roland.compile("hello world").await.unwrap();
    roland.compile("proc update() {}").await.unwrap();
    assert_eq!(probe_count(&counter_path(&dir)), 1);
}

#[tokio::test]
async fn test_roland_failed_initialization_is_retried() {
    let dir = TempDir::new().unwrap();
    let roland = Roland::new(RolandOptions::new().command_line(&script(&dir, "rolandc", BROKEN_ROLANDC)));

    let err = roland.compile("proc update() {}").await.unwrap_err();
    match &err {
        BackendError::Initialization { reason, .. } => {
            assert_eq!(reason, "rolandc: missing standard library");
        }
        other => panic!("expected initialization failure, got {:?}", other),
    }
    assert!(roland.version().is_none());

    assert!(roland.compile("proc update() {}").await.is_err());
    assert_eq!(probe_count(&counter_path(&dir)), 2);
}
