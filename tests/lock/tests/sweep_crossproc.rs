//! Cross-process determinism of sweep bundles.
//!
//! Spawns the `sweep_fixture` binary under several environment variants and
//! asserts byte-identical stdout. Working directory, locale variables, log
//! verbosity and unrelated environment noise must not reach any digest.

use std::path::{Path, PathBuf};
use std::process::Command;

fn workspace_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent()
        .and_then(Path::parent)
        .expect("workspace root exists")
        .to_path_buf()
}

/// The fixture binary lives next to the test binary's `deps/` directory.
fn binary_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .expect("can resolve test binary path")
        .parent()
        .expect("binary dir exists")
        .parent()
        .expect("deps parent exists")
        .to_path_buf();
    path.push(format!("sweep_fixture{}", std::env::consts::EXE_SUFFIX));
    path
}

fn run_variant(work_dir: &Path, env_overrides: &[(&str, &str)]) -> String {
    let bin = binary_path();
    let mut command = Command::new(&bin);
    command
        .current_dir(work_dir)
        .env_remove("LC_ALL")
        .env_remove("LC_COLLATE")
        .env_remove("LANG")
        .env_remove("LANGUAGE")
        .env_remove("RUST_LOG");
    for &(key, value) in env_overrides {
        command.env(key, value);
    }

    let output = command.output().unwrap_or_else(|e| {
        panic!(
            "failed to spawn {} (work_dir={}, overrides={env_overrides:?}): {e}",
            bin.display(),
            work_dir.display()
        )
    });
    assert!(
        output.status.success(),
        "sweep_fixture exited with {}: stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).expect("stdout is valid UTF-8")
}

#[test]
fn crossproc_output_identical_across_env_variants() {
    let root = workspace_root();
    let baseline = run_variant(&root, &[]);

    assert!(baseline.contains("serial.bundle_digest=sha256:"), "{baseline}");
    assert!(baseline.contains("parallel.bundle_digest=sha256:"), "{baseline}");
    assert!(
        baseline.contains("serial.results=[3] [3,29] [3,29,5] [3,29,5,7] [10]"),
        "{baseline}"
    );
    assert!(
        baseline.contains("parallel.results=[3] [3,29] [3,29,5] [3,29,54] [10]"),
        "{baseline}"
    );
    assert!(baseline.contains("serial.candidates_evaluated=195"), "{baseline}");
    assert!(baseline.contains("parallel.candidates_evaluated=396"), "{baseline}");

    let alt_cwd = std::env::temp_dir();
    assert_eq!(baseline, run_variant(&alt_cwd, &[]), "cwd changed output");

    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "C"), ("LANG", "C")]),
        "LC_ALL=C changed output"
    );
    assert_eq!(
        baseline,
        run_variant(&root, &[("LC_ALL", "de_DE.UTF-8"), ("LANG", "tr_TR.UTF-8")]),
        "non-English locale changed output"
    );
    assert_eq!(
        baseline,
        run_variant(&root, &[("RUST_LOG", "trace")]),
        "trace logging changed stdout"
    );
    assert_eq!(
        baseline,
        run_variant(&root, &[("TROTT_NOISE", "1"), ("HOME", "/nonexistent")]),
        "unrelated env changed output"
    );
}

#[test]
fn crossproc_output_stable_across_repeated_spawns() {
    let root = workspace_root();
    let first = run_variant(&root, &[]);
    for _ in 0..3 {
        assert_eq!(first, run_variant(&root, &[]));
    }
}
