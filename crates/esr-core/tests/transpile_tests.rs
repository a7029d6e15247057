use esr_core::config::{EngineOverrides, TranspileMode, TranspileOverrides};
use esr_core::engine::{Format, Platform, SourceMapMode};
use esr_core::errors::{ConfigError, TranspileError};
use esr_core::loader::Loader;
use esr_test_helpers::fixtures::{
    touch_forward, tsx_component, typescript_entry, typescript_module, FIXTURE_NODE_VERSION,
};
use esr_test_helpers::{ProjectFixture, RecordingEngine};
use std::path::Path;

const MANIFEST: &str = r#"{"dependencies":{"a":"1.0"},"devDependencies":{"b":"2.0"}}"#;

fn overrides(mode: TranspileMode, project_dir: &Path) -> TranspileOverrides {
    TranspileOverrides {
        mode: Some(mode),
        project_dir: Some(project_dir.to_path_buf()),
        ..Default::default()
    }
}

// ============================================================================
// BUNDLE MODE
// ============================================================================

#[test]
fn test_bundle_mode_bypasses_cache() {
    let project = ProjectFixture::with_manifest(MANIFEST);
    let entry = project.write("src/index.ts", typescript_entry());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());
    let options = overrides(TranspileMode::Bundle, project.path());

    let first = transpiler
        .transpile(typescript_entry(), &entry, Some(&options))
        .unwrap();
    let second = transpiler
        .transpile(typescript_entry(), &entry, Some(&options))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(
        engine.bundle_count(),
        2,
        "Every bundle call reaches the engine"
    );
    assert_eq!(engine.transform_count(), 0);
    assert_eq!(project.cache_entry_count(), 0, "Bundles are never cached");
}

#[test]
fn test_bundle_is_the_default_mode() {
    let project = ProjectFixture::with_manifest(MANIFEST);
    let entry = project.write("src/index.ts", typescript_entry());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());
    let options = TranspileOverrides {
        project_dir: Some(project.path().to_path_buf()),
        ..Default::default()
    };

    transpiler
        .transpile(typescript_entry(), &entry, Some(&options))
        .unwrap();

    assert_eq!(engine.bundle_count(), 1);
}

#[test]
fn test_bundle_request_configuration() {
    let project = ProjectFixture::with_manifest(MANIFEST);
    let entry = project.write("src/index.ts", typescript_entry());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());

    transpiler
        .transpile(
            typescript_entry(),
            &entry,
            Some(&overrides(TranspileMode::Bundle, project.path())),
        )
        .unwrap();

    let bundle = &engine.bundles()[0];
    assert_eq!(bundle.sourcefile, entry);
    assert_eq!(bundle.resolve_dir, project.path().join("src"));
    assert_eq!(bundle.loader, Loader::Ts);
    assert_eq!(bundle.loaders.get(".tsx"), Some(&Loader::Tsx));
    assert_eq!(bundle.platform, Platform::Node);
    assert_eq!(bundle.common.format, Format::Cjs);
    assert_eq!(bundle.common.target, vec!["node20.11.1".to_string()]);
    assert_eq!(bundle.common.sourcemap, SourceMapMode::Inline);
    assert!(!bundle.common.minify);
}

#[test]
fn test_bundle_externals_from_manifest_then_caller() {
    let project = ProjectFixture::with_manifest(MANIFEST);
    let entry = project.write("src/index.ts", typescript_entry());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());

    let mut options = overrides(TranspileMode::Bundle, project.path());
    options.engine = EngineOverrides {
        external: vec!["left-pad".to_string()],
        ..Default::default()
    };

    transpiler
        .transpile(typescript_entry(), &entry, Some(&options))
        .unwrap();

    assert_eq!(
        engine.bundles()[0].external,
        vec!["a".to_string(), "b".to_string(), "left-pad".to_string()]
    );
}

#[test]
fn test_bundle_fragments_joined_in_order() {
    let project = ProjectFixture::with_manifest("{}");
    let entry = project.write("main.js", "console.log(1)");
    let engine = RecordingEngine::with_bundle_fragments(&["// one", "// two"]);
    let transpiler = project.transpiler(engine.clone());

    let code = transpiler
        .transpile(
            "console.log(1)",
            &entry,
            Some(&overrides(TranspileMode::Bundle, project.path())),
        )
        .unwrap();

    assert_eq!(code, "// one\nconsole.log(1)\n// two\nconsole.log(1)");
}

#[test]
fn test_engine_overrides_reach_bundle() {
    let project = ProjectFixture::with_manifest("{}");
    let entry = project.write("main.tsx", tsx_component());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());

    let mut options = overrides(TranspileMode::Bundle, project.path());
    options.engine.platform = Some(Platform::Neutral);
    options.engine.minify = Some(true);
    options.engine.jsx_factory = Some("h".to_string());

    transpiler
        .transpile(tsx_component(), &entry, Some(&options))
        .unwrap();

    let bundle = &engine.bundles()[0];
    assert_eq!(bundle.loader, Loader::Tsx);
    assert_eq!(bundle.platform, Platform::Neutral);
    assert!(bundle.common.minify);
    assert_eq!(bundle.common.jsx_factory.as_deref(), Some("h"));
}

// ============================================================================
// TRANSFORM MODE
// ============================================================================

#[test]
fn test_transform_mode_uses_cache() {
    let project = ProjectFixture::with_manifest(MANIFEST);
    let file = project.write("src/math.ts", typescript_module());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());
    let options = overrides(TranspileMode::Transform, project.path());

    let first = transpiler
        .transpile(typescript_module(), &file, Some(&options))
        .unwrap();
    let second = transpiler
        .transpile(typescript_module(), &file, Some(&options))
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(engine.transform_count(), 1);
    assert_eq!(engine.bundle_count(), 0);
    assert_eq!(project.cache_entry_count(), 1);
}

#[test]
fn test_transform_regenerates_after_source_change() {
    let project = ProjectFixture::with_manifest(MANIFEST);
    let file = project.write("src/math.ts", typescript_module());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());
    let options = overrides(TranspileMode::Transform, project.path());

    transpiler
        .transpile(typescript_module(), &file, Some(&options))
        .unwrap();

    let updated = "export const answer: number = 42";
    std::fs::write(&file, updated).unwrap();
    touch_forward(&file, 120);

    let code = transpiler
        .transpile(updated, &file, Some(&options))
        .unwrap();

    assert_eq!(engine.transform_count(), 2);
    assert!(code.contains("answer"));
    assert_eq!(project.cache_entry_count(), 1, "Stale entry is overwritten");
}

#[test]
fn test_clear_forces_regeneration() {
    let project = ProjectFixture::with_manifest(MANIFEST);
    let file = project.write("src/math.ts", typescript_module());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());
    let options = overrides(TranspileMode::Transform, project.path());

    transpiler
        .transpile(typescript_module(), &file, Some(&options))
        .unwrap();
    transpiler.cache().clear().unwrap();
    transpiler
        .transpile(typescript_module(), &file, Some(&options))
        .unwrap();

    assert_eq!(engine.transform_count(), 2);
}

#[test]
fn test_transform_uses_loader_override() {
    let project = ProjectFixture::with_manifest("{}");
    let file = project.write("component.js", "export default () => <div />");
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());

    let mut options = overrides(TranspileMode::Transform, project.path());
    options.engine.loader.insert(".js".to_string(), Loader::Jsx);

    let code = transpiler
        .transpile("export default () => <div />", &file, Some(&options))
        .unwrap();

    assert_eq!(engine.transforms()[0].loader, Loader::Jsx);
    assert!(code.starts_with("// jsx"));
}

#[test]
fn test_transform_common_options() {
    let project = ProjectFixture::with_manifest("{}");
    let file = project.write("a.ts", typescript_module());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());

    transpiler
        .transpile(
            typescript_module(),
            &file,
            Some(&overrides(TranspileMode::Transform, project.path())),
        )
        .unwrap();

    let transform = &engine.transforms()[0];
    assert_eq!(transform.sourcefile, file);
    assert_eq!(transform.loader, Loader::Ts);
    assert_eq!(transform.common.format, Format::Cjs);
    assert_eq!(transform.common.target, vec!["node20.11.1".to_string()]);
    assert_eq!(transform.common.sourcemap, SourceMapMode::Inline);
}

#[test]
fn test_transform_engine_error_is_not_cached() {
    let project = ProjectFixture::with_manifest("{}");
    let file = project.write("broken.ts", "const = ;");
    let engine =
        RecordingEngine::failing("broken.ts:1:6: ERROR: Expected identifier but found \"=\"");
    let transpiler = project.transpiler(engine.clone());
    let options = overrides(TranspileMode::Transform, project.path());

    let err = transpiler
        .transpile("const = ;", &file, Some(&options))
        .unwrap_err();

    assert!(matches!(err, TranspileError::Engine(_)));
    assert!(err.to_string().contains("Expected identifier"));
    assert_eq!(project.cache_entry_count(), 0);

    // The next attempt goes back to the engine.
    let _ = transpiler.transpile("const = ;", &file, Some(&options));
    assert_eq!(engine.transform_count(), 2);
}

#[test]
fn test_debug_trace_does_not_change_output() {
    let project = ProjectFixture::with_manifest("{}");
    let file = project.write("a.ts", typescript_module());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());

    let quiet = transpiler
        .transpile(
            typescript_module(),
            &file,
            Some(&overrides(TranspileMode::Bundle, project.path())),
        )
        .unwrap();

    let mut options = overrides(TranspileMode::Bundle, project.path());
    options.debug = Some(true);
    let traced = transpiler
        .transpile(typescript_module(), &file, Some(&options))
        .unwrap();

    assert_eq!(quiet, traced);
}

// ============================================================================
// CONFIGURATION ERRORS
// ============================================================================

#[test]
fn test_missing_manifest_in_explicit_dir_fails_before_engine() {
    let project = ProjectFixture::new();
    let file = project.write("a.ts", typescript_module());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());

    for mode in [TranspileMode::Bundle, TranspileMode::Transform] {
        let err = transpiler
            .transpile(
                typescript_module(),
                &file,
                Some(&overrides(mode, project.path())),
            )
            .unwrap_err();

        assert!(err.is_configuration_error());
        assert!(matches!(
            err,
            TranspileError::Config(ConfigError::ManifestNotFound { .. })
        ));
    }

    assert_eq!(engine.bundle_count(), 0);
    assert_eq!(engine.transform_count(), 0);
    assert_eq!(project.cache_entry_count(), 0);
}

#[test]
fn test_unknown_mode_is_configuration_error() {
    let err = "compile".parse::<TranspileMode>().unwrap_err();
    assert!(matches!(err, ConfigError::InvalidMode(ref mode) if mode == "compile"));

    let parsed: Result<TranspileOverrides, _> =
        serde_json::from_str(r#"{"mode":"compile","projectDir":"/tmp"}"#);
    assert!(parsed.is_err(), "Unknown modes never reach the dispatcher");
}

// ============================================================================
// RUNTIME IDENTITY
// ============================================================================

#[test]
fn test_runtime_identity_shared_by_cache_and_target() {
    let project = ProjectFixture::with_manifest("{}");
    let file = project.write("a.ts", typescript_module());
    let engine = RecordingEngine::new();
    let transpiler = project.transpiler(engine.clone());

    assert_eq!(transpiler.runtime().version(), FIXTURE_NODE_VERSION);
    assert_eq!(transpiler.cache().runtime_identity(), FIXTURE_NODE_VERSION);

    transpiler
        .transpile(
            typescript_module(),
            &file,
            Some(&overrides(TranspileMode::Transform, project.path())),
        )
        .unwrap();

    let transform = &engine.transforms()[0];
    assert_eq!(
        transform.common.target,
        vec![transpiler.runtime().target()]
    );
}
