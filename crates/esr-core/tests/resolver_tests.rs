use esr_core::loader::{default_loaders, resolve_loaders, supports, Loader, LoaderTable};
use esr_core::manifest::resolve_externals;
use esr_test_helpers::ProjectFixture;
use std::path::Path;

#[test]
fn test_externals_are_exactly_manifest_dependencies() {
    let project = ProjectFixture::with_manifest(
        r#"{"dependencies":{"a":"1.0"},"devDependencies":{"b":"2.0"}}"#,
    );

    let externals = resolve_externals(Some(project.path())).unwrap();

    let mut names: Vec<_> = externals.into_iter().collect();
    names.sort();
    assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
}

#[test]
fn test_no_explicit_dir_and_no_manifest_is_empty() {
    // Tests run from the crate directory, which has no package.json.
    assert!(!Path::new("package.json").exists());

    let externals = resolve_externals(None).unwrap();

    assert!(externals.is_empty());
}

#[test]
fn test_explicit_dir_without_manifest_fails() {
    let project = ProjectFixture::new();

    let err = resolve_externals(Some(project.path())).unwrap_err();

    assert!(err.is_configuration_error());
}

#[test]
fn test_override_precedence() {
    let mut overrides = LoaderTable::new();
    overrides.insert(".ts".to_string(), Loader::Tsx);

    let table = resolve_loaders(&overrides);

    assert_eq!(table.get(".ts"), Some(&Loader::Tsx));
    for (ext, loader) in default_loaders() {
        if ext != ".ts" {
            assert_eq!(table.get(&ext), Some(&loader));
        }
    }
}

#[test]
fn test_supports_project_files_only() {
    let project = ProjectFixture::new();
    let source = project.write("src/index.ts", "export {}");
    let vendored = project.write("node_modules/pkg/index.ts", "export {}");

    assert!(supports(&source));
    assert!(!supports(&vendored));
}
