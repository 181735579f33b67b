//! Integration tests for the template system.

use std::fs;

use packgen_templates::{
    placeholder, BindingSet, Escaper, TemplateError, TemplateLoader, TemplateRenderer,
    VariableResolver, VariableSchema, VariableSpec,
};
use tempfile::tempdir;

struct PythonLike;

impl Escaper for PythonLike {
    fn escape(&self, value: &str) -> String {
        value.replace('\\', "\\\\").replace('\'', "\\'")
    }

    fn quote(&self, value: &str) -> String {
        format!("'{}'", self.escape(value))
    }
}

const SETUP_PY: &str = r#"from distutils.core import setup

setup(name='%NAME%',
      version='%VERSION%',
      description='GRPC client for %NAME%',
      author='%AUTHOR%',
      packages=['%NAME%'],
      package_data={
          '%NAME%': [%INCLUDE%],
      },
      )
"#;

fn schema() -> VariableSchema {
    VariableSchema::new()
        .variable(VariableSpec::required("NAME"))
        .variable(VariableSpec::required("VERSION"))
        .variable(VariableSpec::new("AUTHOR").with_default("ci"))
        .variable(VariableSpec::new("INCLUDE").list().with_default("*.pyi, py.typed"))
}

#[test]
fn test_load_templates_from_directory() {
    let temp = tempdir().unwrap();
    let python = temp.path().join("python");
    fs::create_dir_all(&python).unwrap();
    fs::write(python.join("setup.py.tmpl"), SETUP_PY).unwrap();
    fs::write(python.join("notes.md"), "not a template").unwrap();

    let templates = TemplateLoader::new(temp.path()).load_all().unwrap();

    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].dialect(), "python");
    assert_eq!(templates[0].kind(), "setup.py");
    assert_eq!(
        templates[0].placeholders(),
        &["NAME", "VERSION", "AUTHOR", "INCLUDE"]
    );
}

#[test]
fn test_load_templates_with_descriptor() {
    let temp = tempdir().unwrap();
    let npm = temp.path().join("npm");
    fs::create_dir_all(&npm).unwrap();
    fs::write(npm.join("pkg.json"), r#"{"name": "%NAME%"}"#).unwrap();
    fs::write(
        npm.join("template.yaml"),
        r#"
templates:
  - kind: package.json
    file: pkg.json
    description: Minimal package manifest
"#,
    )
    .unwrap();

    let templates = TemplateLoader::new(temp.path()).load_all().unwrap();

    assert_eq!(templates.len(), 1);
    assert_eq!(templates[0].kind(), "package.json");
    assert_eq!(templates[0].description(), Some("Minimal package manifest"));
}

#[test]
fn test_descriptor_referencing_missing_file() {
    let temp = tempdir().unwrap();
    let cargo = temp.path().join("cargo");
    fs::create_dir_all(&cargo).unwrap();
    fs::write(
        cargo.join("template.yaml"),
        "templates:\n  - kind: Cargo.toml\n    file: missing.tmpl\n",
    )
    .unwrap();

    let result = TemplateLoader::new(temp.path()).load_all();
    assert!(matches!(result, Err(TemplateError::NotFound(_))));
}

#[test]
fn test_resolve_then_render_leaves_no_placeholders() {
    let temp = tempdir().unwrap();
    let python = temp.path().join("python");
    fs::create_dir_all(&python).unwrap();
    fs::write(python.join("setup.py.tmpl"), SETUP_PY).unwrap();
    let templates = TemplateLoader::new(temp.path()).load_all().unwrap();

    let schema = schema();
    let supplied = BindingSet::new().with("NAME", "billing").with("VERSION", "0.4.0");
    let bindings = VariableResolver::new(&schema).resolve(&supplied).unwrap();

    let rendered = TemplateRenderer::new(&PythonLike)
        .with_schema(&schema)
        .render(&templates[0], &bindings)
        .unwrap();

    assert!(!placeholder::contains_placeholder(&rendered));
    assert!(rendered.contains("setup(name='billing',"));
    assert!(rendered.contains("'billing': ['*.pyi', 'py.typed'],"));
    assert!(rendered.contains("author='ci',"));
}

#[test]
fn test_render_is_deterministic() {
    let schema = schema();
    let supplied = BindingSet::new().with("NAME", "billing").with("VERSION", "0.4.0");
    let bindings = VariableResolver::new(&schema).resolve(&supplied).unwrap();
    let renderer = TemplateRenderer::new(&PythonLike).with_schema(&schema);

    let first = renderer.render_content(SETUP_PY, &bindings).unwrap();
    let second = renderer.render_content(SETUP_PY, &bindings).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_quote_in_value_is_escaped() {
    let schema = schema();
    let supplied = BindingSet::new()
        .with("NAME", "billing")
        .with("VERSION", "0.4.0")
        .with("AUTHOR", "O'Brien");
    let bindings = VariableResolver::new(&schema).resolve(&supplied).unwrap();

    let rendered = TemplateRenderer::new(&PythonLike)
        .with_schema(&schema)
        .render_content(SETUP_PY, &bindings)
        .unwrap();

    assert!(rendered.contains(r"author='O\'Brien',"));
}
