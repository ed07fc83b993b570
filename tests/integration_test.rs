// Integration tests for pydoc-md

use assert_cmd::Command;
use predicates::prelude::*;
use pydoc_md::{Config, Error, Generator};
use serde_yaml::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn fixtures_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
}

/// Scratch directory holding a copy of the fixture manifest
fn workspace() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("mkdocs.yml");
    fs::copy(fixtures_path("mkdocs.yml"), &manifest).unwrap();
    (dir, manifest)
}

fn nav_titles(manifest: &Path) -> Vec<String> {
    let value: Value = serde_yaml::from_str(&fs::read_to_string(manifest).unwrap()).unwrap();
    value["nav"]
        .as_sequence()
        .expect("nav should be a sequence")
        .iter()
        .map(|entry| {
            let mapping = entry.as_mapping().unwrap();
            assert_eq!(mapping.len(), 1);
            mapping.keys().next().unwrap().as_str().unwrap().to_string()
        })
        .collect()
}

fn pydoc_md() -> Command {
    Command::cargo_bin("pydoc-md").unwrap()
}

// ============================================================================
// Library Tests
// ============================================================================

#[test]
fn test_generate_project() {
    let (dir, manifest) = workspace();
    let out = dir.path().join("docs");

    let generator = Generator::new(Config::default()).unwrap();
    let report = generator
        .run(&fixtures_path("project"), &out, &manifest)
        .expect("Generation failed");

    // __init__.py files are skipped
    assert_eq!(report.files, 3);
    assert_eq!(report.pages.len(), 3);
    assert_eq!(report.endpoint_pages.len(), 2);

    assert!(out.join("api.md").is_file());
    assert!(out.join("models.md").is_file());
    assert!(out.join("mailer.md").is_file());
    assert!(!out.join("__init__.md").exists());
}

#[test]
fn test_navigation_order_and_preserved_keys() {
    let (dir, manifest) = workspace();
    let generator = Generator::new(Config::default()).unwrap();
    generator
        .run(&fixtures_path("project"), &dir.path().join("docs"), &manifest)
        .unwrap();

    assert_eq!(
        nav_titles(&manifest),
        vec!["api", "api - Endpoints", "models", "mailer"]
    );

    let value: Value = serde_yaml::from_str(&fs::read_to_string(&manifest).unwrap()).unwrap();
    assert_eq!(value["site_name"], Value::String("Demo".to_string()));
    assert_eq!(value["theme"], Value::String("material".to_string()));

    let endpoints = value["nav"][1]["api - Endpoints"].as_sequence().unwrap();
    assert_eq!(endpoints.len(), 2);
    assert_eq!(
        endpoints[0]["users"],
        Value::String("api_endpoints/users.md".to_string())
    );
    assert_eq!(
        endpoints[1]["accounts"],
        Value::String("api_endpoints/accounts.md".to_string())
    );
}

#[test]
fn test_endpoint_pages() {
    let (dir, manifest) = workspace();
    let out = dir.path().join("docs");
    let generator = Generator::new(Config::default()).unwrap();
    generator.run(&fixtures_path("project"), &out, &manifest).unwrap();

    let users = fs::read_to_string(out.join("api_endpoints").join("users.md")).unwrap();
    assert_eq!(users.lines().next(), Some("# GET `/users/` "));
    assert!(users.contains("## `list_users(limit: int)`"));
    assert!(users.contains("| limit | int | Page size. Defaults to 10. | 10 |"));

    let accounts = fs::read_to_string(out.join("api_endpoints").join("accounts.md")).unwrap();
    assert!(accounts.starts_with("# POST `/accounts/` \n\n## `create_user(payload: dict)`"));
    assert!(accounts.contains("| payload | dict | User fields. | *is required* |"));

    // endpoints only appear on their own pages
    let page = fs::read_to_string(out.join("api.md")).unwrap();
    assert!(page.starts_with("## `health()`\nReport liveness.\n"));
    assert!(!page.contains("list_users"));
    assert!(!page.contains("create_user"));
}

#[test]
fn test_class_page() {
    let (dir, manifest) = workspace();
    let out = dir.path().join("docs");
    let generator = Generator::new(Config::default()).unwrap();
    generator.run(&fixtures_path("project"), &out, &manifest).unwrap();

    let page = fs::read_to_string(out.join("models.md")).unwrap();
    assert!(page.starts_with("# `class` User\nA registered user.\n"));
    assert!(page.contains("| `greet` | Greet another user. | `str` |"));
    assert!(page.contains("| `_secret` | None | `None` |"));
    assert!(!page.contains("| `__init__` |"));

    // described methods get a detail block, undocumented ones do not
    assert!(page.contains("## `__init__(name: str)`\nBuild a user."));
    assert!(page.contains("## `greet(other: User)`"));
    assert!(!page.contains("## `_secret"));

    // numpy docstring on the module-level function
    assert!(page.contains("## `make_user(name: str)`\nMake a user."));
}

#[test]
fn test_rest_docstring_page() {
    let (dir, manifest) = workspace();
    let out = dir.path().join("docs");
    let generator = Generator::new(Config::default()).unwrap();
    generator.run(&fixtures_path("project"), &out, &manifest).unwrap();

    let page = fs::read_to_string(out.join("mailer.md")).unwrap();
    assert!(page.starts_with("## `send(to: str, subject: str, body: str)`\nSend an email."));
    assert!(page.contains("| to | str | Recipient. | *is required* |"));
}

#[test]
fn test_custom_required_marker() {
    let (dir, manifest) = workspace();
    let out = dir.path().join("docs");
    let mut config = Config::default();
    config.render.required_marker = "required".to_string();

    let generator = Generator::new(config).unwrap();
    generator
        .run(&fixtures_path("project/services/mailer.py"), &out, &manifest)
        .unwrap();

    let page = fs::read_to_string(out.join("mailer.md")).unwrap();
    assert!(page.contains("| to | str | Recipient. | required |"));
    assert_eq!(nav_titles(&manifest), vec!["mailer"]);
}

#[test]
fn test_template_override() {
    let (dir, manifest) = workspace();
    let templates = dir.path().join("templates");
    fs::create_dir_all(&templates).unwrap();
    fs::write(
        templates.join("endpoint.md.tera"),
        "{{ verb }} {{ path }}\n\n{{ body }}",
    )
    .unwrap();

    let mut config = Config::default();
    config.render.templates_dir = Some(templates);
    let out = dir.path().join("docs");

    let generator = Generator::new(config).unwrap();
    generator
        .run(&fixtures_path("project/api.py"), &out, &manifest)
        .unwrap();

    let users = fs::read_to_string(out.join("api_endpoints").join("users.md")).unwrap();
    assert!(users.starts_with("GET /users\n\n## `list_users"));
}

#[test]
fn test_exclude_patterns() {
    let (dir, manifest) = workspace();
    let mut config = Config::default();
    config.source.exclude = vec!["services/**".to_string()];

    let generator = Generator::new(config).unwrap();
    let report = generator
        .run(&fixtures_path("project"), &dir.path().join("docs"), &manifest)
        .unwrap();

    assert_eq!(report.files, 2);
    assert_eq!(nav_titles(&manifest), vec!["api", "api - Endpoints", "models"]);
}

#[test]
fn test_missing_source() {
    let (dir, manifest) = workspace();
    let generator = Generator::new(Config::default()).unwrap();
    let result = generator.run(Path::new("/nonexistent/src"), &dir.path().join("docs"), &manifest);
    assert!(matches!(result, Err(Error::PathNotFound(_))));
}

// ============================================================================
// CLI Tests
// ============================================================================

#[test]
fn test_cli_usage_error() {
    let dir = TempDir::new().unwrap();
    pydoc_md()
        .current_dir(dir.path())
        .arg("src")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Hello this is the documentation tool!"))
        .stdout(predicate::str::contains("[error] Please provide relevant paths!"));

    // nothing was created
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn test_cli_no_arguments() {
    pydoc_md()
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Usage:"));
}

#[test]
fn test_cli_generates_docs() {
    let (dir, manifest) = workspace();
    let out = dir.path().join("docs");

    pydoc_md()
        .current_dir(dir.path())
        .arg(fixtures_path("project"))
        .arg(&out)
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("Extracting docs from "))
        .stdout(predicate::str::contains("api.py!"))
        .stdout(predicate::str::contains("... Wrote docs to models"));

    assert!(out.join("api_endpoints").join("users.md").is_file());
    assert_eq!(
        nav_titles(&manifest),
        vec!["api", "api - Endpoints", "models", "mailer"]
    );
}

#[test]
fn test_cli_reads_config_from_working_directory() {
    let (dir, manifest) = workspace();
    fs::write(
        dir.path().join("pydoc-md.toml"),
        "[source]\nexclude = [\"api.py\"]\n\n[run]\nparallel = true\n",
    )
    .unwrap();

    pydoc_md()
        .current_dir(dir.path())
        .arg(fixtures_path("project"))
        .arg("docs")
        .arg(&manifest)
        .assert()
        .success();

    assert!(!dir.path().join("docs").join("api.md").exists());
    assert_eq!(nav_titles(&manifest), vec!["models", "mailer"]);
}

#[test]
fn test_cli_invalid_config() {
    let (dir, manifest) = workspace();
    fs::write(dir.path().join("pydoc-md.toml"), "[run]\nlog_level = \"loud\"\n").unwrap();

    pydoc_md()
        .current_dir(dir.path())
        .arg(fixtures_path("project"))
        .arg("docs")
        .arg(&manifest)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Invalid configuration"));
}

#[test]
fn test_cli_syntax_error() {
    let (dir, manifest) = workspace();
    let src = dir.path().join("broken.py");
    fs::write(&src, "def broken(:\n    pass\n").unwrap();

    pydoc_md()
        .current_dir(dir.path())
        .arg(&src)
        .arg("docs")
        .arg(&manifest)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Error: Cannot parse"));

    // manifest untouched
    let contents = fs::read_to_string(&manifest).unwrap();
    assert!(contents.contains("Home: index.md"));
}

#[test]
fn test_manifest_tags_and_comments_survive() {
    let dir = TempDir::new().unwrap();
    let manifest = dir.path().join("mkdocs.yml");
    let tail = "\n# theme extras\nmarkdown_extensions:\n  - pymdownx.emoji:\n      emoji_index: !!python/name:material.extensions.emoji.twemoji\nextra:\n  key: !ENV [SITE_KEY, 'dev']  # from env\n";
    fs::write(
        &manifest,
        format!("site_name: Demo  # title\nnav:\n  - Home: index.md\n{}", tail),
    )
    .unwrap();

    let generator = Generator::new(Config::default()).unwrap();
    generator
        .run(&fixtures_path("project/models.py"), &dir.path().join("docs"), &manifest)
        .unwrap();

    let written = fs::read_to_string(&manifest).unwrap();
    assert!(written.starts_with("site_name: Demo  # title\nnav:"));
    assert!(written.ends_with(tail));
    assert_eq!(nav_titles(&manifest), vec!["models"]);
}
