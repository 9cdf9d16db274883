//! Fragment loading from files and the process environment

use super::test_utils::with_env_vars;
use layerfold::error::LoadError;
use layerfold::fragment::{
    environment_fragment_from_process, load_fragment_file, Origin, DEFAULT_ENV_PREFIX,
};
use layerfold::merge::{MergeEngine, MergePolicy};
use layerfold::value::{KeyPath, Value};
use tempfile::TempDir;

#[test]
fn test_json_and_toml_fragments_merge_identically() {
    let temp_dir = TempDir::new().unwrap();
    let toml_path = temp_dir.path().join("user.toml");
    let json_path = temp_dir.path().join("user.json");
    std::fs::write(
        &toml_path,
        "modules = [\"a\"]\n[app.head]\ntitle = \"Demo\"\n",
    )
    .unwrap();
    std::fs::write(
        &json_path,
        r#"{ "modules": ["a"], "app": { "head": { "title": "Demo" } } }"#,
    )
    .unwrap();

    let engine = MergeEngine::new(MergePolicy::default());
    let from_toml = engine
        .merge([&load_fragment_file(&toml_path, Origin::User).unwrap()])
        .unwrap();
    let from_json = engine
        .merge([&load_fragment_file(&json_path, Origin::User).unwrap()])
        .unwrap();
    assert_eq!(from_toml.fingerprint(), from_json.fingerprint());
}

#[test]
fn test_accumulate_marks_reach_the_merge() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("user.toml");
    std::fs::write(
        &path,
        "\"$accumulate\" = [\"app.head.link\"]\n[app.head]\nlink = [\"b\"]\n",
    )
    .unwrap();
    let user = load_fragment_file(&path, Origin::User).unwrap();
    assert!(user.accumulate().contains(&KeyPath::parse("app.head.link")));
    assert!(!user.tree().contains_key("$accumulate"));

    let framework_path = temp_dir.path().join("framework.json");
    std::fs::write(&framework_path, r#"{ "app": { "head": { "link": ["a", "b"] } } }"#).unwrap();
    let framework = load_fragment_file(&framework_path, Origin::FrameworkDefault).unwrap();

    let effective = MergeEngine::new(MergePolicy::default())
        .merge([&user, &framework])
        .unwrap();
    assert_eq!(
        effective.get("app.head.link"),
        Some(&Value::List(vec![Value::from("a"), Value::from("b")]))
    );
}

#[test]
fn test_malformed_file_reports_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("broken.toml");
    std::fs::write(&path, "modules = [\n").unwrap();
    match load_fragment_file(&path, Origin::User) {
        Err(LoadError::Parse { path: reported, .. }) => assert_eq!(reported, path),
        other => panic!("expected parse error, got {:?}", other.map(|f| f.origin())),
    }
}

#[test]
fn test_process_environment_fragment() {
    with_env_vars(
        &[
            ("LAYERFOLD_CONFIG__DEVTOOLS__ENABLED", "false"),
            ("LAYERFOLD_CONFIG__APP__BASE_URL", "/docs/"),
        ],
        || {
            let fragment = environment_fragment_from_process(DEFAULT_ENV_PREFIX).unwrap();
            assert_eq!(fragment.origin(), Origin::Environment);
            let effective = MergeEngine::new(MergePolicy::default())
                .merge([&fragment])
                .unwrap();
            assert_eq!(effective.get("devtools.enabled"), Some(&Value::from(false)));
            assert_eq!(effective.get("app.baseUrl"), Some(&Value::from("/docs/")));
        },
    );
}
