//! The observed application config, end to end through the built-in presets

use layerfold::error::PipelineError;
use layerfold::fragment::{environment_fragment, load_fragment_file, ConfigFragment, Origin};
use layerfold::merge::{MergeEngine, MergePolicy};
use layerfold::pipeline::Pipeline;
use layerfold::presets::{self, FamilySelection, GoogleFontsOptions, IconOptions};
use layerfold::value::Value;
use tempfile::TempDir;

const USER_CONFIG: &str = r#"
compatibilityDate = "2025-07-15"
css = ["~/assets/css/main.css"]
modules = ["@nuxtjs/google-fonts", "@nuxt/icon"]

[devtools]
enabled = true

[vite]
plugins = ["@tailwindcss/vite"]

[googleFonts.families]
"Rubik Iso" = true
"#;

fn user_fragment(temp_dir: &TempDir, source: &str) -> ConfigFragment {
    let path = temp_dir.path().join("layerfold.config.toml");
    std::fs::write(&path, source).unwrap();
    load_fragment_file(&path, Origin::User).unwrap()
}

fn env_fragment(vars: &[(&str, &str)]) -> ConfigFragment {
    let vars = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect::<Vec<_>>();
    environment_fragment(vars, "LAYERFOLD_CONFIG__").unwrap()
}

#[test]
fn test_observed_config_produces_activation_plan() {
    let temp_dir = TempDir::new().unwrap();
    let registry = presets::registry();
    let plan = Pipeline::run(
        &registry,
        MergePolicy::default(),
        vec![presets::framework_defaults(), user_fragment(&temp_dir, USER_CONFIG)],
    )
    .unwrap();

    assert_eq!(
        plan.module_names(),
        vec!["@nuxtjs/google-fonts", "@nuxt/icon"]
    );

    let fonts: GoogleFontsOptions = plan.records()[0].options_as().unwrap();
    assert_eq!(
        fonts.families.get("Rubik Iso"),
        Some(&FamilySelection::Enabled(true))
    );
    assert_eq!(fonts.display.as_deref(), Some("swap"));
    assert!(fonts.download);
    assert_eq!(fonts.fonts_dir, "fonts");

    let icon: IconOptions = plan.records()[1].options_as().unwrap();
    assert_eq!(icon.mode.as_deref(), Some("css"));
    assert_eq!(icon.component_name, "Icon");
    assert!(icon.size.is_none());
}

#[test]
fn test_observed_config_effective_values_and_origins() {
    let temp_dir = TempDir::new().unwrap();
    let fragments = vec![presets::framework_defaults(), user_fragment(&temp_dir, USER_CONFIG)];
    let effective = MergeEngine::new(MergePolicy::default())
        .merge(fragments.iter())
        .unwrap();

    assert_eq!(effective.get("devtools.enabled"), Some(&Value::from(true)));
    assert_eq!(effective.origin_of("devtools.enabled"), Some(Origin::User));
    assert_eq!(effective.get("ssr"), Some(&Value::from(true)));
    assert_eq!(effective.origin_of("ssr"), Some(Origin::FrameworkDefault));
    assert_eq!(
        effective.get("vite.plugins"),
        Some(&Value::List(vec![Value::from("@tailwindcss/vite")]))
    );
    assert_eq!(
        effective.get("compatibilityDate"),
        Some(&Value::from("2025-07-15"))
    );
}

#[test]
fn test_environment_overrides_layer_on_top() {
    let temp_dir = TempDir::new().unwrap();
    let registry = presets::registry();
    let mut pipeline = Pipeline::new(&registry);
    pipeline.load(presets::framework_defaults()).unwrap();
    pipeline.load(user_fragment(&temp_dir, USER_CONFIG)).unwrap();
    pipeline
        .load(env_fragment(&[
            ("LAYERFOLD_CONFIG__GOOGLE_FONTS__DISPLAY", "optional"),
            ("LAYERFOLD_CONFIG__CSS", r#"["~/assets/css/extra.css", "~/assets/css/main.css"]"#),
        ]))
        .unwrap();
    pipeline.load_module_defaults().unwrap();

    let effective = pipeline.merge().unwrap();
    assert_eq!(
        effective.get("css"),
        Some(&Value::List(vec![
            Value::from("~/assets/css/main.css"),
            Value::from("~/assets/css/extra.css"),
        ]))
    );
    assert_eq!(
        effective.origin_of("googleFonts.display"),
        Some(Origin::Environment)
    );

    pipeline.resolve().unwrap();
    pipeline.validate().unwrap();
    let plan = pipeline.emit().unwrap();
    let fonts: GoogleFontsOptions = plan.records()[0].options_as().unwrap();
    assert_eq!(fonts.display.as_deref(), Some("optional"));
}

#[test]
fn test_misspelled_option_is_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let registry = presets::registry();
    let source = USER_CONFIG.replace("[googleFonts.families]", "[googleFonts.familes]");
    let err = Pipeline::run(
        &registry,
        MergePolicy::default(),
        vec![presets::framework_defaults(), user_fragment(&temp_dir, &source)],
    )
    .unwrap_err();
    assert_eq!(
        err,
        PipelineError::UnknownOption {
            module: "@nuxtjs/google-fonts".to_string(),
            option: "familes".to_string(),
        }
    );
}

#[test]
fn test_fingerprint_is_reproducible() {
    let registry = presets::registry();
    let run = || {
        let temp_dir = TempDir::new().unwrap();
        Pipeline::run(
            &registry,
            MergePolicy::default(),
            vec![presets::framework_defaults(), user_fragment(&temp_dir, USER_CONFIG)],
        )
        .unwrap()
    };
    let first = run();
    let second = run();
    assert_eq!(first.fingerprint(), second.fingerprint());
    assert_eq!(first, second);
}
