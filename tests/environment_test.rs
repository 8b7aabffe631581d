use envplate::config::{parse_config, ConfigModel, EnvConfig};
use envplate::environment::{resolve_env, try_resolve_env};

const DESCRIPTOR: &str = r#"
product: shop
default:
  config_src: configs
  config_tgt: dist/configs
  configs: [api, worker]
  binaries: [api]
  image_tag: latest
  image_build_env: [DOCKER_BUILDKIT=1]
env:
  dev: {}
  prod:
    config_tgt: /srv/configs
    configs: [api]
    image_tag: v1
  staging:
    binaries: []
    image_prefix: ""
  broken:
    configs: not-a-list
"#;

fn model() -> ConfigModel {
    parse_config(DESCRIPTOR).unwrap()
}

#[test_log::test]
fn test_empty_overlay_equals_default() {
    let model = model();
    assert_eq!(resolve_env(&model, "dev"), model.default);
}

#[test_log::test]
fn test_empty_or_unknown_name_returns_default() {
    let model = model();
    assert_eq!(resolve_env(&model, ""), model.default);
    assert_eq!(resolve_env(&model, "qa"), model.default);
}

#[test_log::test]
fn test_overlay_fields_replace_default_fields() {
    let model = model();
    let prod = resolve_env(&model, "prod");

    assert_eq!(prod.config_tgt, "/srv/configs");
    assert_eq!(prod.configs, vec!["api"]);
    assert_eq!(prod.image_tag, "v1");

    // untouched fields fall back to the default layer
    assert_eq!(prod.config_src, "configs");
    assert_eq!(prod.binaries, vec!["api"]);
    assert_eq!(prod.image_build_env, vec!["DOCKER_BUILDKIT=1"]);
}

#[test_log::test]
fn test_explicitly_empty_values_inherit() {
    // An empty list cannot clear the default's list: it is treated as unset.
    let model = model();
    let staging = resolve_env(&model, "staging");
    assert_eq!(staging.binaries, vec!["api"]);
    assert_eq!(staging, model.default);
}

#[test_log::test]
fn test_malformed_overlay_degrades_to_default() {
    let model = model();
    assert!(try_resolve_env(&model, "broken").is_err());
    assert_eq!(resolve_env(&model, "broken"), model.default);
}

#[test_log::test]
fn test_every_field_is_overridable() {
    let overlay = EnvConfig {
        config_src: "a".into(),
        config_tgt: "b".into(),
        configs: vec!["c".into()],
        binary_src: "d".into(),
        binary_tgt: "e".into(),
        binaries: vec!["f".into()],
        binary_build_env: vec!["G=1".into()],
        binary_build_args: vec!["-race".into()],
        image_build_src: "h".into(),
        images: vec!["i".into()],
        image_prefix: "j".into(),
        image_tag: "k".into(),
        image_build_env: vec!["L=1".into()],
        image_build_args: vec!["--pull".into()],
        kubernetes_src: "m".into(),
        kubernetes_tgt: "n".into(),
        kubernetes_templates: vec!["o".into()],
    };
    let mut model = model();
    model
        .env
        .insert("full".to_string(), serde_yaml::to_value(&overlay).unwrap());
    assert_eq!(resolve_env(&model, "full"), overlay);
}
