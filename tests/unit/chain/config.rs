use super::*;
use crate::{
    chain::context::FrameParams,
    foundation::core::TextureSize,
    shader::{cache::ShaderCache, scaler::Scaler},
    test_support::{MockBackend, host_source},
};

#[test]
fn chain_config_is_tagged_by_kind() {
    let config = ChainConfig::from_json_str(r#"{"kind": "nedi", "centered": false}"#).unwrap();
    assert_eq!(
        config,
        ChainConfig::Nedi(Nedi {
            always_double_image: false,
            centered: false,
        })
    );

    let json = ChainConfig::Identity.to_json_string().unwrap();
    assert!(json.contains(r#""kind": "identity""#));
}

#[test]
fn unknown_kind_is_a_serde_error() {
    let err = ChainConfig::from_json_str(r#"{"kind": "warp"}"#).unwrap_err();
    assert!(matches!(err, ChainError::Serde(_)));
    assert!(err.is_recoverable());
}

#[test]
fn nested_sequence_round_trips() {
    let config = ChainConfig::Sequence {
        chains: vec![
            ChainConfig::Nedi(Nedi::default()),
            ChainConfig::Scale(Scale {
                upscaler: Scaler::Lanczos {
                    taps: 3,
                    anti_ringing: true,
                },
                downscaler: Scaler::Bilinear,
            }),
            ChainConfig::SuperRes(SuperRes::default()),
        ],
    };
    let json = config.to_json_string().unwrap();
    assert_eq!(ChainConfig::from_json_str(&json).unwrap(), config);
}

#[test]
fn sequence_config_builds_chains_in_order() {
    let mut backend = MockBackend::new();
    let mut cache = ShaderCache::new();
    let params = FrameParams::rgb(TextureSize::new(2, 2), TextureSize::new(6, 6));
    let src = host_source(&mut backend, 2, 2);
    let mut ctx = ChainContext::new(&params, &mut cache, &mut backend);

    let config = ChainConfig::Sequence {
        chains: vec![
            ChainConfig::Nedi(Nedi {
                centered: false,
                ..Nedi::default()
            }),
            ChainConfig::Scale(Scale::default()),
        ],
    };
    let out = config.create_filter(&mut ctx, src).unwrap();
    assert_eq!(out.size(), TextureSize::new(6, 6));
    assert_eq!(out.inputs()[0].size(), TextureSize::new(4, 4));
}

#[test]
fn missing_settings_load_as_defaults() {
    let store = SettingsStore::new();
    let nedi: Nedi = store.load("nedi").unwrap();
    assert_eq!(nedi, Nedi::default());
}

#[test]
fn save_bumps_revision_only_on_change() {
    let mut store = SettingsStore::new();
    store.save("nedi", &Nedi::default()).unwrap();
    assert_eq!(store.revision(), 1);
    store.save("nedi", &Nedi::default()).unwrap();
    assert_eq!(store.revision(), 1);

    let changed = Nedi {
        centered: false,
        ..Nedi::default()
    };
    store.save("nedi", &changed).unwrap();
    assert_eq!(store.revision(), 2);
    assert_eq!(store.load::<Nedi>("nedi").unwrap(), changed);

    assert!(store.remove("nedi"));
    assert!(!store.remove("nedi"));
    assert_eq!(store.revision(), 3);
}

#[test]
fn document_round_trips() {
    let mut store = SettingsStore::new();
    store
        .save("chain", &ChainConfig::SuperRes(SuperRes::default()))
        .unwrap();
    store.save("nedi", &Nedi::default()).unwrap();

    let reloaded = SettingsStore::from_json_str(&store.to_json_string().unwrap()).unwrap();
    let mut names: Vec<_> = reloaded.names().collect();
    names.sort_unstable();
    assert_eq!(names, ["chain", "nedi"]);
    assert_eq!(
        reloaded.load::<ChainConfig>("chain").unwrap(),
        ChainConfig::SuperRes(SuperRes::default())
    );
}

#[test]
fn document_must_be_an_object() {
    let err = SettingsStore::from_json_str("[1, 2]").unwrap_err();
    assert!(matches!(err, ChainError::Serde(ref m) if m.contains("an array")));
    assert!(SettingsStore::from_json_str("{").is_err());
}

#[test]
fn malformed_entry_names_the_setting() {
    let store = SettingsStore::from_json_str(r#"{"nedi": {"centered": "yes"}}"#).unwrap();
    let err = store.load::<Nedi>("nedi").unwrap_err();
    assert!(matches!(err, ChainError::Serde(ref m) if m.contains("'nedi'")));
}
