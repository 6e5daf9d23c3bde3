//! Tests for protocol configuration.

use super::*;

fn invalid_message(config: &ProtocolConfig) -> String {
    config.validate().unwrap_err().to_string()
}

#[test]
fn test_default_is_reference_protocol() {
    let config = ProtocolConfig::default();
    config.validate().unwrap();

    assert_eq!(config.mixture_grid().unwrap().mixture_count(), 66);
    assert_eq!(config.plate_layout().unwrap().capacity(), 96);
    assert_eq!(config.metadata.api_level, "2.23");
    assert_eq!(config.tip_handling, TipHandling::Explicit);

    let ranges: Vec<String> = config
        .instruments
        .iter()
        .map(|i| i.volume_range().to_string())
        .collect();
    assert_eq!(ranges, vec!["(0, 50]", "(50, inf)"]);
}

#[test]
fn test_toml_parsing() {
    let toml = r#"
        tip_handling = "delegated"

        [metadata]
        protocol_name = "Dye screen"

        [mixtures]
        total_volume = 200
        step = 50
        reagents = ["Water", "Red", "Blue"]

        [reservoir]
        definition = "nest_12_reservoir_15ml"
        slot = "D1"

        [[sources]]
        reagent = "Water"
        well = "A1"
        volume = 10000

        [[sources]]
        reagent = "Red"
        well = "A2"
        volume = 2000

        [[sources]]
        reagent = "Blue"
        well = "A3"
        volume = 2000

        [plate]
        rows = 4
        columns = 6
        well_order = "row_major"

        [[instruments]]
        model = "flex_1channel_1000"
        mount = "left"
        above = 0
        tip_racks = [{ definition = "opentrons_flex_96_tiprack_1000ul", slot = "B1" }]
    "#;

    let config = ProtocolConfig::from_toml_str(toml).unwrap();
    assert_eq!(config.metadata.protocol_name, "Dye screen");
    assert_eq!(config.metadata.robot_type, "Flex");
    assert_eq!(config.tip_handling, TipHandling::Delegated);
    assert_eq!(config.plate.well_order, WellOrder::RowMajor);
    assert_eq!(config.plate.definition, "corning_96_wellplate_360ul_flat");
    assert_eq!(config.instruments.len(), 1);
    assert_eq!(config.instruments[0].up_to, None);
    assert_eq!(config.sources[1].well.as_str(), "A2");
    assert_eq!(config.mixture_grid().unwrap().mixture_count(), 15);
    config.validate().unwrap();
}

#[test]
fn test_yaml_parsing() {
    let yaml = r#"
        mixtures:
          total_volume: 100
          step: 20
        plate:
          rows: 4
          columns: 6
        tip_handling: explicit
    "#;

    let config = ProtocolConfig::from_yaml_str(yaml).unwrap();
    assert_eq!(config.mixtures.step, 20);
    assert_eq!(config.mixtures.reagents[2], "Reagent_C");
    assert_eq!(config.plate_layout().unwrap().capacity(), 24);
    assert_eq!(config.mixture_grid().unwrap().mixture_count(), 21);
    config.validate().unwrap();
}

#[test]
fn test_builder() {
    let config = ProtocolConfig::new()
        .with_mixture_grid(50, 10)
        .with_plate_size(3, 7)
        .with_tip_handling(TipHandling::Delegated);

    assert_eq!(config.mixture_grid().unwrap().mixture_count(), 21);
    assert_eq!(config.plate_layout().unwrap().capacity(), 21);
    config.validate().unwrap();
}

#[test]
fn test_missing_file_is_io_error() {
    let config = ProtocolConfig::load("/nonexistent/platemix/protocol.toml");
    assert!(matches!(config, Err(ConfigError::Io(_))));
}

#[test]
fn test_indivisible_total_rejected() {
    let config = ProtocolConfig::new().with_mixture_grid(100, 15);
    assert_eq!(
        invalid_message(&config),
        "Configuration error: total volume 100 is not divisible by step 15"
    );
}

#[test]
fn test_plate_too_small_rejected() {
    let config = ProtocolConfig::new().with_plate_size(8, 8);
    assert_eq!(
        invalid_message(&config),
        "Invalid configuration: 66 mixtures do not fit on a plate with 64 wells"
    );
}

#[test]
fn test_huge_mixture_grid_is_error() {
    let config = ProtocolConfig::default().with_mixture_grid(u32::MAX, 1);
    assert!(config.validate().is_err());
}

#[test]
fn test_huge_plate_is_error() {
    let config = ProtocolConfig::default().with_plate_size(8, usize::MAX);
    assert!(invalid_message(&config).contains("too large"));
}

#[test]
fn test_range_gap_rejected() {
    let mut config = ProtocolConfig::new();
    config.instruments[1].above = 60;
    assert_eq!(
        invalid_message(&config),
        "Configuration error: volume ranges (0, 50] and (60, inf) leave a gap"
    );
}

#[test]
fn test_range_overlap_rejected() {
    let mut config = ProtocolConfig::new();
    config.instruments[0].up_to = Some(100);
    assert!(invalid_message(&config).contains("overlap"));
}

#[test]
fn test_missing_source_rejected() {
    let mut config = ProtocolConfig::new();
    config.sources.pop();
    assert_eq!(
        invalid_message(&config),
        "Invalid configuration: reagent 'Reagent_C' has no source"
    );
}

#[test]
fn test_unknown_and_duplicate_sources_rejected() {
    let mut config = ProtocolConfig::new();
    config.sources.push(SourceConfig::new("Reagent_D", "A4", 100));
    assert_eq!(
        invalid_message(&config),
        "Invalid configuration: source for unknown reagent 'Reagent_D'"
    );

    let mut config = ProtocolConfig::new();
    config.sources.push(SourceConfig::new("Reagent_A", "A4", 100));
    assert_eq!(
        invalid_message(&config),
        "Invalid configuration: reagent 'Reagent_A' has more than one source"
    );
}

#[test]
fn test_duplicate_reagents_rejected() {
    let mut config = ProtocolConfig::new();
    config.mixtures.reagents[1] = "Reagent_A".to_string();
    assert!(matches!(
        config.validate(),
        Err(ConfigError::Domain(PlatemixError::Config(_)))
    ));
}

#[test]
fn test_shared_mount_rejected() {
    let mut config = ProtocolConfig::new();
    config.instruments[1].mount = MountConfig::Right;
    assert_eq!(
        invalid_message(&config),
        "Invalid configuration: more than one instrument on the Right mount"
    );
}

#[test]
fn test_shared_deck_slot_rejected() {
    let mut config = ProtocolConfig::new();
    config.trash.slot = "C3".to_string();
    assert_eq!(
        invalid_message(&config),
        "Invalid configuration: deck slot C3 is used more than once"
    );
}
