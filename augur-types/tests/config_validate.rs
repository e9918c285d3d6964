use augur_types::{AugurError, ForecasterConfig, SeasonalityConfig};

#[test]
fn default_config_is_valid() {
    ForecasterConfig::default().validate().unwrap();
}

#[test]
fn changepoint_range_bounds() {
    for bad in [0.0, -0.1, 1.5, f64::NAN] {
        let cfg = ForecasterConfig::default().with_changepoint_range(bad);
        assert!(matches!(cfg.validate(), Err(AugurError::InvalidArg(_))), "{bad}");
    }
    ForecasterConfig::default()
        .with_changepoint_range(1.0)
        .validate()
        .unwrap();
}

#[test]
fn zero_flexibility_is_allowed_negative_is_not() {
    ForecasterConfig::default()
        .with_trend_flexibility(0.0)
        .validate()
        .unwrap();
    let cfg = ForecasterConfig::default().with_trend_flexibility(-1.0);
    assert!(matches!(cfg.validate(), Err(AugurError::InvalidArg(_))));
}

#[test]
fn interval_width_must_be_open_unit() {
    for bad in [0.0, 1.0, 2.0] {
        let cfg = ForecasterConfig::default().with_interval_width(bad);
        assert!(cfg.validate().is_err(), "{bad}");
    }
}

#[test]
fn seasonality_rules() {
    let zero_period = ForecasterConfig::default()
        .with_seasonalities(vec![SeasonalityConfig::new("bad", 0.0, 2)]);
    assert!(zero_period.validate().is_err());

    let zero_order = ForecasterConfig::default()
        .with_seasonalities(vec![SeasonalityConfig::new("bad", 7.0, 0)]);
    assert!(zero_order.validate().is_err());

    let duplicate = ForecasterConfig::default()
        .with_seasonalities(vec![SeasonalityConfig::weekly(), SeasonalityConfig::weekly()]);
    assert!(duplicate.validate().is_err());

    let reserved = ForecasterConfig::default()
        .with_seasonalities(vec![SeasonalityConfig::new("trend", 7.0, 1)]);
    assert!(reserved.validate().is_err());

    let bad_prior = ForecasterConfig::default()
        .with_seasonalities(vec![SeasonalityConfig::weekly().with_prior_scale(0.0)]);
    assert!(bad_prior.validate().is_err());
}
