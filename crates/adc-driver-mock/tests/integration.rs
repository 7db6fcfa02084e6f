//! Integration tests for the mock ADC platform
//!
//! These tests drive the mock only through the `adc-core` capability traits,
//! the way the sampler does.

use adc_core::{AdcPlatform, ChannelConfig, SampleSequence};
use adc_driver_mock::*;
use std::sync::Arc;

fn platform_with(adc: MockAdc) -> (MockAdcPlatform, Arc<MockAdc>) {
    let adc = Arc::new(adc);
    let platform = MockAdcPlatform::new().with_device("ADC_0", Arc::clone(&adc));
    (platform, adc)
}

/// Bind, configure four channels and read one sequence through trait objects
#[tokio::test]
async fn test_bind_configure_read() {
    let (platform, adc) = platform_with(
        MockAdc::builder()
            .script(vec![vec![100, 200, 300, 400]])
            .build(),
    );

    let device = platform.bind("ADC_0").await.expect("device registered");
    for cfg in ChannelConfig::standard_table(4) {
        device.configure_channel(&cfg).await.unwrap();
    }
    platform.trigger_calibration().await;

    let mut sequence = SampleSequence::new(4, 10);
    device.read(&mut sequence).await.unwrap();

    assert_eq!(sequence.buffer(), &[100, 200, 300, 400]);
    assert_eq!(adc.configured_channels(), vec![0, 1, 2, 3]);
    assert_eq!(platform.calibration_count(), 1);
}

/// Scripted reads are consumed in order, then synthesized values take over
#[tokio::test]
async fn test_script_then_synthesized() {
    let (platform, _adc) = platform_with(
        MockAdc::builder()
            .script(vec![vec![1, 2], vec![3, 4]])
            .input_voltages(vec![3.6, 0.0])
            .build(),
    );
    let device = platform.bind("ADC_0").await.unwrap();
    for cfg in ChannelConfig::standard_table(2) {
        device.configure_channel(&cfg).await.unwrap();
    }

    let mut sequence = SampleSequence::new(2, 10);
    device.read(&mut sequence).await.unwrap();
    assert_eq!(sequence.buffer(), &[1, 2]);
    device.read(&mut sequence).await.unwrap();
    assert_eq!(sequence.buffer(), &[3, 4]);
    device.read(&mut sequence).await.unwrap();
    assert_eq!(sequence.buffer(), &[1023, 0]);
}

/// Configuration from a `[mock]` section with certain read failures
#[tokio::test]
async fn test_from_config_failure_rate() {
    let config = MockAdcConfig {
        read_failure_rate: 1.0,
        seed: Some(3),
        ..Default::default()
    };
    let (platform, adc) = platform_with(MockAdc::from_config(&config));
    let device = platform.bind("ADC_0").await.unwrap();
    for cfg in ChannelConfig::standard_table(4) {
        device.configure_channel(&cfg).await.unwrap();
    }

    let mut sequence = SampleSequence::new(4, 10);
    for _ in 0..3 {
        assert!(device.read(&mut sequence).await.is_err());
    }
    assert_eq!(adc.read_count(), 3);
}

/// Test mock modes
#[test]
fn test_mock_modes() {
    assert_eq!(MockMode::default(), MockMode::Instant);
    let adc = MockAdc::builder().mode(MockMode::Realistic).build();
    assert!(format!("{:?}", adc).contains("Realistic"));
}
