//! Tests for reading normalization and per-timestamp aggregation.
//!
//! Run with: cargo test --test aggregate_test

use station_dash::weather::{aggregate, normalize, parse_timestamp, parse_value, Normalized, Quantity, RawReading};

fn r(t: &str, sensor: &str, value: &str) -> RawReading {
    RawReading::new(t, sensor, value)
}

#[test]
fn normalize_maps_known_labels() {
    let cases = [
        ("Temperature", Quantity::AirTemperature),
        ("Air Temperature", Quantity::AirTemperature),
        ("Dew Point", Quantity::DewPoint),
        ("RH", Quantity::RelativeHumidity),
        ("Relative Humidity", Quantity::RelativeHumidity),
        ("Wind Speed", Quantity::WindSpeed),
        ("Gust", Quantity::GustSpeed),
        ("Gust Speed", Quantity::GustSpeed),
        ("Wind Direction", Quantity::WindDirection),
        ("Pressure", Quantity::Pressure),
    ];
    for (label, quantity) in cases {
        assert_eq!(normalize(label), Normalized::Mapped(quantity), "label {label}");
    }
}

#[test]
fn normalize_is_exact_and_case_sensitive() {
    for label in ["Humidity", "temperature", "PRESSURE", " RH", "Wind speed", ""] {
        assert_eq!(normalize(label), Normalized::Unmapped, "label {label:?}");
    }
}

#[test]
fn parse_value_reads_leading_number() {
    assert_eq!(parse_value("20"), Some(20.0));
    assert_eq!(parse_value(" -3.5 "), Some(-3.5));
    assert_eq!(parse_value("1e3"), Some(1000.0));
    assert_eq!(parse_value("12.5 °C"), Some(12.5));
    assert_eq!(parse_value("12abc"), Some(12.0));
    assert_eq!(parse_value("1,5"), Some(1.0));
    assert_eq!(parse_value("-.5"), Some(-0.5));
    assert_eq!(parse_value("2e"), Some(2.0));
    assert_eq!(parse_value("4E-1mbar"), Some(0.4));
}

#[test]
fn parse_value_rejects_non_numeric_and_non_finite() {
    assert_eq!(parse_value(""), None);
    assert_eq!(parse_value("n/a"), None);
    assert_eq!(parse_value("."), None);
    assert_eq!(parse_value("-"), None);
    assert_eq!(parse_value("--"), None);
    assert_eq!(parse_value("NaN"), None);
    assert_eq!(parse_value("inf"), None);
    assert_eq!(parse_value("1e999"), None);
}

#[test]
fn parse_timestamp_accepts_provider_formats() {
    let expected = parse_timestamp("2025-06-01T12:00:00Z").unwrap();
    assert_eq!(parse_timestamp("2025-06-01 12:00:00"), Some(expected));
    assert_eq!(parse_timestamp("2025-06-01T12:00:00"), Some(expected));
    assert_eq!(parse_timestamp("2025-06-01T07:00:00-05:00"), Some(expected));
    assert_eq!(parse_timestamp("yesterday"), None);
}

#[test]
fn parse_timestamp_accepts_minute_precision_and_dates() {
    let expected = parse_timestamp("2025-06-01T11:55:00Z").unwrap();
    assert_eq!(parse_timestamp("2025-06-01 11:55"), Some(expected));
    assert_eq!(parse_timestamp("2025-06-01T11:55"), Some(expected));
    assert_eq!(parse_timestamp("2025-06-01 11:55Z"), Some(expected));
    assert_eq!(parse_timestamp("2025-06-01T11:55Z"), Some(expected));
    assert_eq!(
        parse_timestamp("2025-06-01"),
        parse_timestamp("2025-06-01T00:00:00Z")
    );
}

#[test]
fn mixed_precision_timestamps_sort_chronologically() {
    let readings = vec![
        r("2025-06-01T12:05:00Z", "Pressure", "2"),
        r("2025-06-01 12:00:00", "Pressure", "1"),
        r("2025-06-01 11:55", "Pressure", "0"),
    ];

    let records = aggregate(&readings);
    let values: Vec<Option<f64>> = records.iter().map(|r| r.pressure).collect();
    assert_eq!(values, [Some(0.0), Some(1.0), Some(2.0)]);
    assert!(records.iter().all(|r| r.time.is_some()));
}

#[test]
fn equal_instants_order_independent_of_input() {
    let readings = vec![
        r("2025-06-01T12:00:00Z", "Pressure", "1"),
        r("2025-06-01 12:00:00", "Pressure", "2"),
    ];
    let mut reversed = readings.clone();
    reversed.reverse();

    let forward = aggregate(&readings);
    assert_eq!(forward.len(), 2);
    assert_eq!(aggregate(&reversed), forward);
    assert_eq!(forward[0].timestamp, "2025-06-01 12:00:00");
}

#[test]
fn empty_input_yields_empty_output() {
    assert!(aggregate(&[]).is_empty());
}

#[test]
fn groups_by_timestamp_and_sorts() {
    let readings = vec![
        r("2025-06-01 10:10:00", "Temperature", "22"),
        r("2025-06-01 10:05:00", "Temperature", "20"),
        r("2025-06-01 10:05:00", "RH", "55"),
    ];

    let records = aggregate(&readings);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].timestamp, "2025-06-01 10:05:00");
    assert_eq!(records[0].air_temperature, Some(20.0));
    assert_eq!(records[0].relative_humidity, Some(55.0));
    assert_eq!(records[0].dew_point, None);
    assert_eq!(records[0].wind_speed, None);
    assert_eq!(records[0].gust_speed, None);
    assert_eq!(records[0].wind_direction, None);
    assert_eq!(records[0].pressure, None);

    assert_eq!(records[1].timestamp, "2025-06-01 10:10:00");
    assert_eq!(records[1].air_temperature, Some(22.0));
    assert_eq!(records[1].relative_humidity, None);
}

#[test]
fn output_length_matches_distinct_timestamps() {
    let readings: Vec<RawReading> = (0..30)
        .map(|i| {
            let minute = (i * 7) % 10;
            r(&format!("2025-06-01 10:0{minute}:00"), "Pressure", "1013")
        })
        .collect();

    let records = aggregate(&readings);
    assert_eq!(records.len(), 10);
    assert!(records.windows(2).all(|w| w[0].time <= w[1].time));
}

#[test]
fn sorts_chronologically_not_lexically() {
    let readings = vec![
        r("2025-06-01T10:00:00+02:00", "Pressure", "1"),
        r("2025-06-01T09:30:00Z", "Pressure", "2"),
    ];

    let records = aggregate(&readings);
    // 10:00+02:00 is 08:00Z
    assert_eq!(records[0].pressure, Some(1.0));
    assert_eq!(records[1].pressure, Some(2.0));
}

#[test]
fn unparsable_timestamps_sort_last_by_text() {
    let readings = vec![
        r("garbage-b", "Pressure", "1"),
        r("2025-06-01 10:00:00", "Pressure", "2"),
        r("garbage-a", "Pressure", "3"),
    ];

    let records = aggregate(&readings);
    let order: Vec<&str> = records.iter().map(|r| r.timestamp.as_str()).collect();
    assert_eq!(order, ["2025-06-01 10:00:00", "garbage-a", "garbage-b"]);
}

#[test]
fn unmapped_labels_are_dropped_but_create_their_record() {
    let readings = vec![
        r("2025-06-01 10:00:00", "Humidity", "40"),
        r("2025-06-01 10:00:00", "Temperature", "18"),
        r("2025-06-01 10:05:00", "Humidity", "41"),
        r("2025-06-01 10:05:00", "Battery", "3.3"),
    ];

    let records = aggregate(&readings);

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].air_temperature, Some(18.0));
    assert_eq!(records[0].relative_humidity, None);

    let only_unmapped = &records[1];
    assert_eq!(only_unmapped.timestamp, "2025-06-01 10:05:00");
    assert!(Quantity::ALL.iter().all(|q| only_unmapped.get(*q).is_none()));
}

#[test]
fn non_numeric_value_leaves_field_unknown() {
    let readings = vec![
        r("2025-06-01 10:00:00", "Wind Speed", "calm"),
        r("2025-06-01 10:00:00", "Pressure", "1012.5"),
    ];

    let records = aggregate(&readings);
    assert_eq!(records[0].wind_speed, None);
    assert_eq!(records[0].pressure, Some(1012.5));
}

#[test]
fn duplicate_timestamp_and_sensor_last_wins() {
    let readings = vec![
        r("T1", "Temperature", "10"),
        r("T1", "Temperature", "20"),
    ];
    assert_eq!(aggregate(&readings)[0].air_temperature, Some(20.0));

    // Aliases of the same quantity also overwrite
    let readings = vec![
        r("T1", "Air Temperature", "10"),
        r("T1", "Temperature", "15"),
    ];
    assert_eq!(aggregate(&readings)[0].air_temperature, Some(15.0));

    // A later unparsable value overwrites an earlier good one
    let readings = vec![
        r("T1", "RH", "50"),
        r("T1", "RH", "ERR"),
    ];
    assert_eq!(aggregate(&readings)[0].relative_humidity, None);
}

#[test]
fn permutation_without_duplicates_does_not_change_output() {
    let readings = vec![
        r("2025-06-01 10:00:00", "Temperature", "20"),
        r("2025-06-01 10:00:00", "RH", "55"),
        r("2025-06-01 10:05:00", "Temperature", "22"),
        r("2025-06-01 10:05:00", "Wind Direction", "180"),
        r("2025-06-01 10:10:00", "Wind Speed", "4.2"),
        r("2025-06-01 10:10:00", "Humidity", "1"),
    ];
    let expected = aggregate(&readings);

    let mut reversed = readings.clone();
    reversed.reverse();
    assert_eq!(aggregate(&reversed), expected);

    for k in 1..readings.len() {
        let mut rotated = readings.clone();
        rotated.rotate_left(k);
        assert_eq!(aggregate(&rotated), expected, "rotation {k}");
    }
}

#[test]
fn permutation_with_duplicate_pair_changes_winner() {
    let readings = vec![
        r("2025-06-01 10:00:00", "Temperature", "10"),
        r("2025-06-01 10:00:00", "RH", "60"),
        r("2025-06-01 10:00:00", "Temperature", "20"),
    ];
    let mut reversed = readings.clone();
    reversed.reverse();

    assert_eq!(aggregate(&readings)[0].air_temperature, Some(20.0));
    assert_eq!(aggregate(&reversed)[0].air_temperature, Some(10.0));
    assert_eq!(aggregate(&reversed)[0].relative_humidity, Some(60.0));
}
