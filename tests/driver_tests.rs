use std::sync::Arc;

use tokio::io::BufReader;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

use metrics_live::chart::color::ColorWheel;
use metrics_live::chart::surface::RecordingSurface;
use metrics_live::chart::TelemetryChart;
use metrics_live::config::ChartOptions;
use metrics_live::driver;

const INPUT: &str = r#"{"x":"cpu","y":"1.5","z":"2024-01-01T00:00:00Z"}
[{"x":"mem","y":2,"z":"2024-01-01T00:00:01Z"},{"x":"cpu","y":"bad","z":"2024-01-01T00:00:02Z"}]

this is not json
{"x":"cpu","y":3,"z":"2024-01-01T00:00:03Z"}
"#;

fn chart() -> TelemetryChart<RecordingSurface> {
    let options = ChartOptions::from_json_str(r#"{"metric":"last_value","instrument":"temporal","now":0}"#).unwrap();
    TelemetryChart::new(&options, RecordingSurface::new(), Arc::new(ColorWheel)).unwrap()
}

#[tokio::test]
async fn test_driver_streams_until_eof() {
    let mut chart = chart();
    let reader = BufReader::new(INPUT.as_bytes());

    let stats = driver::run(reader, &mut chart, Duration::from_millis(5), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(stats.events, 3);
    assert_eq!(stats.skipped, 1);
    assert_eq!(stats.bad_lines, 1);
    assert!(stats.batches >= 1);
    assert_eq!(chart.matrix().keys(), vec!["cpu", "mem"]);
    assert_eq!(chart.matrix().rows(), 3);
    assert_eq!(chart.surface().set_data_count(), stats.batches);
    assert_eq!(chart.instrument().value("cpu"), Some(3.0));
}

#[tokio::test]
async fn test_driver_stops_on_cancel() {
    let mut chart = chart();
    // Never reaches EOF
    let (_keep_open, read_half) = tokio::io::duplex(64);
    let token = CancellationToken::new();
    token.cancel();

    let stats = driver::run(BufReader::new(read_half), &mut chart, Duration::from_millis(5), token)
        .await
        .unwrap();

    assert_eq!(stats.batches, 0);
    assert_eq!(chart.surface().set_data_count(), 0);
}

#[tokio::test]
async fn test_driver_keeps_valid_events_beside_undecodable_ones() {
    let mut chart = chart();
    let input = concat!(
        r#"[{"x":"cpu","y":1,"z":"2024-01-01T00:00:00Z"},"#,
        r#"{"x":"mem","y":null,"z":"2024-01-01T00:00:01Z"},"#,
        r#"{"x":"disk","y":true,"z":"2024-01-01T00:00:01Z"},"#,
        r#"{"x":"net","y":2}]"#,
        "\n",
        "42\n",
        r#"{"x":"cpu","y":"4","z":"2024-01-01T00:00:02Z"}"#,
        "\n",
    );

    let stats = driver::run(
        BufReader::new(input.as_bytes()),
        &mut chart,
        Duration::from_millis(5),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(stats.events, 2);
    assert_eq!(stats.skipped, 3, "null y, bool y and missing z each count once");
    assert_eq!(stats.bad_lines, 1);
    assert_eq!(chart.matrix().keys(), vec!["cpu"]);
    assert_eq!(chart.matrix().column("cpu").unwrap(), &[Some(1.0), Some(4.0)]);
}
