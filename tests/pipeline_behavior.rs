//! Behavior-driven tests for full pipeline runs
//!
//! These tests verify WHAT a presentation layer receives from one
//! recomputation: flagged dates, correlation structure, and risk ratings,
//! focusing on observable outputs rather than internals.

use sigmascan_tests::*;

use sigmascan_core::{rating_chart, risk_chart, HeatmapPane, HeatmapView};

fn quiet_ticker(name: &str, start: &str) -> sigmascan_core::TickerHistory {
    // Mild alternation keeps the series non-constant without crossing any
    // reasonable threshold: z-scores are exactly +/- 1.
    let values: Vec<(f64, f64)> = (0..30)
        .map(|i| (20.0 + (i % 2) as f64, 2_000.0 + 100.0 * (i % 2) as f64))
        .collect();
    daily_series(name, start, &values)
}

// =============================================================================
// Pipeline: Anomaly Flags
// =============================================================================

#[tokio::test]
async fn single_extreme_outlier_day_is_the_only_price_anomaly() {
    // Given: AAA has one day at ten times its quiet price level, BBB is calm
    let market = market_of(vec![
        daily_series("AAA", "2024-01-01", &outlier_values(10.0, true, false)),
        quiet_ticker("BBB", "2024-01-01"),
    ]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));

    // When: The pipeline runs at sensitivity 2.0
    let report = pipeline
        .run(&request(&["AAA", "BBB"], range("2024-01-01", "2024-01-31"), 2.0))
        .await
        .expect("pipeline should succeed");

    // Then: AAA's adjusted-close anomaly set is exactly the outlier date
    let aaa = report
        .adj_close
        .detection
        .series(&symbol("AAA"))
        .expect("AAA must be flagged");
    assert_eq!(aaa.flagged.len(), 1);
    assert!(aaa.flagged.contains_key(&date("2024-01-30")));

    // And: BBB has no adjusted-close anomalies at all
    assert!(report.adj_close.detection.series(&symbol("BBB")).is_none());
}

#[tokio::test]
async fn anomaly_overlays_carry_observed_values_not_scores() {
    // Given: A known spike value
    let market = market_of(vec![daily_series(
        "AAA",
        "2024-01-01",
        &outlier_values(10.0, true, false),
    )]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));

    // When: The pipeline runs
    let report = pipeline
        .run(&request(&["AAA"], range("2024-01-01", "2024-01-31"), 2.0))
        .await
        .expect("pipeline should succeed");

    // Then: The overlay holds the raw price so markers sit on the line chart
    let aaa = report
        .adj_close
        .detection
        .series(&symbol("AAA"))
        .expect("flagged");
    assert_eq!(aaa.flagged.get(&date("2024-01-30")), Some(&100.0));
}

// =============================================================================
// Pipeline: Determinism and Tolerance
// =============================================================================

#[tokio::test]
async fn identical_inputs_produce_identical_reports() {
    // Given: A fixed fixture and a fixed request
    let market = market_of(vec![
        daily_series("AAA", "2024-01-01", &outlier_values(10.0, true, true)),
        quiet_ticker("BBB", "2024-01-01"),
    ]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));
    let req = request(&["AAA", "BBB"], range("2024-01-01", "2024-01-31"), 1.5);

    // When: The pipeline runs twice
    let first = pipeline.run(&req).await.expect("first run");
    let second = pipeline.run(&req).await.expect("second run");

    // Then: The reports are byte-for-byte the same value
    assert_eq!(first, second);
}

#[tokio::test]
async fn unknown_symbols_are_dropped_without_error() {
    // Given: A selection containing a symbol the provider does not know
    let market = market_of(vec![quiet_ticker("AAA", "2024-01-01")]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));

    // When: The pipeline runs
    let report = pipeline
        .run(&request(
            &["AAA", "GONE"],
            range("2024-01-01", "2024-01-31"),
            2.0,
        ))
        .await
        .expect("missing symbols must not fail the run");

    // Then: Only the served ticker appears anywhere downstream
    let served: Vec<String> = report
        .symbols()
        .into_iter()
        .map(|s| s.as_str().to_owned())
        .collect();
    assert_eq!(served, vec!["AAA"]);
    assert!(report.risk.iter().all(|score| score.symbol.as_str() == "AAA"));
}

// =============================================================================
// Pipeline: Correlation Output
// =============================================================================

#[tokio::test]
async fn correlation_matrix_is_symmetric_with_presentation_labels() {
    // Given: Two tickers spiking in both quantities on different days
    let mut bbb_values: Vec<(f64, f64)> = (0..30).map(|_| (50.0, 1_000.0)).collect();
    bbb_values[15] = (500.0, 10_000.0);
    let market = market_of(vec![
        daily_series("AAA", "2024-01-01", &outlier_values(10.0, true, true)),
        daily_series("BBB", "2024-01-01", &bbb_values),
    ]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));

    // When: The pipeline runs
    let report = pipeline
        .run(&request(&["AAA", "BBB"], range("2024-01-01", "2024-01-31"), 2.0))
        .await
        .expect("pipeline should succeed");

    // Then: Labels follow the "<kind> <ticker>" contract
    let matrix = &report.correlation;
    let labels = matrix.labels();
    assert!(labels.contains(&String::from("Adj Close Anomaly AAA")));
    assert!(labels.contains(&String::from("Volume Anomaly BBB")));

    // And: The matrix is symmetric
    for i in 0..matrix.size() {
        for j in 0..matrix.size() {
            assert_eq!(matrix.cell(i, j), matrix.cell(j, i));
        }
    }
}

#[tokio::test]
async fn ticker_with_no_anomalies_never_enters_the_matrix() {
    // Given: One spiking and one calm ticker
    let market = market_of(vec![
        daily_series("AAA", "2024-01-01", &outlier_values(10.0, true, false)),
        quiet_ticker("BBB", "2024-01-01"),
    ]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));

    // When: The pipeline runs
    let report = pipeline
        .run(&request(&["AAA", "BBB"], range("2024-01-01", "2024-01-31"), 2.0))
        .await
        .expect("pipeline should succeed");

    // Then: BBB has no column of either kind, absent rather than zero-filled
    for label in report.correlation.labels() {
        assert!(!label.ends_with("BBB"), "unexpected column: {label}");
    }
}

#[tokio::test]
async fn heatmap_pane_fills_undefined_cells_for_display() {
    // Given: A single spiking ticker, whose lone indicator column has zero
    // variance over the one-date union index
    let market = market_of(vec![daily_series(
        "AAA",
        "2024-01-01",
        &outlier_values(10.0, true, false),
    )]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));

    // When: The pipeline runs and a pane is sliced for display
    let report = pipeline
        .run(&request(&["AAA"], range("2024-01-01", "2024-01-31"), 2.0))
        .await
        .expect("pipeline should succeed");
    let view = HeatmapView::from_matrix(&report.correlation, HeatmapPane::AdjcloseAdjclose);

    // Then: The undefined correlation renders as zero, and the raw matrix
    // still reports it as undefined
    assert_eq!(view.cells, vec![vec![0.0]]);
    assert_eq!(report.correlation.cell(0, 0), None);
}

// =============================================================================
// Pipeline: Risk Scores and Ratings
// =============================================================================

#[tokio::test]
async fn ratings_span_the_selection_and_fill_for_charts() {
    // Given: Three tickers that differ in how many days spike. A lone
    // outlier always lands at the same |z| regardless of magnitude, but
    // more spike days dilute the sample statistics and lower the mean |z|,
    // so the totals differ.
    let spiky = |spikes: usize| -> Vec<(f64, f64)> {
        let mut values: Vec<(f64, f64)> = (0..30 - spikes).map(|_| (10.0, 1_000.0)).collect();
        for _ in 0..spikes {
            values.push((50.0, 5_000.0));
        }
        values
    };
    let market = market_of(vec![
        daily_series("AAA", "2024-01-01", &spiky(1)),
        daily_series("BBB", "2024-01-01", &spiky(2)),
        daily_series("CCC", "2024-01-01", &spiky(3)),
    ]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));

    // When: The pipeline runs
    let report = pipeline
        .run(&request(
            &["AAA", "BBB", "CCC"],
            range("2024-01-01", "2024-01-31"),
            2.0,
        ))
        .await
        .expect("pipeline should succeed");

    // Then: Every defined rating is within [0, 1] with both endpoints used
    let ratings: Vec<f64> = report
        .risk
        .iter()
        .filter_map(|score| score.rating)
        .collect();
    assert_eq!(ratings.len(), 3);
    assert!(ratings.iter().all(|r| (0.0..=1.0).contains(r)));
    assert!(ratings.contains(&0.0));
    assert!(ratings.contains(&1.0));

    // And: Chart views carry the same tickers with no undefined values
    let slices = rating_chart(&report.risk);
    assert_eq!(slices.len(), 3);
    let bars = risk_chart(&report.risk, report.sensitivity);
    assert_eq!(bars.threshold, 2.0);
}

#[tokio::test]
async fn single_ticker_selection_rates_zero() {
    // Given: One ticker with anomalies in both kinds
    let market = market_of(vec![daily_series(
        "AAA",
        "2024-01-01",
        &outlier_values(10.0, true, true),
    )]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));

    // When: The pipeline runs for just that ticker
    let report = pipeline
        .run(&request(&["AAA"], range("2024-01-01", "2024-01-31"), 2.0))
        .await
        .expect("pipeline should succeed");

    // Then: The degenerate min-max range resolves to rating 0, not NaN
    assert_eq!(report.risk[0].rating, Some(0.0));
}

#[tokio::test]
async fn one_sided_anomalies_suppress_the_total_but_not_the_component() {
    // Given: A price spike over a flat (constant) volume series
    let market = market_of(vec![daily_series(
        "AAA",
        "2024-01-01",
        &outlier_values(10.0, true, false),
    )]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));

    // When: The pipeline runs
    let report = pipeline
        .run(&request(&["AAA"], range("2024-01-01", "2024-01-31"), 2.0))
        .await
        .expect("pipeline should succeed");

    // Then: The price component is defined, the total is not
    let score = &report.risk[0];
    assert!(score.adj_close_risk.is_some());
    assert_eq!(score.volume_risk, None);
    assert_eq!(score.total_risk, None);

    // And: Display views fill the gap with zero
    assert_eq!(rating_chart(&report.risk)[0].rating, 0.0);
    assert_eq!(risk_chart(&report.risk, report.sensitivity).bars[0].value, 0.0);
}

// =============================================================================
// Pipeline: Serialization Contract
// =============================================================================

#[tokio::test]
async fn report_serializes_undefined_numbers_as_null() {
    // Given: A run whose risk total is undefined
    let market = market_of(vec![daily_series(
        "AAA",
        "2024-01-01",
        &outlier_values(10.0, true, false),
    )]);
    let pipeline = Pipeline::new(Arc::new(FixtureSource::new(market)));
    let report = pipeline
        .run(&request(&["AAA"], range("2024-01-01", "2024-01-31"), 2.0))
        .await
        .expect("pipeline should succeed");

    // When: The report is serialized for the presentation layer
    let value = serde_json::to_value(&report).expect("report serializes");

    // Then: Undefined numbers are null, never NaN
    assert!(value["risk"][0]["total_risk"].is_null());
    assert!(value["risk"][0]["adj_close_risk"].is_f64());
    let rendered = serde_json::to_string(&report).expect("report serializes");
    assert!(!rendered.contains("NaN"));
}
