//! End-to-end tests for the promotion model pipeline
//!
//! Tables are generated on disk so the CSV loading path is exercised too.

use anyhow::Result;
use promo_core::CoreError;
use promo_trainer::{
    run_pipeline, EncodingMode, ModelReport, PipelineConfig, PromotionModelProcessor, RecordTable,
    TrainerError, DEFAULT_TARGET_COLUMN,
};
use std::io::Write;
use tempfile::{NamedTempFile, TempDir};

const HEADER: &str = "Tanggal,Produk,Kategori,Brand,Harga_Jual,Jenis_Promo,Diskon,Stok_Harian,Stok_Aging,Musim,Cuaca,Event_Lokal,Jumlah_Terjual";

const PRODUCTS: [(&str, &str, &str, f64); 3] = [
    ("Oreo", "Biskuit", "Nabisco", 9500.0),
    ("Aqua", "Minuman", "Danone", 4000.0),
    ("Chitato", "Snack", "Indofood", 11000.0),
];

/// One synthetic row; units sold depend on product, discount and weekday
fn row(i: usize) -> String {
    let (product, category, brand, price) = PRODUCTS[i % PRODUCTS.len()];
    let day = i % 28 + 1;
    let month = i / 28 % 12 + 1;
    let promo = if i % 4 == 0 { "Tidak Ada Promo" } else { "Diskon Persen" };
    let discount = if i % 4 == 0 { 0 } else { (i % 3 + 1) * 5 };
    let season = if month <= 6 { "Hujan" } else { "Kemarau" };
    let units = 20 + (i % PRODUCTS.len()) * 15 + discount * 2 + day % 7;
    format!(
        "2024-{month:02}-{day:02},{product},{category},{brand},{price},{promo},{discount},{stock},{aging},{season},Cerah,,{units}",
        stock = 100 + i % 50,
        aging = i % 5,
    )
}

fn write_table(lines: &[String]) -> Result<NamedTempFile> {
    let mut file = NamedTempFile::new()?;
    writeln!(file, "{HEADER}")?;
    for line in lines {
        writeln!(file, "{line}")?;
    }
    file.flush()?;
    Ok(file)
}

fn training_file(n: usize) -> Result<NamedTempFile> {
    write_table(&(0..n).map(row).collect::<Vec<_>>())
}

fn small_config() -> PipelineConfig {
    let mut config = PipelineConfig::default();
    config.forest.n_estimators = 12;
    config.forest.max_depth = 6;
    config
}

fn train(table: &RecordTable) -> Result<(PromotionModelProcessor, promo_core::TrainingMetrics)> {
    let mut processor = PromotionModelProcessor::with_config(&small_config());
    let (frame, features) = processor.preprocess_data(table, EncodingMode::FitIfUnfitted)?;
    let metrics = processor.train_model(&frame, &features, DEFAULT_TARGET_COLUMN)?;
    Ok((processor, metrics))
}

#[test]
fn test_full_pipeline() -> Result<()> {
    let train_file = training_file(120)?;
    let validation_file = write_table(&(120..150).map(row).collect::<Vec<_>>())?;

    let mut processor = PromotionModelProcessor::with_config(&small_config());
    let (train_table, validation_table) = processor
        .load_data(
            &train_file.path().to_string_lossy(),
            &validation_file.path().to_string_lossy(),
        )
        .ok_or_else(|| anyhow::anyhow!("data failed to load"))?;
    assert_eq!(train_table.shape(), (120, 13));

    let (frame, features) = processor.preprocess_data(&train_table, EncodingMode::FitIfUnfitted)?;
    let metrics = processor.train_model(&frame, &features, DEFAULT_TARGET_COLUMN)?;
    assert!(metrics.train_r2 > 0.8, "train r2 = {}", metrics.train_r2);
    assert!(metrics.test_r2.is_finite());

    let predictions = processor.predict(&validation_table)?;
    assert_eq!(predictions.len(), 30);

    let dir = TempDir::new()?;
    let report_path = dir.path().join("model_results.json");
    ModelReport {
        training_metrics: metrics,
        validation_predictions: predictions,
        feature_columns: features,
    }
    .write_to(&report_path)?;

    let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&report_path)?)?;
    assert_eq!(value["validation_predictions"].as_array().map(Vec::len), Some(30));
    assert_eq!(value["feature_columns"].as_array().map(Vec::len), Some(13));
    Ok(())
}

#[test]
fn test_training_is_deterministic() -> Result<()> {
    let file = training_file(80)?;
    let table = RecordTable::from_path(file.path())?;

    let (first, metrics_a) = train(&table)?;
    let (second, metrics_b) = train(&table)?;

    assert_eq!(metrics_a, metrics_b);
    assert_eq!(first.predict(&table)?, second.predict(&table)?);
    assert_eq!(first.model(), second.model());
    Ok(())
}

#[test]
fn test_unseen_category_fails_prediction() -> Result<()> {
    let file = training_file(60)?;
    let (processor, _) = train(&RecordTable::from_path(file.path())?)?;

    let unseen = write_table(&[
        "2024-05-01,Indomie,Mie,Indofood,3000,Diskon Persen,5,80,1,Hujan,Cerah,,12".to_string(),
    ])?;
    let result = processor.predict(&RecordTable::from_path(unseen.path())?);

    assert!(matches!(
        result,
        Err(TrainerError::Core(CoreError::UnseenCategory { ref column, ref value }))
            if column == "Produk" && value == "Indomie"
    ));
    Ok(())
}

#[test]
fn test_save_load_reproduces_predictions() -> Result<()> {
    let file = training_file(60)?;
    let table = RecordTable::from_path(file.path())?;
    let (processor, _) = train(&table)?;

    let dir = TempDir::new()?;
    let path = dir.path().join("promotion_model.bin");
    let saved = processor.save_model(&path)?;
    assert_eq!(saved.hash.len(), 64);

    let mut restored = PromotionModelProcessor::new();
    restored.load_model(&path)?;

    assert!(restored.is_trained());
    assert_eq!(restored.encoders(), processor.encoders());
    assert_eq!(restored.predict(&table)?, processor.predict(&table)?);
    Ok(())
}

#[test]
fn test_missing_price_becomes_zero() -> Result<()> {
    let mut lines: Vec<String> = (0..10).map(row).collect();
    lines[2] = "2024-01-03,Chitato,Snack,Indofood,,Diskon Persen,10,120,2,Hujan,Cerah,,45".to_string();
    let file = write_table(&lines)?;
    let table = RecordTable::from_path(file.path())?;

    let mut processor = PromotionModelProcessor::new();
    let (frame, features) = processor.preprocess_data(&table, EncodingMode::FitIfUnfitted)?;
    let matrix = frame.matrix(&features)?;
    assert_eq!(matrix[2][0], 0.0);
    Ok(())
}

#[test]
fn test_na_and_nan_prices_become_zero() -> Result<()> {
    let mut lines: Vec<String> = (0..40).map(row).collect();
    lines[2] = "2024-01-03,Chitato,Snack,Indofood,NaN,Diskon Persen,10,120,2,Hujan,Cerah,,45".to_string();
    lines[5] = "2024-01-06,Chitato,Snack,Indofood,NA,Diskon Persen,10,120,2,Hujan,Cerah,,45".to_string();
    let file = write_table(&lines)?;
    let table = RecordTable::from_path(file.path())?;

    let mut processor = PromotionModelProcessor::with_config(&small_config());
    let (frame, features) = processor.preprocess_data(&table, EncodingMode::FitIfUnfitted)?;
    let matrix = frame.matrix(&features)?;
    assert_eq!(matrix[2][0], 0.0);
    assert_eq!(matrix[5][0], 0.0);

    let metrics = processor.train_model(&frame, &features, DEFAULT_TARGET_COLUMN)?;
    assert!(metrics.train_r2.is_finite() && metrics.train_r2 > 0.5, "train r2 = {}", metrics.train_r2);
    assert!(processor.predict(&table)?.iter().all(|p| p.is_finite()));
    Ok(())
}

#[test]
fn test_run_pipeline_writes_artifacts() -> Result<()> {
    let train_file = training_file(90)?;
    let validation_file = write_table(&(90..110).map(row).collect::<Vec<_>>())?;
    let dir = TempDir::new()?;

    let mut config = small_config();
    config.data.train_location = train_file.path().to_string_lossy().into_owned();
    config.data.validation_location = validation_file.path().to_string_lossy().into_owned();
    config.output.model_path = dir.path().join("promotion_model.bin");
    config.output.report_path = dir.path().join("model_results.json");

    let outcome = run_pipeline(&config)?.ok_or_else(|| anyhow::anyhow!("pipeline skipped"))?;
    assert_eq!(outcome.validation_rows, 20);
    assert!(config.output.model_path.exists());

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&config.output.report_path)?)?;
    assert_eq!(value["validation_predictions"].as_array().map(Vec::len), Some(20));
    Ok(())
}

#[test]
fn test_model_saved_before_validation_failure() -> Result<()> {
    let train_file = training_file(60)?;
    let validation_file = write_table(&[
        "2024-05-01,Indomie,Mie,Indofood,3000,Diskon Persen,5,80,1,Hujan,Cerah,,12".to_string(),
    ])?;
    let dir = TempDir::new()?;

    let mut config = small_config();
    config.data.train_location = train_file.path().to_string_lossy().into_owned();
    config.data.validation_location = validation_file.path().to_string_lossy().into_owned();
    config.output.model_path = dir.path().join("promotion_model.bin");
    config.output.report_path = dir.path().join("model_results.json");

    let result = run_pipeline(&config);
    assert!(matches!(
        result,
        Err(TrainerError::Core(CoreError::UnseenCategory { .. }))
    ));
    assert!(config.output.model_path.exists());
    assert!(!config.output.report_path.exists());

    let mut restored = PromotionModelProcessor::new();
    restored.load_model(&config.output.model_path)?;
    assert!(restored.is_trained());
    Ok(())
}

#[test]
fn test_run_pipeline_skips_on_load_failure() -> Result<()> {
    let dir = TempDir::new()?;
    let mut config = small_config();
    config.data.train_location = "/definitely/missing/train.csv".to_string();
    config.output.model_path = dir.path().join("promotion_model.bin");

    assert!(run_pipeline(&config)?.is_none());
    assert!(!config.output.model_path.exists());
    Ok(())
}

#[test]
fn test_string_units_sold_coerces() -> Result<()> {
    let file = write_table(&[
        "2024-02-10,Oreo,Biskuit,Nabisco,9500,Diskon Persen,10,120,3,Hujan,Cerah,,\"10\"".to_string(),
    ])?;
    let table = RecordTable::from_path(file.path())?;

    let mut processor = PromotionModelProcessor::new();
    let (frame, _) = processor.preprocess_data(&table, EncodingMode::FitIfUnfitted)?;
    assert_eq!(frame.dense_column(DEFAULT_TARGET_COLUMN)?, vec![10.0]);
    Ok(())
}

#[test]
fn test_load_data_missing_file() {
    let processor = PromotionModelProcessor::new();
    assert!(processor
        .load_data("/definitely/missing/train.csv", "/definitely/missing/validation.csv")
        .is_none());
}
