//! Descriptive summary of a promotion table

use chrono::Datelike;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::info;

use crate::dataset::RecordTable;
use crate::preprocess::{coerce_numeric, parse_date};

/// Promotion type meaning "no promotion"
pub const NO_PROMO: &str = "Tidak Ada Promo";

/// Mean of the values pushed so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RunningMean {
    pub count: usize,
    pub mean: f64,
}

impl RunningMean {
    fn push(&mut self, value: f64) {
        self.count += 1;
        self.mean += (value - self.mean) / self.count as f64;
    }
}

/// Per-month sales and discount averages
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MonthTrend {
    pub units_sold: RunningMean,
    pub discount: RunningMean,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DataSummary {
    pub rows: usize,
    pub distinct_products: usize,
    /// Mean units sold over rows whose value coerces to a number
    pub mean_units_sold: Option<f64>,
    pub promoted_rows: usize,
    pub category_counts: BTreeMap<String, usize>,
    /// Mean units sold per promotion type
    pub promo_effectiveness: BTreeMap<String, RunningMean>,
    /// Keyed by month number, rows without a parseable date are skipped
    pub monthly_trends: BTreeMap<u32, MonthTrend>,
}

impl DataSummary {
    pub fn from_table(table: &RecordTable) -> Self {
        let mut summary = Self {
            rows: table.len(),
            ..Default::default()
        };
        let mut products = BTreeSet::new();
        let mut units = RunningMean::default();

        for record in &table.records {
            products.insert(record.product.as_str());
            *summary
                .category_counts
                .entry(record.category.clone())
                .or_default() += 1;

            if !record.promo_type.is_empty() && record.promo_type != NO_PROMO {
                summary.promoted_rows += 1;
            }

            let sold = coerce_numeric(record.units_sold.as_deref());
            if let Some(sold) = sold {
                units.push(sold);
                summary
                    .promo_effectiveness
                    .entry(record.promo_type.clone())
                    .or_default()
                    .push(sold);
            }

            if let Some(date) = parse_date(&record.date) {
                let trend = summary.monthly_trends.entry(date.month()).or_default();
                if let Some(sold) = sold {
                    trend.units_sold.push(sold);
                }
                if let Some(discount) = coerce_numeric(record.discount.as_deref()) {
                    trend.discount.push(discount);
                }
            }
        }

        summary.distinct_products = products.len();
        summary.mean_units_sold = (units.count > 0).then_some(units.mean);
        summary
    }

    /// Log the summary at INFO level
    pub fn log(&self) {
        info!("Rows: {}", self.rows);
        info!("Distinct products: {}", self.distinct_products);
        match self.mean_units_sold {
            Some(mean) => info!("Mean units sold: {:.2}", mean),
            None => info!("Mean units sold: n/a"),
        }
        info!("Rows with a promotion: {}", self.promoted_rows);

        info!("Category distribution:");
        for (category, count) in &self.category_counts {
            info!("  {}: {}", category, count);
        }

        info!("Promotion effectiveness (mean units sold):");
        for (promo, stats) in &self.promo_effectiveness {
            info!("  {}: {:.2} over {} rows", promo, stats.mean, stats.count);
        }

        info!("Monthly trends:");
        for (month, trend) in &self.monthly_trends {
            info!(
                "  {:02}: units {:.2}, discount {:.2}",
                month, trend.units_sold.mean, trend.discount.mean
            );
        }
    }
}
