//! Categorical label encoding
//!
//! A [`LabelEncoder`] maps each distinct value of one column to the index of
//! that value in the sorted set of classes seen at fit time. Encoders start
//! UNFITTED; `encode`/`transform` are only defined once fitted and reject
//! values outside the fitted classes.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::errors::{CoreError, Result};

/// Label encoder for a single categorical column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    column: String,
    /// Sorted distinct classes, `None` while unfitted
    classes: Option<Vec<String>>,
}

impl LabelEncoder {
    /// Create an unfitted encoder for `column`
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            classes: None,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn is_fitted(&self) -> bool {
        self.classes.is_some()
    }

    /// Fitted classes in id order
    pub fn classes(&self) -> Option<&[String]> {
        self.classes.as_deref()
    }

    /// Learn the class set from `values`, replacing any previous fit
    pub fn fit<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let classes: BTreeSet<&str> = values.into_iter().collect();
        if classes.is_empty() {
            return Err(CoreError::EmptyInput(format!("encoder for {}", self.column)));
        }
        self.classes = Some(classes.into_iter().map(str::to_string).collect());
        Ok(())
    }

    /// Integer id of a single value
    pub fn encode(&self, value: &str) -> Result<usize> {
        let classes = self
            .classes
            .as_ref()
            .ok_or_else(|| CoreError::NotFitted(format!("encoder for {}", self.column)))?;

        classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .map_err(|_| CoreError::UnseenCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    pub fn transform<'a, I>(&self, values: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        values.into_iter().map(|value| self.encode(value)).collect()
    }

    pub fn fit_transform<'a, I>(&mut self, values: I) -> Result<Vec<usize>>
    where
        I: IntoIterator<Item = &'a str> + Clone,
    {
        self.fit(values.clone())?;
        self.transform(values)
    }

    /// Class name for an id (inverse transform)
    pub fn decode(&self, id: usize) -> Option<&str> {
        self.classes.as_ref()?.get(id).map(String::as_str)
    }
}

/// Per-column label encoders, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryEncoders {
    encoders: BTreeMap<String, LabelEncoder>,
}

impl CategoryEncoders {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, column: &str) -> Option<&LabelEncoder> {
        self.encoders.get(column)
    }

    /// Encoder for `column`, inserting an unfitted one on first access
    pub fn entry(&mut self, column: &str) -> &mut LabelEncoder {
        self.encoders
            .entry(column.to_string())
            .or_insert_with(|| LabelEncoder::new(column))
    }

    pub fn is_fitted(&self, column: &str) -> bool {
        self.encoders
            .get(column)
            .map(LabelEncoder::is_fitted)
            .unwrap_or(false)
    }

    /// Encode one value with the fitted encoder of `column`
    pub fn encode(&self, column: &str, value: &str) -> Result<usize> {
        self.encoders
            .get(column)
            .ok_or_else(|| CoreError::NotFitted(format!("encoder for {column}")))?
            .encode(value)
    }

    pub fn len(&self) -> usize {
        self.encoders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.encoders.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &LabelEncoder)> {
        self.encoders.iter().map(|(k, v)| (k.as_str(), v))
    }
}
