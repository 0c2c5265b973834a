use chirps_core::AnnualRecord;
use serde::Serialize;

/// Per-year records kept for display: only years with positive precipitation.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RowSet(Vec<AnnualRecord>);

/// Statistics over the displayed rows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Summary {
    pub count: usize,
    pub mean: f64,
    pub max: AnnualRecord,
    pub min: AnnualRecord,
}

impl RowSet {
    /// Keep records with `accumulated > 0`, preserving their order.
    pub fn from_records(records: &[AnnualRecord]) -> Self {
        RowSet(
            records
                .iter()
                .filter(|record| record.is_positive())
                .copied()
                .collect(),
        )
    }

    pub fn records(&self) -> &[AnnualRecord] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AnnualRecord> {
        self.0.iter()
    }

    /// Count, mean and extremes. Ties resolve to the earliest row.
    pub fn summary(&self) -> Option<Summary> {
        let first = *self.0.first()?;
        let mut max = first;
        let mut min = first;
        let mut total = 0.0;
        for record in &self.0 {
            if record.accumulated > max.accumulated {
                max = *record;
            }
            if record.accumulated < min.accumulated {
                min = *record;
            }
            total += record.accumulated;
        }
        Some(Summary {
            count: self.0.len(),
            mean: total / self.0.len() as f64,
            max,
            min,
        })
    }
}

impl<'a> IntoIterator for &'a RowSet {
    type Item = &'a AnnualRecord;
    type IntoIter = std::slice::Iter<'a, AnnualRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
