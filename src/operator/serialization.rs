use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use anyhow::{anyhow, Context, Result};
use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::operator::model::{ForwardOperator, OperatorSpec};

/// On-disk representation of an operator: its producing spec plus the dense
/// entries in row-major order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawOperator {
    pub spec: OperatorSpec,
    pub nrows: usize,
    pub ncols: usize,
    pub entries: Vec<f64>,
}

/// Exports operators to JSON files compatible with the loader format.
pub struct OperatorWriter;

impl OperatorWriter {
    pub fn to_raw(operator: &ForwardOperator) -> RawOperator {
        let matrix = operator.matrix();
        let mut entries = Vec::with_capacity(matrix.nrows() * matrix.ncols());
        for i in 0..matrix.nrows() {
            for j in 0..matrix.ncols() {
                entries.push(matrix[(i, j)]);
            }
        }
        RawOperator {
            spec: operator.spec().clone(),
            nrows: matrix.nrows(),
            ncols: matrix.ncols(),
            entries,
        }
    }

    pub fn to_json_string(operator: &ForwardOperator) -> Result<String> {
        Ok(serde_json::to_string_pretty(&Self::to_raw(operator))?)
    }

    pub fn write_to_path(operator: &ForwardOperator, path: &Path) -> Result<()> {
        let json = Self::to_json_string(operator)?;
        let mut file =
            File::create(path).with_context(|| format!("create operator file {:?}", path))?;
        file.write_all(json.as_bytes())
            .with_context(|| format!("write operator file {:?}", path))?;
        Ok(())
    }
}

/// Loads operators previously exported by [`OperatorWriter`].
pub struct OperatorLoader;

impl OperatorLoader {
    pub fn from_raw(raw: RawOperator) -> Result<ForwardOperator> {
        if raw.entries.len() != raw.nrows * raw.ncols {
            return Err(anyhow!(
                "Operator entry count {} does not match dimensions {}x{}",
                raw.entries.len(),
                raw.nrows,
                raw.ncols
            ));
        }
        let matrix = DMatrix::from_row_slice(raw.nrows, raw.ncols, &raw.entries);
        Ok(ForwardOperator::new(matrix, raw.spec))
    }

    pub fn from_json_str(json: &str) -> Result<ForwardOperator> {
        let raw: RawOperator = serde_json::from_str(json)?;
        Self::from_raw(raw)
    }

    pub fn from_path(path: &Path) -> Result<ForwardOperator> {
        let file = File::open(path).with_context(|| format!("open operator file {:?}", path))?;
        let raw: RawOperator = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("deserialize operator file {:?}", path))?;
        Self::from_raw(raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::construction::OperatorBuilder;

    #[test]
    fn operator_round_trip_serialization() {
        let operator = OperatorBuilder::blur(16, 1.5, 3).expect("blur operator");
        let json = OperatorWriter::to_json_string(&operator).expect("serialize operator");
        let restored = OperatorLoader::from_json_str(&json).expect("roundtrip load");
        assert_eq!(restored.spec(), operator.spec());
        assert_eq!(restored.matrix(), operator.matrix());
    }

    #[test]
    fn mismatched_entry_count_rejected() {
        let raw = RawOperator {
            spec: OperatorSpec::Downsample { n: 4, factor: 2 },
            nrows: 2,
            ncols: 4,
            entries: vec![1.0; 7],
        };
        assert!(OperatorLoader::from_raw(raw).is_err());
    }
}
