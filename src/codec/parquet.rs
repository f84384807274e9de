//! Dataframe payloads (Arrow `RecordBatch` <-> Parquet bytes)
//!
//! OLAP-style columnar payloads are written whole and read back whole; there
//! is no partial update of a stored dataframe.

use arrow::compute::concat_batches;
use arrow::record_batch::RecordBatch;
use bytes::Bytes;
use ::parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use ::parquet::arrow::ArrowWriter;

use crate::{Error, Result};

/// Encode a batch as a self-contained Parquet file.
///
/// # Errors
///
/// Returns [`Error::Codec`] if the Parquet writer rejects the batch.
pub fn encode_batch(batch: &RecordBatch) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let mut writer = ArrowWriter::try_new(&mut buffer, batch.schema(), None)
        .map_err(|e| Error::codec("encode_dataframe", "dataframe", e))?;
    writer
        .write(batch)
        .map_err(|e| Error::codec("encode_dataframe", "dataframe", e))?;
    writer
        .close()
        .map_err(|e| Error::codec("encode_dataframe", "dataframe", e))?;
    Ok(buffer)
}

/// Decode Parquet bytes written by [`encode_batch`] into a single batch.
///
/// # Errors
///
/// Returns [`Error::Codec`] if the bytes are not valid Parquet.
pub fn decode_batch(bytes: impl Into<Bytes>) -> Result<RecordBatch> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(bytes.into())
        .map_err(|e| Error::codec("decode_dataframe", "dataframe", e))?;
    let schema = builder.schema().clone();
    let reader = builder
        .build()
        .map_err(|e| Error::codec("decode_dataframe", "dataframe", e))?;

    let mut batches = Vec::new();
    for batch in reader {
        batches.push(batch.map_err(|e| Error::codec("decode_dataframe", "dataframe", e))?);
    }

    concat_batches(&schema, &batches).map_err(|e| Error::codec("decode_dataframe", "dataframe", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int32Array, StringArray};
    use arrow::datatypes::{DataType, Field, Schema};
    use std::sync::Arc;

    #[allow(clippy::cast_possible_truncation)]
    #[allow(clippy::cast_possible_wrap)]
    #[allow(clippy::cast_precision_loss)]
    fn create_test_batch(num_rows: usize) -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int32, false),
            Field::new("score", DataType::Float64, false),
            Field::new("label", DataType::Utf8, false),
        ]);

        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int32Array::from_iter_values(0..num_rows as i32)),
                Arc::new(Float64Array::from_iter_values((0..num_rows).map(|i| i as f64 / 2.0))),
                Arc::new(StringArray::from_iter_values(
                    (0..num_rows).map(|i| format!("class_{}", i % 3)),
                )),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_batch_round_trip() {
        let batch = create_test_batch(150);
        let bytes = encode_batch(&batch).unwrap();
        let back = decode_batch(bytes).unwrap();
        assert_eq!(back.num_rows(), 150);
        assert_eq!(back.schema().fields(), batch.schema().fields());
        assert_eq!(back.columns(), batch.columns());
    }

    #[test]
    fn test_empty_batch_keeps_schema() {
        let batch = create_test_batch(0);
        let back = decode_batch(encode_batch(&batch).unwrap()).unwrap();
        assert_eq!(back.num_rows(), 0);
        assert_eq!(back.schema().fields(), batch.schema().fields());
    }

    #[test]
    fn test_garbage_is_codec_error() {
        let err = decode_batch(b"not parquet".to_vec()).unwrap_err();
        assert!(matches!(err, Error::Codec { .. }));
    }
}
