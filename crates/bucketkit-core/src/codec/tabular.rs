//! Parquet encoding for record lists.

use std::sync::Arc;

use arrow_json::ArrayWriter;
use arrow_json::reader::{ReaderBuilder, infer_json_schema_from_iterator};
use bytes::Bytes;
use parquet::arrow::ArrowWriter;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::basic::{Compression, GzipLevel};
use parquet::file::properties::WriterProperties;

use crate::{Error, Record, Result, TRACING_TARGET_CODEC, Value};

/// Rows decoded into a single record batch.
const BATCH_SIZE: usize = 1024;

/// Encodes records as a gzip-compressed parquet file.
///
/// The schema is inferred from the records. A single record is promoted to
/// a one-element list, so both forms produce identical output. Values that
/// are not records fail with [`Error::NotTabular`].
pub fn encode_tabular(value: &Value) -> Result<Bytes> {
    let rows: Vec<serde_json::Value> = value
        .to_records()?
        .into_iter()
        .map(serde_json::Value::Object)
        .collect();

    if rows.is_empty() {
        return Err(Error::tabular("no records to encode"));
    }

    let schema = infer_json_schema_from_iterator(rows.iter().map(Ok)).map_err(Error::tabular)?;
    let schema = Arc::new(schema);

    let props = WriterProperties::builder()
        .set_compression(Compression::GZIP(GzipLevel::default()))
        .build();

    let mut decoder = ReaderBuilder::new(schema.clone())
        .with_batch_size(BATCH_SIZE)
        .with_coerce_primitive(true)
        .build_decoder()
        .map_err(Error::tabular)?;

    let mut buffer = Vec::new();
    {
        let mut writer =
            ArrowWriter::try_new(&mut buffer, schema, Some(props)).map_err(Error::tabular)?;

        for chunk in rows.chunks(BATCH_SIZE) {
            decoder.serialize(chunk).map_err(Error::tabular)?;
            if let Some(batch) = decoder.flush().map_err(Error::tabular)? {
                writer.write(&batch).map_err(Error::tabular)?;
            }
        }

        writer.close().map_err(Error::tabular)?;
    }

    tracing::debug!(
        target: TRACING_TARGET_CODEC,
        rows = rows.len(),
        size = buffer.len(),
        "Encoded tabular payload"
    );

    Ok(Bytes::from(buffer))
}

/// Decodes a parquet payload back into records.
///
/// Null columns are omitted from the returned records.
pub fn decode_tabular(payload: Bytes) -> Result<Vec<Record>> {
    let reader = ParquetRecordBatchReaderBuilder::try_new(payload)
        .map_err(Error::tabular)?
        .build()
        .map_err(Error::tabular)?;

    let mut writer = ArrayWriter::new(Vec::new());
    for batch in reader {
        let batch = batch.map_err(Error::tabular)?;
        writer.write(&batch).map_err(Error::tabular)?;
    }
    writer.finish().map_err(Error::tabular)?;

    let json = writer.into_inner();
    if json.is_empty() {
        return Ok(Vec::new());
    }

    Ok(serde_json::from_slice(&json)?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn records(value: serde_json::Value) -> Value {
        Value::Records(Value::from(value).to_records().unwrap())
    }

    #[test]
    fn test_single_record_matches_one_element_list() {
        let single = encode_tabular(&Value::from(json!({"id": 1, "name": "a"}))).unwrap();
        let list = encode_tabular(&records(json!([{"id": 1, "name": "a"}]))).unwrap();
        assert_eq!(single, list);
    }

    #[test]
    fn test_payload_is_parquet() {
        let payload = encode_tabular(&records(json!([{"id": 1}, {"id": 2}]))).unwrap();
        assert_eq!(&payload[..4], b"PAR1");
        assert_eq!(&payload[payload.len() - 4..], b"PAR1");
    }

    #[test]
    fn test_round_trip() {
        let value = records(json!([
            {"id": 1, "name": "alpha", "score": 0.5},
            {"id": 2, "name": "beta", "score": 1.5},
        ]));
        let payload = encode_tabular(&value).unwrap();
        let decoded = decode_tabular(payload).unwrap();
        assert_eq!(Value::Records(decoded), value);
    }

    #[test]
    fn test_mixed_column_is_widened_to_text() {
        let value = Value::from(json!([{"a": 1}, {"a": "x"}]));
        let payload = encode_tabular(&value).unwrap();
        let decoded = decode_tabular(payload).unwrap();
        assert_eq!(
            Value::Records(decoded),
            records(json!([{"a": "1"}, {"a": "x"}]))
        );
    }

    #[test]
    fn test_many_rows_span_batches() {
        let rows: Vec<serde_json::Value> = (0..(BATCH_SIZE * 2 + 7))
            .map(|i| json!({"i": i}))
            .collect();
        let payload = encode_tabular(&Value::from(serde_json::Value::Array(rows))).unwrap();
        assert_eq!(decode_tabular(payload).unwrap().len(), BATCH_SIZE * 2 + 7);
    }

    #[test]
    fn test_rejects_non_tabular_values() {
        assert!(matches!(
            encode_tabular(&Value::from("text")),
            Err(Error::NotTabular(_))
        ));
        assert!(matches!(
            encode_tabular(&Value::from(vec![1u8, 2])),
            Err(Error::NotTabular(_))
        ));
    }

    #[test]
    fn test_rejects_empty_record_list() {
        assert!(matches!(
            encode_tabular(&Value::Records(Vec::new())),
            Err(Error::Tabular(_))
        ));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_tabular(Bytes::from_static(b"nope")).is_err());
    }
}
