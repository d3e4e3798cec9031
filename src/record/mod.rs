//! Record encoding: one sub-cube plus its parameter vector as a
//! `tf.train.Example` inside TFRecord framing.
//!
//! The example holds two float features, `x` (the flattened sub-cube) and
//! `y` (the parameter vector). Map entries are written in key order so the
//! output bytes depend only on the input values.

pub mod proto;
pub mod tfrecord;

use std::collections::BTreeMap;

use byteorder::{ByteOrder, LittleEndian};
use ndarray::ArrayViewD;
use thiserror::Error;

use proto::{FieldReader, FieldValue};

pub const X_FEATURE: &str = "x";
pub const Y_FEATURE: &str = "y";

// tf.train.Example / Features / Feature / FloatList field numbers
const EXAMPLE_FEATURES: u32 = 1;
const FEATURES_ENTRY: u32 = 1;
const ENTRY_KEY: u32 = 1;
const ENTRY_VALUE: u32 = 2;
const FEATURE_FLOAT_LIST: u32 = 2;
const FLOAT_LIST_VALUE: u32 = 1;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record stream is truncated")]
    Truncated,

    #[error("{0} checksum mismatch")]
    Checksum(&'static str),

    #[error("malformed example: {0}")]
    Malformed(&'static str),

    #[error("feature `{0}` not present")]
    MissingFeature(String),

    #[error("expected exactly one record, found {0}")]
    RecordCount(usize),
}

/// A decoded example: float features by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    pub features: BTreeMap<String, Vec<f32>>,
}

impl Record {
    pub fn feature(&self, name: &str) -> Result<&[f32], RecordError> {
        self.features
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| RecordError::MissingFeature(name.to_string()))
    }

    pub fn x(&self) -> Result<&[f32], RecordError> {
        self.feature(X_FEATURE)
    }

    pub fn y(&self) -> Result<&[f32], RecordError> {
        self.feature(Y_FEATURE)
    }

    /// Parses one serialized `tf.train.Example`.
    pub fn decode_example(payload: &[u8]) -> Result<Self, RecordError> {
        let mut record = Record::default();
        let mut example = FieldReader::new(payload);
        while let Some((field, value)) = example.next_field()? {
            if let (EXAMPLE_FEATURES, FieldValue::Bytes(features)) = (field, value) {
                decode_features(features, &mut record.features)?;
            }
        }
        Ok(record)
    }

    /// Parses a file body that must hold exactly one framed record.
    pub fn decode_file(bytes: &[u8]) -> Result<Self, RecordError> {
        let frames = tfrecord::read_frames(bytes)?;
        match frames.as_slice() {
            [payload] => Self::decode_example(payload),
            other => Err(RecordError::RecordCount(other.len())),
        }
    }
}

/// Decodes every record in a TFRecord stream.
pub fn decode_records(bytes: &[u8]) -> Result<Vec<Record>, RecordError> {
    tfrecord::read_frames(bytes)?
        .into_iter()
        .map(Record::decode_example)
        .collect()
}

/// Encodes one sub-cube and its parameter vector as a framed record.
/// The view is flattened in logical row-major order whatever its strides.
pub fn encode_record(sub_cube: &ArrayViewD<'_, f32>, params: &[f32]) -> Vec<u8> {
    let features = [
        FloatFeature::new(X_FEATURE, sub_cube.len()),
        FloatFeature::new(Y_FEATURE, params.len()),
    ];
    let features_body: usize = features
        .iter()
        .map(|f| proto::len_field_size(FEATURES_ENTRY, f.entry_body))
        .sum();

    let mut payload =
        Vec::with_capacity(proto::len_field_size(EXAMPLE_FEATURES, features_body));
    proto::put_len_header(&mut payload, EXAMPLE_FEATURES, features_body);
    features[0].write(&mut payload, sub_cube.iter().copied());
    features[1].write(&mut payload, params.iter().copied());

    let mut out = Vec::new();
    tfrecord::write_frame(&mut out, &payload);
    out
}

/// Pre-computed sizes of one `Features.feature` map entry.
struct FloatFeature<'a> {
    name: &'a str,
    count: usize,
    float_list_body: usize,
    feature_body: usize,
    entry_body: usize,
}

impl<'a> FloatFeature<'a> {
    fn new(name: &'a str, count: usize) -> Self {
        let float_list_body = if count == 0 {
            0
        } else {
            proto::len_field_size(FLOAT_LIST_VALUE, count * 4)
        };
        let feature_body = proto::len_field_size(FEATURE_FLOAT_LIST, float_list_body);
        let entry_body = proto::len_field_size(ENTRY_KEY, name.len())
            + proto::len_field_size(ENTRY_VALUE, feature_body);
        Self {
            name,
            count,
            float_list_body,
            feature_body,
            entry_body,
        }
    }

    fn write(&self, buf: &mut Vec<u8>, values: impl Iterator<Item = f32>) {
        proto::put_len_header(buf, FEATURES_ENTRY, self.entry_body);
        proto::put_len_header(buf, ENTRY_KEY, self.name.len());
        buf.extend_from_slice(self.name.as_bytes());
        proto::put_len_header(buf, ENTRY_VALUE, self.feature_body);
        proto::put_len_header(buf, FEATURE_FLOAT_LIST, self.float_list_body);
        if self.count > 0 {
            proto::put_len_header(buf, FLOAT_LIST_VALUE, self.count * 4);
            for value in values {
                proto::put_f32(buf, value);
            }
        }
    }
}

fn decode_features(
    body: &[u8],
    out: &mut BTreeMap<String, Vec<f32>>,
) -> Result<(), RecordError> {
    let mut features = FieldReader::new(body);
    while let Some((field, value)) = features.next_field()? {
        let (FEATURES_ENTRY, FieldValue::Bytes(entry)) = (field, value) else {
            continue;
        };

        let mut key = None;
        let mut values = None;
        let mut reader = FieldReader::new(entry);
        while let Some((field, value)) = reader.next_field()? {
            match (field, value) {
                (ENTRY_KEY, FieldValue::Bytes(bytes)) => {
                    let name = std::str::from_utf8(bytes)
                        .map_err(|_| RecordError::Malformed("feature name is not utf-8"))?;
                    key = Some(name.to_string());
                }
                (ENTRY_VALUE, FieldValue::Bytes(feature)) => values = decode_feature(feature)?,
                _ => {}
            }
        }

        if let (Some(key), Some(values)) = (key, values) {
            out.insert(key, values);
        }
    }
    Ok(())
}

/// Returns the float list of a `Feature`, or `None` for other kinds.
fn decode_feature(body: &[u8]) -> Result<Option<Vec<f32>>, RecordError> {
    let mut reader = FieldReader::new(body);
    let mut values = None;
    while let Some((field, value)) = reader.next_field()? {
        let (FEATURE_FLOAT_LIST, FieldValue::Bytes(list)) = (field, value) else {
            continue;
        };
        let floats = values.get_or_insert_with(Vec::new);
        let mut list = FieldReader::new(list);
        while let Some((field, value)) = list.next_field()? {
            match (field, value) {
                (FLOAT_LIST_VALUE, FieldValue::Bytes(packed)) => {
                    if packed.len() % 4 != 0 {
                        return Err(RecordError::Malformed("packed floats not a multiple of 4"));
                    }
                    floats.extend(packed.chunks_exact(4).map(LittleEndian::read_f32));
                }
                (FLOAT_LIST_VALUE, FieldValue::Fixed32(bits)) => floats.push(f32::from_bits(bits)),
                _ => {}
            }
        }
    }
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{ArrayD, IxDyn};

    fn bits(values: &[f32]) -> Vec<u32> {
        values.iter().map(|v| v.to_bits()).collect()
    }

    #[test]
    fn round_trip_is_bit_exact() {
        let voxels = vec![
            0.0,
            -0.0,
            1.0e-38,
            f32::MIN_POSITIVE / 2.0,
            f32::MAX,
            f32::INFINITY,
            f32::NAN,
            3.25,
        ];
        let cube = ArrayD::from_shape_vec(IxDyn(&[2, 2, 2]), voxels.clone()).unwrap();
        let params = [0.3, 0.8, -1.5, 0.0];

        let record = Record::decode_file(&encode_record(&cube.view(), &params)).unwrap();
        assert_eq!(bits(record.x().unwrap()), bits(&voxels));
        assert_eq!(bits(record.y().unwrap()), bits(&params));
    }

    #[test]
    fn flattens_in_logical_order_for_strided_views() {
        let data = ArrayD::from_shape_vec(IxDyn(&[2, 2, 2]), (0..8).map(|v| v as f32).collect())
            .unwrap();
        let transposed = data.t();
        let record = Record::decode_file(&encode_record(&transposed, &[])).unwrap();
        let expected: Vec<f32> = transposed.iter().copied().collect();
        assert_eq!(record.x().unwrap(), expected.as_slice());
        assert_eq!(record.x().unwrap()[1], 4.0);
    }

    #[test]
    fn empty_feature_is_present_but_empty() {
        let cube = ArrayD::<f32>::zeros(IxDyn(&[1, 1, 1]));
        let record = Record::decode_file(&encode_record(&cube.view(), &[])).unwrap();
        assert_eq!(record.y().unwrap(), &[] as &[f32]);
        assert_eq!(record.x().unwrap(), &[0.0f32]);
    }

    #[test]
    fn encoded_bytes_match_reference_layout() {
        let cube = ArrayD::from_shape_vec(IxDyn(&[1, 1, 1]), vec![1.0]).unwrap();
        let bytes = encode_record(&cube.view(), &[2.0]);
        let frames = tfrecord::read_frames(&bytes).unwrap();

        // Example{features{feature{key:"x" value{float_list{value:1.0}}}
        //                  feature{key:"y" value{float_list{value:2.0}}}}}
        let expected: Vec<u8> = [
            &[0x0a, 0x1e][..],
            &[0x0a, 0x0d, 0x0a, 0x01, b'x', 0x12, 0x08, 0x12, 0x06, 0x0a, 0x04][..],
            &1.0f32.to_le_bytes()[..],
        ]
        .concat();
        assert_eq!(&frames[0][..expected.len()], expected.as_slice());
        assert_eq!(frames[0].len(), 2 + 2 * 15);
    }

    #[test]
    fn accepts_unpacked_floats_and_unknown_fields() {
        // FloatList with two unpacked values
        let mut float_list = Vec::new();
        for v in [1.5f32, -2.0] {
            proto::put_varint(&mut float_list, proto::tag(1, proto::WIRE_FIXED32));
            proto::put_f32(&mut float_list, v);
        }
        let mut feature = Vec::new();
        proto::put_len_header(&mut feature, 2, float_list.len());
        feature.extend_from_slice(&float_list);
        let mut entry = Vec::new();
        proto::put_len_header(&mut entry, 1, 1);
        entry.push(b'y');
        proto::put_len_header(&mut entry, 2, feature.len());
        entry.extend_from_slice(&feature);
        let mut features = Vec::new();
        proto::put_len_header(&mut features, 1, entry.len());
        features.extend_from_slice(&entry);
        let mut example = Vec::new();
        proto::put_varint(&mut example, proto::tag(7, proto::WIRE_VARINT));
        proto::put_varint(&mut example, 42);
        proto::put_len_header(&mut example, 1, features.len());
        example.extend_from_slice(&features);

        let record = Record::decode_example(&example).unwrap();
        assert_eq!(record.y().unwrap(), &[1.5f32, -2.0]);
        assert!(matches!(record.x(), Err(RecordError::MissingFeature(_))));
    }

    #[test]
    fn decode_file_requires_single_record() {
        let cube = ArrayD::<f32>::zeros(IxDyn(&[1, 1, 1]));
        let one = encode_record(&cube.view(), &[1.0]);
        let two = [one.clone(), one].concat();
        assert_eq!(decode_records(&two).unwrap().len(), 2);
        assert!(matches!(Record::decode_file(&two), Err(RecordError::RecordCount(2))));
    }
}
