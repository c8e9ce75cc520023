//! Parser for the plain-text header prologue of a log.
//!
//! Headers are ASCII lines of the form `H <key>:<value>\n` in front of
//! the binary frame stream. They carry the per-log field schema
//! (names, signedness, encoding and predictor tags for the I, P and S
//! frames) plus calibration constants. The header block ends at the
//! first byte that is not an `'H'`.

use std::io::Read;

use log::debug;

use crate::blackbox::definition::{FieldDefinition, FieldEncoding, FieldPredictor, LogDefinition};
use crate::stream::{Decoder, StreamError};

/// Errors that abort header processing. No partial schema is returned
/// past one of these.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    #[error(transparent)]
    Stream(#[from] StreamError),

    #[error("could not parse header line '{line}'")]
    Malformed { line: String },

    #[error("Could not parse {key} '{raw}'")]
    Value { key: String, raw: String },
}

impl HeaderError {
    fn value(key: &str, raw: &str) -> Self {
        Self::Value {
            key: key.to_string(),
            raw: raw.to_string(),
        }
    }
}

/// Reads the header block off the front of a stream and produces the
/// [`LogDefinition`] for the frames that follow.
pub struct HeaderReader<'a, R> {
    dec: &'a mut Decoder<R>,
    def: LogDefinition,
}

impl<'a, R: Read> HeaderReader<'a, R> {
    pub fn new(dec: &'a mut Decoder<R>) -> Self {
        Self {
            dec,
            def: LogDefinition::default(),
        }
    }

    /// Consume every header line and return the completed definition.
    /// The decoder is left positioned on the first frame type byte.
    pub fn process_headers(mut self) -> Result<LogDefinition, HeaderError> {
        loop {
            match self.dec.peek_byte() {
                Ok(b'H') => {}
                Ok(_) => break,
                Err(StreamError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
            let line = self.read_line()?;
            self.parse_header(&line)?;
        }

        self.def.compute_group_counts();
        self.def.index_fields();
        Ok(self.def)
    }

    fn read_line(&mut self) -> Result<String, HeaderError> {
        let mut raw = Vec::new();
        loop {
            let byte = self.dec.read_byte()?;
            if byte == b'\n' {
                break;
            }
            raw.push(byte);
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }

    fn parse_header(&mut self, line: &str) -> Result<(), HeaderError> {
        let (key, value) = split_header_line(line).ok_or_else(|| HeaderError::Malformed {
            line: line.to_string(),
        })?;
        debug!("header {key}: {value}");

        match key {
            "Product" => self.def.product = value.to_string(),

            "Firmware type" => self.def.sysconfig.firmware_type = value.to_string(),

            "Data version" => self.def.data_version = parse_int(key, value)?,

            "Field I name" => {
                for name in value.split(',') {
                    let field = FieldDefinition::named(name);
                    self.def.fields_i.push(field.clone());
                    self.def.fields_p.push(field);
                }
            }
            "Field I signed" => assign_signed(&mut self.def.fields_i, key, value)?,
            "Field I predictor" => assign_predictors(&mut self.def.fields_i, key, value)?,
            "Field I encoding" => assign_encodings(&mut self.def.fields_i, key, value)?,

            "Field P predictor" => assign_predictors(&mut self.def.fields_p, key, value)?,
            "Field P encoding" => assign_encodings(&mut self.def.fields_p, key, value)?,

            "Field S name" => {
                for name in value.split(',') {
                    self.def.fields_s.push(FieldDefinition::named(name));
                }
            }
            "Field S signed" => assign_signed(&mut self.def.fields_s, key, value)?,
            "Field S predictor" => assign_predictors(&mut self.def.fields_s, key, value)?,
            "Field S encoding" => assign_encodings(&mut self.def.fields_s, key, value)?,

            // Calibration values are parsed wide and truncated to the
            // field width the firmware uses.
            "vbatref" => {
                let vbatref: i64 = parse_int(key, value)?;
                self.def.sysconfig.vbat_ref = vbatref as u16;
            }

            "vbatcellvoltage" => {
                self.def
                    .headers
                    .push((key.to_string(), value.to_string()));
                let [min, warning, max] = parse_parts(key, value, ',')?;
                self.def.sysconfig.vbat_min_cell_voltage = min as u8;
                self.def.sysconfig.vbat_warning_cell_voltage = warning as u8;
                self.def.sysconfig.vbat_max_cell_voltage = max as u8;
            }

            "currentMeter" => {
                self.def
                    .headers
                    .push((key.to_string(), value.to_string()));
                let [offset, scale] = parse_parts(key, value, ',')?;
                self.def.sysconfig.current_meter_offset = offset as u16;
                self.def.sysconfig.current_meter_scale = scale as u16;
            }

            "motorOutput" => {
                self.def
                    .headers
                    .push((key.to_string(), value.to_string()));
                let [low, high] = parse_parts(key, value, ',')?;
                self.def.sysconfig.motor_output_low = low as i32;
                self.def.sysconfig.motor_output_high = high as i32;
            }

            "I interval" => {
                let interval: i32 = parse_int(key, value)?;
                self.def.sysconfig.frame_interval_i = interval.max(1);
            }

            "P interval" => {
                if let Some((num, denom)) = value.split_once('/') {
                    self.def.sysconfig.frame_interval_p_num = parse_int(key, num)?;
                    self.def.sysconfig.frame_interval_p_denom = parse_int(key, denom)?;
                }
            }

            _ => self
                .def
                .headers
                .push((key.to_string(), value.to_string())),
        }
        Ok(())
    }
}

fn split_header_line(line: &str) -> Option<(&str, &str)> {
    line.strip_prefix("H ")?.split_once(':')
}

fn parse_int<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T, HeaderError> {
    raw.trim().parse().map_err(|_| HeaderError::value(key, raw))
}

/// Parse exactly N separator-delimited integers, e.g. the three parts
/// of `vbatcellvoltage`.
fn parse_parts<const N: usize>(
    key: &str,
    raw: &str,
    separator: char,
) -> Result<[i64; N], HeaderError> {
    let mut out = [0i64; N];
    let mut parts = raw.split(separator);
    for slot in out.iter_mut() {
        let part = parts.next().ok_or_else(|| HeaderError::value(key, raw))?;
        *slot = parse_int(key, part)?;
    }
    Ok(out)
}

fn assign_signed(
    fields: &mut [FieldDefinition],
    key: &str,
    value: &str,
) -> Result<(), HeaderError> {
    for (i, token) in value.split(',').enumerate() {
        let signed = match token.trim() {
            "0" | "false" => false,
            "1" | "true" => true,
            _ => return Err(HeaderError::value(key, value)),
        };
        if let Some(field) = fields.get_mut(i) {
            field.signed = signed;
        }
    }
    Ok(())
}

fn assign_predictors(
    fields: &mut [FieldDefinition],
    key: &str,
    value: &str,
) -> Result<(), HeaderError> {
    for (i, token) in value.split(',').enumerate() {
        let raw: i8 = token
            .trim()
            .parse()
            .map_err(|_| HeaderError::value(key, value))?;
        if let Some(field) = fields.get_mut(i) {
            field.predictor = FieldPredictor::from_raw(raw);
        }
    }
    Ok(())
}

fn assign_encodings(
    fields: &mut [FieldDefinition],
    key: &str,
    value: &str,
) -> Result<(), HeaderError> {
    for (i, token) in value.split(',').enumerate() {
        let raw: i8 = token
            .trim()
            .parse()
            .map_err(|_| HeaderError::value(key, value))?;
        if let Some(field) = fields.get_mut(i) {
            field.encoding = FieldEncoding::from_raw(raw);
        }
    }
    Ok(())
}
