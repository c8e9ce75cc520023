//! The per-schema field loop shared by intra, inter and slow frames.

use std::io::Read;

use crate::blackbox::definition::{
    FieldDefinition, FieldEncoding, FieldPredictor, LogDefinition, FIELD_ITERATION,
};
use crate::blackbox::frame::FrameError;
use crate::blackbox::predictor::apply_prediction;
use crate::stream::{sign_extend_14bit, Decoder};

/// Decode one frame body by walking `fields` in order, reading each
/// column's encoding and applying its predictor.
///
/// Grouped encodings (TAG8_8SVB, TAG2_3S32, TAG8_4S16) fill several
/// adjacent columns from a single read; the loop then skips the
/// columns already populated. `skipped_frames` is the number of
/// intentionally absent loop iterations in front of this frame and
/// feeds the Increment predictor. With `raw` set, every predictor
/// except `loopIteration`'s Increment is replaced by Zero so the
/// output shows literal deltas.
pub fn parse_state_frame<R: Read>(
    def: &LogDefinition,
    fields: &[FieldDefinition],
    prev1: Option<&[i32]>,
    prev2: Option<&[i32]>,
    dec: &mut Decoder<R>,
    raw: bool,
    skipped_frames: i32,
) -> Result<Vec<i32>, FrameError> {
    let mut values = vec![0i32; fields.len()];
    let mut skip = 0usize;

    for (i, field) in fields.iter().enumerate() {
        // Columns already filled by a grouped read in a previous turn.
        if skip > 0 {
            skip -= 1;
            continue;
        }

        let mut predictor = field.predictor;
        if raw && field.name != FIELD_ITERATION {
            predictor = FieldPredictor::Zero;
        }

        if predictor == FieldPredictor::Increment {
            let previous = prev1.map(|p| p[i]).unwrap_or(0);
            values[i] = previous.wrapping_add(skipped_frames).wrapping_add(1);
            continue;
        }

        let delta = match field.encoding {
            FieldEncoding::SignedVb => dec.read_signed_vb()?,

            FieldEncoding::UnsignedVb => dec.read_unsigned_vb()? as i32,

            FieldEncoding::Neg14Bits => {
                -sign_extend_14bit(dec.read_unsigned_vb()? as u16)
            }

            FieldEncoding::Tag8_8Svb => {
                let group = field.group_count.max(1);
                let deltas = dec.read_tag8_8svb(group)?;
                for (j, delta) in deltas.iter().enumerate().take(group) {
                    if i + j >= values.len() {
                        break;
                    }
                    values[i + j] =
                        apply_prediction(def, &values, i + j, predictor, *delta, prev1, prev2)?;
                }
                skip = group - 1;
                continue;
            }

            FieldEncoding::Tag2_3S32 => {
                let deltas = dec.read_tag2_3s32()?;
                for (j, delta) in deltas.iter().enumerate().take(3) {
                    if i + j >= values.len() {
                        break;
                    }
                    values[i + j] =
                        apply_prediction(def, &values, i + j, predictor, *delta, prev1, prev2)?;
                }
                skip = 2;
                continue;
            }

            FieldEncoding::Tag8_4S16 => {
                if def.data_version == 1 {
                    return Err(FrameError::NotImplemented {
                        what: "TAG8_4S16 v1 (data version 1)",
                    });
                }
                let deltas = dec.read_tag8_4s16_v2()?;
                for (j, delta) in deltas.iter().enumerate().take(4) {
                    if i + j >= values.len() {
                        break;
                    }
                    values[i + j] =
                        apply_prediction(def, &values, i + j, predictor, *delta, prev1, prev2)?;
                }
                skip = 3;
                continue;
            }

            FieldEncoding::Null => 0,

            other => {
                return Err(FrameError::UnsupportedEncoding {
                    encoding: other.raw(),
                    field: field.name.clone(),
                })
            }
        };

        values[i] = apply_prediction(def, &values, i, predictor, delta, prev1, prev2)?;
    }

    Ok(values)
}
