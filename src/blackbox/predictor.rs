//! Reconstruction of absolute field values from on-wire deltas.

use crate::blackbox::definition::{FieldPredictor, LogDefinition, FIELD_MOTOR0};
use crate::blackbox::frame::FrameError;

/// Apply `predictor` to a decoded delta and return the reconstructed
/// value. `current` is the frame under construction (needed by the
/// Motor0 predictor), `prev1`/`prev2` are the value vectors of the
/// last two accepted main frames, newest first.
///
/// Arithmetic is done in 64 bits and truncated back, so extreme values
/// wrap like the 32-bit encoder instead of aborting.
pub fn apply_prediction(
    def: &LogDefinition,
    current: &[i32],
    index: usize,
    predictor: FieldPredictor,
    delta: i32,
    prev1: Option<&[i32]>,
    prev2: Option<&[i32]>,
) -> Result<i32, FrameError> {
    let delta = i64::from(delta);
    let result = match predictor {
        FieldPredictor::Zero => delta,

        FieldPredictor::Previous => match prev1 {
            Some(prev) => delta + i64::from(prev[index]),
            None => delta,
        },

        FieldPredictor::StraightLine => match (prev1, prev2) {
            (Some(p1), Some(p2)) => delta + 2 * i64::from(p1[index]) - i64::from(p2[index]),
            _ => delta,
        },

        FieldPredictor::Average2 => match (prev1, prev2) {
            (Some(p1), Some(p2)) => delta + (i64::from(p1[index]) + i64::from(p2[index])) / 2,
            _ => delta,
        },

        FieldPredictor::MinThrottle => delta + i64::from(def.sysconfig.min_throttle),

        FieldPredictor::Motor0 => {
            let motor0 = def
                .field_position(FIELD_MOTOR0)
                .ok_or_else(|| FrameError::UnknownField {
                    name: FIELD_MOTOR0.to_string(),
                })?;
            delta + i64::from(current[motor0])
        }

        FieldPredictor::Fixed1500 => delta + 1500,

        FieldPredictor::VbatRef => delta + i64::from(def.sysconfig.vbat_ref),

        FieldPredictor::MinMotor => delta + i64::from(def.sysconfig.motor_output_low),

        // Increment is resolved by the frame assembler before any
        // bytes are decoded; reaching it here is a schema error.
        FieldPredictor::Increment | FieldPredictor::Unknown(_) => {
            return Err(FrameError::UnsupportedPredictor {
                predictor: predictor.raw(),
            })
        }
    };
    Ok(result as i32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blackbox::definition::FieldDefinition;

    fn def_with_motor0() -> LogDefinition {
        let mut def = LogDefinition {
            fields_i: vec![
                FieldDefinition::named("loopIteration"),
                FieldDefinition::named(FIELD_MOTOR0),
            ],
            ..LogDefinition::default()
        };
        def.sysconfig.min_throttle = 1000;
        def.sysconfig.vbat_ref = 1865;
        def.sysconfig.motor_output_low = 188;
        def.index_fields();
        def
    }

    #[test]
    fn history_free_predictors() {
        let def = def_with_motor0();
        let apply = |predictor, delta| {
            apply_prediction(&def, &[0, 740], 1, predictor, delta, None, None).unwrap()
        };
        assert_eq!(apply(FieldPredictor::Zero, 7), 7);
        assert_eq!(apply(FieldPredictor::MinThrottle, 7), 1007);
        assert_eq!(apply(FieldPredictor::Fixed1500, -30), 1470);
        assert_eq!(apply(FieldPredictor::VbatRef, 10), 1875);
        assert_eq!(apply(FieldPredictor::MinMotor, 12), 200);
        assert_eq!(apply(FieldPredictor::Motor0, -40), 700);
    }

    #[test]
    fn history_predictors_degrade_without_frames() {
        let def = def_with_motor0();
        for predictor in [
            FieldPredictor::Previous,
            FieldPredictor::StraightLine,
            FieldPredictor::Average2,
        ] {
            assert_eq!(
                apply_prediction(&def, &[0, 0], 0, predictor, 42, None, None).unwrap(),
                42
            );
        }
    }

    #[test]
    fn history_predictors_with_frames() {
        let def = def_with_motor0();
        let p1 = vec![100, 10];
        let p2 = vec![80, 4];
        let apply = |predictor, delta| {
            apply_prediction(
                &def,
                &[0, 0],
                0,
                predictor,
                delta,
                Some(&p1),
                Some(&p2),
            )
            .unwrap()
        };
        assert_eq!(apply(FieldPredictor::Previous, 5), 105);
        assert_eq!(apply(FieldPredictor::StraightLine, 5), 125);
        assert_eq!(apply(FieldPredictor::Average2, 5), 95);
    }

    #[test]
    fn average_truncates_toward_zero() {
        let def = def_with_motor0();
        let p1 = vec![-1];
        let p2 = vec![-2];
        assert_eq!(
            apply_prediction(
                &def,
                &[0],
                0,
                FieldPredictor::Average2,
                0,
                Some(&p1),
                Some(&p2)
            )
            .unwrap(),
            -1
        );
    }

    #[test]
    fn unknown_predictor_is_an_error() {
        let def = def_with_motor0();
        let err =
            apply_prediction(&def, &[0], 0, FieldPredictor::Unknown(7), 0, None, None)
                .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported field predictor 7");
    }

    #[test]
    fn motor0_requires_the_column() {
        let def = LogDefinition::default();
        let err = apply_prediction(&def, &[0], 0, FieldPredictor::Motor0, 0, None, None)
            .unwrap_err();
        assert!(matches!(err, FrameError::UnknownField { .. }));
    }
}
