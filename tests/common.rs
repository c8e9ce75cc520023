//! Shared fixtures: a realistic 38-column main-frame schema and the
//! encoded frames that go with it, used by the end-to-end decode
//! tests.

#![allow(dead_code)]

use bbdecode::blackbox::{
    FieldDefinition, FieldEncoding, FieldPredictor, LogDefinition, Sysconfig,
};

pub const ENCODED_FRAME_I: [u8; 51] = [
    73, 128, 163, 3, 251, 171, 176, 26, 0, 4, 0, 6, 3, 3, 10, 6, 0, 0, 0, 3, 0, 0, 192, 9, 1, 0,
    0, 176, 3, 233, 1, 166, 11, 145, 6, 1, 3, 0, 54, 116, 250, 34, 4, 14, 0, 0, 140, 3, 35, 36,
    38,
];

pub const ENCODED_FRAMES_P: [&[u8]; 6] = [
    &[
        80, 222, 7, 1, 0, 0, 0, 0, 28, 0, 0, 0, 0, 0, 0, 2, 0, 0, 1, 7, 7, 4, 12, 2, 0, 58, 51,
        56, 61,
    ],
    &[
        80, 24, 2, 6, 0, 0, 1, 20, 0, 0, 0, 0, 0, 0, 3, 3, 0, 0, 3, 3, 1, 6, 2, 0, 72, 79, 80,
        67,
    ],
    &[
        80, 27, 0, 4, 0, 0, 8, 18, 0, 0, 0, 0, 0, 0, 1, 3, 0, 0, 3, 3, 3, 7, 0, 0, 48, 75, 78,
        47,
    ],
    &[
        80, 20, 0, 3, 0, 0, 1, 2, 0, 0, 0, 0, 0, 0, 2, 0, 1, 0, 1, 1, 1, 13, 0, 0, 16, 11, 18,
        17,
    ],
    &[
        80, 5, 3, 9, 0, 0, 11, 25, 0, 0, 0, 0, 0, 3, 82, 71, 2, 8, 1, 0, 1, 0, 3, 17, 0, 0, 35,
        98, 97, 38,
    ],
    &[
        80, 6, 2, 0, 0, 0, 11, 47, 0, 0, 0, 0, 0, 0, 0, 4, 2, 0, 0, 0, 5, 19, 1, 0, 87, 156, 1,
        155, 1, 90,
    ],
];

/// `E` frame bodies: a logging-resume event, a sync-beep event and a
/// clean log end.
pub const ENCODED_EVENT_LOGGING_RESUME: [u8; 9] = [69, 14, 128, 158, 3, 248, 201, 166, 26];
pub const ENCODED_EVENT_SYNC_BEEP: [u8; 6] = [69, 0, 145, 139, 246, 19];
pub const ENCODED_EVENT_LOG_END: [u8; 14] = [
    69, 255, b'E', b'n', b'd', b' ', b'o', b'f', b' ', b'l', b'o', b'g', 0, 0,
];

pub const DECODED_RAW_FRAME_I: [i32; 38] = [
    53632, 55318011, 0, 2, 0, 3, -2, -2, 5, 3, 0, 0, 0, -2, 0, 0, 1216, -1, 0, 0, 216, -233, 723,
    785, -1, -2, 0, 27, 58, 2237, 2, 7, 0, 0, 396, -18, 18, 19,
];

pub const DECODED_RAW_FRAME_P: [i32; 38] = [
    1, 495, -1, 0, 0, 0, 0, 0, 0, 14, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 1, 0, 0, -1, -4,
    -4, 2, 6, 1, 0, 29, -26, 28, -31,
];

pub const DECODED_PREDICTED_FRAME_I: [i32; 38] = [
    53632, 55318011, 0, 2, 0, 3, -2, -2, 5, 3, 0, 0, 0, -2, 0, 0, 1216, -1, 0, 0, 216, 1632, 723,
    785, -1, -2, 0, 27, 58, 2237, 2, 7, 0, 0, 584, 566, 602, 603,
];

pub const DECODED_PREDICTED_FRAMES_P: [[i32; 38]; 6] = [
    [
        53633, 55318506, -1, 2, 0, 3, -2, -2, 5, 17, 0, 0, 0, -2, 0, 0, 1216, -1, 0, 0, 216,
        1632, 723, 785, 0, -2, 0, 26, 54, 2233, 4, 13, 1, 0, 613, 540, 630, 572,
    ],
    [
        53634, 55319013, 0, 5, 0, 3, -2, -2, 4, 27, 0, 0, 0, -2, 0, 0, 1216, -1, 0, 0, 216, 1632,
        723, 785, -2, -4, 0, 26, 54, 2233, 2, 13, 1, 0, 634, 513, 656, 553,
    ],
    [
        53635, 55319506, 0, 7, 0, 3, -2, -2, 8, 36, 0, 0, 0, -2, 0, 0, 1216, -1, 0, 0, 216, 1632,
        723, 785, -2, -5, 0, 26, 52, 2231, 1, 9, 1, 0, 647, 488, 682, 538,
    ],
    [
        53636, 55320009, 0, 5, 0, 3, -2, -2, 7, 37, 0, 0, 0, -2, 0, 0, 1216, -1, 0, 0, 216, 1632,
        723, 785, -1, -4, -1, 26, 52, 2231, 0, 4, 1, 0, 648, 494, 678, 536,
    ],
    [
        53637, 55320509, -2, 0, 0, 3, -2, -2, 1, 24, 0, 0, 0, -2, 0, 0, 1216, -1, 0, 0, 216,
        1673, 687, 785, 0, 0, -1, 26, 51, 2231, -2, -3, 1, 0, 629, 540, 631, 556,
    ],
    [
        53638, 55321012, -1, 0, 0, 3, -2, -2, -5, 0, 0, 0, 0, -2, 0, 0, 1216, -1, 0, 0, 216,
        1673, 687, 785, 0, 0, 0, 26, 51, 2231, -4, -10, 0, 0, 594, 595, 576, 591,
    ],
];

pub fn build_stream(parts: &[&[u8]]) -> Vec<u8> {
    parts.concat()
}

fn field(name: &str, encoding: FieldEncoding, predictor: FieldPredictor) -> FieldDefinition {
    FieldDefinition {
        encoding,
        predictor,
        ..FieldDefinition::named(name)
    }
}

/// A 38-column main-frame schema matching the encoded fixtures above:
/// the usual Cleanflight column set with unsigned iteration/time,
/// tagged group encodings in the inter frames and battery calibration
/// constants.
pub fn dummy_definition() -> LogDefinition {
    use FieldEncoding::*;
    use FieldPredictor::*;

    let sysconfig = Sysconfig {
        motor_output_low: 188,
        motor_output_high: 1850,
        vbat_min_cell_voltage: 330u16 as u8,
        vbat_max_cell_voltage: 440u16 as u8,
        vbat_warning_cell_voltage: 350u16 as u8,
        current_meter_offset: 0,
        current_meter_scale: 282,
        vbat_ref: 1865,
        firmware_type: "Cleanflight".to_string(),
        frame_interval_i: 1,
        frame_interval_p_num: 1,
        frame_interval_p_denom: 1,
        ..Sysconfig::default()
    };

    let fields_i = vec![
        field("loopIteration", UnsignedVb, Zero),
        field("time", UnsignedVb, Zero),
        field("axisP[0]", SignedVb, Zero),
        field("axisP[1]", SignedVb, Zero),
        field("axisP[2]", SignedVb, Zero),
        field("axisI[0]", SignedVb, Zero),
        field("axisI[1]", SignedVb, Zero),
        field("axisI[2]", SignedVb, Zero),
        field("axisD[0]", SignedVb, Zero),
        field("axisD[1]", SignedVb, Zero),
        field("axisF[0]", SignedVb, Zero),
        field("axisF[1]", SignedVb, Zero),
        field("axisF[2]", SignedVb, Zero),
        field("rcCommand[0]", SignedVb, Zero),
        field("rcCommand[1]", SignedVb, Zero),
        field("rcCommand[2]", SignedVb, Zero),
        field("rcCommand[3]", UnsignedVb, Zero),
        field("setpoint[0]", SignedVb, Zero),
        field("setpoint[1]", SignedVb, Zero),
        field("setpoint[2]", SignedVb, Zero),
        field("setpoint[3]", SignedVb, Zero),
        field("vbatLatest", Neg14Bits, VbatRef),
        field("amperageLatest", SignedVb, Zero),
        field("rssi", UnsignedVb, Zero),
        field("gyroADC[0]", SignedVb, Zero),
        field("gyroADC[1]", SignedVb, Zero),
        field("gyroADC[2]", SignedVb, Zero),
        field("accSmooth[0]", SignedVb, Zero),
        field("accSmooth[1]", SignedVb, Zero),
        field("accSmooth[2]", SignedVb, Zero),
        field("debug[0]", SignedVb, Zero),
        field("debug[1]", SignedVb, Zero),
        field("debug[2]", SignedVb, Zero),
        field("debug[3]", SignedVb, Zero),
        field("motor[0]", UnsignedVb, MinMotor),
        field("motor[1]", SignedVb, Motor0),
        field("motor[2]", SignedVb, Motor0),
        field("motor[3]", SignedVb, Motor0),
    ];

    let fields_p = vec![
        field("loopIteration", Null, Increment),
        field("time", SignedVb, StraightLine),
        field("axisP[0]", SignedVb, Previous),
        field("axisP[1]", SignedVb, Previous),
        field("axisP[2]", SignedVb, Previous),
        field("axisI[0]", Tag2_3S32, Previous),
        field("axisI[1]", Tag2_3S32, Previous),
        field("axisI[2]", Tag2_3S32, Previous),
        field("axisD[0]", SignedVb, Previous),
        field("axisD[1]", SignedVb, Previous),
        field("axisF[0]", SignedVb, Previous),
        field("axisF[1]", SignedVb, Previous),
        field("axisF[2]", SignedVb, Previous),
        field("rcCommand[0]", Tag8_4S16, Previous),
        field("rcCommand[1]", Tag8_4S16, Previous),
        field("rcCommand[2]", Tag8_4S16, Previous),
        field("rcCommand[3]", Tag8_4S16, Previous),
        field("setpoint[0]", Tag8_4S16, Previous),
        field("setpoint[1]", Tag8_4S16, Previous),
        field("setpoint[2]", Tag8_4S16, Previous),
        field("setpoint[3]", Tag8_4S16, Previous),
        field("vbatLatest", Tag8_8Svb, Previous),
        field("amperageLatest", Tag8_8Svb, Previous),
        field("rssi", Tag8_8Svb, Previous),
        field("gyroADC[0]", SignedVb, Average2),
        field("gyroADC[1]", SignedVb, Average2),
        field("gyroADC[2]", SignedVb, Average2),
        field("accSmooth[0]", SignedVb, Average2),
        field("accSmooth[1]", SignedVb, Average2),
        field("accSmooth[2]", SignedVb, Average2),
        field("debug[0]", SignedVb, Average2),
        field("debug[1]", SignedVb, Average2),
        field("debug[2]", SignedVb, Average2),
        field("debug[3]", SignedVb, Average2),
        field("motor[0]", SignedVb, Average2),
        field("motor[1]", SignedVb, Average2),
        field("motor[2]", SignedVb, Average2),
        field("motor[3]", SignedVb, Average2),
    ];

    let mut def = LogDefinition {
        product: "Blackbox flight data recorder".to_string(),
        data_version: 2,
        fields_i,
        fields_p,
        sysconfig,
        ..LogDefinition::default()
    };
    def.headers = vec![
        ("I interval".to_string(), "128".to_string()),
        ("P interval".to_string(), "2".to_string()),
        ("P ratio".to_string(), "64".to_string()),
    ];
    def.compute_group_counts();
    def.index_fields();
    def
}
