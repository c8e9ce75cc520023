//! The per-log field schema and calibration constants, built once by
//! the header parser and read-only afterwards.

use std::collections::HashMap;

/// Column name of the loop iteration counter.
pub const FIELD_ITERATION: &str = "loopIteration";
/// Column name of the microsecond timestamp.
pub const FIELD_TIME: &str = "time";
/// Column name the Motor0 predictor references.
pub const FIELD_MOTOR0: &str = "motor[0]";

/// On-wire field encodings recognised by the decoder.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldEncoding {
    SignedVb,
    UnsignedVb,
    Neg14Bits,
    Tag8_8Svb,
    Tag2_3S32,
    Tag8_4S16,
    Null,
    Unknown(i8),
}

impl FieldEncoding {
    pub fn from_raw(raw: i8) -> Self {
        match raw {
            0 => Self::SignedVb,
            1 => Self::UnsignedVb,
            3 => Self::Neg14Bits,
            6 => Self::Tag8_8Svb,
            7 => Self::Tag2_3S32,
            8 => Self::Tag8_4S16,
            9 => Self::Null,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> i8 {
        match self {
            Self::SignedVb => 0,
            Self::UnsignedVb => 1,
            Self::Neg14Bits => 3,
            Self::Tag8_8Svb => 6,
            Self::Tag2_3S32 => 7,
            Self::Tag8_4S16 => 8,
            Self::Null => 9,
            Self::Unknown(raw) => raw,
        }
    }
}

/// Rules for reconstructing an absolute field value from its on-wire
/// delta.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldPredictor {
    /// The delta is the value.
    Zero,
    /// Add the value from the previous main frame.
    Previous,
    /// Extrapolate the slope of the two previous main frames. Used for
    /// steadily increasing fields such as the timestamp.
    StraightLine,
    /// Add the average of the two previous main frames. Used for noisy
    /// fields such as gyro and motor outputs.
    Average2,
    /// Add the `minthrottle` calibration constant.
    MinThrottle,
    /// Add the value of `motor[0]` decoded earlier in this frame.
    Motor0,
    /// The field advances by one per loop iteration; no bytes are
    /// consumed. Applied to `loopIteration` only.
    Increment,
    /// Add the servo midpoint of 1500us.
    Fixed1500,
    /// Add the `vbatref` calibration constant.
    VbatRef,
    /// Add the low motor output calibration constant.
    MinMotor,
    Unknown(i8),
}

impl FieldPredictor {
    pub fn from_raw(raw: i8) -> Self {
        match raw {
            0 => Self::Zero,
            1 => Self::Previous,
            2 => Self::StraightLine,
            3 => Self::Average2,
            4 => Self::MinThrottle,
            5 => Self::Motor0,
            6 => Self::Increment,
            8 => Self::Fixed1500,
            9 => Self::VbatRef,
            11 => Self::MinMotor,
            other => Self::Unknown(other),
        }
    }

    pub fn raw(self) -> i8 {
        match self {
            Self::Zero => 0,
            Self::Previous => 1,
            Self::StraightLine => 2,
            Self::Average2 => 3,
            Self::MinThrottle => 4,
            Self::Motor0 => 5,
            Self::Increment => 6,
            Self::Fixed1500 => 8,
            Self::VbatRef => 9,
            Self::MinMotor => 11,
            Self::Unknown(raw) => raw,
        }
    }
}

/// One column of a frame schema.
#[derive(Clone, Debug)]
pub struct FieldDefinition {
    pub name: String,
    pub signed: bool,
    pub predictor: FieldPredictor,
    pub encoding: FieldEncoding,
    /// Width of the TAG8_8SVB run this field starts or participates
    /// in; zero for fields with other encodings.
    pub group_count: usize,
}

impl FieldDefinition {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            signed: false,
            predictor: FieldPredictor::Zero,
            encoding: FieldEncoding::SignedVb,
            group_count: 0,
        }
    }
}

/// Integer calibration constants carried by the header block, with the
/// firmware's defaults for anything the log does not override.
#[derive(Clone, Debug)]
pub struct Sysconfig {
    pub min_throttle: i32,
    pub max_throttle: i32,
    pub motor_output_low: i32,
    pub motor_output_high: i32,
    pub rc_rate: u32,
    pub yaw_rate: u32,
    pub acc_1g: u16,
    pub gyro_scale: f64,
    pub vbat_scale: u8,
    pub vbat_max_cell_voltage: u8,
    pub vbat_min_cell_voltage: u8,
    pub vbat_warning_cell_voltage: u8,
    pub current_meter_offset: u16,
    pub current_meter_scale: u16,
    pub vbat_ref: u16,
    pub firmware_type: String,
    pub frame_interval_i: i32,
    pub frame_interval_p_num: i32,
    pub frame_interval_p_denom: i32,
}

impl Default for Sysconfig {
    fn default() -> Self {
        Self {
            min_throttle: 1150,
            max_throttle: 1850,
            motor_output_low: 1150,
            motor_output_high: 1850,
            rc_rate: 90,
            yaw_rate: 0,
            acc_1g: 1,
            gyro_scale: 1.0,
            vbat_scale: 110,
            vbat_max_cell_voltage: 43,
            vbat_min_cell_voltage: 33,
            vbat_warning_cell_voltage: 35,
            current_meter_offset: 0,
            current_meter_scale: 400,
            vbat_ref: 4095,
            firmware_type: "Unknown firmware".to_string(),
            frame_interval_i: 1,
            frame_interval_p_num: 1,
            frame_interval_p_denom: 1,
        }
    }
}

/// Everything the header block says about a log: product and data
/// version, the three frame schemas, calibration constants and the
/// pass-through headers the decoder has no special handling for.
///
/// `fields_p` shares its column names with `fields_i`; only encodings
/// and predictors differ between the two.
#[derive(Clone, Debug, Default)]
pub struct LogDefinition {
    pub product: String,
    pub data_version: i32,
    pub fields_i: Vec<FieldDefinition>,
    pub fields_p: Vec<FieldDefinition>,
    pub fields_s: Vec<FieldDefinition>,
    pub headers: Vec<(String, String)>,
    pub sysconfig: Sysconfig,
    /// Column name -> position over `fields_i`, rebuilt by
    /// [`index_fields`](Self::index_fields).
    pub field_index: HashMap<String, usize>,
}

impl LogDefinition {
    /// Position of an I-frame column by name.
    pub fn field_position(&self, name: &str) -> Option<usize> {
        self.field_index.get(name).copied()
    }

    /// Value of a pass-through header by name.
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Rebuild the column-name index over `fields_i`. Called once when
    /// the header block is complete.
    pub fn index_fields(&mut self) {
        self.field_index = self
            .fields_i
            .iter()
            .enumerate()
            .map(|(i, field)| (field.name.clone(), i))
            .collect();
    }

    /// Assign TAG8_8SVB run widths in both main schemas. A run is a
    /// maximal sequence of adjacent TAG8_8SVB columns, capped at 8;
    /// every member carries the run width.
    pub fn compute_group_counts(&mut self) {
        compute_group_counts(&mut self.fields_i);
        compute_group_counts(&mut self.fields_p);
    }
}

fn compute_group_counts(fields: &mut [FieldDefinition]) {
    let mut i = 0;
    while i < fields.len() {
        if fields[i].encoding != FieldEncoding::Tag8_8Svb {
            i += 1;
            continue;
        }
        let mut run = 1;
        while run < 8
            && i + run < fields.len()
            && fields[i + run].encoding == FieldEncoding::Tag8_8Svb
        {
            run += 1;
        }
        for field in &mut fields[i..i + run] {
            field.group_count = run;
        }
        i += run;
    }
}
