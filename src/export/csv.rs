//! CSV rendering of decoded frames.
//!
//! One row per main frame: the main-frame columns followed by the most
//! recently seen slow-frame values, so every row carries the full
//! craft state. Event frames produce no output and error frames are
//! skipped; offsets and errors are the caller's concern.

use std::io::Write;

use crate::blackbox::{
    Frame, LogDefinition, MainFrame, FIELD_ITERATION, FIELD_TIME,
};
use crate::export::battery::BatteryState;
use crate::export::flags::render_slow_cell;

/// Column padding: battery columns right-aligned to 6, iteration and
/// time unpadded, the rest to 3.
const PAD_BATTERY: usize = 6;
const PAD_DEFAULT: usize = 3;

/// Streams decoded frames into CSV rows.
pub struct CsvExporter<W> {
    out: W,
    main_columns: Vec<String>,
    slow_columns: Vec<String>,
    header_row: String,
    iteration_index: Option<usize>,
    time_index: Option<usize>,
    vbat_index: Option<usize>,
    amperage_index: Option<usize>,
    battery: BatteryState,
    last_slow: Vec<i32>,
    frames_written: u64,
}

impl<W: Write> CsvExporter<W> {
    pub fn new(out: W, def: &LogDefinition) -> Self {
        let main_columns: Vec<String> =
            def.fields_i.iter().map(|f| f.name.clone()).collect();
        let slow_columns: Vec<String> =
            def.fields_s.iter().map(|f| f.name.clone()).collect();

        let header_row = main_columns
            .iter()
            .chain(slow_columns.iter())
            .map(|name| unit_for_field(name))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            out,
            iteration_index: def.field_position(FIELD_ITERATION),
            time_index: def.field_position(FIELD_TIME),
            vbat_index: def.field_position("vbatLatest"),
            amperage_index: def.field_position("amperageLatest"),
            battery: BatteryState::new(&def.sysconfig),
            last_slow: vec![0; slow_columns.len()],
            main_columns,
            slow_columns,
            header_row,
            frames_written: 0,
        }
    }

    /// Number of main and slow frames rendered so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }

    /// Write the column header row, unit-suffixed where applicable.
    pub fn write_headers(&mut self) -> std::io::Result<()> {
        writeln!(self.out, "{}", self.header_row)
    }

    /// Render one frame. Only error-free frames produce or update
    /// output.
    pub fn write_frame(&mut self, frame: &Frame) -> std::io::Result<()> {
        if frame.error().is_some() {
            return Ok(());
        }
        match frame {
            Frame::Slow(slow) => {
                self.frames_written += 1;
                self.last_slow = slow.values.clone();
                Ok(())
            }
            Frame::Main(main) => {
                self.frames_written += 1;
                self.write_main_row(main)
            }
            _ => Ok(()),
        }
    }

    fn write_main_row(&mut self, main: &MainFrame) -> std::io::Result<()> {
        let mut cells = Vec::with_capacity(self.main_columns.len() + self.last_slow.len());

        for (index, &value) in main.values.iter().enumerate() {
            let cell = if Some(index) == self.vbat_index {
                pad_to(PAD_BATTERY, format!("{:.3}", self.battery.vbat_volts(value)))
            } else if Some(index) == self.amperage_index {
                let amps = self.battery.set_latest_amperage(value, main.time_us);
                pad_to(PAD_BATTERY, format!("{amps:.3}"))
            } else if Some(index) == self.time_index {
                main.time_us.to_string()
            } else if Some(index) == self.iteration_index {
                value.to_string()
            } else {
                pad_to(PAD_DEFAULT, value.to_string())
            };
            cells.push(cell);
        }

        for (column, &value) in self.slow_columns.iter().zip(self.last_slow.iter()) {
            cells.push(render_slow_cell(column, value));
        }

        writeln!(self.out, "{}", cells.join(", "))
    }
}

/// Column header with the unit suffix consumers expect.
fn unit_for_field(name: &str) -> String {
    match name {
        "time" => format!("{name} (us)"),
        "vbatLatest" => format!("{name} (V)"),
        "amperageLatest" => format!("{name} (A)"),
        "energyCumulative" => format!("{name} (mAh)"),
        "flightModeFlags" | "stateFlags" | "failsafePhase" => format!("{name} (flags)"),
        _ => name.to_string(),
    }
}

fn pad_to(width: usize, cell: String) -> String {
    if cell.len() >= width {
        cell
    } else {
        format!("{}{}", " ".repeat(width - cell.len()), cell)
    }
}
