//! Decoder for the variant structure inside event (`E`) frames.

use std::io::Read;

use crate::blackbox::frame::{EventKind, EventValue, EventValues, FrameError};
use crate::stream::Decoder;

/// Number of payload bytes carried by a LogEnd event
/// (`"End of log\0"` padded).
const LOG_END_PAYLOAD_LEN: usize = 12;

/// Read one event frame body: the event-kind byte followed by a
/// kind-specific payload. Always reports the kind that was read (when
/// it could be read at all) so the caller can account for the bytes.
pub fn parse_event_frame<R: Read>(
    dec: &mut Decoder<R>,
) -> (EventKind, EventValues, Option<FrameError>) {
    let mut values = EventValues::new();

    let kind = match dec.read_byte() {
        Ok(byte) => EventKind::from_byte(byte),
        Err(err) => return (EventKind::Unknown(0), values, Some(err.into())),
    };

    let error = match kind {
        EventKind::SyncBeep => read_sync_beep(dec, &mut values),
        EventKind::LoggingResume => read_logging_resume(dec, &mut values),
        EventKind::FlightMode => read_flight_mode(dec, &mut values),
        EventKind::LogEnd => read_log_end(dec, &mut values),
        EventKind::InflightAdjustment => Err(FrameError::NotImplemented {
            what: "event logEventInflightAdjustment",
        }),
        EventKind::Unknown(byte) => Err(FrameError::UnknownEvent { event: byte }),
    }
    .err();

    (kind, values, error)
}

fn read_sync_beep<R: Read>(
    dec: &mut Decoder<R>,
    values: &mut EventValues,
) -> Result<(), FrameError> {
    let beep_time = dec.read_unsigned_vb()?;
    values.insert("name", EventValue::Text("Sync beep"));
    values.insert("beepTime", EventValue::Uint(beep_time));
    Ok(())
}

fn read_logging_resume<R: Read>(
    dec: &mut Decoder<R>,
    values: &mut EventValues,
) -> Result<(), FrameError> {
    let iteration = dec.read_unsigned_vb()?;
    let current_time = dec.read_unsigned_vb()?;
    values.insert("name", EventValue::Text("Logging resume"));
    values.insert("iteration", EventValue::Int(i64::from(iteration)));
    values.insert("currentTime", EventValue::Int(i64::from(current_time)));
    Ok(())
}

fn read_flight_mode<R: Read>(
    dec: &mut Decoder<R>,
    values: &mut EventValues,
) -> Result<(), FrameError> {
    let flags = dec.read_unsigned_vb()?;
    let last_flags = dec.read_unsigned_vb()?;
    values.insert("name", EventValue::Text("Flight mode"));
    values.insert("flags", EventValue::Uint(flags));
    values.insert("lastFlags", EventValue::Uint(last_flags));
    Ok(())
}

fn read_log_end<R: Read>(
    dec: &mut Decoder<R>,
    values: &mut EventValues,
) -> Result<(), FrameError> {
    let data = dec.read_bytes(LOG_END_PAYLOAD_LEN)?;
    if !dec.is_eof()? {
        return Err(FrameError::DataAfterLogEnd);
    }
    values.insert("name", EventValue::Text("Log clean end"));
    values.insert("data", EventValue::Bytes(data));
    Ok(())
}
