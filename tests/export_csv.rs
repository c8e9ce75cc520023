//! CSV rendering over a decoded stream, through the public reader and
//! exporter surfaces together.

mod common;

use std::io::Cursor;

use bbdecode::blackbox::{FrameReader, ReaderOptions};
use bbdecode::export::CsvExporter;
use bbdecode::stream::Decoder;
use common::*;

#[test]
fn whole_stream_renders_one_row_per_main_frame() {
    let stream = build_stream(&[
        &ENCODED_FRAME_I,
        ENCODED_FRAMES_P[0],
        ENCODED_FRAMES_P[1],
        ENCODED_FRAMES_P[2],
        ENCODED_FRAMES_P[3],
        ENCODED_FRAMES_P[4],
        ENCODED_FRAMES_P[5],
    ]);
    let def = dummy_definition();
    let mut reader = FrameReader::new(
        Decoder::new(Cursor::new(stream)),
        def.clone(),
        ReaderOptions::default(),
    );

    let mut out = Vec::new();
    let mut exporter = CsvExporter::new(&mut out, &def);
    exporter.write_headers().unwrap();
    loop {
        let frame = reader.read_next_frame();
        if frame.error().is_some_and(|err| err.is_eof()) && frame.size() == 0 {
            break;
        }
        exporter.write_frame(&frame).unwrap();
    }
    assert_eq!(exporter.frames_written(), 7);

    let rendered = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = rendered.lines().collect();
    assert_eq!(lines.len(), 8);

    // header row: 38 unit-suffixed columns, no slow fields in this schema
    assert!(lines[0].starts_with("loopIteration, time (us), axisP[0]"));
    assert!(lines[0].contains("vbatLatest (V), amperageLatest (A)"));
    assert_eq!(lines[0].split(", ").count(), 38);

    // intra frame row: iteration and corrected time verbatim, battery
    // columns converted, everything else padded integers
    let cells: Vec<&str> = lines[1].split(", ").collect();
    assert_eq!(cells[0], "53632");
    assert_eq!(cells[1], "55318011");
    // vbat 1632 raw with vbatscale 110 comes to 14.467V
    assert_eq!(cells[21].trim(), "14.467");
    assert_eq!(cells[34].trim(), "584");

    // the six inter frames follow with increasing iterations
    for (index, line) in lines[2..].iter().enumerate() {
        let first = line.split(", ").next().unwrap();
        assert_eq!(first, format!("{}", 53_633 + index));
    }
}

#[test]
fn csv_file_written_to_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.csv");

    let def = dummy_definition();
    let file = std::fs::File::create(&path).unwrap();
    let mut exporter = CsvExporter::new(file, &def);
    exporter.write_headers().unwrap();

    let content = std::fs::read_to_string(&path).unwrap();
    assert!(content.starts_with("loopIteration, time (us)"));
}
