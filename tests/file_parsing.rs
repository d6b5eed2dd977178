mod common;

use common::{header, smf, track_chunk, TrackBuilder};
use pretty_assertions::assert_eq;
use smfplay::{
    chunk::header::{Division, Format},
    error::{ErrorKind, ErrorLog},
    file::FileParser,
};

fn short_track() -> Vec<u8> {
    TrackBuilder::new()
        .note_on(0, 0, 60, 100)
        .note_off(10, 0, 60)
        .end(0)
        .build()
}

#[test]
fn well_formed_file_hands_out_every_track() {
    let bytes = smf(96, &[short_track(), short_track(), short_track()]);
    let mut errors = ErrorLog::new();
    let mut file = FileParser::new(&bytes, &mut errors);

    let header = file.header().expect("valid header");
    assert_eq!(header.format(), Format::One);
    assert_eq!(header.division(), Division::Metrical(96));
    assert_eq!(file.tracks_left(), 3);

    let tracks: Vec<_> = file.by_ref().collect();
    assert_eq!(tracks.len(), 3);
    assert!(tracks.iter().all(|track| !track.is_empty()));
    assert!(file.is_exhausted());
    assert_eq!(file.tracks_left(), 0);

    drop(file);
    assert!(errors.is_empty());
}

#[test]
fn missing_tracks_are_reported_once() {
    let mut bytes = header(1, 5, 96);
    bytes.extend(track_chunk(&short_track()));
    bytes.extend(track_chunk(&short_track()));

    let mut errors = ErrorLog::new();
    let mut file = FileParser::new(&bytes, &mut errors);

    assert!(file.next_track_bytes().is_some());
    assert!(file.next_track_bytes().is_some());
    assert_eq!(file.next_track_bytes(), None);
    assert_eq!(file.tracks_left(), 0);

    // Exhausted parsers stay quiet
    assert_eq!(file.next_track_bytes(), None);
    assert_eq!(file.next_track_parser().map(|_| ()), None);

    drop(file);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].kind, ErrorKind::TruncatedStream);
}

#[test]
fn overlong_track_is_clamped_to_the_input() {
    let data = short_track();
    let mut bytes = header(0, 1, 96);
    bytes.extend(b"MTrk");
    bytes.extend((data.len() as u32 + 100).to_be_bytes());
    bytes.extend(&data);

    let mut errors = ErrorLog::new();
    let mut file = FileParser::new(&bytes, &mut errors);

    assert_eq!(file.next_track_bytes(), Some(&data[..]));
    assert_eq!(file.next_track_bytes(), None);
    assert_eq!(file.tracks_left(), 0);

    drop(file);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].kind, ErrorKind::TruncatedStream);
}

#[test]
fn foreign_chunk_stops_parsing() {
    let mut bytes = header(1, 2, 96);
    bytes.extend(track_chunk(&short_track()));
    bytes.extend(b"XFIH\x00\x00\x00\x00");
    bytes.extend(track_chunk(&short_track()));

    let mut errors = ErrorLog::new();
    let mut file = FileParser::new(&bytes, &mut errors);

    assert_eq!(file.by_ref().count(), 1);
    assert!(file.is_errored());

    drop(file);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors.errors()[0].kind, ErrorKind::UnexpectedChunkType);
}

#[test]
fn bad_headers_yield_no_tracks() {
    let mut wrong_length = b"MThd\x00\x00\x00\x07".to_vec();
    wrong_length.extend([0, 1, 0, 1, 0, 96, 0]);
    let mut bad_format = header(3, 1, 96);
    bad_format.extend(track_chunk(&short_track()));

    let inputs: [&[u8]; 4] = [&[], b"MTrk\x00\x00\x00\x00", &wrong_length, &bad_format];

    for input in inputs {
        let mut errors = ErrorLog::new();
        let mut file = FileParser::new(input, &mut errors);

        assert_eq!(file.header(), None);
        assert_eq!(file.tracks_left(), 0);
        assert!(file.next_track_bytes().is_none());
        assert!(file.is_errored());

        drop(file);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors.errors()[0].kind, ErrorKind::MalformedHeader);
    }
}

#[test]
fn smpte_division_is_decoded() {
    // -25 frames per second, 40 ticks per frame
    let division = u16::from_be_bytes([(-25i8) as u8, 40]);
    let bytes = smf(division, &[short_track()]);
    let file = FileParser::from_bytes(&bytes);

    let Division::TimeCodeBased(smpte) = file.division() else {
        panic!("expected a time code based division");
    };
    assert_eq!(smpte.frames_per_second(), 25.0);
    assert_eq!(smpte.ticks_per_frame(), 40);
}
