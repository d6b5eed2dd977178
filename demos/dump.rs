//! Example program that plays a MIDI file and prints every message with its time
//!
//! Run with `cargo run --example dump -- path/to/file.mid`, setting `RUST_LOG=debug` to follow
//! the parser.

use smfplay::{
    error::ErrorLog,
    file::FileParser,
    play::{Device, NoteOff, NoteOn, PitchBend, TrackCombiner},
    reader::MidiReadable,
};

/// Prints what it is asked to play
struct Printer;

impl Device for Printer {
    fn on_note_on(&mut self, time: f64, note: NoteOn) {
        println!(
            "{time:>10.4}s  ch{:<2} note on   {:>3} vel {:>3} {:>8.2}Hz program {}",
            note.channel,
            note.key,
            note.velocity,
            note.frequency(),
            note.instrument
        );
    }

    fn on_note_off(&mut self, time: f64, note: NoteOff) {
        println!("{time:>10.4}s  ch{:<2} note off  {:>3}", note.channel, note.key);
    }

    fn on_pitch_bend(&mut self, time: f64, bend: PitchBend) {
        println!("{time:>10.4}s  ch{:<2} bend {:+.3}", bend.channel, bend.bend());
    }

    fn on_all_notes_off(&mut self, time: f64, channel: u8) {
        println!("{time:>10.4}s  ch{channel:<2} all notes off");
    }

    fn on_channel_program_change(&mut self, time: f64, channel: u8, program: u8) {
        println!("{time:>10.4}s  ch{channel:<2} program {program}");
    }

    fn on_channel_volume_change(&mut self, time: f64, channel: u8, volume: u8) {
        println!("{time:>10.4}s  ch{channel:<2} volume {volume}");
    }
}

fn main() {
    env_logger::init();

    let path = std::env::args()
        .nth(1)
        .expect("Usage: dump <file.mid>");
    let bytes = path.as_str().get_midi_bytes().expect("Read MIDI file");

    let mut errors = ErrorLog::new();
    let mut file = FileParser::new(&bytes, &mut errors);
    if let Some(header) = file.header() {
        println!(
            "{:?}, {} tracks, {:?}",
            header.format(),
            header.track_count(),
            header.division()
        );
    }

    let mut combiner = TrackCombiner::from_file(&mut file);
    combiner.process_all_events(&mut Printer);

    for error in errors.errors() {
        eprintln!("{error} ({})", error.location);
    }
}
