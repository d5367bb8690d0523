// fretpulse demo - Real-time metronome on the default audio device
//
// Usage: fretpulse [tempo_bpm] [quarter|eighth|sixteenth|triplet]

use std::process;
use std::thread;

use fretpulse::{CpalClock, Metronome, Pattern, SCHEDULER_TICK, Subdivision};

fn parse_args() -> Result<(u32, Subdivision), String> {
    let mut args = std::env::args().skip(1);

    let tempo = match args.next() {
        Some(raw) => raw
            .parse::<u32>()
            .map_err(|_| format!("invalid tempo: {raw}"))?,
        None => 120,
    };

    let subdivision = match args.next().as_deref() {
        Some("quarter") | None => Subdivision::Quarter,
        Some("eighth") => Subdivision::Eighth,
        Some("sixteenth") => Subdivision::Sixteenth,
        Some("triplet") => Subdivision::Triplet,
        Some(other) => return Err(format!("invalid subdivision: {other}")),
    };

    Ok((tempo, subdivision))
}

fn main() {
    let (tempo, subdivision) = match parse_args() {
        Ok(parsed) => parsed,
        Err(message) => {
            eprintln!("{message}");
            eprintln!("usage: fretpulse [tempo_bpm] [quarter|eighth|sixteenth|triplet]");
            process::exit(2);
        }
    };

    let pattern = match Pattern::from_slice(&[1, 2, 3, 1]) {
        Ok(pattern) => pattern,
        Err(error) => {
            eprintln!("{error}");
            process::exit(2);
        }
    };

    let mut metronome = match Metronome::new(CpalClock::new(), tempo, pattern) {
        Ok(metronome) => metronome,
        Err(error) => {
            eprintln!("{error}");
            process::exit(2);
        }
    };
    metronome.set_subdivision(subdivision);
    metronome.on_beat(|beat, symbol| {
        println!("beat {} (symbol {symbol})", beat + 1);
    });

    if let Err(error) = metronome.start() {
        eprintln!("cannot start: {error}");
        process::exit(1);
    }
    println!("playing at {tempo} BPM, {subdivision} clicks — ctrl-c to quit");

    loop {
        metronome.tick();
        thread::sleep(SCHEDULER_TICK);
    }
}
