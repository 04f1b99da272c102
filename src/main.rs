// src/main.rs
// Command-line front end for SPE Frames

use std::env;
use std::process;
use spe_frames::{spe, FrameData, SpeError};

fn print_usage() {
    eprintln!("Usage: spe_frames <command> <spe_file> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  info <file>                              Display SPE file information");
    eprintln!("  slice <file> <min> <max> <output> [--fold]  Keep a wavelength range");
    eprintln!("  fold <file> <output>                     Average the wavelength axis");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  spe_frames info capture.spe");
    eprintln!("  spe_frames slice capture.spe 540 560 band.spe");
    eprintln!("  spe_frames slice capture.spe 540 560 band.spe --fold");
    eprintln!("  spe_frames fold capture.spe broadband.spe");
}

fn parse_wave(arg: &str) -> f64 {
    match arg.parse() {
        Ok(w) => w,
        Err(_) => {
            eprintln!("Error: Invalid wavelength '{}'", arg);
            process::exit(1);
        }
    }
}

fn write_output(fd: &FrameData, output_file: &str) {
    match spe::save(fd, output_file) {
        Ok(()) => {
            let [frames, points, channels] = fd.shape();
            println!(
                "Wrote {} ({} x {} x {})",
                output_file, frames, points, channels
            );
        }
        Err(SpeError::DestinationExists(_)) => {
            println!("File '{}' already exists, choose another name", output_file);
        }
        Err(e) => {
            eprintln!("Error writing SPE file '{}': {}", output_file, e);
            process::exit(1);
        }
    }
}

fn main() {
    env_logger::init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        print_usage();
        process::exit(1);
    }

    let command = &args[1];
    let input_file = &args[2];

    let fd = match spe::load(input_file) {
        Ok(fd) => fd,
        Err(e) => {
            eprintln!("Error loading SPE file '{}': {}", input_file, e);
            process::exit(1);
        }
    };

    match command.as_str() {
        "info" => {
            print_file_info(&fd);
        }

        "slice" => {
            if args.len() < 6 {
                eprintln!("Error: Missing range or output file argument");
                print_usage();
                process::exit(1);
            }

            let min_wave = parse_wave(&args[3]);
            let max_wave = parse_wave(&args[4]);
            let fold = args.iter().skip(6).any(|a| a == "--fold");

            match fd.wave_slice(min_wave, max_wave, fold) {
                Ok(sliced) => write_output(&sliced, &args[5]),
                Err(e) => {
                    eprintln!("Error slicing '{}': {}", input_file, e);
                    process::exit(1);
                }
            }
        }

        "fold" => {
            if args.len() < 4 {
                eprintln!("Error: Missing output file argument");
                print_usage();
                process::exit(1);
            }

            match fd.wave_fold() {
                Ok(folded) => write_output(&folded, &args[3]),
                Err(e) => {
                    eprintln!("Error folding '{}': {}", input_file, e);
                    process::exit(1);
                }
            }
        }

        _ => {
            eprintln!("Error: Unknown command '{}'", command);
            print_usage();
            process::exit(1);
        }
    }
}

fn print_file_info(fd: &FrameData) {
    println!("SPE File Information");
    println!("====================");
    println!();
    if !fd.description().is_empty() {
        println!("{}", fd.description());
        println!();
    }

    let [frames, points, channels] = fd.shape();
    println!("Dimensions:");
    println!("  Frames: {}", frames);
    println!("  Spatial points: {}", points);
    println!("  Wavelength channels: {}", channels);
    println!();

    let (first, last) = fd.wave_range();
    println!("Calibration:");
    println!("  Wavelength range: {} - {}", first, last);
    println!("  Coefficients: {:?}", fd.wave_coefs());
    println!();

    // Show statistics for first few frames
    println!("Frame Statistics (first {} frames):", 3.min(frames));
    for i in 0..frames.min(3) {
        if let Some(frame) = fd.frame(i) {
            let min = frame.iter().fold(f32::INFINITY, |a, &b| a.min(b));
            let max = frame.iter().fold(f32::NEG_INFINITY, |a, &b| a.max(b));
            let avg = frame.iter().map(|&v| f64::from(v)).sum::<f64>() / frame.len() as f64;

            println!("  Frame {}: min={:.3}, max={:.3}, avg={:.3}", i, min, max, avg);
        }
    }
}
