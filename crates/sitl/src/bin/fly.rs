//! Scripted end-to-end flight against the plant model.
//!
//! Takes off, finds the reference marker, flies a few setpoint steps,
//! then lands. Prints a stage banner per phase change; telemetry goes
//! through the logger (RUST_LOG=debug for the display-rate stream).
//!
//! Usage:
//!   cargo run -p heli_rig_sitl --bin fly -- [OPTIONS]
//!
//! Options:
//!   --marker-offset <SLOTS>  Start attitude relative to the marker (default: -40)
//!   --hold-secs <SECS>       Hover time between command steps (default: 5)

use std::env;
use std::process;

use heli_rig_core::altitude::SAMPLE_RATE_HZ;
use heli_rig_core::mode::FlightPhase;
use heli_rig_core::traits::Button;
use heli_rig_sitl::{Plant, SimRig, SitlError};

struct Args {
    marker_offset: i64,
    hold_secs: u64,
}

fn parse_args() -> Args {
    let mut args = Args {
        marker_offset: -40,
        hold_secs: 5,
    };

    let raw: Vec<String> = env::args().collect();
    let mut i = 1;
    while i < raw.len() {
        match raw[i].as_str() {
            "--marker-offset" => {
                i += 1;
                args.marker_offset = parse_i64_arg(&raw, i, "marker-offset");
            }
            "--hold-secs" => {
                i += 1;
                args.hold_secs = parse_i64_arg(&raw, i, "hold-secs") as u64;
            }
            "-h" | "--help" => {
                print_usage();
                process::exit(0);
            }
            other => {
                eprintln!("unknown argument: {other}");
                print_usage();
                process::exit(2);
            }
        }
        i += 1;
    }
    args
}

fn parse_i64_arg(raw: &[String], i: usize, name: &str) -> i64 {
    raw.get(i)
        .and_then(|s| s.parse().ok())
        .unwrap_or_else(|| {
            eprintln!("--{name} needs an integer value");
            process::exit(2);
        })
}

fn print_usage() {
    eprintln!("usage: fly [--marker-offset <SLOTS>] [--hold-secs <SECS>]");
}

fn stage(sim: &SimRig, label: &str) {
    let t = sim.ticks() as f64 / SAMPLE_RATE_HZ as f64;
    let telem = sim.rig().telemetry();
    println!(
        "[{t:7.2}s] {label}: phase={} alt={}% yaw={}deg",
        telem.phase.name(),
        telem.altitude_percent,
        telem.yaw_degrees
    );
}

fn run(args: Args) -> Result<(), SitlError> {
    let mut sim = SimRig::new(Plant::new(args.marker_offset))?;
    let hold = args.hold_secs * SAMPLE_RATE_HZ as u64;
    let minute = 60 * SAMPLE_RATE_HZ as u64;

    stage(&sim, "on pad");

    sim.lift_up();
    sim.run_until("airborne after takeoff", minute, |rig| {
        rig.phase() == FlightPhase::Airborne
    })?;
    stage(&sim, "hovering on the marker");
    sim.run_ticks(hold)?;

    sim.press(Button::AltitudeUp);
    sim.press(Button::AltitudeUp);
    sim.run_ticks(hold)?;
    stage(&sim, "after two altitude steps up");

    sim.press(Button::YawRight);
    sim.run_ticks(hold)?;
    stage(&sim, "after one yaw step right");

    sim.press(Button::AltitudeDown);
    sim.press(Button::YawLeft);
    sim.run_ticks(hold)?;
    stage(&sim, "after stepping back");

    sim.lift_down();
    sim.run_until("touchdown after landing", 2 * minute, |rig| {
        rig.phase() == FlightPhase::Grounded
    })?;
    stage(&sim, "back on pad");

    Ok(())
}

fn main() {
    env_logger::init();
    if let Err(err) = run(parse_args()) {
        eprintln!("flight failed: {err}");
        process::exit(1);
    }
}
