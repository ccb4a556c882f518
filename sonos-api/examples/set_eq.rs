//! Toggle an EQ setting on one speaker
//!
//! ```text
//! cargo run -p sonos-api --example set_eq -- 192.168.1.50 night-mode on
//! ```

use clap::{Parser, ValueEnum};
use sonos_api::{EqCommand, EqType, SonosClient};

#[derive(Parser, Debug)]
#[command(about = "Send a single SetEQ command to a Sonos speaker")]
struct Args {
    /// Speaker IP address
    ip: String,

    /// EQ setting to change
    #[arg(value_enum)]
    kind: Kind,

    /// Desired state
    #[arg(value_enum)]
    state: State,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Kind {
    NightMode,
    DialogLevel,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum State {
    On,
    Off,
}

fn main() {
    let args = Args::parse();

    let kind = match args.kind {
        Kind::NightMode => EqType::NightMode,
        Kind::DialogLevel => EqType::DialogLevel,
    };
    let command = EqCommand::new(kind, matches!(args.state, State::On));

    match SonosClient::new().set_eq(&args.ip, command) {
        Ok(()) => println!(
            "{} set to {} on {}",
            kind,
            u8::from(command.desired_value),
            args.ip
        ),
        Err(e) => {
            eprintln!("SetEQ failed: {}", e);
            std::process::exit(1);
        }
    }
}
