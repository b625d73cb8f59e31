//! OPL3 register dump tool
//!
//! Runs a note/parameter script against the voice and register core and prints
//! every register write each line produces:
//! - `init` block with the OPL3 mode enable and the full factory patch
//! - one block per script line, `bank:offset = value` in hex, operator
//!   registers followed by their group name

mod args;
mod logger;
mod script;

use std::fs;
use std::io::{self, Read};
use std::process;

use log::debug;
use opl3::{
    NoteOffMode, Opl3Synth, OperatorRegister, RegisterFile, RegisterWrite, SynthConfig,
};

use args::CliArgs;
use script::parse_script;

/// One dump line; operator registers are annotated with their group.
fn format_write(write: &RegisterWrite) -> String {
    match OperatorRegister::of_address(write.addr) {
        Some(group) => format!("  {} = {:02X}  ; {group}", write.addr, write.value),
        None => format!("  {} = {:02X}", write.addr, write.value),
    }
}

fn print_writes(header: &str, writes: &[RegisterWrite]) {
    println!("{header}");
    for write in writes {
        println!("{}", format_write(write));
    }
}

fn build_config(args: &CliArgs) -> opl3::Result<SynthConfig> {
    let mut config = match args.config_path {
        Some(ref path) => SynthConfig::from_path(path)?,
        None => SynthConfig::default(),
    };
    if let Some(rate) = args.sample_rate {
        config = config.with_sample_rate(rate);
    }
    if let Some(surface) = args.surface {
        config = config.with_surface(surface);
    }
    if args.clear_key_only {
        config = config.with_note_off_mode(NoteOffMode::ClearKeyOnOnly);
    }
    config.validate()?;
    Ok(config)
}

fn main() -> opl3::Result<()> {
    let args = CliArgs::parse();

    if args.show_help {
        CliArgs::print_help();
        if args.invalid {
            process::exit(2);
        }
        return Ok(());
    }

    if let Err(err) = logger::init(args.log_level()) {
        eprintln!("logging disabled: {err}");
    }

    let config = build_config(&args)?;
    debug!("configuration: {config:?}");

    let source = match args.script_path {
        Some(ref path) => fs::read_to_string(path)?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let lines = parse_script(&source)?;

    let mut synth = Opl3Synth::new(RegisterFile::with_log(), config)?;
    print_writes(
        &format!("init ({} Hz, {:?})", config.sample_rate, config.surface),
        &synth.backend_mut().take_log(),
    );

    for line in &lines {
        line.command.apply(&mut synth);
        let writes = synth.backend_mut().take_log();
        print_writes(&format!("{:>4}: {}", line.line, line.text), &writes);
    }

    debug!(
        "{} lines, {} voices still active",
        lines.len(),
        synth.active_voice_count()
    );
    Ok(())
}
