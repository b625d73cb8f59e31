//! Line-oriented note and parameter scripts.

use std::str::FromStr;

use opl3::{Opl3Backend, Opl3Error, Opl3Synth, Result};

/// One script command
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    /// `on NOTE VELOCITY`
    NoteOn { note: u8, velocity: u8 },
    /// `off NOTE`
    NoteOff { note: u8 },
    /// `cc CONTROLLER VALUE`
    ControlChange { controller: u8, value: u8 },
    /// `param INDEX VALUE`
    Param { index: usize, value: f32 },
    /// `rate HZ`
    Rate(f32),
    /// `midi STATUS DATA1 DATA2` in hex
    Midi([u8; 3]),
    /// `allnotesoff`
    AllNotesOff,
    /// `allsoundoff`
    AllSoundOff,
}

impl Command {
    /// Run the command against a synth.
    pub fn apply<B: Opl3Backend>(&self, synth: &mut Opl3Synth<B>) {
        match *self {
            Command::NoteOn { note, velocity } => {
                synth.note_on(note, velocity);
            }
            Command::NoteOff { note } => {
                synth.note_off(note);
            }
            Command::ControlChange { controller, value } => {
                synth.handle_midi(&[0xB0, controller, value]);
            }
            Command::Param { index, value } => synth.set_parameter(index, value),
            Command::Rate(rate) => synth.set_sample_rate(rate),
            Command::Midi(bytes) => synth.handle_midi(&bytes),
            Command::AllNotesOff => {
                synth.all_notes_off();
            }
            Command::AllSoundOff => {
                synth.all_sound_off();
            }
        }
    }
}

/// A parsed line with its 1-based line number and source text
#[derive(Debug, Clone, PartialEq)]
pub struct ScriptLine {
    pub line: usize,
    pub text: String,
    pub command: Command,
}

/// Parse a whole script; blank lines and `#` comments are skipped.
pub fn parse_script(source: &str) -> Result<Vec<ScriptLine>> {
    let mut lines = Vec::new();
    for (i, raw) in source.lines().enumerate() {
        let line = i + 1;
        let text = raw.split('#').next().unwrap_or("").trim();
        if text.is_empty() {
            continue;
        }
        let command = parse_command(text).map_err(|message| Opl3Error::Script { line, message })?;
        lines.push(ScriptLine {
            line,
            text: text.to_string(),
            command,
        });
    }
    Ok(lines)
}

fn parse_command(text: &str) -> std::result::Result<Command, String> {
    let mut words = text.split_whitespace();
    let keyword = words.next().unwrap_or_default().to_ascii_lowercase();
    let args: Vec<&str> = words.collect();

    let command = match keyword.as_str() {
        "on" => {
            let [note, velocity] = expect_args::<2>(&keyword, &args)?;
            Command::NoteOn {
                note: midi_data(note)?,
                velocity: midi_data(velocity)?,
            }
        }
        "off" => {
            let [note] = expect_args::<1>(&keyword, &args)?;
            Command::NoteOff {
                note: midi_data(note)?,
            }
        }
        "cc" => {
            let [controller, value] = expect_args::<2>(&keyword, &args)?;
            Command::ControlChange {
                controller: midi_data(controller)?,
                value: midi_data(value)?,
            }
        }
        "param" => {
            let [index, value] = expect_args::<2>(&keyword, &args)?;
            Command::Param {
                index: number(index)?,
                value: number(value)?,
            }
        }
        "rate" => {
            let [rate] = expect_args::<1>(&keyword, &args)?;
            Command::Rate(number(rate)?)
        }
        "midi" => {
            let [status, data1, data2] = expect_args::<3>(&keyword, &args)?;
            Command::Midi([hex_byte(status)?, hex_byte(data1)?, hex_byte(data2)?])
        }
        "allnotesoff" => {
            let [] = expect_args::<0>(&keyword, &args)?;
            Command::AllNotesOff
        }
        "allsoundoff" => {
            let [] = expect_args::<0>(&keyword, &args)?;
            Command::AllSoundOff
        }
        other => return Err(format!("unknown command '{other}'")),
    };
    Ok(command)
}

fn expect_args<'a, const N: usize>(
    keyword: &str,
    args: &[&'a str],
) -> std::result::Result<[&'a str; N], String> {
    <[&str; N]>::try_from(args)
        .map_err(|_| format!("'{keyword}' takes {N} argument(s), got {}", args.len()))
}

fn number<T: FromStr>(text: &str) -> std::result::Result<T, String> {
    text.parse().map_err(|_| format!("invalid number '{text}'"))
}

fn midi_data(text: &str) -> std::result::Result<u8, String> {
    match number::<u8>(text)? {
        value @ 0..=127 => Ok(value),
        value => Err(format!("{value} is not a 7-bit MIDI value")),
    }
}

fn hex_byte(text: &str) -> std::result::Result<u8, String> {
    let digits = text.trim_start_matches("0x").trim_start_matches("0X");
    u8::from_str_radix(digits, 16).map_err(|_| format!("invalid hex byte '{text}'"))
}
