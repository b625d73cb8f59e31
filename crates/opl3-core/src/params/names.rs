//! Host-facing parameter names and value text

use std::fmt;

use super::{ChannelField, GlobalField, MonoParamId, OperatorField, ParamId};
use crate::layout::OperatorRole;

fn on_off(value: f32) -> &'static str {
    if value > 0.5 {
        "On"
    } else {
        "Off"
    }
}

impl OperatorField {
    /// Value as shown to a user.
    pub fn display_value(self, value: f32) -> String {
        match self {
            OperatorField::Am | OperatorField::Vib | OperatorField::Egt | OperatorField::Ksr => {
                on_off(value).to_string()
            }
            OperatorField::Ksl => format!("{} dB/oct", (value * 3.0) as i32),
            OperatorField::Tl => format!("{:.1} dB", value * 63.0),
            OperatorField::Ws => format!("{}", (value * 7.0) as i32),
            _ => format!("{}", (value * 15.0) as i32),
        }
    }
}

impl ChannelField {
    /// Short label.
    pub fn label(self) -> &'static str {
        match self {
            ChannelField::Feedback => "FB",
            ChannelField::Connection => "CON",
            ChannelField::LeftOut => "LEFT",
            ChannelField::RightOut => "RIGHT",
        }
    }

    /// Value as shown to a user.
    pub fn display_value(self, value: f32) -> String {
        match self {
            ChannelField::Feedback => format!("{}", (value * 7.0) as i32),
            ChannelField::Connection => (if value > 0.5 { "AM" } else { "FM" }).to_string(),
            ChannelField::LeftOut | ChannelField::RightOut => on_off(value).to_string(),
        }
    }
}

impl fmt::Display for ChannelField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl GlobalField {
    /// Label.
    pub fn label(self) -> &'static str {
        match self {
            GlobalField::TremoloDepth => "Tremolo Depth",
            GlobalField::VibratoDepth => "Vibrato Depth",
            GlobalField::RhythmMode => "Rhythm Mode",
            GlobalField::HiHat => "HH",
            GlobalField::TopCymbal => "TC",
            GlobalField::TomTom => "TOM",
            GlobalField::SnareDrum => "SD",
            GlobalField::BassDrum => "BD",
        }
    }

    /// Value as shown to a user; every global is a switch.
    pub fn display_value(self, value: f32) -> String {
        on_off(value).to_string()
    }
}

impl fmt::Display for GlobalField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl ParamId {
    /// Value as shown to a user.
    pub fn display_value(self, value: f32) -> String {
        match self {
            ParamId::Operator(_, field) => field.display_value(value),
            ParamId::Channel(_, field) => field.display_value(value),
            ParamId::Global(field) => field.display_value(value),
        }
    }
}

impl fmt::Display for ParamId {
    /// `Ch1 Op2 TL`, `Ch10 FB`, `Rhythm Mode`; channels and operators count from 1.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamId::Operator(op, field) => {
                let position = match op.role() {
                    OperatorRole::Modulator => 1,
                    OperatorRole::Carrier => 2,
                };
                write!(f, "Ch{} Op{} {}", op.channel().index() + 1, position, field)
            }
            ParamId::Channel(ch, field) => write!(f, "Ch{} {}", ch.index() + 1, field),
            ParamId::Global(field) => write!(f, "{field}"),
        }
    }
}

impl MonoParamId {
    /// Value as shown to a user.
    pub fn display_value(self, value: f32) -> String {
        match self {
            MonoParamId::Modulator(field) | MonoParamId::Carrier(field) => {
                field.display_value(value)
            }
            MonoParamId::Channel(field) => field.display_value(value),
            MonoParamId::TremoloDepth => GlobalField::TremoloDepth.display_value(value),
            MonoParamId::VibratoDepth => GlobalField::VibratoDepth.display_value(value),
        }
    }
}

impl fmt::Display for MonoParamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonoParamId::Modulator(field) => write!(f, "Mod {field}"),
            MonoParamId::Carrier(field) => write!(f, "Car {field}"),
            MonoParamId::Channel(field) => write!(f, "{field}"),
            MonoParamId::TremoloDepth => write!(f, "{}", GlobalField::TremoloDepth),
            MonoParamId::VibratoDepth => write!(f, "{}", GlobalField::VibratoDepth),
        }
    }
}
