use serde::{Deserialize, Serialize};
use std::fmt;

/// Named slot in a gene's parameter vector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locus {
    Kind,   // < 0.5 rectangle, otherwise circle
    Width,
    Height,
    X,
    Y,
    Z,      // paint order
    R,
    G,
    B,
    A,
}

impl Locus {
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// How many loci a gene carries and how its color is read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocusMode {
    /// 7 loci, R is the gray level, always opaque
    #[default]
    Monochrome,
    /// 10 loci, RGBA
    Colored,
}

impl LocusMode {
    pub const fn locus_count(self) -> usize {
        match self {
            LocusMode::Monochrome => 7,
            LocusMode::Colored => 10,
        }
    }

    pub fn is_monochrome(self) -> bool {
        matches!(self, LocusMode::Monochrome)
    }
}

/// Color channel a sub-population is scored against in multi-channel runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColorChannel {
    Red,
    Green,
    Blue,
}

impl ColorChannel {
    pub const ALL: [ColorChannel; 3] = [ColorChannel::Red, ColorChannel::Green, ColorChannel::Blue];

    /// Population name used for this channel's sub-run and its checkpoint
    pub fn tag(self) -> &'static str {
        match self {
            ColorChannel::Red => "r",
            ColorChannel::Green => "g",
            ColorChannel::Blue => "b",
        }
    }

    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "r" => Some(ColorChannel::Red),
            "g" => Some(ColorChannel::Green),
            "b" => Some(ColorChannel::Blue),
            _ => None,
        }
    }

    pub const fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for ColorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}
