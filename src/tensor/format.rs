use std::fmt;
use std::str::FromStr;

use crate::error::PrimitiveError;

/// Logical axis split by blocked layouts.
pub const CHANNEL_AXIS: usize = 1;

/// Element precision carried by a tensor descriptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Precision {
    F32,
    U8,
}

impl Precision {
    pub fn size_in_bytes(self) -> usize {
        match self {
            Precision::F32 => 4,
            Precision::U8 => 1,
        }
    }
}

impl fmt::Display for Precision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Precision::F32 => write!(f, "f32"),
            Precision::U8 => write!(f, "u8"),
        }
    }
}

/// Physical arrangement of a tensor's logical dimensions.
///
/// `order[p]` names the logical dimension stored at physical position `p`;
/// the last position varies fastest.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Layout {
    /// Dense row-major over the permuted order.
    Plain { order: Vec<usize> },
    /// Like `Plain`, but the channel axis is split into `c / block`, which keeps
    /// the channel's place in `order`, and `c % block`, stored innermost.
    Blocked { order: Vec<usize>, block: usize },
}

impl Layout {
    /// Natural row-major layout of the given rank.
    pub fn row_major(rank: usize) -> Self {
        Layout::Plain {
            order: (0..rank).collect(),
        }
    }

    pub fn order(&self) -> &[usize] {
        match self {
            Layout::Plain { order } | Layout::Blocked { order, .. } => order,
        }
    }

    pub fn block(&self) -> Option<usize> {
        match self {
            Layout::Plain { .. } => None,
            Layout::Blocked { block, .. } => Some(*block),
        }
    }

    /// True when offsets equal the row-major linear index.
    pub fn is_row_major(&self) -> bool {
        match self {
            Layout::Plain { order } => order.iter().enumerate().all(|(p, &d)| p == d),
            Layout::Blocked { .. } => false,
        }
    }
}

/// Named storage formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryFormat {
    X,
    Nc,
    Oi,
    Io,
    Nchw,
    Nhwc,
    Oihw,
    Ihwo,
    NChw8c,
    NChw16c,
    OIhw8i,
    OIhw16i,
}

impl MemoryFormat {
    pub const ALL: [MemoryFormat; 12] = [
        MemoryFormat::X,
        MemoryFormat::Nc,
        MemoryFormat::Oi,
        MemoryFormat::Io,
        MemoryFormat::Nchw,
        MemoryFormat::Nhwc,
        MemoryFormat::Oihw,
        MemoryFormat::Ihwo,
        MemoryFormat::NChw8c,
        MemoryFormat::NChw16c,
        MemoryFormat::OIhw8i,
        MemoryFormat::OIhw16i,
    ];

    pub fn ndims(self) -> usize {
        match self {
            MemoryFormat::X => 1,
            MemoryFormat::Nc | MemoryFormat::Oi | MemoryFormat::Io => 2,
            _ => 4,
        }
    }

    pub fn layout(self) -> Layout {
        match self {
            MemoryFormat::X => Layout::row_major(1),
            MemoryFormat::Nc | MemoryFormat::Oi => Layout::row_major(2),
            MemoryFormat::Io => Layout::Plain { order: vec![1, 0] },
            MemoryFormat::Nchw | MemoryFormat::Oihw => Layout::row_major(4),
            MemoryFormat::Nhwc => Layout::Plain {
                order: vec![0, 2, 3, 1],
            },
            MemoryFormat::Ihwo => Layout::Plain {
                order: vec![1, 2, 3, 0],
            },
            MemoryFormat::NChw8c | MemoryFormat::OIhw8i => Layout::Blocked {
                order: vec![0, 1, 2, 3],
                block: 8,
            },
            MemoryFormat::NChw16c | MemoryFormat::OIhw16i => Layout::Blocked {
                order: vec![0, 1, 2, 3],
                block: 16,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MemoryFormat::X => "x",
            MemoryFormat::Nc => "nc",
            MemoryFormat::Oi => "oi",
            MemoryFormat::Io => "io",
            MemoryFormat::Nchw => "nchw",
            MemoryFormat::Nhwc => "nhwc",
            MemoryFormat::Oihw => "oihw",
            MemoryFormat::Ihwo => "ihwo",
            MemoryFormat::NChw8c => "nChw8c",
            MemoryFormat::NChw16c => "nChw16c",
            MemoryFormat::OIhw8i => "oIhw8i",
            MemoryFormat::OIhw16i => "oIhw16i",
        }
    }
}

impl fmt::Display for MemoryFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MemoryFormat {
    type Err = PrimitiveError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MemoryFormat::ALL
            .iter()
            .copied()
            .find(|format| format.name() == s)
            .ok_or_else(|| PrimitiveError::UnknownFormat(s.to_string()))
    }
}
