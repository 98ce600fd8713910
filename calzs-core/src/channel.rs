//! Calorimeter channel addressing.

use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Calorimeter subdetector regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum Subdetector {
    /// Barrel section.
    Barrel = 1,
    /// Endcap section.
    Endcap = 2,
    /// Outer (tail-catcher) section.
    Outer = 3,
    /// Forward section.
    Forward = 4,
}

impl Subdetector {
    /// Creates a subdetector from its numeric code.
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(Subdetector::Barrel),
            2 => Some(Subdetector::Endcap),
            3 => Some(Subdetector::Outer),
            4 => Some(Subdetector::Forward),
            _ => None,
        }
    }

    /// Returns the numeric code of this subdetector.
    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }
}

/// Address of a single readout channel (one calorimeter cell).
///
/// A channel is identified by its subdetector, signed pseudorapidity index
/// `ieta`, azimuthal index `iphi`, and longitudinal `depth` segment. The
/// packed 32-bit form is the on-disk / on-wire representation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelId {
    /// Subdetector region.
    pub subdet: Subdetector,
    /// Signed pseudorapidity index. Never zero; sign encodes the detector side.
    pub ieta: i16,
    /// Azimuthal index, 1-based.
    pub iphi: u16,
    /// Longitudinal depth segment.
    pub depth: u8,
}

// Packed layout (little end first):
//   bits  0..7   iphi          (7 bits, 1..=72)
//   bits  7..13  |ieta|        (6 bits, 1..=41)
//   bit   13     ieta sign     (1 = negative side)
//   bits 14..17  depth         (3 bits)
//   bits 17..20  subdet code   (3 bits)
const IPHI_MASK: u32 = 0x7F;
const IETA_SHIFT: u32 = 7;
const IETA_MASK: u32 = 0x3F;
const SIGN_BIT: u32 = 1 << 13;
const DEPTH_SHIFT: u32 = 14;
const DEPTH_MASK: u32 = 0x7;
const SUBDET_SHIFT: u32 = 17;
const SUBDET_MASK: u32 = 0x7;

/// Largest valid `|ieta|`.
pub const MAX_ABS_IETA: i16 = 41;
/// Largest valid `iphi`.
pub const MAX_IPHI: u16 = 72;
/// Largest valid depth segment.
pub const MAX_DEPTH: u8 = 7;

impl ChannelId {
    /// Creates a new channel id.
    ///
    /// # Errors
    /// Returns [`Error::InvalidChannel`] if any index is outside the packed
    /// representation: `ieta == 0`, `|ieta| > 41`, `iphi` outside `1..=72`,
    /// or `depth > 7`.
    pub fn new(subdet: Subdetector, ieta: i16, iphi: u16, depth: u8) -> Result<Self> {
        let id = Self {
            subdet,
            ieta,
            iphi,
            depth,
        };
        if ieta == 0
            || ieta.unsigned_abs() > MAX_ABS_IETA as u16
            || iphi == 0
            || iphi > MAX_IPHI
            || depth > MAX_DEPTH
        {
            return Err(Error::InvalidChannel { raw: id.pack() });
        }
        Ok(id)
    }

    /// Packs this channel id into its 32-bit raw form.
    #[must_use]
    pub fn pack(&self) -> u32 {
        let mut raw = u32::from(self.iphi) & IPHI_MASK;
        raw |= (u32::from(self.ieta.unsigned_abs()) & IETA_MASK) << IETA_SHIFT;
        if self.ieta < 0 {
            raw |= SIGN_BIT;
        }
        raw |= (u32::from(self.depth) & DEPTH_MASK) << DEPTH_SHIFT;
        raw |= (u32::from(self.subdet.code()) & SUBDET_MASK) << SUBDET_SHIFT;
        raw
    }

    /// Decodes a channel id from its 32-bit raw form.
    ///
    /// # Errors
    /// Returns [`Error::InvalidChannel`] if the subdetector code is unknown,
    /// any index field is out of range, or bits above the packed layout are
    /// set.
    pub fn from_raw(raw: u32) -> Result<Self> {
        if raw >> (SUBDET_SHIFT + 3) != 0 {
            return Err(Error::InvalidChannel { raw });
        }
        let subdet = Subdetector::from_code(((raw >> SUBDET_SHIFT) & SUBDET_MASK) as u8)
            .ok_or(Error::InvalidChannel { raw })?;
        let iphi = (raw & IPHI_MASK) as u16;
        let abs_ieta = ((raw >> IETA_SHIFT) & IETA_MASK) as i16;
        let ieta = if raw & SIGN_BIT != 0 {
            -abs_ieta
        } else {
            abs_ieta
        };
        let depth = ((raw >> DEPTH_SHIFT) & DEPTH_MASK) as u8;
        Self::new(subdet, ieta, iphi, depth).map_err(|_| Error::InvalidChannel { raw })
    }

    /// Returns the detector side: `+1` or `-1`.
    #[inline]
    #[must_use]
    pub fn zside(&self) -> i8 {
        if self.ieta < 0 {
            -1
        } else {
            1
        }
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}(ieta={}, iphi={}, depth={})",
            self.subdet, self.ieta, self.iphi, self.depth
        )
    }
}
