//! Hardware-specific readout frame flavors.

use crate::sample::{Qie10Sample, Qie11Sample, QieSample};
use crate::{Error, Result};
use calzs_core::{ChannelId, Digi, Subdetector};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Most time slices any front-end ships per frame.
pub const MAX_TIME_SLICES: usize = 10;

/// The readout frame flavors understood by this crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(u8)]
pub enum FrameFlavor {
    /// Barrel/endcap QIE8 frame.
    Hbhe = 0,
    /// Outer-section QIE8 frame.
    Ho = 1,
    /// Forward-section QIE8 frame.
    Hf = 2,
    /// QIE10 flat frame (forward upgrade).
    Qie10 = 3,
    /// QIE11 flat frame (barrel/endcap upgrade).
    Qie11 = 4,
}

impl FrameFlavor {
    /// Creates a flavor from its numeric code.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFlavor`] for unassigned codes.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(FrameFlavor::Hbhe),
            1 => Ok(FrameFlavor::Ho),
            2 => Ok(FrameFlavor::Hf),
            3 => Ok(FrameFlavor::Qie10),
            4 => Ok(FrameFlavor::Qie11),
            _ => Err(Error::InvalidFlavor(code)),
        }
    }

    /// Returns the numeric code of this flavor.
    #[inline]
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Returns true if `subdet` is read out by this flavor.
    #[must_use]
    pub fn reads(self, subdet: Subdetector) -> bool {
        match self {
            FrameFlavor::Hbhe | FrameFlavor::Qie11 => {
                matches!(subdet, Subdetector::Barrel | Subdetector::Endcap)
            }
            FrameFlavor::Ho => matches!(subdet, Subdetector::Outer),
            FrameFlavor::Hf | FrameFlavor::Qie10 => matches!(subdet, Subdetector::Forward),
        }
    }
}

fn check_frame<T>(flavor: FrameFlavor, channel: ChannelId, samples: &[T]) -> Result<()> {
    if samples.is_empty() || samples.len() > MAX_TIME_SLICES {
        return Err(Error::InvalidFrameLength {
            got: samples.len(),
            max: MAX_TIME_SLICES,
        });
    }
    if !flavor.reads(channel.subdet) {
        return Err(Error::WrongSubdetector { flavor, channel });
    }
    Ok(())
}

/// A QIE8 readout frame: channel address plus up to ten 16-bit sample words.
///
/// The three legacy flavors share this layout and differ only in which
/// subdetector they serve; the typed wrappers below keep them distinct.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct QieFrame {
    channel: ChannelId,
    samples: Vec<QieSample>,
}

impl QieFrame {
    fn new(flavor: FrameFlavor, channel: ChannelId, samples: Vec<QieSample>) -> Result<Self> {
        check_frame(flavor, channel, &samples)?;
        Ok(Self { channel, samples })
    }

    /// Returns the sample at time slice `i`.
    #[inline]
    #[must_use]
    pub fn sample(&self, i: usize) -> QieSample {
        self.samples[i]
    }

    /// Returns all sample words in time-slice order.
    #[must_use]
    pub fn raw_samples(&self) -> &[QieSample] {
        &self.samples
    }

    /// Checks that the capacitor ids advance by one (mod 4) per slice.
    /// A broken rotation indicates front-end desynchronization.
    #[must_use]
    pub fn capid_rotation_ok(&self) -> bool {
        self.samples
            .windows(2)
            .all(|pair| pair[1].capid() == (pair[0].capid() + 1) % 4)
    }
}

macro_rules! qie8_frame {
    ($(#[$doc:meta])* $name:ident, $flavor:expr) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq)]
        #[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
        pub struct $name(QieFrame);

        impl $name {
            /// Creates a frame from decoded sample words.
            ///
            /// # Errors
            /// Returns [`Error::InvalidFrameLength`] for an empty or oversized
            /// frame, and [`Error::WrongSubdetector`] if the channel does not
            /// belong to this flavor's subdetector.
            pub fn new(channel: ChannelId, samples: Vec<QieSample>) -> Result<Self> {
                QieFrame::new($flavor, channel, samples).map(Self)
            }

            /// Creates a frame from raw 16-bit sample words.
            ///
            /// # Errors
            /// Same conditions as [`new`](Self::new).
            pub fn from_raw(channel: ChannelId, words: &[u16]) -> Result<Self> {
                Self::new(channel, words.iter().copied().map(QieSample::new).collect())
            }

            /// Returns the sample at time slice `i`.
            #[inline]
            #[must_use]
            pub fn sample(&self, i: usize) -> QieSample {
                self.0.sample(i)
            }

            /// Returns all sample words in time-slice order.
            #[must_use]
            pub fn raw_samples(&self) -> &[QieSample] {
                self.0.raw_samples()
            }

            /// Checks that the capacitor ids advance by one (mod 4) per slice.
            #[must_use]
            pub fn capid_rotation_ok(&self) -> bool {
                self.0.capid_rotation_ok()
            }

            /// Returns this frame's flavor tag.
            #[inline]
            #[must_use]
            pub fn flavor(&self) -> FrameFlavor {
                $flavor
            }
        }

        impl Digi for $name {
            #[inline]
            fn channel(&self) -> ChannelId {
                self.0.channel
            }

            #[inline]
            fn len(&self) -> usize {
                self.0.samples.len()
            }

            #[inline]
            fn adc(&self, i: usize) -> u16 {
                self.0.samples[i].adc()
            }
        }
    };
}

qie8_frame!(
    /// Barrel/endcap QIE8 frame.
    HbheFrame,
    FrameFlavor::Hbhe
);
qie8_frame!(
    /// Outer-section QIE8 frame.
    HoFrame,
    FrameFlavor::Ho
);
qie8_frame!(
    /// Forward-section QIE8 frame.
    HfFrame,
    FrameFlavor::Hf
);

/// A QIE10 flat frame: channel address plus up to ten 32-bit sample words.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Qie10Frame {
    channel: ChannelId,
    samples: Vec<Qie10Sample>,
}

impl Qie10Frame {
    /// Creates a frame from decoded sample words.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrameLength`] for an empty or oversized frame,
    /// and [`Error::WrongSubdetector`] for a non-forward channel.
    pub fn new(channel: ChannelId, samples: Vec<Qie10Sample>) -> Result<Self> {
        check_frame(FrameFlavor::Qie10, channel, &samples)?;
        Ok(Self { channel, samples })
    }

    /// Creates a frame from raw 32-bit sample words.
    ///
    /// # Errors
    /// Same conditions as [`new`](Self::new).
    pub fn from_raw(channel: ChannelId, words: &[u32]) -> Result<Self> {
        Self::new(channel, words.iter().copied().map(Qie10Sample::new).collect())
    }

    /// Returns the sample at time slice `i`.
    #[inline]
    #[must_use]
    pub fn sample(&self, i: usize) -> Qie10Sample {
        self.samples[i]
    }

    /// Returns all sample words in time-slice order.
    #[must_use]
    pub fn raw_samples(&self) -> &[Qie10Sample] {
        &self.samples
    }

    /// Returns the slice marked as sample-of-interest, if any.
    #[must_use]
    pub fn soi_index(&self) -> Option<usize> {
        self.samples.iter().position(|s| s.soi())
    }

    /// Returns true if every sample has its link-ok flag set.
    #[must_use]
    pub fn link_ok(&self) -> bool {
        self.samples.iter().all(|s| s.ok())
    }
}

impl Digi for Qie10Frame {
    #[inline]
    fn channel(&self) -> ChannelId {
        self.channel
    }

    #[inline]
    fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    fn adc(&self, i: usize) -> u16 {
        self.samples[i].adc()
    }
}

/// A QIE11 flat frame: channel address plus up to ten 16-bit sample words.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Qie11Frame {
    channel: ChannelId,
    samples: Vec<Qie11Sample>,
}

impl Qie11Frame {
    /// Creates a frame from decoded sample words.
    ///
    /// # Errors
    /// Returns [`Error::InvalidFrameLength`] for an empty or oversized frame,
    /// and [`Error::WrongSubdetector`] for a channel outside barrel/endcap.
    pub fn new(channel: ChannelId, samples: Vec<Qie11Sample>) -> Result<Self> {
        check_frame(FrameFlavor::Qie11, channel, &samples)?;
        Ok(Self { channel, samples })
    }

    /// Creates a frame from raw 16-bit sample words.
    ///
    /// # Errors
    /// Same conditions as [`new`](Self::new).
    pub fn from_raw(channel: ChannelId, words: &[u16]) -> Result<Self> {
        Self::new(channel, words.iter().copied().map(Qie11Sample::new).collect())
    }

    /// Returns the sample at time slice `i`.
    #[inline]
    #[must_use]
    pub fn sample(&self, i: usize) -> Qie11Sample {
        self.samples[i]
    }

    /// Returns all sample words in time-slice order.
    #[must_use]
    pub fn raw_samples(&self) -> &[Qie11Sample] {
        &self.samples
    }

    /// Returns the slice marked as sample-of-interest, if any.
    #[must_use]
    pub fn soi_index(&self) -> Option<usize> {
        self.samples.iter().position(|s| s.soi())
    }
}

impl Digi for Qie11Frame {
    #[inline]
    fn channel(&self) -> ChannelId {
        self.channel
    }

    #[inline]
    fn len(&self) -> usize {
        self.samples.len()
    }

    #[inline]
    fn adc(&self, i: usize) -> u16 {
        self.samples[i].adc()
    }
}

/// A frame of any flavor, for pipelines that mix front-end types.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum AnyFrame {
    /// Barrel/endcap QIE8 frame.
    Hbhe(HbheFrame),
    /// Outer-section QIE8 frame.
    Ho(HoFrame),
    /// Forward-section QIE8 frame.
    Hf(HfFrame),
    /// QIE10 flat frame.
    Qie10(Qie10Frame),
    /// QIE11 flat frame.
    Qie11(Qie11Frame),
}

impl AnyFrame {
    /// Returns this frame's flavor tag.
    #[must_use]
    pub fn flavor(&self) -> FrameFlavor {
        match self {
            AnyFrame::Hbhe(_) => FrameFlavor::Hbhe,
            AnyFrame::Ho(_) => FrameFlavor::Ho,
            AnyFrame::Hf(_) => FrameFlavor::Hf,
            AnyFrame::Qie10(_) => FrameFlavor::Qie10,
            AnyFrame::Qie11(_) => FrameFlavor::Qie11,
        }
    }
}

impl Digi for AnyFrame {
    fn channel(&self) -> ChannelId {
        match self {
            AnyFrame::Hbhe(f) => f.channel(),
            AnyFrame::Ho(f) => f.channel(),
            AnyFrame::Hf(f) => f.channel(),
            AnyFrame::Qie10(f) => f.channel(),
            AnyFrame::Qie11(f) => f.channel(),
        }
    }

    fn len(&self) -> usize {
        match self {
            AnyFrame::Hbhe(f) => f.len(),
            AnyFrame::Ho(f) => f.len(),
            AnyFrame::Hf(f) => f.len(),
            AnyFrame::Qie10(f) => f.len(),
            AnyFrame::Qie11(f) => f.len(),
        }
    }

    fn adc(&self, i: usize) -> u16 {
        match self {
            AnyFrame::Hbhe(f) => f.adc(i),
            AnyFrame::Ho(f) => f.adc(i),
            AnyFrame::Hf(f) => f.adc(i),
            AnyFrame::Qie10(f) => f.adc(i),
            AnyFrame::Qie11(f) => f.adc(i),
        }
    }
}

impl From<HbheFrame> for AnyFrame {
    fn from(frame: HbheFrame) -> Self {
        AnyFrame::Hbhe(frame)
    }
}

impl From<HoFrame> for AnyFrame {
    fn from(frame: HoFrame) -> Self {
        AnyFrame::Ho(frame)
    }
}

impl From<HfFrame> for AnyFrame {
    fn from(frame: HfFrame) -> Self {
        AnyFrame::Hf(frame)
    }
}

impl From<Qie10Frame> for AnyFrame {
    fn from(frame: Qie10Frame) -> Self {
        AnyFrame::Qie10(frame)
    }
}

impl From<Qie11Frame> for AnyFrame {
    fn from(frame: Qie11Frame) -> Self {
        AnyFrame::Qie11(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barrel_channel() -> ChannelId {
        ChannelId::new(Subdetector::Barrel, 7, 3, 0).unwrap()
    }

    fn forward_channel() -> ChannelId {
        ChannelId::new(Subdetector::Forward, 30, 11, 1).unwrap()
    }

    #[test]
    fn test_flavor_codes() {
        for flavor in [
            FrameFlavor::Hbhe,
            FrameFlavor::Ho,
            FrameFlavor::Hf,
            FrameFlavor::Qie10,
            FrameFlavor::Qie11,
        ] {
            assert_eq!(FrameFlavor::from_code(flavor.code()).unwrap(), flavor);
        }
        assert!(FrameFlavor::from_code(5).is_err());
    }

    #[test]
    fn test_hbhe_frame_digi() {
        let samples: Vec<QieSample> = (0..10)
            .map(|i| QieSample::from_adc(10 + i, (i % 4) as u8))
            .collect();
        let frame = HbheFrame::new(barrel_channel(), samples).unwrap();

        assert_eq!(frame.len(), 10);
        assert_eq!(frame.adc(0), 10);
        assert_eq!(frame.adc(9), 19);
        assert_eq!(frame.channel(), barrel_channel());
        assert!(frame.capid_rotation_ok());
    }

    #[test]
    fn test_capid_rotation_broken() {
        let samples = vec![
            QieSample::from_adc(1, 0),
            QieSample::from_adc(2, 1),
            QieSample::from_adc(3, 3),
        ];
        let frame = HbheFrame::new(barrel_channel(), samples).unwrap();
        assert!(!frame.capid_rotation_ok());
    }

    #[test]
    fn test_frame_length_limits() {
        let err = HbheFrame::new(barrel_channel(), vec![]).unwrap_err();
        assert!(matches!(err, Error::InvalidFrameLength { got: 0, .. }));

        let too_many = vec![QieSample::from_adc(1, 0); MAX_TIME_SLICES + 1];
        let err = HbheFrame::new(barrel_channel(), too_many).unwrap_err();
        assert!(matches!(err, Error::InvalidFrameLength { got: 11, .. }));
    }

    #[test]
    fn test_subdetector_mismatch() {
        let err = HbheFrame::new(forward_channel(), vec![QieSample::from_adc(1, 0)]).unwrap_err();
        assert!(matches!(err, Error::WrongSubdetector { .. }));

        let err = Qie10Frame::new(barrel_channel(), vec![Qie10Sample::from_adc(1, 0)]).unwrap_err();
        assert!(matches!(err, Error::WrongSubdetector { .. }));
    }

    #[test]
    fn test_qie10_frame() {
        let mut samples: Vec<Qie10Sample> = (0..4).map(|i| Qie10Sample::from_adc(i, 0)).collect();
        samples[2] = Qie10Sample::new(samples[2].0 | (1 << 22));
        let frame = Qie10Frame::new(forward_channel(), samples).unwrap();

        assert_eq!(frame.soi_index(), Some(2));
        assert!(frame.link_ok());
        assert_eq!(frame.adc(3), 3);
    }

    #[test]
    fn test_any_frame_dispatch() {
        let frame: AnyFrame = Qie11Frame::from_raw(barrel_channel(), &[0x10, 0x20])
            .unwrap()
            .into();
        assert_eq!(frame.flavor(), FrameFlavor::Qie11);
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.adc(1), 0x20);
        assert_eq!(frame.channel(), barrel_channel());
    }

    #[test]
    fn test_qie11_from_raw() {
        let words: Vec<u16> = vec![0x10, 0x20, 0x30 | (1 << 14), 0x40];
        let frame = Qie11Frame::from_raw(barrel_channel(), &words).unwrap();
        assert_eq!(frame.len(), 4);
        assert_eq!(frame.adc(1), 0x20);
        assert_eq!(frame.soi_index(), Some(2));
    }
}
