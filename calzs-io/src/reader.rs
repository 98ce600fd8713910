//! Memory-mapped digi file reader.
//!
//! A digi file is a flat sequence of little-endian records:
//!
//! ```text
//! [raw channel: u32] [flavor code: u8] [sample count: u8] [samples...]
//! ```
//!
//! QIE10 samples are 32-bit words; every other flavor ships 16-bit words.
//! The file is memory-mapped and decoded lazily, one frame per iterator
//! step, so arbitrarily large files cost one page table instead of one
//! allocation per byte.

use crate::{Error, Result};
use calzs_core::{ChannelId, Digi};
use calzs_qie::{AnyFrame, FrameFlavor, HbheFrame, HfFrame, HoFrame, Qie10Frame, Qie11Frame};
use memmap2::Mmap;
use std::fs::File;
use std::path::{Path, PathBuf};

const HEADER_BYTES: usize = 6;

fn words_u16(body: &[u8]) -> Vec<u16> {
    body.chunks_exact(2)
        .map(|c| u16::from_le_bytes([c[0], c[1]]))
        .collect()
}

fn words_u32(body: &[u8]) -> Vec<u32> {
    body.chunks_exact(4)
        .map(|c| u32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

/// A memory-mapped digi file.
pub struct DigiFileReader {
    mmap: Mmap,
    path: PathBuf,
}

impl DigiFileReader {
    /// Opens a digi file for memory-mapped reading.
    ///
    /// # Errors
    /// Returns an error if the file cannot be opened or memory-mapped.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(&path)?;
        // SAFETY: The file is opened read-only and we assume it is not
        // modified concurrently. This is the standard safety contract for
        // memory mapping.
        #[allow(unsafe_code)]
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(Self {
            mmap,
            path: path.as_ref().to_path_buf(),
        })
    }

    /// Returns the file size in bytes.
    #[must_use]
    pub fn file_size(&self) -> usize {
        self.mmap.len()
    }

    /// Returns the path this reader was opened with.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns an iterator decoding one frame per step.
    #[must_use]
    pub fn frames(&self) -> FrameIter<'_> {
        FrameIter {
            bytes: &self.mmap[..],
            offset: 0,
            failed: false,
        }
    }

    /// Decodes the whole file into memory.
    ///
    /// # Errors
    /// Fails on the first undecodable record.
    pub fn read_all(&self) -> Result<Vec<AnyFrame>> {
        self.frames().collect()
    }

    /// Scans the file and reports frame counts and the ADC range.
    ///
    /// # Errors
    /// Fails on the first undecodable record.
    pub fn summarize(&self) -> Result<FileSummary> {
        let mut summary = FileSummary::default();
        for frame in self.frames() {
            let frame = frame?;
            summary.frame_count += 1;
            summary.flavor_counts[frame.flavor().code() as usize] += 1;
            for adc in frame.samples() {
                summary.adc_min = Some(summary.adc_min.map_or(adc, |m: u16| m.min(adc)));
                summary.adc_max = Some(summary.adc_max.map_or(adc, |m: u16| m.max(adc)));
            }
        }
        Ok(summary)
    }
}

/// Frame counts and ADC range for one digi file.
#[derive(Debug, Clone, Default)]
pub struct FileSummary {
    /// Total frames in the file.
    pub frame_count: usize,
    /// Frame counts indexed by flavor code.
    pub flavor_counts: [usize; 5],
    /// Smallest ADC count seen, if any frame carried samples.
    pub adc_min: Option<u16>,
    /// Largest ADC count seen.
    pub adc_max: Option<u16>,
}

impl FileSummary {
    /// Returns the number of frames of one flavor.
    #[must_use]
    pub fn flavor_count(&self, flavor: FrameFlavor) -> usize {
        self.flavor_counts[flavor.code() as usize]
    }
}

/// Iterator over the frames of a mapped digi file.
pub struct FrameIter<'a> {
    bytes: &'a [u8],
    offset: usize,
    failed: bool,
}

impl FrameIter<'_> {
    fn decode_next(&mut self) -> Result<AnyFrame> {
        let start = self.offset;
        let header = self
            .bytes
            .get(start..start + HEADER_BYTES)
            .ok_or(Error::TruncatedRecord { offset: start })?;

        let raw_channel = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let channel = ChannelId::from_raw(raw_channel)?;
        let flavor = FrameFlavor::from_code(header[4])?;
        let n_samples = header[5] as usize;

        let word_bytes = match flavor {
            FrameFlavor::Qie10 => 4,
            _ => 2,
        };
        let body_start = start + HEADER_BYTES;
        let body = self
            .bytes
            .get(body_start..body_start + n_samples * word_bytes)
            .ok_or(Error::TruncatedRecord { offset: body_start })?;

        let frame = match flavor {
            FrameFlavor::Qie10 => {
                AnyFrame::Qie10(Qie10Frame::from_raw(channel, &words_u32(body))?)
            }
            FrameFlavor::Hbhe => AnyFrame::Hbhe(HbheFrame::from_raw(channel, &words_u16(body))?),
            FrameFlavor::Ho => AnyFrame::Ho(HoFrame::from_raw(channel, &words_u16(body))?),
            FrameFlavor::Hf => AnyFrame::Hf(HfFrame::from_raw(channel, &words_u16(body))?),
            FrameFlavor::Qie11 => {
                AnyFrame::Qie11(Qie11Frame::from_raw(channel, &words_u16(body))?)
            }
        };

        self.offset = body_start + n_samples * word_bytes;
        Ok(frame)
    }
}

impl Iterator for FrameIter<'_> {
    type Item = Result<AnyFrame>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed || self.offset >= self.bytes.len() {
            return None;
        }
        let result = self.decode_next();
        if result.is_err() {
            // A decode failure leaves the offset unusable; stop iterating.
            self.failed = true;
        }
        Some(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calzs_core::Subdetector;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn record(raw_channel: u32, flavor: u8, samples: &[u16]) -> Vec<u8> {
        let mut bytes = raw_channel.to_le_bytes().to_vec();
        bytes.push(flavor);
        bytes.push(samples.len() as u8);
        for word in samples {
            bytes.extend_from_slice(&word.to_le_bytes());
        }
        bytes
    }

    fn mapped(bytes: &[u8]) -> (NamedTempFile, DigiFileReader) {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(bytes).unwrap();
        file.flush().unwrap();
        let reader = DigiFileReader::open(file.path()).unwrap();
        (file, reader)
    }

    fn barrel_raw() -> u32 {
        ChannelId::new(Subdetector::Barrel, 15, 63, 1).unwrap().pack()
    }

    #[test]
    fn test_decode_frames() {
        let mut bytes = record(barrel_raw(), 0, &[10, 11, 12, 13]);
        bytes.extend(record(barrel_raw(), 4, &[0x20, 0x21]));

        let (_file, reader) = mapped(&bytes);
        let frames = reader.read_all().unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].flavor(), FrameFlavor::Hbhe);
        assert_eq!(frames[0].adc(3), 13);
        assert_eq!(frames[1].flavor(), FrameFlavor::Qie11);
        assert_eq!(frames[1].len(), 2);
    }

    #[test]
    fn test_truncated_header() {
        let bytes = record(barrel_raw(), 0, &[10, 11]);
        let (_file, reader) = mapped(&bytes[..bytes.len() - 5]);

        let mut frames = reader.frames();
        let err = frames.next().unwrap().unwrap_err();
        assert!(matches!(err, Error::TruncatedRecord { .. }));
        // The iterator does not spin after a failure.
        assert!(frames.next().is_none());
    }

    #[test]
    fn test_unknown_flavor() {
        let bytes = record(barrel_raw(), 9, &[10]);
        let (_file, reader) = mapped(&bytes);

        let err = reader.read_all().unwrap_err();
        assert!(matches!(err, Error::Qie(calzs_qie::Error::InvalidFlavor(9))));
    }

    #[test]
    fn test_bad_channel_word() {
        let bytes = record(0xFFFF_FFFF, 0, &[10]);
        let (_file, reader) = mapped(&bytes);

        let err = reader.read_all().unwrap_err();
        assert!(matches!(err, Error::Core(calzs_core::Error::InvalidChannel { .. })));
    }

    #[test]
    fn test_summarize() {
        let mut bytes = record(barrel_raw(), 0, &[10, 11, 12, 13]);
        bytes.extend(record(barrel_raw(), 4, &[0x20, 0x21]));

        let (_file, reader) = mapped(&bytes);
        let summary = reader.summarize().unwrap();

        assert_eq!(summary.frame_count, 2);
        assert_eq!(summary.flavor_count(FrameFlavor::Hbhe), 1);
        assert_eq!(summary.flavor_count(FrameFlavor::Qie11), 1);
        assert_eq!(summary.flavor_count(FrameFlavor::Hf), 0);
        assert_eq!(summary.adc_min, Some(10));
        assert_eq!(summary.adc_max, Some(0x21));
    }
}
