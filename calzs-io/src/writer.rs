//! File writers for suppressed digi output.

use crate::conditions::subdet_tag;
use crate::Result;
use calzs_algorithms::RetainedFrame;
use calzs_core::Digi;
use calzs_qie::AnyFrame;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Writer for suppressed digi output.
///
/// The binary form uses the same record layout the reader understands, so
/// a suppressed file can be fed back through the pipeline. The CSV form is
/// for inspection and carries the decision detail (flag, window sum) that
/// the binary form drops.
pub struct DigiFileWriter {
    writer: BufWriter<File>,
}

impl DigiFileWriter {
    /// Creates a new file writer.
    ///
    /// # Errors
    /// Returns an error if the file cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn write_record(&mut self, frame: &AnyFrame) -> Result<()> {
        self.writer
            .write_all(&frame.channel().pack().to_le_bytes())?;
        self.writer.write_all(&[frame.flavor().code()])?;
        self.writer.write_all(&[frame.len() as u8])?;

        match frame {
            AnyFrame::Hbhe(f) => {
                for sample in f.raw_samples() {
                    self.writer.write_all(&sample.0.to_le_bytes())?;
                }
            }
            AnyFrame::Ho(f) => {
                for sample in f.raw_samples() {
                    self.writer.write_all(&sample.0.to_le_bytes())?;
                }
            }
            AnyFrame::Hf(f) => {
                for sample in f.raw_samples() {
                    self.writer.write_all(&sample.0.to_le_bytes())?;
                }
            }
            AnyFrame::Qie10(f) => {
                for sample in f.raw_samples() {
                    self.writer.write_all(&sample.0.to_le_bytes())?;
                }
            }
            AnyFrame::Qie11(f) => {
                for sample in f.raw_samples() {
                    self.writer.write_all(&sample.0.to_le_bytes())?;
                }
            }
        }
        Ok(())
    }

    /// Writes retained frames as binary digi records.
    ///
    /// # Errors
    /// Returns an error on write failure.
    pub fn write_retained_binary(&mut self, retained: &[RetainedFrame<AnyFrame>]) -> Result<()> {
        for item in retained {
            self.write_record(&item.frame)?;
        }
        self.writer.flush()?;
        Ok(())
    }

    /// Writes retained frames as CSV, one line per frame.
    ///
    /// # Errors
    /// Returns an error on write failure.
    pub fn write_retained_csv(
        &mut self,
        retained: &[RetainedFrame<AnyFrame>],
        header: bool,
    ) -> Result<()> {
        if header {
            writeln!(
                self.writer,
                "ieta,iphi,depth,subdet,flavor,flagged,window_sum"
            )?;
        }

        for item in retained {
            let channel = item.frame.channel();
            writeln!(
                self.writer,
                "{},{},{},{},{:?},{},{}",
                channel.ieta,
                channel.iphi,
                channel.depth,
                subdet_tag(channel.subdet),
                item.frame.flavor(),
                item.flagged,
                item.window_sum
            )?;
        }

        self.writer.flush()?;
        Ok(())
    }

    /// Flushes the writer.
    ///
    /// # Errors
    /// Returns an error on flush failure.
    pub fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader::DigiFileReader;
    use calzs_core::{ChannelId, Subdetector};
    use calzs_qie::{FrameFlavor, HbheFrame, Qie10Frame, Qie10Sample, QieSample};
    use tempfile::NamedTempFile;

    fn retained() -> Vec<RetainedFrame<AnyFrame>> {
        let barrel = ChannelId::new(Subdetector::Barrel, 15, 63, 1).unwrap();
        let forward = ChannelId::new(Subdetector::Forward, -30, 11, 2).unwrap();

        vec![
            RetainedFrame {
                frame: HbheFrame::new(
                    barrel,
                    (0..4).map(|i| QieSample::from_adc(40 + i, (i % 4) as u8)).collect(),
                )
                .unwrap()
                .into(),
                flagged: false,
                window_sum: 120,
            },
            RetainedFrame {
                frame: Qie10Frame::new(
                    forward,
                    (0..3).map(|i| Qie10Sample::from_adc(200 + i, (i % 4) as u8)).collect(),
                )
                .unwrap()
                .into(),
                flagged: true,
                window_sum: -61,
            },
        ]
    }

    #[test]
    fn test_csv_output() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DigiFileWriter::create(file.path()).unwrap();
        writer.write_retained_csv(&retained(), true).unwrap();

        let content = std::fs::read_to_string(file.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "ieta,iphi,depth,subdet,flavor,flagged,window_sum");
        assert_eq!(lines[1], "15,63,1,HB,Hbhe,false,120");
        assert_eq!(lines[2], "-30,11,2,HF,Qie10,true,-61");
    }

    #[test]
    fn test_binary_output_is_readable() {
        let file = NamedTempFile::new().unwrap();
        let mut writer = DigiFileWriter::create(file.path()).unwrap();
        writer.write_retained_binary(&retained()).unwrap();

        let reader = DigiFileReader::open(file.path()).unwrap();
        let frames = reader.read_all().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].flavor(), FrameFlavor::Hbhe);
        assert_eq!(frames[0].adc(2), 42);
        assert_eq!(frames[1].flavor(), FrameFlavor::Qie10);
        assert_eq!(frames[1].adc(0), 200);
    }
}
