//! Trajectory recording and CSV export.

use crate::capture::Frame;
use crate::extraction::PositionReport;
use chrono::{DateTime, Local};
use std::io::{self, BufWriter, Write};
use std::path::Path;
use std::time::Instant;

/// Column header of the exported CSV.
pub const CSV_HEADER: &str =
    "sequence,elapsed_s,center_x,center_y,half_width,half_height,detected";

/// One recorded position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrackSample {
    pub sequence: u64,
    /// Seconds since the first recorded frame was captured.
    pub elapsed_secs: f64,
    pub center_x: u32,
    pub center_y: u32,
    pub half_width: u32,
    pub half_height: u32,
    pub detected: bool,
}

/// Position history of one tracking run.
#[derive(Debug, Clone, Default)]
pub struct Trajectory {
    samples: Vec<TrackSample>,
    origin: Option<(Instant, DateTime<Local>)>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends the report produced for `frame`.
    pub fn record(&mut self, frame: &Frame, report: &PositionReport) {
        let (start, _) = *self
            .origin
            .get_or_insert_with(|| (frame.timestamp(), Local::now()));
        let elapsed_secs = frame
            .timestamp()
            .saturating_duration_since(start)
            .as_secs_f64();

        self.samples.push(TrackSample {
            sequence: frame.sequence(),
            elapsed_secs,
            center_x: report.center_x,
            center_y: report.center_y,
            half_width: report.half_width,
            half_height: report.half_height,
            detected: report.detected,
        });
    }

    pub fn samples(&self) -> &[TrackSample] {
        &self.samples
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Wall-clock time of the first recorded frame.
    pub fn started_at(&self) -> Option<DateTime<Local>> {
        self.origin.map(|(_, wall)| wall)
    }

    /// Distance travelled by the center in pixels.
    ///
    /// Samples before the first detection sit at the origin and are skipped.
    pub fn path_length(&self) -> f64 {
        let centers: Vec<(f64, f64)> = self
            .samples
            .iter()
            .skip_while(|s| !s.detected)
            .map(|s| (s.center_x as f64, s.center_y as f64))
            .collect();

        centers
            .windows(2)
            .map(|w| {
                let (dx, dy) = (w[1].0 - w[0].0, w[1].1 - w[0].1);
                (dx * dx + dy * dy).sqrt()
            })
            .sum()
    }

    /// Fraction of samples with a detection.
    pub fn detection_ratio(&self) -> f64 {
        if self.samples.is_empty() {
            return 0.0;
        }
        let detected = self.samples.iter().filter(|s| s.detected).count();
        detected as f64 / self.samples.len() as f64
    }

    /// Writes the trajectory as CSV.
    ///
    /// A leading `#` comment carries the wall-clock start time.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        if let Some(start) = self.started_at() {
            writeln!(writer, "# started {}", start.to_rfc3339())?;
        }
        writeln!(writer, "{CSV_HEADER}")?;
        for s in &self.samples {
            writeln!(
                writer,
                "{},{:.6},{},{},{},{},{}",
                s.sequence,
                s.elapsed_secs,
                s.center_x,
                s.center_y,
                s.half_width,
                s.half_height,
                u8::from(s.detected)
            )?;
        }
        writer.flush()
    }

    /// Writes the CSV to a file, replacing it if present.
    pub fn save_csv(&self, path: impl AsRef<Path>) -> io::Result<()> {
        let file = std::fs::File::create(path.as_ref())?;
        self.write_csv(BufWriter::new(file))?;
        tracing::info!(
            path = %path.as_ref().display(),
            samples = self.samples.len(),
            "Trajectory written"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::BoundingBox;
    use crate::preprocess::Mask;

    fn frame(seq: u64) -> Frame {
        Frame::new(vec![0u8; 4], 2, 2, seq)
    }

    fn report(cx: u32, cy: u32, detected: bool) -> PositionReport {
        PositionReport {
            center_x: cx,
            center_y: cy,
            half_width: 3,
            half_height: 2,
            binary_mask: Mask::zeros(2, 2),
            bounding_box: BoundingBox::default(),
            detected,
        }
    }

    #[test]
    fn test_empty_trajectory() {
        let trajectory = Trajectory::new();
        assert!(trajectory.is_empty());
        assert!(trajectory.started_at().is_none());
        assert_eq!(trajectory.path_length(), 0.0);
        assert_eq!(trajectory.detection_ratio(), 0.0);
    }

    #[test]
    fn test_path_length_skips_leading_misses() {
        let mut trajectory = Trajectory::new();
        trajectory.record(&frame(1), &report(0, 0, false));
        trajectory.record(&frame(2), &report(10, 10, true));
        trajectory.record(&frame(3), &report(13, 14, true));
        trajectory.record(&frame(4), &report(13, 14, false));
        trajectory.record(&frame(5), &report(13, 20, true));

        assert!((trajectory.path_length() - 11.0).abs() < 1e-9);
        assert!((trajectory.detection_ratio() - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_elapsed_is_monotonic() {
        let mut trajectory = Trajectory::new();
        trajectory.record(&frame(1), &report(1, 1, true));
        trajectory.record(&frame(2), &report(1, 1, true));

        let samples = trajectory.samples();
        assert_eq!(samples[0].elapsed_secs, 0.0);
        assert!(samples[1].elapsed_secs >= samples[0].elapsed_secs);
    }

    #[test]
    fn test_csv_output() {
        let mut trajectory = Trajectory::new();
        trajectory.record(&frame(7), &report(15, 12, true));
        trajectory.record(&frame(8), &report(15, 12, false));

        let mut out = Vec::new();
        trajectory.write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert!(lines[0].starts_with("# started "));
        assert_eq!(lines[1], CSV_HEADER);
        assert!(lines[2].starts_with("7,0.000000,15,12,3,2,1"));
        assert!(lines[3].starts_with("8,"));
        assert!(lines[3].ends_with(",15,12,3,2,0"));
        assert_eq!(lines.len(), 4);
    }
}
