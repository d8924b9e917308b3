//! JSON-lines replay of tracked detections
//!
//! Each non-blank line holds one frame:
//!
//! ```json
//! {"frame": 12, "detections": [{"track_id": 7, "class_id": 2, "confidence": 0.91, "bbox": [10, 20, 60, 80]}]}
//! ```
//!
//! `frame` may be omitted, in which case frames are numbered in file order.

use crate::error::{SourceError, SourceResult};
use traffic_core::{Detection, Frame};

use serde::Deserialize;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use tracing::trace;

#[derive(Debug, Deserialize)]
struct FrameRecord {
    frame: Option<u64>,
    #[serde(default)]
    detections: Vec<Detection>,
}

/// Iterator over the frames of a JSON-lines detection file
pub struct JsonLinesSource<R> {
    lines: Lines<R>,
    line_no: usize,
    ordinal: u64,
}

impl JsonLinesSource<BufReader<File>> {
    /// Open a detection file
    pub fn open(path: impl AsRef<Path>) -> SourceResult<Self> {
        let file = File::open(path)?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
            ordinal: 0,
        }
    }
}

impl<R: BufRead> Iterator for JsonLinesSource<R> {
    type Item = SourceResult<Frame>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = self.lines.next()?;
            self.line_no += 1;

            let line = match line {
                Ok(line) => line,
                Err(e) => return Some(Err(SourceError::Io(e))),
            };
            if line.trim().is_empty() {
                continue;
            }

            let record: FrameRecord = match serde_json::from_str(&line) {
                Ok(record) => record,
                Err(e) => return Some(Err(SourceError::parse(self.line_no, e))),
            };

            let index = record.frame.unwrap_or(self.ordinal);
            self.ordinal += 1;
            trace!("Read frame {} with {} detections", index, record.detections.len());

            return Some(Ok(Frame::new(index, record.detections)));
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use traffic_core::TrackId;

    fn source(text: &str) -> JsonLinesSource<Cursor<Vec<u8>>> {
        JsonLinesSource::new(Cursor::new(text.as_bytes().to_vec()))
    }

    #[test]
    fn test_reads_frames() {
        let text = concat!(
            r#"{"frame": 4, "detections": [{"track_id": 7, "class_id": 2, "confidence": 0.9, "bbox": [0, 0, 10, 10]}]}"#,
            "\n",
            r#"{"frame": 5, "detections": []}"#,
            "\n"
        );

        let frames: Vec<Frame> = source(text).collect::<Result<_, _>>().unwrap();

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].index, 4);
        assert_eq!(frames[0].detections[0].track_id, TrackId(7));
        assert_eq!(frames[0].detections[0].class_id, 2);
        assert!(frames[1].is_empty());
    }

    #[test]
    fn test_skips_blank_lines_and_numbers_frames() {
        let text = "\n{\"detections\": []}\n   \n{}\n";

        let frames: Vec<Frame> = source(text).collect::<Result<_, _>>().unwrap();

        assert_eq!(frames.iter().map(|f| f.index).collect::<Vec<_>>(), vec![0, 1]);
    }

    #[test]
    fn test_reports_bad_line_number() {
        let text = "{\"frame\": 0}\n\n{\"frame\": \"one\"}\n";
        let mut source = source(text);

        assert!(source.next().unwrap().is_ok());
        match source.next().unwrap() {
            Err(SourceError::Parse { line, .. }) => assert_eq!(line, 3),
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_open_missing_file() {
        let result = JsonLinesSource::open("/nonexistent/detections.jsonl");
        assert!(matches!(result, Err(SourceError::Io(_))));
    }
}
