use serde::{Deserialize, Serialize};
use std::fmt;

/// Outcome the caller reports for the file it was handed
#[derive(Debug, Clone, PartialEq)]
pub enum UploadResult {
    Uploaded { members_inserted: usize },
    Conflict { job_number: String, bundle_name: String },
    Failed { message: String },
}

/// How a paused conflict is settled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Replace,
    Skip,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum UploadOutcome {
    Uploaded {
        file_name: String,
        members_inserted: usize,
        replaced: bool,
    },
    Skipped {
        file_name: String,
    },
    Failed {
        file_name: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueueError {
    NothingInFlight,
    NotPaused,
}

impl fmt::Display for QueueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QueueError::NothingInFlight => write!(f, "no upload is in flight"),
            QueueError::NotPaused => write!(f, "the queue is not waiting for a conflict decision"),
        }
    }
}

impl std::error::Error for QueueError {}

/// File handed out by the queue
#[derive(Debug)]
pub struct UploadTicket<'a, T> {
    pub index: usize,
    pub file_name: &'a str,
    pub payload: &'a T,
    pub replace: bool,
}

#[derive(Debug, Clone, PartialEq)]
enum QueueState {
    Ready { replace: bool },
    InFlight { replace: bool },
    Paused { job_number: String, bundle_name: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub total: usize,
    pub uploaded: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl fmt::Display for QueueSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Processed {} of {} files successfully",
            self.uploaded, self.total
        )
    }
}

/// Sequential markup upload.
///
/// Files go out one at a time. A conflict pauses the queue until the caller
/// decides to replace the stored bundle or skip the file.
#[derive(Debug)]
pub struct UploadQueue<T> {
    files: Vec<(String, T)>,
    rejected: Vec<String>,
    cursor: usize,
    state: QueueState,
    outcomes: Vec<UploadOutcome>,
}

impl<T> UploadQueue<T> {
    /// Keeps `.xml` files; everything else is listed in `rejected()`.
    pub fn new(files: impl IntoIterator<Item = (String, T)>) -> Self {
        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for (name, payload) in files {
            if name.to_ascii_lowercase().ends_with(".xml") {
                accepted.push((name, payload));
            } else {
                rejected.push(name);
            }
        }
        Self {
            files: accepted,
            rejected,
            cursor: 0,
            state: QueueState::Ready { replace: false },
            outcomes: Vec::new(),
        }
    }

    pub fn rejected(&self) -> &[String] {
        &self.rejected
    }

    pub fn outcomes(&self) -> &[UploadOutcome] {
        &self.outcomes
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.files.len()
    }

    /// Conflict waiting for a decision, as (job number, bundle name)
    pub fn pending_conflict(&self) -> Option<(&str, &str)> {
        match &self.state {
            QueueState::Paused {
                job_number,
                bundle_name,
            } => Some((job_number.as_str(), bundle_name.as_str())),
            _ => None,
        }
    }

    /// Hands out the current file; `None` while one is in flight, while
    /// paused, or when everything has been processed.
    pub fn next(&mut self) -> Option<UploadTicket<'_, T>> {
        let replace = match self.state {
            QueueState::Ready { replace } => replace,
            _ => return None,
        };
        if self.is_finished() {
            return None;
        }
        self.state = QueueState::InFlight { replace };
        let (name, payload) = &self.files[self.cursor];
        Some(UploadTicket {
            index: self.cursor,
            file_name: name,
            payload,
            replace,
        })
    }

    pub fn record(&mut self, result: UploadResult) -> Result<(), QueueError> {
        let replace = match self.state {
            QueueState::InFlight { replace } => replace,
            _ => return Err(QueueError::NothingInFlight),
        };
        let file_name = self.files[self.cursor].0.clone();

        match result {
            UploadResult::Uploaded { members_inserted } => {
                self.outcomes.push(UploadOutcome::Uploaded {
                    file_name,
                    members_inserted,
                    replaced: replace,
                });
                self.advance();
            }
            UploadResult::Failed { message } => {
                self.outcomes.push(UploadOutcome::Failed { file_name, message });
                self.advance();
            }
            UploadResult::Conflict {
                job_number,
                bundle_name,
            } => {
                self.state = QueueState::Paused {
                    job_number,
                    bundle_name,
                };
            }
        }
        Ok(())
    }

    pub fn resolve(&mut self, resolution: Resolution) -> Result<(), QueueError> {
        if !matches!(self.state, QueueState::Paused { .. }) {
            return Err(QueueError::NotPaused);
        }
        match resolution {
            Resolution::Replace => {
                self.state = QueueState::Ready { replace: true };
            }
            Resolution::Skip => {
                let file_name = self.files[self.cursor].0.clone();
                self.outcomes.push(UploadOutcome::Skipped { file_name });
                self.advance();
            }
        }
        Ok(())
    }

    pub fn summary(&self) -> QueueSummary {
        let mut summary = QueueSummary {
            total: self.files.len(),
            uploaded: 0,
            skipped: 0,
            failed: 0,
        };
        for outcome in &self.outcomes {
            match outcome {
                UploadOutcome::Uploaded { .. } => summary.uploaded += 1,
                UploadOutcome::Skipped { .. } => summary.skipped += 1,
                UploadOutcome::Failed { .. } => summary.failed += 1,
            }
        }
        summary
    }

    fn advance(&mut self) {
        self.cursor += 1;
        self.state = QueueState::Ready { replace: false };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn queue() -> UploadQueue<u8> {
        UploadQueue::new(vec![
            ("a.xml".to_string(), 1),
            ("notes.txt".to_string(), 2),
            ("B.XML".to_string(), 3),
            ("c.xml".to_string(), 4),
        ])
    }

    #[test]
    fn test_only_xml_accepted() {
        let q = queue();
        assert_eq!(q.len(), 3);
        assert_eq!(q.rejected(), &["notes.txt".to_string()]);
    }

    #[test]
    fn test_one_file_in_flight() {
        let mut q = queue();
        let t = q.next().unwrap();
        assert_eq!((t.index, t.file_name, *t.payload, t.replace), (0, "a.xml", 1, false));
        assert!(q.next().is_none());
        q.record(UploadResult::Uploaded { members_inserted: 10 }).unwrap();
        assert_eq!(q.next().unwrap().file_name, "B.XML");
    }

    #[test]
    fn test_conflict_pauses_then_replace() {
        let mut q = queue();
        q.next().unwrap();
        q.record(UploadResult::Conflict {
            job_number: "J1".into(),
            bundle_name: "B1".into(),
        })
        .unwrap();
        assert_eq!(q.pending_conflict(), Some(("J1", "B1")));
        assert!(q.next().is_none());

        q.resolve(Resolution::Replace).unwrap();
        let t = q.next().unwrap();
        assert_eq!(t.file_name, "a.xml");
        assert!(t.replace);
        q.record(UploadResult::Uploaded { members_inserted: 4 }).unwrap();
        assert_eq!(
            q.outcomes()[0],
            UploadOutcome::Uploaded {
                file_name: "a.xml".into(),
                members_inserted: 4,
                replaced: true
            }
        );
        assert!(!q.next().unwrap().replace);
    }

    #[test]
    fn test_skip_and_summary() {
        let mut q = queue();
        q.next().unwrap();
        q.record(UploadResult::Conflict {
            job_number: "J1".into(),
            bundle_name: "B1".into(),
        })
        .unwrap();
        q.resolve(Resolution::Skip).unwrap();

        q.next().unwrap();
        q.record(UploadResult::Failed { message: "bad xml".into() }).unwrap();
        q.next().unwrap();
        q.record(UploadResult::Uploaded { members_inserted: 2 }).unwrap();

        assert!(q.is_finished());
        assert!(q.next().is_none());
        let s = q.summary();
        assert_eq!((s.total, s.uploaded, s.skipped, s.failed), (3, 1, 1, 1));
        assert_eq!(s.to_string(), "Processed 1 of 3 files successfully");
    }

    #[test]
    fn test_misuse_is_rejected() {
        let mut q = queue();
        assert_eq!(
            q.record(UploadResult::Uploaded { members_inserted: 1 }),
            Err(QueueError::NothingInFlight)
        );
        assert_eq!(q.resolve(Resolution::Skip), Err(QueueError::NotPaused));
    }
}
