/// Scan session state machine
///
/// One `ScanSession` lives for the whole process and is the single source
/// of truth for what the window shows: the selected image, the current
/// phase, and which candidate the detail view is open on.
///
/// The phase is a tagged enum so results and error can never be present
/// at the same time. A monotonic generation counter fences out responses
/// from superseded scans: selecting a new image while one is in flight
/// starts a new generation, and the old response is ignored on arrival.

use std::path::{Path, PathBuf};

use iced::widget::image;

use crate::scan::client::RecognitionError;
use crate::state::data::Candidate;

/// Image formats accepted by the intake filter.
/// Non-image files are rejected before any session state changes.
pub const IMAGE_EXTENSIONS: [&str; 8] = [
    "jpg", "jpeg", "png", "webp", "bmp", "gif", "tif", "tiff",
];

/// Check the intake filter: extension must be a known image format
pub fn is_image_file(path: &Path) -> bool {
    match path.extension() {
        Some(extension) => {
            let ext = extension.to_string_lossy().to_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        }
        None => false,
    }
}

/// The currently selected label photo.
///
/// Owns the preview handle; replacing the `SelectedImage` drops the old
/// handle with it, so repeated selections never accumulate preview
/// resources.
#[derive(Debug, Clone)]
pub struct SelectedImage {
    pub path: PathBuf,
    pub handle: image::Handle,
}

impl SelectedImage {
    fn new(path: PathBuf) -> Self {
        let handle = image::Handle::from_path(&path);
        Self { path, handle }
    }

    /// Filename sent to the recognition service alongside the bytes
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|f| f.to_string_lossy().to_string())
            .unwrap_or_else(|| "label".to_string())
    }
}

/// Where the orchestrator currently is.
///
/// `Idle` is only ever the initial state: once a scan has run, the
/// session moves between `Scanning` and the two terminal states.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanPhase {
    Idle,
    Scanning,
    Succeeded(Vec<Candidate>),
    Failed(RecognitionError),
}

/// Instruction to issue exactly one recognition request
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub path: PathBuf,
    pub generation: u64,
}

/// Session-scoped scan state, single instance for the app lifetime
#[derive(Debug)]
pub struct ScanSession {
    image: Option<SelectedImage>,
    phase: ScanPhase,
    selected: Option<usize>,
    generation: u64,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self {
            image: None,
            phase: ScanPhase::Idle,
            selected: None,
            generation: 0,
        }
    }
}

impl ScanSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intake for both the file picker and window file drops.
    ///
    /// Non-image files are filtered out first. Of what remains, only the
    /// first file is used; the rest are silently discarded. An empty list
    /// leaves the session untouched. Accepting a file clears any previous
    /// results, error and selection, stores the preview, and returns the
    /// request the caller must issue — selection is submission, there is
    /// no separate confirm step.
    pub fn accept_files(&mut self, mut files: Vec<PathBuf>) -> Option<ScanRequest> {
        files.retain(|path| is_image_file(path));

        if files.is_empty() {
            return None;
        }

        if files.len() > 1 {
            tracing::debug!(
                discarded = files.len() - 1,
                "Multiple files offered; scanning only the first"
            );
        }

        let path = files.swap_remove(0);

        self.selected = None;
        self.phase = ScanPhase::Scanning;
        self.generation += 1;
        // Dropping the previous SelectedImage releases its preview handle
        self.image = Some(SelectedImage::new(path.clone()));

        tracing::info!(path = %path.display(), generation = self.generation, "Label photo accepted");

        Some(ScanRequest {
            path,
            generation: self.generation,
        })
    }

    /// Apply the outcome of a finished recognition request.
    ///
    /// A response whose generation no longer matches belongs to a
    /// superseded scan and is dropped. Returns whether the outcome was
    /// applied.
    pub fn apply_outcome(
        &mut self,
        generation: u64,
        outcome: Result<Vec<Candidate>, RecognitionError>,
    ) -> bool {
        if generation != self.generation {
            tracing::debug!(
                stale = generation,
                current = self.generation,
                "Ignoring response from a superseded scan"
            );
            return false;
        }

        match outcome {
            Ok(candidates) => {
                self.phase = ScanPhase::Succeeded(candidates);
            }
            Err(error) => {
                // The classified kind reaches the diagnostic sink here,
                // before the UI flattens it to a user-facing message.
                tracing::warn!(kind = error.kind(), error = %error, "Scan failed");
                self.phase = ScanPhase::Failed(error);
            }
        }

        true
    }

    pub fn phase(&self) -> &ScanPhase {
        &self.phase
    }

    pub fn is_scanning(&self) -> bool {
        self.phase == ScanPhase::Scanning
    }

    pub fn image(&self) -> Option<&SelectedImage> {
        self.image.as_ref()
    }

    pub fn results(&self) -> Option<&[Candidate]> {
        match &self.phase {
            ScanPhase::Succeeded(candidates) => Some(candidates),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&RecognitionError> {
        match &self.phase {
            ScanPhase::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Open the detail view on one of the current results.
    /// Out-of-range indexes and non-success phases are ignored.
    pub fn select(&mut self, index: usize) {
        if let ScanPhase::Succeeded(candidates) = &self.phase {
            if index < candidates.len() {
                self.selected = Some(index);
            }
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    pub fn selected_candidate(&self) -> Option<&Candidate> {
        match &self.phase {
            ScanPhase::Succeeded(candidates) => {
                self.selected.and_then(|index| candidates.get(index))
            }
            _ => None,
        }
    }

    #[cfg(test)]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str) -> Candidate {
        Candidate {
            name: name.to_string(),
            kind: "Single Malt".to_string(),
            abv: 43.0,
            size_ml: 700.0,
            msrp: 60.0,
            confidence: 0.8,
            image_url: None,
        }
    }

    fn image_path(name: &str) -> PathBuf {
        PathBuf::from(format!("/photos/{name}"))
    }

    #[test]
    fn test_empty_intake_is_a_no_op() {
        let mut session = ScanSession::new();

        assert_eq!(session.accept_files(vec![]), None);

        assert_eq!(*session.phase(), ScanPhase::Idle);
        assert_eq!(session.generation(), 0);
        assert!(session.image().is_none());
    }

    #[test]
    fn test_non_image_files_are_rejected_by_the_filter() {
        let mut session = ScanSession::new();

        let request = session.accept_files(vec![
            PathBuf::from("/docs/notes.txt"),
            PathBuf::from("/docs/receipt.pdf"),
        ]);

        assert_eq!(request, None);
        assert_eq!(*session.phase(), ScanPhase::Idle);
    }

    #[test]
    fn test_filter_runs_before_first_file_selection() {
        let mut session = ScanSession::new();

        // The non-image leading entry must not shadow the real photo
        let request = session
            .accept_files(vec![PathBuf::from("/docs/notes.txt"), image_path("label.jpg")])
            .unwrap();

        assert_eq!(request.path, image_path("label.jpg"));
    }

    #[test]
    fn test_multi_file_drop_uses_only_the_first() {
        let mut session = ScanSession::new();

        let request = session
            .accept_files(vec![image_path("first.png"), image_path("second.png")])
            .unwrap();

        assert_eq!(request.path, image_path("first.png"));
        assert_eq!(session.image().unwrap().path, image_path("first.png"));
    }

    #[test]
    fn test_one_request_per_accepted_image_with_increasing_generation() {
        let mut session = ScanSession::new();

        let first = session.accept_files(vec![image_path("a.jpg")]).unwrap();
        let second = session.accept_files(vec![image_path("b.jpg")]).unwrap();

        assert_eq!(first.generation, 1);
        assert_eq!(second.generation, 2);
        assert!(session.is_scanning());
    }

    #[test]
    fn test_success_stores_results_in_received_order() {
        let mut session = ScanSession::new();
        let request = session.accept_files(vec![image_path("a.jpg")]).unwrap();

        let applied = session.apply_outcome(
            request.generation,
            Ok(vec![candidate("B"), candidate("A")]),
        );

        assert!(applied);
        let results = session.results().unwrap();
        assert_eq!(results[0].name, "B");
        assert_eq!(results[1].name, "A");
        assert!(session.error().is_none());
    }

    #[test]
    fn test_empty_result_set_is_a_success() {
        let mut session = ScanSession::new();
        let request = session.accept_files(vec![image_path("a.jpg")]).unwrap();

        session.apply_outcome(request.generation, Ok(vec![]));

        assert_eq!(session.results(), Some(&[][..]));
        assert!(session.error().is_none());
    }

    #[test]
    fn test_logical_failure_sets_error_and_no_results() {
        let mut session = ScanSession::new();
        let request = session.accept_files(vec![image_path("a.jpg")]).unwrap();

        session.apply_outcome(
            request.generation,
            Err(RecognitionError::Logical("not found".to_string())),
        );

        assert!(session.results().is_none());
        let error = session.error().unwrap();
        assert!(error.user_message().contains("not found"));
    }

    #[test]
    fn test_new_acceptance_clears_previous_terminal_state() {
        let mut session = ScanSession::new();

        let request = session.accept_files(vec![image_path("a.jpg")]).unwrap();
        session.apply_outcome(request.generation, Ok(vec![candidate("A")]));
        session.select(0);
        assert!(session.selected_candidate().is_some());

        // Terminal states transition back to Scanning, never to Idle
        session.accept_files(vec![image_path("b.jpg")]).unwrap();

        assert_eq!(*session.phase(), ScanPhase::Scanning);
        assert!(session.results().is_none());
        assert!(session.error().is_none());
        assert!(session.selected_candidate().is_none());
    }

    #[test]
    fn test_stale_response_cannot_overwrite_a_newer_scan() {
        let mut session = ScanSession::new();

        let first = session.accept_files(vec![image_path("a.jpg")]).unwrap();
        let second = session.accept_files(vec![image_path("b.jpg")]).unwrap();

        // The superseded scan finishes late; its outcome must be dropped
        let applied = session.apply_outcome(first.generation, Ok(vec![candidate("stale")]));
        assert!(!applied);
        assert!(session.is_scanning());

        let applied = session.apply_outcome(second.generation, Ok(vec![candidate("fresh")]));
        assert!(applied);
        assert_eq!(session.results().unwrap()[0].name, "fresh");
    }

    #[test]
    fn test_selection_requires_success_and_a_valid_index() {
        let mut session = ScanSession::new();

        session.select(0);
        assert!(session.selected_candidate().is_none());

        let request = session.accept_files(vec![image_path("a.jpg")]).unwrap();
        session.apply_outcome(request.generation, Ok(vec![candidate("A")]));

        session.select(5);
        assert!(session.selected_candidate().is_none());

        session.select(0);
        assert_eq!(session.selected_candidate().unwrap().name, "A");

        session.clear_selection();
        assert!(session.selected_candidate().is_none());
    }

    #[test]
    fn test_replacing_the_image_replaces_the_preview() {
        let mut session = ScanSession::new();

        session.accept_files(vec![image_path("a.jpg")]).unwrap();
        session.accept_files(vec![image_path("b.jpg")]).unwrap();

        assert_eq!(session.image().unwrap().path, image_path("b.jpg"));
        assert_eq!(session.image().unwrap().filename(), "b.jpg");
    }

    #[test]
    fn test_image_filter_matches_case_insensitively() {
        assert!(is_image_file(Path::new("/photos/LABEL.JPG")));
        assert!(is_image_file(Path::new("/photos/label.webp")));
        assert!(!is_image_file(Path::new("/photos/label")));
        assert!(!is_image_file(Path::new("/photos/label.exe")));
    }
}
