use iced::widget::{button, column, container, image, row, text};
use iced::{Alignment, Element, Length, Subscription, Task, Theme};
use rfd::FileDialog;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod scan;
mod state;
mod ui;

use scan::client::{RecognitionClient, RecognitionError};
use state::data::Candidate;
use state::session::{ScanPhase, ScanRequest, ScanSession, IMAGE_EXTENSIONS};

/// External price-comparison page opened from the detail view.
/// A boundary hand-off only; no candidate data is passed along.
const COMPARE_PRICES_URL: &str = "https://example.com/compare";

/// Main application state
struct WhiskyScanner {
    /// Scan session: the single source of truth for what is shown
    session: ScanSession,
    /// Client for the remote recognition backend
    client: RecognitionClient,
}

/// Application messages (events)
#[derive(Debug, Clone)]
enum Message {
    /// User clicked the upload card to pick a photo
    PickImage,
    /// Files dropped onto the window
    FilesDropped(Vec<PathBuf>),
    /// A recognition request finished; generation identifies the scan
    ScanFinished {
        generation: u64,
        outcome: Result<Vec<Candidate>, RecognitionError>,
    },
    /// Open the detail view on one of the results
    ShowDetails(usize),
    /// Back from the detail view to the result list
    CloseDetails,
    /// Hand off to the external price-comparison page
    ComparePrices,
}

impl WhiskyScanner {
    /// Create a new instance of the application
    fn new() -> (Self, Task<Message>) {
        // If this fails, we panic because the app cannot function
        // without its recognition client
        let client = RecognitionClient::from_env()
            .expect("Failed to construct the recognition HTTP client");

        tracing::info!(endpoint = client.endpoint(), "Whisky scanner initialized");

        (
            WhiskyScanner {
                session: ScanSession::new(),
                client,
            },
            Task::none(),
        )
    }

    /// Handle application messages and update state
    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PickImage => {
                // Show the native file picker, filtered to image formats
                let file = FileDialog::new()
                    .set_title("Select a Label Photo")
                    .add_filter("Images", &IMAGE_EXTENSIONS)
                    .pick_file();

                match file {
                    Some(path) => self.begin_scan(vec![path]),
                    None => Task::none(),
                }
            }
            Message::FilesDropped(files) => self.begin_scan(files),
            Message::ScanFinished { generation, outcome } => {
                // Stale generations are fenced out inside the session
                self.session.apply_outcome(generation, outcome);
                Task::none()
            }
            Message::ShowDetails(index) => {
                self.session.select(index);
                Task::none()
            }
            Message::CloseDetails => {
                self.session.clear_selection();
                Task::none()
            }
            Message::ComparePrices => {
                if let Err(e) = open::that(COMPARE_PRICES_URL) {
                    tracing::warn!(
                        error = %e,
                        url = COMPARE_PRICES_URL,
                        "Could not open the price-comparison page"
                    );
                }
                Task::none()
            }
        }
    }

    /// Run intake on the offered files and, if one was accepted,
    /// launch the background recognition task. Exactly one request is
    /// issued per accepted image; selection is submission.
    fn begin_scan(&mut self, files: Vec<PathBuf>) -> Task<Message> {
        match self.session.accept_files(files) {
            Some(request) => {
                let client = self.client.clone();
                Task::perform(scan_image(client, request), |(generation, outcome)| {
                    Message::ScanFinished { generation, outcome }
                })
            }
            None => Task::none(),
        }
    }

    /// Build the user interface
    fn view(&self) -> Element<Message> {
        // The right panel follows the session phase, except while a
        // candidate is selected: then the detail view takes its place.
        let panel: Element<Message> = if let Some(candidate) = self.session.selected_candidate() {
            ui::detail::view(candidate)
        } else {
            match self.session.phase() {
                ScanPhase::Idle => container(
                    text("Results will appear here after a scan.").size(16),
                )
                .center_x(Length::Fill)
                .center_y(Length::Fill)
                .into(),
                ScanPhase::Scanning => container(text("Analyzing Image...").size(20))
                    .center_x(Length::Fill)
                    .center_y(Length::Fill)
                    .into(),
                ScanPhase::Succeeded(results) => ui::results::view(results),
                // Dedicated error surface; the classified detail already
                // went to the log when the outcome was applied
                ScanPhase::Failed(error) => container(
                    text(error.user_message()).size(16).style(text::danger),
                )
                .padding(20)
                .width(Length::Fill)
                .style(container::rounded_box)
                .into(),
            }
        };

        let content = column![
            text("Whisky Label Scanner").size(32),
            row![
                self.upload_card(),
                container(panel)
                    .width(Length::FillPortion(1))
                    .height(Length::Fixed(400.0)),
            ]
            .spacing(20),
        ]
        .spacing(20)
        .padding(30)
        .align_x(Alignment::Center);

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .into()
    }

    /// The upload card: preview of the selected photo, or a hint.
    /// Clicking it opens the picker; dropping a file works anywhere
    /// on the window.
    fn upload_card(&self) -> Element<Message> {
        let inner: Element<Message> = match self.session.image() {
            Some(selected) => image(selected.handle.clone())
                .width(Length::Fill)
                .height(Length::Fill)
                .into(),
            None => container(
                column![
                    text("📷").size(48),
                    text("Drag & drop a label photo here, or click to select").size(16),
                ]
                .spacing(10)
                .align_x(Alignment::Center),
            )
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into(),
        };

        button(inner)
            .on_press(Message::PickImage)
            .width(Length::FillPortion(1))
            .height(Length::Fixed(400.0))
            .padding(10)
            .into()
    }

    /// Listen for files dropped onto the window
    fn subscription(&self) -> Subscription<Message> {
        iced::event::listen_with(|event, _status, _window| match event {
            iced::Event::Window(iced::window::Event::FileDropped(path)) => {
                Some(Message::FilesDropped(vec![path]))
            }
            _ => None,
        })
    }

    /// Set the application theme
    fn theme(&self) -> Theme {
        Theme::Dark
    }
}

/// Read the photo from disk and run one recognition request.
/// The generation travels with the outcome so the session can fence
/// out responses from superseded scans.
async fn scan_image(
    client: RecognitionClient,
    request: ScanRequest,
) -> (u64, Result<Vec<Candidate>, RecognitionError>) {
    let ScanRequest { path, generation } = request;

    let filename = path
        .file_name()
        .map(|f| f.to_string_lossy().to_string())
        .unwrap_or_else(|| "label".to_string());

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            // The request never left the machine: a setup failure,
            // not a transport one
            let error = RecognitionError::RequestSetup(format!(
                "could not read {}: {e}",
                path.display()
            ));
            return (generation, Err(error));
        }
    };

    (generation, client.recognize(bytes, filename).await)
}

fn main() -> iced::Result {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whisky_scanner=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    iced::application(
        "Whisky Label Scanner",
        WhiskyScanner::update,
        WhiskyScanner::view,
    )
    .subscription(WhiskyScanner::subscription)
    .theme(WhiskyScanner::theme)
    .centered()
    .run_with(WhiskyScanner::new)
}
