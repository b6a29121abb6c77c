/// Result list rendering
///
/// One card per candidate, in the exact order the recognition service
/// returned them. The list is never re-sorted client-side.

use iced::widget::{button, column, container, image, progress_bar, row, text, Column};
use iced::{Alignment, Element, Length};

use crate::state::data::Candidate;
use crate::Message;

pub fn view(results: &[Candidate]) -> Element<'_, Message> {
    if results.is_empty() {
        // An empty set is still a successful scan, just an unusual one
        return container(text("No matching bottles found for this label.").size(16))
            .width(Length::Fill)
            .padding(20)
            .center_x(Length::Fill)
            .into();
    }

    let mut list = Column::new().spacing(15);
    for (index, candidate) in results.iter().enumerate() {
        list = list.push(candidate_card(index, candidate));
    }

    iced::widget::scrollable(
        column![text("Results").size(24), list].spacing(15).padding(10),
    )
    .into()
}

fn candidate_card(index: usize, candidate: &Candidate) -> Element<'_, Message> {
    let chips = row![
        chip(candidate.kind.clone()),
        chip(format!("{}% ABV", candidate.abv)),
        chip(format!("{}ml", candidate.size_ml)),
    ]
    .spacing(8);

    let mut header = row![
        column![text(&candidate.name).size(18), chips]
            .spacing(8)
            .width(Length::Fill),
        column![
            text(format!("${}", candidate.msrp)).size(18),
            button("Details").on_press(Message::ShowDetails(index)).padding(6),
        ]
        .spacing(8)
        .align_x(Alignment::End),
    ]
    .spacing(10)
    .align_y(Alignment::Center);

    // Artwork resolves by filename only against the local asset directory
    if let Some(asset) = candidate.local_asset_path() {
        header = header.push(
            image(image::Handle::from_path(asset))
                .height(Length::Fixed(100.0)),
        );
    }

    let confidence = column![
        text("Confidence Score").size(12),
        progress_bar(0.0..=100.0, candidate.confidence_percent() as f32)
            .height(Length::Fixed(8.0)),
        text(candidate.confidence_label()).size(12),
    ]
    .spacing(4)
    .align_x(Alignment::End);

    container(column![header, confidence].spacing(10))
        .padding(15)
        .width(Length::Fill)
        .style(container::rounded_box)
        .into()
}

/// Small rounded tag, like the category/ABV/size chips in the results
fn chip(label: String) -> Element<'static, Message> {
    container(text(label).size(12))
        .padding([2.0, 8.0])
        .style(container::rounded_box)
        .into()
}
