/// Candidate detail view
///
/// Shows the selected candidate's specification fields verbatim plus a
/// synthetic three-point price comparison rendered as a bar chart. The
/// series is computed client-side from MSRP, never fetched.

use iced::alignment::Horizontal;
use iced::widget::canvas;
use iced::widget::{button, column, container, row, scrollable, text};
use iced::{Color, Element, Length, Point, Rectangle, Size};

use crate::state::data::{price_comparison, Candidate, PricePoint};
use crate::Message;

/// Bar color matching the result-list accent (#8884d8)
const BAR_COLOR: Color = Color::from_rgb(0.533, 0.518, 0.847);

pub fn view(candidate: &Candidate) -> Element<'_, Message> {
    let specs = column![
        text(format!("{} Details", candidate.name)).size(24),
        text(format!("Type: {}", candidate.kind)),
        text(format!("Size: {}ml", candidate.size_ml)),
        text(format!("ABV: {}%", candidate.abv)),
        text(format!("MSRP: ${}", candidate.msrp)),
    ]
    .spacing(8);

    let chart = canvas(PriceChart {
        series: price_comparison(candidate.msrp),
    })
    .width(Length::Fill)
    .height(Length::Fixed(200.0));

    let actions = row![
        button("Compare Prices").on_press(Message::ComparePrices).padding(8),
        button("Close").on_press(Message::CloseDetails).padding(8),
    ]
    .spacing(10);

    scrollable(
        container(
            column![
                specs,
                text("Price Comparison").size(20),
                chart,
                actions,
            ]
            .spacing(20),
        )
        .padding(20)
        .width(Length::Fill)
        .style(container::rounded_box),
    )
    .into()
}

/// Three-bar price chart (Average / Current / High)
struct PriceChart {
    series: [PricePoint; 3],
}

impl canvas::Program<Message> for PriceChart {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &iced::Renderer,
        _theme: &iced::Theme,
        bounds: Rectangle,
        _cursor: iced::mouse::Cursor,
    ) -> Vec<canvas::Geometry> {
        let mut frame = canvas::Frame::new(renderer, bounds.size());

        let max_price = self
            .series
            .iter()
            .map(|point| point.price)
            .fold(0.0_f64, f64::max) as f32;

        if max_price <= 0.0 {
            return vec![frame.into_geometry()];
        }

        let width = bounds.width;
        let height = bounds.height;

        // Bottom band reserved for the bar labels
        let label_band = 22.0;
        let value_band = 18.0;
        let chart_height = height - label_band - value_band;

        let slot = width / self.series.len() as f32;
        let bar_width = slot * 0.6;

        for (i, point) in self.series.iter().enumerate() {
            let normalized = point.price as f32 / max_price;
            let bar_height = normalized * chart_height;
            let x = i as f32 * slot + (slot - bar_width) / 2.0;
            let y = value_band + (chart_height - bar_height);

            frame.fill_rectangle(
                Point::new(x, y),
                Size::new(bar_width, bar_height),
                BAR_COLOR,
            );

            frame.fill_text(canvas::Text {
                content: format!("${:.2}", point.price),
                position: Point::new(x + bar_width / 2.0, y - value_band),
                color: Color::WHITE,
                size: 13.0.into(),
                horizontal_alignment: Horizontal::Center,
                ..canvas::Text::default()
            });

            frame.fill_text(canvas::Text {
                content: point.label.to_string(),
                position: Point::new(x + bar_width / 2.0, height - label_band + 4.0),
                color: Color::WHITE,
                size: 14.0.into(),
                horizontal_alignment: Horizontal::Center,
                ..canvas::Text::default()
            });
        }

        vec![frame.into_geometry()]
    }
}
