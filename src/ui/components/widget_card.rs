use ratatui::text::{Line, Span};

use crate::render::{WeatherView, WidgetView};
use crate::ui::helpers::{
    choice_line, STYLE_CARD_BORDER, STYLE_CARD_TITLE, STYLE_ERROR, STYLE_MUTED, STYLE_TEXT,
    STYLE_WARNING,
};

const CARD_INDENT: &str = "  │ ";

/// Draws one widget of a canvas panel as a titled card.
pub struct WidgetCard<'a> {
    view: &'a WidgetView,
    focused: Option<usize>,
}

impl<'a> WidgetCard<'a> {
    pub fn new(view: &'a WidgetView, focused: Option<usize>) -> Self {
        Self { view, focused }
    }

    /// `next_choice` is the global index of this card's first choice and is
    /// advanced past every choice the card draws.
    pub fn lines(self, next_choice: &mut usize) -> Vec<Line<'static>> {
        let mut lines = vec![Line::from(vec![
            Span::styled("  ┌ ", STYLE_CARD_BORDER),
            Span::styled(self.title(), STYLE_CARD_TITLE),
        ])];

        match self.view {
            WidgetView::List(list) => {
                if list.interactive {
                    for item in &list.items {
                        let index = *next_choice;
                        *next_choice += 1;
                        lines.push(choice_line(
                            CARD_INDENT,
                            index + 1,
                            item,
                            self.focused == Some(index),
                        ));
                    }
                } else {
                    lines.extend(list.items.iter().map(|item| body(format!("• {}", item))));
                }
            }
            WidgetView::Map(map) => {
                lines.push(muted("A map would be rendered here."));
                if let Some(details) = &map.details {
                    lines.push(body(format!("Details: {}", details)));
                }
            }
            WidgetView::Weather(WeatherView::Fetching { .. }) => {
                lines.push(muted("Fetching data..."));
            }
            WidgetView::Weather(WeatherView::Ready(report)) => {
                lines.push(Line::from(vec![
                    Span::styled(CARD_INDENT, STYLE_CARD_BORDER),
                    Span::styled(report.temperature_label(), STYLE_CARD_TITLE),
                    Span::styled(format!("  {}", report.description), STYLE_TEXT),
                ]));
                if let Some(feels_like) = report.feels_like_label() {
                    lines.push(muted(&feels_like));
                }
                if let Some(icon) = &report.icon_url {
                    lines.push(muted(&format!("Icon: {}", icon)));
                }
            }
            WidgetView::Weather(WeatherView::Unavailable { .. }) => {
                lines.push(Line::from(vec![
                    Span::styled(CARD_INDENT, STYLE_CARD_BORDER),
                    Span::styled("Weather data unavailable", STYLE_WARNING),
                ]));
            }
            WidgetView::Unknown { problem, .. } => {
                if let Some(problem) = problem {
                    lines.push(Line::from(vec![
                        Span::styled(CARD_INDENT, STYLE_CARD_BORDER),
                        Span::styled(problem.clone(), STYLE_ERROR),
                    ]));
                }
            }
        }

        lines.push(Line::from(Span::styled("  └", STYLE_CARD_BORDER)));
        lines
    }

    fn title(&self) -> String {
        match self.view {
            WidgetView::List(list) if list.title.is_empty() => "List".to_string(),
            WidgetView::List(list) => list.title.clone(),
            WidgetView::Map(map) => format!("Map of {}", map.location),
            WidgetView::Weather(WeatherView::Ready(report)) => {
                format!("Weather in {}", report.city)
            }
            WidgetView::Weather(WeatherView::Fetching { location })
            | WidgetView::Weather(WeatherView::Unavailable { location }) => {
                format!("Weather for {}", location)
            }
            WidgetView::Unknown {
                widget_type,
                problem: None,
            } => format!("Unknown widget type: {}", widget_type),
            WidgetView::Unknown { widget_type, .. } => {
                format!("Could not display {} widget", widget_type)
            }
        }
    }
}

fn body(text: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(CARD_INDENT, STYLE_CARD_BORDER),
        Span::styled(text, STYLE_TEXT),
    ])
}

fn muted(text: &str) -> Line<'static> {
    Line::from(vec![
        Span::styled(CARD_INDENT, STYLE_CARD_BORDER),
        Span::styled(text.to_string(), STYLE_MUTED),
    ])
}
