use std::time::Duration;

use ratatui::{
  Frame,
  layout::{
    Constraint,
    Layout,
  },
  style::{
    Color,
    Style,
    Stylize,
  },
  text::{
    Line,
    Text,
  },
  widgets::{
    Block,
    Paragraph,
    Wrap,
  },
};
use the_lib::{
  Output,
  Phase,
  View,
};

pub fn draw(frame: &mut Frame<'_>, view: &View, idle: Duration) {
  let [compose, output, status] = Layout::vertical([
    Constraint::Min(3),
    Constraint::Length(6),
    Constraint::Length(1),
  ])
  .areas(frame.area());

  frame.render_widget(
    Paragraph::new(view.buffer.as_str())
      .block(Block::bordered().title(" write "))
      .wrap(Wrap { trim: false }),
    compose,
  );
  frame.render_widget(
    Paragraph::new(output_text(&view.output))
      .block(Block::bordered().title(" last commit "))
      .wrap(Wrap { trim: false }),
    output,
  );
  frame.render_widget(Paragraph::new(status_line(view.phase, idle)), status);
}

fn output_text(output: &Output) -> Text<'_> {
  match output {
    Output::Blank => Text::from("nothing committed yet".dim()),
    Output::Displayed(text) => Text::from(text.as_str()),
    Output::Discarded => Text::from("(discarded)".italic().dim()),
    Output::TransportFailure(reason) => {
      Text::from(vec![
        Line::styled(
          "could not send, keep typing to try again",
          Style::new().fg(Color::Red),
        ),
        Line::from(reason.as_str().dim()),
      ])
    },
  }
}

fn phase_label(phase: Phase) -> &'static str {
  match phase {
    Phase::Idle => "idle",
    Phase::Composing => "composing",
    Phase::Resolving => "sending",
  }
}

fn status_line(phase: Phase, idle: Duration) -> Line<'static> {
  Line::from(vec![
    phase_label(phase).bold(),
    format!(
      "  text is committed after {}ms without typing  esc quits",
      idle.as_millis()
    )
    .dim(),
  ])
}
