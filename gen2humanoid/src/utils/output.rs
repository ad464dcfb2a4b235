//! Terminal output: progress reporting and summary tables

use std::io::IsTerminal;
use std::time::Duration;

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use prettytable::format::consts::FORMAT_NO_LINESEP_WITH_TITLE;
use prettytable::{Cell, Row, Table};

/// Stop drawing when stderr is not a terminal (pipes, CI logs)
fn attach(pb: ProgressBar) -> ProgressBar {
    if !std::io::stderr().is_terminal() {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }
    pb
}

/// Progress over a batch of clips; the length is set once the batch is known
pub fn clip_progress(label: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{prefix:.bold} [{bar:30.cyan/blue}] {pos}/{len} clips {wide_msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");
    let pb = attach(ProgressBar::new(0).with_style(style));
    pb.set_prefix(label.to_string());
    pb
}

/// Spinner shown while a robot or motion is being loaded
pub fn status_spinner(message: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{spinner:.green} {msg} ({elapsed})")
        .unwrap_or_else(|_| ProgressStyle::default_spinner());
    let pb = attach(ProgressBar::new_spinner().with_style(style));
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Summary table with bold column titles
pub fn report_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.set_format(*FORMAT_NO_LINESEP_WITH_TITLE);
    table.set_titles(Row::new(
        headers.iter().map(|h| Cell::new(h).style_spec("b")).collect(),
    ));
    table
}

pub fn report_row<I, T>(table: &mut Table, cells: I)
where
    I: IntoIterator<Item = T>,
    T: ToString,
{
    table.add_row(Row::new(
        cells.into_iter().map(|c| Cell::new(&c.to_string())).collect(),
    ));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_rows() {
        let mut table = report_table(&["Index", "Body", "DOF"]);
        report_row(&mut table, ["0", "pelvis", "0"]);
        report_row(&mut table, [1.to_string(), "torso".to_string(), 1.to_string()]);

        assert_eq!(table.len(), 2);
        let rendered = table.to_string();
        assert!(rendered.contains("pelvis"));
        assert!(rendered.contains("torso"));
        assert!(rendered.contains("DOF"));
    }

    #[test]
    fn test_clip_progress_tracks_batch() {
        let pb = clip_progress("Converting");
        pb.set_length(4);
        pb.set_position(3);
        assert_eq!(pb.length(), Some(4));
        assert_eq!(pb.position(), 3);
        assert_eq!(pb.prefix(), "Converting");
    }
}
