use std::io::{self, Write};

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

use crate::worker::{Tick, WarmReport};

pub struct ConsoleProgress<W> {
    bar: ProgressBar,
    total: usize,
    out: W,
}

impl<W: Write> ConsoleProgress<W> {
    pub fn new(total: usize, out: W) -> Self {
        Self::with_target(total, ProgressDrawTarget::stdout(), out)
    }

    /// Lines that can't go above the bar (no terminal) are written to `out`.
    pub fn with_target(total: usize, target: ProgressDrawTarget, out: W) -> Self {
        let bar = ProgressBar::with_draw_target(Some(total as u64), target);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} Caching images... [{bar:40.cyan/black}] {pos}/{len} {wide_msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("──╴");
        bar.set_style(style);

        ConsoleProgress { bar, total, out }
    }

    pub fn tick(&mut self, tick: &Tick) -> io::Result<()> {
        if let Err(e) = tick.outcome {
            self.println(format!(
                "Error caching image for file {}: {}",
                tick.path.display(),
                e
            ))?;
        }

        let processed = format!("Processed: {}", tick.path.display());
        self.bar.set_position(tick.completed as u64);
        match self.bar.is_hidden() {
            true => writeln!(self.out, "{}/{} {}", tick.completed, self.total, processed),
            false => {
                self.bar.set_message(processed);
                Ok(())
            }
        }
    }

    pub fn finish(mut self, report: &WarmReport) -> io::Result<()> {
        self.bar.finish_and_clear();
        writeln!(self.out, "{}", summary(report))
    }

    // A hidden bar swallows println.
    fn println(&mut self, line: String) -> io::Result<()> {
        match self.bar.is_hidden() {
            true => writeln!(self.out, "{}", line),
            false => {
                self.bar.println(line);
                Ok(())
            }
        }
    }
}

pub fn summary(report: &WarmReport) -> String {
    let mut line = format!(
        "Processed {}/{} files ({} failed)",
        report.processed(),
        report.total,
        report.failed
    );
    if report.skipped > 0 {
        line.push_str(&format!(", {} not started", report.skipped));
    }
    line
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::thumbnail::WarmError;
    use std::path::Path;

    #[test]
    fn summary_mentions_skips_only_when_there_are_some() {
        let report = WarmReport {
            total: 3,
            succeeded: 2,
            failed: 1,
            skipped: 0,
        };
        assert_eq!(summary(&report), "Processed 3/3 files (1 failed)");

        let report = WarmReport {
            total: 10,
            succeeded: 4,
            failed: 0,
            skipped: 6,
        };
        assert_eq!(summary(&report), "Processed 4/10 files (0 failed), 6 not started");
    }

    #[test]
    fn without_a_terminal_every_item_gets_a_line() {
        let mut out = Vec::new();
        let mut progress = ConsoleProgress::with_target(2, ProgressDrawTarget::hidden(), &mut out);

        progress
            .tick(&Tick {
                completed: 1,
                path: Path::new("a.jpg"),
                outcome: &Ok(()),
            })
            .unwrap();
        progress
            .tick(&Tick {
                completed: 2,
                path: Path::new("b.psd"),
                outcome: &Err(WarmError::Platform("no thumbnail handler".into())),
            })
            .unwrap();
        progress
            .finish(&WarmReport {
                total: 2,
                succeeded: 1,
                failed: 1,
                skipped: 0,
            })
            .unwrap();

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1/2 Processed: a.jpg\n\
             Error caching image for file b.psd: no thumbnail handler\n\
             2/2 Processed: b.psd\n\
             Processed 2/2 files (1 failed)\n"
        );
    }
}
