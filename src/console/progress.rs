use std::io::{IsTerminal, Write};

const REPORT_INTERVAL: usize = 10_000;

/// Line counter that redraws a single status line on stderr.
///
/// Nothing is drawn unless stderr is a terminal. The line is terminated when
/// the counter is dropped.
#[derive(Debug)]
pub struct Progress {
    total: Option<usize>,
    processed: usize,
    visible: bool,
    drawn: bool,
}

impl Progress {
    pub fn new(total: Option<usize>) -> Self {
        Self::with_visibility(total, std::io::stderr().is_terminal())
    }

    fn with_visibility(total: Option<usize>, visible: bool) -> Self {
        Self {
            total,
            processed: 0,
            visible,
            drawn: false,
        }
    }

    pub fn tick(&mut self) {
        self.processed += 1;
        if self.visible && self.processed % REPORT_INTERVAL == 0 {
            let mut stderr = std::io::stderr().lock();
            let _ = write!(stderr, "\r{}", self.render());
            let _ = stderr.flush();
            self.drawn = true;
        }
    }

    fn render(&self) -> String {
        match self.total {
            Some(total) if total > 0 => {
                format!("[{:2.0}%]", self.processed as f64 / total as f64 * 100.0)
            }
            _ => format!("[{} entries]", self.processed),
        }
    }
}

impl Drop for Progress {
    fn drop(&mut self) {
        if self.drawn {
            eprintln!();
        }
    }
}
