use indicatif::{ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;

pub trait Tracker {
    fn step(&self, message: &str) -> &Self;
    fn finish(self);
}

const ROW_STYLE: &str = "{spinner:.blue} {prefix:>12.cyan.bold} [{elapsed_precise}] {wide_bar:.cyan/blue} {pos}/{len} rows ({eta}) {msg}";

const TICK: &str = "⠁⠂⠄⡀⢀⠠⠐⠈ ";

const BAR_CHARS: &str = "█▓▒░  ";

static ROW_TEMPLATE: Lazy<Option<ProgressStyle>> = Lazy::new(|| {
    ProgressStyle::with_template(ROW_STYLE)
        .ok()
        .map(|style| style.tick_chars(TICK).progress_chars(BAR_CHARS))
});

/// One tick per manifest row, labelled with the row's image name.
pub struct RowTracker {
    pb:     ProgressBar,
    finish: Option<String>,
}

impl Tracker for RowTracker {
    fn step(&self, message: &str) -> &Self {
        self.pb.set_message(message.to_string());
        self.pb.inc(1);
        self
    }

    fn finish(self) {
        match self.finish {
            Some(msg) => self.pb.finish_with_message(msg),
            None => self.pb.finish(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RowTrackerBuilder {
    rows:   u64,
    prefix: Option<String>,
    finish: Option<String>,
    hidden: bool,
}

impl RowTrackerBuilder {
    pub fn with_rows(mut self, rows: usize) -> Self {
        self.rows = rows as u64;
        self
    }

    pub fn with_prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn with_finish(mut self, finish: &str) -> Self {
        self.finish = Some(finish.to_string());
        self
    }

    pub fn hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    pub fn build(self) -> RowTracker {
        let pb = if self.hidden {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(self.rows)
        };
        let pb = match ROW_TEMPLATE.as_ref() {
            Some(style) => pb.with_style(style.clone()),
            None => pb,
        };
        if let Some(prefix) = self.prefix {
            pb.set_prefix(prefix);
        }

        RowTracker {
            pb,
            finish: self.finish,
        }
    }
}
