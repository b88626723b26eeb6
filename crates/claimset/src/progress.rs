use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};

pub(crate) struct ProgressBarBuilder {
    template: String,
    quiet: bool,
    len: Option<u64>,
}

impl ProgressBarBuilder {
    pub(crate) fn new<S: Into<String>>(
        template: S,
        quiet: bool,
    ) -> Self {
        Self {
            template: template.into(),
            quiet,
            len: None,
        }
    }

    pub(crate) fn len(mut self, len: u64) -> Self {
        self.len = Some(len);
        self
    }

    pub(crate) fn build(self) -> ProgressBar {
        if self.quiet {
            return ProgressBar::hidden();
        }

        let pbar = match self.len {
            Some(len) => ProgressBar::new(len),
            None => ProgressBar::new_spinner(),
        };

        let style = ProgressStyle::with_template(&self.template)
            .unwrap_or_else(|_| ProgressStyle::default_bar());

        pbar.set_draw_target(ProgressDrawTarget::stderr());
        pbar.set_style(style);
        pbar
    }
}
