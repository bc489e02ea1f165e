use indicatif::{ProgressBar, ProgressStyle};

/// Progress bar across a run's planned duration, in milliseconds.
pub fn create_run_bar(total_millis: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_millis.max(1));
    pb.set_style(
        ProgressStyle::default_bar()
            .template("▕{bar:25}▏ {percent:>3}% • {msg}")
            .expect("Invalid progress template")
            .progress_chars("█░ "),
    );
    pb
}
