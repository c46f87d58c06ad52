//! Logging and progress bars.

use env_logger::Env;
use indicatif::{ProgressBar, ProgressStyle};

/// Set up logging. `RUST_LOG` overrides our defaults, which show warnings,
/// or everything we recognize when `verbose` is set.
pub fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();
}

/// Create a progress bar for `len` subtitles. It hides itself when stderr
/// isn't a terminal.
pub fn new_progress_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    // Our template is a constant, so this only fails if we break it.
    if let Ok(style) = ProgressStyle::default_bar()
        .template("  {msg:12} {pos:>5}/{len:5} {elapsed_precise} {wide_bar:.cyan/blue} {eta_precise}")
    {
        pb.set_style(style);
    }
    pb.set_message("Recognizing");
    pb
}
