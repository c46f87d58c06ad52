//! Convert bitmap subtitles to SRT using a pool of OCR engines.

use std::{
    io::BufWriter,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{debug, warn};
use subtitle_ocr::{EngineConfig, EngineMode, OcrConfig, OcrContext, TesseractFactory};
use tempfile::NamedTempFile;

use crate::{lang::select_language, source::FrameDirectory};

mod lang;
mod source;
mod ui;

#[derive(Debug, Parser)]
/// Convert bitmap subtitles to an SRT file using OCR. Input is a directory
/// of subtitle images with an index.json file, as written by vobsub2png.
#[command(name = "subtitles2srt", version)]
struct Args {
    /// Directory containing index.json and the subtitle images.
    frames: PathBuf,

    /// Where to write the SRT file. Defaults to a name based on the frame
    /// directory.
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Language of the subtitles, as an ISO 639-1 code. Defaults to the
    /// language recorded in index.json.
    #[arg(short, long)]
    lang: Option<String>,

    /// Tesseract language to use, overriding --lang.
    #[arg(long)]
    tesseract_lang: Option<String>,

    /// Directory containing Tesseract's language data.
    #[arg(long)]
    tesseract_data: Option<PathBuf>,

    /// Tesseract engine mode: 0 = original, 1 = LSTM, 2 = both, 3 = default.
    #[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(0..=3))]
    tesseract_oem: u8,

    /// Characters which should never be recognized.
    #[arg(long, default_value = "")]
    blacklist: String,

    /// Resolution to report to the OCR engine.
    #[arg(long, default_value_t = 72)]
    dpi: u32,

    /// Skip images narrower than this.
    #[arg(long, default_value_t = 9)]
    min_width: usize,

    /// Skip images shorter than this.
    #[arg(long, default_value_t = 1)]
    min_height: usize,

    /// Maximum number of OCR engines to run at once. 0 means one per CPU.
    #[arg(long, default_value_t = 0)]
    max_threads: usize,

    /// Write each image to a PGM file next to the output before OCR.
    #[arg(long)]
    dump_images: bool,

    /// End every subtitle when the next one starts, ignoring the end times
    /// in the index.
    #[arg(long)]
    dumb: bool,

    /// Log each recognized subtitle and timestamp mismatches.
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn ocr_config(&self, language: String, base: &Path) -> OcrConfig {
        OcrConfig {
            engine: EngineConfig {
                data_path: self.tesseract_data.clone(),
                language,
                mode: EngineMode::from_number(self.tesseract_oem).unwrap_or_default(),
                blacklist: self.blacklist.clone(),
                dpi: self.dpi,
            },
            min_width: self.min_width,
            min_height: self.min_height,
            pool_size: self.max_threads,
            dump_images: self.dump_images.then(|| base.to_owned()),
            force_next_start: self.dumb,
            verbose: self.verbose,
        }
    }
}

/// The path used as a base for our output files: the frame directory,
/// minus any `_subtitles` suffix added by vobsub2png.
fn output_base(dir: &Path) -> PathBuf {
    match dir.file_name().and_then(|n| n.to_str()) {
        Some(name) => {
            let stem = name.strip_suffix("_subtitles").unwrap_or(name);
            dir.with_file_name(stem)
        }
        None => dir.join("subtitles"),
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    ui::init_logging(args.verbose);
    debug!("args: {:?}", args);
    run(&args)
}

fn run(args: &Args) -> Result<()> {
    let frames = FrameDirectory::open(&args.frames)?;
    let base = output_base(frames.dir());
    let out_path = args.out.clone().unwrap_or_else(|| {
        let mut name = base.clone().into_os_string();
        name.push(".srt");
        PathBuf::from(name)
    });

    let subtitle_lang = args.lang.as_deref().or_else(|| frames.language());
    let language = select_language(args.tesseract_lang.as_deref(), subtitle_lang);
    debug!("using OCR language {}", language);

    // Write to a temporary file in the same directory, so that a failed run
    // never leaves a partial SRT file behind.
    let out_dir = match out_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
        _ => PathBuf::from("."),
    };
    let mut tmp = NamedTempFile::new_in(&out_dir)
        .with_context(|| format!("could not create a file in {}", out_dir.display()))?;

    let mut ctx = OcrContext::new(args.ocr_config(language, &base), TesseractFactory);
    let pb = ui::new_progress_bar(frames.len() as u64);
    for frame in frames.frames() {
        ctx.add(frame?)?;
        pb.inc(1);
    }
    pb.finish_and_clear();
    let transcript = ctx.finish()?;

    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        transcript
            .write_srt(&mut out)
            .with_context(|| format!("could not write {}", out_path.display()))?;
    }
    tmp.persist(&out_path)
        .with_context(|| format!("could not write {}", out_path.display()))?;

    let stats = transcript.stats;
    if stats.failed > 0 || stats.too_small > 0 {
        warn!(
            "{} subtitles could not be recognized, {} were too small",
            stats.failed,
            stats.too_small
        );
    }
    println!("Wrote {} subtitles to {}", transcript.cues.len(), out_path.display());
    Ok(())
}
