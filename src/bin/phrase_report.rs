use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use phrase_splicer::{
    compute_phrase_report, CasePolicy, Corpus, Meta, PhraseReport, PhraseSplicer,
    PhraseSplicerBuilder, Report, SplicerConfig,
};
use tracing_subscriber::EnvFilter;

#[path = "phrase_report/json_report_formatter.rs"]
mod json_report_formatter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum CaseChoice {
    Lowercase,
    Preserve,
}

impl From<CaseChoice> for CasePolicy {
    fn from(choice: CaseChoice) -> Self {
        match choice {
            CaseChoice::Lowercase => CasePolicy::Lowercase,
            CaseChoice::Preserve => CasePolicy::Preserve,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "phrase_report")]
#[command(about = "Rebuild phrases from recorded word transcripts and report coverage")]
struct Args {
    /// JSON config file; flags below override its fields.
    #[arg(long, env = "PHRASE_SPLICER_CONFIG")]
    config: Option<PathBuf>,
    #[arg(long, env = "PHRASE_SPLICER_CORPUS_ROOT")]
    corpus_root: Option<PathBuf>,
    #[arg(long, env = "PHRASE_SPLICER_CLIP_ROOT")]
    clip_root: Option<PathBuf>,
    #[arg(long, env = "PHRASE_SPLICER_CLIP_EXTENSION")]
    clip_extension: Option<String>,
    #[arg(long, env = "PHRASE_SPLICER_TRANSCRIPT_EXTENSION")]
    transcript_extension: Option<String>,
    #[arg(long, env = "PHRASE_SPLICER_CASE_POLICY", value_enum)]
    case_policy: Option<CaseChoice>,
    #[arg(long, env = "PHRASE_SPLICER_MIN_CONFIDENCE")]
    min_confidence: Option<f32>,
    #[arg(long, env = "PHRASE_SPLICER_NO_VERIFY_CLIPS", default_value_t = false)]
    no_verify_clips: bool,
    /// Phrase to rebuild; may be repeated.
    #[arg(long = "phrase")]
    phrases: Vec<String>,
    /// File with one phrase per line. Blank lines and `#` comments are ignored.
    #[arg(long, env = "PHRASE_SPLICER_PHRASES_FILE")]
    phrases_file: Option<PathBuf>,
    #[arg(long, env = "PHRASE_SPLICER_SEED")]
    seed: Option<u64>,
    #[arg(long, env = "PHRASE_SPLICER_OUT")]
    out: Option<PathBuf>,
    /// Write one concat list per phrase into this directory.
    #[arg(long, env = "PHRASE_SPLICER_CONCAT_DIR")]
    concat_dir: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run() {
        tracing::error!(error = %err, "phrase_report failed");
        std::process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let args = Args::parse();
    let config = build_config(&args)?;
    let corpus_root = config.corpus_root.clone();
    let case_policy = config.case_policy;

    let phrases = collect_phrases(&args.phrases, args.phrases_file.as_deref())?;
    if phrases.is_empty() {
        return Err("No phrases given; use --phrase or --phrases-file.".to_string());
    }
    let out_path = resolve_out_path(args.out.as_ref());

    let mut builder = PhraseSplicerBuilder::new(config);
    if let Some(seed) = args.seed {
        builder = builder.with_seed(seed);
    }
    let splicer = builder
        .build()
        .map_err(|err| format!("Failed to build PhraseSplicer: {err}"))?;
    let corpus = splicer
        .snapshot()
        .map_err(|err| format!("Failed to load corpus '{}': {err}", corpus_root.display()))?;
    if corpus.is_empty() {
        return Err(format!(
            "No readable transcripts under '{}'.",
            corpus_root.display()
        ));
    }

    let progress = ProgressBar::new(phrases.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("starting...");

    let started = Instant::now();
    let mut phrase_reports: Vec<PhraseReport> = Vec::with_capacity(phrases.len());
    for phrase in &phrases {
        progress.set_message(phrase.clone());
        match report_phrase(&splicer, &corpus, phrase, args.concat_dir.as_deref()) {
            Ok(report) => phrase_reports.push(report),
            Err(err) => {
                progress.abandon_with_message("splice pass failed");
                return Err(err);
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("splice pass complete");
    let elapsed = started.elapsed();
    println!(
        "splice_elapsed: {:.2}s ({}) avg_per_phrase: {:.2}ms",
        elapsed.as_secs_f64(),
        format_duration_hms(elapsed),
        elapsed.as_secs_f64() * 1000.0 / phrases.len() as f64
    );

    let report = Report::new(
        Meta {
            generated_at: Utc::now().to_rfc3339(),
            corpus_root: corpus_root.to_string_lossy().into_owned(),
            case_policy: case_policy.as_str().to_string(),
            source_count: corpus.len(),
            skipped_count: corpus.skipped().len(),
            seed: splicer.seed(),
        },
        phrase_reports,
    );
    json_report_formatter::write_report(&out_path, &report)?;
    println!("{}", out_path.display());
    Ok(())
}

/// Config file first, then flag and environment overrides.
fn build_config(args: &Args) -> Result<SplicerConfig, String> {
    let mut config = match args.config.as_ref() {
        Some(path) => {
            require_path_exists(path, "Missing --config file.")?;
            SplicerConfig::load(path).map_err(|err| err.to_string())?
        }
        None => SplicerConfig::default(),
    };

    if let Some(root) = &args.corpus_root {
        config.corpus_root = root.clone();
    }
    if let Some(root) = &args.clip_root {
        config.clip_root = root.clone();
    }
    if let Some(ext) = &args.clip_extension {
        config.clip_extension = ext.clone();
    }
    if let Some(ext) = &args.transcript_extension {
        config.transcript_extension = ext.clone();
    }
    if let Some(choice) = args.case_policy {
        config.case_policy = choice.into();
    }
    if args.min_confidence.is_some() {
        config.min_confidence = args.min_confidence;
    }
    if args.no_verify_clips {
        config.verify_clips = false;
    }
    require_path_exists(&config.corpus_root, "Missing corpus root.")?;
    Ok(config)
}

/// Gaps are reported; a matched word without its clip fails the run.
fn report_phrase(
    splicer: &PhraseSplicer,
    corpus: &Corpus,
    phrase: &str,
    concat_dir: Option<&Path>,
) -> Result<PhraseReport, String> {
    let tokens = splicer.tokenize(phrase);
    let mut rng = splicer.request_rng();
    let reconstruction = splicer.reconstruct(corpus, phrase, &mut rng);
    let mut report = compute_phrase_report(phrase, tokens.len(), &reconstruction, None);
    if reconstruction.segments.is_empty() {
        return Ok(report);
    }

    let clips = splicer
        .resolve_clips(corpus, &reconstruction)
        .map_err(|err| format!("Failed to resolve clips for '{phrase}': {err}"))?;
    report.clips = Some(
        clips
            .paths()
            .iter()
            .map(|p| p.to_string_lossy().into_owned())
            .collect(),
    );

    if let Some(dir) = concat_dir {
        let output = splicer
            .concatenate(&clips, &tokens, dir)
            .map_err(|err| format!("Failed to concatenate clips for '{phrase}': {err}"))?;
        report.output = Some(output.to_string_lossy().into_owned());
    }
    Ok(report)
}

fn collect_phrases(inline: &[String], phrases_file: Option<&Path>) -> Result<Vec<String>, String> {
    let mut phrases: Vec<String> = inline
        .iter()
        .map(|p| p.trim().to_string())
        .filter(|p| !p.is_empty())
        .collect();

    if let Some(path) = phrases_file {
        require_path_exists(path, "Missing --phrases-file path.")?;
        let contents = fs::read_to_string(path)
            .map_err(|err| format!("Failed to read phrases file '{}': {err}", path.display()))?;
        phrases.extend(parse_phrase_lines(&contents));
    }
    Ok(phrases)
}

fn parse_phrase_lines(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(ToString::to_string)
        .collect()
}

fn resolve_out_path(out: Option<&PathBuf>) -> PathBuf {
    if let Some(path) = out {
        return path.clone();
    }

    let run_id = Utc::now().format("%Y%m%dT%H%M%SZ");
    PathBuf::from("target")
        .join("phrase_reports")
        .join(format!("phrase-report-{run_id}.json"))
}

fn format_duration_hms(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let seconds = (total_ms % 60_000) / 1_000;
    let millis = total_ms % 1_000;
    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

fn require_path_exists(path: &Path, message: &str) -> Result<(), String> {
    if path.exists() {
        return Ok(());
    }
    Err(format!("{message} Missing path: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use phrase_splicer::{InMemoryStore, Transcript, WordOccurrence};

    use super::*;

    fn splicer_with_clips(clip_root: &Path, verify_clips: bool) -> PhraseSplicer {
        let word = WordOccurrence {
            word: "Hello".to_string(),
            start_time: 0.1,
            end_time: 0.5,
            confidence: None,
        };
        let transcript = Transcript {
            source_id: "A".to_string(),
            words: vec![word],
            tokens: vec!["hello".to_string()],
        };
        PhraseSplicerBuilder::new(SplicerConfig {
            clip_root: clip_root.to_path_buf(),
            verify_clips,
            ..SplicerConfig::default()
        })
        .with_store(Box::new(InMemoryStore::new(vec![transcript])))
        .with_seed(1)
        .build()
        .expect("build")
    }

    #[test]
    fn missing_clip_fails_the_phrase() {
        let dir = tempfile::tempdir().expect("tempdir");
        let splicer = splicer_with_clips(dir.path(), true);
        let corpus = splicer.snapshot().expect("snapshot");
        let err = report_phrase(&splicer, &corpus, "hello", None).unwrap_err();
        assert!(err.contains("Hello.wav"), "{err}");
    }

    #[test]
    fn resolved_clips_and_gaps_are_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        fs::create_dir_all(dir.path().join("A")).expect("clip dir");
        fs::write(dir.path().join("A/Hello.wav"), "RIFF").expect("clip");
        let splicer = splicer_with_clips(dir.path(), true);
        let corpus = splicer.snapshot().expect("snapshot");

        let report = report_phrase(&splicer, &corpus, "hello stranger", None).expect("report");
        assert_eq!(report.matched_token_count, 1);
        assert_eq!(report.gaps.len(), 1);
        let clips = report.clips.expect("clips listed");
        assert_eq!(clips.len(), 1);
        assert!(clips[0].ends_with("Hello.wav"));

        let unmatched = report_phrase(&splicer, &corpus, "stranger", None).expect("report");
        assert!(unmatched.clips.is_none());
        assert_eq!(unmatched.coverage_ratio, 0.0);
    }

    #[test]
    fn phrase_lines_skip_blanks_and_comments() {
        let parsed = parse_phrase_lines("# greetings\nhello there\n\n  good morning  \n");
        assert_eq!(parsed, ["hello there", "good morning"]);
    }

    #[test]
    fn duration_formats_as_hms() {
        assert_eq!(
            format_duration_hms(Duration::from_millis(3_723_045)),
            "01:02:03.045"
        );
    }

    #[test]
    fn case_choice_maps_to_policy() {
        assert_eq!(CasePolicy::from(CaseChoice::Preserve), CasePolicy::Preserve);
        assert_eq!(CasePolicy::from(CaseChoice::Lowercase), CasePolicy::Lowercase);
    }
}
