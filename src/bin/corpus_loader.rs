use anyhow::{anyhow, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info};
use mkcorpus::data::{ColumnConfig, CorpusLoader, LoadReport};
use mkcorpus::store::{CorpusReader, CorpusStore};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "corpus_loader")]
#[command(about = "Load annotated Middle Korean texts into a corpus database")]
#[command(version)]
struct Args {
    /// Annotation file, or directory of annotation files
    #[arg(short, long)]
    input: PathBuf,

    /// SQLite database to create or extend
    #[arg(short, long, default_value = "corpus.db")]
    db: PathBuf,

    /// Column mapping file (optional)
    #[arg(short, long)]
    columns: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// File pattern to match in a directory (default: *.tsv)
    #[arg(short, long, default_value = "*.tsv")]
    pattern: String,
}

#[derive(Debug)]
struct LoadStats {
    total_files: usize,
    processed_files: usize,
    failed_files: usize,
    report: LoadReport,
    start_time: std::time::Instant,
}

impl Default for LoadStats {
    fn default() -> Self {
        Self {
            total_files: 0,
            processed_files: 0,
            failed_files: 0,
            report: LoadReport::default(),
            start_time: std::time::Instant::now(),
        }
    }
}

/// Loads every matching file, one file at a time
struct FileLoader {
    store: CorpusStore,
    loader: CorpusLoader,
    stats: LoadStats,
    progress_bar: Option<ProgressBar>,
    verbose: bool,
}

impl FileLoader {
    fn new(db_path: &Path, columns: ColumnConfig, verbose: bool) -> Result<Self> {
        Ok(Self {
            store: CorpusStore::open(db_path)?,
            loader: CorpusLoader::new(columns),
            stats: LoadStats::default(),
            progress_bar: None,
            verbose,
        })
    }

    fn init_progress_bar(&mut self, total_files: usize) -> Result<()> {
        if !self.verbose {
            let pb = ProgressBar::new(total_files as u64);
            let style = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")?
                .progress_chars("#>-");
            pb.set_style(style);
            pb.set_message("Loading texts...");
            self.progress_bar = Some(pb);
        }
        Ok(())
    }

    fn update_progress(&mut self, current_file: &str) {
        if let Some(pb) = &self.progress_bar {
            pb.set_message(format!("Processing: {}", current_file));
            pb.inc(1);
        } else if self.verbose {
            info!("Processing: {}", current_file);
        }
    }

    fn finish_progress(&mut self) {
        if let Some(pb) = &self.progress_bar {
            pb.finish_with_message("Loading completed!");
        }
    }

    /// Load a single file or every matching file of a directory
    fn load_input(&mut self, input: &Path, pattern: &str) -> Result<()> {
        if !input.exists() {
            return Err(anyhow!("Input path does not exist: {}", input.display()));
        }

        let files = if input.is_dir() {
            find_files(input, pattern)?
        } else {
            vec![input.to_path_buf()]
        };

        if self.verbose {
            info!("Found {} files to process", files.len());
        } else {
            println!("Found {} files to process", files.len());
        }

        self.init_progress_bar(files.len())?;
        for file_path in &files {
            self.process_file(file_path);
            let name = file_path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "unknown".to_string());
            self.update_progress(&name);
        }
        self.finish_progress();

        self.print_stats()
    }

    /// A failing file is reported and skipped
    fn process_file(&mut self, file_path: &Path) {
        self.stats.total_files += 1;
        match self.loader.load_file(&mut self.store, file_path) {
            Ok(report) => {
                self.stats.processed_files += 1;
                if self.verbose {
                    info!(
                        "Loaded {}: {} sentences, {} rejected",
                        file_path.display(),
                        report.sentences_loaded,
                        report.rejected.len()
                    );
                }
                self.stats.report.merge(report);
            }
            Err(e) => {
                self.stats.failed_files += 1;
                error!("Failed to process {}: {:#}", file_path.display(), e);
            }
        }
    }

    fn print_stats(&self) -> Result<()> {
        let elapsed = self.stats.start_time.elapsed();

        println!("\n=== Loading Statistics ===");
        println!("Total files found: {}", self.stats.total_files);
        println!("Successfully processed: {}", self.stats.processed_files);
        println!("Failed to process: {}", self.stats.failed_files);
        println!("Sentences loaded: {}", self.stats.report.sentences_loaded);
        println!("Tokens loaded: {}", self.stats.report.tokens_loaded);
        println!("Sentences rejected: {}", self.stats.report.rejected.len());
        println!("Total time: {:.2?}", elapsed);

        if self.verbose {
            for (address, reason) in &self.stats.report.rejected {
                println!("  rejected {}: {}", address, reason);
            }
        }

        println!("\n=== Corpus Tables ===");
        for (table, count) in &self.store.corpus_stats()?.tables {
            println!("{:<12} {}", table, count);
        }
        Ok(())
    }
}

/// Files of `dir` matching `pattern`, sorted by name
fn find_files(dir: &Path, pattern: &str) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let matched = path
            .file_name()
            .map(|name| matches_pattern(&name.to_string_lossy(), pattern))
            .unwrap_or(false);
        if matched {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Single `*` wildcard matching; a gzipped copy of a matching file matches too
fn matches_pattern(filename: &str, pattern: &str) -> bool {
    if pattern == "*" {
        return true;
    }
    let name = filename.strip_suffix(".gz").unwrap_or(filename);
    match pattern.split_once('*') {
        Some((prefix, suffix)) => {
            (name.starts_with(prefix) && name.ends_with(suffix))
                || (filename.starts_with(prefix) && filename.ends_with(suffix))
        }
        None => filename == pattern || name == pattern,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    } else {
        env_logger::init();
    }

    println!("Corpus Loader");
    println!("=============");
    println!("Input: {}", args.input.display());
    println!("Database: {}", args.db.display());
    println!("File pattern: {}", args.pattern);
    println!();

    let columns = match &args.columns {
        Some(path) => ColumnConfig::from_yaml(path)?,
        None => ColumnConfig::default(),
    };

    let mut loader = FileLoader::new(&args.db, columns, args.verbose)?;
    loader.load_input(&args.input, &args.pattern)?;

    println!("\nLoading completed successfully!");
    Ok(())
}
